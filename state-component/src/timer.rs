//! Suspension primitive for polling collaborators
//!
//! Components never schedule recurring work themselves. A collaborator that
//! polls a device writes its own loop and calls `wait` between polls:
//!
//! ```rust,ignore
//! loop {
//!     let reading = device.read().await?;
//!     component.update(json!({ "temperature": reading }))?;
//!     component.wait(Duration::from_secs(5)).await;
//! }
//! ```

use std::time::Duration;

/// Suspend the current task for `duration`
///
/// Yields to the tokio scheduler instead of blocking the thread, so other
/// tasks and components keep running. Always resolves after the full
/// duration; there is no early wake. Requires a tokio runtime with the
/// time driver enabled.
pub async fn wait(duration: Duration) {
    tokio::time::sleep(duration).await;
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Instant;

    #[tokio::test]
    async fn test_wait_zero_resolves() {
        wait(Duration::ZERO).await;
    }

    #[tokio::test]
    async fn test_wait_sleeps_for_duration() {
        let start = Instant::now();
        wait(Duration::from_millis(30)).await;
        assert!(start.elapsed() >= Duration::from_millis(25));
    }
}
