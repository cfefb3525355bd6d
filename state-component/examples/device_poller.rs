//! Device Poller - polling loops built from `wait`
//!
//! Two simulated thermostats are polled on their own tokio tasks. Each poll
//! merges the latest reading into the device's component; listeners only
//! hear about fields whose value actually changed.
//!
//! Run: STATE_COMPONENT_LOG_MODE=debug cargo run -p state-component --example device_poller

use std::sync::Arc;
use std::time::Duration;

use serde_json::json;
use state_component::logging::init_logging_from_env;
use state_component::{ComponentConfig, Result, StateComponent, Stateful};
use tracing::info;

const POLLS: u32 = 6;

struct DeviceProxy {
    component: StateComponent,
    interval: Duration,
}

impl Stateful for DeviceProxy {
    fn component(&self) -> &StateComponent {
        &self.component
    }
}

impl DeviceProxy {
    fn new(name: &str, interval: Duration) -> Self {
        let config = ComponentConfig::new().with_name(name);
        Self {
            component: StateComponent::from_config(config),
            interval,
        }
    }

    /// Stand-in for a network read; changes slowly so some polls are no-ops
    fn read_device(&self, poll: u32) -> (f64, bool) {
        let temperature = 20.0 + f64::from(poll / 2) * 0.5;
        let heating = temperature < 21.0;
        (temperature, heating)
    }

    async fn run(&self) -> Result<()> {
        for poll in 0..POLLS {
            let (temperature, heating) = self.read_device(poll);
            self.set_state(json!({
                "online": true,
                "temperature": temperature,
                "heating": heating,
            }))?;
            self.wait(self.interval).await;
        }
        self.set_state(json!({ "online": false }))
    }
}

#[tokio::main]
async fn main() -> std::result::Result<(), Box<dyn std::error::Error>> {
    init_logging_from_env()?;

    let devices = [
        Arc::new(DeviceProxy::new("hallway", Duration::from_millis(150))),
        Arc::new(DeviceProxy::new("bedroom", Duration::from_millis(250))),
    ];

    for device in &devices {
        let name = device.component().name().to_string();
        device.component().on_change(move |event| {
            println!("[{}] {} -> {}", name, event.field, event.new_value);
        });
    }

    let tasks: Vec<_> = devices
        .iter()
        .map(|device| {
            let device = Arc::clone(device);
            tokio::spawn(async move { device.run().await })
        })
        .collect();

    for task in tasks {
        task.await??;
    }

    for device in &devices {
        info!(device = device.component().name(), state = ?device.state(), "Final state");
    }

    Ok(())
}
