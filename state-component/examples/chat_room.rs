//! Chat Room - a collaborator built around a StateComponent
//!
//! Members and messages live in component state; a logger listens on the
//! `change` channel and a topic watcher listens to one field.
//!
//! Run: STATE_COMPONENT_LOG_MODE=development cargo run -p state-component --example chat_room

use serde_json::{json, Value};
use state_component::logging::init_logging_from_env;
use state_component::{ComponentConfig, Result, StateComponent, Stateful};

struct ChatRoom {
    component: StateComponent,
}

impl Stateful for ChatRoom {
    fn component(&self) -> &StateComponent {
        &self.component
    }
}

impl ChatRoom {
    fn new(name: &str) -> Self {
        let initial = json!({"members": [], "messages": [], "topic": null});
        let config = ComponentConfig::new()
            .with_name(name)
            .with_initial_state(initial.as_object().cloned().unwrap_or_default());

        Self {
            component: StateComponent::from_config(config),
        }
    }

    fn list(&self, field: &str) -> Vec<Value> {
        self.component
            .get(field)
            .and_then(|value| value.as_array().cloned())
            .unwrap_or_default()
    }

    fn join(&self, user: &str) -> Result<()> {
        let mut members = self.list("members");
        if !members.contains(&json!(user)) {
            members.push(json!(user));
        }
        self.set_state(json!({ "members": members }))
    }

    fn leave(&self, user: &str) -> Result<()> {
        let members: Vec<Value> = self
            .list("members")
            .into_iter()
            .filter(|member| member != &json!(user))
            .collect();
        self.set_state(json!({ "members": members }))
    }

    fn post(&self, user: &str, text: &str) -> Result<()> {
        let mut messages = self.list("messages");
        messages.push(json!({ "from": user, "text": text }));
        self.set_state(json!({ "messages": messages }))
    }

    fn set_topic(&self, topic: &str) -> Result<()> {
        self.set_state(json!({ "topic": topic }))
    }
}

fn main() -> std::result::Result<(), Box<dyn std::error::Error>> {
    init_logging_from_env()?;

    let room = ChatRoom::new("lobby");

    room.component().on_change(|event| {
        println!("[change] {}: {:?} -> {}", event.field, event.old_value, event.new_value);
    });
    room.component().on_field_change("topic", |event| {
        println!("[topic] now {}", event.new_value);
    });

    room.join("ada")?;
    room.join("grace")?;
    room.set_topic("compilers")?;
    room.post("ada", "anyone tried the new borrow checker?")?;
    room.post("grace", "it caught a bug of mine this morning")?;

    // Same topic again: statechange fires, change does not
    room.set_topic("compilers")?;
    room.leave("ada")?;

    if let Some(state) = room.state() {
        println!("{}", serde_json::to_string_pretty(&state)?);
    }

    Ok(())
}
