//! Local state command handler.

use super::StateAction;
use lifeos::Result;
use lifeos::config::LifeosConfig;
use lifeos::state::LocalState;
use serde_json::Value;

/// Executes a state subcommand.
pub fn cmd_state(config: &LifeosConfig, action: StateAction) -> Result<()> {
    let mut state = LocalState::init(config.state_path())?;

    match action {
        StateAction::Show => {
            for (key, value) in state.entries() {
                println!("{key} = {value}");
            }
        },
        StateAction::Set { key, value } => {
            let value = serde_json::from_str::<Value>(&value).unwrap_or(Value::String(value));
            state.set(key, value)?;
        },
        StateAction::Clear => {
            state.clear()?;
            println!("Local state cleared");
        },
    }

    Ok(())
}
