use crate::shared_data::Approach;
use serde::{Deserialize, Serialize};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum MessageError {
    #[error("malformed command: {0}")]
    Malformed(#[from] serde_json::Error),
}

/// Command sent by a client, e.g. `{"action": "add_car", "direction": "NS"}`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "action", rename_all = "snake_case")]
pub enum ClientCommand {
    AddCar { direction: Approach },
    PedestrianRequest { direction: Approach },
    ToggleNightMode,
}

impl ClientCommand {
    pub fn parse(text: &str) -> Result<Self, MessageError> {
        Ok(serde_json::from_str(text.trim())?)
    }
}
