use std::fmt::Display;

use thiserror::Error;

use crate::protocol::Action;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CommandError {
    /// The exchange with the controller did not complete with a success status.
    #[error("{action} failed in transport: {reason}")]
    Transport { action: Action, reason: String },
    /// The controller answered, but not in the shape the caller needed.
    #[error("{action} returned an unreadable response: {reason}")]
    Protocol { action: Action, reason: String },
}

impl CommandError {
    pub fn transport(action: Action, reason: impl Display) -> Self {
        Self::Transport {
            action,
            reason: reason.to_string(),
        }
    }

    pub fn protocol(action: Action, reason: impl Display) -> Self {
        Self::Protocol {
            action,
            reason: reason.to_string(),
        }
    }

    pub fn action(&self) -> Action {
        match self {
            Self::Transport { action, .. } | Self::Protocol { action, .. } => *action,
        }
    }
}
