// mancala/src/error.rs
// Error taxonomy of the game core.

use thiserror::Error;

use crate::defs::{MAX_MESSAGE, MAX_NAME};

/// Reasons a name or a move is refused.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum GameError {
    #[error("name is too long (limit {} bytes)", MAX_NAME)]
    NameTooLong,
    #[error("name is empty")]
    EmptyName,
    #[error("name is not valid UTF-8")]
    NameNotUtf8,
    #[error("name {0:?} is already taken")]
    DuplicateName(String),
    #[error("pit {0:?} is not a valid pit number")]
    PitOutOfRange(String),
    #[error("pit {0} is empty")]
    EmptyPit(usize),
}

impl GameError {
    /// Protocol violations end the connection; everything else is retried.
    pub fn is_protocol_violation(&self) -> bool {
        matches!(
            self,
            GameError::NameTooLong
                | GameError::EmptyName
                | GameError::NameNotUtf8
                | GameError::DuplicateName(_)
        )
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum DecodeError {
    #[error("line exceeds {} bytes without a terminator", MAX_MESSAGE)]
    LineTooLong,
    #[error("line is not valid UTF-8")]
    InvalidUtf8,
}
