//! Error types for the room layer.

use sudoclash_protocol::{PlayerId, RoomId};

/// Errors that can occur during room operations.
#[derive(Debug, thiserror::Error)]
pub enum RoomError {
    /// The room does not exist.
    #[error("room {0} not found")]
    NotFound(RoomId),

    /// No player slots left.
    #[error("room {0} is full")]
    RoomFull(RoomId),

    #[error("player {0} already in room {1}")]
    AlreadyInRoom(PlayerId, RoomId),

    #[error("player {0} not in room {1}")]
    NotInRoom(PlayerId, RoomId),

    /// The player is not in any room.
    #[error("player {0} is not in a room")]
    NoRoom(PlayerId),

    /// The room is in a state that doesn't allow this operation,
    /// for example joining a match that already started.
    #[error("invalid room state for this operation: {0}")]
    InvalidState(String),

    /// The room's command channel is closed.
    #[error("room {0} is unavailable")]
    Unavailable(RoomId),
}

impl RoomError {
    /// HTTP-style status code for the `ERROR` packet.
    pub fn code(&self) -> i16 {
        match self {
            Self::NotFound(_) | Self::NoRoom(_) => 404,
            Self::RoomFull(_)
            | Self::AlreadyInRoom(..)
            | Self::NotInRoom(..)
            | Self::InvalidState(_) => 409,
            Self::Unavailable(_) => 503,
        }
    }
}
