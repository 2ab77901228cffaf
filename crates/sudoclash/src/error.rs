//! Unified error type for the Sudoclash server.

use sudoclash_protocol::ProtocolError;
use sudoclash_room::RoomError;

/// Top-level error that wraps all crate-specific errors.
///
/// The `#[from]` attribute on each wrapping variant generates the `From`
/// impls, so `?` converts sub-crate errors automatically.
#[derive(Debug, thiserror::Error)]
pub enum SudoclashError {
    /// Bad bytes, unknown action or a catalog that failed to build.
    #[error(transparent)]
    Protocol(#[from] ProtocolError),

    /// A room-level error (full, not found, invalid state).
    #[error(transparent)]
    Room(#[from] RoomError),

    #[error("authentication failed: {0}")]
    AuthFailed(String),

    /// The connection has not authenticated yet.
    #[error("not authenticated")]
    NotAuthenticated,

    #[error("already authenticated as {0}")]
    AlreadyAuthenticated(sudoclash_protocol::PlayerId),

    /// A client sent a packet only the server may send.
    #[error("unexpected action {0}")]
    UnexpectedAction(sudoclash_protocol::ActionId),

    #[error("invalid configuration: {0}")]
    Config(#[from] serde_json::Error),
}

impl SudoclashError {
    /// HTTP-style status code for the `ERROR` packet.
    pub fn code(&self) -> i16 {
        match self {
            Self::Protocol(_) | Self::UnexpectedAction(_) => 400,
            Self::Room(e) => e.code(),
            Self::AuthFailed(_) | Self::NotAuthenticated => 401,
            Self::AlreadyAuthenticated(_) => 409,
            Self::Config(_) => 500,
        }
    }
}
