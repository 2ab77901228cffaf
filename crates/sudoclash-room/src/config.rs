//! Room configuration and state machine.

use serde::{Deserialize, Serialize};
use sudoclash_state::Mode;

// ---------------------------------------------------------------------------
// RoomConfig
// ---------------------------------------------------------------------------

/// Player limits and mailbox size for a room instance.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct RoomConfig {
    /// The match starts as soon as this many players are in.
    pub min_players: usize,

    /// Maximum players allowed in the room.
    pub max_players: usize,

    /// Capacity of the actor's command mailbox. A full mailbox makes
    /// senders wait.
    pub channel_size: usize,
}

impl RoomConfig {
    /// Head-to-head rooms start with two players, practice rooms with one.
    pub fn for_mode(mode: Mode) -> Self {
        let players = match mode {
            Mode::Match => 2,
            Mode::Practice => 1,
        };
        Self {
            min_players: players,
            max_players: players,
            ..Self::default()
        }
    }
}

impl Default for RoomConfig {
    fn default() -> Self {
        Self {
            min_players: 2,
            max_players: 2,
            channel_size: 64,
        }
    }
}

// ---------------------------------------------------------------------------
// RoomState
// ---------------------------------------------------------------------------

/// The lifecycle state of a room.
///
/// Transitions are strictly ordered:
///
/// ```text
/// WaitingForPlayers → InProgress → Finished
/// ```
///
/// - **WaitingForPlayers**: accepting joins, no match yet.
/// - **InProgress**: the match is running and actions are applied.
/// - **Finished**: someone won or forfeited. Players can still leave,
///   nobody can join, and actions are rejected.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum RoomState {
    WaitingForPlayers,
    InProgress,
    Finished,
}

impl RoomState {
    /// Returns `true` if the room is accepting new players.
    pub fn is_joinable(&self) -> bool {
        matches!(self, Self::WaitingForPlayers)
    }

    /// Returns `true` while the match is running.
    pub fn is_active(&self) -> bool {
        matches!(self, Self::InProgress)
    }

    pub fn next(self) -> Option<Self> {
        match self {
            Self::WaitingForPlayers => Some(Self::InProgress),
            Self::InProgress => Some(Self::Finished),
            Self::Finished => None,
        }
    }

    pub fn can_transition_to(self, target: Self) -> bool {
        self.next() == Some(target)
    }
}

impl std::fmt::Display for RoomState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::WaitingForPlayers => write!(f, "WaitingForPlayers"),
            Self::InProgress => write!(f, "InProgress"),
            Self::Finished => write!(f, "Finished"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_room_state_next_follows_strict_order() {
        assert_eq!(RoomState::WaitingForPlayers.next(), Some(RoomState::InProgress));
        assert_eq!(RoomState::InProgress.next(), Some(RoomState::Finished));
        assert_eq!(RoomState::Finished.next(), None);
    }

    #[test]
    fn test_room_state_can_transition_to() {
        assert!(RoomState::WaitingForPlayers.can_transition_to(RoomState::InProgress));
        assert!(!RoomState::WaitingForPlayers.can_transition_to(RoomState::Finished));
        assert!(!RoomState::Finished.can_transition_to(RoomState::WaitingForPlayers));
    }

    #[test]
    fn test_room_state_flags() {
        assert!(RoomState::WaitingForPlayers.is_joinable());
        assert!(!RoomState::InProgress.is_joinable());
        assert!(RoomState::InProgress.is_active());
        assert!(!RoomState::Finished.is_active());
    }

    #[test]
    fn test_room_config_per_mode() {
        let versus = RoomConfig::for_mode(Mode::Match);
        assert_eq!((versus.min_players, versus.max_players), (2, 2));
        let practice = RoomConfig::for_mode(Mode::Practice);
        assert_eq!((practice.min_players, practice.max_players), (1, 1));
    }

    #[test]
    fn test_room_config_partial_json() {
        let config: RoomConfig = serde_json::from_str(r#"{"channel_size": 8}"#).unwrap();
        assert_eq!(config.channel_size, 8);
        assert_eq!(config.max_players, 2);
    }
}
