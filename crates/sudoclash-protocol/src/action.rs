//! Action identifiers and their domains.
//!
//! Every packet starts with one byte naming what it is: the action id. The
//! `u8` space is cut into disjoint ranges, one per [`Domain`], so the server
//! can tell where to route a packet from its first byte alone.
//!
//! ```text
//!   1..=15   system/session        64..=95   match/player/mechanics
//!  16..=31   system/lobby          96..=103  powerups/cryo
//!  32..=47   match/lifecycle      104..=111  powerups/pyro
//!  48..=63   match/protocol       112..=119  powerups/electro
//!                                 128..=159  mechanics (practice mode)
//! ```
//!
//! Paired actions come in `USE_X` / `X_USED` couples: the client sends the
//! first, the server broadcasts the second.

use std::fmt;
use std::ops::RangeInclusive;

use serde::{Deserialize, Serialize};

/// The leading byte of every packet.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ActionId(pub u8);

impl fmt::Display for ActionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// A registry namespace. Action ids must be unique within one namespace;
/// separate namespaces never see each other's ids.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Namespace(pub &'static str);

impl Namespace {
    /// Everything a game server speaks: system, match and practice domains.
    pub const GAME: Namespace = Namespace("game");
}

impl fmt::Display for Namespace {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.0)
    }
}

/// The functional area an action id belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Domain {
    Session,
    Lobby,
    Lifecycle,
    MatchProtocol,
    Mechanics,
    Cryo,
    Pyro,
    Electro,
    /// Practice-mode mirror of the match mechanics and power-ups.
    LegacyMechanics,
}

impl Domain {
    pub const ALL: [Domain; 9] = [
        Domain::Session,
        Domain::Lobby,
        Domain::Lifecycle,
        Domain::MatchProtocol,
        Domain::Mechanics,
        Domain::Cryo,
        Domain::Pyro,
        Domain::Electro,
        Domain::LegacyMechanics,
    ];

    /// The id range reserved for this domain.
    pub fn range(self) -> RangeInclusive<u8> {
        match self {
            Self::Session => 1..=15,
            Self::Lobby => 16..=31,
            Self::Lifecycle => 32..=47,
            Self::MatchProtocol => 48..=63,
            Self::Mechanics => 64..=95,
            Self::Cryo => 96..=103,
            Self::Pyro => 104..=111,
            Self::Electro => 112..=119,
            Self::LegacyMechanics => 128..=159,
        }
    }

    /// Finds the domain an id falls into. Ids in no range (0, 120..=127,
    /// 160..) belong to nothing and are never registered.
    pub fn of(id: ActionId) -> Option<Domain> {
        Self::ALL.into_iter().find(|d| d.range().contains(&id.0))
    }

    /// Returns `true` for domains handled by the room a player is in,
    /// rather than by the server front door.
    pub fn is_match_scoped(self) -> bool {
        !matches!(self, Self::Session | Self::Lobby)
    }
}

impl fmt::Display for Domain {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Session => "system/session",
            Self::Lobby => "system/lobby",
            Self::Lifecycle => "match/lifecycle",
            Self::MatchProtocol => "match/protocol",
            Self::Mechanics => "match/player/mechanics",
            Self::Cryo => "match/player/powerups/cryo",
            Self::Pyro => "match/player/powerups/pyro",
            Self::Electro => "match/player/powerups/electro",
            Self::LegacyMechanics => "mechanics",
        };
        f.write_str(name)
    }
}

// ---------------------------------------------------------------------------
// Catalog
// ---------------------------------------------------------------------------

pub mod session {
    use super::ActionId;

    pub const HEARTBEAT: ActionId = ActionId(1);
    pub const HEARTBEAT_ACK: ActionId = ActionId(2);
    pub const AUTHENTICATE: ActionId = ActionId(3);
    pub const AUTHENTICATED: ActionId = ActionId(4);
    pub const ERROR: ActionId = ActionId(5);
    pub const DISCONNECT: ActionId = ActionId(6);
}

pub mod lobby {
    use super::ActionId;

    pub const CREATE_ROOM: ActionId = ActionId(16);
    pub const ROOM_CREATED: ActionId = ActionId(17);
    pub const JOIN_ROOM: ActionId = ActionId(18);
    pub const ROOM_JOINED: ActionId = ActionId(19);
    pub const LEAVE_ROOM: ActionId = ActionId(20);
    pub const ROOM_LEFT: ActionId = ActionId(21);
    pub const CREATE_PRACTICE: ActionId = ActionId(22);
}

pub mod lifecycle {
    use super::ActionId;

    pub const MATCH_STARTED: ActionId = ActionId(32);
    pub const MATCH_ENDED: ActionId = ActionId(33);
    pub const FORFEIT: ActionId = ActionId(34);
}

pub mod protocol {
    use super::ActionId;

    pub const SYNC_TIME: ActionId = ActionId(48);
    pub const TIME_SYNCED: ActionId = ActionId(49);
    pub const ACTION_REJECTED: ActionId = ActionId(50);
}

pub mod mechanics {
    use super::ActionId;

    pub const SET_CELL: ActionId = ActionId(64);
    pub const CELL_SET: ActionId = ActionId(65);
    pub const DRAW_PUP: ActionId = ActionId(66);
    pub const PUP_DRAWN: ActionId = ActionId(67);
    pub const DIFFUSE: ActionId = ActionId(68);
    pub const DIFFUSED: ActionId = ActionId(69);
}

pub mod cryo {
    use super::ActionId;

    pub const USE_CRYO: ActionId = ActionId(96);
    pub const CRYO_USED: ActionId = ActionId(97);
}

pub mod pyro {
    use super::ActionId;

    pub const USE_PYRO: ActionId = ActionId(104);
    pub const PYRO_USED: ActionId = ActionId(105);
}

pub mod electro {
    use super::ActionId;

    pub const USE_ELECTRO: ActionId = ActionId(112);
    pub const ELECTRO_USED: ActionId = ActionId(113);
}

/// Practice-mode ids. Same contracts as their match counterparts.
pub mod legacy {
    use super::ActionId;

    pub const SET_CELL: ActionId = ActionId(128);
    pub const CELL_SET: ActionId = ActionId(129);
    pub const USE_CRYO: ActionId = ActionId(130);
    pub const CRYO_USED: ActionId = ActionId(131);
    pub const USE_PYRO: ActionId = ActionId(132);
    pub const PYRO_USED: ActionId = ActionId(133);
    pub const USE_ELECTRO: ActionId = ActionId(134);
    pub const ELECTRO_USED: ActionId = ActionId(135);
}
