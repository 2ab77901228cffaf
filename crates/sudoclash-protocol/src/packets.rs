//! The packet catalog: every action the game speaks, as plain data.
//!
//! Nothing here registers itself. [`catalog`] returns the exhaustive list and
//! [`Registry::build`](crate::Registry::build) turns it into a lookup table
//! at startup, so there is no hidden ordering between modules.

use crate::action::{cryo, electro, legacy, lifecycle, lobby, mechanics, protocol, pyro, session};
use crate::contract::mixin;
use crate::{ActionId, FieldDef, Origin};

/// How to build one codec (or one use/used pair).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PacketDescriptor {
    Single {
        action: ActionId,
        name: &'static str,
        origin: Origin,
        parts: &'static [&'static [FieldDef]],
    },
    Paired {
        name: &'static str,
        use_action: ActionId,
        used_action: ActionId,
        parts: &'static [&'static [FieldDef]],
        used_extra: &'static [FieldDef],
    },
}

impl PacketDescriptor {
    pub fn name(&self) -> &'static str {
        match self {
            Self::Single { name, .. } | Self::Paired { name, .. } => name,
        }
    }

    /// Every id this descriptor claims.
    pub fn actions(&self) -> Vec<ActionId> {
        match self {
            Self::Single { action, .. } => vec![*action],
            Self::Paired {
                use_action,
                used_action,
                ..
            } => vec![*use_action, *used_action],
        }
    }
}

const fn system(
    action: ActionId,
    name: &'static str,
    parts: &'static [&'static [FieldDef]],
) -> PacketDescriptor {
    PacketDescriptor::Single {
        action,
        name,
        origin: Origin::System,
        parts,
    }
}

const fn paired(
    name: &'static str,
    use_action: ActionId,
    used_action: ActionId,
    parts: &'static [&'static [FieldDef]],
    used_extra: &'static [FieldDef],
) -> PacketDescriptor {
    PacketDescriptor::Paired {
        name,
        use_action,
        used_action,
        parts,
        used_extra,
    }
}

const PUP_ON_CELL: &[&[FieldDef]] = &[mixin::PUP, mixin::TARGET, mixin::CELL_INDEX];
const CELL_WRITE: &[&[FieldDef]] = &[mixin::CELL_INDEX, mixin::VALUE];

/// Session and lobby traffic.
pub fn system_packets() -> Vec<PacketDescriptor> {
    vec![
        system(session::HEARTBEAT, "heartbeat", &[mixin::CLIENT_TIME]),
        system(
            session::HEARTBEAT_ACK,
            "heartbeat_ack",
            &[mixin::CLIENT_TIME, mixin::SERVER_TIME],
        ),
        system(session::AUTHENTICATE, "authenticate", &[mixin::TOKEN]),
        system(session::AUTHENTICATED, "authenticated", &[mixin::PLAYER_ID]),
        system(session::ERROR, "error", &[mixin::ERROR]),
        system(session::DISCONNECT, "disconnect", &[mixin::REASON_TEXT]),
        system(lobby::CREATE_ROOM, "create_room", &[]),
        system(lobby::ROOM_CREATED, "room_created", &[mixin::ROOM_ID]),
        system(lobby::JOIN_ROOM, "join_room", &[mixin::ROOM_ID]),
        system(
            lobby::ROOM_JOINED,
            "room_joined",
            &[mixin::ROOM_ID, mixin::PLAYER_ID],
        ),
        system(lobby::LEAVE_ROOM, "leave_room", &[]),
        system(lobby::ROOM_LEFT, "room_left", &[mixin::ROOM_ID, mixin::PLAYER_ID]),
        system(lobby::CREATE_PRACTICE, "create_practice", &[]),
    ]
}

/// Everything exchanged inside a room.
pub fn match_packets() -> Vec<PacketDescriptor> {
    vec![
        system(
            lifecycle::MATCH_STARTED,
            "match_started",
            &[mixin::SERVER_TIME, mixin::MATCH_START],
        ),
        system(
            lifecycle::MATCH_ENDED,
            "match_ended",
            &[mixin::SERVER_TIME, mixin::WINNER],
        ),
        PacketDescriptor::Single {
            action: lifecycle::FORFEIT,
            name: "forfeit",
            origin: Origin::Player,
            parts: &[],
        },
        system(protocol::SYNC_TIME, "sync_time", &[mixin::CLIENT_TIME]),
        system(
            protocol::TIME_SYNCED,
            "time_synced",
            &[mixin::CLIENT_TIME, mixin::SERVER_TIME],
        ),
        system(
            protocol::ACTION_REJECTED,
            "action_rejected",
            &[mixin::SERVER_TIME, mixin::REJECTION],
        ),
        paired("set_cell", mechanics::SET_CELL, mechanics::CELL_SET, CELL_WRITE, &[]),
        paired(
            "draw_pup",
            mechanics::DRAW_PUP,
            mechanics::PUP_DRAWN,
            &[mixin::SLOT],
            mixin::DRAWN,
        ),
        paired(
            "diffuse",
            mechanics::DIFFUSE,
            mechanics::DIFFUSED,
            &[mixin::SLOT, mixin::CELL_INDEX],
            mixin::REMOVED,
        ),
        paired("cryo", cryo::USE_CRYO, cryo::CRYO_USED, PUP_ON_CELL, &[]),
        paired("pyro", pyro::USE_PYRO, pyro::PYRO_USED, PUP_ON_CELL, &[]),
        paired("electro", electro::USE_ELECTRO, electro::ELECTRO_USED, PUP_ON_CELL, &[]),
    ]
}

/// Practice-mode mirrors of the match mechanics.
pub fn legacy_packets() -> Vec<PacketDescriptor> {
    vec![
        paired("legacy_set_cell", legacy::SET_CELL, legacy::CELL_SET, CELL_WRITE, &[]),
        paired("legacy_cryo", legacy::USE_CRYO, legacy::CRYO_USED, PUP_ON_CELL, &[]),
        paired("legacy_pyro", legacy::USE_PYRO, legacy::PYRO_USED, PUP_ON_CELL, &[]),
        paired(
            "legacy_electro",
            legacy::USE_ELECTRO,
            legacy::ELECTRO_USED,
            PUP_ON_CELL,
            &[],
        ),
    ]
}

/// The full catalog for [`Namespace::GAME`](crate::Namespace::GAME).
pub fn catalog() -> Vec<PacketDescriptor> {
    let mut all = system_packets();
    all.extend(match_packets());
    all.extend(legacy_packets());
    all
}
