//! Field contracts: the shape of a packet payload.
//!
//! A [`Contract`] is an ordered list of named, typed fields. It carries no
//! behavior; a [`PacketCodec`](crate::PacketCodec) walks it to encode and
//! decode. Contracts are built by concatenating small reusable field lists
//! (the [`mixin`] module) in the order they should appear on the wire:
//!
//! ```text
//! USE_CRYO = ACTION ++ USE ++ PUP ++ TARGET ++ CELL_INDEX
//!          = action, client_time, action_id, pup_id, target_id, cell_index
//! ```
//!
//! Concatenation is a set-union: a field that is already present with the
//! same kind is skipped, one present with a different kind is an error.

use crate::{FieldKind, ProtocolError};

/// One named, typed field.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct FieldDef {
    pub name: &'static str,
    pub kind: FieldKind,
}

impl FieldDef {
    pub const fn new(name: &'static str, kind: FieldKind) -> Self {
        Self { name, kind }
    }
}

/// Field names used across the catalog.
pub mod field {
    pub const ACTION: &str = "action";
    pub const TIME: &str = "time";
    pub const PLAYER_ID: &str = "player_id";
    pub const CLIENT_TIME: &str = "client_time";
    pub const SERVER_TIME: &str = "server_time";
    pub const ACTION_ID: &str = "action_id";
    pub const CELL_INDEX: &str = "cell_index";
    pub const VALUE: &str = "value";
    pub const TARGET_ID: &str = "target_id";
    pub const PUP_ID: &str = "pup_id";
    pub const SLOT_INDEX: &str = "slot_index";
    pub const ELEMENT: &str = "element";
    pub const LEVEL: &str = "level";
    pub const REMOVED: &str = "removed";
    pub const TOKEN: &str = "token";
    pub const CODE: &str = "code";
    pub const MESSAGE: &str = "message";
    pub const REASON: &str = "reason";
    pub const ROOM_ID: &str = "room_id";
    pub const WINNER_ID: &str = "winner_id";
    pub const PLAYER_COUNT: &str = "player_count";
    pub const SEED: &str = "seed";
}

/// Reusable field lists that contracts are assembled from.
pub mod mixin {
    use super::{FieldDef, field};
    use crate::FieldKind::{Byte, Short, Str, UInt};

    /// The discriminator. Always first; injected by the packet factory.
    pub const ACTION: &[FieldDef] = &[FieldDef::new(field::ACTION, Byte)];

    /// Base of every single-variant player action.
    pub const PLAYER: &[FieldDef] = &[
        FieldDef::new(field::TIME, UInt),
        FieldDef::new(field::PLAYER_ID, UInt),
    ];

    /// Base of a client-to-server "use" action.
    pub const USE: &[FieldDef] = &[
        FieldDef::new(field::CLIENT_TIME, UInt),
        FieldDef::new(field::ACTION_ID, UInt),
    ];

    /// Base of a server-to-client "used" action.
    pub const USED: &[FieldDef] = &[
        FieldDef::new(field::SERVER_TIME, UInt),
        FieldDef::new(field::PLAYER_ID, UInt),
        FieldDef::new(field::ACTION_ID, UInt),
    ];

    pub const CELL_INDEX: &[FieldDef] = &[FieldDef::new(field::CELL_INDEX, Byte)];
    pub const VALUE: &[FieldDef] = &[FieldDef::new(field::VALUE, Byte)];
    pub const TARGET: &[FieldDef] = &[FieldDef::new(field::TARGET_ID, UInt)];
    pub const PUP: &[FieldDef] = &[FieldDef::new(field::PUP_ID, Byte)];
    pub const SLOT: &[FieldDef] = &[FieldDef::new(field::SLOT_INDEX, Byte)];

    /// What a draw reveals.
    pub const DRAWN: &[FieldDef] = &[
        FieldDef::new(field::PUP_ID, Byte),
        FieldDef::new(field::ELEMENT, Byte),
        FieldDef::new(field::LEVEL, Byte),
    ];

    pub const REMOVED: &[FieldDef] = &[FieldDef::new(field::REMOVED, Byte)];
    pub const SERVER_TIME: &[FieldDef] = &[FieldDef::new(field::SERVER_TIME, UInt)];
    pub const CLIENT_TIME: &[FieldDef] = &[FieldDef::new(field::CLIENT_TIME, UInt)];
    pub const TOKEN: &[FieldDef] = &[FieldDef::new(field::TOKEN, Str)];
    pub const PLAYER_ID: &[FieldDef] = &[FieldDef::new(field::PLAYER_ID, UInt)];
    pub const ROOM_ID: &[FieldDef] = &[FieldDef::new(field::ROOM_ID, Str)];
    pub const ERROR: &[FieldDef] = &[
        FieldDef::new(field::CODE, Short),
        FieldDef::new(field::MESSAGE, Str),
    ];
    pub const REASON_TEXT: &[FieldDef] = &[FieldDef::new(field::MESSAGE, Str)];
    pub const REJECTION: &[FieldDef] = &[
        FieldDef::new(field::ACTION_ID, UInt),
        FieldDef::new(field::REASON, Byte),
    ];
    pub const MATCH_START: &[FieldDef] = &[
        FieldDef::new(field::PLAYER_COUNT, Byte),
        FieldDef::new(field::SEED, UInt),
    ];
    pub const WINNER: &[FieldDef] = &[FieldDef::new(field::WINNER_ID, UInt)];
}

/// An ordered, duplicate-free list of fields.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Contract {
    fields: Vec<FieldDef>,
}

impl Contract {
    pub fn new() -> Self {
        Self::default()
    }

    /// Builds a contract from parts, in order.
    pub fn compose(parts: &[&[FieldDef]]) -> Result<Self, ProtocolError> {
        parts
            .iter()
            .try_fold(Self::new(), |contract, part| contract.extend(part))
    }

    /// Appends `fields`, skipping ones already present with the same kind.
    pub fn extend(mut self, fields: &[FieldDef]) -> Result<Self, ProtocolError> {
        for def in fields {
            match self.get(def.name) {
                Some(existing) if existing.kind == def.kind => {}
                Some(existing) => {
                    return Err(ProtocolError::FieldConflict {
                        field: def.name,
                        first: existing.kind,
                        second: def.kind,
                    });
                }
                None => self.fields.push(*def),
            }
        }
        Ok(self)
    }

    pub fn fields(&self) -> &[FieldDef] {
        &self.fields
    }

    pub fn get(&self, name: &str) -> Option<&FieldDef> {
        self.fields.iter().find(|f| f.name == name)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.get(name).is_some()
    }

    pub fn len(&self) -> usize {
        self.fields.len()
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }

    /// Shortest possible encoding (every string empty).
    pub fn min_len(&self) -> usize {
        self.fields.iter().map(|f| f.kind.min_width()).sum()
    }
}
