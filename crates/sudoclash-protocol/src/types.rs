//! Identity types shared by every layer.
//!
//! Both are newtypes so a room id can never be passed where a player id is
//! expected. They travel on the wire as a `UInt` field (`PlayerId`) and a
//! length-prefixed string (`RoomId`).

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::ProtocolError;

// ---------------------------------------------------------------------------
// PlayerId
// ---------------------------------------------------------------------------

/// A connected player, assigned by the server on authentication.
///
/// `#[serde(transparent)]` keeps it a plain number in JSON.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct PlayerId(pub u32);

impl fmt::Display for PlayerId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "P-{}", self.0)
    }
}

// ---------------------------------------------------------------------------
// RoomId
// ---------------------------------------------------------------------------

/// A room code players type to join each other: five characters from
/// `A-Z0-9`.
///
/// Parsing upper-cases its input, so `"ab12c"` and `"AB12C"` name the same
/// room.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct RoomId([u8; RoomId::LEN]);

impl RoomId {
    pub const LEN: usize = 5;

    /// Characters a room code may contain.
    pub const ALPHABET: &'static [u8; 36] = b"ABCDEFGHIJKLMNOPQRSTUVWXYZ0123456789";

    /// Builds an id from raw bytes, rejecting anything outside [`Self::ALPHABET`].
    pub fn from_bytes(bytes: [u8; Self::LEN]) -> Result<Self, ProtocolError> {
        match bytes.iter().find(|b| !Self::ALPHABET.contains(b)) {
            Some(bad) => Err(malformed(format!("invalid character {:?}", char::from(*bad)))),
            None => Ok(Self(bytes)),
        }
    }

    pub fn as_str(&self) -> &str {
        // ALPHABET is ASCII, so the bytes are always valid UTF-8.
        std::str::from_utf8(&self.0).unwrap_or_default()
    }
}

fn malformed(reason: String) -> ProtocolError {
    ProtocolError::Malformed {
        field: crate::field::ROOM_ID,
        reason,
    }
}

impl FromStr for RoomId {
    type Err = ProtocolError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let upper = s.trim().to_ascii_uppercase();
        let bytes: [u8; Self::LEN] = upper
            .as_bytes()
            .try_into()
            .map_err(|_| malformed(format!("expected {} bytes, got {}", Self::LEN, upper.len())))?;
        Self::from_bytes(bytes)
    }
}

impl TryFrom<String> for RoomId {
    type Error = ProtocolError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl From<RoomId> for String {
    fn from(id: RoomId) -> Self {
        id.as_str().to_owned()
    }
}

impl fmt::Display for RoomId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

// =========================================================================
// Tests
// =========================================================================
