//! Error types for the protocol layer.
//!
//! Every failure in framing, encoding, decoding, and registry construction
//! is a [`ProtocolError`]. None of them should take a room down: the server
//! drops the offending packet and keeps going. The single exception is a
//! registry that fails to build at startup.

use crate::{ActionId, FieldKind};

/// Errors that can occur in the protocol layer.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum ProtocolError {
    /// A read or write would cross the end of the buffer.
    ///
    /// The cursor is never clamped: the operation fails and the buffer is
    /// left untouched.
    #[error("buffer access out of bounds: {needed} byte(s) at index {index}, length {len}")]
    OutOfBounds {
        index: usize,
        needed: usize,
        len: usize,
    },

    /// A value cannot be represented by its wire type (out of range,
    /// not finite, string too long, wrong value variant).
    ///
    /// With validated inputs this never happens, so it signals a bug in
    /// whoever built the payload.
    #[error("encoding failed: {0}")]
    Encoding(String),

    /// The packet ended before the named field could be read.
    #[error("packet truncated before field `{field}`")]
    TruncatedPacket { field: &'static str },

    /// The leading action id has no codec in the registry.
    #[error("unknown action {0}")]
    UnknownAction(ActionId),

    /// A decoded payload disagrees with the contract it was decoded
    /// against. Either the registry is wrong or the packet was tampered with.
    #[error("contract mismatch for action {expected}: {reason}")]
    ContractMismatch { expected: ActionId, reason: String },

    /// Two codecs were defined with the same action id in one namespace.
    #[error("action {action} already defined as `{existing}`, cannot define `{name}`")]
    DuplicateAction {
        action: ActionId,
        existing: &'static str,
        name: &'static str,
    },

    /// Two contracts being merged declare the same field with different kinds.
    #[error("field `{field}` declared as both {first} and {second}")]
    FieldConflict {
        field: &'static str,
        first: FieldKind,
        second: FieldKind,
    },

    /// A payload lacks a field its contract requires.
    #[error("action {action} is missing field `{field}`")]
    MissingField { action: ActionId, field: String },

    /// A payload field holds a value of the wrong variant.
    #[error("field `{field}` does not hold a {expected}")]
    FieldType { field: String, expected: FieldKind },

    /// Bytes remain after the last field of the contract.
    #[error("{extra} trailing byte(s) after action {action}")]
    TrailingBytes { action: ActionId, extra: usize },

    /// The bytes for a field are present but not a valid value
    /// (a bool that is neither 0 nor 1, a string that is not UTF-8).
    #[error("malformed field `{field}`: {reason}")]
    Malformed { field: &'static str, reason: String },
}

impl ProtocolError {
    /// Attaches a field name to errors raised below the contract level,
    /// where the name is not known.
    pub(crate) fn in_field(self, field: &'static str) -> Self {
        match self {
            Self::Encoding(reason) => Self::Encoding(format!("field `{field}`: {reason}")),
            Self::Malformed { reason, .. } => Self::Malformed { field, reason },
            other => other,
        }
    }
}
