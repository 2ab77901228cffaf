//! Structured packet payloads.

use std::collections::BTreeMap;

use crate::{ActionId, FieldKind, ProtocolError, Value};

/// A decoded (or about-to-be-encoded) packet.
///
/// The action id lives in its own slot; `fields` holds everything after it,
/// keyed by contract field name. Two payloads are equal when their action
/// and every field value are equal, regardless of insertion order.
#[derive(Debug, Clone, PartialEq)]
pub struct Payload {
    action: ActionId,
    fields: BTreeMap<&'static str, Value>,
}

impl Payload {
    pub fn new(action: ActionId) -> Self {
        Self {
            action,
            fields: BTreeMap::new(),
        }
    }

    /// Builder-style insert.
    ///
    /// ```rust
    /// use sudoclash_protocol::{Payload, action::mechanics, field};
    ///
    /// let payload = Payload::new(mechanics::SET_CELL)
    ///     .with(field::CLIENT_TIME, 1000u32)
    ///     .with(field::ACTION_ID, 1u32)
    ///     .with(field::CELL_INDEX, 4u8)
    ///     .with(field::VALUE, 7u8);
    /// assert_eq!(payload.u8(field::VALUE).unwrap(), 7);
    /// ```
    pub fn with(mut self, name: &'static str, value: impl Into<Value>) -> Self {
        self.insert(name, value);
        self
    }

    pub fn insert(&mut self, name: &'static str, value: impl Into<Value>) {
        self.fields.insert(name, value.into());
    }

    pub fn action(&self) -> ActionId {
        self.action
    }

    pub fn get(&self, name: &str) -> Option<&Value> {
        self.fields.get(name)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.fields.contains_key(name)
    }

    /// Field names and values, sorted by name.
    pub fn fields(&self) -> impl Iterator<Item = (&'static str, &Value)> {
        self.fields.iter().map(|(k, v)| (*k, v))
    }

    pub fn len(&self) -> usize {
        self.fields.len()
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }

    fn require(&self, name: &str) -> Result<&Value, ProtocolError> {
        self.fields.get(name).ok_or_else(|| ProtocolError::MissingField {
            action: self.action,
            field: name.to_owned(),
        })
    }

    pub fn int(&self, name: &str) -> Result<i64, ProtocolError> {
        self.require(name)?
            .as_int()
            .ok_or_else(|| type_error(name, FieldKind::Int))
    }

    pub fn u8(&self, name: &str) -> Result<u8, ProtocolError> {
        u8::try_from(self.int(name)?).map_err(|_| type_error(name, FieldKind::Byte))
    }

    pub fn u32(&self, name: &str) -> Result<u32, ProtocolError> {
        u32::try_from(self.int(name)?).map_err(|_| type_error(name, FieldKind::UInt))
    }

    pub fn str(&self, name: &str) -> Result<&str, ProtocolError> {
        self.require(name)?
            .as_str()
            .ok_or_else(|| type_error(name, FieldKind::Str))
    }

    pub fn bool(&self, name: &str) -> Result<bool, ProtocolError> {
        self.require(name)?
            .as_bool()
            .ok_or_else(|| type_error(name, FieldKind::Bool))
    }
}

fn type_error(name: &str, expected: FieldKind) -> ProtocolError {
    ProtocolError::FieldType {
        field: name.to_owned(),
        expected,
    }
}
