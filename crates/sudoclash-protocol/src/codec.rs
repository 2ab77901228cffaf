//! Composite codec: one contract, one action id, bytes in and out.
//!
//! A [`PacketCodec`] is produced by the [`PacketFactory`](crate::PacketFactory)
//! and never built by hand, which is how the wire-format rules (action
//! first, player fields next) stay uniform across every packet type.

use bytes::Bytes;

use crate::contract::field;
use crate::{ActionId, ByteBuffer, Contract, Payload, ProtocolError};

/// Encoder/decoder for a single action.
///
/// Stateless: `encode` and `decode` depend only on their input and the
/// contract, so a codec can be shared freely between rooms and threads.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PacketCodec {
    action: ActionId,
    name: &'static str,
    contract: Contract,
}

impl PacketCodec {
    /// `contract` must start with the `action` field.
    pub(crate) fn new(action: ActionId, name: &'static str, contract: Contract) -> Self {
        debug_assert_eq!(
            contract.fields().first().map(|f| f.name),
            Some(field::ACTION)
        );
        Self {
            action,
            name,
            contract,
        }
    }

    pub fn action(&self) -> ActionId {
        self.action
    }

    pub fn name(&self) -> &'static str {
        self.name
    }

    pub fn contract(&self) -> &Contract {
        &self.contract
    }

    /// Fields after the action discriminator.
    fn body(&self) -> impl Iterator<Item = &crate::FieldDef> {
        self.contract.fields().iter().skip(1)
    }

    /// Serializes `payload` into exactly as many bytes as it needs.
    ///
    /// # Errors
    /// - [`ProtocolError::ContractMismatch`] if the payload is for another action
    /// - [`ProtocolError::MissingField`] if a contract field is absent
    /// - [`ProtocolError::Encoding`] if a value does not fit its wire type
    pub fn encode(&self, payload: &Payload) -> Result<Bytes, ProtocolError> {
        if payload.action() != self.action {
            return Err(ProtocolError::ContractMismatch {
                expected: self.action,
                reason: format!("payload is for action {}", payload.action()),
            });
        }

        let mut size = 1;
        for def in self.body() {
            let value = payload.get(def.name).ok_or_else(|| ProtocolError::MissingField {
                action: self.action,
                field: def.name.to_owned(),
            })?;
            size += def.kind.encoded_len(value);
        }

        let mut buf = ByteBuffer::with_capacity(size);
        buf.write_u8(self.action.0, None)?;
        for def in self.body() {
            // Presence was checked while sizing.
            if let Some(value) = payload.get(def.name) {
                def.kind
                    .write(&mut buf, value)
                    .map_err(|e| e.in_field(def.name))?;
            }
        }
        Ok(buf.freeze())
    }

    /// Parses `data` into a payload.
    ///
    /// # Errors
    /// - [`ProtocolError::TruncatedPacket`] naming the first field that did not fit
    /// - [`ProtocolError::ContractMismatch`] if the leading byte is another action
    /// - [`ProtocolError::Malformed`] for invalid bools or strings
    /// - [`ProtocolError::TrailingBytes`] if bytes are left over
    pub fn decode(&self, data: &[u8]) -> Result<Payload, ProtocolError> {
        let mut buf = ByteBuffer::from_slice(data);
        let found = buf
            .read_u8()
            .map(ActionId)
            .map_err(|_| ProtocolError::TruncatedPacket {
                field: field::ACTION,
            })?;
        if found != self.action {
            return Err(ProtocolError::ContractMismatch {
                expected: self.action,
                reason: format!("packet declares action {found}"),
            });
        }

        let mut payload = Payload::new(self.action);
        for def in self.body() {
            let value = def.kind.read(&mut buf).map_err(|e| match e {
                ProtocolError::OutOfBounds { .. } => {
                    ProtocolError::TruncatedPacket { field: def.name }
                }
                other => other.in_field(def.name),
            })?;
            payload.insert(def.name, value);
        }

        if buf.remaining() > 0 {
            return Err(ProtocolError::TrailingBytes {
                action: self.action,
                extra: buf.remaining(),
            });
        }
        Ok(payload)
    }

    /// Checks that `payload` has exactly this contract's shape: same action,
    /// every field present with a value of the right variant, nothing extra.
    pub fn validate(&self, payload: &Payload) -> Result<(), ProtocolError> {
        let mismatch = |reason: String| ProtocolError::ContractMismatch {
            expected: self.action,
            reason,
        };

        if payload.action() != self.action {
            return Err(mismatch(format!(
                "payload declares action {}",
                payload.action()
            )));
        }
        for def in self.body() {
            match payload.get(def.name) {
                Some(value) if def.kind.accepts(value) => {}
                Some(value) => {
                    return Err(mismatch(format!(
                        "field `{}` holds {value:?}, expected {}",
                        def.name, def.kind
                    )));
                }
                None => return Err(mismatch(format!("field `{}` is missing", def.name))),
            }
        }
        if let Some((name, _)) = payload.fields().find(|(name, _)| !self.contract.contains(name)) {
            return Err(mismatch(format!("unexpected field `{name}`")));
        }
        Ok(())
    }
}
