//! Action registry and dispatch.
//!
//! The [`Registry`] maps every action id of a namespace to its codec. It is
//! built once from an explicit descriptor list and is read-only afterwards,
//! so one `Arc<Registry>` can serve every room and connection without
//! locking.
//!
//! Dispatch is three steps:
//!
//! ```text
//! bytes ──peek──▶ ActionId ──lookup──▶ PacketCodec ──decode+validate──▶ Payload
//!          │                   │                         │
//!   TruncatedPacket      UnknownAction       Truncated / Malformed / ContractMismatch
//! ```

use std::collections::HashMap;

use bytes::Bytes;

use crate::contract::field;
use crate::packets::{self, PacketDescriptor};
use crate::{ActionId, Namespace, PacketCodec, PacketFactory, PacketPair, Payload, ProtocolError};

/// Immutable action id to codec table.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Registry {
    namespace: Namespace,
    codecs: HashMap<ActionId, PacketCodec>,
    /// Paired actions, keyed by their "use" id.
    pairs: HashMap<ActionId, PacketPair>,
}

impl Registry {
    /// Builds a registry from `descriptors`.
    ///
    /// This is the startup step where a bad catalog surfaces: a duplicate id
    /// or conflicting contract fails here and the server should refuse to
    /// start. The result depends only on the descriptors, so building the
    /// same list twice gives equal registries.
    pub fn build(
        namespace: Namespace,
        descriptors: impl IntoIterator<Item = PacketDescriptor>,
    ) -> Result<Self, ProtocolError> {
        let mut factory = PacketFactory::new(namespace);
        let mut codecs = HashMap::new();
        let mut pairs = HashMap::new();

        for descriptor in descriptors {
            match descriptor {
                PacketDescriptor::Single {
                    action,
                    name,
                    origin,
                    parts,
                } => {
                    let codec = factory.single(action, name, origin, parts)?;
                    codecs.insert(action, codec);
                }
                PacketDescriptor::Paired {
                    name,
                    use_action,
                    used_action,
                    parts,
                    used_extra,
                } => {
                    let pair = factory.paired(name, use_action, used_action, parts, used_extra)?;
                    codecs.insert(use_action, pair.use_codec().clone());
                    codecs.insert(used_action, pair.used_codec().clone());
                    pairs.insert(use_action, pair);
                }
            }
        }

        tracing::info!(
            namespace = %namespace,
            actions = codecs.len(),
            pairs = pairs.len(),
            "action registry built"
        );
        Ok(Self {
            namespace,
            codecs,
            pairs,
        })
    }

    /// The registry every game server uses: [`packets::catalog`] in
    /// [`Namespace::GAME`].
    pub fn standard() -> Result<Self, ProtocolError> {
        Self::build(Namespace::GAME, packets::catalog())
    }

    pub fn namespace(&self) -> Namespace {
        self.namespace
    }

    pub fn len(&self) -> usize {
        self.codecs.len()
    }

    pub fn is_empty(&self) -> bool {
        self.codecs.is_empty()
    }

    pub fn contains(&self, action: ActionId) -> bool {
        self.codecs.contains_key(&action)
    }

    pub fn codec(&self, action: ActionId) -> Option<&PacketCodec> {
        self.codecs.get(&action)
    }

    /// The pair whose "use" id is `use_action`.
    pub fn pair(&self, use_action: ActionId) -> Option<&PacketPair> {
        self.pairs.get(&use_action)
    }

    /// All registered ids, ascending.
    pub fn actions(&self) -> Vec<ActionId> {
        let mut ids: Vec<_> = self.codecs.keys().copied().collect();
        ids.sort();
        ids
    }

    fn resolve(&self, action: ActionId) -> Result<&PacketCodec, ProtocolError> {
        self.codecs
            .get(&action)
            .ok_or(ProtocolError::UnknownAction(action))
    }

    /// Reads the leading action id without decoding anything else.
    pub fn peek_action(data: &[u8]) -> Result<ActionId, ProtocolError> {
        data.first()
            .copied()
            .map(ActionId)
            .ok_or(ProtocolError::TruncatedPacket {
                field: field::ACTION,
            })
    }

    /// Peeks, resolves, decodes and validates.
    pub fn decode(&self, data: &[u8]) -> Result<Payload, ProtocolError> {
        let action = Self::peek_action(data)?;
        let codec = self.resolve(action)?;
        let payload = codec.decode(data)?;
        codec.validate(&payload)?;
        Ok(payload)
    }

    /// Encodes `payload` with the codec of its own action.
    pub fn encode(&self, payload: &Payload) -> Result<Bytes, ProtocolError> {
        self.resolve(payload.action())?.encode(payload)
    }

    /// Checks `payload` against the contract registered for its action.
    pub fn validate(&self, payload: &Payload) -> Result<(), ProtocolError> {
        self.resolve(payload.action())?.validate(payload)
    }

    /// Builds the "used" broadcast for a "use" request.
    ///
    /// # Errors
    /// [`ProtocolError::UnknownAction`] if `request` is not the "use" half of
    /// a registered pair.
    pub fn acknowledge(
        &self,
        request: &Payload,
        server_time: u32,
        player_id: u32,
    ) -> Result<Payload, ProtocolError> {
        self.pairs
            .get(&request.action())
            .ok_or(ProtocolError::UnknownAction(request.action()))?
            .acknowledge(request, server_time, player_id)
    }
}
