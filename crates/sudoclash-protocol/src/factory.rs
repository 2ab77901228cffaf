//! Packet factory: the only way to build a [`PacketCodec`].
//!
//! The factory owns two rules that every codec must follow:
//!
//! 1. **Injected header.** `action` is always the first field. Player-origin
//!    single actions get `time` and `player_id` right after it. Paired
//!    actions get `client_time, action_id` (use) or
//!    `server_time, player_id, action_id` (used).
//! 2. **Unique ids.** An action id can be claimed once per namespace. A
//!    second claim fails with [`ProtocolError::DuplicateAction`] while the
//!    registry is being built, long before any packet is decoded.

use std::collections::HashMap;

use crate::contract::{field, mixin};
use crate::{ActionId, Contract, FieldDef, Namespace, PacketCodec, Payload, ProtocolError};

/// Who sends a single-variant action.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Origin {
    /// Header is just `action`.
    System,
    /// Header is `action, time, player_id`.
    Player,
}

/// A client "use" action and the server "used" broadcast that answers it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PacketPair {
    name: &'static str,
    use_codec: PacketCodec,
    used_codec: PacketCodec,
    /// Thematic fields present in both variants, echoed by `acknowledge`.
    shared: Vec<&'static str>,
}

impl PacketPair {
    pub fn name(&self) -> &'static str {
        self.name
    }

    pub fn use_codec(&self) -> &PacketCodec {
        &self.use_codec
    }

    pub fn used_codec(&self) -> &PacketCodec {
        &self.used_codec
    }

    /// Builds the "used" payload answering `request`.
    ///
    /// Copies `action_id` (for client-side correlation) and every shared
    /// field, and stamps `server_time` and `player_id`. Fields that only the
    /// "used" variant carries are left for the caller to insert.
    pub fn acknowledge(
        &self,
        request: &Payload,
        server_time: u32,
        player_id: u32,
    ) -> Result<Payload, ProtocolError> {
        self.use_codec.validate(request)?;

        let mut ack = Payload::new(self.used_codec.action())
            .with(field::SERVER_TIME, server_time)
            .with(field::PLAYER_ID, player_id)
            .with(field::ACTION_ID, request.u32(field::ACTION_ID)?);
        for &name in &self.shared {
            if let Some(value) = request.get(name) {
                ack.insert(name, value.clone());
            }
        }
        Ok(ack)
    }
}

/// Builds codecs and enforces id uniqueness within one namespace.
#[derive(Debug)]
pub struct PacketFactory {
    namespace: Namespace,
    defined: HashMap<ActionId, &'static str>,
}

impl PacketFactory {
    pub fn new(namespace: Namespace) -> Self {
        Self {
            namespace,
            defined: HashMap::new(),
        }
    }

    pub fn namespace(&self) -> Namespace {
        self.namespace
    }

    fn ensure_free(&self, action: ActionId, name: &'static str) -> Result<(), ProtocolError> {
        match self.defined.get(&action) {
            Some(&existing) => Err(ProtocolError::DuplicateAction {
                action,
                existing,
                name,
            }),
            None => Ok(()),
        }
    }

    /// Defines a single-variant action.
    ///
    /// `parts` are concatenated after the injected header.
    pub fn single(
        &mut self,
        action: ActionId,
        name: &'static str,
        origin: Origin,
        parts: &[&[FieldDef]],
    ) -> Result<PacketCodec, ProtocolError> {
        self.ensure_free(action, name)?;

        let header = match origin {
            Origin::System => Contract::compose(&[mixin::ACTION])?,
            Origin::Player => Contract::compose(&[mixin::ACTION, mixin::PLAYER])?,
        };
        let contract = extend_all(header, parts)?;

        self.defined.insert(action, name);
        tracing::trace!(namespace = %self.namespace, %action, name, "defined packet");
        Ok(PacketCodec::new(action, name, contract))
    }

    /// Defines a use/used couple sharing `parts`. `used_extra` is appended to
    /// the "used" variant only.
    pub fn paired(
        &mut self,
        name: &'static str,
        use_action: ActionId,
        used_action: ActionId,
        parts: &[&[FieldDef]],
        used_extra: &[FieldDef],
    ) -> Result<PacketPair, ProtocolError> {
        self.ensure_free(use_action, name)?;
        self.ensure_free(used_action, name)?;
        if use_action == used_action {
            return Err(ProtocolError::DuplicateAction {
                action: use_action,
                existing: name,
                name,
            });
        }

        let use_contract = extend_all(Contract::compose(&[mixin::ACTION, mixin::USE])?, parts)?;
        let used_contract = extend_all(Contract::compose(&[mixin::ACTION, mixin::USED])?, parts)?
            .extend(used_extra)?;

        let header_len = mixin::ACTION.len() + mixin::USE.len();
        let shared = use_contract.fields()[header_len..]
            .iter()
            .map(|f| f.name)
            .collect();

        self.defined.insert(use_action, name);
        self.defined.insert(used_action, name);
        tracing::trace!(namespace = %self.namespace, %use_action, %used_action, name, "defined packet pair");

        Ok(PacketPair {
            name,
            use_codec: PacketCodec::new(use_action, name, use_contract),
            used_codec: PacketCodec::new(used_action, name, used_contract),
            shared,
        })
    }
}

fn extend_all(contract: Contract, parts: &[&[FieldDef]]) -> Result<Contract, ProtocolError> {
    parts.iter().try_fold(contract, |c, part| c.extend(part))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn names(codec: &PacketCodec) -> Vec<&'static str> {
        codec.contract().fields().iter().map(|f| f.name).collect()
    }

    #[test]
    fn test_system_single_injects_action_only() {
        let mut factory = PacketFactory::new(Namespace::GAME);
        let codec = factory
            .single(ActionId(3), "authenticate", Origin::System, &[mixin::TOKEN])
            .unwrap();
        assert_eq!(names(&codec), ["action", "token"]);
    }

    #[test]
    fn test_player_single_injects_time_and_player_id() {
        let mut factory = PacketFactory::new(Namespace::GAME);
        let codec = factory
            .single(ActionId(34), "forfeit", Origin::Player, &[])
            .unwrap();
        assert_eq!(names(&codec), ["action", "time", "player_id"]);
    }

    #[test]
    fn test_paired_layouts() {
        let mut factory = PacketFactory::new(Namespace::GAME);
        let pair = factory
            .paired(
                "cryo",
                ActionId(96),
                ActionId(97),
                &[mixin::PUP, mixin::TARGET, mixin::CELL_INDEX],
                &[],
            )
            .unwrap();
        assert_eq!(
            names(pair.use_codec()),
            ["action", "client_time", "action_id", "pup_id", "target_id", "cell_index"]
        );
        assert_eq!(
            names(pair.used_codec()),
            ["action", "server_time", "player_id", "action_id", "pup_id", "target_id", "cell_index"]
        );
    }

    #[test]
    fn test_duplicate_id_fails_at_construction() {
        let mut factory = PacketFactory::new(Namespace::GAME);
        factory
            .single(ActionId(1), "heartbeat", Origin::System, &[mixin::CLIENT_TIME])
            .unwrap();
        let err = factory
            .single(ActionId(1), "other", Origin::System, &[])
            .unwrap_err();
        assert_eq!(
            err,
            ProtocolError::DuplicateAction {
                action: ActionId(1),
                existing: "heartbeat",
                name: "other"
            }
        );
    }

    #[test]
    fn test_paired_collides_with_single() {
        let mut factory = PacketFactory::new(Namespace::GAME);
        factory
            .single(ActionId(65), "x", Origin::System, &[])
            .unwrap();
        assert!(matches!(
            factory.paired("set_cell", ActionId(64), ActionId(65), &[], &[]),
            Err(ProtocolError::DuplicateAction { .. })
        ));
        // The failed pair must not have claimed its use id.
        assert!(factory.single(ActionId(64), "y", Origin::System, &[]).is_ok());
    }

    #[test]
    fn test_paired_same_id_twice_rejected() {
        let mut factory = PacketFactory::new(Namespace::GAME);
        assert!(factory.paired("p", ActionId(70), ActionId(70), &[], &[]).is_err());
    }

    #[test]
    fn test_namespaces_are_independent() {
        let mut a = PacketFactory::new(Namespace::GAME);
        let mut b = PacketFactory::new(Namespace("replay"));
        assert!(a.single(ActionId(1), "x", Origin::System, &[]).is_ok());
        assert!(b.single(ActionId(1), "x", Origin::System, &[]).is_ok());
    }

    #[test]
    fn test_acknowledge_echoes_action_id_and_shared_fields() {
        let mut factory = PacketFactory::new(Namespace::GAME);
        let pair = factory
            .paired(
                "draw",
                ActionId(66),
                ActionId(67),
                &[mixin::SLOT],
                mixin::DRAWN,
            )
            .unwrap();

        let request = Payload::new(ActionId(66))
            .with(field::CLIENT_TIME, 500u32)
            .with(field::ACTION_ID, 12u32)
            .with(field::SLOT_INDEX, 1u8);
        let ack = pair.acknowledge(&request, 900, 7).unwrap();

        assert_eq!(ack.action(), ActionId(67));
        assert_eq!(ack.u32(field::SERVER_TIME).unwrap(), 900);
        assert_eq!(ack.u32(field::PLAYER_ID).unwrap(), 7);
        assert_eq!(ack.u32(field::ACTION_ID).unwrap(), 12);
        assert_eq!(ack.u8(field::SLOT_INDEX).unwrap(), 1);
        assert!(!ack.contains(field::CLIENT_TIME));
        // Extra fields are the caller's job.
        assert!(!ack.contains(field::PUP_ID));
    }

    #[test]
    fn test_acknowledge_rejects_foreign_request() {
        let mut factory = PacketFactory::new(Namespace::GAME);
        let pair = factory
            .paired("set_cell", ActionId(64), ActionId(65), &[mixin::CELL_INDEX], &[])
            .unwrap();
        let foreign = Payload::new(ActionId(96));
        assert!(matches!(
            pair.acknowledge(&foreign, 0, 0),
            Err(ProtocolError::ContractMismatch { .. })
        ));
    }
}
