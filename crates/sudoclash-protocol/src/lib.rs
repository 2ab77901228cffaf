//! Binary wire protocol for Sudoclash.
//!
//! This crate defines how clients and servers talk to each other:
//!
//! - **Buffer and primitives** ([`ByteBuffer`], [`FieldKind`], [`Value`]):
//!   bounds-checked big-endian reads and writes.
//! - **Contracts** ([`Contract`], [`FieldDef`], [`mixin`]): the ordered
//!   field list a packet carries.
//! - **Codecs** ([`PacketCodec`], [`PacketFactory`], [`PacketPair`]): one
//!   action id plus one contract, built only by the factory.
//! - **Registry** ([`Registry`]): the startup-time table that dispatches
//!   incoming bytes to the right codec.
//! - **Errors** ([`ProtocolError`]): everything that can go wrong between
//!   bytes and a [`Payload`].
//!
//! # Architecture
//!
//! The protocol layer knows nothing about rooms, boards or connections. It
//! turns bytes into payloads and back:
//!
//! ```text
//! Transport (bytes) → Registry (Payload) → Room actor → State engine
//! ```

// ---------------------------------------------------------------------------
// Module declarations
// ---------------------------------------------------------------------------

pub mod action;
mod buffer;
mod codec;
pub mod contract;
mod error;
mod factory;
pub mod packets;
mod payload;
mod primitive;
mod registry;
mod types;

// ---------------------------------------------------------------------------
// Re-exports
// ---------------------------------------------------------------------------

pub use action::{ActionId, Domain, Namespace};
pub use buffer::ByteBuffer;
pub use codec::PacketCodec;
pub use contract::{Contract, FieldDef, field, mixin};
pub use error::ProtocolError;
pub use factory::{Origin, PacketFactory, PacketPair};
pub use packets::PacketDescriptor;
pub use payload::Payload;
pub use primitive::{FieldKind, Value};
pub use registry::Registry;
pub use types::{PlayerId, RoomId};
