//! Room lifecycle management for Sudoclash.
//!
//! Each room runs as an isolated Tokio task (actor model) that owns one
//! match: its players, their outbound channels and the authoritative
//! [`MatchState`](sudoclash_state::MatchState).
//!
//! # Key types
//!
//! - [`RoomManager`]: creates and destroys rooms, routes players
//! - [`RoomHandle`]: send commands to a running room actor
//! - [`RoomState`]: lifecycle state machine
//! - [`Clock`]: where rooms read the time from

mod clock;
mod config;
mod error;
mod manager;
mod room;

pub use clock::{Clock, ManualClock, SystemClock};
pub use config::{RoomConfig, RoomState};
pub use error::RoomError;
pub use manager::RoomManager;
pub use room::{PlayerSender, RoomContext, RoomHandle, RoomInfo};
