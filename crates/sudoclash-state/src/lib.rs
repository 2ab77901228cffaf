//! Match state for Sudoclash.
//!
//! Boards, cells, effects and power-up slots, plus the rules that decide
//! when each of them may change. Every mutation is time-gated by the
//! server clock and goes through [`apply_action`].
//!
//! # Key types
//!
//! - [`Board`] / [`Cell`]: digits with per-cell and board-wide cooldowns
//! - [`Effect`] / [`EffectKind`]: what power-ups leave on cells
//! - [`PupSlot`] / [`HeldPup`]: drawn power-ups waiting to be used
//! - [`MatchState`]: one board and slot set per player
//! - [`RejectReason`]: why an action was refused

mod apply;
mod board;
mod cell;
pub mod config;
mod effect;
mod error;
mod puzzle;
mod slot;
mod state;

pub use apply::{ActionContext, Change, Command, StateDelta, apply_action};
pub use board::Board;
pub use cell::{Cell, MAX_VALUE};
pub use config::{MatchConfig, Mode, RuleConfig};
pub use effect::{Effect, EffectKind, Element};
pub use error::{PuzzleError, RejectReason};
pub use puzzle::Puzzle;
pub use slot::{HeldPup, PupSlot};
pub use state::{MatchState, PlayerState};
