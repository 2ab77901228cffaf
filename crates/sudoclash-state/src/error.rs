//! Error types for the state layer.
//!
//! [`RejectReason`] is not a failure of the server: it is the normal answer
//! to an action the rules forbid. The room turns it into an
//! `ACTION_REJECTED` packet carrying [`RejectReason::code`].

use sudoclash_protocol::{ActionId, PlayerId, ProtocolError};

use crate::EffectKind;

/// Why an action was refused. No state is changed when one is returned.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum RejectReason {
    #[error("value {0} is outside 0..=9")]
    ValueOutOfRange(u8),

    #[error("cell {0} does not exist")]
    CellOutOfRange(usize),

    #[error("cell {0} is a given and cannot change")]
    FixedCell(usize),

    #[error("cell {cell} is cooling down until {until}")]
    CellCooldown { cell: usize, until: u64 },

    #[error("board is cooling down until {until}")]
    GlobalCooldown { until: u64 },

    #[error("cell {cell} is blocked by a {effect} effect")]
    EffectBlocked { cell: usize, effect: EffectKind },

    #[error("slot {0} does not exist")]
    SlotOutOfRange(usize),

    #[error("slot {slot} is cooling down until {until}")]
    SlotCooldown { slot: usize, until: u64 },

    #[error("slot {0} already holds a power-up")]
    SlotOccupied(usize),

    #[error("power-up {0} is not held")]
    PupNotHeld(u8),

    #[error("player {0} cannot be targeted")]
    InvalidTarget(u32),

    #[error("no matching effect to diffuse on cell {0}")]
    NothingToDiffuse(usize),

    #[error("action {0} is not available in this room mode")]
    WrongMode(ActionId),

    #[error("{0} is not playing in this match")]
    NotAPlayer(PlayerId),

    #[error("the match has not started")]
    NotStarted,

    #[error("the match is over")]
    MatchOver,

    #[error("action {0} does not change match state")]
    Unsupported(ActionId),

    #[error("malformed action: {0}")]
    Malformed(#[from] ProtocolError),
}

impl RejectReason {
    /// Stable wire code for `ACTION_REJECTED`.
    pub fn code(&self) -> u8 {
        match self {
            Self::ValueOutOfRange(_) => 1,
            Self::CellOutOfRange(_) => 2,
            Self::FixedCell(_) => 3,
            Self::CellCooldown { .. } => 4,
            Self::GlobalCooldown { .. } => 5,
            Self::EffectBlocked { .. } => 6,
            Self::SlotOutOfRange(_) => 7,
            Self::SlotCooldown { .. } => 8,
            Self::SlotOccupied(_) => 9,
            Self::PupNotHeld(_) => 10,
            Self::InvalidTarget(_) => 11,
            Self::NothingToDiffuse(_) => 12,
            Self::WrongMode(_) => 13,
            Self::NotAPlayer(_) => 14,
            Self::MatchOver => 15,
            Self::Unsupported(_) => 16,
            Self::Malformed(_) => 17,
            Self::NotStarted => 18,
        }
    }
}

/// A puzzle definition that cannot be played.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum PuzzleError {
    #[error("{0} cells do not form a square board of side 1..=9")]
    BadLength(usize),

    #[error("invalid character {found:?} at cell {index}")]
    BadCharacter { index: usize, found: char },

    #[error("solution has {found} cells, puzzle has {expected}")]
    SolutionLength { expected: usize, found: usize },

    #[error("solution contradicts the given at cell {0}")]
    SolutionMismatch(usize),
}
