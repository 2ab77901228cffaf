//! Rule constants and match configuration.

use serde::{Deserialize, Serialize};

use crate::Puzzle;

/// Time a cell stays locked after a successful timed write.
pub const CELL_COOLDOWN_MS: u64 = 10_000;

/// Time the whole board stays locked after a successful timed write.
pub const GLOBAL_COOLDOWN_MS: u64 = 5_000;

/// Freeze length per cryo level.
pub const FREEZE_PER_LEVEL_MS: u64 = 3_000;

/// How long a pyro scorch mark stays on a cell.
pub const SCORCH_MS: u64 = 2_000;

/// Cooldown a slot enters after its power-up is used or it diffuses.
pub const SLOT_COOLDOWN_MS: u64 = 8_000;

/// How long a drawn power-up can be held before it is discarded.
pub const PUP_LIFETIME_MS: u64 = 30_000;

pub const SLOT_COUNT: usize = 3;

pub const MAX_PUP_LEVEL: u8 = 3;

// ---------------------------------------------------------------------------
// RuleConfig
// ---------------------------------------------------------------------------

/// Timing and sizing rules for one match.
///
/// Every field falls back to its default when missing from a config file.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct RuleConfig {
    pub cell_cooldown_ms: u64,
    pub global_cooldown_ms: u64,
    pub freeze_per_level_ms: u64,
    pub scorch_ms: u64,
    pub slot_cooldown_ms: u64,
    pub pup_lifetime_ms: u64,
    pub slot_count: usize,
    /// Draws pick a level in `1..=max_pup_level`.
    pub max_pup_level: u8,
}

impl Default for RuleConfig {
    fn default() -> Self {
        Self {
            cell_cooldown_ms: CELL_COOLDOWN_MS,
            global_cooldown_ms: GLOBAL_COOLDOWN_MS,
            freeze_per_level_ms: FREEZE_PER_LEVEL_MS,
            scorch_ms: SCORCH_MS,
            slot_cooldown_ms: SLOT_COOLDOWN_MS,
            pup_lifetime_ms: PUP_LIFETIME_MS,
            slot_count: SLOT_COUNT,
            max_pup_level: MAX_PUP_LEVEL,
        }
    }
}

// ---------------------------------------------------------------------------
// Mode
// ---------------------------------------------------------------------------

/// What kind of room a match runs in.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum Mode {
    /// Head-to-head. Power-ups target the opponent.
    #[default]
    Match,
    /// Solo. Power-ups target the player themself, and the practice
    /// action ids are accepted.
    Practice,
}

impl std::fmt::Display for Mode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Match => write!(f, "match"),
            Self::Practice => write!(f, "practice"),
        }
    }
}

// ---------------------------------------------------------------------------
// MatchConfig
// ---------------------------------------------------------------------------

/// Everything needed to start a [`MatchState`](crate::MatchState).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct MatchConfig {
    pub rules: RuleConfig,
    pub puzzle: Puzzle,
    /// Seeds the power-up draw RNG, so a match can be replayed.
    pub seed: u32,
}

impl Default for MatchConfig {
    fn default() -> Self {
        Self {
            rules: RuleConfig::default(),
            puzzle: Puzzle::classic(),
            seed: 0,
        }
    }
}
