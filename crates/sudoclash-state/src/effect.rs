//! Cell effects and the single rule that decides whether they block a write.
//!
//! The set of effect kinds is closed. Adding one means adding a match arm in
//! [`Effect::blocks_set_value`], and the compiler points at every place that
//! has to care.

use std::fmt;

use serde::{Deserialize, Serialize};

/// The three power-up elements.
///
/// Each element has a wire code (the `element` field of `PUP_DRAWN`) and one
/// effect kind that it leaves on a cell.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Element {
    Cryo,
    Pyro,
    Electro,
}

impl Element {
    pub const ALL: [Element; 3] = [Element::Cryo, Element::Pyro, Element::Electro];

    pub fn code(self) -> u8 {
        match self {
            Self::Cryo => 1,
            Self::Pyro => 2,
            Self::Electro => 3,
        }
    }

    pub fn from_code(code: u8) -> Option<Self> {
        Self::ALL.into_iter().find(|e| e.code() == code)
    }

    pub fn effect(self) -> EffectKind {
        match self {
            Self::Cryo => EffectKind::Frozen,
            Self::Pyro => EffectKind::Scorched,
            Self::Electro => EffectKind::Locked,
        }
    }
}

impl fmt::Display for Element {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Cryo => write!(f, "cryo"),
            Self::Pyro => write!(f, "pyro"),
            Self::Electro => write!(f, "electro"),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EffectKind {
    /// Cryo. Blocks writes for the duration of the freeze.
    Frozen,
    /// Electro. Blocks writes until diffused.
    Locked,
    /// Pyro. Marks a cell that was burned; never blocks.
    Scorched,
}

impl EffectKind {
    pub fn element(self) -> Element {
        match self {
            Self::Frozen => Element::Cryo,
            Self::Locked => Element::Electro,
            Self::Scorched => Element::Pyro,
        }
    }
}

impl fmt::Display for EffectKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Frozen => write!(f, "frozen"),
            Self::Locked => write!(f, "locked"),
            Self::Scorched => write!(f, "scorched"),
        }
    }
}

/// An effect active on a cell.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Effect {
    pub kind: EffectKind,
    pub started_at: u64,
    /// End of the effect, exclusive. `None` means it lasts until removed.
    pub last_until: Option<u64>,
}

impl Effect {
    pub fn new(kind: EffectKind, started_at: u64, last_until: Option<u64>) -> Self {
        Self {
            kind,
            started_at,
            last_until,
        }
    }

    /// An effect lasting `duration_ms` from `now`.
    pub fn timed(kind: EffectKind, now: u64, duration_ms: u64) -> Self {
        Self::new(kind, now, Some(now.saturating_add(duration_ms)))
    }

    /// Returns `true` if this effect forbids a write at `at`.
    ///
    /// The default rule blocks during `[started_at, last_until)`. An untimed
    /// write (`at == None`) is only blocked by effects with no end at all.
    pub fn blocks_set_value(&self, at: Option<u64>) -> bool {
        match self.kind {
            EffectKind::Scorched => false,
            EffectKind::Locked if self.last_until.is_none() => true,
            EffectKind::Frozen | EffectKind::Locked => match at {
                Some(t) => self.active_at(t),
                None => false,
            },
        }
    }

    /// Returns `true` if `t` falls inside `[started_at, last_until)`.
    pub fn active_at(&self, t: u64) -> bool {
        t >= self.started_at && self.last_until.is_none_or(|until| t < until)
    }

    /// Returns `true` once the effect has run out. Effects without an end
    /// never expire.
    pub fn expired_at(&self, now: u64) -> bool {
        self.last_until.is_some_and(|until| now >= until)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_frozen_blocks_inside_window_only() {
        let frozen = Effect::new(EffectKind::Frozen, 1_000, Some(4_000));
        assert!(!frozen.blocks_set_value(Some(999)));
        assert!(frozen.blocks_set_value(Some(1_000)));
        assert!(frozen.blocks_set_value(Some(3_999)));
        assert!(!frozen.blocks_set_value(Some(4_000)));
    }

    #[test]
    fn test_frozen_does_not_block_untimed_writes() {
        let frozen = Effect::new(EffectKind::Frozen, 0, Some(4_000));
        assert!(!frozen.blocks_set_value(None));
    }

    #[test]
    fn test_untimed_lock_blocks_everything() {
        let locked = Effect::new(EffectKind::Locked, 5_000, None);
        assert!(locked.blocks_set_value(Some(0)));
        assert!(locked.blocks_set_value(Some(u64::MAX)));
        assert!(locked.blocks_set_value(None));
    }

    #[test]
    fn test_timed_lock_follows_default_rule() {
        let locked = Effect::new(EffectKind::Locked, 100, Some(200));
        assert!(locked.blocks_set_value(Some(150)));
        assert!(!locked.blocks_set_value(Some(200)));
        assert!(!locked.blocks_set_value(None));
    }

    #[test]
    fn test_scorch_never_blocks() {
        let scorched = Effect::timed(EffectKind::Scorched, 0, 2_000);
        assert!(!scorched.blocks_set_value(Some(1)));
        assert!(!scorched.blocks_set_value(None));
    }

    #[test]
    fn test_expiry() {
        let timed = Effect::timed(EffectKind::Frozen, 10, 90);
        assert!(!timed.expired_at(99));
        assert!(timed.expired_at(100));
        assert!(!Effect::new(EffectKind::Locked, 0, None).expired_at(u64::MAX));
    }

    #[test]
    fn test_element_codes_round_trip() {
        for element in Element::ALL {
            assert_eq!(Element::from_code(element.code()), Some(element));
            assert_eq!(element.effect().element(), element);
        }
        assert_eq!(Element::from_code(0), None);
    }
}
