//! A single board cell.

use serde::{Deserialize, Serialize};

use crate::config::CELL_COOLDOWN_MS;
use crate::{Effect, RejectReason};

/// Largest digit a cell can hold. `0` means empty.
pub const MAX_VALUE: u8 = 9;

#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct Cell {
    pub(crate) value: u8,
    pub(crate) fixed: bool,
    pub(crate) last_cooldown_end: u64,
    pub(crate) effects: Vec<Effect>,
}

impl Cell {
    pub fn new(value: u8, fixed: bool) -> Self {
        Self {
            value,
            fixed,
            ..Self::default()
        }
    }

    pub fn value(&self) -> u8 {
        self.value
    }

    pub fn is_fixed(&self) -> bool {
        self.fixed
    }

    pub fn is_empty(&self) -> bool {
        self.value == 0
    }

    pub fn last_cooldown_end(&self) -> u64 {
        self.last_cooldown_end
    }

    /// Active effects, oldest first.
    pub fn effects(&self) -> &[Effect] {
        &self.effects
    }

    /// Writes `value`, using the standard cell cooldown and no board-wide
    /// cooldown.
    ///
    /// With `at`, the write is time-gated and starts a new cooldown. Without
    /// it (bootstrap, replay) only the value checks and unbounded effects
    /// apply.
    pub fn set(&mut self, value: u8, at: Option<u64>) -> Result<(), RejectReason> {
        self.check_set(0, value, at, 0)?;
        self.commit(value, at, CELL_COOLDOWN_MS);
        Ok(())
    }

    /// Runs every write check in order without changing anything.
    ///
    /// `index` is only used to label the rejection. `global_until` is the
    /// board's cooldown end.
    pub fn check_set(
        &self,
        index: usize,
        value: u8,
        at: Option<u64>,
        global_until: u64,
    ) -> Result<(), RejectReason> {
        if value > MAX_VALUE {
            return Err(RejectReason::ValueOutOfRange(value));
        }
        if self.fixed {
            return Err(RejectReason::FixedCell(index));
        }
        if let Some(t) = at {
            if t < self.last_cooldown_end {
                return Err(RejectReason::CellCooldown {
                    cell: index,
                    until: self.last_cooldown_end,
                });
            }
            if t < global_until {
                return Err(RejectReason::GlobalCooldown { until: global_until });
            }
        }
        if let Some(effect) = self.effects.iter().find(|e| e.blocks_set_value(at)) {
            return Err(RejectReason::EffectBlocked {
                cell: index,
                effect: effect.kind,
            });
        }
        Ok(())
    }

    pub(crate) fn commit(&mut self, value: u8, at: Option<u64>, cooldown_ms: u64) {
        self.value = value;
        if let Some(t) = at {
            self.last_cooldown_end = t.saturating_add(cooldown_ms);
        }
    }

    pub(crate) fn add_effect(&mut self, effect: Effect) {
        self.effects.push(effect);
    }

    /// Empties the cell without touching its cooldown.
    pub(crate) fn clear(&mut self) {
        self.value = 0;
    }

    /// Removes effects matching `predicate` and returns how many went.
    pub(crate) fn remove_effects(&mut self, predicate: impl Fn(&Effect) -> bool) -> usize {
        let before = self.effects.len();
        self.effects.retain(|e| !predicate(e));
        before - self.effects.len()
    }

    pub(crate) fn expire_effects(&mut self, now: u64) -> usize {
        self.remove_effects(|e| e.expired_at(now))
    }
}
