//! Power-up slots.

use serde::{Deserialize, Serialize};

use crate::{Element, RejectReason};

/// A power-up sitting in a slot, waiting to be used.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct HeldPup {
    pub pup_id: u8,
    pub element: Element,
    pub level: u8,
    pub obtained_at: u64,
}

impl HeldPup {
    pub fn expires_at(&self, lifetime_ms: u64) -> u64 {
        self.obtained_at.saturating_add(lifetime_ms)
    }
}

/// One of a player's power-up slots.
///
/// Each slot can diffuse one element, fixed when the match starts. Slot `i`
/// diffuses `Element::ALL[i % 3]`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PupSlot {
    pub(crate) diffuse_type: Element,
    pub(crate) last_cooldown_end: u64,
    pub(crate) held: Option<HeldPup>,
}

impl PupSlot {
    pub fn new(diffuse_type: Element) -> Self {
        Self {
            diffuse_type,
            last_cooldown_end: 0,
            held: None,
        }
    }

    /// `count` empty slots with diffuse types cycling through the elements.
    pub fn starting_set(count: usize) -> Vec<Self> {
        Element::ALL
            .into_iter()
            .cycle()
            .take(count)
            .map(Self::new)
            .collect()
    }

    pub fn diffuse_type(&self) -> Element {
        self.diffuse_type
    }

    pub fn last_cooldown_end(&self) -> u64 {
        self.last_cooldown_end
    }

    pub fn held(&self) -> Option<&HeldPup> {
        self.held.as_ref()
    }

    /// Fails with `SlotCooldown` while the slot is cooling down.
    pub fn ensure_ready(&self, index: usize, now: u64) -> Result<(), RejectReason> {
        if now < self.last_cooldown_end {
            return Err(RejectReason::SlotCooldown {
                slot: index,
                until: self.last_cooldown_end,
            });
        }
        Ok(())
    }

    /// Starts the cooldown and returns when it ends.
    pub(crate) fn start_cooldown(&mut self, now: u64, cooldown_ms: u64) -> u64 {
        self.last_cooldown_end = now.saturating_add(cooldown_ms);
        self.last_cooldown_end
    }

    /// Empties the slot and starts its cooldown.
    pub(crate) fn consume(&mut self, now: u64, cooldown_ms: u64) -> Option<HeldPup> {
        self.start_cooldown(now, cooldown_ms);
        self.held.take()
    }

    /// Discards the held power-up if it outlived `lifetime_ms`.
    pub(crate) fn expire(&mut self, now: u64, lifetime_ms: u64) -> Option<HeldPup> {
        match self.held {
            Some(pup) if now >= pup.expires_at(lifetime_ms) => self.held.take(),
            _ => None,
        }
    }
}
