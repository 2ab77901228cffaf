//! The single entry point that changes a match: [`apply_action`].
//!
//! An action goes through three stages:
//!
//! ```text
//! Payload ──parse──▶ Command ──validate──▶ (mutate) ──▶ StateDelta
//!            │                   │
//!        Malformed /        RejectReason,
//!        Unsupported        state untouched
//! ```
//!
//! Every check runs before the first mutation, so a rejected action never
//! leaves a half-applied change behind. Time always comes from
//! [`ActionContext::now`], the server clock. The `client_time` a packet
//! carries is never trusted for gating.

use sudoclash_protocol::action::{cryo, electro, legacy, mechanics, pyro};
use sudoclash_protocol::{ActionId, Domain, Payload, PlayerId, field};

use crate::{Effect, EffectKind, Element, HeldPup, MatchState, Mode, RejectReason};

/// Who is acting, and when according to the server.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ActionContext {
    pub sender: PlayerId,
    /// Milliseconds on the room clock.
    pub now: u64,
}

// ---------------------------------------------------------------------------
// Command
// ---------------------------------------------------------------------------

/// A state-changing action, parsed out of its payload.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Command {
    SetCell {
        cell: usize,
        value: u8,
    },
    DrawPup {
        slot: usize,
    },
    Diffuse {
        slot: usize,
        cell: usize,
    },
    UsePup {
        element: Element,
        pup_id: u8,
        target: PlayerId,
        cell: usize,
    },
}

impl Command {
    /// Reads the command a payload asks for.
    ///
    /// Match and practice ids map to the same commands; the mode check
    /// happens in [`apply_action`].
    pub fn from_payload(payload: &Payload) -> Result<Self, RejectReason> {
        let cell = || payload.u8(field::CELL_INDEX).map(usize::from);
        let slot = || payload.u8(field::SLOT_INDEX).map(usize::from);

        let command = match payload.action() {
            mechanics::SET_CELL | legacy::SET_CELL => Self::SetCell {
                cell: cell()?,
                value: payload.u8(field::VALUE)?,
            },
            mechanics::DRAW_PUP => Self::DrawPup { slot: slot()? },
            mechanics::DIFFUSE => Self::Diffuse {
                slot: slot()?,
                cell: cell()?,
            },
            cryo::USE_CRYO | legacy::USE_CRYO => Self::use_pup(Element::Cryo, payload)?,
            pyro::USE_PYRO | legacy::USE_PYRO => Self::use_pup(Element::Pyro, payload)?,
            electro::USE_ELECTRO | legacy::USE_ELECTRO => {
                Self::use_pup(Element::Electro, payload)?
            }
            other => return Err(RejectReason::Unsupported(other)),
        };
        Ok(command)
    }

    fn use_pup(element: Element, payload: &Payload) -> Result<Self, RejectReason> {
        Ok(Self::UsePup {
            element,
            pup_id: payload.u8(field::PUP_ID)?,
            target: PlayerId(payload.u32(field::TARGET_ID)?),
            cell: usize::from(payload.u8(field::CELL_INDEX)?),
        })
    }
}

// ---------------------------------------------------------------------------
// StateDelta
// ---------------------------------------------------------------------------

/// One observable consequence of an applied action.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Change {
    CellSet {
        owner: PlayerId,
        cell: usize,
        value: u8,
        cooldown_until: u64,
    },
    GlobalCooldown {
        owner: PlayerId,
        until: u64,
    },
    CellCleared {
        owner: PlayerId,
        cell: usize,
    },
    EffectApplied {
        owner: PlayerId,
        cell: usize,
        effect: Effect,
    },
    EffectsRemoved {
        owner: PlayerId,
        cell: usize,
        count: usize,
    },
    PupDrawn {
        slot: usize,
        pup: HeldPup,
    },
    PupConsumed {
        slot: usize,
        pup_id: u8,
    },
    SlotCooldown {
        slot: usize,
        until: u64,
    },
    BoardSolved {
        owner: PlayerId,
    },
}

/// What an accepted action changed, in the order it happened.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StateDelta {
    pub player: PlayerId,
    pub action: ActionId,
    pub changes: Vec<Change>,
}

impl StateDelta {
    fn new(player: PlayerId, action: ActionId) -> Self {
        Self {
            player,
            action,
            changes: Vec::new(),
        }
    }

    fn push(&mut self, change: Change) {
        self.changes.push(change);
    }

    /// The player whose board got solved by this action, if any.
    pub fn winner(&self) -> Option<PlayerId> {
        self.changes.iter().find_map(|c| match c {
            Change::BoardSolved { owner } => Some(*owner),
            _ => None,
        })
    }

    /// The power-up a draw produced.
    pub fn drawn(&self) -> Option<&HeldPup> {
        self.changes.iter().find_map(|c| match c {
            Change::PupDrawn { pup, .. } => Some(pup),
            _ => None,
        })
    }

    /// Number of effects a diffuse removed.
    pub fn removed(&self) -> Option<usize> {
        self.changes.iter().find_map(|c| match c {
            Change::EffectsRemoved { count, .. } => Some(*count),
            _ => None,
        })
    }
}

// ---------------------------------------------------------------------------
// apply_action
// ---------------------------------------------------------------------------

/// Applies one player action to `state`.
///
/// # Errors
/// Returns the first rule the action breaks. `state` is unchanged apart
/// from expired effects and power-ups being dropped.
pub fn apply_action(
    state: &mut MatchState,
    payload: &Payload,
    ctx: ActionContext,
) -> Result<StateDelta, RejectReason> {
    let action = payload.action();
    if state.is_finished() {
        return Err(RejectReason::MatchOver);
    }
    if state.mode() == Mode::Match && Domain::of(action) == Some(Domain::LegacyMechanics) {
        return Err(RejectReason::WrongMode(action));
    }
    let command = Command::from_payload(payload)?;
    let actor = state.index_of(ctx.sender)?;
    state.prune(ctx.now);

    let mut delta = StateDelta::new(ctx.sender, action);
    match command {
        Command::SetCell { cell, value } => set_cell(state, actor, cell, value, ctx, &mut delta)?,
        Command::DrawPup { slot } => draw_pup(state, actor, slot, ctx, &mut delta)?,
        Command::Diffuse { slot, cell } => diffuse(state, actor, slot, cell, ctx, &mut delta)?,
        Command::UsePup {
            element,
            pup_id,
            target,
            cell,
        } => use_pup(state, actor, element, pup_id, target, cell, ctx, &mut delta)?,
    }

    tracing::debug!(
        player_id = %ctx.sender,
        %action,
        now = ctx.now,
        changes = delta.changes.len(),
        "action applied"
    );
    Ok(delta)
}

fn set_cell(
    state: &mut MatchState,
    actor: usize,
    cell: usize,
    value: u8,
    ctx: ActionContext,
    delta: &mut StateDelta,
) -> Result<(), RejectReason> {
    let board = &mut state.players[actor].board;
    board.set_cell(cell, value, Some(ctx.now))?;

    delta.push(Change::CellSet {
        owner: ctx.sender,
        cell,
        value,
        cooldown_until: board.existing_cell(cell)?.last_cooldown_end(),
    });
    delta.push(Change::GlobalCooldown {
        owner: ctx.sender,
        until: board.global_last_cooldown_end(),
    });

    if state.check_solved(actor) {
        delta.push(Change::BoardSolved { owner: ctx.sender });
    }
    Ok(())
}

fn draw_pup(
    state: &mut MatchState,
    actor: usize,
    slot: usize,
    ctx: ActionContext,
    delta: &mut StateDelta,
) -> Result<(), RejectReason> {
    let current = state.players[actor].slot(slot)?;
    current.ensure_ready(slot, ctx.now)?;
    if current.held().is_some() {
        return Err(RejectReason::SlotOccupied(slot));
    }

    let (element, level) = state.roll_pup();
    let player = &mut state.players[actor];
    let pup = HeldPup {
        pup_id: player.take_pup_id(),
        element,
        level,
        obtained_at: ctx.now,
    };
    player.slot_mut(slot)?.held = Some(pup);

    delta.push(Change::PupDrawn { slot, pup });
    Ok(())
}

fn diffuse(
    state: &mut MatchState,
    actor: usize,
    slot: usize,
    cell: usize,
    ctx: ActionContext,
    delta: &mut StateDelta,
) -> Result<(), RejectReason> {
    let cooldown_ms = state.rules().slot_cooldown_ms;
    let player = &mut state.players[actor];
    let current = player.slot(slot)?;
    current.ensure_ready(slot, ctx.now)?;
    let element = current.diffuse_type();

    // Removing nothing is not a mutation, so the rejection below is clean.
    let count = player
        .board
        .cell_mut(cell)?
        .remove_effects(|e| e.kind.element() == element);
    if count == 0 {
        return Err(RejectReason::NothingToDiffuse(cell));
    }
    let until = player.slot_mut(slot)?.start_cooldown(ctx.now, cooldown_ms);

    delta.push(Change::EffectsRemoved {
        owner: ctx.sender,
        cell,
        count,
    });
    delta.push(Change::SlotCooldown { slot, until });
    Ok(())
}

#[allow(clippy::too_many_arguments)]
fn use_pup(
    state: &mut MatchState,
    actor: usize,
    element: Element,
    pup_id: u8,
    target: PlayerId,
    cell: usize,
    ctx: ActionContext,
    delta: &mut StateDelta,
) -> Result<(), RejectReason> {
    let rules = state.rules().clone();

    let (slot, level) = {
        let player = &state.players[actor];
        let (slot, pup) = player
            .slots()
            .iter()
            .enumerate()
            .find_map(|(i, s)| s.held().filter(|p| p.pup_id == pup_id).map(|p| (i, *p)))
            .filter(|(_, p)| p.element == element)
            .ok_or(RejectReason::PupNotHeld(pup_id))?;
        player.slot(slot)?.ensure_ready(slot, ctx.now)?;
        (slot, pup.level)
    };

    let target_index = state
        .index_of(target)
        .map_err(|_| RejectReason::InvalidTarget(target.0))?;
    let allowed = match state.mode() {
        Mode::Match => target_index != actor,
        Mode::Practice => target_index == actor,
    };
    if !allowed {
        return Err(RejectReason::InvalidTarget(target.0));
    }
    if state.players[target_index].board.existing_cell(cell)?.is_fixed() {
        return Err(RejectReason::FixedCell(cell));
    }

    let effect = match element {
        Element::Cryo => Effect::timed(
            EffectKind::Frozen,
            ctx.now,
            rules.freeze_per_level_ms.saturating_mul(u64::from(level)),
        ),
        Element::Pyro => Effect::timed(EffectKind::Scorched, ctx.now, rules.scorch_ms),
        Element::Electro => Effect::new(EffectKind::Locked, ctx.now, None),
    };

    let target_cell = state.players[target_index].board.cell_mut(cell)?;
    if element == Element::Pyro && !target_cell.is_empty() {
        target_cell.clear();
        delta.push(Change::CellCleared { owner: target, cell });
    }
    target_cell.add_effect(effect);
    delta.push(Change::EffectApplied {
        owner: target,
        cell,
        effect,
    });

    let player_slot = state.players[actor].slot_mut(slot)?;
    player_slot.consume(ctx.now, rules.slot_cooldown_ms);
    delta.push(Change::PupConsumed { slot, pup_id });
    delta.push(Change::SlotCooldown {
        slot,
        until: player_slot.last_cooldown_end(),
    });

    tracing::info!(
        player_id = %ctx.sender,
        target = %target,
        %element,
        level,
        cell,
        "power-up used"
    );
    Ok(())
}
