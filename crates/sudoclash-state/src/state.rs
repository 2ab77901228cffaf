//! The authoritative state of one match.

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use sudoclash_protocol::PlayerId;

use crate::{Board, Element, MatchConfig, Mode, PupSlot, RejectReason, RuleConfig};

/// One participant's side of the match.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PlayerState {
    pub(crate) id: PlayerId,
    pub(crate) board: Board,
    pub(crate) slots: Vec<PupSlot>,
    pub(crate) next_pup_id: u8,
}

impl PlayerState {
    pub fn id(&self) -> PlayerId {
        self.id
    }

    pub fn board(&self) -> &Board {
        &self.board
    }

    pub fn slots(&self) -> &[PupSlot] {
        &self.slots
    }

    pub(crate) fn slot(&self, index: usize) -> Result<&PupSlot, RejectReason> {
        self.slots.get(index).ok_or(RejectReason::SlotOutOfRange(index))
    }

    pub(crate) fn slot_mut(&mut self, index: usize) -> Result<&mut PupSlot, RejectReason> {
        self.slots
            .get_mut(index)
            .ok_or(RejectReason::SlotOutOfRange(index))
    }

    /// Hands out the next power-up id. Ids wrap after 255 and skip 0 and
    /// any id a slot still holds.
    pub(crate) fn take_pup_id(&mut self) -> u8 {
        let mut id = self.next_pup_id;
        for _ in 0..=u8::MAX {
            id = self.next_pup_id;
            self.next_pup_id = self.next_pup_id.wrapping_add(1);
            if id != 0 && !self.holds_pup(id) {
                break;
            }
        }
        id
    }

    fn holds_pup(&self, pup_id: u8) -> bool {
        self.slots
            .iter()
            .any(|slot| slot.held.is_some_and(|pup| pup.pup_id == pup_id))
    }
}

/// Everything the room actor mutates through
/// [`apply_action`](crate::apply_action).
///
/// Each player has their own board built from the same puzzle. Power-up
/// draws come from an RNG seeded by the match seed, so the same seed and
/// the same action sequence always give the same match.
#[derive(Debug)]
pub struct MatchState {
    rules: RuleConfig,
    solution: Option<Vec<u8>>,
    seed: u32,
    mode: Mode,
    pub(crate) players: Vec<PlayerState>,
    rng: StdRng,
    winner: Option<PlayerId>,
    finished: bool,
}

impl MatchState {
    pub fn new(config: &MatchConfig, mode: Mode, players: &[PlayerId]) -> Self {
        let players = players
            .iter()
            .map(|&id| PlayerState {
                id,
                board: Board::from_puzzle(&config.puzzle, &config.rules),
                slots: PupSlot::starting_set(config.rules.slot_count),
                next_pup_id: 1,
            })
            .collect();

        Self {
            rules: config.rules.clone(),
            solution: config.puzzle.solution().map(<[u8]>::to_vec),
            seed: config.seed,
            mode,
            players,
            rng: StdRng::seed_from_u64(u64::from(config.seed)),
            winner: None,
            finished: false,
        }
    }

    pub fn rules(&self) -> &RuleConfig {
        &self.rules
    }

    pub fn mode(&self) -> Mode {
        self.mode
    }

    pub fn seed(&self) -> u32 {
        self.seed
    }

    pub fn solution(&self) -> Option<&[u8]> {
        self.solution.as_deref()
    }

    /// Player ids in join order.
    pub fn player_ids(&self) -> impl Iterator<Item = PlayerId> + '_ {
        self.players.iter().map(|p| p.id)
    }

    pub fn player(&self, id: PlayerId) -> Option<&PlayerState> {
        self.players.iter().find(|p| p.id == id)
    }

    pub fn board(&self, id: PlayerId) -> Option<&Board> {
        self.player(id).map(PlayerState::board)
    }

    pub fn winner(&self) -> Option<PlayerId> {
        self.winner
    }

    pub fn is_finished(&self) -> bool {
        self.finished
    }

    pub(crate) fn index_of(&self, id: PlayerId) -> Result<usize, RejectReason> {
        self.players
            .iter()
            .position(|p| p.id == id)
            .ok_or(RejectReason::NotAPlayer(id))
    }

    /// Ends the match. Later actions are rejected with `MatchOver`.
    pub fn finish(&mut self, winner: Option<PlayerId>) {
        self.finished = true;
        self.winner = winner;
        tracing::info!(winner = ?winner.map(|w| w.0), "match finished");
    }

    /// `loser` gives up. In a head-to-head match the first other player
    /// wins; in practice there is no winner.
    pub fn forfeit(&mut self, loser: PlayerId) -> Result<Option<PlayerId>, RejectReason> {
        if self.finished {
            return Err(RejectReason::MatchOver);
        }
        self.index_of(loser)?;
        let winner = match self.mode {
            Mode::Match => self.player_ids().find(|&id| id != loser),
            Mode::Practice => None,
        };
        self.finish(winner);
        Ok(winner)
    }

    /// Drops expired effects and power-ups everywhere.
    pub fn prune(&mut self, now: u64) {
        let lifetime = self.rules.pup_lifetime_ms;
        for player in &mut self.players {
            player.board.expire_effects(now);
            for slot in &mut player.slots {
                if let Some(pup) = slot.expire(now, lifetime) {
                    tracing::debug!(
                        player_id = %player.id,
                        pup_id = pup.pup_id,
                        "held power-up expired"
                    );
                }
            }
        }
    }

    /// Picks the element and level of a new power-up.
    pub(crate) fn roll_pup(&mut self) -> (Element, u8) {
        let element = Element::ALL[self.rng.random_range(0..Element::ALL.len())];
        let level = self.rng.random_range(1..=self.rules.max_pup_level.max(1));
        (element, level)
    }

    /// Marks the match won if `player`'s board matches the solution.
    pub(crate) fn check_solved(&mut self, player: usize) -> bool {
        let solved = self
            .solution
            .as_deref()
            .is_some_and(|s| self.players[player].board.is_solved(s));
        if solved {
            let id = self.players[player].id;
            self.finish(Some(id));
        }
        solved
    }
}
