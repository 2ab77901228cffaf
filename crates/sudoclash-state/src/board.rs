//! A player's board: cells plus the board-wide cooldown.

use serde::{Deserialize, Serialize};

use crate::config::{CELL_COOLDOWN_MS, GLOBAL_COOLDOWN_MS};
use crate::{Cell, Puzzle, RejectReason, RuleConfig};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Board {
    side: usize,
    cells: Vec<Cell>,
    global_last_cooldown_end: u64,
    cell_cooldown_ms: u64,
    global_cooldown_ms: u64,
}

impl Board {
    /// An empty `side` x `side` board with the default cooldowns.
    pub fn new(side: usize) -> Self {
        Self {
            side,
            cells: vec![Cell::default(); side * side],
            global_last_cooldown_end: 0,
            cell_cooldown_ms: CELL_COOLDOWN_MS,
            global_cooldown_ms: GLOBAL_COOLDOWN_MS,
        }
    }

    /// A board holding the puzzle's givens as fixed cells.
    pub fn from_puzzle(puzzle: &Puzzle, rules: &RuleConfig) -> Self {
        let cells = puzzle
            .givens()
            .iter()
            .map(|&given| Cell::new(given, given != 0))
            .collect();
        Self {
            side: puzzle.side(),
            cells,
            global_last_cooldown_end: 0,
            cell_cooldown_ms: rules.cell_cooldown_ms,
            global_cooldown_ms: rules.global_cooldown_ms,
        }
    }

    pub fn side(&self) -> usize {
        self.side
    }

    pub fn len(&self) -> usize {
        self.cells.len()
    }

    pub fn is_empty(&self) -> bool {
        self.cells.is_empty()
    }

    pub fn cells(&self) -> &[Cell] {
        &self.cells
    }

    pub fn cell(&self, index: usize) -> Option<&Cell> {
        self.cells.get(index)
    }

    pub(crate) fn cell_mut(&mut self, index: usize) -> Result<&mut Cell, RejectReason> {
        self.cells
            .get_mut(index)
            .ok_or(RejectReason::CellOutOfRange(index))
    }

    pub(crate) fn existing_cell(&self, index: usize) -> Result<&Cell, RejectReason> {
        self.cells.get(index).ok_or(RejectReason::CellOutOfRange(index))
    }

    /// No timed write is accepted before this instant.
    pub fn global_last_cooldown_end(&self) -> u64 {
        self.global_last_cooldown_end
    }

    /// Writes `value` into cell `index`.
    ///
    /// A timed write must clear both the cell's and the board's cooldown, and
    /// on success starts both again from `at`.
    pub fn set_cell(&mut self, index: usize, value: u8, at: Option<u64>) -> Result<(), RejectReason> {
        let global_until = self.global_last_cooldown_end;
        let cell_cooldown = self.cell_cooldown_ms;
        let cell = self.cell_mut(index)?;
        cell.check_set(index, value, at, global_until)?;
        cell.commit(value, at, cell_cooldown);

        if let Some(t) = at {
            self.global_last_cooldown_end = t.saturating_add(self.global_cooldown_ms);
        }
        Ok(())
    }

    /// Drops every effect that has run out. Returns how many were removed.
    pub fn expire_effects(&mut self, now: u64) -> usize {
        self.cells.iter_mut().map(|c| c.expire_effects(now)).sum()
    }

    /// Returns `true` when every cell holds the solution's digit.
    pub fn is_solved(&self, solution: &[u8]) -> bool {
        solution.len() == self.cells.len()
            && self.cells.iter().zip(solution).all(|(c, &s)| c.value == s)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{Effect, EffectKind};

    #[test]
    fn test_new_board_is_empty() {
        let board = Board::new(9);
        assert_eq!(board.len(), 81);
        assert!(board.cells().iter().all(Cell::is_empty));
        assert_eq!(board.global_last_cooldown_end(), 0);
    }

    #[test]
    fn test_from_puzzle_fixes_givens() {
        let board = Board::from_puzzle(&Puzzle::classic(), &RuleConfig::default());
        assert_eq!(board.cell(0).unwrap().value(), 5);
        assert!(board.cell(0).unwrap().is_fixed());
        assert!(!board.cell(2).unwrap().is_fixed());
    }

    #[test]
    fn test_set_cell_out_of_range_index() {
        let mut board = Board::new(9);
        assert_eq!(board.set_cell(81, 1, None), Err(RejectReason::CellOutOfRange(81)));
    }

    #[test]
    fn test_rejected_write_leaves_global_cooldown() {
        let mut board = Board::new(9);
        board.cell_mut(3).unwrap().add_effect(Effect::new(EffectKind::Locked, 0, None));
        assert!(board.set_cell(3, 1, Some(100)).is_err());
        assert_eq!(board.global_last_cooldown_end(), 0);
    }

    #[test]
    fn test_custom_cooldowns_from_rules() {
        let rules = RuleConfig {
            cell_cooldown_ms: 50,
            global_cooldown_ms: 20,
            ..RuleConfig::default()
        };
        let mut board = Board::from_puzzle(&Puzzle::classic(), &rules);
        board.set_cell(2, 4, Some(1_000)).unwrap();
        assert_eq!(board.cell(2).unwrap().last_cooldown_end(), 1_050);
        assert_eq!(board.global_last_cooldown_end(), 1_020);
    }

    #[test]
    fn test_is_solved() {
        let puzzle = Puzzle::classic();
        let solution = puzzle.solution().unwrap();
        let mut board = Board::from_puzzle(&puzzle, &RuleConfig::default());
        assert!(!board.is_solved(solution));

        for (i, &digit) in solution.iter().enumerate() {
            if !board.cell(i).unwrap().is_fixed() {
                board.set_cell(i, digit, None).unwrap();
            }
        }
        assert!(board.is_solved(solution));
        assert!(!board.is_solved(&solution[..80]));
    }
}
