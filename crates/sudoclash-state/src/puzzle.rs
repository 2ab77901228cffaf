//! Puzzle definitions.

use serde::{Deserialize, Serialize};

use crate::PuzzleError;

/// The givens of a puzzle and, optionally, its solution.
///
/// Cells are listed row by row. `0` is an empty cell. Without a solution a
/// board can be played but never solved.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "PuzzleSpec", into = "PuzzleSpec")]
pub struct Puzzle {
    side: usize,
    givens: Vec<u8>,
    solution: Option<Vec<u8>>,
}

/// Text form used in config files: one character per cell, `.` or `0` for
/// an empty cell.
#[derive(Debug, Clone, Serialize, Deserialize)]
struct PuzzleSpec {
    givens: String,
    #[serde(default)]
    solution: Option<String>,
}

impl Puzzle {
    /// Parses a puzzle from its text form.
    pub fn parse(givens: &str, solution: Option<&str>) -> Result<Self, PuzzleError> {
        let givens = parse_cells(givens)?;
        let side = side_of(givens.len())?;

        let solution = match solution {
            None => None,
            Some(text) => {
                let solution = parse_cells(text)?;
                if solution.len() != givens.len() {
                    return Err(PuzzleError::SolutionLength {
                        expected: givens.len(),
                        found: solution.len(),
                    });
                }
                let contradiction = givens
                    .iter()
                    .zip(&solution)
                    .position(|(&g, &s)| g != 0 && g != s);
                if let Some(index) = contradiction {
                    return Err(PuzzleError::SolutionMismatch(index));
                }
                Some(solution)
            }
        };

        Ok(Self {
            side,
            givens,
            solution,
        })
    }

    /// A well-known 9x9 puzzle with its solution. Used as the default.
    pub fn classic() -> Self {
        Self {
            side: 9,
            givens: digits(CLASSIC_GIVENS),
            solution: Some(digits(CLASSIC_SOLUTION)),
        }
    }

    pub fn side(&self) -> usize {
        self.side
    }

    pub fn givens(&self) -> &[u8] {
        &self.givens
    }

    pub fn solution(&self) -> Option<&[u8]> {
        self.solution.as_deref()
    }
}

impl Default for Puzzle {
    fn default() -> Self {
        Self::classic()
    }
}

impl TryFrom<PuzzleSpec> for Puzzle {
    type Error = PuzzleError;

    fn try_from(spec: PuzzleSpec) -> Result<Self, Self::Error> {
        Self::parse(&spec.givens, spec.solution.as_deref())
    }
}

impl From<Puzzle> for PuzzleSpec {
    fn from(puzzle: Puzzle) -> Self {
        let text = |cells: &[u8]| cells.iter().map(|d| char::from(b'0' + d)).collect();
        Self {
            givens: text(&puzzle.givens),
            solution: puzzle.solution.as_deref().map(text),
        }
    }
}

const CLASSIC_GIVENS: &str = "\
530070000\
600195000\
098000060\
800060003\
400803001\
700020006\
060000280\
000419005\
000080079";

const CLASSIC_SOLUTION: &str = "\
534678912\
672195348\
198342567\
859761423\
426853791\
713924856\
961537284\
287419635\
345286179";

/// Only for the constants above, which are known to be digits.
fn digits(text: &str) -> Vec<u8> {
    text.bytes().map(|b| b - b'0').collect()
}

fn parse_cells(text: &str) -> Result<Vec<u8>, PuzzleError> {
    text.chars()
        .filter(|c| !c.is_whitespace())
        .enumerate()
        .map(|(index, c)| match c {
            '.' => Ok(0),
            '0'..='9' => Ok(c as u8 - b'0'),
            found => Err(PuzzleError::BadCharacter { index, found }),
        })
        .collect()
}

fn side_of(len: usize) -> Result<usize, PuzzleError> {
    (1..=9)
        .find(|side| side * side == len)
        .ok_or(PuzzleError::BadLength(len))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_classic_is_consistent() {
        let puzzle = Puzzle::classic();
        assert_eq!(puzzle.side(), 9);
        assert_eq!(puzzle.givens().len(), 81);
        let reparsed = Puzzle::parse(CLASSIC_GIVENS, Some(CLASSIC_SOLUTION)).unwrap();
        assert_eq!(reparsed, puzzle);
    }

    #[test]
    fn test_parse_accepts_dots_and_whitespace() {
        let puzzle = Puzzle::parse("1.\n.2\n", None).unwrap();
        assert_eq!(puzzle.side(), 2);
        assert_eq!(puzzle.givens(), &[1, 0, 0, 2]);
        assert!(puzzle.solution().is_none());
    }

    #[test]
    fn test_parse_rejects_non_square() {
        assert_eq!(Puzzle::parse("12345", None), Err(PuzzleError::BadLength(5)));
    }

    #[test]
    fn test_parse_rejects_letters() {
        assert_eq!(
            Puzzle::parse("1x..", None),
            Err(PuzzleError::BadCharacter {
                index: 1,
                found: 'x'
            })
        );
    }

    #[test]
    fn test_solution_must_agree_with_givens() {
        assert_eq!(
            Puzzle::parse("1...", Some("2111")),
            Err(PuzzleError::SolutionMismatch(0))
        );
        assert!(matches!(
            Puzzle::parse("1...", Some("1")),
            Err(PuzzleError::SolutionLength { .. })
        ));
    }

    #[test]
    fn test_serde_uses_text_form() {
        let puzzle = Puzzle::parse("1..2", Some("1212")).unwrap();
        let json = serde_json::to_value(&puzzle).unwrap();
        assert_eq!(json["givens"], "1002");
        assert_eq!(json["solution"], "1212");
        let back: Puzzle = serde_json::from_value(json).unwrap();
        assert_eq!(back, puzzle);
    }
}
