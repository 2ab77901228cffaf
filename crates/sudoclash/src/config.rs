//! Server configuration.

use std::time::Duration;

use serde::{Deserialize, Serialize};
use sudoclash_state::{MatchConfig, Puzzle, RuleConfig};

use crate::SudoclashError;

/// Everything the server reads at startup.
///
/// Every field is optional in JSON and falls back to [`Default`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    /// How often the sweeper looks for abandoned rooms.
    pub sweep_interval_ms: u64,

    /// Mailbox capacity of each room actor.
    pub channel_size: usize,

    pub rules: RuleConfig,

    /// The board every room plays.
    pub puzzle: Puzzle,

    /// Seeds the power-up draws of every room.
    pub seed: u32,
}

impl ServerConfig {
    /// Parses a JSON document.
    ///
    /// # Errors
    /// [`SudoclashError::Config`] on malformed JSON or an invalid puzzle.
    pub fn from_json(json: &str) -> Result<Self, SudoclashError> {
        Ok(serde_json::from_str(json)?)
    }

    pub fn sweep_interval(&self) -> Duration {
        Duration::from_millis(self.sweep_interval_ms.max(1))
    }

    /// The per-room match settings.
    pub fn match_config(&self) -> MatchConfig {
        MatchConfig {
            rules: self.rules.clone(),
            puzzle: self.puzzle.clone(),
            seed: self.seed,
        }
    }
}

impl Default for ServerConfig {
    fn default() -> Self {
        let match_config = MatchConfig::default();
        Self {
            sweep_interval_ms: 30_000,
            channel_size: 64,
            rules: match_config.rules,
            puzzle: match_config.puzzle,
            seed: match_config.seed,
        }
    }
}
