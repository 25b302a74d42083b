use serde::{Deserialize, Serialize};
use thiserror::Error;

pub const DEFAULT_PLAYERS: usize = 4;
pub const DEFAULT_WILDCARDS: u8 = 2;
pub const MIN_PLAYERS: usize = 2;
pub const MAX_PLAYERS: usize = 5;
pub const MAX_WILDCARDS: u8 = 4;

/// Table setup shared by every round of a match.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MatchConfig {
    #[serde(default = "default_players")]
    pub players: usize,
    #[serde(default = "default_wildcards")]
    pub wildcards: u8,
    /// Optional seat names; `Player N` is used when empty.
    #[serde(default)]
    pub names: Vec<String>,
}

impl Default for MatchConfig {
    fn default() -> Self {
        Self {
            players: DEFAULT_PLAYERS,
            wildcards: DEFAULT_WILDCARDS,
            names: Vec::new(),
        }
    }
}

impl MatchConfig {
    pub fn with_players(players: usize) -> Self {
        Self {
            players,
            ..Self::default()
        }
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if !(MIN_PLAYERS..=MAX_PLAYERS).contains(&self.players) {
            return Err(ConfigError::PlayerCount(self.players));
        }
        if self.wildcards > MAX_WILDCARDS {
            return Err(ConfigError::WildcardCount(self.wildcards));
        }
        if !self.names.is_empty() {
            if self.names.len() != self.players {
                return Err(ConfigError::NameCount {
                    expected: self.players,
                    actual: self.names.len(),
                });
            }
            if let Some(seat) = self.names.iter().position(|name| name.trim().is_empty()) {
                return Err(ConfigError::BlankName(seat));
            }
        }
        Ok(())
    }

    pub fn seat_names(&self) -> Vec<String> {
        if self.names.is_empty() {
            (1..=self.players).map(|n| format!("Player {n}")).collect()
        } else {
            self.names.clone()
        }
    }
}

fn default_players() -> usize {
    DEFAULT_PLAYERS
}

fn default_wildcards() -> u8 {
    DEFAULT_WILDCARDS
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ConfigError {
    #[error("player count must be between 2 and 5, got {0}")]
    PlayerCount(usize),
    #[error("at most 4 wildcards are supported, got {0}")]
    WildcardCount(u8),
    #[error("expected {expected} seat names, got {actual}")]
    NameCount { expected: usize, actual: usize },
    #[error("seat {0} has a blank name")]
    BlankName(usize),
    #[error("expected {expected} hands, got {actual}")]
    HandCount { expected: usize, actual: usize },
}
