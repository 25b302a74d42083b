use std::fs;
use std::path::{Path, PathBuf};

use chinchon_core::game::config::MatchConfig;
use serde::Deserialize;
use thiserror::Error;

const DEFAULT_MAX_TURNS_PER_ROUND: usize = 400;

/// A simulator run as described by `sim/sim.yaml`.
#[derive(Debug, Clone, Deserialize, PartialEq)]
pub struct SimulationConfig {
    pub run_id: String,
    pub matches: MatchesConfig,
    #[serde(default)]
    pub game: MatchConfig,
    pub outputs: OutputsConfig,
    #[serde(default)]
    pub telemetry: TelemetryConfig,
}

impl SimulationConfig {
    /// Reads and checks a YAML run description.
    pub fn load(path: impl AsRef<Path>) -> Result<Self, SimConfigError> {
        let path = path.as_ref();
        let text = fs::read_to_string(path).map_err(|source| SimConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        let config: SimulationConfig =
            serde_yaml::from_str(&text).map_err(|source| SimConfigError::Yaml {
                path: path.to_path_buf(),
                source,
            })?;
        config.validate()?;
        Ok(config)
    }

    /// Checks the fields after CLI overrides have been applied.
    pub fn validate(&self) -> Result<(), SimConfigError> {
        let run_id_ok = !self.run_id.is_empty()
            && self
                .run_id
                .chars()
                .all(|c| c.is_ascii_alphanumeric() || matches!(c, '.' | '_' | '-'));
        if !run_id_ok {
            return Err(SimConfigError::field(
                "run_id",
                "use letters, digits, '.', '_' or '-'",
            ));
        }
        if self.matches.count == 0 {
            return Err(SimConfigError::field("matches.count", "play at least one match"));
        }
        if self.matches.max_turns_per_round == 0 {
            return Err(SimConfigError::field(
                "matches.max_turns_per_round",
                "a round needs at least one turn",
            ));
        }
        self.game
            .validate()
            .map_err(|err| SimConfigError::field("game", err.to_string()))?;

        let outputs = self.resolved_outputs();
        if outputs.jsonl.as_os_str().is_empty() || outputs.summary_md.as_os_str().is_empty() {
            return Err(SimConfigError::field("outputs", "both paths are required"));
        }
        if outputs.jsonl == outputs.summary_md {
            return Err(SimConfigError::field(
                "outputs",
                "match rows and summary would overwrite each other",
            ));
        }
        Ok(())
    }

    /// Output paths with `{run_id}` filled in.
    pub fn resolved_outputs(&self) -> ResolvedOutputs {
        let fill = |template: &str| PathBuf::from(template.replace("{run_id}", &self.run_id));
        ResolvedOutputs {
            jsonl: fill(&self.outputs.jsonl),
            summary_md: fill(&self.outputs.summary_md),
        }
    }
}

#[derive(Debug, Clone, Deserialize, PartialEq)]
pub struct MatchesConfig {
    pub count: usize,
    /// Seeds the generator that hands every match its own seed.
    #[serde(default)]
    pub seed: u64,
    /// After this many turns a round only draws from the deck, so a stuck
    /// round runs the deck dry and is redealt.
    #[serde(default = "default_max_turns_per_round")]
    pub max_turns_per_round: usize,
}

fn default_max_turns_per_round() -> usize {
    DEFAULT_MAX_TURNS_PER_ROUND
}

/// Path templates; `{run_id}` is substituted.
#[derive(Debug, Clone, Deserialize, PartialEq)]
pub struct OutputsConfig {
    pub jsonl: String,
    pub summary_md: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolvedOutputs {
    pub jsonl: PathBuf,
    pub summary_md: PathBuf,
}

impl ResolvedOutputs {
    /// Directory of the summary; telemetry lands beside it.
    pub fn artifact_dir(&self) -> PathBuf {
        match self.summary_md.parent() {
            Some(dir) if !dir.as_os_str().is_empty() => dir.to_path_buf(),
            _ => PathBuf::from("."),
        }
    }
}

/// JSON telemetry written beside the summary.
#[derive(Debug, Clone, Default, Deserialize, PartialEq)]
pub struct TelemetryConfig {
    #[serde(default)]
    pub enabled: bool,
    /// Level for the simulator's own `match`, `round`, `draw` and `discard`
    /// events.
    #[serde(default)]
    pub level: TracingLevel,
    /// Also record the engine's deal, close and re-buy events at the same
    /// level. Otherwise only its warnings get through.
    #[serde(default)]
    pub core_events: bool,
}

#[derive(Debug, Clone, Copy, Default, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum TracingLevel {
    Trace,
    Debug,
    #[default]
    Info,
    #[serde(alias = "warning")]
    Warn,
    Error,
}

impl TracingLevel {
    pub fn as_str(self) -> &'static str {
        match self {
            TracingLevel::Trace => "trace",
            TracingLevel::Debug => "debug",
            TracingLevel::Info => "info",
            TracingLevel::Warn => "warn",
            TracingLevel::Error => "error",
        }
    }
}

#[derive(Debug, Error)]
pub enum SimConfigError {
    #[error("cannot read {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("{} is not a valid run description: {source}", path.display())]
    Yaml {
        path: PathBuf,
        #[source]
        source: serde_yaml::Error,
    },
    #[error("{field}: {message}")]
    Field {
        field: &'static str,
        message: String,
    },
}

impl SimConfigError {
    fn field(field: &'static str, message: impl Into<String>) -> Self {
        SimConfigError::Field {
            field,
            message: message.into(),
        }
    }
}
