use std::fs::{self, File};
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use tracing_appender::non_blocking::{NonBlockingBuilder, WorkerGuard};
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::{EnvFilter, fmt};

use crate::config::{ResolvedOutputs, TelemetryConfig};

pub const TELEMETRY_FILE: &str = "telemetry.jsonl";

/// Flushes the telemetry file when dropped.
pub struct TelemetryGuard {
    _worker: WorkerGuard,
    path: PathBuf,
}

impl TelemetryGuard {
    pub fn path(&self) -> &Path {
        &self.path
    }
}

pub fn telemetry_path(outputs: &ResolvedOutputs) -> PathBuf {
    outputs.artifact_dir().join(TELEMETRY_FILE)
}

/// Filter used when `RUST_LOG` is unset. The engine stays at `warn` unless
/// its events were asked for.
pub fn filter_directives(telemetry: &TelemetryConfig) -> String {
    let level = telemetry.level.as_str();
    let core = if telemetry.core_events { level } else { "warn" };
    format!("chinchon_sim={level},chinchon_core={core}")
}

/// Sends every match, round and decision event as one JSON line to
/// `telemetry.jsonl`. Returns `None` when telemetry is off.
pub fn install(
    telemetry: &TelemetryConfig,
    outputs: &ResolvedOutputs,
) -> Result<Option<TelemetryGuard>> {
    if !telemetry.enabled {
        return Ok(None);
    }

    let path = telemetry_path(outputs);
    let dir = outputs.artifact_dir();
    fs::create_dir_all(&dir).with_context(|| format!("creating {}", dir.display()))?;
    let file = File::create(&path).with_context(|| format!("creating {}", path.display()))?;
    let (writer, worker) = NonBlockingBuilder::default().lossy(false).finish(file);

    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(filter_directives(telemetry)));
    tracing_subscriber::registry()
        .with(filter)
        .with(
            fmt::layer()
                .json()
                .with_current_span(false)
                .with_span_list(false)
                .with_writer(writer),
        )
        .try_init()
        .context("installing the telemetry subscriber")?;

    Ok(Some(TelemetryGuard {
        _worker: worker,
        path,
    }))
}
