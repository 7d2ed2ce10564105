//! Stats Builder Library
//!
//! Match-detail JSON → ball events → lifetime player stats → JSON/CSV reports,
//! with the processor state kept between runs as a MessagePack+LZ4 snapshot.

pub mod loader;
pub mod output;
pub mod snapshot;

use anyhow::{Context, Result};
use cricket_core::{RunSummary, ScoringConfig, StatsProcessor, StatsReport};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

pub use loader::{load_documents, LoadStats};
pub use snapshot::{load_or_default, load_state, save_state};

pub const SNAPSHOT_SCHEMA_VERSION: &str = "v1";

/// Snapshot sidecar metadata
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SnapshotMetadata {
    pub schema_version: String,
    /// SHA256 of the compressed state file (hex)
    pub checksum: String,
    /// RFC3339
    pub created_at: String,
    pub original_size: u64,
    pub compressed_size: u64,
    pub player_count: usize,
    pub matches_processed: usize,
}

/// Scoring config for a run: explicit file, then `CRICKET_SCORING_CONFIG`, then the preset.
pub fn resolve_config(config_path: Option<&Path>, preset: Option<&str>) -> Result<ScoringConfig> {
    if let Some(path) = config_path {
        return ScoringConfig::from_path(path)
            .with_context(|| format!("Failed to load scoring config: {}", path.display()));
    }
    if let Some(config) = ScoringConfig::from_env().context("Failed to load scoring config from env")? {
        return Ok(config);
    }
    match preset {
        Some(name) => ScoringConfig::preset(name)
            .with_context(|| format!("Unknown scoring preset: {name}")),
        None => Ok(ScoringConfig::standard()),
    }
}

#[derive(Debug, Clone, Default)]
pub struct BuildOptions {
    pub inputs: Vec<PathBuf>,
    pub json_out: Option<PathBuf>,
    pub csv_out: Option<PathBuf>,
    /// Snapshot to resume from and save back to
    pub state: Option<PathBuf>,
    pub config: ScoringConfig,
}

#[derive(Debug, Clone)]
pub struct BuildOutcome {
    pub load: LoadStats,
    pub run: RunSummary,
    pub report: StatsReport,
    pub snapshot: Option<SnapshotMetadata>,
}

/// One full run: resume, load, process in canonical order, export, save.
pub fn run_build(options: &BuildOptions) -> Result<BuildOutcome> {
    let state = match &options.state {
        Some(path) => load_or_default(path)?,
        None => Default::default(),
    };
    let resumed = state.matches_processed();
    let mut processor = StatsProcessor::with_state(options.config.clone(), state);

    let (documents, load) = load_documents(&options.inputs)?;
    log::info!(
        "Loaded {} document(s) from {} file(s), {} previously processed match(es)",
        load.documents,
        load.files,
        resumed
    );

    let run = processor.process_all(&documents);
    log::info!("{run}");

    let report = processor.report();
    if let Some(path) = &options.json_out {
        output::write_json(&report, path)?;
    }
    if let Some(path) = &options.csv_out {
        output::write_csv(&report, path)?;
    }

    let snapshot = match &options.state {
        Some(path) => Some(save_state(processor.state(), path)?),
        None => None,
    };

    Ok(BuildOutcome { load, run, report, snapshot })
}
