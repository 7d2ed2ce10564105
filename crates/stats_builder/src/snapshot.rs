//! Processor state snapshots.
//!
//! `ProcessorState` → MessagePack → LZ4, with a SHA-256 checksum stored in a
//! `<state>.meta.json` sidecar. Loading verifies the checksum before decoding.

use anyhow::{Context, Result};
use cricket_core::ProcessorState;
use sha2::{Digest, Sha256};
use std::fs;
use std::path::{Path, PathBuf};

use crate::{SnapshotMetadata, SNAPSHOT_SCHEMA_VERSION};

/// Sidecar path: `state.bin` → `state.bin.meta.json`.
pub fn metadata_path(state_path: &Path) -> PathBuf {
    let mut name = state_path.as_os_str().to_os_string();
    name.push(".meta.json");
    PathBuf::from(name)
}

fn checksum(bytes: &[u8]) -> String {
    let mut hasher = Sha256::new();
    hasher.update(bytes);
    format!("{:x}", hasher.finalize())
}

pub fn save_state(state: &ProcessorState, state_path: &Path) -> Result<SnapshotMetadata> {
    let msgpack_bytes =
        rmp_serde::to_vec_named(state).context("Failed to serialize state to MessagePack")?;
    let original_size = msgpack_bytes.len() as u64;

    let compressed = lz4_flex::compress_prepend_size(&msgpack_bytes);
    let compressed_size = compressed.len() as u64;

    if let Some(parent) = state_path.parent().filter(|p| !p.as_os_str().is_empty()) {
        fs::create_dir_all(parent)
            .with_context(|| format!("Failed to create state directory: {}", parent.display()))?;
    }
    fs::write(state_path, &compressed)
        .with_context(|| format!("Failed to write state file: {}", state_path.display()))?;

    let metadata = SnapshotMetadata {
        schema_version: SNAPSHOT_SCHEMA_VERSION.to_string(),
        checksum: checksum(&compressed),
        created_at: chrono::Utc::now().to_rfc3339(),
        original_size,
        compressed_size,
        player_count: state.players.len(),
        matches_processed: state.matches_processed(),
    };

    let meta_path = metadata_path(state_path);
    let metadata_json = serde_json::to_string_pretty(&metadata)?;
    fs::write(&meta_path, metadata_json)
        .with_context(|| format!("Failed to write state metadata: {}", meta_path.display()))?;

    log::debug!(
        "Saved state: {} players, {} matches, {} bytes",
        metadata.player_count,
        metadata.matches_processed,
        compressed_size
    );
    Ok(metadata)
}

pub fn read_metadata(state_path: &Path) -> Result<SnapshotMetadata> {
    let meta_path = metadata_path(state_path);
    let text = fs::read_to_string(&meta_path)
        .with_context(|| format!("Failed to read state metadata: {}", meta_path.display()))?;
    serde_json::from_str(&text)
        .with_context(|| format!("Failed to parse state metadata: {}", meta_path.display()))
}

/// Whether the state file still matches its recorded checksum.
pub fn verify_state(state_path: &Path, expected_checksum: &str) -> Result<bool> {
    let bytes = fs::read(state_path)
        .with_context(|| format!("Failed to read state file: {}", state_path.display()))?;
    Ok(checksum(&bytes) == expected_checksum)
}

pub fn load_state(state_path: &Path) -> Result<ProcessorState> {
    let metadata = read_metadata(state_path)?;
    if metadata.schema_version != SNAPSHOT_SCHEMA_VERSION {
        anyhow::bail!(
            "Unsupported state schema {} (expected {})",
            metadata.schema_version,
            SNAPSHOT_SCHEMA_VERSION
        );
    }

    let compressed = fs::read(state_path)
        .with_context(|| format!("Failed to read state file: {}", state_path.display()))?;
    if checksum(&compressed) != metadata.checksum {
        anyhow::bail!("State checksum mismatch: {}", state_path.display());
    }

    let msgpack_bytes =
        lz4_flex::decompress_size_prepended(&compressed).context("Failed to decompress LZ4")?;
    let state: ProcessorState =
        rmp_serde::from_slice(&msgpack_bytes).context("Failed to deserialize state")?;
    Ok(state)
}

/// Previous state if `state_path` exists, otherwise an empty one.
pub fn load_or_default(state_path: &Path) -> Result<ProcessorState> {
    if !state_path.exists() {
        log::info!("No previous state at {}, starting fresh", state_path.display());
        return Ok(ProcessorState::default());
    }
    load_state(state_path)
}
