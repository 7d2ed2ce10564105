//! Report writers: pretty JSON and one CSV row per player.

use anyhow::{Context, Result};
use cricket_core::{PlayerRow, StatsReport};
use std::fs;
use std::path::Path;

fn ensure_parent(path: &Path) -> Result<()> {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        fs::create_dir_all(parent)
            .with_context(|| format!("Failed to create output directory: {}", parent.display()))?;
    }
    Ok(())
}

pub fn write_json(report: &StatsReport, path: &Path) -> Result<()> {
    ensure_parent(path)?;
    let json = serde_json::to_string_pretty(report).context("Failed to serialize report")?;
    fs::write(path, json)
        .with_context(|| format!("Failed to write JSON report: {}", path.display()))
}

pub fn read_json(path: &Path) -> Result<StatsReport> {
    let text = fs::read_to_string(path)
        .with_context(|| format!("Failed to read JSON report: {}", path.display()))?;
    serde_json::from_str(&text)
        .with_context(|| format!("Failed to parse JSON report: {}", path.display()))
}

/// Header row is always written, even with no players.
pub fn write_csv(report: &StatsReport, path: &Path) -> Result<()> {
    ensure_parent(path)?;
    let mut writer = csv::WriterBuilder::new()
        .has_headers(false)
        .from_path(path)
        .with_context(|| format!("Failed to create CSV file: {}", path.display()))?;

    writer.write_record(CSV_COLUMNS)?;
    for row in report.rows() {
        writer.serialize(&row)?;
    }
    writer.flush()?;
    Ok(())
}

pub fn read_csv(path: &Path) -> Result<Vec<PlayerRow>> {
    let mut reader = csv::ReaderBuilder::new()
        .has_headers(true)
        .from_path(path)
        .with_context(|| format!("Failed to open CSV file: {}", path.display()))?;

    let mut rows = Vec::new();
    for record in reader.deserialize() {
        let row: PlayerRow = record
            .with_context(|| format!("Invalid CSV row in {}", path.display()))?;
        rows.push(row);
    }
    Ok(rows)
}

pub const CSV_COLUMNS: [&str; 21] = [
    "player_id",
    "name",
    "team",
    "matches_played",
    "total_score",
    "batting_runs",
    "batting_balls_faced",
    "batting_average",
    "batting_strike_rate",
    "batting_fours",
    "batting_sixes",
    "batting_dismissals",
    "bowling_balls",
    "bowling_runs",
    "bowling_wickets",
    "bowling_good_ones",
    "bowling_dots",
    "bowling_average",
    "bowling_economy",
    "fielding_catches",
    "fielding_run_outs",
];
