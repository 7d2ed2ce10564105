//! # cricket_core - Ball-by-ball cricket statistics
//!
//! Normalizes heterogeneous match-detail feeds into ball events, folds them
//! into per-match and lifetime player tables, scores each match with a
//! configurable fantasy formula and exports the result as JSON or flat rows.
//!
//! ## Features
//! - Tolerant decoding of both innings/overs and flat ball lists
//! - Idempotent processing keyed by match id
//! - Per-match MVP bonus
//! - Serializable processor state for incremental runs

pub mod aggregator;
pub mod config;
pub mod document;
pub mod error;
pub mod export;
pub mod models;
pub mod normalizer;
pub mod scoring;

pub use aggregator::{
    LifetimeTable, MatchOutcome, MatchSummary, ProcessorState, RunSummary, StatsProcessor,
};
pub use config::ScoringConfig;
pub use document::{sort_canonical, MatchDocument};
pub use error::{Result, StatsError};
pub use export::{PlayerReport, PlayerRow, StatsReport};
pub use models::{BallEvent, PlayerLifetimeStat, PlayerRef, Wicket};
pub use normalizer::{normalize, NormalizedMatch};
