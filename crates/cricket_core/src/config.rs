//! # Scoring Configuration
//!
//! Every weight of the per-match fantasy score lives here so the formula can be
//! re-tuned without touching the aggregator.
//!
//! ## Presets
//! - [`ScoringConfig::standard`]: strike-rate and economy aware formula (default)
//! - [`ScoringConfig::classic`]: flat points per run, wicket and dismissal
//!
//! A JSON file with any subset of the fields can be loaded with
//! [`ScoringConfig::from_path`]; missing fields keep their default value.

use crate::error::{Result, StatsError};
use serde::{Deserialize, Serialize};
use std::{env, fs, path::Path};

pub const SCORING_CONFIG_PATH_ENV: &str = "CRICKET_SCORING_CONFIG";

/// Weights of the per-match score.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ScoringConfig {
    /// Flat bonus for every player who featured in the match
    pub participation_bonus: f64,
    /// Multiplier applied to the single best performer of a match
    pub mvp_multiplier: f64,

    // Batting
    /// Runs-per-ball rate the strike-rate term is measured against
    pub strike_rate_baseline: f64,
    /// Weight of `(strike_rate - baseline) * max(runs, balls)`
    pub strike_rate_weight: f64,
    /// Run thresholds that each award `milestone_bonus`
    pub milestones: Vec<u32>,
    pub milestone_bonus: f64,

    // Bowling
    /// Runs per ball a bowler may concede before the economy term goes negative
    pub economy_baseline: f64,
    pub economy_weight: f64,
    pub wicket_points: f64,
    /// Extra points for bowled, lbw and caught-and-bowled
    pub quality_wicket_bonus: f64,
    pub haul_threshold: u32,
    pub haul_bonus: f64,
    pub dot_points: f64,

    // Fielding
    /// Points per catch and per run-out credit
    pub fielding_points: f64,
}

impl Default for ScoringConfig {
    fn default() -> Self {
        Self {
            participation_bonus: 4.0,
            mvp_multiplier: 1.3,
            strike_rate_baseline: 1.5,
            strike_rate_weight: 1.0,
            milestones: vec![50, 100],
            milestone_bonus: 8.0,
            economy_baseline: 1.5,
            economy_weight: 3.0,
            wicket_points: 20.0,
            quality_wicket_bonus: 10.0,
            haul_threshold: 3,
            haul_bonus: 15.0,
            dot_points: 1.0,
            fielding_points: 10.0,
        }
    }
}

impl ScoringConfig {
    pub fn standard() -> Self {
        Self::default()
    }

    /// Points-only scorer: 16 per wicket, 20 for quality wickets, 8 per fielding
    /// credit, no strike-rate or economy terms. Caught-and-bowled is a quality
    /// wicket here as in the standard preset, so it earns 20 alongside bowled and lbw.
    pub fn classic() -> Self {
        Self {
            strike_rate_weight: 0.0,
            economy_weight: 0.0,
            wicket_points: 16.0,
            quality_wicket_bonus: 4.0,
            dot_points: 0.0,
            fielding_points: 8.0,
            ..Self::default()
        }
    }

    pub fn preset(name: &str) -> Option<Self> {
        match name.trim().to_ascii_lowercase().as_str() {
            "standard" | "default" => Some(Self::standard()),
            "classic" => Some(Self::classic()),
            _ => None,
        }
    }

    pub fn from_json(content: &str) -> Result<Self> {
        let config: Self = serde_json::from_str(content)?;
        config.validate()?;
        Ok(config)
    }

    pub fn from_path(path: &Path) -> Result<Self> {
        let content = fs::read_to_string(path).map_err(|source| StatsError::Read {
            path: path.display().to_string(),
            source,
        })?;
        Self::from_json(&content)
    }

    /// Config named by `CRICKET_SCORING_CONFIG`, or `None` when the variable is unset or blank.
    pub fn from_env() -> Result<Option<Self>> {
        let Ok(path) = env::var(SCORING_CONFIG_PATH_ENV) else {
            return Ok(None);
        };

        let path = path.trim();
        if path.is_empty() {
            return Ok(None);
        }

        Self::from_path(Path::new(path)).map(Some)
    }

    pub fn validate(&self) -> Result<()> {
        let weights = [
            ("participation_bonus", self.participation_bonus),
            ("mvp_multiplier", self.mvp_multiplier),
            ("strike_rate_baseline", self.strike_rate_baseline),
            ("strike_rate_weight", self.strike_rate_weight),
            ("milestone_bonus", self.milestone_bonus),
            ("economy_baseline", self.economy_baseline),
            ("economy_weight", self.economy_weight),
            ("wicket_points", self.wicket_points),
            ("quality_wicket_bonus", self.quality_wicket_bonus),
            ("haul_bonus", self.haul_bonus),
            ("dot_points", self.dot_points),
            ("fielding_points", self.fielding_points),
        ];
        if let Some((name, value)) = weights.iter().find(|(_, v)| !v.is_finite()) {
            return Err(StatsError::InvalidConfig(format!("{name} must be finite, got {value}")));
        }

        if self.mvp_multiplier < 1.0 {
            return Err(StatsError::InvalidConfig(format!(
                "mvp_multiplier must be >= 1.0, got {}",
                self.mvp_multiplier
            )));
        }
        if self.haul_threshold == 0 {
            return Err(StatsError::InvalidConfig("haul_threshold must be positive".to_string()));
        }
        if self.milestones.contains(&0) {
            return Err(StatsError::InvalidConfig("milestones must be positive run counts".to_string()));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::NamedTempFile;

    #[test]
    fn test_default_matches_standard_formula() {
        let cfg = ScoringConfig::default();
        assert!((cfg.participation_bonus - 4.0).abs() < f64::EPSILON);
        assert!((cfg.mvp_multiplier - 1.3).abs() < f64::EPSILON);
        assert_eq!(cfg.milestones, vec![50, 100]);
        assert_eq!(cfg.haul_threshold, 3);
        assert!(cfg.validate().is_ok());
    }

    #[test]
    fn test_classic_drops_rate_terms() {
        let classic = ScoringConfig::classic();
        assert_eq!(classic.strike_rate_weight, 0.0);
        assert_eq!(classic.economy_weight, 0.0);
        // quality wicket still worth 20 in total
        assert!((classic.wicket_points + classic.quality_wicket_bonus - 20.0).abs() < f64::EPSILON);
    }

    #[test]
    fn test_preset_lookup() {
        assert_eq!(ScoringConfig::preset("Classic"), Some(ScoringConfig::classic()));
        assert_eq!(ScoringConfig::preset("standard"), Some(ScoringConfig::standard()));
        assert!(ScoringConfig::preset("t20").is_none());
    }

    #[test]
    fn test_partial_json_keeps_defaults() {
        let cfg = ScoringConfig::from_json(r#"{"wicket_points": 25.0}"#).unwrap();
        assert!((cfg.wicket_points - 25.0).abs() < f64::EPSILON);
        assert!((cfg.fielding_points - 10.0).abs() < f64::EPSILON);
    }

    #[test]
    fn test_rejects_shrinking_multiplier() {
        let err = ScoringConfig::from_json(r#"{"mvp_multiplier": 0.5}"#).unwrap_err();
        assert!(matches!(err, StatsError::InvalidConfig(_)));
        assert!(!err.is_recoverable());
    }

    #[test]
    fn test_from_path() {
        let mut file = NamedTempFile::new().unwrap();
        file.write_all(br#"{"haul_threshold": 4, "haul_bonus": 20.0}"#).unwrap();

        let cfg = ScoringConfig::from_path(file.path()).unwrap();
        assert_eq!(cfg.haul_threshold, 4);
        assert!((cfg.haul_bonus - 20.0).abs() < f64::EPSILON);
    }

    #[test]
    fn test_missing_file_is_read_error() {
        let err = ScoringConfig::from_path(Path::new("/nonexistent/scoring.json")).unwrap_err();
        assert!(matches!(err, StatsError::Read { .. }));
    }
}
