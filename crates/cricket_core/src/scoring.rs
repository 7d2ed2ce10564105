//! Per-match fantasy score and MVP selection.
//!
//! ```text
//! batting  = runs + w_sr * (runs/balls - sr_base) * max(runs, balls) + milestones   (balls > 0)
//! bowling  = w_econ * (econ_base * balls - conceded) + wickets * wk
//!            + quality * qb + haul + dots * dp                                       (balls > 0)
//! fielding = (catches + run_outs) * fp
//! score    = batting + bowling + fielding + participation
//! ```
//! Scores are unbounded in both directions; expensive bowling goes negative.

use serde::{Deserialize, Serialize};

use crate::config::ScoringConfig;
use crate::models::MatchPlayerStat;

#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct ScoreBreakdown {
    pub batting: f64,
    pub bowling: f64,
    pub fielding: f64,
    pub participation: f64,
}

impl ScoreBreakdown {
    pub fn total(&self) -> f64 {
        self.batting + self.bowling + self.fielding + self.participation
    }
}

pub fn batting_points(stat: &MatchPlayerStat, config: &ScoringConfig) -> f64 {
    if stat.balls == 0 {
        return 0.0;
    }

    let runs = stat.runs as f64;
    let exposure = stat.runs.max(stat.balls) as f64;
    let tempo = (stat.strike_rate() - config.strike_rate_baseline) * exposure;
    let milestones = config
        .milestones
        .iter()
        .filter(|&&threshold| stat.runs >= threshold)
        .count() as f64;

    runs + config.strike_rate_weight * tempo + milestones * config.milestone_bonus
}

pub fn bowling_points(stat: &MatchPlayerStat, config: &ScoringConfig) -> f64 {
    if stat.bowled_balls == 0 {
        return 0.0;
    }

    let economy =
        config.economy_baseline * stat.bowled_balls as f64 - stat.conceded as f64;
    let haul = if stat.wickets >= config.haul_threshold { config.haul_bonus } else { 0.0 };

    config.economy_weight * economy
        + stat.wickets as f64 * config.wicket_points
        + stat.quality_wickets as f64 * config.quality_wicket_bonus
        + haul
        + stat.dots as f64 * config.dot_points
}

pub fn fielding_points(stat: &MatchPlayerStat, config: &ScoringConfig) -> f64 {
    (stat.catches + stat.run_outs) as f64 * config.fielding_points
}

pub fn score(stat: &MatchPlayerStat, config: &ScoringConfig) -> ScoreBreakdown {
    ScoreBreakdown {
        batting: batting_points(stat, config),
        bowling: bowling_points(stat, config),
        fielding: fielding_points(stat, config),
        participation: config.participation_bonus,
    }
}

/// Index of the match MVP: the strictly highest positive score, earliest entry on ties.
pub fn select_mvp(scores: &[f64]) -> Option<usize> {
    let mut best: Option<(usize, f64)> = None;
    for (idx, &score) in scores.iter().enumerate() {
        if score <= 0.0 {
            continue;
        }
        match best {
            Some((_, top)) if score <= top => {}
            _ => best = Some((idx, score)),
        }
    }
    best.map(|(idx, _)| idx)
}
