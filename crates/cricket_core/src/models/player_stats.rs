use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use super::ball::UNKNOWN_TEAM;

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct BattingTotals {
    pub runs: u32,
    pub balls_faced: u32,
    pub fours: u32,
    pub sixes: u32,
    pub dismissals: u32,
    /// Dismissal count keyed by the source's free-text type
    pub dismissal_types: BTreeMap<String, u32>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct BowlingTotals {
    pub balls_bowled: u32,
    pub runs_conceded: u32,
    pub wickets: u32,
    pub wicket_types: BTreeMap<String, u32>,
    /// Quality wickets (bowled, lbw, caught and bowled)
    pub good_ones: u32,
    pub dots: u32,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct FieldingTotals {
    pub catches: u32,
    pub run_outs: u32,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MatchScore {
    pub match_id: String,
    pub score: f64,
}

/// A player's record across every match processed so far.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PlayerLifetimeStat {
    pub id: String,
    pub name: String,
    pub team: String,
    pub matches: u32,
    pub batting: BattingTotals,
    pub bowling: BowlingTotals,
    pub fielding: FieldingTotals,
    pub match_scores: Vec<MatchScore>,
    pub total_score: f64,
}

impl PlayerLifetimeStat {
    pub fn new(id: impl Into<String>, name: impl Into<String>, team: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            team: team.into(),
            matches: 0,
            batting: BattingTotals::default(),
            bowling: BowlingTotals::default(),
            fielding: FieldingTotals::default(),
            match_scores: Vec::new(),
            total_score: 0.0,
        }
    }

    /// Refresh identity from a later sighting. The most recent known team wins;
    /// a placeholder name is replaced once a real one shows up.
    pub fn observe(&mut self, name: &str, team: &str) {
        if team != UNKNOWN_TEAM && !team.is_empty() {
            self.team = team.to_string();
        }
        if is_placeholder_name(&self.name) && !is_placeholder_name(name) {
            self.name = name.to_string();
        }
    }

    pub fn record_match(&mut self, match_id: &str, score: f64) {
        self.matches = self.matches.saturating_add(1);
        self.match_scores.push(MatchScore { match_id: match_id.to_string(), score });
        self.total_score += score;
    }

    pub fn played_in(&self, match_id: &str) -> bool {
        self.match_scores.iter().any(|m| m.match_id == match_id)
    }
}

pub(crate) fn is_placeholder_name(name: &str) -> bool {
    name.is_empty() || name.starts_with("Unknown")
}

pub(crate) fn bump(histogram: &mut BTreeMap<String, u32>, key: &str) {
    let count = histogram.entry(key.to_string()).or_insert(0);
    *count = count.saturating_add(1);
}
