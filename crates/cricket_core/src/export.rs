//! Report shapes handed to downstream consumers.
//!
//! Averages and rates are derived here, never stored: batting average falls
//! back to raw runs when a player was never dismissed and bowling average to
//! raw runs conceded when no wicket was taken. Both placeholders are kept for
//! compatibility with existing consumers of the report.

use chrono::{DateTime, Utc};
use serde::de::{MapAccess, Visitor};
use serde::ser::SerializeMap;
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::collections::BTreeMap;
use std::fmt;

use crate::aggregator::ProcessorState;
use crate::models::{FieldingTotals, MatchScore, PlayerLifetimeStat};

pub fn round2(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}

fn ratio(numerator: u32, denominator: u32) -> f64 {
    if denominator == 0 {
        0.0
    } else {
        numerator as f64 / denominator as f64
    }
}

/// Runs per dismissal; raw runs when never dismissed.
pub fn batting_average(runs: u32, dismissals: u32) -> f64 {
    if dismissals == 0 {
        runs as f64
    } else {
        round2(ratio(runs, dismissals))
    }
}

/// Runs per 100 balls.
pub fn strike_rate(runs: u32, balls: u32) -> f64 {
    round2(ratio(runs, balls) * 100.0)
}

/// Runs conceded per wicket; raw runs conceded when wicketless.
pub fn bowling_average(conceded: u32, wickets: u32) -> f64 {
    if wickets == 0 {
        conceded as f64
    } else {
        round2(ratio(conceded, wickets))
    }
}

/// Runs conceded per six-ball over.
pub fn economy_rate(conceded: u32, balls: u32) -> f64 {
    if balls == 0 {
        return 0.0;
    }
    round2(conceded as f64 / (balls as f64 / 6.0))
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ReportMetadata {
    pub generated_at: String,
    pub player_count: usize,
    pub matches_processed: usize,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BattingReport {
    pub runs: u32,
    pub balls_faced: u32,
    pub fours: u32,
    pub sixes: u32,
    pub dismissals: u32,
    pub dismissal_types: BTreeMap<String, u32>,
    pub average: f64,
    pub strike_rate: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BowlingReport {
    pub balls_bowled: u32,
    pub runs_conceded: u32,
    pub wickets: u32,
    pub wicket_types: BTreeMap<String, u32>,
    pub good_ones: u32,
    pub dots: u32,
    pub average: f64,
    pub economy_rate: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PlayerReport {
    pub player_name: String,
    pub team: String,
    pub matches: u32,
    pub total_score: f64,
    pub match_scores: Vec<MatchScore>,
    pub batting: BattingReport,
    pub bowling: BowlingReport,
    pub fielding: FieldingTotals,
}

impl From<&PlayerLifetimeStat> for PlayerReport {
    fn from(stat: &PlayerLifetimeStat) -> Self {
        let batting = &stat.batting;
        let bowling = &stat.bowling;
        Self {
            player_name: stat.name.clone(),
            team: stat.team.clone(),
            matches: stat.matches,
            total_score: stat.total_score,
            match_scores: stat.match_scores.clone(),
            batting: BattingReport {
                runs: batting.runs,
                balls_faced: batting.balls_faced,
                fours: batting.fours,
                sixes: batting.sixes,
                dismissals: batting.dismissals,
                dismissal_types: batting.dismissal_types.clone(),
                average: batting_average(batting.runs, batting.dismissals),
                strike_rate: strike_rate(batting.runs, batting.balls_faced),
            },
            bowling: BowlingReport {
                balls_bowled: bowling.balls_bowled,
                runs_conceded: bowling.runs_conceded,
                wickets: bowling.wickets,
                wicket_types: bowling.wicket_types.clone(),
                good_ones: bowling.good_ones,
                dots: bowling.dots,
                average: bowling_average(bowling.runs_conceded, bowling.wickets),
                economy_rate: economy_rate(bowling.runs_conceded, bowling.balls_bowled),
            },
            fielding: stat.fielding,
        }
    }
}

/// Player reports keyed by id, serialized as a JSON object in insertion order.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct PlayerReports(pub Vec<(String, PlayerReport)>);

impl PlayerReports {
    pub fn get(&self, id: &str) -> Option<&PlayerReport> {
        self.0.iter().find(|(pid, _)| pid == id).map(|(_, report)| report)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &PlayerReport)> {
        self.0.iter().map(|(id, report)| (id.as_str(), report))
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl Serialize for PlayerReports {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.0.len()))?;
        for (id, report) in &self.0 {
            map.serialize_entry(id, report)?;
        }
        map.end()
    }
}

struct PlayerReportsVisitor;

impl<'de> Visitor<'de> for PlayerReportsVisitor {
    type Value = PlayerReports;

    fn expecting(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.write_str("a map of player id to player report")
    }

    fn visit_map<A: MapAccess<'de>>(self, mut access: A) -> Result<Self::Value, A::Error> {
        let mut entries = Vec::with_capacity(access.size_hint().unwrap_or(0));
        while let Some((id, report)) = access.next_entry::<String, PlayerReport>()? {
            entries.push((id, report));
        }
        Ok(PlayerReports(entries))
    }
}

impl<'de> Deserialize<'de> for PlayerReports {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        deserializer.deserialize_map(PlayerReportsVisitor)
    }
}

/// Top-level JSON report.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StatsReport {
    pub metadata: ReportMetadata,
    pub players: PlayerReports,
}

impl StatsReport {
    pub fn from_state(state: &ProcessorState, generated_at: DateTime<Utc>) -> Self {
        let players = PlayerReports(
            state
                .players
                .iter()
                .map(|stat| (stat.id.clone(), PlayerReport::from(stat)))
                .collect(),
        );
        Self {
            metadata: ReportMetadata {
                generated_at: generated_at.to_rfc3339(),
                player_count: players.len(),
                matches_processed: state.matches_processed(),
            },
            players,
        }
    }

    /// Flat rows, one per player, in report order.
    pub fn rows(&self) -> Vec<PlayerRow> {
        self.players.iter().map(|(id, report)| PlayerRow::new(id, report)).collect()
    }

    /// Players ranked by total score, highest first; ties keep report order.
    pub fn leaderboard(&self, top: usize) -> Vec<(&str, &PlayerReport)> {
        let mut ranked: Vec<(&str, &PlayerReport)> = self.players.iter().collect();
        ranked.sort_by(|a, b| b.1.total_score.total_cmp(&a.1.total_score));
        ranked.truncate(top);
        ranked
    }
}

/// One line of the tabular export.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PlayerRow {
    pub player_id: String,
    pub name: String,
    pub team: String,
    pub matches_played: u32,
    pub total_score: f64,
    pub batting_runs: u32,
    pub batting_balls_faced: u32,
    pub batting_average: f64,
    pub batting_strike_rate: f64,
    pub batting_fours: u32,
    pub batting_sixes: u32,
    pub batting_dismissals: u32,
    pub bowling_balls: u32,
    pub bowling_runs: u32,
    pub bowling_wickets: u32,
    pub bowling_good_ones: u32,
    pub bowling_dots: u32,
    pub bowling_average: f64,
    pub bowling_economy: f64,
    pub fielding_catches: u32,
    pub fielding_run_outs: u32,
}

impl PlayerRow {
    pub fn new(player_id: &str, report: &PlayerReport) -> Self {
        Self {
            player_id: player_id.to_string(),
            name: report.player_name.clone(),
            team: report.team.clone(),
            matches_played: report.matches,
            total_score: round2(report.total_score),
            batting_runs: report.batting.runs,
            batting_balls_faced: report.batting.balls_faced,
            batting_average: report.batting.average,
            batting_strike_rate: report.batting.strike_rate,
            batting_fours: report.batting.fours,
            batting_sixes: report.batting.sixes,
            batting_dismissals: report.batting.dismissals,
            bowling_balls: report.bowling.balls_bowled,
            bowling_runs: report.bowling.runs_conceded,
            bowling_wickets: report.bowling.wickets,
            bowling_good_ones: report.bowling.good_ones,
            bowling_dots: report.bowling.dots,
            bowling_average: report.bowling.average,
            bowling_economy: report.bowling.economy_rate,
            fielding_catches: report.fielding.catches,
            fielding_run_outs: report.fielding.run_outs,
        }
    }
}
