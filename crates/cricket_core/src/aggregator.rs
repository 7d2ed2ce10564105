//! # Stats Aggregator
//!
//! Folds normalized deliveries into two owned tables:
//! - [`LifetimeTable`]: one record per player id for the whole run
//! - [`MatchTable`]: scratch figures for the match being processed
//!
//! After the last ball of a match every touched player is scored, the MVP
//! multiplier is applied once, and the result is folded into the lifetime
//! records together with the `matches` counter and the processed-match ledger.

use chrono::{DateTime, Utc};
use rustc_hash::FxHashMap;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use sha2::{Digest, Sha256};
use std::fmt;

use crate::config::ScoringConfig;
use crate::document::MatchDocument;
use crate::export::StatsReport;
use crate::models::player_stats::bump;
use crate::models::{BallEvent, DismissalClass, MatchPlayerStat, PlayerLifetimeStat, PlayerRef};
use crate::normalizer::{normalize, NormalizedMatch};
use crate::scoring::{self, ScoreBreakdown};

/// Lifetime records in first-seen order with an id index.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(from = "Vec<PlayerLifetimeStat>", into = "Vec<PlayerLifetimeStat>")]
pub struct LifetimeTable {
    players: Vec<PlayerLifetimeStat>,
    index: FxHashMap<String, usize>,
}

impl LifetimeTable {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record for `player`, created on first sighting.
    pub fn ensure(&mut self, player: &PlayerRef, team: &str) -> &mut PlayerLifetimeStat {
        let idx = match self.index.get(&player.id) {
            Some(&idx) => {
                self.players[idx].observe(&player.name, team);
                idx
            }
            None => {
                let idx = self.players.len();
                self.players.push(PlayerLifetimeStat::new(&player.id, &player.name, team));
                self.index.insert(player.id.clone(), idx);
                idx
            }
        };
        &mut self.players[idx]
    }

    pub fn get(&self, id: &str) -> Option<&PlayerLifetimeStat> {
        self.index.get(id).map(|&idx| &self.players[idx])
    }

    fn get_mut(&mut self, id: &str) -> Option<&mut PlayerLifetimeStat> {
        match self.index.get(id) {
            Some(&idx) => Some(&mut self.players[idx]),
            None => None,
        }
    }

    pub fn iter(&self) -> impl Iterator<Item = &PlayerLifetimeStat> {
        self.players.iter()
    }

    pub fn len(&self) -> usize {
        self.players.len()
    }

    pub fn is_empty(&self) -> bool {
        self.players.is_empty()
    }
}

impl From<Vec<PlayerLifetimeStat>> for LifetimeTable {
    fn from(players: Vec<PlayerLifetimeStat>) -> Self {
        let index = players
            .iter()
            .enumerate()
            .map(|(idx, p)| (p.id.clone(), idx))
            .collect();
        Self { players, index }
    }
}

impl From<LifetimeTable> for Vec<PlayerLifetimeStat> {
    fn from(table: LifetimeTable) -> Self {
        table.players
    }
}

/// Scratch table for a single match, in first-touch order.
#[derive(Debug, Clone, Default)]
pub struct MatchTable {
    order: Vec<String>,
    stats: FxHashMap<String, MatchPlayerStat>,
}

impl MatchTable {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn entry(&mut self, id: &str) -> &mut MatchPlayerStat {
        if !self.stats.contains_key(id) {
            self.order.push(id.to_string());
        }
        self.stats.entry(id.to_string()).or_default()
    }

    pub fn get(&self, id: &str) -> Option<&MatchPlayerStat> {
        self.stats.get(id)
    }

    /// Player ids in the order they were first touched.
    pub fn players(&self) -> &[String] {
        &self.order
    }

    pub fn len(&self) -> usize {
        self.order.len()
    }

    pub fn is_empty(&self) -> bool {
        self.order.is_empty()
    }
}

/// Apply one delivery to both tables. Counters saturate instead of wrapping.
pub fn apply_ball(lifetime: &mut LifetimeTable, scratch: &mut MatchTable, event: &BallEvent) {
    let runs = event.runs_to_batter;

    let batting = &mut lifetime.ensure(&event.batter, &event.batting_team).batting;
    batting.runs = batting.runs.saturating_add(runs);
    batting.balls_faced = batting.balls_faced.saturating_add(1);
    if runs == 4 {
        batting.fours = batting.fours.saturating_add(1);
    } else if runs == 6 {
        batting.sixes = batting.sixes.saturating_add(1);
    }
    let s = scratch.entry(&event.batter.id);
    s.runs = s.runs.saturating_add(runs);
    s.balls = s.balls.saturating_add(1);

    let bowling = &mut lifetime.ensure(&event.bowler, &event.bowling_team).bowling;
    bowling.balls_bowled = bowling.balls_bowled.saturating_add(1);
    bowling.runs_conceded = bowling.runs_conceded.saturating_add(event.runs_total);
    if event.is_dot() {
        bowling.dots = bowling.dots.saturating_add(1);
    }
    let s = scratch.entry(&event.bowler.id);
    s.bowled_balls = s.bowled_balls.saturating_add(1);
    s.conceded = s.conceded.saturating_add(event.runs_total);
    if event.is_dot() {
        s.dots = s.dots.saturating_add(1);
    }

    let Some(wicket) = event.dismissal() else {
        return;
    };
    let class = wicket.class();

    if class.credits_bowler() {
        let bowling = &mut lifetime.ensure(&event.bowler, &event.bowling_team).bowling;
        bowling.wickets = bowling.wickets.saturating_add(1);
        bump(&mut bowling.wicket_types, &wicket.kind);
        if class.is_quality() {
            bowling.good_ones = bowling.good_ones.saturating_add(1);
        }
        let s = scratch.entry(&event.bowler.id);
        s.wickets = s.wickets.saturating_add(1);
        if class.is_quality() {
            s.quality_wickets = s.quality_wickets.saturating_add(1);
        }
    }

    // Every fielder named on the dismissal gets a record, credited or not.
    for fielder in &wicket.fielders {
        lifetime.ensure(fielder, &event.bowling_team);
        scratch.entry(&fielder.id);
    }

    if class.is_catch() {
        let catcher = wicket.fielders.first().or(match class {
            DismissalClass::CaughtAndBowled => Some(&event.bowler),
            _ => None,
        });
        if let Some(catcher) = catcher {
            let fielding = &mut lifetime.ensure(catcher, &event.bowling_team).fielding;
            fielding.catches = fielding.catches.saturating_add(1);
            let s = scratch.entry(&catcher.id);
            s.catches = s.catches.saturating_add(1);
        }
    }

    if class == DismissalClass::RunOut {
        for fielder in &wicket.fielders {
            let fielding = &mut lifetime.ensure(fielder, &event.bowling_team).fielding;
            fielding.run_outs = fielding.run_outs.saturating_add(1);
            let s = scratch.entry(&fielder.id);
            s.run_outs = s.run_outs.saturating_add(1);
        }
    }

    if let Some(dismissed) = &wicket.dismissed {
        let batting = &mut lifetime.ensure(dismissed, &event.batting_team).batting;
        batting.dismissals = batting.dismissals.saturating_add(1);
        bump(&mut batting.dismissal_types, &wicket.kind);
        scratch.entry(&dismissed.id);
    }
}

/// Ledger entry for a match that has been folded into the lifetime table.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProcessedMatch {
    pub match_id: String,
    /// SHA-256 of the normalized deliveries
    pub fingerprint: String,
    pub players: usize,
    pub mvp: Option<String>,
}

/// Everything that must survive between runs.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ProcessorState {
    pub players: LifetimeTable,
    pub processed: Vec<ProcessedMatch>,
}

impl ProcessorState {
    pub fn find_processed(&self, match_id: &str) -> Option<&ProcessedMatch> {
        self.processed.iter().find(|m| m.match_id == match_id)
    }

    pub fn matches_processed(&self) -> usize {
        self.processed.len()
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PlayerMatchScore {
    pub player_id: String,
    pub breakdown: ScoreBreakdown,
    /// Score folded into lifetime totals, MVP multiplier included
    pub score: f64,
    pub is_mvp: bool,
    /// False for players only named on a dismissal (no runs, balls or credits)
    pub mvp_eligible: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MatchSummary {
    pub match_id: String,
    pub events: usize,
    pub skipped_balls: usize,
    pub scores: Vec<PlayerMatchScore>,
}

impl MatchSummary {
    pub fn mvp(&self) -> Option<&PlayerMatchScore> {
        self.scores.iter().find(|s| s.is_mvp)
    }

    pub fn score_of(&self, player_id: &str) -> Option<f64> {
        self.scores.iter().find(|s| s.player_id == player_id).map(|s| s.score)
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum MatchOutcome {
    Scored(MatchSummary),
    /// The document had no usable ball-by-ball data
    NoData,
    /// The match id was folded earlier in this run
    AlreadyProcessed,
}

impl MatchOutcome {
    pub fn is_scored(&self) -> bool {
        matches!(self, MatchOutcome::Scored(_))
    }
}

/// Counters for one processing run.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct RunSummary {
    pub submitted: usize,
    pub scored: usize,
    pub no_data: usize,
    pub already_processed: usize,
    pub skipped_balls: usize,
}

impl fmt::Display for RunSummary {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(
            f,
            "{} submitted, {} scored, {} without ball-by-ball data, {} already processed, {} balls skipped",
            self.submitted, self.scored, self.no_data, self.already_processed, self.skipped_balls
        )
    }
}

/// Owns the lifetime table and processes matches in submission order.
#[derive(Debug, Clone, Default)]
pub struct StatsProcessor {
    state: ProcessorState,
    config: ScoringConfig,
    summary: RunSummary,
}

impl StatsProcessor {
    pub fn new(config: ScoringConfig) -> Self {
        Self::with_state(config, ProcessorState::default())
    }

    /// Resume from a previously saved state.
    pub fn with_state(config: ScoringConfig, state: ProcessorState) -> Self {
        Self { state, config, summary: RunSummary::default() }
    }

    pub fn config(&self) -> &ScoringConfig {
        &self.config
    }

    pub fn state(&self) -> &ProcessorState {
        &self.state
    }

    pub fn into_state(self) -> ProcessorState {
        self.state
    }

    pub fn players(&self) -> &LifetimeTable {
        &self.state.players
    }

    pub fn summary(&self) -> RunSummary {
        self.summary
    }

    /// Report of the current lifetime table, stamped now.
    pub fn report(&self) -> StatsReport {
        self.report_at(Utc::now())
    }

    pub fn report_at(&self, generated_at: DateTime<Utc>) -> StatsReport {
        StatsReport::from_state(&self.state, generated_at)
    }

    /// Feed documents in order; ids come from each document.
    pub fn process_all<'a, I>(&mut self, documents: I) -> RunSummary
    where
        I: IntoIterator<Item = &'a MatchDocument>,
    {
        for document in documents {
            self.process_document(&document.id, &document.body);
        }
        self.summary
    }

    /// Normalize `document` and process it.
    pub fn process_document(&mut self, match_id: &str, document: &Value) -> MatchOutcome {
        match normalize(document) {
            Some(normalized) => self.process_match(match_id, &normalized),
            None => {
                self.summary.submitted += 1;
                self.summary.no_data += 1;
                log::info!("No ball-by-ball data available for match {match_id}");
                MatchOutcome::NoData
            }
        }
    }

    pub fn process_match(&mut self, match_id: &str, normalized: &NormalizedMatch) -> MatchOutcome {
        self.summary.submitted += 1;
        let fingerprint = fingerprint(&normalized.events);

        if let Some(previous) = self.state.find_processed(match_id) {
            if previous.fingerprint != fingerprint {
                log::warn!(
                    "Match {match_id} was resubmitted with different deliveries; keeping the first result"
                );
            }
            self.summary.already_processed += 1;
            return MatchOutcome::AlreadyProcessed;
        }

        if normalized.events.is_empty() {
            self.summary.no_data += 1;
            return MatchOutcome::NoData;
        }

        let mut scratch = MatchTable::new();
        for event in &normalized.events {
            apply_ball(&mut self.state.players, &mut scratch, event);
        }

        let summary = self.fold_match(match_id, &scratch, normalized, fingerprint);
        self.summary.scored += 1;
        self.summary.skipped_balls += normalized.skipped;
        MatchOutcome::Scored(summary)
    }

    /// Score every touched player, apply the MVP multiplier, then fold into lifetime records.
    fn fold_match(
        &mut self,
        match_id: &str,
        scratch: &MatchTable,
        normalized: &NormalizedMatch,
        fingerprint: String,
    ) -> MatchSummary {
        let mut scores: Vec<PlayerMatchScore> = scratch
            .players()
            .iter()
            .filter_map(|id| {
                let stat = scratch.get(id)?;
                let breakdown = scoring::score(stat, &self.config);
                Some(PlayerMatchScore {
                    player_id: id.clone(),
                    breakdown,
                    score: breakdown.total(),
                    is_mvp: false,
                    mvp_eligible: !stat.is_blank(),
                })
            })
            .collect();

        // Blank records never win: a zero candidate is below any positive score.
        let raw: Vec<f64> = scores
            .iter()
            .map(|s| if s.mvp_eligible { s.score } else { 0.0 })
            .collect();
        let mvp = scoring::select_mvp(&raw).map(|idx| {
            let entry = &mut scores[idx];
            entry.score *= self.config.mvp_multiplier;
            entry.is_mvp = true;
            entry.player_id.clone()
        });

        for entry in &scores {
            if let Some(player) = self.state.players.get_mut(&entry.player_id) {
                player.record_match(match_id, entry.score);
            }
        }

        log::debug!(
            "Match {match_id}: {} deliveries, {} players, MVP {}",
            normalized.events.len(),
            scores.len(),
            mvp.as_deref().unwrap_or("none")
        );

        self.state.processed.push(ProcessedMatch {
            match_id: match_id.to_string(),
            fingerprint,
            players: scores.len(),
            mvp,
        });

        MatchSummary {
            match_id: match_id.to_string(),
            events: normalized.events.len(),
            skipped_balls: normalized.skipped,
            scores,
        }
    }
}

fn fingerprint(events: &[BallEvent]) -> String {
    let mut hasher = Sha256::new();
    match serde_json::to_vec(events) {
        Ok(bytes) => hasher.update(&bytes),
        Err(e) => log::warn!("Could not fingerprint deliveries: {e}"),
    }
    format!("{:x}", hasher.finalize())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{Wicket, UNKNOWN_TEAM};

    fn player(id: &str) -> PlayerRef {
        PlayerRef::new(id, id.to_uppercase())
    }

    fn ball(batter: &str, bowler: &str, runs: u32) -> BallEvent {
        BallEvent {
            batter: player(batter),
            bowler: player(bowler),
            runs_to_batter: runs,
            runs_extras: 0,
            runs_total: runs,
            is_wicket: false,
            wicket: None,
            batting_team: "Home".into(),
            bowling_team: "Away".into(),
        }
    }

    fn wicket_ball(batter: &str, bowler: &str, kind: &str, fielders: &[&str]) -> BallEvent {
        BallEvent {
            is_wicket: true,
            wicket: Some(Wicket {
                kind: kind.into(),
                dismissed: Some(player(batter)),
                fielders: fielders.iter().map(|f| player(f)).collect(),
            }),
            ..ball(batter, bowler, 0)
        }
    }

    fn run_match(processor: &mut StatsProcessor, id: &str, events: Vec<BallEvent>) -> MatchSummary {
        match processor.process_match(id, &NormalizedMatch::from_events(events)) {
            MatchOutcome::Scored(summary) => summary,
            other => panic!("expected a scored match, got {other:?}"),
        }
    }

    fn close(a: f64, b: f64) -> bool {
        (a - b).abs() < 1e-9
    }

    #[test]
    fn test_boundary_counters_exact() {
        let mut lifetime = LifetimeTable::new();
        let mut scratch = MatchTable::new();
        for runs in [4, 6, 5, 3] {
            apply_ball(&mut lifetime, &mut scratch, &ball("a", "x", runs));
        }

        let batter = lifetime.get("a").unwrap();
        assert_eq!(batter.batting.fours, 1);
        assert_eq!(batter.batting.sixes, 1);
        assert_eq!(batter.batting.runs, 18);
        assert_eq!(batter.batting.balls_faced, 4);
        assert_eq!(scratch.get("a").unwrap().runs, 18);
    }

    #[test]
    fn test_extras_charged_to_bowler_not_batter() {
        let mut lifetime = LifetimeTable::new();
        let mut scratch = MatchTable::new();
        let wide = BallEvent { runs_extras: 1, runs_total: 1, ..ball("a", "x", 0) };
        apply_ball(&mut lifetime, &mut scratch, &wide);

        assert_eq!(lifetime.get("a").unwrap().batting.runs, 0);
        let bowling = &lifetime.get("x").unwrap().bowling;
        assert_eq!(bowling.runs_conceded, 1);
        assert_eq!(bowling.dots, 0);
    }

    #[test]
    fn test_maiden_over_scenario() {
        let mut processor = StatsProcessor::new(ScoringConfig::default());
        let summary = run_match(&mut processor, "m1", (0..6).map(|_| ball("a", "b", 0)).collect());

        let bowler = processor.players().get("b").unwrap();
        assert_eq!(bowler.bowling.dots, 6);
        assert_eq!(bowler.bowling.wickets, 0);

        // bowling 3 * 9 + 6 dots = 33, +4 base = 37, MVP x1.3
        let b = summary.scores.iter().find(|s| s.player_id == "b").unwrap();
        assert!(close(b.breakdown.bowling, 33.0));
        assert!(close(b.breakdown.total(), 37.0));
        assert!(b.is_mvp);
        assert!(close(b.score, 48.1));

        // 0 off 6: -9 + 4
        assert!(close(summary.score_of("a").unwrap(), -5.0));
        assert!(close(bowler.total_score, 48.1));
    }

    #[test]
    fn test_run_out_credits_every_fielder() {
        let mut processor = StatsProcessor::new(ScoringConfig::default());
        let summary = run_match(
            &mut processor,
            "m1",
            vec![wicket_ball("a", "x", "run out", &["f1", "f2"])],
        );

        for id in ["f1", "f2"] {
            let fielder = processor.players().get(id).unwrap();
            assert_eq!(fielder.fielding.run_outs, 1);
            let entry = summary.scores.iter().find(|s| s.player_id == id).unwrap();
            assert!(close(entry.breakdown.fielding, 10.0));
            assert_eq!(fielder.team, "Away");
        }

        let bowler = processor.players().get("x").unwrap();
        assert_eq!(bowler.bowling.wickets, 0);
        let batter = processor.players().get("a").unwrap();
        assert_eq!(batter.batting.dismissals, 1);
        assert_eq!(batter.batting.dismissal_types.get("run out"), Some(&1));
    }

    #[test]
    fn test_catch_goes_to_first_fielder() {
        let mut lifetime = LifetimeTable::new();
        let mut scratch = MatchTable::new();
        apply_ball(&mut lifetime, &mut scratch, &wicket_ball("a", "x", "caught", &["f1", "f2"]));

        assert_eq!(lifetime.get("f1").unwrap().fielding.catches, 1);
        assert_eq!(lifetime.get("f2").unwrap().fielding.catches, 0);
        assert_eq!(lifetime.get("f2").unwrap().team, "Away");
        assert_eq!(scratch.players(), ["a", "x", "f1", "f2"]);
        assert_eq!(scratch.get("f2").unwrap().catches, 0);
        let bowling = &lifetime.get("x").unwrap().bowling;
        assert_eq!(bowling.wickets, 1);
        assert_eq!(bowling.good_ones, 0);
        assert_eq!(bowling.wicket_types.get("caught"), Some(&1));
    }

    #[test]
    fn test_caught_and_bowled_without_fielder() {
        let mut lifetime = LifetimeTable::new();
        let mut scratch = MatchTable::new();
        apply_ball(&mut lifetime, &mut scratch, &wicket_ball("a", "x", "caught and bowled", &[]));

        let bowler = lifetime.get("x").unwrap();
        assert_eq!(bowler.bowling.good_ones, 1);
        assert_eq!(bowler.fielding.catches, 1);
        let s = scratch.get("x").unwrap();
        assert_eq!((s.wickets, s.quality_wickets, s.catches), (1, 1, 1));
    }

    #[test]
    fn test_unflagged_wicket_ignored() {
        let mut lifetime = LifetimeTable::new();
        let mut scratch = MatchTable::new();
        let event = BallEvent { is_wicket: false, ..wicket_ball("a", "x", "bowled", &[]) };
        apply_ball(&mut lifetime, &mut scratch, &event);

        assert_eq!(lifetime.get("x").unwrap().bowling.wickets, 0);
        assert_eq!(lifetime.get("a").unwrap().batting.dismissals, 0);
    }

    #[test]
    fn test_fielder_only_player_is_created() {
        let mut lifetime = LifetimeTable::new();
        let mut scratch = MatchTable::new();
        apply_ball(&mut lifetime, &mut scratch, &wicket_ball("a", "x", "caught", &["sub"]));

        assert_eq!(lifetime.len(), 3);
        assert_eq!(scratch.players(), ["a", "x", "sub"]);
    }

    #[test]
    fn test_counters_saturate_on_huge_runs() {
        let mut lifetime = LifetimeTable::new();
        let mut scratch = MatchTable::new();
        let huge = ball("a", "x", 4_000_000_000);
        apply_ball(&mut lifetime, &mut scratch, &huge);
        apply_ball(&mut lifetime, &mut scratch, &huge);

        assert_eq!(lifetime.get("a").unwrap().batting.runs, u32::MAX);
        assert_eq!(lifetime.get("x").unwrap().bowling.runs_conceded, u32::MAX);
        assert_eq!(scratch.get("a").unwrap().runs, u32::MAX);
        assert_eq!(scratch.get("x").unwrap().conceded, u32::MAX);
    }

    #[test]
    fn test_named_only_player_not_mvp_candidate() {
        let mut processor = StatsProcessor::new(ScoringConfig::default());
        // non-striker "n" is run out without facing; a (0 off 3) and x (12 off 3) score below zero
        let run_out = BallEvent {
            wicket: Some(Wicket {
                kind: "run out".into(),
                dismissed: Some(player("n")),
                fielders: Vec::new(),
            }),
            is_wicket: true,
            ..ball("a", "x", 0)
        };
        let expensive = BallEvent { runs_extras: 12, runs_total: 12, ..ball("a", "x", 0) };
        let summary =
            run_match(&mut processor, "m1", vec![run_out, expensive, ball("a", "x", 0)]);

        let n = summary.scores.iter().find(|s| s.player_id == "n").unwrap();
        assert!(!n.mvp_eligible);
        assert!(!n.is_mvp);
        assert!(close(n.score, 4.0));
        assert!(summary.mvp().is_none());

        let record = processor.players().get("n").unwrap();
        assert_eq!(record.matches, 1);
        assert_eq!(record.batting.dismissals, 1);
    }

    #[test]
    fn test_mvp_tie_goes_to_first_seen() {
        let mut processor = StatsProcessor::new(ScoringConfig::default());
        // both batters score 6 off 1, the bowler concedes heavily
        let summary = run_match(&mut processor, "m1", vec![ball("a", "x", 6), ball("b", "x", 6)]);

        let mvp = summary.mvp().unwrap();
        assert_eq!(mvp.player_id, "a");
        assert_eq!(summary.scores.iter().filter(|s| s.is_mvp).count(), 1);
        assert!(close(summary.score_of("a").unwrap(), summary.score_of("b").unwrap() * 1.3));
    }

    #[test]
    fn test_no_positive_score_no_mvp() {
        let cfg = ScoringConfig { participation_bonus: 0.0, ..ScoringConfig::default() };
        let mut processor = StatsProcessor::new(cfg);
        // 0 off 1 for the batter, bowler concedes 12 off 1 in extras
        let expensive = BallEvent { runs_extras: 12, runs_total: 12, ..ball("a", "x", 0) };
        let summary = run_match(&mut processor, "m1", vec![expensive]);

        assert!(summary.mvp().is_none());
        assert!(processor.state().processed[0].mvp.is_none());
    }

    #[test]
    fn test_resubmission_is_idempotent() {
        let mut processor = StatsProcessor::new(ScoringConfig::default());
        let events = vec![ball("a", "x", 4), ball("a", "x", 1)];
        run_match(&mut processor, "m1", events.clone());
        let before = processor.players().clone();

        let outcome = processor.process_match("m1", &NormalizedMatch::from_events(events));
        assert_eq!(outcome, MatchOutcome::AlreadyProcessed);
        assert!(!outcome.is_scored());
        assert_eq!(processor.players(), &before);

        let batter = processor.players().get("a").unwrap();
        assert_eq!(batter.matches, 1);
        assert_eq!(batter.match_scores.len(), 1);
        assert_eq!(processor.summary().already_processed, 1);
    }

    #[test]
    fn test_changed_resubmission_still_ignored() {
        let mut processor = StatsProcessor::new(ScoringConfig::default());
        run_match(&mut processor, "m1", vec![ball("a", "x", 4)]);
        let outcome =
            processor.process_match("m1", &NormalizedMatch::from_events(vec![ball("a", "x", 6)]));

        assert_eq!(outcome, MatchOutcome::AlreadyProcessed);
        assert_eq!(processor.players().get("a").unwrap().batting.runs, 4);
    }

    #[test]
    fn test_matches_counted_once_per_match() {
        let mut processor = StatsProcessor::new(ScoringConfig::default());
        run_match(&mut processor, "m1", vec![ball("a", "x", 1), ball("a", "x", 2), ball("x", "a", 0)]);
        run_match(&mut processor, "m2", vec![ball("a", "y", 1)]);

        let a = processor.players().get("a").unwrap();
        assert_eq!(a.matches, 2);
        let ids: Vec<&str> = a.match_scores.iter().map(|m| m.match_id.as_str()).collect();
        assert_eq!(ids, vec!["m1", "m2"]);
        assert_eq!(processor.players().get("y").unwrap().matches, 1);
        assert_eq!(processor.state().matches_processed(), 2);
    }

    #[test]
    fn test_no_data_document_leaves_state_untouched() {
        let mut processor = StatsProcessor::new(ScoringConfig::default());
        let outcome = processor.process_document("m1", &serde_json::json!({"data": {"id": "m1"}}));

        assert_eq!(outcome, MatchOutcome::NoData);
        assert!(processor.players().is_empty());
        assert!(processor.state().find_processed("m1").is_none());
        assert_eq!(processor.summary().no_data, 1);
    }

    #[test]
    fn test_team_follows_most_recent_match() {
        let mut lifetime = LifetimeTable::new();
        let mut scratch = MatchTable::new();
        apply_ball(&mut lifetime, &mut scratch, &ball("a", "x", 0));
        let flat = BallEvent {
            batting_team: UNKNOWN_TEAM.into(),
            bowling_team: UNKNOWN_TEAM.into(),
            ..ball("a", "x", 0)
        };
        apply_ball(&mut lifetime, &mut scratch, &flat);
        assert_eq!(lifetime.get("a").unwrap().team, "Home");

        let traded = BallEvent { batting_team: "Other".into(), ..ball("a", "x", 0) };
        apply_ball(&mut lifetime, &mut scratch, &traded);
        assert_eq!(lifetime.get("a").unwrap().team, "Other");
    }

    #[test]
    fn test_table_serde_rebuilds_index() {
        let mut lifetime = LifetimeTable::new();
        let mut scratch = MatchTable::new();
        apply_ball(&mut lifetime, &mut scratch, &ball("a", "x", 2));

        let json = serde_json::to_string(&lifetime).unwrap();
        let restored: LifetimeTable = serde_json::from_str(&json).unwrap();
        assert_eq!(restored.get("x").unwrap().bowling.runs_conceded, 2);
        assert_eq!(restored, lifetime);
    }

    #[test]
    fn test_process_all_uses_document_ids() {
        use serde_json::json;

        let docs = vec![
            MatchDocument::from_value(
                json!({"data": {"id": "m1", "bbb": [{"batsman": {"id": "a"}, "bowler": {"id": "x"}, "runs": 2}]}}),
                "file-1",
            ),
            MatchDocument::from_value(json!({"data": {"id": "m2"}}), "file-2"),
            MatchDocument::from_value(
                json!({"id": "m1", "bbb": [{"batsman": {"id": "a"}, "bowler": {"id": "x"}, "runs": 2}]}),
                "file-3",
            ),
        ];

        let mut processor = StatsProcessor::new(ScoringConfig::default());
        let summary = processor.process_all(&docs);

        assert_eq!(summary.submitted, 3);
        assert_eq!(summary.scored, 1);
        assert_eq!(summary.no_data, 1);
        assert_eq!(summary.already_processed, 1);
        assert_eq!(processor.report().metadata.matches_processed, 1);
    }

    mod proptests {
        use super::*;
        use proptest::prelude::*;

        fn arb_ball() -> impl Strategy<Value = BallEvent> {
            (0usize..5, 0usize..3, 0u32..7, 0u32..3, any::<bool>(), 0usize..4).prop_map(
                |(batter, bowler, runs, extras, wicket, kind)| {
                    let kinds = ["bowled", "caught", "run out", "lbw"];
                    let batter = format!("bat{batter}");
                    let bowler = format!("bowl{bowler}");
                    BallEvent {
                        is_wicket: wicket,
                        wicket: wicket.then(|| Wicket {
                            kind: kinds[kind].to_string(),
                            dismissed: Some(player(&batter)),
                            fielders: vec![player("fld")],
                        }),
                        runs_extras: extras,
                        runs_total: runs + extras,
                        ..ball(&batter, &bowler, runs)
                    }
                },
            )
        }

        proptest! {
            /// Property: lifetime total equals the sum of recorded match scores
            #[test]
            fn prop_total_is_sum_of_match_scores(
                matches in prop::collection::vec(prop::collection::vec(arb_ball(), 1..30), 1..5)
            ) {
                let mut processor = StatsProcessor::new(ScoringConfig::default());
                for (i, events) in matches.into_iter().enumerate() {
                    processor.process_match(&format!("m{i}"), &NormalizedMatch::from_events(events));
                }
                for player in processor.players().iter() {
                    let sum: f64 = player.match_scores.iter().map(|m| m.score).sum();
                    prop_assert!((player.total_score - sum).abs() < 1e-6);
                    prop_assert_eq!(player.matches as usize, player.match_scores.len());
                }
            }

            /// Property: exactly the strict maximum gets the multiplier, at most once
            #[test]
            fn prop_single_mvp_on_strict_max(events in prop::collection::vec(arb_ball(), 1..40)) {
                let mut processor = StatsProcessor::new(ScoringConfig::default());
                let MatchOutcome::Scored(summary) =
                    processor.process_match("m", &NormalizedMatch::from_events(events))
                else {
                    return Err(TestCaseError::fail("match not scored"));
                };

                let mvps: Vec<usize> = summary
                    .scores
                    .iter()
                    .enumerate()
                    .filter(|(_, s)| s.is_mvp)
                    .map(|(i, _)| i)
                    .collect();
                prop_assert!(mvps.len() <= 1);

                if let Some(&idx) = mvps.first() {
                    prop_assert!(summary.scores[idx].mvp_eligible);
                    let top = summary.scores[idx].breakdown.total();
                    for (i, s) in summary.scores.iter().enumerate().filter(|(_, s)| s.mvp_eligible) {
                        let raw = s.breakdown.total();
                        if i < idx {
                            prop_assert!(raw < top);
                        } else {
                            prop_assert!(raw <= top);
                        }
                    }
                } else {
                    prop_assert!(summary
                        .scores
                        .iter()
                        .filter(|s| s.mvp_eligible)
                        .all(|s| s.breakdown.total() <= 0.0));
                }
            }
        }
    }
}
