//! # Event Normalizer
//!
//! Turns a match-detail document into an ordered list of [`BallEvent`]s.
//!
//! Two feed layouts are recognised:
//! - **Innings**: `[{battingTeam, bowlingTeam, overs: [{balls: [..]}]}]`
//! - **Flat**: `[{batter|batsman, bowler, runs, ..}]` with no team context
//!
//! The ball list sits under `ballByBall` or `bbb`, optionally wrapped in a
//! `data` envelope. A document without a usable ball list yields `None`, which
//! callers treat as "no ball-by-ball data" rather than an error.

mod raw;

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::models::{BallEvent, UNKNOWN_TEAM};
use raw::{RawBall, RawInnings, RawTeam};

/// Key the ball list was found under.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum BallSource {
    /// `ballByBall`
    BallByBall,
    /// `bbb`
    Bbb,
}

impl BallSource {
    pub fn key(self) -> &'static str {
        match self {
            BallSource::BallByBall => "ballByBall",
            BallSource::Bbb => "bbb",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum BallLayout {
    Innings,
    Flat,
}

/// Ball list after the layout decision, before per-ball decoding.
enum BallList<'a> {
    Innings(Vec<RawInnings>),
    Flat(&'a [Value]),
}

impl<'a> BallList<'a> {
    /// Innings form when any element is an object carrying `overs`; only those elements are used.
    fn classify(items: &'a [Value]) -> Self {
        let innings: Vec<&Value> = items
            .iter()
            .filter(|item| item.as_object().is_some_and(|obj| obj.contains_key("overs")))
            .collect();

        if innings.is_empty() {
            return BallList::Flat(items);
        }

        let decoded = innings
            .into_iter()
            .filter_map(|item| match RawInnings::deserialize(item) {
                Ok(inning) => Some(inning),
                Err(e) => {
                    log::debug!("Skipping undecodable innings: {e}");
                    None
                }
            })
            .collect();
        BallList::Innings(decoded)
    }

    fn layout(&self) -> BallLayout {
        match self {
            BallList::Innings(_) => BallLayout::Innings,
            BallList::Flat(_) => BallLayout::Flat,
        }
    }
}

/// Normalized deliveries of one match.
#[derive(Debug, Clone, PartialEq)]
pub struct NormalizedMatch {
    pub source: BallSource,
    pub layout: BallLayout,
    pub events: Vec<BallEvent>,
    /// Balls dropped because the batter or bowler could not be identified
    pub skipped: usize,
}

impl NormalizedMatch {
    pub fn from_events(events: Vec<BallEvent>) -> Self {
        Self { source: BallSource::BallByBall, layout: BallLayout::Flat, events, skipped: 0 }
    }

    fn push_raw(&mut self, ball: &Value, batting_team: &str, bowling_team: &str) {
        let event = RawBall::deserialize(ball)
            .ok()
            .and_then(|raw| raw.into_event(batting_team, bowling_team));

        match event {
            Some(event) => self.events.push(event),
            None => self.skipped += 1,
        }
    }
}

/// Strip the optional `data` envelope.
fn unwrap_envelope(document: &Value) -> &Value {
    match document.get("data") {
        Some(data) if data.is_object() => data,
        _ => document,
    }
}

fn locate_ball_list(body: &Value) -> Option<(BallSource, &Vec<Value>)> {
    [BallSource::BallByBall, BallSource::Bbb]
        .into_iter()
        .find_map(|source| match body.get(source.key()) {
            Some(Value::Array(items)) if !items.is_empty() => Some((source, items)),
            _ => None,
        })
}

/// Normalize a match-detail document. `None` means no usable ball-by-ball data.
pub fn normalize(document: &Value) -> Option<NormalizedMatch> {
    let body = unwrap_envelope(document);
    let (source, items) = locate_ball_list(body)?;

    let list = BallList::classify(items);
    let mut normalized = NormalizedMatch {
        source,
        layout: list.layout(),
        events: Vec::new(),
        skipped: 0,
    };

    match list {
        BallList::Innings(innings) => {
            for inning in &innings {
                let batting_team = RawTeam::name(inning.batting_team.as_ref());
                let bowling_team = RawTeam::name(inning.bowling_team.as_ref());
                for over in &inning.overs {
                    for ball in &over.balls {
                        normalized.push_raw(ball, &batting_team, &bowling_team);
                    }
                }
            }
        }
        BallList::Flat(balls) => {
            for ball in balls {
                normalized.push_raw(ball, UNKNOWN_TEAM, UNKNOWN_TEAM);
            }
        }
    }

    if normalized.skipped > 0 {
        log::debug!(
            "{} of {} balls skipped (no batter/bowler id)",
            normalized.skipped,
            normalized.skipped + normalized.events.len()
        );
    }

    if normalized.events.is_empty() {
        return None;
    }

    Some(normalized)
}
