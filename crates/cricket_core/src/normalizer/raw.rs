//! Wire shapes of the match-detail feeds.
//!
//! Every field the feeds disagree on is an untagged enum here, so the rest of
//! the crate only ever sees a resolved [`BallEvent`].

use serde::de::DeserializeOwned;
use serde::{Deserialize, Deserializer};
use serde_json::Value;

use crate::models::{BallEvent, PlayerRef, Wicket, UNKNOWN_TEAM};

/// Field that decodes to `None` instead of failing the surrounding ball.
fn lenient<'de, D, T>(deserializer: D) -> Result<Option<T>, D::Error>
where
    D: Deserializer<'de>,
    T: DeserializeOwned,
{
    let value = Value::deserialize(deserializer)?;
    Ok(T::deserialize(value).ok())
}

/// Player id as a string or a bare number.
#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
pub(crate) enum RawId {
    Text(String),
    Number(i64),
}

impl RawId {
    fn resolve(&self) -> Option<String> {
        match self {
            RawId::Text(s) => {
                let s = s.trim();
                (!s.is_empty()).then(|| s.to_string())
            }
            RawId::Number(n) => Some(n.to_string()),
        }
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
pub(crate) struct RawPlayer {
    #[serde(default)]
    pub id: Option<RawId>,
    #[serde(default)]
    pub name: Option<String>,
}

impl RawPlayer {
    fn resolve(&self, fallback_name: &str) -> Option<PlayerRef> {
        let id = self.id.as_ref()?.resolve()?;
        let name = self
            .name
            .as_deref()
            .map(str::trim)
            .filter(|n| !n.is_empty())
            .unwrap_or(fallback_name);
        Some(PlayerRef::new(id, name))
    }
}

/// Runs either as a breakdown object or as a bare count for the batter.
#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
pub(crate) enum RawRuns {
    Bare(i64),
    Detailed {
        #[serde(default, deserialize_with = "lenient")]
        batter: Option<i64>,
        #[serde(default, deserialize_with = "lenient")]
        extras: Option<i64>,
        #[serde(default, deserialize_with = "lenient")]
        total: Option<i64>,
    },
}

/// `(batter, extras, total)`; `sibling_extras` is the ball-level `extras` used with bare runs.
fn resolve_runs(runs: Option<&RawRuns>, sibling_extras: i64) -> (u32, u32, u32) {
    let (batter, extras, total) = match runs {
        Some(RawRuns::Detailed { batter, extras, total }) => {
            let batter = batter.unwrap_or(0);
            let extras = extras.unwrap_or(0);
            (batter, extras, total.unwrap_or_else(|| batter.saturating_add(extras)))
        }
        Some(RawRuns::Bare(batter)) => {
            (*batter, sibling_extras, batter.saturating_add(sibling_extras))
        }
        None => (0, sibling_extras, sibling_extras),
    };
    (clamp_count(batter), clamp_count(extras), clamp_count(total))
}

fn clamp_count(value: i64) -> u32 {
    u32::try_from(value).unwrap_or(0)
}

/// Innings team as `{ "name": .. }` or a bare string.
#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
pub(crate) enum RawTeam {
    Bare(String),
    Named {
        #[serde(default)]
        name: Option<String>,
    },
}

impl RawTeam {
    pub fn name(team: Option<&RawTeam>) -> String {
        let name = match team {
            Some(RawTeam::Bare(name)) => Some(name.as_str()),
            Some(RawTeam::Named { name }) => name.as_deref(),
            None => None,
        };
        name.map(str::trim)
            .filter(|n| !n.is_empty())
            .unwrap_or(UNKNOWN_TEAM)
            .to_string()
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct RawInnings {
    #[serde(default)]
    pub batting_team: Option<RawTeam>,
    #[serde(default)]
    pub bowling_team: Option<RawTeam>,
    #[serde(default)]
    pub overs: Vec<RawOver>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub(crate) struct RawOver {
    /// Kept undecoded so one bad ball does not sink the over
    #[serde(default)]
    pub balls: Vec<Value>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct RawWicket {
    #[serde(rename = "type", default, deserialize_with = "lenient")]
    pub kind: Option<String>,
    #[serde(default, deserialize_with = "lenient")]
    pub player_out: Option<RawPlayer>,
    #[serde(default, deserialize_with = "lenient")]
    pub player: Option<RawPlayer>,
    #[serde(default, deserialize_with = "lenient")]
    pub fielders: Option<Vec<RawPlayer>>,
    #[serde(default, deserialize_with = "lenient")]
    pub fielder: Option<RawPlayer>,
}

impl RawWicket {
    fn resolve(&self) -> Wicket {
        let kind = self
            .kind
            .as_deref()
            .filter(|k| !k.trim().is_empty())
            .unwrap_or("Unknown")
            .to_string();

        let dismissed = self
            .player_out
            .as_ref()
            .and_then(|p| p.resolve("Unknown Batter"))
            .or_else(|| self.player.as_ref().and_then(|p| p.resolve("Unknown Batter")));

        let fielders = match (&self.fielders, &self.fielder) {
            (Some(list), _) if !list.is_empty() => list
                .iter()
                .filter_map(|f| f.resolve("Unknown Fielder"))
                .collect(),
            (_, Some(single)) => single.resolve("Unknown Fielder").into_iter().collect(),
            _ => Vec::new(),
        };

        Wicket { kind, dismissed, fielders }
    }
}

/// Every field is lenient: only an unresolvable batter or bowler drops a ball.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct RawBall {
    #[serde(default, deserialize_with = "lenient")]
    pub batter: Option<RawPlayer>,
    /// Legacy name for `batter`
    #[serde(default, deserialize_with = "lenient")]
    pub batsman: Option<RawPlayer>,
    #[serde(default, deserialize_with = "lenient")]
    pub bowler: Option<RawPlayer>,
    #[serde(default, deserialize_with = "lenient")]
    pub runs: Option<RawRuns>,
    #[serde(default)]
    pub extras: Option<Value>,
    #[serde(default, deserialize_with = "lenient")]
    pub is_wicket: Option<bool>,
    #[serde(default, deserialize_with = "lenient")]
    pub wicket: Option<RawWicket>,
}

impl RawBall {
    /// `None` when the batter or bowler cannot be identified.
    pub fn into_event(self, batting_team: &str, bowling_team: &str) -> Option<BallEvent> {
        let batter = self
            .batter
            .as_ref()
            .and_then(|b| b.resolve("Unknown Batter"))
            .or_else(|| self.batsman.as_ref().and_then(|b| b.resolve("Unknown Batter")))?;
        let bowler = self.bowler.as_ref()?.resolve("Unknown Bowler")?;

        let sibling_extras = self.extras.as_ref().and_then(Value::as_i64).unwrap_or(0);
        let (runs_to_batter, runs_extras, runs_total) =
            resolve_runs(self.runs.as_ref(), sibling_extras);

        Some(BallEvent {
            batter,
            bowler,
            runs_to_batter,
            runs_extras,
            runs_total,
            is_wicket: self.is_wicket.unwrap_or(false),
            wicket: self.wicket.as_ref().map(RawWicket::resolve),
            batting_team: batting_team.to_string(),
            bowling_team: bowling_team.to_string(),
        })
    }
}
