use serde::{Deserialize, Serialize};

/// Team name used when the source carries no innings context.
pub const UNKNOWN_TEAM: &str = "Unknown Team";

#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct PlayerRef {
    pub id: String,
    pub name: String,
}

impl PlayerRef {
    pub fn new(id: impl Into<String>, name: impl Into<String>) -> Self {
        Self { id: id.into(), name: name.into() }
    }
}

/// One delivery, resolved from whichever source layout it came in.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BallEvent {
    pub batter: PlayerRef,
    pub bowler: PlayerRef,
    pub runs_to_batter: u32,
    pub runs_extras: u32,
    /// Runs charged to the bowler, extras included
    pub runs_total: u32,
    pub is_wicket: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub wicket: Option<Wicket>,
    pub batting_team: String,
    pub bowling_team: String,
}

impl BallEvent {
    pub fn is_dot(&self) -> bool {
        self.runs_total == 0
    }

    /// Wicket details, only when the delivery is flagged as a wicket.
    pub fn dismissal(&self) -> Option<&Wicket> {
        if self.is_wicket {
            self.wicket.as_ref()
        } else {
            None
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Wicket {
    /// Dismissal type exactly as the source wrote it
    pub kind: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub dismissed: Option<PlayerRef>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub fielders: Vec<PlayerRef>,
}

impl Wicket {
    pub fn class(&self) -> DismissalClass {
        DismissalClass::from_text(&self.kind)
    }
}

/// Dismissal types the scorer distinguishes. Anything else is `Other`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum DismissalClass {
    Bowled,
    Caught,
    Lbw,
    Stumped,
    CaughtAndBowled,
    HitWicket,
    RunOut,
    Other,
}

impl DismissalClass {
    pub fn from_text(kind: &str) -> Self {
        match kind.trim().to_ascii_lowercase().as_str() {
            "bowled" => DismissalClass::Bowled,
            "caught" => DismissalClass::Caught,
            "lbw" => DismissalClass::Lbw,
            "stumped" => DismissalClass::Stumped,
            "caught and bowled" | "caught & bowled" => DismissalClass::CaughtAndBowled,
            "hit wicket" => DismissalClass::HitWicket,
            "run out" | "runout" => DismissalClass::RunOut,
            _ => DismissalClass::Other,
        }
    }

    /// Counts towards the bowler's wickets. Run-outs never do.
    pub fn credits_bowler(self) -> bool {
        matches!(
            self,
            DismissalClass::Bowled
                | DismissalClass::Caught
                | DismissalClass::Lbw
                | DismissalClass::Stumped
                | DismissalClass::CaughtAndBowled
                | DismissalClass::HitWicket
        )
    }

    pub fn is_quality(self) -> bool {
        matches!(
            self,
            DismissalClass::Bowled | DismissalClass::Lbw | DismissalClass::CaughtAndBowled
        )
    }

    pub fn is_catch(self) -> bool {
        matches!(self, DismissalClass::Caught | DismissalClass::CaughtAndBowled)
    }
}
