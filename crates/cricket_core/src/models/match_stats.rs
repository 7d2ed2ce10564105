use serde::{Deserialize, Serialize};

/// Scratch figures for one player within the match being processed.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct MatchPlayerStat {
    pub runs: u32,
    pub balls: u32,
    pub bowled_balls: u32,
    pub conceded: u32,
    pub wickets: u32,
    pub quality_wickets: u32,
    pub dots: u32,
    pub catches: u32,
    pub run_outs: u32,
    /// Final match score, MVP multiplier included once applied
    pub score: f64,
}

impl MatchPlayerStat {
    /// No runs, balls, wickets or fielding credits in the match.
    pub fn is_blank(&self) -> bool {
        self.runs == 0
            && self.balls == 0
            && self.bowled_balls == 0
            && self.conceded == 0
            && self.wickets == 0
            && self.catches == 0
            && self.run_outs == 0
    }

    pub fn strike_rate(&self) -> f64 {
        if self.balls == 0 {
            0.0
        } else {
            self.runs as f64 / self.balls as f64
        }
    }
}
