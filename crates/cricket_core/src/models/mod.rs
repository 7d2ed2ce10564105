pub mod ball;
pub mod match_stats;
pub mod player_stats;

pub use ball::{BallEvent, DismissalClass, PlayerRef, Wicket, UNKNOWN_TEAM};
pub use match_stats::MatchPlayerStat;
pub use player_stats::{BattingTotals, BowlingTotals, FieldingTotals, MatchScore, PlayerLifetimeStat};
