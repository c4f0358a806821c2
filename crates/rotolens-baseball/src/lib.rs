// Roster evaluation: stat aggregation, league baselines, category ratings,
// recommendations, and rotisserie standings.

pub mod aggregate;
pub mod analyzer;
pub mod baseline;
pub mod rating;
pub mod recommend;
pub mod standings;

pub use aggregate::TeamAggregate;
pub use analyzer::{Analyzer, TeamAnalysis};
pub use baseline::LeagueBaseline;
pub use rating::CategoryRating;
pub use recommend::Recommendation;
pub use standings::{StandingsEntry, StandingsResult};
