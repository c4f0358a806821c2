// Identifier aliases shared across the store and the analysis engines.

pub type LeagueId = i64;
pub type TeamId = i64;
pub type PlayerId = i64;
pub type Season = i32;
