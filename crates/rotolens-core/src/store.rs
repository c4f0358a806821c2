// Data-access seam consumed by the analysis engines.

use thiserror::Error;

use crate::ids::{LeagueId, PlayerId, Season, TeamId};
use crate::roster::{RosterPlayer, TeamRecord};
use crate::stats::{LeagueTotals, PlayerSeasonStat, StatType};

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("failed to open store at {path}: {source}")]
    Open {
        path: String,
        source: rusqlite::Error,
    },

    #[error("{operation} failed: {source}")]
    Query {
        operation: &'static str,
        source: rusqlite::Error,
    },

    #[error("store unavailable: {message}")]
    Unavailable { message: String },

    #[error("invalid stored data: {message}")]
    Invalid { message: String },
}

impl StoreError {
    /// Adapter for `map_err` on rusqlite results.
    pub fn query(operation: &'static str) -> impl FnOnce(rusqlite::Error) -> StoreError {
        move |source| StoreError::Query { operation, source }
    }
}

pub type StoreResult<T> = Result<T, StoreError>;

/// Blocking read access to teams, rosters, and season stats.
///
/// Implementations must return `Ok(None)` / empty collections for data that
/// simply isn't there and reserve `Err` for genuine access faults.
pub trait LeagueStore {
    fn fetch_team(&self, team_id: TeamId) -> StoreResult<Option<TeamRecord>>;

    /// Active roster rows for the team in the given season.
    fn fetch_roster(&self, team_id: TeamId, season: Season) -> StoreResult<Vec<RosterPlayer>>;

    fn fetch_player_stat(
        &self,
        player_id: PlayerId,
        season: Season,
        stat_type: StatType,
    ) -> StoreResult<Option<PlayerSeasonStat>>;

    /// League-wide sums and means across all actively rostered players.
    fn fetch_league_totals(&self, season: Season) -> StoreResult<LeagueTotals>;

    /// `(team_id, team_name)` for every team in the league's given season.
    fn fetch_league_teams(
        &self,
        league_id: LeagueId,
        season: Season,
    ) -> StoreResult<Vec<(TeamId, String)>>;

    /// The most recent season the league has teams in.
    fn latest_season(&self, league_id: LeagueId) -> StoreResult<Option<Season>>;
}

impl<S: LeagueStore + ?Sized> LeagueStore for &S {
    fn fetch_team(&self, team_id: TeamId) -> StoreResult<Option<TeamRecord>> {
        (**self).fetch_team(team_id)
    }

    fn fetch_roster(&self, team_id: TeamId, season: Season) -> StoreResult<Vec<RosterPlayer>> {
        (**self).fetch_roster(team_id, season)
    }

    fn fetch_player_stat(
        &self,
        player_id: PlayerId,
        season: Season,
        stat_type: StatType,
    ) -> StoreResult<Option<PlayerSeasonStat>> {
        (**self).fetch_player_stat(player_id, season, stat_type)
    }

    fn fetch_league_totals(&self, season: Season) -> StoreResult<LeagueTotals> {
        (**self).fetch_league_totals(season)
    }

    fn fetch_league_teams(
        &self,
        league_id: LeagueId,
        season: Season,
    ) -> StoreResult<Vec<(TeamId, String)>> {
        (**self).fetch_league_teams(league_id, season)
    }

    fn latest_season(&self, league_id: LeagueId) -> StoreResult<Option<Season>> {
        (**self).latest_season(league_id)
    }
}
