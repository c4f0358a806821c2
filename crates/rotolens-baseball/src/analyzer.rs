// Team analysis and standings projection over an injected store.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use tracing::{debug, error, info, warn};

use rotolens_core::config::Config;
use rotolens_core::roster::RosterPlayer;
use rotolens_core::stats::{PlayerSeasonStat, StatType};
use rotolens_core::{Category, LeagueId, LeagueStore, Season, StoreResult, TeamId};

use crate::aggregate::{aggregate_team, TeamAggregate};
use crate::baseline::LeagueBaseline;
use crate::rating::{rate_team, strengths_and_weaknesses, CategoryRating};
use crate::recommend::recommend;
use crate::standings::{compute_standings, StandingsResult, TeamLine};

/// Complete evaluation of one team. Always rebuilt as a whole.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TeamAnalysis {
    pub team_id: TeamId,
    pub team_name: String,
    pub league_name: String,
    pub season: Season,
    /// Active roster slots counted by fantasy position.
    pub roster_breakdown: BTreeMap<String, usize>,
    pub category_ratings: BTreeMap<Category, u8>,
    pub strengths: Vec<Category>,
    pub weaknesses: Vec<Category>,
    pub recommendations: Vec<String>,
}

impl TeamAnalysis {
    pub fn ratings(&self) -> impl Iterator<Item = CategoryRating> + '_ {
        self.category_ratings
            .iter()
            .map(|(&category, &rating)| CategoryRating { category, rating })
    }
}

/// Entry point for the two analysis operations.
pub struct Analyzer<S> {
    store: S,
    config: Config,
}

impl<S: LeagueStore> Analyzer<S> {
    pub fn new(store: S, config: Config) -> Self {
        Self { store, config }
    }

    /// Baseline used for ratings in `season`. Store faults degrade to an
    /// empty baseline.
    pub fn league_baseline(&self, season: Season) -> LeagueBaseline {
        LeagueBaseline::fetch(&self.store, season, self.config.baseline.teams_per_league)
    }

    /// Rate a team's categories against the league and derive advice.
    ///
    /// Returns `Ok(None)` for an unknown team.
    pub fn analyze_team(&self, team_id: TeamId) -> StoreResult<Option<TeamAnalysis>> {
        let team = match self.store.fetch_team(team_id) {
            Ok(Some(team)) => team,
            Ok(None) => {
                warn!("team {} not found", team_id);
                return Ok(None);
            }
            Err(e) => {
                error!("failed to load team {}: {}", team_id, e);
                return Err(e);
            }
        };

        let roster = self.roster_of(team.team_id, team.season)?;
        let roster_breakdown = breakdown(&roster);
        let aggregate = self.aggregate_roster(team.season, &roster)?;

        let baseline = self.league_baseline(team.season);
        let rating_cfg = &self.config.rating;
        let category_ratings = rate_team(
            &aggregate,
            &baseline,
            &self.config.categories.rated,
            rating_cfg,
        );
        let (strengths, weaknesses) = strengths_and_weaknesses(&category_ratings, rating_cfg);
        let recommendations = recommend(
            &roster_breakdown,
            &strengths,
            &weaknesses,
            &self.config.roster,
        )
        .into_iter()
        .map(|r| r.message().to_string())
        .collect();

        info!(
            "analyzed {} ({} players, {} categories rated)",
            team.team_name,
            roster.len(),
            category_ratings.len()
        );

        Ok(Some(TeamAnalysis {
            team_id: team.team_id,
            team_name: team.team_name,
            league_name: team.league_name,
            season: team.season,
            roster_breakdown,
            category_ratings,
            strengths,
            weaknesses,
            recommendations,
        }))
    }

    /// Rotisserie standings for the league's most recent season.
    ///
    /// Returns `Ok(None)` when the league has no teams.
    pub fn project_standings(&self, league_id: LeagueId) -> StoreResult<Option<StandingsResult>> {
        let season = self.store.latest_season(league_id).map_err(|e| {
            error!("failed to find latest season for league {}: {}", league_id, e);
            e
        })?;
        match season {
            Some(season) => self.project_standings_for(league_id, season),
            None => {
                warn!("league {} has no teams", league_id);
                Ok(None)
            }
        }
    }

    /// Rotisserie standings for every team the league fielded in `season`.
    ///
    /// Returns `Ok(None)` when the league has no teams that season.
    pub fn project_standings_for(
        &self,
        league_id: LeagueId,
        season: Season,
    ) -> StoreResult<Option<StandingsResult>> {
        let teams = self.store.fetch_league_teams(league_id, season).map_err(|e| {
            error!("failed to load teams for league {} ({}): {}", league_id, season, e);
            e
        })?;
        if teams.is_empty() {
            warn!("league {} has no teams in {}", league_id, season);
            return Ok(None);
        }

        let mut lines = Vec::with_capacity(teams.len());
        for (team_id, team_name) in teams {
            let roster = self.roster_of(team_id, season)?;
            let aggregate = self.aggregate_roster(season, &roster)?;
            lines.push(TeamLine {
                team_id,
                team_name,
                aggregate,
            });
        }

        let categories = &self.config.categories.standings;
        let result = compute_standings(league_id, season, &lines, categories);
        if let Some(leader) = result.leader() {
            info!(
                "projected {} standings for league {}: {} teams, leader {} ({} pts)",
                season,
                league_id,
                result.standings.len(),
                leader.team_name,
                leader.total
            );
        }
        Ok(Some(result))
    }

    fn roster_of(&self, team_id: TeamId, season: Season) -> StoreResult<Vec<RosterPlayer>> {
        self.store.fetch_roster(team_id, season).map_err(|e| {
            error!("failed to load roster for team {}: {}", team_id, e);
            e
        })
    }

    /// Fetch each rostered player's season line and aggregate them.
    fn aggregate_roster(&self, season: Season, roster: &[RosterPlayer]) -> StoreResult<TeamAggregate> {
        let mut batting = Vec::new();
        let mut pitching = Vec::new();

        for player in roster {
            let stat_type = player.player_type().stat_type();
            let line = self
                .store
                .fetch_player_stat(player.player_id, season, stat_type)
                .map_err(|e| {
                    error!(
                        "failed to load {} stats for {} ({}): {}",
                        stat_type, player.name, player.player_id, e
                    );
                    e
                })?;
            let Some(line) = line else {
                debug!("no {} {} stats for {}", season, stat_type, player.name);
                continue;
            };
            push_line(&mut batting, &mut pitching, line);
        }

        Ok(aggregate_team(&batting, &pitching))
    }
}

fn push_line(
    batting: &mut Vec<PlayerSeasonStat>,
    pitching: &mut Vec<PlayerSeasonStat>,
    line: PlayerSeasonStat,
) {
    match line.stat_type {
        StatType::Batting => batting.push(line),
        StatType::Pitching => pitching.push(line),
    }
}

/// Count roster rows by fantasy position.
fn breakdown(roster: &[RosterPlayer]) -> BTreeMap<String, usize> {
    let mut counts = BTreeMap::new();
    for player in roster {
        *counts
            .entry(player.fantasy_position.trim().to_uppercase())
            .or_insert(0) += 1;
    }
    counts
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
