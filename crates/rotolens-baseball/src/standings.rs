// Rotisserie standings: per-category ranks summed into a points total.

use serde::{Deserialize, Serialize};
use std::cmp::Ordering;
use std::collections::BTreeMap;

use rotolens_core::{Category, Direction, LeagueId, Season, TeamId};

use crate::aggregate::TeamAggregate;

/// One team's input to the standings computation.
#[derive(Debug, Clone, PartialEq)]
pub struct TeamLine {
    pub team_id: TeamId,
    pub team_name: String,
    pub aggregate: TeamAggregate,
}

/// Per-category ranks (worst = 1, best = number of teams) and their sum.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct TeamRanking {
    pub ranks: BTreeMap<Category, u32>,
    pub total: u32,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StandingsEntry {
    pub team_id: TeamId,
    pub team_name: String,
    pub ranks: BTreeMap<Category, u32>,
    pub total: u32,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StandingsResult {
    pub league_id: LeagueId,
    pub season: Season,
    pub raw_stats: BTreeMap<TeamId, TeamAggregate>,
    pub rankings: BTreeMap<TeamId, TeamRanking>,
    /// Sorted by total, best first.
    pub standings: Vec<StandingsEntry>,
}

impl StandingsResult {
    pub fn leader(&self) -> Option<&StandingsEntry> {
        self.standings.first()
    }

    pub fn entry(&self, team_id: TeamId) -> Option<&StandingsEntry> {
        self.standings.iter().find(|e| e.team_id == team_id)
    }
}

/// Worst-first ordering for one category.
///
/// A team without the playing time behind a rate category sorts below every
/// team that has it, whatever its (zero) value. Teams with equal values are
/// ordered by name descending, so that after position-based ranking the
/// alphabetically earlier name holds the higher rank.
fn worst_first(category: Category, a: &TeamLine, b: &TeamLine) -> Ordering {
    let by_volume = a
        .aggregate
        .has_volume(category)
        .cmp(&b.aggregate.has_volume(category));
    let (va, vb) = (a.aggregate.value(category), b.aggregate.value(category));
    let by_value = match category.direction() {
        Direction::HigherIsBetter => va.total_cmp(&vb),
        Direction::LowerIsBetter => vb.total_cmp(&va),
    };
    by_volume
        .then(by_value)
        .then_with(|| b.team_name.cmp(&a.team_name))
        .then_with(|| b.team_id.cmp(&a.team_id))
}

/// Rank every team in every category and sort by total points.
pub fn compute_standings(
    league_id: LeagueId,
    season: Season,
    teams: &[TeamLine],
    categories: &[Category],
) -> StandingsResult {
    let mut rankings: Vec<TeamRanking> = vec![TeamRanking::default(); teams.len()];

    for &category in categories {
        let mut order: Vec<usize> = (0..teams.len()).collect();
        order.sort_by(|&i, &j| worst_first(category, &teams[i], &teams[j]));

        for (pos, &idx) in order.iter().enumerate() {
            let rank = pos as u32 + 1;
            rankings[idx].ranks.insert(category, rank);
            rankings[idx].total += rank;
        }
    }

    let mut standings: Vec<StandingsEntry> = teams
        .iter()
        .zip(&rankings)
        .map(|(team, ranking)| StandingsEntry {
            team_id: team.team_id,
            team_name: team.team_name.clone(),
            ranks: ranking.ranks.clone(),
            total: ranking.total,
        })
        .collect();
    standings.sort_by(|a, b| {
        b.total
            .cmp(&a.total)
            .then_with(|| a.team_name.cmp(&b.team_name))
            .then_with(|| a.team_id.cmp(&b.team_id))
    });

    let raw_stats = teams.iter().map(|t| (t.team_id, t.aggregate)).collect();
    let rankings = teams.iter().map(|t| t.team_id).zip(rankings).collect();

    StandingsResult {
        league_id,
        season,
        raw_stats,
        rankings,
        standings,
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
