// Per-average-team league baseline derived from league-wide totals.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use tracing::{debug, error};

use rotolens_core::stats::LeagueTotals;
use rotolens_core::{Category, CategoryKind, LeagueStore, Season};

/// Expected value of each category for an average team in the league.
///
/// Counting categories hold league sums divided by the team-count estimate;
/// rate categories hold the league's simple mean. A category with no usable
/// value is absent, which the rating engine reads as "no comparison possible".
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LeagueBaseline {
    pub season: Season,
    pub teams_per_league: u32,
    pub values: BTreeMap<Category, f64>,
}

impl LeagueBaseline {
    pub fn empty(season: Season, teams_per_league: u32) -> Self {
        Self {
            season,
            teams_per_league,
            values: BTreeMap::new(),
        }
    }

    pub fn from_totals(season: Season, totals: &LeagueTotals, teams_per_league: u32) -> Self {
        let mut baseline = Self::empty(season, teams_per_league);
        if teams_per_league == 0 {
            return baseline;
        }

        for category in Category::ALL {
            let stat_type = category.discipline().stat_type();
            let Some(summary) = totals.summary(stat_type, category.stat_field()) else {
                continue;
            };
            let value = match category.kind() {
                CategoryKind::Counting => summary.sum / f64::from(teams_per_league),
                CategoryKind::Rate => summary.mean,
            };
            if value.is_finite() && value != 0.0 {
                baseline.values.insert(category, value);
            }
        }

        debug!(
            "baseline for {}: {} of {} categories usable",
            season,
            baseline.values.len(),
            Category::ALL.len()
        );
        baseline
    }

    /// Build the baseline from the store. Store faults are logged and yield
    /// an empty baseline.
    pub fn fetch<S: LeagueStore + ?Sized>(store: &S, season: Season, teams_per_league: u32) -> Self {
        match store.fetch_league_totals(season) {
            Ok(totals) => Self::from_totals(season, &totals, teams_per_league),
            Err(e) => {
                error!("failed to load league totals for {}: {}", season, e);
                Self::empty(season, teams_per_league)
            }
        }
    }

    /// The baseline value, if it is usable for comparison.
    pub fn get(&self, category: Category) -> Option<f64> {
        self.values
            .get(&category)
            .copied()
            .filter(|v| v.is_finite() && *v != 0.0)
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
