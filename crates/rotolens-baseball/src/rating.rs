// 1-10 category ratings of a team aggregate against the league baseline.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use tracing::debug;

use rotolens_core::config::RatingConfig;
use rotolens_core::{Category, CategoryKind, Direction};

use crate::aggregate::TeamAggregate;
use crate::baseline::LeagueBaseline;

pub const MIN_RATING: u8 = 1;
pub const MAX_RATING: u8 = 10;
pub const MID_RATING: u8 = 5;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct CategoryRating {
    pub category: Category,
    pub rating: u8,
}

/// Map a raw score (already offset around the midpoint) onto the rating
/// scale. Non-finite scores land on the midpoint.
pub fn clamp_rating(raw: f64) -> u8 {
    if !raw.is_finite() {
        return MID_RATING;
    }
    raw.floor().clamp(f64::from(MIN_RATING), f64::from(MAX_RATING)) as u8
}

/// Rate one category value against its baseline.
///
/// Counting categories score `(team / baseline - 1) * 5 + 5`, so the
/// baseline maps to 5 and twice the baseline to 10. Rate categories score
/// the difference from baseline in units of `spread`, `* 5 + 5`, with the
/// sign flipped for lower-is-better stats.
pub fn rate_category(category: Category, team: f64, baseline: f64, cfg: &RatingConfig) -> u8 {
    let deviation = match category.kind() {
        CategoryKind::Counting => match category.direction() {
            Direction::HigherIsBetter => team / baseline - 1.0,
            Direction::LowerIsBetter => 1.0 - team / baseline,
        },
        CategoryKind::Rate => {
            let spread = cfg.spread(category).unwrap_or(f64::NAN);
            let diff = match category.direction() {
                Direction::HigherIsBetter => team - baseline,
                Direction::LowerIsBetter => baseline - team,
            };
            diff / spread
        }
    };
    clamp_rating((deviation * 5.0).floor() + f64::from(MID_RATING))
}

/// Rate every requested category the team and baseline can support.
///
/// A category is skipped when the baseline has no usable value for it, when
/// the team has no players on that side of the ball, or, for rate
/// categories, when those players logged no plate appearances or innings.
pub fn rate_team(
    aggregate: &TeamAggregate,
    baseline: &LeagueBaseline,
    categories: &[Category],
    cfg: &RatingConfig,
) -> BTreeMap<Category, u8> {
    let mut ratings = BTreeMap::new();
    for &category in categories {
        if aggregate.players_in(category.discipline()) == 0 {
            continue;
        }
        if !aggregate.has_volume(category) {
            debug!("no playing time behind {}, skipping", category);
            continue;
        }
        let Some(base) = baseline.get(category) else {
            debug!("no baseline for {}, skipping", category);
            continue;
        };
        let rating = rate_category(category, aggregate.value(category), base, cfg);
        ratings.insert(category, rating);
    }
    ratings
}

/// Split ratings into strengths (at or above the strength threshold) and
/// weaknesses (at or below the weakness threshold).
pub fn strengths_and_weaknesses(
    ratings: &BTreeMap<Category, u8>,
    cfg: &RatingConfig,
) -> (Vec<Category>, Vec<Category>) {
    let strengths = ratings
        .iter()
        .filter(|(_, r)| **r >= cfg.strength_threshold)
        .map(|(c, _)| *c)
        .collect();
    let weaknesses = ratings
        .iter()
        .filter(|(_, r)| **r <= cfg.weakness_threshold)
        .map(|(c, _)| *c)
        .collect();
    (strengths, weaknesses)
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
