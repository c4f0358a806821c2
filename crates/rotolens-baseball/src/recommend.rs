// Improvement advice derived from roster shape and category ratings.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;

use rotolens_core::config::RosterRules;
use rotolens_core::roster::Position;
use rotolens_core::{Category, Discipline};

/// Trading suggestions only fire with at least this many strengths on one
/// side of the ball.
const TRADE_MIN_STRENGTHS: usize = 3;
const TRADE_MIN_WEAKNESSES: usize = 2;
/// Strength surplus over weaknesses before a general trade is suggested.
const SURPLUS_MARGIN: usize = 2;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Recommendation {
    AddOutfielders,
    AddRelievers,
    TargetSpeed,
    AddClosers,
    StreamQualityPitchers,
    TargetBattingAverage,
    TradeFromStrengths,
    TradePitchingForHitting,
    TradeHittingForPitching,
}

impl Recommendation {
    pub fn message(self) -> &'static str {
        match self {
            Recommendation::AddOutfielders => "Need to add more outfielders",
            Recommendation::AddRelievers => "Add more relievers to compete in saves",
            Recommendation::TargetSpeed => "Target speed players to improve stolen bases category",
            Recommendation::AddClosers => "Add closers to improve in the saves category",
            Recommendation::StreamQualityPitchers => {
                "Consider streaming only high-quality pitchers to improve ratios"
            }
            Recommendation::TargetBattingAverage => {
                "Look for high-average hitters to improve batting average"
            }
            Recommendation::TradeFromStrengths => {
                "Consider trading from your strengths to address weaknesses"
            }
            Recommendation::TradePitchingForHitting => "Consider trading pitching for hitting help",
            Recommendation::TradeHittingForPitching => "Consider trading hitting for pitching help",
        }
    }
}

impl fmt::Display for Recommendation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.message())
    }
}

/// Count roster slots matching `pred`. Unrecognised slot labels never match.
fn count_slots(breakdown: &BTreeMap<String, usize>, pred: impl Fn(&Position) -> bool) -> usize {
    breakdown
        .iter()
        .filter(|(slot, _)| Position::from_str_pos(slot).is_some_and(|p| pred(&p)))
        .map(|(_, n)| *n)
        .sum()
}

fn count_side(categories: &[Category], discipline: Discipline) -> usize {
    categories
        .iter()
        .filter(|c| c.discipline() == discipline)
        .count()
}

/// Apply the recommendation rules in order. Each rule contributes at most
/// one recommendation; the two trade-balance rules are mutually exclusive.
pub fn recommend(
    breakdown: &BTreeMap<String, usize>,
    strengths: &[Category],
    weaknesses: &[Category],
    rules: &RosterRules,
) -> Vec<Recommendation> {
    let mut out = Vec::new();
    let weak = |c: Category| weaknesses.contains(&c);

    if count_slots(breakdown, Position::is_outfield) < rules.min_outfielders {
        out.push(Recommendation::AddOutfielders);
    }
    if count_slots(breakdown, Position::is_relief) < rules.min_relievers {
        out.push(Recommendation::AddRelievers);
    }

    if weak(Category::StolenBases) {
        out.push(Recommendation::TargetSpeed);
    }
    if weak(Category::Saves) {
        out.push(Recommendation::AddClosers);
    }
    if weak(Category::Era) && weak(Category::Whip) {
        out.push(Recommendation::StreamQualityPitchers);
    }
    if weak(Category::BattingAvg) {
        out.push(Recommendation::TargetBattingAverage);
    }

    if strengths.len() > weaknesses.len() + SURPLUS_MARGIN {
        out.push(Recommendation::TradeFromStrengths);
    }

    let pitching_strengths = count_side(strengths, Discipline::Pitching);
    let hitting_strengths = count_side(strengths, Discipline::Hitting);
    let pitching_weaknesses = count_side(weaknesses, Discipline::Pitching);
    let hitting_weaknesses = count_side(weaknesses, Discipline::Hitting);

    if pitching_strengths >= TRADE_MIN_STRENGTHS && hitting_weaknesses >= TRADE_MIN_WEAKNESSES {
        out.push(Recommendation::TradePitchingForHitting);
    } else if hitting_strengths >= TRADE_MIN_STRENGTHS
        && pitching_weaknesses >= TRADE_MIN_WEAKNESSES
    {
        out.push(Recommendation::TradeHittingForPitching);
    }

    out
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
