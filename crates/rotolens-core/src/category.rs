// Scoring categories shared by the rating engine and rotisserie standings.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

use crate::stats::{StatField, StatType};

/// Which side of the box score a category belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Discipline {
    Hitting,
    Pitching,
}

impl Discipline {
    /// The stat-type rows that feed this discipline.
    pub fn stat_type(self) -> StatType {
        match self {
            Discipline::Hitting => StatType::Batting,
            Discipline::Pitching => StatType::Pitching,
        }
    }
}

/// Counting stats are summed across a roster; rate stats are weighted
/// averages over an opportunity count.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CategoryKind {
    Counting,
    Rate,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Direction {
    HigherIsBetter,
    LowerIsBetter,
}

/// A scored statistical dimension.
///
/// Ordering follows declaration order, so maps keyed by `Category` iterate
/// hitting categories first.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Category {
    BattingAvg,
    HomeRuns,
    Runs,
    Rbi,
    StolenBases,
    Era,
    Whip,
    Strikeouts,
    Wins,
    Saves,
}

impl Category {
    pub const ALL: [Category; 10] = [
        Category::BattingAvg,
        Category::HomeRuns,
        Category::Runs,
        Category::Rbi,
        Category::StolenBases,
        Category::Era,
        Category::Whip,
        Category::Strikeouts,
        Category::Wins,
        Category::Saves,
    ];

    /// Categories rated on the 1-10 scale unless configured otherwise.
    pub const RATED: [Category; 9] = [
        Category::HomeRuns,
        Category::Rbi,
        Category::StolenBases,
        Category::BattingAvg,
        Category::Era,
        Category::Whip,
        Category::Wins,
        Category::Saves,
        Category::Strikeouts,
    ];

    pub fn discipline(self) -> Discipline {
        match self {
            Category::BattingAvg
            | Category::HomeRuns
            | Category::Runs
            | Category::Rbi
            | Category::StolenBases => Discipline::Hitting,
            Category::Era
            | Category::Whip
            | Category::Strikeouts
            | Category::Wins
            | Category::Saves => Discipline::Pitching,
        }
    }

    pub fn kind(self) -> CategoryKind {
        match self {
            Category::BattingAvg | Category::Era | Category::Whip => CategoryKind::Rate,
            _ => CategoryKind::Counting,
        }
    }

    pub fn direction(self) -> Direction {
        match self {
            Category::Era | Category::Whip => Direction::LowerIsBetter,
            _ => Direction::HigherIsBetter,
        }
    }

    /// Canonical stat-field name, also the serialized form.
    pub fn key(self) -> &'static str {
        match self {
            Category::BattingAvg => "batting_avg",
            Category::HomeRuns => "home_runs",
            Category::Runs => "runs",
            Category::Rbi => "rbi",
            Category::StolenBases => "stolen_bases",
            Category::Era => "era",
            Category::Whip => "whip",
            Category::Strikeouts => "strikeouts",
            Category::Wins => "wins",
            Category::Saves => "saves",
        }
    }

    /// The stat-line field holding this category's value.
    pub fn stat_field(self) -> StatField {
        match self {
            Category::BattingAvg => StatField::BattingAvg,
            Category::HomeRuns => StatField::HomeRuns,
            Category::Runs => StatField::Runs,
            Category::Rbi => StatField::Rbi,
            Category::StolenBases => StatField::StolenBases,
            Category::Era => StatField::Era,
            Category::Whip => StatField::Whip,
            Category::Strikeouts => StatField::Strikeouts,
            Category::Wins => StatField::Wins,
            Category::Saves => StatField::Saves,
        }
    }

    /// Short label used on standings tables.
    pub fn abbrev(self) -> &'static str {
        match self {
            Category::BattingAvg => "avg",
            Category::HomeRuns => "hr",
            Category::Runs => "r",
            Category::Rbi => "rbi",
            Category::StolenBases => "sb",
            Category::Era => "era",
            Category::Whip => "whip",
            Category::Strikeouts => "k",
            Category::Wins => "w",
            Category::Saves => "sv",
        }
    }
}

impl fmt::Display for Category {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.key())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("unknown category `{0}`")]
pub struct UnknownCategory(pub String);

impl FromStr for Category {
    type Err = UnknownCategory;

    /// Accepts either the canonical key (`home_runs`) or the standings
    /// abbreviation (`hr`), case-insensitively.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let needle = s.trim().to_ascii_lowercase();
        Category::ALL
            .into_iter()
            .find(|c| c.key() == needle || c.abbrev() == needle)
            .ok_or_else(|| UnknownCategory(s.to_string()))
    }
}
