// Per-player season stat lines and league-wide stat summaries.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

use crate::ids::{PlayerId, Season};

// ---------------------------------------------------------------------------
// Stat type
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StatType {
    Batting,
    Pitching,
}

impl StatType {
    pub fn as_str(self) -> &'static str {
        match self {
            StatType::Batting => "batting",
            StatType::Pitching => "pitching",
        }
    }
}

impl fmt::Display for StatType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("unknown stat type `{0}`")]
pub struct UnknownStatType(pub String);

impl FromStr for StatType {
    type Err = UnknownStatType;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "batting" | "batter" | "hitting" => Ok(StatType::Batting),
            "pitching" | "pitcher" => Ok(StatType::Pitching),
            _ => Err(UnknownStatType(s.to_string())),
        }
    }
}

// ---------------------------------------------------------------------------
// Stat fields
// ---------------------------------------------------------------------------

/// A named numeric field on a stat line, with the alternate spellings that
/// upstream sources use for it. Lookups try the candidates in order and take
/// the first key present.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum StatField {
    PlateAppearances,
    HomeRuns,
    Runs,
    Rbi,
    StolenBases,
    BattingAvg,
    InningsPitched,
    Wins,
    Saves,
    Strikeouts,
    Era,
    Whip,
}

impl StatField {
    pub const ALL: [StatField; 12] = [
        StatField::PlateAppearances,
        StatField::HomeRuns,
        StatField::Runs,
        StatField::Rbi,
        StatField::StolenBases,
        StatField::BattingAvg,
        StatField::InningsPitched,
        StatField::Wins,
        StatField::Saves,
        StatField::Strikeouts,
        StatField::Era,
        StatField::Whip,
    ];

    /// The field a stored key names, through any of its spellings.
    pub fn from_key(key: &str) -> Option<StatField> {
        StatField::ALL
            .into_iter()
            .find(|f| f.candidates().contains(&key))
    }

    pub fn candidates(self) -> &'static [&'static str] {
        match self {
            StatField::PlateAppearances => &["plate_appearances", "pa"],
            StatField::HomeRuns => &["home_runs", "hr"],
            StatField::Runs => &["runs", "r"],
            StatField::Rbi => &["rbi"],
            StatField::StolenBases => &["stolen_bases", "sb"],
            StatField::BattingAvg => &["batting_avg", "avg", "ba"],
            StatField::InningsPitched => &["innings_pitched", "ip"],
            StatField::Wins => &["wins", "w"],
            StatField::Saves => &["saves", "sv"],
            StatField::Strikeouts => &["strikeouts", "k", "so"],
            StatField::Era => &["era"],
            StatField::Whip => &["whip"],
        }
    }

    /// The canonical key (first candidate).
    pub fn key(self) -> &'static str {
        self.candidates()[0]
    }
}

/// Return the value of the first candidate key present in `fields`.
pub fn first_present<'a>(
    fields: &'a BTreeMap<String, f64>,
    candidates: &[&str],
) -> Option<(&'a str, f64)> {
    candidates.iter().find_map(|key| {
        fields
            .get_key_value(*key)
            .map(|(k, v)| (k.as_str(), *v))
    })
}

// ---------------------------------------------------------------------------
// Player season stat line
// ---------------------------------------------------------------------------

/// One player's season stat line of a single type.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PlayerSeasonStat {
    pub player_id: PlayerId,
    pub season: Season,
    pub stat_type: StatType,
    pub fields: BTreeMap<String, f64>,
}

impl PlayerSeasonStat {
    pub fn new(player_id: PlayerId, season: Season, stat_type: StatType) -> Self {
        Self {
            player_id,
            season,
            stat_type,
            fields: BTreeMap::new(),
        }
    }

    /// Builder-style field setter.
    pub fn with(mut self, name: &str, value: f64) -> Self {
        self.fields.insert(name.to_string(), value);
        self
    }

    /// Look up a field through its candidate keys.
    pub fn get(&self, field: StatField) -> Option<f64> {
        first_present(&self.fields, field.candidates()).map(|(_, v)| v)
    }

    /// Fields with every known stat under its canonical key. When a line
    /// carries several spellings of one stat, the highest-priority one wins.
    /// Unrecognised keys pass through unchanged.
    pub fn canonical_fields(&self) -> BTreeMap<String, f64> {
        let mut out = BTreeMap::new();
        for (key, &value) in &self.fields {
            if StatField::from_key(key).is_none() {
                out.insert(key.clone(), value);
            }
        }
        for field in StatField::ALL {
            if let Some(value) = self.get(field) {
                out.insert(field.key().to_string(), value);
            }
        }
        out
    }
}

// ---------------------------------------------------------------------------
// League totals
// ---------------------------------------------------------------------------

/// Sum, simple mean, and row count for one stat across the league.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct StatSummary {
    pub sum: f64,
    pub mean: f64,
    pub count: u32,
}

impl StatSummary {
    /// Combine two summaries over disjoint rows.
    pub fn merge(self, other: StatSummary) -> StatSummary {
        let count = self.count + other.count;
        let mean = if count == 0 {
            0.0
        } else {
            (self.mean * f64::from(self.count) + other.mean * f64::from(other.count))
                / f64::from(count)
        };
        StatSummary {
            sum: self.sum + other.sum,
            mean,
            count,
        }
    }
}

/// League-wide summaries for one season, keyed by stat name, split by type.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct LeagueTotals {
    pub season: Season,
    pub batting: BTreeMap<String, StatSummary>,
    pub pitching: BTreeMap<String, StatSummary>,
}

impl LeagueTotals {
    pub fn new(season: Season) -> Self {
        Self {
            season,
            ..Self::default()
        }
    }

    pub fn of_type(&self, stat_type: StatType) -> &BTreeMap<String, StatSummary> {
        match stat_type {
            StatType::Batting => &self.batting,
            StatType::Pitching => &self.pitching,
        }
    }

    pub fn of_type_mut(&mut self, stat_type: StatType) -> &mut BTreeMap<String, StatSummary> {
        match stat_type {
            StatType::Batting => &mut self.batting,
            StatType::Pitching => &mut self.pitching,
        }
    }

    /// Summary for `field`, merged across every spelling of it.
    pub fn summary(&self, stat_type: StatType, field: StatField) -> Option<StatSummary> {
        let map = self.of_type(stat_type);
        field
            .candidates()
            .iter()
            .filter_map(|key| map.get(*key).copied())
            .reduce(StatSummary::merge)
    }

    pub fn is_empty(&self) -> bool {
        self.batting.is_empty() && self.pitching.is_empty()
    }
}
