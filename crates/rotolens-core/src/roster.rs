// Fantasy teams, roster rows, and position classification.

use rusqlite::types::{FromSql, FromSqlError, FromSqlResult, ToSql, ToSqlOutput, ValueRef};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

use crate::ids::{LeagueId, PlayerId, Season, TeamId};
use crate::stats::StatType;

// ---------------------------------------------------------------------------
// Team record
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TeamRecord {
    pub team_id: TeamId,
    pub league_id: LeagueId,
    pub team_name: String,
    pub league_name: String,
    pub owner_name: Option<String>,
    pub season: Season,
}

// ---------------------------------------------------------------------------
// Player type
// ---------------------------------------------------------------------------

/// Whether a player's season line is a batting or pitching line.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PlayerType {
    Batter,
    Pitcher,
}

impl PlayerType {
    /// Derive the player type from an MLB position string. `P`, `SP` and
    /// `RP` are pitchers; everything else bats.
    pub fn from_mlb_position(position: &str) -> Self {
        match position.trim().to_ascii_uppercase().as_str() {
            "P" | "SP" | "RP" => PlayerType::Pitcher,
            _ => PlayerType::Batter,
        }
    }

    pub fn stat_type(self) -> StatType {
        match self {
            PlayerType::Batter => StatType::Batting,
            PlayerType::Pitcher => StatType::Pitching,
        }
    }
}

// ---------------------------------------------------------------------------
// Players
// ---------------------------------------------------------------------------

/// A player's identity, independent of any roster.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PlayerRecord {
    pub player_id: PlayerId,
    pub mlb_id: Option<String>,
    pub name: String,
    pub mlb_team: Option<String>,
    pub position: String,
}

// ---------------------------------------------------------------------------
// Acquisition
// ---------------------------------------------------------------------------

/// How a player arrived on a fantasy roster.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Acquisition {
    Draft,
    #[default]
    Waiver,
    FreeAgent,
    Trade,
    Keeper,
}

impl Acquisition {
    pub fn as_str(self) -> &'static str {
        match self {
            Acquisition::Draft => "draft",
            Acquisition::Waiver => "waiver",
            Acquisition::FreeAgent => "free_agent",
            Acquisition::Trade => "trade",
            Acquisition::Keeper => "keeper",
        }
    }
}

impl fmt::Display for Acquisition {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("unknown acquisition type `{0}`")]
pub struct UnknownAcquisition(pub String);

impl FromStr for Acquisition {
    type Err = UnknownAcquisition;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().replace('-', "_").as_str() {
            "draft" | "drafted" => Ok(Acquisition::Draft),
            "waiver" | "waivers" => Ok(Acquisition::Waiver),
            "free_agent" | "fa" => Ok(Acquisition::FreeAgent),
            "trade" => Ok(Acquisition::Trade),
            "keeper" => Ok(Acquisition::Keeper),
            _ => Err(UnknownAcquisition(s.to_string())),
        }
    }
}

impl ToSql for Acquisition {
    fn to_sql(&self) -> rusqlite::Result<ToSqlOutput<'_>> {
        Ok(ToSqlOutput::from(self.as_str()))
    }
}

impl FromSql for Acquisition {
    fn column_result(value: ValueRef<'_>) -> FromSqlResult<Self> {
        value
            .as_str()?
            .parse()
            .map_err(|e: UnknownAcquisition| FromSqlError::Other(Box::new(e)))
    }
}

// ---------------------------------------------------------------------------
// Roster rows
// ---------------------------------------------------------------------------

/// An active roster row joined with the player's identity.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RosterPlayer {
    pub team_id: TeamId,
    pub player_id: PlayerId,
    pub mlb_id: Option<String>,
    pub name: String,
    /// The player's real-world position (e.g. `SS`, `P`).
    pub mlb_position: String,
    /// The fantasy slot the player occupies on this roster (e.g. `OF`, `RP`).
    pub fantasy_position: String,
    pub acquisition: Acquisition,
    pub active: bool,
}

impl RosterPlayer {
    pub fn player_type(&self) -> PlayerType {
        PlayerType::from_mlb_position(&self.mlb_position)
    }

    /// Display order of the player's slot: hitters, pitchers, then bench and
    /// IL. Unrecognised slots sort with the hitters.
    pub fn slot_group(&self) -> u8 {
        Position::from_str_pos(&self.fantasy_position).map_or(1, |p| p.sort_group())
    }
}

// ---------------------------------------------------------------------------
// Fantasy positions
// ---------------------------------------------------------------------------

/// Fantasy roster slots.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Position {
    Catcher,
    FirstBase,
    SecondBase,
    ThirdBase,
    ShortStop,
    Outfield,
    LeftField,
    CenterField,
    RightField,
    DesignatedHitter,
    Utility,
    StartingPitcher,
    ReliefPitcher,
    Pitcher,
    Bench,
    InjuredList,
}

impl Position {
    /// Parse a slot abbreviation, case-insensitively. `BN` is an alias for
    /// bench and `DL` for the injured list.
    pub fn from_str_pos(s: &str) -> Option<Self> {
        match s.trim().to_uppercase().as_str() {
            "C" => Some(Position::Catcher),
            "1B" => Some(Position::FirstBase),
            "2B" => Some(Position::SecondBase),
            "3B" => Some(Position::ThirdBase),
            "SS" => Some(Position::ShortStop),
            "OF" => Some(Position::Outfield),
            "LF" => Some(Position::LeftField),
            "CF" => Some(Position::CenterField),
            "RF" => Some(Position::RightField),
            "DH" => Some(Position::DesignatedHitter),
            "UTIL" => Some(Position::Utility),
            "SP" => Some(Position::StartingPitcher),
            "RP" => Some(Position::ReliefPitcher),
            "P" => Some(Position::Pitcher),
            "BE" | "BN" => Some(Position::Bench),
            "IL" | "DL" => Some(Position::InjuredList),
            _ => None,
        }
    }

    pub fn display_str(&self) -> &'static str {
        match self {
            Position::Catcher => "C",
            Position::FirstBase => "1B",
            Position::SecondBase => "2B",
            Position::ThirdBase => "3B",
            Position::ShortStop => "SS",
            Position::Outfield => "OF",
            Position::LeftField => "LF",
            Position::CenterField => "CF",
            Position::RightField => "RF",
            Position::DesignatedHitter => "DH",
            Position::Utility => "UTIL",
            Position::StartingPitcher => "SP",
            Position::ReliefPitcher => "RP",
            Position::Pitcher => "P",
            Position::Bench => "BE",
            Position::InjuredList => "IL",
        }
    }

    /// Slots that count toward outfield depth.
    pub fn is_outfield(&self) -> bool {
        matches!(
            self,
            Position::Outfield | Position::LeftField | Position::CenterField | Position::RightField
        )
    }

    /// Whether a player listed at `other` is eligible for this slot: `OF`
    /// takes any outfielder and `P` any pitcher.
    pub fn covers(&self, other: &Position) -> bool {
        match self {
            Position::Outfield => other.is_outfield(),
            Position::Pitcher => matches!(
                other,
                Position::Pitcher | Position::StartingPitcher | Position::ReliefPitcher
            ),
            _ => self == other,
        }
    }

    pub fn is_relief(&self) -> bool {
        matches!(self, Position::ReliefPitcher)
    }

    /// Hitters sort before pitchers, and meta slots (bench, IL) last.
    pub fn sort_group(&self) -> u8 {
        match self {
            Position::StartingPitcher | Position::ReliefPitcher | Position::Pitcher => 2,
            Position::Bench | Position::InjuredList => 3,
            _ => 1,
        }
    }
}

impl fmt::Display for Position {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.display_str())
    }
}
