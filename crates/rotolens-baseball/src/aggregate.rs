// Team-level totals from per-player season lines, with volume-weighted rate stats.

use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use rotolens_core::stats::{PlayerSeasonStat, StatField};
use rotolens_core::{Category, Discipline};

// ---------------------------------------------------------------------------
// Weighted mean
// ---------------------------------------------------------------------------

/// Running `sum(rate * weight) / sum(weight)`.
#[derive(Debug, Clone, Copy, Default)]
pub struct WeightedMean {
    weighted_sum: f64,
    weight: f64,
}

impl WeightedMean {
    /// Add one observation. Negative weights are ignored.
    pub fn add(&mut self, rate: f64, weight: f64) {
        if weight < 0.0 {
            return;
        }
        self.weighted_sum += rate * weight;
        self.weight += weight;
    }

    pub fn total_weight(&self) -> f64 {
        self.weight
    }

    /// The weighted mean, or 0.0 when no weight was accumulated.
    pub fn value(&self) -> f64 {
        if self.weight <= 0.0 {
            return 0.0;
        }
        self.weighted_sum / self.weight
    }
}

/// Weighted mean of `(rate, weight)` pairs; 0.0 for an empty or zero-weight
/// input.
pub fn weighted_mean(pairs: impl IntoIterator<Item = (f64, f64)>) -> f64 {
    let mut acc = WeightedMean::default();
    for (rate, weight) in pairs {
        acc.add(rate, weight);
    }
    acc.value()
}

// ---------------------------------------------------------------------------
// Team totals
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct BattingTotals {
    /// Number of stat lines aggregated.
    pub players: u32,
    pub plate_appearances: f64,
    pub home_runs: f64,
    pub runs: f64,
    pub rbi: f64,
    pub stolen_bases: f64,
    /// Plate-appearance weighted.
    pub batting_avg: f64,
}

#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct PitchingTotals {
    pub players: u32,
    pub innings_pitched: f64,
    pub wins: f64,
    pub saves: f64,
    pub strikeouts: f64,
    /// Innings weighted.
    pub era: f64,
    /// Innings weighted.
    pub whip: f64,
}

#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct TeamAggregate {
    pub batting: BattingTotals,
    pub pitching: PitchingTotals,
}

impl TeamAggregate {
    /// The team's value in a scoring category.
    pub fn value(&self, category: Category) -> f64 {
        match category {
            Category::BattingAvg => self.batting.batting_avg,
            Category::HomeRuns => self.batting.home_runs,
            Category::Runs => self.batting.runs,
            Category::Rbi => self.batting.rbi,
            Category::StolenBases => self.batting.stolen_bases,
            Category::Era => self.pitching.era,
            Category::Whip => self.pitching.whip,
            Category::Strikeouts => self.pitching.strikeouts,
            Category::Wins => self.pitching.wins,
            Category::Saves => self.pitching.saves,
        }
    }

    /// Whether the team has the playing time a rate category is weighted by
    /// (plate appearances for AVG, innings for ERA and WHIP). Counting
    /// categories always do.
    pub fn has_volume(&self, category: Category) -> bool {
        match category {
            Category::BattingAvg => self.batting.plate_appearances > 0.0,
            Category::Era | Category::Whip => self.pitching.innings_pitched > 0.0,
            _ => true,
        }
    }

    /// How many stat lines fed the given side.
    pub fn players_in(&self, discipline: Discipline) -> u32 {
        match discipline {
            Discipline::Hitting => self.batting.players,
            Discipline::Pitching => self.pitching.players,
        }
    }
}

// ---------------------------------------------------------------------------
// Aggregation
// ---------------------------------------------------------------------------

/// Read a field, dropping non-finite values.
fn finite(line: &PlayerSeasonStat, field: StatField) -> Option<f64> {
    match line.get(field) {
        Some(v) if v.is_finite() => Some(v),
        Some(v) => {
            warn!(
                "ignoring non-finite {} = {} for player {}",
                field.key(),
                v,
                line.player_id
            );
            None
        }
        None => None,
    }
}

/// Add `rate` weighted by `weight` when the line carries both.
fn add_rate(acc: &mut WeightedMean, line: &PlayerSeasonStat, rate: StatField, weight: StatField) {
    if let (Some(r), Some(w)) = (finite(line, rate), finite(line, weight)) {
        acc.add(r, w);
    }
}

/// Sum counting stats and PA-weight batting average across batting lines.
pub fn aggregate_batting(lines: &[PlayerSeasonStat]) -> BattingTotals {
    let mut totals = BattingTotals::default();
    let mut avg = WeightedMean::default();

    for line in lines {
        totals.players += 1;
        totals.plate_appearances += finite(line, StatField::PlateAppearances).unwrap_or(0.0);
        totals.home_runs += finite(line, StatField::HomeRuns).unwrap_or(0.0);
        totals.runs += finite(line, StatField::Runs).unwrap_or(0.0);
        totals.rbi += finite(line, StatField::Rbi).unwrap_or(0.0);
        totals.stolen_bases += finite(line, StatField::StolenBases).unwrap_or(0.0);
        add_rate(&mut avg, line, StatField::BattingAvg, StatField::PlateAppearances);
    }

    if totals.players > 0 && avg.total_weight() <= 0.0 {
        debug!(
            "no plate appearances across {} batters; batting average defaults to 0",
            totals.players
        );
    }
    totals.batting_avg = avg.value();
    totals
}

/// Sum counting stats and innings-weight ERA and WHIP across pitching lines.
pub fn aggregate_pitching(lines: &[PlayerSeasonStat]) -> PitchingTotals {
    let mut totals = PitchingTotals::default();
    let mut era = WeightedMean::default();
    let mut whip = WeightedMean::default();

    for line in lines {
        totals.players += 1;
        totals.innings_pitched += finite(line, StatField::InningsPitched).unwrap_or(0.0);
        totals.wins += finite(line, StatField::Wins).unwrap_or(0.0);
        totals.saves += finite(line, StatField::Saves).unwrap_or(0.0);
        totals.strikeouts += finite(line, StatField::Strikeouts).unwrap_or(0.0);
        add_rate(&mut era, line, StatField::Era, StatField::InningsPitched);
        add_rate(&mut whip, line, StatField::Whip, StatField::InningsPitched);
    }

    if totals.players > 0 && era.total_weight() <= 0.0 {
        debug!(
            "no innings pitched across {} pitchers; ERA/WHIP default to 0",
            totals.players
        );
    }
    totals.era = era.value();
    totals.whip = whip.value();
    totals
}

/// Aggregate a team's batting and pitching lines.
pub fn aggregate_team(batting: &[PlayerSeasonStat], pitching: &[PlayerSeasonStat]) -> TeamAggregate {
    TeamAggregate {
        batting: aggregate_batting(batting),
        pitching: aggregate_pitching(pitching),
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use rotolens_core::stats::StatType;

    fn approx_eq(a: f64, b: f64, epsilon: f64) -> bool {
        (a - b).abs() < epsilon
    }

    fn batter(id: i64, pa: f64, avg: f64, hr: f64) -> PlayerSeasonStat {
        PlayerSeasonStat::new(id, 2024, StatType::Batting)
            .with("plate_appearances", pa)
            .with("batting_avg", avg)
            .with("home_runs", hr)
            .with("rbi", hr * 3.0)
            .with("stolen_bases", 5.0)
            .with("runs", 80.0)
    }

    fn pitcher(id: i64, ip: f64, era: f64, whip: f64) -> PlayerSeasonStat {
        PlayerSeasonStat::new(id, 2024, StatType::Pitching)
            .with("innings_pitched", ip)
            .with("era", era)
            .with("whip", whip)
            .with("wins", 10.0)
            .with("saves", 2.0)
            .with("strikeouts", 150.0)
    }

    #[test]
    fn weighted_mean_basic() {
        let v = weighted_mean([(0.300, 600.0), (0.200, 200.0)]);
        assert!(approx_eq(v, 0.275, 1e-12));
    }

    #[test]
    fn weighted_mean_zero_weight_defaults_to_zero() {
        assert_eq!(weighted_mean([(0.300, 0.0), (0.250, 0.0)]), 0.0);
        assert_eq!(weighted_mean(std::iter::empty()), 0.0);
    }

    #[test]
    fn weighted_mean_ignores_negative_weights() {
        let v = weighted_mean([(0.300, 100.0), (9.0, -50.0)]);
        assert!(approx_eq(v, 0.300, 1e-12));
    }

    #[test]
    fn batting_sums_and_weights() {
        let totals = aggregate_batting(&[batter(1, 600.0, 0.300, 30.0), batter(2, 200.0, 0.200, 10.0)]);
        assert_eq!(totals.players, 2);
        assert_eq!(totals.home_runs, 40.0);
        assert_eq!(totals.rbi, 120.0);
        assert_eq!(totals.stolen_bases, 10.0);
        assert_eq!(totals.runs, 160.0);
        assert_eq!(totals.plate_appearances, 800.0);
        assert!(approx_eq(totals.batting_avg, 0.275, 1e-12));
    }

    #[test]
    fn pitching_era_whip_weighted_by_innings() {
        let totals = aggregate_pitching(&[pitcher(1, 180.0, 3.00, 1.10), pitcher(2, 60.0, 5.00, 1.50)]);
        assert_eq!(totals.players, 2);
        assert_eq!(totals.innings_pitched, 240.0);
        assert!(approx_eq(totals.era, 3.50, 1e-12));
        assert!(approx_eq(totals.whip, 1.20, 1e-12));
        assert_eq!(totals.wins, 20.0);
        assert_eq!(totals.saves, 4.0);
        assert_eq!(totals.strikeouts, 300.0);
    }

    #[test]
    fn empty_input_is_all_zero() {
        let agg = aggregate_team(&[], &[]);
        assert_eq!(agg, TeamAggregate::default());
        assert_eq!(agg.players_in(Discipline::Hitting), 0);
        assert_eq!(agg.players_in(Discipline::Pitching), 0);
    }

    #[test]
    fn missing_weight_field_defaults_rate_to_zero() {
        let line = PlayerSeasonStat::new(1, 2024, StatType::Pitching)
            .with("era", 3.20)
            .with("whip", 1.05)
            .with("wins", 12.0);
        let totals = aggregate_pitching(&[line]);
        assert_eq!(totals.era, 0.0);
        assert_eq!(totals.whip, 0.0);
        assert_eq!(totals.wins, 12.0);
    }

    #[test]
    fn lines_without_rate_do_not_dilute_average() {
        let no_avg = PlayerSeasonStat::new(2, 2024, StatType::Batting)
            .with("plate_appearances", 500.0)
            .with("home_runs", 12.0);
        let totals = aggregate_batting(&[batter(1, 400.0, 0.310, 20.0), no_avg]);
        assert!(approx_eq(totals.batting_avg, 0.310, 1e-12));
        assert_eq!(totals.home_runs, 32.0);
        assert_eq!(totals.plate_appearances, 900.0);
    }

    #[test]
    fn aliased_fields_are_read() {
        let line = PlayerSeasonStat::new(1, 2024, StatType::Pitching)
            .with("ip", 100.0)
            .with("era", 4.00)
            .with("whip", 1.30)
            .with("k", 110.0)
            .with("sv", 30.0)
            .with("w", 4.0);
        let totals = aggregate_pitching(&[line]);
        assert_eq!(totals.strikeouts, 110.0);
        assert_eq!(totals.saves, 30.0);
        assert_eq!(totals.wins, 4.0);
        assert!(approx_eq(totals.era, 4.00, 1e-12));
    }

    #[test]
    fn non_finite_values_are_ignored() {
        let line = batter(1, 500.0, 0.280, 20.0).with("home_runs", f64::INFINITY);
        let totals = aggregate_batting(&[line]);
        assert_eq!(totals.home_runs, 0.0);
        assert!(approx_eq(totals.batting_avg, 0.280, 1e-12));
    }

    #[test]
    fn weighted_average_within_rate_bounds() {
        let rates = [0.198, 0.251, 0.333, 0.287, 0.240];
        let weights = [120.0, 640.0, 35.0, 580.0, 410.0];
        let lines: Vec<PlayerSeasonStat> = rates
            .iter()
            .zip(weights)
            .enumerate()
            .map(|(i, (&avg, pa))| batter(i as i64, pa, avg, 10.0))
            .collect();
        let totals = aggregate_batting(&lines);
        let min = rates.iter().cloned().fold(f64::INFINITY, f64::min);
        let max = rates.iter().cloned().fold(f64::NEG_INFINITY, f64::max);
        assert!(totals.batting_avg >= min && totals.batting_avg <= max);
    }

    #[test]
    fn value_maps_every_category() {
        let agg = aggregate_team(&[batter(1, 600.0, 0.300, 30.0)], &[pitcher(2, 100.0, 3.0, 1.0)]);
        assert_eq!(agg.value(Category::HomeRuns), 30.0);
        assert_eq!(agg.value(Category::Rbi), 90.0);
        assert_eq!(agg.value(Category::Runs), 80.0);
        assert_eq!(agg.value(Category::StolenBases), 5.0);
        assert!(approx_eq(agg.value(Category::BattingAvg), 0.300, 1e-12));
        assert!(approx_eq(agg.value(Category::Era), 3.0, 1e-12));
        assert!(approx_eq(agg.value(Category::Whip), 1.0, 1e-12));
        assert_eq!(agg.value(Category::Strikeouts), 150.0);
        assert_eq!(agg.value(Category::Wins), 10.0);
        assert_eq!(agg.value(Category::Saves), 2.0);
    }

    #[test]
    fn volume_only_gates_rate_categories() {
        let agg = aggregate_team(&[batter(1, 600.0, 0.300, 30.0)], &[]);
        assert!(agg.has_volume(Category::BattingAvg));
        assert!(!agg.has_volume(Category::Era));
        assert!(!agg.has_volume(Category::Whip));
        assert!(agg.has_volume(Category::Wins));

        let no_innings = aggregate_team(&[], &[pitcher(2, 0.0, 0.0, 0.0)]);
        assert_eq!(no_innings.pitching.players, 1);
        assert!(!no_innings.has_volume(Category::Era));
        assert!(!no_innings.has_volume(Category::BattingAvg));
    }
}
