// SQLite-backed league store.

use std::collections::BTreeMap;
use std::sync::{Mutex, MutexGuard};

use rusqlite::{params, Connection, OptionalExtension};
use tracing::{debug, info, warn};

use crate::ids::{LeagueId, PlayerId, Season, TeamId};
use crate::roster::{Acquisition, PlayerRecord, Position, RosterPlayer, TeamRecord};
use crate::stats::{LeagueTotals, PlayerSeasonStat, StatSummary, StatType, UnknownStatType};
use crate::store::{LeagueStore, StoreError, StoreResult};

/// SQLite persistence for leagues, teams, players, rosters, and season stats.
///
/// Stat lines are stored in long format (one row per named field) so any
/// stat a source provides can be kept without schema changes.
pub struct SqliteStore {
    conn: Mutex<Connection>,
}

impl SqliteStore {
    /// Open (or create) a SQLite database at `path` and ensure all tables
    /// exist. Pass `":memory:"` for an ephemeral in-memory database (useful
    /// for tests).
    pub fn open(path: &str) -> StoreResult<Self> {
        let conn = Connection::open(path).map_err(|source| StoreError::Open {
            path: path.to_string(),
            source,
        })?;

        conn.execute_batch(
            "PRAGMA journal_mode = WAL;
             PRAGMA busy_timeout = 5000;
             PRAGMA foreign_keys = ON;",
        )
        .map_err(StoreError::query("set database pragmas"))?;

        conn.execute_batch(
            "
            CREATE TABLE IF NOT EXISTS leagues (
                id   INTEGER PRIMARY KEY AUTOINCREMENT,
                name TEXT NOT NULL UNIQUE
            );

            CREATE TABLE IF NOT EXISTS teams (
                id         INTEGER PRIMARY KEY AUTOINCREMENT,
                league_id  INTEGER NOT NULL REFERENCES leagues(id),
                name       TEXT NOT NULL,
                owner_name TEXT,
                season     INTEGER NOT NULL,
                UNIQUE(league_id, name, season)
            );

            CREATE TABLE IF NOT EXISTS players (
                id       INTEGER PRIMARY KEY AUTOINCREMENT,
                mlb_id   TEXT UNIQUE,
                name     TEXT NOT NULL,
                mlb_team TEXT,
                position TEXT NOT NULL
            );

            CREATE TABLE IF NOT EXISTS rosters (
                team_id          INTEGER NOT NULL REFERENCES teams(id),
                player_id        INTEGER NOT NULL REFERENCES players(id),
                position         TEXT NOT NULL,
                acquisition_type TEXT NOT NULL DEFAULT 'waiver',
                acquired_at      TEXT NOT NULL DEFAULT (strftime('%Y-%m-%dT%H:%M:%fZ', 'now')),
                is_active        INTEGER NOT NULL DEFAULT 1,
                PRIMARY KEY (team_id, player_id)
            );

            CREATE TABLE IF NOT EXISTS player_stats (
                player_id INTEGER NOT NULL REFERENCES players(id),
                season    INTEGER NOT NULL,
                stat_type TEXT NOT NULL,
                stat_name TEXT NOT NULL,
                value     REAL NOT NULL,
                PRIMARY KEY (player_id, season, stat_type, stat_name)
            );

            CREATE INDEX IF NOT EXISTS idx_player_stats_season ON player_stats(season, stat_type);
            ",
        )
        .map_err(StoreError::query("create database schema"))?;

        debug!("Opened league store at {path}");
        Ok(Self {
            conn: Mutex::new(conn),
        })
    }

    /// Acquire the database connection.
    ///
    /// Panics if the mutex is poisoned (another thread panicked while
    /// holding the lock). This should never happen in normal operation.
    fn conn(&self) -> MutexGuard<'_, Connection> {
        self.conn.lock().expect("database mutex poisoned")
    }

    // ------------------------------------------------------------------
    // Writes
    // ------------------------------------------------------------------

    /// Insert a league by name, returning its id. Existing names return the
    /// existing id.
    pub fn upsert_league(&self, name: &str) -> StoreResult<LeagueId> {
        let conn = self.conn();
        conn.query_row(
            "INSERT INTO leagues (name) VALUES (?1)
             ON CONFLICT(name) DO UPDATE SET name = excluded.name
             RETURNING id",
            params![name],
            |row| row.get(0),
        )
        .map_err(StoreError::query("upsert league"))
    }

    /// Insert a team, or update the owner if `(league, name, season)` exists.
    pub fn insert_team(
        &self,
        league_id: LeagueId,
        name: &str,
        owner_name: Option<&str>,
        season: Season,
    ) -> StoreResult<TeamId> {
        let conn = self.conn();
        conn.query_row(
            "INSERT INTO teams (league_id, name, owner_name, season)
             VALUES (?1, ?2, ?3, ?4)
             ON CONFLICT(league_id, name, season) DO UPDATE SET
                owner_name = excluded.owner_name
             RETURNING id",
            params![league_id, name, owner_name, season],
            |row| row.get(0),
        )
        .map_err(StoreError::query("insert team"))
    }

    /// Insert a player or refresh their record if the MLB id already exists.
    /// Players without an MLB id are always inserted as new rows.
    pub fn upsert_player(
        &self,
        mlb_id: Option<&str>,
        name: &str,
        mlb_team: Option<&str>,
        position: &str,
    ) -> StoreResult<PlayerId> {
        let conn = self.conn();
        conn.query_row(
            "INSERT INTO players (mlb_id, name, mlb_team, position)
             VALUES (?1, ?2, ?3, ?4)
             ON CONFLICT(mlb_id) DO UPDATE SET
                name     = excluded.name,
                mlb_team = excluded.mlb_team,
                position = excluded.position
             RETURNING id",
            params![mlb_id, name, mlb_team, position],
            |row| row.get(0),
        )
        .map_err(StoreError::query("upsert player"))
    }

    /// Put a player on a team's active roster. Re-adding an existing
    /// `(team, player)` pair moves them to the new slot, records the new
    /// acquisition, and re-activates them.
    pub fn add_player_to_team(
        &self,
        team_id: TeamId,
        player_id: PlayerId,
        position: &str,
        acquisition: Acquisition,
    ) -> StoreResult<()> {
        let conn = self.conn();
        conn.execute(
            "INSERT INTO rosters (team_id, player_id, position, acquisition_type, is_active)
             VALUES (?1, ?2, ?3, ?4, 1)
             ON CONFLICT(team_id, player_id) DO UPDATE SET
                position         = excluded.position,
                acquisition_type = excluded.acquisition_type,
                acquired_at      = strftime('%Y-%m-%dT%H:%M:%fZ', 'now'),
                is_active        = 1",
            params![team_id, player_id, position.to_uppercase(), acquisition],
        )
        .map_err(StoreError::query("add player to team"))?;
        info!("Added player {player_id} to team {team_id} at {position} ({acquisition})");
        Ok(())
    }

    /// Remove a player from a team's roster. Returns `false` if they were not
    /// on it.
    pub fn remove_player_from_team(&self, team_id: TeamId, player_id: PlayerId) -> StoreResult<bool> {
        let conn = self.conn();
        let removed = conn
            .execute(
                "DELETE FROM rosters WHERE team_id = ?1 AND player_id = ?2",
                params![team_id, player_id],
            )
            .map_err(StoreError::query("remove player from team"))?;
        if removed > 0 {
            info!("Removed player {player_id} from team {team_id}");
        }
        Ok(removed > 0)
    }

    /// Write stat lines in a single transaction, replacing prior values for
    /// the same `(player, season, type, field)`. Known stats are stored under
    /// their canonical key whatever spelling the line used. Non-finite values
    /// are skipped.
    pub fn record_stats(&self, lines: &[PlayerSeasonStat]) -> StoreResult<()> {
        let mut conn = self.conn();
        let tx = conn
            .transaction()
            .map_err(StoreError::query("begin stats transaction"))?;

        for line in lines {
            for (name, value) in line.canonical_fields() {
                if !value.is_finite() {
                    warn!(
                        "skipping non-finite {} for player {} ({})",
                        name, line.player_id, line.season
                    );
                    continue;
                }
                tx.execute(
                    "INSERT OR REPLACE INTO player_stats (player_id, season, stat_type, stat_name, value)
                     VALUES (?1, ?2, ?3, ?4, ?5)",
                    params![line.player_id, line.season, line.stat_type.as_str(), name, value],
                )
                .map_err(StoreError::query("record stat"))?;
            }
        }

        tx.commit().map_err(StoreError::query("commit stats"))?;
        Ok(())
    }

    // ------------------------------------------------------------------
    // Reads beyond the LeagueStore surface
    // ------------------------------------------------------------------

    /// Players not on any active roster in the league's given season,
    /// optionally restricted to a position. Empty when the league has no
    /// teams that season.
    pub fn free_agents(
        &self,
        league_id: LeagueId,
        season: Season,
        position: Option<&str>,
    ) -> StoreResult<Vec<PlayerRecord>> {
        let conn = self.conn();
        let teams: i64 = conn
            .query_row(
                "SELECT COUNT(*) FROM teams WHERE league_id = ?1 AND season = ?2",
                params![league_id, season],
                |row| row.get(0),
            )
            .map_err(StoreError::query("count league teams"))?;
        if teams == 0 {
            warn!("No teams in league {league_id} for {season}; no free agents to list");
            return Ok(vec![]);
        }

        let mut stmt = conn
            .prepare(
                "SELECT p.id, p.mlb_id, p.name, p.mlb_team, p.position
                 FROM players p
                 WHERE p.id NOT IN (
                    SELECT r.player_id FROM rosters r
                    JOIN teams t ON t.id = r.team_id
                    WHERE t.league_id = ?1 AND t.season = ?2 AND r.is_active = 1
                 )
                 ORDER BY p.name, p.id",
            )
            .map_err(StoreError::query("prepare free_agents"))?;
        let players = stmt
            .query_map(params![league_id, season], player_from_row)
            .map_err(StoreError::query("query free agents"))?
            .collect::<Result<Vec<_>, _>>()
            .map_err(StoreError::query("map free agent rows"))?;

        Ok(filter_position(players, position, usize::MAX))
    }

    /// Players not on the given team's roster, optionally filtered by
    /// position and a name fragment, at most `limit` of them.
    pub fn available_players(
        &self,
        team_id: TeamId,
        position: Option<&str>,
        search: Option<&str>,
        limit: usize,
    ) -> StoreResult<Vec<PlayerRecord>> {
        let conn = self.conn();
        let mut stmt = conn
            .prepare(
                "SELECT p.id, p.mlb_id, p.name, p.mlb_team, p.position
                 FROM players p
                 WHERE p.id NOT IN (
                    SELECT player_id FROM rosters WHERE team_id = ?1 AND is_active = 1
                 )
                   AND (?2 IS NULL OR p.name LIKE '%' || ?2 || '%')
                 ORDER BY p.name, p.id",
            )
            .map_err(StoreError::query("prepare available_players"))?;
        let players = stmt
            .query_map(params![team_id, search], player_from_row)
            .map_err(StoreError::query("query available players"))?
            .collect::<Result<Vec<_>, _>>()
            .map_err(StoreError::query("map available player rows"))?;

        Ok(filter_position(players, position, limit))
    }

    /// Case-insensitive name search, at most `limit` results.
    pub fn players_by_name(&self, fragment: &str, limit: usize) -> StoreResult<Vec<PlayerRecord>> {
        let conn = self.conn();
        let mut stmt = conn
            .prepare(
                "SELECT id, mlb_id, name, mlb_team, position
                 FROM players
                 WHERE name LIKE '%' || ?1 || '%'
                 ORDER BY name, id
                 LIMIT ?2",
            )
            .map_err(StoreError::query("prepare players_by_name"))?;
        let limit = i64::try_from(limit).unwrap_or(i64::MAX);
        let players = stmt
            .query_map(params![fragment, limit], player_from_row)
            .map_err(StoreError::query("query players by name"))?
            .collect::<Result<Vec<_>, _>>()
            .map_err(StoreError::query("map player rows"))?;
        Ok(players)
    }

    /// All teams, newest season first, then by league and team name.
    pub fn all_teams(&self) -> StoreResult<Vec<TeamRecord>> {
        let conn = self.conn();
        let mut stmt = conn
            .prepare(
                "SELECT t.id, t.league_id, t.name, l.name, t.owner_name, t.season
                 FROM teams t JOIN leagues l ON l.id = t.league_id
                 ORDER BY t.season DESC, l.name, t.name",
            )
            .map_err(StoreError::query("prepare all_teams"))?;

        let teams = stmt
            .query_map([], team_from_row)
            .map_err(StoreError::query("query teams"))?
            .collect::<Result<Vec<_>, _>>()
            .map_err(StoreError::query("map team rows"))?;
        Ok(teams)
    }
}

fn player_from_row(row: &rusqlite::Row<'_>) -> rusqlite::Result<PlayerRecord> {
    Ok(PlayerRecord {
        player_id: row.get(0)?,
        mlb_id: row.get(1)?,
        name: row.get(2)?,
        mlb_team: row.get(3)?,
        position: row.get(4)?,
    })
}

/// Keep players eligible for `position` (an `OF` filter takes any
/// outfielder, `P` any pitcher), up to `limit`.
fn filter_position(
    players: Vec<PlayerRecord>,
    position: Option<&str>,
    limit: usize,
) -> Vec<PlayerRecord> {
    players
        .into_iter()
        .filter(|p| position.map_or(true, |want| position_matches(want, &p.position)))
        .take(limit)
        .collect()
}

fn position_matches(filter: &str, position: &str) -> bool {
    match (Position::from_str_pos(filter), Position::from_str_pos(position)) {
        (Some(f), Some(p)) => f.covers(&p),
        _ => filter.trim().eq_ignore_ascii_case(position.trim()),
    }
}

fn team_from_row(row: &rusqlite::Row<'_>) -> rusqlite::Result<TeamRecord> {
    Ok(TeamRecord {
        team_id: row.get(0)?,
        league_id: row.get(1)?,
        team_name: row.get(2)?,
        league_name: row.get(3)?,
        owner_name: row.get(4)?,
        season: row.get(5)?,
    })
}

impl LeagueStore for SqliteStore {
    fn fetch_team(&self, team_id: TeamId) -> StoreResult<Option<TeamRecord>> {
        let conn = self.conn();
        conn.query_row(
            "SELECT t.id, t.league_id, t.name, l.name, t.owner_name, t.season
             FROM teams t JOIN leagues l ON l.id = t.league_id
             WHERE t.id = ?1",
            params![team_id],
            team_from_row,
        )
        .optional()
        .map_err(StoreError::query("fetch team"))
    }

    fn fetch_roster(&self, team_id: TeamId, season: Season) -> StoreResult<Vec<RosterPlayer>> {
        let conn = self.conn();
        let mut stmt = conn
            .prepare(
                "SELECT r.team_id, p.id, p.mlb_id, p.name, p.position, r.position,
                        r.acquisition_type, r.is_active
                 FROM rosters r
                 JOIN players p ON p.id = r.player_id
                 JOIN teams t ON t.id = r.team_id
                 WHERE r.team_id = ?1 AND t.season = ?2 AND r.is_active = 1
                 ORDER BY r.position, p.name",
            )
            .map_err(StoreError::query("prepare fetch_roster"))?;

        let mut roster = stmt
            .query_map(params![team_id, season], |row| {
                Ok(RosterPlayer {
                    team_id: row.get(0)?,
                    player_id: row.get(1)?,
                    mlb_id: row.get(2)?,
                    name: row.get(3)?,
                    mlb_position: row.get(4)?,
                    fantasy_position: row.get(5)?,
                    acquisition: row.get(6)?,
                    active: row.get(7)?,
                })
            })
            .map_err(StoreError::query("query roster"))?
            .collect::<Result<Vec<_>, _>>()
            .map_err(StoreError::query("map roster rows"))?;

        // Hitters, then pitchers, then bench/IL; stable, so slot and name
        // order hold within each group.
        roster.sort_by_key(RosterPlayer::slot_group);
        Ok(roster)
    }

    fn fetch_player_stat(
        &self,
        player_id: PlayerId,
        season: Season,
        stat_type: StatType,
    ) -> StoreResult<Option<PlayerSeasonStat>> {
        let conn = self.conn();
        let mut stmt = conn
            .prepare(
                "SELECT stat_name, value FROM player_stats
                 WHERE player_id = ?1 AND season = ?2 AND stat_type = ?3",
            )
            .map_err(StoreError::query("prepare fetch_player_stat"))?;

        let fields = stmt
            .query_map(params![player_id, season, stat_type.as_str()], |row| {
                Ok((row.get::<_, String>(0)?, row.get::<_, f64>(1)?))
            })
            .map_err(StoreError::query("query player stats"))?
            .collect::<Result<BTreeMap<_, _>, _>>()
            .map_err(StoreError::query("map player stat rows"))?;

        if fields.is_empty() {
            return Ok(None);
        }
        Ok(Some(PlayerSeasonStat {
            player_id,
            season,
            stat_type,
            fields,
        }))
    }

    fn fetch_league_totals(&self, season: Season) -> StoreResult<LeagueTotals> {
        let conn = self.conn();
        let mut stmt = conn
            .prepare(
                "SELECT stat_type, stat_name, SUM(value), AVG(value), COUNT(*)
                 FROM player_stats
                 WHERE season = ?1
                   AND player_id IN (SELECT player_id FROM rosters WHERE is_active = 1)
                 GROUP BY stat_type, stat_name",
            )
            .map_err(StoreError::query("prepare fetch_league_totals"))?;

        let rows = stmt
            .query_map(params![season], |row| {
                Ok((
                    row.get::<_, String>(0)?,
                    row.get::<_, String>(1)?,
                    row.get::<_, f64>(2)?,
                    row.get::<_, f64>(3)?,
                    row.get::<_, u32>(4)?,
                ))
            })
            .map_err(StoreError::query("query league totals"))?
            .collect::<Result<Vec<_>, _>>()
            .map_err(StoreError::query("map league total rows"))?;

        let mut totals = LeagueTotals::new(season);
        for (stat_type, stat_name, sum, mean, count) in rows {
            let stat_type: StatType = stat_type
                .parse()
                .map_err(|e: UnknownStatType| StoreError::Invalid {
                    message: e.to_string(),
                })?;
            totals
                .of_type_mut(stat_type)
                .insert(stat_name, StatSummary { sum, mean, count });
        }
        Ok(totals)
    }

    fn fetch_league_teams(
        &self,
        league_id: LeagueId,
        season: Season,
    ) -> StoreResult<Vec<(TeamId, String)>> {
        let conn = self.conn();
        let mut stmt = conn
            .prepare(
                "SELECT id, name FROM teams
                 WHERE league_id = ?1 AND season = ?2
                 ORDER BY name, id",
            )
            .map_err(StoreError::query("prepare fetch_league_teams"))?;

        let teams = stmt
            .query_map(params![league_id, season], |row| Ok((row.get(0)?, row.get(1)?)))
            .map_err(StoreError::query("query league teams"))?
            .collect::<Result<Vec<_>, _>>()
            .map_err(StoreError::query("map league team rows"))?;
        Ok(teams)
    }

    fn latest_season(&self, league_id: LeagueId) -> StoreResult<Option<Season>> {
        let conn = self.conn();
        conn.query_row(
            "SELECT MAX(season) FROM teams WHERE league_id = ?1",
            params![league_id],
            |row| row.get(0),
        )
        .map_err(StoreError::query("latest league season"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::stats::StatField;

    /// Helper: create a fresh in-memory store for each test.
    fn test_store() -> SqliteStore {
        SqliteStore::open(":memory:").expect("in-memory database should open")
    }

    /// Helper: one league, one team for 2024.
    fn league_with_team(store: &SqliteStore) -> (LeagueId, TeamId) {
        let league = store.upsert_league("Vorticist League").unwrap();
        let team = store.insert_team(league, "Mudcats", Some("Wyndham"), 2024).unwrap();
        (league, team)
    }

    // ------------------------------------------------------------------
    // Schema / open
    // ------------------------------------------------------------------

    #[test]
    fn open_creates_tables() {
        let store = test_store();
        let conn = store.conn();

        let tables: Vec<String> = conn
            .prepare("SELECT name FROM sqlite_master WHERE type='table' ORDER BY name")
            .unwrap()
            .query_map([], |row| row.get(0))
            .unwrap()
            .collect::<Result<Vec<_>, _>>()
            .unwrap();

        for t in ["leagues", "teams", "players", "rosters", "player_stats"] {
            assert!(tables.contains(&t.to_string()), "missing table {t}");
        }
    }

    #[test]
    fn open_fails_for_unwritable_path() {
        assert!(SqliteStore::open("/nonexistent-dir/definitely/missing.db").is_err());
    }

    // ------------------------------------------------------------------
    // Teams and leagues
    // ------------------------------------------------------------------

    #[test]
    fn upsert_league_is_idempotent() {
        let store = test_store();
        let a = store.upsert_league("NFBC Main").unwrap();
        let b = store.upsert_league("NFBC Main").unwrap();
        assert_eq!(a, b);
    }

    #[test]
    fn fetch_team_joins_league_name() {
        let store = test_store();
        let (league, team) = league_with_team(&store);

        let record = store.fetch_team(team).unwrap().expect("team exists");
        assert_eq!(record.league_id, league);
        assert_eq!(record.team_name, "Mudcats");
        assert_eq!(record.league_name, "Vorticist League");
        assert_eq!(record.owner_name.as_deref(), Some("Wyndham"));
        assert_eq!(record.season, 2024);
    }

    #[test]
    fn fetch_team_missing_returns_none() {
        let store = test_store();
        assert!(store.fetch_team(999).unwrap().is_none());
    }

    #[test]
    fn league_teams_sorted_by_name() {
        let store = test_store();
        let league = store.upsert_league("L").unwrap();
        store.insert_team(league, "Zephyrs", None, 2024).unwrap();
        store.insert_team(league, "Aces", None, 2024).unwrap();
        let other = store.upsert_league("Other").unwrap();
        store.insert_team(other, "Bandits", None, 2024).unwrap();

        let names: Vec<String> = store
            .fetch_league_teams(league, 2024)
            .unwrap()
            .into_iter()
            .map(|(_, name)| name)
            .collect();
        assert_eq!(names, vec!["Aces", "Zephyrs"]);
    }

    #[test]
    fn league_teams_scoped_to_season() {
        let store = test_store();
        let league = store.upsert_league("L").unwrap();
        store.insert_team(league, "Last Year", None, 2023).unwrap();
        let current = store.insert_team(league, "This Year", None, 2024).unwrap();

        let teams = store.fetch_league_teams(league, 2024).unwrap();
        assert_eq!(teams, vec![(current, "This Year".to_string())]);
        assert_eq!(store.fetch_league_teams(league, 2023).unwrap().len(), 1);
        assert!(store.fetch_league_teams(league, 2022).unwrap().is_empty());
    }

    #[test]
    fn latest_season_per_league() {
        let store = test_store();
        let league = store.upsert_league("L").unwrap();
        assert_eq!(store.latest_season(league).unwrap(), None);

        store.insert_team(league, "A", None, 2023).unwrap();
        store.insert_team(league, "B", None, 2025).unwrap();
        store.insert_team(league, "C", None, 2024).unwrap();
        let other = store.upsert_league("Other").unwrap();
        store.insert_team(other, "D", None, 2030).unwrap();

        assert_eq!(store.latest_season(league).unwrap(), Some(2025));
    }

    #[test]
    fn all_teams_orders_newest_season_first() {
        let store = test_store();
        let league = store.upsert_league("L").unwrap();
        store.insert_team(league, "Old", None, 2023).unwrap();
        store.insert_team(league, "New", None, 2025).unwrap();
        let teams = store.all_teams().unwrap();
        assert_eq!(teams[0].team_name, "New");
        assert_eq!(teams[1].team_name, "Old");
    }

    // ------------------------------------------------------------------
    // Players and rosters
    // ------------------------------------------------------------------

    #[test]
    fn upsert_player_by_mlb_id_returns_same_id() {
        let store = test_store();
        let a = store.upsert_player(Some("660271"), "Shohei Ohtani", Some("LAD"), "DH").unwrap();
        let b = store.upsert_player(Some("660271"), "Shohei Ohtani", Some("LAD"), "DH").unwrap();
        assert_eq!(a, b);

        let c = store.upsert_player(None, "Unknown Prospect", None, "SS").unwrap();
        let d = store.upsert_player(None, "Unknown Prospect", None, "SS").unwrap();
        assert_ne!(c, d);
    }

    #[test]
    fn roster_orders_hitters_then_pitchers_then_bench() {
        let store = test_store();
        let (_, team) = league_with_team(&store);
        let sp = store.upsert_player(Some("1"), "Ace", None, "P").unwrap();
        let of = store.upsert_player(Some("2"), "Slugger", None, "OF").unwrap();
        let be = store.upsert_player(Some("3"), "Backup", None, "C").unwrap();
        store.add_player_to_team(team, sp, "SP", Acquisition::Waiver).unwrap();
        store.add_player_to_team(team, be, "BE", Acquisition::Waiver).unwrap();
        store.add_player_to_team(team, of, "of", Acquisition::Waiver).unwrap();

        let roster = store.fetch_roster(team, 2024).unwrap();
        let slots: Vec<&str> = roster.iter().map(|p| p.fantasy_position.as_str()).collect();
        assert_eq!(slots, vec!["OF", "SP", "BE"]);
        assert!(roster.iter().all(|p| p.active));
    }

    #[test]
    fn roster_filtered_by_season() {
        let store = test_store();
        let (_, team) = league_with_team(&store);
        let p = store.upsert_player(Some("1"), "Ace", None, "P").unwrap();
        store.add_player_to_team(team, p, "SP", Acquisition::Waiver).unwrap();
        assert_eq!(store.fetch_roster(team, 2024).unwrap().len(), 1);
        assert!(store.fetch_roster(team, 2023).unwrap().is_empty());
    }

    #[test]
    fn re_adding_player_moves_slot_without_duplicating() {
        let store = test_store();
        let (_, team) = league_with_team(&store);
        let p = store.upsert_player(Some("1"), "Flex", None, "2B").unwrap();
        store.add_player_to_team(team, p, "2B", Acquisition::Waiver).unwrap();
        store.add_player_to_team(team, p, "UTIL", Acquisition::Waiver).unwrap();

        let roster = store.fetch_roster(team, 2024).unwrap();
        assert_eq!(roster.len(), 1);
        assert_eq!(roster[0].fantasy_position, "UTIL");
    }

    #[test]
    fn acquisition_type_stored_and_updated() {
        let store = test_store();
        let (_, team) = league_with_team(&store);
        let p = store.upsert_player(Some("1"), "Keeper", None, "SS").unwrap();

        store.add_player_to_team(team, p, "SS", Acquisition::Draft).unwrap();
        assert_eq!(store.fetch_roster(team, 2024).unwrap()[0].acquisition, Acquisition::Draft);

        store.add_player_to_team(team, p, "SS", Acquisition::Trade).unwrap();
        let roster = store.fetch_roster(team, 2024).unwrap();
        assert_eq!(roster.len(), 1);
        assert_eq!(roster[0].acquisition, Acquisition::Trade);
    }

    #[test]
    fn remove_player_from_team_reports_presence() {
        let store = test_store();
        let (_, team) = league_with_team(&store);
        let p = store.upsert_player(Some("1"), "Cut", None, "C").unwrap();
        store.add_player_to_team(team, p, "C", Acquisition::Waiver).unwrap();

        assert!(store.remove_player_from_team(team, p).unwrap());
        assert!(!store.remove_player_from_team(team, p).unwrap());
        assert!(store.fetch_roster(team, 2024).unwrap().is_empty());
    }

    #[test]
    fn foreign_keys_enforced() {
        let store = test_store();
        let result = store.add_player_to_team(42, 43, "C", Acquisition::Waiver);
        assert!(matches!(result, Err(StoreError::Query { .. })));
    }

    // ------------------------------------------------------------------
    // Stats
    // ------------------------------------------------------------------

    #[test]
    fn record_and_fetch_player_stat() {
        let store = test_store();
        let p = store.upsert_player(Some("1"), "Hitter", None, "1B").unwrap();
        let line = PlayerSeasonStat::new(p, 2024, StatType::Batting)
            .with("home_runs", 30.0)
            .with("batting_avg", 0.281)
            .with("plate_appearances", 640.0);
        store.record_stats(std::slice::from_ref(&line)).unwrap();

        let fetched = store
            .fetch_player_stat(p, 2024, StatType::Batting)
            .unwrap()
            .expect("stat line exists");
        assert_eq!(fetched, line);
        assert!(store.fetch_player_stat(p, 2024, StatType::Pitching).unwrap().is_none());
        assert!(store.fetch_player_stat(p, 2023, StatType::Batting).unwrap().is_none());
    }

    #[test]
    fn record_stats_replaces_and_skips_non_finite() {
        let store = test_store();
        let p = store.upsert_player(Some("1"), "Arm", None, "P").unwrap();
        store
            .record_stats(&[PlayerSeasonStat::new(p, 2024, StatType::Pitching).with("wins", 10.0)])
            .unwrap();
        store
            .record_stats(&[PlayerSeasonStat::new(p, 2024, StatType::Pitching)
                .with("wins", 12.0)
                .with("era", f64::NAN)])
            .unwrap();

        let fetched = store.fetch_player_stat(p, 2024, StatType::Pitching).unwrap().unwrap();
        assert_eq!(fetched.fields.get("wins"), Some(&12.0));
        assert!(!fetched.fields.contains_key("era"));
    }

    #[test]
    fn league_totals_only_count_rostered_players() {
        let store = test_store();
        let (_, team) = league_with_team(&store);
        let rostered = store.upsert_player(Some("1"), "On Team", None, "OF").unwrap();
        let free_agent = store.upsert_player(Some("2"), "Free Agent", None, "OF").unwrap();
        store.add_player_to_team(team, rostered, "OF", Acquisition::Waiver).unwrap();
        store
            .record_stats(&[
                PlayerSeasonStat::new(rostered, 2024, StatType::Batting)
                    .with("home_runs", 20.0)
                    .with("batting_avg", 0.300),
                PlayerSeasonStat::new(free_agent, 2024, StatType::Batting)
                    .with("home_runs", 40.0)
                    .with("batting_avg", 0.200),
            ])
            .unwrap();

        let totals = store.fetch_league_totals(2024).unwrap();
        let hr = totals.batting.get("home_runs").unwrap();
        assert_eq!(hr.sum, 20.0);
        assert_eq!(hr.count, 1);
        assert!((totals.batting["batting_avg"].mean - 0.300).abs() < 1e-12);
        assert!(totals.pitching.is_empty());
    }

    #[test]
    fn stats_stored_under_canonical_keys() {
        let store = test_store();
        let (_, team) = league_with_team(&store);
        let a = store.upsert_player(Some("1"), "Long Names", None, "OF").unwrap();
        let b = store.upsert_player(Some("2"), "Short Names", None, "OF").unwrap();
        store.add_player_to_team(team, a, "OF", Acquisition::Draft).unwrap();
        store.add_player_to_team(team, b, "OF", Acquisition::Draft).unwrap();
        store
            .record_stats(&[
                PlayerSeasonStat::new(a, 2024, StatType::Batting).with("home_runs", 20.0),
                PlayerSeasonStat::new(b, 2024, StatType::Batting)
                    .with("hr", 20.0)
                    .with("avg", 0.250)
                    .with("barrels", 31.0),
            ])
            .unwrap();

        let fetched = store.fetch_player_stat(b, 2024, StatType::Batting).unwrap().unwrap();
        assert_eq!(fetched.fields.get("home_runs"), Some(&20.0));
        assert_eq!(fetched.fields.get("batting_avg"), Some(&0.250));
        assert_eq!(fetched.fields.get("barrels"), Some(&31.0));
        assert!(!fetched.fields.contains_key("hr"));

        let totals = store.fetch_league_totals(2024).unwrap();
        let hr = totals.summary(StatType::Batting, StatField::HomeRuns).unwrap();
        assert_eq!(hr.sum, 40.0);
        assert_eq!(hr.count, 2);
        assert!(!totals.batting.contains_key("hr"));
    }

    #[test]
    fn league_totals_empty_season() {
        let store = test_store();
        let totals = store.fetch_league_totals(1999).unwrap();
        assert!(totals.is_empty());
        assert_eq!(totals.season, 1999);
    }

    // ------------------------------------------------------------------
    // Player lookups
    // ------------------------------------------------------------------

    /// Helper: a league with two teams and a small player pool.
    /// Mudcats roster Judge (OF slot); Aces roster Cole (SP, released later).
    fn player_pool(store: &SqliteStore) -> (LeagueId, TeamId, TeamId) {
        let (league, mudcats) = league_with_team(store);
        let aces = store.insert_team(league, "Aces", None, 2024).unwrap();

        let judge = store.upsert_player(Some("1"), "Aaron Judge", Some("NYY"), "RF").unwrap();
        let cole = store.upsert_player(Some("2"), "Gerrit Cole", Some("NYY"), "SP").unwrap();
        store.upsert_player(Some("3"), "Julio Rodriguez", Some("SEA"), "CF").unwrap();
        store.upsert_player(Some("4"), "Edwin Diaz", Some("NYM"), "RP").unwrap();
        store.upsert_player(Some("5"), "Adley Rutschman", Some("BAL"), "C").unwrap();

        store.add_player_to_team(mudcats, judge, "OF", Acquisition::Draft).unwrap();
        store.add_player_to_team(aces, cole, "SP", Acquisition::Draft).unwrap();
        (league, mudcats, aces)
    }

    fn names(players: &[PlayerRecord]) -> Vec<&str> {
        players.iter().map(|p| p.name.as_str()).collect()
    }

    #[test]
    fn free_agents_exclude_rostered_players() {
        let store = test_store();
        let (league, _, _) = player_pool(&store);

        let all = store.free_agents(league, 2024, None).unwrap();
        assert_eq!(names(&all), vec!["Adley Rutschman", "Edwin Diaz", "Julio Rodriguez"]);

        let outfield = store.free_agents(league, 2024, Some("OF")).unwrap();
        assert_eq!(names(&outfield), vec!["Julio Rodriguez"]);

        let pitchers = store.free_agents(league, 2024, Some("p")).unwrap();
        assert_eq!(names(&pitchers), vec!["Edwin Diaz"]);
    }

    #[test]
    fn released_player_becomes_free_agent() {
        let store = test_store();
        let (league, _, aces) = player_pool(&store);
        let cole = store.players_by_name("Cole", 1).unwrap()[0].player_id;
        store.remove_player_from_team(aces, cole).unwrap();

        let pitchers = store.free_agents(league, 2024, Some("SP")).unwrap();
        assert_eq!(names(&pitchers), vec!["Gerrit Cole"]);
    }

    #[test]
    fn free_agents_empty_without_teams_that_season() {
        let store = test_store();
        let (league, _, _) = player_pool(&store);
        assert!(store.free_agents(league, 2019, None).unwrap().is_empty());
    }

    #[test]
    fn available_players_filter_and_limit() {
        let store = test_store();
        let (_, mudcats, _) = player_pool(&store);

        let all = store.available_players(mudcats, None, None, 10).unwrap();
        assert_eq!(all.len(), 4);
        assert!(!names(&all).contains(&"Aaron Judge"));
        // Players on other teams still show: availability is per team.
        assert!(names(&all).contains(&"Gerrit Cole"));

        let limited = store.available_players(mudcats, None, None, 2).unwrap();
        assert_eq!(names(&limited), vec!["Adley Rutschman", "Edwin Diaz"]);

        let searched = store.available_players(mudcats, None, Some("rod"), 10).unwrap();
        assert_eq!(names(&searched), vec!["Julio Rodriguez"]);

        let catchers = store.available_players(mudcats, Some("C"), None, 10).unwrap();
        assert_eq!(names(&catchers), vec!["Adley Rutschman"]);
    }

    #[test]
    fn players_by_name_is_case_insensitive() {
        let store = test_store();
        player_pool(&store);

        let found = store.players_by_name("JUDGE", 10).unwrap();
        assert_eq!(found.len(), 1);
        assert_eq!(found[0].mlb_team.as_deref(), Some("NYY"));
        assert_eq!(found[0].position, "RF");

        assert_eq!(store.players_by_name("e", 2).unwrap().len(), 2);
        assert!(store.players_by_name("Ohtani", 10).unwrap().is_empty());
    }
}
