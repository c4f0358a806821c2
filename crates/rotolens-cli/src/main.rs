// rotolens entry point.
//
// Startup sequence:
// 1. Initialize tracing (stderr, so stdout stays JSON)
// 2. Load config, falling back to built-in defaults when none is found
// 3. Open the SQLite store
// 4. Run the requested subcommand and print its result

use std::path::PathBuf;

use anyhow::{bail, Context};
use chrono::Datelike;
use clap::{Parser, Subcommand};
use serde::Serialize;
use tracing::{info, warn};

use rotolens_baseball::Analyzer;
use rotolens_core::config::{self, Config, ConfigError};
use rotolens_core::db::SqliteStore;
use rotolens_core::roster::{Acquisition, Position};
use rotolens_core::{LeagueId, LeagueStore, PlayerId, Season, TeamId};

#[derive(Parser)]
#[command(name = "rotolens")]
#[command(about = "Fantasy baseball roster ratings and rotisserie standings")]
#[command(version)]
struct Cli {
    /// Directory containing config/ (or defaults/)
    #[arg(long)]
    config: Option<PathBuf>,

    /// Database path, overriding the configured one
    #[arg(long)]
    db: Option<String>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Rate a team's categories and suggest improvements
    Analyze {
        team_id: TeamId,
    },

    /// Project rotisserie standings for a league
    Standings {
        league_id: LeagueId,
        /// Season year (defaults to the league's latest season)
        #[arg(long)]
        season: Option<Season>,
    },

    /// Show the average-team baseline for a season
    Baseline {
        /// Season year (defaults to the current year)
        #[arg(long)]
        season: Option<Season>,
    },

    /// List all teams
    Teams,

    /// Add or drop roster players
    Roster {
        #[command(subcommand)]
        action: RosterAction,
    },

    /// Look up and register players
    Players {
        #[command(subcommand)]
        action: PlayersAction,
    },
}

#[derive(Subcommand)]
enum RosterAction {
    /// Put a player on a team's active roster
    Add {
        team_id: TeamId,
        player_id: PlayerId,
        /// Fantasy slot, e.g. OF, RP, BE
        position: String,
        /// How the player was acquired: draft, waiver, free_agent, trade, keeper
        #[arg(long, default_value_t = Acquisition::Waiver)]
        acquisition: Acquisition,
    },

    /// Remove a player from a team's roster
    Drop {
        team_id: TeamId,
        player_id: PlayerId,
    },
}

#[derive(Subcommand)]
enum PlayersAction {
    /// Find players by name
    Search {
        name: String,
        #[arg(long, default_value_t = 10)]
        limit: usize,
    },

    /// Players on no active roster in a league
    FreeAgents {
        league_id: LeagueId,
        /// Season year (defaults to the league's latest season)
        #[arg(long)]
        season: Option<Season>,
        /// Only players eligible at this position (OF covers LF/CF/RF, P any pitcher)
        #[arg(long)]
        position: Option<String>,
    },

    /// Players not on a team's roster
    Available {
        team_id: TeamId,
        #[arg(long)]
        position: Option<String>,
        /// Name fragment to match
        #[arg(long)]
        search: Option<String>,
        #[arg(long, default_value_t = 20)]
        limit: usize,
    },

    /// Register a player, or update one matched by MLB id
    Add {
        #[arg(long)]
        name: String,
        /// Primary MLB position, e.g. SS, CF, SP
        #[arg(long)]
        position: String,
        #[arg(long)]
        mlb_id: Option<String>,
        #[arg(long)]
        mlb_team: Option<String>,
    },
}

fn main() -> anyhow::Result<()> {
    init_tracing()?;
    let cli = Cli::parse();

    let config = load_config(&cli)?;
    let db_path = cli.db.clone().unwrap_or_else(|| config.db_path.clone());
    let store = SqliteStore::open(&db_path)
        .with_context(|| format!("failed to open database at {db_path}"))?;
    info!("Database opened at {}", db_path);

    let analyzer = Analyzer::new(&store, config);

    match cli.command {
        Commands::Analyze { team_id } => {
            match analyzer
                .analyze_team(team_id)
                .with_context(|| format!("failed to analyze team {team_id}"))?
            {
                Some(analysis) => print_json(&analysis)?,
                None => eprintln!("team {team_id} not found"),
            }
        }
        Commands::Standings { league_id, season } => {
            let result = match season {
                Some(season) => analyzer.project_standings_for(league_id, season),
                None => analyzer.project_standings(league_id),
            };
            match result
                .with_context(|| format!("failed to project standings for league {league_id}"))?
            {
                Some(result) => print_json(&result)?,
                None => eprintln!("league {league_id} has no teams"),
            }
        }
        Commands::Baseline { season } => {
            let season = season.unwrap_or_else(|| chrono::Utc::now().year());
            print_json(&analyzer.league_baseline(season))?;
        }
        Commands::Teams => {
            let teams = store.all_teams().context("failed to list teams")?;
            print_json(&teams)?;
        }
        Commands::Roster { action } => match action {
            RosterAction::Add {
                team_id,
                player_id,
                position,
                acquisition,
            } => {
                if Position::from_str_pos(&position).is_none() {
                    bail!("unknown roster position `{position}`");
                }
                store
                    .add_player_to_team(team_id, player_id, &position, acquisition)
                    .context("failed to add player")?;
            }
            RosterAction::Drop { team_id, player_id } => {
                let removed = store
                    .remove_player_from_team(team_id, player_id)
                    .context("failed to drop player")?;
                if !removed {
                    warn!("player {} was not on team {}", player_id, team_id);
                }
            }
        },
        Commands::Players { action } => run_players(&store, action)?,
    }

    Ok(())
}

fn run_players(store: &SqliteStore, action: PlayersAction) -> anyhow::Result<()> {
    match action {
        PlayersAction::Search { name, limit } => {
            let players = store
                .players_by_name(&name, limit)
                .context("failed to search players")?;
            print_json(&players)
        }
        PlayersAction::FreeAgents {
            league_id,
            season,
            position,
        } => {
            let season = match season {
                Some(season) => season,
                None => match store
                    .latest_season(league_id)
                    .context("failed to look up league season")?
                {
                    Some(season) => season,
                    None => bail!("league {league_id} has no teams"),
                },
            };
            let players = store
                .free_agents(league_id, season, position.as_deref())
                .context("failed to list free agents")?;
            info!("{} free agents in league {} ({})", players.len(), league_id, season);
            print_json(&players)
        }
        PlayersAction::Available {
            team_id,
            position,
            search,
            limit,
        } => {
            let players = store
                .available_players(team_id, position.as_deref(), search.as_deref(), limit)
                .context("failed to list available players")?;
            print_json(&players)
        }
        PlayersAction::Add {
            name,
            position,
            mlb_id,
            mlb_team,
        } => {
            let player_id = store
                .upsert_player(mlb_id.as_deref(), &name, mlb_team.as_deref(), &position)
                .context("failed to add player")?;
            print_json(&serde_json::json!({ "player_id": player_id }))
        }
    }
}

/// Load configuration. A missing config directory is not fatal: the
/// built-in defaults are used instead. Malformed config is.
fn load_config(cli: &Cli) -> anyhow::Result<Config> {
    match config::load_config(cli.config.as_deref()) {
        Ok(config) => {
            info!(
                "Config loaded: {} teams per league, {} rated categories",
                config.baseline.teams_per_league,
                config.categories.rated.len()
            );
            Ok(config)
        }
        Err(e @ (ConfigError::FileNotFound { .. } | ConfigError::DefaultsCopyError { .. })) => {
            warn!("{e}; using built-in defaults");
            Ok(Config::default())
        }
        Err(e) => Err(e).context("failed to load configuration"),
    }
}

fn print_json<T: Serialize>(value: &T) -> anyhow::Result<()> {
    let json = serde_json::to_string_pretty(value).context("failed to serialize output")?;
    println!("{json}");
    Ok(())
}

/// Initialize tracing to stderr. `RUST_LOG` overrides the default filter.
fn init_tracing() -> anyhow::Result<()> {
    use tracing_subscriber::fmt;
    use tracing_subscriber::EnvFilter;

    let subscriber = fmt::Subscriber::builder()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new("rotolens=info,warn")),
        )
        .with_writer(std::io::stderr)
        .with_target(true)
        .with_line_number(true)
        .finish();

    tracing::subscriber::set_global_default(subscriber)
        .context("failed to set tracing subscriber")?;

    Ok(())
}
