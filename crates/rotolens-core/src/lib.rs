// Shared data model, data-access seam, SQLite store, and configuration.

pub mod category;
pub mod config;
pub mod db;
pub mod ids;
pub mod roster;
pub mod stats;
pub mod store;

pub use category::{Category, CategoryKind, Direction, Discipline};
pub use ids::{LeagueId, PlayerId, Season, TeamId};
pub use store::{LeagueStore, StoreError, StoreResult};
