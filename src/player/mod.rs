pub mod models;
pub mod postgres;
pub mod repository;
pub mod service;
pub mod types;

pub use models::{NewPlayer, PlayerId, PlayerModel};
pub use postgres::PostgresPlayerStore;
pub use repository::{InMemoryPlayerStore, MatchTransaction, PlayerStore};
pub use service::RosterService;
