use std::env;

const DEFAULT_BIND_ADDR: &str = "0.0.0.0:3000";
const DEFAULT_MAX_CONNECTIONS: u32 = 5;

/// Runtime settings, read from the environment
#[derive(Debug, Clone, PartialEq)]
pub struct AppConfig {
    pub bind_addr: String,
    /// Postgres connection string; the in-memory store is used when unset
    pub database_url: Option<String>,
    pub max_db_connections: u32,
    /// Secret in the admin route path; admin routes answer 404 when unset
    pub admin_secret: Option<String>,
    /// Load the demo roster into the in-memory store at startup
    pub seed_demo_roster: bool,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            bind_addr: DEFAULT_BIND_ADDR.to_string(),
            database_url: None,
            max_db_connections: DEFAULT_MAX_CONNECTIONS,
            admin_secret: None,
            seed_demo_roster: false,
        }
    }
}

impl AppConfig {
    pub fn from_env() -> Self {
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Builds the config from any key lookup; blank values count as unset.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let get = |key: &str| lookup(key).filter(|value| !value.trim().is_empty());
        let defaults = Self::default();

        Self {
            bind_addr: get("BIND_ADDR").unwrap_or(defaults.bind_addr),
            database_url: get("DATABASE_URL"),
            max_db_connections: get("DATABASE_MAX_CONNECTIONS")
                .and_then(|value| value.parse().ok())
                .unwrap_or(defaults.max_db_connections),
            admin_secret: get("ADMIN_SECRET"),
            seed_demo_roster: get("SEED_DEMO_ROSTER")
                .map(|value| matches!(value.to_lowercase().as_str(), "1" | "true" | "yes"))
                .unwrap_or(defaults.seed_demo_roster),
        }
    }
}
