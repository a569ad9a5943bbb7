//! Layered configuration.
//!
//! Sources, later ones winning:
//! 1. `<dir>/default.toml`
//! 2. `<dir>/<RUN_MODE>.toml` (optional, `RUN_MODE` defaults to `development`)
//! 3. `<dir>/local.toml` (optional)
//! 4. `STOCKROOM__SECTION__KEY` environment variables

use std::env;
use std::path::Path;

use config::{Config, ConfigError, Environment, File};
use serde::Deserialize;

use stockroom_observability::LogSettings;

#[derive(Debug, Clone, Deserialize)]
pub struct Server {
    pub bind: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct Auth {
    pub jwt_secret: String,
    pub token_ttl_minutes: i64,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct Database {
    /// Postgres URL. Absent means the in-memory store.
    #[serde(default)]
    pub url: Option<String>,
    #[serde(default = "default_max_connections")]
    pub max_connections: u32,
}

#[derive(Debug, Clone, Deserialize)]
pub struct Inventory {
    /// Offset east of UTC that defines the business day (e.g. `-300`).
    pub business_utc_offset_minutes: i32,
    pub movement_list_limit: usize,
}

#[derive(Debug, Clone, Deserialize)]
pub struct Settings {
    pub server: Server,
    pub auth: Auth,
    #[serde(default)]
    pub database: Database,
    pub inventory: Inventory,
    #[serde(default)]
    pub log: LogSettings,
}

fn default_max_connections() -> u32 {
    5
}

impl Settings {
    pub fn load(dir: &Path) -> Result<Self, ConfigError> {
        let run_mode = env::var("RUN_MODE").unwrap_or_else(|_| "development".into());
        let source = |name: &str| dir.join(name).to_string_lossy().into_owned();

        let config = Config::builder()
            .add_source(File::with_name(&source("default")))
            .add_source(File::with_name(&source(&run_mode)).required(false))
            .add_source(File::with_name(&source("local")).required(false))
            .add_source(Environment::with_prefix("STOCKROOM").separator("__"))
            .build()?;

        config.try_deserialize()
    }

    /// Settings for tests: in-memory store, UTC business day.
    pub fn test(jwt_secret: &str) -> Settings {
        Settings {
            server: Server {
                bind: "127.0.0.1:0".into(),
            },
            auth: Auth {
                jwt_secret: jwt_secret.into(),
                token_ttl_minutes: 60,
            },
            database: Database::default(),
            inventory: Inventory {
                business_utc_offset_minutes: 0,
                movement_list_limit: 100,
            },
            log: LogSettings::default(),
        }
    }
}
