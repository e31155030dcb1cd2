//! Application configuration.
//!
//! Settings come from `timetable.toml` and are then overridden by the
//! environment. The file is optional; without one the service runs on the
//! in-memory repository with the default 5×7 grid on `0.0.0.0:8080`.
//!
//! ```toml
//! [repository]
//! type = "local"
//!
//! [grid]
//! days = ["Monday", "Tuesday", "Wednesday", "Thursday", "Friday"]
//! times = ["8:00 AM", "9:00 AM", "10:00 AM"]
//! max_semester = 8
//! strict_moves = false
//!
//! [server]
//! host = "127.0.0.1"
//! port = 8080
//! ```
//!
//! Environment overrides: `TIMETABLE_CONFIG` (explicit file path),
//! `REPOSITORY_TYPE`, `DATABASE_URL`/`PG_DATABASE_URL`, the `PG_*` pool
//! settings, `HOST`, `PORT`.

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

use crate::db::repo_config::{
    CatalogSettings, PostgresSettings, RepositoryConfig, RepositorySettings,
};
use crate::error::TimetableResult;
use crate::models::{Day, SlotGrid, DEFAULT_TIME_SLOTS};

/// Top-level configuration file.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AppConfig {
    #[serde(default)]
    pub repository: RepositorySettings,
    #[serde(default)]
    pub postgres: PostgresSettings,
    #[serde(default)]
    pub catalog: CatalogSettings,
    #[serde(default)]
    pub grid: GridSettings,
    #[serde(default)]
    pub server: ServerSettings,
}

/// Slot grid and editing rules.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GridSettings {
    #[serde(default = "default_days")]
    pub days: Vec<Day>,
    #[serde(default = "default_times")]
    pub times: Vec<String>,
    #[serde(default = "default_max_semester")]
    pub max_semester: u32,
    /// Re-check the teacher rule when a class is dragged to another cell.
    #[serde(default)]
    pub strict_moves: bool,
}

impl Default for GridSettings {
    fn default() -> Self {
        Self {
            days: default_days(),
            times: default_times(),
            max_semester: default_max_semester(),
            strict_moves: false,
        }
    }
}

fn default_days() -> Vec<Day> {
    Day::WEEKDAYS.to_vec()
}

fn default_times() -> Vec<String> {
    DEFAULT_TIME_SLOTS.iter().map(|t| t.to_string()).collect()
}

fn default_max_semester() -> u32 {
    8
}

impl GridSettings {
    /// Build the validated slot grid.
    pub fn grid(&self) -> TimetableResult<SlotGrid> {
        SlotGrid::new(self.days.clone(), self.times.clone())
    }
}

/// HTTP bind settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerSettings {
    #[serde(default = "default_host")]
    pub host: String,
    #[serde(default = "default_port")]
    pub port: u16,
}

impl Default for ServerSettings {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
        }
    }
}

fn default_host() -> String {
    "0.0.0.0".to_string()
}

fn default_port() -> u16 {
    8080
}

impl ServerSettings {
    pub fn bind_address(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

impl AppConfig {
    /// Parse configuration from TOML text.
    pub fn from_toml_str(content: &str) -> Result<Self> {
        let config: AppConfig = toml::from_str(content).context("Failed to parse configuration")?;
        config.grid.grid().context("Invalid [grid] section")?;
        if config.grid.max_semester == 0 {
            anyhow::bail!("grid.max_semester must be at least 1");
        }
        Ok(config)
    }

    /// Load configuration from a TOML file.
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file {}", path.display()))?;
        Self::from_toml_str(&content)
            .with_context(|| format!("Invalid config file {}", path.display()))
    }

    /// Resolve the configuration file and apply environment overrides.
    ///
    /// `TIMETABLE_CONFIG` must point at an existing file when set. Otherwise
    /// the standard locations are searched and defaults are used when none
    /// exists.
    pub fn load() -> Result<Self> {
        let mut config = match Self::config_path() {
            Some(path) => {
                log::info!("Loading configuration from {}", path.display());
                Self::from_file(&path)?
            }
            None => {
                log::info!("No configuration file found, using defaults");
                Self::default()
            }
        };
        config.apply_env_overrides()?;
        Ok(config)
    }

    fn config_path() -> Option<PathBuf> {
        match std::env::var("TIMETABLE_CONFIG") {
            Ok(path) if !path.trim().is_empty() => Some(PathBuf::from(path)),
            _ => RepositoryConfig::find_default_file(),
        }
    }

    /// Apply `REPOSITORY_TYPE`, `DATABASE_URL`, the `PG_*` pool settings,
    /// `HOST` and `PORT`.
    pub fn apply_env_overrides(&mut self) -> Result<()> {
        if let Ok(repo_type) = std::env::var("REPOSITORY_TYPE") {
            self.repository.repo_type = repo_type;
        }
        if let Ok(url) =
            std::env::var("DATABASE_URL").or_else(|_| std::env::var("PG_DATABASE_URL"))
        {
            self.postgres.database_url = url;
        }
        let pg = &mut self.postgres;
        env_parse("PG_POOL_MAX", &mut pg.max_connections)?;
        env_parse("PG_POOL_MIN", &mut pg.min_connections)?;
        env_parse("PG_CONN_TIMEOUT_SEC", &mut pg.connect_timeout)?;
        env_parse("PG_IDLE_TIMEOUT_SEC", &mut pg.idle_timeout)?;
        env_parse("PG_MAX_RETRIES", &mut pg.max_retries)?;
        env_parse("PG_RETRY_DELAY_MS", &mut pg.retry_delay_ms)?;
        if let Ok(host) = std::env::var("HOST") {
            self.server.host = host;
        }
        env_parse("PORT", &mut self.server.port)?;
        Ok(())
    }

    /// The storage sections as a repository configuration.
    pub fn repository_config(&self) -> RepositoryConfig {
        RepositoryConfig {
            repository: self.repository.clone(),
            postgres: self.postgres.clone(),
            catalog: self.catalog.clone(),
        }
    }
}

/// Overwrite `target` with the parsed value of `name`, if set.
fn env_parse<T>(name: &str, target: &mut T) -> Result<()>
where
    T: std::str::FromStr,
    T::Err: std::error::Error + Send + Sync + 'static,
{
    if let Ok(raw) = std::env::var(name) {
        *target = raw
            .trim()
            .parse()
            .with_context(|| format!("{} has an invalid value '{}'", name, raw))?;
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = AppConfig::from_toml_str("").unwrap();
        let grid = config.grid.grid().unwrap();
        assert_eq!(grid.days().len(), 5);
        assert_eq!(grid.times().len(), 7);
        assert_eq!(config.grid.max_semester, 8);
        assert!(!config.grid.strict_moves);
        assert_eq!(config.server.bind_address(), "0.0.0.0:8080");
        assert_eq!(config.repository.repo_type, "local");
    }

    #[test]
    fn test_grid_section() {
        let config = AppConfig::from_toml_str(
            r#"
[grid]
days = ["Saturday", "monday"]
times = ["9:00 AM", "10:00 AM"]
max_semester = 6
strict_moves = true
"#,
        )
        .unwrap();
        let grid = config.grid.grid().unwrap();
        assert_eq!(grid.days(), &[Day::Monday, Day::Saturday]);
        assert_eq!(config.grid.max_semester, 6);
        assert!(config.grid.strict_moves);
    }

    #[test]
    fn test_invalid_grid_is_rejected() {
        assert!(AppConfig::from_toml_str("[grid]\ntimes = []\n").is_err());
        assert!(AppConfig::from_toml_str("[grid]\ndays = [\"Funday\"]\n").is_err());
        assert!(AppConfig::from_toml_str("[grid]\nmax_semester = 0\n").is_err());
    }

    #[test]
    fn test_repository_config_view() {
        let config = AppConfig::from_toml_str(
            r#"
[repository]
type = "local"

[[catalog.teachers]]
name = "Dr. A"
"#,
        )
        .unwrap();
        let repo = config.repository_config();
        assert_eq!(repo.catalog.teachers[0].name, "Dr. A");
    }
}
