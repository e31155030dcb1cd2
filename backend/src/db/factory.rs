//! Repository factory for dependency injection.
//!
//! Selects and builds the storage backend from the environment or from the
//! `[repository]` section of `timetable.toml`.

use std::path::Path;
use std::str::FromStr;
use std::sync::Arc;

use super::repo_config::{CatalogSettings, RepositoryConfig};
use super::repositories::LocalRepository;
#[cfg(feature = "postgres-repo")]
use super::repositories::PostgresRepository;
use super::repository::{FullRepository, RepositoryError, RepositoryResult};
use super::PostgresConfig;

/// Repository type configuration.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RepositoryType {
    /// Postgres + Diesel implementation
    Postgres,
    /// In-memory local repository
    Local,
}

impl FromStr for RepositoryType {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "postgres" | "pg" => Ok(Self::Postgres),
            "local" | "memory" => Ok(Self::Local),
            _ => Err(format!("Unknown repository type: {}", s)),
        }
    }
}

#[cfg(not(feature = "postgres-repo"))]
fn postgres_disabled() -> RepositoryError {
    RepositoryError::configuration("Postgres repository feature not enabled")
}

/// Repository factory for creating repository instances.
///
/// # Example
/// ```
/// use institute_timetable::db::{RepositoryFactory, RepositoryType};
///
/// # tokio::runtime::Runtime::new().unwrap().block_on(async {
/// let repo = RepositoryFactory::create(RepositoryType::Local, None).await.unwrap();
/// assert!(repo.health_check().await.unwrap());
/// # });
/// ```
pub struct RepositoryFactory;

impl RepositoryFactory {
    /// Create a repository instance based on type.
    ///
    /// `postgres_config` is required for [`RepositoryType::Postgres`].
    pub async fn create(
        repo_type: RepositoryType,
        postgres_config: Option<&PostgresConfig>,
    ) -> RepositoryResult<Arc<dyn FullRepository>> {
        match repo_type {
            RepositoryType::Postgres => {
                #[cfg(feature = "postgres-repo")]
                {
                    let config = postgres_config.ok_or_else(|| {
                        RepositoryError::configuration(
                            "Postgres repository requires PostgresConfig",
                        )
                    })?;
                    let pg = Self::create_postgres(config).await?;
                    Ok(pg as Arc<dyn FullRepository>)
                }
                #[cfg(not(feature = "postgres-repo"))]
                {
                    let _ = postgres_config;
                    Err(postgres_disabled())
                }
            }
            RepositoryType::Local => Ok(Self::create_local()),
        }
    }

    /// Create a Postgres repository.
    #[cfg(feature = "postgres-repo")]
    pub async fn create_postgres(
        config: &PostgresConfig,
    ) -> RepositoryResult<Arc<PostgresRepository>> {
        let config = config.clone();
        // Pool creation and migrations block.
        let repo = tokio::task::spawn_blocking(move || PostgresRepository::new(config))
            .await
            .map_err(|e| RepositoryError::internal(format!("Task join error: {}", e)))??;
        Ok(Arc::new(repo))
    }

    /// Create an empty in-memory local repository.
    pub fn create_local() -> Arc<dyn FullRepository> {
        Arc::new(LocalRepository::new())
    }

    /// Create an in-memory repository seeded with catalog data.
    pub fn create_local_seeded(
        catalog: &CatalogSettings,
    ) -> RepositoryResult<Arc<dyn FullRepository>> {
        let repo = LocalRepository::new();
        repo.set_teachers(catalog.teachers.clone())?;
        for (key, subjects) in catalog.subjects_by_key() {
            repo.set_subjects(key, subjects)?;
        }
        log::debug!(
            "Seeded local repository with {} teachers and {} subjects",
            catalog.teachers.len(),
            catalog.subjects.len()
        );
        Ok(Arc::new(repo))
    }
}

/// Builder for configuring repository creation.
///
/// # Example
/// ```
/// use institute_timetable::db::{RepositoryBuilder, RepositoryType};
///
/// # tokio::runtime::Runtime::new().unwrap().block_on(async {
/// let repo = RepositoryBuilder::new()
///     .repository_type(RepositoryType::Local)
///     .build()
///     .await
///     .unwrap();
/// assert!(repo.list_timetables().await.unwrap().is_empty());
/// # });
/// ```
pub struct RepositoryBuilder {
    repo_type: RepositoryType,
    catalog: CatalogSettings,
    #[cfg(feature = "postgres-repo")]
    postgres_config: Option<PostgresConfig>,
}

impl RepositoryBuilder {
    /// Create a new builder for the in-memory backend.
    pub fn new() -> Self {
        Self {
            repo_type: RepositoryType::Local,
            catalog: CatalogSettings::default(),
            #[cfg(feature = "postgres-repo")]
            postgres_config: None,
        }
    }

    /// Set the repository type.
    pub fn repository_type(mut self, repo_type: RepositoryType) -> Self {
        self.repo_type = repo_type;
        self
    }

    /// Catalog data to seed into a local repository.
    pub fn catalog(mut self, catalog: CatalogSettings) -> Self {
        self.catalog = catalog;
        self
    }

    /// Load the backend selection and catalog seed from a parsed config.
    pub fn config(mut self, config: &RepositoryConfig) -> Result<Self, RepositoryError> {
        self.repo_type = config.repository_type().map_err(|e| {
            RepositoryError::configuration(format!("Invalid repository type: {}", e))
        })?;
        self.catalog = config.catalog.clone();

        if self.repo_type == RepositoryType::Postgres {
            #[cfg(feature = "postgres-repo")]
            {
                self.postgres_config = config.to_postgres_config()?;
            }
            #[cfg(not(feature = "postgres-repo"))]
            {
                return Err(postgres_disabled());
            }
        }

        Ok(self)
    }

    /// Load configuration from a TOML file.
    pub fn from_config_file<P: AsRef<Path>>(self, config_path: P) -> Result<Self, RepositoryError> {
        let config = RepositoryConfig::from_file(config_path)?;
        self.config(&config)
    }

    /// Build the repository instance.
    pub async fn build(self) -> RepositoryResult<Arc<dyn FullRepository>> {
        match self.repo_type {
            RepositoryType::Local if !self.catalog.is_empty() => {
                RepositoryFactory::create_local_seeded(&self.catalog)
            }
            repo_type => {
                #[cfg(feature = "postgres-repo")]
                let pg_config = self.postgres_config.as_ref();
                #[cfg(not(feature = "postgres-repo"))]
                let pg_config = None;

                RepositoryFactory::create(repo_type, pg_config).await
            }
        }
    }
}

impl Default for RepositoryBuilder {
    fn default() -> Self {
        Self::new()
    }
}
