//! Database module for timetable storage.
//!
//! Storage is reached through repository traits so backends can be swapped:
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────┐
//! │  Editor sessions, suggestion jobs, REST handlers         │
//! └───────────────────┬─────────────────────────────────────┘
//!                     │
//! ┌───────────────────▼─────────────────────────────────────┐
//! │  Service Layer (services.rs)                             │
//! │  - empty timetable for unsaved keys                      │
//! │  - logging of writes                                     │
//! └───────────────────┬─────────────────────────────────────┘
//!                     │
//! ┌───────────────────▼─────────────────────────────────────┐
//! │  Repository Traits (repository/)                         │
//! │  - TimetableRepository, CatalogRepository                │
//! └───────────────────┬─────────────────────────────────────┘
//!                     │
//!     ┌───────────────┴────────────────┐
//!     │                                 │
//! ┌───▼──────────────┐     ┌──────────▼──────────────┐
//! │ Postgres (Diesel)│     │ Local Repository        │
//! │ postgres-repo    │     │ (in-memory)             │
//! └──────────────────┘     └─────────────────────────┘
//! ```

#[cfg(not(any(feature = "postgres-repo", feature = "local-repo")))]
compile_error!("Enable at least one repository backend feature.");

pub mod checksum;
pub mod factory;
pub mod repo_config;
pub mod repositories;
pub mod repository;
pub mod services;

#[cfg(feature = "postgres-repo")]
pub use repositories::postgres::PostgresConfig;
#[cfg(not(feature = "postgres-repo"))]
#[derive(Debug, Clone)]
pub struct PostgresConfig {
    _private: (),
}

pub use services::{
    delete_timetable, health_check, list_subjects, list_teachers, list_timetables,
    load_timetable, save_timetable,
};

pub use checksum::{calculate_checksum, schedule_checksum};
pub use factory::{RepositoryBuilder, RepositoryFactory, RepositoryType};
pub use repo_config::{CatalogSettings, RepositoryConfig};
pub use repositories::LocalRepository;
#[cfg(feature = "postgres-repo")]
pub use repositories::PostgresRepository;
pub use repository::{
    CatalogRepository, ErrorContext, FullRepository, RepositoryError, RepositoryResult,
    TimetableRepository,
};
