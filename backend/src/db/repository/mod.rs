//! Repository traits for abstracting storage.
//!
//! These traits define the persistence gateway used by the editing layer,
//! allowing different implementations (in-memory, Postgres) to be swapped
//! via dependency injection.

pub mod catalog;
pub mod error;
pub mod timetable;

pub use catalog::CatalogRepository;
pub use error::{ErrorContext, RepositoryError, RepositoryResult};
pub use timetable::TimetableRepository;

/// Everything a timetable backend has to provide.
pub trait FullRepository: TimetableRepository + CatalogRepository {}

impl<T> FullRepository for T where T: TimetableRepository + CatalogRepository {}
