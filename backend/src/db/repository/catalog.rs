//! Catalog repository trait for subject and teacher lists.
//!
//! Catalogs only populate selection inputs. The conflict checker never
//! consults them.

use async_trait::async_trait;

use super::error::RepositoryResult;
use crate::api::{Subject, Teacher, TimetableKey};

#[async_trait]
pub trait CatalogRepository: Send + Sync {
    /// Subjects offered for a stream/semester. Unknown keys yield an empty list.
    async fn list_subjects(&self, key: &TimetableKey) -> RepositoryResult<Vec<Subject>>;

    /// All teachers available for scheduling.
    async fn list_teachers(&self) -> RepositoryResult<Vec<Teacher>>;
}
