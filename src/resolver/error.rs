//! Error types for the entity resolver.

use thiserror::Error;

#[derive(Debug, Clone, Error, PartialEq)]
pub enum ResolverError {
    /// Selection named an entity that is not among the current results.
    #[error("No result with id {0}")]
    NotInResults(String),
}
