//! Runtime orchestration and lifecycle management.
//!
//! - [`CatalogSession`] - starts the collection store, wires clients, builds resolvers
//! - [`setup_tracing`] - initializes the tracing/logging infrastructure

pub mod catalog_session;
pub mod tracing;

pub use catalog_session::*;
pub use self::tracing::*;
