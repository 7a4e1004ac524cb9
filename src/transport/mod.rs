//! The remote API boundary.
//!
//! The synchronizer and the resolver only ever talk to a [`Transport`]. The
//! crate ships [`HttpTransport`] for real use and [`mock`] doubles for tests.

pub mod error;
pub mod http;
pub mod mock;

pub use error::*;
pub use http::HttpTransport;

use async_trait::async_trait;

use crate::domain::{
    BearerToken, Movie, MovieDraft, MovieKey, MoviePatch, Paginated, Person, PersonKind,
};

/// One call per remote operation. Implementations fail with
/// [`TransportError`] whenever the response status is not a success.
#[async_trait]
pub trait Transport: Send + Sync {
    async fn list_movies(
        &self,
        token: &BearerToken,
        page: u32,
        limit: u32,
    ) -> Result<Paginated<Movie>, TransportError>;

    async fn search_movies(
        &self,
        token: &BearerToken,
        query: &str,
        page: u32,
        limit: u32,
    ) -> Result<Paginated<Movie>, TransportError>;

    /// Local keys and external keys use different endpoints.
    async fn get_movie(&self, token: &BearerToken, key: &MovieKey) -> Result<Movie, TransportError>;

    async fn create_movie(
        &self,
        token: &BearerToken,
        draft: &MovieDraft,
    ) -> Result<Movie, TransportError>;

    async fn update_movie(
        &self,
        token: &BearerToken,
        key: &MovieKey,
        patch: &MoviePatch,
    ) -> Result<Movie, TransportError>;

    async fn delete_movie(&self, token: &BearerToken, key: &MovieKey) -> Result<(), TransportError>;

    /// Actors and producers share one response shape.
    async fn list_persons(
        &self,
        token: &BearerToken,
        kind: PersonKind,
        query: Option<&str>,
    ) -> Result<Paginated<Person>, TransportError>;
}
