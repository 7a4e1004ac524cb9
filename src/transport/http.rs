use async_trait::async_trait;
use reqwest::{Client, RequestBuilder, Response};
use serde::de::DeserializeOwned;
use tracing::{debug, instrument};

use super::{Transport, TransportError};
use crate::domain::{
    BearerToken, Movie, MovieDraft, MovieKey, MoviePatch, Paginated, Person, PersonKind,
};

pub const DEFAULT_API_URL: &str = "http://localhost:5000/api";

/// [`Transport`] over the catalog's JSON HTTP API.
#[derive(Clone)]
pub struct HttpTransport {
    client: Client,
    base_url: String,
}

impl HttpTransport {
    pub fn new(client: Client, base_url: impl Into<String>) -> Self {
        let base_url = base_url.into().trim_end_matches('/').to_string();
        Self { client, base_url }
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    pub(crate) fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    /// Path of a single movie; the external id replaces the local one.
    pub(crate) fn movie_path(key: &MovieKey) -> String {
        format!("/movies/{}", key.dispatch_id())
    }

    fn authorized(&self, builder: RequestBuilder, token: &BearerToken) -> RequestBuilder {
        builder.bearer_auth(token.as_str())
    }

    async fn send<T: DeserializeOwned>(
        &self,
        builder: RequestBuilder,
        fallback: &str,
    ) -> Result<T, TransportError> {
        let response = builder.send().await?;
        let body = Self::check(response, fallback).await?;
        Ok(serde_json::from_str(&body)?)
    }

    async fn check(response: Response, fallback: &str) -> Result<String, TransportError> {
        let status = response.status();
        let body = response.text().await?;
        if !status.is_success() {
            debug!(status = status.as_u16(), "Non-success response");
            return Err(TransportError::Status {
                status: status.as_u16(),
                message: server_message(&body).unwrap_or_else(|| fallback.to_string()),
            });
        }
        Ok(body)
    }
}

/// Pulls a rejection message out of a JSON error body, if the server sent one.
pub(crate) fn server_message(body: &str) -> Option<String> {
    let value: serde_json::Value = serde_json::from_str(body).ok()?;
    ["message", "error"]
        .iter()
        .find_map(|field| value.get(*field)?.as_str())
        .filter(|m| !m.trim().is_empty())
        .map(str::to_string)
}

#[async_trait]
impl Transport for HttpTransport {
    #[instrument(skip(self, token))]
    async fn list_movies(
        &self,
        token: &BearerToken,
        page: u32,
        limit: u32,
    ) -> Result<Paginated<Movie>, TransportError> {
        let req = self
            .client
            .get(self.url("/movies"))
            .query(&[("page", page), ("limit", limit)]);
        self.send(self.authorized(req, token), "Failed to fetch movies").await
    }

    #[instrument(skip(self, token))]
    async fn search_movies(
        &self,
        token: &BearerToken,
        query: &str,
        page: u32,
        limit: u32,
    ) -> Result<Paginated<Movie>, TransportError> {
        let page = page.to_string();
        let limit = limit.to_string();
        let req = self.client.get(self.url("/movies/search")).query(&[
            ("query", query),
            ("page", page.as_str()),
            ("limit", limit.as_str()),
        ]);
        self.send(self.authorized(req, token), "Search failed").await
    }

    #[instrument(skip(self, token))]
    async fn get_movie(&self, token: &BearerToken, key: &MovieKey) -> Result<Movie, TransportError> {
        let req = self.client.get(self.url(&Self::movie_path(key)));
        self.send(self.authorized(req, token), "Failed to fetch movie").await
    }

    #[instrument(skip(self, token))]
    async fn create_movie(
        &self,
        token: &BearerToken,
        draft: &MovieDraft,
    ) -> Result<Movie, TransportError> {
        let req = self.client.post(self.url("/movies")).json(draft);
        self.send(self.authorized(req, token), "Failed to create movie").await
    }

    #[instrument(skip(self, token))]
    async fn update_movie(
        &self,
        token: &BearerToken,
        key: &MovieKey,
        patch: &MoviePatch,
    ) -> Result<Movie, TransportError> {
        let req = self.client.put(self.url(&Self::movie_path(key))).json(patch);
        self.send(self.authorized(req, token), "Failed to update movie").await
    }

    #[instrument(skip(self, token))]
    async fn delete_movie(&self, token: &BearerToken, key: &MovieKey) -> Result<(), TransportError> {
        let req = self.client.delete(self.url(&Self::movie_path(key)));
        let response = self.authorized(req, token).send().await?;
        Self::check(response, "Failed to delete movie").await?;
        Ok(())
    }

    #[instrument(skip(self, token))]
    async fn list_persons(
        &self,
        token: &BearerToken,
        kind: PersonKind,
        query: Option<&str>,
    ) -> Result<Paginated<Person>, TransportError> {
        let mut req = self.client.get(self.url(&format!("/{}", kind.collection())));
        if let Some(q) = query.filter(|q| !q.is_empty()) {
            req = req.query(&[("search", q)]);
        }
        let fallback = format!("Failed to fetch {}", kind.collection());
        self.send(self.authorized(req, token), &fallback).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_base_url_trailing_slash_is_trimmed() {
        let transport = HttpTransport::new(Client::new(), "http://api.test/api/");
        assert_eq!(transport.url("/movies"), "http://api.test/api/movies");
    }

    #[test]
    fn test_movie_path_uses_dispatch_id() {
        let local = MovieKey::Local("m1".into());
        let external = MovieKey::External("tt01".into());
        assert_eq!(HttpTransport::movie_path(&local), "/movies/m1");
        assert_eq!(HttpTransport::movie_path(&external), "/movies/tt01");
    }

    #[test]
    fn test_server_message_extraction() {
        assert_eq!(
            server_message(r#"{"message":"Name is required"}"#).as_deref(),
            Some("Name is required")
        );
        assert_eq!(server_message(r#"{"error":"Forbidden"}"#).as_deref(), Some("Forbidden"));
        assert_eq!(server_message(r#"{"message":"  "}"#), None);
        assert_eq!(server_message("<html>bad gateway</html>"), None);
    }
}
