use serde::{Deserialize, Serialize};
use std::fmt;

use super::EntityRef;

/// Identity used to address a movie on the remote API.
///
/// Locally owned records are addressed by their own id, externally sourced
/// ones by the external catalog id.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum MovieKey {
    Local(String),
    External(String),
}

impl MovieKey {
    /// The identifier that goes on the wire.
    pub fn dispatch_id(&self) -> &str {
        match self {
            MovieKey::Local(id) | MovieKey::External(id) => id,
        }
    }

    pub fn is_external(&self) -> bool {
        matches!(self, MovieKey::External(_))
    }
}

impl fmt::Display for MovieKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            MovieKey::Local(id) => write!(f, "{id}"),
            MovieKey::External(id) => write!(f, "external:{id}"),
        }
    }
}

/// A movie record as returned by the movie endpoints.
///
/// # Provenance
/// `is_external` and `external_id` travel together: an external record is
/// keyed by `external_id` (see [`Movie::key`]), a local one by `id`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Movie {
    #[serde(rename = "_id")]
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub year_of_release: Option<i32>,
    #[serde(default)]
    pub plot: String,
    #[serde(default)]
    pub poster: String,
    #[serde(default)]
    pub producer: Option<EntityRef>,
    #[serde(default)]
    pub actors: Vec<EntityRef>,
    #[serde(default)]
    pub is_external: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub external_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub created_at: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub updated_at: Option<String>,
}

impl Movie {
    pub fn new(id: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            year_of_release: None,
            plot: String::new(),
            poster: String::new(),
            producer: None,
            actors: Vec::new(),
            is_external: false,
            external_id: None,
            created_at: None,
            updated_at: None,
        }
    }

    /// Marks the record as externally sourced under `external_id`.
    pub fn from_external(mut self, external_id: impl Into<String>) -> Self {
        self.is_external = true;
        self.external_id = Some(external_id.into());
        self
    }

    /// Key to dispatch with. External records without an external id fall
    /// back to the local id.
    pub fn key(&self) -> MovieKey {
        match (&self.is_external, &self.external_id) {
            (true, Some(ext)) => MovieKey::External(ext.clone()),
            _ => MovieKey::Local(self.id.clone()),
        }
    }

    /// Whether this record is the one `key` addresses.
    ///
    /// External keys only ever match the external id; a local record whose
    /// id happens to equal it is a different movie.
    pub fn matches(&self, key: &MovieKey) -> bool {
        match key {
            MovieKey::Local(id) => self.id == *id,
            MovieKey::External(ext) => self.external_id.as_deref() == Some(ext.as_str()),
        }
    }

    /// Whether two records denote the same entity.
    pub fn same_entity(&self, other: &Movie) -> bool {
        self.id == other.id || other.matches(&self.key())
    }
}

/// Payload for creating a movie. People are referenced by id.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MovieDraft {
    pub name: String,
    pub year_of_release: i32,
    pub plot: String,
    pub poster: String,
    pub producer: String,
    pub actors: Vec<String>,
}

/// Partial payload for updating a movie; absent fields are left alone.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MoviePatch {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub year_of_release: Option<i32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub plot: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub poster: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub producer: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub actors: Option<Vec<String>>,
}

impl From<MovieDraft> for MoviePatch {
    fn from(draft: MovieDraft) -> Self {
        Self {
            name: Some(draft.name),
            year_of_release: Some(draft.year_of_release),
            plot: Some(draft.plot),
            poster: Some(draft.poster),
            producer: Some(draft.producer),
            actors: Some(draft.actors),
        }
    }
}
