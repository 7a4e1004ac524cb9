use serde::{Deserialize, Serialize};
use std::fmt;

/// Which people endpoint a lookup targets.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PersonKind {
    Actor,
    Producer,
}

impl PersonKind {
    /// Collection path segment on the remote API.
    pub fn collection(&self) -> &'static str {
        match self {
            PersonKind::Actor => "actors",
            PersonKind::Producer => "producers",
        }
    }
}

impl fmt::Display for PersonKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PersonKind::Actor => f.write_str("actor"),
            PersonKind::Producer => f.write_str("producer"),
        }
    }
}

/// An actor or producer as returned by the people endpoints.
///
/// `is_external` marks records sourced from the external catalog rather than
/// owned by the local system.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Person {
    #[serde(rename = "_id")]
    pub id: String,
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub gender: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub date_of_birth: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub bio: Option<String>,
    #[serde(default)]
    pub is_external: bool,
}

impl Person {
    pub fn new(id: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            gender: None,
            date_of_birth: None,
            bio: None,
            is_external: false,
        }
    }

    pub fn external(mut self) -> Self {
        self.is_external = true;
        self
    }
}
