use serde::{Deserialize, Serialize};

use super::Person;

/// A producer or actor field as it appears on a movie.
///
/// Summary endpoints return a bare identifier, detail endpoints embed the
/// whole record. Consumers match on the shape instead of probing fields.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum EntityRef {
    Reference(String),
    Embedded(Person),
}

impl EntityRef {
    /// Identifier regardless of shape.
    pub fn id(&self) -> &str {
        match self {
            EntityRef::Reference(id) => id,
            EntityRef::Embedded(person) => &person.id,
        }
    }

    pub fn embedded(&self) -> Option<&Person> {
        match self {
            EntityRef::Reference(_) => None,
            EntityRef::Embedded(person) => Some(person),
        }
    }

    /// Name for display, when the embedded record is available.
    pub fn display_name(&self) -> Option<&str> {
        self.embedded().map(|p| p.name.as_str())
    }
}

impl From<Person> for EntityRef {
    fn from(person: Person) -> Self {
        EntityRef::Embedded(person)
    }
}
