//! Pure data structures exchanged with the remote catalog API.

pub mod movie;
pub mod page;
pub mod person;
pub mod reference;

pub use movie::*;
pub use page::*;
pub use person::*;
pub use reference::*;

use std::fmt;

/// Opaque bearer token issued by the authentication collaborator.
#[derive(Clone, PartialEq, Eq)]
pub struct BearerToken(String);

impl BearerToken {
    pub fn new(token: impl Into<String>) -> Self {
        Self(token.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

// Keep tokens out of logs.
impl fmt::Debug for BearerToken {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("BearerToken(***)")
    }
}
