//! Events understood by [`CollectionState`](super::CollectionState).

use std::fmt;

use crate::domain::{Movie, MovieKey, Paginated};

/// The remote operations the synchronizer performs.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum OpKind {
    List,
    Search,
    Get,
    Create,
    Update,
    Delete,
}

impl OpKind {
    /// The read slot this operation owns, if any. Mutations have none and
    /// always apply.
    pub fn slot(&self) -> Option<Slot> {
        match self {
            OpKind::List => Some(Slot::Listing),
            OpKind::Search => Some(Slot::SearchResults),
            OpKind::Get => Some(Slot::Current),
            OpKind::Create | OpKind::Update | OpKind::Delete => None,
        }
    }
}

impl fmt::Display for OpKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            OpKind::List => "list",
            OpKind::Search => "search",
            OpKind::Get => "get",
            OpKind::Create => "create",
            OpKind::Update => "update",
            OpKind::Delete => "delete",
        };
        f.write_str(name)
    }
}

/// A region of the state exclusively owned by one kind of read.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Slot {
    Listing,
    SearchResults,
    Current,
}

/// Successful result of an operation, ready to be folded into state.
#[derive(Debug, Clone)]
pub enum Outcome {
    Listed {
        page: Paginated<Movie>,
        page_size: u32,
    },
    Searched {
        query: String,
        page: Paginated<Movie>,
        page_size: u32,
    },
    Fetched(Movie),
    Created(Movie),
    Updated {
        key: MovieKey,
        movie: Movie,
    },
    Deleted(MovieKey),
}

impl Outcome {
    pub fn kind(&self) -> OpKind {
        match self {
            Outcome::Listed { .. } => OpKind::List,
            Outcome::Searched { .. } => OpKind::Search,
            Outcome::Fetched(_) => OpKind::Get,
            Outcome::Created(_) => OpKind::Create,
            Outcome::Updated { .. } => OpKind::Update,
            Outcome::Deleted(_) => OpKind::Delete,
        }
    }
}

/// One state transition.
///
/// Remote operations go through `Started`, then exactly one of `Fulfilled`,
/// `Rejected` or `Abandoned` carrying the sequence number `Started` handed out.
#[derive(Debug, Clone)]
pub enum SyncEvent {
    Started { op: OpKind },
    Fulfilled { seq: u64, outcome: Outcome },
    Rejected { op: OpKind, seq: u64, message: String },
    /// The caller stopped waiting before the request settled. Only the
    /// bookkeeping changes.
    Abandoned { op: OpKind, seq: u64 },
    ErrorCleared,
    SearchQuerySet(String),
    CurrentCleared,
}
