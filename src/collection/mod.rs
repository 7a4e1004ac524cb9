//! Collection state, its events, and the dispatcher that applies them.

pub mod error;
pub mod event;
pub mod state;

pub use error::*;
pub use event::*;
pub use state::*;

use crate::config::SyncConfig;
use crate::framework::{StoreActor, StoreClient};

/// Creates a collection store actor and its raw client.
pub fn new(config: &SyncConfig) -> (StoreActor<CollectionState>, StoreClient<CollectionState>) {
    StoreActor::new(config.channel_capacity, CollectionState::new(config.ordering))
}
