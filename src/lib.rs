//! # movie-sync
//!
//! > **The data-synchronization core of a movie catalog client.**
//!
//! Two components, both driven by page-level views:
//!
//! - the **collection synchronizer** keeps a normalized, paginated view of the
//!   remote movie collection (listing, search results, the movie being shown)
//!   consistent across list/search/get/create/update/delete;
//! - the **entity resolver** turns free-text input into one selected actor or
//!   producer through a debounced, cancellable remote search.
//!
//! ## Architecture Notes
//!
//! ### 1. One Dispatcher per State
//! State changes are events applied by a pure reducer inside a single actor
//! task ([`framework::StoreActor`]). Completions from concurrent requests
//! queue up on its channel, so every event yields one coherent, immutable
//! snapshot (`Arc<CollectionState>`), published over a `watch` channel.
//!
//! ### 2. Sequenced Reads
//! Each read (list, search, get) takes a per-slot sequence number when it
//! starts. Under [`collection::OrderingPolicy::Strict`] a response older than
//! the latest issued read of its slot is dropped instead of overwriting newer
//! data. `LastArrival` keeps the plain "whatever lands last wins" behaviour.
//!
//! ### 3. Flattened Errors
//! Transport failures, including timeouts, become one human-readable message
//! on the state and [`collection::SyncError::Request`] for the caller. There
//! is no retry; the user re-invokes the operation.
//!
//! ### 4. Observability
//! `tracing` everywhere with structured fields; see [`lifecycle::tracing`].
//!
//! ## Module Tour
//!
//! - [`framework`] - generic reducer/actor/client plumbing
//! - [`collection`] - `CollectionState`, its events and ordering rules
//! - [`clients`] - [`CollectionClient`](clients::CollectionClient), the operations views call
//! - [`resolver`] - [`EntityResolver`](resolver::EntityResolver) and its session/debounce parts
//! - [`transport`] - the remote API boundary, an HTTP implementation and test doubles
//! - [`domain`] - movies, people, pagination, entity references
//! - [`lifecycle`] - [`CatalogSession`](lifecycle::CatalogSession) and tracing setup
//! - [`config`] - [`SyncConfig`](config::SyncConfig)
//!
//! ### Running Tests
//!
//! ```bash
//! cargo test
//! ```

pub mod clients;
pub mod collection;
pub mod config;
pub mod domain;
pub mod framework;
pub mod lifecycle;
pub mod resolver;
pub mod transport;
