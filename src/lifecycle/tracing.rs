//! # Observability & Tracing
//!
//! [`setup_tracing`] initializes structured logging with the `tracing` crate.
//!
//! ## Configuration
//!
//! The compact format hides the crate/module prefix (`with_target(false)`);
//! operations carry `op`, `seq`, `kind` and `query` fields instead.
//!
//! ```bash
//! RUST_LOG=info   # lifecycle: Listed, Created, session start/stop
//! RUST_LOG=debug  # payloads at entry, every dispatched event, lookups
//! RUST_LOG=trace  # per-event bookkeeping in the store actor
//! RUST_LOG=movie_sync::resolver=debug
//! ```
//!
//! ## What Gets Traced
//!
//! - **Store lifecycle**: startup, shutdown, number of applied events
//! - **Operations**: start (with sequence number), success, failure message
//! - **Ordering**: every discarded stale response or lookup, at `warn`/`debug`
//! - **Resolver**: each issued lookup, failed lookups, selections
//!
//! ## Example (`RUST_LOG=debug`)
//!
//! ```text
//! INFO Catalog session started api_url=http://localhost:5000/api ordering=Strict
//! DEBUG list: Started op=list seq=1
//! DEBUG list: Started op=list seq=2
//! INFO list: Listed items=10 page=2
//! WARN Discarding stale response op=list seq=1
//! ```

/// Installs the global subscriber, filtered by `RUST_LOG`.
///
/// Panics if a global subscriber is already set; see [`try_setup_tracing`].
pub fn setup_tracing() {
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_target(false)
        .compact()
        .init();
}

/// Like [`setup_tracing`], but returns `false` instead of panicking when a
/// subscriber is already installed (tests, embedding applications).
pub fn try_setup_tracing() -> bool {
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_target(false)
        .compact()
        .try_init()
        .is_ok()
}
