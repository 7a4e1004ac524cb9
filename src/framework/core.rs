//! # Core Store Framework
//!
//! This module defines the generic building blocks for serialized state.
//!
//! ## Key Types
//!
//! - [`Reducer`]: The trait that every state container must implement.
//! - [`StoreActor`]: The generic actor that owns the state and applies events.
//! - [`StoreClient`]: The generic client for dispatching events and reading snapshots.
//! - [`FrameworkError`]: Common errors (e.g., ActorClosed).

use std::fmt::Debug;
use std::sync::Arc;
use tokio::sync::{mpsc, oneshot, watch};
use tracing::{debug, info, trace};

// =============================================================================
// 1. THE ABSTRACTION
// =============================================================================

/// Outcome of applying one event to a state.
#[derive(Debug, Clone)]
pub struct Reduced<S> {
    pub state: S,
    /// `false` when the event was recognised as stale and only bookkeeping changed.
    pub accepted: bool,
}

impl<S> Reduced<S> {
    pub fn accepted(state: S) -> Self {
        Self { state, accepted: true }
    }

    pub fn discarded(state: S) -> Self {
        Self { state, accepted: false }
    }
}

/// Trait that any state container must implement to be driven by a [`StoreActor`].
///
/// # Architecture Note
/// The state is never mutated in place. `reduce` is a pure function
/// `(state, event) -> state`; the actor swaps in the new value and publishes
/// it as an immutable snapshot, so readers never observe a half-applied
/// transition.
pub trait Reducer: Clone + Debug + Send + Sync + 'static {
    /// The events this state understands.
    type Event: Send + Sync + Debug;

    fn reduce(&self, event: Self::Event) -> Reduced<Self>;
}

// =============================================================================
// 2. THE GENERIC MESSAGES & ERRORS
// =============================================================================

/// Errors that can occur within the store framework itself.
#[derive(Debug, Clone, thiserror::Error, PartialEq)]
pub enum FrameworkError {
    #[error("Store actor closed")]
    ActorClosed,
    #[error("Store actor dropped response channel")]
    ActorDropped,
}

/// Type alias for the one-shot response channel used by the actor.
pub type Response<T> = oneshot::Sender<Result<T, FrameworkError>>;

/// Internal message type sent to the actor.
#[derive(Debug)]
pub enum StoreRequest<S: Reducer> {
    Dispatch {
        event: S::Event,
        respond_to: Response<Reduced<Arc<S>>>,
    },
    Snapshot {
        respond_to: Response<Arc<S>>,
    },
}

// =============================================================================
// 3. THE GENERIC ACTOR SERVER
// =============================================================================

/// The single serializing dispatcher for one state container.
///
/// **Concurrency Model**:
/// Completions from many concurrent operations arrive on one channel and are
/// applied strictly one at a time, so each event yields exactly one coherent
/// snapshot. Ordering between events is arrival order.
pub struct StoreActor<S: Reducer> {
    receiver: mpsc::Receiver<StoreRequest<S>>,
    state: Arc<S>,
    publisher: watch::Sender<Arc<S>>,
    applied: u64,
}

impl<S: Reducer> StoreActor<S> {
    pub fn new(buffer_size: usize, initial: S) -> (Self, StoreClient<S>) {
        let (sender, receiver) = mpsc::channel(buffer_size);
        let state = Arc::new(initial);
        let (publisher, watcher) = watch::channel(state.clone());
        let actor = Self {
            receiver,
            state,
            publisher,
            applied: 0,
        };
        let client = StoreClient::new(sender, watcher);
        (actor, client)
    }

    /// Runs the actor's event loop, processing messages until every client is dropped.
    pub async fn run(mut self) {
        let store_type = std::any::type_name::<S>()
            .split("::")
            .last()
            .unwrap_or("Unknown");
        info!(store_type, "Store started");

        while let Some(msg) = self.receiver.recv().await {
            match msg {
                StoreRequest::Dispatch { event, respond_to } => {
                    debug!(store_type, ?event, "Dispatch");
                    let reduced = self.state.reduce(event);
                    self.state = Arc::new(reduced.state);
                    self.applied += 1;
                    // Nobody watching is fine; snapshots are still served on request.
                    let _ = self.publisher.send(self.state.clone());
                    trace!(store_type, applied = self.applied, accepted = reduced.accepted, "Applied");
                    let _ = respond_to.send(Ok(Reduced {
                        state: self.state.clone(),
                        accepted: reduced.accepted,
                    }));
                }
                StoreRequest::Snapshot { respond_to } => {
                    let _ = respond_to.send(Ok(self.state.clone()));
                }
            }
        }

        info!(store_type, applied = self.applied, "Shutdown");
    }
}

// =============================================================================
// 4. THE GENERIC CLIENT
// =============================================================================

/// A type-safe client for interacting with a [`StoreActor`].
#[derive(Clone)]
pub struct StoreClient<S: Reducer> {
    sender: mpsc::Sender<StoreRequest<S>>,
    watcher: watch::Receiver<Arc<S>>,
}

impl<S: Reducer> StoreClient<S> {
    pub fn new(sender: mpsc::Sender<StoreRequest<S>>, watcher: watch::Receiver<Arc<S>>) -> Self {
        Self { sender, watcher }
    }

    /// Applies `event` and returns the snapshot produced by exactly that event.
    pub async fn dispatch(&self, event: S::Event) -> Result<Reduced<Arc<S>>, FrameworkError> {
        let (respond_to, response) = oneshot::channel();
        self.sender
            .send(StoreRequest::Dispatch { event, respond_to })
            .await
            .map_err(|_| FrameworkError::ActorClosed)?;
        response.await.map_err(|_| FrameworkError::ActorDropped)?
    }

    /// Round-trips through the actor, so every earlier dispatch is reflected.
    pub async fn snapshot(&self) -> Result<Arc<S>, FrameworkError> {
        let (respond_to, response) = oneshot::channel();
        self.sender
            .send(StoreRequest::Snapshot { respond_to })
            .await
            .map_err(|_| FrameworkError::ActorClosed)?;
        response.await.map_err(|_| FrameworkError::ActorDropped)?
    }

    /// Latest published snapshot without a round trip.
    pub fn latest(&self) -> Arc<S> {
        self.watcher.borrow().clone()
    }

    pub fn subscribe(&self) -> watch::Receiver<Arc<S>> {
        self.watcher.clone()
    }
}

// =============================================================================
// 5. EXAMPLE USAGE (Test)
// =============================================================================
