use std::future::Future;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::watch;
use tracing::{debug, info, instrument, warn};

use crate::collection::{CollectionState, OpKind, Outcome, SyncError, SyncEvent};
use crate::domain::{BearerToken, Movie, MovieDraft, MovieKey, MoviePatch};
use crate::framework::StoreClient;
use crate::transport::{Transport, TransportError};

/// Client for the movie collection.
///
/// Every remote operation runs the same lifecycle: dispatch `Started`, await
/// the transport (bounded by the request timeout), then dispatch `Fulfilled`
/// or `Rejected`. Transport calls run in the caller's task; only the state
/// transitions go through the store actor. Dropping an operation's future
/// before it settles dispatches `Abandoned` instead.
#[derive(Clone)]
pub struct CollectionClient {
    store: StoreClient<CollectionState>,
    transport: Arc<dyn Transport>,
    token: BearerToken,
    timeout: Duration,
    page_size: u32,
}

impl CollectionClient {
    pub fn new(
        store: StoreClient<CollectionState>,
        transport: Arc<dyn Transport>,
        token: BearerToken,
        timeout: Duration,
        page_size: u32,
    ) -> Self {
        Self {
            store,
            transport,
            token,
            timeout,
            page_size,
        }
    }

    /// Page size used by [`list_page`](Self::list_page) and
    /// [`search_page`](Self::search_page).
    pub fn page_size(&self) -> u32 {
        self.page_size
    }

    /// Latest published snapshot.
    pub fn state(&self) -> Arc<CollectionState> {
        self.store.latest()
    }

    /// Snapshot reflecting every transition dispatched before this call.
    pub async fn snapshot(&self) -> Result<Arc<CollectionState>, SyncError> {
        Ok(self.store.snapshot().await?)
    }

    pub fn subscribe(&self) -> watch::Receiver<Arc<CollectionState>> {
        self.store.subscribe()
    }

    #[instrument(skip(self))]
    pub async fn list(&self, page: u32, page_size: u32) -> Result<Arc<CollectionState>, SyncError> {
        let request = self.transport.list_movies(&self.token, page, page_size);
        let (state, ()) = self
            .execute(OpKind::List, request, |page| {
                (Outcome::Listed { page, page_size }, ())
            })
            .await?;
        info!(items = state.items.len(), page = state.page, "Listed");
        Ok(state)
    }

    /// [`list`](Self::list) with the configured page size.
    pub async fn list_page(&self, page: u32) -> Result<Arc<CollectionState>, SyncError> {
        self.list(page, self.page_size).await
    }

    #[instrument(skip(self))]
    pub async fn search(
        &self,
        query: &str,
        page: u32,
        page_size: u32,
    ) -> Result<Arc<CollectionState>, SyncError> {
        let request = self.transport.search_movies(&self.token, query, page, page_size);
        let query = query.to_string();
        let (state, ()) = self
            .execute(OpKind::Search, request, |page| {
                (Outcome::Searched { query, page, page_size }, ())
            })
            .await?;
        info!(results = state.search_results.len(), "Searched");
        Ok(state)
    }

    /// [`search`](Self::search) with the configured page size.
    pub async fn search_page(&self, query: &str, page: u32) -> Result<Arc<CollectionState>, SyncError> {
        self.search(query, page, self.page_size).await
    }

    #[instrument(skip(self))]
    pub async fn get_by_id(&self, key: MovieKey) -> Result<Movie, SyncError> {
        let request = self.transport.get_movie(&self.token, &key);
        let (_, movie) = self
            .execute(OpKind::Get, request, |movie: Movie| {
                (Outcome::Fetched(movie.clone()), movie)
            })
            .await?;
        Ok(movie)
    }

    #[instrument(skip(self, draft), fields(name = %draft.name))]
    pub async fn create(&self, draft: MovieDraft) -> Result<Movie, SyncError> {
        debug!(?draft, "create called");
        let request = self.transport.create_movie(&self.token, &draft);
        let (_, movie) = self
            .execute(OpKind::Create, request, |movie: Movie| {
                (Outcome::Created(movie.clone()), movie)
            })
            .await?;
        info!(id = %movie.id, "Created");
        Ok(movie)
    }

    /// Updates the movie `key` addresses. For externally sourced movies pass
    /// the external key, or use [`CollectionClient::update_movie`].
    #[instrument(skip(self, patch))]
    pub async fn update(&self, key: MovieKey, patch: MoviePatch) -> Result<Movie, SyncError> {
        debug!(?patch, "update called");
        let request = self.transport.update_movie(&self.token, &key, &patch);
        let (_, movie) = self
            .execute(OpKind::Update, request, |movie: Movie| {
                (
                    Outcome::Updated {
                        key: key.clone(),
                        movie: movie.clone(),
                    },
                    movie,
                )
            })
            .await?;
        info!(id = %movie.id, "Updated");
        Ok(movie)
    }

    /// Updates `movie`, dispatching under the identifier its provenance calls for.
    pub async fn update_movie(&self, movie: &Movie, patch: MoviePatch) -> Result<Movie, SyncError> {
        self.update(movie.key(), patch).await
    }

    #[instrument(skip(self))]
    pub async fn delete(&self, key: MovieKey) -> Result<(), SyncError> {
        let request = self.transport.delete_movie(&self.token, &key);
        self.execute(OpKind::Delete, request, |()| (Outcome::Deleted(key.clone()), ()))
            .await?;
        info!("Deleted");
        Ok(())
    }

    pub async fn clear_error(&self) -> Result<(), SyncError> {
        self.store.dispatch(SyncEvent::ErrorCleared).await?;
        Ok(())
    }

    pub async fn set_search_query(&self, query: impl Into<String>) -> Result<(), SyncError> {
        self.store.dispatch(SyncEvent::SearchQuerySet(query.into())).await?;
        Ok(())
    }

    pub async fn clear_current(&self) -> Result<(), SyncError> {
        self.store.dispatch(SyncEvent::CurrentCleared).await?;
        Ok(())
    }

    async fn execute<T, R>(
        &self,
        op: OpKind,
        request: impl Future<Output = Result<T, TransportError>>,
        into_outcome: impl FnOnce(T) -> (Outcome, R),
    ) -> Result<(Arc<CollectionState>, R), SyncError> {
        let started = self.store.dispatch(SyncEvent::Started { op }).await?;
        let seq = started.state.issued(op);
        debug!(%op, seq, "Started");
        let mut guard = InFlight {
            store: self.store.clone(),
            op,
            seq,
            armed: true,
        };

        let result = tokio::time::timeout(self.timeout, request)
            .await
            .unwrap_or(Err(TransportError::Timeout(self.timeout)));
        // The settlement event below carries the bookkeeping from here on.
        guard.armed = false;

        match result {
            Ok(value) => {
                let (outcome, ret) = into_outcome(value);
                let reduced = self
                    .store
                    .dispatch(SyncEvent::Fulfilled { seq, outcome })
                    .await?;
                if !reduced.accepted {
                    return Err(SyncError::Superseded { op });
                }
                Ok((reduced.state, ret))
            }
            Err(e) => {
                let message = e.to_string();
                warn!(%op, seq, error = %message, "Request failed");
                let reduced = self
                    .store
                    .dispatch(SyncEvent::Rejected {
                        op,
                        seq,
                        message: message.clone(),
                    })
                    .await?;
                if !reduced.accepted {
                    return Err(SyncError::Superseded { op });
                }
                Err(SyncError::Request(message))
            }
        }
    }
}

/// Settles a started request as abandoned when the operation's future is
/// dropped before its transport call completes.
struct InFlight {
    store: StoreClient<CollectionState>,
    op: OpKind,
    seq: u64,
    armed: bool,
}

impl Drop for InFlight {
    fn drop(&mut self) {
        if !self.armed {
            return;
        }
        let (op, seq) = (self.op, self.seq);
        let Ok(runtime) = tokio::runtime::Handle::try_current() else {
            warn!(%op, seq, "Request abandoned outside a runtime");
            return;
        };
        let store = self.store.clone();
        runtime.spawn(async move {
            if let Err(e) = store.dispatch(SyncEvent::Abandoned { op, seq }).await {
                debug!(%op, seq, error = %e, "Could not settle abandoned request");
            }
        });
    }
}
