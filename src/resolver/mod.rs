//! Incremental remote search that resolves free text into one actor or producer.
//!
//! [`EntityResolver`] drives a [`SearchSession`] from input events:
//!
//! - `focus` / `input` open the result panel.
//! - A non-blank query restarts a [`Debouncer`]; when it fires, one lookup is
//!   issued for whatever the query is at that moment.
//! - Lookup results are applied only if no newer lookup, clear, selection or
//!   unmount happened in the meantime.
//! - Failed lookups show as an empty list.
//! - `select` hands the chosen person to the callback and resets the session.
//!
//! Views read [`ResolverView`] snapshots via [`EntityResolver::view`] or
//! [`EntityResolver::subscribe`].

pub mod debounce;
pub mod error;
pub mod session;

pub use debounce::Debouncer;
pub use error::*;
pub use session::*;

use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::time::Duration;
use tokio::sync::watch;
use tracing::{debug, instrument, warn};

use crate::domain::{BearerToken, Person, PersonKind};
use crate::transport::Transport;

pub const DEFAULT_DEBOUNCE: Duration = Duration::from_millis(300);

/// Callback receiving the selected person.
pub type OnSelect = Box<dyn Fn(Person) + Send + Sync>;

/// Optional inputs of a resolver control.
#[derive(Debug, Clone)]
pub struct ResolverOptions {
    /// Name shown before anything is selected (e.g. the current producer).
    pub selected_name: Option<String>,
    pub placeholder: Option<String>,
    pub debounce: Duration,
}

impl Default for ResolverOptions {
    fn default() -> Self {
        Self {
            selected_name: None,
            placeholder: None,
            debounce: DEFAULT_DEBOUNCE,
        }
    }
}

/// What a view renders.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ResolverView {
    pub query: String,
    /// Empty while the panel is closed.
    pub results: Vec<Person>,
    pub open: bool,
    pub loading: bool,
    pub selected_name: String,
    pub placeholder: String,
}

struct Shared {
    kind: PersonKind,
    token: Option<BearerToken>,
    transport: Arc<dyn Transport>,
    on_select: OnSelect,
    placeholder: String,
    session: Mutex<SearchSession>,
    publisher: watch::Sender<ResolverView>,
}

impl Shared {
    fn session(&self) -> MutexGuard<'_, SearchSession> {
        self.session.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn render(&self, session: &SearchSession) -> ResolverView {
        ResolverView {
            query: session.query().to_string(),
            results: session.visible_results().to_vec(),
            open: session.is_open(),
            loading: session.is_loading(),
            selected_name: session.selected_name().to_string(),
            placeholder: self.placeholder.clone(),
        }
    }

    /// Applies `change` to the session and publishes the resulting view.
    fn update<R>(&self, change: impl FnOnce(&mut SearchSession) -> R) -> R {
        let mut session = self.session();
        let result = change(&mut session);
        let view = self.render(&session);
        drop(session);
        self.publisher.send_replace(view);
        result
    }

    async fn lookup(self: Arc<Self>) {
        let Some(ticket) = self.update(SearchSession::begin_lookup) else {
            return;
        };
        let results = match &self.token {
            Some(token) => {
                debug!(kind = %self.kind, query = %ticket.query, seq = ticket.seq, "Lookup");
                match self
                    .transport
                    .list_persons(token, self.kind, Some(&ticket.query))
                    .await
                {
                    Ok(page) => page.data,
                    Err(e) => {
                        warn!(kind = %self.kind, error = %e, "Lookup failed");
                        Vec::new()
                    }
                }
            }
            None => Vec::new(),
        };
        let applied = self.update(|s| s.complete(&ticket, results));
        if !applied {
            debug!(seq = ticket.seq, query = %ticket.query, "Discarded stale lookup");
        }
    }
}

/// One incremental search control.
///
/// Input methods must be called from within a Tokio runtime. Dropping the
/// resolver unmounts it.
pub struct EntityResolver {
    shared: Arc<Shared>,
    debouncer: Debouncer,
}

impl EntityResolver {
    pub fn new(
        transport: Arc<dyn Transport>,
        kind: PersonKind,
        token: Option<BearerToken>,
        on_select: OnSelect,
        options: ResolverOptions,
    ) -> Self {
        let session = SearchSession::new(options.selected_name.unwrap_or_default());
        let placeholder = options
            .placeholder
            .unwrap_or_else(|| format!("Search {kind}..."));
        let (publisher, _) = watch::channel(ResolverView::default());
        let shared = Arc::new(Shared {
            kind,
            token,
            transport,
            on_select,
            placeholder,
            session: Mutex::new(session),
            publisher,
        });
        // Seed the channel with the real initial view.
        shared.update(|_| ());
        Self {
            shared,
            debouncer: Debouncer::new(options.debounce),
        }
    }

    pub fn kind(&self) -> PersonKind {
        self.shared.kind
    }

    pub fn view(&self) -> ResolverView {
        self.shared.publisher.borrow().clone()
    }

    pub fn subscribe(&self) -> watch::Receiver<ResolverView> {
        self.shared.publisher.subscribe()
    }

    pub fn focus(&self) {
        self.shared.update(SearchSession::focus);
    }

    /// Replaces the query text, as on every keystroke.
    #[instrument(skip(self), fields(kind = %self.shared.kind))]
    pub fn input(&self, text: &str) {
        match self.shared.update(|s| s.input(text)) {
            QueryChange::Changed => {
                let shared = self.shared.clone();
                self.debouncer.schedule(shared.lookup());
            }
            QueryChange::Cleared => self.debouncer.cancel(),
        }
    }

    /// Pointer interaction outside the control.
    pub fn click_outside(&self) {
        self.shared.update(SearchSession::click_outside);
    }

    /// Selects result `id`, forwards it to the callback and returns it.
    #[instrument(skip(self), fields(kind = %self.shared.kind))]
    pub fn select(&self, id: &str) -> Result<Person, ResolverError> {
        self.debouncer.cancel();
        let person = self.shared.update(|s| s.select(id))?;
        debug!(name = %person.name, "Selected");
        (self.shared.on_select)(person.clone());
        Ok(person)
    }

    /// Tears the control down: pending timer cancelled, in-flight lookup
    /// discarded, panel closed.
    pub fn unmount(&self) {
        self.debouncer.cancel();
        self.shared.update(|s| {
            s.reset();
            s.click_outside();
        });
    }
}

impl Drop for EntityResolver {
    fn drop(&mut self) {
        self.unmount();
    }
}
