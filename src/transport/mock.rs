//! # Mock Transports
//!
//! Test doubles for [`Transport`].
//!
//! - [`MockTransport`] answers from a queue of expectations, optionally after
//!   a delay, and records every call it receives.
//! - [`create_channel_transport`] hands each call to the test as a
//!   [`PendingCall`], so the test decides when (and in which order) responses
//!   arrive.

use async_trait::async_trait;
use std::collections::VecDeque;
use std::sync::{Arc, Mutex};
use std::time::Duration;
use tokio::sync::{mpsc, oneshot};

use super::{Transport, TransportError};
use crate::domain::{
    BearerToken, Movie, MovieDraft, MovieKey, MoviePatch, Paginated, Person, PersonKind,
};

// =============================================================================
// RECORDED CALLS & REPLIES
// =============================================================================

/// A transport call as it was issued.
#[derive(Debug, Clone, PartialEq)]
pub enum Call {
    ListMovies { page: u32, limit: u32 },
    SearchMovies { query: String, page: u32, limit: u32 },
    GetMovie { key: MovieKey },
    CreateMovie { draft: MovieDraft },
    UpdateMovie { key: MovieKey, patch: MoviePatch },
    DeleteMovie { key: MovieKey },
    ListPersons { kind: PersonKind, query: Option<String> },
}

impl Call {
    fn name(&self) -> &'static str {
        match self {
            Call::ListMovies { .. } => "list_movies",
            Call::SearchMovies { .. } => "search_movies",
            Call::GetMovie { .. } => "get_movie",
            Call::CreateMovie { .. } => "create_movie",
            Call::UpdateMovie { .. } => "update_movie",
            Call::DeleteMovie { .. } => "delete_movie",
            Call::ListPersons { .. } => "list_persons",
        }
    }
}

/// A canned answer for one call.
#[derive(Debug, Clone)]
pub enum Reply {
    Movies(Result<Paginated<Movie>, TransportError>),
    Movie(Result<Movie, TransportError>),
    Unit(Result<(), TransportError>),
    Persons(Result<Paginated<Person>, TransportError>),
}

fn unexpected<T>(call: &str, reply: Reply) -> T {
    panic!("Reply shape mismatch for {call}: {reply:?}")
}

impl Reply {
    fn into_movies(self, call: &str) -> Result<Paginated<Movie>, TransportError> {
        match self {
            Reply::Movies(r) => r,
            other => unexpected(call, other),
        }
    }

    fn into_movie(self, call: &str) -> Result<Movie, TransportError> {
        match self {
            Reply::Movie(r) => r,
            other => unexpected(call, other),
        }
    }

    fn into_unit(self, call: &str) -> Result<(), TransportError> {
        match self {
            Reply::Unit(r) => r,
            other => unexpected(call, other),
        }
    }

    fn into_persons(self, call: &str) -> Result<Paginated<Person>, TransportError> {
        match self {
            Reply::Persons(r) => r,
            other => unexpected(call, other),
        }
    }
}

/// Shared plumbing: both doubles turn a [`Call`] into a [`Reply`].
#[async_trait]
trait Responder: Send + Sync {
    async fn respond(&self, call: Call) -> Reply;
}

#[async_trait]
impl<R: Responder> Transport for R {
    async fn list_movies(
        &self,
        _token: &BearerToken,
        page: u32,
        limit: u32,
    ) -> Result<Paginated<Movie>, TransportError> {
        self.respond(Call::ListMovies { page, limit })
            .await
            .into_movies("list_movies")
    }

    async fn search_movies(
        &self,
        _token: &BearerToken,
        query: &str,
        page: u32,
        limit: u32,
    ) -> Result<Paginated<Movie>, TransportError> {
        let call = Call::SearchMovies {
            query: query.to_string(),
            page,
            limit,
        };
        self.respond(call).await.into_movies("search_movies")
    }

    async fn get_movie(&self, _token: &BearerToken, key: &MovieKey) -> Result<Movie, TransportError> {
        self.respond(Call::GetMovie { key: key.clone() })
            .await
            .into_movie("get_movie")
    }

    async fn create_movie(
        &self,
        _token: &BearerToken,
        draft: &MovieDraft,
    ) -> Result<Movie, TransportError> {
        self.respond(Call::CreateMovie { draft: draft.clone() })
            .await
            .into_movie("create_movie")
    }

    async fn update_movie(
        &self,
        _token: &BearerToken,
        key: &MovieKey,
        patch: &MoviePatch,
    ) -> Result<Movie, TransportError> {
        let call = Call::UpdateMovie {
            key: key.clone(),
            patch: patch.clone(),
        };
        self.respond(call).await.into_movie("update_movie")
    }

    async fn delete_movie(&self, _token: &BearerToken, key: &MovieKey) -> Result<(), TransportError> {
        self.respond(Call::DeleteMovie { key: key.clone() })
            .await
            .into_unit("delete_movie")
    }

    async fn list_persons(
        &self,
        _token: &BearerToken,
        kind: PersonKind,
        query: Option<&str>,
    ) -> Result<Paginated<Person>, TransportError> {
        let call = Call::ListPersons {
            kind,
            query: query.map(str::to_string),
        };
        self.respond(call).await.into_persons("list_persons")
    }
}

// =============================================================================
// EXPECTATION BUILDER API
// =============================================================================

struct Expectation {
    call: &'static str,
    reply: Reply,
    delay: Option<Duration>,
}

type Queue = Arc<Mutex<VecDeque<Expectation>>>;

/// A transport that answers from expectations, in the order calls arrive.
///
/// # Example
/// ```ignore
/// let mock = MockTransport::new();
/// mock.expect_list().return_ok(Paginated::new(movies, 1, 3, 25));
/// mock.expect_create().with_delay(Duration::from_millis(50)).return_ok(movie);
///
/// let transport: Arc<dyn Transport> = Arc::new(mock.clone());
/// // Use transport in tests...
/// mock.verify(); // Ensures all expectations were met
/// ```
#[derive(Clone, Default)]
pub struct MockTransport {
    expectations: Queue,
    calls: Arc<Mutex<Vec<Call>>>,
}

impl MockTransport {
    pub fn new() -> Self {
        Self::default()
    }

    fn builder<T>(&self, call: &'static str, wrap: fn(Result<T, TransportError>) -> Reply) -> ExpectationBuilder<T> {
        ExpectationBuilder {
            call,
            wrap,
            delay: None,
            expectations: self.expectations.clone(),
        }
    }

    pub fn expect_list(&self) -> ExpectationBuilder<Paginated<Movie>> {
        self.builder("list_movies", Reply::Movies)
    }

    pub fn expect_search(&self) -> ExpectationBuilder<Paginated<Movie>> {
        self.builder("search_movies", Reply::Movies)
    }

    pub fn expect_get(&self) -> ExpectationBuilder<Movie> {
        self.builder("get_movie", Reply::Movie)
    }

    pub fn expect_create(&self) -> ExpectationBuilder<Movie> {
        self.builder("create_movie", Reply::Movie)
    }

    pub fn expect_update(&self) -> ExpectationBuilder<Movie> {
        self.builder("update_movie", Reply::Movie)
    }

    pub fn expect_delete(&self) -> ExpectationBuilder<()> {
        self.builder("delete_movie", Reply::Unit)
    }

    pub fn expect_persons(&self) -> ExpectationBuilder<Paginated<Person>> {
        self.builder("list_persons", Reply::Persons)
    }

    /// Every call received so far, in arrival order.
    pub fn calls(&self) -> Vec<Call> {
        self.calls.lock().unwrap().clone()
    }

    /// Verifies that all expectations were met.
    pub fn verify(&self) {
        let exps = self.expectations.lock().unwrap();
        if !exps.is_empty() {
            panic!("Not all expectations were met. {} remaining", exps.len());
        }
    }
}

#[async_trait]
impl Responder for MockTransport {
    async fn respond(&self, call: Call) -> Reply {
        let name = call.name();
        self.calls.lock().unwrap().push(call);
        let expectation = self.expectations.lock().unwrap().pop_front();
        let Some(expectation) = expectation else {
            panic!("Unexpected request: {name}");
        };
        if expectation.call != name {
            panic!("Expected {} but got {name}", expectation.call);
        }
        if let Some(delay) = expectation.delay {
            tokio::time::sleep(delay).await;
        }
        expectation.reply
    }
}

/// Builder for one expectation.
pub struct ExpectationBuilder<T> {
    call: &'static str,
    wrap: fn(Result<T, TransportError>) -> Reply,
    delay: Option<Duration>,
    expectations: Queue,
}

impl<T> ExpectationBuilder<T> {
    /// Holds the reply back for `delay` after the call arrives.
    pub fn with_delay(mut self, delay: Duration) -> Self {
        self.delay = Some(delay);
        self
    }

    /// Sets the expectation to return a successful result.
    pub fn return_ok(self, value: T) {
        self.push(Ok(value));
    }

    /// Sets the expectation to return an error.
    pub fn return_err(self, error: TransportError) {
        self.push(Err(error));
    }

    fn push(self, result: Result<T, TransportError>) {
        let mut exps = self.expectations.lock().unwrap();
        exps.push_back(Expectation {
            call: self.call,
            reply: (self.wrap)(result),
            delay: self.delay,
        });
    }
}

// =============================================================================
// CHANNEL-BACKED TRANSPORT
// =============================================================================

/// A call waiting for the test to answer it.
#[derive(Debug)]
pub struct PendingCall {
    pub call: Call,
    responder: oneshot::Sender<Reply>,
}

impl PendingCall {
    pub fn respond(self, reply: Reply) {
        let _ = self.responder.send(reply);
    }
}

/// Transport half of [`create_channel_transport`].
#[derive(Clone)]
pub struct ChannelTransport {
    sender: mpsc::Sender<PendingCall>,
}

#[async_trait]
impl Responder for ChannelTransport {
    async fn respond(&self, call: Call) -> Reply {
        let name = call.name();
        let (responder, response) = oneshot::channel();
        if self.sender.send(PendingCall { call, responder }).await.is_err() {
            return Reply::harness_gone(name);
        }
        response.await.unwrap_or_else(|_| Reply::harness_gone(name))
    }
}

impl Reply {
    /// Error reply in the shape `call` expects.
    fn harness_gone(call: &str) -> Reply {
        let err = TransportError::Network(format!("{call}: test harness went away"));
        match call {
            "list_movies" | "search_movies" => Reply::Movies(Err(err)),
            "list_persons" => Reply::Persons(Err(err)),
            "delete_movie" => Reply::Unit(Err(err)),
            _ => Reply::Movie(Err(err)),
        }
    }
}

/// Creates a transport whose calls surface on the returned receiver.
///
/// # Testing Strategy
/// Races are reproduced deterministically: the test receives each
/// [`PendingCall`] and answers them in whatever order the scenario needs.
pub fn create_channel_transport(buffer_size: usize) -> (ChannelTransport, mpsc::Receiver<PendingCall>) {
    let (sender, receiver) = mpsc::channel(buffer_size);
    (ChannelTransport { sender }, receiver)
}
