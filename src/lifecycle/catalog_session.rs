use std::sync::Arc;
use tracing::{error, info};

use crate::clients::CollectionClient;
use crate::config::SyncConfig;
use crate::domain::{BearerToken, Person, PersonKind};
use crate::resolver::{EntityResolver, ResolverOptions};
use crate::transport::{HttpTransport, Transport};

/// Runtime orchestrator for one page session of the catalog client.
///
/// `CatalogSession` is responsible for:
/// - **Lifecycle Management**: starting the collection store actor and stopping it
/// - **Dependency Wiring**: handing the transport, token and timeouts to clients
/// - **Resolver Construction**: building search controls that share the transport
///
/// # Example
///
/// ```ignore
/// let session = CatalogSession::new(SyncConfig::from_env()?, transport, token);
///
/// session.collection.list(1, 10).await?;
/// let producer_input = session.resolver(PersonKind::Producer, |p| println!("{}", p.name));
///
/// // Gracefully shut down when the page goes away
/// session.shutdown().await?;
/// ```
pub struct CatalogSession {
    /// Client for the movie collection
    pub collection: CollectionClient,

    config: SyncConfig,
    transport: Arc<dyn Transport>,
    token: BearerToken,

    /// Task handle of the store actor (used for graceful shutdown)
    handle: tokio::task::JoinHandle<()>,
}

impl CatalogSession {
    /// Spawns the collection store and wires the client.
    ///
    /// Must be called from within a Tokio runtime.
    pub fn new(config: SyncConfig, transport: Arc<dyn Transport>, token: BearerToken) -> Self {
        let (actor, store) = crate::collection::new(&config);
        let handle = tokio::spawn(actor.run());

        let collection = CollectionClient::new(
            store,
            transport.clone(),
            token.clone(),
            config.request_timeout(),
            config.page_size,
        );

        info!(api_url = %config.api_url, ordering = ?config.ordering, "Catalog session started");
        Self {
            collection,
            config,
            transport,
            token,
            handle,
        }
    }

    /// Same as [`CatalogSession::new`] over [`HttpTransport`] at `config.api_url`.
    pub fn connect(config: SyncConfig, token: BearerToken) -> Self {
        let transport = HttpTransport::new(reqwest::Client::new(), config.api_url.clone());
        Self::new(config, Arc::new(transport), token)
    }

    pub fn config(&self) -> &SyncConfig {
        &self.config
    }

    /// Builds a search control for `kind` using the session's transport,
    /// token and debounce delay.
    pub fn resolver(
        &self,
        kind: PersonKind,
        on_select: impl Fn(Person) + Send + Sync + 'static,
    ) -> EntityResolver {
        self.resolver_with(kind, on_select, ResolverOptions::default())
    }

    /// Like [`CatalogSession::resolver`], with explicit options. The debounce
    /// delay from the session config always applies.
    pub fn resolver_with(
        &self,
        kind: PersonKind,
        on_select: impl Fn(Person) + Send + Sync + 'static,
        options: ResolverOptions,
    ) -> EntityResolver {
        let options = ResolverOptions {
            debounce: self.config.debounce(),
            ..options
        };
        EntityResolver::new(
            self.transport.clone(),
            kind,
            Some(self.token.clone()),
            Box::new(on_select),
            options,
        )
    }

    /// Gracefully shuts down the session.
    ///
    /// Dropping the collection client closes the store's channel; the actor
    /// drains its queue and exits. Clones of the client held elsewhere keep
    /// the actor alive until they are dropped too.
    pub async fn shutdown(self) -> Result<(), String> {
        info!("Shutting down catalog session...");
        drop(self.collection);

        if let Err(e) = self.handle.await {
            error!("Store task failed: {:?}", e);
            return Err(format!("Store task failed: {:?}", e));
        }

        info!("Catalog session shutdown complete.");
        Ok(())
    }
}
