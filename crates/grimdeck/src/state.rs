//! Shared application state passed to every request handler.

use std::sync::Arc;

use grimdeck_document::DocumentStore;
use grimdeck_engine::ChainRegistry;
use grimdeck_store::RoomStore;

use crate::ServerConfig;

/// Server-wide services, explicitly constructed at startup and injected
/// into handlers through axum's `State` extractor — no global registries.
#[derive(Clone)]
pub struct AppState {
    pub documents: DocumentStore,
    pub chains: Arc<ChainRegistry>,
    pub config: Arc<ServerConfig>,
}

impl AppState {
    pub fn new(persist: RoomStore, config: ServerConfig) -> Self {
        Self {
            documents: DocumentStore::new(persist),
            chains: Arc::new(ChainRegistry::new()),
            config: Arc::new(config),
        }
    }

    /// The persistence layer underneath the document store.
    pub fn persist(&self) -> &RoomStore {
        self.documents.persist()
    }
}
