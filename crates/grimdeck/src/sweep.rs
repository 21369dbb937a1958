//! Background lifecycle sweeps.
//!
//! One task per server, firing on a fixed interval: purge idle room
//! rows, expire stale chains, and evict unleased in-memory documents
//! back to storage. Each sweep is independent of whether a document is
//! currently loaded for a given room.

use tokio::task::JoinHandle;

use crate::AppState;

pub(crate) fn spawn_sweeps(state: AppState) -> JoinHandle<()> {
    tokio::spawn(async move {
        let mut interval = tokio::time::interval(state.config.sweep_interval);
        // The first tick fires immediately; skip straight to the cadence.
        interval.tick().await;

        loop {
            interval.tick().await;

            match state.persist().cleanup(state.config.room_ttl).await {
                Ok(purged) if purged > 0 => {
                    tracing::info!(purged, "room sweep");
                }
                Ok(_) => {}
                Err(e) => {
                    tracing::error!(error = %e, "room sweep failed");
                }
            }

            let expired = state.chains.sweep(state.config.chain_ttl);
            if expired > 0 {
                tracing::info!(expired, "chain sweep");
            }

            let evicted = state.documents.evict_idle(state.config.doc_idle).await;
            if evicted > 0 {
                tracing::info!(evicted, "document eviction sweep");
            }
        }
    })
}
