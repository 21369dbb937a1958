//! Document store: resolves room codes to live documents.
//!
//! One [`RoomSlot`] per active room. The slot owns the per-room writer
//! lock that serializes all mutation — two concurrent requests for the
//! same room cannot race on `currentTurn`/`actionPoints` because both
//! must take the same `tokio::sync::Mutex` before touching the tree.

use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex as StdMutex};

use chrono::{DateTime, Duration, Utc};
use grimdeck_protocol::RoomCode;
use grimdeck_store::{RoomStore, SaveReceipt};
use tokio::sync::{broadcast, Mutex, MutexGuard};

use crate::{DocumentChange, DocumentError, GameDocument, RoomMeta, Section};

/// Capacity of each room's change-broadcast channel. Slow replication
/// consumers that lag past this see `Lagged` and must re-snapshot.
const CHANGE_CHANNEL_CAPACITY: usize = 256;

/// One live room: the document, its writer lock, and its fan-out channel.
#[derive(Debug)]
pub struct RoomSlot {
    code: RoomCode,
    doc: Mutex<GameDocument>,
    changes: broadcast::Sender<DocumentChange>,
    leases: AtomicUsize,
    last_used: StdMutex<DateTime<Utc>>,
}

impl RoomSlot {
    fn new(code: RoomCode, doc: GameDocument) -> Self {
        let (changes, _) = broadcast::channel(CHANGE_CHANNEL_CAPACITY);
        Self {
            code,
            doc: Mutex::new(doc),
            changes,
            leases: AtomicUsize::new(0),
            last_used: StdMutex::new(Utc::now()),
        }
    }

    pub fn code(&self) -> &RoomCode {
        &self.code
    }

    /// Takes the room's writer lock. All mutation of the document goes
    /// through this guard; hold it across validate-and-execute so the
    /// two cannot interleave with another request.
    pub async fn lock(&self) -> MutexGuard<'_, GameDocument> {
        self.mark_used();
        self.doc.lock().await
    }

    /// Announces a document change to replication consumers.
    pub fn publish(&self, section: Section) {
        // No receivers is fine — nobody is replicating this room yet.
        let _ = self.changes.send(DocumentChange {
            room: self.code.clone(),
            section,
        });
    }

    /// Subscribes to this room's change notifications.
    pub fn subscribe(&self) -> broadcast::Receiver<DocumentChange> {
        self.changes.subscribe()
    }

    pub fn lease_count(&self) -> usize {
        self.leases.load(Ordering::SeqCst)
    }

    fn mark_used(&self) {
        *self.last_used.lock().expect("last_used poisoned") = Utc::now();
    }

    fn idle_since(&self) -> DateTime<Utc> {
        *self.last_used.lock().expect("last_used poisoned")
    }
}

struct StoreInner {
    persist: RoomStore,
    slots: Mutex<HashMap<RoomCode, Arc<RoomSlot>>>,
}

/// Resolves room codes to live documents, hydrating from persistence on
/// first reference and evicting (with a final save) when rooms go quiet.
///
/// Cheap to clone; all clones share the same slot map.
#[derive(Clone)]
pub struct DocumentStore {
    inner: Arc<StoreInner>,
}

impl DocumentStore {
    pub fn new(persist: RoomStore) -> Self {
        Self {
            inner: Arc::new(StoreInner {
                persist,
                slots: Mutex::new(HashMap::new()),
            }),
        }
    }

    /// Returns the live slot for `code`, creating and hydrating the
    /// document on first reference.
    ///
    /// Resolution is idempotent per code: the check-then-create runs
    /// under the slot-map lock, so concurrent resolves for the same room
    /// always converge on one slot — a blind overwrite here would
    /// silently fork state.
    pub async fn resolve(
        &self,
        code: &RoomCode,
    ) -> Result<Arc<RoomSlot>, DocumentError> {
        let mut slots = self.inner.slots.lock().await;

        if let Some(slot) = slots.get(code) {
            slot.mark_used();
            return Ok(Arc::clone(slot));
        }

        let row = self
            .inner
            .persist
            .fetch(code)
            .await?
            .ok_or_else(|| DocumentError::RoomNotFound(code.clone()))?;

        let meta = RoomMeta {
            code: row.code,
            name: row.name,
            max_players: row.max_players,
            turn_duration: row.turn_duration,
            selected_deck: row.selected_deck,
            created_at: row.created_at,
        };
        let mut doc = GameDocument::new(meta);

        // Hydrate from the last snapshot, if one exists. A corrupt
        // snapshot is logged and treated as no prior state, not fatal.
        match self.inner.persist.load_state(code).await? {
            Some(bytes) => match serde_json::from_slice::<GameDocument>(&bytes) {
                Ok(snapshot) => {
                    doc.merge_snapshot(snapshot);
                    tracing::info!(
                        room = %code,
                        players = doc.player_count(),
                        "document hydrated from snapshot"
                    );
                }
                Err(e) => {
                    tracing::warn!(
                        room = %code,
                        error = %e,
                        "corrupt snapshot ignored, starting fresh"
                    );
                }
            },
            None => {
                tracing::debug!(room = %code, "no snapshot, fresh document");
            }
        }

        let slot = Arc::new(RoomSlot::new(code.clone(), doc));
        slots.insert(code.clone(), Arc::clone(&slot));
        tracing::info!(room = %code, "document created");
        Ok(slot)
    }

    /// Resolves a room and takes a reference-counted lease on it.
    ///
    /// Long-lived consumers (replication connections) hold a lease for
    /// their lifetime; when the last lease drops the document is saved
    /// and evicted.
    pub async fn lease(
        &self,
        code: &RoomCode,
    ) -> Result<DocumentLease, DocumentError> {
        let slot = self.resolve(code).await?;
        slot.leases.fetch_add(1, Ordering::SeqCst);
        Ok(DocumentLease {
            slot,
            store: self.clone(),
        })
    }

    /// Persists a room's current document. Returns the save receipt.
    pub async fn save(
        &self,
        code: &RoomCode,
    ) -> Result<SaveReceipt, DocumentError> {
        let slot = self.resolve(code).await?;
        self.save_slot(&slot).await
    }

    async fn save_slot(
        &self,
        slot: &RoomSlot,
    ) -> Result<SaveReceipt, DocumentError> {
        let (bytes, player_count) = {
            let doc = slot.doc.lock().await;
            (doc.snapshot_bytes()?, doc.player_count())
        };
        let receipt = self
            .inner
            .persist
            .save_state(slot.code(), &bytes, player_count)
            .await?;
        Ok(receipt)
    }

    /// Saves and evicts a room's document.
    ///
    /// Called when the last consumer disconnects. A missing row means
    /// the lifecycle sweep already purged the room; the in-memory copy
    /// is dropped in that case rather than resurrected.
    pub async fn dispose(&self, code: &RoomCode) -> Result<(), DocumentError> {
        let slot = {
            let mut slots = self.inner.slots.lock().await;
            slots.remove(code)
        };

        let Some(slot) = slot else { return Ok(()) };

        match self.save_slot(&slot).await {
            Ok(receipt) => {
                tracing::info!(
                    room = %code,
                    bytes = receipt.state_size,
                    "document saved and evicted"
                );
                Ok(())
            }
            Err(DocumentError::Store(grimdeck_store::StoreError::MissingRow(_))) => {
                tracing::warn!(
                    room = %code,
                    "room row already purged, dropping document"
                );
                Ok(())
            }
            Err(e) => Err(e),
        }
    }

    /// Evicts unleased documents idle for longer than `max_idle`,
    /// saving each before removal. Returns how many were evicted.
    pub async fn evict_idle(&self, max_idle: Duration) -> usize {
        let cutoff = Utc::now() - max_idle;
        let idle: Vec<RoomCode> = {
            let slots = self.inner.slots.lock().await;
            slots
                .values()
                .filter(|s| s.lease_count() == 0 && s.idle_since() < cutoff)
                .map(|s| s.code().clone())
                .collect()
        };

        let mut evicted = 0;
        for code in idle {
            match self.dispose(&code).await {
                Ok(()) => evicted += 1,
                Err(e) => {
                    tracing::error!(room = %code, error = %e, "idle eviction failed");
                }
            }
        }
        evicted
    }

    /// Number of documents currently held in memory.
    pub async fn resident_count(&self) -> usize {
        self.inner.slots.lock().await.len()
    }

    /// The persistence layer underneath this store.
    pub fn persist(&self) -> &RoomStore {
        &self.inner.persist
    }
}

/// A reference-counted hold on a live room document.
///
/// Dropping the lease releases the reference; when the count reaches
/// zero the document is saved and evicted. `Drop` is synchronous, so the
/// release is spawned as a fire-and-forget task.
pub struct DocumentLease {
    slot: Arc<RoomSlot>,
    store: DocumentStore,
}

impl DocumentLease {
    pub fn slot(&self) -> &Arc<RoomSlot> {
        &self.slot
    }
}

impl Drop for DocumentLease {
    fn drop(&mut self) {
        let prev = self.slot.leases.fetch_sub(1, Ordering::SeqCst);
        if prev == 1 {
            let store = self.store.clone();
            let code = self.slot.code().clone();
            tokio::spawn(async move {
                // Re-check under the slot map: a new lease may have
                // arrived between the decrement and this task running.
                let still_unleased = {
                    let slots = store.inner.slots.lock().await;
                    slots
                        .get(&code)
                        .is_some_and(|s| s.lease_count() == 0)
                };
                if still_unleased {
                    if let Err(e) = store.dispose(&code).await {
                        tracing::error!(
                            room = %code,
                            error = %e,
                            "dispose after last lease failed"
                        );
                    }
                }
            });
        }
    }
}
