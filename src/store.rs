// Copyright (c) 2024 Botho Foundation

//! In-memory store mapping each known node identity to the most recent
//! note seen from that node.
//!
//! Besides the map itself the store maintains a `reference_revision`
//! counter that substitutes for wall-clock liveness: every time a peer
//! that was current publishes a new update, the counter advances and all
//! other peers age by one tick relative to it. Peers that fall more than
//! [`NoteStoreConfig::dead_note_revisions`] ticks behind are eligible for
//! eviction.

use crate::messages::NoteData;
use rand::{rngs::OsRng, seq::SliceRandom};
use serde::{Deserialize, Serialize};
use std::{
    collections::HashMap,
    sync::{Arc, RwLock},
};

/// Configuration for the note store.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NoteStoreConfig {
    /// How many reference-revision ticks a note may lag before it is
    /// considered dead.
    pub dead_note_revisions: u32,
}

impl Default for NoteStoreConfig {
    fn default() -> Self {
        Self {
            dead_note_revisions: 20,
        }
    }
}

/// A note record together with the local revision assigned at ingest time.
#[derive(Debug, Clone)]
struct StoredNote {
    /// The store's reference revision at the moment this entry was last
    /// written. Not the origin's revision; see [`NoteStore::on_note`].
    local_revision: u32,
    data: NoteData,
}

/// Map and counter guarded together so the aging rule always observes a
/// consistent pair.
#[derive(Debug)]
struct StoreInner {
    reference_revision: u32,
    notes: HashMap<String, StoredNote>,
}

/// Thread-safe store of the latest authenticated note per node.
///
/// The store exclusively owns every stored record; accessors return
/// clones. All operations may be called concurrently.
#[derive(Debug)]
pub struct NoteStore {
    config: NoteStoreConfig,
    self_id: String,
    inner: RwLock<StoreInner>,
}

impl NoteStore {
    /// Create a new store whose sole entry is the local node's own note,
    /// at local revision 0.
    pub fn new(self_note: NoteData, config: NoteStoreConfig) -> Self {
        let self_id = self_note.node_id.clone();
        let mut notes = HashMap::new();
        notes.insert(
            self_id.clone(),
            StoredNote {
                local_revision: 0,
                data: self_note,
            },
        );

        Self {
            config,
            self_id,
            inner: RwLock::new(StoreInner {
                reference_revision: 0,
                notes,
            }),
        }
    }

    /// Create a new store with default configuration.
    pub fn with_defaults(self_note: NoteData) -> Self {
        Self::new(self_note, NoteStoreConfig::default())
    }

    /// The local node's identity, fixed at construction.
    pub fn self_id(&self) -> &str {
        &self.self_id
    }

    /// Apply a note from a node, keeping it only if it is the first note
    /// from that node or carries a higher origin revision than the one
    /// currently stored.
    ///
    /// Returns `true` iff the node was previously unknown. Two distinct
    /// counters are at play: staleness is decided on the *origin* revision
    /// carried in the record, while the aging of peers is driven by the
    /// *local* revision assigned here from `reference_revision`.
    pub fn on_note(&self, note: NoteData) -> bool {
        let mut guard = self.inner.write().unwrap();
        let inner = &mut *guard;

        let found = match inner.notes.get(&note.node_id) {
            Some(existing) => {
                // ignore stale information
                if existing.data.revision >= note.revision {
                    return false;
                }

                // start a new reference round if this node was up to date
                if existing.local_revision >= inner.reference_revision {
                    inner.reference_revision += 1;
                }
                true
            }
            None => false,
        };

        let local_revision = inner.reference_revision;
        inner.notes.insert(
            note.node_id.clone(),
            StoredNote {
                local_revision,
                data: note,
            },
        );

        !found
    }

    /// Return up to `count` records sampled uniformly without replacement,
    /// optionally never including the local node's own record.
    ///
    /// Sampling uses a cryptographically strong source: an observer must
    /// not be able to predict which peers this node gossips to next.
    pub fn random_notes(&self, count: usize, exclude_self: bool) -> Vec<NoteData> {
        let inner = self.inner.read().unwrap();

        let ids: Vec<&String> = inner
            .notes
            .keys()
            .filter(|id| !exclude_self || **id != self.self_id)
            .collect();

        ids.choose_multiple(&mut OsRng, count)
            .map(|id| inner.notes[*id].data.clone())
            .collect()
    }

    /// Remove every note that has fallen more than the dead-note threshold
    /// behind the reference revision. The counter itself is not reset.
    ///
    /// The local node's own entry is evicted like any other when stale.
    pub fn clear_dead_notes(&self) {
        let mut inner = self.inner.write().unwrap();

        let reference_revision = inner.reference_revision;
        let threshold = self.config.dead_note_revisions;
        let before = inner.notes.len();
        inner
            .notes
            .retain(|_, stored| reference_revision - stored.local_revision <= threshold);

        let removed = before - inner.notes.len();
        if removed > 0 {
            tracing::debug!(removed, reference_revision, "cleared dead notes");
        }
    }

    /// The `note` values of all stored, unmuted entries, ascending.
    /// Muted entries participate in liveness bookkeeping but not here.
    pub fn active_note_numbers(&self) -> Vec<u32> {
        let inner = self.inner.read().unwrap();

        let mut numbers: Vec<u32> = inner
            .notes
            .values()
            .filter(|stored| !stored.data.mute)
            .map(|stored| stored.data.note)
            .collect();

        numbers.sort_unstable();
        numbers
    }

    /// The number of currently stored notes, muted included.
    pub fn active_notes(&self) -> usize {
        self.inner.read().unwrap().notes.len()
    }

    /// The latest note stored for a node, if any.
    pub fn last_revision(&self, node_id: &str) -> Option<NoteData> {
        let inner = self.inner.read().unwrap();
        inner.notes.get(node_id).map(|stored| stored.data.clone())
    }

    /// Current value of the dead-peer clock.
    pub fn reference_revision(&self) -> u32 {
        self.inner.read().unwrap().reference_revision
    }
}

/// A shared, reference-counted note store.
pub type SharedNoteStore = Arc<NoteStore>;

/// Create a new shared note store.
pub fn new_shared_store(self_note: NoteData, config: NoteStoreConfig) -> SharedNoteStore {
    Arc::new(NoteStore::new(self_note, config))
}
