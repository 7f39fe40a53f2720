use std::collections::HashMap;
use std::sync::Arc;

use chrono::{DateTime, Utc};
use serde::Serialize;
use tauri::{AppHandle, Emitter, Runtime};
use tokio::sync::Mutex;
use uuid::Uuid;

use super::{
    entry::{PendingSelection, SessionEntry},
    ledger::{LedgerError, SessionLedger},
    ranker::{rank, PersonalBestHistory},
};

const ENABLE_LOGS: bool = true;
use crate::log_info;

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct EntryView {
    #[serde(flatten)]
    pub entry: SessionEntry,
    pub is_fastest: bool,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SessionSnapshot {
    pub flow_id: String,
    pub started_at: DateTime<Utc>,
    pub entries: Vec<EntryView>,
    pub total_units: u32,
    pub pending: PendingSelection,
}

struct FlowState {
    flow_id: String,
    started_at: DateTime<Utc>,
    ledger: SessionLedger,
    pending: PendingSelection,
    history: PersonalBestHistory,
}

impl FlowState {
    fn fresh(history: PersonalBestHistory) -> Self {
        Self {
            flow_id: Uuid::new_v4().to_string(),
            started_at: Utc::now(),
            ledger: SessionLedger::new(),
            pending: PendingSelection::default(),
            history,
        }
    }

    fn snapshot(&self) -> SessionSnapshot {
        SessionSnapshot {
            flow_id: self.flow_id.clone(),
            started_at: self.started_at,
            entries: self
                .ledger
                .entries()
                .iter()
                .map(|entry| EntryView {
                    entry: entry.clone(),
                    is_fastest: self.ledger.is_fastest(entry),
                })
                .collect(),
            total_units: self.ledger.total_units(),
            pending: self.pending.clone(),
        }
    }
}

/// Owner of all mutable state for one post-creation flow: the ledger, the
/// pending category selection, and the read-only personal-best history.
/// Everything is discarded when a new flow begins.
pub struct SessionController<R: Runtime> {
    inner: Arc<Mutex<FlowState>>,
    app_handle: AppHandle<R>,
}

impl<R: Runtime> Clone for SessionController<R> {
    fn clone(&self) -> Self {
        Self {
            inner: self.inner.clone(),
            app_handle: self.app_handle.clone(),
        }
    }
}

impl<R: Runtime> SessionController<R> {
    pub fn new(app_handle: AppHandle<R>) -> Self {
        Self {
            inner: Arc::new(Mutex::new(FlowState::fresh(PersonalBestHistory::default()))),
            app_handle,
        }
    }

    /// Start a fresh flow with the backend-supplied top-3 history.
    pub async fn begin_flow(&self, top_times: HashMap<String, Vec<f64>>) -> SessionSnapshot {
        let mut guard = self.inner.lock().await;
        *guard = FlowState::fresh(PersonalBestHistory::new(top_times));
        log_info!("session flow {} started", guard.flow_id);
        guard.snapshot()
    }

    pub async fn snapshot(&self) -> SessionSnapshot {
        self.inner.lock().await.snapshot()
    }

    pub async fn is_empty(&self) -> bool {
        self.inner.lock().await.ledger.is_empty()
    }

    pub async fn set_pending(&self, selection: PendingSelection) {
        self.inner.lock().await.pending = selection;
    }

    /// Consume a finished measurement: rank it against the history, turn the
    /// pending selection into an entry, and append. The rank is fixed here
    /// and never revisited, even if sibling entries later change.
    pub async fn record_timed(&self, elapsed_seconds: f64) -> SessionEntry {
        let entry = {
            let mut guard = self.inner.lock().await;
            let selection = guard.pending.take();
            let pb_rank = rank(
                elapsed_seconds,
                selection.category_label.as_deref(),
                &guard.history,
            );
            let entry = SessionEntry::timed(elapsed_seconds, &selection, pb_rank);
            guard.ledger.append(entry.clone());
            entry
        };
        log_info!(
            "recorded {} at {:.3}s (pb rank {:?})",
            entry.display_label(),
            elapsed_seconds,
            entry.personal_best_rank
        );
        self.emit_updated().await;
        entry
    }

    pub async fn add_free_pour(&self) -> SessionEntry {
        let entry = SessionEntry::free_pour();
        self.inner.lock().await.ledger.append(entry.clone());
        self.emit_updated().await;
        entry
    }

    pub async fn remove_entry(&self, index: usize) -> Result<SessionSnapshot, LedgerError> {
        let snapshot = {
            let mut guard = self.inner.lock().await;
            guard.ledger.remove_at(index)?;
            guard.snapshot()
        };
        self.emit_updated().await;
        Ok(snapshot)
    }

    pub async fn set_note(&self, index: usize, note: &str) -> Result<SessionSnapshot, LedgerError> {
        let snapshot = {
            let mut guard = self.inner.lock().await;
            guard.ledger.set_note(index, note)?;
            guard.snapshot()
        };
        self.emit_updated().await;
        Ok(snapshot)
    }

    pub async fn total_units(&self) -> u32 {
        self.inner.lock().await.ledger.total_units()
    }

    /// Canonical wire form of the ledger for the submission form field.
    pub async fn serialized_ledger(&self) -> Result<String, serde_json::Error> {
        self.inner.lock().await.ledger.serialize()
    }

    /// Run a read-only projection over the ledger without cloning it.
    pub async fn with_ledger<T>(&self, project: impl FnOnce(&SessionLedger) -> T) -> T {
        let guard = self.inner.lock().await;
        project(&guard.ledger)
    }

    async fn emit_updated(&self) {
        let snapshot = self.inner.lock().await.snapshot();
        let _ = self.app_handle.emit("session-updated", snapshot);
    }
}
