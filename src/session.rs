//! # Editing Session
//!
//! One label-editing session: the composition store, the active label
//! settings, the last preview bitmap and the notices waiting to be shown.
//!
//! The session is created at the start of editing and dropped at the
//! end. It is passed by reference to whatever needs it; there is no
//! global instance and no undo history.
//!
//! ## Failure handling
//!
//! Every backend call is recovered here. A failure becomes one error
//! notice and leaves the composition exactly as it was:
//!
//! - a failed load applies none of its four results,
//! - a failed preview keeps the previous bitmap,
//! - a failed save or print changes nothing in memory.

use tracing::{info, warn};

use crate::client::{BackendAck, CompositionClient};
use crate::error::{EtiketError, FieldError};
use crate::ingest::{ImageSource, Ingestor};
use crate::model::{EntryId, EntryKind, LabelSettings};
use crate::notice::Notice;
use crate::store::{CompositionStore, Snapshot};

/// State of one editing session.
#[derive(Debug, Default)]
pub struct Session {
    store: CompositionStore,
    settings: LabelSettings,
    preview: Option<String>,
    notices: Vec<Notice>,
}

impl Session {
    /// Empty session with default label settings.
    pub fn new() -> Self {
        Self::default()
    }

    /// Session seeded with a composition from a file or another source.
    pub fn with_composition(snapshot: Snapshot, settings: LabelSettings) -> Self {
        Self {
            store: CompositionStore::from_snapshot(snapshot),
            settings,
            ..Default::default()
        }
    }

    pub fn store(&self) -> &CompositionStore {
        &self.store
    }

    pub fn settings(&self) -> &LabelSettings {
        &self.settings
    }

    /// Last bitmap returned by a successful preview (base64).
    pub fn preview_bitmap(&self) -> Option<&str> {
        self.preview.as_deref()
    }

    pub fn snapshot(&self) -> Snapshot {
        self.store.snapshot()
    }

    /// Drain pending notices, oldest first.
    pub fn take_notices(&mut self) -> Vec<Notice> {
        std::mem::take(&mut self.notices)
    }

    /// Notices not yet drained.
    pub fn pending_notices(&self) -> &[Notice] {
        &self.notices
    }

    // ========================================================================
    // ENTRY EDITING
    // ========================================================================

    /// Add a default entry of `kind`.
    pub fn add(&mut self, kind: EntryKind) -> EntryId {
        let id = self.store.add(kind);
        self.notices
            .push(Notice::success(format!("New {} entry added", kind)));
        id
    }

    /// Update one field by wire name. Unknown ids are ignored.
    pub fn update(
        &mut self,
        kind: EntryKind,
        id: &EntryId,
        field: &str,
        value: &str,
    ) -> Result<bool, FieldError> {
        self.store.update(kind, id, field, value).inspect_err(|e| {
            self.notices.push(Notice::warning(e.to_string()));
        })
    }

    /// Remove an entry. Unknown ids are ignored.
    pub fn remove(&mut self, kind: EntryKind, id: &EntryId) -> bool {
        let removed = self.store.remove(kind, id);
        if removed {
            self.notices
                .push(Notice::info(format!("{} entry removed", capitalize(kind.label()))));
        }
        removed
    }

    /// Mutable access for typed edits; the store re-applies constraints.
    pub fn store_mut(&mut self) -> &mut CompositionStore {
        &mut self.store
    }

    /// Read `source` and embed it in the icon entry `id`.
    ///
    /// Nothing is written if reading fails. Returns whether an entry was
    /// updated (`false` if the icon was removed meanwhile).
    pub async fn attach_icon(
        &mut self,
        id: &EntryId,
        source: &dyn ImageSource,
        ingestor: &Ingestor,
    ) -> Result<bool, EtiketError> {
        let encoded = match ingestor.ingest(source).await {
            Ok(encoded) => encoded,
            Err(e) => return Err(self.report(e)),
        };
        let updated = self
            .store
            .update(EntryKind::Icon, id, "base64String", &encoded)?;
        if updated {
            self.notices.push(Notice::success("Icon image loaded"));
        } else {
            warn!(id = %id, "icon removed before its image finished loading");
        }
        Ok(updated)
    }

    // ========================================================================
    // BACKEND OPERATIONS
    // ========================================================================

    /// Replace the composition and label settings with the backend's.
    ///
    /// All four results are committed together, or none are.
    pub async fn load_all(&mut self, client: &CompositionClient) -> Result<(), EtiketError> {
        match client.load_all().await {
            Ok(loaded) => {
                self.store.replace(loaded.snapshot);
                self.settings = loaded.settings;
                info!(entries = self.store.snapshot().len(), "load committed");
                self.notices.push(Notice::success("Composition loaded"));
                Ok(())
            }
            Err(e) => Err(self.report(e)),
        }
    }

    /// Render the current composition; keep the previous bitmap on failure.
    pub async fn preview(&mut self, client: &CompositionClient) -> Result<&str, EtiketError> {
        let snapshot = self.store.snapshot();
        match client.preview(&snapshot).await {
            Ok(bitmap) => {
                self.notices.push(Notice::success("Preview created"));
                Ok(self.preview.insert(bitmap).as_str())
            }
            Err(e) => Err(self.report(e)),
        }
    }

    /// Save the current composition on the backend.
    pub async fn persist(&mut self, client: &CompositionClient) -> Result<BackendAck, EtiketError> {
        let snapshot = self.store.snapshot();
        match client.persist(&snapshot).await {
            Ok(ack) => {
                self.notices
                    .push(Notice::success(ack.message_or("Composition saved")));
                Ok(ack)
            }
            Err(e) => Err(self.report(e)),
        }
    }

    /// Send the current composition to the printer.
    pub async fn print(&mut self, client: &CompositionClient) -> Result<BackendAck, EtiketError> {
        let snapshot = self.store.snapshot();
        match client.print(&snapshot).await {
            Ok(ack) => {
                self.notices
                    .push(Notice::success(ack.message_or("Print job accepted")));
                Ok(ack)
            }
            Err(e) => Err(self.report(e)),
        }
    }

    /// Turn an error into exactly one notice and hand it back.
    fn report(&mut self, error: EtiketError) -> EtiketError {
        let notice = match &error {
            EtiketError::Busy(op) => Notice::warning(format!("{} is already running", capitalize(op))),
            other => Notice::error(format!("{} failed: {}", capitalize(other.operation()), other)),
        };
        warn!(%error, "operation failed");
        self.notices.push(notice);
        error
    }
}

fn capitalize(s: &str) -> String {
    let mut chars = s.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}
