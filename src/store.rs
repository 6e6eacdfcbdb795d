//! # Composition Store
//!
//! The authoritative, ordered collections of entries for one editing
//! session. The store is the only id generator and the only mutator:
//! every other layer reads through [`CompositionStore::snapshot`] or the
//! borrowed accessors.
//!
//! ## Ordering
//!
//! Each collection keeps insertion order. Removing an entry never
//! renumbers or reorders the ones that remain.
//!
//! ## Example
//!
//! ```
//! use etiket::model::EntryKind;
//! use etiket::store::CompositionStore;
//!
//! let mut store = CompositionStore::new();
//! let id = store.add(EntryKind::Text);
//! store.update(EntryKind::Text, &id, "fontSize", "24").unwrap();
//! assert_eq!(store.texts()[0].font_size, 24);
//!
//! store.remove(EntryKind::Text, &id);
//! assert!(store.is_empty());
//! ```

use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::error::FieldError;
use crate::model::{BarcodeEntry, Entry, EntryId, EntryKind, IconEntry, TextEntry};

/// Point-in-time copy of the three entry collections.
///
/// This is exactly the body sent to the preview, save and print
/// endpoints. It owns its data, so changing it never affects the store.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Snapshot {
    #[serde(default)]
    pub text_entries: Vec<TextEntry>,
    #[serde(default)]
    pub icon_entries: Vec<IconEntry>,
    #[serde(default)]
    pub barcode_entries: Vec<BarcodeEntry>,
}

impl Snapshot {
    /// Total number of entries across all kinds.
    pub fn len(&self) -> usize {
        self.text_entries.len() + self.icon_entries.len() + self.barcode_entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// One ordered collection of a single entry kind.
#[derive(Debug, Clone, PartialEq)]
struct EntryList<E: Entry> {
    entries: Vec<E>,
}

impl<E: Entry> Default for EntryList<E> {
    fn default() -> Self {
        Self {
            entries: Vec::new(),
        }
    }
}

impl<E: Entry> EntryList<E> {
    fn from_entries(mut entries: Vec<E>) -> Self {
        for entry in &mut entries {
            entry.normalize();
        }
        Self { entries }
    }

    fn add(&mut self) -> EntryId {
        let id = self.fresh_id();
        self.entries.push(E::with_defaults(id.clone()));
        debug!(kind = %E::KIND, id = %id, "entry added");
        id
    }

    /// Generated ids are collision-resistant, but a loaded collection may
    /// hold arbitrary keys, so check anyway.
    fn fresh_id(&self) -> EntryId {
        loop {
            let id = EntryId::generate();
            if self.position(&id).is_none() {
                return id;
            }
        }
    }

    fn position(&self, id: &EntryId) -> Option<usize> {
        self.entries.iter().position(|e| e.id() == id)
    }

    fn get(&self, id: &EntryId) -> Option<&E> {
        self.position(id).map(|i| &self.entries[i])
    }

    fn update(&mut self, id: &EntryId, field: &str, value: &str) -> Result<bool, FieldError> {
        let Some(i) = self.position(id) else {
            debug!(kind = %E::KIND, id = %id, field, "update for unknown id ignored");
            return Ok(false);
        };
        // Apply on a copy so a rejected value cannot leave a half-written entry.
        let mut entry = self.entries[i].clone();
        entry.set_field(field, value)?;
        self.entries[i] = entry;
        debug!(kind = %E::KIND, id = %id, field, "entry updated");
        Ok(true)
    }

    fn modify(&mut self, id: &EntryId, f: impl FnOnce(&mut E)) -> bool {
        let Some(i) = self.position(id) else {
            return false;
        };
        let mut entry = self.entries[i].clone();
        f(&mut entry);
        if entry.id() != id {
            warn!(kind = %E::KIND, id = %id, "typed edit tried to change the id; discarded");
            return false;
        }
        entry.normalize();
        self.entries[i] = entry;
        debug!(kind = %E::KIND, id = %id, "entry modified");
        true
    }

    fn remove(&mut self, id: &EntryId) -> bool {
        match self.position(id) {
            Some(i) => {
                self.entries.remove(i);
                debug!(kind = %E::KIND, id = %id, "entry removed");
                true
            }
            None => false,
        }
    }
}

/// Ordered, mutable collections of text, icon and barcode entries.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct CompositionStore {
    texts: EntryList<TextEntry>,
    icons: EntryList<IconEntry>,
    barcodes: EntryList<BarcodeEntry>,
}

impl CompositionStore {
    /// Create an empty store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Seed a store from entries that came from outside (backend, file).
    ///
    /// Out-of-range values are pulled back into range on the way in.
    pub fn from_snapshot(snapshot: Snapshot) -> Self {
        Self {
            texts: EntryList::from_entries(snapshot.text_entries),
            icons: EntryList::from_entries(snapshot.icon_entries),
            barcodes: EntryList::from_entries(snapshot.barcode_entries),
        }
    }

    /// Append a default entry of `kind` and return its new id.
    pub fn add(&mut self, kind: EntryKind) -> EntryId {
        match kind {
            EntryKind::Text => self.texts.add(),
            EntryKind::Icon => self.icons.add(),
            EntryKind::Barcode => self.barcodes.add(),
        }
    }

    /// Set one field of the entry with `id`, by wire name.
    ///
    /// Returns `Ok(false)` without touching anything when `id` is not in
    /// the collection; stale ids from a lagging UI are not an error.
    pub fn update(
        &mut self,
        kind: EntryKind,
        id: &EntryId,
        field: &str,
        value: &str,
    ) -> Result<bool, FieldError> {
        match kind {
            EntryKind::Text => self.texts.update(id, field, value),
            EntryKind::Icon => self.icons.update(id, field, value),
            EntryKind::Barcode => self.barcodes.update(id, field, value),
        }
    }

    /// Delete the entry with `id`. Returns whether anything was removed.
    pub fn remove(&mut self, kind: EntryKind, id: &EntryId) -> bool {
        match kind {
            EntryKind::Text => self.texts.remove(id),
            EntryKind::Icon => self.icons.remove(id),
            EntryKind::Barcode => self.barcodes.remove(id),
        }
    }

    /// Typed edit of a text entry. Constraints are re-applied afterwards.
    pub fn modify_text(&mut self, id: &EntryId, f: impl FnOnce(&mut TextEntry)) -> bool {
        self.texts.modify(id, f)
    }

    /// Typed edit of an icon entry. Constraints are re-applied afterwards.
    pub fn modify_icon(&mut self, id: &EntryId, f: impl FnOnce(&mut IconEntry)) -> bool {
        self.icons.modify(id, f)
    }

    /// Typed edit of a barcode entry. Constraints are re-applied afterwards.
    pub fn modify_barcode(&mut self, id: &EntryId, f: impl FnOnce(&mut BarcodeEntry)) -> bool {
        self.barcodes.modify(id, f)
    }

    /// Copy out all three collections.
    pub fn snapshot(&self) -> Snapshot {
        Snapshot {
            text_entries: self.texts.entries.clone(),
            icon_entries: self.icons.entries.clone(),
            barcode_entries: self.barcodes.entries.clone(),
        }
    }

    /// Swap all three collections at once.
    pub fn replace(&mut self, snapshot: Snapshot) {
        *self = Self::from_snapshot(snapshot);
    }

    pub fn texts(&self) -> &[TextEntry] {
        &self.texts.entries
    }

    pub fn icons(&self) -> &[IconEntry] {
        &self.icons.entries
    }

    pub fn barcodes(&self) -> &[BarcodeEntry] {
        &self.barcodes.entries
    }

    pub fn text(&self, id: &EntryId) -> Option<&TextEntry> {
        self.texts.get(id)
    }

    pub fn icon(&self, id: &EntryId) -> Option<&IconEntry> {
        self.icons.get(id)
    }

    pub fn barcode(&self, id: &EntryId) -> Option<&BarcodeEntry> {
        self.barcodes.get(id)
    }

    /// Barcodes in print order (`barcodeSequence`, ties keep insertion order).
    ///
    /// The stored collection itself stays in insertion order.
    pub fn barcodes_in_sequence(&self) -> Vec<&BarcodeEntry> {
        let mut ordered: Vec<&BarcodeEntry> = self.barcodes.entries.iter().collect();
        ordered.sort_by_key(|b| b.barcode_sequence);
        ordered
    }

    /// Number of entries of `kind`.
    pub fn len(&self, kind: EntryKind) -> usize {
        match kind {
            EntryKind::Text => self.texts.entries.len(),
            EntryKind::Icon => self.icons.entries.len(),
            EntryKind::Barcode => self.barcodes.entries.len(),
        }
    }

    /// True when no collection holds any entry.
    pub fn is_empty(&self) -> bool {
        EntryKind::ALL.iter().all(|&kind| self.len(kind) == 0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{BarcodeFormat, FontFamily};
    use pretty_assertions::assert_eq;

    fn store_with_texts(n: usize) -> (CompositionStore, Vec<EntryId>) {
        let mut store = CompositionStore::new();
        let ids = (0..n).map(|_| store.add(EntryKind::Text)).collect();
        (store, ids)
    }

    #[test]
    fn add_then_remove_restores_collection() {
        for kind in EntryKind::ALL {
            let mut store = CompositionStore::new();
            store.add(kind);
            let before = store.snapshot();

            let id = store.add(kind);
            assert_eq!(store.len(kind), 2);
            assert!(store.remove(kind, &id));
            assert_eq!(store.snapshot(), before);
        }
    }

    #[test]
    fn add_uses_kind_defaults() {
        let mut store = CompositionStore::new();
        let id = store.add(EntryKind::Barcode);
        let b = store.barcode(&id).unwrap();
        assert_eq!(b.barcode_format, BarcodeFormat::Code39);
        assert_eq!(b.barcode_data, "1598524566");
    }

    #[test]
    fn rapid_adds_get_unique_ids() {
        let (store, ids) = store_with_texts(200);
        let mut unique = ids.clone();
        unique.sort_by_key(|id| id.to_string());
        unique.dedup();
        assert_eq!(unique.len(), 200);
        assert_eq!(store.len(EntryKind::Text), 200);
    }

    #[test]
    fn update_unknown_id_is_noop() {
        let (mut store, _) = store_with_texts(3);
        let before = store.snapshot();
        let changed = store
            .update(EntryKind::Text, &EntryId::Numeric(999), "text", "ghost")
            .unwrap();
        assert!(!changed);
        assert_eq!(store.snapshot(), before);
    }

    #[test]
    fn update_changes_only_target_field() {
        let (mut store, ids) = store_with_texts(3);
        store.update(EntryKind::Text, &ids[1], "text", "Merhaba").unwrap();

        let texts = store.texts();
        assert_eq!(texts[1].text, "Merhaba");
        assert_eq!(texts[1].font_size, 12);
        assert_eq!(texts[0].text, "Yeni Metin");
        assert_eq!(texts[2].text, "Yeni Metin");
        assert_eq!(texts.iter().map(|t| &t.id).collect::<Vec<_>>(), ids.iter().collect::<Vec<_>>());
    }

    #[test]
    fn non_numeric_update_never_stores_garbage() {
        let (mut store, ids) = store_with_texts(1);
        store.update(EntryKind::Text, &ids[0], "fontSize", "abc").unwrap();
        assert_eq!(store.texts()[0].font_size, 8);
    }

    #[test]
    fn rejected_update_leaves_store_untouched() {
        let mut store = CompositionStore::new();
        let id = store.add(EntryKind::Barcode);
        let before = store.snapshot();
        assert!(store.update(EntryKind::Barcode, &id, "barcodeFormat", "PDF417").is_err());
        assert!(store.update(EntryKind::Barcode, &id, "nope", "1").is_err());
        assert_eq!(store.snapshot(), before);
    }

    #[test]
    fn barcode_format_change_keeps_other_fields() {
        let mut store = CompositionStore::new();
        let id = store.add(EntryKind::Barcode);
        let before = store.barcode(&id).unwrap().clone();

        store.update(EntryKind::Barcode, &id, "barcodeFormat", "QR_CODE").unwrap();

        let after = store.barcode(&id).unwrap();
        assert_eq!(after.barcode_format, BarcodeFormat::QrCode);
        assert_eq!(after.barcode_data, before.barcode_data);
        assert_eq!((after.x, after.y), (before.x, before.y));
    }

    #[test]
    fn remove_preserves_relative_order() {
        let (mut store, ids) = store_with_texts(5);
        assert!(store.remove(EntryKind::Text, &ids[2]));

        let remaining: Vec<_> = store.texts().iter().map(|t| t.id.clone()).collect();
        assert_eq!(
            remaining,
            vec![ids[0].clone(), ids[1].clone(), ids[3].clone(), ids[4].clone()]
        );
    }

    #[test]
    fn remove_unknown_id_is_noop() {
        let (mut store, _) = store_with_texts(2);
        let before = store.snapshot();
        assert!(!store.remove(EntryKind::Text, &EntryId::Key("missing".into())));
        assert_eq!(store.snapshot(), before);
    }

    #[test]
    fn snapshot_is_detached() {
        let (store, _) = store_with_texts(2);
        let first = store.snapshot();
        let mut second = store.snapshot();
        assert_eq!(first, second);

        second.text_entries.clear();
        assert_eq!(store.len(EntryKind::Text), 2);
        assert_eq!(store.snapshot(), first);
    }

    #[test]
    fn snapshot_wire_shape() {
        let (store, _) = store_with_texts(1);
        let json = serde_json::to_value(store.snapshot()).unwrap();
        assert_eq!(json["textEntries"].as_array().unwrap().len(), 1);
        assert_eq!(json["iconEntries"].as_array().unwrap().len(), 0);
        assert_eq!(json["barcodeEntries"].as_array().unwrap().len(), 0);
    }

    #[test]
    fn modify_reapplies_constraints() {
        let (mut store, ids) = store_with_texts(1);
        assert!(store.modify_text(&ids[0], |t| {
            t.font_size = 200;
            t.font_family = FontFamily::Georgia;
        }));
        let t = &store.texts()[0];
        assert_eq!(t.font_size, 72);
        assert_eq!(t.font_family, FontFamily::Georgia);
    }

    #[test]
    fn modify_cannot_change_id() {
        let mut store = CompositionStore::new();
        let id = store.add(EntryKind::Icon);
        assert!(!store.modify_icon(&id, |i| {
            i.id = EntryId::Numeric(1);
            i.x = 99;
        }));
        assert_eq!(store.icons()[0].id, id);
        assert_eq!(store.icons()[0].x, 50);
    }

    #[test]
    fn barcodes_in_sequence_is_a_view() {
        let mut store = CompositionStore::new();
        let a = store.add(EntryKind::Barcode);
        let b = store.add(EntryKind::Barcode);
        let c = store.add(EntryKind::Barcode);
        store.update(EntryKind::Barcode, &a, "barcodeSequence", "3").unwrap();
        store.update(EntryKind::Barcode, &b, "barcodeSequence", "2").unwrap();
        store.update(EntryKind::Barcode, &c, "barcodeSequence", "2").unwrap();

        let ordered: Vec<_> = store.barcodes_in_sequence().iter().map(|e| e.id.clone()).collect();
        assert_eq!(ordered, vec![b.clone(), c.clone(), a.clone()]);
        assert_eq!(store.barcodes()[0].id, a);
    }

    #[test]
    fn loaded_string_id_accepts_typed_id() {
        let loaded: Snapshot = serde_json::from_str(
            r#"{"iconEntries": [{"id": "7", "x": 0, "y": 0, "width": 40, "height": 40, "base64String": ""}]}"#,
        )
        .unwrap();
        let mut store = CompositionStore::from_snapshot(loaded);

        let typed = EntryId::from("7");
        assert!(store.update(EntryKind::Icon, &typed, "base64String", "AAA=").unwrap());
        assert_eq!(store.icons()[0].base64_string, "AAA=");
        assert!(store.remove(EntryKind::Icon, &typed));
        assert!(store.is_empty());
    }

    #[test]
    fn replace_normalizes_loaded_entries() {
        let mut store = CompositionStore::new();
        store.add(EntryKind::Text);
        let loaded: Snapshot = serde_json::from_str(
            r#"{"textEntries": [{"id": 1, "text": "A", "x": 0, "y": 0, "fontSize": 0, "fontFamily": "Tahoma"}],
                "iconEntries": [{"id": 2, "x": 5, "y": 5, "width": 4, "height": 4, "base64String": ""}]}"#,
        )
        .unwrap();
        store.replace(loaded);

        assert_eq!(store.len(EntryKind::Text), 1);
        assert_eq!(store.texts()[0].font_size, 1);
        assert_eq!(store.icons()[0].width, 10);
        assert_eq!(store.len(EntryKind::Barcode), 0);
    }
}
