//! Form Engine - Document store with per-field subscriptions.
//!
//! Owns the document value and its last committed snapshot. Every read that
//! should re-run on change goes through [`Form::watch`], which subscribes the
//! running effect to one field's version signal only.
//!
//! # Notification
//!
//! Writing at a path bumps the version of:
//! - every watched ancestor (`blocks` when `blocks.0.text` changes)
//! - the path itself
//! - every watched descendant (`blocks.0.text` when `blocks` is reordered)
//!
//! Unrelated siblings are never notified, so editing `title` does not touch
//! anything watching `blocks`.
//!
//! [`Form::array_len`] subscribes to an array's shape instead: inserts,
//! removes, moves, writes at the array path or above, and writes past its
//! end. Editing `blocks.0.text` does not notify it.
//!
//! All versions bumped by one write are set inside a single `batch`, so each
//! effect re-runs at most once per write.

use std::cell::{Cell, RefCell};
use std::collections::BTreeMap;
use std::rc::Rc;

use serde_json::Value;
use spark_signals::{batch, signal, Signal};

use crate::error::FormError;
use crate::types::FieldFlags;
use super::path::{get_in, get_in_mut, set_in, FieldPath};
use super::source::JsonFile;

// =============================================================================
// Field metadata
// =============================================================================

/// Per-field metadata exposed alongside the value.
#[derive(Debug, Clone, PartialEq)]
pub struct FieldMeta {
    pub flags: FieldFlags,
    /// Value at this path in the last committed snapshot.
    pub initial: Value,
}

impl FieldMeta {
    pub fn dirty(&self) -> bool {
        self.flags.contains(FieldFlags::DIRTY)
    }

    pub fn pristine(&self) -> bool {
        !self.dirty()
    }

    pub fn touched(&self) -> bool {
        self.flags.contains(FieldFlags::TOUCHED)
    }
}

// =============================================================================
// Form
// =============================================================================

struct FormInner {
    /// Storage identity of the loaded document (opaque).
    id: Option<String>,
    values: RefCell<Value>,
    initial: RefCell<Value>,
    /// Focus flags (ACTIVE / VISITED / TOUCHED) per field.
    flags: RefCell<BTreeMap<FieldPath, FieldFlags>>,
    /// Version signal per watched path.
    versions: RefCell<BTreeMap<FieldPath, Signal<u64>>>,
    /// Shape version per watched array path.
    shapes: RefCell<BTreeMap<FieldPath, Signal<u64>>>,
    revision: Cell<u64>,
}

/// Handle to one form. Cloning shares the same document.
#[derive(Clone)]
pub struct Form {
    inner: Rc<FormInner>,
}

impl Form {
    /// Create a form whose initial (committed) value is `initial`.
    pub fn new(initial: Value) -> Form {
        Form::build(None, initial)
    }

    /// Create a form from a loaded document, keeping its storage identity.
    pub fn from_file(file: JsonFile) -> Form {
        Form::build(Some(file.file_relative_path), file.data)
    }

    fn build(id: Option<String>, initial: Value) -> Form {
        Form {
            inner: Rc::new(FormInner {
                id,
                values: RefCell::new(initial.clone()),
                initial: RefCell::new(initial),
                flags: RefCell::new(BTreeMap::new()),
                versions: RefCell::new(BTreeMap::new()),
                shapes: RefCell::new(BTreeMap::new()),
                revision: Cell::new(0),
            }),
        }
    }

    /// Storage identity of the backing document, if it was loaded from one.
    pub fn id(&self) -> Option<&str> {
        self.inner.id.as_deref()
    }

    /// Do both handles point at the same form?
    pub fn ptr_eq(&self, other: &Form) -> bool {
        Rc::ptr_eq(&self.inner, &other.inner)
    }

    // =========================================================================
    // Reads
    // =========================================================================

    /// Current value at `path` (`Null` when missing). Not reactive.
    pub fn value(&self, path: &FieldPath) -> Value {
        get_in(&self.inner.values.borrow(), path)
            .cloned()
            .unwrap_or(Value::Null)
    }

    /// Snapshot of the whole document. Not reactive.
    pub fn values(&self) -> Value {
        self.inner.values.borrow().clone()
    }

    /// Current value at `path`, subscribing the running effect to this field.
    pub fn watch(&self, path: &FieldPath) -> Value {
        self.subscribe(path);
        self.value(path)
    }

    /// Length of the array at `path` (0 when missing or not an array).
    ///
    /// Subscribes to the array's shape only; edits inside its elements do
    /// not re-run the caller.
    pub fn array_len(&self, path: &FieldPath) -> usize {
        let shape = self
            .inner
            .shapes
            .borrow_mut()
            .entry(path.clone())
            .or_insert_with(|| signal(0))
            .clone();
        let _ = shape.get();
        match get_in(&self.inner.values.borrow(), path) {
            Some(Value::Array(items)) => items.len(),
            _ => 0,
        }
    }

    /// Register a read of `path` with the running effect.
    pub fn subscribe(&self, path: &FieldPath) {
        let version = self.version_signal(path);
        let _ = version.get();
    }

    fn version_signal(&self, path: &FieldPath) -> Signal<u64> {
        let mut versions = self.inner.versions.borrow_mut();
        versions
            .entry(path.clone())
            .or_insert_with(|| signal(0))
            .clone()
    }

    /// Metadata for `path`. Not reactive; read it next to [`Form::watch`].
    pub fn field_meta(&self, path: &FieldPath) -> FieldMeta {
        let initial = get_in(&self.inner.initial.borrow(), path)
            .cloned()
            .unwrap_or(Value::Null);
        let mut flags = self
            .inner
            .flags
            .borrow()
            .get(path)
            .copied()
            .unwrap_or(FieldFlags::empty());
        if self.value(path) != initial {
            flags |= FieldFlags::DIRTY;
        }
        FieldMeta { flags, initial }
    }

    /// Does the document differ from the last committed snapshot?
    pub fn is_dirty(&self) -> bool {
        *self.inner.values.borrow() != *self.inner.initial.borrow()
    }

    // =========================================================================
    // Writes
    // =========================================================================

    /// Write `value` at `path` and notify watchers.
    pub fn change(&self, path: &FieldPath, value: Value) -> Result<(), FormError> {
        let grown = self.shapes_grown_by(path);
        {
            let mut values = self.inner.values.borrow_mut();
            set_in(&mut values, path, value)?;
        }
        tracing::debug!(%path, "field changed");
        self.notify(path, grown);
        Ok(())
    }

    /// Insert `value` before `index` in the array at `path`.
    ///
    /// A missing field is treated as an empty array.
    pub fn insert(&self, path: &FieldPath, index: usize, value: Value) -> Result<(), FormError> {
        self.with_array(path, |items| {
            if index > items.len() {
                return Err(FormError::IndexOutOfRange {
                    path: path.to_string(),
                    index,
                    len: items.len(),
                });
            }
            items.insert(index, value);
            Ok(())
        })?;
        self.remap_flags(path, |i| if i >= index { Some(i + 1) } else { Some(i) });
        tracing::debug!(%path, index, "array insert");
        self.notify(path, Vec::new());
        Ok(())
    }

    /// Remove and return the element at `index` of the array at `path`.
    ///
    /// Subscriptions to positions past the new end are dropped.
    pub fn remove(&self, path: &FieldPath, index: usize) -> Result<Value, FormError> {
        let (removed, len) = self.with_array(path, |items| {
            if index >= items.len() {
                return Err(FormError::IndexOutOfRange {
                    path: path.to_string(),
                    index,
                    len: items.len(),
                });
            }
            let removed = items.remove(index);
            Ok((removed, items.len()))
        })?;
        self.remap_flags(path, |i| match i.cmp(&index) {
            std::cmp::Ordering::Less => Some(i),
            std::cmp::Ordering::Equal => None,
            std::cmp::Ordering::Greater => Some(i - 1),
        });
        tracing::debug!(%path, index, "array remove");
        self.notify(path, Vec::new());
        self.prune_from(path, len);
        Ok(removed)
    }

    /// Move the element at `from` to position `to` of the array at `path`.
    /// `from == to` leaves the document untouched and notifies nobody.
    pub fn move_item(&self, path: &FieldPath, from: usize, to: usize) -> Result<(), FormError> {
        self.with_array(path, |items| {
            let len = items.len();
            for index in [from, to] {
                if index >= len {
                    return Err(FormError::IndexOutOfRange {
                        path: path.to_string(),
                        index,
                        len,
                    });
                }
            }
            if from != to {
                let item = items.remove(from);
                items.insert(to, item);
            }
            Ok(())
        })?;
        if from == to {
            return Ok(());
        }
        self.remap_flags(path, |i| {
            if i == from {
                Some(to)
            } else if from < to && i > from && i <= to {
                Some(i - 1)
            } else if to < from && i >= to && i < from {
                Some(i + 1)
            } else {
                Some(i)
            }
        });
        tracing::debug!(%path, from, to, "array move");
        self.notify(path, Vec::new());
        Ok(())
    }

    /// Revert every uncommitted change to the last committed snapshot.
    pub fn reset(&self) {
        {
            let initial = self.inner.initial.borrow().clone();
            *self.inner.values.borrow_mut() = initial;
            self.inner.flags.borrow_mut().clear();
        }
        tracing::debug!("form reset");
        self.notify_all();
    }

    /// Make the current document the committed snapshot.
    pub fn commit(&self) {
        let values = self.inner.values.borrow().clone();
        *self.inner.initial.borrow_mut() = values;
        self.notify_all();
    }

    /// Replace both the document and the committed snapshot.
    pub fn initialize(&self, value: Value) {
        {
            *self.inner.values.borrow_mut() = value.clone();
            *self.inner.initial.borrow_mut() = value;
            self.inner.flags.borrow_mut().clear();
        }
        self.notify_all();
    }

    // =========================================================================
    // Focus tracking
    // =========================================================================

    /// Mark `path` as the active field.
    pub fn focus(&self, path: &FieldPath) {
        let mut flags = self.inner.flags.borrow_mut();
        let entry = flags.entry(path.clone()).or_insert(FieldFlags::empty());
        entry.insert(FieldFlags::ACTIVE | FieldFlags::VISITED);
    }

    /// Mark `path` as left by the user.
    pub fn blur(&self, path: &FieldPath) {
        let mut flags = self.inner.flags.borrow_mut();
        let entry = flags.entry(path.clone()).or_insert(FieldFlags::empty());
        entry.remove(FieldFlags::ACTIVE);
        entry.insert(FieldFlags::TOUCHED);
    }

    // =========================================================================
    // Internals
    // =========================================================================

    fn with_array<R>(
        &self,
        path: &FieldPath,
        op: impl FnOnce(&mut Vec<Value>) -> Result<R, FormError>,
    ) -> Result<R, FormError> {
        let mut values = self.inner.values.borrow_mut();
        if get_in(&values, path).is_none_or(Value::is_null) {
            set_in(&mut values, path, Value::Array(Vec::new()))?;
        }
        match get_in_mut(&mut values, path) {
            Some(Value::Array(items)) => op(items),
            _ => Err(FormError::NotAnArray(path.to_string())),
        }
    }

    /// Move focus flags of array elements to their new positions.
    fn remap_flags(&self, array: &FieldPath, map: impl Fn(usize) -> Option<usize>) {
        let mut flags = self.inner.flags.borrow_mut();
        let affected: Vec<FieldPath> = flags
            .keys()
            .filter(|key| array.element_index_of(key).is_some())
            .cloned()
            .collect();

        let mut moved = Vec::with_capacity(affected.len());
        for key in affected {
            if let Some(value) = flags.remove(&key) {
                let Some(old) = array.element_index_of(&key) else { continue };
                if let Some(new) = map(old) {
                    moved.push((key.with_element_index(array, new), value));
                }
            }
        }
        flags.extend(moved);
    }

    fn next_revision(&self) -> u64 {
        let next = self.inner.revision.get() + 1;
        self.inner.revision.set(next);
        next
    }

    /// Shapes of arrays that a write at `path` pads. Read before writing.
    fn shapes_grown_by(&self, path: &FieldPath) -> Vec<Signal<u64>> {
        let values = self.inner.values.borrow();
        self.inner
            .shapes
            .borrow()
            .iter()
            .filter(|(array, _)| {
                array.element_index_of(path).is_some_and(|index| match get_in(&values, array) {
                    Some(Value::Array(items)) => index >= items.len(),
                    _ => true,
                })
            })
            .map(|(_, shape)| shape.clone())
            .collect()
    }

    /// Bump every watched path on the same branch as `path`, the shape of
    /// every array at or under it, and `grown`.
    ///
    /// Signals are collected first so no borrow is held while effects run.
    fn notify(&self, path: &FieldPath, grown: Vec<Signal<u64>>) {
        let mut affected: Vec<Signal<u64>> = grown;
        affected.extend(
            self.inner
                .versions
                .borrow()
                .iter()
                .filter(|(watched, _)| watched.overlaps(path))
                .map(|(_, version)| version.clone()),
        );
        affected.extend(
            self.inner
                .shapes
                .borrow()
                .iter()
                .filter(|(array, _)| path.contains(array))
                .map(|(_, shape)| shape.clone()),
        );
        self.bump(affected);
    }

    fn notify_all(&self) {
        let mut all: Vec<Signal<u64>> = self.inner.versions.borrow().values().cloned().collect();
        all.extend(self.inner.shapes.borrow().values().cloned());
        self.bump(all);
    }

    fn bump(&self, signals: Vec<Signal<u64>>) {
        let revision = self.next_revision();
        batch(|| {
            for signal in signals {
                signal.set(revision);
            }
        });
    }

    /// Forget subscriptions to elements at or past `len` of `array`.
    fn prune_from(&self, array: &FieldPath, len: usize) {
        let live = |watched: &FieldPath| array.element_index_of(watched).is_none_or(|index| index < len);
        self.inner.versions.borrow_mut().retain(|watched, _| live(watched));
        self.inner.shapes.borrow_mut().retain(|watched, _| live(watched));
    }
}

// =============================================================================
// Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use spark_signals::{effect, flush_sync};

    fn p(raw: &str) -> FieldPath {
        FieldPath::parse(raw).unwrap()
    }

    fn tags(form: &Form) -> Vec<String> {
        match form.value(&p("blocks")) {
            Value::Array(items) => items
                .iter()
                .map(|item| item["_template"].as_str().unwrap_or("?").to_string())
                .collect(),
            _ => Vec::new(),
        }
    }

    fn sample() -> Form {
        Form::new(json!({
            "title": "Home",
            "blocks": [
                { "_template": "hero", "text": "A" },
                { "_template": "cta", "text": "B" },
                { "_template": "hero", "text": "C" },
            ]
        }))
    }

    #[test]
    fn test_change_and_dirty() {
        let form = sample();
        assert!(!form.is_dirty());

        form.change(&p("title"), json!("About")).unwrap();
        assert_eq!(form.value(&p("title")), json!("About"));
        assert!(form.is_dirty());
        assert!(form.field_meta(&p("title")).dirty());
        assert!(form.field_meta(&p("blocks.0.text")).pristine());
    }

    #[test]
    fn test_reset_reverts_to_commit() {
        let form = sample();
        form.change(&p("title"), json!("Draft")).unwrap();
        form.commit();
        form.change(&p("title"), json!("Scratch")).unwrap();
        form.remove(&p("blocks"), 0).unwrap();

        form.reset();
        assert_eq!(form.value(&p("title")), json!("Draft"));
        assert_eq!(tags(&form), vec!["hero", "cta", "hero"]);
        assert!(!form.is_dirty());
    }

    #[test]
    fn test_array_mutators() {
        let form = sample();

        form.insert(&p("blocks"), 1, json!({ "_template": "cta" })).unwrap();
        assert_eq!(tags(&form), vec!["hero", "cta", "cta", "hero"]);

        form.move_item(&p("blocks"), 0, 3).unwrap();
        assert_eq!(tags(&form), vec!["cta", "cta", "hero", "hero"]);

        let removed = form.remove(&p("blocks"), 2).unwrap();
        assert_eq!(removed["text"], json!("C"));
        assert_eq!(form.array_len(&p("blocks")), 3);
    }

    #[test]
    fn test_move_same_index_is_noop() {
        let form = sample();
        let before = form.values();
        form.move_item(&p("blocks"), 1, 1).unwrap();
        assert_eq!(form.values(), before);
    }

    #[test]
    fn test_insert_into_missing_field_creates_array() {
        let form = Form::new(json!({}));
        form.insert(&p("blocks"), 0, json!({ "_template": "hero" })).unwrap();
        assert_eq!(form.array_len(&p("blocks")), 1);
    }

    #[test]
    fn test_mutator_errors_pass_through() {
        let form = sample();
        assert!(matches!(
            form.insert(&p("title"), 0, json!(1)),
            Err(FormError::NotAnArray(_))
        ));
        assert!(matches!(
            form.remove(&p("blocks"), 9),
            Err(FormError::IndexOutOfRange { index: 9, len: 3, .. })
        ));
        assert!(matches!(
            form.move_item(&p("blocks"), 0, 3),
            Err(FormError::IndexOutOfRange { .. })
        ));
        // Failed mutations leave the document as it was.
        assert_eq!(tags(&form), vec!["hero", "cta", "hero"]);
    }

    #[test]
    fn test_focus_flags_follow_moved_elements() {
        let form = sample();
        form.focus(&p("blocks.0.text"));
        form.blur(&p("blocks.0.text"));
        assert!(form.field_meta(&p("blocks.0.text")).touched());

        form.move_item(&p("blocks"), 0, 2).unwrap();
        assert!(!form.field_meta(&p("blocks.0.text")).touched());
        assert!(form.field_meta(&p("blocks.2.text")).touched());

        form.insert(&p("blocks"), 0, json!({ "_template": "cta" })).unwrap();
        assert!(form.field_meta(&p("blocks.3.text")).touched());

        form.remove(&p("blocks"), 3).unwrap();
        assert!(!form.field_meta(&p("blocks.3.text")).touched());
    }

    #[test]
    fn test_watch_notifies_only_related_fields() {
        use std::cell::Cell;

        let form = sample();
        let title_runs = Rc::new(Cell::new(0));
        let text_runs = Rc::new(Cell::new(0));
        let blocks_runs = Rc::new(Cell::new(0));

        let (f, runs) = (form.clone(), title_runs.clone());
        let _title = effect(move || {
            let _ = f.watch(&p("title"));
            runs.set(runs.get() + 1);
        });
        let (f, runs) = (form.clone(), text_runs.clone());
        let _text = effect(move || {
            let _ = f.watch(&p("blocks.1.text"));
            runs.set(runs.get() + 1);
        });
        let (f, runs) = (form.clone(), blocks_runs.clone());
        let _blocks = effect(move || {
            let _ = f.watch(&p("blocks"));
            runs.set(runs.get() + 1);
        });
        flush_sync();
        assert_eq!((title_runs.get(), text_runs.get(), blocks_runs.get()), (1, 1, 1));

        // Sibling edit: only the title watcher runs.
        form.change(&p("title"), json!("x")).unwrap();
        flush_sync();
        assert_eq!((title_runs.get(), text_runs.get(), blocks_runs.get()), (2, 1, 1));

        // Nested edit: the field and its ancestor run, the title does not.
        form.change(&p("blocks.1.text"), json!("y")).unwrap();
        flush_sync();
        assert_eq!((title_runs.get(), text_runs.get(), blocks_runs.get()), (2, 2, 2));

        // Structural edit: the array and its descendants run.
        form.remove(&p("blocks"), 0).unwrap();
        flush_sync();
        assert_eq!((title_runs.get(), text_runs.get(), blocks_runs.get()), (2, 3, 3));
    }

    #[test]
    fn test_array_len_follows_shape_only() {
        use std::cell::Cell;

        let form = sample();
        let runs = Rc::new(Cell::new(0));
        let seen = Rc::new(Cell::new(0));

        let (f, r, s) = (form.clone(), runs.clone(), seen.clone());
        let _len = effect(move || {
            s.set(f.array_len(&p("blocks")));
            r.set(r.get() + 1);
        });
        flush_sync();
        assert_eq!((runs.get(), seen.get()), (1, 3));

        // Element edits leave the shape alone
        form.change(&p("blocks.0.text"), json!("edited")).unwrap();
        form.change(&p("blocks.2"), json!({ "_template": "cta" })).unwrap();
        form.change(&p("title"), json!("x")).unwrap();
        flush_sync();
        assert_eq!(runs.get(), 1);

        form.insert(&p("blocks"), 3, json!({ "_template": "hero" })).unwrap();
        flush_sync();
        assert_eq!((runs.get(), seen.get()), (2, 4));

        form.move_item(&p("blocks"), 0, 1).unwrap();
        flush_sync();
        assert_eq!((runs.get(), seen.get()), (3, 4));

        // A direct element write past the end appends
        form.change(&p("blocks.4"), json!({ "_template": "hero" })).unwrap();
        flush_sync();
        assert_eq!((runs.get(), seen.get()), (4, 5));

        form.reset();
        flush_sync();
        assert_eq!((runs.get(), seen.get()), (5, 3));
    }

    #[test]
    fn test_one_write_runs_each_watcher_once() {
        use std::cell::Cell;

        let form = sample();
        let runs = Rc::new(Cell::new(0));

        // Three subscriptions, all bumped by the same insert
        let (f, r) = (form.clone(), runs.clone());
        let _watcher = effect(move || {
            let _ = f.array_len(&p("blocks"));
            let _ = f.watch(&p("blocks.0._template"));
            let _ = f.watch(&p("blocks.1.text"));
            r.set(r.get() + 1);
        });
        flush_sync();
        assert_eq!(runs.get(), 1);

        form.insert(&p("blocks"), 0, json!({ "_template": "cta" })).unwrap();
        flush_sync();
        assert_eq!(runs.get(), 2);
    }

    #[test]
    fn test_remove_drops_subscriptions_past_the_end() {
        let form = sample();
        for path in ["blocks", "blocks.0.text", "blocks.2", "blocks.2.text", "title"] {
            form.subscribe(&p(path));
        }
        let _ = form.array_len(&p("blocks.2.items"));

        form.remove(&p("blocks"), 0).unwrap();

        let watched: Vec<String> = form
            .inner
            .versions
            .borrow()
            .keys()
            .map(ToString::to_string)
            .collect();
        assert_eq!(watched, vec!["blocks", "blocks.0.text", "title"]);
        assert!(form.inner.shapes.borrow().is_empty());
    }
}
