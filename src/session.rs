//! Inline form session - the mode broadcaster.
//!
//! One [`InlineForm`] per editable region. It owns the session mode (a
//! signal, so every reader inside an effect re-runs on change) and shares the
//! form engine with everything mounted under it.

use std::cell::RefCell;
use std::fmt;
use std::rc::Rc;

use spark_signals::{signal, Signal};
use tracing::debug;

use crate::config::InlineOptions;
use crate::form::Form;
use crate::primitives::{EditorFieldsBuilder, FieldsBuilder};
use crate::types::InlineStatus;

/// One editing session over one form.
///
/// Cheap to clone; clones share the same mode and form.
#[derive(Clone)]
pub struct InlineForm {
    inner: Rc<SessionInner>,
}

struct SessionInner {
    form: Form,
    status: Signal<InlineStatus>,
    options: InlineOptions,
    fields_builder: RefCell<Rc<dyn FieldsBuilder>>,
}

impl InlineForm {
    /// Start a session. The mode starts `Inactive`.
    pub fn new(form: Form) -> InlineForm {
        InlineForm::with_options(form, InlineOptions::default())
    }

    pub fn with_options(form: Form, options: InlineOptions) -> InlineForm {
        InlineForm {
            inner: Rc::new(SessionInner {
                form,
                status: signal(InlineStatus::Inactive),
                options,
                fields_builder: RefCell::new(Rc::new(EditorFieldsBuilder)),
            }),
        }
    }

    /// Current mode. Reading it inside an effect subscribes to changes.
    pub fn status(&self) -> InlineStatus {
        self.inner.status.get()
    }

    pub fn is_active(&self) -> bool {
        self.status().is_active()
    }

    pub fn activate(&self) {
        self.set_status(InlineStatus::Active);
    }

    pub fn deactivate(&self) {
        self.set_status(InlineStatus::Inactive);
    }

    /// Flip between edit and preview.
    pub fn toggle(&self) {
        self.set_status(self.status().toggled());
    }

    /// Revert every uncommitted change.
    pub fn discard_changes(&self) {
        debug!(form = ?self.inner.form.id(), "discarding changes");
        self.inner.form.reset();
    }

    pub fn form(&self) -> &Form {
        &self.inner.form
    }

    pub fn options(&self) -> &InlineOptions {
        &self.inner.options
    }

    /// Collaborator that renders block settings fields.
    pub fn fields_builder(&self) -> Rc<dyn FieldsBuilder> {
        self.inner.fields_builder.borrow().clone()
    }

    pub fn set_fields_builder(&self, builder: impl FieldsBuilder + 'static) {
        *self.inner.fields_builder.borrow_mut() = Rc::new(builder);
    }

    fn set_status(&self, status: InlineStatus) {
        if self.inner.status.get() == status {
            return;
        }
        debug!(form = ?self.inner.form.id(), ?status, "inline mode");
        self.inner.status.set(status);
    }
}

impl fmt::Debug for InlineForm {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("InlineForm")
            .field("form", &self.inner.form.id())
            .field("status", &self.inner.status.get())
            .field("options", &self.inner.options)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use spark_signals::effect;
    use std::cell::Cell;

    fn session() -> InlineForm {
        InlineForm::new(Form::new(json!({ "title": "Hello" })))
    }

    #[test]
    fn test_starts_inactive() {
        assert_eq!(session().status(), InlineStatus::Inactive);
    }

    #[test]
    fn test_activate_deactivate_round_trip() {
        let session = session();
        session.activate();
        assert!(session.is_active());
        session.deactivate();
        assert_eq!(session.status(), InlineStatus::Inactive);
    }

    #[test]
    fn test_toggle() {
        let session = session();
        session.toggle();
        assert!(session.is_active());
        session.toggle();
        assert!(!session.is_active());
    }

    #[test]
    fn test_readers_rerun_only_on_change() {
        let session = session();
        let runs = Rc::new(Cell::new(0));

        let reader = session.clone();
        let runs_clone = runs.clone();
        let _stop = effect(move || {
            let _ = reader.status();
            runs_clone.set(runs_clone.get() + 1);
        });
        assert_eq!(runs.get(), 1);

        session.activate();
        assert_eq!(runs.get(), 2);

        // Already active
        session.activate();
        assert_eq!(runs.get(), 2);

        session.deactivate();
        assert_eq!(runs.get(), 3);
    }

    #[test]
    fn test_sessions_do_not_share_mode() {
        let a = session();
        let b = session();
        a.activate();
        assert!(a.is_active());
        assert!(!b.is_active());
    }

    #[test]
    fn test_clones_share_mode() {
        let a = session();
        let b = a.clone();
        b.activate();
        assert!(a.is_active());
    }

    #[test]
    fn test_discard_changes_reverts() {
        let session = session();
        let path = crate::form::FieldPath::parse("title").unwrap();
        session.form().change(&path, json!("Changed")).unwrap();
        assert!(session.form().is_dirty());

        session.discard_changes();
        assert_eq!(session.form().value(&path), json!("Hello"));
        assert!(!session.form().is_dirty());
    }
}
