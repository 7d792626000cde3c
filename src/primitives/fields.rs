//! Field-list builder - Editors for an ad hoc list of fields.
//!
//! Block settings hand a list of [`FieldSchema`] entries (already rewritten
//! to absolute names) to the session's [`FieldsBuilder`]. The stock builder
//! mounts one always-editable Editor node per entry, bound to the form.

use std::rc::Rc;

use crate::blocks::FieldSchema;
use crate::error::FormError;
use crate::form::{FieldPath, Form};
use super::editor::editor;
use super::types::{fragment, value_text, Cleanup, EditorProps, FieldInput, PropValue};

/// Renders editors for exactly the given fields, bound to `form`.
pub trait FieldsBuilder {
    fn build(&self, form: &Form, fields: &[FieldSchema]) -> Result<Cleanup, FormError>;
}

/// One Editor node per field, in order.
#[derive(Debug, Clone, Copy, Default)]
pub struct EditorFieldsBuilder;

impl FieldsBuilder for EditorFieldsBuilder {
    fn build(&self, form: &Form, fields: &[FieldSchema]) -> Result<Cleanup, FormError> {
        // Every name must parse before anything is mounted
        let paths = fields
            .iter()
            .map(|field| FieldPath::parse(&field.name))
            .collect::<Result<Vec<_>, _>>()?;

        let cleanups = fields
            .iter()
            .zip(paths)
            .map(|(field, path)| {
                let reader = form.clone();
                let watched = path.clone();
                editor(EditorProps {
                    id: None,
                    path: Some(path.to_string()),
                    label: Some(field.label.clone()),
                    kind: field.component,
                    value: PropValue::Getter(Rc::new(move || value_text(&reader.watch(&watched)))),
                    handlers: FieldInput::new(form.clone(), path).handlers(),
                })
            })
            .collect();

        Ok(fragment(cleanups))
    }
}
