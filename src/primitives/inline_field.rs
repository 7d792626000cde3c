//! Inline Field - The field resolver.
//!
//! Joins the ambient mode with one field of the form. The render function is
//! called with a [`FieldView`] on mount and again whenever the field's value
//! or the session mode changes; the previous render is cleaned up first.
//!
//! The resolver subscribes to its own field only, so editing a sibling never
//! re-renders it. Reads made by the render function itself subscribe nothing.
//!
//! # Example
//!
//! ```ignore
//! inline_field(ctx, "title", |field| {
//!     if field.is_active() {
//!         editor(EditorProps { value: field.text().into(), handlers: field.input.handlers(), .. })
//!     } else {
//!         text(TextProps::from(field.text().as_str()))
//!     }
//! })?;
//! ```

use std::cell::RefCell;
use std::rc::Rc;

use spark_signals::{effect, effect_scope, on_scope_dispose};

use crate::context::InlineContext;
use crate::engine::{get_current_parent_index, pop_parent_context, push_parent_context};
use crate::error::FormError;
use crate::types::EditorKind;
use super::control_flow::mount_in_root;
use super::editor::editor;
use super::text::text;
use super::types::{Cleanup, EditorProps, FieldInput, FieldView, TextProps};

/// Resolve `name` in `ctx` and keep `children` rendered for it.
///
/// Fails only if `name` is not a valid path.
pub fn inline_field<F>(ctx: &InlineContext, name: &str, children: F) -> Result<Cleanup, FormError>
where
    F: Fn(&FieldView) -> Cleanup + 'static,
{
    let path = ctx.resolve(name)?;
    let parent_index = get_current_parent_index();
    let children = Rc::new(children);

    let current: Rc<RefCell<Option<Cleanup>>> = Rc::new(RefCell::new(None));
    let current_effect = current.clone();
    let current_dispose = current.clone();

    let ctx = ctx.clone();
    let scope = effect_scope(true);

    scope.run(move || {
        let _effect_cleanup = effect(move || {
            // Both reads subscribe: mode, then this field only
            let status = ctx.status();
            let form = ctx.form();
            let value = form.watch(&path);

            let view = FieldView {
                path: path.clone(),
                value,
                status,
                meta: form.field_meta(&path),
                input: FieldInput::new(form.clone(), path.clone()),
            };

            let previous = current_effect.borrow_mut().take();
            if let Some(previous) = previous {
                previous();
            }

            if let Some(parent) = parent_index {
                push_parent_context(parent);
            }
            let children = children.clone();
            let rendered = mount_in_root(move || children(&view));
            if parent_index.is_some() {
                pop_parent_context();
            }

            *current_effect.borrow_mut() = Some(rendered);
        });

        on_scope_dispose(move || {
            let rendered = current_dispose.borrow_mut().take();
            if let Some(rendered) = rendered {
                rendered();
            }
        });
    });

    Ok(Box::new(move || {
        scope.stop();
    }))
}

/// Stock text field: an editor while active, plain text otherwise.
pub fn inline_text_field(ctx: &InlineContext, name: &str) -> Result<Cleanup, FormError> {
    inline_field(ctx, name, |field| {
        let path = Some(field.path.to_string());
        if field.is_active() {
            editor(EditorProps {
                id: None,
                path,
                label: None,
                kind: EditorKind::Text,
                value: field.text().into(),
                handlers: field.input.handlers(),
            })
        } else {
            text(TextProps {
                path,
                content: field.text().into(),
                ..Default::default()
            })
        }
    })
}
