//! Editor Primitive - Interactive field editor.
//!
//! An Editor node shows a value and accepts new ones through the interaction
//! arrays ([`dispatch_input`](crate::engine::arrays::interaction::dispatch_input)).
//! Incoming values are coerced to the editor's [`EditorKind`] before they
//! reach the change handler.

use std::rc::Rc;

use crate::engine::arrays::interaction::{self, InputHandlers};
use crate::engine::arrays::{core, text as text_arrays};
use crate::engine::{allocate_index, get_current_parent_index, release_index};
use crate::types::ComponentType;
use super::types::{Cleanup, EditorProps, PropValue};

/// Create an Editor node.
pub fn editor(props: EditorProps) -> Cleanup {
    let index = allocate_index(props.id.as_deref());

    core::set_component_type(index, ComponentType::Editor);
    if let Some(parent) = get_current_parent_index() {
        core::set_parent_index(index, Some(parent));
    }
    core::set_field_path(index, props.path);
    core::set_label(index, props.label);

    match props.value {
        PropValue::Static(v) => text_arrays::set_text_content(index, v),
        PropValue::Signal(s) => text_arrays::set_text_content_signal(index, s),
        PropValue::Getter(g) => text_arrays::set_text_content_getter(index, move || g()),
    }

    let kind = props.kind;
    let on_change = props.handlers.on_change;
    interaction::set_input_handlers(
        index,
        InputHandlers {
            on_change: Rc::new(move |raw| on_change(kind.coerce(raw))),
            on_focus: props.handlers.on_focus,
            on_blur: props.handlers.on_blur,
        },
    );

    Box::new(move || release_index(index))
}
