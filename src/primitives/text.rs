//! Text Primitive - Read-only field content.
//!
//! A Display node. Cannot have children.
//!
//! # Reactivity
//!
//! Content can be a static string, signal, or getter. When the content
//! source changes, the node's text updates automatically.
//!
//! # Example
//!
//! ```ignore
//! // Static text
//! text(TextProps::from("Hello"));
//!
//! // Reactive text
//! let title = signal("Draft".to_string());
//! text(TextProps {
//!     path: Some("title".into()),
//!     content: title.clone().into(),
//!     ..Default::default()
//! });
//! title.set("Published".to_string());
//! ```

use crate::engine::arrays::{core, text as text_arrays};
use crate::engine::{allocate_index, get_current_parent_index, release_index};
use crate::types::ComponentType;
use super::types::{Cleanup, PropValue, TextProps};

/// Create a Display node.
///
/// Returns a cleanup function that releases the node.
pub fn text(props: TextProps) -> Cleanup {
    // 1. ALLOCATE INDEX
    let index = allocate_index(props.id.as_deref());

    // 2. CORE SETUP - Type, parent, binding
    core::set_component_type(index, ComponentType::Display);
    if let Some(parent) = get_current_parent_index() {
        core::set_parent_index(index, Some(parent));
    }
    core::set_field_path(index, props.path);

    // 3. BIND TEXT CONTENT
    match props.content {
        PropValue::Static(v) => text_arrays::set_text_content(index, v),
        PropValue::Signal(s) => text_arrays::set_text_content_signal(index, s),
        PropValue::Getter(g) => text_arrays::set_text_content_getter(index, move || g()),
    }

    Box::new(move || release_index(index))
}
