//! Primitive types - Props, cleanup and field views.
//!
//! These types define the interface for surface nodes and inline components.
//! Props support static values, signals, and getters for reactivity.

use std::rc::Rc;

use serde_json::Value;
use spark_signals::Signal;
use tracing::error;

use crate::engine::arrays::interaction::InputHandlers;
use crate::error::FormError;
use crate::form::{FieldMeta, FieldPath, Form};
use crate::types::{ComponentType, EditorKind, InlineStatus};

// =============================================================================
// Cleanup Function
// =============================================================================

/// Cleanup function returned by components.
///
/// Call this to unmount the component and release resources.
pub type Cleanup = Box<dyn FnOnce()>;

/// Cleanup that does nothing (an empty slot).
pub fn noop() -> Cleanup {
    Box::new(|| {})
}

/// Run several cleanups as one, last mounted first.
pub fn fragment(cleanups: Vec<Cleanup>) -> Cleanup {
    Box::new(move || {
        for cleanup in cleanups.into_iter().rev() {
            cleanup();
        }
    })
}

// =============================================================================
// Prop Value - Reactive property wrapper
// =============================================================================

/// A property value that can be static, a signal, or a getter.
///
/// This enables reactive props while maintaining type safety.
/// When binding to arrays, the reactive connection is preserved.
#[derive(Clone)]
pub enum PropValue<T: Clone + PartialEq + 'static> {
    /// Static value (not reactive).
    Static(T),
    /// Reactive signal (changes propagate automatically).
    Signal(Signal<T>),
    /// Getter function (called each time value is needed).
    Getter(Rc<dyn Fn() -> T>),
}

impl<T: Clone + PartialEq + 'static> PropValue<T> {
    /// Get the current value (for immediate reads).
    pub fn get(&self) -> T {
        match self {
            PropValue::Static(v) => v.clone(),
            PropValue::Signal(s) => s.get(),
            PropValue::Getter(f) => f(),
        }
    }
}

impl<T: Clone + PartialEq + Default + 'static> Default for PropValue<T> {
    fn default() -> Self {
        PropValue::Static(T::default())
    }
}

impl<T: Clone + PartialEq + 'static> From<T> for PropValue<T> {
    fn from(value: T) -> Self {
        PropValue::Static(value)
    }
}

impl<T: Clone + PartialEq + 'static> From<Signal<T>> for PropValue<T> {
    fn from(signal: Signal<T>) -> Self {
        PropValue::Signal(signal)
    }
}

impl From<&str> for PropValue<String> {
    fn from(value: &str) -> Self {
        PropValue::Static(value.to_string())
    }
}

// =============================================================================
// Value Text
// =============================================================================

/// Text shown for a document value: strings bare, null empty, anything
/// else as JSON.
pub fn value_text(value: &Value) -> String {
    match value {
        Value::Null => String::new(),
        Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}

// =============================================================================
// Container Props
// =============================================================================

/// Properties for a structural node (region, collection, block, controls,
/// dialog).
///
/// # Example
///
/// ```ignore
/// container(ContainerProps {
///     kind: ComponentType::Block,
///     path: Some("blocks.0".into()),
///     label: Some("Hero".into()),
///     children: Some(Box::new(|| text(TextProps::from("A")))),
///     ..Default::default()
/// });
/// ```
#[derive(Default)]
pub struct ContainerProps {
    /// Optional node ID for lookup.
    pub id: Option<String>,
    /// Node type.
    pub kind: ComponentType,
    /// Bound document path.
    pub path: Option<String>,
    /// Human label.
    pub label: Option<String>,
    /// Rendered under this node. The returned cleanup runs before the node
    /// is released.
    pub children: Option<Box<dyn FnOnce() -> Cleanup>>,
}

// =============================================================================
// Text Props
// =============================================================================

/// Properties for a read-only Display node.
#[derive(Default)]
pub struct TextProps {
    /// Optional node ID for lookup.
    pub id: Option<String>,
    /// Bound document path.
    pub path: Option<String>,
    /// Content to display.
    pub content: PropValue<String>,
}

impl From<&str> for TextProps {
    fn from(content: &str) -> Self {
        TextProps {
            content: content.into(),
            ..Default::default()
        }
    }
}

// =============================================================================
// Editor Props
// =============================================================================

/// Properties for an interactive Editor node.
pub struct EditorProps {
    /// Optional node ID for lookup.
    pub id: Option<String>,
    /// Bound document path.
    pub path: Option<String>,
    /// Label shown next to the editor.
    pub label: Option<String>,
    /// Which editor to show. Incoming values are coerced to it.
    pub kind: EditorKind,
    /// Current value text.
    pub value: PropValue<String>,
    /// Where edits go.
    pub handlers: InputHandlers,
}

// =============================================================================
// Field View
// =============================================================================

/// Routes edits of one field into the form.
#[derive(Clone)]
pub struct FieldInput {
    form: Form,
    path: FieldPath,
}

impl FieldInput {
    pub fn new(form: Form, path: FieldPath) -> Self {
        Self { form, path }
    }

    /// Write a new value for the field.
    pub fn change(&self, value: Value) -> Result<(), FormError> {
        self.form.change(&self.path, value)
    }

    pub fn focus(&self) {
        self.form.focus(&self.path);
    }

    pub fn blur(&self) {
        self.form.blur(&self.path);
    }

    /// Surface handlers for an Editor node. Failed writes are logged.
    pub fn handlers(&self) -> InputHandlers {
        let on_change = self.clone();
        let on_focus = self.clone();
        let on_blur = self.clone();
        InputHandlers {
            on_change: Rc::new(move |value| {
                if let Err(err) = on_change.change(value) {
                    error!(path = %on_change.path, %err, "field change rejected");
                }
            }),
            on_focus: Some(Rc::new(move || on_focus.focus())),
            on_blur: Some(Rc::new(move || on_blur.blur())),
        }
    }
}

/// What a field resolver hands its render function.
#[derive(Clone)]
pub struct FieldView {
    /// Absolute path of the field.
    pub path: FieldPath,
    /// Current value.
    pub value: Value,
    /// Session mode at render time.
    pub status: InlineStatus,
    /// Focus and dirty state.
    pub meta: FieldMeta,
    /// Change dispatcher.
    pub input: FieldInput,
}

impl FieldView {
    pub fn is_active(&self) -> bool {
        self.status.is_active()
    }

    /// Value as display text.
    pub fn text(&self) -> String {
        value_text(&self.value)
    }
}
