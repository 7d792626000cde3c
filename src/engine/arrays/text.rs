//! Text Arrays - Rendered content of Display and Editor nodes.
//!
//! Content is either written directly or bound to a getter. A getter binding
//! runs inside its own effect, so the cell follows whatever the getter reads
//! and stops following it when the node is released.

use std::cell::RefCell;

use spark_signals::effect;

use super::core::grow;
use crate::engine::on_destroy;

// =============================================================================
// Arrays
// =============================================================================

thread_local! {
    /// Text content string.
    static TEXT_CONTENT: RefCell<Vec<String>> = const { RefCell::new(Vec::new()) };
}

// =============================================================================
// Capacity Management
// =============================================================================

/// Ensure arrays have capacity for the given index.
pub fn ensure_capacity(index: usize) {
    TEXT_CONTENT.with(|arr| grow(&mut arr.borrow_mut(), index));
}

/// Clear values at index.
pub fn clear_at_index(index: usize) {
    set_text_content(index, String::new());
}

/// Reset all arrays.
pub fn reset() {
    TEXT_CONTENT.with(|arr| arr.borrow_mut().clear());
}

// =============================================================================
// Text Content
// =============================================================================

/// Get text content at index.
pub fn get_text_content(index: usize) -> String {
    TEXT_CONTENT.with(|arr| arr.borrow().get(index).cloned().unwrap_or_default())
}

/// Set text content at index.
pub fn set_text_content(index: usize, content: String) {
    TEXT_CONTENT.with(|arr| {
        let mut arr = arr.borrow_mut();
        grow(&mut arr, index);
        arr[index] = content;
    });
}

/// Set text content from a getter function.
///
/// The binding lives until the node at `index` is released.
pub fn set_text_content_getter<F>(index: usize, getter: F)
where
    F: Fn() -> String + 'static,
{
    let stop = effect(move || {
        let content = getter();
        set_text_content(index, content);
    });
    on_destroy(index, stop);
}

/// Set text content from a signal.
pub fn set_text_content_signal(index: usize, sig: spark_signals::Signal<String>) {
    set_text_content_getter(index, move || sig.get());
}
