//! Core Arrays - What a node is and where it hangs.
//!
//! - componentType: Region, Collection, Block, Editor, ...
//! - parentIndex: Owning node (None at the root)
//! - fieldPath: Document path the node is bound to (if any)
//! - label: Human label (editor label, block template label)

use std::cell::RefCell;

use crate::types::ComponentType;

// =============================================================================
// Arrays
// =============================================================================

thread_local! {
    /// Node type.
    static COMPONENT_TYPE: RefCell<Vec<ComponentType>> = const { RefCell::new(Vec::new()) };

    /// Parent node index.
    static PARENT_INDEX: RefCell<Vec<Option<usize>>> = const { RefCell::new(Vec::new()) };

    /// Bound document path, dot-delimited.
    static FIELD_PATH: RefCell<Vec<Option<String>>> = const { RefCell::new(Vec::new()) };

    /// Node label.
    static LABEL: RefCell<Vec<Option<String>>> = const { RefCell::new(Vec::new()) };
}

// =============================================================================
// Capacity Management
// =============================================================================

/// Ensure arrays have capacity for the given index.
pub fn ensure_capacity(index: usize) {
    COMPONENT_TYPE.with(|arr| grow(&mut arr.borrow_mut(), index));
    PARENT_INDEX.with(|arr| grow(&mut arr.borrow_mut(), index));
    FIELD_PATH.with(|arr| grow(&mut arr.borrow_mut(), index));
    LABEL.with(|arr| grow(&mut arr.borrow_mut(), index));
}

pub(super) fn grow<T: Default>(arr: &mut Vec<T>, index: usize) {
    if arr.len() <= index {
        arr.resize_with(index + 1, T::default);
    }
}

/// Clear values at index.
pub fn clear_at_index(index: usize) {
    set_component_type(index, ComponentType::None);
    set_parent_index(index, None);
    set_field_path(index, None);
    set_label(index, None);
}

/// Reset all arrays.
pub fn reset() {
    COMPONENT_TYPE.with(|arr| arr.borrow_mut().clear());
    PARENT_INDEX.with(|arr| arr.borrow_mut().clear());
    FIELD_PATH.with(|arr| arr.borrow_mut().clear());
    LABEL.with(|arr| arr.borrow_mut().clear());
}

// =============================================================================
// Component Type
// =============================================================================

/// Get component type at index.
pub fn get_component_type(index: usize) -> ComponentType {
    COMPONENT_TYPE.with(|arr| arr.borrow().get(index).copied().unwrap_or_default())
}

/// Set component type at index.
pub fn set_component_type(index: usize, component_type: ComponentType) {
    COMPONENT_TYPE.with(|arr| {
        let mut arr = arr.borrow_mut();
        grow(&mut arr, index);
        arr[index] = component_type;
    });
}

// =============================================================================
// Parent Index
// =============================================================================

/// Get parent index at index.
pub fn get_parent_index(index: usize) -> Option<usize> {
    PARENT_INDEX.with(|arr| arr.borrow().get(index).copied().flatten())
}

/// Set parent index at index.
pub fn set_parent_index(index: usize, parent: Option<usize>) {
    PARENT_INDEX.with(|arr| {
        let mut arr = arr.borrow_mut();
        grow(&mut arr, index);
        arr[index] = parent;
    });
}

// =============================================================================
// Field Path
// =============================================================================

/// Get the document path bound to the node at index.
pub fn get_field_path(index: usize) -> Option<String> {
    FIELD_PATH.with(|arr| arr.borrow().get(index).cloned().flatten())
}

/// Set the document path bound to the node at index.
pub fn set_field_path(index: usize, path: Option<String>) {
    FIELD_PATH.with(|arr| {
        let mut arr = arr.borrow_mut();
        grow(&mut arr, index);
        arr[index] = path;
    });
}

// =============================================================================
// Label
// =============================================================================

/// Get the label at index.
pub fn get_label(index: usize) -> Option<String> {
    LABEL.with(|arr| arr.borrow().get(index).cloned().flatten())
}

/// Set the label at index.
pub fn set_label(index: usize, label: Option<String>) {
    LABEL.with(|arr| {
        let mut arr = arr.borrow_mut();
        grow(&mut arr, index);
        arr[index] = label;
    });
}
