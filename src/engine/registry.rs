//! Node Registry - Index allocation for parallel arrays.
//!
//! Manages the lifecycle of node indices:
//! - ID ↔ Index bidirectional mapping
//! - Free index pool for O(1) reuse
//! - Parent context stack for nested node creation
//! - Destroy callbacks (effect teardown for bound cells)
//! - Queries over the live surface (by type, by path, by parent)

use std::cell::RefCell;
use std::collections::{BTreeSet, HashMap};

use super::arrays;
use crate::types::ComponentType;

// =============================================================================
// Registry State
// =============================================================================

thread_local! {
    /// Map node ID to array index.
    static ID_TO_INDEX: RefCell<HashMap<String, usize>> = RefCell::new(HashMap::new());

    /// Map array index to node ID.
    static INDEX_TO_ID: RefCell<HashMap<usize, String>> = RefCell::new(HashMap::new());

    /// Set of currently allocated indices (ordered for stable queries).
    static ALLOCATED_INDICES: RefCell<BTreeSet<usize>> = const { RefCell::new(BTreeSet::new()) };

    /// Pool of freed indices for reuse.
    static FREE_INDICES: RefCell<Vec<usize>> = const { RefCell::new(Vec::new()) };

    /// Next index to allocate if pool is empty.
    static NEXT_INDEX: RefCell<usize> = const { RefCell::new(0) };

    /// Counter for generating unique IDs.
    static ID_COUNTER: RefCell<usize> = const { RefCell::new(0) };

    /// Stack of parent indices for nested node creation.
    static PARENT_STACK: RefCell<Vec<usize>> = const { RefCell::new(Vec::new()) };

    /// Destroy callbacks registered per index.
    static DESTROY_CALLBACKS: RefCell<HashMap<usize, Vec<Box<dyn FnOnce()>>>> = RefCell::new(HashMap::new());
}

// =============================================================================
// Parent Context Stack
// =============================================================================

/// Get current parent index (None if at root).
pub fn get_current_parent_index() -> Option<usize> {
    PARENT_STACK.with(|stack| stack.borrow().last().copied())
}

/// Push a parent index onto the stack.
pub fn push_parent_context(index: usize) {
    PARENT_STACK.with(|stack| stack.borrow_mut().push(index))
}

/// Pop a parent index from the stack.
pub fn pop_parent_context() {
    PARENT_STACK.with(|stack| {
        stack.borrow_mut().pop();
    })
}

/// Run `f` with `index` as the current parent.
pub fn with_parent<R>(index: usize, f: impl FnOnce() -> R) -> R {
    push_parent_context(index);
    let result = f();
    pop_parent_context();
    result
}

// =============================================================================
// Index Allocation
// =============================================================================

/// Allocate an index for a new node.
///
/// # Arguments
/// * `id` - Optional node ID. If not provided, one is generated.
///
/// # Returns
/// The allocated index.
pub fn allocate_index(id: Option<&str>) -> usize {
    // Generate ID if not provided
    let node_id = match id {
        Some(id) => id.to_string(),
        None => ID_COUNTER.with(|counter| {
            let mut counter = counter.borrow_mut();
            let id = format!("n{}", *counter);
            *counter += 1;
            id
        }),
    };

    // Check if already allocated
    let existing = ID_TO_INDEX.with(|map| map.borrow().get(&node_id).copied());
    if let Some(index) = existing {
        return index;
    }

    // Reuse free index or allocate new
    let index = FREE_INDICES.with(|free| {
        let mut free = free.borrow_mut();
        free.pop().unwrap_or_else(|| {
            NEXT_INDEX.with(|next| {
                let mut next = next.borrow_mut();
                let index = *next;
                *next += 1;
                index
            })
        })
    });

    // Register mappings
    ID_TO_INDEX.with(|map| map.borrow_mut().insert(node_id.clone(), index));
    INDEX_TO_ID.with(|map| map.borrow_mut().insert(index, node_id));
    ALLOCATED_INDICES.with(|set| set.borrow_mut().insert(index));

    // Ensure arrays have capacity for this index
    arrays::ensure_all_capacity(index);

    index
}

/// Release an index back to the pool.
///
/// Also recursively releases all children!
pub fn release_index(index: usize) {
    let id = INDEX_TO_ID.with(|map| map.borrow().get(&index).cloned());
    let Some(id) = id else { return };

    // FIRST: Find and release all children (recursive!)
    let children = get_children(index);
    for child_index in children {
        release_index(child_index);
    }

    // Run destroy callbacks before cleanup
    run_destroy_callbacks(index);

    // Clean up mappings
    ID_TO_INDEX.with(|map| map.borrow_mut().remove(&id));
    INDEX_TO_ID.with(|map| map.borrow_mut().remove(&index));
    ALLOCATED_INDICES.with(|set| set.borrow_mut().remove(&index));

    // Clear all array values at this index
    arrays::clear_all_at_index(index);

    // Return to pool for reuse
    FREE_INDICES.with(|free| free.borrow_mut().push(index));

    // AUTO-CLEANUP: When all nodes destroyed, reset all arrays to free memory
    let is_empty = ALLOCATED_INDICES.with(|set| set.borrow().is_empty());
    if is_empty {
        arrays::reset_all_arrays();
        FREE_INDICES.with(|free| free.borrow_mut().clear());
        NEXT_INDEX.with(|next| *next.borrow_mut() = 0);
    }
}

// =============================================================================
// Destroy Callbacks
// =============================================================================

/// Register a callback to run when the node at `index` is destroyed.
pub fn on_destroy(index: usize, callback: impl FnOnce() + 'static) {
    DESTROY_CALLBACKS.with(|callbacks| {
        callbacks
            .borrow_mut()
            .entry(index)
            .or_default()
            .push(Box::new(callback));
    });
}

/// Run and clear destroy callbacks for an index.
fn run_destroy_callbacks(index: usize) {
    let callbacks = DESTROY_CALLBACKS.with(|callbacks| callbacks.borrow_mut().remove(&index));
    if let Some(callbacks) = callbacks {
        for callback in callbacks {
            callback();
        }
    }
}

// =============================================================================
// Lookups
// =============================================================================

/// Get index for a node ID.
pub fn get_index(id: &str) -> Option<usize> {
    ID_TO_INDEX.with(|map| map.borrow().get(id).copied())
}

/// Get ID for an index.
pub fn get_id(index: usize) -> Option<String> {
    INDEX_TO_ID.with(|map| map.borrow().get(&index).cloned())
}

/// Get all currently allocated indices, ascending.
pub fn get_allocated_indices() -> Vec<usize> {
    ALLOCATED_INDICES.with(|set| set.borrow().iter().copied().collect())
}

/// Check if an index is currently allocated.
pub fn is_allocated(index: usize) -> bool {
    ALLOCATED_INDICES.with(|set| set.borrow().contains(&index))
}

/// Get the count of currently allocated nodes.
pub fn get_allocated_count() -> usize {
    ALLOCATED_INDICES.with(|set| set.borrow().len())
}

/// Direct children of `index`.
pub fn get_children(index: usize) -> Vec<usize> {
    get_allocated_indices()
        .into_iter()
        .filter(|&child| arrays::core::get_parent_index(child) == Some(index))
        .collect()
}

/// Live nodes of one type.
pub fn find_nodes(component_type: ComponentType) -> Vec<usize> {
    get_allocated_indices()
        .into_iter()
        .filter(|&index| arrays::core::get_component_type(index) == component_type)
        .collect()
}

/// The live node of `component_type` bound to `path`, if any.
pub fn find_node(component_type: ComponentType, path: &str) -> Option<usize> {
    find_nodes(component_type)
        .into_iter()
        .find(|&index| arrays::core::get_field_path(index).as_deref() == Some(path))
}

/// Nearest live ancestor of `index` with the given type.
pub fn find_ancestor(index: usize, component_type: ComponentType) -> Option<usize> {
    let mut current = arrays::core::get_parent_index(index);
    while let Some(parent) = current {
        if arrays::core::get_component_type(parent) == component_type {
            return Some(parent);
        }
        current = arrays::core::get_parent_index(parent);
    }
    None
}

// =============================================================================
// Reset (for testing)
// =============================================================================

/// Reset all registry state (for testing).
pub fn reset_registry() {
    ID_TO_INDEX.with(|map| map.borrow_mut().clear());
    INDEX_TO_ID.with(|map| map.borrow_mut().clear());
    ALLOCATED_INDICES.with(|set| set.borrow_mut().clear());
    FREE_INDICES.with(|free| free.borrow_mut().clear());
    NEXT_INDEX.with(|next| *next.borrow_mut() = 0);
    ID_COUNTER.with(|counter| *counter.borrow_mut() = 0);
    PARENT_STACK.with(|stack| stack.borrow_mut().clear());
    DESTROY_CALLBACKS.with(|callbacks| callbacks.borrow_mut().clear());
    arrays::reset_all_arrays();
}
