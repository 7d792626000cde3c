//! Surface Arrays - Parallel node storage.
//!
//! All node state lives in these parallel arrays.
//! Each array index corresponds to one node of the render surface.
//!
//! # Array Categories
//!
//! - **core**: Component type, parent, bound field path, label
//! - **text**: Rendered content (value text of Display/Editor nodes)
//! - **interaction**: Input handlers and labelled actions

pub mod core;
pub mod interaction;
pub mod text;

use self::core as core_arrays;
use self::interaction as interaction_arrays;
use self::text as text_arrays;

/// Ensure all arrays have capacity for the given index.
///
/// Called by registry when allocating.
pub fn ensure_all_capacity(index: usize) {
    core_arrays::ensure_capacity(index);
    text_arrays::ensure_capacity(index);
}

/// Clear all array values at an index.
///
/// Called by registry when releasing.
pub fn clear_all_at_index(index: usize) {
    core_arrays::clear_at_index(index);
    text_arrays::clear_at_index(index);
    interaction_arrays::clear_at_index(index);
}

/// Reset all parallel arrays to release memory.
///
/// Called automatically when the last node is released.
pub fn reset_all_arrays() {
    core_arrays::reset();
    text_arrays::reset();
    interaction_arrays::reset();
}
