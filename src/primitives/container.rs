//! Container Primitive - Structural node with children.
//!
//! Regions, collections, blocks, controls and dialogs are all containers:
//! a typed node, optionally bound to a document path and labelled, that
//! renders its children under itself.
//!
//! # Example
//!
//! ```ignore
//! let cleanup = container(ContainerProps {
//!     kind: ComponentType::Block,
//!     path: Some("blocks.0".into()),
//!     label: Some("Hero".into()),
//!     children: Some(Box::new(|| text(TextProps::from("A")))),
//!     ..Default::default()
//! });
//! ```

use crate::engine::arrays::core;
use crate::engine::{allocate_index, get_current_parent_index, release_index, with_parent};
use super::types::{Cleanup, ContainerProps};

/// Create a structural node.
///
/// Returns a cleanup that unmounts the children, then releases the node
/// (and anything still hanging under it).
pub fn container(props: ContainerProps) -> Cleanup {
    container_with_index(props).1
}

/// Like [`container`], also handing back the node index.
pub fn container_with_index(props: ContainerProps) -> (usize, Cleanup) {
    // 1. ALLOCATE INDEX
    let index = allocate_index(props.id.as_deref());

    // 2. CORE SETUP - Type, parent, binding
    core::set_component_type(index, props.kind);
    if let Some(parent) = get_current_parent_index() {
        core::set_parent_index(index, Some(parent));
    }
    core::set_field_path(index, props.path);
    core::set_label(index, props.label);

    // 3. RENDER CHILDREN
    let children_cleanup = props
        .children
        .map(|children| with_parent(index, children));

    // 4. RETURN CLEANUP
    let cleanup: Cleanup = Box::new(move || {
        if let Some(cleanup) = children_cleanup {
            cleanup();
        }
        release_index(index);
    });
    (index, cleanup)
}

// =============================================================================
// Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::engine::{get_allocated_count, reset_registry};
    use crate::primitives::{noop, text, TextProps};
    use crate::types::ComponentType;

    fn setup() {
        reset_registry();
    }

    #[test]
    fn test_container_creation() {
        setup();

        let cleanup = container(ContainerProps {
            kind: ComponentType::Collection,
            path: Some("blocks".into()),
            ..Default::default()
        });

        assert_eq!(core::get_component_type(0), ComponentType::Collection);
        assert_eq!(core::get_field_path(0).as_deref(), Some("blocks"));

        cleanup();
        assert_eq!(core::get_component_type(0), ComponentType::None);
    }

    #[test]
    fn test_container_with_children() {
        setup();

        let _cleanup = container(ContainerProps {
            kind: ComponentType::Block,
            label: Some("Hero".into()),
            children: Some(Box::new(|| text(TextProps::from("A")))),
            ..Default::default()
        });

        assert_eq!(core::get_component_type(1), ComponentType::Display);
        assert_eq!(core::get_parent_index(1), Some(0));
        assert_eq!(core::get_label(0).as_deref(), Some("Hero"));
    }

    #[test]
    fn test_container_cleanup_releases_subtree() {
        setup();

        let cleanup = container(ContainerProps {
            kind: ComponentType::Region,
            children: Some(Box::new(|| {
                // Child cleanup dropped: the parent release still reaches it
                let _ = text(TextProps::from("orphan"));
                noop()
            })),
            ..Default::default()
        });
        assert_eq!(get_allocated_count(), 2);

        cleanup();
        assert_eq!(get_allocated_count(), 0);
    }
}
