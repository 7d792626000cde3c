//! Inline Primitives - Component building blocks.
//!
//! Surface primitives:
//! - [`container`] - Structural node (region, collection, block, controls, dialog)
//! - [`text`] - Read-only field content
//! - [`editor`] - Interactive field editor
//! - [`show`] / [`each_indexed`] - Conditional and positional list rendering
//!
//! Inline components, built on the above:
//! - [`inline_form`] - Root of an editable region
//! - [`inline_field`] / [`inline_text_field`] - Field resolver
//! - [`inline_blocks`] / [`inline_block`] - Ordered block collection
//! - [`block_controls`] - Add, move, remove and settings around a block
//!
//! # Architecture
//!
//! Components are indices into parallel arrays. Each component:
//! 1. Allocates an index from the registry
//! 2. Binds props directly to the arrays (preserving reactivity!)
//! 3. Renders its children with itself as the parent
//! 4. Returns a cleanup function
//!
//! Inline components additionally take an [`InlineContext`](crate::InlineContext)
//! and hand a derived one to their children.

mod container;
mod control_flow;
mod controls;
mod editor;
mod fields;
mod inline_blocks;
mod inline_field;
mod inline_form;
mod text;
mod types;

pub use container::{container, container_with_index};
pub use control_flow::{each_indexed, show};
pub use controls::{block_controls, BlockControls, SettingsDialog};
pub use editor::editor;
pub use fields::{EditorFieldsBuilder, FieldsBuilder};
pub use inline_blocks::{inline_block, inline_blocks, BlocksActions};
pub use inline_field::{inline_field, inline_text_field};
pub use inline_form::inline_form;
pub use text::text;
pub use types::*;
