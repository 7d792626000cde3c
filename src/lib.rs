//! # spark-inline
//!
//! Reactive inline editing for Rust.
//!
//! Built on [spark-signals](https://github.com/RLabs-Inc/spark-signals) for fine-grained reactivity.
//!
//! ## Architecture
//!
//! A page renders its live content, and the same rendered tree switches into
//! an editable mode in place:
//!
//! ```text
//! InlineForm (mode) → inline_blocks (array field) → inline_block (tag dispatch)
//!                   → inline_field (mode + path + value) → Editor | Display
//! ```
//!
//! Rendered nodes are indices into parallel arrays (see [`engine`]). Every
//! inline component takes an [`InlineContext`] carrying the session, the
//! enclosing block namespace and the enclosing collection's mutators. Values
//! live in one [`Form`]; every read that should re-render goes through a
//! per-field subscription.
//!
//! ## Modules
//!
//! - [`types`] - Session mode, node types, editor kinds, field flags
//! - [`form`] - Form engine, field paths, JSON document loader
//! - [`blocks`] - Block templates and registry
//! - [`engine`] - Node registry and parallel arrays
//! - [`primitives`] - Surface nodes and inline components

pub mod blocks;
pub mod config;
pub mod context;
pub mod engine;
pub mod error;
pub mod form;
pub mod primitives;
pub mod session;
pub mod types;

// Re-export commonly used items
pub use types::*;

pub use blocks::{Block, BlockComponent, BlockProps, BlockRegistry, BlockTemplate, FieldSchema};
pub use config::InlineOptions;
pub use context::{BlockScope, InlineContext};
pub use error::FormError;
pub use form::{FieldMeta, FieldPath, Form, JsonFile, Segment};
pub use session::InlineForm;

pub use engine::{
    allocate_index, find_ancestor, find_node, find_nodes, get_allocated_count,
    get_allocated_indices, get_children, get_current_parent_index, get_id, get_index,
    is_allocated, on_destroy, pop_parent_context, push_parent_context, release_index,
    reset_registry, with_parent,
};

pub use primitives::{
    block_controls, container, each_indexed, editor, fragment, inline_block, inline_blocks,
    inline_field, inline_form, inline_text_field, noop, show, text, BlockControls,
    BlocksActions, Cleanup, ContainerProps, EditorFieldsBuilder, EditorProps, FieldInput,
    FieldView, FieldsBuilder, PropValue, SettingsDialog, TextProps,
};
