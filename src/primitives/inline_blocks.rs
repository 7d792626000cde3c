//! Inline Blocks - The ordered block collection.
//!
//! A named array field whose elements are tagged records. The collection
//! renders one block instance per element, addressed by its **current**
//! position, and exposes the array mutators ([`BlocksActions`]) to everything
//! mounted inside it.
//!
//! # Re-rendering
//!
//! The collection subscribes to the array's shape and to each record's tag,
//! never to the fields inside a record. It reconciles by position
//! ([`each_indexed`]): a slot keeps its block while the tag at its position
//! is unchanged (its fields re-resolve on their own), and is remounted when
//! the tag changes. Nothing remembers a block's identity across a reorder.
//!
//! # Unknown types
//!
//! A record whose tag is not registered renders nothing and logs a warning.
//! It still occupies its position for insert, move and remove.

use std::fmt;
use std::rc::Rc;

use serde_json::Value;
use tracing::{error, warn};

use crate::blocks::{BlockProps, BlockRegistry};
use crate::context::{BlockScope, InlineContext};
use crate::engine::arrays::core;
use crate::engine::{allocate_index, get_current_parent_index, release_index, with_parent};
use crate::error::FormError;
use crate::form::{FieldPath, Form};
use crate::types::ComponentType;
use super::container::container;
use super::control_flow::each_indexed;
use super::types::{noop, Cleanup, ContainerProps};

// =============================================================================
// Mutators
// =============================================================================

/// Mutators of one block collection.
///
/// Indices are not validated here; out-of-range indices come back as the
/// form engine's [`FormError::IndexOutOfRange`].
#[derive(Clone)]
pub struct BlocksActions {
    form: Form,
    path: FieldPath,
    registry: Rc<BlockRegistry>,
    template_key: Rc<str>,
}

impl BlocksActions {
    pub fn new(form: Form, path: FieldPath, registry: Rc<BlockRegistry>, template_key: &str) -> Self {
        Self {
            form,
            path,
            registry,
            template_key: Rc::from(template_key),
        }
    }

    /// Path of the array field.
    pub fn path(&self) -> &FieldPath {
        &self.path
    }

    pub fn registry(&self) -> &BlockRegistry {
        &self.registry
    }

    pub fn template_key(&self) -> &str {
        &self.template_key
    }

    /// Number of records. Subscribes when read inside an effect.
    pub fn count(&self) -> usize {
        self.form.array_len(&self.path)
    }

    /// Path of the record at `index`.
    pub fn block_path(&self, index: usize) -> FieldPath {
        self.path.index(index)
    }

    /// Type tag stored in the record at `index` (not subscribing).
    pub fn tag_at(&self, index: usize) -> Option<String> {
        record_tag(&self.form.value(&self.block_path(index)), &self.template_key)
    }

    /// Insert `record` before `index` (`count()` appends).
    pub fn insert(&self, index: usize, record: Value) -> Result<(), FormError> {
        self.form.insert(&self.path, index, record)
    }

    /// Move the record at `from` to `to`. `from == to` does nothing.
    pub fn move_item(&self, from: usize, to: usize) -> Result<(), FormError> {
        self.form.move_item(&self.path, from, to)
    }

    /// Remove the record at `index`.
    pub fn remove(&self, index: usize) -> Result<Value, FormError> {
        self.form.remove(&self.path, index)
    }

    /// Tags of every record, in order. Subscribes to the array's shape and
    /// to each tag.
    fn watch_tags(&self) -> Vec<Option<String>> {
        (0..self.count())
            .map(|index| {
                let tag = self.form.watch(&self.block_path(index).key(&self.template_key));
                tag.as_str().map(str::to_string)
            })
            .collect()
    }
}

impl fmt::Debug for BlocksActions {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("BlocksActions")
            .field("path", &self.path)
            .field("registry", &self.registry)
            .finish()
    }
}

fn record_tag(record: &Value, template_key: &str) -> Option<String> {
    record
        .get(template_key)
        .and_then(Value::as_str)
        .map(str::to_string)
}

// =============================================================================
// Collection
// =============================================================================

/// Mount the block collection stored at `name`.
///
/// Fails only if `name` is not a valid path. A missing field renders as an
/// empty collection; the first insert creates it.
pub fn inline_blocks(
    ctx: &InlineContext,
    name: &str,
    registry: Rc<BlockRegistry>,
) -> Result<Cleanup, FormError> {
    let path = ctx.resolve(name)?;
    let actions = BlocksActions::new(
        ctx.form().clone(),
        path.clone(),
        registry,
        &ctx.session().options().template_key,
    );
    let child_ctx = ctx.with_blocks(actions.clone());

    Ok(container(ContainerProps {
        kind: ComponentType::Collection,
        path: Some(path.to_string()),
        children: Some(Box::new(move || {
            each_indexed(
                move || actions.watch_tags(),
                move |index, _tag| match inline_block(&child_ctx, index) {
                    Ok(cleanup) => cleanup,
                    Err(err) => {
                        error!(index, %err, "block failed to render");
                        noop()
                    }
                },
            )
        })),
        ..Default::default()
    }))
}

// =============================================================================
// Block Instance
// =============================================================================

/// Mount the block at `index` of the enclosing collection.
///
/// Dispatches on the record's tag. Unregistered (or missing) tags render
/// nothing. The component gets a child context whose namespace is the
/// block's own path.
pub fn inline_block(ctx: &InlineContext, index: usize) -> Result<Cleanup, FormError> {
    let actions = ctx
        .blocks()
        .ok_or(FormError::OutsideCollection("inline_block"))?;
    let path = actions.block_path(index);
    let tag = actions.tag_at(index);

    let Some(block) = tag.as_deref().and_then(|tag| actions.registry().get(tag)) else {
        if ctx.session().options().warn_unknown_blocks {
            warn!(%path, tag = ?tag, "unrecognized block type");
        }
        return Ok(noop());
    };

    let index_node = allocate_index(None);
    core::set_component_type(index_node, ComponentType::Block);
    if let Some(parent) = get_current_parent_index() {
        core::set_parent_index(index_node, Some(parent));
    }
    core::set_field_path(index_node, Some(path.to_string()));
    core::set_label(index_node, Some(block.template.label.clone()));

    let block_ctx = ctx.with_block(BlockScope {
        path: path.clone(),
        index,
        template: block.template.clone(),
    });
    let form = ctx.form().clone();
    let data_path = path.clone();
    let props = BlockProps {
        index,
        path,
        data: Rc::new(move || form.watch(&data_path)),
    };

    let component = block.component.clone();
    match with_parent(index_node, || component(&block_ctx, props)) {
        Ok(children) => Ok(Box::new(move || {
            children();
            release_index(index_node);
        })),
        Err(err) => {
            release_index(index_node);
            Err(err)
        }
    }
}
