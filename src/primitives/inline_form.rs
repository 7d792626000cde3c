//! Inline Form - Root of an editable region.
//!
//! Mounts a `Region` node for the session and renders the region's content
//! with the session's root [`InlineContext`].
//!
//! # Example
//!
//! ```ignore
//! let session = InlineForm::new(Form::from_file(JsonFile::load(root, "data/page.json")?));
//! let cleanup = inline_form(&session, |ctx| {
//!     let title = inline_text_field(ctx, "title")?;
//!     let blocks = inline_blocks(ctx, "blocks", registry.clone())?;
//!     Ok(fragment(vec![title, blocks]))
//! })?;
//!
//! session.activate(); // every field below switches to its editor
//! ```

use crate::context::InlineContext;
use crate::engine::arrays::core;
use crate::engine::{allocate_index, get_current_parent_index, release_index, with_parent};
use crate::error::FormError;
use crate::session::InlineForm;
use crate::types::ComponentType;
use super::types::Cleanup;

/// Mount an editable region for `session`.
///
/// An error from `children` unmounts the region and is returned unchanged.
pub fn inline_form<F>(session: &InlineForm, children: F) -> Result<Cleanup, FormError>
where
    F: FnOnce(&InlineContext) -> Result<Cleanup, FormError>,
{
    let index = allocate_index(None);
    core::set_component_type(index, ComponentType::Region);
    if let Some(parent) = get_current_parent_index() {
        core::set_parent_index(index, Some(parent));
    }
    core::set_label(index, session.form().id().map(str::to_string));

    let ctx = InlineContext::new(session.clone());
    let children_cleanup = match with_parent(index, || children(&ctx)) {
        Ok(cleanup) => cleanup,
        Err(err) => {
            release_index(index);
            return Err(err);
        }
    };

    Ok(Box::new(move || {
        children_cleanup();
        release_index(index);
    }))
}
