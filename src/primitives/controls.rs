//! Block Controls - Edit affordances around a mounted block.
//!
//! [`BlockControls`] is the controller: boundary flags, the add menu, move
//! and remove, and the settings field list, all derived from the block's
//! ambient scope. [`block_controls`] puts it on the surface:
//!
//! - inactive: only the block content is rendered
//! - active: a `Controls` node with the actions
//!   `Add <label>` (one per registered template), `Remove`, `Up`, `Down`,
//!   `Settings`, wrapping the content
//!
//! `Up` is disabled on the first block and `Down` on the last. `Settings`
//! opens a `Dialog` node holding editors for the instance's own template
//! fields; its `Cancel` action closes it.

use std::rc::Rc;

use serde_json::Value;
use spark_signals::{effect, signal, Signal};
use tracing::error;

use crate::blocks::{BlockTemplate, FieldSchema};
use crate::context::{BlockScope, InlineContext};
use crate::engine::arrays::interaction::{self, NodeAction};
use crate::engine::on_destroy;
use crate::error::FormError;
use crate::types::ComponentType;
use super::container::container_with_index;
use super::control_flow::show;
use super::inline_blocks::BlocksActions;
use super::types::{fragment, noop, Cleanup, ContainerProps};

// =============================================================================
// Controller
// =============================================================================

/// Mutations available to one mounted block.
#[derive(Clone, Debug)]
pub struct BlockControls {
    actions: BlocksActions,
    scope: BlockScope,
}

impl BlockControls {
    /// Controller for the block `ctx` is scoped to.
    pub fn from_context(ctx: &InlineContext) -> Result<BlockControls, FormError> {
        match (ctx.blocks(), ctx.block()) {
            (Some(actions), Some(scope)) => Ok(BlockControls {
                actions: actions.clone(),
                scope: scope.clone(),
            }),
            _ => Err(FormError::OutsideCollection("block_controls")),
        }
    }

    pub fn index(&self) -> usize {
        self.scope.index
    }

    /// Collection size. Subscribes when read inside an effect.
    pub fn count(&self) -> usize {
        self.actions.count()
    }

    pub fn is_first(&self) -> bool {
        self.index() == 0
    }

    pub fn is_last(&self) -> bool {
        self.count().checked_sub(1) == Some(self.index())
    }

    /// The instance's own template.
    pub fn template(&self) -> &BlockTemplate {
        &self.scope.template
    }

    /// Everything the add menu offers: the full registry.
    pub fn templates(&self) -> Vec<Rc<BlockTemplate>> {
        self.actions.registry().templates()
    }

    /// Insert a fresh `template` record right after this block.
    pub fn add_block(&self, template: &BlockTemplate) -> Result<(), FormError> {
        let record = template.instantiate(self.actions.template_key());
        self.actions.insert(self.index() + 1, record)
    }

    pub fn remove(&self) -> Result<Value, FormError> {
        self.actions.remove(self.index())
    }

    /// Swap with the previous block. `Ok(false)` on the first block.
    pub fn move_up(&self) -> Result<bool, FormError> {
        if self.is_first() {
            return Ok(false);
        }
        self.actions.move_item(self.index(), self.index() - 1)?;
        Ok(true)
    }

    /// Swap with the next block. `Ok(false)` on the last block.
    pub fn move_down(&self) -> Result<bool, FormError> {
        if self.index() + 1 >= self.count() {
            return Ok(false);
        }
        self.actions.move_item(self.index(), self.index() + 1)?;
        Ok(true)
    }

    /// Settings fields of this block, named under its path.
    pub fn settings_fields(&self) -> Vec<FieldSchema> {
        self.scope.template.settings_fields(&self.scope.path)
    }

    /// Surface actions, enabled against the current count.
    fn node_actions(&self, dialog: &SettingsDialog) -> Vec<NodeAction> {
        let mut actions: Vec<NodeAction> = self
            .templates()
            .into_iter()
            .map(|template| {
                let controls = self.clone();
                NodeAction::new(format!("Add {}", template.label), move || {
                    report(controls.add_block(&template));
                })
            })
            .collect();

        let controls = self.clone();
        actions.push(NodeAction::new("Remove", move || {
            report(controls.remove());
        }));

        let controls = self.clone();
        actions.push(
            NodeAction::new("Up", move || report(controls.move_up())).enabled_if(!self.is_first()),
        );

        let controls = self.clone();
        actions.push(
            NodeAction::new("Down", move || report(controls.move_down()))
                .enabled_if(!self.is_last()),
        );

        let dialog = dialog.clone();
        actions.push(NodeAction::new("Settings", move || dialog.toggle()));

        actions
    }
}

fn report<T>(result: Result<T, FormError>) {
    if let Err(err) = result {
        error!(%err, "block action failed");
    }
}

// =============================================================================
// Settings Dialog
// =============================================================================

/// Open/closed state of one block's settings dialog.
#[derive(Clone)]
pub struct SettingsDialog {
    open: Signal<bool>,
}

impl SettingsDialog {
    pub fn new() -> Self {
        Self { open: signal(false) }
    }

    pub fn is_open(&self) -> bool {
        self.open.get()
    }

    pub fn open(&self) {
        self.set(true);
    }

    pub fn close(&self) {
        self.set(false);
    }

    pub fn toggle(&self) {
        self.set(!self.open.get());
    }

    fn set(&self, open: bool) {
        if self.open.get() != open {
            self.open.set(open);
        }
    }
}

impl Default for SettingsDialog {
    fn default() -> Self {
        Self::new()
    }
}

// =============================================================================
// Surface
// =============================================================================

/// Wrap a block's content in its edit controls.
///
/// Must be called inside a block (from a registered block component).
pub fn block_controls<F>(ctx: &InlineContext, children: F) -> Result<Cleanup, FormError>
where
    F: Fn(&InlineContext) -> Cleanup + 'static,
{
    let controls = BlockControls::from_context(ctx)?;
    let children = Rc::new(children);
    let dialog = SettingsDialog::new();

    let session = ctx.session().clone();
    let active_ctx = ctx.clone();
    let inactive_ctx = ctx.clone();
    let inactive_children = children.clone();

    Ok(show(
        move || session.is_active(),
        move || {
            let children = children.clone();
            let ctx = active_ctx.clone();
            let dialog_state = dialog.clone();
            let dialog_controls = controls.clone();

            let (index, cleanup) = container_with_index(ContainerProps {
                kind: ComponentType::Controls,
                path: Some(controls.scope.path.to_string()),
                label: Some(controls.template().label.clone()),
                children: Some(Box::new(move || {
                    let dialog_cleanup = settings_dialog(&ctx, &dialog_controls, &dialog_state);
                    let content = children(&ctx);
                    fragment(vec![dialog_cleanup, content])
                })),
                ..Default::default()
            });

            let bound = controls.clone();
            let bound_dialog = dialog.clone();
            let stop = effect(move || {
                interaction::set_actions(index, bound.node_actions(&bound_dialog));
            });
            on_destroy(index, stop);

            cleanup
        },
        Some(move || inactive_children(&inactive_ctx)),
    ))
}

/// The settings overlay, mounted while `dialog` is open.
fn settings_dialog(ctx: &InlineContext, controls: &BlockControls, dialog: &SettingsDialog) -> Cleanup {
    let session = ctx.session().clone();
    let controls = controls.clone();
    let state = dialog.clone();

    show(
        {
            let dialog = dialog.clone();
            move || dialog.is_open()
        },
        move || {
            let builder = session.fields_builder();
            let form = session.form().clone();
            let fields = controls.settings_fields();

            let (index, cleanup) = container_with_index(ContainerProps {
                kind: ComponentType::Dialog,
                path: Some(controls.scope.path.to_string()),
                label: Some(controls.template().label.clone()),
                children: Some(Box::new(move || match builder.build(&form, &fields) {
                    Ok(cleanup) => cleanup,
                    Err(err) => {
                        error!(%err, "settings fields failed to render");
                        noop()
                    }
                })),
                ..Default::default()
            });

            let cancel = state.clone();
            interaction::set_actions(index, vec![NodeAction::new("Cancel", move || cancel.close())]);
            cleanup
        },
        None::<fn() -> Cleanup>,
    )
}
