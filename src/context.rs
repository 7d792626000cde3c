//! Inline context - the capability bundle threaded down the render tree.
//!
//! Every inline component takes an [`InlineContext`]. It carries the session
//! (mode, form, options), the namespace of the enclosing block if any, and the
//! mutators of the enclosing collection if any. Components that establish a
//! new scope hand their children a derived copy; nothing is global.

use std::rc::Rc;

use crate::blocks::BlockTemplate;
use crate::error::FormError;
use crate::form::{FieldPath, Form};
use crate::primitives::BlocksActions;
use crate::session::InlineForm;
use crate::types::InlineStatus;

/// Namespace established by a mounted block.
#[derive(Debug, Clone)]
pub struct BlockScope {
    /// Absolute path of the block record (`blocks.2`).
    pub path: FieldPath,
    /// Position in its collection at mount time.
    pub index: usize,
    /// The instance's own template.
    pub template: Rc<BlockTemplate>,
}

/// Ambient state visible to a subtree.
#[derive(Clone, Debug)]
pub struct InlineContext {
    session: InlineForm,
    block: Option<BlockScope>,
    blocks: Option<BlocksActions>,
}

impl InlineContext {
    /// Root context of a session.
    pub fn new(session: InlineForm) -> InlineContext {
        InlineContext {
            session,
            block: None,
            blocks: None,
        }
    }

    pub fn session(&self) -> &InlineForm {
        &self.session
    }

    pub fn form(&self) -> &Form {
        self.session.form()
    }

    /// Current mode (subscribing when read inside an effect).
    pub fn status(&self) -> InlineStatus {
        self.session.status()
    }

    pub fn is_active(&self) -> bool {
        self.status().is_active()
    }

    pub fn block(&self) -> Option<&BlockScope> {
        self.block.as_ref()
    }

    pub fn blocks(&self) -> Option<&BlocksActions> {
        self.blocks.as_ref()
    }

    /// Absolute path of a field declared here as `name`.
    ///
    /// Inside a block the name is relative to the block record.
    pub fn resolve(&self, name: &str) -> Result<FieldPath, FormError> {
        match &self.block {
            Some(scope) => scope.path.join(name),
            None => FieldPath::parse(name),
        }
    }

    /// Child context inside a block.
    pub fn with_block(&self, scope: BlockScope) -> InlineContext {
        InlineContext {
            block: Some(scope),
            ..self.clone()
        }
    }

    /// Child context inside a collection.
    pub fn with_blocks(&self, actions: BlocksActions) -> InlineContext {
        InlineContext {
            blocks: Some(actions),
            ..self.clone()
        }
    }
}
