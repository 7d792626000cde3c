//! Interaction Arrays - How the host drives nodes.
//!
//! - input handlers: Editor nodes accept new values, focus and blur
//! - actions: Controls and Dialog nodes expose labelled triggers
//!   (`"Remove"`, `"Up"`, `"Add Hero"`, ...), each enabled or disabled
//!
//! Dispatch clones the handler out of the table before calling it, so a
//! handler may freely mount, release or rebind nodes.

use std::cell::RefCell;
use std::collections::HashMap;
use std::rc::Rc;

use serde_json::Value;

// =============================================================================
// Types
// =============================================================================

/// Handlers attached to an Editor node.
#[derive(Clone)]
pub struct InputHandlers {
    pub on_change: Rc<dyn Fn(Value)>,
    pub on_focus: Option<Rc<dyn Fn()>>,
    pub on_blur: Option<Rc<dyn Fn()>>,
}

/// A labelled trigger on a node.
#[derive(Clone)]
pub struct NodeAction {
    pub label: String,
    pub enabled: bool,
    pub handler: Rc<dyn Fn()>,
}

impl NodeAction {
    pub fn new(label: impl Into<String>, handler: impl Fn() + 'static) -> Self {
        Self {
            label: label.into(),
            enabled: true,
            handler: Rc::new(handler),
        }
    }

    /// Same action, enabled only when `enabled` is true.
    pub fn enabled_if(mut self, enabled: bool) -> Self {
        self.enabled = enabled;
        self
    }
}

// =============================================================================
// Tables
// =============================================================================

thread_local! {
    static INPUT_HANDLERS: RefCell<HashMap<usize, InputHandlers>> = RefCell::new(HashMap::new());

    static ACTIONS: RefCell<HashMap<usize, Vec<NodeAction>>> = RefCell::new(HashMap::new());
}

/// Clear values at index.
pub fn clear_at_index(index: usize) {
    INPUT_HANDLERS.with(|map| map.borrow_mut().remove(&index));
    ACTIONS.with(|map| map.borrow_mut().remove(&index));
}

/// Reset all tables.
pub fn reset() {
    INPUT_HANDLERS.with(|map| map.borrow_mut().clear());
    ACTIONS.with(|map| map.borrow_mut().clear());
}

// =============================================================================
// Input
// =============================================================================

/// Attach input handlers to the node at index.
pub fn set_input_handlers(index: usize, handlers: InputHandlers) {
    INPUT_HANDLERS.with(|map| map.borrow_mut().insert(index, handlers));
}

/// Does the node accept input?
pub fn has_input(index: usize) -> bool {
    INPUT_HANDLERS.with(|map| map.borrow().contains_key(&index))
}

fn input_handlers(index: usize) -> Option<InputHandlers> {
    INPUT_HANDLERS.with(|map| map.borrow().get(&index).cloned())
}

/// Feed a new value to the node at index. Returns false if it takes no input.
pub fn dispatch_input(index: usize, value: Value) -> bool {
    let Some(handlers) = input_handlers(index) else {
        return false;
    };
    (handlers.on_change)(value);
    true
}

/// Focus the node at index. Returns false if it takes no input.
pub fn dispatch_focus(index: usize) -> bool {
    let Some(handlers) = input_handlers(index) else {
        return false;
    };
    if let Some(on_focus) = handlers.on_focus {
        on_focus();
    }
    true
}

/// Blur the node at index. Returns false if it takes no input.
pub fn dispatch_blur(index: usize) -> bool {
    let Some(handlers) = input_handlers(index) else {
        return false;
    };
    if let Some(on_blur) = handlers.on_blur {
        on_blur();
    }
    true
}

// =============================================================================
// Actions
// =============================================================================

/// Replace the actions of the node at index.
pub fn set_actions(index: usize, actions: Vec<NodeAction>) {
    ACTIONS.with(|map| map.borrow_mut().insert(index, actions));
}

/// Labels of the node's actions with their enabled state, in order.
pub fn get_actions(index: usize) -> Vec<(String, bool)> {
    ACTIONS.with(|map| {
        map.borrow()
            .get(&index)
            .map(|actions| {
                actions
                    .iter()
                    .map(|action| (action.label.clone(), action.enabled))
                    .collect()
            })
            .unwrap_or_default()
    })
}

/// Is the labelled action present and enabled?
pub fn is_action_enabled(index: usize, label: &str) -> bool {
    find_action(index, label).is_some_and(|action| action.enabled)
}

fn find_action(index: usize, label: &str) -> Option<NodeAction> {
    ACTIONS.with(|map| {
        map.borrow()
            .get(&index)
            .and_then(|actions| actions.iter().find(|a| a.label == label).cloned())
    })
}

/// Fire the labelled action. Disabled or missing actions do nothing and
/// return false.
pub fn trigger_action(index: usize, label: &str) -> bool {
    match find_action(index, label) {
        Some(action) if action.enabled => {
            (action.handler)();
            true
        }
        _ => false,
    }
}
