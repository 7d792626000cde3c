//! Control Flow Primitives - Conditional and positional list rendering.
//!
//! This module provides control flow primitives for dynamic content:
//! - [`show`] - Conditional rendering based on reactive conditions
//! - [`each_indexed`] - List rendering reconciled by position
//!
//! # Pattern: EffectScope-based Cleanup
//!
//! All control flow primitives use spark-signals' EffectScope for cleanup:
//! 1. Create a detached EffectScope; only the returned Cleanup stops it
//! 2. Run rendering logic inside `scope.run()`
//! 3. Register cleanup with `on_scope_dispose()`
//! 4. Return `Box::new(move || scope.stop())` as the Cleanup
//!
//! # Pattern: Root-owned Renders
//!
//! An effect destroys the effects it created on every re-run. Anything
//! rendered from inside an effect body therefore goes through
//! [`mount_in_root`]: the render runs in its own root effect, which the
//! enclosing effect does not destroy, and which never re-runs itself. Reads
//! made while rendering subscribe nothing. The render's effects live until
//! its cleanup runs.
//!
//! # Pattern: Parent Context Restoration
//!
//! Both primitives capture the parent index at creation time and restore it
//! via `push_parent_context()` before rendering, so nodes created on a later
//! re-run still hang under the right parent.
//!
//! # Component Lifecycle
//!
//! ## show()
//! - When condition becomes true: `then_fn` is called, component created
//! - When condition becomes false: previous cleanup runs, component destroyed
//! - If `else_fn` provided: it renders when condition is false
//! - On show() cleanup: current branch cleaned up, scope stopped
//!
//! ## each_indexed()
//! - Slots are addressed by position only (no keys, no identity)
//! - Same item at the same position: slot kept, nothing re-rendered
//! - Different item at a position: old slot cleaned up, new one rendered
//! - Surplus slots (list shrank): cleaned up
//! - On each_indexed() cleanup: all slots cleaned up, scope stopped

use std::cell::{Cell, RefCell};
use std::rc::Rc;

use spark_signals::{effect, effect_root, effect_scope, on_scope_dispose};

use crate::engine::{get_current_parent_index, pop_parent_context, push_parent_context};
use crate::primitives::Cleanup;

/// Conditionally render components based on a reactive condition.
///
/// Creates and destroys components when the condition changes. The condition
/// getter establishes a reactive dependency, so the surface updates itself.
///
/// # Arguments
///
/// * `condition` - Getter that returns boolean (creates reactive dependency)
/// * `then_fn` - Function to render when condition is true (returns cleanup)
/// * `else_fn` - Optional function to render when condition is false
///
/// # Returns
///
/// A cleanup function that destroys the current branch and stops tracking.
///
/// # Example
///
/// ```ignore
/// let cleanup = show(
///     move || session.is_active(),
///     || editor(props()),
///     Some(|| text(TextProps::from("read only"))),
/// );
/// ```
pub fn show<ThenF, ElseF, ThenR, ElseR>(
    condition: impl Fn() -> bool + 'static,
    then_fn: ThenF,
    else_fn: Option<ElseF>,
) -> Cleanup
where
    ThenF: Fn() -> ThenR + 'static,
    ElseF: Fn() -> ElseR + 'static,
    ThenR: Into<Cleanup> + 'static,
    ElseR: Into<Cleanup> + 'static,
{
    // Capture parent index at creation time
    let parent_index = get_current_parent_index();
    let then_fn = Rc::new(then_fn);
    let else_fn = else_fn.map(Rc::new);

    // Storage for current cleanup and condition state
    let cleanup: Rc<RefCell<Option<Cleanup>>> = Rc::new(RefCell::new(None));
    let was_true: Rc<Cell<Option<bool>>> = Rc::new(Cell::new(None));

    // Create scope for cleanup management
    let scope = effect_scope(true);

    let cleanup_for_update = cleanup.clone();
    let cleanup_for_dispose = cleanup.clone();

    // Update function - runs when condition changes
    let update = move |new_condition: bool| {
        let previous = was_true.get();

        // Skip if condition unchanged
        if previous == Some(new_condition) {
            return;
        }
        was_true.set(Some(new_condition));

        // Cleanup previous branch
        let previous_cleanup = cleanup_for_update.borrow_mut().take();
        if let Some(prev_cleanup) = previous_cleanup {
            prev_cleanup();
        }

        // Render new branch with correct parent context
        if let Some(parent) = parent_index {
            push_parent_context(parent);
        }

        let new_cleanup = if new_condition {
            let then_fn = then_fn.clone();
            Some(mount_in_root(move || then_fn()))
        } else {
            else_fn.clone().map(|else_fn| mount_in_root(move || else_fn()))
        };

        if parent_index.is_some() {
            pop_parent_context();
        }

        *cleanup_for_update.borrow_mut() = new_cleanup;
    };

    scope.run(move || {
        // Initial render happens on first effect run; the effect belongs to
        // the scope and stops with it.
        let _effect_cleanup = effect(move || {
            let current = condition();
            update(current);
        });

        on_scope_dispose(move || {
            let current = cleanup_for_dispose.borrow_mut().take();
            if let Some(cleanup_fn) = current {
                cleanup_fn();
            }
        });
    });

    Box::new(move || {
        scope.stop();
    })
}

// =============================================================================
// each_indexed() - Positional list rendering
// =============================================================================

/// Render one slot per item, reconciled by position.
///
/// The items getter is re-read on every change. Each slot remembers the item
/// it rendered; a slot is re-rendered only when the item at its position is
/// different. The render function gets the position and the item.
///
/// # Example
///
/// ```ignore
/// let cleanup = each_indexed(
///     move || tags_of(&form),
///     |index, tag| render_block(index, tag),
/// );
/// ```
pub fn each_indexed<T, RenderF, R>(
    items_getter: impl Fn() -> Vec<T> + 'static,
    render_fn: RenderF,
) -> Cleanup
where
    T: Clone + PartialEq + 'static,
    RenderF: Fn(usize, &T) -> R + 'static,
    R: Into<Cleanup> + 'static,
{
    let parent_index = get_current_parent_index();
    let scope = effect_scope(true);
    let render_fn = Rc::new(render_fn);
    let mount = move |index: usize, item: &T| {
        let render_fn = render_fn.clone();
        let item = item.clone();
        mount_in_root(move || render_fn(index, &item))
    };

    // Position -> (rendered item, cleanup)
    let slots: Rc<RefCell<Vec<(T, Cleanup)>>> = Rc::new(RefCell::new(Vec::new()));
    let slots_effect = slots.clone();
    let slots_dispose = slots.clone();

    scope.run(move || {
        let _effect_cleanup = effect(move || {
            let items = items_getter();

            // Take the slots out so nothing is borrowed while rendering
            let previous = std::mem::take(&mut *slots_effect.borrow_mut());
            let mut previous = previous.into_iter();
            let mut next = Vec::with_capacity(items.len());

            if let Some(parent) = parent_index {
                push_parent_context(parent);
            }

            for (index, item) in items.iter().enumerate() {
                match previous.next() {
                    Some((rendered, cleanup)) if rendered == *item => {
                        next.push((rendered, cleanup));
                    }
                    Some((_, cleanup)) => {
                        cleanup();
                        next.push((item.clone(), mount(index, item)));
                    }
                    None => {
                        next.push((item.clone(), mount(index, item)));
                    }
                }
            }

            if parent_index.is_some() {
                pop_parent_context();
            }

            // List shrank
            for (_, cleanup) in previous.rev() {
                cleanup();
            }

            *slots_effect.borrow_mut() = next;
        });

        on_scope_dispose(move || {
            let remaining = std::mem::take(&mut *slots_dispose.borrow_mut());
            for (_, cleanup) in remaining.into_iter().rev() {
                cleanup();
            }
        });
    });

    Box::new(move || {
        scope.stop();
    })
}

// =============================================================================
// mount_in_root() - Renders that outlive their caller's re-runs
// =============================================================================

/// Run `render` now, inside a fresh root effect.
///
/// Effects created by the render belong to the root, not to whichever effect
/// is running, so a re-run of that effect leaves them alone. The returned
/// cleanup runs the render's own cleanup, then disposes the root.
pub(crate) fn mount_in_root<F, R>(render: F) -> Cleanup
where
    F: FnOnce() -> R + 'static,
    R: Into<Cleanup> + 'static,
{
    let rendered: Rc<RefCell<Option<Cleanup>>> = Rc::new(RefCell::new(None));
    let rendered_root = rendered.clone();

    let dispose = effect_root(move || {
        let cleanup = render().into();
        *rendered_root.borrow_mut() = Some(cleanup);
    });

    Box::new(move || {
        let cleanup = rendered.borrow_mut().take();
        if let Some(cleanup) = cleanup {
            cleanup();
        }
        dispose();
    })
}

// =============================================================================
// Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::engine::{
        allocate_index, get_allocated_count, get_current_parent_index, release_index,
        reset_registry,
    };
    use spark_signals::{effect, signal, Signal};

    /// Helper to create a test component that tracks allocation.
    fn create_test_component() -> Cleanup {
        let index = allocate_index(None);
        Box::new(move || release_index(index))
    }

    // =========================================================================
    // show() tests
    // =========================================================================

    #[test]
    fn test_show_renders_then_when_true() {
        reset_registry();

        let condition = signal(true);
        let cond_clone = condition.clone();

        let _cleanup = show(
            move || cond_clone.get(),
            create_test_component,
            None::<fn() -> Cleanup>,
        );

        assert_eq!(get_allocated_count(), 1, "then branch should create one component");
    }

    #[test]
    fn test_show_switches_branches() {
        reset_registry();

        let condition = signal(false);
        let cond_clone = condition.clone();
        let then_runs = Rc::new(Cell::new(0));
        let else_runs = Rc::new(Cell::new(0));
        let then_clone = then_runs.clone();
        let else_clone = else_runs.clone();

        let cleanup = show(
            move || cond_clone.get(),
            move || {
                then_clone.set(then_clone.get() + 1);
                create_test_component()
            },
            Some(move || {
                else_clone.set(else_clone.get() + 1);
                create_test_component()
            }),
        );

        assert_eq!((then_runs.get(), else_runs.get()), (0, 1));
        assert_eq!(get_allocated_count(), 1);

        condition.set(true);
        assert_eq!((then_runs.get(), else_runs.get()), (1, 1));
        assert_eq!(get_allocated_count(), 1, "else branch should be destroyed");

        cleanup();
        assert_eq!(get_allocated_count(), 0, "cleanup should destroy the branch");
    }

    #[test]
    fn test_show_no_change_no_recreate() {
        reset_registry();

        let condition = signal(true);
        let cond_clone = condition.clone();

        let call_count = Rc::new(Cell::new(0));
        let call_count_clone = call_count.clone();

        let _cleanup = show(
            move || cond_clone.get(),
            move || {
                call_count_clone.set(call_count_clone.get() + 1);
                create_test_component()
            },
            None::<fn() -> Cleanup>,
        );

        assert_eq!(call_count.get(), 1);

        // Set to same value - should NOT re-render
        condition.set(true);
        assert_eq!(call_count.get(), 1, "setting same value should not recreate component");

        condition.set(false);
        condition.set(true);
        assert_eq!(call_count.get(), 2, "toggling should recreate component");
    }

    #[test]
    fn test_show_restores_parent_context() {
        reset_registry();

        let parent_index = allocate_index(Some("parent"));
        push_parent_context(parent_index);

        let condition = signal(false);
        let cond_clone = condition.clone();
        let seen_parent: Rc<Cell<Option<usize>>> = Rc::new(Cell::new(None));
        let seen_clone = seen_parent.clone();

        let _cleanup = show(
            move || cond_clone.get(),
            move || {
                seen_clone.set(get_current_parent_index());
                create_test_component()
            },
            None::<fn() -> Cleanup>,
        );

        pop_parent_context();

        // Rendered later, outside the original stack
        condition.set(true);
        assert_eq!(
            seen_parent.get(),
            Some(parent_index),
            "component created inside show() should have correct parent"
        );
    }

    // =========================================================================
    // each_indexed() tests
    // =========================================================================

    #[test]
    fn test_each_indexed_renders_all_items() {
        reset_registry();

        let items = signal(vec!["a", "b", "c"]);
        let items_clone = items.clone();

        let _cleanup = each_indexed(move || items_clone.get(), |_, _| create_test_component());

        assert_eq!(get_allocated_count(), 3, "one component per item");
    }

    #[test]
    fn test_each_indexed_passes_positions() {
        reset_registry();

        let items = signal(vec!["a", "b"]);
        let items_clone = items.clone();
        let seen = Rc::new(RefCell::new(Vec::new()));
        let seen_clone = seen.clone();

        let _cleanup = each_indexed(move || items_clone.get(), move |index, item: &&str| {
            seen_clone.borrow_mut().push(format!("{}:{}", index, item));
            create_test_component()
        });

        items.set(vec!["a", "b", "c"]);
        assert_eq!(*seen.borrow(), vec!["0:a", "1:b", "2:c"]);
    }

    #[test]
    fn test_each_indexed_keeps_unchanged_positions() {
        reset_registry();

        let items = signal(vec!["hero", "cta"]);
        let items_clone = items.clone();
        let renders = Rc::new(Cell::new(0));
        let renders_clone = renders.clone();

        let _cleanup = each_indexed(move || items_clone.get(), move |_, _| {
            renders_clone.set(renders_clone.get() + 1);
            create_test_component()
        });
        assert_eq!(renders.get(), 2);

        // Position 1 changes, position 0 stays
        items.set(vec!["hero", "hero"]);
        assert_eq!(renders.get(), 3, "only the changed position re-renders");
        assert_eq!(get_allocated_count(), 2);

        // Same list again
        items.set(vec!["hero", "hero"]);
        assert_eq!(renders.get(), 3);
    }

    #[test]
    fn test_each_indexed_shrinks_and_grows() {
        reset_registry();

        let items = signal(vec![1, 2, 3]);
        let items_clone = items.clone();

        let _cleanup = each_indexed(move || items_clone.get(), |_, _| create_test_component());
        assert_eq!(get_allocated_count(), 3);

        items.set(vec![1]);
        assert_eq!(get_allocated_count(), 1, "surplus slots are destroyed");

        items.set(vec![1, 5, 6, 7]);
        assert_eq!(get_allocated_count(), 4);
    }

    #[test]
    fn test_each_indexed_cleanup_destroys_all() {
        reset_registry();

        let items = signal(vec!["a", "b", "c"]);
        let items_clone = items.clone();

        let cleanup = each_indexed(move || items_clone.get(), |_, _| create_test_component());
        assert_eq!(get_allocated_count(), 3);

        cleanup();
        assert_eq!(get_allocated_count(), 0, "cleanup should destroy all components");

        // No longer tracking
        items.set(vec!["x"]);
        assert_eq!(get_allocated_count(), 0);
    }

    // =========================================================================
    // Ownership across re-runs
    // =========================================================================

    /// A component with its own effect mirroring `source` into `seen`.
    fn create_watching_component(source: Signal<i32>, seen: Rc<Cell<i32>>) -> Cleanup {
        let index = allocate_index(None);
        let stop = effect(move || seen.set(source.get()));
        Box::new(move || {
            stop();
            release_index(index);
        })
    }

    #[test]
    fn test_kept_slot_effects_survive_list_rerun() {
        reset_registry();

        let items = signal(vec!["hero"]);
        let value = signal(1);
        let seen = Rc::new(Cell::new(0));

        let items_clone = items.clone();
        let (value_clone, seen_clone) = (value.clone(), seen.clone());
        let _cleanup = each_indexed(move || items_clone.get(), move |_, _| {
            create_watching_component(value_clone.clone(), seen_clone.clone())
        });
        assert_eq!(seen.get(), 1);

        // Append: position 0 is kept, the list effect re-ran
        items.set(vec!["hero", "cta"]);
        value.set(2);
        assert_eq!(seen.get(), 2, "the kept slot still follows its source");

        items.set(vec!["hero"]);
        value.set(3);
        assert_eq!(seen.get(), 3);
    }

    #[test]
    fn test_branch_effects_survive_condition_rerun() {
        reset_registry();

        let count = signal(1);
        let value = signal(1);
        let seen = Rc::new(Cell::new(0));

        let count_clone = count.clone();
        let (value_clone, seen_clone) = (value.clone(), seen.clone());
        let _cleanup = show(
            move || count_clone.get() > 0,
            move || create_watching_component(value_clone.clone(), seen_clone.clone()),
            None::<fn() -> Cleanup>,
        );

        // Condition re-evaluated, result unchanged
        count.set(2);
        value.set(5);
        assert_eq!(seen.get(), 5);
        assert_eq!(get_allocated_count(), 1);
    }

    #[test]
    fn test_render_reads_do_not_subscribe() {
        reset_registry();

        let items = signal(vec![1, 2]);
        let outside = signal(0);
        let renders = Rc::new(Cell::new(0));

        let items_clone = items.clone();
        let (outside_clone, renders_clone) = (outside.clone(), renders.clone());
        let _cleanup = each_indexed(move || items_clone.get(), move |_, _| {
            let _ = outside_clone.get();
            renders_clone.set(renders_clone.get() + 1);
            create_test_component()
        });
        assert_eq!(renders.get(), 2);

        outside.set(1);
        assert_eq!(renders.get(), 2, "only the items getter drives the list");
        assert_eq!(get_allocated_count(), 2);
    }

    #[test]
    fn test_shrink_releases_nested_renders() {
        reset_registry();

        let items = signal(vec!["a", "b", "c"]);
        let flag = signal(true);

        let items_clone = items.clone();
        let flag_clone = flag.clone();
        let _cleanup = each_indexed(move || items_clone.get(), move |_, _| {
            let outer = create_test_component();
            let flag = flag_clone.clone();
            let inner = show(move || flag.get(), create_test_component, None::<fn() -> Cleanup>);
            Box::new(move || {
                inner();
                outer();
            }) as Cleanup
        });
        assert_eq!(get_allocated_count(), 6);

        // Re-run the list, then shrink it
        items.set(vec!["a", "b", "c", "d"]);
        items.set(vec!["a"]);
        assert_eq!(get_allocated_count(), 2);

        // The surviving slot's nested show still reacts
        flag.set(false);
        assert_eq!(get_allocated_count(), 1);
        flag.set(true);
        assert_eq!(get_allocated_count(), 2);
    }
}
