//! Property-based invariant tests for the navigation queue.
//!
//! 1. Requests submitted all at once end in the same stack as the same
//!    requests awaited one by one, and both match a plain list model
//! 2. Rejected requests never change the stack
//! 3. Every live dialog mask sits directly beneath its top holder
//! 4. Input is enabled again once the queue drains

mod common;

use common::{Harness, names};
use panelstack_nav::{Layer, NavError, NavFuture, Panel, UiStack};
use proptest::prelude::*;

// ── Strategies ──────────────────────────────────────────────────────────

#[derive(Debug, Clone)]
enum Op {
    Push { dialog: bool },
    Pop(usize),
    Replace { dialog: bool },
    Remove { offset: usize, count: usize },
}

fn op_strategy() -> impl Strategy<Value = Op> {
    prop_oneof![
        3 => any::<bool>().prop_map(|dialog| Op::Push { dialog }),
        2 => (0usize..4).prop_map(Op::Pop),
        1 => any::<bool>().prop_map(|dialog| Op::Replace { dialog }),
        1 => (0usize..3, 0usize..3).prop_map(|(offset, count)| Op::Remove { offset, count }),
    ]
}

fn make_panel(index: usize, dialog: bool) -> Panel {
    let name = format!("P{index}");
    if dialog {
        Panel::dialog(name)
    } else {
        Panel::screen(name)
    }
}

fn submit(stack: &UiStack, index: usize, op: &Op) -> NavFuture {
    match *op {
        Op::Push { dialog } => stack.push(make_panel(index, dialog), true),
        Op::Pop(count) => stack.pop(count, false),
        Op::Replace { dialog } => stack.replace(make_panel(index, dialog), true),
        Op::Remove { offset, count } => stack.remove(offset, count, false),
    }
}

/// Apply `op` to the list model. Returns whether the request is accepted.
fn apply_model(model: &mut Vec<String>, index: usize, op: &Op) -> bool {
    match *op {
        Op::Push { .. } => {
            model.push(format!("P{index}"));
            true
        }
        Op::Pop(count) => {
            if count == 0 || count > model.len() {
                return false;
            }
            model.truncate(model.len() - count);
            true
        }
        Op::Replace { .. } => {
            model.pop();
            model.push(format!("P{index}"));
            true
        }
        Op::Remove { offset, count } => {
            if count == 0 || offset + count > model.len() {
                return false;
            }
            let end = model.len() - offset;
            model.drain(end - count..end);
            true
        }
    }
}

fn assert_masks_below_top_holder(stack: &UiStack) -> Result<(), TestCaseError> {
    let layers = stack.layers();
    for mask in stack.masks() {
        prop_assert!(!mask.is_destroyed());
        let top = mask.top_holder();
        prop_assert!(top.is_some(), "live mask without holders");
        let above = layers
            .iter()
            .position(|l| *l == Layer::Mask(mask.id()))
            .and_then(|i| layers.get(i + 1));
        prop_assert_eq!(above.copied(), top.map(Layer::Panel));
    }
    let mask_layers = layers
        .iter()
        .filter(|l| matches!(l, Layer::Mask(_)))
        .count();
    prop_assert_eq!(mask_layers, stack.masks().len());
    for panel in stack.panels() {
        prop_assert_eq!(panel.is_dialog(), panel.mask().is_some());
    }
    Ok(())
}

// ═══════════════════════════════════════════════════════════════════════
// 1. Batched submission matches sequential submission and the model
// ═══════════════════════════════════════════════════════════════════════

proptest! {
    #[test]
    fn batched_requests_match_sequential(
        ops in prop::collection::vec(op_strategy(), 0..24),
    ) {
        let mut model = Vec::new();
        let expected: Vec<bool> = ops
            .iter()
            .enumerate()
            .map(|(i, op)| apply_model(&mut model, i, op))
            .collect();

        let mut sequential = Harness::new();
        let mut sequential_results = Vec::new();
        for (i, op) in ops.iter().enumerate() {
            let outcome = sequential.spawn(submit(&sequential.stack, i, op));
            sequential.settle();
            sequential_results.push(outcome.take());
        }

        let mut batched = Harness::new();
        let outcomes: Vec<_> = ops
            .iter()
            .enumerate()
            .map(|(i, op)| batched.spawn(submit(&batched.stack, i, op)))
            .collect();
        batched.settle();
        let batched_results: Vec<_> = outcomes.iter().map(|o| o.take()).collect();

        for (i, accepted) in expected.iter().enumerate() {
            let seq = sequential_results[i].clone().expect("sequential finished");
            let bat = batched_results[i].clone().expect("batched finished");
            prop_assert_eq!(seq.is_ok(), *accepted, "op {} {:?}", i, ops[i]);
            prop_assert_eq!(bat.is_ok(), *accepted, "op {} {:?}", i, ops[i]);
        }
        prop_assert_eq!(names(&sequential.stack), model.clone());
        prop_assert_eq!(names(&batched.stack), model);
        prop_assert!(batched.stack.is_interactable());
        prop_assert_eq!(batched.stack.queued_requests(), 0);
    }
}

// ═══════════════════════════════════════════════════════════════════════
// 2. Rejections leave the stack untouched
// ═══════════════════════════════════════════════════════════════════════

proptest! {
    #[test]
    fn rejected_requests_have_no_effect(
        depth in 0usize..5,
        extra in 1usize..4,
    ) {
        let mut h = Harness::new();
        for i in 0..depth {
            h.push_now(make_panel(i, false), true);
        }
        let before = names(&h.stack);

        let pop = h.spawn(h.stack.pop(depth + extra, false));
        let remove = h.spawn(h.stack.remove(depth, extra, false));
        h.settle();

        let is_pop_range = matches!(pop.take(), Some(Err(NavError::PopOutOfRange { .. })));
        let is_remove_range = matches!(
            remove.take(),
            Some(Err(NavError::RemoveOutOfRange { .. }))
        );
        prop_assert!(is_pop_range);
        prop_assert!(is_remove_range);
        prop_assert_eq!(names(&h.stack), before);
        prop_assert!(h.stack.is_interactable());
    }
}

// ═══════════════════════════════════════════════════════════════════════
// 3. Mask placement
// ═══════════════════════════════════════════════════════════════════════

proptest! {
    #[test]
    fn masks_stay_beneath_their_top_holder(
        ops in prop::collection::vec(op_strategy(), 0..24),
    ) {
        let mut h = Harness::new();
        for (i, op) in ops.iter().enumerate() {
            let outcome = h.spawn(submit(&h.stack, i, op));
            h.settle();
            let _ = outcome.take();
            assert_masks_below_top_holder(&h.stack)?;
        }
    }
}
