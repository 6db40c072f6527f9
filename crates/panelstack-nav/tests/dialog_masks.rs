//! Dialog mask sharing, placement, and teardown.

mod common;

use common::{Harness, entries, logged, logged_dialog, new_log};
use panelstack_core::Rgba;
use panelstack_nav::{Layer, Panel, PanelState, StackConfig};

fn panel_layer(panel: &Panel) -> Layer {
    Layer::Panel(panel.id())
}

// ============================================================================
// Sharing
// ============================================================================

#[test]
fn consecutive_dialogs_share_one_mask() {
    let mut h = Harness::new();
    let root = Panel::screen("Root");
    let d1 = Panel::dialog("D1");
    let d2 = Panel::dialog("D2");
    let d3 = Panel::dialog("D3");
    h.push_now(root.clone(), false);
    h.push_now(d1.clone(), false);
    h.push_now(d2.clone(), false);
    h.push_now(d3.clone(), false);

    let masks = h.stack.masks();
    assert_eq!(masks.len(), 1);
    let mask = &masks[0];
    assert_eq!(mask.owner(), Some(d1.id()));
    assert_eq!(mask.top_holder(), Some(d3.id()));
    assert_eq!(mask.holders(), vec![d1.id(), d2.id(), d3.id()]);
    assert_eq!(d2.mask().as_ref(), Some(mask));
    assert!(root.mask().is_none());

    assert_eq!(
        h.stack.layers(),
        vec![
            panel_layer(&root),
            panel_layer(&d1),
            panel_layer(&d2),
            Layer::Mask(mask.id()),
            panel_layer(&d3),
        ]
    );
    assert_eq!(h.driver.played_count("mask_enter"), 1);
}

#[test]
fn mask_uses_configured_color() {
    let color = Rgba::new(0.1, 0.2, 0.3, 0.8);
    let mut h = Harness::with_config(StackConfig::default().mask_color(color));
    let d = Panel::dialog("D");
    h.push_now(d.clone(), true);
    assert_eq!(d.mask().map(|m| m.color()), Some(color));
}

#[test]
fn dialog_over_screen_run_gets_new_mask() {
    let mut h = Harness::new();
    let d1 = Panel::dialog("D1");
    let s = Panel::screen("S");
    let d2 = Panel::dialog("D2");
    h.push_now(d1.clone(), true);
    h.push_now(s, true);
    h.push_now(d2.clone(), true);

    let masks = h.stack.masks();
    assert_eq!(masks.len(), 2);
    assert_ne!(d1.mask(), d2.mask());
    assert_eq!(h.driver.played_count("mask_enter"), 2);
}

// ============================================================================
// Teardown
// ============================================================================

#[test]
fn popping_dialogs_moves_mask_down_then_destroys_it() {
    let mut h = Harness::new();
    let root = Panel::screen("Root");
    let d1 = Panel::dialog("D1");
    let d2 = Panel::dialog("D2");
    let d3 = Panel::dialog("D3");
    for panel in [&root, &d1, &d2, &d3] {
        h.push_now(panel.clone(), false);
    }
    let mask = d1.mask().expect("dialog has a mask");

    let popped = h.spawn(h.stack.pop(2, false));
    h.settle();
    assert_eq!(popped.take(), Some(Ok(())));
    assert_eq!(mask.holders(), vec![d1.id()]);
    assert_eq!(
        h.stack.layers(),
        vec![
            panel_layer(&root),
            Layer::Mask(mask.id()),
            panel_layer(&d1)
        ]
    );
    assert!(d3.mask().is_none());
    assert!(!mask.is_destroyed());

    let last = h.spawn(h.stack.pop(1, false));
    h.run();
    assert_eq!(h.driver.pending(), 2, "dialog exit and mask exit");
    assert!(
        h.stack.layers().contains(&Layer::Mask(mask.id())),
        "mask stays until its exit animation settles"
    );
    assert!(!last.is_done());

    h.settle();
    assert_eq!(last.take(), Some(Ok(())));
    assert!(mask.is_destroyed());
    assert!(!mask.is_visible());
    assert_eq!(h.stack.layers(), vec![panel_layer(&root)]);
    assert!(h.stack.masks().is_empty());
    assert_eq!(h.driver.played_count("mask_exit"), 1);
}

#[test]
fn removing_a_middle_dialog_keeps_mask_under_top() {
    let mut h = Harness::new();
    let root = Panel::screen("Root");
    let d1 = Panel::dialog("D1");
    let d2 = Panel::dialog("D2");
    let d3 = Panel::dialog("D3");
    for panel in [&root, &d1, &d2, &d3] {
        h.push_now(panel.clone(), false);
    }
    let mask = d3.mask().expect("dialog has a mask");

    let done = h.spawn(h.stack.remove(1, 1, false));
    h.settle();
    assert_eq!(done.take(), Some(Ok(())));

    assert_eq!(mask.holders(), vec![d1.id(), d3.id()]);
    assert_eq!(
        h.stack.layers(),
        vec![
            panel_layer(&root),
            panel_layer(&d1),
            Layer::Mask(mask.id()),
            panel_layer(&d3),
        ]
    );
    assert_eq!(h.driver.played_count("mask_exit"), 0);
}

#[test]
fn removing_the_screen_between_dialogs_merges_their_masks() {
    let mut h = Harness::new();
    let base = Panel::screen("Base");
    let d1 = Panel::dialog("D1");
    let s = Panel::screen("S");
    let d2 = Panel::dialog("D2");
    for panel in [&base, &d1, &s, &d2] {
        h.push_now(panel.clone(), false);
    }
    let lower = d1.mask().expect("dialog has a mask");
    let upper = d2.mask().expect("dialog has a mask");
    assert_ne!(lower, upper);

    let done = h.spawn(h.stack.remove(1, 1, false));
    h.settle();
    assert_eq!(done.take(), Some(Ok(())));

    assert_eq!(h.stack.masks(), vec![lower.clone()]);
    assert_eq!(d2.mask(), Some(lower.clone()));
    assert_eq!(lower.holders(), vec![d1.id(), d2.id()]);
    assert!(upper.is_destroyed());
    assert_eq!(
        h.stack.layers(),
        vec![
            panel_layer(&base),
            panel_layer(&d1),
            Layer::Mask(lower.id()),
            panel_layer(&d2),
        ]
    );

    let popped = h.spawn(h.stack.pop(1, false));
    h.settle();
    assert_eq!(popped.take(), Some(Ok(())));
    assert_eq!(lower.holders(), vec![d1.id()]);
    assert_eq!(
        h.stack.layers(),
        vec![panel_layer(&base), Layer::Mask(lower.id()), panel_layer(&d1)]
    );
}

#[test]
fn replacing_a_dialog_swaps_masks() {
    let mut h = Harness::new();
    let log = new_log();
    let root = logged("Root", &log);
    let d1 = logged_dialog("D1", &log);
    let d2 = logged_dialog("D2", &log);
    h.push_now(root.clone(), false);
    h.push_now(d1.clone(), false);
    let old = d1.mask().expect("dialog has a mask");
    log.borrow_mut().clear();

    let done = h.spawn(h.stack.replace(d2.clone(), false));
    h.settle();
    assert_eq!(done.take(), Some(Ok(())));

    let new = d2.mask().expect("replacement has a mask");
    assert_ne!(old, new);
    assert!(old.is_destroyed());
    assert_eq!(entries(&log), vec!["D1:exit", "D2:enter"]);
    assert_eq!(
        h.stack.layers(),
        vec![panel_layer(&root), Layer::Mask(new.id()), panel_layer(&d2)]
    );
}

// ============================================================================
// Taps
// ============================================================================

#[test]
fn tapping_mask_closes_top_dialog() {
    let mut h = Harness::new();
    let root = Panel::screen("Root");
    let d = Panel::dialog("D");
    h.push_now(root.clone(), true);
    h.push_now(d.clone(), true);
    let mask = d.mask().expect("dialog has a mask");

    let closing = h.stack.tap_mask(mask.id()).expect("tap accepted");
    let done = h.spawn(closing);
    h.settle();
    assert_eq!(done.take(), Some(Ok(())));
    assert_eq!(h.stack.top(), Some(root));
    assert!(mask.is_destroyed());

    assert!(h.stack.tap_mask(mask.id()).is_none(), "stale mask");
}

#[test]
fn mask_tap_closes_its_dialog_even_behind_a_queued_push() {
    let mut h = Harness::new();
    let root = Panel::screen("Root");
    let d = Panel::dialog("D");
    let s = Panel::screen("S");
    h.push_now(root.clone(), true);
    h.push_now(d.clone(), true);
    let mask = d.mask().expect("dialog has a mask");

    let pushing = h.spawn(h.stack.push(s.clone(), true));
    h.run();
    assert_eq!(h.stack.top(), Some(d.clone()), "S is still entering");

    let closing = h.stack.tap_mask(mask.id()).expect("tap accepted");
    let closed = h.spawn(closing);
    h.settle();
    assert_eq!(pushing.take(), Some(Ok(())));
    assert_eq!(closed.take(), Some(Ok(())));

    assert_eq!(h.stack.panels(), vec![root.clone(), s.clone()]);
    assert_eq!(d.state(), PanelState::Destroyed);
    assert_eq!(s.state(), PanelState::Active);
    assert!(mask.is_destroyed());
}

#[test]
fn tapping_mask_under_a_screen_is_ignored() {
    let mut h = Harness::new();
    let d = Panel::dialog("D");
    h.push_now(d.clone(), true);
    h.push_now(Panel::screen("S"), true);
    let mask = d.mask().expect("dialog has a mask");
    assert!(h.stack.tap_mask(mask.id()).is_none());
    assert_eq!(h.stack.depth(), 2);
}

#[test]
fn mask_taps_can_be_disabled() {
    let mut h = Harness::with_config(StackConfig::default().close_dialog_on_mask_tap(false));
    let d = Panel::dialog("D");
    h.push_now(d.clone(), true);
    let mask = d.mask().expect("dialog has a mask");
    assert!(h.stack.tap_mask(mask.id()).is_none());
}

// ============================================================================
// Visibility coupling
// ============================================================================

#[test]
fn dialog_activation_drives_mask_and_panel_beneath() {
    let mut h = Harness::new();
    let root = Panel::screen("Root");
    let d = Panel::dialog("D");
    h.push_now(root.clone(), false);
    h.push_now(d.clone(), false);
    let mask = d.mask().expect("dialog has a mask");
    assert!(root.is_active());

    d.set_active(false);
    assert!(!mask.is_visible());
    assert!(!root.is_active());

    d.set_active(true);
    assert!(mask.is_visible());
    assert!(root.is_active());
}

#[test]
fn coupling_can_be_disabled() {
    let mut h = Harness::with_config(StackConfig::default().couple_dialog_visibility(false));
    let root = Panel::screen("Root");
    let d = Panel::dialog("D");
    h.push_now(root.clone(), false);
    h.push_now(d.clone(), false);
    let mask = d.mask().expect("dialog has a mask");

    d.set_active(false);
    assert!(mask.is_visible());
    assert!(root.is_active());
}

#[test]
fn screens_do_not_couple() {
    let mut h = Harness::new();
    let root = Panel::screen("Root");
    let s = Panel::screen("S");
    h.push_now(root.clone(), false);
    h.push_now(s.clone(), false);
    s.set_active(false);
    assert!(root.is_active());
}
