// Copyright 2026 Phillip Cloud
// Licensed under the Apache License, Version 2.0

use shopdeck_app::{
    FilterLatch, InventoryFilterMode, InventoryView, OrderRecord, OrderView, PaymentStatus,
    ReceiveOutcome, Record, SelectionPhase, ViewCommand, ViewKind, Views, apply,
    low_stock_predicates, order_sync_predicates,
};
use shopdeck_testkit::CommerceFaker;
use time::macros::datetime;

fn names(orders: &[OrderRecord]) -> Vec<String> {
    orders.iter().map(|order| order.name.clone()).collect()
}

#[test]
fn derive_is_total_and_deterministic() {
    for (fully_paid, unpaid, expected) in [
        (true, false, PaymentStatus::Paid),
        (false, true, PaymentStatus::Unpaid),
        (true, true, PaymentStatus::PartiallyPaid),
        (false, false, PaymentStatus::PartiallyPaid),
    ] {
        assert_eq!(PaymentStatus::derive(fully_paid, unpaid), expected);
        assert_eq!(
            PaymentStatus::derive(fully_paid, unpaid),
            PaymentStatus::derive(fully_paid, unpaid)
        );
    }
}

#[test]
fn order_filter_is_idempotent() {
    let mut faker = CommerceFaker::new(21);
    let orders = faker.orders(60);
    let predicates = order_sync_predicates();

    let once = apply(&orders, &predicates);
    let twice = apply(&once, &predicates);
    assert_eq!(once, twice);
}

#[test]
fn low_stock_filter_is_idempotent() {
    let mut faker = CommerceFaker::new(22);
    let variants = faker.variants(60);
    let predicates = low_stock_predicates(&InventoryFilterMode::default());

    let once = apply(&variants, &predicates);
    assert_eq!(apply(&once, &predicates), once);
}

#[test]
fn filter_preserves_relative_order() {
    let mut faker = CommerceFaker::new(23);
    let orders = faker.orders(80);
    let kept = apply(&orders, &order_sync_predicates());

    let positions: Vec<usize> = kept
        .iter()
        .map(|order| {
            orders
                .iter()
                .position(|candidate| candidate.id == order.id)
                .unwrap_or(usize::MAX)
        })
        .collect();
    assert!(positions.windows(2).all(|pair| pair[0] < pair[1]));
    assert!(positions.iter().all(|position| *position != usize::MAX));
}

#[test]
fn low_stock_scenario_keeps_under_threshold_in_order() {
    let mut faker = CommerceFaker::new(24);
    let variants = vec![
        faker.variant_with_quantity(Some(10)),
        faker.variant_with_quantity(Some(60)),
        faker.variant_with_quantity(Some(0)),
    ];
    let expected = vec![variants[0].id.clone(), variants[2].id.clone()];

    let mut view = InventoryView::new(InventoryFilterMode::default());
    assert_eq!(view.receive(variants), ReceiveOutcome::Displayed(2));
    let shown: Vec<_> = view
        .records()
        .displayed()
        .iter()
        .map(|variant| variant.id().clone())
        .collect();
    assert_eq!(shown, expected);
}

#[test]
fn server_inventory_mode_shows_remote_result_unchanged() {
    let mut faker = CommerceFaker::new(25);
    let variants = faker.variants(6);
    let mut view = InventoryView::new(InventoryFilterMode::Server {
        query: "inventory_quantity <= 0".to_owned(),
    });
    view.receive(variants.clone());
    assert_eq!(view.records().displayed(), variants.as_slice());
}

#[test]
fn tag_and_cancel_scenario() {
    let mut faker = CommerceFaker::new(26);
    let mut active = faker.ready_order();
    active.tags = vec!["Ready to Sync".to_owned()];
    let mut cancelled = active.clone();
    cancelled.id = "gid://shopify/Order/9".into();
    cancelled.cancelled_at = Some(datetime!(2024-01-01 0:00 UTC));

    let kept = apply(&[active.clone(), cancelled], &order_sync_predicates());
    assert_eq!(kept, vec![active]);
}

#[test]
fn latched_orders_ignore_simulated_fetches_until_reset() {
    let mut faker = CommerceFaker::new(27);
    let mut view = OrderView::default();
    let first = vec![faker.ready_order(), faker.order(), faker.ready_order()];
    view.receive(first.clone());
    view.trigger_filter();
    let pinned = names(view.records().displayed());
    assert_eq!(pinned, names(&apply(&first, &order_sync_predicates())));

    for _ in 0..5 {
        let batch = faker.orders(10);
        assert_eq!(view.receive(batch), ReceiveOutcome::Pinned);
        assert_eq!(names(view.records().displayed()), pinned);
        assert_eq!(view.latch(), FilterLatch::ShowingFiltered);
    }

    view.reset();
    let fresh = faker.orders(4);
    view.receive(fresh.clone());
    assert_eq!(names(view.records().displayed()), names(&fresh));
}

#[test]
fn selection_is_subset_of_displayed_after_every_replacement() {
    let mut faker = CommerceFaker::new(28);
    let mut views = Views::default();
    let mut carried = 0_usize;

    for size in [3_usize, 7, 1, 0, 4] {
        let orders = faker.orders(size);
        assert_eq!(views.selection_summary(ViewKind::Tracking).selected, carried);
        views.tracking.receive(orders.clone());

        let records = views.tracking.records();
        assert!(records.selection().selected().is_empty());

        if let Some(first) = orders.first() {
            views.dispatch(ViewKind::Tracking, ViewCommand::Toggle(first.id.to_string()));
            assert!(views.is_selected(ViewKind::Tracking, first.id.as_str()));
        }
        views.dispatch(ViewKind::Tracking, ViewCommand::SelectAll);

        let records = views.tracking.records();
        assert_eq!(records.selection().selected_count(), size);
        assert!(
            records
                .selection()
                .selected()
                .iter()
                .all(|id| records.displayed().iter().any(|order| order.id() == id))
        );
        carried = size;
    }

    let same = views.tracking.records().displayed().to_vec();
    views.tracking.receive(same);
    assert!(views.tracking.records().selection().selected().is_empty());
}

#[test]
fn select_all_then_clear_is_unselected_for_any_size() {
    let mut faker = CommerceFaker::new(29);
    let mut views = Views::default();

    for size in [0_usize, 1, 7] {
        views.tracking.receive(faker.orders(size));
        views.dispatch(ViewKind::Tracking, ViewCommand::SelectAll);
        views.dispatch(ViewKind::Tracking, ViewCommand::Clear);
        assert_eq!(
            views.selection_summary(ViewKind::Tracking).phase,
            SelectionPhase::Unselected
        );
        assert!(views.tracking.records().selection().selected().is_empty());
    }
}
