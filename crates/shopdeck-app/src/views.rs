// Copyright 2026 Phillip Cloud
// Licensed under the Apache License, Version 2.0

use crate::filter::{self, low_stock_predicates, order_sync_predicates};
use crate::{
    FilterLatch, InventoryFilterMode, InventoryVariantRecord, OrderRecord, Record, Selection,
    SelectionPhase, ViewKind,
};

/// Records on screen for one view plus the selection tracked against them.
#[derive(Debug, Clone, PartialEq)]
pub struct RecordView<R: Record> {
    displayed: Vec<R>,
    selection: Selection<R::Id>,
}

impl<R: Record> Default for RecordView<R> {
    fn default() -> Self {
        Self {
            displayed: Vec::new(),
            selection: Selection::default(),
        }
    }
}

impl<R: Record> RecordView<R> {
    /// Swaps in a new list. The selection always starts over.
    pub fn show(&mut self, records: Vec<R>) {
        self.selection
            .replace_list(records.iter().map(|record| record.id().clone()));
        self.displayed = records;
    }

    pub fn displayed(&self) -> &[R] {
        &self.displayed
    }

    pub fn selection(&self) -> &Selection<R::Id> {
        &self.selection
    }

    pub fn toggle(&mut self, id: &R::Id) -> bool {
        self.selection.toggle(id)
    }

    pub fn select_all(&mut self) {
        self.selection.select_all();
    }

    pub fn clear(&mut self) {
        self.selection.clear();
    }

    pub fn is_selected(&self, id: &R::Id) -> bool {
        self.selection.is_selected(id)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReceiveOutcome {
    Displayed(usize),
    /// The filter latch is engaged; the list on screen did not change.
    Pinned,
}

#[derive(Debug, Clone, PartialEq, Default)]
pub struct OrderView {
    upstream: Vec<OrderRecord>,
    upstream_generation: u64,
    latch: FilterLatch,
    view: RecordView<OrderRecord>,
}

impl OrderView {
    /// Takes a fresh fetch result. While the latch is engaged the result is
    /// kept as the upstream list for the next filter action but the display
    /// stays pinned to the filter-time snapshot.
    pub fn receive(&mut self, records: Vec<OrderRecord>) -> ReceiveOutcome {
        self.upstream_generation = self.upstream_generation.wrapping_add(1);
        if self.latch.is_engaged() {
            self.upstream = records;
            return ReceiveOutcome::Pinned;
        }
        self.upstream = records.clone();
        let shown = records.len();
        self.view.show(records);
        ReceiveOutcome::Displayed(shown)
    }

    /// Narrows the latest upstream list to orders that are ready to sync and
    /// not cancelled, then engages the latch. Returns the number of rows shown.
    pub fn trigger_filter(&mut self) -> usize {
        let filtered = filter::apply(&self.upstream, &order_sync_predicates());
        let shown = filtered.len();
        self.view.show(filtered);
        self.latch.engage();
        shown
    }

    pub fn reset(&mut self) {
        *self = Self::default();
    }

    pub const fn latch(&self) -> FilterLatch {
        self.latch
    }

    pub const fn upstream_generation(&self) -> u64 {
        self.upstream_generation
    }

    pub fn upstream(&self) -> &[OrderRecord] {
        &self.upstream
    }

    pub fn records(&self) -> &RecordView<OrderRecord> {
        &self.view
    }

    pub fn records_mut(&mut self) -> &mut RecordView<OrderRecord> {
        &mut self.view
    }
}

#[derive(Debug, Clone, PartialEq, Default)]
pub struct InventoryView {
    mode: InventoryFilterMode,
    view: RecordView<InventoryVariantRecord>,
}

impl InventoryView {
    pub fn new(mode: InventoryFilterMode) -> Self {
        Self {
            mode,
            view: RecordView::default(),
        }
    }

    pub fn receive(&mut self, records: Vec<InventoryVariantRecord>) -> ReceiveOutcome {
        let low_stock = filter::apply(&records, &low_stock_predicates(&self.mode));
        let shown = low_stock.len();
        self.view.show(low_stock);
        ReceiveOutcome::Displayed(shown)
    }

    pub fn reset(&mut self) {
        self.view = RecordView::default();
    }

    pub fn mode(&self) -> &InventoryFilterMode {
        &self.mode
    }

    pub fn records(&self) -> &RecordView<InventoryVariantRecord> {
        &self.view
    }

    pub fn records_mut(&mut self) -> &mut RecordView<InventoryVariantRecord> {
        &mut self.view
    }
}

#[derive(Debug, Clone, PartialEq, Default)]
pub struct TrackingView {
    view: RecordView<OrderRecord>,
}

impl TrackingView {
    pub fn receive(&mut self, records: Vec<OrderRecord>) -> ReceiveOutcome {
        let shown = records.len();
        self.view.show(records);
        ReceiveOutcome::Displayed(shown)
    }

    pub fn reset(&mut self) {
        self.view = RecordView::default();
    }

    pub fn records(&self) -> &RecordView<OrderRecord> {
        &self.view
    }

    pub fn records_mut(&mut self) -> &mut RecordView<OrderRecord> {
        &mut self.view
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ViewCommand {
    Toggle(String),
    SelectAll,
    Clear,
    TriggerFilter,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SelectionSummary {
    pub selected: usize,
    pub phase: SelectionPhase,
}

impl SelectionSummary {
    pub fn label(self) -> String {
        match self.phase {
            SelectionPhase::AllSelected => "All".to_owned(),
            _ => self.selected.to_string(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ViewEvent {
    SelectionChanged(ViewKind, SelectionSummary),
    FilterLatched { view: ViewKind, shown: usize },
    FilterUnavailable(ViewKind),
}

#[derive(Debug, Clone, PartialEq, Default)]
pub struct Views {
    pub orders: OrderView,
    pub inventory: InventoryView,
    pub tracking: TrackingView,
}

impl Views {
    pub fn new(inventory_mode: InventoryFilterMode) -> Self {
        Self {
            orders: OrderView::default(),
            inventory: InventoryView::new(inventory_mode),
            tracking: TrackingView::default(),
        }
    }

    pub fn reset(&mut self, kind: ViewKind) {
        match kind {
            ViewKind::Orders => self.orders.reset(),
            ViewKind::Inventory => self.inventory.reset(),
            ViewKind::Tracking => self.tracking.reset(),
        }
    }

    pub fn row_count(&self, kind: ViewKind) -> usize {
        match kind {
            ViewKind::Orders => self.orders.records().displayed().len(),
            ViewKind::Inventory => self.inventory.records().displayed().len(),
            ViewKind::Tracking => self.tracking.records().displayed().len(),
        }
    }

    pub fn selection_summary(&self, kind: ViewKind) -> SelectionSummary {
        match kind {
            ViewKind::Orders => summarize(self.orders.records()),
            ViewKind::Inventory => summarize(self.inventory.records()),
            ViewKind::Tracking => summarize(self.tracking.records()),
        }
    }

    pub fn is_selected(&self, kind: ViewKind, id: &str) -> bool {
        match kind {
            ViewKind::Orders => self.orders.records().is_selected(&id.to_owned().into()),
            ViewKind::Inventory => self.inventory.records().is_selected(&id.to_owned().into()),
            ViewKind::Tracking => self.tracking.records().is_selected(&id.to_owned().into()),
        }
    }

    pub fn dispatch(&mut self, kind: ViewKind, command: ViewCommand) -> Vec<ViewEvent> {
        match command {
            ViewCommand::TriggerFilter => match kind {
                ViewKind::Orders => {
                    let shown = self.orders.trigger_filter();
                    vec![
                        ViewEvent::FilterLatched { view: kind, shown },
                        ViewEvent::SelectionChanged(kind, self.selection_summary(kind)),
                    ]
                }
                ViewKind::Inventory | ViewKind::Tracking => {
                    vec![ViewEvent::FilterUnavailable(kind)]
                }
            },
            ViewCommand::Toggle(id) => {
                match kind {
                    ViewKind::Orders => {
                        self.orders.records_mut().toggle(&id.into());
                    }
                    ViewKind::Inventory => {
                        self.inventory.records_mut().toggle(&id.into());
                    }
                    ViewKind::Tracking => {
                        self.tracking.records_mut().toggle(&id.into());
                    }
                }
                vec![ViewEvent::SelectionChanged(kind, self.selection_summary(kind))]
            }
            ViewCommand::SelectAll => {
                match kind {
                    ViewKind::Orders => self.orders.records_mut().select_all(),
                    ViewKind::Inventory => self.inventory.records_mut().select_all(),
                    ViewKind::Tracking => self.tracking.records_mut().select_all(),
                }
                vec![ViewEvent::SelectionChanged(kind, self.selection_summary(kind))]
            }
            ViewCommand::Clear => {
                match kind {
                    ViewKind::Orders => self.orders.records_mut().clear(),
                    ViewKind::Inventory => self.inventory.records_mut().clear(),
                    ViewKind::Tracking => self.tracking.records_mut().clear(),
                }
                vec![ViewEvent::SelectionChanged(kind, self.selection_summary(kind))]
            }
        }
    }
}

fn summarize<R: Record>(view: &RecordView<R>) -> SelectionSummary {
    SelectionSummary {
        selected: view.selection().selected_count(),
        phase: view.selection().phase(),
    }
}

#[cfg(test)]
mod tests {
    use super::{
        OrderView, ReceiveOutcome, SelectionSummary, ViewCommand, ViewEvent, Views,
    };
    use crate::{
        FilterLatch, InventoryFilterMode, OrderId, OrderRecord, PaymentFlags, SelectionPhase,
        ViewKind,
    };
    use time::OffsetDateTime;

    fn order(id: u32, tags: &[&str], cancelled: bool) -> OrderRecord {
        OrderRecord {
            id: OrderId::new(format!("gid://shopify/Order/{id}")),
            name: format!("#{id}"),
            created_at: OffsetDateTime::UNIX_EPOCH,
            subtotal_cents: Some(1_250),
            customer: None,
            tags: tags.iter().map(|tag| (*tag).to_owned()).collect(),
            cancelled_at: cancelled.then_some(OffsetDateTime::UNIX_EPOCH),
            payment: PaymentFlags::new(true, false),
        }
    }

    fn shown_names(view: &OrderView) -> Vec<String> {
        view.records()
            .displayed()
            .iter()
            .map(|order| order.name.clone())
            .collect()
    }

    #[test]
    fn orders_show_unfiltered_until_triggered() {
        let mut view = OrderView::default();
        let outcome = view.receive(vec![order(1, &[], false), order(2, &["Ready to Sync"], false)]);
        assert_eq!(outcome, ReceiveOutcome::Displayed(2));
        assert_eq!(view.latch(), FilterLatch::ShowingAll);
        assert_eq!(shown_names(&view), vec!["#1", "#2"]);
    }

    #[test]
    fn latched_view_ignores_later_fetches_for_display() {
        let mut view = OrderView::default();
        view.receive(vec![
            order(1, &["Ready to Sync"], false),
            order(2, &["Ready to Sync"], true),
            order(3, &[], false),
        ]);
        assert_eq!(view.trigger_filter(), 1);
        assert_eq!(shown_names(&view), vec!["#1"]);

        let outcome = view.receive(vec![order(4, &["Ready to Sync"], false)]);
        assert_eq!(outcome, ReceiveOutcome::Pinned);
        assert_eq!(shown_names(&view), vec!["#1"]);
        assert_eq!(view.upstream().len(), 1);
        assert_eq!(view.upstream_generation(), 2);
    }

    #[test]
    fn retrigger_snapshots_latest_upstream() {
        let mut view = OrderView::default();
        view.receive(vec![order(1, &["Ready to Sync"], false)]);
        view.trigger_filter();
        view.receive(vec![
            order(5, &["Ready to Sync"], false),
            order(6, &["Ready to Sync"], false),
        ]);
        assert_eq!(view.trigger_filter(), 2);
        assert_eq!(shown_names(&view), vec!["#5", "#6"]);
    }

    #[test]
    fn reset_unlatches_and_empties() {
        let mut view = OrderView::default();
        view.receive(vec![order(1, &["Ready to Sync"], false)]);
        view.trigger_filter();
        view.reset();
        assert_eq!(view.latch(), FilterLatch::ShowingAll);
        assert!(view.records().displayed().is_empty());

        view.receive(vec![order(2, &[], false)]);
        assert_eq!(shown_names(&view), vec!["#2"]);
    }

    #[test]
    fn filter_action_drops_existing_selection() {
        let mut views = Views::default();
        views.orders.receive(vec![
            order(1, &["Ready to Sync"], false),
            order(2, &[], false),
        ]);
        views.dispatch(ViewKind::Orders, ViewCommand::SelectAll);
        assert_eq!(
            views.selection_summary(ViewKind::Orders).phase,
            SelectionPhase::AllSelected
        );

        let events = views.dispatch(ViewKind::Orders, ViewCommand::TriggerFilter);
        assert_eq!(
            events,
            vec![
                ViewEvent::FilterLatched {
                    view: ViewKind::Orders,
                    shown: 1
                },
                ViewEvent::SelectionChanged(
                    ViewKind::Orders,
                    SelectionSummary {
                        selected: 0,
                        phase: SelectionPhase::Unselected
                    }
                ),
            ]
        );
    }

    #[test]
    fn toggle_routes_to_the_requested_view() {
        let mut views = Views::default();
        views.tracking.receive(vec![order(1, &[], false), order(2, &[], false)]);

        let events = views.dispatch(
            ViewKind::Tracking,
            ViewCommand::Toggle("gid://shopify/Order/2".to_owned()),
        );
        assert_eq!(
            events,
            vec![ViewEvent::SelectionChanged(
                ViewKind::Tracking,
                SelectionSummary {
                    selected: 1,
                    phase: SelectionPhase::PartiallySelected
                }
            )]
        );
        assert!(views.is_selected(ViewKind::Tracking, "gid://shopify/Order/2"));
        assert!(!views.is_selected(ViewKind::Orders, "gid://shopify/Order/2"));
    }

    #[test]
    fn filter_only_applies_to_orders() {
        let mut views = Views::new(InventoryFilterMode::default());
        assert_eq!(
            views.dispatch(ViewKind::Inventory, ViewCommand::TriggerFilter),
            vec![ViewEvent::FilterUnavailable(ViewKind::Inventory)]
        );
        assert_eq!(
            views.dispatch(ViewKind::Tracking, ViewCommand::TriggerFilter),
            vec![ViewEvent::FilterUnavailable(ViewKind::Tracking)]
        );
    }

    #[test]
    fn summary_label_reports_all_when_everything_selected() {
        let mut views = Views::default();
        views.tracking.receive(vec![order(1, &[], false)]);
        assert_eq!(views.selection_summary(ViewKind::Tracking).label(), "0");
        views.dispatch(ViewKind::Tracking, ViewCommand::SelectAll);
        assert_eq!(views.selection_summary(ViewKind::Tracking).label(), "All");
    }
}
