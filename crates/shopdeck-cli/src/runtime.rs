// Copyright 2026 Phillip Cloud
// Licensed under the Apache License, Version 2.0

use anyhow::{Result, bail};
use shopdeck_app::{
    InventoryFilterMode, InventoryVariantRecord, OrderRecord, ViewCommand, ViewKind, Views,
};
use shopdeck_remote::{FetchRequest, QueryTransport, RecordFetcher, RetrievalError};
use shopdeck_tui::DashboardRuntime;
use tracing::{info, warn};

use crate::config::Config;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FetchSettings {
    pub page_size: u32,
    pub tracking_page_size: u32,
    pub follow_pages: bool,
    pub max_pages: usize,
    pub inventory_mode: InventoryFilterMode,
}

impl FetchSettings {
    pub fn from_config(config: &Config) -> Self {
        Self {
            page_size: config.page_size(),
            tracking_page_size: config.tracking_page_size(),
            follow_pages: config.follow_pages(),
            max_pages: config.max_pages(),
            inventory_mode: config.inventory_mode(),
        }
    }
}

/// Serves each dashboard view from one remote fetch.
pub struct RemoteRuntime<T> {
    fetcher: RecordFetcher<T>,
    settings: FetchSettings,
}

impl<T: QueryTransport> RemoteRuntime<T> {
    pub fn new(transport: T, settings: FetchSettings) -> Self {
        Self {
            fetcher: RecordFetcher::new(transport),
            settings,
        }
    }

    pub fn settings(&self) -> &FetchSettings {
        &self.settings
    }

    fn orders(&self, view: ViewKind, request: FetchRequest) -> Result<Vec<OrderRecord>> {
        let fetched = if self.settings.follow_pages {
            self.fetcher
                .fetch_all_orders(&request, self.settings.max_pages)
        } else {
            self.fetcher.fetch_orders(&request)
        };
        Ok(logged(view, fetched)?)
    }
}

fn logged<R>(view: ViewKind, fetched: Result<Vec<R>, RetrievalError>) -> Result<Vec<R>, RetrievalError> {
    match &fetched {
        Ok(records) => info!(view = view.label(), records = records.len(), "view fetched"),
        Err(error) => warn!(view = view.label(), %error, "view fetch failed"),
    }
    fetched
}

impl<T: QueryTransport> DashboardRuntime for RemoteRuntime<T> {
    fn load_orders(&mut self) -> Result<Vec<OrderRecord>> {
        self.orders(ViewKind::Orders, FetchRequest::orders(self.settings.page_size))
    }

    fn load_inventory(&mut self) -> Result<Vec<InventoryVariantRecord>> {
        let mut request = FetchRequest::variants(self.settings.page_size);
        if let Some(query) = self.settings.inventory_mode.server_query() {
            request = request.with_query_filter(query);
        }
        let fetched = if self.settings.follow_pages {
            self.fetcher
                .fetch_all_variants(&request, self.settings.max_pages)
        } else {
            self.fetcher.fetch_variants(&request)
        };
        Ok(logged(ViewKind::Inventory, fetched)?)
    }

    fn load_tracking(&mut self) -> Result<Vec<OrderRecord>> {
        self.orders(
            ViewKind::Tracking,
            FetchRequest::orders(self.settings.tracking_page_size),
        )
    }

    fn inventory_mode(&self) -> InventoryFilterMode {
        self.settings.inventory_mode.clone()
    }
}

/// Loads one view through its pipeline and renders it as text rows.
/// `filtered` runs the order sync filter before rendering.
pub fn render_listing<R: DashboardRuntime>(
    runtime: &mut R,
    kind: ViewKind,
    filtered: bool,
) -> Result<String> {
    if filtered && kind != ViewKind::Orders {
        bail!("--filtered only applies to --list orders");
    }

    let mut views = Views::new(runtime.inventory_mode());
    match kind {
        ViewKind::Orders => {
            views.orders.receive(runtime.load_orders()?);
        }
        ViewKind::Inventory => {
            views.inventory.receive(runtime.load_inventory()?);
        }
        ViewKind::Tracking => {
            views.tracking.receive(runtime.load_tracking()?);
        }
    }
    if filtered {
        views.dispatch(kind, ViewCommand::TriggerFilter);
    }

    Ok(shopdeck_tui::list_rows_text(&views, kind))
}
