// Copyright 2026 Phillip Cloud
// Licensed under the Apache License, Version 2.0

use shopdeck_app::{InventoryVariantRecord, OrderRecord};
use tracing::{debug, info, warn};

use crate::decode::{Page, RemoteRecord, decode_nodes, extract_page};
use crate::{EntityKind, FetchRequest, QueryTransport, RetrievalError, build_request};

/// Turns fetch requests into typed records over any [`QueryTransport`].
///
/// The plain `fetch_*` calls read the first page only, so a view never holds
/// more than `page_size` records. The `fetch_all_*` calls follow cursors.
#[derive(Debug, Clone)]
pub struct RecordFetcher<T> {
    transport: T,
}

impl<T: QueryTransport> RecordFetcher<T> {
    pub fn new(transport: T) -> Self {
        Self { transport }
    }

    pub fn fetch_orders(&self, request: &FetchRequest) -> Result<Vec<OrderRecord>, RetrievalError> {
        let orders = self.fetch_first_page("fetch_orders", request)?;
        warn_inconsistent_payment(&orders);
        Ok(orders)
    }

    pub fn fetch_variants(
        &self,
        request: &FetchRequest,
    ) -> Result<Vec<InventoryVariantRecord>, RetrievalError> {
        self.fetch_first_page("fetch_variants", request)
    }

    pub fn fetch_all_orders(
        &self,
        request: &FetchRequest,
        max_pages: usize,
    ) -> Result<Vec<OrderRecord>, RetrievalError> {
        let orders = self.fetch_pages("fetch_all_orders", request, max_pages)?;
        warn_inconsistent_payment(&orders);
        Ok(orders)
    }

    pub fn fetch_all_variants(
        &self,
        request: &FetchRequest,
        max_pages: usize,
    ) -> Result<Vec<InventoryVariantRecord>, RetrievalError> {
        self.fetch_pages("fetch_all_variants", request, max_pages)
    }

    fn fetch_first_page<R: RemoteRecord>(
        &self,
        operation: &'static str,
        request: &FetchRequest,
    ) -> Result<Vec<R>, RetrievalError> {
        check_request::<R>(operation, request)?;
        debug!(
            kind = %request.kind,
            page_size = request.page_size,
            filtered = request.query_filter.is_some(),
            "fetch start"
        );
        let page = self.page(request, None, false)?;
        let records = decode_nodes::<R>(page.nodes)?;
        info!(kind = %request.kind, records = records.len(), pages = 1, "fetch finished");
        Ok(records)
    }

    fn fetch_pages<R: RemoteRecord>(
        &self,
        operation: &'static str,
        request: &FetchRequest,
        max_pages: usize,
    ) -> Result<Vec<R>, RetrievalError> {
        check_request::<R>(operation, request)?;
        let max_pages = max_pages.max(1);
        debug!(
            kind = %request.kind,
            page_size = request.page_size,
            max_pages,
            "paginated fetch start"
        );

        let mut records = Vec::new();
        let mut cursor: Option<String> = None;
        let mut pages = 0_usize;
        loop {
            let page = self.page(request, cursor.as_deref(), true)?;
            pages += 1;
            let info = page.page_info.clone().ok_or_else(|| {
                RetrievalError::envelope(format!(
                    "data.{}.pageInfo",
                    request.kind.connection_field()
                ))
            })?;
            records.extend(decode_nodes::<R>(page.nodes)?);

            if !info.has_next_page {
                break;
            }
            if pages >= max_pages {
                warn!(
                    kind = %request.kind,
                    pages,
                    records = records.len(),
                    "page limit reached with more records remaining"
                );
                break;
            }
            match info.end_cursor {
                Some(next) => cursor = Some(next),
                None => {
                    return Err(RetrievalError::envelope(format!(
                        "data.{}.pageInfo.endCursor",
                        request.kind.connection_field()
                    )));
                }
            }
        }

        info!(kind = %request.kind, records = records.len(), pages, "fetch finished");
        Ok(records)
    }

    fn page(
        &self,
        request: &FetchRequest,
        after: Option<&str>,
        paginated: bool,
    ) -> Result<Page, RetrievalError> {
        let query = build_request(request, after, paginated);
        let body = self.transport.execute(&query)?;
        let page = extract_page(body, request.kind.connection_field())?;
        if !page.partial_errors.is_empty() {
            warn!(
                kind = %request.kind,
                errors = %page.partial_errors.join("; "),
                "remote returned errors alongside data"
            );
        }
        Ok(page)
    }
}

fn check_request<R: RemoteRecord>(
    operation: &'static str,
    request: &FetchRequest,
) -> Result<(), RetrievalError> {
    if request.kind != R::KIND {
        return Err(RetrievalError::Kind {
            operation,
            expected: R::KIND,
            requested: request.kind,
        });
    }
    request.validate()
}

fn warn_inconsistent_payment(orders: &[OrderRecord]) {
    let inconsistent = orders
        .iter()
        .filter(|order| order.payment.is_inconsistent())
        .count();
    if inconsistent > 0 {
        warn!(
            kind = %EntityKind::Order,
            inconsistent,
            "orders flagged both fully paid and unpaid; showing them as partially paid"
        );
    }
}
