// Copyright 2026 Phillip Cloud
// Licensed under the Apache License, Version 2.0

use serde::{Deserialize, Serialize};
use std::fmt;
use time::OffsetDateTime;

use crate::ids::*;

pub const READY_TO_SYNC_TAG: &str = "Ready to Sync";
pub const LOW_STOCK_THRESHOLD: i64 = 50;
pub const SERVER_LOW_STOCK_QUERY: &str = "inventory_quantity <= 0";

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum PaymentStatus {
    Paid,
    Unpaid,
    PartiallyPaid,
}

impl PaymentStatus {
    /// `(true, false)` is paid and `(false, true)` is unpaid. Both other
    /// combinations render as partially paid, including the inconsistent
    /// `(true, true)` pair.
    pub const fn derive(fully_paid: bool, unpaid: bool) -> Self {
        match (fully_paid, unpaid) {
            (true, false) => Self::Paid,
            (false, true) => Self::Unpaid,
            _ => Self::PartiallyPaid,
        }
    }

    pub const fn label(self) -> &'static str {
        match self {
            Self::Paid => "Paid",
            Self::Unpaid => "Unpaid",
            Self::PartiallyPaid => "Partially paid",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct PaymentFlags {
    pub fully_paid: bool,
    pub unpaid: bool,
}

impl PaymentFlags {
    pub const fn new(fully_paid: bool, unpaid: bool) -> Self {
        Self { fully_paid, unpaid }
    }

    pub const fn status(self) -> PaymentStatus {
        PaymentStatus::derive(self.fully_paid, self.unpaid)
    }

    pub const fn is_inconsistent(self) -> bool {
        self.fully_paid && self.unpaid
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct CustomerName {
    pub first_name: Option<String>,
    pub last_name: Option<String>,
}

impl CustomerName {
    pub fn display(&self) -> String {
        [self.first_name.as_deref(), self.last_name.as_deref()]
            .into_iter()
            .flatten()
            .map(str::trim)
            .filter(|part| !part.is_empty())
            .collect::<Vec<_>>()
            .join(" ")
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OrderRecord {
    pub id: OrderId,
    pub name: String,
    pub created_at: OffsetDateTime,
    pub subtotal_cents: Option<i64>,
    pub customer: Option<CustomerName>,
    pub tags: Vec<String>,
    pub cancelled_at: Option<OffsetDateTime>,
    pub payment: PaymentFlags,
}

impl OrderRecord {
    pub const fn payment_status(&self) -> PaymentStatus {
        self.payment.status()
    }

    pub fn customer_display(&self) -> String {
        self.customer
            .as_ref()
            .map(CustomerName::display)
            .unwrap_or_default()
    }

    pub fn has_tag(&self, tag: &str) -> bool {
        self.tags.iter().any(|candidate| candidate == tag)
    }

    pub const fn is_cancelled(&self) -> bool {
        self.cancelled_at.is_some()
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct InventoryVariantRecord {
    pub id: VariantId,
    pub title: String,
    pub sku: String,
    pub available_for_sale: bool,
    pub price_cents: i64,
    pub inventory_quantity: Option<i64>,
    pub display_name: String,
    pub updated_at: Option<OffsetDateTime>,
}

/// A fetched entity with a stable identifier.
pub trait Record {
    type Id: Clone + Ord + fmt::Debug + From<String>;

    fn id(&self) -> &Self::Id;
}

impl Record for OrderRecord {
    type Id = OrderId;

    fn id(&self) -> &OrderId {
        &self.id
    }
}

impl Record for InventoryVariantRecord {
    type Id = VariantId;

    fn id(&self) -> &VariantId {
        &self.id
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ViewKind {
    Orders,
    Inventory,
    Tracking,
}

impl ViewKind {
    pub const ALL: [Self; 3] = [Self::Orders, Self::Inventory, Self::Tracking];

    pub const fn label(self) -> &'static str {
        match self {
            Self::Orders => "orders",
            Self::Inventory => "inventory",
            Self::Tracking => "tracking",
        }
    }

    pub fn parse(value: &str) -> Option<Self> {
        match value {
            "orders" => Some(Self::Orders),
            "inventory" => Some(Self::Inventory),
            "tracking" => Some(Self::Tracking),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum InventoryFilterMode {
    /// Fetch every variant and keep those with quantity strictly below the
    /// threshold.
    Client { threshold: i64 },
    /// Let the remote narrow the list; nothing is filtered locally.
    Server { query: String },
}

impl Default for InventoryFilterMode {
    fn default() -> Self {
        Self::Client {
            threshold: LOW_STOCK_THRESHOLD,
        }
    }
}

impl InventoryFilterMode {
    pub fn server_query(&self) -> Option<&str> {
        match self {
            Self::Client { .. } => None,
            Self::Server { query } => Some(query),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum SortDirection {
    Asc,
    Desc,
}
