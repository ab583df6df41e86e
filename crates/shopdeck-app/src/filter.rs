// Copyright 2026 Phillip Cloud
// Licensed under the Apache License, Version 2.0

use crate::{InventoryFilterMode, InventoryVariantRecord, OrderRecord, READY_TO_SYNC_TAG};

/// A pure test over one record.
pub trait Predicate<R> {
    fn matches(&self, record: &R) -> bool;
}

impl<R, F> Predicate<R> for F
where
    F: Fn(&R) -> bool,
{
    fn matches(&self, record: &R) -> bool {
        self(record)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum OrderPredicate {
    HasTag(String),
    NotCancelled,
}

impl Predicate<OrderRecord> for OrderPredicate {
    fn matches(&self, record: &OrderRecord) -> bool {
        match self {
            Self::HasTag(tag) => record.has_tag(tag),
            Self::NotCancelled => !record.is_cancelled(),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum VariantPredicate {
    /// Untracked quantities never match.
    QuantityBelow(i64),
}

impl Predicate<InventoryVariantRecord> for VariantPredicate {
    fn matches(&self, record: &InventoryVariantRecord) -> bool {
        match self {
            Self::QuantityBelow(threshold) => record
                .inventory_quantity
                .is_some_and(|quantity| quantity < *threshold),
        }
    }
}

/// Keeps the records that satisfy every predicate, in input order.
/// Predicates are evaluated in list order and stop at the first miss.
pub fn apply<R, P>(records: &[R], predicates: &[P]) -> Vec<R>
where
    R: Clone,
    P: Predicate<R>,
{
    records
        .iter()
        .filter(|record| predicates.iter().all(|predicate| predicate.matches(record)))
        .cloned()
        .collect()
}

pub fn order_sync_predicates() -> Vec<OrderPredicate> {
    vec![
        OrderPredicate::HasTag(READY_TO_SYNC_TAG.to_owned()),
        OrderPredicate::NotCancelled,
    ]
}

pub fn low_stock_predicates(mode: &InventoryFilterMode) -> Vec<VariantPredicate> {
    match mode {
        InventoryFilterMode::Client { threshold } => {
            vec![VariantPredicate::QuantityBelow(*threshold)]
        }
        InventoryFilterMode::Server { .. } => Vec::new(),
    }
}

#[cfg(test)]
mod tests {
    use super::{OrderPredicate, Predicate, VariantPredicate, apply, low_stock_predicates};
    use crate::{InventoryFilterMode, InventoryVariantRecord, VariantId};

    fn variant(id: &str, quantity: Option<i64>) -> InventoryVariantRecord {
        InventoryVariantRecord {
            id: VariantId::new(id),
            title: format!("variant {id}"),
            sku: String::new(),
            available_for_sale: true,
            price_cents: 1_000,
            inventory_quantity: quantity,
            display_name: format!("Product - variant {id}"),
            updated_at: None,
        }
    }

    fn ids(records: &[InventoryVariantRecord]) -> Vec<&str> {
        records.iter().map(|record| record.id.as_str()).collect()
    }

    #[test]
    fn empty_input_yields_empty_output() {
        let kept = apply::<InventoryVariantRecord, _>(&[], &[VariantPredicate::QuantityBelow(50)]);
        assert!(kept.is_empty());
    }

    #[test]
    fn no_predicates_keeps_everything() {
        let records = vec![variant("1", Some(500)), variant("2", None)];
        let kept = apply::<_, VariantPredicate>(&records, &[]);
        assert_eq!(kept, records);
    }

    #[test]
    fn untracked_quantity_does_not_count_as_low_stock() {
        let records = vec![variant("1", None), variant("2", Some(-4))];
        let kept = apply(&records, &[VariantPredicate::QuantityBelow(50)]);
        assert_eq!(ids(&kept), vec!["2"]);
    }

    #[test]
    fn server_mode_adds_no_local_predicates() {
        let mode = InventoryFilterMode::Server {
            query: "inventory_quantity <= 0".to_owned(),
        };
        assert!(low_stock_predicates(&mode).is_empty());
    }

    #[test]
    fn closures_act_as_predicates() {
        let records = vec![variant("1", Some(1)), variant("2", Some(2))];
        let even = |record: &InventoryVariantRecord| {
            record.inventory_quantity.is_some_and(|quantity| quantity % 2 == 0)
        };
        assert!(even.matches(&records[1]));
        assert_eq!(ids(&apply(&records, &[even])), vec!["2"]);
    }

    #[test]
    fn has_tag_predicate_is_exact_and_case_sensitive() {
        let predicate = OrderPredicate::HasTag("Ready to Sync".to_owned());
        let order = order_with_tags(&["ready to sync", "Ready to Sync later"]);
        assert!(!predicate.matches(&order));
    }

    fn order_with_tags(tags: &[&str]) -> crate::OrderRecord {
        crate::OrderRecord {
            id: crate::OrderId::new("gid://shopify/Order/1"),
            name: "#1".to_owned(),
            created_at: time::OffsetDateTime::UNIX_EPOCH,
            subtotal_cents: None,
            customer: None,
            tags: tags.iter().map(|tag| (*tag).to_owned()).collect(),
            cancelled_at: None,
            payment: crate::PaymentFlags::default(),
        }
    }
}
