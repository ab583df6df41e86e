// Copyright 2026 Phillip Cloud
// Licensed under the Apache License, Version 2.0

use serde_json::{Value, json};
use shopdeck_app::{
    CustomerName, InventoryVariantRecord, OrderId, OrderRecord, PaymentFlags, READY_TO_SYNC_TAG,
    VariantId,
};
use time::format_description::well_known::Rfc3339;
use time::{Duration, OffsetDateTime};

const FIRST_NAMES: [&str; 16] = [
    "Avery", "Jordan", "Taylor", "Riley", "Morgan", "Casey", "Alex", "Quinn", "Parker", "Drew",
    "Kai", "Elliot", "Robin", "Cameron", "Hayden", "Rowan",
];
const LAST_NAMES: [&str; 18] = [
    "Walker", "Martin", "Hill", "Evans", "Lopez", "Gray", "Ward", "Young", "Diaz", "Reed",
    "Campbell", "Turner", "Flores", "Bennett", "Price", "Morris", "Foster", "Brooks",
];

const ORDER_TAGS: [&str; 8] = [
    READY_TO_SYNC_TAG,
    "Wholesale",
    "Gift",
    "Priority",
    "Preorder",
    "Local Pickup",
    "Subscription",
    "Repeat Customer",
];

const PRODUCTS: [&str; 12] = [
    "Canvas Tote",
    "Ceramic Mug",
    "Linen Apron",
    "Beeswax Candle",
    "Wool Throw",
    "Oak Cutting Board",
    "Enamel Pin",
    "Cotton Tee",
    "Leather Wallet",
    "Glass Carafe",
    "Stoneware Bowl",
    "Trail Cap",
];
const VARIANT_TITLES: [&str; 8] = [
    "Default Title",
    "Small",
    "Medium",
    "Large",
    "Black",
    "Natural",
    "Olive",
    "Slate",
];

/// Reference instant all generated timestamps are measured back from.
const REFERENCE_UNIX: i64 = 1_771_504_496;

struct DeterministicRng {
    state: u64,
}

impl DeterministicRng {
    fn new(seed: u64) -> Self {
        let mut state = seed ^ 0x9E37_79B9_7F4A_7C15;
        if state == 0 {
            state = 0xA409_3822_299F_31D0;
        }
        Self { state }
    }

    fn next_u64(&mut self) -> u64 {
        self.state = self
            .state
            .wrapping_mul(6_364_136_223_846_793_005)
            .wrapping_add(1_442_695_040_888_963_407);

        let mut x = self.state;
        x ^= x >> 13;
        x ^= x << 7;
        x ^= x >> 17;
        x
    }

    fn int_n(&mut self, n: usize) -> usize {
        if n <= 1 {
            return 0;
        }
        (self.next_u64() % (n as u64)) as usize
    }

    fn one_in(&mut self, n: usize) -> bool {
        self.int_n(n) == 0
    }
}

/// Seeded generator for orders and product variants shaped like the admin API
/// returns them.
pub struct CommerceFaker {
    rng: DeterministicRng,
    next_order: u64,
    next_variant: u64,
}

impl CommerceFaker {
    pub fn new(seed: u64) -> Self {
        let normalized = if seed == 0 { 1 } else { seed };
        Self {
            rng: DeterministicRng::new(normalized),
            next_order: 1001,
            next_variant: 40_001,
        }
    }

    pub fn order(&mut self) -> OrderRecord {
        let number = self.next_order;
        self.next_order += 1;

        let created_at = self.recent_instant(90);
        let tag_count = self.rng.int_n(3);
        let mut tags: Vec<String> = Vec::with_capacity(tag_count);
        for _ in 0..tag_count {
            let tag = self.pick(&ORDER_TAGS).to_owned();
            if !tags.contains(&tag) {
                tags.push(tag);
            }
        }
        let cancelled_at = self
            .rng
            .one_in(5)
            .then(|| created_at + Duration::hours(self.rng.int_n(72) as i64 + 1));
        let payment = match self.rng.int_n(4) {
            0 => PaymentFlags::new(false, true),
            1 => PaymentFlags::new(false, false),
            _ => PaymentFlags::new(true, false),
        };
        let customer = (!self.rng.one_in(6)).then(|| CustomerName {
            first_name: Some(self.pick(&FIRST_NAMES).to_owned()),
            last_name: Some(self.pick(&LAST_NAMES).to_owned()),
        });

        OrderRecord {
            id: OrderId::new(format!("gid://shopify/Order/{number}")),
            name: format!("#{number}"),
            created_at,
            subtotal_cents: Some(self.int_range(500, 45_000)),
            customer,
            tags,
            cancelled_at,
            payment,
        }
    }

    /// An order that survives the sync filter: tagged and never cancelled.
    pub fn ready_order(&mut self) -> OrderRecord {
        let mut order = self.order();
        if !order.has_tag(READY_TO_SYNC_TAG) {
            order.tags.push(READY_TO_SYNC_TAG.to_owned());
        }
        order.cancelled_at = None;
        order
    }

    pub fn orders(&mut self, count: usize) -> Vec<OrderRecord> {
        (0..count).map(|_| self.order()).collect()
    }

    pub fn variant(&mut self) -> InventoryVariantRecord {
        let number = self.next_variant;
        self.next_variant += 1;

        let product = self.pick(&PRODUCTS);
        let title = self.pick(&VARIANT_TITLES).to_owned();
        let sku = if self.rng.one_in(5) {
            String::new()
        } else {
            format!("{}-{number}", sku_prefix(product))
        };
        let inventory_quantity = (!self.rng.one_in(8)).then(|| self.int_range(-5, 120));

        InventoryVariantRecord {
            id: VariantId::new(format!("gid://shopify/ProductVariant/{number}")),
            display_name: format!("{product} - {title}"),
            title,
            sku,
            available_for_sale: !self.rng.one_in(4),
            price_cents: self.int_range(300, 18_000),
            inventory_quantity,
            updated_at: (!self.rng.one_in(10)).then(|| self.recent_instant(30)),
        }
    }

    pub fn variant_with_quantity(&mut self, quantity: Option<i64>) -> InventoryVariantRecord {
        InventoryVariantRecord {
            inventory_quantity: quantity,
            ..self.variant()
        }
    }

    pub fn variants(&mut self, count: usize) -> Vec<InventoryVariantRecord> {
        (0..count).map(|_| self.variant()).collect()
    }

    fn pick<'a>(&mut self, items: &'a [&'a str]) -> &'a str {
        items[self.rng.int_n(items.len())]
    }

    fn int_range(&mut self, min: i64, max: i64) -> i64 {
        if max <= min {
            return min;
        }
        let span = (max - min + 1) as u64;
        min + (self.rng.next_u64() % span) as i64
    }

    fn recent_instant(&mut self, within_days: i64) -> OffsetDateTime {
        let back = self.int_range(0, within_days * 86_400);
        reference_now() - Duration::seconds(back)
    }
}

/// `2026-02-19T12:34:56Z`
pub fn reference_now() -> OffsetDateTime {
    OffsetDateTime::UNIX_EPOCH + Duration::seconds(REFERENCE_UNIX)
}

pub fn fixture_datetime() -> &'static str {
    "2026-02-19T12:34:56Z"
}

/// Renders cents the way the admin API renders decimal money.
pub fn money_string(cents: i64) -> String {
    let sign = if cents < 0 { "-" } else { "" };
    let abs = cents.unsigned_abs();
    format!("{sign}{}.{:02}", abs / 100, abs % 100)
}

fn timestamp(value: OffsetDateTime) -> Value {
    value
        .format(&Rfc3339)
        .map_or(Value::Null, Value::String)
}

pub fn order_node_json(order: &OrderRecord) -> Value {
    let subtotal = order.subtotal_cents.map_or(Value::Null, |cents| {
        json!({ "presentmentMoney": { "amount": money_string(cents) } })
    });
    let customer = order.customer.as_ref().map_or(Value::Null, |customer| {
        json!({ "firstName": customer.first_name, "lastName": customer.last_name })
    });
    json!({
        "id": order.id.as_str(),
        "name": order.name,
        "createdAt": timestamp(order.created_at),
        "fullyPaid": order.payment.fully_paid,
        "unpaid": order.payment.unpaid,
        "tags": order.tags,
        "cancelledAt": order.cancelled_at.map_or(Value::Null, timestamp),
        "subtotalPriceSet": subtotal,
        "customer": customer,
    })
}

pub fn variant_node_json(variant: &InventoryVariantRecord) -> Value {
    let sku = if variant.sku.is_empty() {
        Value::Null
    } else {
        Value::String(variant.sku.clone())
    };
    json!({
        "id": variant.id.as_str(),
        "title": variant.title,
        "sku": sku,
        "availableForSale": variant.available_for_sale,
        "price": money_string(variant.price_cents),
        "inventoryQuantity": variant.inventory_quantity,
        "displayName": variant.display_name,
        "updatedAt": variant.updated_at.map_or(Value::Null, timestamp),
    })
}

/// `{ "data": { <field>: { "edges": [{ "node": .. }] } } }`
pub fn connection_envelope(field: &str, nodes: Vec<Value>) -> Value {
    json!({ "data": { field: { "edges": edges(nodes) } } })
}

/// Same as [`connection_envelope`] plus a `pageInfo` block.
pub fn connection_page(
    field: &str,
    nodes: Vec<Value>,
    has_next_page: bool,
    end_cursor: Option<&str>,
) -> Value {
    json!({
        "data": {
            field: {
                "edges": edges(nodes),
                "pageInfo": { "hasNextPage": has_next_page, "endCursor": end_cursor },
            }
        }
    })
}

pub fn orders_envelope(orders: &[OrderRecord]) -> Value {
    connection_envelope("orders", orders.iter().map(order_node_json).collect())
}

pub fn variants_envelope(variants: &[InventoryVariantRecord]) -> Value {
    connection_envelope(
        "productVariants",
        variants.iter().map(variant_node_json).collect(),
    )
}

fn edges(nodes: Vec<Value>) -> Vec<Value> {
    nodes
        .into_iter()
        .map(|node| json!({ "node": node }))
        .collect()
}

fn sku_prefix(product: &str) -> String {
    product
        .split_whitespace()
        .filter_map(|word| word.chars().next())
        .collect::<String>()
        .to_uppercase()
}
