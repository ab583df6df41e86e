// Copyright 2026 Phillip Cloud
// Licensed under the Apache License, Version 2.0

use serde::Deserialize;
use serde_json::{Map, Value};
use shopdeck_app::{
    CustomerName, InventoryVariantRecord, OrderId, OrderRecord, PaymentFlags, VariantId,
};
use time::format_description::well_known::Rfc3339;
use time::macros::format_description;
use time::{Date, OffsetDateTime};

use crate::{EntityKind, RetrievalError};

/// A record type the fetcher knows how to decode from a connection node.
pub trait RemoteRecord: Sized {
    const KIND: EntityKind;

    fn decode(node: Value) -> Result<Self, String>;
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PageInfo {
    pub has_next_page: bool,
    pub end_cursor: Option<String>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Page {
    pub nodes: Vec<Value>,
    pub page_info: Option<PageInfo>,
    /// Messages from an `errors` array that arrived next to usable data.
    pub partial_errors: Vec<String>,
}

/// Walks `data.<field>.edges[].node` and rejects any deviation from that
/// nesting.
pub fn extract_page(body: Value, field: &str) -> Result<Page, RetrievalError> {
    let Value::Object(mut root) = body else {
        return Err(RetrievalError::envelope("$"));
    };
    let errors = remote_error_messages(root.get("errors"));

    let data = match root.remove("data") {
        Some(Value::Object(data)) => data,
        Some(Value::Null) | None if !errors.is_empty() => {
            return Err(RetrievalError::Remote(errors.join("; ")));
        }
        _ => return Err(RetrievalError::envelope("data")),
    };
    if !errors.is_empty() && matches!(data.get(field), None | Some(Value::Null)) {
        return Err(RetrievalError::Remote(errors.join("; ")));
    }
    let connection = take_object(data, field, &format!("data.{field}"))?;
    let edges_path = format!("data.{field}.edges");
    let edges = match connection.get("edges") {
        Some(Value::Array(edges)) => edges,
        _ => return Err(RetrievalError::envelope(edges_path)),
    };

    let mut nodes = Vec::with_capacity(edges.len());
    for (index, edge) in edges.iter().enumerate() {
        let Value::Object(edge) = edge else {
            return Err(RetrievalError::envelope(format!("{edges_path}[{index}]")));
        };
        match edge.get("node") {
            Some(node @ Value::Object(_)) => nodes.push(node.clone()),
            _ => {
                return Err(RetrievalError::envelope(format!(
                    "{edges_path}[{index}].node"
                )));
            }
        }
    }

    let page_info = match connection.get("pageInfo") {
        None => None,
        Some(value) => Some(
            serde_json::from_value::<PageInfoWire>(value.clone())
                .map(|wire| PageInfo {
                    has_next_page: wire.has_next_page,
                    end_cursor: wire.end_cursor,
                })
                .map_err(|_| RetrievalError::envelope(format!("data.{field}.pageInfo")))?,
        ),
    };

    Ok(Page {
        nodes,
        page_info,
        partial_errors: errors,
    })
}

pub fn decode_nodes<R: RemoteRecord>(nodes: Vec<Value>) -> Result<Vec<R>, RetrievalError> {
    nodes
        .into_iter()
        .enumerate()
        .map(|(index, node)| {
            R::decode(node).map_err(|reason| RetrievalError::Record {
                kind: R::KIND,
                index,
                reason,
            })
        })
        .collect()
}

fn take_object(
    mut parent: Map<String, Value>,
    key: &str,
    path: &str,
) -> Result<Map<String, Value>, RetrievalError> {
    match parent.remove(key) {
        Some(Value::Object(object)) => Ok(object),
        _ => Err(RetrievalError::envelope(path)),
    }
}

fn remote_error_messages(errors: Option<&Value>) -> Vec<String> {
    match errors {
        Some(Value::Array(entries)) => entries
            .iter()
            .map(|entry| match entry.get("message") {
                Some(Value::String(message)) => message.clone(),
                _ => entry.to_string(),
            })
            .collect(),
        Some(Value::String(message)) => vec![message.clone()],
        _ => Vec::new(),
    }
}

/// Converts a decimal money string to minor units. Digits past the second
/// fraction digit round half away from zero.
pub fn parse_money(text: &str) -> Result<i64, String> {
    let trimmed = text.trim();
    let (negative, unsigned) = match trimmed.strip_prefix('-') {
        Some(rest) => (true, rest),
        None => (false, trimmed.strip_prefix('+').unwrap_or(trimmed)),
    };
    let (whole, fraction) = unsigned.split_once('.').unwrap_or((unsigned, ""));
    let all_digits = |part: &str| part.bytes().all(|byte| byte.is_ascii_digit());
    if (whole.is_empty() && fraction.is_empty()) || !all_digits(whole) || !all_digits(fraction) {
        return Err(format!("invalid money amount {text:?}"));
    }

    let overflow = || format!("money amount {text:?} out of range");
    let whole: i64 = if whole.is_empty() {
        0
    } else {
        whole.parse().map_err(|_| overflow())?
    };
    let mut digits = fraction.bytes().map(|byte| i64::from(byte - b'0'));
    let tenths = digits.next().unwrap_or(0);
    let hundredths = digits.next().unwrap_or(0);
    let round_up = digits.next().is_some_and(|digit| digit >= 5);

    let cents = whole
        .checked_mul(100)
        .and_then(|cents| cents.checked_add(tenths * 10 + hundredths + i64::from(round_up)))
        .ok_or_else(overflow)?;
    Ok(if negative { -cents } else { cents })
}

/// Accepts RFC 3339 timestamps and bare `YYYY-MM-DD` dates, which land on
/// midnight UTC.
pub fn parse_timestamp(text: &str) -> Result<OffsetDateTime, String> {
    if let Ok(parsed) = OffsetDateTime::parse(text, &Rfc3339) {
        return Ok(parsed);
    }
    Date::parse(text, format_description!("[year]-[month]-[day]"))
        .map(|date| date.midnight().assume_utc())
        .map_err(|_| format!("invalid timestamp {text:?}"))
}

fn parse_optional_timestamp(text: Option<&str>) -> Result<Option<OffsetDateTime>, String> {
    text.map(parse_timestamp).transpose()
}

impl RemoteRecord for OrderRecord {
    const KIND: EntityKind = EntityKind::Order;

    fn decode(node: Value) -> Result<Self, String> {
        let wire: OrderNode = serde_json::from_value(node).map_err(|error| error.to_string())?;
        let subtotal_cents = wire
            .subtotal_price_set
            .and_then(|set| set.presentment_money)
            .map(|money| money.amount.cents())
            .transpose()?;
        Ok(Self {
            id: OrderId::new(wire.id),
            name: wire.name,
            created_at: parse_timestamp(&wire.created_at)?,
            subtotal_cents,
            customer: wire.customer.map(|customer| CustomerName {
                first_name: customer.first_name,
                last_name: customer.last_name,
            }),
            tags: wire.tags.unwrap_or_default(),
            cancelled_at: parse_optional_timestamp(wire.cancelled_at.as_deref())?,
            payment: PaymentFlags::new(wire.fully_paid, wire.unpaid),
        })
    }
}

impl RemoteRecord for InventoryVariantRecord {
    const KIND: EntityKind = EntityKind::ProductVariant;

    fn decode(node: Value) -> Result<Self, String> {
        let wire: VariantNode = serde_json::from_value(node).map_err(|error| error.to_string())?;
        Ok(Self {
            id: VariantId::new(wire.id),
            title: wire.title,
            sku: wire.sku.unwrap_or_default(),
            available_for_sale: wire.available_for_sale,
            price_cents: wire.price.cents()?,
            inventory_quantity: wire.inventory_quantity,
            display_name: wire.display_name,
            updated_at: parse_optional_timestamp(wire.updated_at.as_deref())?,
        })
    }
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct PageInfoWire {
    has_next_page: bool,
    end_cursor: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct OrderNode {
    id: String,
    name: String,
    created_at: String,
    #[serde(default)]
    fully_paid: bool,
    #[serde(default)]
    unpaid: bool,
    #[serde(default)]
    tags: Option<Vec<String>>,
    cancelled_at: Option<String>,
    subtotal_price_set: Option<PriceSet>,
    customer: Option<CustomerNode>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct PriceSet {
    presentment_money: Option<MoneyNode>,
}

#[derive(Debug, Deserialize)]
struct MoneyNode {
    amount: Amount,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct CustomerNode {
    first_name: Option<String>,
    last_name: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct VariantNode {
    id: String,
    title: String,
    sku: Option<String>,
    available_for_sale: bool,
    price: Amount,
    inventory_quantity: Option<i64>,
    display_name: String,
    updated_at: Option<String>,
}

/// Money arrives as a decimal string; older API versions sent a number.
#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum Amount {
    Text(String),
    Number(serde_json::Number),
}

impl Amount {
    fn cents(&self) -> Result<i64, String> {
        match self {
            Self::Text(text) => parse_money(text),
            Self::Number(number) => parse_money(&number.to_string()),
        }
    }
}
