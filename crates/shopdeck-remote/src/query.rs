// Copyright 2026 Phillip Cloud
// Licensed under the Apache License, Version 2.0

use serde::Serialize;
use serde_json::{Map, Value};
use std::fmt;

use crate::RetrievalError;

/// The admin API refuses larger pages.
pub const MAX_PAGE_SIZE: u32 = 250;

const ORDER_FIELDS: &str = "name id createdAt fullyPaid unpaid tags cancelledAt \
     subtotalPriceSet { presentmentMoney { amount } } customer { firstName lastName }";
const VARIANT_FIELDS: &str =
    "id title sku availableForSale price inventoryQuantity displayName updatedAt";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum EntityKind {
    Order,
    ProductVariant,
}

impl EntityKind {
    pub const fn connection_field(self) -> &'static str {
        match self {
            Self::Order => "orders",
            Self::ProductVariant => "productVariants",
        }
    }

    pub const fn field_selection(self) -> &'static str {
        match self {
            Self::Order => ORDER_FIELDS,
            Self::ProductVariant => VARIANT_FIELDS,
        }
    }

    const fn operation_name(self) -> &'static str {
        match self {
            Self::Order => "ShopdeckOrders",
            Self::ProductVariant => "ShopdeckVariants",
        }
    }
}

impl fmt::Display for EntityKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Order => "order",
            Self::ProductVariant => "product variant",
        })
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FetchRequest {
    pub kind: EntityKind,
    pub page_size: u32,
    /// Admin search syntax, for example `inventory_quantity <= 0`. Sent as a
    /// variable and never spliced into the document.
    pub query_filter: Option<String>,
}

impl FetchRequest {
    pub fn orders(page_size: u32) -> Self {
        Self {
            kind: EntityKind::Order,
            page_size,
            query_filter: None,
        }
    }

    pub fn variants(page_size: u32) -> Self {
        Self {
            kind: EntityKind::ProductVariant,
            page_size,
            query_filter: None,
        }
    }

    pub fn with_query_filter(mut self, filter: impl Into<String>) -> Self {
        self.query_filter = Some(filter.into());
        self
    }

    pub fn validate(&self) -> Result<(), RetrievalError> {
        if self.page_size == 0 || self.page_size > MAX_PAGE_SIZE {
            return Err(RetrievalError::PageSize {
                requested: self.page_size,
                max: MAX_PAGE_SIZE,
            });
        }
        Ok(())
    }
}

/// The JSON body posted to the GraphQL endpoint.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct GraphqlRequest {
    pub query: String,
    pub variables: Map<String, Value>,
}

impl GraphqlRequest {
    pub fn variable(&self, name: &str) -> Option<&Value> {
        self.variables.get(name)
    }
}

/// Builds the connection query for one page. `paginated` adds the
/// `pageInfo` block and the `after` cursor argument.
pub fn build_request(
    request: &FetchRequest,
    after: Option<&str>,
    paginated: bool,
) -> GraphqlRequest {
    let kind = request.kind;
    let (cursor_param, cursor_arg, page_info) = if paginated {
        (
            ", $after: String",
            ", after: $after",
            " pageInfo { hasNextPage endCursor }",
        )
    } else {
        ("", "", "")
    };
    let query = format!(
        "query {operation}($first: Int!, $query: String{cursor_param}) {{ \
         {field}(first: $first, query: $query{cursor_arg}) {{ \
         edges {{ node {{ {fields} }} }}{page_info} }} }}",
        operation = kind.operation_name(),
        field = kind.connection_field(),
        fields = kind.field_selection(),
    );

    let mut variables = Map::new();
    variables.insert("first".to_owned(), Value::from(request.page_size));
    variables.insert(
        "query".to_owned(),
        request
            .query_filter
            .as_deref()
            .map_or(Value::Null, Value::from),
    );
    if paginated {
        variables.insert("after".to_owned(), after.map_or(Value::Null, Value::from));
    }

    GraphqlRequest { query, variables }
}

#[cfg(test)]
mod tests {
    use super::{EntityKind, FetchRequest, MAX_PAGE_SIZE, build_request};
    use crate::RetrievalError;
    use serde_json::Value;

    #[test]
    fn page_size_bounds() {
        assert!(FetchRequest::orders(1).validate().is_ok());
        assert!(FetchRequest::orders(MAX_PAGE_SIZE).validate().is_ok());
        assert_eq!(
            FetchRequest::orders(0).validate(),
            Err(RetrievalError::PageSize {
                requested: 0,
                max: 250
            })
        );
        assert!(FetchRequest::variants(251).validate().is_err());
    }

    #[test]
    fn order_query_selects_fixed_fields() {
        let request = build_request(&FetchRequest::orders(250), None, false);
        assert!(request.query.starts_with("query ShopdeckOrders($first: Int!, $query: String)"));
        assert!(request.query.contains("orders(first: $first, query: $query)"));
        assert!(request.query.contains("edges { node { name id createdAt fullyPaid unpaid"));
        assert!(request.query.contains("presentmentMoney { amount }"));
        assert!(!request.query.contains("pageInfo"));
        assert_eq!(request.variable("first"), Some(&Value::from(250)));
        assert_eq!(request.variable("query"), Some(&Value::Null));
        assert_eq!(request.variable("after"), None);
    }

    #[test]
    fn filter_travels_as_variable() {
        let request = build_request(
            &FetchRequest::variants(50).with_query_filter("inventory_quantity <= 0"),
            None,
            false,
        );
        assert!(!request.query.contains("inventory_quantity"));
        assert!(request.query.contains("productVariants(first: $first, query: $query)"));
        assert_eq!(
            request.variable("query"),
            Some(&Value::from("inventory_quantity <= 0"))
        );
    }

    #[test]
    fn paginated_query_adds_cursor_and_page_info() {
        let request = build_request(&FetchRequest::orders(10), Some("abc"), true);
        assert!(request.query.contains("$after: String"));
        assert!(request.query.contains("after: $after"));
        assert!(request.query.contains("pageInfo { hasNextPage endCursor }"));
        assert_eq!(request.variable("after"), Some(&Value::from("abc")));
    }

    #[test]
    fn kind_labels() {
        assert_eq!(EntityKind::Order.connection_field(), "orders");
        assert_eq!(EntityKind::ProductVariant.connection_field(), "productVariants");
        assert_eq!(EntityKind::ProductVariant.to_string(), "product variant");
    }
}
