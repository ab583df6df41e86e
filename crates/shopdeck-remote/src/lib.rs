// Copyright 2026 Phillip Cloud
// Licensed under the Apache License, Version 2.0

mod decode;
mod error;
mod fetcher;
mod query;
mod transport;

pub use decode::{PageInfo, RemoteRecord, parse_money, parse_timestamp};
pub use error::RetrievalError;
pub use fetcher::RecordFetcher;
pub use query::{EntityKind, FetchRequest, GraphqlRequest, MAX_PAGE_SIZE, build_request};
pub use transport::{ACCESS_TOKEN_HEADER, HttpTransport, QueryTransport, graphql_endpoint};
