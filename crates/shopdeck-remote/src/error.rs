// Copyright 2026 Phillip Cloud
// Licensed under the Apache License, Version 2.0

use thiserror::Error;

use crate::EntityKind;

/// Everything that can go wrong between asking for a page of records and
/// holding decoded records. None of these are retried.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RetrievalError {
    #[error("page size {requested} is outside 1..={max}")]
    PageSize { requested: u32, max: u32 },
    #[error("{operation} needs {expected} records, request asked for {requested}")]
    Kind {
        operation: &'static str,
        expected: EntityKind,
        requested: EntityKind,
    },
    #[error("cannot reach {endpoint} ({reason})")]
    Connection { endpoint: String, reason: String },
    #[error("server error ({status}): {message}")]
    Status { status: u16, message: String },
    #[error("decode response body: {0}")]
    Body(String),
    #[error("remote rejected query: {0}")]
    Remote(String),
    #[error("malformed response envelope at {path}")]
    Envelope { path: String },
    #[error("{kind} record {index}: {reason}")]
    Record {
        kind: EntityKind,
        index: usize,
        reason: String,
    },
}

impl RetrievalError {
    pub(crate) fn envelope(path: impl Into<String>) -> Self {
        Self::Envelope { path: path.into() }
    }
}
