// Copyright 2026 Phillip Cloud
// Licensed under the Apache License, Version 2.0

use anyhow::{Context, Result, bail};
use reqwest::StatusCode;
use reqwest::blocking::Client as HttpClient;
use serde::Deserialize;
use serde_json::Value;
use std::fmt;
use std::time::Duration;
use url::Url;

use crate::{GraphqlRequest, RetrievalError};

pub const ACCESS_TOKEN_HEADER: &str = "X-Shopify-Access-Token";

/// Runs one GraphQL request and hands back the raw response body.
pub trait QueryTransport {
    fn execute(&self, request: &GraphqlRequest) -> Result<Value, RetrievalError>;
}

impl<T: QueryTransport + ?Sized> QueryTransport for &T {
    fn execute(&self, request: &GraphqlRequest) -> Result<Value, RetrievalError> {
        (**self).execute(request)
    }
}

impl<T: QueryTransport + ?Sized> QueryTransport for Box<T> {
    fn execute(&self, request: &GraphqlRequest) -> Result<Value, RetrievalError> {
        (**self).execute(request)
    }
}

/// `https://<shop>/admin/api/<version>/graphql.json`. A shop value that
/// already carries a scheme is used as the base as-is.
pub fn graphql_endpoint(shop: &str, api_version: &str) -> Result<Url> {
    let shop = shop.trim().trim_end_matches('/');
    if shop.is_empty() {
        bail!("shop.domain must not be empty");
    }
    let api_version = api_version.trim();
    if api_version.is_empty() {
        bail!("shop.api_version must not be empty");
    }

    let base = if shop.contains("://") {
        shop.to_owned()
    } else {
        format!("https://{shop}")
    };
    let base = Url::parse(&base).with_context(|| format!("invalid shop domain {shop:?}"))?;
    base.join(&format!("/admin/api/{api_version}/graphql.json"))
        .with_context(|| format!("build GraphQL endpoint for {shop:?}"))
}

#[derive(Clone)]
pub struct HttpTransport {
    endpoint: Url,
    access_token: String,
    timeout: Duration,
    http: HttpClient,
}

impl fmt::Debug for HttpTransport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("HttpTransport")
            .field("endpoint", &self.endpoint.as_str())
            .field("access_token", &"<redacted>")
            .field("timeout", &self.timeout)
            .finish()
    }
}

impl HttpTransport {
    pub fn new(endpoint: Url, access_token: &str, timeout: Duration) -> Result<Self> {
        if access_token.trim().is_empty() {
            bail!("shop.access_token must not be empty -- set it in the config or SHOPDECK_ACCESS_TOKEN");
        }

        let http = HttpClient::builder()
            .timeout(timeout)
            .build()
            .context("build HTTP client")?;

        Ok(Self {
            endpoint,
            access_token: access_token.trim().to_owned(),
            timeout,
            http,
        })
    }

    pub fn for_shop(
        shop: &str,
        api_version: &str,
        access_token: &str,
        timeout: Duration,
    ) -> Result<Self> {
        Self::new(graphql_endpoint(shop, api_version)?, access_token, timeout)
    }

    pub fn endpoint(&self) -> &Url {
        &self.endpoint
    }

    pub fn timeout(&self) -> Duration {
        self.timeout
    }
}

impl QueryTransport for HttpTransport {
    fn execute(&self, request: &GraphqlRequest) -> Result<Value, RetrievalError> {
        let response = self
            .http
            .post(self.endpoint.clone())
            .header(ACCESS_TOKEN_HEADER, &self.access_token)
            .json(request)
            .send()
            .map_err(|error| connection_error(&self.endpoint, error))?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().unwrap_or_default();
            return Err(clean_error_response(status, &body));
        }

        response
            .json::<Value>()
            .map_err(|error| RetrievalError::Body(error.to_string()))
    }
}

fn connection_error(endpoint: &Url, error: reqwest::Error) -> RetrievalError {
    let reason = if error.is_timeout() {
        "timed out".to_owned()
    } else {
        error.to_string()
    };
    RetrievalError::Connection {
        endpoint: endpoint.as_str().to_owned(),
        reason,
    }
}

fn clean_error_response(status: StatusCode, body: &str) -> RetrievalError {
    let status_code = status.as_u16();
    if let Ok(parsed) = serde_json::from_str::<AdminErrorEnvelope>(body) {
        let message = match parsed.errors {
            Some(AdminErrors::Message(message)) => message,
            Some(AdminErrors::List(entries)) => entries
                .into_iter()
                .map(|entry| entry.message)
                .filter(|message| !message.is_empty())
                .collect::<Vec<_>>()
                .join("; "),
            None => String::new(),
        };
        if !message.is_empty() {
            return RetrievalError::Status {
                status: status_code,
                message,
            };
        }
    }

    let trimmed = body.trim();
    let message = if !trimmed.is_empty() && trimmed.len() < 100 && !trimmed.contains('{') {
        trimmed.to_owned()
    } else {
        status
            .canonical_reason()
            .unwrap_or("unexpected status")
            .to_owned()
    };
    RetrievalError::Status {
        status: status_code,
        message,
    }
}

#[derive(Debug, Deserialize)]
struct AdminErrorEnvelope {
    errors: Option<AdminErrors>,
}

#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum AdminErrors {
    Message(String),
    List(Vec<AdminErrorEntry>),
}

#[derive(Debug, Deserialize)]
struct AdminErrorEntry {
    #[serde(default)]
    message: String,
}

#[cfg(test)]
mod tests {
    use super::{HttpTransport, clean_error_response, graphql_endpoint};
    use crate::RetrievalError;
    use reqwest::StatusCode;
    use std::time::Duration;

    #[test]
    fn endpoint_for_bare_domain_uses_https() {
        let url = graphql_endpoint("demo.myshopify.com", "2024-01").expect("endpoint");
        assert_eq!(
            url.as_str(),
            "https://demo.myshopify.com/admin/api/2024-01/graphql.json"
        );
    }

    #[test]
    fn endpoint_keeps_explicit_scheme_and_port() {
        let url = graphql_endpoint("http://127.0.0.1:8080/", "unstable").expect("endpoint");
        assert_eq!(
            url.as_str(),
            "http://127.0.0.1:8080/admin/api/unstable/graphql.json"
        );
    }

    #[test]
    fn endpoint_rejects_empty_parts() {
        assert!(graphql_endpoint("  ", "2024-01").is_err());
        assert!(graphql_endpoint("demo.myshopify.com", "").is_err());
    }

    #[test]
    fn transport_requires_token() {
        let error = HttpTransport::for_shop("demo.myshopify.com", "2024-01", " ", Duration::from_secs(1))
            .expect_err("empty token rejected");
        assert!(error.to_string().contains("SHOPDECK_ACCESS_TOKEN"));
    }

    #[test]
    fn debug_output_hides_token() {
        let transport = HttpTransport::for_shop(
            "demo.myshopify.com",
            "2024-01",
            "shpat_secret",
            Duration::from_secs(1),
        )
        .expect("transport");
        let rendered = format!("{transport:?}");
        assert!(!rendered.contains("shpat_secret"));
        assert!(rendered.contains("<redacted>"));
    }

    #[test]
    fn clean_error_prefers_admin_messages() {
        assert_eq!(
            clean_error_response(
                StatusCode::UNAUTHORIZED,
                r#"{"errors":"[API] Invalid API key or access token"}"#
            ),
            RetrievalError::Status {
                status: 401,
                message: "[API] Invalid API key or access token".to_owned()
            }
        );
        assert_eq!(
            clean_error_response(
                StatusCode::BAD_REQUEST,
                r#"{"errors":[{"message":"first too large"}]}"#
            ),
            RetrievalError::Status {
                status: 400,
                message: "first too large".to_owned()
            }
        );
    }

    #[test]
    fn clean_error_falls_back_to_short_text_or_reason() {
        assert_eq!(
            clean_error_response(StatusCode::BAD_GATEWAY, "upstream down"),
            RetrievalError::Status {
                status: 502,
                message: "upstream down".to_owned()
            }
        );
        assert_eq!(
            clean_error_response(StatusCode::SERVICE_UNAVAILABLE, "{\"unexpected\": true}"),
            RetrievalError::Status {
                status: 503,
                message: "Service Unavailable".to_owned()
            }
        );
    }
}
