// Copyright 2026 Phillip Cloud
// Licensed under the Apache License, Version 2.0

use anyhow::{Result, anyhow};
use serde_json::Value;
use shopdeck_remote::{
    ACCESS_TOKEN_HEADER, FetchRequest, HttpTransport, RecordFetcher, RetrievalError,
};
use shopdeck_testkit::{CommerceFaker, orders_envelope};
use std::thread;
use std::time::Duration;
use tiny_http::{Header, Method, Response, Server};

fn json_header() -> Header {
    Header::from_bytes("Content-Type", "application/json").expect("valid content type header")
}

#[test]
fn unreachable_shop_is_a_connection_error() -> Result<()> {
    let transport = HttpTransport::for_shop(
        "http://127.0.0.1:1",
        "2024-01",
        "shpat_test",
        Duration::from_millis(50),
    )?;
    let error = RecordFetcher::new(transport)
        .fetch_orders(&FetchRequest::orders(10))
        .expect_err("fetch should fail for unreachable endpoint");
    assert!(matches!(error, RetrievalError::Connection { .. }), "{error:?}");
    Ok(())
}

#[test]
fn fetch_orders_posts_graphql_with_token() -> Result<()> {
    let server =
        Server::http("127.0.0.1:0").map_err(|error| anyhow!("start mock server: {error}"))?;
    let addr = format!("http://{}", server.server_addr());

    let mut faker = CommerceFaker::new(31);
    let orders = faker.orders(3);
    let body = orders_envelope(&orders).to_string();

    let handle = thread::spawn(move || {
        let mut request = server.recv().expect("request expected");
        assert_eq!(request.method(), &Method::Post);
        assert_eq!(request.url(), "/admin/api/2024-01/graphql.json");
        let token = request
            .headers()
            .iter()
            .find(|header| header.field.equiv(ACCESS_TOKEN_HEADER))
            .map(|header| header.value.as_str().to_owned());
        assert_eq!(token.as_deref(), Some("shpat_test"));

        let payload = std::io::read_to_string(request.as_reader()).expect("read request body");
        let payload: Value = serde_json::from_str(&payload).expect("json body");
        assert!(
            payload["query"]
                .as_str()
                .is_some_and(|query| query.contains("orders(first: $first"))
        );
        assert_eq!(payload["variables"]["first"], Value::from(3));

        let response = Response::from_string(body)
            .with_status_code(200)
            .with_header(json_header());
        request.respond(response).expect("response should succeed");
    });

    let transport =
        HttpTransport::for_shop(&addr, "2024-01", "shpat_test", Duration::from_secs(2))?;
    let fetched = RecordFetcher::new(transport).fetch_orders(&FetchRequest::orders(3))?;
    assert_eq!(fetched, orders);

    handle.join().map_err(|_| anyhow!("server thread panicked"))?;
    Ok(())
}

#[test]
fn non_success_status_surfaces_admin_message() -> Result<()> {
    let server =
        Server::http("127.0.0.1:0").map_err(|error| anyhow!("start mock server: {error}"))?;
    let addr = format!("http://{}", server.server_addr());

    let handle = thread::spawn(move || {
        let request = server.recv().expect("request expected");
        let response =
            Response::from_string(r#"{"errors":"[API] Invalid API key or access token"}"#)
                .with_status_code(401)
                .with_header(json_header());
        request.respond(response).expect("response should succeed");
    });

    let transport =
        HttpTransport::for_shop(&addr, "2024-01", "shpat_wrong", Duration::from_secs(2))?;
    let error = RecordFetcher::new(transport)
        .fetch_variants(&FetchRequest::variants(5))
        .expect_err("401 should fail");
    assert_eq!(
        error,
        RetrievalError::Status {
            status: 401,
            message: "[API] Invalid API key or access token".to_owned(),
        }
    );

    handle.join().map_err(|_| anyhow!("server thread panicked"))?;
    Ok(())
}

#[test]
fn non_json_body_is_a_body_error() -> Result<()> {
    let server =
        Server::http("127.0.0.1:0").map_err(|error| anyhow!("start mock server: {error}"))?;
    let addr = format!("http://{}", server.server_addr());

    let handle = thread::spawn(move || {
        let request = server.recv().expect("request expected");
        let response = Response::from_string("<html>maintenance</html>").with_status_code(200);
        request.respond(response).expect("response should succeed");
    });

    let transport =
        HttpTransport::for_shop(&addr, "2024-01", "shpat_test", Duration::from_secs(2))?;
    let error = RecordFetcher::new(transport)
        .fetch_orders(&FetchRequest::orders(5))
        .expect_err("html body should fail");
    assert!(matches!(error, RetrievalError::Body(_)), "{error:?}");

    handle.join().map_err(|_| anyhow!("server thread panicked"))?;
    Ok(())
}
