// ABOUTME: In-process stub HTTP servers standing in for the GitHub and Copilot APIs
// ABOUTME: Binds an ephemeral localhost port and records what each request carried
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Blackbeard Extension Contributors

use std::sync::{Arc, Mutex};

use axum::Router;
use tokio::net::TcpListener;

/// One request as seen by a stub server
#[derive(Debug, Clone)]
pub struct CapturedRequest {
    pub path: String,
    pub authorization: Option<String>,
    pub accept: Option<String>,
    pub user_agent: Option<String>,
    pub body: String,
}

/// Requests received by a stub, in arrival order
pub type Captured = Arc<Mutex<Vec<CapturedRequest>>>;

/// Record the interesting parts of an incoming request
pub fn capture(
    captured: &Captured,
    uri: &axum::http::Uri,
    headers: &axum::http::HeaderMap,
    body: String,
) {
    let header = |name: &str| {
        headers
            .get(name)
            .and_then(|v| v.to_str().ok())
            .map(str::to_owned)
    };
    captured.lock().unwrap().push(CapturedRequest {
        path: uri.path().to_owned(),
        authorization: header("authorization"),
        accept: header("accept"),
        user_agent: header("user-agent"),
        body,
    });
}

/// Serve `router` on `127.0.0.1:0`, returning its base URL
pub async fn spawn(router: Router) -> String {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, router).await.unwrap();
    });
    format!("http://{addr}")
}

/// Base URL of a port nothing is listening on
pub async fn closed_port_url() -> String {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    drop(listener);
    format!("http://{addr}")
}
