#![allow(dead_code)]

use std::collections::HashMap;
use std::time::Duration;

use avm_mcp_server::fetch::HttpFetcher;
use avm_mcp_server::github::GitHubClient;
use avm_mcp_server::registry::RegistryClient;
use axum::Router;
use axum::http::{StatusCode, Uri};
use axum::response::{IntoResponse, Response};

/// Serve `app` on an ephemeral local port and return its base URL
pub async fn spawn(app: Router) -> String {
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let address = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });
    format!("http://{address}")
}

/// Base URL where nothing is listening
pub async fn closed_port() -> String {
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let address = listener.local_addr().unwrap();
    drop(listener);
    format!("http://{address}")
}

/// Canned responses keyed by request path and query
pub fn static_routes(routes: HashMap<String, (StatusCode, String)>) -> Router {
    Router::new().fallback(move |uri: Uri| {
        let routes = routes.clone();
        async move {
            let key = uri
                .path_and_query()
                .map(|pq| pq.as_str().to_string())
                .unwrap_or_default();
            match routes.get(&key) {
                Some((status, body)) => (*status, body.clone()).into_response(),
                None => Response::builder()
                    .status(StatusCode::NOT_FOUND)
                    .body(axum::body::Body::from("not found"))
                    .unwrap(),
            }
        }
    })
}

pub fn fetcher() -> HttpFetcher {
    HttpFetcher::new(Duration::from_secs(5)).unwrap()
}

pub fn registry(base_url: &str) -> RegistryClient {
    RegistryClient::new(fetcher(), base_url, 2)
}

pub fn github(raw_base: &str) -> GitHubClient {
    GitHubClient::new(fetcher(), raw_base)
}
