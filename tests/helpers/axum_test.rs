// ABOUTME: Axum HTTP testing utilities for integration tests
// ABOUTME: Drives routers in-process with tower oneshot and captures status, headers, and body

use axum::{
    body::Body,
    http::{header, HeaderMap, Method, Request, StatusCode},
    Router,
};
use serde::Serialize;
use std::time::Duration;
use tower::ServiceExt;

/// Helper to build and execute HTTP requests against Axum routers
pub struct AxumTestRequest {
    method: Method,
    uri: String,
    headers: Vec<(String, String)>,
    body: Option<String>,
}

impl AxumTestRequest {
    fn new(method: Method, uri: &str) -> Self {
        Self {
            method,
            uri: uri.to_owned(),
            headers: Vec::new(),
            body: None,
        }
    }

    /// Create a new GET request
    pub fn get(uri: &str) -> Self {
        Self::new(Method::GET, uri)
    }

    /// Create a new POST request
    pub fn post(uri: &str) -> Self {
        Self::new(Method::POST, uri)
    }

    /// Create a new DELETE request
    pub fn delete(uri: &str) -> Self {
        Self::new(Method::DELETE, uri)
    }

    /// Add a header to the request
    pub fn header(mut self, key: &str, value: &str) -> Self {
        self.headers.push((key.to_owned(), value.to_owned()));
        self
    }

    /// Attach the MCP session token
    pub fn session(self, token: &str) -> Self {
        self.header("mcp-session-id", token)
    }

    /// Add JSON body to the request
    pub fn json<T: Serialize>(mut self, data: &T) -> Self {
        self.body = Some(serde_json::to_string(data).expect("Failed to serialize JSON"));
        self.headers.push((
            header::CONTENT_TYPE.as_str().to_owned(),
            "application/json".to_owned(),
        ));
        self
    }

    /// Add a raw body to the request
    pub fn raw_body(mut self, body: &str) -> Self {
        self.body = Some(body.to_owned());
        self
    }

    fn build(self) -> Request<Body> {
        let mut builder = Request::builder().method(self.method).uri(self.uri);
        for (key, value) in self.headers {
            builder = builder.header(key, value);
        }
        builder
            .body(Body::from(self.body.unwrap_or_default()))
            .expect("Failed to build request")
    }

    /// Execute the request against an Axum router
    pub async fn send(self, app: Router) -> AxumTestResponse {
        let response = app
            .oneshot(self.build())
            .await
            .expect("Failed to execute request");

        AxumTestResponse::from_response(response).await
    }

    /// Execute request for SSE endpoints, reading at most the first chunk
    ///
    /// SSE streams stay open, so the body read gives up after a short wait.
    pub async fn send_sse(self, app: Router) -> AxumTestResponse {
        let response = app
            .oneshot(self.build())
            .await
            .expect("Failed to execute request");

        let status = response.status();
        let headers = response.headers().clone();
        let body_result = tokio::time::timeout(
            Duration::from_millis(200),
            axum::body::to_bytes(response.into_body(), 1024),
        )
        .await;
        let body = match body_result {
            Ok(Ok(bytes)) => bytes.to_vec(),
            Ok(Err(_)) | Err(_) => Vec::new(),
        };

        AxumTestResponse {
            status,
            headers,
            body,
        }
    }
}

/// Wrapper around Axum HTTP response for testing
pub struct AxumTestResponse {
    status: StatusCode,
    headers: HeaderMap,
    body: Vec<u8>,
}

impl AxumTestResponse {
    async fn from_response(response: axum::http::Response<Body>) -> Self {
        let status = response.status();
        let headers = response.headers().clone();
        let body = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .expect("Failed to read response body")
            .to_vec();
        Self {
            status,
            headers,
            body,
        }
    }

    /// Get the response status code as u16 for easy assertion
    pub const fn status(&self) -> u16 {
        self.status.as_u16()
    }

    /// Header value as a string, if present
    pub fn header(&self, name: &str) -> Option<String> {
        self.headers
            .get(name)
            .and_then(|value| value.to_str().ok())
            .map(ToOwned::to_owned)
    }

    /// The `mcp-session-id` response header
    pub fn session_id(&self) -> Option<String> {
        self.header("mcp-session-id")
    }

    /// Whether the body is empty
    pub fn body_is_empty(&self) -> bool {
        self.body.is_empty()
    }

    /// Get the response body as a JSON value
    pub fn json<T: serde::de::DeserializeOwned>(&self) -> T {
        serde_json::from_slice(&self.body).expect("Failed to deserialize JSON response")
    }

    /// Get the response body as a string
    pub fn text(&self) -> String {
        String::from_utf8(self.body.clone()).expect("Failed to decode response as UTF-8")
    }
}
