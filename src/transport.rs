//! Transport Layer for Status Queries
//!
//! Abstracts the HTTP connection for testability. Provides:
//! - Transport trait: interface for one request/response exchange
//! - HttpTransport: blocking HTTPS client for production
//! - MockTransport: scripted in-process responses for tests
//! - send_request: JSON request helper shared by every waiter

use std::collections::VecDeque;
use std::sync::Mutex;
use std::time::Duration;

use lro_protocol::ApiError;
use log::debug;
use serde_json::{Map, Value};

use crate::config::Config;

/// An outgoing HTTP request
#[derive(Debug, Clone, PartialEq)]
pub struct HttpRequest {
    pub method: String,
    pub url: String,
    pub headers: Vec<(String, String)>,
}

impl HttpRequest {
    /// Look up a header value by case-insensitive name
    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers
            .iter()
            .find(|(k, _)| k.eq_ignore_ascii_case(name))
            .map(|(_, v)| v.as_str())
    }
}

/// A received HTTP response
#[derive(Debug, Clone, PartialEq)]
pub struct HttpResponse {
    pub status: u16,
    pub body: Vec<u8>,
}

impl HttpResponse {
    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }
}

/// Transport trait for status queries
pub trait Transport: Send + Sync {
    /// Execute a request and return the raw response
    fn execute(&self, request: &HttpRequest) -> Result<HttpResponse, TransportError>;
}

/// Transport errors
#[derive(Debug, thiserror::Error)]
pub enum TransportError {
    #[error("Connection failed: {0}")]
    ConnectionFailed(String),

    #[error("Connection timeout")]
    ConnectionTimeout,

    #[error("{0}")]
    Api(ApiError),

    #[error("Invalid response JSON: {0}")]
    Decode(#[from] serde_json::Error),

    #[error("Expected a JSON object in response, got: {0}")]
    NotAnObject(String),
}

impl TransportError {
    /// HTTP status carried by an API error, if any
    pub fn status_code(&self) -> Option<u16> {
        match self {
            TransportError::Api(e) => Some(e.code),
            _ => None,
        }
    }
}

/// Blocking HTTPS transport for production use
pub struct HttpTransport {
    client: reqwest::blocking::Client,
}

impl HttpTransport {
    /// Create a transport whose requests fail after `request_timeout`
    pub fn new(request_timeout: Duration) -> Result<Self, TransportError> {
        let client = reqwest::blocking::Client::builder()
            .timeout(request_timeout)
            .build()
            .map_err(|e| TransportError::ConnectionFailed(format!("Failed to build HTTP client: {}", e)))?;
        Ok(Self { client })
    }
}

impl Transport for HttpTransport {
    fn execute(&self, request: &HttpRequest) -> Result<HttpResponse, TransportError> {
        let method = reqwest::Method::from_bytes(request.method.as_bytes())
            .map_err(|e| TransportError::ConnectionFailed(format!("Invalid method {}: {}", request.method, e)))?;

        let mut builder = self.client.request(method, &request.url);
        for (name, value) in &request.headers {
            builder = builder.header(name.as_str(), value.as_str());
        }

        let response = builder.send().map_err(|e| {
            if e.is_timeout() {
                TransportError::ConnectionTimeout
            } else {
                TransportError::ConnectionFailed(e.to_string())
            }
        })?;

        let status = response.status().as_u16();
        let body = response
            .bytes()
            .map_err(|e| TransportError::ConnectionFailed(format!("Failed to read body: {}", e)))?;

        Ok(HttpResponse {
            status,
            body: body.to_vec(),
        })
    }
}

/// Mock transport for testing - replays scripted responses in order
///
/// The last scripted response repeats once the queue is down to it, so a
/// single pending status keeps an operation running forever.
#[derive(Default)]
pub struct MockTransport {
    responses: Mutex<VecDeque<HttpResponse>>,
    requests: Mutex<Vec<HttpRequest>>,
}

impl MockTransport {
    pub fn new() -> Self {
        Self::default()
    }

    /// Queue a raw response
    pub fn push_response(&self, status: u16, body: impl Into<Vec<u8>>) {
        self.lock_responses().push_back(HttpResponse {
            status,
            body: body.into(),
        });
    }

    /// Queue a JSON response with the given status
    pub fn push_json(&self, status: u16, body: &Value) {
        self.push_response(status, body.to_string());
    }

    /// Queue a 200 response carrying an operation snapshot
    pub fn push_operation(&self, op: &Value) {
        self.push_json(200, op);
    }

    /// Requests seen so far
    pub fn requests(&self) -> Vec<HttpRequest> {
        self.requests.lock().map(|r| r.clone()).unwrap_or_default()
    }

    pub fn request_count(&self) -> usize {
        self.requests.lock().map(|r| r.len()).unwrap_or_default()
    }

    fn lock_responses(&self) -> std::sync::MutexGuard<'_, VecDeque<HttpResponse>> {
        self.responses
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}

impl Transport for MockTransport {
    fn execute(&self, request: &HttpRequest) -> Result<HttpResponse, TransportError> {
        if let Ok(mut seen) = self.requests.lock() {
            seen.push(request.clone());
        }

        let mut responses = self.lock_responses();
        let response = if responses.len() > 1 {
            responses.pop_front()
        } else {
            responses.front().cloned()
        };

        response.ok_or_else(|| {
            TransportError::ConnectionFailed(format!("no scripted response for {}", request.url))
        })
    }
}

/// Options for a single JSON request
#[derive(Debug, Clone, Copy)]
pub struct SendRequestOptions<'a> {
    pub config: &'a Config,
    pub method: &'a str,
    pub raw_url: &'a str,
    pub user_agent: &'a str,
}

/// Send one request and decode the JSON object it returns.
///
/// Non-2xx statuses become [`TransportError::Api`]. An empty body decodes
/// as an empty object. No retries happen here.
pub fn send_request(options: SendRequestOptions<'_>) -> Result<Value, TransportError> {
    let mut headers = vec![("User-Agent".to_string(), options.user_agent.to_string())];
    if let Some(token) = options.config.access_token() {
        headers.push(("Authorization".to_string(), format!("Bearer {}", token)));
    }

    let request = HttpRequest {
        method: options.method.to_string(),
        url: options.raw_url.to_string(),
        headers,
    };

    debug!("{} {}", request.method, request.url);
    let response = options.config.transport().execute(&request)?;

    if !response.is_success() {
        return Err(TransportError::Api(ApiError::from_response(
            response.status,
            &response.body,
        )));
    }

    if response.body.iter().all(u8::is_ascii_whitespace) {
        return Ok(Value::Object(Map::new()));
    }

    match serde_json::from_slice(&response.body)? {
        value @ Value::Object(_) => Ok(value),
        other => Err(TransportError::NotAnObject(other.to_string())),
    }
}
