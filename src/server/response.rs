use http::StatusCode;
use serde::{Deserialize, Serialize};

/// Status line used when a response does not set one
pub const DEFAULT_STATUS: &str = "200 OK";

/// Header list used when a response does not set any
pub const DEFAULT_CONTENT_TYPE: (&str, &str) = ("Content-type", "text/plain");

const NOT_FOUND_STATUS: &str = "404 Not Found";

/// Response value built by a handler
///
/// Only the body is required. Status and headers stay unset unless the handler
/// needs them; defaults are filled in by [`translate`], never stored here.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Response {
    /// Full status line, e.g. `"201 Created"`
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub status: Option<String>,
    /// Header pairs in the order they should be sent
    #[serde(default)]
    pub headers: Vec<(String, String)>,
    pub body: String,
}

impl Response {
    #[must_use]
    pub fn new(body: impl Into<String>) -> Self {
        Self {
            status: None,
            headers: Vec::new(),
            body: body.into(),
        }
    }

    /// Set the status line verbatim
    #[must_use]
    pub fn with_status(mut self, status: impl Into<String>) -> Self {
        self.status = Some(status.into());
        self
    }

    /// Set the status line from a numeric code and its canonical reason phrase
    #[must_use]
    pub fn with_status_code(mut self, code: StatusCode) -> Self {
        self.status = Some(status_line(code));
        self
    }

    /// Append a header pair
    #[must_use]
    pub fn with_header(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.headers.push((name.into(), value.into()));
        self
    }

    /// The response of the built-in not-found handler
    #[must_use]
    pub fn not_found() -> Self {
        Self::new(NOT_FOUND_STATUS)
            .with_status(NOT_FOUND_STATUS)
            .with_header(DEFAULT_CONTENT_TYPE.0, DEFAULT_CONTENT_TYPE.1)
    }
}

/// A response in the shape the host transport consumes
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TransportResponse {
    /// Status line sent to the host
    pub status: String,
    /// Header pairs sent to the host
    pub headers: Vec<(String, String)>,
    /// Body chunks; always exactly one
    pub body: Vec<Vec<u8>>,
}

impl TransportResponse {
    /// All body chunks joined
    #[must_use]
    pub fn body_bytes(&self) -> Vec<u8> {
        self.body.concat()
    }
}

/// The host side of the two-step response protocol
///
/// [`App::call`](crate::dispatcher::App::call) invokes `start_response` exactly once
/// per request, before handing back the body chunks. Closures of the matching shape
/// implement this trait.
pub trait StartResponse {
    fn start_response(&mut self, status: &str, headers: &[(String, String)]);
}

impl<F> StartResponse for F
where
    F: FnMut(&str, &[(String, String)]),
{
    fn start_response(&mut self, status: &str, headers: &[(String, String)]) {
        self(status, headers)
    }
}

/// Convert a handler's response into the transport response
///
/// 1. Status is the response's status, or `200 OK`.
/// 2. Headers are the response's headers if any, else `Content-type: text/plain`.
///    Explicit headers are never merged with the default.
/// 3. The body is UTF-8 encoded into a single chunk.
#[must_use]
pub fn translate(response: Response) -> TransportResponse {
    let Response {
        status,
        headers,
        body,
    } = response;

    let status = status.unwrap_or_else(|| DEFAULT_STATUS.to_string());
    let headers = if headers.is_empty() {
        vec![(
            DEFAULT_CONTENT_TYPE.0.to_string(),
            DEFAULT_CONTENT_TYPE.1.to_string(),
        )]
    } else {
        headers
    };

    TransportResponse {
        status,
        headers,
        body: vec![body.into_bytes()],
    }
}

/// Format a status line (`"404 Not Found"`) for a status code
#[must_use]
pub fn status_line(code: StatusCode) -> String {
    match code.canonical_reason() {
        Some(reason) => format!("{} {reason}", code.as_u16()),
        None => code.as_u16().to_string(),
    }
}

/// Extract the numeric code from a status line such as `"201 Created"`
#[must_use]
pub fn parse_status_code(status: &str) -> Option<StatusCode> {
    let code = status.split_whitespace().next()?;
    StatusCode::from_bytes(code.as_bytes()).ok()
}
