//! HTTP transport types.
//!
//! # Design
//! `HttpRequest` and `HttpResponse` describe the wire exchange as plain data.
//! `ResourceClient` builds a fully signed `HttpRequest` and hands it to a
//! `Transport`, which performs the I/O and returns an `HttpResponse` for any
//! status code. Status interpretation stays in the client so a transport
//! never decides what counts as failure.
//!
//! All fields use owned types so requests can be recorded and inspected in
//! tests without lifetime concerns.

use std::fmt;

/// HTTP method for a request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HttpMethod {
    Get,
    Post,
    Put,
    Delete,
}

impl HttpMethod {
    /// Whether the verb changes server state and is subject to rate limiting.
    pub fn is_mutating(self) -> bool {
        !matches!(self, HttpMethod::Get)
    }

    pub fn as_str(self) -> &'static str {
        match self {
            HttpMethod::Get => "GET",
            HttpMethod::Post => "POST",
            HttpMethod::Put => "PUT",
            HttpMethod::Delete => "DELETE",
        }
    }
}

impl fmt::Display for HttpMethod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A signed HTTP request described as plain data.
///
/// `url` is absolute and already carries every query parameter, credentials
/// included. Requests never have a body: the remote API takes all input as
/// query parameters.
#[derive(Clone, PartialEq, Eq)]
pub struct HttpRequest {
    pub method: HttpMethod,
    pub url: String,
    pub headers: Vec<(String, String)>,
}

impl fmt::Debug for HttpRequest {
    // The url embeds the API token.
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let path = self.url.split('?').next().unwrap_or_default();
        f.debug_struct("HttpRequest")
            .field("method", &self.method)
            .field("url", &path)
            .field("headers", &self.headers)
            .finish()
    }
}

/// An HTTP response described as plain data.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HttpResponse {
    pub status: u16,
    pub body: String,
}

impl HttpResponse {
    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }

    pub fn is_not_found(&self) -> bool {
        self.status == 404
    }
}

/// A classified response returned to callers.
///
/// `data` is present only for a 2xx response with a non-empty body that was
/// decoded. A 404 arrives here with `data: None`; it is a result, not an
/// error.
#[derive(Debug, Clone, PartialEq)]
pub struct ApiResponse<T> {
    pub status: u16,
    pub data: Option<T>,
    pub body: String,
}

impl<T> ApiResponse<T> {
    pub fn is_not_found(&self) -> bool {
        self.status == 404
    }

    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }

    /// Consume the response, returning the decoded payload if any.
    pub fn into_data(self) -> Option<T> {
        self.data
    }
}
