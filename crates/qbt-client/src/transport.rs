//! HTTP transport abstraction.
//!
//! [`HttpTransport`] is the single seam between [`ApiClient`](crate::ApiClient) and the
//! network. The default implementation, [`ReqwestTransport`], keeps a cookie store so the
//! session cookie issued at login is replayed on every later request.

use std::{fmt, time::Duration};

use reqwest::blocking::{
    Client,
    multipart::{Form, Part},
};
use reqwest::header::REFERER;
use thiserror::Error;
use tracing::debug;
use url::Url;

/// Errors raised below the HTTP status level.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum TransportError {
    /// The HTTP client could not be built.
    #[error("failed to build HTTP client: {0}")]
    Build(String),

    /// The request could not be sent or the response could not be read.
    #[error("{0}")]
    Request(String),
}

/// HTTP methods used by the Web API.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Method {
    /// `GET`
    Get,
    /// `POST`
    Post,
}

impl Method {
    /// Upper-case method name.
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Get => "GET",
            Self::Post => "POST",
        }
    }
}

impl fmt::Display for Method {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A file sent as one multipart field.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FilePart {
    /// Form field name.
    pub field: String,
    /// File name reported to the server.
    pub file_name: String,
    /// File contents.
    pub bytes: Vec<u8>,
}

/// A fully resolved request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HttpRequest {
    /// Request method.
    pub method: Method,
    /// Absolute endpoint URL.
    pub url: Url,
    /// Value of the `Referer` header.
    pub referer: String,
    /// Query string pairs.
    pub query: Vec<(String, String)>,
    /// Form fields. Sent urlencoded, or as multipart text fields when `files` is non-empty.
    pub form: Vec<(String, String)>,
    /// File payloads.
    pub files: Vec<FilePart>,
}

/// What the client needs to know about a response.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct HttpResponse {
    /// HTTP status code.
    pub status: u16,
    /// Response body as text.
    pub body: String,
    /// Names of the cookies set by this response.
    pub cookies: Vec<String>,
}

impl HttpResponse {
    /// Whether the status is in the 2xx range.
    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }
}

/// Sends one request and waits for the response.
#[cfg_attr(test, mockall::automock)]
pub trait HttpTransport {
    /// Sends `request`. Non-2xx responses are returned as `Ok`; only failures to get a
    /// response at all are errors.
    fn send(&self, request: &HttpRequest) -> Result<HttpResponse, TransportError>;
}

/// [`HttpTransport`] backed by a blocking `reqwest` client with a cookie store.
#[derive(Debug, Clone)]
pub struct ReqwestTransport {
    client: Client,
}

impl ReqwestTransport {
    /// Builds a transport whose requests time out after `timeout`.
    pub fn new(timeout: Duration) -> Result<Self, TransportError> {
        let client = Client::builder()
            .cookie_store(true)
            .timeout(timeout)
            .build()
            .map_err(|e| TransportError::Build(e.to_string()))?;
        Ok(Self { client })
    }
}

impl HttpTransport for ReqwestTransport {
    fn send(&self, request: &HttpRequest) -> Result<HttpResponse, TransportError> {
        let method = match request.method {
            Method::Get => reqwest::Method::GET,
            Method::Post => reqwest::Method::POST,
        };

        let mut builder = self
            .client
            .request(method, request.url.clone())
            .header(REFERER, request.referer.as_str());

        if !request.query.is_empty() {
            builder = builder.query(&request.query);
        }

        if !request.files.is_empty() {
            let mut form = Form::new();
            for (name, value) in &request.form {
                form = form.text(name.clone(), value.clone());
            }
            for file in &request.files {
                let part = Part::bytes(file.bytes.clone()).file_name(file.file_name.clone());
                form = form.part(file.field.clone(), part);
            }
            builder = builder.multipart(form);
        } else if !request.form.is_empty() {
            builder = builder.form(&request.form);
        }

        let response = builder
            .send()
            .map_err(|e| TransportError::Request(e.to_string()))?;

        let status = response.status().as_u16();
        let cookies = response
            .cookies()
            .map(|cookie| cookie.name().to_string())
            .collect::<Vec<_>>();
        debug!(status, ?cookies, "received response");

        let body = response
            .text()
            .map_err(|e| TransportError::Request(e.to_string()))?;

        Ok(HttpResponse {
            status,
            body,
            cookies,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn success_range() {
        let response = |status| HttpResponse {
            status,
            ..Default::default()
        };
        assert!(response(200).is_success());
        assert!(response(204).is_success());
        assert!(!response(199).is_success());
        assert!(!response(301).is_success());
        assert!(!response(403).is_success());
    }

    #[test]
    fn method_names() {
        assert_eq!(Method::Get.to_string(), "GET");
        assert_eq!(Method::Post.as_str(), "POST");
    }

    #[test]
    fn unreachable_host_is_a_request_error() {
        let transport = ReqwestTransport::new(Duration::from_secs(2)).unwrap();
        let request = HttpRequest {
            method: Method::Get,
            // nothing listens on the discard port
            url: Url::parse("http://127.0.0.1:9/api/v2/app/version").unwrap(),
            referer: "http://127.0.0.1:9/".to_string(),
            query: Vec::new(),
            form: Vec::new(),
            files: Vec::new(),
        };

        let err = transport.send(&request).unwrap_err();
        assert!(matches!(err, TransportError::Request(_)));
    }
}
