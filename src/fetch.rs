//! Unified fetch wrapper.
//!
//! Every backend call goes through [`Fetcher::fetch_value`]: one attempt, the
//! body read as JSON when it parses and as raw text otherwise, and failures
//! folded into [`FetchError`] with a server-supplied or fallback message.

use serde::de::DeserializeOwned;
use serde_json::Value;
use tracing::{debug, warn};

pub use reqwest::Method;

use crate::error::{DEFAULT_ERROR_MESSAGE, FetchError, TransportError};

const CONTENT_TYPE: &str = "Content-Type";
const APPLICATION_JSON: &str = "application/json";
const NO_CONTENT: u16 = 204;

/// Outgoing request as handed to a [`Transport`].
#[derive(Debug, Clone, PartialEq)]
pub struct HttpRequest {
    pub method: Method,
    pub url: String,
    pub headers: Vec<(String, String)>,
    pub body: Option<String>,
}

impl HttpRequest {
    /// Case-insensitive header lookup.
    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers
            .iter()
            .find(|(key, _)| key.eq_ignore_ascii_case(name))
            .map(|(_, value)| value.as_str())
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct HttpResponse {
    pub status: u16,
    pub body: String,
}

impl HttpResponse {
    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }
}

/// Sends a single request and returns whatever response came back.
///
/// Implementations must not interpret the status code; a 500 is still `Ok`.
pub trait Transport {
    fn send(&self, request: &HttpRequest) -> Result<HttpResponse, TransportError>;
}

/// Blocking reqwest client.
pub struct ReqwestTransport {
    client: reqwest::blocking::Client,
}

impl ReqwestTransport {
    pub fn new() -> Result<Self, TransportError> {
        let client = reqwest::blocking::Client::builder()
            .user_agent(concat!("leak-intake/", env!("CARGO_PKG_VERSION")))
            .build()?;
        Ok(Self { client })
    }
}

impl Transport for ReqwestTransport {
    fn send(&self, request: &HttpRequest) -> Result<HttpResponse, TransportError> {
        let mut builder = self
            .client
            .request(request.method.clone(), request.url.as_str());
        for (name, value) in &request.headers {
            builder = builder.header(name.as_str(), value.as_str());
        }
        if let Some(body) = &request.body {
            builder = builder.body(body.clone());
        }

        let response = builder.send()?;
        let status = response.status().as_u16();
        let body = response.text()?;
        Ok(HttpResponse { status, body })
    }
}

/// Per-call options: method, JSON body and extra headers.
#[derive(Debug, Clone, Default)]
pub struct FetchOptions {
    pub method: Option<Method>,
    pub body: Option<Value>,
    pub headers: Vec<(String, String)>,
}

impl FetchOptions {
    pub fn get() -> Self {
        Self {
            method: Some(Method::GET),
            ..Self::default()
        }
    }

    pub fn post(body: Value) -> Self {
        Self {
            method: Some(Method::POST),
            body: Some(body),
            ..Self::default()
        }
    }

    pub fn with_header(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.headers.push((name.into(), value.into()));
        self
    }
}

pub struct Fetcher<T> {
    transport: T,
    base_url: String,
}

impl<T: Transport> Fetcher<T> {
    pub fn new(transport: T, base_url: impl Into<String>) -> Self {
        Self {
            transport,
            base_url: base_url.into(),
        }
    }

    pub fn transport(&self) -> &T {
        &self.transport
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Joins paths starting with `/` onto the base URL; anything else is used as-is.
    pub fn resolve(&self, url: &str) -> String {
        if url.starts_with('/') {
            format!("{}{}", self.base_url.trim_end_matches('/'), url)
        } else {
            url.to_string()
        }
    }

    /// Issues the request and returns the payload.
    ///
    /// `Ok(None)` means 204 No Content. Any other body that is not valid JSON,
    /// an empty one included, comes back as `Value::String` with the raw text.
    pub fn fetch_value(
        &self,
        url: &str,
        options: FetchOptions,
        fallback_message: Option<&str>,
    ) -> Result<Option<Value>, FetchError> {
        self.execute(self.resolve(url), options, fallback_message)
    }

    /// [`fetch_value`](Self::fetch_value) followed by deserialization into `D`.
    pub fn fetch_json<D: DeserializeOwned>(
        &self,
        url: &str,
        options: FetchOptions,
        fallback_message: Option<&str>,
    ) -> Result<Option<D>, FetchError> {
        let url = self.resolve(url);
        self.execute(url.clone(), options, fallback_message)?
            .map(|value| {
                serde_json::from_value(value).map_err(|source| FetchError::Decode { url, source })
            })
            .transpose()
    }

    fn execute(
        &self,
        url: String,
        options: FetchOptions,
        fallback_message: Option<&str>,
    ) -> Result<Option<Value>, FetchError> {
        let request = build_request(url, options)?;
        debug!(method = %request.method, url = %request.url, "sending request");

        let response = match self.transport.send(&request) {
            Ok(response) => response,
            Err(source) => {
                warn!(url = %request.url, error = %source, "request did not complete");
                return Err(FetchError::Network {
                    message: fallback_message.unwrap_or(DEFAULT_ERROR_MESSAGE).to_string(),
                    source,
                });
            }
        };

        let success = response.is_success();
        let HttpResponse { status, body } = response;
        let payload = read_payload(status, body);

        if !success {
            let message = error_message(payload.as_ref(), fallback_message);
            warn!(url = %request.url, status, %message, "request failed");
            return Err(FetchError::Http { message, status });
        }

        debug!(url = %request.url, status, "request succeeded");
        Ok(payload)
    }
}

fn build_request(url: String, options: FetchOptions) -> Result<HttpRequest, FetchError> {
    let mut headers: Vec<(String, String)> = Vec::new();
    let body = match options.body {
        Some(value) => {
            headers.push((CONTENT_TYPE.to_string(), APPLICATION_JSON.to_string()));
            Some(serde_json::to_string(&value).map_err(FetchError::Encode)?)
        }
        None => None,
    };

    for (name, value) in options.headers {
        headers.retain(|(existing, _)| !existing.eq_ignore_ascii_case(&name));
        headers.push((name, value));
    }

    Ok(HttpRequest {
        method: options.method.unwrap_or(Method::GET),
        url,
        headers,
        body,
    })
}

fn read_payload(status: u16, body: String) -> Option<Value> {
    if status == NO_CONTENT {
        return None;
    }
    match serde_json::from_str::<Value>(&body) {
        Ok(value) => Some(value),
        Err(_) => Some(Value::String(body)),
    }
}

/// `message`, then `Message`, then the caller's fallback, then the default.
fn error_message(payload: Option<&Value>, fallback_message: Option<&str>) -> String {
    payload
        .and_then(|value| {
            value
                .get("message")
                .and_then(Value::as_str)
                .or_else(|| value.get("Message").and_then(Value::as_str))
        })
        .or(fallback_message)
        .unwrap_or(DEFAULT_ERROR_MESSAGE)
        .to_string()
}
