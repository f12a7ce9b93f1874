//! The transport seam: request descriptors, raw responses, and the
//! [`Transport`] trait every HTTP backend implements.
//!
//! The rest of the crate never talks to the network directly. It builds a
//! [`Request`], hands it to a transport, and receives a [`Response`] with
//! the status, decoded JSON body, and headers. Error statuses are *not*
//! failures at this layer; classifying them is the client's job. A
//! transport only fails when no response was obtained at all.

use std::future::Future;
use std::pin::Pin;
use std::sync::Arc;
use std::time::Instant;

use reqwest::header::{CONTENT_TYPE, HeaderMap, HeaderName, HeaderValue};
use reqwest::{Method, Url};
use serde_json::Value;
use tracing::{debug, trace};

use crate::config::ClientConfig;
use crate::error::{Error, Result};

/// Call options: the string-keyed parameter mapping sent with a request.
pub type Options = serde_json::Map<String, Value>;

/// Boxed future returned by [`Transport::dispatch`].
pub type TransportFuture<'a> = Pin<Box<dyn Future<Output = Result<Response>> + Send + 'a>>;

// ── Request / Response ─────────────────────────────────────────────

/// Everything needed to issue (or re-issue) a call: verb, path, options.
#[derive(Debug, Clone, PartialEq)]
pub struct Request {
    pub method: Method,
    pub path: String,
    pub options: Options,
}

impl Request {
    pub fn new(method: Method, path: impl Into<String>, options: Options) -> Self {
        Self {
            method,
            path: path.into(),
            options,
        }
    }

    pub fn get(path: impl Into<String>, options: Options) -> Self {
        Self::new(Method::GET, path, options)
    }

    pub fn post(path: impl Into<String>, options: Options) -> Self {
        Self::new(Method::POST, path, options)
    }

    /// Copy of this request with one option set.
    pub fn with_option(mut self, key: impl Into<String>, value: impl Into<Value>) -> Self {
        self.options.insert(key.into(), value.into());
        self
    }

    pub fn option(&self, key: &str) -> Option<&Value> {
        self.options.get(key)
    }
}

/// A response as seen by the core: status, JSON body, headers.
#[derive(Debug, Clone, Default)]
pub struct Response {
    pub status: u16,
    /// Decoded body. Empty bodies and bodies not labelled as JSON decode to
    /// `Value::Null`.
    pub body: Value,
    pub headers: HeaderMap,
    /// Set when the body claimed to be JSON but failed to parse. `body` is
    /// `Value::Null` in that case.
    pub decode_error: Option<Arc<serde_json::Error>>,
}

impl Response {
    pub fn new(status: u16, body: Value) -> Self {
        Self {
            status,
            body,
            ..Self::default()
        }
    }

    pub fn with_header(mut self, name: HeaderName, value: HeaderValue) -> Self {
        self.headers.insert(name, value);
        self
    }

    pub fn with_decode_error(mut self, error: serde_json::Error) -> Self {
        self.body = Value::Null;
        self.decode_error = Some(Arc::new(error));
        self
    }

    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }
}

// ── Transport trait ────────────────────────────────────────────────

/// Sends a [`Request`] and returns whatever the server answered.
///
/// Uses a boxed future so that `Arc<dyn Transport>` works.
pub trait Transport: Send + Sync {
    fn dispatch(&self, request: &Request) -> TransportFuture<'_>;
}

/// Closure-backed transport. Handy for scripted responses in tests and for
/// bridging to an HTTP stack that already exists in the host program.
pub struct FnTransport<F> {
    f: F,
}

impl<F, Fut> FnTransport<F>
where
    F: Fn(Request) -> Fut + Send + Sync,
    Fut: Future<Output = Result<Response>> + Send + 'static,
{
    pub fn new(f: F) -> Self {
        Self { f }
    }
}

impl<F, Fut> Transport for FnTransport<F>
where
    F: Fn(Request) -> Fut + Send + Sync,
    Fut: Future<Output = Result<Response>> + Send + 'static,
{
    fn dispatch(&self, request: &Request) -> TransportFuture<'_> {
        Box::pin((self.f)(request.clone()))
    }
}

// ── reqwest backend ────────────────────────────────────────────────

/// HTTP transport backed by `reqwest`.
///
/// GET and DELETE send options as query parameters; other verbs send them
/// as a JSON object body. Request signing is left to the host: a bearer
/// token, when configured, is the only credential attached.
pub struct ReqwestTransport {
    client: reqwest::Client,
    base_url: Url,
    bearer_token: Option<String>,
}

impl ReqwestTransport {
    pub fn new(config: &ClientConfig) -> Result<Self> {
        let client = reqwest::Client::builder()
            .user_agent(config.user_agent.as_str())
            .timeout(config.timeout)
            .build()
            .map_err(Error::transport)?;
        let base_url = Url::parse(&config.base_url).map_err(Error::transport)?;
        Ok(Self {
            client,
            base_url,
            bearer_token: config.bearer_token.clone(),
        })
    }

    async fn send(&self, request: Request) -> Result<Response> {
        let mut url = self
            .base_url
            .join(&request.path)
            .map_err(Error::transport)?;

        let carries_query = matches!(request.method, Method::GET | Method::DELETE);
        if carries_query {
            let pairs = option_pairs(&request.options);
            if !pairs.is_empty() {
                url.query_pairs_mut().extend_pairs(pairs);
            }
        }

        let mut builder = self.client.request(request.method.clone(), url);
        if let Some(token) = &self.bearer_token {
            builder = builder.bearer_auth(token);
        }
        if !carries_query {
            builder = builder.json(&request.options);
        }

        let start = Instant::now();
        let resp = builder.send().await.map_err(Error::transport)?;
        let status = resp.status().as_u16();
        let headers = resp.headers().clone();
        let text = resp.text().await.map_err(Error::transport)?;

        debug!(
            "{} {} -> HTTP {} in {:.2}s ({} bytes)",
            request.method,
            request.path,
            status,
            start.elapsed().as_secs_f64(),
            text.len()
        );

        let response = Response {
            status,
            headers,
            ..Response::default()
        };
        Ok(decode_body(response, &text, &request.path))
    }
}

/// Parse `text` into `response.body`.
///
/// Blank text is `Null`. Text that fails to parse is `Null` too unless the
/// response says it is JSON, in which case the parse error is kept on
/// [`Response::decode_error`] for the client to report.
fn decode_body(mut response: Response, text: &str, path: &str) -> Response {
    if text.trim().is_empty() {
        return response;
    }
    match serde_json::from_str(text) {
        Ok(body) => {
            response.body = body;
            response
        }
        Err(e) if labelled_json(&response.headers) => {
            debug!("malformed JSON body for {path}: {e}");
            response.with_decode_error(e)
        }
        Err(e) => {
            trace!("non-JSON body for {path}: {e}");
            response
        }
    }
}

fn labelled_json(headers: &HeaderMap) -> bool {
    headers
        .get(CONTENT_TYPE)
        .and_then(|v| v.to_str().ok())
        .is_some_and(|ct| ct.to_ascii_lowercase().contains("json"))
}

impl Transport for ReqwestTransport {
    fn dispatch(&self, request: &Request) -> TransportFuture<'_> {
        Box::pin(self.send(request.clone()))
    }
}

/// Flatten options into `(key, value)` string pairs for a query string.
///
/// Strings pass through, numbers and booleans use their JSON text, arrays
/// are comma-joined, objects are sent as JSON text, and nulls are dropped.
pub fn option_pairs(options: &Options) -> Vec<(String, String)> {
    options
        .iter()
        .filter_map(|(key, value)| option_text(value).map(|text| (key.clone(), text)))
        .collect()
}

fn option_text(value: &Value) -> Option<String> {
    match value {
        Value::Null => None,
        Value::String(s) => Some(s.clone()),
        Value::Array(items) => Some(
            items
                .iter()
                .filter_map(option_text)
                .collect::<Vec<_>>()
                .join(","),
        ),
        other => Some(other.to_string()),
    }
}
