//! Typed error taxonomy for API calls.
//!
//! A failed call surfaces as one of these:
//!
//! - [`Error::Transport`]: the request never produced a response
//!   (connection refused, TLS failure, timeout inside the transport).
//! - [`Error::Api`]: a response arrived but its status marks an API-level
//!   failure. The [`ApiError`] carries the [`ErrorKind`] selected by status
//!   code, the message and numeric code parsed from the body, and the
//!   [`RateLimit`] snapshot from the headers.
//! - [`Error::Hydration`]: the payload was malformed JSON or could not be
//!   turned into the requested domain type. Keeps the response's
//!   [`RateLimit`] snapshot.
//! - [`Error::Identity`]: the credentials endpoint answered without the
//!   fields the default identity needs.
//!
//! Status codes map to kinds through a static registry built once from
//! [`ErrorKind::STATUS_KINDS`]. Some `403 Forbidden` responses are really a
//! more specific conflict ("already favorited"); callers that know which
//! conflict an endpoint can produce use [`disambiguate_forbidden`] to
//! narrow a `Forbidden` kind by exact message match.

pub mod codes;
pub mod rate_limit;

pub use rate_limit::RateLimit;

use std::collections::HashMap;
use std::fmt;
use std::sync::{Arc, LazyLock};

use serde_json::Value;
use thiserror::Error;

use crate::transport::Response;

pub type Result<T, E = Error> = std::result::Result<T, E>;

/// Boxed low-level cause attached to transport failures and API errors.
pub type BoxError = Box<dyn std::error::Error + Send + Sync>;

// ── Kinds ──────────────────────────────────────────────────────────

/// The closed set of API error kinds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorKind {
    BadRequest,
    Unauthorized,
    Forbidden,
    NotFound,
    NotAcceptable,
    UnprocessableEntity,
    TooManyRequests,
    InternalServerError,
    BadGateway,
    ServiceUnavailable,
    GatewayTimeout,
    /// 403 narrowed: the status was already favorited.
    AlreadyFavorited,
    /// 403 narrowed: the status was already retweeted.
    AlreadyRetweeted,
    /// 403 narrowed: the status text duplicates a recent one.
    DuplicateStatus,
    /// Any status not present in the registry.
    Generic,
}

impl ErrorKind {
    /// Kinds selected directly by HTTP status code.
    pub const STATUS_KINDS: [ErrorKind; 11] = [
        ErrorKind::BadRequest,
        ErrorKind::Unauthorized,
        ErrorKind::Forbidden,
        ErrorKind::NotFound,
        ErrorKind::NotAcceptable,
        ErrorKind::UnprocessableEntity,
        ErrorKind::TooManyRequests,
        ErrorKind::InternalServerError,
        ErrorKind::BadGateway,
        ErrorKind::ServiceUnavailable,
        ErrorKind::GatewayTimeout,
    ];

    /// Extra status codes that map onto an existing kind.
    const STATUS_ALIASES: [(u16, ErrorKind); 1] = [(420, ErrorKind::TooManyRequests)];

    /// Canonical HTTP status for this kind. `None` for [`ErrorKind::Generic`].
    pub fn status(self) -> Option<u16> {
        match self {
            ErrorKind::BadRequest => Some(400),
            ErrorKind::Unauthorized => Some(401),
            ErrorKind::Forbidden
            | ErrorKind::AlreadyFavorited
            | ErrorKind::AlreadyRetweeted
            | ErrorKind::DuplicateStatus => Some(403),
            ErrorKind::NotFound => Some(404),
            ErrorKind::NotAcceptable => Some(406),
            ErrorKind::UnprocessableEntity => Some(422),
            ErrorKind::TooManyRequests => Some(429),
            ErrorKind::InternalServerError => Some(500),
            ErrorKind::BadGateway => Some(502),
            ErrorKind::ServiceUnavailable => Some(503),
            ErrorKind::GatewayTimeout => Some(504),
            ErrorKind::Generic => None,
        }
    }

    /// The exact message the API sends for a narrowed 403 kind.
    pub fn canonical_message(self) -> Option<&'static str> {
        match self {
            ErrorKind::AlreadyFavorited => Some("You have already favorited this status."),
            ErrorKind::AlreadyRetweeted => {
                Some("sharing is not permissible for this status (Share validations failed)")
            }
            ErrorKind::DuplicateStatus => Some("Status is a duplicate."),
            _ => None,
        }
    }

    /// Look up the registered kind for a status code.
    pub fn from_status(status: u16) -> ErrorKind {
        REGISTRY
            .get(&status)
            .copied()
            .unwrap_or(ErrorKind::Generic)
    }

    pub fn is_client_error(self) -> bool {
        self.status().is_some_and(|s| (400..500).contains(&s))
    }

    pub fn is_server_error(self) -> bool {
        self.status().is_some_and(|s| (500..600).contains(&s))
    }

    pub fn name(self) -> &'static str {
        match self {
            ErrorKind::BadRequest => "BadRequest",
            ErrorKind::Unauthorized => "Unauthorized",
            ErrorKind::Forbidden => "Forbidden",
            ErrorKind::NotFound => "NotFound",
            ErrorKind::NotAcceptable => "NotAcceptable",
            ErrorKind::UnprocessableEntity => "UnprocessableEntity",
            ErrorKind::TooManyRequests => "TooManyRequests",
            ErrorKind::InternalServerError => "InternalServerError",
            ErrorKind::BadGateway => "BadGateway",
            ErrorKind::ServiceUnavailable => "ServiceUnavailable",
            ErrorKind::GatewayTimeout => "GatewayTimeout",
            ErrorKind::AlreadyFavorited => "AlreadyFavorited",
            ErrorKind::AlreadyRetweeted => "AlreadyRetweeted",
            ErrorKind::DuplicateStatus => "DuplicateStatus",
            ErrorKind::Generic => "Error",
        }
    }
}

impl fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

static REGISTRY: LazyLock<HashMap<u16, ErrorKind>> = LazyLock::new(|| {
    ErrorKind::STATUS_KINDS
        .iter()
        .filter_map(|kind| kind.status().map(|s| (s, *kind)))
        .chain(ErrorKind::STATUS_ALIASES)
        .collect()
});

// ── ApiError ───────────────────────────────────────────────────────

/// A protocol-level failure: the response arrived, the API rejected it.
///
/// Immutable once built. Narrowing with [`disambiguate_forbidden`] builds a
/// new value instead of changing this one.
#[derive(Debug, Clone)]
pub struct ApiError {
    kind: ErrorKind,
    status: u16,
    message: String,
    code: Option<i64>,
    rate_limit: RateLimit,
    cause: Option<Arc<dyn std::error::Error + Send + Sync>>,
}

impl ApiError {
    pub fn new(kind: ErrorKind, status: u16, message: impl Into<String>) -> Self {
        Self {
            kind,
            status,
            message: message.into(),
            code: None,
            rate_limit: RateLimit::default(),
            cause: None,
        }
    }

    /// Classify a failed response.
    ///
    /// The message and code come from the body (`error`, or the first
    /// element of `errors`); the rate-limit snapshot always comes from the
    /// headers; the kind comes from the status registry.
    pub fn from_response(response: &Response) -> Self {
        let (message, code) = parse_error_body(&response.body);
        Self {
            kind: ErrorKind::from_status(response.status),
            status: response.status,
            message,
            code,
            rate_limit: RateLimit::from_headers(&response.headers),
            cause: None,
        }
    }

    pub fn with_code(mut self, code: i64) -> Self {
        self.code = Some(code);
        self
    }

    pub fn with_rate_limit(mut self, rate_limit: RateLimit) -> Self {
        self.rate_limit = rate_limit;
        self
    }

    pub fn with_cause(mut self, cause: impl Into<BoxError>) -> Self {
        let cause: BoxError = cause.into();
        self.cause = Some(Arc::from(cause));
        self
    }

    pub fn kind(&self) -> ErrorKind {
        self.kind
    }

    pub fn status(&self) -> u16 {
        self.status
    }

    pub fn message(&self) -> &str {
        &self.message
    }

    pub fn code(&self) -> Option<i64> {
        self.code
    }

    pub fn rate_limit(&self) -> &RateLimit {
        &self.rate_limit
    }
}

impl fmt::Display for ApiError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "HTTP {} {}", self.status, self.kind)?;
        if !self.message.is_empty() {
            write!(f, ": {}", self.message)?;
        }
        if let Some(code) = self.code {
            write!(f, " (code {code})")?;
        }
        Ok(())
    }
}

impl std::error::Error for ApiError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        self.cause
            .as_deref()
            .map(|e| e as &(dyn std::error::Error + 'static))
    }
}

fn parse_error_body(body: &Value) -> (String, Option<i64>) {
    let Some(obj) = body.as_object() else {
        return (String::new(), None);
    };

    if let Some(error) = obj.get("error").filter(|v| !v.is_null()) {
        return (value_text(error), None);
    }

    // `errors` is usually an array, occasionally a bare string.
    let first = match obj.get("errors") {
        Some(Value::Array(errors)) => errors.first(),
        other => other,
    };
    match first {
        Some(Value::Object(record)) => {
            let message = record.get("message").map(value_text).unwrap_or_default();
            let code = record.get("code").and_then(Value::as_i64);
            (chomp(message), code)
        }
        Some(Value::String(text)) => (chomp(text.clone()), None),
        _ => (String::new(), None),
    }
}

fn value_text(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}

/// Strip one trailing line terminator (`\n`, `\r\n`, or `\r`).
fn chomp(mut text: String) -> String {
    if text.ends_with('\n') {
        text.pop();
        if text.ends_with('\r') {
            text.pop();
        }
    } else if text.ends_with('\r') {
        text.pop();
    }
    text
}

// ── Error ──────────────────────────────────────────────────────────

/// Every failure this crate can surface.
#[derive(Debug, Error)]
pub enum Error {
    /// The transport could not produce a response.
    #[error("transport failure: {0}")]
    Transport(#[source] BoxError),

    /// The API answered with an error status.
    #[error(transparent)]
    Api(#[from] ApiError),

    /// The payload was malformed or did not match the requested domain
    /// type. Carries the rate-limit snapshot of the response it came from.
    #[error("failed to hydrate {type_name}: {source}")]
    Hydration {
        type_name: &'static str,
        #[source]
        source: Arc<serde_json::Error>,
        rate_limit: RateLimit,
    },

    /// The credentials endpoint answered without the expected identity fields.
    #[error("credentials response missing `{0}`")]
    Identity(&'static str),
}

impl Error {
    pub fn transport(cause: impl Into<BoxError>) -> Self {
        Error::Transport(cause.into())
    }

    pub(crate) fn hydration<T>(source: serde_json::Error) -> Self {
        Self::malformed(std::any::type_name::<T>(), Arc::new(source))
    }

    pub(crate) fn malformed(type_name: &'static str, source: Arc<serde_json::Error>) -> Self {
        Error::Hydration {
            type_name,
            source,
            rate_limit: RateLimit::default(),
        }
    }

    /// Attach the snapshot of the response a hydration failure came from.
    /// Other variants are returned unchanged.
    pub fn with_rate_limit(self, rate_limit: RateLimit) -> Self {
        match self {
            Error::Hydration {
                type_name, source, ..
            } => Error::Hydration {
                type_name,
                source,
                rate_limit,
            },
            other => other,
        }
    }

    /// The API error kind, if this is a protocol error.
    pub fn kind(&self) -> Option<ErrorKind> {
        match self {
            Error::Api(e) => Some(e.kind()),
            _ => None,
        }
    }

    pub fn is_kind(&self, kind: ErrorKind) -> bool {
        self.kind() == Some(kind)
    }

    pub fn code(&self) -> Option<i64> {
        match self {
            Error::Api(e) => e.code(),
            _ => None,
        }
    }

    /// Best-effort rate-limit snapshot. Errors that never saw response
    /// headers report an all-absent snapshot.
    pub fn rate_limit(&self) -> RateLimit {
        match self {
            Error::Api(e) => e.rate_limit().clone(),
            Error::Hydration { rate_limit, .. } => rate_limit.clone(),
            _ => RateLimit::default(),
        }
    }
}

/// Narrow a [`ErrorKind::Forbidden`] error into `specific` when the message
/// is exactly `specific`'s canonical message. Otherwise hand back `error`
/// untouched.
///
/// The narrowed error keeps the status, code and rate limit, and carries
/// the original error as its source.
pub fn disambiguate_forbidden(specific: ErrorKind, error: Error) -> Error {
    let Some(canonical) = specific.canonical_message() else {
        return error;
    };
    match error {
        Error::Api(api) if api.kind == ErrorKind::Forbidden && api.message == canonical => {
            let narrowed = ApiError {
                kind: specific,
                status: api.status,
                message: canonical.to_string(),
                code: api.code,
                rate_limit: api.rate_limit.clone(),
                cause: None,
            };
            let original: Arc<dyn std::error::Error + Send + Sync> = Arc::new(api);
            Error::Api(ApiError {
                cause: Some(original),
                ..narrowed
            })
        }
        other => other,
    }
}

/// Error-kind helpers on call results.
pub trait ResultExt<T> {
    /// Turn an error of `kind` into the ignorable signal (`Ok(None)`).
    fn ignore_kind(self, kind: ErrorKind) -> Result<Option<T>>;

    /// Apply [`disambiguate_forbidden`] to the error side.
    fn disambiguate(self, specific: ErrorKind) -> Result<T>;
}

impl<T> ResultExt<T> for Result<T> {
    fn ignore_kind(self, kind: ErrorKind) -> Result<Option<T>> {
        match self {
            Ok(value) => Ok(Some(value)),
            Err(e) if e.is_kind(kind) => Ok(None),
            Err(e) => Err(e),
        }
    }

    fn disambiguate(self, specific: ErrorKind) -> Result<T> {
        self.map_err(|e| disambiguate_forbidden(specific, e))
    }
}
