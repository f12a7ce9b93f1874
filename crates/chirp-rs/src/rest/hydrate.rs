//! Turning raw response payloads into typed domain objects.
//!
//! A hydratable type supplies two constructors: [`Hydrate::from_record`]
//! for one element of a JSON array, and [`Hydrate::from_envelope`] for a
//! single-object endpoint where the headers may matter too (for example a
//! created object that reports its rate-limit state). The envelope form
//! defaults to hydrating the body as a record.

use serde::de::Error as _;
use serde_json::Value;

use crate::error::{Error, RateLimit, Result};
use crate::transport::Response;

pub trait Hydrate: Sized {
    fn from_record(record: Value) -> Result<Self, serde_json::Error>;

    fn from_envelope(response: &Response) -> Result<Self, serde_json::Error> {
        Self::from_record(response.body.clone())
    }
}

impl Hydrate for Value {
    fn from_record(record: Value) -> Result<Self, serde_json::Error> {
        Ok(record)
    }
}

/// One object from a whole response envelope.
///
/// A failure carries the response's rate-limit snapshot.
pub fn single_object<T: Hydrate>(response: &Response) -> Result<T> {
    T::from_envelope(response).map_err(|e| {
        Error::hydration::<T>(e).with_rate_limit(RateLimit::from_headers(&response.headers))
    })
}

/// One object per element of a JSON array body, in order.
///
/// Any other body shape, or any record that fails to hydrate, fails the
/// whole call.
pub fn object_list<T: Hydrate>(body: Value) -> Result<Vec<T>> {
    match body {
        Value::Array(records) => hydrate_records(records),
        other => Err(Error::hydration::<T>(serde_json::Error::custom(format!(
            "expected an array of records, got {}",
            json_type(&other)
        )))),
    }
}

pub(crate) fn hydrate_records<T: Hydrate>(records: Vec<Value>) -> Result<Vec<T>> {
    records
        .into_iter()
        .map(|record| T::from_record(record).map_err(Error::hydration::<T>))
        .collect()
}

pub(crate) fn json_type(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "an array",
        Value::Object(_) => "an object",
    }
}
