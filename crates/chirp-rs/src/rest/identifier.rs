//! Polymorphic entity identifiers and their resolution into request options.
//!
//! Callers may name a user by numeric id, by screen name, by profile URL
//! (as text or as a parsed [`Url`]), or by handing over a domain object.
//! Every resolver here matches exhaustively on [`Identifier`] and never
//! fails: unparseable ids resolve to `0`, odd URLs resolve to whatever
//! their last path segment is.

use reqwest::Url;
use serde_json::Value;

use crate::rest::args::Argument;
use crate::transport::Options;

/// A domain type that carries an integer id.
pub trait Identified {
    fn id(&self) -> i64;
}

/// Something that names an entity.
#[derive(Debug, Clone, PartialEq)]
pub enum Identifier {
    NumericId(i64),
    /// A bare screen name, or a string that contains a URL.
    TextReference(String),
    /// A parsed URL whose last path segment is the significant token.
    UriReference(Url),
    /// The id of a domain object.
    DomainObject(i64),
}

impl Identifier {
    pub fn object(entity: &impl Identified) -> Self {
        Identifier::DomainObject(entity.id())
    }

    /// The options entry this identifier resolves to.
    pub fn compound_key(&self) -> CompoundKey {
        match self {
            Identifier::NumericId(id) | Identifier::DomainObject(id) => CompoundKey {
                field: KeyField::UserId,
                value: Value::from(*id),
            },
            Identifier::TextReference(text) => CompoundKey {
                field: KeyField::ScreenName,
                value: Value::from(screen_name_from_text(text)),
            },
            Identifier::UriReference(url) => CompoundKey {
                field: KeyField::ScreenName,
                value: Value::from(last_segment(url.path())),
            },
        }
    }
}

impl From<i64> for Identifier {
    fn from(id: i64) -> Self {
        Identifier::NumericId(id)
    }
}

impl From<&str> for Identifier {
    fn from(text: &str) -> Self {
        Identifier::TextReference(text.to_string())
    }
}

impl From<String> for Identifier {
    fn from(text: String) -> Self {
        Identifier::TextReference(text)
    }
}

impl From<Url> for Identifier {
    fn from(url: Url) -> Self {
        Identifier::UriReference(url)
    }
}

/// Which kind of key an identifier resolves to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum KeyField {
    UserId,
    ScreenName,
}

impl KeyField {
    pub fn as_str(self) -> &'static str {
        match self {
            KeyField::UserId => "user_id",
            KeyField::ScreenName => "screen_name",
        }
    }
}

/// A resolved `user_id` / `screen_name` entry, optionally prefixed.
#[derive(Debug, Clone, PartialEq)]
pub struct CompoundKey {
    pub field: KeyField,
    pub value: Value,
}

impl CompoundKey {
    /// Key name, joined to `prefix` with an underscore when given.
    pub fn key(&self, prefix: Option<&str>) -> String {
        match prefix {
            Some(p) => format!("{p}_{}", self.field.as_str()),
            None => self.field.as_str().to_string(),
        }
    }
}

// ── Resolution ─────────────────────────────────────────────────────

/// Integer id named by `identifier`. Non-numeric text yields `0`.
pub fn extract_id(identifier: &Identifier) -> i64 {
    match identifier {
        Identifier::NumericId(id) | Identifier::DomainObject(id) => *id,
        Identifier::TextReference(text) => leading_int(last_segment(text)),
        Identifier::UriReference(url) => leading_int(last_segment(url.path())),
    }
}

/// Copy of `options` with the identifier's compound key set.
pub fn merge_identifier(
    options: &Options,
    identifier: &Identifier,
    prefix: Option<&str>,
) -> Options {
    let mut merged = options.clone();
    merge_identifier_in_place(&mut merged, identifier, prefix);
    merged
}

/// Mutating form of [`merge_identifier`].
pub fn merge_identifier_in_place(
    options: &mut Options,
    identifier: &Identifier,
    prefix: Option<&str>,
) {
    let key = identifier.compound_key();
    options.insert(key.key(prefix), key.value);
}

/// Copy of `options` with `user_id` / `screen_name` set to the comma-joined
/// ids and names found in `identifiers` (one level of nesting expanded).
pub fn merge_identifiers(options: &Options, identifiers: &[Argument<Identifier>]) -> Options {
    let mut merged = options.clone();
    merge_identifiers_in_place(&mut merged, identifiers);
    merged
}

/// Mutating form of [`merge_identifiers`].
///
/// Encounter order is kept within each group and duplicates are kept, so
/// the joined lists line up with any parallel list the caller holds.
pub fn merge_identifiers_in_place(options: &mut Options, identifiers: &[Argument<Identifier>]) {
    let mut user_ids: Vec<String> = Vec::new();
    let mut screen_names: Vec<String> = Vec::new();

    let flat = identifiers.iter().flat_map(|arg| match arg {
        Argument::One(id) => std::slice::from_ref(id),
        Argument::Many(ids) => ids.as_slice(),
        Argument::Options(_) => Default::default(),
    });

    for identifier in flat {
        let key = identifier.compound_key();
        let text = match key.value {
            Value::String(s) => s,
            other => other.to_string(),
        };
        match key.field {
            KeyField::UserId => user_ids.push(text),
            KeyField::ScreenName => screen_names.push(text),
        }
    }

    if !user_ids.is_empty() {
        options.insert(KeyField::UserId.as_str().into(), user_ids.join(",").into());
    }
    if !screen_names.is_empty() {
        options.insert(
            KeyField::ScreenName.as_str().into(),
            screen_names.join(",").into(),
        );
    }
}

// ── Helpers ────────────────────────────────────────────────────────

fn screen_name_from_text(text: &str) -> String {
    if !text.contains("://") {
        return text.to_string();
    }
    match Url::parse(text) {
        Ok(url) => last_segment(url.path()).to_string(),
        Err(_) => last_segment(text).to_string(),
    }
}

/// Last non-empty `/`-separated segment, or `""`.
fn last_segment(path: &str) -> &str {
    path.rsplit('/').find(|s| !s.is_empty()).unwrap_or("")
}

/// Permissive integer parse: optional whitespace and sign, then the longest
/// run of digits. No digits, or a run too large for `i64`, gives `0`.
fn leading_int(text: &str) -> i64 {
    let trimmed = text.trim_start();
    let (negative, rest) = match trimmed.strip_prefix('-') {
        Some(rest) => (true, rest),
        None => (false, trimmed.strip_prefix('+').unwrap_or(trimmed)),
    };
    let digits: String = rest.chars().take_while(|c| c.is_ascii_digit()).collect();
    let value = digits.parse::<i64>().unwrap_or(0);
    if negative { -value } else { value }
}
