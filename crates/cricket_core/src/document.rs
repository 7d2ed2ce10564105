//! Match-detail documents as read from disk, before normalization.

use chrono::{DateTime, NaiveDate, NaiveDateTime};
use serde_json::Value;

use crate::error::{Result, StatsError};

/// One match-detail payload plus the identity used for idempotence.
#[derive(Debug, Clone, PartialEq)]
pub struct MatchDocument {
    pub id: String,
    pub name: Option<String>,
    pub start: Option<NaiveDateTime>,
    pub body: Value,
}

fn text_field<'a>(value: &'a Value, key: &str) -> Option<&'a str> {
    value.get(key).and_then(Value::as_str).map(str::trim).filter(|s| !s.is_empty())
}

fn id_field(value: &Value) -> Option<String> {
    match value.get("id")? {
        Value::String(s) => Some(s.trim().to_string()).filter(|s| !s.is_empty()),
        Value::Number(n) => Some(n.to_string()),
        _ => None,
    }
}

/// Accepts `2024-02-01T08:00:00`, RFC 3339 and plain `2024-02-01`.
pub fn parse_start(text: &str) -> Option<NaiveDateTime> {
    let text = text.trim();
    if let Ok(dt) = NaiveDateTime::parse_from_str(text, "%Y-%m-%dT%H:%M:%S") {
        return Some(dt);
    }
    if let Ok(dt) = DateTime::parse_from_rfc3339(text) {
        return Some(dt.naive_utc());
    }
    NaiveDate::parse_from_str(text, "%Y-%m-%d")
        .ok()
        .and_then(|date| date.and_hms_opt(0, 0, 0))
}

impl MatchDocument {
    /// Id comes from `data.id`, then top-level `id`, then `fallback_id`.
    pub fn from_value(body: Value, fallback_id: &str) -> Self {
        let data = body.get("data").filter(|d| d.is_object());
        let id = data
            .and_then(id_field)
            .or_else(|| id_field(&body))
            .unwrap_or_else(|| fallback_id.to_string());

        let meta = data.unwrap_or(&body);
        let name = text_field(meta, "name").map(str::to_string);
        let start = text_field(meta, "dateTimeGMT")
            .or_else(|| text_field(meta, "date"))
            .and_then(parse_start);

        Self { id, name, start, body }
    }

    /// Parse a file body holding a single document or an array of them.
    /// Array entries without their own id get `<fallback>#<index>`.
    pub fn parse_all(text: &str, fallback_id: &str) -> Result<Vec<Self>> {
        let value: Value = serde_json::from_str(text)?;
        match value {
            Value::Array(items) => Ok(items
                .into_iter()
                .enumerate()
                .map(|(idx, item)| Self::from_value(item, &format!("{fallback_id}#{idx}")))
                .collect()),
            Value::Object(_) => Ok(vec![Self::from_value(value, fallback_id)]),
            other => Err(StatsError::UnsupportedDocument(format!(
                "{fallback_id}: expected an object or array, found {}",
                kind_of(&other)
            ))),
        }
    }
}

fn kind_of(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "an array",
        Value::Object(_) => "an object",
    }
}

/// Stable sort by start time; undated matches go last in input order.
pub fn sort_canonical(documents: &mut [MatchDocument]) {
    documents.sort_by(|a, b| match (a.start, b.start) {
        (Some(x), Some(y)) => x.cmp(&y),
        (Some(_), None) => std::cmp::Ordering::Less,
        (None, Some(_)) => std::cmp::Ordering::Greater,
        (None, None) => std::cmp::Ordering::Equal,
    });
}
