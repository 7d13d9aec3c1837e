//! Wire types for the search backend's JSON responses.
//!
//! These are transient: nothing here is cached or persisted. The backend is
//! loose about scalar types (ids may come back as numbers, `indexed` as a
//! boolean), so the text-ish fields are decoded through [`scalar_text`].

use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;

/// `GET /stats` payload.
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
pub struct StatsSnapshot {
    #[serde(deserialize_with = "scalar_text")]
    pub num_docs: String,
    #[serde(deserialize_with = "scalar_text")]
    pub indexed: String,
}

impl StatsSnapshot {
    /// The status-line form: `docs=<num_docs>, indexed=<indexed>`.
    pub fn status_line(&self) -> String {
        format!("docs={}, indexed={}", self.num_docs, self.indexed)
    }
}

/// `GET /search` payload. `results` may be absent altogether.
#[derive(Debug, Clone, Default, PartialEq, Deserialize, Serialize)]
pub struct SearchResponse {
    #[serde(default)]
    pub results: Option<Vec<SearchResultItem>>,
}

impl SearchResponse {
    pub fn items(&self) -> &[SearchResultItem] {
        self.results.as_deref().unwrap_or(&[])
    }
}

/// One ranked hit.
///
/// Missing fields never fail the whole search: absent text is empty and an
/// absent score is NaN.
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
pub struct SearchResultItem {
    #[serde(default, deserialize_with = "scalar_text")]
    pub filename: String,
    #[serde(default = "nan", deserialize_with = "number_lenient")]
    pub score: f64,
    #[serde(default, deserialize_with = "scalar_text")]
    pub doc_id: String,
    #[serde(default, deserialize_with = "optional_text")]
    pub snippet: String,
}

/// `POST /upload` payload.
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
pub struct UploadResponse {
    #[serde(deserialize_with = "scalar_text")]
    pub filename: String,
    #[serde(default)]
    pub text_chars: Option<u64>,
}

impl UploadResponse {
    /// Upload log line: `Uploaded: <filename> (chars=<n or ?>)`.
    pub fn log_line(&self) -> String {
        let chars = self
            .text_chars
            .map(|n| n.to_string())
            .unwrap_or_else(|| "?".to_string());
        format!("Uploaded: {} (chars={})", self.filename, chars)
    }
}

/// `GET /health` payload.
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
pub struct HealthResponse {
    pub status: String,
}

/// Accept any JSON scalar and keep its textual form.
fn scalar_text<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Value::deserialize(deserializer)?;
    match value {
        Value::String(s) => Ok(s),
        Value::Number(n) => Ok(n.to_string()),
        Value::Bool(b) => Ok(b.to_string()),
        Value::Null => Ok("null".to_string()),
        other => Err(serde::de::Error::custom(format!(
            "expected a scalar, got {}",
            other
        ))),
    }
}

/// Like [`scalar_text`] but null becomes the empty string.
fn optional_text<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Option::<Value>::deserialize(deserializer)?;
    match value {
        None | Some(Value::Null) => Ok(String::new()),
        Some(Value::String(s)) => Ok(s),
        Some(Value::Number(n)) => Ok(n.to_string()),
        Some(Value::Bool(b)) => Ok(b.to_string()),
        Some(other) => Err(serde::de::Error::custom(format!(
            "expected text, got {}",
            other
        ))),
    }
}

fn nan() -> f64 {
    f64::NAN
}

/// Numeric coercion with browser `Number()` rules: booleans are 1/0, null
/// and blank strings are 0, numeric strings (decimal, exponent, `0x` hex,
/// `Infinity`) parse, one-element arrays unwrap. Anything else is NaN.
fn number_lenient<'de, D>(deserializer: D) -> Result<f64, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Value::deserialize(deserializer)?;
    Ok(coerce_number(&value))
}

fn coerce_number(value: &Value) -> f64 {
    match value {
        Value::Number(n) => n.as_f64().unwrap_or(f64::NAN),
        Value::Bool(b) => f64::from(u8::from(*b)),
        Value::Null => 0.0,
        Value::String(s) => parse_number_text(s),
        Value::Array(items) => match items.as_slice() {
            [] => 0.0,
            [Value::Bool(_)] | [Value::Object(_)] => f64::NAN,
            [single] => coerce_number(single),
            _ => f64::NAN,
        },
        Value::Object(_) => f64::NAN,
    }
}

fn parse_number_text(text: &str) -> f64 {
    let t = text.trim();
    if t.is_empty() {
        return 0.0;
    }
    match t {
        "Infinity" | "+Infinity" => return f64::INFINITY,
        "-Infinity" => return f64::NEG_INFINITY,
        _ => {}
    }
    if let Some(hex) = t.strip_prefix("0x").or_else(|| t.strip_prefix("0X")) {
        return u64::from_str_radix(hex, 16)
            .map(|n| n as f64)
            .unwrap_or(f64::NAN);
    }
    // Rust also accepts `inf` and `nan` spellings; a browser does not.
    if t.bytes().any(|b| b.is_ascii_alphabetic() && b != b'e' && b != b'E') {
        return f64::NAN;
    }
    t.parse::<f64>().unwrap_or(f64::NAN)
}
