use std::collections::BTreeMap;

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

/// Literal answer marking that the real answer lives in the companion free-text key.
pub const OTHER_SENTINEL: &str = "other";

/// A single stored answer: one string, or an ordered list for multi-select questions.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
#[serde(untagged)]
pub enum AnswerValue {
    Single(String),
    Multiple(Vec<String>),
}

impl AnswerValue {
    pub fn is_blank(&self) -> bool {
        match self {
            AnswerValue::Single(text) => text.trim().is_empty(),
            AnswerValue::Multiple(items) => items.iter().all(|item| item.trim().is_empty()),
        }
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            AnswerValue::Single(text) => Some(text),
            AnswerValue::Multiple(_) => None,
        }
    }

    /// Number of non-blank selections held by this value.
    pub fn selection_count(&self) -> usize {
        match self {
            AnswerValue::Single(text) if text.trim().is_empty() => 0,
            AnswerValue::Single(_) => 1,
            AnswerValue::Multiple(items) => {
                items.iter().filter(|item| !item.trim().is_empty()).count()
            }
        }
    }

    pub fn contains(&self, needle: &str) -> bool {
        match self {
            AnswerValue::Single(text) => text == needle,
            AnswerValue::Multiple(items) => items.iter().any(|item| item == needle),
        }
    }
}

impl From<&str> for AnswerValue {
    fn from(value: &str) -> Self {
        AnswerValue::Single(value.to_string())
    }
}

impl From<String> for AnswerValue {
    fn from(value: String) -> Self {
        AnswerValue::Single(value)
    }
}

impl From<Vec<String>> for AnswerValue {
    fn from(values: Vec<String>) -> Self {
        AnswerValue::Multiple(values)
    }
}

impl From<Vec<&str>> for AnswerValue {
    fn from(values: Vec<&str>) -> Self {
        AnswerValue::Multiple(values.into_iter().map(str::to_string).collect())
    }
}

/// Flat question-key to answer mapping, serialized as a plain JSON object.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
#[serde(transparent)]
pub struct AnswerMap {
    values: BTreeMap<String, AnswerValue>,
}

impl AnswerMap {
    pub fn new() -> Self {
        Self::default()
    }

    /// Collects submitted `(key, value)` pairs; a repeated key turns into a
    /// `Multiple` that keeps submission order.
    pub fn from_entries<K, V, I>(entries: I) -> Self
    where
        K: Into<String>,
        V: Into<String>,
        I: IntoIterator<Item = (K, V)>,
    {
        let mut map = Self::new();
        for (key, value) in entries {
            let key = key.into();
            let value = value.into();
            match map.values.remove(&key) {
                None => {
                    map.values.insert(key, AnswerValue::Single(value));
                }
                Some(AnswerValue::Single(previous)) => {
                    map.values
                        .insert(key, AnswerValue::Multiple(vec![previous, value]));
                }
                Some(AnswerValue::Multiple(mut items)) => {
                    items.push(value);
                    map.values.insert(key, AnswerValue::Multiple(items));
                }
            }
        }
        map
    }

    pub fn get(&self, key: &str) -> Option<&AnswerValue> {
        self.values.get(key)
    }

    /// Returns the value of a single-string answer.
    pub fn text(&self, key: &str) -> Option<&str> {
        self.values.get(key).and_then(AnswerValue::as_str)
    }

    /// True when the key is absent or holds only whitespace.
    pub fn is_blank(&self, key: &str) -> bool {
        self.values.get(key).is_none_or(AnswerValue::is_blank)
    }

    pub fn set(&mut self, key: impl Into<String>, value: impl Into<AnswerValue>) {
        self.values.insert(key.into(), value.into());
    }

    pub fn remove(&mut self, key: &str) -> Option<AnswerValue> {
        self.values.remove(key)
    }

    pub fn contains_key(&self, key: &str) -> bool {
        self.values.contains_key(key)
    }

    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.values.keys().map(String::as_str)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &AnswerValue)> {
        self.values.iter().map(|(key, value)| (key.as_str(), value))
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    /// Copy with every string trimmed and HTML-significant characters escaped.
    pub fn sanitized(&self) -> Self {
        let values = self
            .values
            .iter()
            .map(|(key, value)| {
                let cleaned = match value {
                    AnswerValue::Single(text) => AnswerValue::Single(escape_html(text)),
                    AnswerValue::Multiple(items) => {
                        AnswerValue::Multiple(items.iter().map(|item| escape_html(item)).collect())
                    }
                };
                (key.clone(), cleaned)
            })
            .collect();
        Self { values }
    }
}

fn escape_html(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for ch in text.trim().chars() {
        match ch {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#x27;"),
            other => out.push(other),
        }
    }
    out
}
