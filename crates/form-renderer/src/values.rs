use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use serde_json::Number;

/// Reference to a file picked through a `file` control. The renderer never
/// reads the file; it only carries the handle through to the submit callback.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FileHandle {
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub size: Option<u64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub content_type: Option<String>,
}

impl FileHandle {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            size: None,
            content_type: None,
        }
    }
}

/// Current value of one field. An unset field is simply absent from the
/// [`ValueSet`]. Equality is strict across kinds: `Number(1)` never equals
/// `Text("1")`. Numbers compare by value, so `3` equals `3.0`.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(untagged)]
pub enum FieldValue {
    Bool(bool),
    Number(Number),
    Text(String),
    File(FileHandle),
}

impl FieldValue {
    pub fn as_str(&self) -> Option<&str> {
        match self {
            FieldValue::Text(text) => Some(text),
            _ => None,
        }
    }

    pub fn as_bool(&self) -> Option<bool> {
        match self {
            FieldValue::Bool(flag) => Some(*flag),
            _ => None,
        }
    }

    pub fn as_f64(&self) -> Option<f64> {
        match self {
            FieldValue::Number(num) => num.as_f64(),
            _ => None,
        }
    }

    pub fn as_file(&self) -> Option<&FileHandle> {
        match self {
            FieldValue::File(file) => Some(file),
            _ => None,
        }
    }

    /// Builds a numeric value; `None` for NaN and infinities.
    pub fn number(value: f64) -> Option<Self> {
        Number::from_f64(value).map(FieldValue::Number)
    }

    /// Text used to prefill a native control's `value` attribute.
    pub fn display(&self) -> String {
        match self {
            FieldValue::Bool(flag) => flag.to_string(),
            FieldValue::Number(num) => num.to_string(),
            FieldValue::Text(text) => text.clone(),
            FieldValue::File(file) => file.name.clone(),
        }
    }

    /// Whether this value counts as "nothing entered" for required checks.
    pub fn is_blank(&self) -> bool {
        match self {
            FieldValue::Text(text) => text.trim().is_empty(),
            _ => false,
        }
    }
}

impl PartialEq for FieldValue {
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (FieldValue::Bool(a), FieldValue::Bool(b)) => a == b,
            (FieldValue::Number(a), FieldValue::Number(b)) => same_number(a, b),
            (FieldValue::Text(a), FieldValue::Text(b)) => a == b,
            (FieldValue::File(a), FieldValue::File(b)) => a == b,
            _ => false,
        }
    }
}

fn same_number(a: &Number, b: &Number) -> bool {
    if let (Some(a), Some(b)) = (a.as_i64(), b.as_i64()) {
        return a == b;
    }
    if let (Some(a), Some(b)) = (a.as_u64(), b.as_u64()) {
        return a == b;
    }
    match (a.as_f64(), b.as_f64()) {
        (Some(a), Some(b)) => a == b,
        _ => false,
    }
}

impl From<&str> for FieldValue {
    fn from(value: &str) -> Self {
        FieldValue::Text(value.to_string())
    }
}

impl From<String> for FieldValue {
    fn from(value: String) -> Self {
        FieldValue::Text(value)
    }
}

impl From<bool> for FieldValue {
    fn from(value: bool) -> Self {
        FieldValue::Bool(value)
    }
}

impl From<i64> for FieldValue {
    fn from(value: i64) -> Self {
        FieldValue::Number(value.into())
    }
}

impl From<u32> for FieldValue {
    fn from(value: u32) -> Self {
        FieldValue::Number(value.into())
    }
}

impl From<FileHandle> for FieldValue {
    fn from(value: FileHandle) -> Self {
        FieldValue::File(value)
    }
}

/// Field name to current value. `null` entries are dropped on deserialize so
/// that "unset" has exactly one representation.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(from = "BTreeMap<String, Option<FieldValue>>")]
pub struct ValueSet(BTreeMap<String, FieldValue>);

impl From<BTreeMap<String, Option<FieldValue>>> for ValueSet {
    fn from(raw: BTreeMap<String, Option<FieldValue>>) -> Self {
        ValueSet(
            raw.into_iter()
                .filter_map(|(name, value)| value.map(|value| (name, value)))
                .collect(),
        )
    }
}

impl ValueSet {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, name: &str) -> Option<&FieldValue> {
        self.0.get(name)
    }

    /// Returns the previous value, if any.
    pub fn insert(&mut self, name: impl Into<String>, value: FieldValue) -> Option<FieldValue> {
        self.0.insert(name.into(), value)
    }

    pub fn remove(&mut self, name: &str) -> Option<FieldValue> {
        self.0.remove(name)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.0.contains_key(name)
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &FieldValue)> {
        self.0.iter().map(|(name, value)| (name.as_str(), value))
    }

    pub fn with(mut self, name: impl Into<String>, value: impl Into<FieldValue>) -> Self {
        self.insert(name, value.into());
        self
    }
}

impl FromIterator<(String, FieldValue)> for ValueSet {
    fn from_iter<I: IntoIterator<Item = (String, FieldValue)>>(iter: I) -> Self {
        ValueSet(iter.into_iter().collect())
    }
}

/// Field name to human-readable validation message.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "BTreeMap<String, String>")]
pub struct ErrorSet(BTreeMap<String, String>);

impl From<BTreeMap<String, String>> for ErrorSet {
    fn from(raw: BTreeMap<String, String>) -> Self {
        raw.into_iter().collect()
    }
}

impl ErrorSet {
    pub fn new() -> Self {
        Self::default()
    }

    /// Message recorded for `name`; never blank.
    pub fn get(&self, name: &str) -> Option<&str> {
        self.0.get(name).map(String::as_str)
    }

    /// Records a failure. The first message recorded for a field wins and
    /// blank messages are ignored.
    pub fn insert(&mut self, name: impl Into<String>, message: impl Into<String>) {
        let message = message.into();
        if message.trim().is_empty() {
            return;
        }
        self.0.entry(name.into()).or_insert(message);
    }

    pub fn remove(&mut self, name: &str) -> Option<String> {
        self.0.remove(name)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.0.contains_key(name)
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn clear(&mut self) {
        self.0.clear();
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.0.iter().map(|(name, msg)| (name.as_str(), msg.as_str()))
    }
}

impl FromIterator<(String, String)> for ErrorSet {
    fn from_iter<I: IntoIterator<Item = (String, String)>>(iter: I) -> Self {
        let mut errors = ErrorSet::new();
        for (name, message) in iter {
            errors.insert(name, message);
        }
        errors
    }
}
