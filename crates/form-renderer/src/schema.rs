//! Validation seam. The form only ever talks to [`ValidationSchema`]; the
//! built-in [`RuleSchema`] covers the declarative rules a spec file can carry.

use std::collections::BTreeMap;
use std::fmt;
use std::sync::LazyLock;

use regex::Regex;
use serde::{Deserialize, Deserializer, Serialize, Serializer};

use crate::errors::FormError;
use crate::spec::Conditional;
use crate::values::{ErrorSet, FieldValue, ValueSet};

static EMAIL: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^[^\s@]+@[^\s@]+\.[^\s@]+$").expect("email pattern compiles")
});

/// Produces per-field error messages for a complete value-set. An empty
/// [`ErrorSet`] means the values may be submitted.
pub trait ValidationSchema {
    fn validate(&self, values: &ValueSet) -> ErrorSet;
}

impl<F> ValidationSchema for F
where
    F: Fn(&ValueSet) -> ErrorSet,
{
    fn validate(&self, values: &ValueSet) -> ErrorSet {
        self(values)
    }
}

/// Schema that accepts everything.
#[derive(Debug, Default, Clone, Copy)]
pub struct AcceptAll;

impl ValidationSchema for AcceptAll {
    fn validate(&self, _values: &ValueSet) -> ErrorSet {
        ErrorSet::new()
    }
}

/// Compiled regex that round-trips through serde as its source string.
#[derive(Clone)]
pub struct Pattern(Regex);

impl Pattern {
    pub fn new(field: &str, source: &str) -> Result<Self, FormError> {
        Regex::new(source)
            .map(Pattern)
            .map_err(|source| FormError::InvalidRegex {
                field: field.to_string(),
                source,
            })
    }

    pub fn is_match(&self, text: &str) -> bool {
        self.0.is_match(text)
    }

    pub fn as_str(&self) -> &str {
        self.0.as_str()
    }
}

impl fmt::Debug for Pattern {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("Pattern").field(&self.as_str()).finish()
    }
}

impl PartialEq for Pattern {
    fn eq(&self, other: &Self) -> bool {
        self.as_str() == other.as_str()
    }
}

impl Serialize for Pattern {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.as_str())
    }
}

impl<'de> Deserialize<'de> for Pattern {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let source = String::deserialize(deserializer)?;
        Regex::new(&source)
            .map(Pattern)
            .map_err(|err| serde::de::Error::custom(format!("invalid regex: {err}")))
    }
}

/// Declarative rules for one field. Rules are checked in declaration order
/// and the first failure produces the field's message.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct FieldRules {
    #[serde(default)]
    pub required: bool,
    /// A checkbox that must be ticked.
    #[serde(default)]
    pub accepted: bool,
    #[serde(default)]
    pub email: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub regex: Option<Pattern>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub min_length: Option<usize>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max_length: Option<usize>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub min: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max: Option<f64>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub one_of: Vec<String>,
    /// Apply these rules only while the condition holds, e.g. to excuse a
    /// field that is hidden.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub only_if: Option<Conditional>,
    /// Replaces the built-in message whichever rule fails. Blank overrides are
    /// ignored.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
}

impl FieldRules {
    pub fn required() -> Self {
        Self {
            required: true,
            ..Self::default()
        }
    }

    pub fn email() -> Self {
        Self {
            email: true,
            ..Self::default()
        }
    }

    pub fn and_required(mut self) -> Self {
        self.required = true;
        self
    }

    pub fn pattern(mut self, field: &str, source: &str) -> Result<Self, FormError> {
        self.regex = Some(Pattern::new(field, source)?);
        Ok(self)
    }

    pub fn range(mut self, min: Option<f64>, max: Option<f64>) -> Self {
        self.min = min;
        self.max = max;
        self
    }

    pub fn only_if(mut self, depends_on: impl Into<String>, equals: impl Into<FieldValue>) -> Self {
        self.only_if = Some(Conditional::new(depends_on, equals));
        self
    }

    pub fn with_message(mut self, message: impl Into<String>) -> Self {
        self.message = Some(message.into());
        self
    }

    fn applies(&self, values: &ValueSet) -> bool {
        self.only_if
            .as_ref()
            .is_none_or(|cond| values.get(&cond.depends_on) == Some(&cond.equals))
    }

    /// Built-in message for the first failing rule, if any.
    fn first_failure(&self, value: Option<&FieldValue>) -> Option<String> {
        if (self.required || self.accepted) && is_missing(value) {
            return Some("This field is required".to_string());
        }
        let value = value?;
        if self.accepted && value.as_bool() != Some(true) {
            return Some("This box must be checked".to_string());
        }
        if self.email || self.regex.is_some() || self.min_length.is_some() || self.max_length.is_some()
        {
            let Some(text) = value.as_str() else {
                return Some("Expected text".to_string());
            };
            if self.email && !EMAIL.is_match(text.trim()) {
                return Some("Enter a valid email address".to_string());
            }
            if let Some(pattern) = self.regex.as_ref() {
                if !pattern.is_match(text) {
                    return Some("Value does not match the required pattern".to_string());
                }
            }
            let len = text.chars().count();
            if let Some(min) = self.min_length {
                if len < min {
                    return Some(format!("Must be at least {min} characters"));
                }
            }
            if let Some(max) = self.max_length {
                if len > max {
                    return Some(format!("Must be at most {max} characters"));
                }
            }
        }
        if self.min.is_some() || self.max.is_some() {
            let Some(num) = numeric(value) else {
                return Some("Expected a number".to_string());
            };
            if let Some(min) = self.min {
                if num < min {
                    return Some(format!("Must be at least {min}"));
                }
            }
            if let Some(max) = self.max {
                if num > max {
                    return Some(format!("Must be at most {max}"));
                }
            }
        }
        if !self.one_of.is_empty() {
            let allowed = value
                .as_str()
                .is_some_and(|text| self.one_of.iter().any(|choice| choice == text));
            if !allowed {
                return Some("Choose one of the listed options".to_string());
            }
        }
        None
    }
}

/// Field name to [`FieldRules`]. Fields without rules always pass.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct RuleSchema {
    rules: BTreeMap<String, FieldRules>,
}

impl RuleSchema {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn rule(mut self, field: impl Into<String>, rules: FieldRules) -> Self {
        self.rules.insert(field.into(), rules);
        self
    }

    pub fn get(&self, field: &str) -> Option<&FieldRules> {
        self.rules.get(field)
    }

    pub fn is_empty(&self) -> bool {
        self.rules.is_empty()
    }

    /// Validates a single field against the complete value-set.
    pub fn validate_field(&self, field: &str, values: &ValueSet) -> Option<String> {
        let rules = self.rules.get(field)?;
        if !rules.applies(values) {
            return None;
        }
        rules
            .first_failure(values.get(field))
            .map(|builtin| {
                rules
                    .message
                    .clone()
                    .filter(|message| !message.trim().is_empty())
                    .unwrap_or(builtin)
            })
    }
}

impl ValidationSchema for RuleSchema {
    fn validate(&self, values: &ValueSet) -> ErrorSet {
        self.rules
            .keys()
            .filter_map(|field| {
                self.validate_field(field, values)
                    .map(|message| (field.clone(), message))
            })
            .collect()
    }
}

fn is_missing(value: Option<&FieldValue>) -> bool {
    match value {
        None => true,
        Some(value) => value.is_blank(),
    }
}

/// Numbers, and text that parses as one (date/text inputs deliver strings).
fn numeric(value: &FieldValue) -> Option<f64> {
    value
        .as_f64()
        .or_else(|| value.as_str().and_then(|text| text.trim().parse().ok()))
}
