use std::collections::{BTreeMap, BTreeSet};
use std::fmt;
use std::num::NonZeroU32;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::errors::FormError;
use crate::mode::ConfigPolicy;
use crate::schema::{Pattern, RuleSchema};
use crate::values::{FieldValue, ValueSet};

/// Star count used by `rating` fields that do not declare `max`.
pub const DEFAULT_RATING_MAX: u32 = 5;
/// Largest star count a rating field renders.
pub const RATING_MAX_LIMIT: u32 = 10;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FieldKind {
    Text,
    Email,
    Password,
    Date,
    Textarea,
    Select,
    Radio,
    Checkbox,
    File,
    Rating,
}

impl FieldKind {
    pub fn as_str(self) -> &'static str {
        match self {
            FieldKind::Text => "text",
            FieldKind::Email => "email",
            FieldKind::Password => "password",
            FieldKind::Date => "date",
            FieldKind::Textarea => "textarea",
            FieldKind::Select => "select",
            FieldKind::Radio => "radio",
            FieldKind::Checkbox => "checkbox",
            FieldKind::File => "file",
            FieldKind::Rating => "rating",
        }
    }

    /// Kinds that render one entry per declared option.
    pub fn needs_options(self) -> bool {
        matches!(self, FieldKind::Select | FieldKind::Radio)
    }

    /// Kinds that forward `placeholder` to the control.
    pub fn takes_placeholder(self) -> bool {
        matches!(
            self,
            FieldKind::Text
                | FieldKind::Email
                | FieldKind::Password
                | FieldKind::Date
                | FieldKind::Textarea
        )
    }
}

impl fmt::Display for FieldKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FieldOption {
    pub value: String,
    pub label: String,
}

impl FieldOption {
    pub fn new(value: impl Into<String>, label: impl Into<String>) -> Self {
        Self {
            value: value.into(),
            label: label.into(),
        }
    }
}

/// Show the owning field only while `depends_on` holds exactly `equals`.
/// Evaluated one level deep.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Conditional {
    #[serde(alias = "dependsOnField")]
    pub depends_on: String,
    pub equals: FieldValue,
}

impl Conditional {
    pub fn new(depends_on: impl Into<String>, equals: impl Into<FieldValue>) -> Self {
        Self {
            depends_on: depends_on.into(),
            equals: equals.into(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FieldDescriptor {
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub label: Option<String>,
    #[serde(alias = "type")]
    pub kind: FieldKind,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub placeholder: Option<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub options: Vec<FieldOption>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub conditional: Option<Conditional>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max: Option<NonZeroU32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub default: Option<FieldValue>,
}

impl FieldDescriptor {
    pub fn new(name: impl Into<String>, kind: FieldKind) -> Self {
        Self {
            name: name.into(),
            label: None,
            kind,
            placeholder: None,
            options: Vec::new(),
            conditional: None,
            max: None,
            default: None,
        }
    }

    pub fn label(mut self, label: impl Into<String>) -> Self {
        self.label = Some(label.into());
        self
    }

    pub fn placeholder(mut self, placeholder: impl Into<String>) -> Self {
        self.placeholder = Some(placeholder.into());
        self
    }

    pub fn option(mut self, value: impl Into<String>, label: impl Into<String>) -> Self {
        self.options.push(FieldOption::new(value, label));
        self
    }

    pub fn show_when(mut self, depends_on: impl Into<String>, equals: impl Into<FieldValue>) -> Self {
        self.conditional = Some(Conditional::new(depends_on, equals));
        self
    }

    /// Sets the star count of a rating field; zero falls back to the default.
    pub fn max(mut self, max: u32) -> Self {
        self.max = NonZeroU32::new(max);
        self
    }

    pub fn default_value(mut self, value: impl Into<FieldValue>) -> Self {
        self.default = Some(value.into());
        self
    }

    /// Effective star count for `rating` fields, capped at [`RATING_MAX_LIMIT`].
    pub fn rating_max(&self) -> u32 {
        self.max
            .map_or(DEFAULT_RATING_MAX, NonZeroU32::get)
            .min(RATING_MAX_LIMIT)
    }
}

/// A whole form as loaded from disk: the ordered field list plus the built-in
/// rule schema consulted on submit.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct FormSpec {
    #[serde(default)]
    pub id: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub submit_label: Option<String>,
    #[serde(default)]
    pub fields: Vec<FieldDescriptor>,
    #[serde(default)]
    pub rules: RuleSchema,
}

/// Only the rule regexes of a spec file. Compiled before the full parse so a
/// bad pattern is reported against its field.
#[derive(Deserialize)]
struct RulePatterns {
    #[serde(default)]
    rules: BTreeMap<String, RegexSource>,
}

#[derive(Deserialize)]
struct RegexSource {
    #[serde(default)]
    regex: Option<String>,
}

impl RulePatterns {
    fn check(self) -> Result<(), FormError> {
        for (field, source) in self.rules {
            if let Some(regex) = source.regex {
                Pattern::new(&field, &regex)?;
            }
        }
        Ok(())
    }
}

impl FormSpec {
    /// Parses a spec from YAML. JSON is valid YAML, so this covers both.
    pub fn from_yaml_str(contents: &str) -> Result<Self, FormError> {
        if let Ok(patterns) = serde_yaml_bw::from_str::<RulePatterns>(contents) {
            patterns.check()?;
        }
        serde_yaml_bw::from_str(contents).map_err(FormError::parse)
    }

    pub fn from_json_str(contents: &str) -> Result<Self, FormError> {
        if let Ok(patterns) = serde_json::from_str::<RulePatterns>(contents) {
            patterns.check()?;
        }
        serde_json::from_str(contents).map_err(FormError::parse)
    }

    pub fn load(path: impl AsRef<Path>) -> Result<Self, FormError> {
        let path = path.as_ref();
        let contents = std::fs::read_to_string(path)?;
        let is_json = path
            .extension()
            .and_then(|ext| ext.to_str())
            .is_some_and(|ext| ext.eq_ignore_ascii_case("json"));
        if is_json {
            Self::from_json_str(&contents)
        } else {
            Self::from_yaml_str(&contents)
        }
    }

    pub fn field(&self, name: &str) -> Option<&FieldDescriptor> {
        self.fields.iter().find(|field| field.name == name)
    }
}

/// A plausible value-set for `fields`: declared defaults first, then the first
/// option of choice fields, then an empty value of the right shape. File
/// fields stay unset.
pub fn example_values(fields: &[FieldDescriptor]) -> ValueSet {
    let mut out = ValueSet::new();
    for field in fields {
        let value = match (&field.default, field.kind) {
            (Some(default), _) => Some(default.clone()),
            (None, FieldKind::Select | FieldKind::Radio) => field
                .options
                .first()
                .map(|option| FieldValue::Text(option.value.clone())),
            (None, FieldKind::Checkbox) => Some(FieldValue::Bool(false)),
            (None, FieldKind::Rating) => Some(FieldValue::from(field.rating_max())),
            (None, FieldKind::File) => None,
            (None, _) => Some(FieldValue::Text(String::new())),
        };
        if let Some(value) = value {
            out.insert(field.name.clone(), value);
        }
    }
    out
}

/// Checks a field list for caller mistakes and returns the degradable ones
/// that `policy` lets through. Duplicate names and self-references always
/// fail.
pub fn check_fields(
    fields: &[FieldDescriptor],
    policy: ConfigPolicy,
) -> Result<Vec<FormError>, FormError> {
    let mut names = BTreeSet::new();
    for field in fields {
        if !names.insert(field.name.as_str()) {
            return Err(FormError::DuplicateField(field.name.clone()));
        }
    }

    let mut degraded = Vec::new();
    for field in fields {
        let mut problems = Vec::new();
        if field.kind.needs_options() && field.options.is_empty() {
            problems.push(FormError::MissingOptions {
                field: field.name.clone(),
                kind: field.kind.as_str(),
            });
        }
        if let Some(max) = field.max.map(NonZeroU32::get) {
            if field.kind == FieldKind::Rating && max > RATING_MAX_LIMIT {
                problems.push(FormError::RatingTooLarge {
                    field: field.name.clone(),
                    max,
                    limit: RATING_MAX_LIMIT,
                });
            }
        }
        if let Some(conditional) = field.conditional.as_ref() {
            if conditional.depends_on == field.name {
                return Err(FormError::SelfConditional {
                    field: field.name.clone(),
                });
            }
            if !names.contains(conditional.depends_on.as_str()) {
                problems.push(FormError::DanglingConditional {
                    field: field.name.clone(),
                    depends_on: conditional.depends_on.clone(),
                });
            }
        }
        for problem in problems {
            match policy {
                ConfigPolicy::Strict => return Err(problem),
                ConfigPolicy::Permissive => degraded.push(problem),
            }
        }
    }
    Ok(degraded)
}
