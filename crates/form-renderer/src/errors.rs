use thiserror::Error;

/// Errors raised while loading or configuring a form. Rendering itself never
/// fails; validation failures are data in an [`crate::ErrorSet`].
#[derive(Debug, Error)]
pub enum FormError {
    #[error("field `{field}` of kind {kind} requires at least one option")]
    MissingOptions { field: String, kind: &'static str },
    #[error("rating field `{field}` asks for {max} stars; at most {limit} are supported")]
    RatingTooLarge { field: String, max: u32, limit: u32 },
    #[error("field `{field}` depends on unknown field `{depends_on}`")]
    DanglingConditional { field: String, depends_on: String },
    #[error("field `{field}` cannot depend on itself")]
    SelfConditional { field: String },
    #[error("duplicate field name `{0}`")]
    DuplicateField(String),
    #[error("invalid regex for {field}: {source}")]
    InvalidRegex {
        field: String,
        #[source]
        source: regex::Error,
    },
    #[error("unknown field `{0}`")]
    UnknownField(String),
    #[error("form is missing required option `{0}`")]
    Incomplete(&'static str),
    #[error("failed to parse form spec: {0}")]
    Parse(String),
    #[error("unsupported schema version: expected {expected}, got {got}")]
    UnsupportedSchemaVersion { expected: u32, got: u32 },
    #[error(transparent)]
    Io(#[from] std::io::Error),
}

impl FormError {
    pub fn parse(msg: impl std::fmt::Display) -> Self {
        FormError::Parse(msg.to_string())
    }

    /// Configuration mistakes that the permissive policy may degrade instead of
    /// failing on.
    pub fn is_degradable(&self) -> bool {
        matches!(
            self,
            FormError::MissingOptions { .. }
                | FormError::RatingTooLarge { .. }
                | FormError::DanglingConditional { .. }
                | FormError::UnknownField(_)
        )
    }

    /// Stable code used when a degraded problem is surfaced as a render warning.
    pub fn warning_code(&self) -> &'static str {
        match self {
            FormError::MissingOptions { .. } => "missing_options",
            FormError::RatingTooLarge { .. } => "rating_too_large",
            FormError::DanglingConditional { .. } => "dangling_conditional",
            FormError::SelfConditional { .. } => "self_conditional",
            FormError::DuplicateField(_) => "duplicate_field",
            FormError::InvalidRegex { .. } => "invalid_regex",
            FormError::UnknownField(_) => "unknown_field",
            FormError::Incomplete(_) => "incomplete",
            FormError::Parse(_) => "parse",
            FormError::UnsupportedSchemaVersion { .. } => "unsupported_schema_version",
            FormError::Io(_) => "io",
        }
    }

    /// Field the problem is about, when there is one.
    pub fn field(&self) -> Option<&str> {
        match self {
            FormError::MissingOptions { field, .. }
            | FormError::RatingTooLarge { field, .. }
            | FormError::DanglingConditional { field, .. }
            | FormError::SelfConditional { field }
            | FormError::InvalidRegex { field, .. } => Some(field.as_str()),
            FormError::DuplicateField(field) | FormError::UnknownField(field) => Some(field.as_str()),
            _ => None,
        }
    }
}
