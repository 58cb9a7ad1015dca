use std::env;

use serde::{Deserialize, Serialize};

/// How configuration mistakes in a field list are handled when a form is built.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum ConfigPolicy {
    /// Fail `build()` with a descriptive [`crate::FormError`].
    #[default]
    Strict,
    /// Log a warning and render what can be rendered.
    Permissive,
}

impl ConfigPolicy {
    /// Parse a policy string (case-insensitive).
    pub fn parse(value: &str) -> Option<Self> {
        match value.trim().to_ascii_lowercase().as_str() {
            "strict" | "fail-fast" => Some(Self::Strict),
            "permissive" | "lenient" => Some(Self::Permissive),
            _ => None,
        }
    }

    /// Reads the policy from `GREENTIC_FORM_CONFIG_POLICY`.
    pub fn from_env() -> Self {
        env::var("GREENTIC_FORM_CONFIG_POLICY")
            .ok()
            .and_then(|value| Self::parse(&value))
            .unwrap_or_default()
    }
}

/// When the validation schema runs.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum ValidationTrigger {
    /// Only on submit.
    #[default]
    Submit,
    /// On submit and whenever a value changes; only the changed field's error
    /// entry is refreshed.
    Change,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_is_case_insensitive() {
        assert_eq!(ConfigPolicy::parse(" Permissive "), Some(ConfigPolicy::Permissive));
        assert_eq!(ConfigPolicy::parse("STRICT"), Some(ConfigPolicy::Strict));
        assert_eq!(ConfigPolicy::parse("loose"), None);
    }

    #[test]
    fn policy_from_env() {
        unsafe { env::set_var("GREENTIC_FORM_CONFIG_POLICY", "lenient") };
        assert_eq!(ConfigPolicy::from_env(), ConfigPolicy::Permissive);
        unsafe { env::remove_var("GREENTIC_FORM_CONFIG_POLICY") };
        assert_eq!(ConfigPolicy::from_env(), ConfigPolicy::Strict);
    }
}
