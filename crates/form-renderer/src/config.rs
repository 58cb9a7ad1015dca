use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::errors::FormError;
use crate::mode::{ConfigPolicy, ValidationTrigger};
use crate::style::StyleOverrides;

pub const FORM_RUNTIME_CONFIG_SCHEMA_VERSION: u32 = 1;

fn default_schema_version() -> u32 {
    FORM_RUNTIME_CONFIG_SCHEMA_VERSION
}

/// Host-level settings for a form instance.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(deny_unknown_fields)]
pub struct FormRuntimeConfig {
    #[serde(default = "default_schema_version")]
    pub schema_version: u32,
    /// Falls back to `GREENTIC_FORM_CONFIG_POLICY` when the file omits it.
    #[serde(default = "ConfigPolicy::from_env")]
    pub policy: ConfigPolicy,
    #[serde(default)]
    pub validation_trigger: ValidationTrigger,
    #[serde(default)]
    pub styles: StyleOverrides,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub submit_label: Option<String>,
}

impl Default for FormRuntimeConfig {
    fn default() -> Self {
        Self {
            schema_version: FORM_RUNTIME_CONFIG_SCHEMA_VERSION,
            policy: ConfigPolicy::default(),
            validation_trigger: ValidationTrigger::default(),
            styles: StyleOverrides::default(),
            submit_label: None,
        }
    }
}

impl FormRuntimeConfig {
    pub fn validate(&self) -> Result<(), FormError> {
        if self.schema_version != FORM_RUNTIME_CONFIG_SCHEMA_VERSION {
            return Err(FormError::UnsupportedSchemaVersion {
                expected: FORM_RUNTIME_CONFIG_SCHEMA_VERSION,
                got: self.schema_version,
            });
        }
        Ok(())
    }

    /// Loads and validates a config file (JSON or YAML).
    pub fn load(path: impl AsRef<Path>) -> Result<Self, FormError> {
        let contents = std::fs::read_to_string(path.as_ref())?;
        let config: Self = serde_yaml_bw::from_str(&contents).map_err(FormError::parse)?;
        config.validate()?;
        Ok(config)
    }
}
