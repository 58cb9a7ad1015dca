use serde::{Deserialize, Serialize};

use crate::values::FileHandle;

/// Native type hint of a single-line input.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum InputType {
    Text,
    Email,
    Password,
    Date,
}

impl InputType {
    pub fn as_str(self) -> &'static str {
        match self {
            InputType::Text => "text",
            InputType::Email => "email",
            InputType::Password => "password",
            InputType::Date => "date",
        }
    }
}

/// One selectable entry of a select or radio group.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChoiceEntry {
    pub value: String,
    pub label: String,
    pub selected: bool,
}

/// One star of a rating control. `index` is 1-based.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Star {
    pub index: u32,
    pub filled: bool,
    pub selected: bool,
}

/// The interactive control rendered for a field. Every control binds to the
/// owning field's name.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "control", rename_all = "snake_case")]
pub enum Control {
    Input {
        input_type: InputType,
        value: String,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        placeholder: Option<String>,
    },
    TextArea {
        value: String,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        placeholder: Option<String>,
    },
    Select {
        options: Vec<ChoiceEntry>,
    },
    RadioGroup {
        options: Vec<ChoiceEntry>,
    },
    /// Carries its own inline label.
    Checkbox {
        checked: bool,
        label: String,
    },
    File {
        #[serde(default, skip_serializing_if = "Option::is_none")]
        file: Option<FileHandle>,
    },
    Rating {
        stars: Vec<Star>,
    },
}

/// One visible field: an optional top label, exactly one control and at most
/// one inline error.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RenderedField {
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub label: Option<String>,
    pub control: Control,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

/// Configuration problem that was degraded instead of failing the build.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RenderWarning {
    pub code: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub path: Option<String>,
}

/// Output of one render pass: visible fields in caller order.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RenderedForm {
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub id: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    #[serde(default)]
    pub fields: Vec<RenderedField>,
    pub submit_label: String,
    #[serde(default)]
    pub warnings: Vec<RenderWarning>,
}

impl RenderedForm {
    pub fn field(&self, name: &str) -> Option<&RenderedField> {
        self.fields.iter().find(|field| field.name == name)
    }

    pub fn is_visible(&self, name: &str) -> bool {
        self.field(name).is_some()
    }

    pub fn field_names(&self) -> Vec<&str> {
        self.fields.iter().map(|field| field.name.as_str()).collect()
    }
}
