use serde::{Deserialize, Serialize};

/// Presentation regions that accept extra classes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Region {
    Form,
    Input,
    Label,
    Select,
    Textarea,
    CheckboxWrapper,
    Checkbox,
    RadioWrapper,
    FileInput,
    RatingWrapper,
    SubmitButton,
}

impl Region {
    pub fn default_class(self) -> &'static str {
        match self {
            Region::Form => "gf-form",
            Region::Input => "gf-input",
            Region::Label => "gf-label",
            Region::Select => "gf-select",
            Region::Textarea => "gf-textarea",
            Region::CheckboxWrapper => "gf-checkbox-wrapper",
            Region::Checkbox => "gf-checkbox",
            Region::RadioWrapper => "gf-radio-wrapper",
            Region::FileInput => "gf-file",
            Region::RatingWrapper => "gf-rating",
            Region::SubmitButton => "gf-submit",
        }
    }
}

/// Optional classes appended to each region's default class. Purely cosmetic.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct StyleOverrides {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub form: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub input: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub label: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub select: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub textarea: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub checkbox_wrapper: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub checkbox: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub radio_wrapper: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub file_input: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub rating_wrapper: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub submit_button: Option<String>,
}

impl StyleOverrides {
    fn extra(&self, region: Region) -> Option<&str> {
        let extra = match region {
            Region::Form => &self.form,
            Region::Input => &self.input,
            Region::Label => &self.label,
            Region::Select => &self.select,
            Region::Textarea => &self.textarea,
            Region::CheckboxWrapper => &self.checkbox_wrapper,
            Region::Checkbox => &self.checkbox,
            Region::RadioWrapper => &self.radio_wrapper,
            Region::FileInput => &self.file_input,
            Region::RatingWrapper => &self.rating_wrapper,
            Region::SubmitButton => &self.submit_button,
        };
        extra.as_deref().map(str::trim).filter(|s| !s.is_empty())
    }

    /// Default class for `region` followed by any override.
    pub fn class(&self, region: Region) -> String {
        match self.extra(region) {
            Some(extra) => format!("{} {extra}", region.default_class()),
            None => region.default_class().to_string(),
        }
    }
}
