//! Field kind to control mapping.

use crate::plan::{ChoiceEntry, Control, InputType, RenderedField, Star};
use crate::spec::{FieldDescriptor, FieldKind, FieldOption};
use crate::values::{ErrorSet, FieldValue, ValueSet};

/// Renders one visible field bound to `values`, with its inline error from
/// `errors` when one is recorded.
pub fn dispatch(field: &FieldDescriptor, values: &ValueSet, errors: &ErrorSet) -> RenderedField {
    let current = values.get(&field.name);
    let placeholder = field
        .placeholder
        .clone()
        .filter(|_| field.kind.takes_placeholder());

    let control = match field.kind {
        FieldKind::Text => input(InputType::Text, current, placeholder),
        FieldKind::Email => input(InputType::Email, current, placeholder),
        FieldKind::Password => input(InputType::Password, current, placeholder),
        FieldKind::Date => input(InputType::Date, current, placeholder),
        FieldKind::Textarea => Control::TextArea {
            value: current.map(FieldValue::display).unwrap_or_default(),
            placeholder,
        },
        FieldKind::Select => Control::Select {
            options: choices(&field.options, current),
        },
        FieldKind::Radio => Control::RadioGroup {
            options: choices(&field.options, current),
        },
        FieldKind::Checkbox => Control::Checkbox {
            checked: current.and_then(FieldValue::as_bool).unwrap_or(false),
            label: field.label.clone().unwrap_or_else(|| field.name.clone()),
        },
        FieldKind::File => Control::File {
            file: current.and_then(FieldValue::as_file).cloned(),
        },
        FieldKind::Rating => Control::Rating {
            stars: stars(field.rating_max(), current),
        },
    };

    let label = match field.kind {
        FieldKind::Checkbox => None,
        _ => field.label.clone(),
    };

    RenderedField {
        name: field.name.clone(),
        label,
        control,
        error: errors.get(&field.name).map(str::to_string),
    }
}

/// Value a rating field takes when star `index` is clicked.
pub fn star_value(index: u32) -> FieldValue {
    FieldValue::from(index)
}

fn input(input_type: InputType, current: Option<&FieldValue>, placeholder: Option<String>) -> Control {
    Control::Input {
        input_type,
        value: current.map(FieldValue::display).unwrap_or_default(),
        placeholder,
    }
}

fn choices(options: &[FieldOption], current: Option<&FieldValue>) -> Vec<ChoiceEntry> {
    let selected = current.and_then(FieldValue::as_str);
    options
        .iter()
        .map(|option| ChoiceEntry {
            value: option.value.clone(),
            label: option.label.clone(),
            selected: selected == Some(option.value.as_str()),
        })
        .collect()
}

fn stars(max: u32, current: Option<&FieldValue>) -> Vec<Star> {
    let rating = current.and_then(FieldValue::as_f64).unwrap_or(0.0);
    (1..=max)
        .map(|index| Star {
            index,
            filled: f64::from(index) <= rating,
            selected: f64::from(index) == rating,
        })
        .collect()
}
