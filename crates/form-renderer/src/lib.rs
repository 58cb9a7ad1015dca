//! Declarative form renderer.
//!
//! A form is an ordered list of [`FieldDescriptor`]s plus a
//! [`ValidationSchema`]. Each render pass gates every field through
//! [`should_render`], maps the visible ones to bound controls with
//! [`dispatch`], and attaches inline errors. [`Form::submit`] forwards the
//! value-set to the caller only when the schema reports no errors.

pub mod config;
pub mod dispatch;
pub mod errors;
pub mod form;
pub mod html;
pub mod mode;
pub mod plan;
pub mod schema;
pub mod spec;
pub mod state;
pub mod style;
pub mod values;
pub mod visibility;

pub use config::FormRuntimeConfig;
pub use dispatch::{dispatch, star_value};
pub use errors::FormError;
pub use form::{CancelToken, FieldUpdate, Form, FormBuilder, SubmitOutcome};
pub use html::{field_to_html, form_to_html};
pub use mode::{ConfigPolicy, ValidationTrigger};
pub use plan::{ChoiceEntry, Control, InputType, RenderWarning, RenderedField, RenderedForm, Star};
pub use schema::{AcceptAll, FieldRules, Pattern, RuleSchema, ValidationSchema};
pub use spec::{
    Conditional, DEFAULT_RATING_MAX, RATING_MAX_LIMIT, FieldDescriptor, FieldKind, FieldOption, FormSpec,
    check_fields, example_values,
};
pub use state::{FieldChange, FormState, SubscriptionId};
pub use style::{Region, StyleOverrides};
pub use values::{ErrorSet, FieldValue, FileHandle, ValueSet};
pub use visibility::{dependency_index, should_render};
