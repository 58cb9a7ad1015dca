use std::cell::RefCell;
use std::fmt;
use std::rc::Rc;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

use tracing::{debug, warn};

use crate::config::FormRuntimeConfig;
use crate::dispatch::dispatch;
use crate::errors::FormError;
use crate::html::{field_to_html, form_to_html};
use crate::mode::{ConfigPolicy, ValidationTrigger};
use crate::plan::{RenderWarning, RenderedField, RenderedForm};
use crate::schema::ValidationSchema;
use crate::spec::{FieldDescriptor, FormSpec, check_fields};
use crate::state::{FieldChange, FormState, SubscriptionId};
use crate::style::StyleOverrides;
use crate::values::{ErrorSet, FieldValue, ValueSet};
use crate::visibility::{dependency_index, should_render};

pub const DEFAULT_SUBMIT_LABEL: &str = "Submit";

type SubmitHandler = Box<dyn FnMut(&ValueSet)>;

/// Something a host has to re-render after a value change.
#[derive(Debug, Clone, PartialEq)]
pub enum FieldUpdate {
    /// The field's own value changed.
    Value { field: String },
    /// A conditional field appeared or disappeared.
    Visibility { field: String, visible: bool },
    /// The field's inline error changed (change-triggered validation only).
    Error {
        field: String,
        message: Option<String>,
    },
}

#[derive(Debug, Clone, PartialEq)]
pub enum SubmitOutcome {
    /// Validation passed and the submit callback ran once with `data`.
    Submitted { data: ValueSet },
    /// Validation failed; the callback did not run.
    Invalid { errors: ErrorSet },
    /// The attempt was cancelled before the callback could run.
    Cancelled,
}

impl SubmitOutcome {
    pub fn is_submitted(&self) -> bool {
        matches!(self, SubmitOutcome::Submitted { .. })
    }
}

/// Cancels one submit attempt. Cloning shares the flag.
#[derive(Debug, Clone, Default)]
pub struct CancelToken(Arc<AtomicBool>);

impl CancelToken {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn cancel(&self) {
        self.0.store(true, Ordering::SeqCst);
    }

    pub fn is_cancelled(&self) -> bool {
        self.0.load(Ordering::SeqCst)
    }
}

pub struct FormBuilder {
    id: String,
    title: Option<String>,
    submit_label: Option<String>,
    fields: Vec<FieldDescriptor>,
    schema: Option<Box<dyn ValidationSchema>>,
    on_submit: Option<SubmitHandler>,
    config: FormRuntimeConfig,
    values: ValueSet,
    errors: ErrorSet,
}

impl FormBuilder {
    pub fn id(mut self, id: impl Into<String>) -> Self {
        self.id = id.into();
        self
    }

    pub fn title(mut self, title: impl Into<String>) -> Self {
        self.title = Some(title.into());
        self
    }

    pub fn schema(mut self, schema: impl ValidationSchema + 'static) -> Self {
        self.schema = Some(Box::new(schema));
        self
    }

    pub fn on_submit(mut self, handler: impl FnMut(&ValueSet) + 'static) -> Self {
        self.on_submit = Some(Box::new(handler));
        self
    }

    pub fn config(mut self, config: FormRuntimeConfig) -> Self {
        self.config = config;
        self
    }

    pub fn policy(mut self, policy: ConfigPolicy) -> Self {
        self.config.policy = policy;
        self
    }

    pub fn validation_trigger(mut self, trigger: ValidationTrigger) -> Self {
        self.config.validation_trigger = trigger;
        self
    }

    pub fn styles(mut self, styles: StyleOverrides) -> Self {
        self.config.styles = styles;
        self
    }

    /// Initial values; field defaults fill in whatever is missing. Keys must
    /// name declared fields.
    pub fn values(mut self, values: ValueSet) -> Self {
        self.values = values;
        self
    }

    /// Errors to display before the first submit, e.g. from a server round trip.
    pub fn errors(mut self, errors: ErrorSet) -> Self {
        self.errors = errors;
        self
    }

    pub fn build(self) -> Result<Form, FormError> {
        self.config.validate()?;
        let schema = self.schema.ok_or(FormError::Incomplete("schema"))?;
        let on_submit = self.on_submit.ok_or(FormError::Incomplete("on_submit"))?;

        let mut problems = check_fields(&self.fields, self.config.policy)?;

        let mut values = self.values;
        let unknown: Vec<String> = values
            .iter()
            .map(|(name, _)| name)
            .filter(|name| !self.fields.iter().any(|field| field.name == *name))
            .map(str::to_string)
            .collect();
        for name in unknown {
            if self.config.policy == ConfigPolicy::Strict {
                return Err(FormError::UnknownField(name));
            }
            values.remove(&name);
            problems.push(FormError::UnknownField(name));
        }

        let warnings = problems
            .into_iter()
            .map(|problem| {
                warn!(
                    form = %self.id,
                    field = problem.field().unwrap_or_default(),
                    "degraded form configuration: {problem}"
                );
                RenderWarning {
                    code: problem.warning_code().to_string(),
                    message: Some(problem.to_string()),
                    path: problem.field().map(str::to_string),
                }
            })
            .collect();
        for field in &self.fields {
            if let Some(default) = field.default.as_ref() {
                if !values.contains(&field.name) {
                    values.insert(field.name.clone(), default.clone());
                }
            }
        }

        let submit_label = self
            .config
            .submit_label
            .clone()
            .or(self.submit_label)
            .unwrap_or_else(|| DEFAULT_SUBMIT_LABEL.to_string());

        let mut form = Form {
            id: self.id,
            title: self.title,
            submit_label,
            fields: self.fields,
            state: FormState::with_values(values),
            errors: self.errors,
            schema,
            on_submit,
            styles: self.config.styles,
            trigger: self.config.validation_trigger,
            warnings,
            pending: Rc::default(),
        };
        form.wire_subscriptions();
        debug!(form = %form.id, fields = form.fields.len(), "form built");
        Ok(form)
    }
}

/// One form instance: the field list, its value store and error set, the
/// validation schema and the submit callback. Nothing is shared between
/// instances.
pub struct Form {
    id: String,
    title: Option<String>,
    submit_label: String,
    fields: Vec<FieldDescriptor>,
    state: FormState,
    errors: ErrorSet,
    schema: Box<dyn ValidationSchema>,
    on_submit: SubmitHandler,
    styles: StyleOverrides,
    trigger: ValidationTrigger,
    warnings: Vec<RenderWarning>,
    pending: Rc<RefCell<Vec<FieldUpdate>>>,
}

impl fmt::Debug for Form {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Form")
            .field("id", &self.id)
            .field("fields", &self.fields)
            .field("state", &self.state)
            .field("errors", &self.errors)
            .field("trigger", &self.trigger)
            .finish_non_exhaustive()
    }
}

impl Form {
    pub fn builder(fields: Vec<FieldDescriptor>) -> FormBuilder {
        FormBuilder {
            id: String::new(),
            title: None,
            submit_label: None,
            fields,
            schema: None,
            on_submit: None,
            config: FormRuntimeConfig::default(),
            values: ValueSet::new(),
            errors: ErrorSet::new(),
        }
    }

    /// Builder seeded from a loaded spec; its rules become the schema.
    pub fn from_spec(spec: FormSpec) -> FormBuilder {
        let FormSpec {
            id,
            title,
            submit_label,
            fields,
            rules,
        } = spec;
        let mut builder = Self::builder(fields).id(id).schema(rules);
        builder.title = title;
        builder.submit_label = submit_label;
        builder
    }

    /// Every field watches its own value; conditional fields additionally
    /// watch their one dependency.
    fn wire_subscriptions(&mut self) {
        for field in &self.fields {
            let pending = Rc::clone(&self.pending);
            self.state.watch(field.name.clone(), move |change: &FieldChange<'_>| {
                pending.borrow_mut().push(FieldUpdate::Value {
                    field: change.field.to_string(),
                });
            });
        }

        for (dependency, dependents) in dependency_index(&self.fields) {
            let gates: Vec<(String, FieldValue)> = dependents
                .iter()
                .filter_map(|name| {
                    let field = self.fields.iter().find(|field| &field.name == name)?;
                    field
                        .conditional
                        .as_ref()
                        .map(|cond| (name.clone(), cond.equals.clone()))
                })
                .collect();
            let pending = Rc::clone(&self.pending);
            self.state.watch(dependency, move |change: &FieldChange<'_>| {
                let mut pending = pending.borrow_mut();
                for (field, equals) in &gates {
                    let was = change.previous == Some(equals);
                    let now = change.current == Some(equals);
                    if was != now {
                        pending.push(FieldUpdate::Visibility {
                            field: field.clone(),
                            visible: now,
                        });
                    }
                }
            });
        }
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    pub fn fields(&self) -> &[FieldDescriptor] {
        &self.fields
    }

    pub fn field(&self, name: &str) -> Option<&FieldDescriptor> {
        self.fields.iter().find(|field| field.name == name)
    }

    pub fn values(&self) -> &ValueSet {
        self.state.values()
    }

    pub fn errors(&self) -> &ErrorSet {
        &self.errors
    }

    pub fn warnings(&self) -> &[RenderWarning] {
        &self.warnings
    }

    /// Subscribes a host callback to one field's changes.
    pub fn watch(
        &mut self,
        field: impl Into<String>,
        watcher: impl FnMut(&FieldChange<'_>) + 'static,
    ) -> SubscriptionId {
        self.state.watch(field, watcher)
    }

    pub fn unwatch(&mut self, id: SubscriptionId) -> bool {
        self.state.unwatch(id)
    }

    pub fn is_visible(&self, name: &str) -> bool {
        self.field(name)
            .is_some_and(|field| should_render(field, self.state.values()))
    }

    /// One render pass: visible fields in declaration order. Same inputs,
    /// same output.
    pub fn render(&self) -> RenderedForm {
        let values = self.state.values();
        let fields: Vec<RenderedField> = self
            .fields
            .iter()
            .filter(|field| should_render(field, values))
            .map(|field| dispatch(field, values, &self.errors))
            .collect();
        debug!(
            form = %self.id,
            visible = fields.len(),
            total = self.fields.len(),
            "rendered form"
        );
        RenderedForm {
            id: self.id.clone(),
            title: self.title.clone(),
            fields,
            submit_label: self.submit_label.clone(),
            warnings: self.warnings.clone(),
        }
    }

    /// Re-renders a single field; `None` when it is unknown or hidden.
    pub fn render_field(&self, name: &str) -> Option<RenderedField> {
        let field = self.field(name)?;
        let values = self.state.values();
        should_render(field, values).then(|| dispatch(field, values, &self.errors))
    }

    pub fn render_html(&self) -> String {
        form_to_html(&self.render(), &self.styles)
    }

    pub fn render_field_html(&self, name: &str) -> Option<String> {
        self.render_field(name)
            .map(|field| field_to_html(&field, &self.styles))
    }

    /// Records a user edit and reports what needs re-rendering.
    pub fn set_value(
        &mut self,
        name: &str,
        value: impl Into<FieldValue>,
    ) -> Result<Vec<FieldUpdate>, FormError> {
        self.ensure_known(name)?;
        self.state.set(name, value.into());
        Ok(self.after_change(name))
    }

    pub fn clear_value(&mut self, name: &str) -> Result<Vec<FieldUpdate>, FormError> {
        self.ensure_known(name)?;
        self.state.clear(name);
        Ok(self.after_change(name))
    }

    fn ensure_known(&self, name: &str) -> Result<(), FormError> {
        match self.field(name) {
            Some(_) => Ok(()),
            None => Err(FormError::UnknownField(name.to_string())),
        }
    }

    fn after_change(&mut self, name: &str) -> Vec<FieldUpdate> {
        let mut updates = std::mem::take(&mut *self.pending.borrow_mut());
        if self.trigger == ValidationTrigger::Change && !updates.is_empty() {
            let message = self
                .schema
                .validate(self.state.values())
                .get(name)
                .map(str::to_string);
            let before = self.errors.get(name).map(str::to_string);
            if message != before {
                self.errors.remove(name);
                if let Some(message) = message.as_ref() {
                    self.errors.insert(name, message.clone());
                }
                updates.push(FieldUpdate::Error {
                    field: name.to_string(),
                    message,
                });
            }
        }
        updates
    }

    pub fn submit(&mut self) -> SubmitOutcome {
        self.submit_with(&CancelToken::new())
    }

    /// Validates the complete value-set, hidden fields included. Only a fully
    /// valid set reaches the submit callback, exactly once per attempt.
    pub fn submit_with(&mut self, token: &CancelToken) -> SubmitOutcome {
        let errors = self.schema.validate(self.state.values());
        if token.is_cancelled() {
            debug!(form = %self.id, "submit cancelled");
            return SubmitOutcome::Cancelled;
        }
        if errors.is_empty() {
            self.errors.clear();
            let data = self.state.values().clone();
            debug!(form = %self.id, values = data.len(), "submit accepted");
            (self.on_submit)(&data);
            SubmitOutcome::Submitted { data }
        } else {
            debug!(form = %self.id, failing = errors.len(), "submit rejected");
            self.errors = errors.clone();
            SubmitOutcome::Invalid { errors }
        }
    }
}
