use std::cell::RefCell;
use std::rc::Rc;

use greentic_form_renderer::{
    FieldDescriptor, FieldKind, FieldRules, FieldUpdate, FieldValue, Form, RuleSchema,
    SubmitOutcome, ValidationTrigger, ValueSet,
};

type Calls = Rc<RefCell<Vec<ValueSet>>>;

fn signup_form(calls: &Calls, values: ValueSet) -> Form {
    let sink = Rc::clone(calls);
    Form::builder(vec![
        FieldDescriptor::new("email", FieldKind::Email).label("Email"),
        FieldDescriptor::new("country", FieldKind::Select)
            .option("us", "US")
            .option("other", "Other"),
        FieldDescriptor::new("customCountry", FieldKind::Text).show_when("country", "other"),
    ])
    .schema(RuleSchema::new().rule("email", FieldRules::email().and_required()))
    .on_submit(move |data| sink.borrow_mut().push(data.clone()))
    .values(values)
    .build()
    .expect("form")
}

#[test]
fn invalid_email_blocks_submit_and_sets_error() {
    let calls: Calls = Rc::default();
    let mut form = signup_form(&calls, ValueSet::new().with("email", "not-an-email"));

    let outcome = form.submit();
    let SubmitOutcome::Invalid { errors } = outcome else {
        panic!("expected invalid outcome");
    };
    assert!(errors.get("email").is_some_and(|msg| !msg.is_empty()));
    assert!(calls.borrow().is_empty());

    let rendered = form.render();
    assert_eq!(
        rendered.field("email").and_then(|f| f.error.as_deref()),
        Some("Enter a valid email address")
    );
    assert!(form.render_html().contains("gf-error"));
}

#[test]
fn valid_submit_forwards_hidden_values_once() {
    let calls: Calls = Rc::default();
    let mut form = signup_form(
        &calls,
        ValueSet::new()
            .with("email", "ada@example.com")
            .with("country", "us")
            .with("customCountry", "left over"),
    );
    assert!(!form.is_visible("customCountry"));

    let outcome = form.submit();
    assert!(outcome.is_submitted());
    let calls = calls.borrow();
    assert_eq!(calls.len(), 1);
    assert_eq!(
        calls[0].get("customCountry"),
        Some(&FieldValue::from("left over"))
    );
    assert_eq!(calls[0].len(), 3);
}

#[test]
fn fixing_the_error_clears_it_on_next_submit() {
    let calls: Calls = Rc::default();
    let mut form = signup_form(&calls, ValueSet::new().with("email", "nope"));
    assert!(!form.submit().is_submitted());
    assert!(!form.errors().is_empty());

    form.set_value("email", "nope@example.com").expect("set");
    // Submit-triggered validation leaves the stale error until the next attempt.
    assert!(form.errors().contains("email"));

    assert!(form.submit().is_submitted());
    assert!(form.errors().is_empty());
    assert!(form.render().field("email").is_some_and(|f| f.error.is_none()));
    assert_eq!(calls.borrow().len(), 1);
}

#[test]
fn each_attempt_is_independent() {
    let calls: Calls = Rc::default();
    let mut form = signup_form(&calls, ValueSet::new().with("email", "ok@example.com"));
    assert!(form.submit().is_submitted());
    assert!(form.submit().is_submitted());
    assert_eq!(calls.borrow().len(), 2);
}

#[test]
fn change_trigger_refreshes_only_the_edited_field() {
    let calls: Calls = Rc::default();
    let sink = Rc::clone(&calls);
    let mut form = Form::builder(vec![
        FieldDescriptor::new("email", FieldKind::Email),
        FieldDescriptor::new("name", FieldKind::Text),
    ])
    .schema(
        RuleSchema::new()
            .rule("email", FieldRules::email())
            .rule("name", FieldRules::required()),
    )
    .on_submit(move |data| sink.borrow_mut().push(data.clone()))
    .validation_trigger(ValidationTrigger::Change)
    .build()
    .expect("form");

    let updates = form.set_value("email", "bad").expect("set");
    assert!(updates.contains(&FieldUpdate::Error {
        field: "email".into(),
        message: Some("Enter a valid email address".into()),
    }));
    assert!(!form.errors().contains("name"));

    let updates = form.set_value("email", "good@example.com").expect("set");
    assert!(updates.contains(&FieldUpdate::Error {
        field: "email".into(),
        message: None,
    }));
    assert!(form.errors().is_empty());
    assert!(calls.borrow().is_empty());
}

#[test]
fn empty_message_override_still_blocks_submit() {
    let calls: Calls = Rc::default();
    let sink = Rc::clone(&calls);
    let mut form = Form::builder(vec![FieldDescriptor::new("email", FieldKind::Email)])
        .schema(RuleSchema::new().rule(
            "email",
            FieldRules::email().and_required().with_message(""),
        ))
        .on_submit(move |data| sink.borrow_mut().push(data.clone()))
        .values(ValueSet::new().with("email", "not-an-email"))
        .build()
        .expect("form");

    let SubmitOutcome::Invalid { errors } = form.submit() else {
        panic!("expected invalid outcome");
    };
    assert_eq!(errors.get("email"), Some("Enter a valid email address"));
    assert!(calls.borrow().is_empty());
}

#[test]
fn integral_float_reveals_integer_conditional() {
    let calls: Calls = Rc::default();
    let sink = Rc::clone(&calls);
    let mut form = Form::builder(vec![
        FieldDescriptor::new("score", FieldKind::Rating),
        FieldDescriptor::new("praise", FieldKind::Text).show_when("score", 3i64),
    ])
    .schema(RuleSchema::new().rule(
        "praise",
        FieldRules::required().only_if("score", 3i64),
    ))
    .on_submit(move |data| sink.borrow_mut().push(data.clone()))
    .build()
    .expect("form");

    let updates = form
        .set_value("score", FieldValue::number(3.0).expect("finite"))
        .expect("set");
    assert!(updates.contains(&FieldUpdate::Visibility {
        field: "praise".into(),
        visible: true
    }));
    let SubmitOutcome::Invalid { errors } = form.submit() else {
        panic!("expected invalid outcome");
    };
    assert_eq!(errors.get("praise"), Some("This field is required"));
}
