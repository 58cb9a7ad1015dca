//! HTML markup for rendered forms. All caller-supplied text is escaped.

use htmlescape::encode_minimal as esc;

use crate::plan::{ChoiceEntry, Control, RenderedField, RenderedForm, Star};
use crate::style::{Region, StyleOverrides};

pub fn form_to_html(form: &RenderedForm, styles: &StyleOverrides) -> String {
    let mut out = Vec::new();
    let id = if form.id.is_empty() {
        String::new()
    } else {
        format!(" id=\"{}\"", esc(&form.id))
    };
    out.push(format!(
        "<form class=\"{}\"{id} novalidate>",
        esc(&styles.class(Region::Form))
    ));
    if let Some(title) = form.title.as_ref() {
        out.push(format!("<h2 class=\"gf-title\">{}</h2>", esc(title)));
    }
    for field in &form.fields {
        out.push(field_to_html(field, styles));
    }
    out.push(format!(
        "<button class=\"{}\" type=\"submit\">{}</button>",
        esc(&styles.class(Region::SubmitButton)),
        esc(&form.submit_label)
    ));
    out.push("</form>".to_string());
    out.join("\n")
}

pub fn field_to_html(field: &RenderedField, styles: &StyleOverrides) -> String {
    let name = esc(&field.name);
    let mut out = vec![format!("<div class=\"gf-field\" data-field=\"{name}\">")];

    if let Some(label) = field.label.as_ref() {
        // Grouped controls have no single element to point `for` at.
        let target = match field.control {
            Control::RadioGroup { .. } | Control::Rating { .. } => String::new(),
            _ => format!(" for=\"{name}\""),
        };
        out.push(format!(
            "<label class=\"{}\"{target}>{}</label>",
            esc(&styles.class(Region::Label)),
            esc(label)
        ));
    }

    match &field.control {
        Control::Input {
            input_type,
            value,
            placeholder,
        } => out.push(format!(
            "<input class=\"{}\" type=\"{}\" id=\"{name}\" name=\"{name}\" value=\"{}\"{}>",
            esc(&styles.class(Region::Input)),
            input_type.as_str(),
            esc(value),
            placeholder_attr(placeholder.as_deref())
        )),
        Control::TextArea { value, placeholder } => out.push(format!(
            "<textarea class=\"{}\" id=\"{name}\" name=\"{name}\"{}>{}</textarea>",
            esc(&styles.class(Region::Textarea)),
            placeholder_attr(placeholder.as_deref()),
            esc(value)
        )),
        Control::Select { options } => {
            out.push(format!(
                "<select class=\"{}\" id=\"{name}\" name=\"{name}\">",
                esc(&styles.class(Region::Select))
            ));
            out.extend(options.iter().map(select_option));
            out.push("</select>".to_string());
        }
        Control::RadioGroup { options } => {
            out.push(format!(
                "<div class=\"{}\" role=\"radiogroup\">",
                esc(&styles.class(Region::RadioWrapper))
            ));
            out.extend(options.iter().map(|option| radio_option(&name, option)));
            out.push("</div>".to_string());
        }
        Control::Checkbox { checked, label } => out.push(format!(
            "<div class=\"{}\"><input class=\"{}\" type=\"checkbox\" id=\"{name}\" name=\"{name}\"{}><label for=\"{name}\">{}</label></div>",
            esc(&styles.class(Region::CheckboxWrapper)),
            esc(&styles.class(Region::Checkbox)),
            checked_attr(*checked),
            esc(label)
        )),
        Control::File { file } => {
            let selected = file
                .as_ref()
                .map(|file| format!(" data-selected=\"{}\"", esc(&file.name)))
                .unwrap_or_default();
            out.push(format!(
                "<input class=\"{}\" type=\"file\" id=\"{name}\" name=\"{name}\"{selected}>",
                esc(&styles.class(Region::FileInput))
            ));
        }
        Control::Rating { stars } => {
            out.push(format!(
                "<div class=\"{}\" role=\"radiogroup\">",
                esc(&styles.class(Region::RatingWrapper))
            ));
            out.extend(stars.iter().map(|star| rating_star(&name, star)));
            out.push("</div>".to_string());
        }
    }

    if let Some(error) = field.error.as_ref() {
        out.push(format!(
            "<p class=\"gf-error\" role=\"alert\">{}</p>",
            esc(error)
        ));
    }
    out.push("</div>".to_string());
    out.join("\n")
}

fn placeholder_attr(placeholder: Option<&str>) -> String {
    placeholder
        .map(|text| format!(" placeholder=\"{}\"", esc(text)))
        .unwrap_or_default()
}

fn checked_attr(checked: bool) -> &'static str {
    if checked { " checked" } else { "" }
}

fn select_option(option: &ChoiceEntry) -> String {
    format!(
        "<option value=\"{}\"{}>{}</option>",
        esc(&option.value),
        if option.selected { " selected" } else { "" },
        esc(&option.label)
    )
}

fn radio_option(name: &str, option: &ChoiceEntry) -> String {
    format!(
        "<label><input type=\"radio\" name=\"{name}\" value=\"{}\"{}> {}</label>",
        esc(&option.value),
        checked_attr(option.selected),
        esc(&option.label)
    )
}

fn rating_star(name: &str, star: &Star) -> String {
    let (class, glyph) = if star.filled {
        ("gf-star gf-star-filled", "\u{2605}")
    } else {
        ("gf-star", "\u{2606}")
    };
    format!(
        "<label class=\"{class}\"><input type=\"radio\" name=\"{name}\" value=\"{}\"{}>{glyph}</label>",
        star.index,
        checked_attr(star.selected)
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dispatch::dispatch;
    use crate::spec::{FieldDescriptor, FieldKind};
    use crate::values::{ErrorSet, ValueSet};

    #[test]
    fn text_field_markup() {
        let field = FieldDescriptor::new("name", FieldKind::Text)
            .label("Name")
            .placeholder("Ada");
        let rendered = dispatch(&field, &ValueSet::new(), &ErrorSet::new());
        let html = field_to_html(&rendered, &StyleOverrides::default());
        insta::assert_snapshot!(html, @r#"
        <div class="gf-field" data-field="name">
        <label class="gf-label" for="name">Name</label>
        <input class="gf-input" type="text" id="name" name="name" value="" placeholder="Ada">
        </div>
        "#);
    }

    #[test]
    fn caller_text_is_escaped() {
        let field = FieldDescriptor::new("bio", FieldKind::Textarea).label("<b>Bio</b>");
        let rendered = dispatch(
            &field,
            &ValueSet::new().with("bio", "\"quoted\" & <tag>"),
            &ErrorSet::new(),
        );
        let html = field_to_html(&rendered, &StyleOverrides::default());
        assert!(html.contains("&lt;b&gt;Bio&lt;/b&gt;"));
        assert!(html.contains("&quot;quoted&quot; &amp; &lt;tag&gt;"));
        assert!(!html.contains("<b>"));
    }

    #[test]
    fn error_paragraph_follows_control() {
        let field = FieldDescriptor::new("email", FieldKind::Email).label("Email");
        let mut errors = ErrorSet::new();
        errors.insert("email", "Enter a valid email address");
        let html = field_to_html(
            &dispatch(&field, &ValueSet::new(), &errors),
            &StyleOverrides::default(),
        );
        let input_at = html.find("<input").expect("input");
        let error_at = html.find("gf-error").expect("error");
        assert!(input_at < error_at);
        assert!(html.contains(">Enter a valid email address</p>"));
    }

    #[test]
    fn no_error_markup_without_error() {
        let field = FieldDescriptor::new("email", FieldKind::Email);
        let html = field_to_html(
            &dispatch(&field, &ValueSet::new(), &ErrorSet::new()),
            &StyleOverrides::default(),
        );
        assert!(!html.contains("gf-error"));
    }

    #[test]
    fn rating_stars_render_filled_then_empty() {
        let field = FieldDescriptor::new("score", FieldKind::Rating).max(3);
        let html = field_to_html(
            &dispatch(&field, &ValueSet::new().with("score", 2i64), &ErrorSet::new()),
            &StyleOverrides::default(),
        );
        assert_eq!(html.matches("gf-star gf-star-filled").count(), 2);
        assert_eq!(html.matches("type=\"radio\" name=\"score\"").count(), 3);
        assert!(html.contains("value=\"2\" checked>"));
    }

    #[test]
    fn style_overrides_reach_markup() {
        let styles = StyleOverrides {
            select: Some("rounded".into()),
            ..StyleOverrides::default()
        };
        let field = FieldDescriptor::new("plan", FieldKind::Select).option("a", "A");
        let html = field_to_html(&dispatch(&field, &ValueSet::new(), &ErrorSet::new()), &styles);
        assert!(html.contains("<select class=\"gf-select rounded\""));
    }
}
