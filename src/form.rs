//! HTML for the single-page form.
//!
//! Widget bounds come from [`crate::types`] and select options from the
//! encoder's lookup tables, so the page can only offer values the pipeline
//! accepts.

use std::collections::HashMap;
use std::fmt::Write;
use std::str::FromStr;

use crate::encoder::{LookupTable, CP, EXANG, FBS, RESTECG, SEX, SLOPE, THAL};
use crate::error::InputError;
use crate::presenter::RiskAssessment;
use crate::types::{NumericField, PatientInput, AGE, CA, CA_CHOICES, CHOL, OLDPEAK, THALACH, TRESTBPS};

pub const TITLE: &str = "Heart Disease Risk Prediction";
pub const SUBTITLE: &str = "Enter patient information to assess heart disease risk.";

/// What to show under the form.
pub enum Banner<'a> {
    Result(&'a RiskAssessment),
    Error(&'a str),
}

/// A decoded form post: every value that could be read, plus the first
/// field that could not.
///
/// Unreadable numeric fields keep their default so the page can be shown
/// again with the rest of the user's entries intact.
pub struct Submission {
    pub values: PatientInput,
    pub error: Option<InputError>,
}

pub fn read_submission(fields: &HashMap<String, String>) -> Submission {
    let mut v = PatientInput::default();
    let mut error = None;

    read_number(fields, &AGE, &mut v.age, &mut error);
    read_label(fields, &SEX, &mut v.sex, &mut error);
    read_label(fields, &CP, &mut v.cp, &mut error);
    read_number(fields, &TRESTBPS, &mut v.trestbps, &mut error);
    read_number(fields, &CHOL, &mut v.chol, &mut error);
    read_label(fields, &FBS, &mut v.fbs, &mut error);
    read_label(fields, &RESTECG, &mut v.restecg, &mut error);
    read_number(fields, &THALACH, &mut v.thalach, &mut error);
    read_label(fields, &EXANG, &mut v.exang, &mut error);
    read_number(fields, &OLDPEAK, &mut v.oldpeak, &mut error);
    read_label(fields, &SLOPE, &mut v.slope, &mut error);
    read_number(fields, &CA, &mut v.ca, &mut error);
    read_label(fields, &THAL, &mut v.thal, &mut error);

    Submission { values: v, error }
}

fn read_label(
    fields: &HashMap<String, String>,
    table: &LookupTable,
    slot: &mut String,
    error: &mut Option<InputError>,
) {
    match fields.get(table.field) {
        Some(raw) => *slot = raw.clone(),
        None => {
            error.get_or_insert(InputError::Missing { field: table.field });
        }
    }
}

fn read_number<T: FromStr>(
    fields: &HashMap<String, String>,
    field: &NumericField,
    slot: &mut T,
    error: &mut Option<InputError>,
) {
    let Some(raw) = fields.get(field.name) else {
        error.get_or_insert(InputError::Missing { field: field.name });
        return;
    };
    match raw.trim().parse() {
        Ok(n) => *slot = n,
        Err(_) => {
            error.get_or_insert(InputError::InvalidNumber {
                field: field.name,
                value: raw.clone(),
            });
        }
    }
}

pub fn render_page(values: &PatientInput, banner: Option<Banner<'_>>) -> String {
    let mut html = String::with_capacity(8 * 1024);
    html.push_str("<!DOCTYPE html>\n<html lang=\"en\">\n<head>\n<meta charset=\"utf-8\">\n");
    let _ = writeln!(html, "<title>{TITLE}</title>");
    html.push_str(STYLE);
    html.push_str("</head>\n<body>\n<main>\n");
    let _ = writeln!(html, "<h1>🏥 {TITLE}</h1>\n<p>{SUBTITLE}</p>");

    html.push_str("<form id=\"patient_form\" method=\"post\" action=\"/predict\">\n");
    number_input(&mut html, &AGE, values.age as f64);
    select(&mut html, &SEX, &values.sex);
    select(&mut html, &CP, &values.cp);
    number_input(&mut html, &TRESTBPS, values.trestbps as f64);
    number_input(&mut html, &CHOL, values.chol as f64);
    select(&mut html, &FBS, &values.fbs);
    select(&mut html, &RESTECG, &values.restecg);
    number_input(&mut html, &THALACH, values.thalach as f64);
    select(&mut html, &EXANG, &values.exang);
    number_input(&mut html, &OLDPEAK, values.oldpeak);
    select(&mut html, &SLOPE, &values.slope);
    ca_select(&mut html, values.ca);
    select(&mut html, &THAL, &values.thal);
    html.push_str("<button type=\"submit\">Predict</button>\n</form>\n");

    match banner {
        Some(Banner::Result(risk)) => {
            let _ = writeln!(
                html,
                "<div class=\"banner {}\">{} {}</div>",
                risk.style().css_class(),
                risk.icon(),
                escape_html(&risk.message())
            );
        }
        Some(Banner::Error(msg)) => {
            let _ = writeln!(html, "<div class=\"banner error\">{}</div>", escape_html(msg));
        }
        None => {}
    }

    html.push_str("</main>\n</body>\n</html>\n");
    html
}

fn number_input(html: &mut String, field: &NumericField, value: f64) {
    let fmt = |v: f64| {
        if field.is_integer() {
            format!("{}", v as i64)
        } else {
            format!("{v:.2}")
        }
    };
    let _ = writeln!(
        html,
        "<label for=\"{name}\">{label}</label>\n<input type=\"number\" id=\"{name}\" name=\"{name}\" min=\"{min}\" max=\"{max}\" step=\"{step}\" value=\"{value}\" required>",
        name = field.name,
        label = escape_html(field.label),
        min = fmt(field.min),
        max = fmt(field.max),
        step = field.step,
        value = fmt(value),
    );
}

fn select(html: &mut String, table: &LookupTable, selected: &str) {
    let _ = writeln!(
        html,
        "<label for=\"{0}\">{1}</label>\n<select id=\"{0}\" name=\"{0}\">",
        table.field,
        escape_html(table.label)
    );
    for label in table.labels() {
        option(html, label, label == selected);
    }
    html.push_str("</select>\n");
}

fn ca_select(html: &mut String, selected: i64) {
    let _ = writeln!(
        html,
        "<label for=\"{0}\">{1}</label>\n<select id=\"{0}\" name=\"{0}\">",
        CA.name,
        escape_html(CA.label)
    );
    for choice in CA_CHOICES {
        option(html, &choice.to_string(), choice == selected);
    }
    html.push_str("</select>\n");
}

fn option(html: &mut String, value: &str, selected: bool) {
    let value = escape_html(value);
    let sel = if selected { " selected" } else { "" };
    let _ = writeln!(html, "<option value=\"{value}\"{sel}>{value}</option>");
}

pub fn escape_html(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    for c in s.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#39;"),
            _ => out.push(c),
        }
    }
    out
}

const STYLE: &str = r#"<style>
body { font-family: sans-serif; background: #fafafa; }
main { max-width: 40rem; margin: 2rem auto; }
label { display: block; margin-top: 0.8rem; font-weight: 600; }
input, select { width: 100%; padding: 0.3rem; }
button { margin-top: 1.2rem; padding: 0.5rem 1.5rem; }
.banner { margin-top: 1.5rem; padding: 0.8rem; border-radius: 0.3rem; }
.warning { background: #fde2e1; color: #8a1c1c; }
.success { background: #e1f5e4; color: #1c6b2a; }
.error { background: #fff3cd; color: #7a5b00; }
</style>
"#;
