//! # Inline Template Rendering
//!
//! A lenient counterpart to the strict prompt set resolver: renders a
//! template string against a JSON object of macros, supporting dot
//! notation for nested lookups (`{{user.name}}`). References that cannot
//! be resolved are left in place rather than failing, which makes this
//! suitable for previewing partially-bound templates.

use super::TemplateError;
use regex::{Captures, Regex};
use serde_json::Value;

/// Replaces every `{{macro}}` in `template` with its value from `macros`.
///
/// Nested objects are addressed with dots. An unresolved reference is kept
/// in the output in canonical `{{key}}` form (internal whitespace is not
/// preserved). String values insert their raw text; any other JSON value
/// inserts its compact encoding.
pub fn apply_template(template: &str, macros: &Value) -> Result<String, TemplateError> {
    let re = Regex::new(r"\{\{\s*([\w.]+)\s*\}\}")?;
    let rendered = re.replace_all(template, |caps: &Captures<'_>| {
        let key = &caps[1];
        match lookup(macros, key) {
            Some(Value::String(s)) => s.clone(),
            Some(value) => value.to_string(),
            None => format!("{{{{{key}}}}}"),
        }
    });
    Ok(rendered.into_owned())
}

/// Walks `macros` down a dot-separated key path.
fn lookup<'a>(macros: &'a Value, key: &str) -> Option<&'a Value> {
    let mut current = macros;
    for part in key.split('.') {
        current = current.as_object()?.get(part)?;
    }
    Some(current)
}
