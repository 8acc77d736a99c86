//! Map function generation for the JavaScript query language.

use crate::{view::DISCRIMINATOR_FIELD, EmitValue, Error, Key, ViewOptions};

/// Generate a JavaScript map function that emits a single row for each
/// document of the given class.
pub fn map_function(class_name: &str, opts: &ViewOptions) -> Result<String, Error> {
    let mut filter = format!(
        "doc.{field} && doc.{field} == {class}",
        field = DISCRIMINATOR_FIELD,
        class = quote(class_name)
    );
    if let Some(conditions) = &opts.conditions {
        filter.push_str(&format!(" && ({})", conditions));
    }
    let value = emit_value(&opts.emit_value)?;
    Ok(format!(
        r#"function(doc) {{
  if({filter}) {{
    emit({key}, {value});
  }}
}}"#,
        filter = filter,
        key = key(opts.key.as_ref()),
        value = value,
    ))
}

fn key(key: Option<&Key>) -> String {
    match key {
        None => "''".to_string(),
        Some(Key::Single(prop)) => property(prop),
        Some(Key::Composite(props)) => format!(
            "[{}]",
            props
                .iter()
                .map(|prop| property(prop))
                .collect::<Vec<String>>()
                .join(", ")
        ),
    }
}

fn emit_value(value: &EmitValue) -> Result<String, Error> {
    Ok(match value {
        EmitValue::Default => "1".to_string(),
        EmitValue::Property(prop) => property(prop),
        EmitValue::Expression(expr) => expr.clone(),
        EmitValue::Integer(i) => i.to_string(),
        EmitValue::Float(f) if f.is_finite() => f.to_string(),
        EmitValue::Float(f) => return Err(Error::UnsupportedEmitValueKind(format!("float {}", f))),
        EmitValue::Unsupported(kind) => return Err(Error::UnsupportedEmitValueKind(kind.clone())),
    })
}

// Properties are always looked up dynamically, since their names need not be
// valid identifiers.
fn property(name: &str) -> String {
    format!("doc[{}]", quote(name))
}

/// Render the given string as a single-quoted JavaScript string literal.
pub fn quote(s: &str) -> String {
    format!("'{}'", escape(s))
}

/// Escape the given string for inclusion in a single-quoted JavaScript string
/// literal.
pub fn escape(s: &str) -> String {
    let mut escaped = String::with_capacity(s.len());
    for c in s.chars() {
        match c {
            '\\' => escaped.push_str("\\\\"),
            '\'' => escaped.push_str("\\'"),
            '\n' => escaped.push_str("\\n"),
            '\r' => escaped.push_str("\\r"),
            '\u{2028}' => escaped.push_str("\\u2028"),
            '\u{2029}' => escaped.push_str("\\u2029"),
            _ => escaped.push(c),
        }
    }
    escaped
}
