//! Options controlling how a view's map function is generated.

use std::{fmt, str::FromStr};

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value as JsonValue};

use crate::Error;

/// The query languages in which map functions can be generated.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Language {
    #[default]
    JavaScript,
    Erlang,
}

impl fmt::Display for Language {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}",
            match self {
                Self::JavaScript => "javascript",
                Self::Erlang => "erlang",
            }
        )
    }
}

impl FromStr for Language {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(match s.to_lowercase().as_ref() {
            "javascript" | "js" => Self::JavaScript,
            "erlang" => Self::Erlang,
            _ => return Err(Error::UnknownLanguage(s.to_string())),
        })
    }
}

/// The document property (or properties) emitted as a view's key.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Key {
    /// A single property name.
    Single(String),
    /// An ordered list of property names, emitted positionally.
    Composite(Vec<String>),
}

impl From<&str> for Key {
    fn from(s: &str) -> Self {
        Self::Single(s.to_string())
    }
}

impl From<String> for Key {
    fn from(s: String) -> Self {
        Self::Single(s)
    }
}

impl<S: AsRef<str>> From<&[S]> for Key {
    fn from(props: &[S]) -> Self {
        Self::Composite(props.iter().map(|p| p.as_ref().to_string()).collect())
    }
}

impl<S: AsRef<str>, const N: usize> From<[S; N]> for Key {
    fn from(props: [S; N]) -> Self {
        Self::from(&props[..])
    }
}

impl From<Vec<String>> for Key {
    fn from(props: Vec<String>) -> Self {
        Self::Composite(props)
    }
}

/// What a map function emits as the value of each row.
///
/// In definition files this is decoded from a loosely typed value: `null` is
/// the default, a string is a raw expression, numbers are literals and
/// `{ "property": "name" }` refers to a document property. Anything else
/// decodes to [`EmitValue::Unsupported`], which is rejected when the map
/// function is generated.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(from = "JsonValue", into = "JsonValue")]
pub enum EmitValue {
    /// The literal `1`.
    #[default]
    Default,
    /// The value of the named document property.
    Property(String),
    /// A raw source expression, interpolated verbatim.
    Expression(String),
    Integer(i64),
    Float(f64),
    /// A value of a kind that has no encoding. Holds a description of the
    /// kind.
    Unsupported(String),
}

impl EmitValue {
    /// Refer to the document property with the given name.
    pub fn property<S: AsRef<str>>(name: S) -> Self {
        Self::Property(name.as_ref().to_string())
    }

    /// Emit the given raw source expression.
    pub fn expression<S: AsRef<str>>(expr: S) -> Self {
        Self::Expression(expr.as_ref().to_string())
    }

    pub fn is_default(&self) -> bool {
        matches!(self, Self::Default)
    }
}

impl From<&str> for EmitValue {
    fn from(expr: &str) -> Self {
        Self::expression(expr)
    }
}

impl From<String> for EmitValue {
    fn from(expr: String) -> Self {
        Self::Expression(expr)
    }
}

impl From<i64> for EmitValue {
    fn from(i: i64) -> Self {
        Self::Integer(i)
    }
}

impl From<i32> for EmitValue {
    fn from(i: i32) -> Self {
        Self::Integer(i.into())
    }
}

impl From<f64> for EmitValue {
    fn from(f: f64) -> Self {
        Self::Float(f)
    }
}

impl From<JsonValue> for EmitValue {
    fn from(v: JsonValue) -> Self {
        match v {
            JsonValue::Null => Self::Default,
            JsonValue::String(s) => Self::Expression(s),
            JsonValue::Number(n) => match n.as_i64() {
                Some(i) => Self::Integer(i),
                None => Self::Float(n.as_f64().unwrap_or(f64::NAN)),
            },
            JsonValue::Bool(_) => Self::Unsupported("boolean".to_string()),
            JsonValue::Array(_) => Self::Unsupported("array".to_string()),
            JsonValue::Object(mut obj) => {
                if obj.len() == 1 {
                    if let Some(JsonValue::String(prop)) = obj.remove("property") {
                        return Self::Property(prop);
                    }
                }
                Self::Unsupported("object".to_string())
            }
        }
    }
}

impl From<EmitValue> for JsonValue {
    fn from(v: EmitValue) -> Self {
        match v {
            EmitValue::Default => JsonValue::Null,
            EmitValue::Property(prop) => {
                JsonValue::Object(Map::from_iter([("property".to_string(), prop.into())]))
            }
            EmitValue::Expression(expr) => JsonValue::String(expr),
            EmitValue::Integer(i) => i.into(),
            EmitValue::Float(f) => f.into(),
            // Only the kind of the rejected value is kept.
            EmitValue::Unsupported(kind) => {
                JsonValue::Object(Map::from_iter([("unsupported".to_string(), kind.into())]))
            }
        }
    }
}

/// Options describing which documents a view selects and what it emits for
/// them.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ViewOptions {
    /// The property or properties to emit as the key. If absent, an empty
    /// string is emitted.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub key: Option<Key>,
    /// A raw boolean expression appended to the document filter (JavaScript
    /// only).
    #[serde(skip_serializing_if = "Option::is_none")]
    pub conditions: Option<String>,
    #[serde(skip_serializing_if = "EmitValue::is_default")]
    pub emit_value: EmitValue,
    pub language: Language,
}

impl ViewOptions {
    pub fn with_key<K: Into<Key>>(mut self, key: K) -> Self {
        self.key = Some(key.into());
        self
    }

    pub fn with_conditions<S: AsRef<str>>(mut self, conditions: S) -> Self {
        self.conditions = Some(conditions.as_ref().to_string());
        self
    }

    pub fn with_emit_value<V: Into<EmitValue>>(mut self, emit_value: V) -> Self {
        self.emit_value = emit_value.into();
        self
    }

    pub fn with_language(mut self, language: Language) -> Self {
        self.language = language;
        self
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use serde_json::json;

    #[test]
    fn emit_values_from_loosely_typed_input() {
        let test_cases = vec![
            (json!(null), EmitValue::Default),
            (json!("doc['a'] + doc['b']"), EmitValue::expression("doc['a'] + doc['b']")),
            (json!(7), EmitValue::Integer(7)),
            (json!(7.2), EmitValue::Float(7.2)),
            (json!({ "property": "count" }), EmitValue::property("count")),
            (json!([]), EmitValue::Unsupported("array".to_string())),
            (json!(true), EmitValue::Unsupported("boolean".to_string())),
            (
                json!({ "property": "count", "other": 1 }),
                EmitValue::Unsupported("object".to_string()),
            ),
        ];
        for (i, (input, expected)) in test_cases.into_iter().enumerate() {
            assert_eq!(EmitValue::from(input), expected, "test case {}", i);
        }
    }

    #[test]
    fn view_options_from_json() {
        let opts: ViewOptions = serde_json::from_value(json!({
            "key": ["code", "name"],
            "emit_value": { "property": "count" },
            "language": "erlang",
        }))
        .unwrap();
        assert_eq!(
            opts,
            ViewOptions::default()
                .with_key(["code", "name"])
                .with_emit_value(EmitValue::property("count"))
                .with_language(Language::Erlang)
        );

        let opts: ViewOptions = serde_json::from_value(json!({ "key": "name" })).unwrap();
        assert_eq!(opts.key, Some(Key::Single("name".to_string())));
        assert_eq!(opts.emit_value, EmitValue::Default);
        assert_eq!(opts.language, Language::JavaScript);
    }

    #[test]
    fn languages() {
        assert_eq!("erlang".parse::<Language>().unwrap(), Language::Erlang);
        assert_eq!("JavaScript".parse::<Language>().unwrap(), Language::JavaScript);
        assert!(matches!(
            "ruby".parse::<Language>(),
            Err(Error::UnknownLanguage(_))
        ));
        assert_eq!(Language::default().to_string(), "javascript");
    }

    #[test]
    fn view_options_reject_unknown_fields() {
        let result = serde_json::from_value::<ViewOptions>(json!({ "reduce": "_count" }));
        assert!(result.is_err());
    }
}
