//! Map function generation for the Erlang query language.
//!
//! Erlang views receive each document as a property list, so every property
//! is looked up with `proplists:get_value/3` and a `null` default. Neither
//! raw conditions nor custom emit values have an Erlang encoding.

use crate::{view::DISCRIMINATOR_FIELD, Error, Key, Language, ViewOptions};

/// Generate an Erlang map function that emits a single row for each document
/// of the given class.
pub fn map_function(class_name: &str, opts: &ViewOptions) -> Result<String, Error> {
    if opts.conditions.is_some() {
        return Err(Error::UnsupportedBackendFeature {
            language: Language::Erlang,
            feature: "conditions",
        });
    }
    if !opts.emit_value.is_default() {
        return Err(Error::UnsupportedBackendFeature {
            language: Language::Erlang,
            feature: "a custom emit value",
        });
    }
    let (bindings, key) = match &opts.key {
        None => (Vec::new(), binary("")),
        Some(Key::Single(prop)) => (vec![binding("Key", prop)], "Key".to_string()),
        Some(Key::Composite(props)) => {
            let names = (0..props.len())
                .map(|i| format!("Key_{}", i))
                .collect::<Vec<String>>();
            let bindings = names
                .iter()
                .zip(props)
                .map(|(name, prop)| binding(name, prop))
                .collect::<Vec<String>>();
            (bindings, format!("[{}]", names.join(", ")))
        }
    };
    let mut body = bindings
        .iter()
        .map(|b| format!("            {},\n", b))
        .collect::<String>();
    body.push_str(&format!("            Emit({}, 1);", key));
    Ok(format!(
        r#"fun({{Doc}}) ->
    case proplists:get_value({field}, Doc) of
        {class} ->
{body}
        _ ->
            ok
    end
end."#,
        field = binary(DISCRIMINATOR_FIELD),
        class = binary(class_name),
        body = body,
    ))
}

fn binding(name: &str, prop: &str) -> String {
    format!("{} = proplists:get_value({}, Doc, null)", name, binary(prop))
}

/// Render the given string as an Erlang binary literal.
pub fn binary(s: &str) -> String {
    let escaped = s.replace('\\', "\\\\").replace('"', "\\\"");
    if s.is_ascii() {
        format!("<<\"{}\">>", escaped)
    } else {
        format!("<<\"{}\"/utf8>>", escaped)
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::EmitValue;

    fn assert_eq_ignoring_indentation(actual: &str, expected: &str) {
        let strip = |s: &str| {
            s.lines()
                .map(str::trim)
                .filter(|l| !l.is_empty())
                .collect::<Vec<&str>>()
                .join("\n")
        };
        assert_eq!(strip(actual), strip(expected));
    }

    #[test]
    fn single_key() {
        let opts = ViewOptions::default()
            .with_key("name")
            .with_language(Language::Erlang);
        assert_eq_ignoring_indentation(
            &map_function("Object", &opts).unwrap(),
            r#"
            fun({Doc}) ->
              case proplists:get_value(<<"ruby_class">>, Doc) of
              <<"Object">> ->
                  Key = proplists:get_value(<<"name">>, Doc, null),
                  Emit(Key, 1);
              _ ->
                  ok
              end
            end.
            "#,
        );
    }

    #[test]
    fn composite_key() {
        let opts = ViewOptions::default()
            .with_key(["code", "name"])
            .with_language(Language::Erlang);
        assert_eq_ignoring_indentation(
            &map_function("Object", &opts).unwrap(),
            r#"
            fun({Doc}) ->
              case proplists:get_value(<<"ruby_class">>, Doc) of
              <<"Object">> ->
                  Key_0 = proplists:get_value(<<"code">>, Doc, null),
                  Key_1 = proplists:get_value(<<"name">>, Doc, null),
                  Emit([Key_0, Key_1], 1);
              _ ->
                  ok
              end
            end.
            "#,
        );
    }

    #[test]
    fn no_key() {
        let opts = ViewOptions::default().with_language(Language::Erlang);
        let map_fn = map_function("Object", &opts).unwrap();
        assert!(map_fn.contains("Emit(<<\"\">>, 1);"));
        assert!(!map_fn.contains("Key"));
    }

    #[test]
    fn conditions_are_not_supported() {
        let opts = ViewOptions::default()
            .with_conditions("abc")
            .with_language(Language::Erlang);
        match map_function("Object", &opts) {
            Err(Error::UnsupportedBackendFeature { language, feature }) => {
                assert_eq!(language, Language::Erlang);
                assert_eq!(feature, "conditions");
            }
            r => panic!("expected an unsupported feature error, but got {:?}", r),
        }
    }

    #[test]
    fn custom_emit_values_are_not_supported() {
        for value in [
            EmitValue::property("count"),
            EmitValue::Integer(1),
            EmitValue::Unsupported("array".to_string()),
        ] {
            let opts = ViewOptions::default()
                .with_emit_value(value)
                .with_language(Language::Erlang);
            let result = map_function("Object", &opts);
            assert!(
                matches!(result, Err(Error::UnsupportedBackendFeature { .. })),
                "got {:?}",
                result
            );
        }
    }

    #[test]
    fn binaries() {
        assert_eq!(binary("Object"), r#"<<"Object">>"#);
        assert_eq!(binary(r#"a"b\c"#), r#"<<"a\"b\\c">>"#);
        assert_eq!(binary("Straße"), r#"<<"Straße"/utf8>>"#);
    }
}
