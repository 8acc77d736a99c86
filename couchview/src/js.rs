//! Local execution of JavaScript map functions.
//!
//! Allows for previewing what a view would index without registering it with
//! a database.

use boa::JsValue;
use eyre::Result;
use log::{debug, trace};
use serde::Deserialize;
use serde_json::Value as JsonValue;

use crate::{javascript::escape, Error, Language, Row, RowEnvelope, ViewSpec};

// What the evaluation script records for each call to `emit`.
#[derive(Debug, Deserialize)]
struct Emitted {
    // The engine does not distinguish integers from floats.
    index: f64,
    #[serde(default)]
    key: JsonValue,
    #[serde(default)]
    value: JsonValue,
}

/// Run the given spec's map function over each of the given documents and
/// collect the emitted rows as a view query would return them.
///
/// Each row's ID is taken from its document's `_id` property, and the
/// document itself is attached if the spec's query options include
/// documents. Rows appear in the order in which they were emitted, and are not
/// collated by key.
pub fn evaluate_map_function(spec: &ViewSpec, docs: &[JsonValue]) -> Result<RowEnvelope> {
    if spec.language() != Language::JavaScript {
        return Err(Error::CannotEvaluate(spec.language()).into());
    }
    let map_fn = spec.map_function()?;
    let script = format!(
        r#"
            var __docs = JSON.parse('{docs}');
            var __emitted = [];
            var __index = 0;
            function emit(key, value) {{
                __emitted.push({{
                    index: __index,
                    key: key === undefined ? null : key,
                    value: value === undefined ? null : value
                }});
            }}
            var __map = {map_fn};
            for (__index = 0; __index < __docs.length; __index++) {{
                __map(__docs[__index]);
            }}
            JSON.stringify(__emitted)
        "#,
        docs = escape(&serde_json::to_string(docs)?),
        map_fn = map_fn,
    );
    trace!("Attempting to execute script:\n{}", script);
    let mut ctx = boa::Context::new();
    let result = ctx
        .eval(script)
        .map_err(|e| Error::JavaScript(spec.view_name().to_string(), format!("{:#?}", e)))?;
    let emitted = match &result {
        JsValue::String(s) => serde_json::from_str::<Vec<Emitted>>(&s.to_string())?,
        _ => {
            return Err(Error::UnexpectedJavaScriptReturnValue(
                spec.view_name().to_string(),
                format!("{:?}", result),
            )
            .into())
        }
    };
    let include_docs = spec.query_options().include_docs();
    let rows = emitted
        .into_iter()
        .filter_map(|e| {
            let doc = docs.get(e.index as usize)?;
            Some(Row {
                id: doc.get("_id").and_then(JsonValue::as_str).map(String::from),
                key: e.key,
                value: e.value,
                doc: if include_docs { Some(doc.clone()) } else { None },
            })
        })
        .collect::<Vec<Row>>();
    debug!(
        "View {} emitted {} row(s) for {} document(s)",
        spec.view_name(),
        rows.len(),
        docs.len()
    );
    Ok(RowEnvelope {
        total_rows: Some(rows.len() as u64),
        offset: Some(0),
        rows,
    })
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::{EmitValue, QueryOptions, ViewOptions, ViewResult};
    use serde_json::json;

    fn docs() -> Vec<JsonValue> {
        vec![
            json!({ "_id": "u1", "ruby_class": "User", "name": "alice", "code": 2, "a": 1, "b": 2, "closed": false }),
            json!({ "_id": "p1", "ruby_class": "Post", "name": "hello" }),
            json!({ "_id": "u2", "ruby_class": "User", "name": "bob", "code": 1, "a": 3, "b": 4, "closed": true }),
            json!({ "_id": "x1", "name": "untagged" }),
        ]
    }

    fn evaluate(opts: ViewOptions, query: QueryOptions) -> RowEnvelope {
        let spec = ViewSpec::new("User", "test", opts, query);
        evaluate_map_function(&spec, &docs()).unwrap()
    }

    #[test]
    fn emits_only_for_owner_class() {
        let rows = evaluate(ViewOptions::default(), QueryOptions::default());
        assert_eq!(rows.total_rows, Some(2));
        let ids = rows
            .rows
            .iter()
            .map(|r| r.id.clone().unwrap())
            .collect::<Vec<String>>();
        assert_eq!(ids, vec!["u1", "u2"]);
        for row in rows.rows.iter() {
            assert_eq!(row.key, json!(""));
            assert_eq!(row.value.as_f64(), Some(1.0));
            assert!(row.doc.is_none());
        }
    }

    #[test]
    fn keys_and_values() {
        let rows = evaluate(
            ViewOptions::default()
                .with_key(["name", "code"])
                .with_emit_value("doc['a'] + doc['b']"),
            QueryOptions::default(),
        );
        // Numbers may come back as either integers or floats.
        assert_eq!(rows.rows[0].key[0], json!("alice"));
        assert_eq!(rows.rows[0].key[1].as_f64(), Some(2.0));
        assert_eq!(rows.rows[0].value.as_f64(), Some(3.0));
        assert_eq!(rows.rows[1].key[0], json!("bob"));
        assert_eq!(rows.rows[1].key[1].as_f64(), Some(1.0));
        assert_eq!(rows.rows[1].value.as_f64(), Some(7.0));

        let rows = evaluate(
            ViewOptions::default()
                .with_key("missing")
                .with_emit_value(EmitValue::property("name")),
            QueryOptions::default(),
        );
        assert_eq!(rows.rows[0].key, JsonValue::Null);
        assert_eq!(rows.rows[0].value, json!("alice"));

        let rows = evaluate(
            ViewOptions::default().with_emit_value(7.5),
            QueryOptions::default(),
        );
        assert_eq!(rows.rows[1].value.as_f64(), Some(7.5));
    }

    #[test]
    fn conditions_narrow_the_filter() {
        let rows = evaluate(
            ViewOptions::default()
                .with_key("name")
                .with_conditions("doc.closed == true"),
            QueryOptions::default(),
        );
        assert_eq!(rows.rows.len(), 1);
        assert_eq!(rows.rows[0].id.as_deref(), Some("u2"));
    }

    #[test]
    fn escaped_class_names_still_match() {
        let docs = vec![json!({ "_id": "q1", "ruby_class": "It's\\Odd", "name": "q" })];
        let spec = ViewSpec::new(
            "It's\\Odd",
            "all",
            ViewOptions::default().with_key("name"),
            QueryOptions::default(),
        );
        let rows = evaluate_map_function(&spec, &docs).unwrap();
        assert_eq!(rows.rows.len(), 1);
        assert_eq!(rows.rows[0].key, json!("q"));
    }

    #[test]
    fn included_documents_can_be_processed() {
        let spec = ViewSpec::new(
            "User",
            "all",
            ViewOptions::default().with_key("name"),
            QueryOptions::default().with_include_docs(true),
        );
        let rows = evaluate_map_function(&spec, &docs()).unwrap();
        let results = spec.process_results(rows);
        assert_eq!(
            results,
            vec![
                ViewResult::Document(docs()[0].clone()),
                ViewResult::Document(docs()[2].clone()),
            ]
        );
    }

    #[test]
    fn erlang_cannot_be_evaluated() {
        let spec = ViewSpec::new(
            "User",
            "all",
            ViewOptions::default().with_language(Language::Erlang),
            QueryOptions::default(),
        );
        let err = evaluate_map_function(&spec, &docs()).unwrap_err();
        assert!(matches!(
            err.downcast_ref::<Error>(),
            Some(Error::CannotEvaluate(Language::Erlang))
        ));
    }

    #[test]
    fn generation_errors_propagate() {
        let spec = ViewSpec::new(
            "User",
            "all",
            ViewOptions::default().with_emit_value(EmitValue::from(json!([1]))),
            QueryOptions::default(),
        );
        let err = evaluate_map_function(&spec, &docs()).unwrap_err();
        assert!(matches!(
            err.downcast_ref::<Error>(),
            Some(Error::UnsupportedEmitValueKind(_))
        ));
    }
}
