//! Parameters passed along when querying a view.

use serde::{Deserialize, Serialize};
use serde_json::Value as JsonValue;

use crate::Error;

// Parameters whose values are passed through as-is instead of being JSON
// encoded.
const RAW_STRING_PARAMS: &[&str] = &["startkey_docid", "endkey_docid", "stale"];

/// Whether a query may be answered from a stale index.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Stale {
    Ok,
    UpdateAfter,
}

/// Query options for a view.
///
/// Every parameter is optional. Unknown parameters are rejected when
/// deserializing.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct QueryOptions {
    /// Whether rows carry their full documents. Determines whether
    /// [`crate::ViewSpec::process_results`] produces documents or IDs.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub include_docs: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub key: Option<JsonValue>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub keys: Option<Vec<JsonValue>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub startkey: Option<JsonValue>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub startkey_docid: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub endkey: Option<JsonValue>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub endkey_docid: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub limit: Option<u64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub skip: Option<u64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub descending: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub group: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub group_level: Option<u64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub reduce: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub inclusive_end: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub stale: Option<Stale>,
}

impl QueryOptions {
    pub fn with_include_docs(mut self, include_docs: bool) -> Self {
        self.include_docs = Some(include_docs);
        self
    }

    /// Whether full documents are requested. Defaults to `false`.
    pub fn include_docs(&self) -> bool {
        self.include_docs.unwrap_or(false)
    }

    /// Render the parameters that have been set as `(name, value)` pairs,
    /// ordered by name, ready to be URL-encoded.
    pub fn to_query_pairs(&self) -> Result<Vec<(String, String)>, Error> {
        let params = match serde_json::to_value(self)? {
            JsonValue::Object(params) => params,
            _ => return Ok(Vec::new()),
        };
        let mut pairs = params
            .into_iter()
            .map(|(name, value)| {
                let value = match value {
                    JsonValue::String(s) if RAW_STRING_PARAMS.contains(&name.as_str()) => s,
                    other => other.to_string(),
                };
                (name, value)
            })
            .collect::<Vec<(String, String)>>();
        pairs.sort();
        Ok(pairs)
    }
}
