//! The rows returned when querying a view.

use serde::{Deserialize, Serialize};
use serde_json::Value as JsonValue;

/// The result envelope produced by executing a view query.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct RowEnvelope {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub total_rows: Option<u64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub offset: Option<u64>,
    #[serde(default)]
    pub rows: Vec<Row>,
}

/// A single row of a view's index.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct Row {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    #[serde(default)]
    pub key: JsonValue,
    #[serde(default)]
    pub value: JsonValue,
    /// The row's document, if it was requested. A document deleted since it
    /// was indexed shows up as `null`, which is read as `None`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub doc: Option<JsonValue>,
}

impl From<Vec<Row>> for RowEnvelope {
    fn from(rows: Vec<Row>) -> Self {
        Self {
            total_rows: None,
            offset: None,
            rows,
        }
    }
}

/// An item produced by [`crate::ViewSpec::process_results`].
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum ViewResult {
    /// A full document, for views queried with `include_docs`.
    Document(JsonValue),
    /// A document ID. `None` if the row had no ID.
    Id(Option<String>),
}

impl ViewResult {
    pub fn as_document(&self) -> Option<&JsonValue> {
        match self {
            Self::Document(doc) => Some(doc),
            Self::Id(_) => None,
        }
    }

    pub fn as_id(&self) -> Option<&str> {
        match self {
            Self::Id(id) => id.as_deref(),
            Self::Document(_) => None,
        }
    }
}

/// Extract documents or IDs from the given rows, preserving their order.
///
/// Rows without a document are dropped when extracting documents.
pub fn process(envelope: RowEnvelope, include_docs: bool) -> Vec<ViewResult> {
    if include_docs {
        envelope
            .rows
            .into_iter()
            .filter_map(|row| row.doc.map(ViewResult::Document))
            .collect()
    } else {
        envelope
            .rows
            .into_iter()
            .map(|row| ViewResult::Id(row.id))
            .collect()
    }
}
