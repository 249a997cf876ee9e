//! JSON encoding handed to and received from the persistence collaborator.

use crate::error::DocumentResult;
use crate::model::Document;

pub fn to_json(doc: &Document) -> DocumentResult<String> {
    Ok(serde_json::to_string(doc)?)
}

pub fn to_json_pretty(doc: &Document) -> DocumentResult<String> {
    Ok(serde_json::to_string_pretty(doc)?)
}

pub fn from_json(source: &str) -> DocumentResult<Document> {
    let doc: Document = serde_json::from_str(source)?;
    tracing::debug!(rows = doc.rows.len(), blocks = doc.block_count(), "Parsed document");
    Ok(doc)
}
