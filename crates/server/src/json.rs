//! Conversion between request/response JSON and BSON documents.
//!
//! Incoming bodies are read as MongoDB extended JSON, so `{"$oid": ...}` and
//! `{"$date": ...}` values survive the trip. Outgoing documents are rendered
//! as relaxed extended JSON: numbers and strings stay plain, ids come out
//! as `{"$oid": "<hex>"}`.

use serde_json::{Map, Value};

use store::{Bson, Document};

use crate::error::{ApiError, ApiResult};

/// Parse a JSON body that must be an object into a document.
pub fn document_from_json(value: Value) -> ApiResult<Document> {
    match value {
        Value::Object(map) => object_to_document(map),
        other => Err(ApiError::invalid(format!(
            "request body must be a JSON object, got {}",
            kind(&other)
        ))),
    }
}

fn object_to_document(map: Map<String, Value>) -> ApiResult<Document> {
    Document::try_from(map).map_err(|err| ApiError::invalid(format!("malformed body: {err}")))
}

/// Extract a required object-valued field from a JSON body.
pub fn document_field(body: &mut Map<String, Value>, field: &str) -> ApiResult<Document> {
    match body.remove(field) {
        Some(Value::Object(map)) => object_to_document(map),
        Some(other) => Err(ApiError::invalid(format!(
            "'{field}' must be an object, got {}",
            kind(&other)
        ))),
        None => Err(ApiError::invalid(format!("missing '{field}'"))),
    }
}

pub fn document_to_json(document: Document) -> Value {
    Bson::Document(document).into_relaxed_extjson()
}

pub fn documents_to_json(documents: Vec<Document>) -> Value {
    Value::Array(documents.into_iter().map(document_to_json).collect())
}

fn kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "an array",
        Value::Object(_) => "an object",
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use store::doc;
    use store::MovieId;

    #[test]
    fn test_body_must_be_an_object() {
        assert!(document_from_json(json!([1, 2])).is_err());
        assert!(document_from_json(json!("movie")).is_err());
        assert!(document_from_json(json!(null)).is_err());
    }

    #[test]
    fn test_extended_json_ids_are_understood() {
        let id = MovieId::generate();
        let document =
            document_from_json(json!({ "_id": { "$oid": id.to_string() }, "year": 1995 })).unwrap();
        assert_eq!(document.get_object_id("_id").unwrap(), id.object_id());
        assert_eq!(document.get_i32("year").unwrap(), 1995);
    }

    #[test]
    fn test_documents_render_as_relaxed_json() {
        let id = MovieId::generate();
        let rendered = document_to_json(doc! {
            "_id": id.object_id(),
            "title": "Heat",
            "year": 1995,
            "imdb": { "rating": 8.3 },
        });
        assert_eq!(
            rendered,
            json!({
                "_id": { "$oid": id.to_string() },
                "title": "Heat",
                "year": 1995,
                "imdb": { "rating": 8.3 },
            })
        );
    }

    #[test]
    fn test_document_field() {
        let mut body = json!({ "filter": { "year": 1995 }, "update": 3 })
            .as_object()
            .cloned()
            .unwrap();
        assert_eq!(document_field(&mut body, "filter").unwrap(), doc! { "year": 1995 });
        assert!(document_field(&mut body, "update").is_err());
        assert!(document_field(&mut body, "missing").is_err());
    }
}
