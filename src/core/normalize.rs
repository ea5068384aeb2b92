//! Response Normalization - parsing boundary di tepi jaringan
//!
//! API desa tidak konsisten: kadang `[...]`, kadang `{data: [...]}`,
//! kadang `{data: {data: [...], next_page_url}}`. Semua bentuk dideteksi
//! SEKALI di sini, halaman cukup menerima `NormalizedList<T>`.

use serde::de::DeserializeOwned;
use serde::Serialize;
use serde_json::Value;
use std::fmt;

use crate::models::errors::{AppError, AppResult, ErrorCode};
use crate::utils::constants::ENVELOPE_SUCCESS;

/// Where the list was found
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum ListShape {
    /// `[...]`
    Bare,
    /// `{ "data": [...] }`
    Wrapped,
    /// `{ "data": { "data": [...] } }` (Laravel paginator)
    Nested,
}

/// List payload with its detected shape
#[derive(Debug, Clone)]
pub struct NormalizedList<T> {
    pub items: Vec<T>,
    pub shape: ListShape,
}

/// Body did not match any known list shape
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ShapeMismatch {
    pub expected: &'static str,
    pub found: &'static str,
}

impl fmt::Display for ShapeMismatch {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "expected {}, found {}", self.expected, self.found)
    }
}

impl std::error::Error for ShapeMismatch {}

impl From<ShapeMismatch> for AppError {
    fn from(err: ShapeMismatch) -> Self {
        AppError::shape_mismatch(err.to_string())
    }
}

/// Short JSON type name for diagnostics
pub fn describe(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}

/// Find the list inside any of the known envelopes
pub fn locate_list(value: &Value) -> Result<(&Vec<Value>, ListShape), ShapeMismatch> {
    if let Value::Array(items) = value {
        return Ok((items, ListShape::Bare));
    }
    match value.get("data") {
        Some(Value::Array(items)) => Ok((items, ListShape::Wrapped)),
        Some(inner @ Value::Object(_)) => match inner.get("data") {
            Some(Value::Array(items)) => Ok((items, ListShape::Nested)),
            Some(other) => Err(ShapeMismatch {
                expected: "data.data array",
                found: describe(other),
            }),
            None => Err(ShapeMismatch {
                expected: "data.data array",
                found: "object without data",
            }),
        },
        Some(other) => Err(ShapeMismatch {
            expected: "array or data array",
            found: describe(other),
        }),
        None => Err(ShapeMismatch {
            expected: "array or data array",
            found: describe(value),
        }),
    }
}

/// Normalize a list response of any known shape into typed items
pub fn normalize_list<T: DeserializeOwned>(value: Value) -> AppResult<NormalizedList<T>> {
    let (raw, shape) = locate_list(&value)?;
    let items = raw
        .iter()
        .cloned()
        .map(serde_json::from_value)
        .collect::<Result<Vec<T>, _>>()?;
    Ok(NormalizedList { items, shape })
}

/// `value.data` when present, otherwise the value itself
pub fn unwrap_data(value: Value) -> Value {
    match value {
        Value::Object(mut map) if map.contains_key("data") => {
            map.remove("data").unwrap_or(Value::Null)
        }
        other => other,
    }
}

/// One remote page of a Laravel-style paginated response
#[derive(Debug, Clone)]
pub struct PageChunk<T> {
    pub items: Vec<T>,
    pub current_page: u32,
    pub last_page: Option<u32>,
    pub total: Option<u64>,
    pub next_page_url: Option<String>,
}

impl<T> PageChunk<T> {
    pub fn has_next(&self) -> bool {
        self.next_page_url.is_some()
    }
}

/// Parse `{status: "success", data: {current_page, data: [...], next_page_url, ...}}`
pub fn parse_page<T: DeserializeOwned>(value: Value) -> AppResult<PageChunk<T>> {
    if let Some(status) = value.get("status").and_then(Value::as_str) {
        if status != ENVELOPE_SUCCESS {
            return Err(AppError::new(
                ErrorCode::ApiRequestFailed,
                format!("Failed to fetch data (status: {})", status),
            ));
        }
    }

    let page = value.get("data").ok_or(ShapeMismatch {
        expected: "paginated data object",
        found: describe(&value),
    })?;
    let raw = match page.get("data") {
        Some(Value::Array(items)) => items,
        Some(other) => {
            return Err(ShapeMismatch {
                expected: "data.data array",
                found: describe(other),
            }
            .into())
        }
        None => {
            return Err(ShapeMismatch {
                expected: "data.data array",
                found: describe(page),
            }
            .into())
        }
    };

    let items = raw
        .iter()
        .cloned()
        .map(serde_json::from_value)
        .collect::<Result<Vec<T>, _>>()?;

    Ok(PageChunk {
        items,
        current_page: page
            .get("current_page")
            .and_then(Value::as_u64)
            .unwrap_or(1) as u32,
        last_page: page
            .get("last_page")
            .and_then(Value::as_u64)
            .map(|p| p as u32),
        total: page.get("total").and_then(Value::as_u64),
        next_page_url: page
            .get("next_page_url")
            .and_then(Value::as_str)
            .map(str::to_string),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde::Deserialize;
    use serde_json::json;

    #[derive(Debug, Deserialize, PartialEq)]
    struct Row {
        id: i64,
    }

    #[test]
    fn test_all_list_shapes() {
        let bare: NormalizedList<Row> = normalize_list(json!([{ "id": 1 }])).unwrap();
        assert_eq!(bare.shape, ListShape::Bare);

        let wrapped: NormalizedList<Row> =
            normalize_list(json!({ "data": [{ "id": 1 }, { "id": 2 }] })).unwrap();
        assert_eq!(wrapped.shape, ListShape::Wrapped);
        assert_eq!(wrapped.items.len(), 2);

        let nested: NormalizedList<Row> =
            normalize_list(json!({ "data": { "data": [{ "id": 3 }], "total": 1 } })).unwrap();
        assert_eq!(nested.shape, ListShape::Nested);
        assert_eq!(nested.items, vec![Row { id: 3 }]);
    }

    #[test]
    fn test_shape_mismatch() {
        let err = normalize_list::<Row>(json!({ "message": "ok" })).unwrap_err();
        assert_eq!(err.code, ErrorCode::ShapeMismatch);

        let err = normalize_list::<Row>(json!({ "data": "nope" })).unwrap_err();
        assert_eq!(err.code, ErrorCode::ShapeMismatch);
        assert!(err.message.contains("string"));
    }

    #[test]
    fn test_item_type_mismatch_is_shape_error() {
        let err = normalize_list::<Row>(json!([{ "id": "x" }])).unwrap_err();
        assert_eq!(err.code, ErrorCode::ShapeMismatch);
    }

    #[test]
    fn test_parse_page() {
        let chunk: PageChunk<Row> = parse_page(json!({
            "status": "success",
            "data": {
                "current_page": 2,
                "data": [{ "id": 6 }],
                "total": 6,
                "last_page": 2,
                "next_page_url": null
            }
        }))
        .unwrap();
        assert_eq!(chunk.current_page, 2);
        assert_eq!(chunk.last_page, Some(2));
        assert!(!chunk.has_next());
    }

    #[test]
    fn test_parse_page_rejects_error_status() {
        let err = parse_page::<Row>(json!({ "status": "error", "data": null })).unwrap_err();
        assert_eq!(err.code, ErrorCode::ApiRequestFailed);
    }

    #[test]
    fn test_unwrap_data() {
        assert_eq!(unwrap_data(json!({ "data": { "x": 1 } })), json!({ "x": 1 }));
        assert_eq!(unwrap_data(json!([1, 2])), json!([1, 2]));
    }
}
