// handlers/data.rs - /api/data record endpoints
//
// Unauthenticated JSON CRUD over the in-memory RecordStore.

use axum::{
    body::Bytes,
    extract::{Path, State},
    http::{header, HeaderMap, StatusCode},
    response::IntoResponse,
    Json,
};
use serde_json::{json, Value};

use crate::error::ApiError;
use crate::store::{Record, RecordStore};

const NOT_FOUND: &str = "Data not found";

const INVALID_BODY: &str = "Invalid JSON body";

/// Interpret a path id the way a lenient integer prefix parse does:
/// leading whitespace, an optional sign, then at least one digit.
/// A `0x` prefix switches to hex digits. Trailing garbage is ignored;
/// anything else is not an id.
pub fn parse_id(raw: &str) -> Option<i64> {
    let trimmed = raw.trim_start();
    let (negative, unsigned) = match trimmed.as_bytes().first() {
        Some(b'-') => (true, &trimmed[1..]),
        Some(b'+') => (false, &trimmed[1..]),
        _ => (false, trimmed),
    };

    let (radix, digits) = match unsigned.get(..2) {
        Some("0x") | Some("0X") => (16, &unsigned[2..]),
        _ => (10, unsigned),
    };

    let end = digits
        .find(|c: char| !c.is_digit(radix))
        .unwrap_or(digits.len());
    if end == 0 {
        return None;
    }

    let value = i64::from_str_radix(&digits[..end], radix).ok()?;
    Some(if negative { -value } else { value })
}

fn is_json(headers: &HeaderMap) -> bool {
    headers
        .get(header::CONTENT_TYPE)
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.split(';').next())
        .map(|mime| {
            let mime = mime.trim().to_ascii_lowercase();
            mime == "application/json" || mime.ends_with("+json")
        })
        .unwrap_or(false)
}

/// Pull the record name out of a create/update body.
///
/// A request without a JSON content type or with an empty body carries no
/// name. Malformed JSON, a scalar top-level value and a `name` that is not a
/// string (or null) are rejected before the store is touched.
pub fn body_name(headers: &HeaderMap, body: &[u8]) -> Result<Option<String>, ApiError> {
    if !is_json(headers) || body.iter().all(u8::is_ascii_whitespace) {
        return Ok(None);
    }

    let value: Value = serde_json::from_slice(body).map_err(|e| {
        tracing::debug!("Rejecting request body: {}", e);
        ApiError::bad_request(INVALID_BODY)
    })?;

    match value {
        Value::Object(mut fields) => match fields.remove("name") {
            None | Some(Value::Null) => Ok(None),
            Some(Value::String(name)) => Ok(Some(name)),
            Some(_) => Err(ApiError::bad_request("Field 'name' must be a string")),
        },
        Value::Array(_) => Ok(None),
        _ => Err(ApiError::bad_request(INVALID_BODY)),
    }
}

/// GET /api/data - list every record
pub async fn data_list(State(store): State<RecordStore>) -> Json<Vec<Record>> {
    Json(store.list_all().await)
}

/// GET /api/data/:id - show a single record
pub async fn data_get(
    State(store): State<RecordStore>,
    Path(id): Path<String>,
) -> Result<Json<Record>, ApiError> {
    let id = parse_id(&id).ok_or_else(|| ApiError::not_found(NOT_FOUND))?;
    store
        .find_by_id(id)
        .await
        .map(Json)
        .ok_or_else(|| ApiError::not_found(NOT_FOUND))
}

/// POST /api/data - append a record
pub async fn data_create(
    State(store): State<RecordStore>,
    headers: HeaderMap,
    body: Bytes,
) -> Result<impl IntoResponse, ApiError> {
    let name = body_name(&headers, &body)?;
    let record = store.create(name).await;
    tracing::info!("Created record {}", record.id);
    Ok((StatusCode::CREATED, Json(record)))
}

/// PUT /api/data/:id - replace a record's name
pub async fn data_update(
    State(store): State<RecordStore>,
    Path(id): Path<String>,
    headers: HeaderMap,
    body: Bytes,
) -> Result<Json<Record>, ApiError> {
    let name = body_name(&headers, &body)?;
    let id = parse_id(&id).ok_or_else(|| ApiError::not_found(NOT_FOUND))?;
    store
        .update(id, name)
        .await
        .map(Json)
        .ok_or_else(|| ApiError::not_found(NOT_FOUND))
}

/// DELETE /api/data/:id - remove a record; succeeds whether or not it existed
pub async fn data_delete(State(store): State<RecordStore>, Path(id): Path<String>) -> Json<Value> {
    if let Some(id) = parse_id(&id) {
        store.delete(id).await;
    }
    Json(json!({ "message": "Data deleted" }))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_id_accepts_integer_prefixes() {
        assert_eq!(parse_id("1"), Some(1));
        assert_eq!(parse_id("  42"), Some(42));
        assert_eq!(parse_id("+7"), Some(7));
        assert_eq!(parse_id("-3"), Some(-3));
        assert_eq!(parse_id("12abc"), Some(12));
        assert_eq!(parse_id("5.9"), Some(5));
    }

    #[test]
    fn parse_id_reads_hex_prefix() {
        assert_eq!(parse_id("0x10"), Some(16));
        assert_eq!(parse_id("0XfF"), Some(255));
        assert_eq!(parse_id("-0x1a"), Some(-26));
        assert_eq!(parse_id("0x1g"), Some(1));
        assert_eq!(parse_id("0x"), None);
        assert_eq!(parse_id("0xg"), None);
        assert_eq!(parse_id("010"), Some(10));
    }

    #[test]
    fn parse_id_rejects_non_numbers() {
        assert_eq!(parse_id("abc"), None);
        assert_eq!(parse_id(""), None);
        assert_eq!(parse_id("-"), None);
        assert_eq!(parse_id("x12"), None);
        assert_eq!(parse_id("99999999999999999999999"), None);
    }

    fn json_headers() -> HeaderMap {
        let mut headers = HeaderMap::new();
        headers.insert(header::CONTENT_TYPE, "application/json; charset=utf-8".parse().unwrap());
        headers
    }

    #[test]
    fn body_name_reads_string_names() {
        let headers = json_headers();
        assert_eq!(body_name(&headers, br#"{"name":"X"}"#), Ok(Some("X".to_string())));
        assert_eq!(body_name(&headers, br#"{"name":null}"#), Ok(None));
        assert_eq!(body_name(&headers, br#"{"other":1}"#), Ok(None));
        assert_eq!(body_name(&headers, b"  "), Ok(None));
    }

    #[test]
    fn body_name_ignores_non_json_requests() {
        assert_eq!(body_name(&HeaderMap::new(), b"{bad"), Ok(None));

        let mut headers = HeaderMap::new();
        headers.insert(header::CONTENT_TYPE, "text/plain".parse().unwrap());
        assert_eq!(body_name(&headers, br#"{"name":"X"}"#), Ok(None));
    }

    #[test]
    fn body_name_rejects_bad_json() {
        let headers = json_headers();
        let bodies: [&[u8]; 4] = [b"{bad", br#"{"name":42}"#, br#"{"name":["X"]}"#, b"42"];
        for body in bodies {
            let err = body_name(&headers, body).unwrap_err();
            assert_eq!(err.status_code(), StatusCode::BAD_REQUEST, "for {:?}", body);
        }
    }
}
