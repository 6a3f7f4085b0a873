// provider/cookie.rs - Reading the Supabase session cookie
//
// The auth helpers store the session as JSON in `sb-<project-ref>-auth-token`.
// Large sessions are split into `<name>.0`, `<name>.1`, ... and newer clients
// write a `base64-` prefixed base64url payload.

use base64::engine::general_purpose::{STANDARD, URL_SAFE, URL_SAFE_NO_PAD};
use base64::Engine;
use serde_json::Value;

use super::RequestCredentials;

const BASE64_PREFIX: &str = "base64-";

/// Split a `Cookie` header into name/value pairs
pub fn parse_cookie_header(header: &str) -> Vec<(String, String)> {
    header
        .split(';')
        .filter_map(|pair| {
            let (name, value) = pair.split_once('=')?;
            let name = name.trim();
            if name.is_empty() {
                return None;
            }
            let value = value.trim().trim_matches('"');
            Some((name.to_string(), value.to_string()))
        })
        .collect()
}

/// Raw cookie value, joining chunked cookies in order
pub fn cookie_value(credentials: &RequestCredentials, name: &str) -> Option<String> {
    if let Some(value) = credentials.cookie(name) {
        return Some(value.to_string());
    }

    let mut joined = String::new();
    for index in 0.. {
        match credentials.cookie(&format!("{}.{}", name, index)) {
            Some(chunk) => joined.push_str(chunk),
            None => break,
        }
    }
    (!joined.is_empty()).then_some(joined)
}

/// Extract the access token from the session cookie
pub fn session_token(credentials: &RequestCredentials, name: &str) -> Option<String> {
    let raw = cookie_value(credentials, name)?;
    let decoded = urlencoding::decode(&raw)
        .map(|v| v.into_owned())
        .unwrap_or(raw);
    access_token_from_value(&decoded)
}

/// Pull an access token out of a decoded cookie payload
pub fn access_token_from_value(value: &str) -> Option<String> {
    let payload = match value.strip_prefix(BASE64_PREFIX) {
        Some(encoded) => decode_base64(encoded)?,
        None => value.to_string(),
    };
    let payload = payload.trim();

    if payload.starts_with('{') || payload.starts_with('[') {
        let json: Value = serde_json::from_str(payload).ok()?;
        let token = match &json {
            Value::Object(map) => map.get("access_token"),
            Value::Array(items) => items.first(),
            _ => None,
        };
        return token
            .and_then(Value::as_str)
            .filter(|t| !t.is_empty())
            .map(str::to_string);
    }

    looks_like_jwt(payload).then(|| payload.to_string())
}

fn decode_base64(encoded: &str) -> Option<String> {
    let bytes = URL_SAFE_NO_PAD
        .decode(encoded)
        .or_else(|_| URL_SAFE.decode(encoded))
        .or_else(|_| STANDARD.decode(encoded))
        .ok()?;
    String::from_utf8(bytes).ok()
}

fn looks_like_jwt(value: &str) -> bool {
    let parts: Vec<&str> = value.split('.').collect();
    parts.len() == 3 && parts.iter().all(|p| !p.is_empty())
}
