use axum::http::{header::AUTHORIZATION, HeaderMap};
use axum_extra::extract::CookieJar;
use euclid_identity::Identifier;

use crate::ApiError;

pub fn require_bearer(headers: &HeaderMap) -> Result<String, ApiError> {
    let value = headers
        .get(AUTHORIZATION)
        .and_then(|header| header.to_str().ok())
        .ok_or_else(|| ApiError::unauthorized("missing authorization header"))?;

    let mut parts = value.split_whitespace();
    let scheme = parts.next().unwrap_or("");
    if !scheme.eq_ignore_ascii_case("Bearer") {
        return Err(ApiError::unauthorized("invalid authorization scheme"));
    }

    let token = parts.next().unwrap_or("");
    if token.is_empty() {
        return Err(ApiError::unauthorized("missing bearer token"));
    }

    Ok(token.to_string())
}

/// Session token from the `Authorization` header, falling back to the session cookie.
pub fn session_token(headers: &HeaderMap, cookie_name: &str) -> Result<String, ApiError> {
    if headers.contains_key(AUTHORIZATION) {
        return require_bearer(headers);
    }

    CookieJar::from_headers(headers)
        .get(cookie_name)
        .map(|cookie| cookie.value().to_string())
        .filter(|value| !value.is_empty())
        .ok_or_else(|| ApiError::unauthorized("authentication required"))
}

/// Decode an identifier taken from the URL path; failures read as 404.
pub fn path_id(raw: &str) -> Result<Identifier, ApiError> {
    Identifier::decode(raw).map_err(|error| ApiError::undecodable_path_id(raw, &error))
}

/// Decode an identifier submitted as a form field; failures read as 400.
pub fn form_id(field: &str, raw: &str) -> Result<Identifier, ApiError> {
    Identifier::decode(raw.trim()).map_err(|error| ApiError::undecodable_form_id(field, raw, &error))
}

/// Like [`form_id`], treating a missing or blank field as absent.
pub fn optional_form_id(field: &str, raw: Option<&str>) -> Result<Option<Identifier>, ApiError> {
    match raw.map(str::trim) {
        None | Some("") => Ok(None),
        Some(value) => form_id(field, value).map(Some),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::{header::COOKIE, HeaderValue, StatusCode};

    #[test]
    fn require_bearer_extracts_token_case_insensitive() {
        let mut headers = HeaderMap::new();
        headers.insert(AUTHORIZATION, HeaderValue::from_static("bearer TOKEN123"));

        let token = require_bearer(&headers).expect("token should be extracted");
        assert_eq!(token, "TOKEN123");
    }

    #[test]
    fn require_bearer_rejects_missing_token() {
        let mut headers = HeaderMap::new();
        headers.insert(AUTHORIZATION, HeaderValue::from_static("Bearer"));

        let error = require_bearer(&headers).expect_err("should reject missing token");
        assert_eq!(error.status, StatusCode::UNAUTHORIZED);
        assert!(error.message.contains("missing bearer token"));
    }

    #[test]
    fn session_token_falls_back_to_cookie() {
        let mut headers = HeaderMap::new();
        headers.insert(
            COOKIE,
            HeaderValue::from_static("theme=dark; EUCLID_SESSION=abc123"),
        );

        let token = session_token(&headers, "EUCLID_SESSION").expect("cookie token");
        assert_eq!(token, "abc123");

        let missing = session_token(&HeaderMap::new(), "EUCLID_SESSION")
            .expect_err("no credentials at all");
        assert_eq!(missing.status, StatusCode::UNAUTHORIZED);
    }

    #[test]
    fn undecodable_ids_map_to_not_found_in_paths_and_bad_request_in_forms() {
        let path = path_id("!!!not-base64!!!").expect_err("path id must fail");
        assert_eq!(path.status, StatusCode::NOT_FOUND);

        let form = form_id("id", "AAAA").expect_err("short form id must fail");
        assert_eq!(form.status, StatusCode::BAD_REQUEST);

        assert_eq!(optional_form_id("parent", Some("  ")).unwrap(), None);
        let zero = optional_form_id("parent", Some("AAAAAAAAAAAAAAAAAAAAAAAA")).unwrap();
        assert_eq!(zero, Some(Identifier::from_bytes([0; 18])));
    }
}
