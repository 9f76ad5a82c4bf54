//! Read-only request view consumed by credential strategies.
//!
//! Strategies never see the axum request directly. The middleware snapshots the
//! parts it needs (parameters + `Authorization`) into `RequestCredentials` so the
//! locator stays free of HTTP plumbing and is trivial to drive from tests.

use std::collections::HashMap;

use axum::http::{HeaderMap, header, request::Parts};

/// What a credential strategy is allowed to look at.
///
/// `Sync` so a borrowed request can be held across the store lookup inside
/// `Send` futures (axum middleware).
pub trait CredentialRequest: Sync {
    /// Query/body parameter by key.
    fn parameter(&self, key: &str) -> Option<&str>;

    /// Raw `Authorization` header value.
    fn authorization(&self) -> Option<&str>;
}

#[derive(Clone, Default)]
pub struct RequestCredentials {
    params: HashMap<String, String>,
    authorization: Option<String>,
}

impl std::fmt::Debug for RequestCredentials {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        // Values may be credentials; only print keys.
        let mut keys: Vec<&str> = self.params.keys().map(String::as_str).collect();
        keys.sort_unstable();
        f.debug_struct("RequestCredentials")
            .field("param_keys", &keys)
            .field("has_authorization", &self.authorization.is_some())
            .finish()
    }
}

impl RequestCredentials {
    pub fn new() -> Self {
        Self::default()
    }

    /// Snapshot query parameters and the first `Authorization` header.
    pub fn from_parts(parts: &Parts) -> Self {
        let mut creds = Self {
            params: HashMap::new(),
            authorization: authorization_header(&parts.headers),
        };

        if let Some(query) = parts.uri.query() {
            creds.merge_form_encoded(query.as_bytes());
        }

        creds
    }

    /// Merge `application/x-www-form-urlencoded` pairs. Later keys override earlier ones.
    pub fn merge_form_encoded(&mut self, input: &[u8]) {
        for (key, value) in url::form_urlencoded::parse(input) {
            self.params.insert(key.into_owned(), value.into_owned());
        }
    }

    pub fn with_parameter(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.params.insert(key.into(), value.into());
        self
    }

    pub fn with_authorization(mut self, value: impl Into<String>) -> Self {
        self.authorization = Some(value.into());
        self
    }
}

impl CredentialRequest for RequestCredentials {
    fn parameter(&self, key: &str) -> Option<&str> {
        self.params.get(key).map(String::as_str)
    }

    fn authorization(&self) -> Option<&str> {
        self.authorization.as_deref()
    }
}

// Non-UTF-8 header values are treated as if the header were missing.
fn authorization_header(headers: &HeaderMap) -> Option<String> {
    headers
        .get(header::AUTHORIZATION)
        .and_then(|v| v.to_str().ok())
        .map(str::to_owned)
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::{HeaderValue, Request};

    fn parts(uri: &str, authorization: Option<&'static [u8]>) -> Parts {
        let mut builder = Request::builder().uri(uri);
        if let Some(raw) = authorization {
            builder = builder.header(
                header::AUTHORIZATION,
                HeaderValue::from_bytes(raw).expect("header value"),
            );
        }
        builder.body(()).expect("request").into_parts().0
    }

    #[test]
    fn query_parameters_are_decoded() {
        let creds = RequestCredentials::from_parts(&parts(
            "/things?access_token=a%2Bb&bearer_token=c+d",
            None,
        ));

        assert_eq!(creds.parameter("access_token"), Some("a+b"));
        assert_eq!(creds.parameter("bearer_token"), Some("c d"));
        assert_eq!(creds.authorization(), None);
    }

    #[test]
    fn authorization_header_is_read_verbatim() {
        let raw = b"Bearer  abc ".as_slice();
        let creds = RequestCredentials::from_parts(&parts("/", Some(raw)));
        assert_eq!(creds.authorization(), Some("Bearer  abc "));
    }

    #[test]
    fn non_utf8_authorization_is_absent() {
        let raw = b"Bearer \xff\xfe".as_slice();
        let creds = RequestCredentials::from_parts(&parts("/", Some(raw)));
        assert_eq!(creds.authorization(), None);
    }

    #[test]
    fn body_parameters_override_query() {
        let mut creds = RequestCredentials::from_parts(&parts("/?access_token=query", None));
        creds.merge_form_encoded(b"access_token=body");
        assert_eq!(creds.parameter("access_token"), Some("body"));
    }

    #[test]
    fn debug_does_not_leak_values() {
        let creds = RequestCredentials::new()
            .with_parameter("access_token", "s3cret")
            .with_authorization("Bearer s3cret");
        let out = format!("{creds:?}");
        assert!(!out.contains("s3cret"));
        assert!(out.contains("access_token"));
    }
}
