//! Credential locator.
//!
//! Tries an ordered list of extraction strategies against a request and
//! returns the first non-blank credential. Strategies are plain functions of
//! the request; the built-in ones are registered under fixed names so they
//! can be configured from the environment.

use std::{fmt, str::FromStr, sync::LazyLock};

use base64::Engine;
use base64::alphabet;
use base64::engine::{DecodePaddingMode, GeneralPurpose, GeneralPurposeConfig};
use regex::Regex;
use thiserror::Error;
use tracing::debug;

use crate::services::oauth::request::CredentialRequest;

/// Signature shared by every extraction strategy.
pub type ExtractFn = fn(&dyn CredentialRequest) -> Option<String>;

static BEARER_PATTERN: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)^Bearer ").expect("valid bearer pattern"));
static BASIC_PATTERN: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)^Basic ").expect("valid basic pattern"));

// Clients disagree on padding for basic credentials; accept both.
const BASIC_ENGINE: GeneralPurpose = GeneralPurpose::new(
    &alphabet::STANDARD,
    GeneralPurposeConfig::new().with_decode_padding_mode(DecodePaddingMode::Indifferent),
);

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum LocatorError {
    #[error("unknown token lookup strategy: {0}")]
    UnknownStrategy(String),
}

#[derive(Clone, Copy)]
pub enum Strategy {
    /// `access_token` request parameter.
    AccessTokenParam,
    /// `bearer_token` request parameter.
    BearerParam,
    /// `Authorization: Bearer <token>`.
    BearerAuthorization,
    /// `Authorization: Basic <base64(token:secret)>`, yielding the user part.
    BasicAuthorization,
    /// Caller-supplied extraction function.
    Custom {
        name: &'static str,
        extract: ExtractFn,
    },
}

// name -> strategy. Both the short and the `from_` spellings are accepted.
const REGISTRY: &[(&str, Strategy)] = &[
    ("access_token_param", Strategy::AccessTokenParam),
    ("from_access_token_param", Strategy::AccessTokenParam),
    ("bearer_param", Strategy::BearerParam),
    ("from_bearer_param", Strategy::BearerParam),
    ("bearer_authorization", Strategy::BearerAuthorization),
    ("from_bearer_authorization", Strategy::BearerAuthorization),
    ("bearer_header", Strategy::BearerAuthorization),
    ("basic_authorization", Strategy::BasicAuthorization),
    ("from_basic_authorization", Strategy::BasicAuthorization),
    ("basic_header", Strategy::BasicAuthorization),
];

impl Strategy {
    pub fn custom(name: &'static str, extract: ExtractFn) -> Self {
        Self::Custom { name, extract }
    }

    /// Canonical name (used for logging).
    pub fn name(&self) -> &'static str {
        match self {
            Self::AccessTokenParam => "access_token_param",
            Self::BearerParam => "bearer_param",
            Self::BearerAuthorization => "bearer_authorization",
            Self::BasicAuthorization => "basic_authorization",
            Self::Custom { name, .. } => *name,
        }
    }

    pub fn extract(&self, request: &dyn CredentialRequest) -> Option<String> {
        match self {
            Self::AccessTokenParam => from_access_token_param(request),
            Self::BearerParam => from_bearer_param(request),
            Self::BearerAuthorization => from_bearer_authorization(request),
            Self::BasicAuthorization => from_basic_authorization(request),
            Self::Custom { extract, .. } => extract(request),
        }
    }

    /// Resolve every name, failing on the first unknown one.
    pub fn resolve_all<I, S>(names: I) -> Result<Vec<Strategy>, LocatorError>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        names
            .into_iter()
            .map(|name| name.as_ref().parse())
            .collect()
    }
}

impl fmt::Debug for Strategy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for Strategy {
    type Err = LocatorError;

    fn from_str(name: &str) -> Result<Self, Self::Err> {
        REGISTRY
            .iter()
            .find(|(registered, _)| *registered == name)
            .map(|(_, strategy)| *strategy)
            .ok_or_else(|| LocatorError::UnknownStrategy(name.to_string()))
    }
}

/// Return the first non-blank credential produced by `strategies`, in order.
///
/// Later strategies are not run once one succeeds. An empty list yields `None`.
pub fn locate(request: &dyn CredentialRequest, strategies: &[Strategy]) -> Option<String> {
    for strategy in strategies {
        if let Some(credential) = strategy.extract(request).filter(|c| !is_blank(c)) {
            debug!(strategy = strategy.name(), "credential located");
            return Some(credential);
        }
    }

    None
}

/// Like [`locate`], but resolves strategy names first.
pub fn locate_named(
    request: &dyn CredentialRequest,
    names: &[&str],
) -> Result<Option<String>, LocatorError> {
    let strategies = Strategy::resolve_all(names)?;
    Ok(locate(request, &strategies))
}

pub fn from_access_token_param(request: &dyn CredentialRequest) -> Option<String> {
    request.parameter("access_token").map(str::to_owned)
}

pub fn from_bearer_param(request: &dyn CredentialRequest) -> Option<String> {
    request.parameter("bearer_token").map(str::to_owned)
}

/// Picks the first comma-separated segment that mentions "bearer" anywhere
/// (case-insensitive), then requires it to start with `Bearer `.
pub fn from_bearer_authorization(request: &dyn CredentialRequest) -> Option<String> {
    let header = request.authorization()?;

    let segment = header
        .split(',')
        .map(str::trim)
        .find(|segment| segment.to_lowercase().contains("bearer"))?;

    strip_scheme(&BEARER_PATTERN, segment)
}

pub fn from_basic_authorization(request: &dyn CredentialRequest) -> Option<String> {
    let header = request.authorization()?;
    let encoded = strip_scheme(&BASIC_PATTERN, header)?;
    decode_basic_user(&encoded)
}

fn strip_scheme(pattern: &Regex, value: &str) -> Option<String> {
    pattern.find(value).map(|m| value[m.end()..].to_owned())
}

// Malformed input is treated as "no credential".
fn decode_basic_user(encoded: &str) -> Option<String> {
    let bytes = BASIC_ENGINE.decode(encoded.trim()).ok()?;
    let decoded = String::from_utf8(bytes).ok()?;
    decoded.split(':').next().map(str::to_owned)
}

fn is_blank(value: &str) -> bool {
    value.trim().is_empty()
}
