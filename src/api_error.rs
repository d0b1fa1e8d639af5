//! Errors a business handler can return.
//!
//! A handler either succeeds with a value or fails with an [`ApiError`]. The
//! dispatcher only ever looks at the variant:
//!
//! | Variant | Status | Body |
//! |---|---|---|
//! | [`ApiError::Structured`] | [`StatusError::code`] | `"<code>: <message>"` |
//! | [`ApiError::Structured`], 3xx with redirect URL | code + `Location` | `"<code>: <message>"` |
//! | [`ApiError::Unstructured`] | `500` | the plain message |
//!
//! Start from one of the catalog prototypes and attach request-specific data:
//!
//! ```rust
//! use jsonapi::{ApiError, E404};
//!
//! fn find_user(id: u64) -> Result<String, ApiError> {
//!     Err(E404.with_data(format!("user {id} not found")).into())
//! }
//! ```
//!
//! There is no `E500`. An internal failure is just an
//! unstructured error: `ApiError::other("database is down")`.

use std::borrow::Cow;
use std::fmt;

/// An error carrying an explicit HTTP status code.
///
/// For `3xx` codes the error also carries the redirect target.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct StatusError {
    code: u16,
    message: Cow<'static, str>,
    redirect_url: Option<Cow<'static, str>>,
}

impl StatusError {
    pub fn new(code: u16, message: impl Into<Cow<'static, str>>) -> Self {
        Self { code, message: message.into(), redirect_url: None }
    }

    const fn prototype(code: u16, message: &'static str) -> Self {
        Self { code, message: Cow::Borrowed(message), redirect_url: None }
    }

    pub fn code(&self) -> u16 { self.code }
    pub fn message(&self) -> &str { &self.message }

    /// The redirect target. Only ever `Some` for a non-empty URL on a `3xx` code.
    pub fn redirect_url(&self) -> Option<&str> {
        if !self.is_redirect() {
            return None;
        }
        self.redirect_url.as_deref().filter(|url| !url.is_empty())
    }

    /// `true` when the code is in `300..400`.
    pub fn is_redirect(&self) -> bool {
        (300..400).contains(&self.code)
    }

    /// Returns a copy carrying `data`: the redirect URL for `3xx` codes, the
    /// message for everything else. `self` is left untouched, so the catalog
    /// constants can be shared freely.
    #[must_use]
    pub fn with_data(&self, data: impl Into<Cow<'static, str>>) -> Self {
        let mut err = self.clone();
        if err.is_redirect() {
            err.redirect_url = Some(data.into());
        } else {
            err.message = data.into();
        }
        err
    }
}

impl fmt::Display for StatusError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.message.is_empty() {
            write!(f, "{}", self.code)
        } else {
            write!(f, "{}: {}", self.code, self.message)
        }
    }
}

impl std::error::Error for StatusError {}

// ── Catalog ──────────────────────────────────────────────────────────────────

pub const E301: StatusError = StatusError::prototype(301, "Resource has been moved permanently");
pub const E302: StatusError = StatusError::prototype(302, "Resource has been found at another location");
pub const E307: StatusError = StatusError::prototype(307, "Resource has been moved to another location temporarily");
pub const E400: StatusError = StatusError::prototype(400, "Error parsing request");
pub const E401: StatusError = StatusError::prototype(401, "You have to be authorized before accessing this resource");
pub const E403: StatusError = StatusError::prototype(403, "You have no right to access this resource");
pub const E404: StatusError = StatusError::prototype(404, "Resource not found");
pub const E418: StatusError = StatusError::prototype(418, "I'm a teapot");
pub const E504: StatusError = StatusError::prototype(504, "Service unavailable");

// ── ApiError ─────────────────────────────────────────────────────────────────

/// The failure half of a business handler's outcome.
#[derive(Clone, Debug, Eq, PartialEq, thiserror::Error)]
pub enum ApiError {
    /// Authoritative for both status code and body.
    #[error(transparent)]
    Structured(#[from] StatusError),

    /// Anything else. Always answered with `500 Internal Server Error`.
    #[error("{0}")]
    Unstructured(String),
}

impl ApiError {
    /// Wraps any displayable failure as an unstructured (500) error.
    pub fn other(err: impl fmt::Display) -> Self {
        Self::Unstructured(err.to_string())
    }

    /// The status code this error maps to.
    pub fn code(&self) -> u16 {
        match self {
            Self::Structured(err) => err.code(),
            Self::Unstructured(_) => 500,
        }
    }

    pub fn redirect_url(&self) -> Option<&str> {
        match self {
            Self::Structured(err) => err.redirect_url(),
            Self::Unstructured(_) => None,
        }
    }
}
