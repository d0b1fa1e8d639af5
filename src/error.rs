//! Unified error type.

/// The error type returned by jsonapi's fallible operations.
///
/// Business outcomes (404, redirects, a failing database call) are expressed
/// as [`ApiError`](crate::ApiError) values returned from handlers, never as
/// `Error`s. This type surfaces infrastructure failures: binding a port,
/// registering an invalid route, or building a request in the test harness.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("io: {0}")]
    Io(#[from] std::io::Error),

    #[error("invalid route: {0}")]
    Route(#[from] matchit::InsertError),

    #[error("invalid request: {0}")]
    Request(#[from] http::Error),

    #[error("json: {0}")]
    Json(#[from] serde_json::Error),

    #[error("form: {0}")]
    Form(#[from] serde_urlencoded::ser::Error),
}
