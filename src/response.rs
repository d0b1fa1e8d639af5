//! The response under construction.
//!
//! [`ResponseWriter`] mirrors what a streaming transport allows: headers may
//! change until the status is committed, the status is committed exactly
//! once, and body bytes always follow the status. The first body write
//! commits `200 OK` if nothing was committed before.

use bytes::Bytes;
use http::header::{HeaderMap, HeaderName, HeaderValue};
use http::StatusCode;
use tracing::warn;

/// In-memory response being written by a handler or the dispatcher.
#[derive(Debug, Default)]
pub struct ResponseWriter {
    headers: HeaderMap,
    status: Option<StatusCode>,
    body: Vec<u8>,
}

impl ResponseWriter {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn headers(&self) -> &HeaderMap { &self.headers }

    /// The committed status, or `200 OK` if none was committed yet.
    pub fn status(&self) -> StatusCode {
        self.status.unwrap_or(StatusCode::OK)
    }

    /// `true` once a status has been written, explicitly or by a body write.
    pub fn is_committed(&self) -> bool {
        self.status.is_some()
    }

    /// Sets a header, replacing any previous value.
    ///
    /// Returns `false` and leaves the headers untouched once the status has
    /// been committed.
    pub fn set_header(&mut self, name: HeaderName, value: HeaderValue) -> bool {
        if self.is_committed() {
            warn!(header = %name, "header set after status was written, ignoring");
            return false;
        }
        let _ = self.headers.insert(name, value);
        true
    }

    /// Appends a header value (e.g. a second `set-cookie`).
    ///
    /// Same commit rule as [`set_header`](Self::set_header).
    pub fn append_header(&mut self, name: HeaderName, value: HeaderValue) -> bool {
        if self.is_committed() {
            warn!(header = %name, "header appended after status was written, ignoring");
            return false;
        }
        self.headers.append(name, value);
        true
    }

    /// Commits the status line. Later calls are superfluous and ignored.
    pub fn write_status(&mut self, status: StatusCode) {
        match self.status {
            Some(committed) => {
                warn!(%committed, ignored = %status, "superfluous status write");
            }
            None => self.status = Some(status),
        }
    }

    /// Appends body bytes, committing `200 OK` first if needed.
    pub fn write(&mut self, bytes: &[u8]) {
        if self.status.is_none() {
            self.status = Some(StatusCode::OK);
        }
        self.body.extend_from_slice(bytes);
    }

    pub fn body(&self) -> &[u8] { &self.body }

    pub(crate) fn into_response(self) -> http::Response<Bytes> {
        let mut res = http::Response::new(Bytes::from(self.body));
        *res.status_mut() = self.status.unwrap_or(StatusCode::OK);
        *res.headers_mut() = self.headers;
        res
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use http::header::{CONTENT_TYPE, LOCATION, SET_COOKIE};

    #[test]
    fn first_body_write_commits_ok() {
        let mut w = ResponseWriter::new();
        assert!(!w.is_committed());
        w.write(b"{}");
        assert!(w.is_committed());
        assert_eq!(w.status(), StatusCode::OK);
    }

    #[test]
    fn second_status_write_is_ignored() {
        let mut w = ResponseWriter::new();
        w.write_status(StatusCode::NOT_FOUND);
        w.write_status(StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(w.status(), StatusCode::NOT_FOUND);
    }

    #[test]
    fn headers_freeze_after_commit() {
        let mut w = ResponseWriter::new();
        assert!(w.set_header(CONTENT_TYPE, HeaderValue::from_static("application/json")));
        w.write_status(StatusCode::FOUND);
        assert!(!w.set_header(LOCATION, HeaderValue::from_static("/late")));
        assert!(w.headers().get(LOCATION).is_none());

        let res = w.into_response();
        assert_eq!(res.status(), StatusCode::FOUND);
        assert_eq!(res.headers()[CONTENT_TYPE], "application/json");
    }

    #[test]
    fn append_keeps_every_value_until_commit() {
        let mut w = ResponseWriter::new();
        assert!(w.append_header(SET_COOKIE, HeaderValue::from_static("a=1")));
        assert!(w.append_header(SET_COOKIE, HeaderValue::from_static("b=2")));
        w.write(b"{}");
        assert!(!w.append_header(SET_COOKIE, HeaderValue::from_static("c=3")));

        let res = w.into_response();
        let cookies: Vec<_> = res.headers().get_all(SET_COOKIE).iter().collect();
        assert_eq!(cookies, ["a=1", "b=2"]);
    }
}
