//! Transport adapter: one HTTP request in, one HTTP response out.
//!
//! `serve` is the only place that touches both halves of the exchange:
//!
//! 1. sets `content-type: application/json` before the handler runs,
//! 2. builds the [`Decoder`] and [`Context`] for the handler,
//! 3. runs the handler,
//! 4. drains whatever the handler left unread in the body.
//!
//! Step 4 is a drop guard, so it also runs when the handler panics. Leaving
//! bytes in the body would desynchronise a kept-alive connection.

use std::io::{self, Read};
use std::ops::{Deref, DerefMut};

use bytes::Bytes;
use http::header::{CONTENT_TYPE, HeaderValue};
use tracing::{debug, trace};

use crate::api_error::ApiError;
use crate::codec::Decoder;
use crate::context::Context;
use crate::dispatch;
use crate::handler::JsonHandler;
use crate::response::ResponseWriter;

/// Runs `handler` against `req` and returns the finished response.
pub fn serve<H, R>(handler: &H, req: http::Request<R>) -> http::Response<Bytes>
where
    H: JsonHandler + ?Sized,
    R: Read,
{
    let (parts, body) = req.into_parts();
    let mut body = DrainOnDrop(body);
    let mut writer = json_writer();

    {
        let reader: &mut dyn Read = &mut *body;
        let mut dec = Decoder::new(reader);
        let mut ctx = Context::new(&parts, &mut writer);
        handler.serve_json(&mut dec, &mut ctx);
    }

    drop(body);
    writer.into_response()
}

/// A JSON response carrying `err`, for failures that happen before any
/// handler runs (no route, unreadable body, crashed handler).
pub fn error_response(err: &ApiError) -> http::Response<Bytes> {
    let mut writer = json_writer();
    dispatch::write_error(&mut writer, err);
    writer.into_response()
}

fn json_writer() -> ResponseWriter {
    let mut writer = ResponseWriter::new();
    let _ = writer.set_header(CONTENT_TYPE, HeaderValue::from_static("application/json"));
    writer
}

/// Owns the request body and reads it to the end when dropped.
struct DrainOnDrop<R: Read>(R);

impl<R: Read> Deref for DrainOnDrop<R> {
    type Target = R;

    fn deref(&self) -> &R { &self.0 }
}

impl<R: Read> DerefMut for DrainOnDrop<R> {
    fn deref_mut(&mut self) -> &mut R { &mut self.0 }
}

impl<R: Read> Drop for DrainOnDrop<R> {
    fn drop(&mut self) {
        match io::copy(&mut self.0, &mut io::sink()) {
            Ok(0) => {}
            Ok(n) => trace!(bytes = n, "drained unread request body"),
            Err(e) => debug!(error = %e, "failed to drain request body"),
        }
    }
}

#[cfg(test)]
mod tests {
    use std::io::Cursor;
    use std::panic::{self, AssertUnwindSafe};
    use std::sync::Arc;
    use std::sync::atomic::{AtomicU64, Ordering};

    use http::StatusCode;

    use super::*;

    /// Body that counts how many bytes were pulled out of it.
    struct Counting {
        inner: Cursor<Vec<u8>>,
        read: Arc<AtomicU64>,
    }

    impl Read for Counting {
        fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
            let n = self.inner.read(buf)?;
            self.read.fetch_add(n as u64, Ordering::SeqCst);
            Ok(n)
        }
    }

    fn counting(body: &str) -> (Counting, Arc<AtomicU64>) {
        let read = Arc::new(AtomicU64::new(0));
        let body = Counting { inner: Cursor::new(body.as_bytes().to_vec()), read: Arc::clone(&read) };
        (body, read)
    }

    fn ignore_body(_: &mut Decoder<'_>, ctx: &mut Context<'_>) {
        ctx.response().write(b"null");
    }

    fn explode(_: &mut Decoder<'_>, _: &mut Context<'_>) {
        panic!("handler exploded");
    }

    #[test]
    fn sets_json_content_type() {
        let (body, _) = counting("");
        let res = serve(&ignore_body, http::Request::new(body));
        assert_eq!(res.status(), StatusCode::OK);
        assert_eq!(res.headers()[CONTENT_TYPE], "application/json");
        assert_eq!(res.headers().get_all(CONTENT_TYPE).iter().count(), 1);
    }

    #[test]
    fn drains_unread_body() {
        let payload = r#"{"unused":true}"#;
        let (body, read) = counting(payload);
        let _ = serve(&ignore_body, http::Request::new(body));
        assert_eq!(read.load(Ordering::SeqCst), payload.len() as u64);
    }

    #[test]
    fn drains_body_when_handler_panics() {
        let payload = "some bytes nobody reads";
        let (body, read) = counting(payload);
        let outcome = panic::catch_unwind(AssertUnwindSafe(|| {
            serve(&explode, http::Request::new(body))
        }));
        assert!(outcome.is_err());
        assert_eq!(read.load(Ordering::SeqCst), payload.len() as u64);
    }

    #[test]
    fn error_response_is_json() {
        let res = error_response(&crate::E404.into());
        assert_eq!(res.status(), StatusCode::NOT_FOUND);
        assert_eq!(res.headers()[CONTENT_TYPE], "application/json");
        assert_eq!(res.body().as_ref(), br#""404: Resource not found""#);
    }
}
