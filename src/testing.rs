//! In-memory test harness.
//!
//! Runs a handler through the same adapter the server uses, but against a
//! request built in memory and a [`Recorder`] instead of a socket:
//!
//! ```rust
//! use jsonapi::{ApiError, Context, Decoder, E404};
//! use jsonapi::testing::HandlerTest;
//!
//! fn find(_: &mut Decoder<'_>, _: &mut Context<'_>) -> Result<(), ApiError> {
//!     Err(E404.with_data("User not found").into())
//! }
//!
//! let rec = HandlerTest::api(find).get("/users/7", "").unwrap();
//! assert_eq!(rec.code(), 404);
//! assert_eq!(rec.json::<String>().unwrap(), "404: User not found");
//! ```
//!
//! `Err` from a helper means the *request* could not be built (bad URI,
//! unserializable payload). Whatever the handler does, including failing,
//! only shows up inside the returned [`Recorder`].

use std::io::Cursor;

use bytes::Bytes;
use http::header::{COOKIE, HeaderMap};
use http::{Method, StatusCode};
use serde::Serialize;
use serde::de::DeserializeOwned;

use crate::adapter;
use crate::dispatch::Dispatcher;
use crate::error::Error;
use crate::handler::{BusinessHandler, JsonHandler};

/// Drives a handler with synthetic requests.
pub struct HandlerTest<H> {
    handler: H,
}

impl<H: BusinessHandler> HandlerTest<Dispatcher<H>> {
    /// Harness for a business handler, wrapped in its [`Dispatcher`].
    pub fn api(handler: H) -> Self {
        Self::new(Dispatcher::new(handler))
    }
}

impl<H: JsonHandler> HandlerTest<H> {
    pub fn new(handler: H) -> Self {
        Self { handler }
    }

    /// `GET uri`, with a `Cookie` header unless `cookie` is empty.
    pub fn get(&self, uri: &str, cookie: &str) -> Result<Recorder, Error> {
        self.request(Method::GET, uri, cookie, Vec::new())
    }

    /// `POST uri` with `body` sent as is.
    pub fn post(&self, uri: &str, cookie: &str, body: impl Into<Vec<u8>>) -> Result<Recorder, Error> {
        self.request(Method::POST, uri, cookie, body.into())
    }

    /// `POST uri` with `value` encoded as JSON.
    pub fn post_json<T: Serialize + ?Sized>(&self, uri: &str, cookie: &str, value: &T) -> Result<Recorder, Error> {
        let body = serde_json::to_vec(value)?;
        self.post(uri, cookie, body)
    }

    /// `POST uri` with `form` encoded as `application/x-www-form-urlencoded`.
    ///
    /// Only the body is form-encoded; the handler reads it raw with
    /// [`Decoder::rest`](crate::Decoder::rest).
    pub fn post_form<T: Serialize + ?Sized>(&self, uri: &str, cookie: &str, form: &T) -> Result<Recorder, Error> {
        let body = serde_urlencoded::to_string(form)?;
        self.post(uri, cookie, body)
    }

    fn request(&self, method: Method, uri: &str, cookie: &str, body: Vec<u8>) -> Result<Recorder, Error> {
        let mut builder = http::Request::builder().method(method).uri(uri);
        if !cookie.is_empty() {
            builder = builder.header(COOKIE, cookie);
        }
        let req = builder.body(Cursor::new(body))?;
        Ok(Recorder(adapter::serve(&self.handler, req)))
    }
}

/// A captured response.
#[derive(Debug)]
pub struct Recorder(http::Response<Bytes>);

impl Recorder {
    pub fn status(&self) -> StatusCode { self.0.status() }
    pub fn code(&self) -> u16 { self.0.status().as_u16() }
    pub fn headers(&self) -> &HeaderMap { self.0.headers() }
    pub fn body(&self) -> &[u8] { self.0.body() }

    /// Header lookup. Returns `None` for missing or non-UTF-8 values.
    pub fn header(&self, name: &str) -> Option<&str> {
        self.0.headers().get(name)?.to_str().ok()
    }

    pub fn text(&self) -> Result<&str, std::str::Utf8Error> {
        std::str::from_utf8(self.body())
    }

    /// Decodes the body as JSON.
    pub fn json<T: DeserializeOwned>(&self) -> Result<T, serde_json::Error> {
        serde_json::from_slice(self.body())
    }

    pub fn into_response(self) -> http::Response<Bytes> {
        self.0
    }
}

#[cfg(test)]
mod tests {
    use std::collections::BTreeMap;

    use super::*;
    use crate::api_error::ApiError;
    use crate::codec::Decoder;
    use crate::context::Context;

    fn echo_cookie(_: &mut Decoder<'_>, ctx: &mut Context<'_>) -> Result<Option<String>, ApiError> {
        Ok(ctx.header("cookie").map(str::to_owned))
    }

    fn echo_method(_: &mut Decoder<'_>, ctx: &mut Context<'_>) -> Result<String, ApiError> {
        Ok(ctx.method().to_string())
    }

    fn echo_json(dec: &mut Decoder<'_>, _: &mut Context<'_>) -> Result<serde_json::Value, ApiError> {
        Ok(dec.decode()?)
    }

    fn echo_body(dec: &mut Decoder<'_>, _: &mut Context<'_>) -> Result<String, ApiError> {
        Ok(String::from_utf8_lossy(dec.rest()?).into_owned())
    }

    #[test]
    fn get_attaches_cookie_only_when_given() {
        let t = HandlerTest::api(echo_cookie);
        let rec = t.get("/", "session=abc").unwrap();
        assert_eq!(rec.json::<Option<String>>().unwrap().as_deref(), Some("session=abc"));
        let rec = t.get("/", "").unwrap();
        assert_eq!(rec.json::<Option<String>>().unwrap(), None);
    }

    #[test]
    fn helpers_use_expected_methods() {
        let t = HandlerTest::api(echo_method);
        assert_eq!(t.get("/", "").unwrap().json::<String>().unwrap(), "GET");
        assert_eq!(t.post("/", "", "").unwrap().json::<String>().unwrap(), "POST");
    }

    #[test]
    fn post_form_sends_urlencoded_body() {
        let form = BTreeMap::from([("name", "John Doe"), ("title", "Mr.")]);
        let rec = HandlerTest::api(echo_body).post_form("/", "", &form).unwrap();
        assert_eq!(rec.code(), 200);
        assert_eq!(rec.json::<String>().unwrap(), "name=John+Doe&title=Mr.");
    }

    #[test]
    fn post_sends_body_verbatim() {
        let rec = HandlerTest::api(echo_body).post("/", "", "not json at all").unwrap();
        assert_eq!(rec.json::<String>().unwrap(), "not json at all");
    }

    #[test]
    fn post_json_sends_encoded_value() {
        let value = serde_json::json!({"Name": "John", "Title": "Mr."});
        let rec = HandlerTest::api(echo_json).post_json("/", "", &value).unwrap();
        assert_eq!(rec.json::<serde_json::Value>().unwrap(), value);
    }

    #[test]
    fn form_body_is_rejected_by_a_json_decoder() {
        let form = BTreeMap::from([("name", "John Doe")]);
        let rec = HandlerTest::api(echo_json).post_form("/", "", &form).unwrap();
        assert_eq!(rec.code(), 400);
        assert_eq!(rec.json::<String>().unwrap(), "400: Error parsing request");
    }

    #[test]
    fn malformed_uri_is_a_harness_error() {
        let err = HandlerTest::api(echo_method).get("http://[::1", "").unwrap_err();
        assert!(matches!(err, Error::Request(_)));
    }

    #[test]
    fn invalid_cookie_is_a_harness_error() {
        let err = HandlerTest::api(echo_method).get("/", "a=b\r\nx: y").unwrap_err();
        assert!(matches!(err, Error::Request(_)));
    }
}
