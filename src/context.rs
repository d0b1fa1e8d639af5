//! Per-request context handed to handlers.

use std::collections::HashMap;
use std::net::SocketAddr;

use http::header::{COOKIE, HeaderMap, HeaderName, HeaderValue};
use http::request::Parts;
use http::{Method, StatusCode, Uri};

use crate::response::ResponseWriter;

/// Path parameters captured by the router, stored as a request extension.
#[derive(Clone, Debug, Default)]
pub struct Params(pub(crate) HashMap<String, String>);

impl Params {
    pub fn get(&self, key: &str) -> Option<&str> {
        self.0.get(key).map(String::as_str)
    }
}

/// Address of the connected peer, stored as a request extension by the server.
#[derive(Clone, Copy, Debug)]
pub struct RemoteAddr(pub SocketAddr);

/// Borrowed view of one request and its response.
///
/// Lives exactly as long as the dispatch of that request. Use it to read the
/// request head (method, URI, headers, path parameters) and to control the
/// response head before the dispatcher writes the body.
pub struct Context<'a> {
    parts: &'a Parts,
    response: &'a mut ResponseWriter,
}

impl<'a> Context<'a> {
    pub fn new(parts: &'a Parts, response: &'a mut ResponseWriter) -> Self {
        Self { parts, response }
    }

    pub fn method(&self) -> &Method { &self.parts.method }
    pub fn uri(&self) -> &Uri { &self.parts.uri }
    pub fn path(&self) -> &str { self.parts.uri.path() }
    pub fn headers(&self) -> &HeaderMap { &self.parts.headers }

    /// Header lookup. Returns `None` for missing or non-UTF-8 values.
    pub fn header(&self, name: &str) -> Option<&str> {
        self.parts.headers.get(name)?.to_str().ok()
    }

    /// Returns a named path parameter.
    ///
    /// For a route `/users/{id}`, `ctx.param("id")` on `/users/42` returns `Some("42")`.
    pub fn param(&self, key: &str) -> Option<&str> {
        self.parts.extensions.get::<Params>()?.get(key)
    }

    /// Value of the cookie `name` from the `Cookie` request header(s).
    pub fn cookie(&self, name: &str) -> Option<&str> {
        self.parts.headers
            .get_all(COOKIE)
            .iter()
            .filter_map(|v| v.to_str().ok())
            .flat_map(|v| v.split(';'))
            .filter_map(|pair| pair.trim().split_once('='))
            .find(|(k, _)| *k == name)
            .map(|(_, v)| v)
    }

    pub fn remote_addr(&self) -> Option<SocketAddr> {
        self.parts.extensions.get::<RemoteAddr>().map(|addr| addr.0)
    }

    /// The response under construction.
    pub fn response(&mut self) -> &mut ResponseWriter {
        &mut *self.response
    }

    /// Sets a response header. Ignored once the status is committed.
    pub fn set_header(&mut self, name: HeaderName, value: HeaderValue) {
        let _ = self.response.set_header(name, value);
    }

    /// Commits the response status early. The dispatcher's own status write
    /// is then ignored, so this mostly makes sense for success responses
    /// (`201 Created`, `202 Accepted`).
    pub fn set_status(&mut self, status: StatusCode) {
        self.response.write_status(status);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parts(req: http::Request<()>) -> Parts {
        req.into_parts().0
    }

    #[test]
    fn reads_cookies_from_every_header() {
        let parts = parts(
            http::Request::get("/")
                .header(COOKIE, "session=abc; theme=dark")
                .header(COOKIE, "lang=en")
                .body(())
                .unwrap(),
        );
        let mut w = ResponseWriter::new();
        let ctx = Context::new(&parts, &mut w);
        assert_eq!(ctx.cookie("session"), Some("abc"));
        assert_eq!(ctx.cookie("theme"), Some("dark"));
        assert_eq!(ctx.cookie("lang"), Some("en"));
        assert_eq!(ctx.cookie("missing"), None);
    }

    #[test]
    fn reads_params_from_extensions() {
        let mut parts = parts(http::Request::get("/users/42").body(()).unwrap());
        parts.extensions.insert(Params(HashMap::from([("id".to_owned(), "42".to_owned())])));
        let mut w = ResponseWriter::new();
        let ctx = Context::new(&parts, &mut w);
        assert_eq!(ctx.param("id"), Some("42"));
        assert_eq!(ctx.param("name"), None);
        assert_eq!(ctx.path(), "/users/42");
        assert_eq!(ctx.remote_addr(), None);
    }
}
