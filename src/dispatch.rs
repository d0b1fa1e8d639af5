//! Turns a business handler's outcome into a response.
//!
//! Ordering per request, in every branch: status (and `Location`) first,
//! body second, one status only.
//!
//! ```text
//! Ok(result)                        → 200, JSON(result)
//! Ok(result), encoding fails        → 500, JSON(ENCODE_FAILURE_MESSAGE)
//! Err(Structured 3xx + redirect)    → code + Location, JSON(err.to_string())
//! Err(Structured)                   → code, JSON(err.to_string())
//! Err(Unstructured)                 → 500, JSON(err.to_string())
//! ```
//!
//! A redirect still carries the JSON body after its `Location` header.

use http::StatusCode;
use http::header::{HeaderValue, LOCATION};
use serde::Serialize;
use tracing::{debug, warn};

use crate::api_error::ApiError;
use crate::codec::{self, Decoder, ENCODE_FAILURE_MESSAGE};
use crate::context::Context;
use crate::handler::{BusinessHandler, JsonHandler};
use crate::response::ResponseWriter;

/// Adapts a [`BusinessHandler`] into a [`JsonHandler`].
pub struct Dispatcher<H>(H);

impl<H: BusinessHandler> Dispatcher<H> {
    pub fn new(handler: H) -> Self {
        Self(handler)
    }
}

impl<H: BusinessHandler> JsonHandler for Dispatcher<H> {
    fn serve_json(&self, dec: &mut Decoder<'_>, ctx: &mut Context<'_>) {
        match self.0.call(dec, ctx) {
            Ok(result) => write_result(ctx.response(), &result),
            Err(err) => {
                debug!(path = ctx.path(), code = err.code(), error = %err, "handler failed");
                write_error(ctx.response(), &err);
            }
        }
    }
}

/// Encodes a successful result, falling back to a fixed 500 if it cannot be
/// serialized.
pub(crate) fn write_result<T: Serialize + ?Sized>(w: &mut ResponseWriter, result: &T) {
    match codec::encode(result) {
        Ok(body) => w.write(&body),
        Err(e) => {
            warn!(error = %e, "cannot encode handler result");
            w.write_status(StatusCode::INTERNAL_SERVER_ERROR);
            codec::write_str(w, ENCODE_FAILURE_MESSAGE);
        }
    }
}

/// Writes the status (and redirect) for `err`, then its string form as body.
pub(crate) fn write_error(w: &mut ResponseWriter, err: &ApiError) {
    let status = StatusCode::from_u16(err.code()).unwrap_or_else(|_| {
        warn!(code = err.code(), "error carries an invalid status code, answering 500");
        StatusCode::INTERNAL_SERVER_ERROR
    });

    if let Some(url) = err.redirect_url() {
        match HeaderValue::try_from(url) {
            Ok(location) => {
                let _ = w.set_header(LOCATION, location);
            }
            Err(_) => warn!(url, "redirect target is not a valid header value, dropping Location"),
        }
    }

    w.write_status(status);
    codec::write_str(w, &err.to_string());
}
