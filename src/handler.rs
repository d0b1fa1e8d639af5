//! Handler traits and type erasure.
//!
//! # Two kinds of handler
//!
//! - A [`BusinessHandler`] only returns an outcome, `Result<T, ApiError>`. It
//!   never touches the wire format; the [`Dispatcher`](crate::Dispatcher)
//!   turns the outcome into status, headers and a JSON body.
//! - A [`JsonHandler`] writes the response itself through the
//!   [`Context`]. Every business handler becomes one once wrapped in a
//!   `Dispatcher`, and that is what the router and the test harness store.
//!
//! Both are implemented for plain functions:
//!
//! ```rust
//! use jsonapi::{ApiError, Context, Decoder};
//!
//! fn hello(dec: &mut Decoder<'_>, _ctx: &mut Context<'_>) -> Result<String, ApiError> {
//!     let name: String = dec.decode()?;
//!     Ok(format!("hello, {name}"))
//! }
//! ```
//!
//! # How handlers are stored
//!
//! The router holds handlers of *different* types in one radix tree, so each
//! one is boxed as `Arc<dyn JsonHandler>`:
//!
//! ```text
//! fn hello(dec, ctx) -> Result<T, ApiError>   ← user writes this
//!        ↓ Router::api("/hello", hello)
//! Dispatcher::new(hello)                      ← JsonHandler impl
//!        ↓  stored as BoxedHandler = Arc<dyn JsonHandler>
//! adapter::serve(&*handler, req)              ← one vtable dispatch
//! ```

use std::sync::Arc;

use serde::Serialize;

use crate::api_error::ApiError;
use crate::codec::Decoder;
use crate::context::Context;

/// Domain logic behind one endpoint.
///
/// Implemented automatically for every
/// `Fn(&mut Decoder<'_>, &mut Context<'_>) -> Result<T, ApiError>` where `T`
/// is [`Serialize`]. Implement it by hand for handlers that carry state.
pub trait BusinessHandler: Send + Sync + 'static {
    type Output: Serialize;

    fn call(&self, dec: &mut Decoder<'_>, ctx: &mut Context<'_>) -> Result<Self::Output, ApiError>;
}

impl<F, T> BusinessHandler for F
where
    F: Fn(&mut Decoder<'_>, &mut Context<'_>) -> Result<T, ApiError> + Send + Sync + 'static,
    T: Serialize,
{
    type Output = T;

    fn call(&self, dec: &mut Decoder<'_>, ctx: &mut Context<'_>) -> Result<T, ApiError> {
        self(dec, ctx)
    }
}

/// A handler that writes its own response.
///
/// The adapter has already set `content-type: application/json` when this
/// runs; everything else is up to the handler.
pub trait JsonHandler: Send + Sync + 'static {
    fn serve_json(&self, dec: &mut Decoder<'_>, ctx: &mut Context<'_>);
}

impl<F> JsonHandler for F
where
    F: Fn(&mut Decoder<'_>, &mut Context<'_>) + Send + Sync + 'static,
{
    fn serve_json(&self, dec: &mut Decoder<'_>, ctx: &mut Context<'_>) {
        self(dec, ctx);
    }
}

/// A type-erased handler shared across concurrent requests.
pub(crate) type BoxedHandler = Arc<dyn JsonHandler>;
