//! # jsonapi
//!
//! JSON endpoints out of plain functions.
//!
//! ## The contract
//!
//! A business handler reads its arguments from a [`Decoder`], does its work,
//! and returns `Result<T, ApiError>`. It never sets a content type, never
//! serializes, never picks a status code for the success path. The
//! [`Dispatcher`] does the rest:
//!
//! - `Ok(value)` → `200`, body is `value` as JSON
//! - `Err(E404.with_data("User not found"))` → `404`, body `"404: User not found"`
//! - `Err(E301.with_data("/new"))` → `301` redirect to `/new`
//! - `Err(ApiError::other(e))` → `500`, body is `e` as a JSON string
//!
//! Every response is `application/json`, failures included.
//!
//! ## Quick start
//!
//! ```rust,no_run
//! use jsonapi::{ApiError, Context, Decoder, Router, Server};
//! use serde::{Deserialize, Serialize};
//!
//! #[derive(Deserialize)]
//! #[serde(rename_all = "PascalCase")]
//! struct HelloArgs { name: String, title: String }
//!
//! #[derive(Serialize)]
//! #[serde(rename_all = "PascalCase")]
//! struct HelloReply { message: String }
//!
//! fn hello(dec: &mut Decoder<'_>, _ctx: &mut Context<'_>) -> Result<HelloReply, ApiError> {
//!     let args: HelloArgs = dec.decode()?;
//!     Ok(HelloReply { message: format!("Hello, {} {}", args.title, args.name) })
//! }
//!
//! #[tokio::main]
//! async fn main() {
//!     let app = Router::new().api("/api/hello", hello);
//!     Server::bind("0.0.0.0:3000").serve(app).await.unwrap();
//! }
//! ```
//!
//! Test the same handler without a socket through [`testing::HandlerTest`].

mod api_error;
mod codec;
mod context;
mod dispatch;
mod error;
mod handler;
mod response;
mod router;
mod server;

pub mod adapter;
pub mod testing;

pub use api_error::{ApiError, StatusError, E301, E302, E307, E400, E401, E403, E404, E418, E504};
pub use codec::{DecodeError, Decoder};
pub use context::{Context, Params, RemoteAddr};
pub use dispatch::Dispatcher;
pub use error::Error;
pub use handler::{BusinessHandler, JsonHandler};
pub use response::ResponseWriter;
pub use router::{register, take_default, Api, Router};
pub use server::Server;
