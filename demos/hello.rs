//! Minimal jsonapi example — a greeting endpoint, a lookup with errors, a redirect.
//!
//! Run with:
//!   RUST_LOG=debug cargo run --example hello
//!
//! Try:
//!   curl -X POST http://localhost:3000/api/hello \
//!        -d '{"Name":"John","Title":"Mr."}'
//!   curl http://localhost:3000/api/users/1
//!   curl http://localhost:3000/api/users/2
//!   curl -i http://localhost:3000/api/old
//!   curl http://localhost:3000/healthz

use jsonapi::{register, take_default, Api, ApiError, Context, Decoder, Server, E301, E404};
use serde::{Deserialize, Serialize};

#[derive(Deserialize)]
#[serde(rename_all = "PascalCase")]
struct HelloArgs {
    name: String,
    title: String,
}

#[derive(Serialize)]
#[serde(rename_all = "PascalCase")]
struct HelloReply {
    message: String,
}

#[derive(Serialize)]
struct User {
    id: u64,
    name: &'static str,
}

#[tokio::main]
async fn main() {
    tracing_subscriber::fmt::init();

    register(
        [
            Api::new("/api/hello", hello),
            Api::new("/api/users/{id}", get_user),
            Api::new("/api/old", moved),
            Api::raw("/healthz", healthz),
        ],
        None,
    )
    .expect("routes are valid");

    Server::bind("0.0.0.0:3000")
        .serve(take_default())
        .await
        .expect("server error");
}

// POST /api/hello
fn hello(dec: &mut Decoder<'_>, _ctx: &mut Context<'_>) -> Result<HelloReply, ApiError> {
    let args: HelloArgs = dec.decode()?;
    Ok(HelloReply { message: format!("Hello, {} {}", args.title, args.name) })
}

// GET /api/users/{id} — only user 1 exists; anything unparsable is a 500.
fn get_user(_dec: &mut Decoder<'_>, ctx: &mut Context<'_>) -> Result<User, ApiError> {
    let id: u64 = ctx.param("id").unwrap_or_default().parse().map_err(ApiError::other)?;
    match id {
        1 => Ok(User { id, name: "alice" }),
        _ => Err(E404.with_data("User not found").into()),
    }
}

// GET /api/old → 301 to /api/hello
fn moved(_dec: &mut Decoder<'_>, _ctx: &mut Context<'_>) -> Result<(), ApiError> {
    Err(E301.with_data("/api/hello").into())
}

// GET /healthz, written by hand without the JSON dispatcher.
fn healthz(_dec: &mut Decoder<'_>, ctx: &mut Context<'_>) {
    ctx.response().write(b"ok");
}
