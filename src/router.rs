//! Radix-tree request router and endpoint registration.
//!
//! One tree for every method: a JSON endpoint answers whatever method it is
//! called with and inspects [`Context::method`](crate::Context::method) if it
//! cares. You register a pattern, you get a handler. That is all.

use std::collections::HashMap;
use std::sync::{Arc, LazyLock, PoisonError, RwLock};

use matchit::Router as MatchitRouter;
use tracing::debug;

use crate::context::Params;
use crate::dispatch::Dispatcher;
use crate::error::Error;
use crate::handler::{BoxedHandler, BusinessHandler, JsonHandler};

/// A pattern bound to a handler, ready to be [`register`]ed.
pub struct Api {
    pattern: String,
    handler: BoxedHandler,
}

impl Api {
    pub fn new(pattern: impl Into<String>, handler: impl BusinessHandler) -> Self {
        Self { pattern: pattern.into(), handler: Arc::new(Dispatcher::new(handler)) }
    }

    /// Binds a handler that writes its own response, bypassing the
    /// [`Dispatcher`].
    pub fn raw(pattern: impl Into<String>, handler: impl JsonHandler) -> Self {
        Self { pattern: pattern.into(), handler: Arc::new(handler) }
    }

    pub fn pattern(&self) -> &str { &self.pattern }
}

/// The application router.
///
/// Build it once at startup; pass it to [`Server::serve`](crate::Server::serve).
/// [`Router::api`] and [`Router::handle`] return `self` so registrations
/// chain naturally.
pub struct Router {
    routes: MatchitRouter<BoxedHandler>,
}

impl Router {
    pub fn new() -> Self {
        Self { routes: MatchitRouter::new() }
    }

    /// Register a business handler. Returns `self` for chaining.
    ///
    /// Path parameters use `{name}` syntax — `ctx.param("name")` retrieves them:
    ///
    /// ```rust
    /// # use jsonapi::{ApiError, Context, Decoder, Router};
    /// # fn get_user(_: &mut Decoder<'_>, _: &mut Context<'_>) -> Result<(), ApiError> { Ok(()) }
    /// # fn create_user(_: &mut Decoder<'_>, _: &mut Context<'_>) -> Result<(), ApiError> { Ok(()) }
    /// Router::new()
    ///     .api("/users/{id}", get_user)
    ///     .api("/users",      create_user);
    /// ```
    ///
    /// # Panics
    ///
    /// Panics if `pattern` is invalid or conflicts with an existing route.
    pub fn api(self, pattern: &str, handler: impl BusinessHandler) -> Self {
        self.add(pattern, Arc::new(Dispatcher::new(handler)))
    }

    /// Register a handler that writes its own response. Returns `self` for
    /// chaining.
    ///
    /// # Panics
    ///
    /// Same as [`Router::api`].
    pub fn handle(self, pattern: &str, handler: impl JsonHandler) -> Self {
        self.add(pattern, Arc::new(handler))
    }

    fn add(mut self, pattern: &str, handler: BoxedHandler) -> Self {
        self.insert(pattern, handler)
            .unwrap_or_else(|e| panic!("invalid route `{pattern}`: {e}"));
        self
    }

    fn insert(&mut self, pattern: &str, handler: BoxedHandler) -> Result<(), Error> {
        self.routes.insert(pattern, handler)?;
        debug!(pattern, "route registered");
        Ok(())
    }

    pub(crate) fn lookup(&self, path: &str) -> Option<(BoxedHandler, Params)> {
        let matched = self.routes.at(path).ok()?;
        let handler = Arc::clone(matched.value);
        let params = matched.params.iter()
            .map(|(k, v)| (k.to_owned(), v.to_owned()))
            .collect::<HashMap<_, _>>();
        Some((handler, Params(params)))
    }
}

impl Default for Router {
    fn default() -> Self { Self::new() }
}

// ── Default router ────────────────────────────────────────────────────────────

/// Process-wide router used when [`register`] is given no router.
///
/// Optional convenience: it is only written while the application registers
/// its endpoints at startup, then handed to the server once with
/// [`take_default`]. It is never torn down.
static DEFAULT_ROUTER: LazyLock<RwLock<Router>> = LazyLock::new(|| RwLock::new(Router::new()));

/// Binds every `Api` on `router`, or on the default router when `None`.
///
/// Stops at the first pattern that cannot be inserted; earlier entries stay
/// registered.
pub fn register(apis: impl IntoIterator<Item = Api>, router: Option<&mut Router>) -> Result<(), Error> {
    match router {
        Some(router) => register_on(apis, router),
        None => {
            let mut router = DEFAULT_ROUTER.write().unwrap_or_else(PoisonError::into_inner);
            register_on(apis, &mut router)
        }
    }
}

fn register_on(apis: impl IntoIterator<Item = Api>, router: &mut Router) -> Result<(), Error> {
    for api in apis {
        router.insert(&api.pattern, api.handler)?;
    }
    Ok(())
}

/// Moves everything registered on the default router out, leaving it empty.
pub fn take_default() -> Router {
    let mut router = DEFAULT_ROUTER.write().unwrap_or_else(PoisonError::into_inner);
    std::mem::take(&mut *router)
}
