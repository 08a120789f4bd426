//! Exact-match routing from `(method, path)` to a handler.
//!
//! Routes are identified by a [`route_key`], the request method and path joined by `-`.
//! There is no pattern syntax: a path is compared byte for byte, so `/get` and `/get/`
//! are different routes.

use crate::context::Context;
use http::header::CONTENT_TYPE;
use http::{Method, StatusCode};
use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;
use tracing::info;

/// Behavior invoked with the context of a matching request.
///
/// Every `Fn(&mut Context) + Send + Sync + 'static` is a handler, so plain functions and
/// closures can be registered directly.
pub trait Handler: Send + Sync + 'static {
    fn handle(&self, ctx: &mut Context);
}

impl<F> Handler for F
where
    F: Fn(&mut Context) + Send + Sync + 'static,
{
    fn handle(&self, ctx: &mut Context) {
        (self)(ctx);
    }
}

/// Builds the lookup key for a method and path.
pub fn route_key(method: &Method, path: &str) -> String {
    let method = method.as_str();
    let mut key = String::with_capacity(method.len() + 1 + path.len());
    key.push_str(method);
    key.push('-');
    key.push_str(path);
    key
}

/// Owns the route table and resolves requests against it.
#[derive(Default)]
pub struct Router {
    handlers: HashMap<String, Arc<dyn Handler>>,
}

impl Router {
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers `handler` for `method` and `pattern`, replacing any handler already stored
    /// under the same key.
    pub fn add_route(&mut self, method: &Method, pattern: &str, handler: Arc<dyn Handler>) {
        info!("Route {:>4} - {}", method.as_str(), pattern);
        self.handlers.insert(route_key(method, pattern), handler);
    }

    /// Invokes the handler registered for the request, or writes the 404 fallback.
    ///
    /// The key is built from the live request head, so it always reflects the request
    /// the context was created from.
    pub fn handle(&self, ctx: &mut Context) {
        let request = ctx.request();
        let key = route_key(&request.method, request.uri.path());

        match self.handlers.get(&key) {
            Some(handler) => handler.handle(ctx),
            None => not_found(ctx),
        }
    }

    /// Returns whether a handler is registered for exactly this method and path
    pub fn contains(&self, method: &Method, path: &str) -> bool {
        self.handlers.contains_key(&route_key(method, path))
    }

    /// Returns the number of registered route keys
    pub fn len(&self) -> usize {
        self.handlers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.handlers.is_empty()
    }
}

impl fmt::Debug for Router {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut routes = self.handlers.keys().collect::<Vec<_>>();
        routes.sort();
        f.debug_struct("Router").field("routes", &routes).finish()
    }
}

fn not_found(ctx: &mut Context) {
    let body = format!("404 NOT FOUND:{}\n", ctx.uri());
    ctx.header(CONTENT_TYPE.as_str(), mime::TEXT_PLAIN_UTF_8.as_ref());
    ctx.data(StatusCode::NOT_FOUND, body);
}
