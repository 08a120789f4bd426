//! Public entry point: route registration and the request-handling bridge.

use crate::context::Context;
use crate::error::EngineError;
use crate::form::{self, FormEncoding};
use crate::router::{Handler, Router};
use crate::server;
use bytes::Bytes;
use http::{Method, Request, Response, StatusCode};
use http_body::Body;
use http_body_util::{BodyExt, Full, LengthLimitError, Limited};
use std::error::Error;
use std::sync::Arc;
use tokio::net::TcpListener;
use tracing::warn;

/// Largest request body read by default, 10 MiB.
pub const DEFAULT_BODY_LIMIT: usize = 10 << 20;

/// The verbs [`Engine::any`] registers a handler under.
pub const ANY_METHODS: [Method; 5] = [Method::GET, Method::POST, Method::PUT, Method::DELETE, Method::OPTIONS];

/// Builds a route table and serves it.
///
/// Routes are registered through `&mut self`; [`Engine::run`] and [`Engine::serve`] take the
/// engine by value, so the table cannot change once serving has started.
///
/// # Example
/// ```no_run
/// use http::StatusCode;
/// use micro_dispatch::{Context, Engine};
///
/// # async fn start() -> Result<(), micro_dispatch::EngineError> {
/// let mut engine = Engine::new();
/// engine.get("/hello", |ctx: &mut Context| {
///     let name = ctx.default_query("name", "world").to_owned();
///     ctx.string(StatusCode::OK, format_args!("hello {name}"));
/// });
/// engine.run(":8080").await
/// # }
/// ```
#[derive(Debug)]
pub struct Engine {
    router: Router,
    body_limit: usize,
}

impl Default for Engine {
    fn default() -> Self {
        Self { router: Router::new(), body_limit: DEFAULT_BODY_LIMIT }
    }
}

impl Engine {
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the largest request body, in bytes, read before dispatch.
    ///
    /// Larger bodies are answered with `413 Payload Too Large` without invoking any handler.
    pub fn body_limit(&mut self, limit: usize) -> &mut Self {
        self.body_limit = limit;
        self
    }

    /// Registers `handler` for an arbitrary method.
    pub fn route<H: Handler>(&mut self, method: Method, pattern: &str, handler: H) -> &mut Self {
        self.router.add_route(&method, pattern, Arc::new(handler));
        self
    }

    pub fn get<H: Handler>(&mut self, pattern: &str, handler: H) -> &mut Self {
        self.route(Method::GET, pattern, handler)
    }

    pub fn post<H: Handler>(&mut self, pattern: &str, handler: H) -> &mut Self {
        self.route(Method::POST, pattern, handler)
    }

    pub fn put<H: Handler>(&mut self, pattern: &str, handler: H) -> &mut Self {
        self.route(Method::PUT, pattern, handler)
    }

    pub fn delete<H: Handler>(&mut self, pattern: &str, handler: H) -> &mut Self {
        self.route(Method::DELETE, pattern, handler)
    }

    pub fn options<H: Handler>(&mut self, pattern: &str, handler: H) -> &mut Self {
        self.route(Method::OPTIONS, pattern, handler)
    }

    /// Registers the same handler under each of [`ANY_METHODS`].
    ///
    /// These are five separate routes; other methods such as `PATCH` stay unmatched.
    pub fn any<H: Handler>(&mut self, pattern: &str, handler: H) -> &mut Self {
        let handler: Arc<dyn Handler> = Arc::new(handler);
        for method in &ANY_METHODS {
            self.router.add_route(method, pattern, Arc::clone(&handler));
        }
        self
    }

    /// Returns the route table
    pub fn router(&self) -> &Router {
        &self.router
    }

    /// Handles one request: builds a [`Context`], dispatches it and returns the response.
    ///
    /// This is the only hook the host server calls back into.
    pub async fn call<B>(&self, request: Request<B>) -> Response<Full<Bytes>>
    where
        B: Body,
        B::Error: Into<Box<dyn Error + Send + Sync>>,
    {
        let (parts, body) = request.into_parts();
        let body = match Limited::new(body, self.body_limit).collect().await {
            Ok(collected) => collected.to_bytes(),
            Err(e) if e.is::<LengthLimitError>() => {
                warn!(limit = self.body_limit, uri = %parts.uri, "request body too large");
                let mut ctx = Context::new(parts, Bytes::new());
                ctx.error(StatusCode::PAYLOAD_TOO_LARGE, "request body too large");
                return ctx.into_response();
            }
            Err(e) => {
                warn!(cause = %e, uri = %parts.uri, "failed to read request body");
                Bytes::new()
            }
        };

        let mut ctx = match form::form_encoding(&parts) {
            Some(FormEncoding::Multipart { boundary }) => {
                let values = form::decode_multipart(body.clone(), boundary).await;
                Context::with_form(parts, body, values)
            }
            _ => Context::new(parts, body),
        };
        self.router.handle(&mut ctx);
        ctx.into_response()
    }

    /// Binds `address` and serves requests until the process stops.
    ///
    /// An address starting with `:` such as `":8080"` listens on all interfaces.
    ///
    /// # Errors
    /// Returns [`EngineError::Bind`] if the listener cannot be bound.
    pub async fn run(self, address: &str) -> Result<(), EngineError> {
        let address = server::normalize_address(address);
        let listener = TcpListener::bind(address.as_str()).await.map_err(|e| EngineError::bind(&address, e))?;
        self.serve(listener).await;
        Ok(())
    }

    /// Serves requests accepted from an already bound `listener`.
    pub async fn serve(self, listener: TcpListener) {
        server::accept_loop(Arc::new(self), listener).await;
    }
}
