//! A micro HTTP request dispatcher.
//!
//! Handlers are registered by exact method and path on an [`Engine`], then the engine serves
//! them over HTTP/1. Every request gets its own [`Context`] with accessors for the query
//! string and url-encoded or multipart form values, plus helpers for writing plain text, JSON or raw bytes.
//! A request with no registered route receives `404 NOT FOUND:<uri>`.
//!
//! # Example
//!
//! ```no_run
//! use http::StatusCode;
//! use micro_dispatch::{Context, Engine};
//! use std::collections::HashMap;
//!
//! #[tokio::main]
//! async fn main() {
//!     micro_dispatch::logging::init();
//!
//!     let mut engine = Engine::new();
//!     engine.get("/get", |ctx: &mut Context| {
//!         let x = ctx.query("x").to_owned();
//!         ctx.string(StatusCode::OK, format_args!("get successfully, x = {x}"));
//!     });
//!     engine.any("/any", |ctx: &mut Context| {
//!         let mut map = HashMap::new();
//!         map.insert("method", ctx.method().to_string());
//!         ctx.json(StatusCode::OK, &map);
//!     });
//!
//!     if let Err(e) = engine.run(":8080").await {
//!         eprintln!("{e}");
//!     }
//! }
//! ```

mod context;
mod engine;
mod error;
mod form;
mod router;
mod server;
mod values;

pub mod logging;

pub use context::Context;
pub use context::ResponseWriter;
pub use engine::Engine;
pub use engine::ANY_METHODS;
pub use engine::DEFAULT_BODY_LIMIT;
pub use error::BindError;
pub use error::EngineError;
pub use router::route_key;
pub use router::Handler;
pub use router::Router;
pub use server::normalize_address;
pub use values::Values;
