use std::io;
use thiserror::Error;

/// Fatal errors raised while starting the server.
#[derive(Debug, Error)]
pub enum EngineError {
    #[error("failed to bind listener at {address}: {source}")]
    Bind {
        address: String,
        #[source]
        source: io::Error,
    },
}

impl EngineError {
    pub fn bind<S: ToString>(address: S, source: io::Error) -> Self {
        Self::Bind { address: address.to_string(), source }
    }
}

/// Errors returned by the typed binding helpers on [`Context`](crate::Context).
#[derive(Debug, Error)]
pub enum BindError {
    #[error("invalid query string: {source}")]
    Query {
        #[from]
        source: serde_qs::Error,
    },

    #[error("invalid form body: {source}")]
    Form {
        #[from]
        source: serde_urlencoded::de::Error,
    },
}
