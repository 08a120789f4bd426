//! Bridges the host HTTP server to [`Engine::call`].
//!
//! Each accepted TCP connection runs on its own tokio task and is driven by a hyper HTTP/1
//! connection whose service forwards every request to the shared engine.

use crate::engine::Engine;
use http::Request;
use hyper::body::Incoming;
use hyper::server::conn::http1;
use hyper::service::service_fn;
use hyper_util::rt::TokioIo;
use std::convert::Infallible;
use std::sync::Arc;
use tokio::net::TcpListener;
use tracing::{debug, error, info, warn};

/// Expands the `":port"` shorthand to `"0.0.0.0:port"`; any other address is kept as is.
pub fn normalize_address(address: &str) -> String {
    if address.starts_with(':') { format!("0.0.0.0{address}") } else { address.to_owned() }
}

pub(crate) async fn accept_loop(engine: Arc<Engine>, listener: TcpListener) {
    match listener.local_addr() {
        Ok(address) => info!(%address, "start listening"),
        Err(e) => warn!(cause = %e, "start listening at unknown address"),
    }

    loop {
        let (tcp_stream, remote_addr) = match listener.accept().await {
            Ok(stream_and_addr) => stream_and_addr,
            Err(e) => {
                warn!(cause = %e, "failed to accept");
                continue;
            }
        };

        let engine = Arc::clone(&engine);

        tokio::spawn(async move {
            let service = service_fn(move |request: Request<Incoming>| {
                let engine = Arc::clone(&engine);
                async move { Ok::<_, Infallible>(engine.call(request).await) }
            });

            match http1::Builder::new().serve_connection(TokioIo::new(tcp_stream), service).await {
                Ok(()) => {
                    debug!(%remote_addr, "finished process, connection shutdown");
                }
                Err(e) => {
                    error!(%remote_addr, cause = %e, "connection has error, connection shutdown");
                }
            }
        });
    }
}

#[cfg(test)]
mod tests {
    use super::normalize_address;

    #[test]
    fn test_port_shorthand() {
        assert_eq!(normalize_address(":8080"), "0.0.0.0:8080");
        assert_eq!(normalize_address(":0"), "0.0.0.0:0");
    }

    #[test]
    fn test_full_address_kept() {
        assert_eq!(normalize_address("127.0.0.1:3000"), "127.0.0.1:3000");
        assert_eq!(normalize_address("[::1]:80"), "[::1]:80");
        assert_eq!(normalize_address("localhost:9000"), "localhost:9000");
    }
}
