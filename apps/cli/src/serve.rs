use std::io;
use std::net::SocketAddr;

use http_api::{HttpState, TOKEN_HEADER, generate_api_token};
use monitor_app::AppState;
use tracing::{info, warn};

pub async fn run(state: AppState, port: u16) -> Result<(), io::Error> {
    let api_token = generate_api_token();
    let router = http_api::router(HttpState::new(state, api_token.clone()));

    let (listener, actual_port, used_fallback) = bind_port(port).await?;
    if used_fallback {
        warn!(port, actual_port, "port unavailable, using a free one");
    }

    println!("LLM cost monitor is serving at http://127.0.0.1:{actual_port}");
    println!("API token ({TOKEN_HEADER}): {api_token}");
    println!("Press Ctrl+C to stop.");
    info!(port = actual_port, "http api listening");

    axum::serve(listener, router)
        .with_graceful_shutdown(shutdown_signal())
        .await
}

async fn bind_port(port: u16) -> Result<(tokio::net::TcpListener, u16, bool), io::Error> {
    if port == 0 {
        let listener = tokio::net::TcpListener::bind(SocketAddr::from(([127, 0, 0, 1], 0))).await?;
        let actual_port = listener.local_addr()?.port();
        return Ok((listener, actual_port, false));
    }

    let addr = SocketAddr::from(([127, 0, 0, 1], port));
    match tokio::net::TcpListener::bind(addr).await {
        Ok(listener) => Ok((listener, port, false)),
        Err(_) => {
            let listener =
                tokio::net::TcpListener::bind(SocketAddr::from(([127, 0, 0, 1], 0))).await?;
            let actual_port = listener.local_addr()?.port();
            Ok((listener, actual_port, true))
        }
    }
}

async fn shutdown_signal() {
    let _ = tokio::signal::ctrl_c().await;
    info!("shutting down");
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn port_zero_binds_an_ephemeral_port() {
        let (listener, port, used_fallback) = bind_port(0).await.expect("bind");
        assert!(!used_fallback);
        assert_ne!(port, 0);
        assert_eq!(listener.local_addr().expect("addr").port(), port);
    }

    #[tokio::test]
    async fn busy_port_falls_back() {
        let (_held, port, _) = bind_port(0).await.expect("bind");
        let (_listener, actual, used_fallback) = bind_port(port).await.expect("fallback");
        assert!(used_fallback);
        assert_ne!(actual, port);
    }
}
