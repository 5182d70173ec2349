use crate::config::Listener;
use axum::Router;
use axum::routing::get;
use tokio::net::TcpListener;
use tower_http::cors::{AllowHeaders, AllowMethods, AllowOrigin, CorsLayer};

#[derive(thiserror::Error, Debug)]
pub enum ServeError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Binds the listener and serves `app` until Ctrl-C or SIGTERM is received.
///
/// Every service gets the `/health` liveness route and the permissive CORS
/// layer. Credentials are allowed, so the layer mirrors the request origin,
/// method and headers instead of answering with `*`.
pub async fn serve(name: &str, listener: &Listener, app: Router) -> Result<(), ServeError> {
    let app = app.merge(health_router()).layer(cors_layer());

    let tcp = TcpListener::bind(listener.addr()).await?;
    tracing::info!(service = name, addr = %tcp.local_addr()?, "Listening");

    axum::serve(tcp, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    tracing::info!(service = name, "Shut down");
    Ok(())
}

/// Allows any origin, method and header, with credentials. Not suitable for
/// production deployments.
pub fn cors_layer() -> CorsLayer {
    CorsLayer::new()
        .allow_origin(AllowOrigin::mirror_request())
        .allow_methods(AllowMethods::mirror_request())
        .allow_headers(AllowHeaders::mirror_request())
        .allow_credentials(true)
}

fn health_router() -> Router {
    Router::new().route("/health", get(|| async { "ok\n" }))
}

async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            tracing::error!(error = %e, "Failed to install Ctrl-C handler");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut signal) => {
                signal.recv().await;
            }
            Err(e) => {
                tracing::error!(error = %e, "Failed to install SIGTERM handler");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }
}
