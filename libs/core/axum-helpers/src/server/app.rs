use super::shutdown::ShutdownCoordinator;
use crate::errors::handlers::not_found;
use axum::Router;
use axum::http::{HeaderValue, Method, header};
use core_config::server::ServerConfig;
use std::future::Future;
use std::io;
use std::time::Duration;
use tower_http::cors::{AllowOrigin, CorsLayer};
use tower_http::trace::{DefaultMakeSpan, DefaultOnResponse, TraceLayer};
use tracing::{Level, info, warn};
use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;

/// Parse a comma-separated origin list such as
/// `http://localhost:3000, https://reviews.example.com`.
pub fn parse_allowed_origins(raw: &str) -> io::Result<Vec<HeaderValue>> {
    let origins = raw
        .split(',')
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(HeaderValue::from_str)
        .collect::<Result<Vec<_>, _>>()
        .map_err(|e| {
            io::Error::new(
                io::ErrorKind::InvalidInput,
                format!("Invalid CORS_ALLOWED_ORIGIN value: {e}"),
            )
        })?;

    if origins.is_empty() {
        return Err(io::Error::new(
            io::ErrorKind::InvalidInput,
            "CORS_ALLOWED_ORIGIN cannot be empty",
        ));
    }
    Ok(origins)
}

fn cors_layer(origins: Vec<HeaderValue>) -> CorsLayer {
    CorsLayer::new()
        .allow_origin(AllowOrigin::list(origins))
        .allow_methods([Method::GET, Method::POST, Method::OPTIONS])
        .allow_headers([header::CONTENT_TYPE, header::ACCEPT])
        .max_age(Duration::from_secs(3600))
}

/// Wrap the API routes with docs, tracing, CORS and the 404 fallback.
///
/// Routes are mounted at the root. Swagger UI is served at `/swagger-ui`
/// with the document at `/api-docs/openapi.json`. CORS is only enabled
/// when `CORS_ALLOWED_ORIGIN` is set.
///
/// # Errors
/// `CORS_ALLOWED_ORIGIN` is set but empty or not a valid header value.
pub fn create_router<T>(apis: Router) -> io::Result<Router>
where
    T: OpenApi + 'static,
{
    let router = Router::new()
        .merge(SwaggerUi::new("/swagger-ui").url("/api-docs/openapi.json", T::openapi()))
        .merge(apis)
        .fallback(not_found)
        .layer(
            TraceLayer::new_for_http()
                .make_span_with(DefaultMakeSpan::new().level(Level::INFO))
                .on_response(DefaultOnResponse::new().level(Level::INFO)),
        );

    match std::env::var("CORS_ALLOWED_ORIGIN") {
        Ok(raw) => {
            let origins = parse_allowed_origins(&raw)?;
            info!(origins = %raw, "CORS enabled");
            Ok(router.layer(cors_layer(origins)))
        }
        Err(_) => Ok(router),
    }
}

/// Serve `router` until SIGINT/SIGTERM, then run `cleanup` bounded by
/// `shutdown_timeout`.
///
/// ```ignore
/// let db = state.db.clone();
/// create_production_app(router, &config.server, config.server.shutdown_timeout, async move {
///     let _ = db.close().await;
/// })
/// .await?;
/// ```
pub async fn create_production_app<F>(
    router: Router,
    server_config: &ServerConfig,
    shutdown_timeout: Duration,
    cleanup: F,
) -> io::Result<()>
where
    F: Future<Output = ()> + Send + 'static,
{
    let (coordinator, _rx) = ShutdownCoordinator::new();

    let listener = tokio::net::TcpListener::bind(server_config.address()).await?;
    info!("Server starting on {}", listener.local_addr()?);

    let signal_watcher = {
        let coordinator = coordinator.clone();
        tokio::spawn(async move { coordinator.wait_for_signal().await })
    };

    let cleanup_handle = {
        let coordinator = coordinator.clone();
        tokio::spawn(async move {
            coordinator.wait_for_shutdown().await;

            info!(?shutdown_timeout, "Running cleanup");
            match tokio::time::timeout(shutdown_timeout, cleanup).await {
                Ok(()) => info!("Cleanup completed"),
                Err(_) => warn!(?shutdown_timeout, "Cleanup timed out, forcing shutdown"),
            }
        })
    };

    let serve_result = {
        let coordinator = coordinator.clone();
        axum::serve(listener, router.into_make_service())
            .with_graceful_shutdown(async move { coordinator.wait_for_shutdown().await })
            .await
            .inspect_err(|e| tracing::error!(error = ?e, "Server encountered an error"))
    };

    // A serve error ends the process without a signal; release the cleanup task.
    coordinator.shutdown();
    signal_watcher.abort();
    cleanup_handle.await.ok();

    serve_result
}
