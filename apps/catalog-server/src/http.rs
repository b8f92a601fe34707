use std::net::SocketAddr;
use std::time::Duration;

use anyhow::Context;
use axum::{
    body::Body,
    http::{HeaderName, Request},
    response::Json,
    routing::get,
    Router,
};
use serde_json::{json, Value};
use tower_http::{
    classify::{ServerErrorsAsFailures, SharedClassifier},
    cors::CorsLayer,
    limit::RequestBodyLimitLayer,
    request_id::{MakeRequestUuid, PropagateRequestIdLayer, SetRequestIdLayer},
    timeout::TimeoutLayer,
    trace::TraceLayer,
};

const BODY_LIMIT: usize = 1024 * 1024;

fn request_id_header() -> HeaderName {
    HeaderName::from_static("x-request-id")
}

pub async fn health_check() -> Json<Value> {
    Json(json!({
        "status": "healthy",
        "timestamp": chrono::Utc::now().to_rfc3339()
    }))
}

#[allow(clippy::type_complexity)]
fn trace_layer() -> TraceLayer<
    SharedClassifier<ServerErrorsAsFailures>,
    impl Fn(&Request<Body>) -> tracing::Span + Clone,
> {
    TraceLayer::new_for_http().make_span_with(|req: &Request<Body>| {
        let rid = req
            .headers()
            .get(request_id_header())
            .and_then(|v| v.to_str().ok())
            .unwrap_or("n/a");
        tracing::info_span!(
            "http_request",
            method = %req.method(),
            uri = %req.uri().path(),
            request_id = %rid,
        )
    })
}

/// Wrap the module routes with the global middleware stack.
///
/// Outermost to innermost: PropagateRequestId, SetRequestId, Trace, Timeout,
/// CORS, BodyLimit.
pub fn build_router(api: Router, request_timeout: Option<Duration>) -> Router {
    let mut router = Router::new()
        .route("/health", get(health_check))
        .merge(api);

    router = router.layer(RequestBodyLimitLayer::new(BODY_LIMIT));
    router = router.layer(CorsLayer::permissive());
    if let Some(limit) = request_timeout {
        router = router.layer(TimeoutLayer::new(limit));
    }
    router = router.layer(trace_layer());
    router = router.layer(SetRequestIdLayer::new(request_id_header(), MakeRequestUuid));
    router.layer(PropagateRequestIdLayer::new(request_id_header()))
}

/// Bind and serve until Ctrl-C.
pub async fn serve(router: Router, bind_addr: &str) -> anyhow::Result<()> {
    let addr: SocketAddr = bind_addr
        .parse()
        .with_context(|| format!("Invalid bind address '{bind_addr}'"))?;

    let listener = tokio::net::TcpListener::bind(addr).await?;
    tracing::info!("HTTP server bound on {}", addr);

    let shutdown = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            tracing::error!("Failed to listen for shutdown signal: {}", e);
            return;
        }
        tracing::info!("HTTP server shutting down gracefully");
    };

    axum::serve(listener, router)
        .with_graceful_shutdown(shutdown)
        .await
        .map_err(|e| anyhow::anyhow!(e))
}
