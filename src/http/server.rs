//! HTTP server setup and configuration.
//!
//! # Responsibilities
//! - Create the Axum Router with all handlers
//! - Wire up middleware (tracing, request ID, limits, timeout, CORS, panics)
//! - Bind the router to a listener with graceful shutdown
//!
//! The router is also exposed on its own so other transports (a serverless
//! adapter, tests) can mount the same handlers.

use std::any::Any;
use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;

use axum::{
    extract::Request,
    http::{header::CONTENT_TYPE, HeaderName, StatusCode},
    middleware::map_response,
    response::{IntoResponse, Response},
    routing::{get, post},
    Router,
};
use tokio::net::TcpListener;
use tokio::sync::broadcast;
use tower_http::{
    catch_panic::CatchPanicLayer,
    cors::CorsLayer,
    limit::RequestBodyLimitLayer,
    request_id::{MakeRequestUuid, PropagateRequestIdLayer, SetRequestIdLayer},
    timeout::TimeoutLayer,
    trace::TraceLayer,
};

use crate::config::AppConfig;
use crate::geo::{GeoResolver, GeoResult};
use crate::http::handlers::{self, AppState};
use crate::http::response::ApiError;
use crate::observability::metrics;

pub const X_REQUEST_ID: &str = "x-request-id";

/// HTTP server for the visitor profile API.
pub struct HttpServer {
    router: Router,
    config: AppConfig,
}

impl HttpServer {
    /// Create a new HTTP server with the given configuration.
    pub fn new(config: AppConfig) -> GeoResult<Self> {
        let resolver = GeoResolver::from_config(&config)?;
        Ok(Self::with_resolver(config, resolver))
    }

    /// Create a server around an already-built resolver.
    pub fn with_resolver(config: AppConfig, resolver: GeoResolver) -> Self {
        let state = AppState {
            resolver: Arc::new(resolver),
        };
        let router = Self::build_router(&config, state);
        Self { router, config }
    }

    /// Build the Axum router with all middleware layers.
    #[allow(deprecated)]
    pub fn build_router(config: &AppConfig, state: AppState) -> Router {
        let request_id = HeaderName::from_static(X_REQUEST_ID);

        let router = Router::new()
            .route("/api/client-info", post(handlers::client_info))
            .route("/api/status", get(handlers::get_status))
            .with_state(state)
            .layer(CatchPanicLayer::custom(handle_panic))
            .layer(RequestBodyLimitLayer::new(config.security.max_body_size))
            .layer(TimeoutLayer::new(Duration::from_secs(config.timeouts.request_secs)))
            .layer(map_response(envelope_rejections))
            .layer(PropagateRequestIdLayer::new(request_id.clone()))
            .layer(TraceLayer::new_for_http().make_span_with(request_span))
            .layer(SetRequestIdLayer::new(request_id, MakeRequestUuid));

        if config.security.cors_permissive {
            router.layer(CorsLayer::permissive())
        } else {
            router
        }
    }

    /// The fully layered router.
    pub fn router(&self) -> Router {
        self.router.clone()
    }

    /// Run the server, accepting connections on the given listener until
    /// `shutdown` fires.
    pub async fn run(
        self,
        listener: TcpListener,
        mut shutdown: broadcast::Receiver<()>,
    ) -> Result<(), std::io::Error> {
        let addr = listener.local_addr()?;
        tracing::info!(
            address = %addr,
            service = %self.config.geolocation.service_name,
            "HTTP server starting"
        );

        let app = self.router.into_make_service_with_connect_info::<SocketAddr>();

        axum::serve(listener, app)
            .with_graceful_shutdown(async move {
                let _ = shutdown.recv().await;
                tracing::info!("Shutdown signal received");
            })
            .await?;

        tracing::info!("HTTP server stopped");
        Ok(())
    }
}

fn request_span(request: &Request) -> tracing::Span {
    let request_id = request
        .headers()
        .get(X_REQUEST_ID)
        .and_then(|v| v.to_str().ok())
        .unwrap_or("unknown");

    tracing::info_span!(
        "request",
        method = %request.method(),
        uri = %request.uri(),
        request_id = %request_id,
    )
}

/// Rewrite the bare 413 and 408 answers of the limit layers into the JSON
/// envelope. Responses that are already JSON came from a handler and pass
/// through untouched.
async fn envelope_rejections(response: Response) -> Response {
    let error = match response.status() {
        StatusCode::PAYLOAD_TOO_LARGE => ApiError::PayloadTooLarge,
        StatusCode::REQUEST_TIMEOUT => ApiError::Timeout,
        _ => return response,
    };

    let is_json = response
        .headers()
        .get(CONTENT_TYPE)
        .and_then(|v| v.to_str().ok())
        .is_some_and(|ct| ct.starts_with("application/json"));
    if is_json {
        return response;
    }

    tracing::warn!(status = %response.status(), "Request rejected by server limits");
    metrics::record_request_status(response.status().as_u16());
    error.into_response()
}

fn handle_panic(err: Box<dyn Any + Send + 'static>) -> Response {
    let detail = if let Some(s) = err.downcast_ref::<String>() {
        s.clone()
    } else if let Some(s) = err.downcast_ref::<&str>() {
        s.to_string()
    } else {
        "unknown panic".to_string()
    };

    tracing::error!(error = %detail, "Handler panicked");
    metrics::record_request_status(StatusCode::INTERNAL_SERVER_ERROR.as_u16());
    ApiError::Internal(detail).into_response()
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::body::Body;
    use tower::ServiceExt;

    fn router() -> Router {
        let server = HttpServer::new(AppConfig::default()).unwrap();
        server.router()
    }

    async fn body_json(response: Response) -> serde_json::Value {
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX).await.unwrap();
        serde_json::from_slice(&bytes).unwrap()
    }

    #[tokio::test]
    async fn test_missing_field_is_bad_request() {
        let request = axum::http::Request::builder()
            .method("POST")
            .uri("/api/client-info")
            .header(CONTENT_TYPE, "application/json")
            .body(Body::from(r#"{"name": "", "age": "5"}"#))
            .unwrap();

        let response = router().oneshot(request).await.unwrap();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        assert!(response.headers().contains_key(X_REQUEST_ID));
        assert_eq!(
            body_json(response).await,
            serde_json::json!({"success": false, "message": "Name and age are required"})
        );
    }

    #[tokio::test]
    async fn test_malformed_json_is_invalid_body() {
        let request = axum::http::Request::builder()
            .method("POST")
            .uri("/api/client-info")
            .header(CONTENT_TYPE, "application/json")
            .body(Body::from("{not json"))
            .unwrap();

        let response = router().oneshot(request).await.unwrap();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        let body = body_json(response).await;
        assert_eq!(body["message"], "Invalid request body");
        assert!(body["error"].is_string());
    }

    #[tokio::test]
    async fn test_status_endpoint() {
        let request = axum::http::Request::builder()
            .uri("/api/status")
            .body(Body::empty())
            .unwrap();

        let response = router().oneshot(request).await.unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        let body = body_json(response).await;
        assert_eq!(body["success"], true);
        assert_eq!(body["data"]["status"], "operational");
    }

    #[tokio::test]
    async fn test_body_without_content_type_is_missing_field() {
        let request = axum::http::Request::builder()
            .method("POST")
            .uri("/api/client-info")
            .body(Body::from(r#"{"name": "Alice", "age": "30"}"#))
            .unwrap();

        let response = router().oneshot(request).await.unwrap();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        assert_eq!(
            body_json(response).await,
            serde_json::json!({"success": false, "message": "Name and age are required"})
        );
    }

    #[tokio::test]
    async fn test_json_413_passes_through_untouched() {
        async fn too_large() -> Response {
            ApiError::PayloadTooLarge.into_response()
        }
        let app = Router::new()
            .route("/big", get(too_large))
            .layer(map_response(envelope_rejections));

        let request = axum::http::Request::builder().uri("/big").body(Body::empty()).unwrap();
        let response = app.oneshot(request).await.unwrap();

        assert_eq!(response.status(), StatusCode::PAYLOAD_TOO_LARGE);
        assert_eq!(
            body_json(response).await,
            serde_json::json!({"success": false, "message": "Request body too large"})
        );
    }

    #[test]
    fn test_panic_is_counted_as_500() {
        let recorder = metrics_exporter_prometheus::PrometheusBuilder::new().build_recorder();
        let handle = recorder.handle();

        let response = ::metrics::with_local_recorder(&recorder, || {
            handle_panic(Box::new("exploded"))
        });

        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
        let rendered = handle.render();
        assert!(
            rendered.contains(r#"client_info_requests_total{status="500"} 1"#),
            "rendered: {}",
            rendered
        );
    }

    async fn explode() -> &'static str {
        panic!("exploded")
    }

    #[tokio::test]
    async fn test_panic_becomes_internal_error() {
        let app = Router::new()
            .route("/boom", get(explode))
            .layer(CatchPanicLayer::custom(handle_panic));

        let request = axum::http::Request::builder().uri("/boom").body(Body::empty()).unwrap();
        let response = app.oneshot(request).await.unwrap();

        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(
            body_json(response).await,
            serde_json::json!({
                "success": false,
                "message": "Internal server error",
                "error": "exploded"
            })
        );
    }
}
