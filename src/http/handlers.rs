//! Request handlers.

use std::sync::Arc;
use std::time::Instant;

use axum::{
    extract::State,
    http::{header::USER_AGENT, HeaderMap},
    response::{IntoResponse, Response},
    Json,
};
use chrono::Utc;
use serde::{Deserialize, Serialize};

use crate::device;
use crate::geo::GeoResolver;
use crate::http::form::Submission;
use crate::http::request::{extract_client_ip, PeerAddr};
use crate::http::response::{ApiError, ApiResponse};
use crate::observability::metrics;
use crate::profile::ClientProfile;

pub const PROFILE_MESSAGE: &str = "Client information retrieved successfully";

/// Application state injected into handlers.
#[derive(Clone)]
pub struct AppState {
    pub resolver: Arc<GeoResolver>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SystemStatus {
    pub version: String,
    pub status: String,
}

/// `POST /api/client-info`
pub async fn client_info(
    State(state): State<AppState>,
    PeerAddr(peer): PeerAddr,
    headers: HeaderMap,
    submission: Result<Submission, ApiError>,
) -> Response {
    let start = Instant::now();

    let response = match submission {
        Ok(submission) => match build_profile(&state, peer, &headers, submission).await {
            Ok(profile) => Json(ApiResponse::ok(PROFILE_MESSAGE, profile)).into_response(),
            Err(e) => e.into_response(),
        },
        Err(e) => {
            tracing::debug!(error = %e, "Rejected client-info body");
            e.into_response()
        }
    };

    metrics::record_request(response.status().as_u16(), start);
    response
}

async fn build_profile(
    state: &AppState,
    peer: Option<std::net::SocketAddr>,
    headers: &HeaderMap,
    submission: Submission,
) -> Result<ClientProfile, ApiError> {
    let visitor = submission.validate()?;

    let client_ip = extract_client_ip(headers, peer);
    let user_agent = headers
        .get(USER_AGENT)
        .and_then(|v| v.to_str().ok())
        .unwrap_or_default();
    let device = device::classify(user_agent);

    let location = state.resolver.resolve(&client_ip).await;

    tracing::info!(
        client_ip = %client_ip,
        resolved_ip = %location.ip,
        lookup_success = location.success,
        device = %device.device_type,
        browser = %device.browser,
        os = %device.operating_system,
        "Client profile assembled"
    );

    Ok(ClientProfile::assemble(
        visitor,
        client_ip,
        device,
        location,
        state.resolver.service_name(),
        Utc::now(),
    ))
}

/// `GET /api/status`
pub async fn get_status() -> Json<ApiResponse<SystemStatus>> {
    Json(ApiResponse::ok(
        "Service is operational",
        SystemStatus {
            version: env!("CARGO_PKG_VERSION").to_string(),
            status: "operational".to_string(),
        },
    ))
}
