use std::sync::Arc;

use axum::{
    body::Bytes,
    extract::State,
    http::{header, Method, StatusCode},
    response::{IntoResponse, Response},
    routing::{get, post},
    Json, Router,
};
use serde::Deserialize;
use serde_json::json;
use tower_http::cors::CorsLayer;

use crate::verify::TokenVerifier;

#[derive(Clone)]
pub struct AppState {
    pub verifier: Arc<TokenVerifier>,
}

#[derive(Debug, Deserialize)]
struct VerifyRequest {
    #[serde(rename = "accessToken")]
    access_token: Option<String>,
}

/// The app and mobile clients call this from anywhere, so CORS is wide
/// open — the relay holds no session state worth protecting.
fn build_cors() -> CorsLayer {
    CorsLayer::new()
        .allow_origin(tower_http::cors::Any)
        .allow_methods([Method::GET, Method::POST])
        .allow_headers([header::CONTENT_TYPE, header::ACCEPT])
}

pub fn build_app(state: AppState) -> Router {
    Router::new()
        .route("/verify-msg91-token", post(verify_token))
        .route("/healthz", get(healthz))
        .layer(build_cors())
        .with_state(state)
}

async fn healthz() -> Json<serde_json::Value> {
    Json(json!({ "status": "ok" }))
}

/// Relay the access token to MSG91 and answer with the upstream's exact
/// status and body. A missing token (or an undecodable body) never
/// reaches the upstream; a transport failure becomes a generic 500. The
/// process keeps serving in every case.
async fn verify_token(State(state): State<AppState>, body: Bytes) -> Response {
    let token = serde_json::from_slice::<VerifyRequest>(&body)
        .ok()
        .and_then(|request| request.access_token)
        .filter(|token| !token.is_empty());

    let Some(token) = token else {
        return (
            StatusCode::BAD_REQUEST,
            Json(json!({ "status": "error", "message": "Access token is required" })),
        )
            .into_response();
    };

    match state.verifier.verify(&token).await {
        Ok(upstream) => {
            let status = StatusCode::from_u16(upstream.status)
                .unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);
            (status, Json(upstream.body)).into_response()
        }
        Err(e) => {
            tracing::error!(error = %e, "token verification request failed");
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(json!({ "message": "Internal Server Error" })),
            )
                .into_response()
        }
    }
}
