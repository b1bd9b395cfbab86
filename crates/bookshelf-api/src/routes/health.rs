//! 헬스 체크 endpoint.
//!
//! 로드밸런서나 오케스트레이션 시스템에서 사용됩니다. 인증이 필요 없습니다.

use std::sync::Arc;

use axum::{extract::State, http::StatusCode, routing::get, Json, Router};
use serde::{Deserialize, Serialize};

use crate::state::AppState;

/// 헬스 체크 응답.
#[derive(Debug, Serialize, Deserialize)]
pub struct HealthResponse {
    pub status: String,
    pub message: String,
}

/// 상세 헬스 체크 응답.
#[derive(Debug, Serialize, Deserialize)]
pub struct ReadinessResponse {
    /// "ok" | "degraded"
    pub status: String,

    /// API 버전
    pub version: String,

    /// 서버 업타임(초)
    pub uptime_secs: i64,

    /// "up" | "down" | "not_configured"
    pub database: String,
}

/// 간단한 헬스 체크 (liveness probe용).
///
/// GET /health
pub async fn health_check() -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "ok".to_string(),
        message: "Bookshelf API is running".to_string(),
    })
}

/// 상세 헬스 체크 (readiness probe용).
///
/// 데이터베이스가 응답하지 않으면 503을 반환합니다.
/// GET /health/ready
pub async fn health_ready(
    State(state): State<Arc<AppState>>,
) -> (StatusCode, Json<ReadinessResponse>) {
    let (status_code, status, database) = match state.is_db_healthy().await {
        Some(true) => (StatusCode::OK, "ok", "up"),
        Some(false) => (StatusCode::SERVICE_UNAVAILABLE, "degraded", "down"),
        None => (StatusCode::OK, "ok", "not_configured"),
    };

    (
        status_code,
        Json(ReadinessResponse {
            status: status.to_string(),
            version: state.version.clone(),
            uptime_secs: state.uptime_secs(),
            database: database.to_string(),
        }),
    )
}

/// 헬스 체크 라우터 생성.
pub fn health_router() -> Router<Arc<AppState>> {
    Router::new()
        .route("/", get(health_check))
        .route("/ready", get(health_ready))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::routes::create_router;
    use crate::state::create_test_state;
    use axum::{body::Body, http::Request};
    use tower::ServiceExt;

    #[tokio::test]
    async fn test_health_is_public() {
        let app = create_router(Arc::new(create_test_state()));

        let response = app
            .oneshot(Request::builder().uri("/health").body(Body::empty()).unwrap())
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);

        let body = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        let health: HealthResponse = serde_json::from_slice(&body).unwrap();
        assert_eq!(health.status, "ok");
    }

    #[tokio::test]
    async fn test_ready_without_database() {
        let app = create_router(Arc::new(create_test_state()));

        let response = app
            .oneshot(
                Request::builder()
                    .uri("/health/ready")
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);

        let body = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        let ready: ReadinessResponse = serde_json::from_slice(&body).unwrap();
        assert_eq!(ready.database, "not_configured");
        assert_eq!(ready.version, env!("CARGO_PKG_VERSION"));
    }
}
