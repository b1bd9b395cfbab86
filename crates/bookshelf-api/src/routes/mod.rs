//! API 라우트.
//!
//! # 라우트 구조
//!
//! - `/health` - 헬스 체크 (인증 없음)
//! - `/auth` - 회원가입, 로그인, 토큰 갱신, 프로필, 비밀번호 변경
//! - `/books` - 도서 조회 (인증), 도서 변경 (admin)
//! - `/users` - 사용자 관리 (admin)

pub mod auth;
pub mod books;
pub mod health;
pub mod users;

pub use auth::{auth_router, AuthResponse, MessageResponse, TokenResponse};
pub use books::{books_router, BookListResponse, BookPageResponse};
pub use health::{health_router, HealthResponse};
pub use users::users_router;

use std::sync::Arc;

use axum::{
    extract::{rejection::JsonRejection, FromRequest, Request},
    Json, Router,
};
use serde::de::DeserializeOwned;
use tracing::info;
use validator::Validate;

use crate::error::{ApiError, ApiResult};
use crate::state::AppState;

/// 시작 로그에 출력되는 라우트 목록 (메서드, 경로, 접근 수준).
pub const ROUTE_TABLE: &[(&str, &str, &str)] = &[
    ("GET", "/health", "public"),
    ("GET", "/health/ready", "public"),
    ("POST", "/auth/register", "public"),
    ("POST", "/auth/login", "public"),
    ("POST", "/auth/refresh", "public"),
    ("GET", "/auth/profile", "auth required"),
    ("POST", "/auth/change-password", "auth required"),
    ("GET", "/books", "auth required"),
    ("GET", "/books/{id}", "auth required"),
    ("POST", "/books", "admin only"),
    ("PUT", "/books/{id}", "admin only"),
    ("DELETE", "/books/{id}", "admin only"),
    ("PATCH", "/books/{id}/quantity", "admin only"),
    ("GET", "/users", "admin only"),
    ("GET", "/users/{id}", "admin only"),
    ("PATCH", "/users/{id}/role", "admin only"),
];

/// 전체 API 라우터 생성.
///
/// 인증 미들웨어가 상태를 필요로 하므로 생성 시점에 상태를 받습니다.
pub fn create_router(state: Arc<AppState>) -> Router {
    Router::new()
        .nest("/health", health_router())
        .nest("/auth", auth_router(state.clone()))
        .nest("/books", books_router(state.clone()))
        .nest("/users", users_router(state.clone()))
        .with_state(state)
}

/// 라우트 목록을 info 레벨로 출력.
pub fn log_routes() {
    info!("Available endpoints:");
    for (method, path, access) in ROUTE_TABLE {
        info!("  {:<6} {} ({})", method, path, access);
    }
}

/// JSON 본문 역직렬화 후 `validator` 규칙을 적용하는 추출기.
///
/// 역직렬화 실패와 검증 실패 모두 400 [`ApiError::Validation`]으로 거부됩니다.
#[derive(Debug, Clone)]
pub struct ValidatedJson<T>(pub T);

impl<T, S> FromRequest<S> for ValidatedJson<T>
where
    T: DeserializeOwned + Validate,
    S: Send + Sync,
    Json<T>: FromRequest<S, Rejection = JsonRejection>,
{
    type Rejection = ApiError;

    async fn from_request(req: Request, state: &S) -> Result<Self, Self::Rejection> {
        let Json(value) = Json::<T>::from_request(req, state).await?;
        value.validate()?;
        Ok(ValidatedJson(value))
    }
}

/// 경로의 ID 세그먼트 파싱. 양의 정수가 아니면 400.
pub(crate) fn parse_id(raw: &str, what: &str) -> ApiResult<i64> {
    raw.parse::<i64>()
        .ok()
        .filter(|id| *id > 0)
        .ok_or_else(|| ApiError::Validation(format!("invalid {what} ID")))
}
