//! 인증 endpoint.
//!
//! - `POST /auth/register` - 회원가입 (201)
//! - `POST /auth/login` - 로그인
//! - `POST /auth/refresh` - 토큰 갱신
//! - `GET /auth/profile` - 내 정보 (인증 필요)
//! - `POST /auth/change-password` - 비밀번호 변경 (인증 필요)

use std::sync::Arc;

use axum::{
    extract::State,
    http::StatusCode,
    middleware,
    routing::{get, post},
    Json, Router,
};
use serde::{Deserialize, Serialize};
use tracing::debug;
use validator::Validate;

use bookshelf_core::User;

use super::ValidatedJson;
use crate::auth::{require_auth, AuthUser};
use crate::error::{ApiError, ApiResult};
use crate::state::AppState;

// ==================== 요청/응답 타입 ====================

/// 회원가입 요청
#[derive(Debug, Deserialize, Validate)]
pub struct RegisterRequest {
    #[validate(length(min = 3, max = 50, message = "username must be between 3 and 50 characters"))]
    pub username: String,
    #[validate(email(message = "email must be a valid email address"))]
    pub email: String,
    #[validate(length(min = 6, message = "password must be at least 6 characters long"))]
    pub password: String,
}

/// 로그인 요청
#[derive(Debug, Deserialize, Validate)]
pub struct LoginRequest {
    #[validate(length(min = 1, message = "username_or_email is required"))]
    pub username_or_email: String,
    #[validate(length(min = 1, message = "password is required"))]
    pub password: String,
}

/// 토큰 갱신 요청
#[derive(Debug, Deserialize, Validate)]
pub struct RefreshRequest {
    #[validate(length(min = 1, message = "token is required"))]
    pub token: String,
}

/// 비밀번호 변경 요청
#[derive(Debug, Deserialize, Validate)]
pub struct ChangePasswordRequest {
    #[validate(length(min = 1, message = "current_password is required"))]
    pub current_password: String,
    #[validate(length(min = 6, message = "new_password must be at least 6 characters long"))]
    pub new_password: String,
}

/// 인증 성공 응답 (사용자 + 토큰)
#[derive(Debug, Serialize, Deserialize)]
pub struct AuthResponse {
    pub user: User,
    pub token: String,
}

/// 토큰 응답
#[derive(Debug, Serialize, Deserialize)]
pub struct TokenResponse {
    pub token: String,
}

/// 메시지 응답
#[derive(Debug, Serialize, Deserialize)]
pub struct MessageResponse {
    pub message: String,
}

impl MessageResponse {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }
}

// ==================== 핸들러 ====================

/// 회원가입.
///
/// POST /auth/register
pub async fn register(
    State(state): State<Arc<AppState>>,
    ValidatedJson(req): ValidatedJson<RegisterRequest>,
) -> ApiResult<(StatusCode, Json<AuthResponse>)> {
    let user = state
        .auth
        .register(&req.username, &req.email, &req.password)
        .await?
        .sanitized();
    let token = state.jwt.issue(&user)?;

    Ok((StatusCode::CREATED, Json(AuthResponse { user, token })))
}

/// 로그인.
///
/// POST /auth/login
pub async fn login(
    State(state): State<Arc<AppState>>,
    ValidatedJson(req): ValidatedJson<LoginRequest>,
) -> ApiResult<Json<AuthResponse>> {
    let user = state.auth.login(&req.username_or_email, &req.password).await?;
    let token = state.jwt.issue(&user)?;

    Ok(Json(AuthResponse { user, token }))
}

/// 토큰 갱신.
///
/// POST /auth/refresh
pub async fn refresh(
    State(state): State<Arc<AppState>>,
    ValidatedJson(req): ValidatedJson<RefreshRequest>,
) -> ApiResult<Json<TokenResponse>> {
    let token = state.jwt.refresh(&req.token).map_err(|e| {
        debug!(reason = %e, "토큰 갱신 실패");
        ApiError::from(e)
    })?;

    Ok(Json(TokenResponse { token }))
}

/// 내 정보 조회.
///
/// GET /auth/profile
pub async fn profile(
    State(state): State<Arc<AppState>>,
    auth: AuthUser,
) -> ApiResult<Json<User>> {
    let user = state.auth.get_user(auth.user_id).await?;
    Ok(Json(user))
}

/// 비밀번호 변경.
///
/// POST /auth/change-password
pub async fn change_password(
    State(state): State<Arc<AppState>>,
    auth: AuthUser,
    ValidatedJson(req): ValidatedJson<ChangePasswordRequest>,
) -> ApiResult<Json<MessageResponse>> {
    state
        .auth
        .change_password(auth.user_id, &req.current_password, &req.new_password)
        .await?;

    Ok(Json(MessageResponse::new("Password changed successfully")))
}

// ==================== 라우터 ====================

/// 인증 라우터 생성.
pub fn auth_router(state: Arc<AppState>) -> Router<Arc<AppState>> {
    let protected = Router::new()
        .route("/profile", get(profile))
        .route("/change-password", post(change_password))
        .route_layer(middleware::from_fn_with_state(state, require_auth));

    Router::new()
        .route("/register", post(register))
        .route("/login", post(login))
        .route("/refresh", post(refresh))
        .merge(protected)
}
