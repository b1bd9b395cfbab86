//! 사용자 관리 endpoint (admin 전용).
//!
//! 역할 변경은 이 라우터의 `PATCH /users/{id}/role`로만 가능합니다.

use std::sync::Arc;

use axum::{
    extract::{Path, State},
    middleware,
    routing::{get, patch},
    Json, Router,
};
use serde::Deserialize;
use tracing::info;
use validator::Validate;

use bookshelf_core::{Role, User};

use super::{parse_id, MessageResponse, ValidatedJson};
use crate::auth::{require_admin, require_auth, AuthUser};
use crate::error::{ApiError, ApiResult};
use crate::state::AppState;

/// 역할 변경 요청
#[derive(Debug, Deserialize, Validate)]
pub struct UpdateRoleRequest {
    #[validate(length(min = 1, message = "role is required"))]
    pub role: String,
}

/// 전체 사용자 목록.
///
/// GET /users
pub async fn list_users(State(state): State<Arc<AppState>>) -> ApiResult<Json<Vec<User>>> {
    Ok(Json(state.auth.list_users().await?))
}

/// 사용자 상세 조회.
///
/// GET /users/{id}
pub async fn get_user(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
) -> ApiResult<Json<User>> {
    let id = parse_id(&id, "user")?;
    Ok(Json(state.auth.get_user(id).await?))
}

/// 사용자 역할 변경.
///
/// PATCH /users/{id}/role
pub async fn update_role(
    State(state): State<Arc<AppState>>,
    admin: AuthUser,
    Path(id): Path<String>,
    ValidatedJson(req): ValidatedJson<UpdateRoleRequest>,
) -> ApiResult<Json<MessageResponse>> {
    let id = parse_id(&id, "user")?;
    let role = Role::parse(&req.role)
        .ok_or_else(|| ApiError::Validation("role must be 'user' or 'admin'".to_string()))?;

    state.auth.update_role(id, role).await?;
    info!(admin_id = admin.user_id, target_id = id, role = %role, "관리자에 의한 역할 변경");

    Ok(Json(MessageResponse::new("User role updated successfully")))
}

/// 사용자 관리 라우터 생성.
pub fn users_router(state: Arc<AppState>) -> Router<Arc<AppState>> {
    Router::new()
        .route("/", get(list_users))
        .route("/{id}", get(get_user))
        .route("/{id}/role", patch(update_role))
        .route_layer(middleware::from_fn(require_admin))
        .route_layer(middleware::from_fn_with_state(state, require_auth))
}
