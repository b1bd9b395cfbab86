//! Axum용 인증/인가 미들웨어.
//!
//! 두 개의 게이트를 체인으로 조합합니다.
//!
//! - [`require_auth`]: Bearer 토큰을 검증하고 [`AuthUser`]를 요청 extensions에 주입
//! - [`require_admin`]: [`require_auth`] 이후에 실행되어 admin 역할만 통과
//!
//! ```rust,ignore
//! Router::new()
//!     .route("/books", post(create_book))
//!     .route_layer(middleware::from_fn(require_admin))
//!     .route_layer(middleware::from_fn_with_state(state.clone(), require_auth));
//! ```

use std::sync::Arc;

use axum::{
    extract::{FromRequestParts, Request, State},
    http::{header::AUTHORIZATION, request::Parts, HeaderMap},
    middleware::Next,
    response::Response,
};
use tracing::{debug, warn};

use bookshelf_core::Role;

use super::jwt::Claims;
use crate::error::ApiError;
use crate::state::AppState;

/// 인증된 요청의 신원 정보.
///
/// 토큰 발급 시점의 값이며 현재 저장소 상태와 다를 수 있습니다.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AuthUser {
    pub user_id: i64,
    pub username: String,
    pub email: String,
    pub role: Role,
}

impl From<Claims> for AuthUser {
    fn from(claims: Claims) -> Self {
        Self {
            user_id: claims.user_id,
            username: claims.username,
            email: claims.email,
            role: claims.role,
        }
    }
}

/// Authorization 헤더에서 Bearer 토큰 추출.
fn bearer_token(headers: &HeaderMap) -> Result<&str, ApiError> {
    let header = headers
        .get(AUTHORIZATION)
        .and_then(|h| h.to_str().ok())
        .ok_or_else(|| ApiError::Authentication("authorization header required".to_string()))?;

    // 스킴 이름은 대소문자를 구분하지 않음 (RFC 7235)
    header
        .split_once(' ')
        .filter(|(scheme, _)| scheme.eq_ignore_ascii_case("bearer"))
        .map(|(_, token)| token.trim())
        .filter(|t| !t.is_empty())
        .ok_or_else(|| {
            ApiError::Authentication("authorization header must use the Bearer scheme".to_string())
        })
}

/// 인증 게이트.
///
/// 검증 실패 사유는 로그에만 남기고 클라이언트에는 일반 메시지를 반환합니다.
pub async fn require_auth(
    State(state): State<Arc<AppState>>,
    mut request: Request,
    next: Next,
) -> Result<Response, ApiError> {
    let token = bearer_token(request.headers())?;

    let claims = state.jwt.validate(token).map_err(|e| {
        debug!(reason = %e, "토큰 검증 실패");
        ApiError::invalid_token()
    })?;

    request.extensions_mut().insert(AuthUser::from(claims));
    Ok(next.run(request).await)
}

/// 인가 게이트 (admin 전용).
pub async fn require_admin(request: Request, next: Next) -> Result<Response, ApiError> {
    let user = request
        .extensions()
        .get::<AuthUser>()
        .ok_or_else(|| ApiError::Authentication("authentication required".to_string()))?;

    match user.role {
        Role::Admin => {}
        Role::User => {
            warn!(user_id = user.user_id, path = %request.uri().path(), "관리자 권한 없음");
            return Err(ApiError::Authorization("admin access required".to_string()));
        }
    }

    Ok(next.run(request).await)
}

impl<S> FromRequestParts<S> for AuthUser
where
    S: Send + Sync,
{
    type Rejection = ApiError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        parts
            .extensions
            .get::<AuthUser>()
            .cloned()
            .ok_or_else(|| ApiError::Authentication("authentication required".to_string()))
    }
}
