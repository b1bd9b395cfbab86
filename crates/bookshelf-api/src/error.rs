//! 통합 API 에러 타입.
//!
//! 서비스 계층 에러는 `From` 변환으로 [`ApiError`]가 되고,
//! [`ApiError`]는 상태 코드와 [`ApiErrorResponse`] JSON 본문으로 렌더링됩니다.
//!
//! ```json
//! {
//!   "code": "NOT_FOUND",
//!   "message": "book not found",
//!   "timestamp": 1738300800
//! }
//! ```

use axum::{
    extract::rejection::JsonRejection,
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::{Deserialize, Serialize};
use tracing::error;
use validator::ValidationErrors;

use crate::auth::{AuthError, TokenError};
use crate::services::BookError;

/// API 에러 응답 본문.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApiErrorResponse {
    /// 에러 코드 (예: "VALIDATION_ERROR", "NOT_FOUND")
    pub code: String,
    /// 사람이 읽을 수 있는 에러 메시지
    pub message: String,
    /// 에러 발생 타임스탬프 (Unix timestamp)
    pub timestamp: i64,
}

impl ApiErrorResponse {
    pub fn new(code: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            code: code.into(),
            message: message.into(),
            timestamp: chrono::Utc::now().timestamp(),
        }
    }
}

/// HTTP 경계 에러.
#[derive(Debug, thiserror::Error)]
pub enum ApiError {
    /// 입력 형식/제약 위반 (400)
    #[error("{0}")]
    Validation(String),

    /// 토큰 누락/무효/만료, 잘못된 자격 증명 (401)
    #[error("{0}")]
    Authentication(String),

    /// 인증되었으나 역할 부족 (403)
    #[error("{0}")]
    Authorization(String),

    /// 리소스 없음 (404)
    #[error("{0}")]
    NotFound(String),

    /// 중복 username/email (400)
    #[error("{0}")]
    Conflict(String),

    /// 저장소/서명 실패 (500). 상세 내용은 로그에만 남습니다.
    #[error("{0}")]
    Internal(String),
}

/// 토큰 실패 사유를 숨기는 일반 메시지.
pub const INVALID_TOKEN_MESSAGE: &str = "invalid or expired token";

impl ApiError {
    pub fn status(&self) -> StatusCode {
        match self {
            ApiError::Validation(_) | ApiError::Conflict(_) => StatusCode::BAD_REQUEST,
            ApiError::Authentication(_) => StatusCode::UNAUTHORIZED,
            ApiError::Authorization(_) => StatusCode::FORBIDDEN,
            ApiError::NotFound(_) => StatusCode::NOT_FOUND,
            ApiError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    pub fn code(&self) -> &'static str {
        match self {
            ApiError::Validation(_) => "VALIDATION_ERROR",
            ApiError::Authentication(_) => "UNAUTHORIZED",
            ApiError::Authorization(_) => "FORBIDDEN",
            ApiError::NotFound(_) => "NOT_FOUND",
            ApiError::Conflict(_) => "CONFLICT",
            ApiError::Internal(_) => "INTERNAL_ERROR",
        }
    }

    /// 일반화된 토큰 인증 실패.
    pub fn invalid_token() -> Self {
        ApiError::Authentication(INVALID_TOKEN_MESSAGE.to_string())
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status();
        let message = match &self {
            ApiError::Internal(detail) => {
                error!(detail = %detail, "내부 서버 에러");
                "internal server error".to_string()
            }
            other => other.to_string(),
        };

        (status, Json(ApiErrorResponse::new(self.code(), message))).into_response()
    }
}

/// API Result 타입 별칭.
pub type ApiResult<T> = Result<T, ApiError>;

impl From<AuthError> for ApiError {
    fn from(err: AuthError) -> Self {
        match err {
            AuthError::EmptyField(_) | AuthError::InvalidUsername | AuthError::WeakPassword(_) => {
                ApiError::Validation(err.to_string())
            }
            AuthError::UsernameTaken | AuthError::EmailTaken | AuthError::Conflict => {
                ApiError::Conflict(err.to_string())
            }
            AuthError::InvalidCredentials => ApiError::Authentication(err.to_string()),
            AuthError::UserNotFound => ApiError::NotFound(err.to_string()),
            AuthError::Hashing(_) | AuthError::Store(_) => ApiError::Internal(err.to_string()),
        }
    }
}

impl From<BookError> for ApiError {
    fn from(err: BookError) -> Self {
        match err {
            BookError::EmptyTitle | BookError::EmptyAuthor | BookError::NegativeQuantity => {
                ApiError::Validation(err.to_string())
            }
            BookError::NotFound => ApiError::NotFound(err.to_string()),
            BookError::Store(_) => ApiError::Internal(err.to_string()),
        }
    }
}

impl From<TokenError> for ApiError {
    fn from(err: TokenError) -> Self {
        match err {
            TokenError::Signing(detail) => ApiError::Internal(format!("token signing failed: {detail}")),
            TokenError::InvalidLifetime(_) => ApiError::Internal(err.to_string()),
            _ => ApiError::invalid_token(),
        }
    }
}

impl From<ValidationErrors> for ApiError {
    fn from(errors: ValidationErrors) -> Self {
        let mut messages: Vec<String> = errors
            .field_errors()
            .iter()
            .flat_map(|(field, errors)| {
                errors.iter().map(move |e| {
                    e.message
                        .as_ref()
                        .map(|m| m.to_string())
                        .unwrap_or_else(|| format!("{}: invalid value", field))
                })
            })
            .collect();
        messages.sort();
        ApiError::Validation(messages.join("; "))
    }
}

impl From<JsonRejection> for ApiError {
    fn from(rejection: JsonRejection) -> Self {
        ApiError::Validation(rejection.body_text())
    }
}
