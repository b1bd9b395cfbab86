//! 핵심 에러 타입.

use thiserror::Error;

/// 코어 크레이트 에러.
#[derive(Debug, Error)]
pub enum CoreError {
    /// 설정 에러
    #[error("설정 에러: {0}")]
    Config(String),

    /// 로깅 초기화 에러
    #[error("로깅 초기화 에러: {0}")]
    Logging(String),

    /// 알 수 없는 역할 문자열
    #[error("알 수 없는 역할: {0}")]
    UnknownRole(String),
}

impl From<config::ConfigError> for CoreError {
    fn from(err: config::ConfigError) -> Self {
        CoreError::Config(err.to_string())
    }
}

/// 코어 Result 타입 별칭.
pub type CoreResult<T> = Result<T, CoreError>;
