//! 사용자 및 역할.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::error::CoreError;

/// 사용자 역할.
///
/// 닫힌 열거형이며, 권한 검사는 항상 전수 `match`로 수행합니다.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    /// 일반 사용자 - 도서 조회만 가능
    #[default]
    User,
    /// 관리자 - 도서 변경 및 사용자 관리
    Admin,
}

impl Role {
    /// 저장소/토큰에 기록되는 문자열 표현.
    pub fn as_str(&self) -> &'static str {
        match self {
            Role::User => "user",
            Role::Admin => "admin",
        }
    }

    /// 문자열에서 역할 파싱 (대소문자 무시).
    pub fn parse(s: &str) -> Option<Self> {
        match s.trim().to_lowercase().as_str() {
            "user" => Some(Role::User),
            "admin" => Some(Role::Admin),
            _ => None,
        }
    }
}

impl std::fmt::Display for Role {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for Role {
    type Err = CoreError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Role::parse(s).ok_or_else(|| CoreError::UnknownRole(s.to_string()))
    }
}

/// 사용자 레코드.
///
/// `password_hash`는 직렬화되지 않으므로 클라이언트 응답에 포함되지 않습니다.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct User {
    pub id: i64,
    pub username: String,
    pub email: String,
    #[serde(skip_serializing, default)]
    pub password_hash: String,
    pub role: Role,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    #[serde(skip)]
    pub deleted_at: Option<DateTime<Utc>>,
}

impl User {
    /// 비밀 자료를 제거한 사본.
    #[must_use]
    pub fn sanitized(mut self) -> Self {
        self.password_hash.clear();
        self
    }
}

/// 새 사용자 입력 (저장소가 ID와 타임스탬프를 부여).
#[derive(Debug, Clone)]
pub struct NewUser {
    pub username: String,
    pub email: String,
    pub password_hash: String,
    pub role: Role,
}
