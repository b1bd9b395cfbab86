//! 모든 핸들러에서 공유되는 애플리케이션 상태.
//!
//! Arc로 래핑되어 여러 요청 간에 공유됩니다. 요청 간 공유되는 가변 상태는 없으며,
//! 지속 상태는 모두 저장소에 있습니다.

use std::sync::Arc;

use crate::auth::{AuthService, JwtManager};
use crate::repository::{BookStore, Database, UserStore};
use crate::services::BookService;

/// 애플리케이션 공유 상태.
#[derive(Clone)]
pub struct AppState {
    /// 회원가입/로그인/사용자 관리
    pub auth: AuthService,

    /// 도서 관리
    pub books: BookService,

    /// 토큰 발급/검증
    pub jwt: JwtManager,

    /// 데이터베이스 (인메모리 저장소로 구동 시 None)
    pub db: Option<Database>,

    /// 서버 시작 시간
    pub started_at: chrono::DateTime<chrono::Utc>,

    /// API 버전
    pub version: String,
}

impl AppState {
    /// 저장소와 토큰 관리자를 주입하여 AppState 생성.
    pub fn new(users: Arc<dyn UserStore>, books: Arc<dyn BookStore>, jwt: JwtManager) -> Self {
        Self {
            auth: AuthService::new(users),
            books: BookService::new(books),
            jwt,
            db: None,
            started_at: chrono::Utc::now(),
            version: env!("CARGO_PKG_VERSION").to_string(),
        }
    }

    /// 데이터베이스 핸들 설정 (헬스 체크용).
    pub fn with_database(mut self, db: Database) -> Self {
        self.db = Some(db);
        self
    }

    /// 서버 업타임 (초).
    pub fn uptime_secs(&self) -> i64 {
        chrono::Utc::now()
            .signed_duration_since(self.started_at)
            .num_seconds()
    }

    /// 데이터베이스 연결 상태 확인. 미설정이면 None.
    pub async fn is_db_healthy(&self) -> Option<bool> {
        match &self.db {
            Some(db) => Some(db.health_check().await),
            None => None,
        }
    }
}

/// 테스트용 JWT 비밀 키.
#[cfg(any(test, feature = "test-utils"))]
pub const TEST_JWT_SECRET: &str = "test-secret-key-for-jwt-testing-minimum-32-chars";

/// 테스트용 AppState 생성 헬퍼.
///
/// 실제 DB 연결 없이 인메모리 저장소로 구동합니다.
#[cfg(any(test, feature = "test-utils"))]
pub fn create_test_state() -> AppState {
    use crate::repository::{MemoryBookStore, MemoryUserStore};

    AppState::new(
        Arc::new(MemoryUserStore::new()),
        Arc::new(MemoryBookStore::new()),
        JwtManager::new(TEST_JWT_SECRET, 60).expect("60분 수명은 허용 범위 안"),
    )
}
