//! 저장소 계층.
//!
//! 서비스는 [`UserStore`] / [`BookStore`] trait 객체에만 의존하며,
//! 구현체는 생성 시점에 주입됩니다.
//!
//! - PostgreSQL 구현: [`PgUserStore`], [`PgBookStore`]
//! - 인메모리 구현 (테스트 전용): [`MemoryUserStore`], [`MemoryBookStore`]
//!
//! 유일성 사전 확인은 원자적이지 않으므로, 경합 시에는 저장소의 유일 제약이
//! [`StoreError::Conflict`]로 보고됩니다.

pub mod books;
pub mod database;
#[cfg(any(test, feature = "test-utils"))]
pub mod memory;
pub mod users;

pub use books::{BookStore, PgBookStore};
pub use database::Database;
#[cfg(any(test, feature = "test-utils"))]
pub use memory::{MemoryBookStore, MemoryUserStore};
pub use users::{PgUserStore, UserStore};

/// 저장소 에러.
#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    /// 유일 제약 위반
    #[error("unique constraint violated: {0}")]
    Conflict(String),

    /// 저장된 데이터를 도메인 타입으로 변환할 수 없음
    #[error("invalid stored data: {0}")]
    InvalidData(String),

    /// 데이터베이스 에러
    #[error("database error: {0}")]
    Database(#[source] sqlx::Error),

    /// 마이그레이션 에러
    #[error("migration error: {0}")]
    Migration(String),
}

impl From<sqlx::Error> for StoreError {
    fn from(err: sqlx::Error) -> Self {
        if let sqlx::Error::Database(db_err) = &err {
            if db_err.is_unique_violation() {
                let constraint = db_err.constraint().unwrap_or("unique").to_string();
                return StoreError::Conflict(constraint);
            }
        }
        StoreError::Database(err)
    }
}

/// 저장소 Result 타입 별칭.
pub type StoreResult<T> = Result<T, StoreError>;
