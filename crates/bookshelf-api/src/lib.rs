//! 도서 재고 REST API 서버.
//!
//! # 모듈 구성
//!
//! - [`auth`]: 비밀번호 해싱, JWT 토큰, 인증 서비스, 접근 제어 미들웨어
//! - [`repository`]: 사용자/도서 저장소 (PostgreSQL, 인메모리)
//! - [`services`]: 도서 서비스
//! - [`routes`]: REST API 엔드포인트
//! - [`state`]: 애플리케이션 공유 상태 (AppState)
//! - [`error`]: API 에러 응답

pub mod auth;
pub mod error;
pub mod repository;
pub mod routes;
pub mod services;
pub mod state;

pub use auth::{AuthError, AuthService, AuthUser, Claims, JwtManager, PasswordError, TokenError};
pub use error::{ApiError, ApiErrorResponse, ApiResult};
pub use repository::{BookStore, Database, PgBookStore, PgUserStore, StoreError, UserStore};
pub use routes::{create_router, log_routes};
pub use services::{BookError, BookService};
pub use state::AppState;

#[cfg(any(test, feature = "test-utils"))]
pub use state::create_test_state;
