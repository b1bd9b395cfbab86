//! # Bookshelf Core
//!
//! 도서 재고 서비스의 핵심 도메인 모델 및 공통 인프라를 제공합니다.
//!
//! - 사용자 / 역할 / 도서 도메인 타입
//! - 페이지네이션 규칙
//! - 설정 관리
//! - 로깅 인프라

pub mod config;
pub mod domain;
pub mod error;
pub mod logging;

pub use config::*;
pub use domain::*;
pub use error::*;
pub use logging::*;
