//! 인증 및 인가 모듈.
//!
//! 비밀번호 해싱, JWT 토큰 처리, 인증 서비스, 접근 제어 미들웨어를 제공합니다.

pub mod jwt;
pub mod middleware;
pub mod password;
pub mod service;

pub use jwt::{Claims, JwtManager, TokenError};
pub use middleware::{require_admin, require_auth, AuthUser};
pub use password::{hash_password, validate_password_strength, verify_password, PasswordError};
pub use service::{AuthError, AuthService};
