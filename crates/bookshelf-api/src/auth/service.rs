//! 인증 서비스.
//!
//! 회원가입, 로그인, 비밀번호 변경과 관리자용 사용자 관리를 담당합니다.

use std::sync::Arc;

use tracing::{debug, info, warn};

use bookshelf_core::{NewUser, Role, User};

use super::password::{hash_password, validate_password_strength, verify_password, PasswordError};
use crate::repository::{StoreError, UserStore};

/// 사용자 이름 최소 길이 (trim 후, 문자 수).
pub const USERNAME_MIN_LEN: usize = 3;
/// 사용자 이름 최대 길이 (trim 후, 문자 수).
pub const USERNAME_MAX_LEN: usize = 50;

/// 인증 서비스 에러.
#[derive(Debug, thiserror::Error)]
pub enum AuthError {
    #[error("{0} is required")]
    EmptyField(&'static str),

    #[error("username must be between 3 and 50 characters")]
    InvalidUsername,

    #[error("{0}")]
    WeakPassword(PasswordError),

    #[error("username already exists")]
    UsernameTaken,

    #[error("email already exists")]
    EmailTaken,

    /// 사용자 부재와 비밀번호 불일치를 구분하지 않습니다.
    #[error("invalid credentials")]
    InvalidCredentials,

    #[error("user not found")]
    UserNotFound,

    /// 사전 확인 이후 저장소 유일 제약에 걸린 경우
    #[error("username or email already exists")]
    Conflict,

    #[error("password hashing failed")]
    Hashing(PasswordError),

    #[error(transparent)]
    Store(StoreError),
}

impl From<StoreError> for AuthError {
    fn from(err: StoreError) -> Self {
        match err {
            StoreError::Conflict(constraint) => {
                warn!(constraint = %constraint, "사용자 생성 중 유일 제약 충돌");
                AuthError::Conflict
            }
            other => AuthError::Store(other),
        }
    }
}

impl From<PasswordError> for AuthError {
    fn from(err: PasswordError) -> Self {
        if err.is_weak() {
            AuthError::WeakPassword(err)
        } else {
            AuthError::Hashing(err)
        }
    }
}

/// 인증 서비스.
#[derive(Clone)]
pub struct AuthService {
    users: Arc<dyn UserStore>,
}

impl AuthService {
    pub fn new(users: Arc<dyn UserStore>) -> Self {
        Self { users }
    }

    /// 회원가입.
    ///
    /// username은 trim, email은 trim + 소문자 변환 후 저장합니다.
    /// 반환되는 레코드에는 해시가 포함되어 있으므로 외부 노출 전 제거해야 합니다.
    pub async fn register(
        &self,
        username: &str,
        email: &str,
        password: &str,
    ) -> Result<User, AuthError> {
        let username = username.trim();
        let email = email.trim().to_lowercase();

        if username.is_empty() {
            return Err(AuthError::EmptyField("username"));
        }
        if !(USERNAME_MIN_LEN..=USERNAME_MAX_LEN).contains(&username.chars().count()) {
            return Err(AuthError::InvalidUsername);
        }
        if email.is_empty() {
            return Err(AuthError::EmptyField("email"));
        }
        validate_password_strength(password)?;

        if self.users.exists_by_username(username).await? {
            debug!(username = %username, "이미 사용 중인 사용자 이름");
            return Err(AuthError::UsernameTaken);
        }
        if self.users.exists_by_email(&email).await? {
            debug!("이미 사용 중인 이메일");
            return Err(AuthError::EmailTaken);
        }

        let password_hash = hash_password(password)?;

        let user = self
            .users
            .create(NewUser {
                username: username.to_string(),
                email,
                password_hash,
                role: Role::User,
            })
            .await?;

        info!(user_id = user.id, username = %user.username, "사용자 등록 완료");
        Ok(user)
    }

    /// 로그인.
    ///
    /// `@`가 포함되면 이메일, 아니면 사용자 이름으로 조회합니다.
    pub async fn login(&self, username_or_email: &str, password: &str) -> Result<User, AuthError> {
        let identifier = username_or_email.trim();
        if identifier.is_empty() {
            return Err(AuthError::EmptyField("username or email"));
        }
        if password.trim().is_empty() {
            return Err(AuthError::EmptyField("password"));
        }

        let found = if identifier.contains('@') {
            self.users.find_by_email(&identifier.to_lowercase()).await?
        } else {
            self.users.find_by_username(identifier).await?
        };

        let Some(user) = found else {
            warn!("로그인 실패: 사용자 없음");
            return Err(AuthError::InvalidCredentials);
        };

        if verify_password(password, &user.password_hash).is_err() {
            warn!(user_id = user.id, "로그인 실패: 비밀번호 불일치");
            return Err(AuthError::InvalidCredentials);
        }

        info!(user_id = user.id, "로그인 성공");
        Ok(user.sanitized())
    }

    /// 비밀번호 변경.
    pub async fn change_password(
        &self,
        user_id: i64,
        _current_password: &str,
        new_password: &str,
    ) -> Result<(), AuthError> {
        validate_password_strength(new_password)?;
        let password_hash = hash_password(new_password)?;

        // NOTE: 현재 비밀번호를 검증하지 않고 덮어씁니다. 유효한 토큰만 있으면
        // 비밀번호를 바꿀 수 있는 알려진 보안 결함입니다.
        if !self.users.update_password(user_id, &password_hash).await? {
            return Err(AuthError::UserNotFound);
        }

        info!(user_id, "비밀번호 변경 완료");
        Ok(())
    }

    /// ID로 사용자 조회 (해시 제거).
    pub async fn get_user(&self, id: i64) -> Result<User, AuthError> {
        self.users
            .find_by_id(id)
            .await?
            .map(User::sanitized)
            .ok_or(AuthError::UserNotFound)
    }

    /// 전체 사용자 목록 (해시 제거).
    pub async fn list_users(&self) -> Result<Vec<User>, AuthError> {
        let users = self.users.list().await?;
        Ok(users.into_iter().map(User::sanitized).collect())
    }

    /// 사용자 역할 변경.
    ///
    /// 이미 발급된 토큰에는 반영되지 않으며 다음 발급부터 적용됩니다.
    pub async fn update_role(&self, id: i64, role: Role) -> Result<(), AuthError> {
        if !self.users.update_role(id, role).await? {
            return Err(AuthError::UserNotFound);
        }

        info!(user_id = id, role = %role, "사용자 역할 변경");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::repository::MemoryUserStore;

    fn service() -> AuthService {
        AuthService::new(Arc::new(MemoryUserStore::new()))
    }

    #[tokio::test]
    async fn test_register_normalizes_and_defaults_role() {
        let auth = service();
        let user = auth
            .register("  alice ", " Alice@X.com ", "secret1")
            .await
            .unwrap();

        assert_eq!(user.username, "alice");
        assert_eq!(user.email, "alice@x.com");
        assert_eq!(user.role, Role::User);
        assert!(user.password_hash.starts_with("$argon2"));
    }

    #[tokio::test]
    async fn test_register_rejects_empty_fields_and_weak_password() {
        let auth = service();

        assert!(matches!(
            auth.register("   ", "a@x.com", "secret1").await,
            Err(AuthError::EmptyField("username"))
        ));
        assert!(matches!(
            auth.register("alice", "", "secret1").await,
            Err(AuthError::EmptyField("email"))
        ));
        assert!(matches!(
            auth.register("  ab ", "ab@x.com", "secret1").await,
            Err(AuthError::InvalidUsername)
        ));
        assert!(matches!(
            auth.register(&format!(" {} ", "a".repeat(51)), "long@x.com", "secret1").await,
            Err(AuthError::InvalidUsername)
        ));
        assert!(matches!(
            auth.register("alice", "a@x.com", "12345").await,
            Err(AuthError::WeakPassword(PasswordError::TooShort))
        ));
        assert!(matches!(
            auth.register("alice", "a@x.com", &"p".repeat(101)).await,
            Err(AuthError::WeakPassword(PasswordError::TooLong))
        ));
    }

    #[tokio::test]
    async fn test_register_duplicate_username_and_email() {
        let auth = service();
        auth.register("alice", "alice@x.com", "secret1").await.unwrap();

        assert!(matches!(
            auth.register("alice", "other@x.com", "secret1").await,
            Err(AuthError::UsernameTaken)
        ));
        assert!(matches!(
            auth.register("bob", "ALICE@x.com", "secret1").await,
            Err(AuthError::EmailTaken)
        ));
    }

    #[tokio::test]
    async fn test_login_by_username_and_email() {
        let auth = service();
        auth.register("alice", "alice@x.com", "secret1").await.unwrap();

        let by_name = auth.login("alice", "secret1").await.unwrap();
        assert!(by_name.password_hash.is_empty());

        let by_email = auth.login("Alice@X.com", "secret1").await.unwrap();
        assert_eq!(by_email.id, by_name.id);
    }

    #[tokio::test]
    async fn test_login_failures_are_indistinguishable() {
        let auth = service();
        auth.register("alice", "alice@x.com", "secret1").await.unwrap();

        let wrong_password = auth.login("alice", "wrong-pass").await.unwrap_err();
        let unknown_user = auth.login("mallory", "secret1").await.unwrap_err();

        assert!(matches!(wrong_password, AuthError::InvalidCredentials));
        assert!(matches!(unknown_user, AuthError::InvalidCredentials));
        assert_eq!(wrong_password.to_string(), unknown_user.to_string());
    }

    #[tokio::test]
    async fn test_login_requires_fields() {
        let auth = service();
        assert!(matches!(
            auth.login(" ", "secret1").await,
            Err(AuthError::EmptyField(_))
        ));
        assert!(matches!(
            auth.login("alice", "").await,
            Err(AuthError::EmptyField("password"))
        ));
    }

    #[tokio::test]
    async fn test_change_password_does_not_check_current() {
        let auth = service();
        let user = auth.register("alice", "alice@x.com", "secret1").await.unwrap();

        auth.change_password(user.id, "not-the-current-one", "newsecret")
            .await
            .unwrap();

        assert!(auth.login("alice", "secret1").await.is_err());
        assert!(auth.login("alice", "newsecret").await.is_ok());
    }

    #[tokio::test]
    async fn test_change_password_validation_and_missing_user() {
        let auth = service();
        let user = auth.register("alice", "alice@x.com", "secret1").await.unwrap();

        assert!(matches!(
            auth.change_password(user.id, "secret1", "short").await,
            Err(AuthError::WeakPassword(_))
        ));
        assert!(matches!(
            auth.change_password(999, "secret1", "newsecret").await,
            Err(AuthError::UserNotFound)
        ));
    }

    #[tokio::test]
    async fn test_user_management() {
        let auth = service();
        let alice = auth.register("alice", "alice@x.com", "secret1").await.unwrap();
        auth.register("bob", "bob@x.com", "secret1").await.unwrap();

        let users = auth.list_users().await.unwrap();
        assert_eq!(users.len(), 2);
        assert!(users.iter().all(|u| u.password_hash.is_empty()));

        auth.update_role(alice.id, Role::Admin).await.unwrap();
        let fetched = auth.get_user(alice.id).await.unwrap();
        assert_eq!(fetched.role, Role::Admin);
        assert!(fetched.password_hash.is_empty());

        assert!(matches!(
            auth.update_role(999, Role::Admin).await,
            Err(AuthError::UserNotFound)
        ));
        assert!(matches!(
            auth.get_user(999).await,
            Err(AuthError::UserNotFound)
        ));
    }

    #[test]
    fn test_store_conflict_maps_to_conflict() {
        let err = AuthError::from(StoreError::Conflict("users_email_key".to_string()));
        assert!(matches!(err, AuthError::Conflict));
    }
}
