//! JWT 세션 토큰 처리.
//!
//! 토큰 상태: 발급 → 유효 → (만료 | 서명 불일치 | 클레임 불량).
//! 폐기(revocation) 상태는 없으며, 토큰은 자연 만료 전까지 무효화할 수 없습니다.

use chrono::{DateTime, Duration, Utc};
use jsonwebtoken::{
    decode, encode, errors::ErrorKind, Algorithm, DecodingKey, EncodingKey, Header, Validation,
};
use secrecy::{ExposeSecret, SecretString};
use serde::{Deserialize, Serialize};

use bookshelf_core::{Role, User, MAX_JWT_LIFETIME_MINUTES};

/// 서명 알고리즘. 검증 시 이 외의 알고리즘은 거부됩니다.
const SIGNING_ALGORITHM: Algorithm = Algorithm::HS256;

/// JWT 페이로드.
///
/// 서명만 되어 있고 암호화되지 않으므로 비밀 자료를 담지 않습니다.
/// 역할은 발급 시점의 값이며, 역할 변경은 다음 발급부터 반영됩니다.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Claims {
    /// 사용자 ID
    pub user_id: i64,
    /// 사용자 이름
    pub username: String,
    /// 이메일
    pub email: String,
    /// 사용자 역할
    pub role: Role,
    /// Issued At (Unix timestamp)
    pub iat: i64,
    /// Not Before (Unix timestamp)
    pub nbf: i64,
    /// Expiration (Unix timestamp)
    pub exp: i64,
    /// Subject - 사용자 이름
    pub sub: String,
}

impl Claims {
    /// 신원 필드와 발급 시각, 수명으로 Claims 생성.
    pub fn new(
        user_id: i64,
        username: impl Into<String>,
        email: impl Into<String>,
        role: Role,
        issued_at: DateTime<Utc>,
        lifetime: Duration,
    ) -> Self {
        let username = username.into();
        Self {
            user_id,
            sub: username.clone(),
            username,
            email: email.into(),
            role,
            iat: issued_at.timestamp(),
            nbf: issued_at.timestamp(),
            exp: (issued_at + lifetime).timestamp(),
        }
    }
}

/// 토큰 에러.
#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub enum TokenError {
    #[error("잘못된 토큰 형식")]
    Malformed,
    #[error("토큰 서명이 유효하지 않습니다")]
    BadSignature,
    #[error("토큰이 만료되었습니다")]
    Expired,
    #[error("허용되지 않는 서명 알고리즘")]
    WrongAlgorithm,
    #[error("토큰 클레임이 유효하지 않습니다")]
    InvalidClaims,
    #[error("토큰 서명 실패: {0}")]
    Signing(String),
    #[error("토큰 수명이 허용 범위를 벗어났습니다: {0}분")]
    InvalidLifetime(i64),
}

impl From<jsonwebtoken::errors::Error> for TokenError {
    fn from(err: jsonwebtoken::errors::Error) -> Self {
        match err.kind() {
            ErrorKind::ExpiredSignature => TokenError::Expired,
            ErrorKind::InvalidSignature => TokenError::BadSignature,
            ErrorKind::InvalidAlgorithm | ErrorKind::InvalidAlgorithmName => {
                TokenError::WrongAlgorithm
            }
            ErrorKind::ImmatureSignature
            | ErrorKind::MissingRequiredClaim(_)
            | ErrorKind::InvalidSubject => TokenError::InvalidClaims,
            _ => TokenError::Malformed,
        }
    }
}

/// 토큰 발급/검증/갱신 관리자.
///
/// 대칭 비밀 키와 프로세스 전역 토큰 수명을 보관합니다.
#[derive(Clone)]
pub struct JwtManager {
    secret: SecretString,
    lifetime: Duration,
}

impl std::fmt::Debug for JwtManager {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("JwtManager")
            .field("lifetime_minutes", &self.lifetime.num_minutes())
            .finish_non_exhaustive()
    }
}

impl JwtManager {
    /// # Arguments
    ///
    /// * `secret` - HMAC 비밀 키
    /// * `expires_in_minutes` - 토큰 수명 (분), `1..=MAX_JWT_LIFETIME_MINUTES`
    ///
    /// # Errors
    /// 수명이 범위를 벗어나면 [`TokenError::InvalidLifetime`].
    pub fn new(secret: impl Into<String>, expires_in_minutes: i64) -> Result<Self, TokenError> {
        if !(1..=MAX_JWT_LIFETIME_MINUTES).contains(&expires_in_minutes) {
            return Err(TokenError::InvalidLifetime(expires_in_minutes));
        }
        let lifetime = Duration::try_minutes(expires_in_minutes)
            .ok_or(TokenError::InvalidLifetime(expires_in_minutes))?;

        Ok(Self {
            secret: SecretString::from(secret.into()),
            lifetime,
        })
    }

    /// 토큰 수명.
    pub fn lifetime(&self) -> Duration {
        self.lifetime
    }

    /// 사용자의 현재 신원/역할로 토큰 발급.
    pub fn issue(&self, user: &User) -> Result<String, TokenError> {
        self.issue_at(user, Utc::now())
    }

    /// 지정한 발급 시각으로 토큰 발급.
    pub fn issue_at(&self, user: &User, issued_at: DateTime<Utc>) -> Result<String, TokenError> {
        let claims = Claims::new(
            user.id,
            &user.username,
            &user.email,
            user.role,
            issued_at,
            self.lifetime,
        );
        self.sign(&claims)
    }

    /// 토큰 파싱 및 검증.
    ///
    /// 순서: 알고리즘 확인 → 서명 검증 → 만료/nbf 확인.
    pub fn validate(&self, token: &str) -> Result<Claims, TokenError> {
        let mut validation = Validation::new(SIGNING_ALGORITHM);
        validation.leeway = 0;
        validation.validate_exp = true;
        validation.validate_nbf = true;
        validation.set_required_spec_claims(&["exp", "iat", "nbf", "sub"]);

        let data = decode::<Claims>(
            token,
            &DecodingKey::from_secret(self.secret.expose_secret().as_bytes()),
            &validation,
        )?;

        Ok(data.claims)
    }

    /// 유효한 토큰으로 만료 기간이 연장된 새 토큰 발급.
    ///
    /// 새 `exp`는 항상 원래 토큰의 `exp`보다 뒤입니다. 클레임이 초 단위이므로
    /// 같은 초 안의 갱신은 원래 `exp` + 1초가 됩니다.
    ///
    /// 저장소를 다시 조회하지 않습니다. 삭제되었거나 강등된 사용자의 토큰도
    /// 유효한 동안에는 갱신됩니다.
    pub fn refresh(&self, token: &str) -> Result<String, TokenError> {
        let claims = self.validate(token)?;
        let mut renewed = Claims::new(
            claims.user_id,
            claims.username,
            claims.email,
            claims.role,
            Utc::now(),
            self.lifetime,
        );
        renewed.exp = renewed.exp.max(claims.exp + 1);
        self.sign(&renewed)
    }

    fn sign(&self, claims: &Claims) -> Result<String, TokenError> {
        encode(
            &Header::new(SIGNING_ALGORITHM),
            claims,
            &EncodingKey::from_secret(self.secret.expose_secret().as_bytes()),
        )
        .map_err(|e| TokenError::Signing(e.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const TEST_SECRET: &str = "test-secret-key-for-jwt-testing-minimum-32-chars";

    fn test_user(role: Role) -> User {
        let now = Utc::now();
        User {
            id: 42,
            username: "alice".to_string(),
            email: "alice@x.com".to_string(),
            password_hash: String::new(),
            role,
            created_at: now,
            updated_at: now,
            deleted_at: None,
        }
    }

    fn manager() -> JwtManager {
        JwtManager::new(TEST_SECRET, 60).unwrap()
    }

    #[test]
    fn test_issue_and_validate() {
        let jwt = manager();
        let user = test_user(Role::Admin);

        let token = jwt.issue(&user).unwrap();
        let claims = jwt.validate(&token).unwrap();

        assert_eq!(claims.user_id, 42);
        assert_eq!(claims.username, "alice");
        assert_eq!(claims.email, "alice@x.com");
        assert_eq!(claims.role, Role::Admin);
        assert_eq!(claims.sub, "alice");
        assert_eq!(claims.iat, claims.nbf);
        assert_eq!(claims.exp - claims.iat, 60 * 60);
    }

    #[test]
    fn test_expired_token_rejected() {
        let jwt = manager();
        let token = jwt
            .issue_at(&test_user(Role::User), Utc::now() - Duration::hours(2))
            .unwrap();

        assert_eq!(jwt.validate(&token), Err(TokenError::Expired));
    }

    #[test]
    fn test_wrong_secret_rejected() {
        let token = manager().issue(&test_user(Role::User)).unwrap();
        let other = JwtManager::new("wrong-secret-key-for-testing-minimum-32-chars", 60).unwrap();

        assert_eq!(other.validate(&token), Err(TokenError::BadSignature));
    }

    #[test]
    fn test_tampered_payload_rejected() {
        let jwt = manager();
        let token = jwt.issue(&test_user(Role::User)).unwrap();

        // 페이로드를 admin 역할로 바꿔치기
        let parts: Vec<&str> = token.split('.').collect();
        let forged_claims = Claims::new(
            42,
            "alice",
            "alice@x.com",
            Role::Admin,
            Utc::now(),
            Duration::minutes(60),
        );
        let forged_token = encode(
            &Header::new(Algorithm::HS256),
            &forged_claims,
            &EncodingKey::from_secret(b"attacker-key"),
        )
        .unwrap();
        let forged_payload = forged_token.split('.').nth(1).unwrap();
        let tampered = format!("{}.{}.{}", parts[0], forged_payload, parts[2]);

        assert_eq!(jwt.validate(&tampered), Err(TokenError::BadSignature));
    }

    #[test]
    fn test_other_algorithm_rejected() {
        let claims = Claims::new(
            42,
            "alice",
            "alice@x.com",
            Role::Admin,
            Utc::now(),
            Duration::minutes(60),
        );
        let token = encode(
            &Header::new(Algorithm::HS512),
            &claims,
            &EncodingKey::from_secret(TEST_SECRET.as_bytes()),
        )
        .unwrap();

        assert_eq!(manager().validate(&token), Err(TokenError::WrongAlgorithm));
    }

    #[test]
    fn test_garbage_token_rejected() {
        assert_eq!(
            manager().validate("invalid.token.here"),
            Err(TokenError::Malformed)
        );
        assert!(manager().validate("").is_err());
    }

    #[test]
    fn test_refresh_extends_expiry() {
        let jwt = manager();
        let user = test_user(Role::User);
        let original = jwt
            .issue_at(&user, Utc::now() - Duration::minutes(10))
            .unwrap();
        let original_claims = jwt.validate(&original).unwrap();

        let refreshed = jwt.refresh(&original).unwrap();
        let refreshed_claims = jwt.validate(&refreshed).unwrap();

        assert!(refreshed_claims.exp > original_claims.exp);
        assert_eq!(refreshed_claims.user_id, original_claims.user_id);
        assert_eq!(refreshed_claims.role, original_claims.role);
        assert_eq!(refreshed_claims.email, original_claims.email);
    }

    #[test]
    fn test_immediate_refresh_extends_expiry() {
        let jwt = manager();
        let original = jwt.issue(&test_user(Role::User)).unwrap();
        let original_claims = jwt.validate(&original).unwrap();

        let refreshed = jwt.refresh(&original).unwrap();
        let refreshed_claims = jwt.validate(&refreshed).unwrap();

        assert!(refreshed_claims.exp > original_claims.exp);
        assert!(refreshed_claims.exp > refreshed_claims.iat);
    }

    #[test]
    fn test_lifetime_out_of_range_rejected() {
        for minutes in [0, -5, MAX_JWT_LIFETIME_MINUTES + 1, i64::MAX] {
            assert_eq!(
                JwtManager::new(TEST_SECRET, minutes).unwrap_err(),
                TokenError::InvalidLifetime(minutes)
            );
        }
        let jwt = JwtManager::new(TEST_SECRET, MAX_JWT_LIFETIME_MINUTES).unwrap();
        assert_eq!(jwt.lifetime(), Duration::minutes(MAX_JWT_LIFETIME_MINUTES));
    }

    #[test]
    fn test_refresh_of_expired_token_fails() {
        let jwt = manager();
        let expired = jwt
            .issue_at(&test_user(Role::User), Utc::now() - Duration::days(1))
            .unwrap();

        assert_eq!(jwt.refresh(&expired), Err(TokenError::Expired));
    }

    #[test]
    fn test_debug_hides_secret() {
        let rendered = format!("{:?}", manager());
        assert!(!rendered.contains(TEST_SECRET));
    }
}
