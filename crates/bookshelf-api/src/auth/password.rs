//! 비밀번호 해싱 유틸리티.
//!
//! Argon2id 기반 해싱 및 검증. 솔트는 해시마다 새로 생성되며,
//! 검증 시 해시 비교는 상수 시간으로 수행됩니다.

use argon2::{
    password_hash::{rand_core::OsRng, PasswordHash, PasswordHasher, PasswordVerifier, SaltString},
    Argon2,
};

/// 비밀번호 최소 길이 (문자 수).
pub const MIN_PASSWORD_LEN: usize = 6;

/// 비밀번호 최대 길이 (문자 수).
pub const MAX_PASSWORD_LEN: usize = 100;

/// 비밀번호 처리 에러.
#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub enum PasswordError {
    #[error("password must be at least 6 characters long")]
    TooShort,
    #[error("password must be at most 100 characters long")]
    TooLong,
    #[error("비밀번호 해싱 실패")]
    HashingFailed,
    #[error("비밀번호 불일치")]
    Mismatch,
    #[error("잘못된 해시 형식")]
    InvalidHashFormat,
}

impl PasswordError {
    /// 정책 위반(약한 비밀번호) 여부.
    pub fn is_weak(&self) -> bool {
        matches!(self, PasswordError::TooShort | PasswordError::TooLong)
    }
}

/// 비밀번호 해싱.
///
/// 최소 길이에 못 미치면 해싱 전에 거부합니다.
///
/// # Returns
///
/// PHC 형식의 해시 문자열 (솔트 포함)
///
/// ```rust,ignore
/// let hash = hash_password("secret1").unwrap();
/// // "$argon2id$v=19$m=19456,t=2,p=1$..."
/// ```
pub fn hash_password(password: &str) -> Result<String, PasswordError> {
    if password.chars().count() < MIN_PASSWORD_LEN {
        return Err(PasswordError::TooShort);
    }

    let salt = SaltString::generate(&mut OsRng);
    let hash = Argon2::default()
        .hash_password(password.as_bytes(), &salt)
        .map_err(|_| PasswordError::HashingFailed)?;

    Ok(hash.to_string())
}

/// 비밀번호 검증.
///
/// 일치하면 Ok(()), 불일치하면 [`PasswordError::Mismatch`].
pub fn verify_password(password: &str, hash: &str) -> Result<(), PasswordError> {
    let parsed_hash = PasswordHash::new(hash).map_err(|_| PasswordError::InvalidHashFormat)?;

    Argon2::default()
        .verify_password(password.as_bytes(), &parsed_hash)
        .map_err(|_| PasswordError::Mismatch)
}

/// 비밀번호 강도 검증.
///
/// 길이 [6, 100] 만 검사합니다. 문자 종류 규칙은 없습니다.
pub fn validate_password_strength(password: &str) -> Result<(), PasswordError> {
    let len = password.chars().count();
    if len < MIN_PASSWORD_LEN {
        return Err(PasswordError::TooShort);
    }
    if len > MAX_PASSWORD_LEN {
        return Err(PasswordError::TooLong);
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn test_hash_and_verify_password() {
        let hash = hash_password("secret1").unwrap();

        assert!(hash.starts_with("$argon2id$"));
        assert!(verify_password("secret1", &hash).is_ok());
        assert_eq!(
            verify_password("secret2", &hash),
            Err(PasswordError::Mismatch)
        );
    }

    #[test]
    fn test_same_password_different_salts() {
        let hash1 = hash_password("Password1").unwrap();
        let hash2 = hash_password("Password1").unwrap();

        assert_ne!(hash1, hash2);
        assert!(verify_password("Password1", &hash1).is_ok());
        assert!(verify_password("Password1", &hash2).is_ok());
    }

    #[test]
    fn test_hash_rejects_short_password() {
        assert_eq!(hash_password("12345"), Err(PasswordError::TooShort));
        assert_eq!(hash_password(""), Err(PasswordError::TooShort));
    }

    #[test]
    fn test_invalid_hash_format() {
        let result = verify_password("password", "not-a-valid-hash");
        assert_eq!(result, Err(PasswordError::InvalidHashFormat));
    }

    #[test]
    fn test_strength_boundaries() {
        assert_eq!(validate_password_strength("abcde"), Err(PasswordError::TooShort));
        assert!(validate_password_strength("abcdef").is_ok());
        assert!(validate_password_strength(&"a".repeat(100)).is_ok());
        assert_eq!(
            validate_password_strength(&"a".repeat(101)),
            Err(PasswordError::TooLong)
        );
        // 문자 종류 규칙 없음
        assert!(validate_password_strength("aaaaaa").is_ok());
    }

    #[test]
    fn test_unicode_password_counts_characters() {
        // 6글자, 18바이트
        let password = "한글패스워드";
        assert!(validate_password_strength(password).is_ok());

        let hash = hash_password(password).unwrap();
        assert!(verify_password(password, &hash).is_ok());
    }

    #[test]
    fn test_weak_classification() {
        assert!(PasswordError::TooShort.is_weak());
        assert!(PasswordError::TooLong.is_weak());
        assert!(!PasswordError::Mismatch.is_weak());
    }

    proptest! {
        #[test]
        fn strength_window_holds(password in "\\PC{0,120}") {
            let len = password.chars().count();
            let result = validate_password_strength(&password);
            if (MIN_PASSWORD_LEN..=MAX_PASSWORD_LEN).contains(&len) {
                prop_assert!(result.is_ok());
            } else {
                prop_assert!(result.is_err());
            }
        }
    }
}
