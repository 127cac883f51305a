/*!
 * # Credentials
 *
 * Argon2 hashing for passwords and one-time login codes, plus code
 * generation. Verification goes through `PasswordVerifier`, which compares
 * digests in constant time. Argon2 is CPU bound, so the async entry points
 * run it on the blocking pool.
 */

use argon2::{
    password_hash::{rand_core::OsRng, PasswordHash, PasswordHasher, PasswordVerifier, SaltString},
    Argon2,
};
use rand::Rng;
use thiserror::Error;
use tokio::task;

/// Number of digits in an emailed login code
pub const LOGIN_CODE_DIGITS: usize = 6;

pub const MIN_PASSWORD_LENGTH: usize = 8;
pub const MAX_PASSWORD_LENGTH: usize = 128;

#[derive(Error, Debug)]
pub enum CredentialError {
    #[error("hashing failed: {0}")]
    Hash(String),

    #[error("password must be between {min} and {max} characters")]
    PasswordLength { min: usize, max: usize },
}

impl From<CredentialError> for crate::errors::ServiceError {
    fn from(err: CredentialError) -> Self {
        match err {
            CredentialError::Hash(msg) => crate::errors::ServiceError::HashError(msg),
            other => crate::errors::ServiceError::ValidationError(other.to_string()),
        }
    }
}

/// Hashes a password or login code into a PHC string
pub async fn hash_secret(secret: &str) -> Result<String, CredentialError> {
    let secret = secret.to_owned();
    task::spawn_blocking(move || hash_now(&secret))
        .await
        .map_err(|e| CredentialError::Hash(e.to_string()))?
}

/// Checks a secret against a stored PHC string. A malformed stored hash never verifies.
pub async fn verify_secret(secret: &str, stored_hash: &str) -> bool {
    let secret = secret.to_owned();
    let stored_hash = stored_hash.to_owned();
    task::spawn_blocking(move || verify_now(&secret, &stored_hash))
        .await
        .unwrap_or(false)
}

fn hash_now(secret: &str) -> Result<String, CredentialError> {
    let salt = SaltString::generate(&mut OsRng);
    Argon2::default()
        .hash_password(secret.as_bytes(), &salt)
        .map(|hash| hash.to_string())
        .map_err(|e| CredentialError::Hash(e.to_string()))
}

fn verify_now(secret: &str, stored_hash: &str) -> bool {
    match PasswordHash::new(stored_hash) {
        Ok(parsed) => Argon2::default()
            .verify_password(secret.as_bytes(), &parsed)
            .is_ok(),
        Err(_) => false,
    }
}

pub fn check_password_policy(password: &str) -> Result<(), CredentialError> {
    let length = password.chars().count();
    if (MIN_PASSWORD_LENGTH..=MAX_PASSWORD_LENGTH).contains(&length) {
        Ok(())
    } else {
        Err(CredentialError::PasswordLength {
            min: MIN_PASSWORD_LENGTH,
            max: MAX_PASSWORD_LENGTH,
        })
    }
}

/// Random zero-padded numeric code
pub fn generate_login_code() -> String {
    let mut rng = rand::thread_rng();
    (0..LOGIN_CODE_DIGITS)
        .map(|_| char::from(b'0' + rng.gen_range(0..10u8)))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn hashed_secret_verifies_only_the_original() {
        let hash = hash_secret("correct horse").await.unwrap();
        assert_ne!(hash, "correct horse");
        assert!(verify_secret("correct horse", &hash).await);
        assert!(!verify_secret("wrong horse", &hash).await);
    }

    #[tokio::test]
    async fn same_secret_hashes_differently() {
        assert_ne!(
            hash_secret("abc12345").await.unwrap(),
            hash_secret("abc12345").await.unwrap()
        );
    }

    #[tokio::test]
    async fn malformed_hash_does_not_verify() {
        assert!(!verify_secret("anything", "plaintext-password").await);
    }

    #[tokio::test(flavor = "current_thread")]
    async fn hashing_runs_off_a_single_threaded_runtime() {
        let (first, second) = tokio::join!(hash_secret("abc12345"), hash_secret("xyz98765"));
        let (first, second) = (first.unwrap(), second.unwrap());
        assert!(verify_secret("abc12345", &first).await);
        assert!(verify_secret("xyz98765", &second).await);
        assert!(!verify_secret("abc12345", &second).await);
    }

    #[test]
    fn login_codes_are_six_digits() {
        for _ in 0..20 {
            let code = generate_login_code();
            assert_eq!(code.len(), LOGIN_CODE_DIGITS);
            assert!(code.chars().all(|c| c.is_ascii_digit()));
        }
    }

    #[test]
    fn password_policy_enforces_length() {
        assert!(check_password_policy("short").is_err());
        assert!(check_password_policy("long enough").is_ok());
    }
}
