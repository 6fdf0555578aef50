use anyhow::{Context, Result};
use argon2::{
    password_hash::{rand_core::OsRng, PasswordHash, PasswordHasher, PasswordVerifier, SaltString},
    Argon2,
};
use tokio::task;

/// Hash a password with Argon2id and a fresh random salt. Runs on the
/// blocking pool so request tasks are not stalled by the KDF.
pub async fn hash_password(password: String) -> Result<String> {
    task::spawn_blocking(move || {
        let salt = SaltString::generate(&mut OsRng);
        let hash = Argon2::default()
            .hash_password(password.as_bytes(), &salt)
            .map_err(|e| anyhow::anyhow!("Failed to hash password: {e}"))?;
        Ok::<String, anyhow::Error>(hash.to_string())
    })
    .await
    .context("Password hashing task panicked")?
}

/// Verify a password against a stored PHC-format hash.
pub async fn verify_password(password: String, stored_hash: String) -> Result<bool> {
    task::spawn_blocking(move || {
        let parsed = PasswordHash::new(&stored_hash)
            .map_err(|e| anyhow::anyhow!("Stored password hash is malformed: {e}"))?;
        Ok::<bool, anyhow::Error>(
            Argon2::default()
                .verify_password(password.as_bytes(), &parsed)
                .is_ok(),
        )
    })
    .await
    .context("Password verification task panicked")?
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn hash_and_verify_round_trip() -> Result<()> {
        let hash = hash_password("securepassword123".to_string()).await?;
        assert!(verify_password("securepassword123".to_string(), hash.clone()).await?);
        assert!(!verify_password("wrongpassword".to_string(), hash).await?);
        Ok(())
    }

    #[tokio::test]
    async fn hashes_are_salted() -> Result<()> {
        let first = hash_password("same-password".to_string()).await?;
        let second = hash_password("same-password".to_string()).await?;
        assert_ne!(first, second);
        Ok(())
    }

    #[tokio::test]
    async fn malformed_stored_hash_is_an_error() {
        let result = verify_password("anything".to_string(), "not-a-phc-hash".to_string()).await;
        assert!(result.is_err());
    }
}
