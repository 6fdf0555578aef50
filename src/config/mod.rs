use std::env;

use anyhow::{bail, Context, Result};

/// Process configuration, loaded once at startup from the environment.
///
/// A missing required variable aborts startup before the listener binds;
/// per-request failures are handled separately in the error layer.
#[derive(Debug, Clone)]
pub struct AppConfig {
    pub database_url: String,
    pub security: SecurityConfig,
    pub storage: StorageConfig,
    pub port: u16,
}

#[derive(Debug, Clone)]
pub struct SecurityConfig {
    /// HS256 signing secret for access tokens.
    pub secret_key: String,
    /// Access token lifetime in minutes.
    pub token_expiry_mins: i64,
}

#[derive(Debug, Clone)]
pub struct StorageConfig {
    /// S3-compatible endpoint as host:port, e.g. "minio:9000".
    pub endpoint: String,
    pub access_key: String,
    pub secret_key: String,
    pub bucket: String,
    /// Lifetime of presigned GET URLs in seconds.
    pub presign_expiry_secs: u64,
}

impl AppConfig {
    pub fn from_env() -> Result<Self> {
        let database_url = required("DATABASE_URL")?;

        let secret_key = required("SECRET_KEY")?;
        if secret_key.trim().is_empty() {
            bail!("SECRET_KEY must not be empty");
        }

        let token_expiry_mins = optional_parse("TOKEN_EXPIRE_MINUTES", 30)?;
        let presign_expiry_secs = optional_parse("PRESIGN_EXPIRE_SECONDS", 3600)?;
        let port = optional_parse("PORT", 3000)?;

        Ok(Self {
            database_url,
            security: SecurityConfig {
                secret_key,
                token_expiry_mins,
            },
            storage: StorageConfig {
                endpoint: required("MINIO_ENDPOINT")?,
                access_key: required("MINIO_ROOT_USER")?,
                secret_key: required("MINIO_ROOT_PASSWORD")?,
                bucket: required("MINIO_BUCKET_NAME")?,
                presign_expiry_secs,
            },
            port,
        })
    }
}

fn required(name: &'static str) -> Result<String> {
    env::var(name).with_context(|| format!("{} environment variable is not set", name))
}

fn optional_parse<T: std::str::FromStr>(name: &'static str, default: T) -> Result<T>
where
    T::Err: std::error::Error + Send + Sync + 'static,
{
    match env::var(name) {
        Ok(raw) => raw
            .parse()
            .with_context(|| format!("{} is not a valid value", name)),
        Err(_) => Ok(default),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn optional_parse_falls_back_to_default() {
        let value: i64 = optional_parse("GALLERY_API_TEST_UNSET_VAR", 30).unwrap();
        assert_eq!(value, 30);
    }
}
