//! Token signing configuration loaded from environment variables.
//!
//! `JWT_SECRET` is required before tokens can be issued or verified.
//! `JWT_EXPIRY_HOURS` defaults to 24.

use crate::errors::{Error, Result};

const DEFAULT_EXPIRY_HOURS: i64 = 24;
/// Longest accepted token lifetime (one year)
pub const MAX_EXPIRY_HOURS: i64 = 24 * 365;

/// Settings used to sign and verify session tokens.
#[derive(Clone)]
pub struct AuthConfig {
    /// HMAC secret
    pub jwt_secret: String,
    /// Token lifetime in hours
    pub expiry_hours: i64,
}

impl std::fmt::Debug for AuthConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AuthConfig")
            .field("jwt_secret", &"<redacted>")
            .field("expiry_hours", &self.expiry_hours)
            .finish()
    }
}

impl AuthConfig {
    /// Creates a config from an explicit secret with the default lifetime.
    pub fn new(jwt_secret: impl Into<String>) -> Self {
        Self {
            jwt_secret: jwt_secret.into(),
            expiry_hours: DEFAULT_EXPIRY_HOURS,
        }
    }

    /// Reads `JWT_SECRET` and `JWT_EXPIRY_HOURS` from the environment.
    pub fn from_env() -> Result<Self> {
        let jwt_secret = std::env::var("JWT_SECRET").map_err(|e| Error::Config {
            message: format!("JWT_SECRET not set: {e}"),
        })?;
        if jwt_secret.is_empty() {
            return Err(Error::Config {
                message: "JWT_SECRET must not be empty".to_string(),
            });
        }

        let expiry_hours = match std::env::var("JWT_EXPIRY_HOURS") {
            Ok(raw) => parse_expiry_hours(&raw)?,
            Err(_) => DEFAULT_EXPIRY_HOURS,
        };

        Ok(Self {
            jwt_secret,
            expiry_hours,
        })
    }
}

/// Parses `JWT_EXPIRY_HOURS`, accepting 1 to [`MAX_EXPIRY_HOURS`].
fn parse_expiry_hours(raw: &str) -> Result<i64> {
    let hours = raw.trim().parse::<i64>().map_err(|e| Error::Config {
        message: format!("JWT_EXPIRY_HOURS is not a number: {e}"),
    })?;
    if !(1..=MAX_EXPIRY_HOURS).contains(&hours) {
        return Err(Error::Config {
            message: format!("JWT_EXPIRY_HOURS must be between 1 and {MAX_EXPIRY_HOURS}, got {hours}"),
        });
    }
    Ok(hours)
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used)]
    use super::*;

    #[test]
    fn test_debug_redacts_secret() {
        let config = AuthConfig::new("super-secret");
        let rendered = format!("{config:?}");
        assert!(!rendered.contains("super-secret"));
        assert!(rendered.contains("24"));
    }

    #[test]
    fn test_expiry_hours_bounds() {
        assert_eq!(parse_expiry_hours("24").unwrap(), 24);
        assert_eq!(parse_expiry_hours(" 1 ").unwrap(), 1);
        assert_eq!(parse_expiry_hours("8760").unwrap(), MAX_EXPIRY_HOURS);

        for raw in ["0", "-5", "8761", "9223372036854775807", "soon"] {
            assert!(
                matches!(parse_expiry_hours(raw), Err(Error::Config { .. })),
                "expected rejection for {raw}"
            );
        }
    }
}
