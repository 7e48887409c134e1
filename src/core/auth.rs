//! Password hashing, password policy and session tokens.

use crate::{
    config::auth::AuthConfig,
    errors::{Error, Result},
};
use chrono::{DateTime, Duration, Utc};
use jsonwebtoken::{DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};
use tracing::{debug, error};

/// Characters accepted as the "special" class of the password policy.
pub const PASSWORD_SPECIAL_CHARS: &str = "!@#~$%^&*()+|_.,<>?/{}-";
/// Minimum password length
pub const MIN_PASSWORD_LENGTH: usize = 8;

/// Claims carried by a session token.
#[derive(Debug, Serialize, Deserialize)]
pub struct Claims {
    /// Account username
    pub sub: String,
    /// Expiration (Unix timestamp seconds)
    pub exp: i64,
    /// Issued at (Unix timestamp seconds)
    pub iat: i64,
}

/// A signed token with its expiry.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SessionToken {
    /// Bearer token
    pub token: String,
    /// Expiry as Unix seconds
    pub expiry: i64,
    /// Expiry as a timestamp
    pub expired_at: DateTime<Utc>,
}

/// Hashes a password into an Argon2 PHC string.
pub fn hash_password(password: &str) -> Result<String> {
    use argon2::password_hash::SaltString;
    use argon2::password_hash::rand_core::OsRng;
    use argon2::{Argon2, PasswordHasher};
    let salt = SaltString::generate(&mut OsRng);
    let hash = Argon2::default()
        .hash_password(password.as_bytes(), &salt)
        .map_err(|e| Error::unexpected(format!("password hashing failed: {e}")))?;
    Ok(hash.to_string())
}

/// Checks a password against a stored PHC string. A malformed hash never
/// verifies.
#[must_use]
pub fn verify_password(password: &str, hash: &str) -> bool {
    use argon2::{Argon2, PasswordHash, PasswordVerifier};
    let Ok(parsed) = PasswordHash::new(hash) else {
        return false;
    };
    Argon2::default()
        .verify_password(password.as_bytes(), &parsed)
        .is_ok()
}

/// Enforces the password policy: at least [`MIN_PASSWORD_LENGTH`] characters
/// with an uppercase letter, a lowercase letter, a digit and one of
/// [`PASSWORD_SPECIAL_CHARS`].
pub fn validate_password(password: &str) -> Result<()> {
    let long_enough = password.chars().count() >= MIN_PASSWORD_LENGTH;
    let has_upper = password.chars().any(|c| c.is_ascii_uppercase());
    let has_lower = password.chars().any(|c| c.is_ascii_lowercase());
    let has_digit = password.chars().any(|c| c.is_ascii_digit());
    let has_special = password.chars().any(|c| PASSWORD_SPECIAL_CHARS.contains(c));

    if long_enough && has_upper && has_lower && has_digit && has_special {
        Ok(())
    } else {
        error!("password does not meet the policy");
        Err(Error::validation(format!(
            "password must be at least {MIN_PASSWORD_LENGTH} characters with upper and lower case letters, a digit and a special character"
        )))
    }
}

/// Signs a session token for `username`.
pub fn issue_token(username: &str, config: &AuthConfig) -> Result<SessionToken> {
    let now = Utc::now();
    let expired_at = Duration::try_hours(config.expiry_hours)
        .filter(|lifetime| *lifetime > Duration::zero())
        .and_then(|lifetime| now.checked_add_signed(lifetime))
        .ok_or_else(|| Error::Config {
            message: format!("invalid token lifetime: {} hours", config.expiry_hours),
        })?;
    let claims = Claims {
        sub: username.to_string(),
        exp: expired_at.timestamp(),
        iat: now.timestamp(),
    };

    let token = jsonwebtoken::encode(
        &Header::default(),
        &claims,
        &EncodingKey::from_secret(config.jwt_secret.as_bytes()),
    )
    .map_err(|e| Error::unexpected(format!("token signing failed: {e}")))?;

    Ok(SessionToken {
        token,
        expiry: claims.exp,
        expired_at,
    })
}

/// Resolves an `Authorization` header value to the account username.
///
/// # Errors
/// `AccessDenied` if the header is missing, not a bearer token, or the token
/// fails verification.
pub fn authenticate(authorization: Option<&str>, config: &AuthConfig) -> Result<String> {
    let header = authorization
        .filter(|h| !h.is_empty())
        .ok_or_else(|| Error::access_denied("missing authorization header"))?;
    let token = header
        .strip_prefix("Bearer ")
        .filter(|t| !t.is_empty())
        .ok_or_else(|| Error::access_denied("invalid authorization format"))?;

    let token_data = jsonwebtoken::decode::<Claims>(
        token,
        &DecodingKey::from_secret(config.jwt_secret.as_bytes()),
        &Validation::default(),
    )
    .map_err(|e| {
        debug!("JWT validation failed: {e}");
        Error::access_denied("invalid token")
    })?;

    Ok(token_data.claims.sub)
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used)]
    use super::*;

    fn config() -> AuthConfig {
        AuthConfig::new("test-secret")
    }

    #[test]
    fn test_hash_and_verify() {
        let hash = hash_password("Garden#2024").unwrap();
        assert_ne!(hash, "Garden#2024");
        assert!(verify_password("Garden#2024", &hash));
        assert!(!verify_password("garden#2024", &hash));
        assert!(!verify_password("Garden#2024", "not-a-phc-string"));
    }

    #[test]
    fn test_password_policy() {
        assert!(validate_password("Garden#2024").is_ok());
        assert!(validate_password("Gard#24").is_err());
        assert!(validate_password("garden#2024").is_err());
        assert!(validate_password("GARDEN#2024").is_err());
        assert!(validate_password("Garden#abcd").is_err());
        assert!(validate_password("Garden12024").is_err());
    }

    #[test]
    fn test_token_roundtrip() {
        let token = issue_token("alice", &config()).unwrap();
        assert_eq!(token.expiry, token.expired_at.timestamp());

        let header = format!("Bearer {}", token.token);
        assert_eq!(authenticate(Some(&header), &config()).unwrap(), "alice");
    }

    #[test]
    fn test_issue_token_rejects_bad_lifetime() {
        for expiry_hours in [0, -5, i64::MAX] {
            let config = AuthConfig {
                expiry_hours,
                ..config()
            };
            assert!(matches!(
                issue_token("alice", &config),
                Err(Error::Config { .. })
            ));
        }
    }

    #[test]
    fn test_authenticate_rejections() {
        let token = issue_token("alice", &config()).unwrap();

        for header in [None, Some(""), Some("Bearer "), Some(token.token.as_str())] {
            assert!(matches!(
                authenticate(header, &config()),
                Err(Error::AccessDenied { .. })
            ));
        }

        let header = format!("Bearer {}", token.token);
        let other = AuthConfig::new("another-secret");
        assert!(matches!(
            authenticate(Some(&header), &other),
            Err(Error::AccessDenied { .. })
        ));
    }

    #[test]
    fn test_expired_token_rejected() {
        let now = Utc::now().timestamp();
        let claims = Claims {
            sub: "alice".to_string(),
            exp: now - 3_600,
            iat: now - 7_200,
        };
        let token = jsonwebtoken::encode(
            &Header::default(),
            &claims,
            &EncodingKey::from_secret(b"test-secret"),
        )
        .unwrap();

        let header = format!("Bearer {token}");
        assert!(matches!(
            authenticate(Some(&header), &config()),
            Err(Error::AccessDenied { .. })
        ));
    }
}
