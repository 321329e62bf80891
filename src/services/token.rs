//! Bearer token issuing and validation (HS256).

use chrono::{Duration, Utc};
use jsonwebtoken::errors::ErrorKind;
use jsonwebtoken::{Algorithm, DecodingKey, EncodingKey, Header, Validation, decode, encode};
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::config::AuthConfig;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Claims {
    /// User ID
    pub sub: i32,
    pub role: String,
    /// Expiration timestamp (seconds)
    pub exp: i64,
    /// Issued-at timestamp (seconds)
    pub iat: i64,
}

#[derive(Error, Debug)]
pub enum TokenError {
    #[error("Token expired")]
    Expired,

    #[error("Invalid token")]
    Invalid,

    #[error("Token generation failed: {0}")]
    GenerationFailed(String),
}

/// Signs and validates the bearer tokens handed out at login.
#[derive(Clone)]
pub struct TokenService {
    encoding_key: EncodingKey,
    decoding_key: DecodingKey,
    expiry_minutes: i64,
}

impl TokenService {
    #[must_use]
    pub fn new(auth: &AuthConfig) -> Self {
        Self {
            encoding_key: EncodingKey::from_secret(auth.jwt_secret.as_bytes()),
            decoding_key: DecodingKey::from_secret(auth.jwt_secret.as_bytes()),
            expiry_minutes: auth.jwt_expiry_minutes,
        }
    }

    pub fn issue(&self, user_id: i32, role: &str) -> Result<String, TokenError> {
        let now = Utc::now();
        let expiration = now + Duration::minutes(self.expiry_minutes);

        let claims = Claims {
            sub: user_id,
            role: role.to_string(),
            exp: expiration.timestamp(),
            iat: now.timestamp(),
        };

        encode(&Header::default(), &claims, &self.encoding_key)
            .map_err(|e| TokenError::GenerationFailed(e.to_string()))
    }

    /// Expired and otherwise-invalid tokens are distinguished so the API can
    /// tell the client which one it was.
    pub fn validate(&self, token: &str) -> Result<Claims, TokenError> {
        let validation = Validation::new(Algorithm::HS256);

        let token_data =
            decode::<Claims>(token, &self.decoding_key, &validation).map_err(|e| {
                match e.kind() {
                    ErrorKind::ExpiredSignature => TokenError::Expired,
                    _ => TokenError::Invalid,
                }
            })?;

        Ok(token_data.claims)
    }

    #[must_use]
    pub fn extract_from_header(header: &str) -> Option<&str> {
        header.strip_prefix("Bearer ")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn service_with_expiry(minutes: i64) -> TokenService {
        TokenService::new(&AuthConfig {
            jwt_secret: "test-secret-at-least-16-chars".to_string(),
            jwt_expiry_minutes: minutes,
        })
    }

    #[test]
    fn test_issue_and_validate() {
        let service = service_with_expiry(60);
        let token = service.issue(42, "admin").unwrap();

        let claims = service.validate(&token).unwrap();
        assert_eq!(claims.sub, 42);
        assert_eq!(claims.role, "admin");
        assert!(claims.exp > claims.iat);
    }

    #[test]
    fn test_rejects_token_from_other_secret() {
        let service = service_with_expiry(60);
        let other = TokenService::new(&AuthConfig {
            jwt_secret: "a-completely-different-secret".to_string(),
            jwt_expiry_minutes: 60,
        });

        let token = other.issue(1, "employee").unwrap();
        assert!(matches!(service.validate(&token), Err(TokenError::Invalid)));
    }

    #[test]
    fn test_rejects_garbage() {
        let service = service_with_expiry(60);
        assert!(matches!(
            service.validate("not.a.token"),
            Err(TokenError::Invalid)
        ));
    }

    #[test]
    fn test_extract_from_header() {
        assert_eq!(
            TokenService::extract_from_header("Bearer abc.def.ghi"),
            Some("abc.def.ghi")
        );
        assert_eq!(TokenService::extract_from_header("Basic abc"), None);
    }
}
