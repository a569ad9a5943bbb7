//! HS256 token issuing and validation.
//!
//! Expiry is checked by [`validate_claims`] rather than by `jsonwebtoken`
//! itself, since the claims carry RFC 3339 timestamps instead of numeric `exp`.

use chrono::{DateTime, TimeDelta, Utc};
use jsonwebtoken::{Algorithm, DecodingKey, EncodingKey, Header, Validation, decode, encode};
use thiserror::Error;

use stockroom_core::{CompanyId, UserId};

use crate::claims::{JwtClaims, TokenValidationError, validate_claims};
use crate::Role;

#[derive(Debug, Error)]
pub enum JwtError {
    #[error("jwt secret cannot be empty")]
    EmptySecret,

    #[error("malformed or badly signed token: {0}")]
    Invalid(#[from] jsonwebtoken::errors::Error),

    #[error(transparent)]
    Claims(#[from] TokenValidationError),
}

/// Validates a raw bearer token into claims.
pub trait JwtValidator: Send + Sync {
    fn validate(&self, token: &str, now: DateTime<Utc>) -> Result<JwtClaims, JwtError>;
}

/// Symmetric (HS256) signer/validator.
#[derive(Clone)]
pub struct Hs256Jwt {
    encoding: EncodingKey,
    decoding: DecodingKey,
    ttl: TimeDelta,
}

impl core::fmt::Debug for Hs256Jwt {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("Hs256Jwt").field("ttl", &self.ttl).finish_non_exhaustive()
    }
}

impl Hs256Jwt {
    pub fn new(secret: &str, ttl_minutes: i64) -> Result<Self, JwtError> {
        if secret.is_empty() {
            return Err(JwtError::EmptySecret);
        }
        Ok(Self {
            encoding: EncodingKey::from_secret(secret.as_bytes()),
            decoding: DecodingKey::from_secret(secret.as_bytes()),
            ttl: TimeDelta::minutes(ttl_minutes.max(1)),
        })
    }

    /// Mint a token for `user_id` within `company_id`.
    pub fn issue(
        &self,
        user_id: UserId,
        company_id: CompanyId,
        roles: Vec<Role>,
        now: DateTime<Utc>,
    ) -> Result<(String, JwtClaims), JwtError> {
        let claims = JwtClaims {
            sub: user_id,
            company_id,
            roles,
            issued_at: now,
            expires_at: now + self.ttl,
        };
        let token = encode(&Header::new(Algorithm::HS256), &claims, &self.encoding)?;
        Ok((token, claims))
    }
}

impl JwtValidator for Hs256Jwt {
    fn validate(&self, token: &str, now: DateTime<Utc>) -> Result<JwtClaims, JwtError> {
        let mut validation = Validation::new(Algorithm::HS256);
        validation.validate_exp = false;
        validation.required_spec_claims.clear();

        let data = decode::<JwtClaims>(token, &self.decoding, &validation)?;
        validate_claims(&data.claims, now)?;
        Ok(data.claims)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn issued_tokens_validate() {
        let jwt = Hs256Jwt::new("dev-secret", 60).unwrap();
        let now = Utc::now();
        let (token, claims) = jwt
            .issue(UserId::new(), CompanyId::new(), vec![Role::admin()], now)
            .unwrap();

        let decoded = jwt.validate(&token, now + TimeDelta::minutes(1)).unwrap();
        assert_eq!(decoded.sub, claims.sub);
        assert_eq!(decoded.company_id, claims.company_id);
        assert_eq!(decoded.roles, vec![Role::admin()]);
    }

    #[test]
    fn expired_tokens_are_rejected() {
        let jwt = Hs256Jwt::new("dev-secret", 5).unwrap();
        let now = Utc::now();
        let (token, _) = jwt
            .issue(UserId::new(), CompanyId::new(), vec![Role::operator()], now)
            .unwrap();

        let err = jwt.validate(&token, now + TimeDelta::minutes(6)).unwrap_err();
        assert!(matches!(err, JwtError::Claims(TokenValidationError::Expired)));
    }

    #[test]
    fn wrong_secret_is_rejected() {
        let issuer = Hs256Jwt::new("one", 5).unwrap();
        let other = Hs256Jwt::new("two", 5).unwrap();
        let now = Utc::now();
        let (token, _) = issuer
            .issue(UserId::new(), CompanyId::new(), vec![], now)
            .unwrap();

        assert!(matches!(other.validate(&token, now), Err(JwtError::Invalid(_))));
        assert!(matches!(other.validate("not.a.token", now), Err(JwtError::Invalid(_))));
    }

    #[test]
    fn empty_secret_is_refused() {
        assert!(matches!(Hs256Jwt::new("", 5), Err(JwtError::EmptySecret)));
    }
}
