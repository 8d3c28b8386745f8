//! HS256 session tokens.

use chrono::{Duration, Utc};
use jsonwebtoken::{decode, encode, Algorithm, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::errors::AuthError;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Claims {
    /// user id
    pub sub: String,
    pub email: String,
    pub iat: usize,
    pub exp: usize,
}

impl Claims {
    pub fn user_id(&self) -> Result<Uuid, AuthError> {
        Uuid::parse_str(&self.sub).map_err(|_| AuthError::TokenError("subject is not a user id".into()))
    }
}

pub fn issue(secret: &str, user_id: Uuid, email: &str, ttl_hours: i64) -> Result<String, AuthError> {
    let now = Utc::now();
    let exp = Duration::try_hours(ttl_hours)
        .and_then(|ttl| now.checked_add_signed(ttl))
        .ok_or_else(|| AuthError::TokenError(format!("token lifetime of {ttl_hours}h is out of range")))?;
    let claims = Claims {
        sub: user_id.to_string(),
        email: email.to_string(),
        iat: now.timestamp() as usize,
        exp: exp.timestamp() as usize,
    };
    encode(&Header::default(), &claims, &EncodingKey::from_secret(secret.as_bytes()))
        .map_err(|e| AuthError::TokenError(e.to_string()))
}

/// Check signature and expiry; returns the claims on success.
pub fn verify(secret: &str, token: &str) -> Result<Claims, AuthError> {
    let mut validation = Validation::new(Algorithm::HS256);
    validation.validate_exp = true;
    decode::<Claims>(token, &DecodingKey::from_secret(secret.as_bytes()), &validation)
        .map(|data| data.claims)
        .map_err(|e| AuthError::TokenError(e.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn issued_token_verifies_with_same_secret() {
        let uid = Uuid::new_v4();
        let t = issue("s3cret", uid, "a@b.io", 1).unwrap();
        let claims = verify("s3cret", &t).unwrap();
        assert_eq!(claims.user_id().unwrap(), uid);
        assert_eq!(claims.email, "a@b.io");
    }

    #[test]
    fn wrong_secret_is_rejected() {
        let t = issue("s3cret", Uuid::new_v4(), "a@b.io", 1).unwrap();
        assert!(matches!(verify("other", &t), Err(AuthError::TokenError(_))));
    }

    #[test]
    fn expired_token_is_rejected() {
        let t = issue("s3cret", Uuid::new_v4(), "a@b.io", -2).unwrap();
        assert!(verify("s3cret", &t).is_err());
    }

    #[test]
    fn out_of_range_lifetime_is_an_error() {
        assert!(matches!(issue("s3cret", Uuid::new_v4(), "a@b.io", i64::MAX), Err(AuthError::TokenError(_))));
    }

    #[test]
    fn garbage_is_rejected() {
        assert!(verify("s3cret", "not.a.jwt").is_err());
    }
}
