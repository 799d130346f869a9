// src/utils/jwt.rs

use jsonwebtoken::{DecodingKey, EncodingKey, Header, Validation, decode, encode};
use serde::{Deserialize, Serialize, de::DeserializeOwned};

use crate::error::AppError;

/// Session cookie claims.
///
/// There is no `exp`: a session lasts as long as the browser keeps the cookie.
#[derive(Debug, Deserialize, Serialize, Clone, PartialEq)]
pub struct Claims {
    /// Subject - Stores the User ID (as string).
    pub sub: String,
}

impl Claims {
    pub fn user_id(&self) -> Option<i64> {
        self.sub.parse().ok()
    }
}

/// One-shot flash message carried in its own signed cookie.
#[derive(Debug, Deserialize, Serialize, Clone, PartialEq)]
pub struct FlashClaims {
    pub msg: String,
}

fn validation() -> Validation {
    let mut validation = Validation::default();
    validation.required_spec_claims.clear();
    validation.validate_exp = false;
    validation
}

fn sign<T: Serialize>(claims: &T, secret: &str) -> Result<String, AppError> {
    Ok(encode(
        &Header::default(),
        claims,
        &EncodingKey::from_secret(secret.as_bytes()),
    )?)
}

fn verify<T: DeserializeOwned>(token: &str, secret: &str) -> Option<T> {
    decode::<T>(
        token,
        &DecodingKey::from_secret(secret.as_bytes()),
        &validation(),
    )
    .ok()
    .map(|data| data.claims)
}

/// Signs a session token identifying the user.
pub fn sign_session(user_id: i64, secret: &str) -> Result<String, AppError> {
    sign(
        &Claims {
            sub: user_id.to_string(),
        },
        secret,
    )
}

/// Verifies a session token. Missing, malformed or tampered tokens yield `None`.
pub fn verify_session(token: &str, secret: &str) -> Option<Claims> {
    verify(token, secret)
}

pub fn sign_flash(message: &str, secret: &str) -> Result<String, AppError> {
    sign(
        &FlashClaims {
            msg: message.to_string(),
        },
        secret,
    )
}

pub fn verify_flash(token: &str, secret: &str) -> Option<String> {
    verify::<FlashClaims>(token, secret).map(|c| c.msg)
}

#[cfg(test)]
mod tests {
    use super::*;

    const SECRET: &str = "unit-test-secret";

    #[test]
    fn session_round_trips_user_id() {
        let token = sign_session(42, SECRET).unwrap();
        let claims = verify_session(&token, SECRET).unwrap();
        assert_eq!(claims.user_id(), Some(42));
    }

    #[test]
    fn tampered_or_foreign_tokens_are_rejected() {
        let token = sign_session(7, SECRET).unwrap();
        assert!(verify_session(&token, "another-secret").is_none());

        let mut parts: Vec<String> = token.split('.').map(str::to_string).collect();
        parts[1] = sign_session(1, "x").unwrap().split('.').nth(1).unwrap().to_string();
        assert!(verify_session(&parts.join("."), SECRET).is_none());

        assert!(verify_session("garbage", SECRET).is_none());
    }

    #[test]
    fn flash_keeps_non_ascii_text() {
        let token = sign_flash("تم إرسال البلاغ; ok", SECRET).unwrap();
        assert!(!token.contains(';'));
        assert_eq!(verify_flash(&token, SECRET).unwrap(), "تم إرسال البلاغ; ok");
    }
}
