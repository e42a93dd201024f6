// src/utils/jwt.rs

use std::time::{SystemTime, UNIX_EPOCH};

use axum::{
    extract::FromRequestParts,
    http::{header, request::Parts},
};
use jsonwebtoken::{DecodingKey, EncodingKey, Header, Validation, decode, encode};
use serde::{Deserialize, Serialize};

use crate::{error::AppError, models::user::Role, services, state::AppState};

/// JWT Claims structure.
#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct Claims {
    /// Subject - Stores the User ID (as string).
    pub sub: String,
    /// Role at the time the token was issued. Authorization uses the stored role instead.
    pub role: String,
    /// Expiration time as Unix timestamp.
    pub exp: usize,
}

/// Signs a new JWT for the user.
pub fn sign_jwt(
    id: i64,
    role: Role,
    secret: &str,
    expiration_seconds: u64,
) -> Result<String, AppError> {
    let expiration = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map_err(|e| AppError::InternalServerError(e.to_string()))?
        .as_secs()
        .checked_add(expiration_seconds)
        .and_then(|exp| usize::try_from(exp).ok())
        .ok_or_else(|| {
            AppError::InternalServerError(format!(
                "Token lifetime of {} seconds is out of range",
                expiration_seconds
            ))
        })?;

    let claims = Claims {
        sub: id.to_string(),
        role: role.as_str().to_owned(),
        exp: expiration,
    };

    encode(
        &Header::default(),
        &claims,
        &EncodingKey::from_secret(secret.as_bytes()),
    )
    .map_err(|e| AppError::InternalServerError(e.to_string()))
}

/// Verifies and decodes a JWT string.
///
/// Returns the `Claims` if valid, otherwise `AppError::NotLogin`.
pub fn verify_jwt(token: &str, secret: &str) -> Result<Claims, AppError> {
    let token_data = decode::<Claims>(
        token,
        &DecodingKey::from_secret(secret.as_bytes()),
        &Validation::default(),
    )
    .map_err(|_| AppError::NotLogin("Invalid or expired token".to_string()))?;

    Ok(token_data.claims)
}

/// The authenticated caller, resolved from the bearer token and the stored user row.
///
/// Used as an extractor on every endpoint that needs to know who is calling:
/// * missing/invalid token or unknown user -> `NotLogin`
/// * banned user -> `Forbidden`
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Caller {
    pub id: i64,
    pub role: Role,
}

impl Caller {
    pub fn is_admin(&self) -> bool {
        self.role == Role::Admin
    }
}

impl FromRequestParts<AppState> for Caller {
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, state: &AppState) -> Result<Self, Self::Rejection> {
        let token = parts
            .headers
            .get(header::AUTHORIZATION)
            .and_then(|value| value.to_str().ok())
            .and_then(|value| value.strip_prefix("Bearer "))
            .ok_or_else(|| AppError::NotLogin("Missing bearer token".to_string()))?;

        let claims = verify_jwt(token, &state.config.jwt_secret)?;

        let user_id = claims
            .sub
            .parse::<i64>()
            .map_err(|_| AppError::NotLogin("Invalid token subject".to_string()))?;

        // Re-read the user so role changes and bans apply to tokens already issued.
        let user = services::user::get_by_id(&state.pool, user_id)
            .await?
            .ok_or_else(|| AppError::NotLogin("User no longer exists".to_string()))?;

        let role: Role = user.role.parse()?;
        if role == Role::Ban {
            tracing::warn!(user_id, "Banned user attempted an authenticated request");
            return Err(AppError::Forbidden("Account is banned".to_string()));
        }

        Ok(Caller { id: user.id, role })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn signed_token_verifies_with_same_secret() {
        let token = sign_jwt(42, Role::Admin, "secret", 60).unwrap();
        let claims = verify_jwt(&token, "secret").unwrap();
        assert_eq!(claims.sub, "42");
        assert_eq!(claims.role, "admin");
    }

    #[test]
    fn token_with_other_secret_is_not_login() {
        let token = sign_jwt(42, Role::User, "secret", 60).unwrap();
        assert!(matches!(
            verify_jwt(&token, "other"),
            Err(AppError::NotLogin(_))
        ));
    }

    #[test]
    fn overflowing_lifetime_is_an_error() {
        assert!(matches!(
            sign_jwt(42, Role::User, "secret", u64::MAX),
            Err(AppError::InternalServerError(_))
        ));
    }
}
