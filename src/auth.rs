//! User authentication.
//!
//! Login issues a JWT signed with the server's secret, and every data route
//! recovers the caller by extracting [Claims] from the `Authorization:
//! Bearer` header.

use axum::{
    Json, RequestPartsExt,
    extract::{FromRef, FromRequestParts},
    http::{StatusCode, request::Parts},
    response::{IntoResponse, Response},
};
use axum_extra::{
    TypedHeader,
    headers::{Authorization, authorization::Bearer},
};
use chrono::{TimeDelta, Utc};
use email_address::EmailAddress;
use jsonwebtoken::{DecodingKey, EncodingKey, Header, Validation, decode, encode};
use serde::{Deserialize, Serialize};
use serde_json::json;
use thiserror::Error;

use crate::{
    Error,
    models::{User, UserID},
    stores::UserStore,
};

/// How long an issued token stays valid.
pub const TOKEN_DURATION_DAYS: i64 = 7;

/// The state needed to sign and verify tokens.
#[derive(Clone)]
pub struct AuthState {
    /// The key used to sign new tokens.
    pub encoding_key: EncodingKey,
    /// The key used to verify presented tokens.
    pub decoding_key: DecodingKey,
}

impl AuthState {
    /// Create signing and verification keys from the server's secret.
    pub fn new(jwt_secret: &str) -> Self {
        Self {
            encoding_key: EncodingKey::from_secret(jwt_secret.as_bytes()),
            decoding_key: DecodingKey::from_secret(jwt_secret.as_bytes()),
        }
    }
}

/// The payload carried by an auth token.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Claims {
    /// The ID of the authenticated user.
    pub user_id: UserID,
    /// The email of the authenticated user.
    pub email: String,
    /// When the token was issued, as a unix timestamp.
    pub iat: i64,
    /// When the token expires, as a unix timestamp.
    pub exp: i64,
}

/// Sign a token for `user` that expires in [TOKEN_DURATION_DAYS] days.
///
/// # Errors
///
/// Returns an [AuthError::TokenCreation] if the token could not be signed.
pub fn create_token(user: &User, encoding_key: &EncodingKey) -> Result<String, AuthError> {
    let now = Utc::now();
    let expires_at = now + TimeDelta::days(TOKEN_DURATION_DAYS);

    let claims = Claims {
        user_id: user.id,
        email: user.email.to_string(),
        iat: now.timestamp(),
        exp: expires_at.timestamp(),
    };

    encode(&Header::default(), &claims, encoding_key).map_err(|error| {
        tracing::error!("Error signing auth token: {error}");
        AuthError::TokenCreation
    })
}

/// Verify `token` and recover its claims.
///
/// # Errors
///
/// Returns an [AuthError::InvalidToken] if the token is malformed, expired
/// or signed with a different secret.
pub fn decode_token(token: &str, decoding_key: &DecodingKey) -> Result<Claims, AuthError> {
    decode::<Claims>(token, decoding_key, &Validation::default())
        .map(|token_data| token_data.claims)
        .map_err(|_| AuthError::InvalidToken)
}

/// Look up the user for `email` and check `password` against the stored
/// hash.
///
/// # Errors
///
/// Returns an [AuthError::WrongCredentials] for an unknown email or a wrong
/// password. Both cases produce the same error so a caller cannot probe
/// which emails are registered.
pub fn verify_credentials(
    store: &impl UserStore,
    email: &EmailAddress,
    password: &str,
) -> Result<User, AuthError> {
    let user = match store.get_by_email(email) {
        Ok(user) => user,
        Err(Error::NotFound) => return Err(AuthError::WrongCredentials),
        Err(error) => {
            tracing::error!("Unhandled error while verifying credentials: {error}");
            return Err(AuthError::InternalError);
        }
    };

    let is_password_valid = match user.password_hash.verify(password) {
        Ok(is_password_valid) => is_password_valid,
        Err(error) => {
            tracing::error!("Unhandled error while verifying credentials: {error}");
            return Err(AuthError::InternalError);
        }
    };

    if !is_password_valid {
        return Err(AuthError::WrongCredentials);
    }

    Ok(user)
}

impl<S> FromRequestParts<S> for Claims
where
    AuthState: FromRef<S>,
    S: Send + Sync,
{
    type Rejection = AuthError;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let TypedHeader(Authorization(bearer)) = parts
            .extract::<TypedHeader<Authorization<Bearer>>>()
            .await
            .map_err(|_| AuthError::InvalidToken)?;

        let auth_state = AuthState::from_ref(state);

        decode_token(bearer.token(), &auth_state.decoding_key)
    }
}

/// The ways authentication can fail.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum AuthError {
    /// The email is not registered or the password does not match.
    #[error("invalid email or password")]
    WrongCredentials,
    /// A token could not be signed.
    #[error("could not create auth token")]
    TokenCreation,
    /// The bearer token is missing, malformed, expired or has a bad
    /// signature.
    #[error("invalid auth token")]
    InvalidToken,
    /// Something unexpected went wrong while checking credentials.
    #[error("internal error during authentication")]
    InternalError,
}

impl IntoResponse for AuthError {
    fn into_response(self) -> Response {
        let (status, message) = match self {
            AuthError::WrongCredentials => (StatusCode::UNAUTHORIZED, "Invalid email or password"),
            AuthError::TokenCreation => {
                (StatusCode::INTERNAL_SERVER_ERROR, "Internal server error")
            }
            AuthError::InvalidToken => (StatusCode::UNAUTHORIZED, "Invalid or missing token"),
            AuthError::InternalError => {
                (StatusCode::INTERNAL_SERVER_ERROR, "Internal server error")
            }
        };

        (status, Json(json!({ "message": message }))).into_response()
    }
}

#[cfg(test)]
mod token_tests {
    use chrono::{TimeDelta, Utc};
    use jsonwebtoken::{Header, encode};

    use crate::models::{PasswordHash, User, UserID};

    use super::{AuthError, AuthState, Claims, create_token, decode_token};

    fn test_user() -> User {
        User {
            id: UserID::new(42),
            email: "test@test.com".parse().unwrap(),
            full_name: "Test User".to_owned(),
            password_hash: PasswordHash::new_unchecked("hunter2"),
            created_at: Utc::now(),
        }
    }

    #[test]
    fn token_round_trip_recovers_claims() {
        let state = AuthState::new("42");
        let user = test_user();

        let token = create_token(&user, &state.encoding_key).unwrap();
        let claims = decode_token(&token, &state.decoding_key).unwrap();

        assert_eq!(claims.user_id, user.id);
        assert_eq!(claims.email, "test@test.com");
        assert!(claims.exp > claims.iat);
    }

    #[test]
    fn token_signed_with_other_secret_is_rejected() {
        let user = test_user();
        let token = create_token(&user, &AuthState::new("42").encoding_key).unwrap();

        let result = decode_token(&token, &AuthState::new("not 42").decoding_key);

        assert_eq!(result, Err(AuthError::InvalidToken));
    }

    #[test]
    fn expired_token_is_rejected() {
        let state = AuthState::new("42");
        let issued_at = Utc::now() - TimeDelta::days(8);
        let claims = Claims {
            user_id: UserID::new(42),
            email: "test@test.com".to_owned(),
            iat: issued_at.timestamp(),
            exp: (issued_at + TimeDelta::days(7)).timestamp(),
        };
        let token = encode(&Header::default(), &claims, &state.encoding_key).unwrap();

        let result = decode_token(&token, &state.decoding_key);

        assert_eq!(result, Err(AuthError::InvalidToken));
    }

    #[test]
    fn garbage_token_is_rejected() {
        let state = AuthState::new("42");

        let result = decode_token("not a token", &state.decoding_key);

        assert_eq!(result, Err(AuthError::InvalidToken));
    }

    #[test]
    fn claims_serialise_with_camel_case_user_id() {
        let claims = Claims {
            user_id: UserID::new(7),
            email: "test@test.com".to_owned(),
            iat: 0,
            exp: 1,
        };

        let value = serde_json::to_value(claims).unwrap();

        assert_eq!(value["userId"], 7);
        assert_eq!(value["email"], "test@test.com");
    }
}
