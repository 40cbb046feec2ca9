//! The registration, login and profile routes.

use axum::{
    Json,
    extract::State,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use chrono::{DateTime, Utc};
use email_address::EmailAddress;
use serde::{Deserialize, Serialize};
use serde_json::json;

use crate::{
    AppState, Error,
    auth::{AuthError, Claims, create_token, verify_credentials},
    models::{PasswordHash, User, UserID, ValidatedPassword},
    stores::UserStore,
};

/// The fields the client sends to register a new user.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RegisterData {
    /// The user's display name.
    pub full_name: String,
    /// The user's email, which doubles as their login name.
    pub email: String,
    /// The plain text password.
    pub password: String,
    /// The plain text password, repeated.
    pub confirm_password: String,
}

/// The fields the client sends to log in.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LogInData {
    /// The email used at registration.
    pub email: String,
    /// The plain text password.
    pub password: String,
}

/// The public view of a user, i.e. everything except the password hash.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UserProfile {
    /// The user's ID in the application database.
    pub id: UserID,
    /// The user's display name.
    pub full_name: String,
    /// The user's email address.
    pub email: String,
    /// When the user registered.
    pub created_at: DateTime<Utc>,
}

impl From<User> for UserProfile {
    fn from(user: User) -> Self {
        Self {
            id: user.id,
            full_name: user.full_name,
            email: user.email.to_string(),
            created_at: user.created_at,
        }
    }
}

/// A route handler for registering a new user.
///
/// On success the response carries a bearer token so the client is logged in
/// straight away.
pub async fn register(
    State(mut state): State<AppState>,
    Json(data): Json<RegisterData>,
) -> Response {
    if data.full_name.trim().is_empty() {
        return Error::Validation("Full name is required".to_owned()).into_response();
    }

    let email = match data.email.parse::<EmailAddress>() {
        Ok(email) => email,
        Err(_) => return Error::Validation("Valid email is required".to_owned()).into_response(),
    };

    if data.password != data.confirm_password {
        return Error::Validation("Passwords do not match".to_owned()).into_response();
    }

    let password = match ValidatedPassword::new(&data.password) {
        Ok(password) => password,
        Err(error) => return error.into_response(),
    };

    let password_hash = match PasswordHash::new(password, PasswordHash::DEFAULT_COST) {
        Ok(password_hash) => password_hash,
        Err(error) => return error.into_response(),
    };

    let user = match state.user_store.create(email, data.full_name, password_hash) {
        Ok(user) => user,
        Err(error) => return error.into_response(),
    };

    let token = match create_token(&user, &state.auth_state.encoding_key) {
        Ok(token) => token,
        Err(error) => return error.into_response(),
    };

    (
        StatusCode::CREATED,
        Json(json!({
            "message": "User registered successfully",
            "token": token,
            "user": UserProfile::from(user),
        })),
    )
        .into_response()
}

/// A route handler for logging in with an email and password.
pub async fn log_in(State(state): State<AppState>, Json(data): Json<LogInData>) -> Response {
    let email = match data.email.parse::<EmailAddress>() {
        Ok(email) => email,
        Err(_) => return Error::Validation("Valid email is required".to_owned()).into_response(),
    };

    let user = match verify_credentials(&state.user_store, &email, &data.password) {
        Ok(user) => user,
        Err(error) => return error.into_response(),
    };

    let token = match create_token(&user, &state.auth_state.encoding_key) {
        Ok(token) => token,
        Err(error) => return error.into_response(),
    };

    Json(json!({
        "message": "Login successful",
        "token": token,
        "user": UserProfile::from(user),
    }))
    .into_response()
}

/// A route handler for fetching the authenticated user's profile.
pub async fn get_profile(State(state): State<AppState>, claims: Claims) -> Response {
    match state.user_store.get(claims.user_id) {
        Ok(user) => Json(UserProfile::from(user)).into_response(),
        Err(Error::NotFound) => AuthError::InvalidToken.into_response(),
        Err(error) => error.into_response(),
    }
}
