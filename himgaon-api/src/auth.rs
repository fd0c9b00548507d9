use axum::{extract::State, routing::post, Json, Router};
use chrono::{Duration, Utc};
use jsonwebtoken::{encode, EncodingKey, Header};
use serde::{Deserialize, Serialize};
use tracing::{info, warn};

use crate::{
    error::AppError,
    middleware::auth::{AdminClaims, ADMIN_ROLE},
    state::AppState,
};

#[derive(Debug, Deserialize)]
pub struct LoginRequest {
    pub username: String,
    pub password: String,
}

#[derive(Debug, Serialize)]
pub struct AuthResponse {
    pub token: String,
    pub expires_in: u64,
}

pub fn routes() -> Router<AppState> {
    Router::new().route("/v1/admin/login", post(login_admin))
}

pub fn hash_password(password: &str) -> Result<String, argon2::password_hash::Error> {
    use argon2::password_hash::rand_core::OsRng;
    use argon2::password_hash::SaltString;
    use argon2::{Argon2, PasswordHasher};
    let salt = SaltString::generate(&mut OsRng);
    let hash = Argon2::default().hash_password(password.as_bytes(), &salt)?;
    Ok(hash.to_string())
}

pub fn verify_password(password: &str, hash: &str) -> bool {
    use argon2::{Argon2, PasswordHash, PasswordVerifier};
    let Ok(parsed) = PasswordHash::new(hash) else {
        return false;
    };
    Argon2::default()
        .verify_password(password.as_bytes(), &parsed)
        .is_ok()
}

async fn login_admin(
    State(state): State<AppState>,
    Json(req): Json<LoginRequest>,
) -> Result<Json<AuthResponse>, AppError> {
    if state.auth.admin_password_hash.is_empty() {
        return Err(AppError::AuthenticationError(
            "Admin login is not configured".into(),
        ));
    }

    let username = req.username.trim();
    if username != state.auth.admin_username
        || !verify_password(&req.password, &state.auth.admin_password_hash)
    {
        warn!(username, "Admin login refused");
        return Err(AppError::AuthenticationError(
            "Invalid username or password".into(),
        ));
    }

    let claims = AdminClaims {
        sub: username.to_owned(),
        role: ADMIN_ROLE.to_owned(),
        exp: (Utc::now() + Duration::seconds(state.auth.expiration as i64)).timestamp() as usize,
    };

    let token = encode(
        &Header::default(),
        &claims,
        &EncodingKey::from_secret(state.auth.secret.as_bytes()),
    )
    .map_err(|e| AppError::InternalServerError(format!("Token encoding failed: {}", e)))?;

    info!(username, "Admin logged in");
    Ok(Json(AuthResponse {
        token,
        expires_in: state.auth.expiration,
    }))
}
