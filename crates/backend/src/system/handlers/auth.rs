use axum::{extract::Form, Json};
use chrono::{TimeZone, Utc};
use contracts::shared::form::non_empty;
use contracts::system::auth::{LoginInfo, LoginRequest, LoginResponse, LogoutResponse};

use crate::shared::config::{get_config, AuthConfig};
use crate::shared::data::db::get_connection;
use crate::shared::error::{AppError, AppResult};
use crate::system::auth::extractor::CurrentUser;
use crate::system::auth::{jwt, revocation};

/// Single admin account from configuration
pub fn verify_credentials(auth: &AuthConfig, username: &str, password: &str) -> bool {
    username == auth.admin_username && password == auth.admin_password
}

/// GET /login
pub async fn login_info() -> Json<LoginInfo> {
    Json(LoginInfo {
        login_url: "/login".to_string(),
        token_type: "Bearer".to_string(),
        fields: vec!["username".to_string(), "password".to_string()],
    })
}

/// POST /login
pub async fn login(Form(request): Form<LoginRequest>) -> AppResult<Json<LoginResponse>> {
    let username = non_empty(&request.username).unwrap_or_default();
    let password = non_empty(&request.password).unwrap_or_default();

    if !verify_credentials(&get_config().auth, &username, &password) {
        tracing::warn!("Failed login attempt for '{}'", username);
        return Err(AppError::Unauthorized("Invalid credentials".into()));
    }

    let (access_token, claims) = jwt::generate_access_token(&username)?;
    let expires_at = Utc
        .timestamp_opt(claims.exp as i64, 0)
        .single()
        .ok_or_else(|| AppError::Internal("Invalid token expiry".into()))?;

    tracing::info!("User '{}' logged in", username);
    Ok(Json(LoginResponse {
        access_token,
        token_type: "Bearer".to_string(),
        expires_at,
        username,
    }))
}

/// GET /logout
pub async fn logout(CurrentUser(claims): CurrentUser) -> AppResult<Json<LogoutResponse>> {
    revocation::revoke(get_connection(), &claims).await?;
    tracing::info!("User '{}' logged out", claims.username);
    Ok(Json(LogoutResponse {
        message: "Logged out".to_string(),
    }))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_verify_credentials() {
        let auth = AuthConfig::default();
        assert!(verify_credentials(&auth, "admin", "admin123"));
        assert!(!verify_credentials(&auth, "admin", "wrong"));
        assert!(!verify_credentials(&auth, "root", "admin123"));
        assert!(!verify_credentials(&auth, "", ""));
    }
}
