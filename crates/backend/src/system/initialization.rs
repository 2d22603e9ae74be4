use anyhow::Result;

use crate::shared::config::Config;
use crate::shared::data::db::get_connection;
use crate::system::auth::jwt;

/// Startup steps that need the database: token signing key
pub async fn initialize(config: &Config) -> Result<()> {
    jwt::init_jwt_secret(get_connection(), config.auth.secret_key.as_deref()).await?;

    if config.auth.admin_password == "admin123" {
        tracing::warn!("Admin password is the built-in default; set ADMIN_PASSWORD");
    }
    Ok(())
}
