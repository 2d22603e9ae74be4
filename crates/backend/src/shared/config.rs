use once_cell::sync::OnceCell;
use serde::Deserialize;
use std::path::{Path, PathBuf};

static CONFIG: OnceCell<Config> = OnceCell::new();

#[derive(Debug, Deserialize, Clone)]
pub struct Config {
    pub database: DatabaseConfig,
    #[serde(default)]
    pub server: ServerConfig,
    #[serde(default)]
    pub auth: AuthConfig,
}

#[derive(Debug, Deserialize, Clone)]
pub struct DatabaseConfig {
    pub path: String,
}

#[derive(Debug, Deserialize, Clone)]
pub struct ServerConfig {
    pub port: u16,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self { port: 3000 }
    }
}

#[derive(Debug, Deserialize, Clone)]
pub struct AuthConfig {
    pub admin_username: String,
    pub admin_password: String,
    /// Token signing key; generated and kept in `sys_settings` when absent
    pub secret_key: Option<String>,
}

impl Default for AuthConfig {
    fn default() -> Self {
        Self {
            admin_username: "admin".to_string(),
            admin_password: "admin123".to_string(),
            secret_key: None,
        }
    }
}

/// Default configuration embedded in the binary
const DEFAULT_CONFIG: &str = r#"
[database]
path = "target/db/policy_admin.db"

[server]
port = 3000

[auth]
admin_username = "admin"
admin_password = "admin123"
"#;

/// Load configuration from config.toml file
///
/// Search order:
/// 1. Next to the executable (for production)
/// 2. Falls back to embedded default config
///
/// Environment variables `DATABASE_PATH`, `ADMIN_PASSWORD`, `SECRET_KEY`
/// and `PORT` override the file.
pub fn load_config() -> anyhow::Result<Config> {
    let mut config = read_config_file()?;
    apply_env_overrides(&mut config, |key| std::env::var(key).ok())?;
    Ok(config)
}

fn read_config_file() -> anyhow::Result<Config> {
    if let Ok(exe_path) = std::env::current_exe() {
        if let Some(exe_dir) = exe_path.parent() {
            let config_path = exe_dir.join("config.toml");

            if config_path.exists() {
                tracing::info!("Loading config from: {}", config_path.display());
                let contents = std::fs::read_to_string(&config_path)?;
                let config: Config = toml::from_str(&contents)?;
                return Ok(config);
            } else {
                tracing::warn!("config.toml not found at: {}", config_path.display());
            }
        }
    }

    tracing::info!("Using default embedded configuration");
    let config: Config = toml::from_str(DEFAULT_CONFIG)?;
    Ok(config)
}

fn apply_env_overrides<F>(config: &mut Config, lookup: F) -> anyhow::Result<()>
where
    F: Fn(&str) -> Option<String>,
{
    if let Some(path) = lookup("DATABASE_PATH") {
        config.database.path = path;
    }
    if let Some(password) = lookup("ADMIN_PASSWORD") {
        config.auth.admin_password = password;
    }
    if let Some(secret) = lookup("SECRET_KEY").filter(|s| !s.is_empty()) {
        config.auth.secret_key = Some(secret);
    }
    if let Some(port) = lookup("PORT") {
        config.server.port = port
            .trim()
            .parse()
            .map_err(|_| anyhow::anyhow!("PORT must be a port number, got '{}'", port))?;
    }
    Ok(())
}

/// Load once and keep for the lifetime of the process
pub fn init_config() -> anyhow::Result<&'static Config> {
    CONFIG.get_or_try_init(load_config)
}

/// Loaded configuration; falls back to the embedded default before [`init_config`]
pub fn get_config() -> &'static Config {
    CONFIG.get_or_init(|| {
        toml::from_str(DEFAULT_CONFIG).unwrap_or_else(|_| Config {
            database: DatabaseConfig {
                path: "target/db/policy_admin.db".to_string(),
            },
            server: ServerConfig::default(),
            auth: AuthConfig::default(),
        })
    })
}

/// Get the database file path from configuration
/// Resolves relative paths relative to the executable directory
pub fn get_database_path(config: &Config) -> anyhow::Result<PathBuf> {
    let db_path_str = &config.database.path;
    let db_path = Path::new(db_path_str);

    if db_path.is_absolute() {
        return Ok(db_path.to_path_buf());
    }

    if let Ok(exe_path) = std::env::current_exe() {
        if let Some(exe_dir) = exe_path.parent() {
            return Ok(exe_dir.join(db_path));
        }
    }

    // Fallback: use relative to current directory
    Ok(PathBuf::from(db_path_str))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn default_config() -> Config {
        toml::from_str(DEFAULT_CONFIG).unwrap()
    }

    #[test]
    fn test_default_config_loads() {
        let config = default_config();
        assert_eq!(config.database.path, "target/db/policy_admin.db");
        assert_eq!(config.server.port, 3000);
        assert_eq!(config.auth.admin_username, "admin");
        assert_eq!(config.auth.admin_password, "admin123");
        assert!(config.auth.secret_key.is_none());
    }

    #[test]
    fn test_missing_sections_use_defaults() {
        let config: Config = toml::from_str("[database]\npath = \"x.db\"\n").unwrap();
        assert_eq!(config.server.port, 3000);
        assert_eq!(config.auth.admin_password, "admin123");
    }

    #[test]
    fn test_env_overrides() {
        let env: HashMap<&str, &str> = [
            ("DATABASE_PATH", "/var/lib/policy.db"),
            ("ADMIN_PASSWORD", "s3cret"),
            ("SECRET_KEY", "signing-key"),
            ("PORT", "8080"),
        ]
        .into_iter()
        .collect();

        let mut config = default_config();
        apply_env_overrides(&mut config, |k| env.get(k).map(|v| v.to_string())).unwrap();

        assert_eq!(config.database.path, "/var/lib/policy.db");
        assert_eq!(config.auth.admin_password, "s3cret");
        assert_eq!(config.auth.secret_key.as_deref(), Some("signing-key"));
        assert_eq!(config.server.port, 8080);
        assert_eq!(
            get_database_path(&config).unwrap(),
            PathBuf::from("/var/lib/policy.db")
        );
    }

    #[test]
    fn test_bad_port_is_rejected() {
        let mut config = default_config();
        let result = apply_env_overrides(&mut config, |k| {
            (k == "PORT").then(|| "eighty".to_string())
        });
        assert!(result.is_err());
    }
}
