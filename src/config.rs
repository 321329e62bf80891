use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use tracing::info;

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub general: GeneralConfig,

    pub server: ServerConfig,

    pub database: DatabaseConfig,

    pub auth: AuthConfig,

    pub uploads: UploadConfig,

    pub security: SecurityConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct GeneralConfig {
    pub log_level: String,

    /// Number of tokio worker threads (0 = number of CPU cores)
    pub worker_threads: usize,
}

impl Default for GeneralConfig {
    fn default() -> Self {
        Self {
            log_level: "info".to_string(),
            worker_threads: 2,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    pub port: u16,

    pub cors_allowed_origins: Vec<String>,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            port: 5000,
            cors_allowed_origins: vec!["*".to_string()],
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct DatabaseConfig {
    pub url: String,

    pub max_connections: u32,

    pub min_connections: u32,
}

impl Default for DatabaseConfig {
    fn default() -> Self {
        Self {
            url: "sqlite:data/crewbase.db".to_string(),
            max_connections: 5,
            min_connections: 1,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct AuthConfig {
    /// HS256 signing secret. Override with CREWBASE_JWT_SECRET in production.
    pub jwt_secret: String,

    pub jwt_expiry_minutes: i64,
}

impl Default for AuthConfig {
    fn default() -> Self {
        Self {
            jwt_secret: "change-me-to-a-long-random-secret".to_string(),
            jwt_expiry_minutes: 7 * 24 * 60,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct UploadConfig {
    /// Directory that staged profile images are written to and served from
    pub path: String,

    pub max_file_size_mb: u64,
}

impl Default for UploadConfig {
    fn default() -> Self {
        Self {
            path: "uploads".to_string(),
            max_file_size_mb: 5,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SecurityConfig {
    /// Argon2 memory cost in KiB
    pub argon2_memory_cost_kib: u32,

    /// Argon2 time cost (iterations)
    pub argon2_time_cost: u32,

    pub argon2_parallelism: u32,
}

impl Default for SecurityConfig {
    fn default() -> Self {
        Self {
            argon2_memory_cost_kib: 8192,
            argon2_time_cost: 3,
            argon2_parallelism: 1,
        }
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            general: GeneralConfig::default(),
            server: ServerConfig::default(),
            database: DatabaseConfig::default(),
            auth: AuthConfig::default(),
            uploads: UploadConfig::default(),
            security: SecurityConfig::default(),
        }
    }
}

impl Config {
    pub fn load() -> Result<Self> {
        let mut config = Self::load_file()?;
        config.apply_env_overrides();
        Ok(config)
    }

    fn load_file() -> Result<Self> {
        for path in Self::config_paths() {
            if path.exists() {
                info!("Loading config from: {}", path.display());
                return Self::load_from_path(&path);
            }
        }

        info!("No config file found, using defaults");
        Ok(Self::default())
    }

    pub fn load_from_path(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {}", path.display()))?;

        let config: Self = toml::from_str(&content)
            .with_context(|| format!("Failed to parse config file: {}", path.display()))?;

        Ok(config)
    }

    /// Environment beats file for the deploy-sensitive settings.
    fn apply_env_overrides(&mut self) {
        if let Ok(url) = std::env::var("CREWBASE_DATABASE_URL") {
            self.database.url = url;
        }
        if let Ok(secret) = std::env::var("CREWBASE_JWT_SECRET") {
            self.auth.jwt_secret = secret;
        }
        if let Some(minutes) = std::env::var("CREWBASE_JWT_EXPIRY_MINUTES")
            .ok()
            .and_then(|s| s.parse().ok())
        {
            self.auth.jwt_expiry_minutes = minutes;
        }
        if let Some(port) = std::env::var("CREWBASE_PORT")
            .ok()
            .and_then(|s| s.parse().ok())
        {
            self.server.port = port;
        }
        if let Ok(path) = std::env::var("CREWBASE_UPLOADS_PATH") {
            self.uploads.path = path;
        }
    }

    fn config_paths() -> Vec<PathBuf> {
        let mut paths = vec![PathBuf::from("config.toml")];

        if let Some(config_dir) = dirs::config_dir() {
            paths.push(config_dir.join("crewbase").join("config.toml"));
        }

        if let Some(home) = dirs::home_dir() {
            paths.push(home.join(".crewbase").join("config.toml"));
        }

        paths
    }

    pub fn validate(&self) -> Result<()> {
        if self.auth.jwt_secret.len() < 16 {
            anyhow::bail!("JWT secret must be at least 16 characters");
        }

        if self.auth.jwt_expiry_minutes <= 0 {
            anyhow::bail!("JWT expiry must be positive");
        }

        if self.database.url.is_empty() {
            anyhow::bail!("Database URL cannot be empty");
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = Config::default();
        assert_eq!(config.server.port, 5000);
        assert_eq!(config.uploads.max_file_size_mb, 5);
        assert_eq!(config.security.argon2_time_cost, 3);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_config_deserialization() {
        let toml_str = r#"
            [general]
            log_level = "debug"

            [server]
            port = 8080
        "#;

        let config: Config = toml::from_str(toml_str).unwrap();
        assert_eq!(config.general.log_level, "debug");
        assert_eq!(config.server.port, 8080);

        assert_eq!(config.database.url, "sqlite:data/crewbase.db");
    }

    #[test]
    fn test_validate_rejects_short_secret() {
        let mut config = Config::default();
        config.auth.jwt_secret = "short".to_string();
        assert!(config.validate().is_err());
    }
}
