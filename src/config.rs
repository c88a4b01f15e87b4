use serde::Deserialize;

/// Application configuration loaded from environment variables.
#[derive(Debug, Clone, Deserialize)]
pub struct Config {
    /// Database connection URL (e.g. sqlite://warden.db, postgres://...)
    pub database_url: String,

    /// Server host (default: 127.0.0.1)
    pub server_host: String,

    /// Server port (default: 3000)
    pub server_port: u16,

    /// Environment: development, production, test
    pub environment: String,

    /// Upload directory for avatar storage (default: ./uploads)
    pub upload_dir: String,

    /// Max avatar file size in bytes (default: 2MB)
    pub max_avatar_size: u64,

    /// Credential/token lifecycle knobs
    pub auth: AuthConfig,
}

/// Token and credential policy configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct AuthConfig {
    /// Password-reset token lifetime in seconds (default: 3600)
    pub reset_token_expiry_secs: u64,

    /// Minimum plaintext password length, enforced at the service layer
    /// (default: 8)
    pub min_password_length: usize,
}

impl Default for AuthConfig {
    fn default() -> Self {
        AuthConfig {
            reset_token_expiry_secs: 3600,
            min_password_length: 8,
        }
    }
}

impl Config {
    /// Load configuration from environment variables (with .env support).
    pub fn from_env() -> Result<Self, Box<dyn std::error::Error>> {
        // Load .env file if present (ignore errors if missing)
        let _ = dotenvy::dotenv();

        Ok(Config {
            database_url: std::env::var("DATABASE_URL")
                .unwrap_or_else(|_| "sqlite://warden.db?mode=rwc".to_string()),
            server_host: std::env::var("SERVER_HOST").unwrap_or_else(|_| "127.0.0.1".to_string()),
            server_port: std::env::var("SERVER_PORT")
                .unwrap_or_else(|_| "3000".to_string())
                .parse()
                .unwrap_or(3000),
            environment: std::env::var("ENVIRONMENT").unwrap_or_else(|_| "development".to_string()),
            upload_dir: std::env::var("UPLOAD_DIR").unwrap_or_else(|_| "./uploads".to_string()),
            max_avatar_size: std::env::var("MAX_AVATAR_SIZE")
                .unwrap_or_else(|_| "2097152".to_string()) // 2MB
                .parse()
                .unwrap_or(2_097_152),
            auth: AuthConfig {
                reset_token_expiry_secs: std::env::var("RESET_TOKEN_EXPIRY_SECS")
                    .unwrap_or_else(|_| "3600".to_string())
                    .parse()
                    .unwrap_or(3600),
                min_password_length: std::env::var("MIN_PASSWORD_LENGTH")
                    .unwrap_or_else(|_| "8".to_string())
                    .parse()
                    .unwrap_or(8),
            },
        })
    }

    /// Check if running in development mode.
    pub fn is_dev(&self) -> bool {
        self.environment == "development"
    }

    /// Get the full server address.
    pub fn server_addr(&self) -> String {
        format!("{}:{}", self.server_host, self.server_port)
    }
}
