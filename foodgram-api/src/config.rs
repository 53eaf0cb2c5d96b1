/// Configuration management for the API server
///
/// Configuration is loaded from environment variables into a typed struct.
///
/// # Environment Variables
///
/// - `DATABASE_URL`: PostgreSQL connection string (required)
/// - `DATABASE_MAX_CONNECTIONS`: pool size (default: 10)
/// - `API_HOST`: host to bind to (default: 0.0.0.0)
/// - `API_PORT`: port to bind to (default: 8080)
/// - `BASE_URL`: absolute URL the service is reachable at, used for short
///   links and media URLs (default: http://localhost:{port})
/// - `CORS_ORIGINS`: comma-separated allowed origins (default: *)
/// - `PRODUCTION`: enables HSTS and strict CORS (default: false)
/// - `JWT_SECRET`: secret key for token signing, at least 32 bytes (required)
/// - `PAGE_SIZE`: default page size for list endpoints (default: 6)
/// - `MAX_PAGE_SIZE`: largest page size a client may request (default: 100)
/// - `MEDIA_ROOT`: directory uploaded images are stored in (default: media)

use serde::{Deserialize, Serialize};
use std::env;
use std::path::PathBuf;

use foodgram_shared::pagination::{DEFAULT_PAGE_SIZE, MAX_PAGE_SIZE};

/// Complete application configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    /// API server configuration
    pub api: ApiConfig,

    /// Database configuration
    pub database: DatabaseConfig,

    /// JWT configuration
    pub jwt: JwtConfig,

    /// Pagination configuration
    pub pagination: PaginationConfig,

    /// Media storage configuration
    pub media: MediaConfig,
}

/// API server configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApiConfig {
    /// Host to bind to
    pub host: String,

    /// Port to bind to
    pub port: u16,

    /// Absolute URL the service is reachable at, without trailing slash
    pub base_url: String,

    /// Allowed CORS origins; "*" means permissive
    pub cors_origins: Vec<String>,

    /// Production mode (HSTS, strict CORS)
    pub production: bool,
}

/// Database configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DatabaseConfig {
    /// PostgreSQL connection URL
    pub url: String,

    /// Maximum number of connections in pool
    pub max_connections: u32,
}

/// JWT configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct JwtConfig {
    /// Secret key for JWT signing
    ///
    /// Must be at least 32 bytes. Generate with: `openssl rand -hex 32`
    pub secret: String,
}

/// Pagination configuration
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct PaginationConfig {
    /// Page size when the client does not pass `limit`
    pub default_page_size: u32,

    /// Largest page size a client may request
    pub max_page_size: u32,
}

/// Media storage configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MediaConfig {
    /// Directory uploaded images are stored in, served under /media
    pub root: PathBuf,
}

impl Config {
    /// Loads configuration from environment variables
    ///
    /// # Errors
    ///
    /// Returns an error if a required variable is missing or a value does
    /// not parse.
    pub fn from_env() -> anyhow::Result<Self> {
        // Load .env file if present (for development)
        dotenvy::dotenv().ok();

        let api_host = env::var("API_HOST").unwrap_or_else(|_| "0.0.0.0".to_string());
        let api_port = env::var("API_PORT")
            .unwrap_or_else(|_| "8080".to_string())
            .parse::<u16>()?;

        let base_url = env::var("BASE_URL")
            .unwrap_or_else(|_| format!("http://localhost:{}", api_port));
        let base_url = base_url.trim_end_matches('/').to_string();

        let cors_origins: Vec<String> = env::var("CORS_ORIGINS")
            .unwrap_or_else(|_| "*".to_string())
            .split(',')
            .map(|s| s.trim().to_string())
            .filter(|s| !s.is_empty())
            .collect();

        let production = env::var("PRODUCTION")
            .map(|v| v == "1" || v.eq_ignore_ascii_case("true"))
            .unwrap_or(false);

        let database_url = env::var("DATABASE_URL")
            .map_err(|_| anyhow::anyhow!("DATABASE_URL environment variable is required"))?;

        let max_connections = env::var("DATABASE_MAX_CONNECTIONS")
            .unwrap_or_else(|_| "10".to_string())
            .parse::<u32>()?;

        let jwt_secret = env::var("JWT_SECRET")
            .map_err(|_| anyhow::anyhow!("JWT_SECRET environment variable is required"))?;

        if jwt_secret.len() < 32 {
            anyhow::bail!("JWT_SECRET must be at least 32 characters long");
        }

        let default_page_size = env::var("PAGE_SIZE")
            .unwrap_or_else(|_| DEFAULT_PAGE_SIZE.to_string())
            .parse::<u32>()?;

        let max_page_size = env::var("MAX_PAGE_SIZE")
            .unwrap_or_else(|_| MAX_PAGE_SIZE.to_string())
            .parse::<u32>()?;

        let media_root = env::var("MEDIA_ROOT").unwrap_or_else(|_| "media".to_string());

        Ok(Self {
            api: ApiConfig {
                host: api_host,
                port: api_port,
                base_url,
                cors_origins,
                production,
            },
            database: DatabaseConfig {
                url: database_url,
                max_connections,
            },
            jwt: JwtConfig { secret: jwt_secret },
            pagination: PaginationConfig {
                default_page_size,
                max_page_size,
            },
            media: MediaConfig {
                root: PathBuf::from(media_root),
            },
        })
    }

    /// Returns the server bind address
    pub fn bind_address(&self) -> String {
        format!("{}:{}", self.api.host, self.api.port)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn test_config() -> Config {
        Config {
            api: ApiConfig {
                host: "127.0.0.1".to_string(),
                port: 8080,
                base_url: "http://testserver".to_string(),
                cors_origins: vec!["*".to_string()],
                production: false,
            },
            database: DatabaseConfig {
                url: "postgresql://localhost/test".to_string(),
                max_connections: 10,
            },
            jwt: JwtConfig {
                secret: "test-secret-key-at-least-32-bytes-long".to_string(),
            },
            pagination: PaginationConfig {
                default_page_size: 6,
                max_page_size: 100,
            },
            media: MediaConfig {
                root: PathBuf::from("media"),
            },
        }
    }

    #[test]
    fn test_bind_address() {
        let config = test_config();
        assert_eq!(config.bind_address(), "127.0.0.1:8080");
    }
}
