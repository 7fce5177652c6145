use std::env;
use std::str::FromStr;
use thiserror::Error;

/// Errors raised while assembling configuration at startup
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Missing configuration: {0}")]
    Missing(&'static str),

    #[error("Invalid value for {key}: {value}")]
    Invalid { key: &'static str, value: String },
}

#[derive(Debug, Clone)]
pub struct AppConfig {
    pub environment: Environment,
    pub server: ServerConfig,
    pub database: DatabaseConfig,
    pub api: ApiConfig,
    pub security: SecurityConfig,
    pub auth: AuthConfig,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Environment {
    Development,
    Staging,
    Production,
}

#[derive(Debug, Clone)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
}

#[derive(Debug, Clone)]
pub struct DatabaseConfig {
    pub url: String,
    pub max_connections: u32,
    /// Pool acquire timeout, seconds
    pub connection_timeout: u64,
    pub run_migrations: bool,
}

#[derive(Debug, Clone)]
pub struct ApiConfig {
    pub enable_request_logging: bool,
    pub max_request_size_bytes: usize,
}

#[derive(Debug, Clone)]
pub struct SecurityConfig {
    pub enable_cors: bool,
    pub cors_origins: Vec<String>,
}

/// Bearer token verification settings. Exactly one key source is used:
/// the PEM public key (RS256) wins over the shared secret (HS256).
#[derive(Clone, Default)]
pub struct AuthConfig {
    pub jwt_secret: Option<String>,
    pub jwt_public_key: Option<String>,
    pub issuer: Option<String>,
    pub audience: Option<String>,
    pub leeway_secs: u64,
}

impl std::fmt::Debug for AuthConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AuthConfig")
            .field("jwt_secret", &self.jwt_secret.as_ref().map(|_| "<redacted>"))
            .field("jwt_public_key", &self.jwt_public_key.as_ref().map(|_| "<redacted>"))
            .field("issuer", &self.issuer)
            .field("audience", &self.audience)
            .field("leeway_secs", &self.leeway_secs)
            .finish()
    }
}

impl AppConfig {
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_source(|key| env::var(key).ok())
    }

    /// Build from an arbitrary key lookup; `from_env` passes the process environment.
    pub fn from_source<F>(var: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let environment = match var("APP_ENV").as_deref() {
            Some("production") | Some("prod") => Environment::Production,
            Some("staging") | Some("stage") => Environment::Staging,
            _ => Environment::Development,
        };

        let database_url = var("DATABASE_URL")
            .filter(|v| !v.trim().is_empty())
            .ok_or(ConfigError::Missing("DATABASE_URL"))?;

        // Set defaults based on environment, then override with specific env vars
        let config = match environment {
            Environment::Production => Self::production(database_url),
            Environment::Staging => Self::staging(database_url),
            Environment::Development => Self::development(database_url),
        };
        config.with_overrides(&var)
    }

    fn with_overrides<F>(mut self, var: &F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        // Server overrides
        if let Some(v) = var("HOST") {
            self.server.host = v;
        }
        if let Some(port) = parsed(var, "NEUROMATE_API_PORT")? {
            self.server.port = port;
        } else if let Some(port) = parsed(var, "PORT")? {
            self.server.port = port;
        }

        // Database overrides
        if let Some(v) = parsed(var, "DATABASE_MAX_CONNECTIONS")? {
            self.database.max_connections = v;
        }
        if let Some(v) = parsed(var, "DATABASE_CONNECTION_TIMEOUT")? {
            self.database.connection_timeout = v;
        }
        if let Some(v) = parsed(var, "DATABASE_RUN_MIGRATIONS")? {
            self.database.run_migrations = v;
        }

        // API overrides
        if let Some(v) = parsed(var, "API_ENABLE_REQUEST_LOGGING")? {
            self.api.enable_request_logging = v;
        }
        if let Some(v) = parsed(var, "API_MAX_REQUEST_SIZE_BYTES")? {
            self.api.max_request_size_bytes = v;
        }

        // Security overrides
        if let Some(v) = parsed(var, "SECURITY_ENABLE_CORS")? {
            self.security.enable_cors = v;
        }
        if let Some(v) = var("SECURITY_CORS_ORIGINS") {
            self.security.cors_origins = v
                .split(',')
                .map(|s| s.trim().to_string())
                .filter(|s| !s.is_empty())
                .collect();
        }

        // Auth
        let non_empty = |key: &str| var(key).filter(|v| !v.trim().is_empty());
        self.auth.jwt_secret = non_empty("AUTH_JWT_SECRET");
        self.auth.jwt_public_key = non_empty("AUTH_JWT_PUBLIC_KEY");
        self.auth.issuer = non_empty("AUTH_JWT_ISSUER");
        self.auth.audience = non_empty("AUTH_JWT_AUDIENCE");
        if let Some(v) = parsed(var, "AUTH_JWT_LEEWAY_SECS")? {
            self.auth.leeway_secs = v;
        }
        if self.auth.jwt_secret.is_none() && self.auth.jwt_public_key.is_none() {
            return Err(ConfigError::Missing("AUTH_JWT_SECRET or AUTH_JWT_PUBLIC_KEY"));
        }

        Ok(self)
    }

    pub fn is_development(&self) -> bool {
        self.environment == Environment::Development
    }

    pub fn bind_address(&self) -> String {
        format!("{}:{}", self.server.host, self.server.port)
    }

    fn development(database_url: String) -> Self {
        Self {
            environment: Environment::Development,
            server: ServerConfig {
                host: "0.0.0.0".to_string(),
                port: 4000,
            },
            database: DatabaseConfig {
                url: database_url,
                max_connections: 10,
                connection_timeout: 30,
                run_migrations: true,
            },
            api: ApiConfig {
                enable_request_logging: true,
                max_request_size_bytes: 1024 * 1024, // 1MB
            },
            security: SecurityConfig {
                enable_cors: true,
                cors_origins: Vec::new(),
            },
            auth: AuthConfig {
                leeway_secs: 60,
                ..AuthConfig::default()
            },
        }
    }

    fn staging(database_url: String) -> Self {
        Self {
            environment: Environment::Staging,
            server: ServerConfig {
                host: "0.0.0.0".to_string(),
                port: 4000,
            },
            database: DatabaseConfig {
                url: database_url,
                max_connections: 20,
                connection_timeout: 10,
                run_migrations: true,
            },
            api: ApiConfig {
                enable_request_logging: true,
                max_request_size_bytes: 1024 * 1024,
            },
            security: SecurityConfig {
                enable_cors: true,
                cors_origins: Vec::new(),
            },
            auth: AuthConfig {
                leeway_secs: 30,
                ..AuthConfig::default()
            },
        }
    }

    fn production(database_url: String) -> Self {
        Self {
            environment: Environment::Production,
            server: ServerConfig {
                host: "0.0.0.0".to_string(),
                port: 4000,
            },
            database: DatabaseConfig {
                url: database_url,
                max_connections: 50,
                connection_timeout: 5,
                run_migrations: false,
            },
            api: ApiConfig {
                enable_request_logging: false,
                max_request_size_bytes: 1024 * 1024,
            },
            security: SecurityConfig {
                enable_cors: true,
                cors_origins: Vec::new(),
            },
            auth: AuthConfig {
                leeway_secs: 0,
                ..AuthConfig::default()
            },
        }
    }
}

/// Typed override; a present but unparseable value is an error, never a silent default
fn parsed<F, T>(var: &F, key: &'static str) -> Result<Option<T>, ConfigError>
where
    F: Fn(&str) -> Option<String>,
    T: FromStr,
{
    match var(key) {
        None => Ok(None),
        Some(value) => value
            .trim()
            .parse()
            .map(Some)
            .map_err(|_| ConfigError::Invalid { key, value }),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn source(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key| map.get(key).cloned()
    }

    #[test]
    fn development_defaults() {
        let config = AppConfig::from_source(source(&[
            ("DATABASE_URL", "postgres://localhost/neuromate"),
            ("AUTH_JWT_SECRET", "dev-secret"),
        ]))
        .unwrap();

        assert!(config.is_development());
        assert_eq!(config.server.port, 4000);
        assert_eq!(config.api.max_request_size_bytes, 1024 * 1024);
        assert!(config.database.run_migrations);
        assert_eq!(config.auth.jwt_secret.as_deref(), Some("dev-secret"));
    }

    #[test]
    fn env_overrides_apply_on_top_of_preset() {
        let config = AppConfig::from_source(source(&[
            ("APP_ENV", "production"),
            ("DATABASE_URL", "postgres://db/neuromate"),
            ("AUTH_JWT_PUBLIC_KEY", "-----BEGIN PUBLIC KEY-----"),
            ("PORT", "8080"),
            ("DATABASE_MAX_CONNECTIONS", "7"),
            ("SECURITY_CORS_ORIGINS", "https://a.example, https://b.example"),
        ]))
        .unwrap();

        assert_eq!(config.environment, Environment::Production);
        assert_eq!(config.server.port, 8080);
        assert_eq!(config.database.max_connections, 7);
        assert!(!config.database.run_migrations);
        assert_eq!(
            config.security.cors_origins,
            vec!["https://a.example", "https://b.example"]
        );
    }

    #[test]
    fn missing_database_url_is_an_error() {
        let err = AppConfig::from_source(source(&[("AUTH_JWT_SECRET", "s")])).unwrap_err();
        assert!(matches!(err, ConfigError::Missing("DATABASE_URL")));
    }

    #[test]
    fn missing_auth_keys_is_an_error() {
        let err = AppConfig::from_source(source(&[("DATABASE_URL", "postgres://x/y")])).unwrap_err();
        assert!(matches!(err, ConfigError::Missing(_)));
    }

    #[test]
    fn bad_port_is_rejected() {
        let err = AppConfig::from_source(source(&[
            ("DATABASE_URL", "postgres://x/y"),
            ("AUTH_JWT_SECRET", "s"),
            ("PORT", "not-a-port"),
        ]))
        .unwrap_err();
        assert!(matches!(err, ConfigError::Invalid { key: "PORT", .. }));
    }

    #[test]
    fn malformed_overrides_are_rejected() {
        for (key, value) in [
            ("DATABASE_MAX_CONNECTIONS", "ten"),
            ("DATABASE_CONNECTION_TIMEOUT", "-5"),
            ("DATABASE_RUN_MIGRATIONS", "yes please"),
            ("API_MAX_REQUEST_SIZE_BYTES", "1MB"),
            ("API_ENABLE_REQUEST_LOGGING", "on"),
            ("SECURITY_ENABLE_CORS", "maybe"),
            ("AUTH_JWT_LEEWAY_SECS", "1.5"),
            ("NEUROMATE_API_PORT", "70000"),
        ] {
            let err = AppConfig::from_source(source(&[
                ("DATABASE_URL", "postgres://x/y"),
                ("AUTH_JWT_SECRET", "s"),
                (key, value),
            ]))
            .unwrap_err();
            match err {
                ConfigError::Invalid { key: got, value: bad } => {
                    assert_eq!(got, key);
                    assert_eq!(bad, value);
                }
                other => panic!("{} should be invalid, got {:?}", key, other),
            }
        }
    }

    #[test]
    fn named_port_wins_over_generic() {
        let config = AppConfig::from_source(source(&[
            ("DATABASE_URL", "postgres://x/y"),
            ("AUTH_JWT_SECRET", "s"),
            ("PORT", "8080"),
            ("NEUROMATE_API_PORT", "9090"),
        ]))
        .unwrap();
        assert_eq!(config.server.port, 9090);
    }
}
