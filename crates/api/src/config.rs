use crate::auth::jwt::JwtConfig;

/// Server configuration loaded from environment variables.
///
/// Secrets and external endpoints are read exactly once at startup; handlers
/// and the engine only ever see this struct via `AppState`.
#[derive(Debug, Clone)]
pub struct ServerConfig {
    /// Bind address (default: `0.0.0.0`).
    pub host: String,
    /// Bind port (default: `3000`).
    pub port: u16,
    /// Allowed CORS origins, parsed from comma-separated `CORS_ORIGINS`.
    pub cors_origins: Vec<String>,
    /// HTTP request timeout in seconds (default: `30`).
    pub request_timeout_secs: u64,
    /// Shared secret the worker pool must present on callbacks.
    pub worker_secret: String,
    /// Object-storage bucket worker outputs are registered under.
    pub output_bucket: String,
    /// JWT validation configuration.
    pub jwt: JwtConfig,
}

impl ServerConfig {
    /// Load configuration from environment variables with defaults.
    ///
    /// | Env Var                | Required | Default       |
    /// |------------------------|----------|---------------|
    /// | `HOST`                 | no       | `0.0.0.0`     |
    /// | `PORT`                 | no       | `3000`        |
    /// | `CORS_ORIGINS`         | no       | `http://localhost:5173` |
    /// | `REQUEST_TIMEOUT_SECS` | no       | `30`          |
    /// | `WORKER_SHARED_SECRET` | **yes**  | --            |
    /// | `OUTPUT_BUCKET`        | no       | `fuze-output` |
    ///
    /// # Panics
    ///
    /// Panics when a required variable is missing or a numeric variable
    /// fails to parse; misconfiguration should fail fast at startup.
    pub fn from_env() -> Self {
        let host = std::env::var("HOST").unwrap_or_else(|_| "0.0.0.0".into());

        let port: u16 = std::env::var("PORT")
            .unwrap_or_else(|_| "3000".into())
            .parse()
            .expect("PORT must be a valid u16");

        let cors_origins: Vec<String> = std::env::var("CORS_ORIGINS")
            .unwrap_or_else(|_| "http://localhost:5173".into())
            .split(',')
            .map(|s| s.trim().to_string())
            .filter(|s| !s.is_empty())
            .collect();

        let request_timeout_secs: u64 = std::env::var("REQUEST_TIMEOUT_SECS")
            .unwrap_or_else(|_| "30".into())
            .parse()
            .expect("REQUEST_TIMEOUT_SECS must be a valid u64");

        let worker_secret = std::env::var("WORKER_SHARED_SECRET")
            .expect("WORKER_SHARED_SECRET must be set in the environment");
        assert!(
            !worker_secret.is_empty(),
            "WORKER_SHARED_SECRET must not be empty"
        );

        let output_bucket =
            std::env::var("OUTPUT_BUCKET").unwrap_or_else(|_| "fuze-output".into());

        let jwt = JwtConfig::from_env();

        Self {
            host,
            port,
            cors_origins,
            request_timeout_secs,
            worker_secret,
            output_bucket,
            jwt,
        }
    }
}
