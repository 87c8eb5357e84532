use crate::{create_router, AppState};
use catalog::Catalog;
use std::fmt;
use std::sync::Arc;
use std::time::Duration;
use tower_sessions::session_store::ExpiredDeletion;
use tower_sessions_sqlx_store::SqliteStore;
use tracing::{info, warn};

/// Deployment environment. Anything but `production` counts as development.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Environment {
    #[default]
    Development,
    Production,
}

impl Environment {
    pub fn parse(value: &str) -> Self {
        if value.trim().eq_ignore_ascii_case("production") {
            Environment::Production
        } else {
            Environment::Development
        }
    }
}

impl fmt::Display for Environment {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Environment::Development => f.write_str("development"),
            Environment::Production => f.write_str("production"),
        }
    }
}

/// API server configuration
#[derive(Debug, Clone)]
pub struct ApiConfig {
    pub host: String,
    pub port: u16,
    pub environment: Environment,
    pub session_cookie_name: String,
    /// Sessions expire after this long without a request.
    pub session_max_age: Duration,
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self {
            host: "0.0.0.0".to_string(),
            port: 3000,
            environment: Environment::Development,
            session_cookie_name: "book_library_sid".to_string(),
            session_max_age: Duration::from_secs(24 * 60 * 60),
        }
    }
}

impl ApiConfig {
    /// Create a new API configuration with default settings
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_host(mut self, host: impl Into<String>) -> Self {
        self.host = host.into();
        self
    }

    /// Set the port
    pub fn with_port(mut self, port: u16) -> Self {
        self.port = port;
        self
    }

    pub fn with_environment(mut self, environment: Environment) -> Self {
        self.environment = environment;
        self
    }

    pub fn with_session_cookie_name(mut self, name: impl Into<String>) -> Self {
        self.session_cookie_name = name.into();
        self
    }

    pub fn with_session_max_age(mut self, max_age: Duration) -> Self {
        self.session_max_age = max_age;
        self
    }

    /// Error bodies include their underlying details.
    pub fn expose_error_details(&self) -> bool {
        self.environment == Environment::Development
    }

    /// Session cookies are only sent over HTTPS.
    pub fn secure_cookies(&self) -> bool {
        self.environment == Environment::Production
    }

    pub fn bind_address(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

/// How often expired session records are purged.
const SESSION_SWEEP_INTERVAL: Duration = Duration::from_secs(60 * 60);

/// Start the API server and run until Ctrl-C.
pub async fn start_server_with_config(
    catalog: Catalog,
    sessions: SqliteStore,
    config: ApiConfig,
) -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
    sessions.migrate().await?;
    info!("Session table ready");
    spawn_session_sweeper(sessions.clone());

    let addr = config.bind_address();
    let port = config.port;
    let environment = config.environment;

    let state = AppState {
        catalog,
        config: Arc::new(config),
    };
    let app = create_router(state, sessions);

    let listener = tokio::net::TcpListener::bind(&addr).await?;

    info!(%environment, "API server listening on {}", addr);
    info!("Swagger UI available at http://localhost:{}/api/swagger", port);

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    Ok(())
}

fn spawn_session_sweeper(sessions: SqliteStore) {
    tokio::spawn(async move {
        if let Err(e) = sessions
            .continuously_delete_expired(SESSION_SWEEP_INTERVAL)
            .await
        {
            warn!("Expired session cleanup stopped: {}", e);
        }
    });
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        warn!("Failed to listen for shutdown signal: {}", e);
        std::future::pending::<()>().await;
    }
    info!("Shutdown signal received");
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    #[case("production", Environment::Production)]
    #[case(" PRODUCTION ", Environment::Production)]
    #[case("development", Environment::Development)]
    #[case("staging", Environment::Development)]
    #[case("", Environment::Development)]
    fn test_environment_parse(#[case] raw: &str, #[case] expected: Environment) {
        assert_eq!(Environment::parse(raw), expected);
    }

    #[test]
    fn test_production_hides_details_and_secures_cookies() {
        let config = ApiConfig::new().with_environment(Environment::Production);
        assert!(!config.expose_error_details());
        assert!(config.secure_cookies());

        let config = ApiConfig::new();
        assert!(config.expose_error_details());
        assert!(!config.secure_cookies());
    }

    #[test]
    fn test_bind_address() {
        let config = ApiConfig::new().with_host("127.0.0.1").with_port(8080);
        assert_eq!(config.bind_address(), "127.0.0.1:8080");
    }
}
