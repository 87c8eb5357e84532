//! Process configuration read from the environment.

use api::{ApiConfig, Environment};
use authz::Role;
use catalog::{AdminAccount, AdminSecret};
use std::path::PathBuf;
use std::str::FromStr;
use std::time::Duration;

const DEFAULT_SESSION_MAX_AGE_SECS: u64 = 24 * 60 * 60;
const DEFAULT_MIN_BOOKS_COUNT: u64 = 20;

/// Settings for the whole process.
///
/// Values that fail to parse fall back to their default; the problem is
/// recorded in `warnings` so it can be logged once logging is up.
#[derive(Debug, Clone)]
pub struct AppConfig {
    pub host: String,
    pub port: u16,
    pub database_url: String,
    pub environment: Environment,
    pub session_cookie_name: String,
    pub session_max_age: Duration,
    pub log_dir: PathBuf,
    pub admin_username: String,
    pub admin_password: String,
    pub admin_password_hash: Option<String>,
    pub admin_role: Role,
    pub auto_seed_books: bool,
    pub min_books_count: u64,
    pub warnings: Vec<String>,
}

impl AppConfig {
    /// Load `.env` if present, then read the process environment.
    pub fn from_env() -> Self {
        dotenvy::dotenv().ok();
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let mut warnings = Vec::new();
        let text = |key: &str, default: &str| -> String {
            lookup(key)
                .map(|v| v.trim().to_string())
                .filter(|v| !v.is_empty())
                .unwrap_or_else(|| default.to_string())
        };

        let port = parse_or(&lookup, "PORT", 3000u16, &mut warnings);
        let session_max_age = parse_or(
            &lookup,
            "SESSION_MAX_AGE_SECS",
            DEFAULT_SESSION_MAX_AGE_SECS,
            &mut warnings,
        );
        let min_books_count = parse_or(&lookup, "MIN_BOOKS_COUNT", DEFAULT_MIN_BOOKS_COUNT, &mut warnings);

        let admin_role = match lookup("ADMIN_ROLE") {
            None => Role::Admin,
            Some(raw) => Role::parse_strict(&raw).unwrap_or_else(|| {
                warnings.push(format!("ADMIN_ROLE '{}' is not a known role, using admin", raw));
                Role::Admin
            }),
        };

        Self {
            host: text("HOST", "0.0.0.0"),
            port,
            database_url: text("DATABASE_URL", "sqlite:data/bookshelf.db"),
            environment: Environment::parse(&text("APP_ENV", "development")),
            session_cookie_name: text("SESSION_COOKIE_NAME", "book_library_sid"),
            session_max_age: Duration::from_secs(session_max_age),
            log_dir: PathBuf::from(text("LOG_DIR", "data/logs")),
            admin_username: text("ADMIN_USERNAME", "admin"),
            admin_password: lookup("ADMIN_PASSWORD").unwrap_or_else(|| "admin12345".to_string()),
            admin_password_hash: lookup("ADMIN_PASSWORD_HASH")
                .map(|v| v.trim().to_string())
                .filter(|v| !v.is_empty()),
            admin_role,
            auto_seed_books: lookup("AUTO_SEED_BOOKS").map_or(true, |v| parse_flag(&v)),
            min_books_count,
            warnings,
        }
    }

    /// Log the problems found while reading the environment.
    pub fn report_warnings(&self) {
        for warning in &self.warnings {
            tracing::warn!("{}", warning);
        }
    }

    pub fn api_config(&self) -> ApiConfig {
        ApiConfig::new()
            .with_host(self.host.clone())
            .with_port(self.port)
            .with_environment(self.environment)
            .with_session_cookie_name(self.session_cookie_name.clone())
            .with_session_max_age(self.session_max_age)
    }

    /// The account created at startup when missing. A configured hash wins
    /// over the plain password.
    pub fn admin_account(&self) -> AdminAccount {
        let secret = match &self.admin_password_hash {
            Some(hash) => AdminSecret::Hashed(hash.clone()),
            None => AdminSecret::Plain(self.admin_password.clone()),
        };
        AdminAccount {
            username: self.admin_username.clone(),
            secret,
            role: self.admin_role,
        }
    }
}

fn parse_or<T: FromStr>(
    lookup: &impl Fn(&str) -> Option<String>,
    key: &str,
    default: T,
    warnings: &mut Vec<String>,
) -> T {
    match lookup(key) {
        None => default,
        Some(raw) => raw.trim().parse().unwrap_or_else(|_| {
            warnings.push(format!("{} '{}' is not valid, using the default", key, raw));
            default
        }),
    }
}

/// Everything except `0`, `false`, `no` and `off` (any case) is true.
fn parse_flag(value: &str) -> bool {
    !matches!(
        value.trim().to_ascii_lowercase().as_str(),
        "0" | "false" | "no" | "off"
    )
}
