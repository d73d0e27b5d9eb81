//! Configuration loaded from environment variables.

use std::env;
use std::net::SocketAddr;
use std::path::PathBuf;
use std::str::FromStr;
use std::time::Duration;

/// Where uploaded and generated images are kept.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StorageBackend {
    /// Files under `storage_dir`, served at `/storage`.
    Local,
    /// Supabase Storage, configured by `SUPABASE_URL` / `SUPABASE_SERVICE_KEY`.
    Supabase,
}

impl FromStr for StorageBackend {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "local" => Ok(StorageBackend::Local),
            "supabase" => Ok(StorageBackend::Supabase),
            other => Err(ConfigError::Invalid {
                name: "STORAGE_BACKEND",
                value: other.to_string(),
            }),
        }
    }
}

/// Which image generator handles edits.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GeneratorBackend {
    /// OpenAI `images/edits`, configured by the `OPENAI_*` variables.
    OpenAi,
    /// Returns the prepared photo unchanged. For local development.
    Echo,
}

impl FromStr for GeneratorBackend {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "openai" => Ok(GeneratorBackend::OpenAi),
            "echo" | "mock" => Ok(GeneratorBackend::Echo),
            other => Err(ConfigError::Invalid {
                name: "IMAGE_GENERATOR",
                value: other.to_string(),
            }),
        }
    }
}

/// API server configuration.
#[derive(Debug, Clone)]
pub struct Config {
    /// Server bind address.
    pub addr: SocketAddr,
    /// SQLite database URL.
    pub database_url: String,
    /// HS256 secret access tokens are signed with.
    pub jwt_secret: String,
    pub storage: StorageBackend,
    /// Root directory of the local object store.
    pub storage_dir: PathBuf,
    /// Base URL local object URLs are built from.
    pub public_base_url: String,
    pub generator: GeneratorBackend,
    /// Logo stamped onto finished images. No watermark when unset.
    pub logo_path: Option<PathBuf>,
    /// Tickets a new account starts with.
    pub initial_tickets: i64,
    /// Token required by the ticket grant endpoint. Grants are disabled when unset.
    pub admin_token: Option<String>,
    /// Complete failed portraits with a stock photo instead of failing.
    pub stock_fallback: bool,
    /// How often the status stream re-reads the row.
    pub sse_poll_interval: Duration,
    /// Request body limit in bytes.
    pub max_body_bytes: usize,
}

impl Config {
    pub const DEFAULT_ADDR: &'static str = "127.0.0.1:3000";
    pub const DEFAULT_DATABASE_URL: &'static str = "sqlite:dolphin.db?mode=rwc";
    pub const DEFAULT_INITIAL_TICKETS: i64 = 3;
    pub const DEFAULT_MAX_BODY_BYTES: usize = 20 * 1024 * 1024;

    /// Defaults for everything except the token secret.
    pub fn new(jwt_secret: impl Into<String>) -> Self {
        Self {
            addr: SocketAddr::from(([127, 0, 0, 1], 3000)),
            database_url: Self::DEFAULT_DATABASE_URL.to_string(),
            jwt_secret: jwt_secret.into(),
            storage: StorageBackend::Local,
            storage_dir: PathBuf::from("storage"),
            public_base_url: format!("http://{}", Self::DEFAULT_ADDR),
            generator: GeneratorBackend::OpenAi,
            logo_path: None,
            initial_tickets: Self::DEFAULT_INITIAL_TICKETS,
            admin_token: None,
            stock_fallback: true,
            sse_poll_interval: Duration::from_secs(2),
            max_body_bytes: Self::DEFAULT_MAX_BODY_BYTES,
        }
    }

    /// Load configuration from environment variables.
    ///
    /// | Variable | Description | Default |
    /// |----------|-------------|---------|
    /// | `API_ADDR` | Server bind address | `127.0.0.1:3000` |
    /// | `DATABASE_URL` | SQLite database URL | `sqlite:dolphin.db?mode=rwc` |
    /// | `AUTH_JWT_SECRET` | Access token secret | (required) |
    /// | `STORAGE_BACKEND` | `local` or `supabase` | `local` |
    /// | `STORAGE_DIR` | Local store directory | `storage` |
    /// | `PUBLIC_BASE_URL` | Base of local object URLs | `http://127.0.0.1:3000` |
    /// | `IMAGE_GENERATOR` | `openai` or `echo` | `openai` |
    /// | `LOGO_PATH` | Watermark logo | (none) |
    /// | `INITIAL_TICKETS` | Tickets for new accounts | `3` |
    /// | `TICKETS_ADMIN_TOKEN` | Ticket grant token | (grants disabled) |
    /// | `STOCK_FALLBACK` | Stock photo on portrait failure | `true` |
    /// | `SSE_POLL_INTERVAL_SECS` | Status stream re-query interval | `2` |
    /// | `MAX_BODY_BYTES` | Request body limit | `20971520` |
    pub fn from_env() -> Result<Self, ConfigError> {
        let jwt_secret = env::var("AUTH_JWT_SECRET")
            .ok()
            .filter(|s| !s.trim().is_empty())
            .ok_or(ConfigError::Missing("AUTH_JWT_SECRET"))?;

        let mut config = Self::new(jwt_secret);

        if let Some(addr) = var("API_ADDR") {
            config.addr = addr.parse().map_err(|_| ConfigError::Invalid {
                name: "API_ADDR",
                value: addr,
            })?;
        }
        if let Some(url) = var("DATABASE_URL") {
            config.database_url = url;
        }
        if let Some(backend) = var("STORAGE_BACKEND") {
            config.storage = backend.parse()?;
        }
        if let Some(dir) = var("STORAGE_DIR") {
            config.storage_dir = PathBuf::from(dir);
        }
        config.public_base_url = var("PUBLIC_BASE_URL")
            .unwrap_or_else(|| format!("http://{}", config.addr))
            .trim_end_matches('/')
            .to_string();
        if let Some(generator) = var("IMAGE_GENERATOR") {
            config.generator = generator.parse()?;
        }
        config.logo_path = var("LOGO_PATH").map(PathBuf::from);
        if let Some(tickets) = parsed::<i64>("INITIAL_TICKETS")? {
            if tickets < 0 {
                return Err(ConfigError::Invalid {
                    name: "INITIAL_TICKETS",
                    value: tickets.to_string(),
                });
            }
            config.initial_tickets = tickets;
        }
        config.admin_token = var("TICKETS_ADMIN_TOKEN");
        if let Some(flag) = var("STOCK_FALLBACK") {
            config.stock_fallback = parse_flag("STOCK_FALLBACK", &flag)?;
        }
        if let Some(secs) = parsed::<u64>("SSE_POLL_INTERVAL_SECS")? {
            config.sse_poll_interval = Duration::from_secs(secs.max(1));
        }
        if let Some(bytes) = parsed::<usize>("MAX_BODY_BYTES")? {
            config.max_body_bytes = bytes;
        }

        Ok(config)
    }
}

/// A set, non-blank variable.
fn var(name: &str) -> Option<String> {
    env::var(name)
        .ok()
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

fn parsed<T: FromStr>(name: &'static str) -> Result<Option<T>, ConfigError> {
    match var(name) {
        Some(value) => value
            .parse()
            .map(Some)
            .map_err(|_| ConfigError::Invalid { name, value }),
        None => Ok(None),
    }
}

fn parse_flag(name: &'static str, value: &str) -> Result<bool, ConfigError> {
    match value.to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Ok(true),
        "0" | "false" | "no" | "off" => Ok(false),
        _ => Err(ConfigError::Invalid {
            name,
            value: value.to_string(),
        }),
    }
}

/// Configuration errors.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("{0} environment variable is required")]
    Missing(&'static str),

    #[error("invalid {name}: {value:?}")]
    Invalid { name: &'static str, value: String },
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Mutex;

    static ENV_LOCK: Mutex<()> = Mutex::new(());

    const VARS: &[&str] = &[
        "AUTH_JWT_SECRET",
        "API_ADDR",
        "DATABASE_URL",
        "STORAGE_BACKEND",
        "STORAGE_DIR",
        "PUBLIC_BASE_URL",
        "IMAGE_GENERATOR",
        "LOGO_PATH",
        "INITIAL_TICKETS",
        "TICKETS_ADMIN_TOKEN",
        "STOCK_FALLBACK",
        "SSE_POLL_INTERVAL_SECS",
        "MAX_BODY_BYTES",
    ];

    fn clear() {
        for name in VARS {
            env::remove_var(name);
        }
    }

    #[test]
    fn test_requires_secret() {
        let _guard = ENV_LOCK.lock().unwrap();
        clear();

        assert!(matches!(
            Config::from_env(),
            Err(ConfigError::Missing("AUTH_JWT_SECRET"))
        ));
    }

    #[test]
    fn test_defaults() {
        let _guard = ENV_LOCK.lock().unwrap();
        clear();
        env::set_var("AUTH_JWT_SECRET", "secret");

        let config = Config::from_env().unwrap();
        assert_eq!(config.addr.to_string(), "127.0.0.1:3000");
        assert_eq!(config.database_url, "sqlite:dolphin.db?mode=rwc");
        assert_eq!(config.storage, StorageBackend::Local);
        assert_eq!(config.public_base_url, "http://127.0.0.1:3000");
        assert_eq!(config.generator, GeneratorBackend::OpenAi);
        assert_eq!(config.initial_tickets, 3);
        assert!(config.admin_token.is_none());
        assert!(config.stock_fallback);
        assert_eq!(config.sse_poll_interval, Duration::from_secs(2));
        assert_eq!(config.max_body_bytes, 20_971_520);
        clear();
    }

    #[test]
    fn test_overrides() {
        let _guard = ENV_LOCK.lock().unwrap();
        clear();
        env::set_var("AUTH_JWT_SECRET", "secret");
        env::set_var("API_ADDR", "0.0.0.0:8080");
        env::set_var("STORAGE_BACKEND", "Supabase");
        env::set_var("IMAGE_GENERATOR", "echo");
        env::set_var("PUBLIC_BASE_URL", "https://studio.example/");
        env::set_var("INITIAL_TICKETS", "5");
        env::set_var("STOCK_FALLBACK", "off");
        env::set_var("TICKETS_ADMIN_TOKEN", "admin");

        let config = Config::from_env().unwrap();
        assert_eq!(config.addr.port(), 8080);
        assert_eq!(config.storage, StorageBackend::Supabase);
        assert_eq!(config.generator, GeneratorBackend::Echo);
        assert_eq!(config.public_base_url, "https://studio.example");
        assert_eq!(config.initial_tickets, 5);
        assert!(!config.stock_fallback);
        assert_eq!(config.admin_token.as_deref(), Some("admin"));
        clear();
    }

    #[test]
    fn test_rejects_bad_values() {
        let _guard = ENV_LOCK.lock().unwrap();
        clear();
        env::set_var("AUTH_JWT_SECRET", "secret");

        env::set_var("STORAGE_BACKEND", "s3");
        assert!(matches!(
            Config::from_env(),
            Err(ConfigError::Invalid { name: "STORAGE_BACKEND", .. })
        ));
        env::remove_var("STORAGE_BACKEND");

        env::set_var("INITIAL_TICKETS", "-1");
        assert!(Config::from_env().is_err());
        env::remove_var("INITIAL_TICKETS");

        env::set_var("STOCK_FALLBACK", "maybe");
        assert!(Config::from_env().is_err());
        clear();
    }
}
