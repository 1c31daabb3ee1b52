//! Process settings. Read from an optional `settings.toml` (path in
//! `RECIPES_SETTINGS`), then `RECIPES__SECTION__KEY` environment variables,
//! then the flat variables older deployments set (`PORT`, `JWT_SECRET`,
//! `DB_HOST`, ...).

use config::{Config, ConfigError, Environment, File};
use serde::Deserialize;
use url::Url;

#[derive(Debug, Deserialize)]
pub struct App {
    pub level: String,
}

#[derive(Clone, Debug, Deserialize, PartialEq, Eq)]
pub struct Postgres {
    pub host: String,
    pub port: u16,
    pub user: String,
    pub password: String,
    pub name: String,
}

#[derive(Clone, Debug, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum Database {
    Memory,
    Sqlite(String),
    Postgres(Postgres),
}

impl Database {
    pub fn url(&self) -> Result<String, ConfigError> {
        match self {
            Database::Memory => Ok(String::from("sqlite::memory:")),
            Database::Sqlite(path) => Ok(format!("sqlite:{}?mode=rwc", path)),
            Database::Postgres(pg) => pg.url(),
        }
    }
}

impl Postgres {
    /// Credentials are percent-encoded into the user-info part.
    fn url(&self) -> Result<String, ConfigError> {
        let invalid = || ConfigError::Message(format!("invalid database host: {}", self.host));
        let mut url = Url::parse(&format!("postgres://{}:{}", self.host, self.port))
            .map_err(|_| invalid())?;
        url.set_path(&self.name);
        url.set_username(&self.user).map_err(|_| invalid())?;
        url.set_password(Some(&self.password).filter(|p| !p.is_empty()).map(String::as_str))
            .map_err(|_| invalid())?;
        Ok(url.into())
    }
}

#[derive(Debug, Deserialize)]
pub struct Server {
    pub bind: Option<String>,
    pub port: u16,
    pub database: Database,
    pub jwt_secret: String,
    pub token_ttl_hours: i64,
    pub cookie_secure: bool,
    pub frontend_url: Option<String>,
}

/// Account ensured at startup when both e-mail and password are set.
#[derive(Debug, Default, Deserialize)]
pub struct Admin {
    pub email: Option<String>,
    pub password: Option<String>,
    pub name: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct Settings {
    pub app: App,
    pub server: Server,
    #[serde(default)]
    pub admin: Admin,
}

impl Settings {
    pub fn new() -> Result<Self, ConfigError> {
        let lookup = |key: &str| std::env::var(key).ok().filter(|v| !v.is_empty());
        let file = lookup("RECIPES_SETTINGS").unwrap_or_else(|| "settings".to_string());

        let settings = Config::builder()
            .set_default("app.level", "info")?
            .set_default("server.port", 5000)?
            .set_default("server.database", "memory")?
            .set_default("server.token_ttl_hours", 24)?
            .set_default("server.cookie_secure", false)?
            .add_source(File::with_name(&file).required(false))
            .add_source(Environment::with_prefix("RECIPES").separator("__"))
            .set_override_option("server.port", lookup("PORT"))?
            .set_override_option("server.jwt_secret", lookup("JWT_SECRET"))?
            .set_override_option("server.frontend_url", lookup("FRONTEND_URL"))?
            .set_override_option("admin.email", lookup("ADMIN_EMAIL"))?
            .set_override_option("admin.password", lookup("ADMIN_PASSWORD"))?
            .build()?;

        let mut settings: Settings = settings.try_deserialize()?;
        if let Some(pg) = legacy_postgres(lookup)? {
            settings.server.database = Database::Postgres(pg);
        }
        Ok(settings)
    }
}

/// `DB_HOST` and friends select PostgreSQL when `DB_HOST` or `DB_NAME` is set.
fn legacy_postgres(
    lookup: impl Fn(&str) -> Option<String>,
) -> Result<Option<Postgres>, ConfigError> {
    if lookup("DB_HOST").is_none() && lookup("DB_NAME").is_none() {
        return Ok(None);
    }
    let port = match lookup("DB_PORT") {
        Some(raw) => raw
            .parse()
            .map_err(|_| ConfigError::Message(format!("DB_PORT is not a port: {raw}")))?,
        None => 5432,
    };
    Ok(Some(Postgres {
        host: lookup("DB_HOST").unwrap_or_else(|| "localhost".to_string()),
        port,
        user: lookup("DB_USER").unwrap_or_else(|| "postgres".to_string()),
        password: lookup("DB_PASSWORD").unwrap_or_default(),
        name: lookup("DB_NAME").unwrap_or_else(|| "recipes".to_string()),
    }))
}
