use figment::{
    Figment,
    providers::{Env, Serialized},
};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

use crate::error::PortalError;

/// Secret used when `SECRET_KEY` is not provided. Fine for local runs only.
pub const DEFAULT_SECRET_KEY: &str = "secret123";

/// How newly registered passwords are written to `mobile_banking_users.password`.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PasswordScheme {
    /// Reversible shift transform, readable by older deployments.
    #[default]
    Legacy,
    /// Salted argon2 PHC string.
    Argon2,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    pub database_url: String,
    pub secret_key: String,
    pub listen_addr: String,
    pub loglevel: String,
    pub static_dir: PathBuf,
    pub password_scheme: PasswordScheme,
    pub insecure_cookie: bool,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            database_url: "sqlite://users.db?mode=rwc".to_string(),
            secret_key: DEFAULT_SECRET_KEY.to_string(),
            listen_addr: "0.0.0.0:8000".to_string(),
            loglevel: "info".to_string(),
            static_dir: PathBuf::from("static"),
            password_scheme: PasswordScheme::default(),
            insecure_cookie: false,
        }
    }
}

impl Config {
    /// Defaults overlaid with the process environment.
    pub fn from_env() -> Result<Self, PortalError> {
        Self::figment().extract().map_err(|e| PortalError::Config(Box::new(e)))
    }

    pub fn figment() -> Figment {
        Figment::from(Serialized::defaults(Config::default())).merge(Env::raw().only(&[
            "database_url",
            "secret_key",
            "listen_addr",
            "loglevel",
            "static_dir",
            "password_scheme",
            "insecure_cookie",
        ]))
    }

    pub fn uses_default_secret(&self) -> bool {
        self.secret_key == DEFAULT_SECRET_KEY
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_without_environment() {
        let cfg: Config = Figment::from(Serialized::defaults(Config::default()))
            .extract()
            .expect("defaults extract");
        assert_eq!(cfg.password_scheme, PasswordScheme::Legacy);
        assert!(cfg.uses_default_secret());
        assert!(cfg.database_url.starts_with("sqlite:"));
    }

    #[test]
    fn environment_overrides_defaults() {
        figment::Jail::expect_with(|jail| {
            jail.set_env("DATABASE_URL", "postgres://bank@localhost/portal");
            jail.set_env("PASSWORD_SCHEME", "argon2");
            jail.set_env("INSECURE_COOKIE", "true");
            let cfg = Config::from_env().expect("config loads");
            assert_eq!(cfg.database_url, "postgres://bank@localhost/portal");
            assert_eq!(cfg.password_scheme, PasswordScheme::Argon2);
            assert!(cfg.insecure_cookie);
            Ok(())
        });
    }
}
