use std::path::PathBuf;
use std::sync::Arc;

use axum::{Router, extract::FromRef, routing::get};
use axum_extra::extract::cookie::Key;
use sha2::{Digest, Sha512};

use crate::auth::CredentialVerifier;
use crate::config::{Config, PasswordScheme};
use crate::db::UserStorage;
use crate::handlers::{account, assets, dashboard};

#[derive(Clone)]
pub struct PortalState {
    pub users: UserStorage,
    pub verifier: CredentialVerifier,
    pub password_scheme: PasswordScheme,
    pub static_dir: Arc<PathBuf>,
    pub insecure_cookie: bool,
    cookie_key: Key,
}

impl PortalState {
    pub fn new(users: UserStorage, cfg: &Config) -> Self {
        Self {
            users,
            verifier: CredentialVerifier::default(),
            password_scheme: cfg.password_scheme,
            static_dir: Arc::new(cfg.static_dir.clone()),
            insecure_cookie: cfg.insecure_cookie,
            cookie_key: cookie_key(&cfg.secret_key),
        }
    }
}

/// Stretch the configured secret to the 64 bytes a cookie `Key` needs.
fn cookie_key(secret: &str) -> Key {
    let digest = Sha512::digest(secret.as_bytes());
    Key::from(digest.as_slice())
}

impl FromRef<PortalState> for Key {
    fn from_ref(state: &PortalState) -> Self {
        state.cookie_key.clone()
    }
}

pub fn portal_router(state: PortalState) -> Router {
    Router::new()
        .route("/", get(dashboard::home))
        .route(
            "/register",
            get(account::register_page).post(account::register_submit),
        )
        .route("/login", get(account::login_page).post(account::login_submit))
        .route("/dashboard", get(dashboard::dashboard))
        .route("/logout", get(account::logout))
        .route("/favicon.ico", get(assets::favicon))
        .with_state(state)
}
