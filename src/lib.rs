pub mod auth;
pub mod config;
pub mod db;
pub mod error;
pub mod handlers;
pub mod middleware;
pub mod server;
pub mod types;

pub use auth::CredentialVerifier;
pub use config::Config;
pub use db::bootstrap::Bootstrapper;
pub use error::PortalError;
