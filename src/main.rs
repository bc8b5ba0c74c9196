use mimalloc::MiMalloc;
use tokio::net::TcpListener;
use tracing::{info, warn};
use tracing_subscriber::{EnvFilter, layer::SubscriberExt, util::SubscriberInitExt};

use mobile_banking_portal::db::{Database, UserStorage};
use mobile_banking_portal::server::router::{PortalState, portal_router};
use mobile_banking_portal::{Bootstrapper, Config};

#[global_allocator]
static GLOBAL: MiMalloc = MiMalloc;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    dotenvy::dotenv().ok();

    let cfg = Config::from_env()?;

    let env_filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(cfg.loglevel.clone()));
    tracing_subscriber::registry()
        .with(env_filter)
        .with(
            tracing_subscriber::fmt::layer()
                .with_level(true)
                .with_target(false),
        )
        .init();

    info!(
        listen_addr = %cfg.listen_addr,
        password_scheme = ?cfg.password_scheme,
        static_dir = %cfg.static_dir.display(),
        insecure_cookie = cfg.insecure_cookie
    );
    if !cfg.insecure_cookie {
        warn!(
            listen_addr = %cfg.listen_addr,
            "session cookies are marked Secure; serve behind HTTPS or set INSECURE_COOKIE=true, \
             otherwise browsers drop the session and logins bounce back to /login"
        );
    }
    if cfg.uses_default_secret() {
        warn!("SECRET_KEY not set; sessions are encrypted with the built-in default");
    }

    let db = Database::connect_lazy(&cfg.database_url)?;
    Bootstrapper::new(db.clone(), cfg.database_url.clone())
        .run()
        .await;

    let state = PortalState::new(UserStorage::new(db), &cfg);
    let app = portal_router(state);

    let listener = TcpListener::bind(&cfg.listen_addr).await?;
    info!("HTTP server listening on {}", cfg.listen_addr);
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;
    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        warn!(error = %e, "failed to listen for shutdown signal");
        std::future::pending::<()>().await;
    }
    info!("shutdown signal received");
}
