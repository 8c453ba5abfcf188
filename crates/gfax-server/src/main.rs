mod config;

use std::net::SocketAddr;
use std::sync::Arc;

use tower_http::trace::TraceLayer;
use tracing::info;

use gfax_api::AppStateInner;
use gfax_auth::LoginTokenSigner;
use gfax_mail::Mailer;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load .env if present
    let _ = dotenvy::dotenv();

    // Init logging
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "gfax=debug,tower_http=debug".into()),
        )
        .init();

    let config = config::Config::from_env()?;

    let db = gfax_db::Database::open(&config.db_path)?;
    let mailer = Mailer::new(&config.mail)?;

    let state = Arc::new(AppStateInner {
        db,
        tokens: LoginTokenSigner::new(&config.secret),
        mailer,
        secret: config.secret.clone(),
        public_url: config.public_url.clone(),
        token_max_age: config.token_max_age,
    });

    let app = gfax_api::router(state).layer(TraceLayer::new_for_http());

    let addr: SocketAddr = format!("{}:{}", config.host, config.port).parse()?;
    info!("GFAX server listening on {}", addr);

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
