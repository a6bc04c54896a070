use tokio::net::TcpListener;
use tracing_subscriber::EnvFilter;

use journal::config::Config;
use journal::{bootstrap, build_app, db};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    dotenvy::dotenv().ok();

    let env_filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("journal=debug,tower_http=info"));
    tracing_subscriber::fmt().with_env_filter(env_filter).init();

    let config = Config::from_env();

    let pool = db::init_pool(&config.database_url).await?;
    bootstrap::ensure_seed_user(&pool, &config.seed_email, &config.seed_password).await?;

    let app = build_app(pool, config.secure_cookies).await?;

    let listener = TcpListener::bind(config.bind_addr).await?;
    tracing::info!("listening on {}", config.bind_addr);
    axum::serve(listener, app).await?;

    Ok(())
}
