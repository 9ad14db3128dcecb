use std::{net::SocketAddr, sync::Arc};

use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use bazaar_api::{
    build_app,
    config::AppConfig,
    db::{create_orm_conn, create_pool, run_migrations},
    state::AppState,
    store::OrmStore,
};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "info,bazaar_api=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let config = AppConfig::from_env()?;
    let pool = create_pool(&config.database_url).await?;

    run_migrations(&pool).await?;

    let store = Arc::new(OrmStore::new(create_orm_conn(pool)));
    let app = build_app(AppState::new(store, &config));

    tracing::info!(
        session_secs = config.session_token_duration.num_seconds(),
        shipping = %config.pricing.shipping_fee,
        tax_rate = %config.pricing.tax_rate,
        "pricing and session policy loaded"
    );

    let addr = SocketAddr::from((config.host.parse::<std::net::IpAddr>()?, config.port));
    tracing::info!("listening on {}", addr);

    axum::serve(tokio::net::TcpListener::bind(addr).await?, app).await?;

    Ok(())
}
