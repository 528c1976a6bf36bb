//! Campus marketplace entry point: loads settings, wires adapters, and serves
//! the REST API, uploads, live channel, and OpenAPI docs.

mod server;

use std::path::Path;

use actix_web::web;
use cap_std::{ambient_authority, fs::Dir};
use color_eyre::eyre::{Result, WrapErr, eyre};
use ortho_config::OrthoConfig;
use tracing::{info, warn};
use tracing_subscriber::{EnvFilter, fmt};
use zeroize::Zeroizing;

use campus_trade::inbound::http::health::HealthState;
use campus_trade::inbound::ws::state::OriginPolicy;
use campus_trade::outbound::persistence::{DbPool, PoolConfig, run_pending_migrations};
use server::settings::AppSettings;
use server::{ServerConfig, create_server};

/// Read the signing secret without leaving copies behind.
fn read_secret(path: &Path) -> Result<Zeroizing<Vec<u8>>> {
    let parent = path
        .parent()
        .filter(|parent| !parent.as_os_str().is_empty())
        .unwrap_or_else(|| Path::new("."));
    let name = path
        .file_name()
        .ok_or_else(|| eyre!("jwt secret path {} has no file name", path.display()))?;
    let dir = Dir::open_ambient_dir(parent, ambient_authority())
        .wrap_err_with(|| format!("open {}", parent.display()))?;
    let mut secret = Zeroizing::new(
        dir.read(name)
            .wrap_err_with(|| format!("read jwt secret {}", path.display()))?,
    );
    while secret.last().is_some_and(u8::is_ascii_whitespace) {
        secret.pop();
    }
    if secret.is_empty() {
        return Err(eyre!("jwt secret {} is empty", path.display()));
    }
    Ok(secret)
}

async fn connect_database(config: PoolConfig) -> Result<DbPool> {
    let url = config.database_url().to_owned();
    let applied = tokio::task::spawn_blocking(move || run_pending_migrations(&url))
        .await
        .wrap_err("migration task panicked")??;
    info!(applied, "database schema up to date");
    DbPool::new(config).await.wrap_err("build database pool")
}

/// Application bootstrap.
#[actix_web::main]
async fn main() -> Result<()> {
    color_eyre::install()?;
    if let Err(e) = fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .json()
        .try_init()
    {
        warn!(error = %e, "tracing init failed");
    }

    let settings = AppSettings::load_from_iter(std::env::args_os()).wrap_err("load settings")?;
    let bind_addr = settings.bind_addr()?;
    let secret = read_secret(settings.jwt_secret_file()?)?;
    let origins = OriginPolicy::new(
        settings.allowed_origins(),
        settings.allow_localhost_origins(),
    );

    let mut config = ServerConfig::new(bind_addr, settings.upload_dir(), secret, origins)
        .with_rules(settings.listing_rules())
        .with_seller_seed_file(settings.seller_seed_file.clone());
    match settings.pool_config() {
        Some(pool) => config = config.with_db_pool(connect_database(pool).await?),
        None => warn!("no database_url configured; listings are kept in memory"),
    }

    let health_state = web::Data::new(HealthState::new());
    let server = create_server(health_state, config).await?;
    info!(%bind_addr, "campus trade listening");
    server.await?;
    Ok(())
}
