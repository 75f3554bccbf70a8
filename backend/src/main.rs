//! Backend entry-point: wires REST endpoints, persistence, providers, and
//! OpenAPI docs.

use std::io;
use std::net::SocketAddr;
use std::path::PathBuf;

use actix_web::web;
use clap::Parser;
use diesel::Connection;
use diesel_migrations::{EmbeddedMigrations, MigrationHarness, embed_migrations};
use tracing::{info, warn};
use tracing_subscriber::{EnvFilter, fmt};

use backend::inbound::http::health::HealthState;
use backend::inbound::http::state::UploadConfig;
use backend::outbound::persistence::{DbPool, PoolConfig};
use backend::server::{ProviderSettings, ServerConfig, create_server};

const MIGRATIONS: EmbeddedMigrations = embed_migrations!();

/// `backend` command arguments.
#[derive(Debug, Clone, Parser)]
#[command(name = "backend", about = "Eventora REST backend", version)]
struct CliArgs {
    /// Socket address to bind.
    #[arg(long = "bind", value_name = "addr", default_value = "0.0.0.0:8080")]
    bind_addr: SocketAddr,
    /// Database connection URL. Falls back to `DATABASE_URL` when omitted.
    #[arg(long = "database-url", value_name = "url")]
    database_url: Option<String>,
    /// Directory where uploaded cover images are stored.
    #[arg(long = "upload-dir", value_name = "path", default_value = "uploads")]
    upload_dir: PathBuf,
}

fn resolve_database_url(explicit: Option<String>) -> io::Result<String> {
    match explicit {
        Some(url) => Ok(url),
        None => std::env::var("DATABASE_URL").map_err(|_| {
            io::Error::other("database URL missing: pass --database-url or set DATABASE_URL")
        }),
    }
}

async fn run_migrations(database_url: String) -> io::Result<()> {
    tokio::task::spawn_blocking(move || {
        let mut connection = diesel::PgConnection::establish(&database_url)
            .map_err(|error| io::Error::other(format!("connect for migrations: {error}")))?;
        let applied = connection
            .run_pending_migrations(MIGRATIONS)
            .map_err(|error| io::Error::other(format!("run migrations: {error}")))?;
        info!(count = applied.len(), "database migrations applied");
        Ok(())
    })
    .await
    .map_err(|error| io::Error::other(format!("migration task failed: {error}")))?
}

/// Application bootstrap.
#[actix_web::main]
async fn main() -> io::Result<()> {
    if let Err(e) = fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .json()
        .try_init()
    {
        warn!(error = %e, "tracing init failed");
    }

    let args = CliArgs::try_parse().map_err(io::Error::other)?;
    let database_url = resolve_database_url(args.database_url)?;

    run_migrations(database_url.clone()).await?;

    let pool = DbPool::new(PoolConfig::new(&database_url))
        .await
        .map_err(|error| io::Error::other(format!("create database pool: {error}")))?;

    let providers = ProviderSettings::from_env()?;
    let uploads = UploadConfig {
        directory: args.upload_dir,
        public_path: "/uploads".to_owned(),
    };
    let config = ServerConfig::new(args.bind_addr, pool, providers).with_uploads(uploads);

    let health_state = web::Data::new(HealthState::new());
    let server = create_server(health_state.clone(), config)?;

    health_state.mark_ready();
    info!(addr = %args.bind_addr, "server listening");
    server.await
}
