use std::{net::SocketAddr, sync::Arc};

use anyhow::Context;
use clap::{Parser, Subcommand};
use tokio::signal;
use tower_http::{compression::CompressionLayer, cors::CorsLayer};
use tracing::{error, info, warn};

use storefront_api as api;

#[derive(Debug, Parser)]
#[command(name = "storefront-api", version, about = "Storefront carts, promos and checkout")]
struct Cli {
    #[command(subcommand)]
    command: Option<Command>,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Serve the HTTP API (default)
    Serve,
    /// Insert sample users, products and promos, then exit
    Seed,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let cfg = api::config::load_config().context("failed to load configuration")?;
    api::config::init_tracing(cfg.log_level(), cfg.log_json);

    let db_pool = api::db::establish_connection_from_app_config(&cfg)
        .await
        .context("failed to connect to database")?;

    let command = cli.command.unwrap_or(Command::Serve);
    if cfg.auto_migrate || matches!(command, Command::Seed) {
        api::db::run_migrations(&db_pool).await.map_err(|e| {
            error!("Failed running migrations: {}", e);
            e
        })?;
    }

    let db_arc = Arc::new(db_pool);

    match command {
        Command::Seed => {
            let summary = api::seeder::seed(db_arc).await?;
            info!(
                users = summary.users,
                products = summary.products,
                promos = summary.promos,
                "Seeding finished"
            );
            Ok(())
        }
        Command::Serve => serve(cfg, db_arc).await,
    }
}

async fn serve(cfg: api::config::AppConfig, db: Arc<api::db::DbPool>) -> anyhow::Result<()> {
    let addr: SocketAddr = format!("{}:{}", cfg.host, cfg.port)
        .parse()
        .with_context(|| format!("invalid listen address {}:{}", cfg.host, cfg.port))?;

    let production = cfg.is_production();
    let mut app = api::app_router(api::AppState::new(db, cfg)).layer(CompressionLayer::new());
    if production {
        warn!("CORS disabled in production; front the API with a gateway to allow browsers");
    } else {
        app = app.layer(CorsLayer::permissive());
    }

    info!("storefront-api listening on http://{}", addr);
    let listener = tokio::net::TcpListener::bind(addr).await?;

    axum::serve(listener, app.into_make_service())
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    info!("Server stopped");
    Ok(())
}

async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = signal::ctrl_c().await {
            error!("failed to install Ctrl+C handler: {}", e);
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        use tokio::signal::unix::{signal, SignalKind};

        match signal(SignalKind::terminate()) {
            Ok(mut sigterm) => {
                sigterm.recv().await;
            }
            Err(e) => {
                error!("failed to install SIGTERM handler: {}", e);
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }
}
