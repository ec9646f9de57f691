mod settings;

pub use settings::Settings;

use std::sync::Arc;

use anyhow::Context;
use migration::MigratorTrait;
use pdp_indexer_logic::{
    ChainSource, HandlerRegistry, Manifest, ReorgController, RpcClient, Scheduler, Store,
};
use sea_orm::Database;
use tokio_util::sync::CancellationToken;
use tracing::info;

const SERVICE_NAME: &str = "pdp_indexer";

fn init_tracing() {
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .init();
}

/// Installs a `CancellationToken` that fires on SIGINT or (unix) SIGTERM,
/// the way the teacher shuts its indexers down cooperatively rather than
/// killing the process mid-batch.
fn spawn_shutdown_listener() -> CancellationToken {
    let token = CancellationToken::new();
    let guard = token.clone();

    tokio::spawn(async move {
        #[cfg(unix)]
        {
            let mut sigterm = tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate())
                .expect("failed to install SIGTERM handler");
            tokio::select! {
                _ = tokio::signal::ctrl_c() => {}
                _ = sigterm.recv() => {}
            }
        }
        #[cfg(not(unix))]
        {
            let _ = tokio::signal::ctrl_c().await;
        }
        info!("shutdown signal received");
        guard.cancel();
    });

    token
}

pub async fn run(settings: Settings) -> anyhow::Result<()> {
    init_tracing();
    info!(service = SERVICE_NAME, "starting");

    let db = Database::connect(&settings.database_url)
        .await
        .context("connecting to database")?;
    migration::Migrator::up(&db, None)
        .await
        .context("running migrations")?;

    let manifest = Manifest::load(&settings.events_file_path)
        .with_context(|| format!("loading manifest from {}", settings.events_file_path))?;
    let registry = HandlerRegistry::from_manifest(&manifest);

    let rpc: Arc<dyn ChainSource> =
        Arc::new(RpcClient::new(settings.lotus_api_endpoint.clone(), settings.lotus_api_key.clone()));
    let store = Store::new(db);
    let reorg = ReorgController::new();

    let scheduler = Scheduler::new(
        store,
        rpc,
        registry,
        reorg,
        settings.scheduler.clone(),
        settings.start_block,
    );

    let cancel = spawn_shutdown_listener();
    scheduler.run(cancel).await?;

    info!("stopped");
    Ok(())
}
