use chat_keyword_batch::appconfig::load_app_config;
use chat_keyword_batch::catalog::CategoryCatalog;
use chat_keyword_batch::cli::{Cli, Command};
use chat_keyword_batch::error::AppResult;
use chat_keyword_batch::metrics_server::run_metrics_server;
use chat_keyword_batch::model::{DateRange, RunSummary};
use chat_keyword_batch::oracle::client::OracleClient;
use chat_keyword_batch::oracle::metrics::OracleMetrics;
use chat_keyword_batch::pipeline::{RangeOrchestrator, Reconciler};
use chat_keyword_batch::store::backend::StoreBackend;
use chat_keyword_batch::store::gateway::StoreGateway;
use chat_keyword_batch::store::metrics::StoreMetrics;
use chat_keyword_batch::store::pool;
use clap::Parser;
use std::sync::Arc;
use tracing_subscriber::EnvFilter;

fn init_tracing(level: &str) {
    let filter = EnvFilter::try_new(level).unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt().with_env_filter(filter).init();
}

#[tokio::main]
async fn main() -> AppResult<()> {
    let cli = Cli::parse();
    let cfg = load_app_config()?;
    init_tracing(&cfg.logging.level);

    let catalog: Arc<CategoryCatalog> = Arc::new(cfg.build_catalog()?);
    let store_metrics = Arc::new(StoreMetrics::new()?);
    let oracle_metrics = Arc::new(OracleMetrics::new()?);

    let pool = pool::connect(&cfg.store).await?;
    let store: Arc<dyn StoreBackend> = Arc::new(StoreGateway::new(
        pool,
        cfg.store.schema(),
        catalog.clone(),
        store_metrics.clone(),
        cfg.pipeline.insert_batch_size,
    ));
    let oracle: Arc<dyn chat_keyword_batch::oracle::backend::OracleBackend> =
        Arc::new(OracleClient::new(cfg.oracle.clone(), catalog.clone(), oracle_metrics.clone())?);

    if cfg.metrics.enabled {
        let metrics_cfg = cfg.metrics.clone();
        let store_metrics = store_metrics.clone();
        let oracle_metrics = oracle_metrics.clone();
        tokio::spawn(async move {
            if let Err(e) = run_metrics_server(metrics_cfg, store_metrics, oracle_metrics).await {
                tracing::error!(error = %e, "metrics server exited");
            }
        });
    }

    let summary = run_command(cli.command, store, oracle, &cfg.pipeline).await?;

    println!("{}", serde_json::to_string_pretty(&summary)?);
    if !summary.is_success() {
        std::process::exit(1);
    }
    Ok(())
}

async fn run_command(
    command: Command,
    store: Arc<dyn StoreBackend>,
    oracle: Arc<dyn chat_keyword_batch::oracle::backend::OracleBackend>,
    pipeline_cfg: &chat_keyword_batch::pipeline::PipelineConfig,
) -> AppResult<RunSummary> {
    match command {
        Command::Batch { start, end } => {
            let orchestrator = RangeOrchestrator::new(
                store,
                oracle,
                pipeline_cfg.chunk_size,
                pipeline_cfg.workers_per_date,
                pipeline_cfg.concurrent_dates,
            );
            let range = DateRange::new(start, end)?;
            Ok(orchestrator.run(range).await)
        }
        Command::MissingCheck { start, end } => {
            let reconciler = Reconciler::new(
                store,
                oracle,
                pipeline_cfg.chunk_size,
                pipeline_cfg.workers_per_date,
                pipeline_cfg.concurrent_dates,
            );
            let range = DateRange::new(start, end)?;
            let missing = reconciler.check(range).await?;
            let mut summary = RunSummary::new(uuid::Uuid::new_v4());
            summary.missing_before = Some(missing);
            Ok(summary)
        }
        Command::MissingProcess { start, end, limit } => {
            let reconciler = Reconciler::new(
                store,
                oracle,
                pipeline_cfg.chunk_size,
                pipeline_cfg.workers_per_date,
                pipeline_cfg.concurrent_dates,
            );
            let range = DateRange::new(start, end)?;
            Ok(reconciler.process(range, limit).await)
        }
        Command::MissingAuto { start, end, limit } => {
            let reconciler = Reconciler::new(
                store,
                oracle,
                pipeline_cfg.chunk_size,
                pipeline_cfg.workers_per_date,
                pipeline_cfg.concurrent_dates,
            );
            let range = DateRange::new(start, end)?;
            reconciler.auto(range, limit).await
        }
    }
}
