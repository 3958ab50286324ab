mod api;
mod harvest;
mod middleware;
mod scheduler;

use std::sync::Arc;

use kwnews_collector::MultiQueryCollector;
use kwnews_sentiment::{KeywordClassifier, SentimentClassifier};
use tracing_subscriber::EnvFilter;

use crate::api::{build_app, AppState};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();
    let config = Arc::new(kwnews_core::load_app_config()?);
    let env_filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(config.log_level.clone()))?;
    tracing_subscriber::fmt().with_env_filter(env_filter).init();

    let pool_config = kwnews_db::PoolConfig::from_app_config(&config);
    let pool = kwnews_db::connect_pool(&config.database_url, pool_config).await?;
    let applied = kwnews_db::run_migrations(&pool).await?;
    tracing::info!(applied, "database migrations up to date");

    let topic = kwnews_core::load_configured_topic(config.topic_path.as_deref())?;
    let collector = match config.naver_credentials() {
        Ok(credentials) => Some(MultiQueryCollector::from_app_config(
            &config,
            credentials,
            &topic,
        )?),
        Err(e) => {
            tracing::warn!(error = %e, "news harvesting disabled");
            None
        }
    };
    let classifier: Arc<dyn SentimentClassifier> = Arc::new(KeywordClassifier::new());
    tracing::info!(
        topic = %topic.name,
        queries = topic.queries.len(),
        classifier = classifier.name(),
        "pipeline configured"
    );

    let state = AppState::new(pool, collector, classifier);
    let _scheduler = scheduler::build_scheduler(state.clone(), Arc::clone(&config)).await?;

    let app = build_app(state);

    let listener = tokio::net::TcpListener::bind(config.bind_addr).await?;
    tracing::info!(addr = %config.bind_addr, env = %config.env, "kwnews-server listening");
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;
    Ok(())
}

async fn shutdown_signal() {
    let ctrl_c = async {
        tokio::signal::ctrl_c()
            .await
            .expect("failed to listen for ctrl-c");
    };

    #[cfg(unix)]
    let terminate = async {
        tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate())
            .expect("failed to install signal handler")
            .recv()
            .await;
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        () = ctrl_c => {},
        () = terminate => {},
    }

    tracing::info!("received shutdown signal, starting graceful shutdown");
}
