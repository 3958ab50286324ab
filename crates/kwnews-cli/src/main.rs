mod collect;
mod search;
mod sentiment;

use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

use crate::collect::CollectArgs;
use crate::search::SearchArgs;
use crate::sentiment::SentimentCommands;

#[derive(Debug, Parser)]
#[command(name = "kwnews-cli")]
#[command(about = "K-water news harvesting and sentiment command line interface")]
struct Cli {
    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Debug, Subcommand)]
enum Commands {
    /// Harvest news from the Naver search API
    Collect(CollectArgs),
    /// Search stored articles
    Search(SearchArgs),
    /// Show stored-article statistics
    Stats,
    /// Classify text or report on stored verdicts
    Sentiment {
        #[command(subcommand)]
        command: SentimentCommands,
    },
    /// Database maintenance
    Db {
        #[command(subcommand)]
        command: DbCommands,
    },
}

#[derive(Debug, Subcommand)]
enum DbCommands {
    /// Verify the database is reachable
    Ping,
    /// Apply pending migrations
    Migrate,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();
    let cli = Cli::parse();

    let Some(command) = cli.command else {
        println!("kwnews-cli: no command given; run with --help for usage");
        return Ok(());
    };

    // Classifying ad-hoc text needs neither the database nor API credentials.
    if let Commands::Sentiment {
        command: SentimentCommands::Analyze { texts },
    } = &command
    {
        init_tracing("info")?;
        sentiment::run_sentiment_analyze(texts);
        return Ok(());
    }

    let config = kwnews_core::load_app_config()?;
    init_tracing(&config.log_level)?;

    match command {
        Commands::Collect(args) => collect::run_collect(&config, &args).await?,
        Commands::Search(args) => {
            let pool = connect(&config).await?;
            search::run_search(&pool, args).await?;
        }
        Commands::Stats => {
            let pool = connect(&config).await?;
            search::run_stats(&pool).await?;
        }
        Commands::Sentiment { command } => {
            let pool = connect(&config).await?;
            sentiment::run_sentiment_command(&pool, command).await?;
        }
        Commands::Db { command } => {
            let pool = connect(&config).await?;
            run_db_command(&pool, &command).await?;
        }
    }

    Ok(())
}

fn init_tracing(default_level: &str) -> anyhow::Result<()> {
    let env_filter =
        EnvFilter::try_from_default_env().or_else(|_| EnvFilter::try_new(default_level))?;
    tracing_subscriber::fmt()
        .with_env_filter(env_filter)
        .with_writer(std::io::stderr)
        .init();
    Ok(())
}

async fn connect(config: &kwnews_core::AppConfig) -> anyhow::Result<sqlx::PgPool> {
    let pool_config = kwnews_db::PoolConfig::from_app_config(config);
    let pool = kwnews_db::connect_pool(&config.database_url, pool_config).await?;
    Ok(pool)
}

async fn run_db_command(pool: &sqlx::PgPool, command: &DbCommands) -> anyhow::Result<()> {
    match command {
        DbCommands::Ping => {
            kwnews_db::ping(pool).await?;
            println!("database connection ok");
        }
        DbCommands::Migrate => {
            let applied = kwnews_db::run_migrations(pool).await?;
            println!("applied {applied} migration(s)");
        }
    }
    Ok(())
}

/// Mark a harvest run as failed, logging rather than propagating any error.
async fn fail_run_best_effort(pool: &sqlx::PgPool, run_id: i64, message: &str) {
    if let Err(mark_err) = kwnews_db::fail_harvest_run(pool, run_id, message).await {
        tracing::error!(
            run_id,
            error = %mark_err,
            "failed to mark harvest run as failed"
        );
    }
}
