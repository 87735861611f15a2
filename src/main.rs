// src/main.rs
// dbrec - command line front end for the recommendation engine

use std::str::FromStr;
use std::sync::Arc;

use anyhow::{Context, Result, anyhow, bail};
use clap::{Parser, Subcommand};
use serde_json::Value;
use tokio::sync::watch;
use tracing::{Level, debug, info};
use tracing_subscriber::FmtSubscriber;

use dbrec::config::EngineConfig;
use dbrec::db::{self, SqliteRecommendationRepository};
use dbrec::notifications::{self, NotificationRelay, TracingNotificationChannel};
use dbrec::recommendation::{
    AnalysisRecommendation, ClientMetadata, DatabaseInfo, RecommendationEngine, RecommendationKind,
    RecommendationRepository, Scanner, SessionMetadata, StaticDatabaseDirectory, StaticFeatureGate,
    StrategyRegistry, TracingAnalytics, UpdateRecommendation, Vote,
};

#[derive(Parser)]
#[command(name = "dbrec")]
#[command(about = "Database recommendations: detect, store and review tuning advice")]
#[command(version)]
struct Cli {
    /// Database the command applies to
    #[arg(long, global = true, env = "DBREC_DATABASE_ID", default_value = "default")]
    database_id: String,

    /// Logical database index in use by the caller
    #[arg(long, global = true)]
    db: Option<u32>,

    /// Provider reported to analytics
    #[arg(long, global = true)]
    provider: Option<String>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// List known recommendation kinds in sync priority order
    Kinds,

    /// Run live checks against a JSON payload
    Check {
        /// Kind to evaluate (repeatable)
        #[arg(short, long = "kind", required = true)]
        kinds: Vec<String>,

        /// JSON input handed to every strategy
        #[arg(index = 1)]
        data: String,
    },

    /// Show recommendations for the database, newest first
    List,

    /// Mark every recommendation of the database as read
    Read,

    /// Record feedback on a recommendation
    Vote {
        #[arg(index = 1)]
        id: String,

        /// "very useful", "useful" or "not useful"
        #[arg(index = 2)]
        vote: String,
    },

    /// Hide a recommendation, or show it again with --show
    Hide {
        #[arg(index = 1)]
        id: String,

        #[arg(long)]
        show: bool,
    },

    /// Delete one or more recommendations
    Delete {
        #[arg(index = 1, required = true)]
        ids: Vec<String>,
    },

    /// Merge results of a full analysis (JSON array of {name, params})
    Sync {
        #[arg(index = 1)]
        recommendations: String,
    },
}

fn print_json<T: serde::Serialize>(value: &T) -> Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}

fn parse_kind(name: &str) -> Result<RecommendationKind> {
    RecommendationKind::parse(name).ok_or_else(|| anyhow!("Unknown recommendation kind: {}", name))
}

async fn run(cli: Cli, engine: &RecommendationEngine) -> Result<()> {
    let ctx = ClientMetadata::new(SessionMetadata::default(), cli.database_id.clone(), cli.db);

    match cli.command {
        Commands::Kinds => {
            let registry = engine.scanner().registry();
            for kind in RecommendationKind::all() {
                let status = if registry.contains(kind) { "" } else { "  (no strategy)" };
                println!("{:>2}  {}{}", kind.priority(), kind, status);
            }
        }
        Commands::Check { kinds, data } => {
            let kinds = kinds.iter().map(|k| parse_kind(k)).collect::<Result<Vec<_>>>()?;
            let data: Value = serde_json::from_str(&data).context("check data must be valid JSON")?;
            let results = engine.check_multi(&ctx, &kinds, &data).await;
            let created: Vec<_> = results.into_values().flatten().collect();
            info!(count = created.len(), "Live check finished");
            print_json(&created)?;
        }
        Commands::List => {
            print_json(&engine.list(&ctx).await?)?;
        }
        Commands::Read => {
            engine.read(&ctx).await?;
        }
        Commands::Vote { id, vote } => {
            let vote = Vote::parse(&vote).ok_or_else(|| anyhow!("Unknown vote: {}", vote))?;
            let patch = UpdateRecommendation {
                vote: Some(vote),
                hide: None,
            };
            print_json(&engine.update(&ctx, &id, patch).await?)?;
        }
        Commands::Hide { id, show } => {
            let patch = UpdateRecommendation {
                vote: None,
                hide: Some(!show),
            };
            print_json(&engine.update(&ctx, &id, patch).await?)?;
        }
        Commands::Delete { ids } => {
            let result = engine.bulk_delete(&ctx, &ids).await;
            if result.affected == 0 {
                bail!("No recommendations deleted");
            }
            print_json(&result)?;
        }
        Commands::Sync { recommendations } => {
            let recommendations: Vec<AnalysisRecommendation> =
                serde_json::from_str(&recommendations).context("sync input must be a JSON array")?;
            engine.sync(&ctx, &recommendations).await?;
            print_json(&engine.list(&ctx).await?)?;
        }
    }

    Ok(())
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    let config = EngineConfig::from_env();

    let level = Level::from_str(&config.log_level).unwrap_or(Level::INFO);
    let subscriber = FmtSubscriber::builder()
        .with_max_level(level)
        .with_writer(std::io::stderr)
        .finish();
    tracing::subscriber::set_global_default(subscriber)?;

    debug!("{}", config.summary());

    let pool = db::connect(&config.database_url, config.sqlite_max_connections).await?;

    let (publisher, events) = notifications::queue(config.notify_capacity);
    let repository: Arc<dyn RecommendationRepository> =
        Arc::new(SqliteRecommendationRepository::new(pool.clone()).with_publisher(publisher));

    // The relay reads through its own handle so it never keeps the queue open
    let (shutdown_tx, shutdown_rx) = watch::channel(false);
    let relay = NotificationRelay::new(
        Arc::new(SqliteRecommendationRepository::new(pool.clone())),
        Arc::new(TracingNotificationChannel),
    )
    .spawn(events, shutdown_rx);

    let enabled_flags = if config.recommendations_enabled {
        vec![config.feature_flag.clone()]
    } else {
        Vec::new()
    };
    let feature_gate = Arc::new(StaticFeatureGate::new(enabled_flags));
    let scanner = Scanner::new(StrategyRegistry::with_defaults(), feature_gate, config.feature_flag.clone());

    let directory = StaticDatabaseDirectory::new();
    directory.insert(DatabaseInfo {
        id: cli.database_id.clone(),
        db: cli.db,
        provider: cli.provider.clone(),
    })?;

    let engine = RecommendationEngine::new(repository, scanner, Arc::new(directory), Arc::new(TracingAnalytics));

    let outcome = run(cli, &engine).await;

    // Dropping the last publisher closes the queue; the relay drains what is left
    drop(engine);
    relay.await?;
    drop(shutdown_tx);
    pool.close().await;

    outcome
}
