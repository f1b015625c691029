//! Sync server entry point

use std::net::SocketAddr;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use clap::Parser;
use shared::{ProcessRole, logging, process_info};
use tokio::signal;

use webserver::{
    CombinationOracle, HttpCombinationOracle, RecipeBookOracle, RedbElementLog, WebServer, WebServerResult,
    bootstrap_store,
    config::{DEFAULT_ORACLE_URL, OracleSource, SCHEMA_VERSION, ServerConfig},
};

/// Command line arguments; every flag can also come from the environment
#[derive(Parser, Debug)]
#[command(name = "webserver")]
#[command(about = "Sync and dedup server for collaborative element discovery")]
struct Args {
    /// Address to listen on
    #[arg(long, env = "CRAFT_BIND", default_value = "127.0.0.1:8000")]
    bind: SocketAddr,

    /// Element store file
    #[arg(long, env = "CRAFT_DB_PATH", default_value = "./data/elements.redb")]
    db_path: PathBuf,

    /// Combination oracle endpoint
    #[arg(long, env = "CRAFT_ORACLE_URL", default_value = DEFAULT_ORACLE_URL)]
    oracle_url: String,

    /// Oracle request timeout in seconds
    #[arg(long, env = "CRAFT_ORACLE_TIMEOUT_SECS", default_value = "10")]
    oracle_timeout_secs: u64,

    /// Answer pairs from a JSON recipe book instead of the remote oracle
    #[arg(long, env = "CRAFT_RECIPES")]
    recipes: Option<PathBuf>,

    /// Queued outbound messages per session
    #[arg(long, env = "CRAFT_OUTBOUND_CAPACITY", default_value = "100")]
    outbound_capacity: usize,

    /// Log level (trace, debug, info, warn, error)
    #[arg(long, env = "CRAFT_LOG_LEVEL", default_value = "info")]
    log_level: String,
}

impl Args {
    fn into_config(self) -> ServerConfig {
        let oracle = match self.recipes {
            Some(path) => OracleSource::RecipeBook { path },
            None => OracleSource::Http {
                url: self.oracle_url,
                timeout: Duration::from_secs(self.oracle_timeout_secs),
            },
        };

        ServerConfig {
            bind_address: self.bind,
            db_path: self.db_path,
            oracle,
            outbound_capacity: self.outbound_capacity,
        }
    }
}

#[tokio::main]
async fn main() -> WebServerResult<()> {
    let _ = dotenvy::dotenv();
    let args = Args::parse();

    ProcessRole::init_server();
    logging::init_tracing(Some(&args.log_level));

    let config = args.into_config();
    config.validate()?;

    logging::log_startup(ProcessRole::current(), &format!("Sync server on {}", config.bind_address));

    let log = RedbElementLog::open(&config.db_path)?;
    let report = bootstrap_store(&log, SCHEMA_VERSION).await?;
    process_info!(
        ProcessRole::current(),
        "📚 Element store ready: {} element(s), schema {:?}, wiped: {}",
        report.total_elements,
        report.schema,
        report.wiped
    );
    let log = Arc::new(log);

    match &config.oracle {
        OracleSource::Http { url, timeout } => {
            process_info!(ProcessRole::current(), "🔮 Using remote oracle at {}", url);
            let oracle = HttpCombinationOracle::new(url.clone(), *timeout)?;
            serve(log, Arc::new(oracle), &config).await?;
        }
        OracleSource::RecipeBook { path } => {
            let oracle = RecipeBookOracle::from_file(path)?;
            process_info!(
                ProcessRole::current(),
                "📖 Using recipe book {} ({} recipes)",
                path.display(),
                oracle.len()
            );
            serve(log, Arc::new(oracle), &config).await?;
        }
    }

    logging::log_success(ProcessRole::current(), "Sync server stopped gracefully");
    Ok(())
}

async fn serve<O>(log: Arc<RedbElementLog>, oracle: Arc<O>, config: &ServerConfig) -> WebServerResult<()>
where
    O: CombinationOracle + 'static,
{
    let mut webserver = WebServer::new(log, oracle, config.outbound_capacity).await?;

    // Set up graceful shutdown
    let shutdown_sender = webserver.get_shutdown_sender();
    tokio::spawn(async move {
        match signal::ctrl_c().await {
            Ok(()) => {
                logging::log_shutdown(ProcessRole::current(), "Received Ctrl+C signal");
                let _ = shutdown_sender.send(()).await;
            }
            Err(err) => {
                logging::log_error(ProcessRole::current(), "Signal handling", &err);
            }
        }
    });

    webserver.run(config.bind_address).await
}
