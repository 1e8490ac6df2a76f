use clap::Parser;
use murmur_adaptor_web::{ExplorerConfig, ExplorerServer};
use murmur_core::utils::init_logging_with;
use murmur_core::{load_env, SearchContext};
use murmur_provider_openai::AzureOpenAIEmbeddings;
use murmur_storage_sql::FeedbackSearch;
use std::sync::Arc;
use tracing::info;

#[derive(Parser, Debug)]
#[command(name = "run-explorer", about = "Serve the feedback explorer")]
struct Cli {
    #[arg(long, env = "MURMUR_LOG_LEVEL", default_value = "info")]
    log_level: String,

    #[arg(long, env = "MURMUR_EXPLORER_HOST", default_value = "127.0.0.1")]
    host: String,

    #[arg(long, env = "MURMUR_EXPLORER_PORT", default_value_t = 4000)]
    port: u16,

    /// Accept requests from any origin
    #[arg(long)]
    permissive_cors: bool,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let env_loaded = load_env();
    let cli = Cli::parse();
    init_logging_with(&cli.log_level);
    env_loaded?;

    // fail on missing settings before binding the port
    let context = SearchContext::from_env()?;
    let provider = Arc::new(AzureOpenAIEmbeddings::new(context.clone())?);
    info!(
        "Searching {} on {} with deployment '{}'",
        context.settings().store.table.as_str(),
        context.settings().store.server,
        context.settings().embedding.deployment
    );
    let search = Arc::new(FeedbackSearch::new(context, provider));

    let server = ExplorerServer::new(
        ExplorerConfig {
            host: cli.host,
            port: cli.port,
            permissive_cors: cli.permissive_cors,
        },
        search,
    );
    server.serve().await?;
    Ok(())
}
