use clap::Parser;
use murmur_adaptor_terminal::{run, Cli};
use murmur_core::{init_logging_with, load_env};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // .env first so clap's env fallbacks see it
    let env_loaded = load_env();
    let cli = Cli::parse();
    init_logging_with(&cli.log_level);
    env_loaded?;

    run(cli).await
}
