//! Environment template generator for Murmur
//!
//! Writes a `.env` with every setting the search tools read, commented where
//! a default applies.

use clap::{Parser, ValueEnum};
use murmur_core::config::*;
use murmur_core::credentials::{ENV_ACCESS_TOKEN, ENV_OPENAI_TOKEN, ENV_SQL_TOKEN};
use murmur_core::query::DEFAULT_FEEDBACK_TABLE;
use murmur_core::types::DEFAULT_EMBEDDING_DIMENSION;
use murmur_core::DEFAULT_MAX_WIDTH;
use std::fs;
use std::path::PathBuf;

#[derive(Parser)]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Output file path
    #[arg(short, long, default_value = ".env")]
    output: PathBuf,

    /// Force overwrite if file exists
    #[arg(short, long)]
    force: bool,

    /// How the embeddings endpoint authenticates
    #[arg(short, long, value_enum, default_value = "token")]
    auth: EmbeddingAuth,

    /// Database host to prefill
    #[arg(long)]
    server: Option<String>,

    /// Database name to prefill
    #[arg(long)]
    database: Option<String>,

    /// Azure OpenAI endpoint to prefill
    #[arg(long)]
    endpoint: Option<String>,

    /// Embeddings deployment to prefill
    #[arg(long)]
    deployment: Option<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
enum EmbeddingAuth {
    /// Bearer access tokens for both services
    Token,
    /// Static api-key header for embeddings, token for the database
    ApiKey,
}

fn generate_env_content(cli: &Cli) -> String {
    let value = |v: &Option<String>| v.clone().unwrap_or_default();

    let embedding_auth = match cli.auth {
        EmbeddingAuth::Token => format!(
            "{}=\n# AZURE_OPENAI_API_KEY=",
            ENV_OPENAI_TOKEN
        ),
        EmbeddingAuth::ApiKey => format!(
            "# {}=\nAZURE_OPENAI_API_KEY=",
            ENV_OPENAI_TOKEN
        ),
    };

    format!(
        "# ========================================\n\
         # Murmur - Environment Configuration\n\
         # ========================================\n\
         # Generated: {generated}\n\
         # Embedding auth: {auth:?}\n\
         #\n\
         # This file holds access tokens. Never commit it to version control.\n\
         \n\
         # Feedback store (PostgreSQL + pgvector)\n\
         # {aliases} are read when the uppercase names are unset\n\
         {server_key}={server}\n\
         {database_key}={database}\n\
         # {user_key}=postgres\n\
         # {port_key}=5432\n\
         # {sslmode_key}=require\n\
         # {table_key}={table}\n\
         # {dimension_key}={dimension}\n\
         \n\
         # Azure OpenAI embeddings\n\
         {endpoint_key}={endpoint}\n\
         {deployment_key}={deployment}\n\
         # {api_version_key}={api_version}\n\
         # {timeout_key}=60\n\
         \n\
         # Access tokens (scope-specific first, then the shared fallback)\n\
         {sql_token_key}=\n\
         {embedding_auth}\n\
         # {access_token_key}=\n\
         \n\
         # Output\n\
         # {width_key}={width}\n\
         \n\
         # Logging\n\
         MURMUR_LOG_LEVEL=info\n\
         # RUST_LOG=info,murmur_storage_sql=debug\n",
        generated = chrono::Local::now().format("%Y-%m-%d %H:%M:%S"),
        auth = cli.auth,
        aliases = ENV_ALIASES
            .iter()
            .map(|(_, alias)| *alias)
            .collect::<Vec<_>>()
            .join(" and "),
        server_key = ENV_DB_SERVER,
        server = value(&cli.server),
        database_key = ENV_DB_DATABASE,
        database = value(&cli.database),
        user_key = ENV_DB_USER,
        port_key = ENV_DB_PORT,
        sslmode_key = ENV_DB_SSLMODE,
        table_key = ENV_FEEDBACK_TABLE,
        table = DEFAULT_FEEDBACK_TABLE,
        dimension_key = ENV_EMBEDDING_DIMENSION,
        dimension = DEFAULT_EMBEDDING_DIMENSION,
        endpoint_key = ENV_OPENAI_ENDPOINT,
        endpoint = value(&cli.endpoint),
        deployment_key = ENV_EMBEDDINGS_DEPLOYMENT,
        deployment = value(&cli.deployment),
        api_version_key = ENV_EMBEDDINGS_API_VERSION,
        api_version = DEFAULT_API_VERSION,
        timeout_key = ENV_EMBEDDING_TIMEOUT,
        sql_token_key = ENV_SQL_TOKEN,
        embedding_auth = embedding_auth,
        access_token_key = ENV_ACCESS_TOKEN,
        width_key = ENV_MAX_CELL_WIDTH,
        width = DEFAULT_MAX_WIDTH,
    )
}

fn main() {
    let cli = Cli::parse();

    // Check if file exists
    if cli.output.exists() && !cli.force {
        eprintln!("Error: File {:?} already exists!", cli.output);
        eprintln!("   Use --force to overwrite");
        std::process::exit(1);
    }

    let content = generate_env_content(&cli);

    if let Err(e) = fs::write(&cli.output, content) {
        eprintln!("Failed to write file: {}", e);
        std::process::exit(1);
    }
    println!("Configuration written to: {:?}", cli.output);

    // Tokens live in this file (Unix only)
    #[cfg(unix)]
    {
        use std::os::unix::fs::PermissionsExt;
        let perms = fs::Permissions::from_mode(0o600);
        if let Err(e) = fs::set_permissions(&cli.output, perms) {
            eprintln!("Warning: Could not set file permissions: {}", e);
        }
    }

    println!();
    println!("Next steps:");
    println!("   1. Fill in {} and {}", ENV_DB_SERVER, ENV_OPENAI_ENDPOINT);
    match cli.auth {
        EmbeddingAuth::Token => {
            println!("   2. Paste access tokens for the database and Azure OpenAI scopes")
        }
        EmbeddingAuth::ApiKey => {
            println!("   2. Paste the database token and the Azure OpenAI resource key")
        }
    }
    println!("   3. Run: murmur-search --query-text \"late technician\"");
}
