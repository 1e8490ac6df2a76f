use anyhow::Context;
use clap::Parser;
use murmur_core::{
    FilterSpec, RatingCategory, RawFilter, ResultFormatter, SearchContext, SearchSettings,
    StaticTokenCredential,
};
use murmur_provider_openai::AzureOpenAIEmbeddings;
use murmur_storage_sql::{FeedbackSearch, SearchService};
use std::io::Write;
use std::sync::Arc;
use tracing::info;

/// Search customer feedback by meaning
#[derive(Parser, Debug, Clone)]
#[command(name = "murmur-search", version, about)]
pub struct Cli {
    /// Free-text sentiment to search for
    #[arg(long)]
    pub query_text: String,

    /// Number of closest rows to return
    #[arg(long, default_value_t = 10, allow_negative_numbers = true)]
    pub top: i64,

    /// Highest overall-experience rating to include (1-5; 5 means any)
    #[arg(long, allow_negative_numbers = true)]
    pub max_rating: Option<i64>,

    /// Largest cosine distance to include (0-1)
    #[arg(long, allow_negative_numbers = true)]
    pub distance_threshold: Option<f64>,

    /// Only rows whose text contains this, ignoring case
    #[arg(long)]
    pub contains: Option<String>,

    /// Embeddings API version (defaults to AZURE_OPENAI_EMBEDDINGS_API_VERSION)
    #[arg(long)]
    pub api_version: Option<String>,

    /// Print the query before the results
    #[arg(long)]
    pub show_sql: bool,

    /// Column width cap for the results table
    #[arg(long)]
    pub max_width: Option<usize>,

    #[arg(long, env = "MURMUR_LOG_LEVEL", default_value = "info")]
    pub log_level: String,
}

impl Cli {
    /// Raw filter values exactly as given on the command line
    pub fn raw_filter(&self) -> RawFilter {
        let mut raw = RawFilter {
            distance_threshold: self.distance_threshold,
            contains: self.contains.clone(),
            top_n: self.top,
            ..Default::default()
        };
        if let Some(ceiling) = self.max_rating {
            raw.ratings.insert(RatingCategory::OverallExperience, ceiling);
        }
        raw
    }

    /// Validated filter
    pub fn filter(&self) -> murmur_core::Result<FilterSpec> {
        FilterSpec::validate(self.raw_filter())
    }
}

/// Run one search from the environment and print it to stdout
pub async fn run(cli: Cli) -> anyhow::Result<()> {
    let filter = cli.filter()?;

    let mut settings = SearchSettings::from_env()?;
    if let Some(version) = &cli.api_version {
        settings = settings.with_api_version(version.clone());
    }
    if let Some(width) = cli.max_width {
        settings.max_cell_width = width;
    }
    let formatter = ResultFormatter::new(settings.max_cell_width);

    let context = SearchContext::new(settings, Arc::new(StaticTokenCredential::from_env()));
    let provider = Arc::new(AzureOpenAIEmbeddings::new(context.clone())?);
    let search = FeedbackSearch::new(context, provider);

    let stdout = std::io::stdout();
    let mut out = stdout.lock();
    execute(&cli, &search, &filter, &formatter, &mut out).await
}

/// Run one search and write the table (and optionally the query) to `out`
pub async fn execute<W: Write>(
    cli: &Cli,
    search: &dyn SearchService,
    filter: &FilterSpec,
    formatter: &ResultFormatter,
    out: &mut W,
) -> anyhow::Result<()> {
    let outcome = search
        .search(&cli.query_text, filter)
        .await
        .context("Feedback search failed")?;
    info!("Found {} matching row(s)", outcome.result.len());

    if cli.show_sql {
        writeln!(out, "{}", outcome.display_sql)?;
        writeln!(out)?;
    }
    writeln!(out, "{}", formatter.render(&outcome.raw))?;
    out.flush()?;
    Ok(())
}
