//! Configuration management and environment variable loading

use crate::formatter::DEFAULT_MAX_WIDTH;
use crate::query::TableName;
use crate::types::DEFAULT_EMBEDDING_DIMENSION;
use crate::{MurmurError, Result};
use std::env;
use std::path::Path;
use std::str::FromStr;
use std::time::Duration;

/// Store host name
pub const ENV_DB_SERVER: &str = "AZ_DB_SERVER";
/// Store database name
pub const ENV_DB_DATABASE: &str = "AZ_DB_DATABASE";
/// Store user
pub const ENV_DB_USER: &str = "AZ_DB_USER";
/// Store port
pub const ENV_DB_PORT: &str = "AZ_DB_PORT";
/// Store TLS mode
pub const ENV_DB_SSLMODE: &str = "AZ_DB_SSLMODE";
/// Azure OpenAI resource endpoint
pub const ENV_OPENAI_ENDPOINT: &str = "AZURE_OPENAI_ENDPOINT";
/// Embeddings deployment name
pub const ENV_EMBEDDINGS_DEPLOYMENT: &str = "AZURE_OPENAI_EMBEDDINGS_DEPLOYMENT_NAME";
/// Embeddings API version
pub const ENV_EMBEDDINGS_API_VERSION: &str = "AZURE_OPENAI_EMBEDDINGS_API_VERSION";
/// Store vector dimension
pub const ENV_EMBEDDING_DIMENSION: &str = "MURMUR_EMBEDDING_DIMENSION";
/// Embedding request timeout in seconds
pub const ENV_EMBEDDING_TIMEOUT: &str = "MURMUR_EMBEDDING_TIMEOUT_SECS";
/// Feedback table name
pub const ENV_FEEDBACK_TABLE: &str = "MURMUR_FEEDBACK_TABLE";
/// Column width cap for text tables
pub const ENV_MAX_CELL_WIDTH: &str = "MURMUR_MAX_CELL_WIDTH";

/// Embeddings API version used when none is configured
pub const DEFAULT_API_VERSION: &str = "2023-05-15";

/// Older lowercase names still accepted for the store settings
pub const ENV_ALIASES: &[(&str, &str)] = &[
    (ENV_DB_SERVER, "az_db_server"),
    (ENV_DB_DATABASE, "az_db_database"),
];

/// Every setting that must be present before any network call
pub const REQUIRED_VARS: &[&str] = &[
    ENV_DB_SERVER,
    ENV_DB_DATABASE,
    ENV_OPENAI_ENDPOINT,
    ENV_EMBEDDINGS_DEPLOYMENT,
];

/// Load environment variables from .env file
///
/// Missing `.env` is fine (system environment only); a malformed one is not.
pub fn load_env() -> Result<()> {
    match dotenvy::dotenv() {
        Ok(path) => {
            tracing::info!("Loaded environment from: {}", path.display());
            Ok(())
        }
        Err(dotenvy::Error::LineParse(line, pos)) => Err(MurmurError::config(format!(
            "Failed to parse .env file at line {}, position {}",
            line, pos
        ))),
        Err(dotenvy::Error::Io(_)) => {
            tracing::debug!("No .env file found - using system environment variables only");
            Ok(())
        }
        Err(e) => Err(MurmurError::config(format!(
            "Failed to load .env file: {}",
            e
        ))),
    }
}

/// Load environment variables from a specific file
pub fn load_env_from_path<P: AsRef<Path>>(path: P) -> Result<()> {
    match dotenvy::from_path(path.as_ref()) {
        Ok(_) => {
            tracing::info!("Loaded environment from: {}", path.as_ref().display());
            Ok(())
        }
        Err(e) => Err(MurmurError::config(format!(
            "Failed to load {} environment file: {}",
            path.as_ref().display(),
            e
        ))),
    }
}

/// Strip whitespace and one pair of surrounding double quotes
fn clean_value(raw: &str) -> &str {
    let trimmed = raw.trim();
    trimmed
        .strip_prefix('"')
        .and_then(|v| v.strip_suffix('"'))
        .unwrap_or(trimmed)
        .trim()
}

fn read_var(key: &str) -> Option<String> {
    env::var(key)
        .ok()
        .map(|v| clean_value(&v).to_string())
        .filter(|v| !v.is_empty())
}

/// Lowercase alias accepted for `key`, if any
pub fn env_alias(key: &str) -> Option<&'static str> {
    ENV_ALIASES
        .iter()
        .find(|(name, _)| *name == key)
        .map(|(_, alias)| *alias)
}

/// Get optional environment variable, cleaned; empty counts as unset.
///
/// Falls back to the lowercase alias when `key` has one.
pub fn get_env(key: &str) -> Option<String> {
    read_var(key).or_else(|| env_alias(key).and_then(read_var))
}

fn describe_var(key: &str) -> String {
    match env_alias(key) {
        Some(alias) => format!("{} (or {})", key, alias),
        None => key.to_string(),
    }
}

/// Get required environment variable
///
/// Returns an error if the variable is not set or blank
pub fn get_required_env(key: &str) -> Result<String> {
    get_env(key).ok_or_else(|| {
        MurmurError::config(format!(
            "Required environment variable '{}' is not set. \
             Check your .env file or system environment.",
            describe_var(key)
        ))
    })
}

/// Get optional environment variable with default
pub fn get_env_or(key: &str, default: &str) -> String {
    get_env(key).unwrap_or_else(|| default.to_string())
}

/// Parse an optional environment variable; a present but unparsable value is an error
pub fn get_env_parsed<T>(key: &str, default: T) -> Result<T>
where
    T: FromStr,
    T::Err: std::fmt::Display,
{
    match get_env(key) {
        Some(v) => v.parse::<T>().map_err(|e| {
            MurmurError::config(format!("Invalid value '{}' for {}: {}", v, key, e))
        }),
        None => Ok(default),
    }
}

/// Validate that required environment variables are set
pub fn validate_env(required_vars: &[&str]) -> Result<()> {
    let missing: Vec<String> = required_vars
        .iter()
        .copied()
        .filter(|var| get_env(var).is_none())
        .map(describe_var)
        .collect();

    if !missing.is_empty() {
        return Err(MurmurError::config(format!(
            "Missing required environment variables: {}\n\
             Run 'cargo run --bin generate-config' to create a .env file",
            missing.join(", ")
        )));
    }

    Ok(())
}

/// Connection settings for the feedback store
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StoreSettings {
    /// Host name
    pub server: String,
    /// Database name
    pub database: String,
    /// Login user
    pub user: String,
    /// TCP port
    pub port: u16,
    /// libpq-style sslmode (`disable`, `prefer`, `require`, ...)
    pub ssl_mode: String,
    /// Table holding the feedback rows
    pub table: TableName,
    /// Declared dimension of the stored vectors
    pub embedding_dimension: usize,
}

/// Azure OpenAI embeddings settings
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EmbeddingSettings {
    /// Resource endpoint, without trailing slash
    pub endpoint: String,
    /// Deployment name
    pub deployment: String,
    /// REST API version
    pub api_version: String,
    /// Request timeout
    pub timeout: Duration,
}

impl EmbeddingSettings {
    /// Full embeddings URL for this deployment
    pub fn url(&self) -> String {
        format!(
            "{}/openai/deployments/{}/embeddings?api-version={}",
            self.endpoint, self.deployment, self.api_version
        )
    }
}

/// Everything a search needs to know about its environment
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SearchSettings {
    /// Store connection settings
    pub store: StoreSettings,
    /// Embedding provider settings
    pub embedding: EmbeddingSettings,
    /// Column width cap for text output
    pub max_cell_width: usize,
}

impl SearchSettings {
    /// Read settings from the environment.
    ///
    /// Fails with a configuration error before any I/O if a required setting
    /// is missing or a numeric one does not parse.
    pub fn from_env() -> Result<Self> {
        validate_env(REQUIRED_VARS)?;

        let table = TableName::parse(&get_env_or(
            ENV_FEEDBACK_TABLE,
            crate::query::DEFAULT_FEEDBACK_TABLE,
        ))?;

        let store = StoreSettings {
            server: get_required_env(ENV_DB_SERVER)?,
            database: get_required_env(ENV_DB_DATABASE)?,
            user: get_env_or(ENV_DB_USER, "postgres"),
            port: get_env_parsed(ENV_DB_PORT, 5432)?,
            ssl_mode: get_env_or(ENV_DB_SSLMODE, "require"),
            table,
            embedding_dimension: get_env_parsed(
                ENV_EMBEDDING_DIMENSION,
                DEFAULT_EMBEDDING_DIMENSION,
            )?,
        };

        let embedding = EmbeddingSettings {
            endpoint: get_required_env(ENV_OPENAI_ENDPOINT)?
                .trim_end_matches('/')
                .to_string(),
            deployment: get_required_env(ENV_EMBEDDINGS_DEPLOYMENT)?,
            api_version: get_env_or(ENV_EMBEDDINGS_API_VERSION, DEFAULT_API_VERSION),
            timeout: Duration::from_secs(get_env_parsed(ENV_EMBEDDING_TIMEOUT, 60u64)?),
        };

        if store.embedding_dimension == 0 {
            return Err(MurmurError::config(format!(
                "{} must be positive",
                ENV_EMBEDDING_DIMENSION
            )));
        }

        Ok(Self {
            store,
            embedding,
            max_cell_width: get_env_parsed(ENV_MAX_CELL_WIDTH, DEFAULT_MAX_WIDTH)?,
        })
    }

    /// Override the embeddings API version
    pub fn with_api_version(mut self, api_version: impl Into<String>) -> Self {
        self.embedding.api_version = api_version.into();
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Mutex;

    // process environment is shared between test threads
    static ENV_LOCK: Mutex<()> = Mutex::new(());

    fn set_required() {
        env::set_var(ENV_DB_SERVER, "feedback.postgres.database.azure.com");
        env::set_var(ENV_DB_DATABASE, "\"contoso\"");
        env::set_var(ENV_OPENAI_ENDPOINT, "https://contoso.openai.azure.com/");
        env::set_var(ENV_EMBEDDINGS_DEPLOYMENT, " text-embedding-ada-002 ");
    }

    fn clear_all() {
        for key in [
            ENV_DB_SERVER,
            ENV_DB_DATABASE,
            ENV_DB_USER,
            ENV_DB_PORT,
            ENV_DB_SSLMODE,
            ENV_OPENAI_ENDPOINT,
            ENV_EMBEDDINGS_DEPLOYMENT,
            ENV_EMBEDDINGS_API_VERSION,
            ENV_EMBEDDING_DIMENSION,
            ENV_EMBEDDING_TIMEOUT,
            ENV_FEEDBACK_TABLE,
            ENV_MAX_CELL_WIDTH,
        ] {
            env::remove_var(key);
        }
        for (_, alias) in ENV_ALIASES {
            env::remove_var(alias);
        }
    }

    #[test]
    fn test_clean_value() {
        assert_eq!(clean_value("  \"quoted\" "), "quoted");
        assert_eq!(clean_value("plain"), "plain");
        assert_eq!(clean_value("\"unbalanced"), "\"unbalanced");
    }

    #[test]
    fn test_settings_from_env() {
        let _guard = ENV_LOCK.lock().unwrap_or_else(|e| e.into_inner());
        clear_all();
        set_required();

        let settings = SearchSettings::from_env().unwrap();
        assert_eq!(settings.store.database, "contoso");
        assert_eq!(settings.store.port, 5432);
        assert_eq!(settings.store.ssl_mode, "require");
        assert_eq!(settings.store.table.as_str(), "service_feedback");
        assert_eq!(settings.store.embedding_dimension, 1536);
        assert_eq!(settings.embedding.deployment, "text-embedding-ada-002");
        assert_eq!(settings.embedding.timeout, Duration::from_secs(60));
        assert_eq!(settings.max_cell_width, 100);
        assert_eq!(
            settings.embedding.url(),
            "https://contoso.openai.azure.com/openai/deployments/text-embedding-ada-002/embeddings?api-version=2023-05-15"
        );

        let settings = settings.with_api_version("2024-02-01");
        assert!(settings.embedding.url().ends_with("api-version=2024-02-01"));
        clear_all();
    }

    #[test]
    fn test_missing_required_setting() {
        let _guard = ENV_LOCK.lock().unwrap_or_else(|e| e.into_inner());
        clear_all();
        set_required();
        env::set_var(ENV_OPENAI_ENDPOINT, "   ");

        match SearchSettings::from_env() {
            Err(MurmurError::Config(msg)) => assert!(msg.contains(ENV_OPENAI_ENDPOINT)),
            other => panic!("expected config error, got {:?}", other),
        }
        clear_all();
    }

    #[test]
    fn test_lowercase_store_names() {
        let _guard = ENV_LOCK.lock().unwrap_or_else(|e| e.into_inner());
        clear_all();
        set_required();
        env::remove_var(ENV_DB_SERVER);
        env::remove_var(ENV_DB_DATABASE);
        env::set_var("az_db_server", "srv.example");
        env::set_var("az_db_database", "contoso");

        let settings = SearchSettings::from_env().unwrap();
        assert_eq!(settings.store.server, "srv.example");
        assert_eq!(settings.store.database, "contoso");

        // uppercase wins when both are set
        env::set_var(ENV_DB_SERVER, "primary.example");
        let settings = SearchSettings::from_env().unwrap();
        assert_eq!(settings.store.server, "primary.example");
        clear_all();
    }

    #[test]
    fn test_missing_store_names_mention_alias() {
        let _guard = ENV_LOCK.lock().unwrap_or_else(|e| e.into_inner());
        clear_all();
        set_required();
        env::remove_var(ENV_DB_SERVER);

        match SearchSettings::from_env() {
            Err(MurmurError::Config(msg)) => {
                assert!(msg.contains("AZ_DB_SERVER (or az_db_server)"));
                assert!(!msg.contains(ENV_DB_DATABASE));
            }
            other => panic!("expected config error, got {:?}", other),
        }
        clear_all();
    }

    #[test]
    fn test_invalid_numeric_setting() {
        let _guard = ENV_LOCK.lock().unwrap_or_else(|e| e.into_inner());
        clear_all();
        set_required();
        env::set_var(ENV_DB_PORT, "not-a-port");

        assert!(matches!(
            SearchSettings::from_env(),
            Err(MurmurError::Config(_))
        ));
        clear_all();
    }

    #[test]
    fn test_invalid_table_setting() {
        let _guard = ENV_LOCK.lock().unwrap_or_else(|e| e.into_inner());
        clear_all();
        set_required();
        env::set_var(ENV_FEEDBACK_TABLE, "feedback;drop");

        assert!(matches!(
            SearchSettings::from_env(),
            Err(MurmurError::Config(_))
        ));
        clear_all();
    }
}
