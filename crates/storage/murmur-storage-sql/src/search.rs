//! End-to-end feedback search: embed, build, execute, shape

use crate::executor::QueryExecutor;
use crate::session::StoreSession;
use async_trait::async_trait;
use murmur_core::{
    EmbeddingProvider, FilterSpec, MurmurError, Projection, QueryBuilder, QueryResult, RawResult,
    Result, SearchContext, SearchQuery,
};
use serde::Serialize;
use std::sync::Arc;
use tracing::{info, warn};

/// Everything one search produced
#[derive(Debug, Clone, Serialize)]
pub struct SearchOutcome {
    /// Display rendering of the executed query
    pub display_sql: String,
    /// Rows exactly as the store returned them
    pub raw: RawResult,
    /// Rows shaped into records, closest first
    pub result: QueryResult,
}

/// A similarity search over stored feedback
#[async_trait]
pub trait SearchService: Send + Sync {
    /// Run one search for `query_text` narrowed by `filter`
    async fn search(&self, query_text: &str, filter: &FilterSpec) -> Result<SearchOutcome>;
}

/// Search pipeline backed by an embedding provider and the feedback store
pub struct FeedbackSearch {
    context: SearchContext,
    provider: Arc<dyn EmbeddingProvider>,
    builder: QueryBuilder,
    executor: QueryExecutor,
}

impl FeedbackSearch {
    /// Search the table configured in `context`
    pub fn new(context: SearchContext, provider: Arc<dyn EmbeddingProvider>) -> Self {
        let builder = QueryBuilder::new().table(context.settings().store.table.clone());
        Self {
            context,
            provider,
            builder,
            executor: QueryExecutor::new(),
        }
    }

    /// Select a different column set
    pub fn with_projection(mut self, projection: Projection) -> Self {
        self.builder = self.builder.projection(projection);
        self
    }

    /// Assemble the query a filter would run, without embedding or executing it
    pub fn prepare(&self, filter: &FilterSpec) -> SearchQuery {
        self.builder.build(filter)
    }

    /// Context this search was built with
    pub fn context(&self) -> &SearchContext {
        &self.context
    }
}

#[async_trait]
impl SearchService for FeedbackSearch {
    async fn search(&self, query_text: &str, filter: &FilterSpec) -> Result<SearchOutcome> {
        if query_text.trim().is_empty() {
            return Err(MurmurError::validation(
                "query_text",
                "query text must not be empty",
            ));
        }

        let query = self.prepare(filter);
        let exec = query.render_execution();
        QueryExecutor::check(&exec)?;

        info!(
            "Embedding query text with {} ({} filter(s), top {})",
            self.provider.name(),
            filter.constraint_count(),
            filter.top_n()
        );
        let embedding = self.provider.embed(query_text).await?;
        embedding.ensure_dimension(self.context.settings().store.embedding_dimension)?;

        let mut session = StoreSession::open(&self.context).await?;
        let executed = self.executor.execute(&mut session, &exec, &embedding).await;
        if let Err(e) = session.close().await {
            warn!("Failed to close store session: {}", e);
        }
        let raw = executed?;

        let mut result = QueryResult::from_raw(&raw)?;
        result.truncate(filter.top_n() as usize);
        info!("Search returned {} record(s)", result.len());

        Ok(SearchOutcome {
            display_sql: query.render_display(),
            raw,
            result,
        })
    }
}
