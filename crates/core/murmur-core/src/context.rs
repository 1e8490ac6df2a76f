//! Per-process search context

use crate::config::SearchSettings;
use crate::credentials::{StaticTokenCredential, TokenCredential};
use crate::Result;
use std::fmt;
use std::sync::Arc;

/// Settings and credential shared by every search in a process.
///
/// Built once at start and passed to whatever needs it; never mutated.
#[derive(Clone)]
pub struct SearchContext {
    settings: Arc<SearchSettings>,
    credential: Arc<dyn TokenCredential>,
}

impl SearchContext {
    /// Build a context from explicit parts
    pub fn new(settings: SearchSettings, credential: Arc<dyn TokenCredential>) -> Self {
        Self {
            settings: Arc::new(settings),
            credential,
        }
    }

    /// Settings and tokens from the environment
    pub fn from_env() -> Result<Self> {
        let settings = SearchSettings::from_env()?;
        Ok(Self::new(settings, Arc::new(StaticTokenCredential::from_env())))
    }

    /// Search settings
    pub fn settings(&self) -> &SearchSettings {
        &self.settings
    }

    /// Token source
    pub fn credential(&self) -> &dyn TokenCredential {
        self.credential.as_ref()
    }
}

impl fmt::Debug for SearchContext {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SearchContext")
            .field("settings", &self.settings)
            .finish_non_exhaustive()
    }
}
