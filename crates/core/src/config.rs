//! Unified configuration for the Kennel client.
//!
//! One structure covers the transport, search defaults, hydration batching
//! and prefetch lead time.

use crate::error::{CoreError, CoreResult};
use crate::filter::SearchFilter;
use crate::sort::SortSpec;
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Master configuration.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct KennelConfig {
    /// Backend transport settings.
    #[serde(default)]
    pub backend: BackendSettings,

    /// Search defaults.
    #[serde(default)]
    pub search: SearchSettings,

    /// Record hydration settings.
    #[serde(default)]
    pub hydration: HydrationSettings,

    /// Prefetch settings.
    #[serde(default)]
    pub prefetch: PrefetchSettings,
}

/// Backend transport settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BackendSettings {
    /// Base URL of the catalog service.
    pub base_url: String,

    /// Per-request timeout in ms.
    pub timeout_ms: u64,
}

impl Default for BackendSettings {
    fn default() -> Self {
        Self {
            base_url: "https://frontend-take-home-service.fetch.com".to_string(),
            timeout_ms: 30_000,
        }
    }
}

/// Search defaults.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SearchSettings {
    /// Identifiers requested per backend page.
    pub page_size: u32,

    /// Default ordering.
    pub sort: SortSpec,

    /// Rows per UI page. Total page counts are derived from this.
    pub display_page_size: u32,
}

impl Default for SearchSettings {
    fn default() -> Self {
        Self {
            page_size: 100,
            sort: SortSpec::default(),
            display_page_size: 10,
        }
    }
}

/// Record hydration settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HydrationSettings {
    /// Maximum identifiers per `POST /dogs` call.
    pub batch_size: usize,

    /// Chunk requests allowed in flight at once (1 = sequential).
    pub max_concurrent_chunks: usize,
}

impl Default for HydrationSettings {
    fn default() -> Self {
        Self {
            batch_size: 100,
            max_concurrent_chunks: 1,
        }
    }
}

/// Prefetch settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PrefetchSettings {
    /// Enable prefetching of the next cursor page.
    pub enabled: bool,

    /// UI pages of buffer to keep before requesting more.
    pub lead_pages: usize,
}

impl Default for PrefetchSettings {
    fn default() -> Self {
        Self {
            enabled: true,
            lead_pages: 2,
        }
    }
}

impl KennelConfig {
    /// Load a config from a JSON file. Missing sections take their defaults.
    pub fn load(path: impl AsRef<Path>) -> CoreResult<Self> {
        let data = std::fs::read_to_string(path)?;
        let config: Self = serde_json::from_str(&data)?;
        config.validate().map_err(CoreError::InvalidConfig)?;
        Ok(config)
    }

    /// Create a config that hydrates in parallel and prefetches further ahead.
    pub fn eager() -> Self {
        Self {
            hydration: HydrationSettings {
                max_concurrent_chunks: 4,
                ..Default::default()
            },
            prefetch: PrefetchSettings {
                lead_pages: 4,
                ..Default::default()
            },
            ..Default::default()
        }
    }

    /// Builder: point at another backend.
    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.backend.base_url = base_url.into();
        self
    }

    /// Builder: disable prefetching.
    pub fn without_prefetch(mut self) -> Self {
        self.prefetch.enabled = false;
        self
    }

    /// The filter a fresh browse view starts from.
    pub fn default_filter(&self) -> SearchFilter {
        SearchFilter::new(self.search.page_size, self.search.sort)
    }

    /// Validate the configuration.
    pub fn validate(&self) -> Result<(), String> {
        if self.backend.base_url.trim().is_empty() {
            return Err("base_url must not be empty".to_string());
        }

        if self.search.page_size == 0 {
            return Err("page_size must be > 0".to_string());
        }

        if self.search.display_page_size == 0 {
            return Err("display_page_size must be > 0".to_string());
        }

        if self.hydration.batch_size == 0 || self.hydration.batch_size > 100 {
            return Err("hydration batch_size must be in [1, 100]".to_string());
        }

        if self.hydration.max_concurrent_chunks == 0 {
            return Err("max_concurrent_chunks must be > 0".to_string());
        }

        Ok(())
    }
}
