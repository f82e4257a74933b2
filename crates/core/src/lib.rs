//! Core data model and configuration for the Kennel dog catalog client.

pub mod config;
pub mod error;
pub mod filter;
pub mod sort;
pub mod types;

pub use config::{
    BackendSettings, HydrationSettings, KennelConfig, PrefetchSettings, SearchSettings,
};
pub use error::{CoreError, CoreResult};
pub use filter::SearchFilter;
pub use sort::{SortDirection, SortField, SortSpec};
pub use types::{Dog, DogId, ResultPage, SearchCursor};
