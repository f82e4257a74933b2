//! Transport layer for the Kennel dog catalog client.
//!
//! Provides the [`Backend`] trait the orchestration layer is written
//! against, the wire payloads, and a reqwest implementation that keeps the
//! session cookie.

pub mod backend;
pub mod error;
pub mod http;
pub mod wire;

pub use backend::Backend;
pub use error::{ClientError, ClientResult};
pub use http::HttpBackend;
pub use wire::{filter_query, LoginRequest, MatchResponse, SearchResponse};
