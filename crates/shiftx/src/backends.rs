//! 🔌 Backends - where the real I/O happens.
//!
//! 🚰 Source backends pour pages in, the SQLite sink slurps rows up.
//! And in between, we panic! (kidding, we return `EtlError`)
//!
//! 🎭 This module is the casting agency. Need pages from a live API? We've got a backend for
//! that. Need pages from a `HashMap` because the test suite has trust issues with networks?
//! Also got a backend for that (test builds only, it has no business in prod).
//!
//! 🦆 The duck is here because every file must have one. This is law. Do not question the duck.

use async_trait::async_trait;
use reqwest::Url;
use serde_json::Value;

use crate::error::EtlError;

pub(crate) mod http_source;
#[cfg(test)]
pub(crate) mod in_mem_source;
pub(crate) mod sqlite;

pub use http_source::HttpSourceConfig;
pub use sqlite::SqliteSinkConfig;

// ===== Source Trait and Backend Enum =====

/// 🚰 Something that can hand over one page body per URL.
///
/// # Contract
/// - `fetch_page` performs exactly one attempt. No retries. Retry policy belongs to whoever
///   wraps the source, not the source itself.
/// - Any transport failure, non-2xx status, or unparseable body is `EtlError::Fetch`.
///   "No data" is an error here, never an empty `Value` pretending everything is fine.
#[async_trait]
pub(crate) trait Source: std::fmt::Debug {
    /// 📦 Fetch and parse the page living at `url`.
    async fn fetch_page(&self, url: &Url) -> Result<Value, EtlError>;
}

/// 🎭 The many faces of a Source.
///
/// Each variant wraps a concrete source. The supervisor never needs to know (or care) whether
/// the page came over the wire or out of RAM.
#[derive(Debug)]
pub(crate) enum SourceBackend {
    Http(http_source::HttpSource),
    #[cfg(test)]
    InMemory(in_mem_source::InMemorySource),
}

#[async_trait]
impl Source for SourceBackend {
    async fn fetch_page(&self, url: &Url) -> Result<Value, EtlError> {
        match self {
            SourceBackend::Http(source) => source.fetch_page(url).await,
            #[cfg(test)]
            SourceBackend::InMemory(source) => source.fetch_page(url).await,
        }
    }
}
