//! # Previously, on shiftx...
//!
//! 🎬 The API was down. The tests still had to run. Someone had to write a source so simple
//! it lives entirely in RAM, gone the moment you blink.
//!
//! [`InMemorySource`] serves canned page bodies keyed by absolute URL and writes down every URL
//! it was asked for, so tests can count fetches without counting on a network.
//!
//! ⚠️ This is NOT for production. This is for tests. 🦆

use std::collections::HashMap;
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use reqwest::Url;
use serde_json::Value;

use crate::backends::Source;
use crate::error::EtlError;

/// 📦 A source that already knows every page it will ever serve.
#[derive(Debug, Default, Clone)]
pub(crate) struct InMemorySource {
    pages: HashMap<String, Value>,
    /// 🔒 Every URL requested, in order. Arc so the test keeps a handle after the supervisor
    /// takes ownership of the source.
    pub(crate) fetched: Arc<Mutex<Vec<String>>>,
}

impl InMemorySource {
    pub(crate) fn new() -> Self {
        Self::default()
    }

    /// 🎯 Register `body` as the page living at `url`.
    pub(crate) fn with_page(mut self, url: &str, body: Value) -> Self {
        self.pages.insert(url.to_string(), body);
        self
    }

    pub(crate) fn fetch_log(&self) -> Vec<String> {
        self.fetched.lock().map(|log| log.clone()).unwrap_or_default()
    }
}

#[async_trait]
impl Source for InMemorySource {
    /// 🎯 Known URL: here's your page. Unknown URL: the in-RAM equivalent of a 404.
    async fn fetch_page(&self, url: &Url) -> Result<Value, EtlError> {
        if let Ok(mut log) = self.fetched.lock() {
            log.push(url.to_string());
        }
        self.pages.get(url.as_str()).cloned().ok_or_else(|| EtlError::Fetch {
            url: url.to_string(),
            reason: "no canned page at this URL".to_string(),
        })
    }
}
