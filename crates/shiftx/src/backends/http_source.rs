// ai
//! # 📡 THE HTTP SOURCE
//!
//! *Previously, on shiftx...*
//!
//! 🎬 COLD OPEN - INT. ROSTER API - 6:00 AM
//!
//! The rostering API wakes up. It has shifts. It has opinions about page sizes. It hands over
//! one page at a time, each with a little note at the bottom saying where the next one lives.
//!
//! This module is the page fetcher: one GET, one JSON parse, one verdict. It does not retry.
//! It does not follow the `next` link (that's the supervisor's job). It does not judge.
//! It fetches. It reports. It goes back to sleep.
//!
//! 🦆 (mandatory duck, no context provided, none shall be requested)

use std::time::Duration;

use async_trait::async_trait;
use reqwest::Url;
use serde::Deserialize;
use serde_json::Value;
use tracing::{debug, trace};

use crate::backends::Source;
use crate::error::EtlError;

// 📡 HttpSourceConfig - "It's just a GET", said everyone, right before the 504.
// Lives here, next to the source that uses it. Configs near the thing they configure.
#[derive(Debug, Deserialize, Clone)]
pub struct HttpSourceConfig {
    /// 📡 Absolute URL of the first page. Scheme and all. Yes, all of it.
    pub url: String,
    /// 📦 Optional page size, sent as `<page_size_param>=<page_size>` on the first request only.
    /// Later pages follow whatever `next` link upstream hands back.
    #[serde(default)]
    pub page_size: Option<u32>,
    /// 🔧 Query parameter name for the page size. Upstream calls it `limit`.
    #[serde(default = "default_page_size_param")]
    pub page_size_param: String,
    /// ⏱️ How long to wait for the TCP handshake before giving up on the relationship.
    #[serde(default = "default_connect_timeout_secs")]
    pub connect_timeout_secs: u64,
    /// ⏱️ How long the whole request (send + body) may take.
    #[serde(default = "default_request_timeout_secs")]
    pub request_timeout_secs: u64,
}

// -- error pages can be whole HTML documents. the log only needs the opening line.
const MAX_ERROR_BODY_BYTES: usize = 256;

fn default_page_size_param() -> String {
    "limit".to_string()
}

// -- 10s to connect. if the API can't say hello in 10 seconds, it's not having a good day.
fn default_connect_timeout_secs() -> u64 {
    10
}

fn default_request_timeout_secs() -> u64 {
    30
}

impl HttpSourceConfig {
    /// 🧭 The first page's URL: the configured `url`, decorated with the page size if any.
    pub(crate) fn starting_url(&self) -> Result<Url, EtlError> {
        let mut url = Url::parse(&self.url).map_err(|err| EtlError::InvalidUrl {
            url: self.url.clone(),
            reason: err.to_string(),
        })?;
        if let Some(page_size) = self.page_size {
            url.query_pairs_mut()
                .append_pair(&self.page_size_param, &page_size.to_string());
        }
        Ok(url)
    }
}

/// 📦 The page fetcher. Owns one `reqwest::Client`, reused for every page, because building a
/// client per request is the networking equivalent of buying a new car for every grocery run.
#[derive(Debug)]
pub(crate) struct HttpSource {
    client: reqwest::Client,
}

impl HttpSource {
    /// 🚀 Build the client with the configured timeouts. Nothing is sent yet.
    pub(crate) fn new(config: &HttpSourceConfig) -> Result<Self, EtlError> {
        let client = reqwest::Client::builder()
            .connect_timeout(Duration::from_secs(config.connect_timeout_secs))
            .timeout(Duration::from_secs(config.request_timeout_secs))
            .build()
            .map_err(|err| EtlError::Fetch {
                url: config.url.clone(),
                reason: format!("the HTTP client refused to be born: {err}"),
            })?;
        Ok(Self { client })
    }
}

#[async_trait]
impl Source for HttpSource {
    /// 📡 One GET. 2xx + valid JSON is a page. Anything else is `EtlError::Fetch`.
    async fn fetch_page(&self, url: &Url) -> Result<Value, EtlError> {
        let fetch_failed = |reason: String| EtlError::Fetch { url: url.to_string(), reason };

        debug!("📡 GET {url}");
        let response = self
            .client
            .get(url.clone())
            .header("Accept", "application/json")
            .send()
            .await
            .map_err(|err| fetch_failed(format!("request never made it: {err}")))?;

        let status = response.status();
        if !status.is_success() {
            // 💀 we got an answer. it just wasn't the answer.
            let body = response.text().await.unwrap_or_default();
            let body = clip_body(&body, MAX_ERROR_BODY_BYTES);
            return Err(fetch_failed(format!("upstream said {status}: '{body}'")));
        }

        let bytes = response
            .bytes()
            .await
            .map_err(|err| fetch_failed(format!("body got lost on the way: {err}")))?;
        trace!("📦 {} bytes from {url}", bytes.len());

        serde_json::from_slice(&bytes).map_err(|err| fetch_failed(format!("body is not JSON: {err}")))
    }
}
/// ✂️ At most `max` bytes of `body`, cut on a char boundary, with a marker when something was cut.
fn clip_body(body: &str, max: usize) -> String {
    if body.len() <= max {
        return body.to_string();
    }
    let mut cut = max;
    while !body.is_char_boundary(cut) {
        cut -= 1;
    }
    format!("{}… ({} bytes total)", &body[..cut], body.len())
}
