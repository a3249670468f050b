pub mod error;
pub mod movers;
pub mod stockedge;

pub use error::ScrapeError;

use anyhow::Context;
use reqwest::header::{HeaderMap, HeaderValue};
use std::time::Duration;

// The listing and detail sites serve their full markup only to
// recognizable browsers.
const USER_AGENT: &str = "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/118.0.5993.118 Safari/537.36";

const DEFAULT_TIMEOUT_SECS: u64 = 30;

/// Builds the shared scrape client. One client lives for the whole run and
/// is cloned cheaply into each stage; dropping it at the end of `main`
/// releases the connection pool.
pub fn build_http_client() -> anyhow::Result<reqwest::Client> {
    let timeout_secs = std::env::var("SCRAPE_TIMEOUT_SECS")
        .ok()
        .and_then(|s| s.parse::<u64>().ok())
        .unwrap_or(DEFAULT_TIMEOUT_SECS);

    let mut headers = HeaderMap::new();
    headers.insert("accept-language", HeaderValue::from_static("en-US,en;q=0.9"));

    reqwest::Client::builder()
        .user_agent(USER_AGENT)
        .default_headers(headers)
        .timeout(Duration::from_secs(timeout_secs))
        .build()
        .context("failed to build scrape http client")
}

pub(crate) async fn fetch_html(
    http: &reqwest::Client,
    url: &str,
) -> Result<String, ScrapeError> {
    let res = http
        .get(url)
        .send()
        .await
        .map_err(|err| ScrapeError::page(url, err.to_string()))?;

    let status = res.status();
    if !status.is_success() {
        return Err(ScrapeError::page(url, format!("HTTP {status}")));
    }

    res.text()
        .await
        .map_err(|err| ScrapeError::page(url, format!("body read failed: {err}")))
}
