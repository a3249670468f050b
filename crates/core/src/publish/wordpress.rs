use crate::config::Settings;
use crate::publish::{ContentPublisher, PublishRecord};
use anyhow::Context;
use std::time::Duration;
use url::Url;

const DEFAULT_TIMEOUT_SECS: u64 = 30;
const API_ROOT_PATH: &str = "/wp-json/";
const BODY_PREVIEW_LIMIT: usize = 400;

#[derive(Debug, Clone)]
pub struct WordPressClient {
    http: reqwest::Client,
    api_url: Url,
    username: String,
    password: String,
}

impl WordPressClient {
    pub fn from_settings(settings: &Settings) -> anyhow::Result<Self> {
        let api_url =
            Url::parse(settings.require_wp_api_url()?).context("WP_API_URL is not a valid URL")?;
        let username = settings.require_wp_user()?.to_string();
        let password = settings.require_wp_pass()?.to_string();

        let timeout_secs = std::env::var("WP_TIMEOUT_SECS")
            .ok()
            .and_then(|s| s.parse::<u64>().ok())
            .unwrap_or(DEFAULT_TIMEOUT_SECS);

        let http = reqwest::Client::builder()
            .timeout(Duration::from_secs(timeout_secs))
            .build()
            .context("failed to build publish http client")?;

        Ok(Self {
            http,
            api_url,
            username,
            password,
        })
    }

    /// Surfaces endpoint and authentication problems before the batch
    /// starts: the API root must answer, and a read-only authenticated probe
    /// of the exact target endpoint must complete at the transport level.
    pub async fn preflight(&self) -> anyhow::Result<()> {
        tracing::info!(
            endpoint = %self.api_url,
            user = %self.username,
            pass = %mask(&self.password, 4),
            "publish endpoint preflight"
        );

        let root = self
            .api_url
            .join(API_ROOT_PATH)
            .context("failed to derive API root URL")?;
        let res = self
            .http
            .get(root.clone())
            .send()
            .await
            .with_context(|| format!("API root unreachable: {root}"))?;
        anyhow::ensure!(
            res.status().is_success(),
            "API root {root} returned HTTP {}",
            res.status()
        );
        tracing::info!(%root, status = %res.status(), "API root reachable");

        let res = self
            .http
            .get(self.api_url.clone())
            .basic_auth(&self.username, Some(&self.password))
            .send()
            .await
            .context("endpoint probe request failed")?;
        let status = res.status();
        let body = res.text().await.unwrap_or_default();

        // Non-2xx is informational here; some endpoints only accept POST.
        tracing::info!(
            endpoint = %self.api_url,
            %status,
            preview = %truncate(&body, BODY_PREVIEW_LIMIT),
            "endpoint probe"
        );
        Ok(())
    }
}

#[async_trait::async_trait]
impl ContentPublisher for WordPressClient {
    async fn publish(
        &self,
        record: &PublishRecord,
    ) -> anyhow::Result<Option<serde_json::Value>> {
        tracing::info!(stock = %record.stock_name, tag = %record.tag, "posting record");

        let res = match self
            .http
            .post(self.api_url.clone())
            .basic_auth(&self.username, Some(&self.password))
            .json(record)
            .send()
            .await
        {
            Ok(res) => res,
            Err(err) => {
                tracing::error!(
                    endpoint = %self.api_url,
                    error = %err,
                    status = ?err.status(),
                    "transport failure while posting record"
                );
                return Ok(None);
            }
        };

        let status = res.status();
        let body = res.text().await.unwrap_or_default();
        if !status.is_success() {
            tracing::error!(
                endpoint = %self.api_url,
                %status,
                body = %truncate(&body, BODY_PREVIEW_LIMIT),
                "endpoint rejected record"
            );
            return Ok(None);
        }

        tracing::info!(stock = %record.stock_name, %status, "record published");
        let value = serde_json::from_str(&body).unwrap_or(serde_json::Value::String(body));
        Ok(Some(value))
    }
}

fn mask(secret: &str, keep: usize) -> String {
    let total = secret.chars().count();
    if total <= keep {
        return "*".repeat(total);
    }
    let kept: String = secret.chars().take(keep).collect();
    format!("{kept}{}", "*".repeat(total - keep))
}

fn truncate(s: &str, limit: usize) -> &str {
    match s.char_indices().nth(limit) {
        Some((idx, _)) => &s[..idx],
        None => s,
    }
}
