use crate::domain::candidate::ResolvedStock;
use crate::domain::feed::{self, FeedDigest, FeedEntry};
use crate::scrape::{fetch_html, ScrapeError};
use anyhow::{Context, Result};
use scraper::{Html, Selector};
use url::Url;

const DEFAULT_SEARCH_URL: &str = "https://search.stockedge.com/";

const RESULT_ROW_SELECTOR: &str = ".response-table tr";
const FEED_ITEM_SELECTOR: &str = "ion-item";
const FEED_DATE_SELECTOR: &str = "ion-col:nth-child(2) ion-text";
const FEED_HEADLINE_SELECTOR: &str = "p";
const SYMBOL_SELECTOR: &str = "ion-text.small-font.low-margin-left";

// Stock detail pages live under /share/; sector and index pages do not.
const STOCK_DETAIL_PATH_SEGMENT: &str = "/share/";
const FEED_SECTION_PARAM: (&str, &str) = ("section", "feeds");

#[async_trait::async_trait]
pub trait StockSite: Send + Sync {
    /// Resolves a candidate's display name to its stock detail page.
    async fn resolve(&self, name: &str) -> Result<ResolvedStock>;

    /// Reads the detail page's feed section and keeps headlines within the
    /// recency window, along with the page's display symbol.
    async fn recent_feeds(&self, stock: &ResolvedStock, window_days: i64) -> Result<FeedDigest>;
}

#[derive(Debug, Clone)]
pub struct StockEdgeClient {
    http: reqwest::Client,
    search_url: Url,
}

impl StockEdgeClient {
    pub fn new(http: reqwest::Client) -> Result<Self> {
        let raw = std::env::var("STOCKEDGE_SEARCH_URL")
            .unwrap_or_else(|_| DEFAULT_SEARCH_URL.to_string());
        let search_url = Url::parse(&raw).context("invalid StockEdge search URL")?;
        Ok(Self { http, search_url })
    }

    pub fn with_search_url(http: reqwest::Client, search_url: Url) -> Self {
        Self { http, search_url }
    }
}

#[async_trait::async_trait]
impl StockSite for StockEdgeClient {
    async fn resolve(&self, name: &str) -> Result<ResolvedStock> {
        // Same request the site issues when the search box is submitted.
        let mut url = self.search_url.clone();
        url.query_pairs_mut().append_pair("q", name);

        let html = fetch_html(&self.http, url.as_str()).await?;
        resolve_from_results(&html, &url, name)
    }

    async fn recent_feeds(&self, stock: &ResolvedStock, window_days: i64) -> Result<FeedDigest> {
        let today = chrono::Utc::now().date_naive();
        let html = fetch_html(&self.http, stock.feed_url.as_str())
            .await
            .context("failed scraping StockEdge feed page")?;
        digest_from_feed_page(&html, stock.feed_url.as_str(), today, window_days)
            .context("failed scraping StockEdge feed page")
    }
}

fn resolve_from_results(html: &str, search_url: &Url, query: &str) -> Result<ResolvedStock> {
    let doc = Html::parse_document(html);
    let row_sel = Selector::parse(RESULT_ROW_SELECTOR).unwrap();
    let link_sel = Selector::parse("a[href]").unwrap();

    let mut saw_rows = false;
    for row in doc.select(&row_sel) {
        saw_rows = true;
        for link in row.select(&link_sel) {
            let Some(href) = link.value().attr("href") else {
                continue;
            };
            // Sector and index rows are not valid stock results.
            if !href.contains(STOCK_DETAIL_PATH_SEGMENT) {
                continue;
            }

            let detail_url = search_url
                .join(href)
                .with_context(|| format!("bad detail href: {href}"))?;
            let mut feed_url = detail_url.clone();
            feed_url
                .query_pairs_mut()
                .append_pair(FEED_SECTION_PARAM.0, FEED_SECTION_PARAM.1);

            return Ok(ResolvedStock {
                detail_url,
                feed_url,
            });
        }
    }

    if !saw_rows {
        return Err(ScrapeError::MissingElement {
            url: search_url.to_string(),
            selector: RESULT_ROW_SELECTOR,
        }
        .into());
    }
    Err(ScrapeError::NotFound {
        query: query.to_string(),
    }
    .into())
}

fn digest_from_feed_page(
    html: &str,
    url: &str,
    today: chrono::NaiveDate,
    window_days: i64,
) -> Result<FeedDigest> {
    let doc = Html::parse_document(html);
    let item_sel = Selector::parse(FEED_ITEM_SELECTOR).unwrap();
    let date_sel = Selector::parse(FEED_DATE_SELECTOR).unwrap();
    let headline_sel = Selector::parse(FEED_HEADLINE_SELECTOR).unwrap();
    let symbol_sel = Selector::parse(SYMBOL_SELECTOR).unwrap();

    let symbol = doc
        .select(&symbol_sel)
        .next()
        .map(|el| el.text().collect::<String>().trim().to_string())
        .filter(|s| !s.is_empty())
        .unwrap_or_else(|| feed::SYMBOL_SENTINEL.to_string());

    let mut saw_items = false;
    let mut entries = Vec::new();
    for item in doc.select(&item_sel) {
        saw_items = true;

        let date_label = item
            .select(&date_sel)
            .next()
            .map(|el| el.text().collect::<String>().trim().to_string());
        let headline = item
            .select(&headline_sel)
            .next()
            .map(|el| el.text().collect::<String>().trim().to_string());

        if let (Some(date_label), Some(headline)) = (date_label, headline) {
            entries.push(FeedEntry {
                date_label,
                headline,
            });
        }
    }

    if !saw_items {
        return Err(ScrapeError::MissingElement {
            url: url.to_string(),
            selector: FEED_ITEM_SELECTOR,
        }
        .into());
    }

    Ok(FeedDigest {
        symbol,
        recent_headlines: feed::recent_headlines(&entries, today, window_days),
    })
}
