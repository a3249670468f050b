use crate::domain::candidate::Candidate;
use crate::domain::run::RunProfile;
use crate::scrape::{fetch_html, ScrapeError};
use anyhow::Result;
use scraper::{Html, Selector};

const ROW_SELECTOR: &str = "table.dataTable tr";

#[async_trait::async_trait]
pub trait MoverSource: Send + Sync {
    /// Aggregates candidates across all of the profile's listing pages, in
    /// listing order, filtered by the profile's change threshold.
    async fn top_movers(&self, profile: &RunProfile) -> Result<Vec<Candidate>>;
}

#[derive(Debug, Clone)]
pub struct RediffMoversClient {
    http: reqwest::Client,
}

impl RediffMoversClient {
    pub fn new(http: reqwest::Client) -> Self {
        Self { http }
    }

    async fn list_page(&self, url: &str, profile: &RunProfile) -> Result<Vec<Candidate>> {
        let html = fetch_html(&self.http, url).await?;
        parse_listing(&html, url, profile)
    }
}

#[async_trait::async_trait]
impl MoverSource for RediffMoversClient {
    async fn top_movers(&self, profile: &RunProfile) -> Result<Vec<Candidate>> {
        let mut movers = Vec::new();
        let mut failed_pages: usize = 0;

        for url in &profile.listing_urls {
            tracing::info!(%url, "visiting listing page");
            match self.list_page(url, profile).await {
                Ok(mut page_movers) => {
                    tracing::info!(%url, count = page_movers.len(), "listing page parsed");
                    movers.append(&mut page_movers);
                }
                Err(err) => {
                    failed_pages += 1;
                    tracing::warn!(%url, error = %err, "listing page failed; skipping");
                }
            }
        }

        anyhow::ensure!(
            failed_pages < profile.listing_urls.len(),
            "every configured listing page failed"
        );
        Ok(movers)
    }
}

fn parse_listing(html: &str, url: &str, profile: &RunProfile) -> Result<Vec<Candidate>> {
    let doc = Html::parse_document(html);
    let row_sel = Selector::parse(ROW_SELECTOR).unwrap();
    let cell_sel = Selector::parse("td").unwrap();

    let mut saw_rows = false;
    let mut out = Vec::new();
    for row in doc.select(&row_sel) {
        let cells: Vec<String> = row
            .select(&cell_sel)
            .map(|td| td.text().collect::<String>().trim().to_string())
            .collect();

        // Header and spacer rows carry no data cells.
        if cells.len() < 5 {
            continue;
        }
        saw_rows = true;

        let change_percent = parse_change_percent(&cells[4]);
        if change_percent.abs() >= profile.min_change_percent {
            out.push(Candidate {
                name: cells[0].clone(),
                change_percent,
                direction: profile.direction,
            });
        }
    }

    if !saw_rows {
        return Err(ScrapeError::MissingElement {
            url: url.to_string(),
            selector: ROW_SELECTOR,
        }
        .into());
    }
    Ok(out)
}

/// The listing renders changes like `+ 30.12%`. Only `+`, `%` and spaces
/// are stripped, so a leading minus on loser rows survives the cleanup;
/// anything that still fails to parse counts as 0 and falls below every
/// threshold.
fn parse_change_percent(raw: &str) -> f64 {
    let cleaned: String = raw
        .chars()
        .filter(|c| !matches!(c, '+' | '%' | ' '))
        .collect();
    cleaned.parse::<f64>().unwrap_or(0.0)
}
