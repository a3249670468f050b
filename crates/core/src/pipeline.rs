use crate::domain::candidate::Candidate;
use crate::domain::feed::DEFAULT_RECENCY_WINDOW_DAYS;
use crate::domain::run::RunProfile;
use crate::llm::Summarizer;
use crate::publish::{ContentPublisher, PublishRecord};
use crate::scrape::movers::MoverSource;
use crate::scrape::stockedge::StockSite;
use std::time::Duration;

// Pause between candidates to throttle the scraped sites and the publish
// endpoint.
const DEFAULT_PUBLISH_PACING: Duration = Duration::from_secs(1);

#[derive(Debug, Clone)]
pub struct PipelineOptions {
    pub recency_window_days: i64,
    pub publish_pacing: Duration,
}

impl Default for PipelineOptions {
    fn default() -> Self {
        Self {
            recency_window_days: DEFAULT_RECENCY_WINDOW_DAYS,
            publish_pacing: DEFAULT_PUBLISH_PACING,
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RunReport {
    pub processed: usize,
    pub published: usize,
    pub skipped: usize,
}

/// Drives one full run: discover movers, then for each candidate resolve,
/// read feeds, summarise and publish. A failure in any stage skips that
/// candidate only; the batch always runs to completion.
pub async fn run(
    source: &dyn MoverSource,
    site: &dyn StockSite,
    summarizer: &dyn Summarizer,
    publisher: &dyn ContentPublisher,
    profile: &RunProfile,
    options: &PipelineOptions,
) -> anyhow::Result<RunReport> {
    let candidates = source.top_movers(profile).await?;
    tracing::info!(
        count = candidates.len(),
        min_change_percent = profile.min_change_percent,
        tag = %profile.tag(),
        "discovered movers"
    );

    let mut report = RunReport::default();
    for candidate in &candidates {
        tracing::info!(
            stock = %candidate.name,
            change_percent = candidate.change_percent,
            "processing candidate"
        );
        report.processed += 1;

        match process_candidate(site, summarizer, publisher, profile, options, candidate).await {
            Ok(Some(_)) => report.published += 1,
            // Publish failures are logged by the publisher and terminal for
            // this record only.
            Ok(None) => {}
            Err(err) => {
                report.skipped += 1;
                tracing::warn!(
                    stock = %candidate.name,
                    error = %format!("{err:#}"),
                    "skipped candidate"
                );
            }
        }

        tokio::time::sleep(options.publish_pacing).await;
    }

    tracing::info!(
        processed = report.processed,
        published = report.published,
        skipped = report.skipped,
        "run complete"
    );
    Ok(report)
}

async fn process_candidate(
    site: &dyn StockSite,
    summarizer: &dyn Summarizer,
    publisher: &dyn ContentPublisher,
    profile: &RunProfile,
    options: &PipelineOptions,
    candidate: &Candidate,
) -> anyhow::Result<Option<serde_json::Value>> {
    let resolved = site.resolve(&candidate.name).await?;
    let digest = site
        .recent_feeds(&resolved, options.recency_window_days)
        .await?;
    let reasons = summarizer
        .summarise_feeds(&candidate.name, &digest.recent_headlines, candidate.direction)
        .await?;

    tracing::info!(
        stock = %candidate.name,
        symbol = %digest.symbol,
        headlines = digest.recent_headlines.len(),
        reasons = reasons.len(),
        "candidate summarised"
    );

    let record = PublishRecord::new(candidate, &digest.symbol, &reasons, &profile.tag());
    publisher.publish(&record).await
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::candidate::ResolvedStock;
    use crate::domain::feed::FeedDigest;
    use crate::domain::run::{Cadence, Direction};
    use crate::scrape::ScrapeError;
    use std::sync::Mutex;
    use url::Url;

    struct FixedSource(Vec<Candidate>);

    #[async_trait::async_trait]
    impl MoverSource for FixedSource {
        async fn top_movers(&self, _profile: &RunProfile) -> anyhow::Result<Vec<Candidate>> {
            Ok(self.0.clone())
        }
    }

    struct ScriptedSite {
        fail_resolve_for: Option<&'static str>,
    }

    #[async_trait::async_trait]
    impl StockSite for ScriptedSite {
        async fn resolve(&self, name: &str) -> anyhow::Result<ResolvedStock> {
            if Some(name) == self.fail_resolve_for {
                return Err(ScrapeError::NotFound {
                    query: name.to_string(),
                }
                .into());
            }
            let detail_url = Url::parse("https://web.example.com/share/stock/1").unwrap();
            Ok(ResolvedStock {
                feed_url: detail_url.clone(),
                detail_url,
            })
        }

        async fn recent_feeds(
            &self,
            _stock: &ResolvedStock,
            _window_days: i64,
        ) -> anyhow::Result<FeedDigest> {
            Ok(FeedDigest {
                symbol: "SYM".to_string(),
                recent_headlines: vec!["headline one".to_string(), "headline two".to_string()],
            })
        }
    }

    struct CannedSummarizer;

    #[async_trait::async_trait]
    impl Summarizer for CannedSummarizer {
        async fn summarise_feeds(
            &self,
            _stock_name: &str,
            _recent_feeds: &[String],
            _direction: Direction,
        ) -> anyhow::Result<Vec<String>> {
            Ok(vec![
                "1. One: first".to_string(),
                "2. Two: second".to_string(),
                "3. Three: third".to_string(),
            ])
        }
    }

    #[derive(Default)]
    struct RecordingPublisher {
        records: Mutex<Vec<PublishRecord>>,
        reject: bool,
    }

    #[async_trait::async_trait]
    impl ContentPublisher for RecordingPublisher {
        async fn publish(
            &self,
            record: &PublishRecord,
        ) -> anyhow::Result<Option<serde_json::Value>> {
            self.records.lock().unwrap().push(record.clone());
            if self.reject {
                Ok(None)
            } else {
                Ok(Some(serde_json::json!({"ok": true})))
            }
        }
    }

    fn candidates() -> Vec<Candidate> {
        ["Alpha Ltd", "Beta Ltd", "Gamma Ltd"]
            .into_iter()
            .map(|name| Candidate {
                name: name.to_string(),
                change_percent: 30.0,
                direction: Direction::Gainer,
            })
            .collect()
    }

    fn fast_options() -> PipelineOptions {
        PipelineOptions {
            recency_window_days: 90,
            publish_pacing: Duration::ZERO,
        }
    }

    #[tokio::test]
    async fn one_failing_candidate_does_not_abort_the_batch() {
        let source = FixedSource(candidates());
        let site = ScriptedSite {
            fail_resolve_for: Some("Beta Ltd"),
        };
        let publisher = RecordingPublisher::default();
        let profile = RunProfile::new(Direction::Gainer, Cadence::Monthly);

        let report = run(
            &source,
            &site,
            &CannedSummarizer,
            &publisher,
            &profile,
            &fast_options(),
        )
        .await
        .unwrap();

        assert_eq!(report.processed, 3);
        assert_eq!(report.published, 2);
        assert_eq!(report.skipped, 1);

        let records = publisher.records.lock().unwrap();
        let names: Vec<&str> = records.iter().map(|r| r.stock_name.as_str()).collect();
        assert_eq!(names, vec!["Alpha Ltd", "Gamma Ltd"]);
        assert_eq!(records[0].change_percent, "+30.00%");
        assert_eq!(records[0].tag, "monthlygainer");
    }

    #[tokio::test]
    async fn empty_discovery_is_a_valid_run() {
        let source = FixedSource(Vec::new());
        let site = ScriptedSite {
            fail_resolve_for: None,
        };
        let publisher = RecordingPublisher::default();
        let profile = RunProfile::new(Direction::Gainer, Cadence::Daily);

        let report = run(
            &source,
            &site,
            &CannedSummarizer,
            &publisher,
            &profile,
            &fast_options(),
        )
        .await
        .unwrap();

        assert_eq!(report, RunReport::default());
        assert!(publisher.records.lock().unwrap().is_empty());
    }

    #[tokio::test]
    async fn rejected_publishes_are_processed_but_not_published_or_skipped() {
        let source = FixedSource(candidates());
        let site = ScriptedSite {
            fail_resolve_for: None,
        };
        let publisher = RecordingPublisher {
            records: Mutex::new(Vec::new()),
            reject: true,
        };
        let profile = RunProfile::new(Direction::Gainer, Cadence::Monthly);

        let report = run(
            &source,
            &site,
            &CannedSummarizer,
            &publisher,
            &profile,
            &fast_options(),
        )
        .await
        .unwrap();

        assert_eq!(report.processed, 3);
        assert_eq!(report.published, 0);
        assert_eq!(report.skipped, 0);
    }
}
