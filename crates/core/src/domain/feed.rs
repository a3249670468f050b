use chrono::{Duration, NaiveDate};

/// Feed dates as rendered on the detail page, e.g. `28-Jul-2026`.
const FEED_DATE_FORMAT: &str = "%d-%b-%Y";

pub const DEFAULT_RECENCY_WINDOW_DAYS: i64 = 90;

/// Used when the detail page does not expose a symbol.
pub const SYMBOL_SENTINEL: &str = "N/A";

/// One feed row as scraped, date label still unparsed.
#[derive(Debug, Clone)]
pub struct FeedEntry {
    pub date_label: String,
    pub headline: String,
}

impl FeedEntry {
    pub fn parsed_date(&self) -> Option<NaiveDate> {
        NaiveDate::parse_from_str(self.date_label.trim(), FEED_DATE_FORMAT).ok()
    }
}

/// What the feed extraction hands to the summarizer.
#[derive(Debug, Clone)]
pub struct FeedDigest {
    pub symbol: String,
    pub recent_headlines: Vec<String>,
}

/// A feed item is recent when its date is strictly after
/// `today - window_days`.
pub fn is_recent(date: NaiveDate, today: NaiveDate, window_days: i64) -> bool {
    date > today - Duration::days(window_days)
}

/// Keeps page order. Entries whose date label fails to parse are dropped
/// rather than treated as errors.
pub fn recent_headlines(entries: &[FeedEntry], today: NaiveDate, window_days: i64) -> Vec<String> {
    entries
        .iter()
        .filter(|entry| {
            entry
                .parsed_date()
                .is_some_and(|date| is_recent(date, today, window_days))
        })
        .map(|entry| entry.headline.clone())
        .collect()
}
