pub mod error;
pub mod groq;

use crate::domain::run::Direction;

/// Returned instead of calling the completion service when a stock has no
/// recent feed items.
pub const NO_RECENT_FEEDS_SENTINEL: &str = "No recent feeds found";

#[async_trait::async_trait]
pub trait Summarizer: Send + Sync {
    /// Returns the model's reasons, one line per entry. The model is asked
    /// for exactly three, but callers must not assume the count.
    async fn summarise_feeds(
        &self,
        stock_name: &str,
        recent_feeds: &[String],
        direction: Direction,
    ) -> anyhow::Result<Vec<String>>;
}
