use crate::domain::run::Direction;
use url::Url;

/// A stock picked up from a movers listing. Only rows whose change
/// magnitude met the run's threshold become candidates.
#[derive(Debug, Clone)]
pub struct Candidate {
    pub name: String,
    pub change_percent: f64,
    pub direction: Direction,
}

/// Outcome of resolving a candidate's display name against the stock
/// detail site. `feed_url` is `detail_url` with the feed section selected.
#[derive(Debug, Clone)]
pub struct ResolvedStock {
    pub detail_url: Url,
    pub feed_url: Url,
}
