use std::fmt;

#[derive(Debug)]
pub enum ScrapeError {
    /// No stock-type result matched the search query.
    NotFound { query: String },

    /// The page failed to load within its bound.
    PageUnavailable { url: String, detail: String },

    /// The page loaded but an expected element never appeared.
    MissingElement {
        url: String,
        selector: &'static str,
    },
}

impl ScrapeError {
    pub(crate) fn page(url: impl Into<String>, detail: impl Into<String>) -> Self {
        Self::PageUnavailable {
            url: url.into(),
            detail: detail.into(),
        }
    }
}

impl fmt::Display for ScrapeError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::NotFound { query } => {
                write!(f, "no valid stock row found for: {query}")
            }
            Self::PageUnavailable { url, detail } => {
                write!(f, "page unavailable ({url}): {detail}")
            }
            Self::MissingElement { url, selector } => {
                write!(f, "expected element {selector:?} never appeared on {url}")
            }
        }
    }
}

impl std::error::Error for ScrapeError {}
