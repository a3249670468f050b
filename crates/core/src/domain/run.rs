const LISTING_BASE_URL: &str = "https://money.rediff.com";
const LISTING_GROUPS: [&str; 2] = ["groupa", "groupb"];

const DAILY_MIN_CHANGE_PERCENT: f64 = 7.0;
const MONTHLY_MIN_CHANGE_PERCENT: f64 = 25.0;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Direction {
    Gainer,
    Loser,
}

impl Direction {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Gainer => "gainer",
            Self::Loser => "loser",
        }
    }

    pub fn listing_segment(self) -> &'static str {
        match self {
            Self::Gainer => "gainers",
            Self::Loser => "losers",
        }
    }

    // The publish side grew these names organically ("gainer" singular,
    // "losers" plural); the remote endpoint filters on them as-is.
    pub fn tag_word(self) -> &'static str {
        match self {
            Self::Gainer => "gainer",
            Self::Loser => "losers",
        }
    }

    /// Gainer records carry an explicit plus sign; loser records keep the
    /// bare numeric string from the listing.
    pub fn format_change(self, change_percent: f64) -> String {
        match self {
            Self::Gainer => format!("+{change_percent:.2}%"),
            Self::Loser => format!("{change_percent:.2}%"),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Cadence {
    Daily,
    Monthly,
}

impl Cadence {
    pub fn listing_segment(self) -> &'static str {
        match self {
            Self::Daily => "daily",
            Self::Monthly => "monthly",
        }
    }

    pub fn default_min_change_percent(self) -> f64 {
        match self {
            Self::Daily => DAILY_MIN_CHANGE_PERCENT,
            Self::Monthly => MONTHLY_MIN_CHANGE_PERCENT,
        }
    }
}

/// Everything a single run needs to know about what it is publishing:
/// which side of the movers board, at which cadence, with which threshold,
/// and from which listing pages.
#[derive(Debug, Clone)]
pub struct RunProfile {
    pub direction: Direction,
    pub cadence: Cadence,
    pub min_change_percent: f64,
    pub listing_urls: Vec<String>,
}

impl RunProfile {
    pub fn new(direction: Direction, cadence: Cadence) -> Self {
        let listing_urls = LISTING_GROUPS
            .iter()
            .map(|group| {
                format!(
                    "{LISTING_BASE_URL}/{}/bse/{}/{group}",
                    direction.listing_segment(),
                    cadence.listing_segment()
                )
            })
            .collect();

        Self {
            direction,
            cadence,
            min_change_percent: cadence.default_min_change_percent(),
            listing_urls,
        }
    }

    pub fn with_min_change_percent(mut self, min_change_percent: f64) -> Self {
        self.min_change_percent = min_change_percent;
        self
    }

    pub fn tag(&self) -> String {
        format!(
            "{}{}",
            self.cadence.listing_segment(),
            self.direction.tag_word()
        )
    }
}
