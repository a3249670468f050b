pub mod wordpress;

use crate::domain::candidate::Candidate;
use serde::Serialize;

/// JSON body the content endpoint expects; the field names are part of the
/// remote contract.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PublishRecord {
    pub stock_name: String,
    pub nse_symbol: String,
    pub change_percent: String,
    pub summary1: String,
    pub summary2: String,
    pub summary3: String,
    pub tag: String,
}

impl PublishRecord {
    /// The summarizer may return fewer than three reasons; missing slots are
    /// published as empty strings.
    pub fn new(candidate: &Candidate, symbol: &str, reasons: &[String], tag: &str) -> Self {
        let slot = |i: usize| reasons.get(i).cloned().unwrap_or_default();
        Self {
            stock_name: candidate.name.clone(),
            nse_symbol: symbol.to_string(),
            change_percent: candidate.direction.format_change(candidate.change_percent),
            summary1: slot(0),
            summary2: slot(1),
            summary3: slot(2),
            tag: tag.to_string(),
        }
    }
}

#[async_trait::async_trait]
pub trait ContentPublisher: Send + Sync {
    /// `Ok(None)` means the endpoint rejected the record or was unreachable;
    /// the failure has already been logged and is terminal for this record.
    async fn publish(&self, record: &PublishRecord)
        -> anyhow::Result<Option<serde_json::Value>>;
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::run::Direction;

    fn gainer(name: &str, change_percent: f64) -> Candidate {
        Candidate {
            name: name.to_string(),
            change_percent,
            direction: Direction::Gainer,
        }
    }

    #[test]
    fn serializes_with_the_remote_field_names() {
        let reasons = vec!["1. a".to_string(), "2. b".to_string(), "3. c".to_string()];
        let record = PublishRecord::new(&gainer("Acme Ltd", 30.12), "ACME", &reasons, "monthlygainer");

        let value = serde_json::to_value(&record).unwrap();
        assert_eq!(value["stockName"], "Acme Ltd");
        assert_eq!(value["nseSymbol"], "ACME");
        assert_eq!(value["changePercent"], "+30.12%");
        assert_eq!(value["summary1"], "1. a");
        assert_eq!(value["summary3"], "3. c");
        assert_eq!(value["tag"], "monthlygainer");
    }

    #[test]
    fn missing_summary_slots_become_empty_strings() {
        let reasons = vec!["No recent feeds found".to_string()];
        let record = PublishRecord::new(&gainer("Acme Ltd", 8.0), "N/A", &reasons, "dailygainer");

        assert_eq!(record.summary1, "No recent feeds found");
        assert_eq!(record.summary2, "");
        assert_eq!(record.summary3, "");
    }

    #[test]
    fn loser_records_carry_the_bare_signed_change() {
        let candidate = Candidate {
            name: "Slump Ltd".to_string(),
            change_percent: -12.5,
            direction: Direction::Loser,
        };
        let record = PublishRecord::new(&candidate, "SLMP", &[], "monthlylosers");
        assert_eq!(record.change_percent, "-12.50%");
    }
}
