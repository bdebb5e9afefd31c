use serde::{Deserialize, Serialize};

/// Engine-wide tunables. Passed by reference into each component so tests
/// can run deterministically without process-wide state.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EngineConfig {
    /// Entity name embedded in oracle prompts ("you are the accountant of ...").
    pub company_name: String,
    /// Entries at or above this confidence are considered reliable.
    pub confidence_threshold_high: f64,
    /// Entries below this confidence are escalated for human review.
    pub confidence_threshold_medium: f64,
    /// Maximum debit/credit difference still treated as balanced.
    pub balance_tolerance: f64,
    /// Flat income-tax rate applied when deriving net profit. A declared
    /// simplification, not tax-law-accurate.
    pub income_tax_rate: f64,
    /// Rule snippets to retrieve per generation.
    pub retrieval_k: usize,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            company_name: "Example Trading Co.".to_string(),
            confidence_threshold_high: 0.8,
            confidence_threshold_medium: 0.6,
            balance_tolerance: 0.01,
            income_tax_rate: 0.25,
            retrieval_k: 3,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_thresholds() {
        let config = EngineConfig::default();
        assert!(config.confidence_threshold_medium < config.confidence_threshold_high);
        assert!((config.balance_tolerance - 0.01).abs() < f64::EPSILON);
        assert_eq!(config.retrieval_k, 3);
    }
}
