use crate::config::EngineConfig;
use crate::schema::JournalEntry;
use crate::validator::notes_indicate_issues;

/// Per-stage confidence weights: extraction, standardization, generation.
/// Generation carries the most weight because it is the stage with the most
/// room to go wrong.
const STAGE_WEIGHTS: [f64; 3] = [0.2, 0.3, 0.5];

pub struct ConfidenceAggregator;

impl ConfidenceAggregator {
    /// Weighted sum of the three upstream stage confidences, rounded to
    /// three decimal places.
    pub fn aggregate(extraction: f64, standardization: f64, generation: f64) -> f64 {
        let weighted = extraction * STAGE_WEIGHTS[0]
            + standardization * STAGE_WEIGHTS[1]
            + generation * STAGE_WEIGHTS[2];
        (weighted * 1000.0).round() / 1000.0
    }

    /// The pipeline-level review decision, distinct from the validator's
    /// entry-local flag.
    pub fn review_required(
        final_confidence: f64,
        entry: &JournalEntry,
        config: &EngineConfig,
    ) -> bool {
        final_confidence < config.confidence_threshold_medium
            || !entry.is_balanced
            || notes_indicate_issues(&entry.validation_notes)
    }
}
