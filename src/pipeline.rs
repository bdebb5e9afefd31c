use crate::catalog::AccountCatalog;
use crate::classifier::{classify, Complexity};
use crate::confidence::ConfidenceAggregator;
use crate::config::EngineConfig;
use crate::error::JournalError;
use crate::generator::{EntryDraftGenerator, ReasoningOracle};
use crate::parser::ResponseCoercionParser;
use crate::retriever::KnowledgeRetriever;
use crate::schema::JournalEntry;
use crate::validator::EntryValidator;
use chrono::NaiveDate;
use log::{info, warn};
use serde::{Deserialize, Serialize};

/// One business description to turn into a journal entry, together with the
/// confidences reported by the upstream extraction and standardization
/// stages (external collaborators).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GenerationRequest {
    pub description: String,
    pub amount: f64,
    pub entry_date: NaiveDate,
    pub extraction_confidence: f64,
    pub standardization_confidence: f64,
    /// Policy downgrade: when false, a Compound classification is processed
    /// in Simple mode. There is no caller escalation in the other direction.
    pub allow_compound: bool,
}

impl GenerationRequest {
    pub fn new(description: impl Into<String>, amount: f64, entry_date: NaiveDate) -> Self {
        Self {
            description: description.into(),
            amount,
            entry_date,
            extraction_confidence: 1.0,
            standardization_confidence: 1.0,
            allow_compound: true,
        }
    }
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum ProcessingStatus {
    Success,
    Failed,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PipelineResult {
    pub entry: JournalEntry,
    pub complexity: Complexity,
    pub status: ProcessingStatus,
    /// Composition of the three stage confidences, distinct from the
    /// entry's own generation confidence.
    pub final_confidence: f64,
    /// Pipeline-level review decision; may be true even when the entry's
    /// internal flag is false.
    pub needs_review: bool,
    pub rule_hits: usize,
}

/// Sequential per-document pipeline: classify, retrieve, prompt, parse,
/// validate, compose confidence. Documents share only the read-only catalog
/// snapshot, so callers may fan out over `process` in parallel if they wish.
pub struct JournalPipeline<'a> {
    config: &'a EngineConfig,
    catalog: &'a dyn AccountCatalog,
    retriever: &'a dyn KnowledgeRetriever,
    oracle: &'a dyn ReasoningOracle,
}

impl<'a> JournalPipeline<'a> {
    pub fn new(
        config: &'a EngineConfig,
        catalog: &'a dyn AccountCatalog,
        retriever: &'a dyn KnowledgeRetriever,
        oracle: &'a dyn ReasoningOracle,
    ) -> Self {
        Self {
            config,
            catalog,
            retriever,
            oracle,
        }
    }

    /// Runs one document through the pipeline. Never panics and never
    /// returns an error: a failed oracle call or unrecoverable response
    /// degrades to a zero-confidence error entry flagged for review.
    pub fn process(&self, request: &GenerationRequest) -> PipelineResult {
        info!("generating journal entry for: {}", request.description);

        let mut complexity = classify(&request.description, request.amount);
        if complexity == Complexity::Compound && !request.allow_compound {
            info!("compound classification downgraded to simple by caller policy");
            complexity = Complexity::Simple;
        }

        let snippets = self
            .retriever
            .search(&request.description, self.config.retrieval_k);
        let rule_hits = snippets.len();

        let generator = EntryDraftGenerator::new(self.config);
        let raw = match generator.generate(
            self.oracle,
            &request.description,
            request.amount,
            request.entry_date,
            &snippets,
            self.catalog,
            complexity,
        ) {
            Ok(text) => text,
            Err(e) => return self.failed_result(request, complexity, rule_hits, &e),
        };

        let mut entry = match ResponseCoercionParser::parse(&raw) {
            Ok(entry) => entry,
            Err(e) => return self.failed_result(request, complexity, rule_hits, &e),
        };

        EntryValidator::validate(&mut entry, self.catalog, self.config);

        let final_confidence = ConfidenceAggregator::aggregate(
            request.extraction_confidence,
            request.standardization_confidence,
            entry.confidence_score,
        );
        let needs_review =
            ConfidenceAggregator::review_required(final_confidence, &entry, self.config);

        info!(
            "journal entry finalized: {} line(s), confidence {:.3}, review={}",
            entry.entry_lines.len(),
            final_confidence,
            needs_review
        );

        PipelineResult {
            entry,
            complexity,
            status: ProcessingStatus::Success,
            final_confidence,
            needs_review,
            rule_hits,
        }
    }

    /// Processes documents one at a time; a failing document is reported in
    /// its own result and never aborts the rest of the batch.
    pub fn process_batch(&self, requests: &[GenerationRequest]) -> Vec<PipelineResult> {
        info!("processing batch of {} document(s)", requests.len());

        let results: Vec<PipelineResult> = requests.iter().map(|r| self.process(r)).collect();

        let succeeded = results
            .iter()
            .filter(|r| r.status == ProcessingStatus::Success)
            .count();
        info!("batch complete: {}/{} succeeded", succeeded, requests.len());

        results
    }

    fn failed_result(
        &self,
        request: &GenerationRequest,
        complexity: Complexity,
        rule_hits: usize,
        error: &JournalError,
    ) -> PipelineResult {
        warn!("entry generation failed: {}", error);

        let entry = JournalEntry {
            business_description: request.description.clone(),
            entry_date: request.entry_date,
            voucher_number: None,
            entry_lines: Vec::new(),
            analysis_process: format!("generation failed: {}", error),
            applied_rules: "none".to_string(),
            confidence_score: 0.0,
            is_balanced: false,
            validation_notes: format!("generation error: {}", error),
            needs_review: true,
        };

        PipelineResult {
            entry,
            complexity,
            status: ProcessingStatus::Failed,
            final_confidence: 0.0,
            needs_review: true,
            rule_hits,
        }
    }
}
