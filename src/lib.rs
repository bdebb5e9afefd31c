//! # Journal Builder
//!
//! A library for turning a free-text business description (derived from a
//! parsed invoice or receipt) into a validated, balanced double-entry
//! journal entry, and for aggregating approved entries into standard period
//! financial statements.
//!
//! ## Core Concepts
//!
//! - **Reasoning oracle**: an external natural-language service that
//!   proposes entries from a business description; its free-text output is
//!   decoded through a multi-stage recovery chain
//! - **Complexity classification**: descriptions mentioning tax, payroll,
//!   accruals or open items escalate to compound (multi-line) entries
//! - **Evidence isolation**: invoice-only evidence defaults to
//!   payable/receivable lines; bank and cash accounts require explicit
//!   evidence of a cash movement
//! - **Double-entry balance**: total debits must equal total credits within
//!   a fixed tolerance; violations clamp confidence and escalate for review
//! - **Statement aggregation**: approved entries roll up into a balance
//!   sheet, income statement and a simplified cash-flow proxy
//!
//! ## Example
//!
//! ```rust,ignore
//! use journal_builder::*;
//! use chrono::NaiveDate;
//!
//! let config = EngineConfig::default();
//! let catalog = InMemoryCatalog::standard_chart();
//! let retriever = KeywordRetriever::default();
//! let oracle = llm::OpenAiClient::new(std::env::var("OPENAI_API_KEY")?)?;
//!
//! let pipeline = JournalPipeline::new(&config, &catalog, &retriever, &oracle);
//! let result = pipeline.process(&GenerationRequest::new(
//!     "purchased office supplies, 5000 plus VAT 650 (total 5650)",
//!     5650.0,
//!     NaiveDate::from_ymd_opt(2024, 3, 20).unwrap(),
//! ));
//!
//! assert!(result.entry.is_balanced);
//! ```

pub mod catalog;
pub mod classifier;
pub mod confidence;
pub mod config;
pub mod error;
pub mod generator;
pub mod parser;
pub mod pipeline;
pub mod prompts;
pub mod retriever;
pub mod schema;
pub mod statements;
pub mod validator;

#[cfg(feature = "openai")]
pub mod llm;

pub use catalog::{catalog_text, AccountCatalog, InMemoryCatalog};
pub use classifier::{classify, Complexity};
pub use confidence::ConfidenceAggregator;
pub use config::EngineConfig;
pub use error::{JournalError, Result};
pub use generator::{EntryDraftGenerator, OracleRequest, ReasoningOracle};
pub use parser::ResponseCoercionParser;
pub use pipeline::{GenerationRequest, JournalPipeline, PipelineResult, ProcessingStatus};
pub use retriever::{context_text, KeywordRetriever, KnowledgeRetriever, RuleSnippet};
pub use schema::*;
pub use statements::{
    AccountBalances, BalanceSheet, CashFlowStatement, IncomeStatement, StatementAggregator,
};
pub use validator::EntryValidator;

/// Runs one business description through the full pipeline. Convenience
/// wrapper over [`JournalPipeline::process`].
pub fn generate_journal_entry(
    config: &EngineConfig,
    catalog: &dyn AccountCatalog,
    retriever: &dyn KnowledgeRetriever,
    oracle: &dyn ReasoningOracle,
    request: &GenerationRequest,
) -> PipelineResult {
    JournalPipeline::new(config, catalog, retriever, oracle).process(request)
}

/// Processes a batch of descriptions, continuing past per-document failures.
pub fn generate_batch(
    config: &EngineConfig,
    catalog: &dyn AccountCatalog,
    retriever: &dyn KnowledgeRetriever,
    oracle: &dyn ReasoningOracle,
    requests: &[GenerationRequest],
) -> Vec<PipelineResult> {
    JournalPipeline::new(config, catalog, retriever, oracle).process_batch(requests)
}
