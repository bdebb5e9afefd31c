use crate::catalog::{catalog_text, AccountCatalog};
use crate::classifier::Complexity;
use crate::config::EngineConfig;
use crate::error::Result;
use crate::prompts::{build_system_prompt, build_user_message};
use crate::retriever::{context_text, RuleSnippet};
use chrono::NaiveDate;
use log::debug;

/// The opaque natural-language reasoning service. Production wires an HTTP
/// chat client (see the `openai` feature); tests script responses.
pub trait ReasoningOracle {
    /// One blocking round trip. Transport-level retries and timeouts belong
    /// to the implementation.
    fn complete(&self, system_prompt: &str, user_message: &str) -> Result<String>;
}

/// Fully assembled oracle request, kept around for audit logging.
#[derive(Debug, Clone)]
pub struct OracleRequest {
    pub system_prompt: String,
    pub user_message: String,
}

/// Builds mode-specific oracle requests and runs them. Owns no state beyond
/// the engine configuration; the catalog and retrieval context arrive per
/// call so each generation sees a consistent snapshot.
pub struct EntryDraftGenerator<'a> {
    config: &'a EngineConfig,
}

impl<'a> EntryDraftGenerator<'a> {
    pub fn new(config: &'a EngineConfig) -> Self {
        Self { config }
    }

    pub fn build_request(
        &self,
        description: &str,
        amount: f64,
        entry_date: NaiveDate,
        snippets: &[RuleSnippet],
        catalog: &dyn AccountCatalog,
        mode: Complexity,
    ) -> OracleRequest {
        let accounts = catalog_text(catalog);
        let context = context_text(snippets);

        OracleRequest {
            system_prompt: build_system_prompt(mode, &context, &accounts, self.config),
            user_message: build_user_message(
                description,
                amount,
                &entry_date.format("%Y-%m-%d").to_string(),
                mode,
            ),
        }
    }

    /// Returns the raw oracle response text for the given business. The
    /// response is expected, not guaranteed, to contain one JSON object;
    /// recovery from malformed output is the parser's job.
    pub fn generate(
        &self,
        oracle: &dyn ReasoningOracle,
        description: &str,
        amount: f64,
        entry_date: NaiveDate,
        snippets: &[RuleSnippet],
        catalog: &dyn AccountCatalog,
        mode: Complexity,
    ) -> Result<String> {
        let request = self.build_request(description, amount, entry_date, snippets, catalog, mode);
        debug!(
            "oracle request assembled ({:?} mode, {} rule snippets)",
            mode,
            snippets.len()
        );
        oracle.complete(&request.system_prompt, &request.user_message)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::InMemoryCatalog;
    use crate::error::JournalError;

    struct EchoOracle;

    impl ReasoningOracle for EchoOracle {
        fn complete(&self, _system: &str, user: &str) -> Result<String> {
            Ok(user.to_string())
        }
    }

    struct DownOracle;

    impl ReasoningOracle for DownOracle {
        fn complete(&self, _system: &str, _user: &str) -> Result<String> {
            Err(JournalError::OracleCall("connection refused".to_string()))
        }
    }

    #[test]
    fn test_request_embeds_business_facts() {
        let config = EngineConfig::default();
        let catalog = InMemoryCatalog::standard_chart();
        let generator = EntryDraftGenerator::new(&config);

        let request = generator.build_request(
            "paid office rent",
            5000.0,
            NaiveDate::from_ymd_opt(2024, 3, 20).unwrap(),
            &[],
            &catalog,
            Complexity::Simple,
        );

        assert!(request.user_message.contains("paid office rent"));
        assert!(request.user_message.contains("5000"));
        assert!(request.user_message.contains("2024-03-20"));
        assert!(request.system_prompt.contains("1002 Bank Deposits"));
    }

    #[test]
    fn test_generate_propagates_oracle_failure() {
        let config = EngineConfig::default();
        let catalog = InMemoryCatalog::standard_chart();
        let generator = EntryDraftGenerator::new(&config);

        let result = generator.generate(
            &DownOracle,
            "paid office rent",
            5000.0,
            NaiveDate::from_ymd_opt(2024, 3, 20).unwrap(),
            &[],
            &catalog,
            Complexity::Simple,
        );

        assert!(matches!(result, Err(JournalError::OracleCall(_))));
    }

    #[test]
    fn test_generate_returns_raw_text() {
        let config = EngineConfig::default();
        let catalog = InMemoryCatalog::standard_chart();
        let generator = EntryDraftGenerator::new(&config);

        let text = generator
            .generate(
                &EchoOracle,
                "paid office rent",
                5000.0,
                NaiveDate::from_ymd_opt(2024, 3, 20).unwrap(),
                &[],
                &catalog,
                Complexity::Simple,
            )
            .unwrap();

        assert!(text.contains("paid office rent"));
    }
}
