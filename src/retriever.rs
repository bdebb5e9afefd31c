use serde::{Deserialize, Serialize};

/// One ranked knowledge-base hit.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RuleSnippet {
    pub content: String,
    pub relevance_score: f64,
    pub source_id: String,
}

/// Contract of the accounting-rules retrieval collaborator. The production
/// implementation is a vector store behind a service boundary; only the
/// search contract matters to the core.
pub trait KnowledgeRetriever {
    /// Returns at most `k` snippets, best match first.
    fn search(&self, query: &str, k: usize) -> Vec<RuleSnippet>;
}

/// Formats retrieved snippets for inclusion in a prompt.
pub fn context_text(snippets: &[RuleSnippet]) -> String {
    if snippets.is_empty() {
        return "No specific rules retrieved; apply fundamental accounting principles".to_string();
    }

    snippets
        .iter()
        .enumerate()
        .map(|(i, s)| format!("[Rule {}] (relevance {:.2}) {}", i + 1, s.relevance_score, s.content))
        .collect::<Vec<_>>()
        .join("\n\n")
}

/// Token-overlap retriever over seeded rule texts. Stands in for the vector
/// store in tests and offline runs; scoring is the fraction of query tokens
/// found in the rule text.
#[derive(Debug, Clone, Default)]
pub struct KeywordRetriever {
    rules: Vec<(String, String)>,
}

impl KeywordRetriever {
    pub fn new(rules: impl IntoIterator<Item = (String, String)>) -> Self {
        Self {
            rules: rules.into_iter().collect(),
        }
    }

    pub fn add_rule(&mut self, source_id: impl Into<String>, content: impl Into<String>) {
        self.rules.push((source_id.into(), content.into()));
    }
}

impl KnowledgeRetriever for KeywordRetriever {
    fn search(&self, query: &str, k: usize) -> Vec<RuleSnippet> {
        let query_lower = query.to_lowercase();
        let tokens: Vec<&str> = query_lower
            .split(|c: char| !c.is_alphanumeric())
            .filter(|t| t.len() > 1)
            .collect();

        let mut scored: Vec<RuleSnippet> = self
            .rules
            .iter()
            .filter_map(|(source_id, content)| {
                let content_lower = content.to_lowercase();
                let hits = tokens
                    .iter()
                    .filter(|t| content_lower.contains(**t))
                    .count();
                if hits == 0 || tokens.is_empty() {
                    return None;
                }
                Some(RuleSnippet {
                    content: content.clone(),
                    relevance_score: hits as f64 / tokens.len() as f64,
                    source_id: source_id.clone(),
                })
            })
            .collect();

        scored.sort_by(|a, b| {
            b.relevance_score
                .partial_cmp(&a.relevance_score)
                .unwrap_or(std::cmp::Ordering::Equal)
        });
        scored.truncate(k);
        scored
    }
}
