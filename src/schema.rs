use crate::error::{JournalError, Result};
use chrono::NaiveDate;
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, JsonSchema)]
#[serde(rename_all = "PascalCase")]
pub enum AccountCategory {
    #[schemars(
        description = "Resources owned by the company: cash, bank deposits, receivables, inventory, equipment (debit balance)"
    )]
    Asset,

    #[schemars(
        description = "Obligations owed to creditors: payables, loans, taxes payable, accrued compensation (credit balance)"
    )]
    Liability,

    #[schemars(
        description = "Owner's residual interest: paid-in capital, retained earnings (credit balance)"
    )]
    Equity,

    #[schemars(description = "Income earned from sales of goods or services (credit balance)")]
    Revenue,

    #[schemars(
        description = "Costs incurred in operations: cost of sales, selling, administrative and financial expenses (debit balance)"
    )]
    Expense,
}

impl AccountCategory {
    /// The side on which this category naturally increases.
    pub fn normal_direction(&self) -> EntryDirection {
        match self {
            AccountCategory::Asset | AccountCategory::Expense => EntryDirection::Debit,
            AccountCategory::Liability | AccountCategory::Equity | AccountCategory::Revenue => {
                EntryDirection::Credit
            }
        }
    }
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, JsonSchema)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum EntryDirection {
    #[schemars(description = "Debit side of the entry")]
    Debit,
    #[schemars(description = "Credit side of the entry")]
    Credit,
}

impl EntryDirection {
    /// Normalizes an arbitrary wire token into a closed variant. The mapping
    /// is fixed; any token outside it is a schema violation, never a guess.
    pub fn from_token(token: &str) -> Result<Self> {
        match token.trim().to_lowercase().as_str() {
            "debit" | "dr" | "借" | "借方" => Ok(EntryDirection::Debit),
            "credit" | "cr" | "贷" | "贷方" => Ok(EntryDirection::Credit),
            other => Err(JournalError::SchemaViolation {
                field: "direction".to_string(),
                detail: format!("unrecognized direction token '{}'", other),
            }),
        }
    }
}

/// A chart-of-accounts row. Owned and mutated only by the external catalog
/// collaborator; the core treats it as immutable.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Account {
    pub code: String,
    pub name: String,
    pub category: AccountCategory,
    pub parent_code: Option<String>,
    pub active: bool,
}

impl Account {
    pub fn new(
        code: impl Into<String>,
        name: impl Into<String>,
        category: AccountCategory,
    ) -> Self {
        Self {
            code: code.into(),
            name: name.into(),
            category,
            parent_code: None,
            active: true,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct EntryLine {
    pub account_code: String,
    pub account_name: String,
    pub direction: EntryDirection,
    pub amount: f64,
    pub description: Option<String>,
    /// Opaque auxiliary accounting dimensions (customer, project, ...).
    /// Carried through unchanged, never interpreted by the core.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub auxiliary: Option<Map<String, Value>>,
}

impl EntryLine {
    pub fn debit_amount(&self) -> f64 {
        if self.direction == EntryDirection::Debit {
            self.amount
        } else {
            0.0
        }
    }

    pub fn credit_amount(&self) -> f64 {
        if self.direction == EntryDirection::Credit {
            self.amount
        } else {
            0.0
        }
    }
}

/// A double-entry journal entry. Created in draft state by the generator and
/// parser, validated exactly once (which may clamp confidence and flip
/// `needs_review` but never alters amounts or accounts), then immutable.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct JournalEntry {
    pub business_description: String,
    pub entry_date: NaiveDate,
    pub voucher_number: Option<String>,
    pub entry_lines: Vec<EntryLine>,
    pub analysis_process: String,
    pub applied_rules: String,
    pub confidence_score: f64,
    pub is_balanced: bool,
    pub validation_notes: String,
    pub needs_review: bool,
}

impl JournalEntry {
    pub fn total_debit(&self) -> f64 {
        self.entry_lines.iter().map(EntryLine::debit_amount).sum()
    }

    pub fn total_credit(&self) -> f64 {
        self.entry_lines.iter().map(EntryLine::credit_amount).sum()
    }

    /// More than one debit line and/or more than one credit line.
    pub fn is_compound(&self) -> bool {
        self.entry_lines.len() > 2
    }
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum EntryStatus {
    Pending,
    Approved,
    Rejected,
}

/// The persisted twin of a finalized entry as seen by the statement
/// aggregator. Approval transitions happen outside this crate.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RecordedEntry {
    pub entry: JournalEntry,
    pub status: EntryStatus,
}

impl RecordedEntry {
    pub fn approved(entry: JournalEntry) -> Self {
        Self {
            entry,
            status: EntryStatus::Approved,
        }
    }
}

// Oracle-facing response schema. These types are never deserialized directly
// (the parser coerces field by field); they exist so the format instructions
// embedded in the prompt are generated from one source of truth.

#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
pub struct OracleLineSchema {
    #[schemars(description = "Account code from the provided chart of accounts")]
    pub account_code: String,
    #[schemars(description = "Account name matching the code")]
    pub account_name: String,
    #[schemars(description = "DEBIT or CREDIT")]
    pub direction: String,
    #[schemars(description = "Positive amount for this line")]
    pub amount: f64,
    #[schemars(description = "Optional line memo")]
    pub description: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
pub struct OracleEntrySchema {
    #[schemars(description = "The business description being booked")]
    pub business_description: String,
    #[schemars(description = "Entry date in YYYY-MM-DD format")]
    pub entry_date: String,
    #[schemars(description = "Entry lines; debits must equal credits")]
    pub entry_lines: Vec<OracleLineSchema>,
    #[schemars(description = "Step-by-step reasoning behind the account choices")]
    pub analysis_process: String,
    #[schemars(description = "Which accounting rules or patterns were applied")]
    pub applied_rules: String,
    #[schemars(description = "Self-assessed confidence between 0 and 1")]
    pub confidence_score: f64,
    #[schemars(description = "Whether total debits equal total credits")]
    pub is_balanced: bool,
    #[schemars(description = "Any caveats about the proposed entry")]
    pub validation_notes: String,
    #[schemars(description = "Whether a human should review before posting")]
    pub needs_review: bool,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_direction_normalization_table() {
        assert_eq!(
            EntryDirection::from_token("DEBIT").unwrap(),
            EntryDirection::Debit
        );
        assert_eq!(
            EntryDirection::from_token(" dr ").unwrap(),
            EntryDirection::Debit
        );
        assert_eq!(
            EntryDirection::from_token("借").unwrap(),
            EntryDirection::Debit
        );
        assert_eq!(
            EntryDirection::from_token("credit").unwrap(),
            EntryDirection::Credit
        );
        assert_eq!(
            EntryDirection::from_token("贷").unwrap(),
            EntryDirection::Credit
        );
    }

    #[test]
    fn test_direction_unknown_token_is_schema_violation() {
        let err = EntryDirection::from_token("sideways").unwrap_err();
        assert!(matches!(err, JournalError::SchemaViolation { .. }));
    }

    #[test]
    fn test_normal_direction() {
        assert_eq!(
            AccountCategory::Asset.normal_direction(),
            EntryDirection::Debit
        );
        assert_eq!(
            AccountCategory::Expense.normal_direction(),
            EntryDirection::Debit
        );
        assert_eq!(
            AccountCategory::Revenue.normal_direction(),
            EntryDirection::Credit
        );
    }

    #[test]
    fn test_entry_totals() {
        let entry = JournalEntry {
            business_description: "test".to_string(),
            entry_date: NaiveDate::from_ymd_opt(2024, 3, 20).unwrap(),
            voucher_number: None,
            entry_lines: vec![
                EntryLine {
                    account_code: "1002".to_string(),
                    account_name: "Bank Deposits".to_string(),
                    direction: EntryDirection::Debit,
                    amount: 11300.0,
                    description: None,
                    auxiliary: None,
                },
                EntryLine {
                    account_code: "6001".to_string(),
                    account_name: "Operating Revenue".to_string(),
                    direction: EntryDirection::Credit,
                    amount: 10000.0,
                    description: None,
                    auxiliary: None,
                },
                EntryLine {
                    account_code: "2221".to_string(),
                    account_name: "Taxes Payable".to_string(),
                    direction: EntryDirection::Credit,
                    amount: 1300.0,
                    description: None,
                    auxiliary: None,
                },
            ],
            analysis_process: String::new(),
            applied_rules: String::new(),
            confidence_score: 0.9,
            is_balanced: true,
            validation_notes: String::new(),
            needs_review: false,
        };

        assert!((entry.total_debit() - 11300.0).abs() < 1e-9);
        assert!((entry.total_credit() - 11300.0).abs() < 1e-9);
        assert!(entry.is_compound());
    }
}
