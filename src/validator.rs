use crate::catalog::AccountCatalog;
use crate::config::EngineConfig;
use crate::schema::{EntryDirection, JournalEntry};
use log::debug;

pub const ISSUE_PREFIX: &str = "issues: ";
pub const VALIDATED_NOTE: &str = "validated";

/// Enforces the entry invariants against a catalog snapshot. Validation
/// never fails: every finding becomes a note, confidence is clamped and the
/// review flag raised instead. Amounts and accounts are never altered, and
/// re-running on an already-validated entry is idempotent.
pub struct EntryValidator;

impl EntryValidator {
    pub fn validate(entry: &mut JournalEntry, catalog: &dyn AccountCatalog, config: &EngineConfig) {
        let mut issues: Vec<String> = Vec::new();

        if entry.entry_lines.is_empty() {
            issues.push("entry has no detail lines".to_string());
        }

        let total_debit = entry.total_debit();
        let total_credit = entry.total_credit();

        // Balance and account validity are independent checks; an entry can
        // balance perfectly while citing a nonexistent account.
        entry.is_balanced = (total_debit - total_credit).abs() < config.balance_tolerance;
        if !entry.is_balanced {
            issues.push(format!(
                "debits {:.2} do not equal credits {:.2}",
                total_debit, total_credit
            ));
        }

        for line in &entry.entry_lines {
            match catalog.lookup(&line.account_code) {
                None => issues.push(format!(
                    "account code {} not found in catalog",
                    line.account_code
                )),
                Some(account) if !account.active => issues.push(format!(
                    "account code {} is inactive",
                    line.account_code
                )),
                Some(_) => {}
            }

            if line.amount <= 0.0 {
                issues.push(format!(
                    "amount for account {} must be greater than zero",
                    line.account_name
                ));
            }
        }

        let has_debit = entry
            .entry_lines
            .iter()
            .any(|l| l.direction == EntryDirection::Debit);
        let has_credit = entry
            .entry_lines
            .iter()
            .any(|l| l.direction == EntryDirection::Credit);

        if !has_debit {
            issues.push("entry is missing a debit line".to_string());
        }
        if !has_credit {
            issues.push("entry is missing a credit line".to_string());
        }

        if issues.is_empty() {
            entry.validation_notes = VALIDATED_NOTE.to_string();
            // low-confidence escalation even when the entry itself is clean
            entry.needs_review = entry.confidence_score < config.confidence_threshold_medium;
        } else {
            debug!("validation found {} issue(s)", issues.len());
            entry.validation_notes = format!("{}{}", ISSUE_PREFIX, issues.join("; "));
            entry.confidence_score = entry.confidence_score.min(0.5);
            entry.needs_review = true;
        }
    }
}

/// Whether a notes string records validation issues or a generation error.
pub fn notes_indicate_issues(notes: &str) -> bool {
    notes.starts_with(ISSUE_PREFIX) || notes.contains("error")
}
