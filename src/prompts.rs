//! System prompt assembly for the reasoning oracle. The rule tables here are
//! the domain-specific part of generation: decomposition patterns, the
//! evidence-isolation policy, and the output format contract.

use crate::classifier::Complexity;
use crate::config::EngineConfig;
use crate::schema::OracleEntrySchema;

const ACCOUNTING_PRINCIPLES: &str = r#"
## FUNDAMENTAL PRINCIPLES
- Assets = Liabilities + Equity
- Asset increases are debits, asset decreases are credits
- Liability increases are credits, liability decreases are debits
- Revenue increases are credits, expense increases are debits
- Every debit has a credit; total debits must equal total credits
"#;

const DECOMPOSITION_PATTERNS: &str = r#"
## COMPOUND ENTRY PATTERNS
1. Taxed sale:
   Debit: Bank Deposits / Accounts Receivable (gross, tax inclusive)
   Credit: Operating Revenue (net of tax)
   Credit: Taxes Payable - VAT output (tax amount)

2. Taxed purchase:
   Debit: Inventory / Raw Materials / expense account (net of tax)
   Debit: Taxes Payable - VAT input (deductible tax amount)
   Credit: Bank Deposits / Accounts Payable (gross, tax inclusive)

3. Payroll settlement:
   Debit: Employee Compensation Payable (gross pay)
   Credit: Bank Deposits (net pay)
   Credit: Taxes Payable - individual income tax withheld
   Credit: Other Payables - employee social insurance portion

4. Expense reimbursement with tax:
   Debit: Administrative / Selling Expenses (net of tax)
   Debit: Taxes Payable - VAT input (deductible tax amount)
   Credit: Bank Deposits / Cash on Hand
"#;

/// The evidence-isolation policy. This is the critical correctness rule:
/// an invoice alone never proves a cash movement.
const EVIDENCE_ISOLATION: &str = r#"
## EVIDENCE ISOLATION POLICY
The business information you receive comes from an INVOICE.
- With only a purchase invoice, the transaction MUST default to a purchase on
  credit: the credit line MUST use '2202 Accounts Payable'.
- With only a sales invoice, the transaction MUST default to a sale on
  credit: the debit line MUST use '1122 Accounts Receivable'.
- NEVER use '1002 Bank Deposits' or '1001 Cash on Hand' unless the source
  evidence explicitly confirms a bank or cash movement (e.g. the description
  states a bank transfer was received or paid).
"#;

const CONFIDENCE_GUIDANCE: &str = r#"
## CONFIDENCE SCORING
- 0.8-1.0 when the business matches a retrieved rule or pattern exactly
- 0.6-0.8 when the entry is derived from fundamental principles
- below 0.6 when material assumptions were required; set needs_review to true
"#;

fn mode_requirements(mode: Complexity) -> &'static str {
    match mode {
        Complexity::Simple => {
            "## ENTRY SHAPE\nProduce a SIMPLE entry: exactly one debit line and one credit line."
        }
        Complexity::Compound => {
            "## ENTRY SHAPE\nProduce a COMPOUND entry where the business requires it: any number \
             of debit and credit lines. Tax-inclusive amounts must be decomposed into net and \
             tax components. Total debits must equal total credits."
        }
    }
}

/// JSON output contract, generated from the response schema so the prompt
/// and the parser never drift apart.
pub fn format_instructions() -> String {
    let schema = schemars::schema_for!(OracleEntrySchema);
    let schema_json =
        serde_json::to_string_pretty(&schema).unwrap_or_else(|_| "{}".to_string());

    format!(
        "## OUTPUT FORMAT\n\
         Respond with exactly ONE JSON object conforming to this schema. \
         Do not add commentary outside the JSON object.\n\n{}",
        schema_json
    )
}

pub fn build_system_prompt(
    mode: Complexity,
    retrieved_context: &str,
    catalog_text: &str,
    config: &EngineConfig,
) -> String {
    format!(
        "You are a senior certified accountant at {company}.\n\
         \n\
         ## YOUR TASK\n\
         1. Analyze the given business description\n\
         2. Select the appropriate accounts from the chart below\n\
         3. Draft a standard double-entry journal entry\n\
         4. Explain your reasoning and cite the rules you applied\n\
         5. Assess the reliability of the result\n\
         \n\
         ## AVAILABLE ACCOUNTS\n{accounts}\n\
         \n\
         ## RETRIEVED ACCOUNTING RULES\n{context}\n\
         {principles}\
         {isolation}\
         {patterns}\
         {confidence}\
         \n{shape}\n\
         \n{format}",
        company = config.company_name,
        accounts = catalog_text,
        context = retrieved_context,
        principles = ACCOUNTING_PRINCIPLES,
        isolation = EVIDENCE_ISOLATION,
        patterns = DECOMPOSITION_PATTERNS,
        confidence = CONFIDENCE_GUIDANCE,
        shape = mode_requirements(mode),
        format = format_instructions(),
    )
}

pub fn build_user_message(
    description: &str,
    amount: f64,
    entry_date: &str,
    mode: Complexity,
) -> String {
    let shape = match mode {
        Complexity::Simple => "a simple journal entry (one debit, one credit)",
        Complexity::Compound => "a compound journal entry (decompose taxes and components)",
    };

    format!(
        "Draft {} for the following invoice-derived business:\n\
         \n\
         Business description: {}\n\
         Total amount: {}\n\
         Entry date: {}\n\
         \n\
         Respond strictly in the required JSON format.",
        shape, description, amount, entry_date
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_system_prompt_contains_rule_tables() {
        let config = EngineConfig::default();
        let prompt = build_system_prompt(
            Complexity::Compound,
            "[Rule 1] VAT sales split into net and tax",
            "1002 Bank Deposits (Asset)",
            &config,
        );

        assert!(prompt.contains("2202 Accounts Payable"));
        assert!(prompt.contains("1122 Accounts Receivable"));
        assert!(prompt.contains("Taxed sale"));
        assert!(prompt.contains("1002 Bank Deposits (Asset)"));
        assert!(prompt.contains("VAT sales split"));
        assert!(prompt.contains(&config.company_name));
    }

    #[test]
    fn test_mode_shapes_differ() {
        let config = EngineConfig::default();
        let simple = build_system_prompt(Complexity::Simple, "", "", &config);
        let compound = build_system_prompt(Complexity::Compound, "", "", &config);
        assert!(simple.contains("exactly one debit line and one credit line"));
        assert!(compound.contains("COMPOUND entry"));
    }

    #[test]
    fn test_format_instructions_embed_schema_fields() {
        let format = format_instructions();
        assert!(format.contains("entry_lines"));
        assert!(format.contains("confidence_score"));
        assert!(format.contains("needs_review"));
    }
}
