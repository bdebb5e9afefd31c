use log::debug;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum Complexity {
    /// Exactly one debit line and one credit line.
    Simple,
    /// Multiple debit and/or credit lines (tax decomposition, payroll, ...).
    Compound,
}

/// Keywords whose presence indicates a transaction that decomposes into more
/// than two lines. English terms plus the original-locale tokens, since
/// upstream standardization may pass source-language fragments through.
const COMPOUND_INDICATORS: &[&str] = &[
    // tax decomposition
    "vat",
    "gst",
    "sales tax",
    "input tax",
    "output tax",
    "tax included",
    "含税",
    "增值税",
    "进项税",
    "销项税",
    // partial / advance settlement
    "partial",
    "advance payment",
    "prepaid",
    "prepayment",
    "deposit received",
    "预付",
    "预收",
    "部分",
    // payroll and withholding
    "payroll",
    "salary",
    "salaries",
    "wages",
    "withholding",
    "social insurance",
    "housing fund",
    "工资",
    "社保",
    "公积金",
    "个税",
    // accruals
    "depreciation",
    "amortization",
    "accrual",
    "accrued",
    "折旧",
    "摊销",
    "计提",
    "预提",
    // open items
    "receivable",
    "payable",
    "on credit",
    "应收",
    "应付",
];

/// Deterministic, stateless classification of a business description.
/// Case-insensitive substring match; an empty or keyword-free description is
/// Simple. Classification only ever escalates automatically; callers may
/// downgrade a Compound result to Simple, never the reverse.
///
/// The amount is part of the contract but currently unused; the decision is
/// driven by the description alone.
pub fn classify(description: &str, _amount: f64) -> Complexity {
    let description_lower = description.to_lowercase();

    for indicator in COMPOUND_INDICATORS {
        if description_lower.contains(indicator) {
            debug!("compound indicator matched: {}", indicator);
            return Complexity::Compound;
        }
    }

    Complexity::Simple
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_vat_keyword_is_compound() {
        assert_eq!(
            classify("received bank transfer for goods plus VAT", 11300.0),
            Complexity::Compound
        );
    }

    #[test]
    fn test_payroll_is_compound() {
        assert_eq!(
            classify("paid monthly salaries with withholding", 10000.0),
            Complexity::Compound
        );
    }

    #[test]
    fn test_chinese_tokens_match() {
        assert_eq!(classify("采购原材料，含税价5650元", 5650.0), Complexity::Compound);
    }

    #[test]
    fn test_plain_expense_is_simple() {
        assert_eq!(classify("paid office rent 5000", 5000.0), Complexity::Simple);
    }

    #[test]
    fn test_empty_description_is_simple() {
        assert_eq!(classify("", 100.0), Complexity::Simple);
    }

    #[test]
    fn test_case_insensitive() {
        assert_eq!(
            classify("Quarterly DEPRECIATION charge", 2000.0),
            Complexity::Compound
        );
    }
}
