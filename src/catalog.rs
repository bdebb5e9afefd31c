use crate::schema::{Account, AccountCategory};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Narrow view over the chart of accounts. The real catalog lives behind a
/// database collaborator; the core only ever needs these three capabilities,
/// so tests run against an in-memory fake.
pub trait AccountCatalog {
    fn list_active(&self) -> Vec<Account>;
    fn exists(&self, code: &str) -> bool;
    fn lookup(&self, code: &str) -> Option<Account>;
}

/// Renders the active accounts as prompt text, one `code name (category)`
/// line per account, ordered by code.
pub fn catalog_text(catalog: &dyn AccountCatalog) -> String {
    let accounts = catalog.list_active();
    if accounts.is_empty() {
        return "No active accounts available".to_string();
    }

    accounts
        .iter()
        .map(|a| format!("{} {} ({:?})", a.code, a.name, a.category))
        .collect::<Vec<_>>()
        .join("\n")
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct InMemoryCatalog {
    accounts: BTreeMap<String, Account>,
}

impl InMemoryCatalog {
    pub fn new(accounts: impl IntoIterator<Item = Account>) -> Self {
        Self {
            accounts: accounts
                .into_iter()
                .map(|a| (a.code.clone(), a))
                .collect(),
        }
    }

    pub fn insert(&mut self, account: Account) {
        self.accounts.insert(account.code.clone(), account);
    }

    /// The standard small-business chart used when no external catalog is
    /// wired up. Codes follow the conventional numbering: 1xxx assets,
    /// 2xxx liabilities, 4xxx equity, 6xxx revenue and expenses.
    pub fn standard_chart() -> Self {
        use AccountCategory::*;
        Self::new([
            Account::new("1001", "Cash on Hand", Asset),
            Account::new("1002", "Bank Deposits", Asset),
            Account::new("1122", "Accounts Receivable", Asset),
            Account::new("1403", "Raw Materials", Asset),
            Account::new("1405", "Inventory Goods", Asset),
            Account::new("1601", "Fixed Assets", Asset),
            Account::new("2001", "Short-term Loans", Liability),
            Account::new("2202", "Accounts Payable", Liability),
            Account::new("2211", "Employee Compensation Payable", Liability),
            Account::new("2221", "Taxes Payable", Liability),
            Account::new("2241", "Other Payables", Liability),
            Account::new("4001", "Paid-in Capital", Equity),
            Account::new("4104", "Retained Earnings", Equity),
            Account::new("6001", "Operating Revenue", Revenue),
            Account::new("6051", "Other Operating Revenue", Revenue),
            Account::new("6401", "Cost of Sales", Expense),
            Account::new("6601", "Selling Expenses", Expense),
            Account::new("6602", "Administrative Expenses", Expense),
            Account::new("6603", "Financial Expenses", Expense),
        ])
    }
}

impl AccountCatalog for InMemoryCatalog {
    fn list_active(&self) -> Vec<Account> {
        self.accounts
            .values()
            .filter(|a| a.active)
            .cloned()
            .collect()
    }

    fn exists(&self, code: &str) -> bool {
        self.accounts.get(code).map(|a| a.active).unwrap_or(false)
    }

    fn lookup(&self, code: &str) -> Option<Account> {
        self.accounts.get(code).cloned()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_standard_chart_lookup() {
        let catalog = InMemoryCatalog::standard_chart();
        assert!(catalog.exists("1002"));
        assert!(catalog.exists("2202"));
        assert!(!catalog.exists("9999"));

        let payable = catalog.lookup("2202").unwrap();
        assert_eq!(payable.name, "Accounts Payable");
        assert_eq!(payable.category, AccountCategory::Liability);
    }

    #[test]
    fn test_inactive_accounts_are_hidden() {
        let mut catalog = InMemoryCatalog::standard_chart();
        let mut dormant = Account::new("1002", "Bank Deposits", AccountCategory::Asset);
        dormant.active = false;
        catalog.insert(dormant);

        assert!(!catalog.exists("1002"));
        assert!(catalog.list_active().iter().all(|a| a.code != "1002"));
        // lookup still resolves so validators can report "inactive" precisely
        assert!(catalog.lookup("1002").is_some());
    }

    #[test]
    fn test_catalog_text_format() {
        let catalog = InMemoryCatalog::new([Account::new(
            "1002",
            "Bank Deposits",
            AccountCategory::Asset,
        )]);
        let text = catalog_text(&catalog);
        assert_eq!(text, "1002 Bank Deposits (Asset)");
    }
}
