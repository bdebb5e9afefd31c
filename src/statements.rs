//! Aggregation of approved journal entries into period financial statements.
//! Callers must hand in a consistent snapshot of entries taken before
//! aggregation begins; concurrent approvals are not visible mid-computation.

use crate::catalog::AccountCatalog;
use crate::config::EngineConfig;
use crate::error::{JournalError, Result};
use crate::schema::{AccountCategory, EntryDirection, EntryStatus, RecordedEntry};
use chrono::NaiveDate;
use log::{info, warn};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Signed account balances for a period under the normal-balance convention:
/// Asset/Expense accounts increase on debit, Liability/Equity/Revenue
/// accounts increase on credit.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AccountBalances {
    balances: BTreeMap<String, f64>,
    pub period_start: NaiveDate,
    pub period_end: NaiveDate,
}

impl AccountBalances {
    pub fn compute(
        entries: &[RecordedEntry],
        start: NaiveDate,
        end: NaiveDate,
        approved_only: bool,
        catalog: &dyn AccountCatalog,
    ) -> Self {
        let mut balances: BTreeMap<String, f64> = BTreeMap::new();

        for recorded in entries {
            if approved_only && recorded.status != EntryStatus::Approved {
                continue;
            }
            let entry = &recorded.entry;
            if entry.entry_date < start || entry.entry_date > end {
                continue;
            }

            for line in &entry.entry_lines {
                let Some(account) = catalog.lookup(&line.account_code) else {
                    warn!(
                        "skipping line with unresolvable account code {}",
                        line.account_code
                    );
                    continue;
                };

                let increases_on = account.category.normal_direction();
                let signed = if line.direction == increases_on {
                    line.amount
                } else {
                    -line.amount
                };
                *balances.entry(line.account_code.clone()).or_default() += signed;
            }
        }

        info!(
            "computed balances for {} account(s) between {} and {}",
            balances.len(),
            start,
            end
        );

        Self {
            balances,
            period_start: start,
            period_end: end,
        }
    }

    /// Builds a balance set directly, for callers that already hold balances
    /// from another ledger source.
    pub fn from_map(
        balances: BTreeMap<String, f64>,
        period_start: NaiveDate,
        period_end: NaiveDate,
    ) -> Self {
        Self {
            balances,
            period_start,
            period_end,
        }
    }

    pub fn get(&self, code: &str) -> f64 {
        self.balances.get(code).copied().unwrap_or(0.0)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&String, &f64)> {
        self.balances.iter()
    }

    pub fn is_empty(&self) -> bool {
        self.balances.is_empty()
    }

    fn period_label(&self) -> String {
        format!("{} to {}", self.period_start, self.period_end)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BalanceSheet {
    pub period: String,
    pub current_assets: BTreeMap<String, f64>,
    pub non_current_assets: BTreeMap<String, f64>,
    pub total_assets: f64,
    pub current_liabilities: BTreeMap<String, f64>,
    pub non_current_liabilities: BTreeMap<String, f64>,
    pub total_liabilities: f64,
    pub paid_in_capital: f64,
    pub retained_earnings: f64,
    pub total_equity: f64,
    pub total_liabilities_and_equity: f64,
    pub is_balanced: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct IncomeStatement {
    pub period: String,
    pub operating_revenue: f64,
    pub other_revenue: f64,
    pub total_revenue: f64,
    pub cost_of_sales: f64,
    pub operating_expenses: f64,
    pub admin_expenses: f64,
    pub financial_expenses: f64,
    pub other_expenses: f64,
    pub total_expenses: f64,
    pub gross_profit: f64,
    pub operating_profit: f64,
    pub profit_before_tax: f64,
    /// After the flat tax-rate proxy; not tax-law-accurate.
    pub net_profit: f64,
}

/// Simplified cash-flow statement. Operating flows are approximated from
/// revenue and cost-of-sales account magnitudes, not traced through actual
/// cash ledger movements; reconciling against bank statements is a declared
/// non-goal.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CashFlowStatement {
    pub period: String,
    pub operating_cash_received: f64,
    pub operating_cash_paid: f64,
    pub operating_net_cash_flow: f64,
    pub investing_net_cash_flow: f64,
    pub financing_net_cash_flow: f64,
    pub net_increase_in_cash: f64,
    pub cash_ending: f64,
}

// Code-prefix tables mirroring the conventional chart numbering.
const CURRENT_ASSET_PREFIXES: [&str; 3] = ["10", "11", "12"];
const CURRENT_LIABILITY_PREFIXES: [&str; 3] = ["20", "21", "22"];
const OPERATING_REVENUE_CODES: [&str; 2] = ["6001", "6051"];
const PAID_IN_CAPITAL_CODE: &str = "4001";
const COST_OF_SALES_CODE: &str = "6401";
const SELLING_EXPENSE_CODE: &str = "6601";
const ADMIN_EXPENSE_CODE: &str = "6602";
const FINANCIAL_EXPENSE_CODE: &str = "6603";
const CASH_ACCOUNT_CODES: [&str; 2] = ["1001", "1002"];

pub struct StatementAggregator<'a> {
    catalog: &'a dyn AccountCatalog,
    config: &'a EngineConfig,
    balances: Option<AccountBalances>,
}

impl<'a> StatementAggregator<'a> {
    pub fn new(catalog: &'a dyn AccountCatalog, config: &'a EngineConfig) -> Self {
        Self {
            catalog,
            config,
            balances: None,
        }
    }

    /// Computes and stores balances for the period. Must be called before
    /// requesting a statement.
    pub fn compute_balances(
        &mut self,
        entries: &[RecordedEntry],
        start: NaiveDate,
        end: NaiveDate,
        approved_only: bool,
    ) -> &AccountBalances {
        let balances = AccountBalances::compute(entries, start, end, approved_only, self.catalog);
        self.balances.insert(balances)
    }

    pub fn with_balances(&mut self, balances: AccountBalances) -> &mut Self {
        self.balances = Some(balances);
        self
    }

    fn balances(&self) -> Result<&AccountBalances> {
        self.balances.as_ref().ok_or(JournalError::MissingBalances)
    }

    pub fn balance_sheet(&self) -> Result<BalanceSheet> {
        let balances = self.balances()?;

        let mut sheet = BalanceSheet {
            period: balances.period_label(),
            current_assets: BTreeMap::new(),
            non_current_assets: BTreeMap::new(),
            total_assets: 0.0,
            current_liabilities: BTreeMap::new(),
            non_current_liabilities: BTreeMap::new(),
            total_liabilities: 0.0,
            paid_in_capital: 0.0,
            retained_earnings: 0.0,
            total_equity: 0.0,
            total_liabilities_and_equity: 0.0,
            is_balanced: false,
        };

        for (code, &balance) in balances.iter() {
            let Some(account) = self.catalog.lookup(code) else {
                continue;
            };

            match account.category {
                AccountCategory::Asset => {
                    let bucket = if CURRENT_ASSET_PREFIXES.iter().any(|p| code.starts_with(p)) {
                        &mut sheet.current_assets
                    } else {
                        &mut sheet.non_current_assets
                    };
                    bucket.insert(account.name.clone(), balance);
                    sheet.total_assets += balance;
                }
                AccountCategory::Liability => {
                    let bucket = if CURRENT_LIABILITY_PREFIXES.iter().any(|p| code.starts_with(p))
                    {
                        &mut sheet.current_liabilities
                    } else {
                        &mut sheet.non_current_liabilities
                    };
                    bucket.insert(account.name.clone(), balance);
                    sheet.total_liabilities += balance;
                }
                AccountCategory::Equity => {
                    if code == PAID_IN_CAPITAL_CODE {
                        sheet.paid_in_capital += balance;
                    } else {
                        sheet.retained_earnings += balance;
                    }
                    sheet.total_equity += balance;
                }
                AccountCategory::Revenue | AccountCategory::Expense => {}
            }
        }

        sheet.total_liabilities_and_equity = sheet.total_liabilities + sheet.total_equity;
        sheet.is_balanced = (sheet.total_assets - sheet.total_liabilities_and_equity).abs()
            < self.config.balance_tolerance;

        Ok(sheet)
    }

    pub fn income_statement(&self) -> Result<IncomeStatement> {
        let balances = self.balances()?;

        let mut stmt = IncomeStatement {
            period: balances.period_label(),
            operating_revenue: 0.0,
            other_revenue: 0.0,
            total_revenue: 0.0,
            cost_of_sales: 0.0,
            operating_expenses: 0.0,
            admin_expenses: 0.0,
            financial_expenses: 0.0,
            other_expenses: 0.0,
            total_expenses: 0.0,
            gross_profit: 0.0,
            operating_profit: 0.0,
            profit_before_tax: 0.0,
            net_profit: 0.0,
        };

        for (code, &balance) in balances.iter() {
            let Some(account) = self.catalog.lookup(code) else {
                continue;
            };
            let magnitude = balance.abs();

            match account.category {
                AccountCategory::Revenue => {
                    if OPERATING_REVENUE_CODES.contains(&code.as_str()) {
                        stmt.operating_revenue += magnitude;
                    } else {
                        stmt.other_revenue += magnitude;
                    }
                }
                AccountCategory::Expense => match code.as_str() {
                    COST_OF_SALES_CODE => stmt.cost_of_sales += magnitude,
                    SELLING_EXPENSE_CODE => stmt.operating_expenses += magnitude,
                    ADMIN_EXPENSE_CODE => stmt.admin_expenses += magnitude,
                    FINANCIAL_EXPENSE_CODE => stmt.financial_expenses += magnitude,
                    _ => stmt.other_expenses += magnitude,
                },
                _ => {}
            }
        }

        stmt.total_revenue = stmt.operating_revenue + stmt.other_revenue;
        stmt.total_expenses = stmt.cost_of_sales
            + stmt.operating_expenses
            + stmt.admin_expenses
            + stmt.financial_expenses
            + stmt.other_expenses;

        stmt.gross_profit = stmt.operating_revenue - stmt.cost_of_sales;
        stmt.operating_profit = stmt.gross_profit
            - stmt.operating_expenses
            - stmt.admin_expenses
            - stmt.financial_expenses;
        stmt.profit_before_tax = stmt.operating_profit + stmt.other_revenue - stmt.other_expenses;

        let tax = stmt.profit_before_tax * self.config.income_tax_rate;
        stmt.net_profit = stmt.profit_before_tax - tax;

        Ok(stmt)
    }

    pub fn cash_flow_statement(&self) -> Result<CashFlowStatement> {
        let balances = self.balances()?;

        // Approximation from revenue/cost magnitudes, not a cash trace.
        let cash_received = balances.get(OPERATING_REVENUE_CODES[0]).abs();
        let cash_paid = balances.get(COST_OF_SALES_CODE).abs();
        let operating_net = cash_received - cash_paid;

        let cash_ending = CASH_ACCOUNT_CODES
            .iter()
            .map(|code| balances.get(code))
            .sum();

        Ok(CashFlowStatement {
            period: balances.period_label(),
            operating_cash_received: cash_received,
            operating_cash_paid: cash_paid,
            operating_net_cash_flow: operating_net,
            investing_net_cash_flow: 0.0,
            financing_net_cash_flow: 0.0,
            net_increase_in_cash: operating_net,
            cash_ending,
        })
    }
}

impl BalanceSheet {
    pub fn to_markdown(&self) -> String {
        let mut out = String::new();
        out.push_str(&format!("# Balance Sheet\n\n**Period:** {}\n\n", self.period));

        out.push_str("## Assets\n\n### Current Assets\n\n");
        for (name, amount) in &self.current_assets {
            out.push_str(&format!("- {}: {:.2}\n", name, amount));
        }
        out.push_str("\n### Non-current Assets\n\n");
        for (name, amount) in &self.non_current_assets {
            out.push_str(&format!("- {}: {:.2}\n", name, amount));
        }
        out.push_str(&format!("\n**Total Assets:** {:.2}\n\n", self.total_assets));

        out.push_str("## Liabilities\n\n### Current Liabilities\n\n");
        for (name, amount) in &self.current_liabilities {
            out.push_str(&format!("- {}: {:.2}\n", name, amount));
        }
        out.push_str("\n### Non-current Liabilities\n\n");
        for (name, amount) in &self.non_current_liabilities {
            out.push_str(&format!("- {}: {:.2}\n", name, amount));
        }
        out.push_str(&format!(
            "\n**Total Liabilities:** {:.2}\n\n",
            self.total_liabilities
        ));

        out.push_str("## Equity\n\n");
        out.push_str(&format!("- Paid-in Capital: {:.2}\n", self.paid_in_capital));
        out.push_str(&format!(
            "- Retained Earnings: {:.2}\n",
            self.retained_earnings
        ));
        out.push_str(&format!("\n**Total Equity:** {:.2}\n\n", self.total_equity));

        out.push_str(&format!(
            "**Total Liabilities and Equity:** {:.2}\n\n",
            self.total_liabilities_and_equity
        ));
        out.push_str(if self.is_balanced {
            "Balance check: balanced\n"
        } else {
            "Balance check: NOT balanced\n"
        });

        out
    }
}

impl IncomeStatement {
    pub fn to_markdown(&self) -> String {
        let mut out = String::new();
        out.push_str(&format!(
            "# Income Statement\n\n**Period:** {}\n\n",
            self.period
        ));

        out.push_str("## Revenue\n\n");
        out.push_str(&format!("- Operating Revenue: {:.2}\n", self.operating_revenue));
        out.push_str(&format!("- Other Revenue: {:.2}\n", self.other_revenue));
        out.push_str(&format!("\n**Total Revenue:** {:.2}\n\n", self.total_revenue));

        out.push_str("## Expenses\n\n");
        out.push_str(&format!("- Cost of Sales: {:.2}\n", self.cost_of_sales));
        out.push_str(&format!("- Selling Expenses: {:.2}\n", self.operating_expenses));
        out.push_str(&format!("- Administrative Expenses: {:.2}\n", self.admin_expenses));
        out.push_str(&format!("- Financial Expenses: {:.2}\n", self.financial_expenses));
        out.push_str(&format!("- Other Expenses: {:.2}\n", self.other_expenses));
        out.push_str(&format!("\n**Total Expenses:** {:.2}\n\n", self.total_expenses));

        out.push_str("## Profit\n\n");
        out.push_str(&format!("- Gross Profit: {:.2}\n", self.gross_profit));
        out.push_str(&format!("- Operating Profit: {:.2}\n", self.operating_profit));
        out.push_str(&format!("- Profit Before Tax: {:.2}\n", self.profit_before_tax));
        out.push_str(&format!(
            "- Net Profit (flat tax proxy): {:.2}\n",
            self.net_profit
        ));

        out
    }
}

impl CashFlowStatement {
    pub fn to_markdown(&self) -> String {
        let mut out = String::new();
        out.push_str(&format!(
            "# Cash Flow Statement (simplified derivation)\n\n**Period:** {}\n\n",
            self.period
        ));
        out.push_str(
            "Operating flows are approximated from revenue and cost-of-sales magnitudes; \
             this is not a ledger-level cash trace.\n\n",
        );

        out.push_str("## Operating Activities\n\n");
        out.push_str(&format!("- Cash Received: {:.2}\n", self.operating_cash_received));
        out.push_str(&format!("- Cash Paid: {:.2}\n", self.operating_cash_paid));
        out.push_str(&format!(
            "\n**Net Operating Cash Flow:** {:.2}\n\n",
            self.operating_net_cash_flow
        ));

        out.push_str(&format!(
            "Investing: {:.2} | Financing: {:.2}\n\n",
            self.investing_net_cash_flow, self.financing_net_cash_flow
        ));
        out.push_str(&format!(
            "**Net Increase in Cash:** {:.2}\n\n**Ending Cash Balance:** {:.2}\n",
            self.net_increase_in_cash, self.cash_ending
        ));

        out
    }
}
