//! Output formatting module for CLI display
//!
//! This module handles all terminal output formatting, separating
//! the concerns of data calculation from presentation.

use colored::Colorize;
use rust_decimal::Decimal;
use serde::Serialize;
use tabled::{
    settings::{object::Columns, Alignment, Modify, Style},
    Table, Tabled,
};

use crate::db::{Account, AccountWithBalance, BalanceEntry, Milestone};
use crate::reports::{ChartDataPoint, NetWorthStats};
use crate::utils::{format_money, format_percent, format_signed_money};

/// JSON shape of an account, with its derived category spelled out
#[derive(Serialize)]
pub struct AccountJson<'a> {
    id: &'a str,
    name: &'a str,
    account_type: &'static str,
    category: &'static str,
    institution: Option<&'a str>,
    description: Option<&'a str>,
    currency: &'a str,
    is_active: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    current_balance: Option<Decimal>,
    #[serde(skip_serializing_if = "Option::is_none")]
    balance_date: Option<String>,
}

impl<'a> AccountJson<'a> {
    pub fn from_account(account: &'a Account) -> Self {
        Self {
            id: &account.id,
            name: &account.name,
            account_type: account.account_type.as_str(),
            category: account.category().as_str(),
            institution: account.institution.as_deref(),
            description: account.description.as_deref(),
            currency: &account.currency,
            is_active: account.is_active,
            current_balance: None,
            balance_date: None,
        }
    }

    pub fn from_account_with_balance(row: &'a AccountWithBalance) -> Self {
        Self {
            current_balance: Some(row.current_balance),
            balance_date: row.balance_date.map(|d| d.to_string()),
            ..Self::from_account(&row.account)
        }
    }
}

fn colored_amount(value: Decimal, text: String) -> String {
    if value < Decimal::ZERO {
        text.red().to_string()
    } else {
        text.green().to_string()
    }
}

/// Format the accounts list, assets first
pub fn format_accounts_table(rows: &[AccountWithBalance]) -> String {
    #[derive(Tabled)]
    struct AccountRow {
        #[tabled(rename = "ID")]
        id: String,
        #[tabled(rename = "Name")]
        name: String,
        #[tabled(rename = "Type")]
        account_type: String,
        #[tabled(rename = "Category")]
        category: String,
        #[tabled(rename = "Institution")]
        institution: String,
        #[tabled(rename = "Balance")]
        balance: String,
        #[tabled(rename = "As Of")]
        as_of: String,
        #[tabled(rename = "Active")]
        active: String,
    }

    let table_rows: Vec<AccountRow> = rows
        .iter()
        .map(|r| AccountRow {
            id: r.account.id.clone(),
            name: r.account.name.clone(),
            account_type: r.account.account_type.as_str().to_string(),
            category: r.account.category().as_str().to_string(),
            institution: r.account.institution.clone().unwrap_or_else(|| "-".to_string()),
            balance: format_money(r.current_balance, &r.account.currency),
            as_of: r
                .balance_date
                .map(|d| d.to_string())
                .unwrap_or_else(|| "never".to_string()),
            active: if r.account.is_active { "yes" } else { "no" }.to_string(),
        })
        .collect();

    let table = Table::new(table_rows)
        .with(Style::rounded())
        .with(Modify::new(Columns::new(5..6)).with(Alignment::right()))
        .to_string();

    format!("\n{} Accounts\n\n{}\n", "🏦".cyan().bold(), table)
}

/// Format one account's balance history
pub fn format_balances_table(account: &Account, entries: &[BalanceEntry]) -> String {
    #[derive(Tabled)]
    struct BalanceRow {
        #[tabled(rename = "ID")]
        id: String,
        #[tabled(rename = "Date")]
        date: String,
        #[tabled(rename = "Balance")]
        balance: String,
        #[tabled(rename = "Notes")]
        notes: String,
    }

    let rows: Vec<BalanceRow> = entries
        .iter()
        .map(|e| BalanceRow {
            id: e.id.clone(),
            date: e.date.to_string(),
            balance: format_money(e.balance, &account.currency),
            notes: e.notes.clone().unwrap_or_default(),
        })
        .collect();

    let table = Table::new(rows)
        .with(Style::rounded())
        .with(Modify::new(Columns::new(2..3)).with(Alignment::right()))
        .to_string();

    format!(
        "\n{} {} ({}, {})\n\n{}\n",
        "📒".cyan().bold(),
        account.name.bold(),
        account.account_type.as_str(),
        account.category().as_str(),
        table
    )
}

/// Format the net worth series with optional milestone annotations
pub fn format_chart_table(
    points: &[ChartDataPoint],
    milestones: &[Milestone],
    currency: &str,
) -> String {
    #[derive(Tabled)]
    struct PointRow {
        #[tabled(rename = "Date")]
        date: String,
        #[tabled(rename = "Assets")]
        assets: String,
        #[tabled(rename = "Liabilities")]
        liabilities: String,
        #[tabled(rename = "Net Worth")]
        net_worth: String,
        #[tabled(rename = "Milestones")]
        milestones: String,
    }

    let rows: Vec<PointRow> = points
        .iter()
        .enumerate()
        .map(|(i, p)| {
            // Attach milestones falling after the previous point, up to this one
            let labels: Vec<&str> = milestones
                .iter()
                .filter(|m| m.date <= p.date && (i == 0 || m.date > points[i - 1].date))
                .map(|m| m.label.as_str())
                .collect();
            PointRow {
                date: p.date.to_string(),
                assets: format_money(p.assets, currency),
                liabilities: format_money(p.liabilities, currency),
                net_worth: colored_amount(p.net_worth, format_money(p.net_worth, currency)),
                milestones: labels.join(", "),
            }
        })
        .collect();

    let mut output = Table::new(rows)
        .with(Style::rounded())
        .with(Modify::new(Columns::new(1..4)).with(Alignment::right()))
        .to_string();

    // Milestones past the last point have no row to sit on
    if let Some(last) = points.last() {
        let later: Vec<&Milestone> = milestones.iter().filter(|m| m.date > last.date).collect();
        if !later.is_empty() {
            output.push_str(&format!("\n\n  After {}:", last.date));
            for m in later {
                output.push_str(&format!("\n  {} {}", m.date, m.label));
            }
        }
    }

    output
}

/// Format the statistics cards as aligned lines
pub fn format_stats(stats: &NetWorthStats, current: Option<&ChartDataPoint>, currency: &str) -> String {
    let mut output = format!("\n{} Net Worth Summary\n\n", "📈".cyan().bold());

    if let Some(point) = current {
        output.push_str(&format!(
            "  Current Net Worth:  {} (as of {})\n",
            format_money(point.net_worth, currency).bold(),
            point.date
        ));
    }

    output.push_str(&format!(
        "  Year to Date:       {} ({})\n",
        colored_amount(stats.ytd_change, format_signed_money(stats.ytd_change, currency)),
        format_percent(stats.ytd_change_percent)
    ));
    output.push_str(&format!(
        "  One Year Return:    {} ({})\n",
        colored_amount(
            stats.one_year_return,
            format_signed_money(stats.one_year_return, currency)
        ),
        format_percent(stats.one_year_return_percent)
    ));
    output.push_str(&format!(
        "  All-Time High:      {} on {}\n",
        format_money(stats.all_time_high, currency).yellow(),
        stats.all_time_high_date
    ));
    output.push_str(&format!(
        "  Avg Change / Entry: {}\n",
        colored_amount(
            stats.monthly_avg_change,
            format_signed_money(stats.monthly_avg_change, currency)
        )
    ));

    output
}

/// Format milestones as a simple table
pub fn format_milestones_table(milestones: &[Milestone]) -> String {
    #[derive(Tabled)]
    struct MilestoneRow {
        #[tabled(rename = "ID")]
        id: String,
        #[tabled(rename = "Date")]
        date: String,
        #[tabled(rename = "Label")]
        label: String,
        #[tabled(rename = "Account")]
        account: String,
    }

    let rows: Vec<MilestoneRow> = milestones
        .iter()
        .map(|m| MilestoneRow {
            id: m.id.clone(),
            date: m.date.to_string(),
            label: m.label.clone(),
            account: m.account_id.clone().unwrap_or_else(|| "-".to_string()),
        })
        .collect();

    Table::new(rows).with(Style::rounded()).to_string()
}
