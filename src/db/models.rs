use chrono::{DateTime, NaiveDate, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::str::FromStr;

/// Currency used when neither the account nor the config names one
pub const DEFAULT_CURRENCY: &str = "GBP";

/// Account types supported by the tracker
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "snake_case")]
pub enum AccountType {
    Property,
    Pension,
    Investment,
    Savings,
    Mortgage,
    Loan,
    CreditCard,
}

impl AccountType {
    pub const ALL: [AccountType; 7] = [
        AccountType::Property,
        AccountType::Pension,
        AccountType::Investment,
        AccountType::Savings,
        AccountType::Mortgage,
        AccountType::Loan,
        AccountType::CreditCard,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            AccountType::Property => "property",
            AccountType::Pension => "pension",
            AccountType::Investment => "investment",
            AccountType::Savings => "savings",
            AccountType::Mortgage => "mortgage",
            AccountType::Loan => "loan",
            AccountType::CreditCard => "credit_card",
        }
    }

    /// The asset/liability side this type always lands on
    pub fn category(&self) -> AccountCategory {
        match self {
            AccountType::Property
            | AccountType::Pension
            | AccountType::Investment
            | AccountType::Savings => AccountCategory::Asset,
            AccountType::Mortgage | AccountType::Loan | AccountType::CreditCard => {
                AccountCategory::Liability
            }
        }
    }
}

impl FromStr for AccountType {
    type Err = ();

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().replace('-', "_").as_str() {
            "property" => Ok(AccountType::Property),
            "pension" => Ok(AccountType::Pension),
            "investment" => Ok(AccountType::Investment),
            "savings" => Ok(AccountType::Savings),
            "mortgage" => Ok(AccountType::Mortgage),
            "loan" => Ok(AccountType::Loan),
            "credit_card" | "creditcard" => Ok(AccountType::CreditCard),
            _ => Err(()),
        }
    }
}

/// Which side of the balance sheet an account sits on
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "snake_case")]
pub enum AccountCategory {
    Asset,
    Liability,
}

impl AccountCategory {
    pub fn as_str(&self) -> &'static str {
        match self {
            AccountCategory::Asset => "asset",
            AccountCategory::Liability => "liability",
        }
    }
}

impl FromStr for AccountCategory {
    type Err = ();

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "asset" => Ok(AccountCategory::Asset),
            "liability" => Ok(AccountCategory::Liability),
            _ => Err(()),
        }
    }
}

/// Account (savings pot, pension, mortgage, ...)
///
/// The category is not stored on the struct: it is always read off the
/// account type so the two can never disagree.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Account {
    pub id: String,
    pub name: String,
    pub account_type: AccountType,
    pub institution: Option<String>,
    pub description: Option<String>,
    pub currency: String,
    pub is_active: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Account {
    pub fn category(&self) -> AccountCategory {
        self.account_type.category()
    }
}

/// Input for creating an account
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NewAccount {
    pub name: String,
    pub account_type: AccountType,
    pub institution: Option<String>,
    pub description: Option<String>,
    pub currency: Option<String>,
}

/// Partial account update; `None` leaves a field untouched.
///
/// An empty string for `institution` or `description` clears the field.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AccountUpdate {
    pub name: Option<String>,
    pub institution: Option<String>,
    pub description: Option<String>,
    pub currency: Option<String>,
    pub is_active: Option<bool>,
}

impl AccountUpdate {
    pub fn is_empty(&self) -> bool {
        self.name.is_none()
            && self.institution.is_none()
            && self.description.is_none()
            && self.currency.is_none()
            && self.is_active.is_none()
    }
}

/// Account together with its most recent balance
#[derive(Debug, Clone)]
pub struct AccountWithBalance {
    pub account: Account,
    pub current_balance: Decimal,
    pub balance_date: Option<NaiveDate>,
}

/// Point-in-time balance of one account
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct BalanceEntry {
    pub id: String,
    pub account_id: String,
    pub date: NaiveDate,
    pub balance: Decimal,
    pub notes: Option<String>,
    pub created_at: DateTime<Utc>,
}

/// Input for recording a balance; replaces any entry on the same date
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NewBalance {
    pub account_id: String,
    pub date: NaiveDate,
    pub balance: Decimal,
    pub notes: Option<String>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct BalanceUpdate {
    pub balance: Option<Decimal>,
    pub notes: Option<String>,
}

/// Labelled date shown alongside the net worth chart
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Milestone {
    pub id: String,
    pub date: NaiveDate,
    pub label: String,
    pub account_id: Option<String>,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NewMilestone {
    pub date: NaiveDate,
    pub label: String,
    pub account_id: Option<String>,
}

/// One (date, balance) observation inside an account history
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BalancePoint {
    pub date: NaiveDate,
    pub balance: Decimal,
}

/// Full ascending balance history of one active account, as fed to the
/// net worth reconstruction
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AccountHistory {
    pub account_id: String,
    pub category: AccountCategory,
    pub entries: Vec<BalancePoint>,
}
