// Database module - SQLite connection, account directory and balance store

pub mod models;

use anyhow::{Context, Result};
use chrono::{NaiveDate, Utc};
use rusqlite::types::{Type, ValueRef};
use rusqlite::{params, Connection, OptionalExtension, Row};
use rust_decimal::Decimal;
use std::path::Path;
use std::str::FromStr;
use tracing::{debug, info};

use crate::error::TallyError;
use crate::utils::{check_balance, normalize_currency};
pub use models::{
    Account, AccountCategory, AccountHistory, AccountType, AccountUpdate, AccountWithBalance,
    BalanceEntry, BalancePoint, BalanceUpdate, Milestone, NewAccount, NewBalance, NewMilestone,
    DEFAULT_CURRENCY,
};

/// Open database connection
pub fn open_db(db_path: &Path) -> Result<Connection> {
    let conn = Connection::open(db_path)
        .with_context(|| format!("Failed to open database at {:?}", db_path))?;

    // Cascades on balances and milestones depend on this
    conn.execute("PRAGMA foreign_keys = ON", [])
        .context("Failed to enable foreign keys")?;

    Ok(conn)
}

/// Initialize the database with schema
///
/// Creates the database file when missing and runs the idempotent schema
/// SQL, so it is safe to call before every command.
pub fn init_database(db_path: &Path) -> Result<()> {
    debug!("Initializing database at: {:?}", db_path);

    let conn = open_db(db_path)?;
    apply_schema(&conn)?;

    debug!("Database initialized successfully");
    Ok(())
}

/// Run the schema SQL on an open connection
pub fn apply_schema(conn: &Connection) -> Result<()> {
    conn.execute_batch(include_str!("schema.sql"))
        .map_err(|e| TallyError::DbError(format!("failed to apply schema: {}", e)).into())
}

fn new_id() -> String {
    uuid::Uuid::new_v4().to_string()
}

/// Trimmed text, with blank input treated as absent
fn clean_optional(value: Option<&str>) -> Option<String> {
    value
        .map(str::trim)
        .filter(|v| !v.is_empty())
        .map(str::to_string)
}

// ============ Account directory ============

const ACCOUNT_COLUMNS: &str =
    "a.id, a.name, a.account_type, a.institution, a.description, a.currency, a.is_active, a.created_at, a.updated_at";

fn account_from_row(row: &Row) -> rusqlite::Result<Account> {
    Ok(Account {
        id: row.get(0)?,
        name: row.get(1)?,
        account_type: account_type_value(row, 2)?,
        institution: row.get(3)?,
        description: row.get(4)?,
        currency: row.get(5)?,
        is_active: row.get(6)?,
        created_at: row.get(7)?,
        updated_at: row.get(8)?,
    })
}

fn account_type_value(row: &Row, idx: usize) -> rusqlite::Result<AccountType> {
    let raw: String = row.get(idx)?;
    raw.parse::<AccountType>().map_err(|_| {
        rusqlite::Error::FromSqlConversionFailure(
            idx,
            Type::Text,
            format!("unknown account type '{}'", raw).into(),
        )
    })
}

/// Create an account; its category is derived from the account type
pub fn create_account(conn: &Connection, input: &NewAccount) -> Result<Account> {
    let name = input.name.trim();
    if name.is_empty() {
        return Err(TallyError::ValidationError("account name cannot be empty".into()).into());
    }
    let currency = match input.currency.as_deref() {
        Some(code) => normalize_currency(code)?,
        None => DEFAULT_CURRENCY.to_string(),
    };

    let id = new_id();
    let now = Utc::now();
    conn.execute(
        "INSERT INTO accounts (
            id, name, account_type, category, institution, description,
            currency, is_active, created_at, updated_at
        ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, 1, ?8, ?8)",
        params![
            id,
            name,
            input.account_type.as_str(),
            input.account_type.category().as_str(),
            clean_optional(input.institution.as_deref()),
            clean_optional(input.description.as_deref()),
            currency,
            now,
        ],
    )
    .context("Failed to insert account")?;

    info!(
        "Created {} account '{}' ({})",
        input.account_type.as_str(),
        name,
        id
    );
    get_account(conn, &id)
}

/// Fetch one account by id
pub fn get_account(conn: &Connection, account_id: &str) -> Result<Account> {
    let sql = format!("SELECT {} FROM accounts a WHERE a.id = ?1", ACCOUNT_COLUMNS);
    conn.query_row(&sql, [account_id], account_from_row)
        .optional()?
        .ok_or_else(|| TallyError::AccountNotFound(account_id.to_string()).into())
}

/// List accounts ordered by category then name
pub fn list_accounts(conn: &Connection, include_inactive: bool) -> Result<Vec<Account>> {
    let sql = format!(
        "SELECT {} FROM accounts a
         WHERE (?1 OR a.is_active = 1)
         ORDER BY a.category, a.name COLLATE NOCASE, a.id",
        ACCOUNT_COLUMNS
    );
    let mut stmt = conn.prepare(&sql)?;
    let accounts = stmt
        .query_map([include_inactive], account_from_row)?
        .collect::<Result<Vec<_>, _>>()?;
    Ok(accounts)
}

/// Active accounts only; the base set for every net worth query
pub fn list_active_accounts(conn: &Connection) -> Result<Vec<Account>> {
    list_accounts(conn, false)
}

/// Accounts together with their latest recorded balance (zero when none)
pub fn list_accounts_with_balances(
    conn: &Connection,
    include_inactive: bool,
) -> Result<Vec<AccountWithBalance>> {
    let sql = format!(
        "SELECT {}, b.balance, b.date
         FROM accounts a
         LEFT JOIN balance_entries b ON b.account_id = a.id
             AND b.date = (SELECT MAX(date) FROM balance_entries WHERE account_id = a.id)
         WHERE (?1 OR a.is_active = 1)
         ORDER BY a.category, a.name COLLATE NOCASE, a.id",
        ACCOUNT_COLUMNS
    );
    let mut stmt = conn.prepare(&sql)?;
    let rows = stmt
        .query_map([include_inactive], |row| {
            Ok(AccountWithBalance {
                account: account_from_row(row)?,
                current_balance: get_optional_decimal_value(row, 9)?.unwrap_or(Decimal::ZERO),
                balance_date: row.get(10)?,
            })
        })?
        .collect::<Result<Vec<_>, _>>()?;
    Ok(rows)
}

/// Apply a partial update; the account type (and so the category) never changes
pub fn update_account(conn: &Connection, account_id: &str, update: &AccountUpdate) -> Result<Account> {
    // Fail early with a typed error for unknown ids
    get_account(conn, account_id)?;

    if update.is_empty() {
        return get_account(conn, account_id);
    }

    let mut sql = String::from("UPDATE accounts SET updated_at = ?");
    let mut values: Vec<Box<dyn rusqlite::ToSql>> = vec![Box::new(Utc::now())];

    if let Some(name) = &update.name {
        let name = name.trim();
        if name.is_empty() {
            return Err(TallyError::ValidationError("account name cannot be empty".into()).into());
        }
        sql.push_str(", name = ?");
        values.push(Box::new(name.to_string()));
    }
    if let Some(institution) = &update.institution {
        sql.push_str(", institution = ?");
        values.push(Box::new(clean_optional(Some(institution.as_str()))));
    }
    if let Some(description) = &update.description {
        sql.push_str(", description = ?");
        values.push(Box::new(clean_optional(Some(description.as_str()))));
    }
    if let Some(currency) = &update.currency {
        sql.push_str(", currency = ?");
        values.push(Box::new(normalize_currency(currency)?));
    }
    if let Some(is_active) = update.is_active {
        sql.push_str(", is_active = ?");
        values.push(Box::new(is_active));
    }

    sql.push_str(" WHERE id = ?");
    values.push(Box::new(account_id.to_string()));

    let param_refs: Vec<&dyn rusqlite::ToSql> = values.iter().map(|p| p.as_ref()).collect();
    conn.execute(&sql, param_refs.as_slice())
        .context("Failed to update account")?;

    info!("Updated account {}", account_id);
    get_account(conn, account_id)
}

/// Delete an account; its balances go with it, milestones are detached
pub fn delete_account(conn: &Connection, account_id: &str) -> Result<()> {
    let deleted = conn.execute("DELETE FROM accounts WHERE id = ?1", [account_id])?;
    if deleted == 0 {
        return Err(TallyError::AccountNotFound(account_id.to_string()).into());
    }
    info!("Deleted account {}", account_id);
    Ok(())
}

// ============ Balance store ============

const BALANCE_COLUMNS: &str = "id, account_id, date, balance, notes, created_at";

fn balance_from_row(row: &Row) -> rusqlite::Result<BalanceEntry> {
    Ok(BalanceEntry {
        id: row.get(0)?,
        account_id: row.get(1)?,
        date: row.get(2)?,
        balance: get_decimal_value(row, 3)?,
        notes: row.get(4)?,
        created_at: row.get(5)?,
    })
}

/// Record a balance, replacing any existing entry for the same (account, date)
///
/// The entry keeps its original id and creation time when overwritten.
pub fn upsert_balance(conn: &Connection, input: &NewBalance) -> Result<BalanceEntry> {
    check_balance(input.balance)?;
    // Surface a typed error instead of a foreign key failure
    get_account(conn, &input.account_id)?;

    conn.execute(
        "INSERT INTO balance_entries (id, account_id, date, balance, notes, created_at)
         VALUES (?1, ?2, ?3, ?4, ?5, ?6)
         ON CONFLICT(account_id, date) DO UPDATE SET
             balance = excluded.balance,
             notes = excluded.notes",
        params![
            new_id(),
            input.account_id,
            input.date,
            input.balance.to_string(),
            clean_optional(input.notes.as_deref()),
            Utc::now(),
        ],
    )
    .context("Failed to record balance")?;

    debug!(
        "Recorded balance {} for account {} on {}",
        input.balance, input.account_id, input.date
    );

    let sql = format!(
        "SELECT {} FROM balance_entries WHERE account_id = ?1 AND date = ?2",
        BALANCE_COLUMNS
    );
    let entry = conn.query_row(&sql, params![input.account_id, input.date], balance_from_row)?;
    Ok(entry)
}

/// Fetch one balance entry by id
pub fn get_balance(conn: &Connection, balance_id: &str) -> Result<BalanceEntry> {
    let sql = format!("SELECT {} FROM balance_entries WHERE id = ?1", BALANCE_COLUMNS);
    conn.query_row(&sql, [balance_id], balance_from_row)
        .optional()?
        .ok_or_else(|| TallyError::BalanceNotFound(balance_id.to_string()).into())
}

/// Full balance history of one account, ascending by date
pub fn list_balances(conn: &Connection, account_id: &str) -> Result<Vec<BalanceEntry>> {
    get_account(conn, account_id)?;

    let sql = format!(
        "SELECT {} FROM balance_entries WHERE account_id = ?1 ORDER BY date ASC",
        BALANCE_COLUMNS
    );
    let mut stmt = conn.prepare(&sql)?;
    let entries = stmt
        .query_map([account_id], balance_from_row)?
        .collect::<Result<Vec<_>, _>>()?;
    Ok(entries)
}

/// Change the amount and/or note of an existing entry
pub fn update_balance(
    conn: &Connection,
    balance_id: &str,
    update: &BalanceUpdate,
) -> Result<BalanceEntry> {
    let existing = get_balance(conn, balance_id)?;

    let balance = match update.balance {
        Some(b) => check_balance(b)?,
        None => existing.balance,
    };
    let notes = match &update.notes {
        Some(n) => clean_optional(Some(n.as_str())),
        None => existing.notes,
    };

    conn.execute(
        "UPDATE balance_entries SET balance = ?1, notes = ?2 WHERE id = ?3",
        params![balance.to_string(), notes, balance_id],
    )
    .context("Failed to update balance")?;

    get_balance(conn, balance_id)
}

pub fn delete_balance(conn: &Connection, balance_id: &str) -> Result<()> {
    let deleted = conn.execute("DELETE FROM balance_entries WHERE id = ?1", [balance_id])?;
    if deleted == 0 {
        return Err(TallyError::BalanceNotFound(balance_id.to_string()).into());
    }
    Ok(())
}

/// Bulk variant of the balance store: every balance of every active account,
/// grouped per account and ascending by date.
///
/// Accounts without any balance are omitted since they never contribute to
/// a net worth point.
pub fn load_active_histories(conn: &Connection) -> Result<Vec<AccountHistory>> {
    let mut stmt = conn.prepare(
        "SELECT a.id, a.account_type, b.date, b.balance
         FROM balance_entries b
         JOIN accounts a ON a.id = b.account_id
         WHERE a.is_active = 1
         ORDER BY a.category, a.name COLLATE NOCASE, a.id, b.date ASC",
    )?;

    let mut rows = stmt.query([])?;
    let mut histories: Vec<AccountHistory> = Vec::new();

    while let Some(row) = rows.next()? {
        let account_id: String = row.get(0)?;
        let account_type = account_type_value(row, 1)?;
        let point = BalancePoint {
            date: row.get(2)?,
            balance: get_decimal_value(row, 3).context("Failed to parse stored balance")?,
        };

        match histories.last_mut() {
            Some(history) if history.account_id == account_id => history.entries.push(point),
            _ => histories.push(AccountHistory {
                account_id,
                category: account_type.category(),
                entries: vec![point],
            }),
        }
    }

    debug!("Loaded balance histories for {} active accounts", histories.len());
    Ok(histories)
}

/// Earliest balance date across active accounts
pub fn get_earliest_balance_date(conn: &Connection) -> Result<Option<NaiveDate>> {
    // MIN() returns a single row with NULL when there are no balances
    let date: Option<NaiveDate> = conn.query_row(
        "SELECT MIN(b.date) FROM balance_entries b
         JOIN accounts a ON a.id = b.account_id
         WHERE a.is_active = 1",
        [],
        |row| row.get(0),
    )?;
    Ok(date)
}

// ============ Milestones ============

const MILESTONE_COLUMNS: &str = "id, date, label, account_id, created_at";

fn milestone_from_row(row: &Row) -> rusqlite::Result<Milestone> {
    Ok(Milestone {
        id: row.get(0)?,
        date: row.get(1)?,
        label: row.get(2)?,
        account_id: row.get(3)?,
        created_at: row.get(4)?,
    })
}

pub fn create_milestone(conn: &Connection, input: &NewMilestone) -> Result<Milestone> {
    let label = input.label.trim();
    if label.is_empty() {
        return Err(TallyError::ValidationError("milestone label cannot be empty".into()).into());
    }
    if let Some(account_id) = &input.account_id {
        get_account(conn, account_id)?;
    }

    let id = new_id();
    conn.execute(
        "INSERT INTO milestones (id, date, label, account_id, created_at)
         VALUES (?1, ?2, ?3, ?4, ?5)",
        params![id, input.date, label, input.account_id, Utc::now()],
    )
    .context("Failed to insert milestone")?;

    let sql = format!("SELECT {} FROM milestones WHERE id = ?1", MILESTONE_COLUMNS);
    Ok(conn.query_row(&sql, [&id], milestone_from_row)?)
}

/// Milestones ascending by date, optionally bounded (inclusive)
pub fn list_milestones(
    conn: &Connection,
    from_date: Option<NaiveDate>,
    to_date: Option<NaiveDate>,
) -> Result<Vec<Milestone>> {
    let mut sql = format!("SELECT {} FROM milestones WHERE 1=1", MILESTONE_COLUMNS);
    let mut values: Vec<Box<dyn rusqlite::ToSql>> = Vec::new();

    if let Some(f) = from_date {
        sql.push_str(" AND date >= ?");
        values.push(Box::new(f));
    }
    if let Some(t) = to_date {
        sql.push_str(" AND date <= ?");
        values.push(Box::new(t));
    }
    sql.push_str(" ORDER BY date ASC, created_at ASC");

    let mut stmt = conn.prepare(&sql)?;
    let param_refs: Vec<&dyn rusqlite::ToSql> = values.iter().map(|p| p.as_ref()).collect();
    let milestones = stmt
        .query_map(param_refs.as_slice(), milestone_from_row)?
        .collect::<Result<Vec<_>, _>>()?;
    Ok(milestones)
}

pub fn delete_milestone(conn: &Connection, milestone_id: &str) -> Result<()> {
    let deleted = conn.execute("DELETE FROM milestones WHERE id = ?1", [milestone_id])?;
    if deleted == 0 {
        return Err(TallyError::MilestoneNotFound(milestone_id.to_string()).into());
    }
    Ok(())
}

// ============ Decimal columns ============

/// Helper to read Decimal from SQLite (handles INTEGER, REAL and TEXT)
pub fn get_decimal_value(row: &Row, idx: usize) -> Result<Decimal, rusqlite::Error> {
    match row.get_ref(idx)? {
        ValueRef::Text(bytes) => {
            let s = std::str::from_utf8(bytes)
                .map_err(|e| rusqlite::Error::FromSqlConversionFailure(idx, Type::Text, Box::new(e)))?;
            Decimal::from_str(s)
                .map_err(|e| rusqlite::Error::FromSqlConversionFailure(idx, Type::Text, Box::new(e)))
        }
        ValueRef::Integer(i) => Ok(Decimal::from(i)),
        ValueRef::Real(f) => Decimal::try_from(f)
            .map_err(|e| rusqlite::Error::FromSqlConversionFailure(idx, Type::Real, Box::new(e))),
        ValueRef::Null => Err(rusqlite::Error::InvalidColumnType(
            idx,
            "decimal".to_string(),
            Type::Null,
        )),
        ValueRef::Blob(_) => Err(rusqlite::Error::InvalidColumnType(
            idx,
            "decimal".to_string(),
            Type::Blob,
        )),
    }
}

/// Helper to read optional Decimal from SQLite
fn get_optional_decimal_value(row: &Row, idx: usize) -> Result<Option<Decimal>, rusqlite::Error> {
    match row.get_ref(idx)? {
        ValueRef::Null => Ok(None),
        _ => get_decimal_value(row, idx).map(Some),
    }
}
