//! Integration tests for the net worth tracker
//!
//! These tests run the library against a real SQLite file:
//! - Account directory and balance store
//! - Same-date balance replacement
//! - Carry-forward reconstruction of the net worth series
//! - Inactive and deleted accounts dropping out of history
//! - Statistics over the stored history

use anyhow::Result;
use chrono::{Local, NaiveDate};
use rusqlite::Connection;
use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use tally::db::{
    self, init_database, open_db, AccountType, AccountUpdate, BalanceUpdate, NewAccount,
    NewBalance, NewMilestone,
};
use tally::error::TallyError;
use tally::reports::{
    chart_data_between, get_chart_data, get_net_worth_stats, net_worth_stats_as_of, ChartDataPoint,
};
use tempfile::TempDir;

/// Test helper: Create a temporary database
fn create_test_db() -> Result<(TempDir, Connection)> {
    let temp_dir = TempDir::new()?;
    let db_path = temp_dir.path().join("test.db");
    init_database(&db_path)?;
    let conn = open_db(&db_path)?;
    Ok((temp_dir, conn))
}

fn date(s: &str) -> NaiveDate {
    NaiveDate::parse_from_str(s, "%Y-%m-%d").unwrap()
}

fn add_account(conn: &Connection, name: &str, account_type: AccountType) -> String {
    db::create_account(
        conn,
        &NewAccount {
            name: name.to_string(),
            account_type,
            institution: None,
            description: None,
            currency: None,
        },
    )
    .unwrap()
    .id
}

fn set_balance(conn: &Connection, account_id: &str, on: &str, balance: Decimal) {
    db::upsert_balance(
        conn,
        &NewBalance {
            account_id: account_id.to_string(),
            date: date(on),
            balance,
            notes: None,
        },
    )
    .unwrap();
}

fn point(on: &str, assets: Decimal, liabilities: Decimal) -> ChartDataPoint {
    ChartDataPoint {
        date: date(on),
        assets,
        liabilities,
        net_worth: assets - liabilities,
    }
}

/// Savings and a credit card, observed on different dates
fn seed_savings_and_card(conn: &Connection) -> (String, String) {
    let savings = add_account(conn, "Savings", AccountType::Savings);
    let card = add_account(conn, "Visa", AccountType::CreditCard);
    set_balance(conn, &savings, "2024-01-01", dec!(1000));
    set_balance(conn, &card, "2024-02-01", dec!(-500));
    set_balance(conn, &savings, "2024-03-01", dec!(1200));
    (savings, card)
}

#[test]
fn test_chart_carries_balances_forward() -> Result<()> {
    let (_dir, conn) = create_test_db()?;
    seed_savings_and_card(&conn);

    let points = get_chart_data(&conn, "2024-01-01", "2024-12-31")?;

    assert_eq!(
        points,
        vec![
            point("2024-01-01", dec!(1000), dec!(0)),
            point("2024-02-01", dec!(1000), dec!(500)),
            point("2024-03-01", dec!(1200), dec!(500)),
        ]
    );
    Ok(())
}

#[test]
fn test_chart_window_carries_in_earlier_balances() -> Result<()> {
    let (_dir, conn) = create_test_db()?;
    seed_savings_and_card(&conn);

    let points = chart_data_between(&conn, date("2024-02-15"), date("2024-12-31"))?;

    // Only March is inside the window; the card balance comes from February
    assert_eq!(points, vec![point("2024-03-01", dec!(1200), dec!(500))]);
    Ok(())
}

#[test]
fn test_chart_rejects_inverted_range() -> Result<()> {
    let (_dir, conn) = create_test_db()?;

    let err = get_chart_data(&conn, "2024-03-01", "2024-01-01").unwrap_err();
    assert!(matches!(
        err.downcast_ref::<TallyError>(),
        Some(TallyError::InvalidRange { .. })
    ));

    assert!(get_chart_data(&conn, "01/03/2024", "2024-12-31").is_err());
    Ok(())
}

#[test]
fn test_chart_refuses_out_of_range_rows_instead_of_overflowing() -> Result<()> {
    let (_dir, conn) = create_test_db()?;
    let first = add_account(&conn, "Savings", AccountType::Savings);
    let second = add_account(&conn, "ISA", AccountType::Savings);

    // Rows written behind the store's back, e.g. by another tool
    for (id, account_id) in [("b1", &first), ("b2", &second)] {
        conn.execute(
            "INSERT INTO balance_entries (id, account_id, date, balance, created_at)
             VALUES (?1, ?2, '2024-01-01', '79228162514264337593543950335', '2024-01-01T00:00:00Z')",
            [id, account_id.as_str()],
        )?;
    }

    let err = get_chart_data(&conn, "2024-01-01", "2024-12-31").unwrap_err();
    assert!(matches!(
        err.downcast_ref::<TallyError>(),
        Some(TallyError::ValidationError(_))
    ));
    assert!(net_worth_stats_as_of(&conn, date("2024-06-01")).is_err());
    Ok(())
}

#[test]
fn test_same_date_balance_is_replaced() -> Result<()> {
    let (_dir, conn) = create_test_db()?;
    let savings = add_account(&conn, "Savings", AccountType::Savings);

    set_balance(&conn, &savings, "2024-01-01", dec!(1000));
    let first_id = db::list_balances(&conn, &savings)?[0].id.clone();
    set_balance(&conn, &savings, "2024-01-01", dec!(1100));

    let entries = db::list_balances(&conn, &savings)?;
    assert_eq!(entries.len(), 1);
    assert_eq!(entries[0].id, first_id);
    assert_eq!(entries[0].balance, dec!(1100));

    let points = get_chart_data(&conn, "2024-01-01", "2024-01-31")?;
    assert_eq!(points, vec![point("2024-01-01", dec!(1100), dec!(0))]);
    Ok(())
}

#[test]
fn test_inactive_account_leaves_history() -> Result<()> {
    let (_dir, conn) = create_test_db()?;
    let (_savings, card) = seed_savings_and_card(&conn);

    db::update_account(
        &conn,
        &card,
        &AccountUpdate {
            is_active: Some(false),
            ..Default::default()
        },
    )?;

    let points = get_chart_data(&conn, "2024-01-01", "2024-12-31")?;
    assert_eq!(
        points,
        vec![
            point("2024-01-01", dec!(1000), dec!(0)),
            point("2024-03-01", dec!(1200), dec!(0)),
        ]
    );

    // Still listed when asking for everything
    let all = db::list_accounts(&conn, true)?;
    assert_eq!(all.len(), 2);
    assert_eq!(db::list_active_accounts(&conn)?.len(), 1);
    Ok(())
}

#[test]
fn test_deleting_account_removes_its_balances() -> Result<()> {
    let (_dir, conn) = create_test_db()?;
    let (_savings, card) = seed_savings_and_card(&conn);

    db::delete_account(&conn, &card)?;

    let remaining: i64 =
        conn.query_row("SELECT COUNT(*) FROM balance_entries", [], |row| row.get(0))?;
    assert_eq!(remaining, 2);

    let err = db::list_balances(&conn, &card).unwrap_err();
    assert!(matches!(
        err.downcast_ref::<TallyError>(),
        Some(TallyError::AccountNotFound(_))
    ));
    Ok(())
}

#[test]
fn test_balance_update_feeds_chart() -> Result<()> {
    let (_dir, conn) = create_test_db()?;
    let (savings, _card) = seed_savings_and_card(&conn);

    let march = db::list_balances(&conn, &savings)?
        .into_iter()
        .find(|e| e.date == date("2024-03-01"))
        .unwrap();
    db::update_balance(
        &conn,
        &march.id,
        &BalanceUpdate {
            balance: Some(dec!(900)),
            notes: Some("after holiday".to_string()),
        },
    )?;

    let points = get_chart_data(&conn, "2024-03-01", "2024-03-01")?;
    assert_eq!(points, vec![point("2024-03-01", dec!(900), dec!(500))]);
    Ok(())
}

#[test]
fn test_accounts_with_balances_use_latest_entry() -> Result<()> {
    let (_dir, conn) = create_test_db()?;
    let (savings, _card) = seed_savings_and_card(&conn);
    add_account(&conn, "House", AccountType::Property);

    let rows = db::list_accounts_with_balances(&conn, false)?;
    assert_eq!(rows.len(), 3);

    let savings_row = rows.iter().find(|r| r.account.id == savings).unwrap();
    assert_eq!(savings_row.current_balance, dec!(1200));
    assert_eq!(savings_row.balance_date, Some(date("2024-03-01")));

    let house = rows.iter().find(|r| r.account.name == "House").unwrap();
    assert_eq!(house.current_balance, Decimal::ZERO);
    assert_eq!(house.balance_date, None);
    Ok(())
}

#[test]
fn test_stats_over_stored_history() -> Result<()> {
    let (_dir, conn) = create_test_db()?;
    let savings = add_account(&conn, "Savings", AccountType::Savings);
    let mortgage = add_account(&conn, "Mortgage", AccountType::Mortgage);

    set_balance(&conn, &savings, "2023-06-01", dec!(10000));
    set_balance(&conn, &mortgage, "2023-06-01", dec!(-5000));
    set_balance(&conn, &savings, "2024-01-15", dec!(12000));
    set_balance(&conn, &savings, "2024-05-01", dec!(11000));
    // Future-dated entries are ignored as of the evaluation date
    set_balance(&conn, &savings, "2024-09-01", dec!(50000));

    let (stats, current) = net_worth_stats_as_of(&conn, date("2024-06-01"))?;
    assert_eq!(current, Some(point("2024-05-01", dec!(11000), dec!(5000))));

    // Series: 5000 (2023-06-01), 7000 (2024-01-15), 6000 (2024-05-01)
    assert_eq!(stats.ytd_change, dec!(-1000));
    assert_eq!(stats.ytd_change_percent, dec!(-14.3));
    assert_eq!(stats.one_year_return, dec!(1000));
    assert_eq!(stats.one_year_return_percent, dec!(20.0));
    assert_eq!(stats.all_time_high, dec!(7000));
    assert_eq!(stats.all_time_high_date, date("2024-01-15"));
    assert_eq!(stats.monthly_avg_change, dec!(500));
    Ok(())
}

#[test]
fn test_stats_on_empty_database() -> Result<()> {
    let (_dir, conn) = create_test_db()?;
    let today = date("2024-06-01");

    let (stats, current) = net_worth_stats_as_of(&conn, today)?;
    assert!(current.is_none());
    assert_eq!(stats.ytd_change, Decimal::ZERO);
    assert_eq!(stats.all_time_high, Decimal::ZERO);
    assert_eq!(stats.all_time_high_date, today);
    Ok(())
}

#[test]
fn test_stats_for_today_include_past_balances() -> Result<()> {
    let (_dir, conn) = create_test_db()?;
    let savings = add_account(&conn, "Savings", AccountType::Savings);
    set_balance(&conn, &savings, "2020-01-01", dec!(100));
    set_balance(&conn, &savings, "2020-02-01", dec!(300));

    let stats = get_net_worth_stats(&conn)?;
    assert_eq!(stats.all_time_high, dec!(300));
    assert_eq!(stats.all_time_high_date, date("2020-02-01"));
    assert_eq!(stats.monthly_avg_change, dec!(200));
    assert!(Local::now().date_naive() > date("2020-02-01"));
    Ok(())
}

#[test]
fn test_milestones_filter_and_survive_account_deletion() -> Result<()> {
    let (_dir, conn) = create_test_db()?;
    let savings = add_account(&conn, "Savings", AccountType::Savings);

    db::create_milestone(
        &conn,
        &NewMilestone {
            date: date("2024-02-10"),
            label: "Bonus".to_string(),
            account_id: Some(savings.clone()),
        },
    )?;
    db::create_milestone(
        &conn,
        &NewMilestone {
            date: date("2024-08-01"),
            label: "Moved house".to_string(),
            account_id: None,
        },
    )?;

    let in_spring = db::list_milestones(&conn, Some(date("2024-01-01")), Some(date("2024-06-30")))?;
    assert_eq!(in_spring.len(), 1);
    assert_eq!(in_spring[0].label, "Bonus");

    db::delete_account(&conn, &savings)?;
    let all = db::list_milestones(&conn, None, None)?;
    assert_eq!(all.len(), 2);
    assert_eq!(all[0].account_id, None);
    Ok(())
}
