//! Net worth time series
//!
//! Rebuilds total assets, liabilities and net worth from sparse per-account
//! balance histories. A point is emitted for every date on which at least one
//! account recorded a balance; on each of those dates every account
//! contributes its latest balance on or before that date.

use anyhow::Result;
use chrono::NaiveDate;
use rusqlite::Connection;
use rust_decimal::Decimal;
use serde::Serialize;
use std::collections::BTreeSet;
use tracing::{debug, warn};

use crate::db::{self, AccountCategory, AccountHistory};
use crate::error::TallyError;
use crate::utils::{check_balance, parse_date};

/// Aggregate position on one observation date
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ChartDataPoint {
    pub date: NaiveDate,
    pub assets: Decimal,
    pub liabilities: Decimal,
    pub net_worth: Decimal,
}

/// Reconstruct the aggregate series over `[from, to]` (inclusive).
///
/// Each history must be ascending by date and should cover everything the
/// account ever recorded, since balances before `from` are carried into the
/// range. Accounts with no balance on or before a date are left out of that
/// point entirely. Liabilities contribute the magnitude of their balance.
pub fn reconstruct(
    histories: &[AccountHistory],
    from: NaiveDate,
    to: NaiveDate,
) -> Vec<ChartDataPoint> {
    let dates: BTreeSet<NaiveDate> = histories
        .iter()
        .flat_map(|h| h.entries.iter().map(|e| e.date))
        .filter(|d| (from..=to).contains(d))
        .collect();

    if dates.is_empty() {
        return Vec::new();
    }

    // cursors[i] counts the entries of histories[i] dated on or before the
    // current date; it only moves forward because dates are visited in order.
    let mut cursors = vec![0usize; histories.len()];
    let mut points = Vec::with_capacity(dates.len());

    for date in dates {
        let mut assets = Decimal::ZERO;
        let mut liabilities = Decimal::ZERO;

        for (history, cursor) in histories.iter().zip(cursors.iter_mut()) {
            while *cursor < history.entries.len() && history.entries[*cursor].date <= date {
                *cursor += 1;
            }
            let Some(latest) = cursor.checked_sub(1).map(|i| &history.entries[i]) else {
                continue;
            };

            match history.category {
                AccountCategory::Asset => assets += latest.balance,
                AccountCategory::Liability => liabilities += latest.balance.abs(),
            }
        }

        points.push(ChartDataPoint {
            date,
            assets,
            liabilities,
            net_worth: assets - liabilities,
        });
    }

    points
}

/// Reject histories whose dates are not strictly ascending or whose
/// balances are outside the storable range
pub fn validate_history(history: &AccountHistory) -> Result<()> {
    for entry in &history.entries {
        check_balance(entry.balance)?;
    }

    let ordered = history
        .entries
        .windows(2)
        .all(|pair| pair[0].date < pair[1].date);
    if ordered {
        Ok(())
    } else {
        Err(TallyError::UnorderedHistory(history.account_id.clone()).into())
    }
}

/// Load active histories and reconstruct `[from, to]`
pub fn chart_data_between(
    conn: &Connection,
    from: NaiveDate,
    to: NaiveDate,
) -> Result<Vec<ChartDataPoint>> {
    if from > to {
        return Err(TallyError::InvalidRange { from, to }.into());
    }

    let histories = db::load_active_histories(conn)?;
    for history in &histories {
        if let Err(e) = validate_history(history) {
            warn!("Refusing to reconstruct net worth: {}", e);
            return Err(e);
        }
    }

    let points = reconstruct(&histories, from, to);
    debug!(
        "Reconstructed {} net worth points between {} and {}",
        points.len(),
        from,
        to
    );
    Ok(points)
}

/// Chart series for `YYYY-MM-DD` bounds, ascending by date
pub fn get_chart_data(conn: &Connection, from: &str, to: &str) -> Result<Vec<ChartDataPoint>> {
    let from = parse_date(from)?;
    let to = parse_date(to)?;
    chart_data_between(conn, from, to)
}
