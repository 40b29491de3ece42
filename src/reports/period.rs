use anyhow::{anyhow, Result};
use chrono::{Datelike, Months, NaiveDate};
use rusqlite::Connection;

use crate::db;
use crate::error::TallyError;

/// Chart window selectable from the command line
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Period {
    Mtd,     // Month-to-date
    Qtd,     // Quarter-to-date
    Ytd,     // Year-to-date
    OneYear, // Last 12 calendar months
    AllTime, // Since the first recorded balance
    Custom { from: NaiveDate, to: NaiveDate },
}

/// Resolve a period to inclusive bounds as seen on `today`
pub fn period_dates(period: &Period, conn: &Connection, today: NaiveDate) -> Result<(NaiveDate, NaiveDate)> {
    let (start, end) = match period {
        Period::Mtd => {
            let start = today
                .with_day(1)
                .ok_or_else(|| anyhow!("Invalid current month"))?;
            (start, today)
        }
        Period::Qtd => {
            let quarter_start_month = ((today.month() - 1) / 3) * 3 + 1;
            let start = NaiveDate::from_ymd_opt(today.year(), quarter_start_month, 1)
                .ok_or_else(|| anyhow!("Invalid quarter start"))?;
            (start, today)
        }
        Period::Ytd => {
            let start = NaiveDate::from_ymd_opt(today.year(), 1, 1)
                .ok_or_else(|| anyhow!("Invalid year start"))?;
            (start, today)
        }
        Period::OneYear => {
            let start = today
                .checked_sub_months(Months::new(12))
                .ok_or_else(|| anyhow!("Failed to compute one-year start"))?;
            (start, today)
        }
        Period::AllTime => {
            let start = db::get_earliest_balance_date(conn)?.unwrap_or(today);
            (start.min(today), today)
        }
        Period::Custom { from, to } => {
            if from > to {
                return Err(TallyError::InvalidRange {
                    from: *from,
                    to: *to,
                }
                .into());
            }
            (*from, *to)
        }
    };

    Ok((start, end))
}
