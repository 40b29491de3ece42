//! Summary statistics over the full net worth history

use anyhow::Result;
use chrono::{Datelike, Local, Months, NaiveDate};
use itertools::Itertools;
use rusqlite::Connection;
use rust_decimal::{Decimal, RoundingStrategy};
use serde::Serialize;
use tracing::debug;

use super::net_worth::{chart_data_between, ChartDataPoint};

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct NetWorthStats {
    pub ytd_change: Decimal,
    pub ytd_change_percent: Decimal,
    pub monthly_avg_change: Decimal,
    pub all_time_high: Decimal,
    pub all_time_high_date: NaiveDate,
    pub one_year_return: Decimal,
    pub one_year_return_percent: Decimal,
}

impl NetWorthStats {
    /// Result for a history with no observations
    pub fn empty(today: NaiveDate) -> Self {
        Self {
            ytd_change: Decimal::ZERO,
            ytd_change_percent: Decimal::ZERO,
            monthly_avg_change: Decimal::ZERO,
            all_time_high: Decimal::ZERO,
            all_time_high_date: today,
            one_year_return: Decimal::ZERO,
            one_year_return_percent: Decimal::ZERO,
        }
    }
}

/// Compute statistics for an ascending series as seen on `today`.
///
/// YTD and one-year figures are measured from the first point on or after
/// the period start. When history does not reach back that far the first
/// point of the series is used instead, so both degrade to "since the
/// beginning". A zero baseline reports 0%.
///
/// The monthly average is the plain mean of point-to-point changes; it does
/// not weight by the time between observations.
pub fn compute_stats(series: &[ChartDataPoint], today: NaiveDate) -> NetWorthStats {
    let (Some(first), Some(current)) = (series.first(), series.last()) else {
        return NetWorthStats::empty(today);
    };

    let year_start = today.with_ordinal(1).unwrap_or(first.date);
    let ytd_base = first_on_or_after(series, year_start).unwrap_or(first);
    let (ytd_change, ytd_change_percent) = change_between(ytd_base, current);

    let year_ago = today
        .checked_sub_months(Months::new(12))
        .unwrap_or(first.date);
    let one_year_base = first_on_or_after(series, year_ago).unwrap_or(first);
    let (one_year_return, one_year_return_percent) = change_between(one_year_base, current);

    // Strictly greater keeps the earliest date on ties
    let high = series.iter().fold(first, |best, point| {
        if point.net_worth > best.net_worth {
            point
        } else {
            best
        }
    });

    NetWorthStats {
        ytd_change,
        ytd_change_percent,
        monthly_avg_change: average_change(series),
        all_time_high: high.net_worth,
        all_time_high_date: high.date,
        one_year_return,
        one_year_return_percent,
    }
}

fn first_on_or_after(series: &[ChartDataPoint], date: NaiveDate) -> Option<&ChartDataPoint> {
    series.iter().find(|p| p.date >= date)
}

/// Absolute change and percent of the baseline magnitude (1 dp)
fn change_between(base: &ChartDataPoint, current: &ChartDataPoint) -> (Decimal, Decimal) {
    let change = current.net_worth - base.net_worth;
    let denominator = base.net_worth.abs();
    if denominator.is_zero() {
        return (change, Decimal::ZERO);
    }

    let percent = change
        .checked_div(denominator)
        .and_then(|ratio| ratio.checked_mul(Decimal::ONE_HUNDRED))
        .map(|p| p.round_dp_with_strategy(1, RoundingStrategy::MidpointAwayFromZero))
        .unwrap_or(Decimal::ZERO);
    (change, percent)
}

/// Mean of consecutive deltas, rounded to whole units
fn average_change(series: &[ChartDataPoint]) -> Decimal {
    let deltas: Vec<Decimal> = series
        .iter()
        .tuple_windows()
        .map(|(prev, next)| next.net_worth - prev.net_worth)
        .collect();

    if deltas.is_empty() {
        return Decimal::ZERO;
    }

    let total: Decimal = deltas.iter().copied().sum();
    (total / Decimal::from(deltas.len()))
        .round_dp_with_strategy(0, RoundingStrategy::MidpointAwayFromZero)
}

/// Statistics over the whole stored history as of `today`, together with
/// the latest point they were measured against (`None` without history)
pub fn net_worth_stats_as_of(
    conn: &Connection,
    today: NaiveDate,
) -> Result<(NetWorthStats, Option<ChartDataPoint>)> {
    let series = chart_data_between(conn, NaiveDate::MIN, today)?;
    debug!("Computing net worth statistics over {} points", series.len());
    let stats = compute_stats(&series, today);
    Ok((stats, series.last().cloned()))
}

/// Statistics over the whole stored history as of the local current date
pub fn get_net_worth_stats(conn: &Connection) -> Result<NetWorthStats> {
    let (stats, _current) = net_worth_stats_as_of(conn, Local::now().date_naive())?;
    Ok(stats)
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    fn date(s: &str) -> NaiveDate {
        NaiveDate::parse_from_str(s, "%Y-%m-%d").unwrap()
    }

    fn series(points: &[(&str, Decimal)]) -> Vec<ChartDataPoint> {
        points
            .iter()
            .map(|(d, nw)| ChartDataPoint {
                date: date(d),
                assets: *nw,
                liabilities: Decimal::ZERO,
                net_worth: *nw,
            })
            .collect()
    }

    #[test]
    fn test_empty_series_is_zeroed() {
        let today = date("2024-06-15");
        let stats = compute_stats(&[], today);
        assert_eq!(stats, NetWorthStats::empty(today));
        assert_eq!(stats.all_time_high_date, today);
        assert_eq!(stats.monthly_avg_change, Decimal::ZERO);
    }

    #[test]
    fn test_all_time_high_first_occurrence_wins() {
        let s = series(&[
            ("2024-01-01", dec!(100)),
            ("2024-02-01", dec!(150)),
            ("2024-03-01", dec!(150)),
            ("2024-04-01", dec!(120)),
        ]);
        let stats = compute_stats(&s, date("2024-06-01"));
        assert_eq!(stats.all_time_high, dec!(150));
        assert_eq!(stats.all_time_high_date, date("2024-02-01"));
    }

    #[test]
    fn test_all_time_high_with_only_negative_values() {
        let s = series(&[("2024-01-01", dec!(-300)), ("2024-02-01", dec!(-100))]);
        let stats = compute_stats(&s, date("2024-06-01"));
        assert_eq!(stats.all_time_high, dec!(-100));
        assert_eq!(stats.all_time_high_date, date("2024-02-01"));
    }

    #[test]
    fn test_monthly_average_is_mean_of_deltas() {
        let s = series(&[
            ("2024-01-01", dec!(1000)),
            ("2024-02-01", dec!(1100)),
            ("2024-03-01", dec!(1050)),
        ]);
        let stats = compute_stats(&s, date("2024-06-01"));
        // (100 + -50) / 2
        assert_eq!(stats.monthly_avg_change, dec!(25));

        let falling = series(&[
            ("2024-01-01", dec!(1100)),
            ("2024-02-01", dec!(1000)),
            ("2024-03-01", dec!(1050)),
        ]);
        let stats = compute_stats(&falling, date("2024-06-01"));
        assert_eq!(stats.monthly_avg_change, dec!(-25));
    }

    #[test]
    fn test_monthly_average_ignores_time_gaps_and_rounds() {
        // 10 over one day then 1 over a year: mean of deltas, not per month
        let s = series(&[
            ("2023-01-01", dec!(0)),
            ("2023-01-02", dec!(10)),
            ("2024-01-02", dec!(11)),
        ]);
        let stats = compute_stats(&s, date("2024-06-01"));
        assert_eq!(stats.monthly_avg_change, dec!(6)); // 5.5 rounds away from zero
    }

    #[test]
    fn test_single_point_has_no_average_change() {
        let s = series(&[("2024-01-01", dec!(500))]);
        let stats = compute_stats(&s, date("2024-06-01"));
        assert_eq!(stats.monthly_avg_change, Decimal::ZERO);
        assert_eq!(stats.ytd_change, Decimal::ZERO);
        assert_eq!(stats.all_time_high, dec!(500));
    }

    #[test]
    fn test_ytd_uses_first_point_of_current_year() {
        let s = series(&[
            ("2023-12-01", dec!(800)),
            ("2024-01-15", dec!(1000)),
            ("2024-05-01", dec!(1250)),
        ]);
        let stats = compute_stats(&s, date("2024-06-01"));
        assert_eq!(stats.ytd_change, dec!(250));
        assert_eq!(stats.ytd_change_percent, dec!(25.0));
    }

    #[test]
    fn test_ytd_falls_back_to_first_point() {
        // No point in the current year: fall back to the start of history
        let s = series(&[("2022-03-01", dec!(400)), ("2023-03-01", dec!(500))]);
        let stats = compute_stats(&s, date("2024-06-01"));
        assert_eq!(stats.ytd_change, dec!(100));
        assert_eq!(stats.ytd_change_percent, dec!(25.0));
    }

    #[test]
    fn test_zero_baseline_reports_zero_percent() {
        let s = series(&[("2024-01-01", dec!(0)), ("2024-02-01", dec!(300))]);
        let stats = compute_stats(&s, date("2024-06-01"));
        assert_eq!(stats.ytd_change, dec!(300));
        assert_eq!(stats.ytd_change_percent, Decimal::ZERO);
    }

    #[test]
    fn test_percent_uses_baseline_magnitude() {
        // From -1000 to -500 is an improvement: +50%
        let s = series(&[("2024-01-01", dec!(-1000)), ("2024-02-01", dec!(-500))]);
        let stats = compute_stats(&s, date("2024-06-01"));
        assert_eq!(stats.ytd_change, dec!(500));
        assert_eq!(stats.ytd_change_percent, dec!(50.0));
    }

    #[test]
    fn test_percent_rounds_to_one_decimal() {
        let s = series(&[("2024-01-01", dec!(3)), ("2024-02-01", dec!(4))]);
        let stats = compute_stats(&s, date("2024-06-01"));
        assert_eq!(stats.ytd_change_percent, dec!(33.3));
    }

    #[test]
    fn test_one_year_return_reference_point() {
        let s = series(&[
            ("2023-01-01", dec!(100)),
            ("2023-06-01", dec!(200)),
            ("2023-07-01", dec!(250)),
            ("2024-06-01", dec!(300)),
        ]);
        // A year before 2024-06-15 is 2023-06-15: first point after is 2023-07-01
        let stats = compute_stats(&s, date("2024-06-15"));
        assert_eq!(stats.one_year_return, dec!(50));
        assert_eq!(stats.one_year_return_percent, dec!(20.0));
        // YTD has no 2024 point before June, so it starts at 2024-06-01 itself
        assert_eq!(stats.ytd_change, Decimal::ZERO);
    }

    #[test]
    fn test_one_year_return_on_leap_day() {
        let s = series(&[("2023-02-28", dec!(100)), ("2024-02-29", dec!(110))]);
        let stats = compute_stats(&s, date("2024-02-29"));
        assert_eq!(stats.one_year_return, dec!(10));
        assert_eq!(stats.one_year_return_percent, dec!(10.0));
    }

    #[test]
    fn test_stats_from_empty_database() {
        let conn = Connection::open_in_memory().unwrap();
        crate::db::apply_schema(&conn).unwrap();
        let today = date("2024-06-15");
        let (stats, current) = net_worth_stats_as_of(&conn, today).unwrap();
        assert_eq!(stats, NetWorthStats::empty(today));
        assert_eq!(current, None);
    }

    #[test]
    fn test_stats_serialize_camel_case() {
        let stats = NetWorthStats::empty(date("2024-06-15"));
        let json = serde_json::to_value(&stats).unwrap();
        for key in [
            "ytdChange",
            "ytdChangePercent",
            "monthlyAvgChange",
            "allTimeHigh",
            "allTimeHighDate",
            "oneYearReturn",
            "oneYearReturnPercent",
        ] {
            assert!(json.get(key).is_some(), "missing {}", key);
        }
    }
}
