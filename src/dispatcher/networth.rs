//! Net worth command dispatcher implementation

use anyhow::{anyhow, Context, Result};
use chrono::{Local, NaiveDate};
use colored::Colorize;
use std::path::Path;
use tracing::info;

use super::{open_store, print_json};
use crate::cli::formatters::{format_chart_table, format_stats};
use crate::cli::NetworthCommands;
use crate::db;
use crate::reports::{self, ChartDataPoint, Period};

/// Parse a period string (MTD, QTD, YTD, 1Y, ALL, YYYY, or from:to)
pub fn parse_period_string(period: &str) -> Result<Period> {
    let upper = period.trim().to_uppercase();
    match upper.as_str() {
        "MTD" => Ok(Period::Mtd),
        "QTD" => Ok(Period::Qtd),
        "YTD" => Ok(Period::Ytd),
        "1Y" | "ONEYEAR" => Ok(Period::OneYear),
        "ALL" | "ALLTIME" => Ok(Period::AllTime),
        _ => {
            // YYYY -> YYYY-01-01:YYYY-12-31
            if let Ok(year) = upper.parse::<i32>() {
                if (1900..=2100).contains(&year) {
                    let from = NaiveDate::from_ymd_opt(year, 1, 1)
                        .ok_or_else(|| anyhow!("Invalid year: {}", year))?;
                    let to = NaiveDate::from_ymd_opt(year, 12, 31)
                        .ok_or_else(|| anyhow!("Invalid year: {}", year))?;
                    return Ok(Period::Custom { from, to });
                }
            }

            if let Some((from_str, to_str)) = upper.split_once(':') {
                let from = NaiveDate::parse_from_str(from_str, "%Y-%m-%d").map_err(|_| {
                    anyhow!("Invalid from date: {}. Use YYYY-MM-DD format.", from_str)
                })?;
                let to = NaiveDate::parse_from_str(to_str, "%Y-%m-%d")
                    .map_err(|_| anyhow!("Invalid to date: {}. Use YYYY-MM-DD format.", to_str))?;
                Ok(Period::Custom { from, to })
            } else {
                Err(anyhow!(
                    "Invalid period '{}'. Use: MTD, QTD, YTD, 1Y, ALL, YYYY, or from:to (YYYY-MM-DD:YYYY-MM-DD)",
                    period
                ))
            }
        }
    }
}

pub async fn dispatch_networth(action: NetworthCommands, json_output: bool) -> Result<()> {
    match action {
        NetworthCommands::Chart { period, export } => {
            dispatch_chart(&period, export.as_deref(), json_output).await
        }
        NetworthCommands::Stats => dispatch_stats(json_output).await,
    }
}

async fn dispatch_chart(period_str: &str, export: Option<&str>, json_output: bool) -> Result<()> {
    let period = parse_period_string(period_str)?;
    let (config, conn) = open_store()?;

    let today = Local::now().date_naive();
    let (from, to) = reports::period_dates(&period, &conn, today)?;
    let points = reports::chart_data_between(&conn, from, to)?;

    if let Some(path) = export {
        write_chart_csv(Path::new(path), &points)?;
        info!("Exported {} net worth points to {}", points.len(), path);
        if !json_output {
            println!(
                "{} Exported {} points to {}",
                "✓".green().bold(),
                points.len(),
                path
            );
        }
    }

    if json_output {
        return print_json(&points);
    }

    println!("\n{} Net Worth", "📊".cyan().bold());
    println!("  Period: {} → {}\n", from, to);

    if points.is_empty() {
        println!("{} No net worth data in this period", "ℹ".blue().bold());
        println!("Record a balance with: tally balances set <account-id> <date> <amount>");
        return Ok(());
    }

    let milestones = db::list_milestones(&conn, Some(from), Some(to))?;
    println!(
        "{}",
        format_chart_table(&points, &milestones, &config.default_currency)
    );
    Ok(())
}

async fn dispatch_stats(json_output: bool) -> Result<()> {
    let (config, conn) = open_store()?;

    let today = Local::now().date_naive();
    let (stats, current) = reports::net_worth_stats_as_of(&conn, today)?;

    if json_output {
        return print_json(&stats);
    }

    let Some(current) = current else {
        println!("\n{} No net worth data yet\n", "ℹ".blue().bold());
        return Ok(());
    };
    print!(
        "{}",
        format_stats(&stats, Some(&current), &config.default_currency)
    );
    Ok(())
}

/// Write the series as CSV with a header row
pub fn write_chart_csv(path: &Path, points: &[ChartDataPoint]) -> Result<()> {
    let mut writer = csv::Writer::from_path(path)
        .with_context(|| format!("Failed to create {}", path.display()))?;
    for point in points {
        writer.serialize(point)?;
    }
    writer.flush()?;
    Ok(())
}
