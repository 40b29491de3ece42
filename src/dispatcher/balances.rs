//! Balance command dispatcher implementation

use anyhow::Result;
use colored::Colorize;

use super::{open_store, print_json};
use crate::cli::formatters::format_balances_table;
use crate::cli::BalanceCommands;
use crate::db::{self, BalanceUpdate, NewBalance};
use crate::error::TallyError;
use crate::utils::{format_amount, format_money, parse_amount, parse_date};

pub async fn dispatch_balances(action: BalanceCommands, json_output: bool) -> Result<()> {
    match action {
        BalanceCommands::Set {
            account_id,
            date,
            balance,
            notes,
        } => {
            let input = NewBalance {
                account_id,
                date: parse_date(&date)?,
                balance: parse_amount(&balance)?,
                notes,
            };

            let (_config, conn) = open_store()?;
            let account = db::get_account(&conn, &input.account_id)?;
            let entry = db::upsert_balance(&conn, &input)?;

            if json_output {
                return print_json(&entry);
            }
            println!(
                "{} {} on {}: {}",
                "✓".green().bold(),
                account.name,
                entry.date,
                format_money(entry.balance, &account.currency)
            );
            Ok(())
        }

        BalanceCommands::List { account_id } => {
            let (_config, conn) = open_store()?;
            let account = db::get_account(&conn, &account_id)?;
            let entries = db::list_balances(&conn, &account_id)?;

            if json_output {
                return print_json(&entries);
            }
            if entries.is_empty() {
                println!(
                    "\n{} No balances recorded for '{}'\n",
                    "ℹ".blue().bold(),
                    account.name
                );
                return Ok(());
            }
            println!("{}", format_balances_table(&account, &entries));
            Ok(())
        }

        BalanceCommands::Update { id, balance, notes } => {
            if balance.is_none() && notes.is_none() {
                return Err(TallyError::ValidationError(
                    "nothing to update; pass --balance and/or --notes".into(),
                )
                .into());
            }
            let update = BalanceUpdate {
                balance: balance.as_deref().map(parse_amount).transpose()?,
                notes,
            };

            let (_config, conn) = open_store()?;
            let entry = db::update_balance(&conn, &id, &update)?;

            if json_output {
                return print_json(&entry);
            }
            println!(
                "{} Balance on {} is now {}",
                "✓".green().bold(),
                entry.date,
                format_amount(entry.balance)
            );
            Ok(())
        }

        BalanceCommands::Delete { id } => {
            let (_config, conn) = open_store()?;
            let entry = db::get_balance(&conn, &id)?;
            db::delete_balance(&conn, &id)?;

            if json_output {
                return print_json(&serde_json::json!({ "deleted": id }));
            }
            println!("{} Deleted balance on {}", "✓".green().bold(), entry.date);
            Ok(())
        }
    }
}
