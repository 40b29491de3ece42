//! Account command dispatcher implementation

use anyhow::Result;
use colored::Colorize;

use super::{open_store, print_json};
use crate::cli::formatters::{format_accounts_table, AccountJson};
use crate::cli::AccountCommands;
use crate::db::{self, AccountType, AccountUpdate, NewAccount};
use crate::error::TallyError;

pub async fn dispatch_accounts(action: AccountCommands, json_output: bool) -> Result<()> {
    match action {
        AccountCommands::Add {
            name,
            account_type,
            institution,
            description,
            currency,
        } => {
            let account_type = parse_account_type(&account_type)?;
            let (config, conn) = open_store()?;

            let account = db::create_account(
                &conn,
                &NewAccount {
                    name,
                    account_type,
                    institution,
                    description,
                    currency: currency.or(Some(config.default_currency)),
                },
            )?;

            if json_output {
                return print_json(&AccountJson::from_account(&account));
            }
            println!(
                "{} Created {} account '{}' ({})",
                "✓".green().bold(),
                account.category().as_str(),
                account.name,
                account.id
            );
            Ok(())
        }

        AccountCommands::List { all } => {
            let (_config, conn) = open_store()?;
            let rows = db::list_accounts_with_balances(&conn, all)?;

            if json_output {
                let payload: Vec<AccountJson> = rows
                    .iter()
                    .map(AccountJson::from_account_with_balance)
                    .collect();
                return print_json(&payload);
            }

            if rows.is_empty() {
                println!("\n{} No accounts found\n", "ℹ".blue().bold());
                println!("Add one with: tally accounts add <name> --type savings");
                return Ok(());
            }
            println!("{}", format_accounts_table(&rows));
            Ok(())
        }

        AccountCommands::Update {
            id,
            name,
            institution,
            description,
            currency,
            active,
        } => {
            let update = AccountUpdate {
                name,
                institution,
                description,
                currency,
                is_active: active,
            };
            if update.is_empty() {
                return Err(TallyError::ValidationError(
                    "nothing to update; pass at least one of --name, --institution, --description, --currency, --active".into(),
                )
                .into());
            }

            let (_config, conn) = open_store()?;
            let account = db::update_account(&conn, &id, &update)?;

            if json_output {
                return print_json(&AccountJson::from_account(&account));
            }
            println!(
                "{} Updated account '{}'{}",
                "✓".green().bold(),
                account.name,
                if account.is_active { "" } else { " (inactive)" }
            );
            Ok(())
        }

        AccountCommands::Delete { id } => {
            let (_config, conn) = open_store()?;
            let account = db::get_account(&conn, &id)?;
            db::delete_account(&conn, &id)?;

            if json_output {
                return print_json(&serde_json::json!({ "deleted": id }));
            }
            println!(
                "{} Deleted account '{}' and its balances",
                "✓".green().bold(),
                account.name
            );
            Ok(())
        }
    }
}

fn parse_account_type(raw: &str) -> Result<AccountType> {
    raw.parse::<AccountType>().map_err(|_| {
        let valid: Vec<&str> = AccountType::ALL.iter().map(|t| t.as_str()).collect();
        TallyError::ValidationError(format!(
            "unknown account type '{}'; expected one of: {}",
            raw,
            valid.join(", ")
        ))
        .into()
    })
}
