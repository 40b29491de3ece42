//! Milestone command dispatcher implementation

use anyhow::Result;
use colored::Colorize;

use super::{open_store, print_json};
use crate::cli::formatters::format_milestones_table;
use crate::cli::MilestoneCommands;
use crate::db::{self, NewMilestone};
use crate::utils::parse_date;

pub async fn dispatch_milestones(action: MilestoneCommands, json_output: bool) -> Result<()> {
    match action {
        MilestoneCommands::Add {
            date,
            label,
            account,
        } => {
            let input = NewMilestone {
                date: parse_date(&date)?,
                label,
                account_id: account,
            };
            let (_config, conn) = open_store()?;
            let milestone = db::create_milestone(&conn, &input)?;

            if json_output {
                return print_json(&milestone);
            }
            println!(
                "{} Milestone '{}' on {} ({})",
                "✓".green().bold(),
                milestone.label,
                milestone.date,
                milestone.id
            );
            Ok(())
        }

        MilestoneCommands::List { from, to } => {
            let from = from.as_deref().map(parse_date).transpose()?;
            let to = to.as_deref().map(parse_date).transpose()?;

            let (_config, conn) = open_store()?;
            let milestones = db::list_milestones(&conn, from, to)?;

            if json_output {
                return print_json(&milestones);
            }
            if milestones.is_empty() {
                println!("\n{} No milestones found\n", "ℹ".blue().bold());
                return Ok(());
            }
            println!("{}", format_milestones_table(&milestones));
            Ok(())
        }

        MilestoneCommands::Delete { id } => {
            let (_config, conn) = open_store()?;
            db::delete_milestone(&conn, &id)?;

            if json_output {
                return print_json(&serde_json::json!({ "deleted": id }));
            }
            println!("{} Deleted milestone {}", "✓".green().bold(), id);
            Ok(())
        }
    }
}
