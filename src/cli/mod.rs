use clap::{Parser, Subcommand};

pub mod formatters;

#[derive(Parser)]
#[command(name = "tally")]
#[command(version, about = "Local net worth tracker for assets and liabilities")]
#[command(
    long_about = "Record point-in-time balances for savings, pensions, property, mortgages, loans and credit cards, then follow your net worth over time."
)]
pub struct Cli {
    /// Disable colorized/ANSI output
    #[arg(long = "no-color", global = true)]
    pub no_color: bool,

    /// Output results in JSON format
    #[arg(long = "json", global = true)]
    pub json: bool,

    #[command(subcommand)]
    pub command: Option<Commands>,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Manage accounts (assets and liabilities)
    Accounts {
        #[command(subcommand)]
        action: AccountCommands,
    },

    /// Record and edit account balances
    Balances {
        #[command(subcommand)]
        action: BalanceCommands,
    },

    /// Net worth history and statistics
    Networth {
        #[command(subcommand)]
        action: NetworthCommands,
    },

    /// Labelled dates shown alongside the net worth history
    Milestones {
        #[command(subcommand)]
        action: MilestoneCommands,
    },

    /// Show the resolved data directory, database path and defaults
    Config,
}

#[derive(Subcommand)]
pub enum AccountCommands {
    /// Create an account
    Add {
        /// Display name
        name: String,

        /// Account type: property, pension, investment, savings, mortgage, loan, credit_card
        #[arg(short = 't', long = "type")]
        account_type: String,

        /// Bank or provider
        #[arg(short, long)]
        institution: Option<String>,

        /// Free-text description
        #[arg(short, long)]
        description: Option<String>,

        /// ISO currency code (defaults to the configured currency)
        #[arg(short, long)]
        currency: Option<String>,
    },

    /// List accounts with their latest balance
    List {
        /// Include inactive accounts
        #[arg(short, long)]
        all: bool,
    },

    /// Update account details
    Update {
        /// Account id
        id: String,

        #[arg(long)]
        name: Option<String>,

        /// New institution (empty string clears it)
        #[arg(long)]
        institution: Option<String>,

        /// New description (empty string clears it)
        #[arg(long)]
        description: Option<String>,

        #[arg(long)]
        currency: Option<String>,

        /// Mark the account active or inactive (true/false)
        #[arg(long, action = clap::ArgAction::Set, value_parser = clap::value_parser!(bool))]
        active: Option<bool>,
    },

    /// Delete an account and all of its balances
    Delete {
        /// Account id
        id: String,
    },
}

#[derive(Subcommand)]
pub enum BalanceCommands {
    /// Record a balance (replaces any balance on the same date)
    Set {
        /// Account id
        account_id: String,

        /// Observation date (YYYY-MM-DD)
        date: String,

        /// Balance amount; liabilities are usually negative
        #[arg(allow_negative_numbers = true)]
        balance: String,

        /// Optional note
        #[arg(short, long)]
        notes: Option<String>,
    },

    /// List an account's balance history
    List {
        /// Account id
        account_id: String,
    },

    /// Change the amount or note of a balance entry
    Update {
        /// Balance entry id
        id: String,

        #[arg(long, allow_negative_numbers = true)]
        balance: Option<String>,

        /// New note (empty string clears it)
        #[arg(long)]
        notes: Option<String>,
    },

    /// Delete a balance entry
    Delete {
        /// Balance entry id
        id: String,
    },
}

#[derive(Subcommand)]
pub enum NetworthCommands {
    /// Show assets, liabilities and net worth on each observation date
    Chart {
        /// Period: MTD, QTD, YTD, 1Y, ALL, YYYY, or from:to (YYYY-MM-DD:YYYY-MM-DD)
        #[arg(default_value = "ALL")]
        period: String,

        /// Write the series to a CSV file
        #[arg(long)]
        export: Option<String>,
    },

    /// Show year-to-date change, one-year return, all-time high and average change
    Stats,
}

#[derive(Subcommand)]
pub enum MilestoneCommands {
    /// Add a milestone
    Add {
        /// Date (YYYY-MM-DD)
        date: String,

        /// Label shown next to the chart
        label: String,

        /// Related account id
        #[arg(short, long)]
        account: Option<String>,
    },

    /// List milestones
    List {
        /// Start date (YYYY-MM-DD)
        #[arg(short, long)]
        from: Option<String>,

        /// End date (YYYY-MM-DD)
        #[arg(short, long)]
        to: Option<String>,
    },

    /// Delete a milestone
    Delete {
        /// Milestone id
        id: String,
    },
}
