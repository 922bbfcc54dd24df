pub mod archive;
pub mod expenses;
pub mod import;
pub mod init;
pub mod prompt;
pub mod report;
pub mod shell;
pub mod status;
pub mod summary;

use clap::{Parser, Subcommand};
use colored::Colorize;

use crate::budget::BudgetStructure;
use crate::error::Result;
use crate::input::validate_month;
use crate::models::{ExpenseRecord, YearMonth};
use crate::settings::{load_settings, Settings};
use crate::store;
use crate::taxonomy::Taxonomy;

/// Settings and taxonomy for one invocation, shared by every command.
pub struct Context {
    pub settings: Settings,
    pub taxonomy: Taxonomy,
}

impl Context {
    pub fn new(settings: Settings) -> Self {
        let taxonomy = Taxonomy::from_settings(&settings);
        Self { settings, taxonomy }
    }

    pub fn load() -> Self {
        Self::new(load_settings())
    }

    /// Records of the live file.
    pub fn live_records(&self) -> Result<Vec<ExpenseRecord>> {
        let loaded = store::load(&self.settings.expenses_file())?;
        warn_skipped(loaded.skipped);
        Ok(loaded.records)
    }

    /// Every archived record followed by the live file.
    pub fn all_records(&self) -> Result<Vec<ExpenseRecord>> {
        let mut paths = store::history_files(&self.settings.history_dir())?;
        paths.push(self.settings.expenses_file());
        let loaded = store::load_many(&paths)?;
        warn_skipped(loaded.skipped);
        Ok(loaded.records)
    }

    pub fn budget(&self) -> BudgetStructure {
        BudgetStructure::load_or_taxonomy(&self.settings.budget_file(), &self.taxonomy)
    }

    /// An `--account` value (menu number or name) mapped onto the taxonomy.
    pub fn resolve_account(&self, input: Option<&str>) -> Option<String> {
        input.map(|a| {
            let choice = self.taxonomy.account_from_input(a);
            if choice.defaulted {
                println!("Unknown account, using {}.", choice.value);
            }
            choice.value
        })
    }
}

pub(crate) fn warn_skipped(skipped: usize) {
    if skipped > 0 {
        let noun = if skipped == 1 { "row" } else { "rows" };
        eprintln!(
            "{}",
            format!("Warning: skipped {skipped} malformed {noun}").yellow()
        );
    }
}

/// `YYYY-MM` from the command line; anything else means no month.
pub(crate) fn parse_month_opt(month: &Option<String>) -> Option<YearMonth> {
    let parsed = month.as_deref().and_then(validate_month);
    if month.is_some() && parsed.is_none() {
        println!("{}", "Invalid month format, ignoring it.".yellow());
    }
    parsed
}

pub(crate) fn today() -> chrono::NaiveDate {
    chrono::Local::now().date_naive()
}

#[derive(Parser)]
#[command(name = "carnet", about = "Household expense tracker on plain CSV files.")]
pub struct Cli {
    #[command(subcommand)]
    pub command: Option<Commands>,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Set up carnet: choose a data directory and create the live file.
    Init {
        /// Path for carnet data (default: ~/Documents/carnet)
        #[arg(long = "data-dir")]
        data_dir: Option<String>,
    },
    /// Record a new expense.
    Add {
        /// Amount, e.g. 12.50 or 12,50
        amount: String,
        /// Date as dd/mm/yyyy (default: today)
        #[arg(long)]
        date: Option<String>,
        /// Account name or number
        #[arg(long)]
        account: Option<String>,
        /// Category name or number
        #[arg(long)]
        category: Option<String>,
        /// Subcategory (detailed schema only)
        #[arg(long)]
        subcategory: Option<String>,
        /// Free-text description
        #[arg(long, default_value = "")]
        description: String,
    },
    /// Show the most recent expenses of the live file.
    Recent {
        #[arg(long, default_value = "10")]
        limit: usize,
    },
    /// Print reports.
    Report {
        #[command(subcommand)]
        command: ReportCommands,
    },
    /// Write summary files.
    Summary {
        #[command(subcommand)]
        command: SummaryCommands,
    },
    /// Export chart-ready series of every record as JSON.
    Charts,
    /// Move the live file into History and start a new one.
    Archive,
    /// Import a legacy Date,Account,Category,Amount file.
    Import {
        /// Path to the legacy CSV file
        file: String,
    },
    /// Show data locations and record counts.
    Status,
}

#[derive(Subcommand)]
pub enum ReportCommands {
    /// Per-account category breakdown of the live file.
    Monthly {
        /// Month: YYYY-MM (default: the whole live file)
        #[arg(long)]
        month: Option<String>,
    },
    /// Spending over the last months, history included.
    Trends {
        #[arg(long, default_value = "6")]
        months: u32,
    },
    /// Total, average and count per category.
    Categories,
    /// Totals per account and a category x account table.
    Accounts,
    /// Spending habits and recommendations.
    Insights,
    /// Fixed charges against actual spending.
    Budget {
        #[arg(long)]
        account: Option<String>,
        /// Month: YYYY-MM (default: current month)
        #[arg(long)]
        month: Option<String>,
    },
}

#[derive(Subcommand)]
pub enum SummaryCommands {
    /// Category/subcategory totals as JSON.
    Json {
        #[arg(long)]
        account: Option<String>,
        /// Month: YYYY-MM (default: current month)
        #[arg(long)]
        month: Option<String>,
    },
    /// One Month,Categorie,Montant file per account and month.
    Csv {
        /// Month: YYYY-MM (default: every month of the live file)
        #[arg(long)]
        month: Option<String>,
    },
}
