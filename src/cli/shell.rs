//! Numbered menu loop. Every entry calls the same code as its subcommand.

use std::io::IsTerminal;

use chrono::NaiveDate;
use colored::Colorize;

use crate::cli::prompt::{Prompt, ScriptPrompt, TerminalPrompt};
use crate::cli::{archive, expenses, report, summary, today, Context};
use crate::error::Result;
use crate::input::{sanitize_text, validate_amount, validate_date, validate_month};
use crate::models::{ExpenseRecord, YearMonth, DATE_FORMAT};
use crate::schema::Schema;

const MENU: [&str; 11] = [
    "Add new expense",
    "View recent expenses",
    "Monthly summary",
    "Spending trends",
    "Category analysis",
    "Account comparison",
    "Spending insights",
    "Budget summary (JSON)",
    "Export chart data",
    "Archive month",
    "Exit",
];

#[derive(Debug, PartialEq)]
enum Flow {
    Continue,
    Quit,
}

pub fn run(ctx: &Context) -> Result<()> {
    if std::io::stdin().is_terminal() {
        run_with(ctx, &mut TerminalPrompt, today())
    } else {
        let stdin = std::io::stdin();
        run_with(ctx, &mut ScriptPrompt::new(stdin.lock()), today())
    }
}

pub fn run_with<P: Prompt>(ctx: &Context, prompt: &mut P, today: NaiveDate) -> Result<()> {
    loop {
        print_menu();
        let Some(choice) = prompt.ask(&format!("Select an option (1-{})", MENU.len()), None)? else {
            break;
        };
        let flow = match choice.as_str() {
            "1" => add_expense(ctx, prompt, today)?,
            "2" => {
                expenses::recent(ctx, 10)?;
                Flow::Continue
            }
            "3" => match ask_month(prompt, "Month (YYYY-MM) or Enter for the whole file")? {
                Some(month) => {
                    report::monthly(ctx, month)?;
                    Flow::Continue
                }
                None => Flow::Quit,
            },
            "4" => match prompt.ask("Number of months to analyze", Some("6"))? {
                Some(raw) => {
                    report::trends(ctx, raw.parse().unwrap_or(6))?;
                    Flow::Continue
                }
                None => Flow::Quit,
            },
            "5" => {
                report::categories(ctx)?;
                Flow::Continue
            }
            "6" => {
                report::accounts(ctx)?;
                Flow::Continue
            }
            "7" => {
                report::insights(ctx)?;
                Flow::Continue
            }
            "8" => budget_summary(ctx, prompt, today)?,
            "9" => {
                summary::charts(ctx)?;
                Flow::Continue
            }
            "10" => {
                archive::run(ctx, today)?;
                Flow::Continue
            }
            "11" => Flow::Quit,
            _ => {
                println!("{}", format!("Invalid choice. Please select 1-{}.", MENU.len()).red());
                Flow::Continue
            }
        };
        if flow == Flow::Quit {
            break;
        }
    }
    println!("Goodbye!");
    Ok(())
}

fn print_menu() {
    println!();
    println!("{}", "=".repeat(40));
    println!("{}", "EXPENSE TRACKER".bold());
    println!("{}", "=".repeat(40));
    for (i, item) in MENU.iter().enumerate() {
        println!("{:>2}. {item}", i + 1);
    }
    println!("{}", "=".repeat(40));
}

fn print_choices(title: &str, items: &[String]) {
    println!("\n{title}:");
    for (i, item) in items.iter().enumerate() {
        println!("  {}. {item}", i + 1);
    }
}

/// `Ok(None)` when input ended; `Ok(Some(None))` for an empty or invalid
/// month, which means no filter.
fn ask_month<P: Prompt>(prompt: &mut P, label: &str) -> Result<Option<Option<YearMonth>>> {
    let Some(raw) = prompt.ask(label, None)? else {
        return Ok(None);
    };
    if raw.is_empty() {
        return Ok(Some(None));
    }
    let month = validate_month(&raw);
    if month.is_none() {
        println!("{}", "Invalid month format, ignoring it.".yellow());
    }
    Ok(Some(month))
}

fn add_expense<P: Prompt>(ctx: &Context, prompt: &mut P, today: NaiveDate) -> Result<Flow> {
    let taxonomy = &ctx.taxonomy;
    let default_date = today.format(DATE_FORMAT).to_string();

    let Some(raw) = prompt.ask("Date (dd/mm/yyyy)", Some(&default_date))? else {
        return Ok(Flow::Quit);
    };
    let date = validate_date(&raw).unwrap_or_else(|| {
        println!("{}", format!("Invalid date, using {default_date}.").yellow());
        today
    });

    print_choices("Accounts", taxonomy.accounts());
    let Some(raw) = prompt.ask(&format!("Account number (1-{})", taxonomy.accounts().len()), None)? else {
        return Ok(Flow::Quit);
    };
    let account = taxonomy.account_from_input(&raw);
    if account.defaulted {
        println!("{}", format!("Invalid choice, using {}.", account.value).yellow());
    }

    print_choices("Categories", taxonomy.categories());
    let Some(raw) = prompt.ask(&format!("Category number (1-{})", taxonomy.categories().len()), None)? else {
        return Ok(Flow::Quit);
    };
    let category = taxonomy.category_from_input(&raw);
    if category.defaulted {
        println!("{}", format!("Invalid choice, using {}.", category.value).yellow());
    }

    let subcategory = if ctx.settings.live_schema() == Schema::Detailed {
        let Some(raw) = prompt.ask("Subcategory (Enter to skip)", None)? else {
            return Ok(Flow::Quit);
        };
        Some(sanitize_text(&raw)).filter(|s| !s.is_empty())
    } else {
        None
    };

    let Some(raw) = prompt.ask("Description", None)? else {
        return Ok(Flow::Quit);
    };
    let description = match sanitize_text(&raw) {
        d if d.is_empty() => expenses::NO_DESCRIPTION.to_string(),
        d => d,
    };

    let amount = loop {
        let Some(raw) = prompt.ask("Amount (€)", None)? else {
            return Ok(Flow::Quit);
        };
        match validate_amount(&raw) {
            Some(a) => break a,
            None => println!("{}", "Invalid amount. Please enter a positive number.".red()),
        }
    };

    let record = ExpenseRecord {
        date,
        account: account.value,
        category: category.value,
        subcategory,
        description,
        amount,
    };
    expenses::save(ctx, &record)?;
    Ok(Flow::Continue)
}

fn budget_summary<P: Prompt>(ctx: &Context, prompt: &mut P, today: NaiveDate) -> Result<Flow> {
    let Some(month) = ask_month(prompt, "Month (YYYY-MM) or Enter for the current month")? else {
        return Ok(Flow::Quit);
    };
    let month = month.unwrap_or_else(|| YearMonth::of(today));
    print_choices("Accounts", ctx.taxonomy.accounts());
    let Some(raw) = prompt.ask("Account number, or Enter for all accounts", None)? else {
        return Ok(Flow::Quit);
    };
    let account = if raw.is_empty() { None } else { Some(raw.as_str()) };
    summary::json(ctx, account, Some(month))?;
    Ok(Flow::Continue)
}
