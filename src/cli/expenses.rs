use colored::Colorize;

use crate::cli::{report, today, Context};
use crate::error::{CarnetError, Result};
use crate::fmt::money;
use crate::input::{sanitize_text, validate_amount, validate_date};
use crate::models::ExpenseRecord;
use crate::reports;
use crate::schema::Schema;
use crate::store;

pub const NO_DESCRIPTION: &str = "No description";

/// Append `record` to the live file and echo it back.
pub fn save(ctx: &Context, record: &ExpenseRecord) -> Result<()> {
    let schema = store::append(&ctx.settings.expenses_file(), ctx.settings.live_schema(), record)?;
    tracing::debug!(?schema, date = %record.date_str(), amount = record.amount, "expense appended");

    println!("{}", "Expense added.".green());
    println!("  Date:        {}", record.date_str());
    println!("  Account:     {}", record.account);
    match &record.subcategory {
        Some(sub) => println!("  Category:    {} / {sub}", record.category),
        None => println!("  Category:    {}", record.category),
    }
    println!("  Description: {}", record.description);
    println!("  Amount:      {}", money(record.amount));
    Ok(())
}

/// Non-interactive entry. Unknown accounts and categories are coerced; a bad
/// date or amount is an error since there is nobody to ask again.
pub fn add(
    ctx: &Context,
    amount: &str,
    date: Option<&str>,
    account: Option<&str>,
    category: Option<&str>,
    subcategory: Option<&str>,
    description: &str,
) -> Result<()> {
    let amount = validate_amount(amount)
        .ok_or_else(|| CarnetError::Other(format!("Invalid amount '{amount}'")))?;
    let date = match date {
        Some(d) => validate_date(d)
            .ok_or_else(|| CarnetError::Other(format!("Invalid date '{d}' (expected dd/mm/yyyy)")))?,
        None => today(),
    };

    let account = match account {
        Some(a) => ctx.taxonomy.account_from_input(a),
        None => ctx.taxonomy.coerce_account(ctx.taxonomy.primary_account()),
    };
    if account.defaulted {
        println!("{}", format!("Unknown account, using {}.", account.value).yellow());
    }
    let category = match category {
        Some(c) => ctx.taxonomy.category_from_input(c),
        None => ctx.taxonomy.coerce_category(ctx.taxonomy.default_category()),
    };
    if category.defaulted {
        println!("{}", format!("Unknown category, using {}.", category.value).yellow());
    }

    let subcategory = match ctx.settings.live_schema() {
        Schema::Detailed => subcategory.map(sanitize_text).filter(|s| !s.is_empty()),
        _ => None,
    };
    let description = sanitize_text(description);

    let record = ExpenseRecord {
        date,
        account: account.value,
        category: category.value,
        subcategory,
        description: if description.is_empty() {
            NO_DESCRIPTION.to_string()
        } else {
            description
        },
        amount,
    };
    save(ctx, &record)
}

pub fn recent(ctx: &Context, limit: usize) -> Result<()> {
    let records = ctx.live_records()?;
    if records.is_empty() {
        println!("No expenses found.");
        return Ok(());
    }
    let rows = reports::recent(&records, limit);
    println!("Recent expenses (last {})\n{}", rows.len(), report::format_recent(&rows));
    Ok(())
}
