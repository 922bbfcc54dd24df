use crate::cli::{parse_month_opt, today, Context, SummaryCommands};
use crate::error::Result;
use crate::fmt::money;
use crate::models::YearMonth;
use crate::reports::{self, Filter};
use crate::summary;

/// Category/subcategory totals for one month of the live file, saved as JSON.
pub fn json(ctx: &Context, account: Option<&str>, month: Option<YearMonth>) -> Result<()> {
    let month = month.unwrap_or_else(|| YearMonth::of(today()));
    let account = ctx.resolve_account(account);

    let structure = ctx.budget();
    let grouped = reports::group_by_category(
        &ctx.live_records()?,
        &structure,
        &Filter::new(account.clone(), Some(month)),
    );
    let path = summary::write_json_summary(
        &ctx.settings.summary_dir(),
        account.as_deref(),
        month,
        &grouped,
    )?;
    println!(
        "Total for {} in {month}: {}",
        account.as_deref().unwrap_or("all accounts"),
        money(reports::summary_total(&grouped))
    );
    println!("Summary saved to {}", path.display());
    Ok(())
}

pub fn csv(ctx: &Context, month: Option<YearMonth>) -> Result<()> {
    let records = ctx.live_records()?;
    let written = summary::write_monthly_summaries(
        &ctx.settings.summary_dir(),
        &records,
        ctx.taxonomy.accounts(),
        month,
    )?;
    if written.is_empty() {
        println!("No expenses found.");
    }
    for path in written {
        println!("Summary saved to {}", path.display());
    }
    Ok(())
}

pub fn run(ctx: &Context, cmd: SummaryCommands) -> Result<()> {
    match cmd {
        SummaryCommands::Json { account, month } => {
            json(ctx, account.as_deref(), parse_month_opt(&month))
        }
        SummaryCommands::Csv { month } => csv(ctx, parse_month_opt(&month)),
    }
}

/// Chart-ready series over every record, history included.
pub fn charts(ctx: &Context) -> Result<()> {
    let records = ctx.all_records()?;
    if records.is_empty() {
        println!("No data available for charts.");
        return Ok(());
    }
    let path = summary::write_chart_series(&ctx.settings.charts_dir(), &summary::chart_series(&records))?;
    println!("Chart data saved to {}", path.display());
    Ok(())
}
