use chrono::NaiveDate;
use colored::Colorize;
use comfy_table::{Cell, Table};

use crate::cli::{parse_month_opt, today, Context, ReportCommands};
use crate::error::Result;
use crate::fmt::{money, percent};
use crate::models::{ExpenseRecord, YearMonth};
use crate::reports::{self, Filter};
use crate::summary;

const WRAP_WIDTH: usize = 72;

// ---------------------------------------------------------------------------
// Loading + printing (used by dispatch and the shell)
// ---------------------------------------------------------------------------

fn no_data() -> Result<()> {
    println!("No expenses found.");
    Ok(())
}

/// Per-account breakdown of the live file, optionally for one month. Also
/// writes the per-account CSV summaries.
pub fn monthly(ctx: &Context, month: Option<YearMonth>) -> Result<()> {
    let records = Filter::new(None, month).apply(&ctx.live_records()?);
    if records.is_empty() {
        return no_data();
    }
    let data = reports::monthly_summary(&records, ctx.taxonomy.accounts());
    println!("{}", format_monthly(&data, &period_label(&records, month)));

    let written = summary::write_monthly_summaries(
        &ctx.settings.summary_dir(),
        &records,
        ctx.taxonomy.accounts(),
        month,
    )?;
    for path in written {
        if let Some(name) = path.file_name() {
            println!("Summary saved: {}", name.to_string_lossy());
        }
    }
    Ok(())
}

pub fn trends(ctx: &Context, months: u32) -> Result<()> {
    let records = ctx.all_records()?;
    if records.is_empty() {
        println!("No data available for analysis.");
        return Ok(());
    }
    let data = reports::spending_trends(&records, months, today());
    if data.record_count == 0 {
        println!("No data available for the last {months} months.");
        return Ok(());
    }
    println!("{}", format_trends(&data));
    Ok(())
}

pub fn categories(ctx: &Context) -> Result<()> {
    let records = ctx.all_records()?;
    if records.is_empty() {
        return no_data();
    }
    println!("{}", format_category_stats(&reports::category_stats(&records)));
    Ok(())
}

pub fn accounts(ctx: &Context) -> Result<()> {
    let records = ctx.all_records()?;
    if records.is_empty() {
        return no_data();
    }
    println!(
        "{}",
        format_accounts(&reports::account_shares(&records), &reports::account_pivot(&records))
    );
    Ok(())
}

pub fn insights(ctx: &Context) -> Result<()> {
    match reports::insights(&ctx.all_records()?) {
        Some(data) => println!("{}", format_insights(&data)),
        None => println!("No data available for insights."),
    }
    Ok(())
}

pub fn budget(ctx: &Context, account: Option<String>, month: Option<YearMonth>) -> Result<()> {
    let month = month.unwrap_or_else(|| YearMonth::of(today()));
    let account = ctx.resolve_account(account.as_deref());
    let structure = ctx.budget();
    let grouped = reports::group_by_category(
        &ctx.live_records()?,
        &structure,
        &Filter::new(account.clone(), Some(month)),
    );
    let lines = reports::budget_comparison(&structure, &grouped);
    let scope = account.as_deref().unwrap_or("all accounts");
    println!("{}", format_budget(&lines, &format!("{scope}, {month}")));
    Ok(())
}

pub fn run(ctx: &Context, cmd: ReportCommands) -> Result<()> {
    match cmd {
        ReportCommands::Monthly { month } => monthly(ctx, parse_month_opt(&month)),
        ReportCommands::Trends { months } => trends(ctx, months),
        ReportCommands::Categories => categories(ctx),
        ReportCommands::Accounts => accounts(ctx),
        ReportCommands::Insights => insights(ctx),
        ReportCommands::Budget { account, month } => budget(ctx, account, parse_month_opt(&month)),
    }
}

// ---------------------------------------------------------------------------
// Pure formatting functions (report data -> String)
// ---------------------------------------------------------------------------

pub fn format_recent(rows: &[ExpenseRecord]) -> String {
    let mut table = Table::new();
    table.set_header(vec!["Date", "Account", "Category", "Description", "Amount"]);
    for r in rows {
        let category = match &r.subcategory {
            Some(sub) => format!("{} / {sub}", r.category),
            None => r.category.clone(),
        };
        table.add_row(vec![
            Cell::new(r.date_str()),
            Cell::new(&r.account),
            Cell::new(category),
            Cell::new(&r.description),
            Cell::new(money(r.amount)),
        ]);
    }
    table.to_string()
}

/// The month asked for, or the span of months the records cover.
pub fn period_label(records: &[ExpenseRecord], month: Option<YearMonth>) -> String {
    if let Some(month) = month {
        return month.to_string();
    }
    let months = records.iter().map(|r| YearMonth::of(r.date));
    match (months.clone().min(), months.max()) {
        (Some(first), Some(last)) if first == last => first.to_string(),
        (Some(first), Some(last)) => format!("{first} to {last}"),
        _ => "all months".to_string(),
    }
}

pub fn format_monthly(data: &reports::MonthlySummary, period: &str) -> String {
    let mut out = format!("Monthly summary - {period}");
    for account in &data.accounts {
        let mut table = Table::new();
        table.set_header(vec!["Category", "Amount", "%"]);
        for c in &account.categories {
            table.add_row(vec![
                Cell::new(&c.name),
                Cell::new(money(c.total)),
                Cell::new(percent(c.pct)),
            ]);
        }
        table.add_row(vec![
            Cell::new("Total".bold()),
            Cell::new(money(account.total)),
            Cell::new(""),
        ]);
        out.push_str(&format!("\n\n{}\n{table}", account.account.bold()));
    }
    out.push_str(&format!("\n\nTotal expenses: {}", money(data.total).bold()));
    out
}

pub fn format_trends(data: &reports::TrendsReport) -> String {
    let mut monthly = Table::new();
    monthly.set_header(vec!["Month", "Total"]);
    for (m, total) in &data.monthly {
        monthly.add_row(vec![Cell::new(m), Cell::new(money(*total))]);
    }

    let mut top = Table::new();
    top.set_header(vec!["Category", "Amount", "%"]);
    for c in &data.top_categories {
        top.add_row(vec![
            Cell::new(&c.name),
            Cell::new(money(c.total)),
            Cell::new(percent(c.pct)),
        ]);
    }

    let mut accounts = Table::new();
    accounts.set_header(vec!["Account", "Amount", "%"]);
    for a in &data.accounts {
        accounts.add_row(vec![
            Cell::new(&a.name),
            Cell::new(money(a.total)),
            Cell::new(percent(a.pct)),
        ]);
    }

    format!(
        "Spending trends (last {} months, since {})\n\nMonthly totals\n{monthly}\n\n\
         Average daily spending: {}\n\nTop categories\n{top}\n\nBy account\n{accounts}",
        data.months_back,
        data.cutoff.format(crate::models::DATE_FORMAT),
        money(data.daily_average),
    )
}

pub fn format_category_stats(stats: &[reports::CategoryStats]) -> String {
    let mut table = Table::new();
    table.set_header(vec!["Category", "Total", "Average", "Count"]);
    for s in stats {
        table.add_row(vec![
            Cell::new(&s.name),
            Cell::new(money(s.total)),
            Cell::new(money(s.mean)),
            Cell::new(s.count),
        ]);
    }
    format!("Category analysis\n{table}")
}

pub fn format_accounts(shares: &[reports::CategoryShare], pivot: &reports::Pivot) -> String {
    let mut totals = Table::new();
    totals.set_header(vec!["Account", "Amount", "%"]);
    for a in shares {
        totals.add_row(vec![
            Cell::new(&a.name),
            Cell::new(money(a.total)),
            Cell::new(percent(a.pct)),
        ]);
    }

    let mut grid = Table::new();
    let mut header = vec!["Category".to_string()];
    header.extend(pivot.accounts.iter().cloned());
    grid.set_header(header);
    for row in &pivot.rows {
        let mut cells = vec![Cell::new(&row.category)];
        cells.extend(row.amounts.iter().map(|a| Cell::new(money(*a))));
        grid.add_row(cells);
    }

    format!("Account comparison\n{totals}\n\nCategory by account\n{grid}")
}

fn recommendation_text(r: &reports::Recommendation) -> String {
    match r {
        reports::Recommendation::SpendingFreeDays => {
            "You're spending almost every day. Consider setting spending-free days.".to_string()
        }
        reports::Recommendation::ReduceLargePurchases => {
            "Your average transaction is high. Look for ways to reduce large purchases.".to_string()
        }
        reports::Recommendation::TrackSmallExpenses(total) => format!(
            "Small expenses (under {}) total {}. Consider tracking these better.",
            money(reports::SMALL_EXPENSE_LIMIT),
            money(*total)
        ),
    }
}

fn day(date: &NaiveDate) -> String {
    date.format(crate::models::DATE_FORMAT).to_string()
}

pub fn format_insights(data: &reports::Insights) -> String {
    let (date, day_total) = &data.most_expensive_day;
    let (category, category_total) = &data.most_expensive_category;
    let mut out = format!(
        "Spending insights\n\
         Most expensive day:       {} ({})\n\
         Most expensive category:  {category} ({})\n\
         Average transaction:      {}\n\
         Spending frequency:       {} of days",
        day(date),
        money(*day_total),
        money(*category_total),
        money(data.average_transaction),
        percent(data.spending_frequency),
    );
    if !data.recommendations.is_empty() {
        out.push_str(&format!("\n\n{}", "Recommendations".bold()));
        let options = textwrap::Options::new(WRAP_WIDTH)
            .initial_indent("  - ")
            .subsequent_indent("    ");
        for r in &data.recommendations {
            out.push('\n');
            out.push_str(&textwrap::fill(&recommendation_text(r), &options));
        }
    }
    out
}

pub fn format_budget(lines: &[reports::BudgetLine], scope: &str) -> String {
    let mut table = Table::new();
    table.set_header(vec!["Category", "Fixed charges", "Spent", "Remaining"]);
    let (mut fixed, mut actual) = (0.0, 0.0);
    for l in lines {
        let remaining = if l.remaining < 0.0 {
            money(l.remaining).red().to_string()
        } else {
            money(l.remaining)
        };
        table.add_row(vec![
            Cell::new(&l.category),
            Cell::new(money(l.fixed)),
            Cell::new(money(l.actual)),
            Cell::new(remaining),
        ]);
        fixed += l.fixed;
        actual += l.actual;
    }
    table.add_row(vec![
        Cell::new("Total".bold()),
        Cell::new(money(fixed)),
        Cell::new(money(actual)),
        Cell::new(money(fixed - actual)),
    ]);
    format!("Budget ({scope})\n{table}")
}
