use std::cmp::Ordering;
use std::collections::{BTreeMap, BTreeSet};

use chrono::{Days, NaiveDate};
use serde::Serialize;

use crate::budget::{BudgetStructure, CATCH_ALL_SUBCATEGORY};
use crate::models::{ExpenseRecord, YearMonth};

// ---------------------------------------------------------------------------
// Filtering
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Default, PartialEq)]
pub struct Filter {
    pub account: Option<String>,
    pub month: Option<YearMonth>,
}

impl Filter {
    pub fn new(account: Option<String>, month: Option<YearMonth>) -> Self {
        Self { account, month }
    }

    pub fn matches(&self, record: &ExpenseRecord) -> bool {
        if let Some(month) = self.month {
            if !month.contains(record.date) {
                return false;
            }
        }
        match &self.account {
            Some(account) => record.account == *account,
            None => true,
        }
    }

    pub fn apply(&self, records: &[ExpenseRecord]) -> Vec<ExpenseRecord> {
        records.iter().filter(|r| self.matches(r)).cloned().collect()
    }
}

pub fn grand_total(records: &[ExpenseRecord]) -> f64 {
    records.iter().map(|r| r.amount).sum()
}

fn pct(part: f64, whole: f64) -> f64 {
    if whole != 0.0 {
        part / whole * 100.0
    } else {
        0.0
    }
}

fn by_total_then_name(a: &(String, f64), b: &(String, f64)) -> Ordering {
    b.1.total_cmp(&a.1).then_with(|| a.0.cmp(&b.0))
}

// ---------------------------------------------------------------------------
// Category / subcategory summary
// ---------------------------------------------------------------------------

pub type CategorySummary = BTreeMap<String, BTreeMap<String, f64>>;

/// Sum the filtered records into the budget structure's category ->
/// subcategory grid. Every cell of the structure is present (zero when
/// nothing matched). Records outside the structure are left out: unknown
/// categories, unknown subcategories, and records without subcategory when
/// the category has no catch-all `autre` entry.
pub fn group_by_category(
    records: &[ExpenseRecord],
    structure: &BudgetStructure,
    filter: &Filter,
) -> CategorySummary {
    let mut summary: CategorySummary = structure
        .categories
        .iter()
        .map(|(cat, subs)| (cat.clone(), subs.keys().map(|s| (s.clone(), 0.0)).collect()))
        .collect();

    for record in records.iter().filter(|r| filter.matches(r)) {
        let Some(subs) = summary.get_mut(&record.category) else {
            continue;
        };
        let key = record.subcategory.as_deref().unwrap_or(CATCH_ALL_SUBCATEGORY);
        if let Some(total) = subs.get_mut(key) {
            *total += record.amount;
        }
    }
    summary
}

pub fn summary_total(summary: &CategorySummary) -> f64 {
    summary.values().flat_map(|subs| subs.values()).sum()
}

// ---------------------------------------------------------------------------
// Monthly totals
// ---------------------------------------------------------------------------

/// Total spend per calendar month, oldest first.
pub fn monthly_totals(records: &[ExpenseRecord]) -> Vec<(YearMonth, f64)> {
    let mut totals: BTreeMap<YearMonth, f64> = BTreeMap::new();
    for r in records {
        *totals.entry(r.month()).or_insert(0.0) += r.amount;
    }
    totals.into_iter().collect()
}

pub fn daily_totals(records: &[ExpenseRecord]) -> BTreeMap<NaiveDate, f64> {
    let mut totals = BTreeMap::new();
    for r in records {
        *totals.entry(r.date).or_insert(0.0) += r.amount;
    }
    totals
}

// ---------------------------------------------------------------------------
// Category ranking
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CategoryShare {
    pub name: String,
    pub total: f64,
    pub pct: f64,
}

fn shares(totals: BTreeMap<String, f64>) -> Vec<CategoryShare> {
    let whole: f64 = totals.values().sum();
    let mut pairs: Vec<(String, f64)> = totals.into_iter().collect();
    pairs.sort_by(by_total_then_name);
    pairs
        .into_iter()
        .map(|(name, total)| CategoryShare {
            pct: pct(total, whole),
            name,
            total,
        })
        .collect()
}

fn totals_by<F>(records: &[ExpenseRecord], key: F) -> BTreeMap<String, f64>
where
    F: Fn(&ExpenseRecord) -> &str,
{
    let mut totals = BTreeMap::new();
    for r in records {
        *totals.entry(key(r).to_string()).or_insert(0.0) += r.amount;
    }
    totals
}

/// Every category, largest total first, ties by name.
pub fn category_totals(records: &[ExpenseRecord]) -> Vec<CategoryShare> {
    shares(totals_by(records, |r| r.category.as_str()))
}

/// The `n` largest categories. Percentages are against the grand total of
/// all records, not just the ones returned.
pub fn top_categories(records: &[ExpenseRecord], n: usize) -> Vec<CategoryShare> {
    let mut all = category_totals(records);
    all.truncate(n);
    all
}

// ---------------------------------------------------------------------------
// Accounts
// ---------------------------------------------------------------------------

pub fn account_totals(records: &[ExpenseRecord]) -> BTreeMap<String, f64> {
    totals_by(records, |r| r.account.as_str())
}

/// Accounts ranked by spend, with their share of the total.
pub fn account_shares(records: &[ExpenseRecord]) -> Vec<CategoryShare> {
    shares(account_totals(records))
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PivotRow {
    pub category: String,
    pub amounts: Vec<f64>,
}

/// Category x account totals; `amounts[i]` belongs to `accounts[i]`.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Pivot {
    pub accounts: Vec<String>,
    pub rows: Vec<PivotRow>,
}

pub fn account_pivot(records: &[ExpenseRecord]) -> Pivot {
    let accounts: Vec<String> = records
        .iter()
        .map(|r| r.account.clone())
        .collect::<BTreeSet<_>>()
        .into_iter()
        .collect();
    let mut grid: BTreeMap<String, Vec<f64>> = BTreeMap::new();
    for r in records {
        let col = accounts.iter().position(|a| *a == r.account).unwrap_or(0);
        let row = grid
            .entry(r.category.clone())
            .or_insert_with(|| vec![0.0; accounts.len()]);
        row[col] += r.amount;
    }
    Pivot {
        accounts,
        rows: grid
            .into_iter()
            .map(|(category, amounts)| PivotRow { category, amounts })
            .collect(),
    }
}

// ---------------------------------------------------------------------------
// Monthly summary per account
// ---------------------------------------------------------------------------

pub struct AccountSummary {
    pub account: String,
    pub total: f64,
    /// Category shares within this account.
    pub categories: Vec<CategoryShare>,
}

pub struct MonthlySummary {
    pub accounts: Vec<AccountSummary>,
    pub total: f64,
}

/// Per-account category breakdown, in `accounts` order. Accounts without
/// spending are left out; the overall total covers every record.
pub fn monthly_summary(records: &[ExpenseRecord], accounts: &[String]) -> MonthlySummary {
    let mut out = Vec::new();
    for account in accounts {
        let own: Vec<ExpenseRecord> = records
            .iter()
            .filter(|r| r.account == *account)
            .cloned()
            .collect();
        if own.is_empty() {
            continue;
        }
        out.push(AccountSummary {
            account: account.clone(),
            total: grand_total(&own),
            categories: category_totals(&own),
        });
    }
    MonthlySummary {
        accounts: out,
        total: grand_total(records),
    }
}

// ---------------------------------------------------------------------------
// Category statistics
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq)]
pub struct CategoryStats {
    pub name: String,
    pub total: f64,
    pub mean: f64,
    pub count: usize,
}

pub fn category_stats(records: &[ExpenseRecord]) -> Vec<CategoryStats> {
    let mut acc: BTreeMap<String, (f64, usize)> = BTreeMap::new();
    for r in records {
        let e = acc.entry(r.category.clone()).or_insert((0.0, 0));
        e.0 += r.amount;
        e.1 += 1;
    }
    let mut stats: Vec<CategoryStats> = acc
        .into_iter()
        .map(|(name, (total, count))| CategoryStats {
            name,
            total,
            mean: total / count as f64,
            count,
        })
        .collect();
    stats.sort_by(|a, b| b.total.total_cmp(&a.total).then_with(|| a.name.cmp(&b.name)));
    stats
}

// ---------------------------------------------------------------------------
// Trends
// ---------------------------------------------------------------------------

pub struct TrendsReport {
    pub months_back: u32,
    pub cutoff: NaiveDate,
    pub record_count: usize,
    pub monthly: Vec<(YearMonth, f64)>,
    /// Mean of the per-day totals over days with spending.
    pub daily_average: f64,
    pub top_categories: Vec<CategoryShare>,
    pub accounts: Vec<CategoryShare>,
}

/// Spending over roughly the last `months` months (30-day months) up to
/// `today`.
pub fn spending_trends(records: &[ExpenseRecord], months: u32, today: NaiveDate) -> TrendsReport {
    let cutoff = today
        .checked_sub_days(Days::new(30 * u64::from(months)))
        .unwrap_or(NaiveDate::MIN);
    let recent: Vec<ExpenseRecord> = records.iter().filter(|r| r.date >= cutoff).cloned().collect();

    let daily = daily_totals(&recent);
    let daily_average = if daily.is_empty() {
        0.0
    } else {
        daily.values().sum::<f64>() / daily.len() as f64
    };

    TrendsReport {
        months_back: months,
        cutoff,
        record_count: recent.len(),
        monthly: monthly_totals(&recent),
        daily_average,
        top_categories: top_categories(&recent, 5),
        accounts: account_shares(&recent),
    }
}

// ---------------------------------------------------------------------------
// Insights
// ---------------------------------------------------------------------------

pub const SMALL_EXPENSE_LIMIT: f64 = 10.0;

#[derive(Debug, Clone, PartialEq)]
pub enum Recommendation {
    /// Spending on more than 80% of days.
    SpendingFreeDays,
    /// Average transaction above 50.
    ReduceLargePurchases,
    /// Total of expenses under [`SMALL_EXPENSE_LIMIT`].
    TrackSmallExpenses(f64),
}

#[derive(Debug, Clone, PartialEq)]
pub struct Insights {
    pub most_expensive_day: (NaiveDate, f64),
    pub most_expensive_category: (String, f64),
    pub average_transaction: f64,
    /// Percentage of days between the first and last record with spending.
    pub spending_frequency: f64,
    pub recommendations: Vec<Recommendation>,
}

fn first_max<K: Clone>(totals: &BTreeMap<K, f64>) -> Option<(K, f64)> {
    let mut best: Option<(K, f64)> = None;
    for (k, v) in totals {
        if best.as_ref().map_or(true, |(_, b)| *v > *b) {
            best = Some((k.clone(), *v));
        }
    }
    best
}

pub fn insights(records: &[ExpenseRecord]) -> Option<Insights> {
    let daily = daily_totals(records);
    let most_expensive_day = first_max(&daily)?;
    let most_expensive_category = first_max(&totals_by(records, |r| r.category.as_str()))?;
    let average_transaction = grand_total(records) / records.len() as f64;

    let first = *daily.keys().next()?;
    let last = *daily.keys().next_back()?;
    let span_days = (last - first).num_days() + 1;
    let spending_frequency = pct(daily.len() as f64, span_days as f64);

    let mut recommendations = Vec::new();
    if spending_frequency > 80.0 {
        recommendations.push(Recommendation::SpendingFreeDays);
    }
    if average_transaction > 50.0 {
        recommendations.push(Recommendation::ReduceLargePurchases);
    }
    let small: Vec<&ExpenseRecord> = records
        .iter()
        .filter(|r| r.amount < SMALL_EXPENSE_LIMIT)
        .collect();
    if !small.is_empty() {
        let small_total = small.iter().map(|r| r.amount).sum();
        recommendations.push(Recommendation::TrackSmallExpenses(small_total));
    }

    Some(Insights {
        most_expensive_day,
        most_expensive_category,
        average_transaction,
        spending_frequency,
        recommendations,
    })
}

// ---------------------------------------------------------------------------
// Recent
// ---------------------------------------------------------------------------

/// Newest first; among equal dates the most recently appended comes first.
pub fn recent(records: &[ExpenseRecord], limit: usize) -> Vec<ExpenseRecord> {
    let mut rows: Vec<ExpenseRecord> = records.iter().rev().cloned().collect();
    rows.sort_by(|a, b| b.date.cmp(&a.date));
    rows.truncate(limit);
    rows
}

// ---------------------------------------------------------------------------
// Budget comparison
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct BudgetLine {
    pub category: String,
    pub fixed: f64,
    pub actual: f64,
    pub remaining: f64,
}

/// Fixed charges against actual spend, per category of the structure.
pub fn budget_comparison(structure: &BudgetStructure, summary: &CategorySummary) -> Vec<BudgetLine> {
    structure
        .categories
        .keys()
        .map(|category| {
            let fixed = structure.fixed_charges(category);
            let actual: f64 = summary
                .get(category)
                .map(|subs| subs.values().sum())
                .unwrap_or(0.0);
            BudgetLine {
                category: category.clone(),
                fixed,
                actual,
                remaining: fixed - actual,
            }
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::taxonomy::Taxonomy;

    fn record(d: u32, m: u32, account: &str, category: &str, amount: f64) -> ExpenseRecord {
        ExpenseRecord {
            date: NaiveDate::from_ymd_opt(2024, m, d).unwrap(),
            account: account.to_string(),
            category: category.to_string(),
            subcategory: None,
            description: String::new(),
            amount,
        }
    }

    fn scenario() -> Vec<ExpenseRecord> {
        vec![
            record(1, 1, "Commun", "Courses", 50.0),
            record(15, 1, "Luc", "Transport", 20.0),
            record(1, 2, "Commun", "Courses", 30.0),
        ]
    }

    fn ym(s: &str) -> YearMonth {
        s.parse().unwrap()
    }

    #[test]
    fn test_monthly_totals_scenario() {
        let totals = monthly_totals(&scenario());
        assert_eq!(totals, vec![(ym("2024-01"), 70.0), (ym("2024-02"), 30.0)]);
    }

    #[test]
    fn test_top_categories_uses_grand_total() {
        let top = top_categories(&scenario(), 1);
        assert_eq!(
            top,
            vec![CategoryShare { name: "Courses".into(), total: 80.0, pct: 80.0 }]
        );
    }

    #[test]
    fn test_top_categories_within_one_account() {
        let records = Filter::new(Some("Commun".into()), None).apply(&scenario());
        assert_eq!(
            top_categories(&records, 1),
            vec![CategoryShare { name: "Courses".into(), total: 80.0, pct: 100.0 }]
        );
    }

    #[test]
    fn test_top_categories_ties_break_by_name() {
        let records = vec![
            record(1, 1, "Commun", "Sport", 10.0),
            record(2, 1, "Commun", "Culture", 10.0),
            record(3, 1, "Commun", "Maison", 25.0),
        ];
        let names: Vec<String> = top_categories(&records, 3).into_iter().map(|c| c.name).collect();
        assert_eq!(names, vec!["Maison", "Culture", "Sport"]);
    }

    #[test]
    fn test_percentages_come_from_unrounded_sums() {
        let records = vec![
            record(1, 1, "Commun", "A", 1.0 / 3.0),
            record(1, 1, "Commun", "B", 2.0 / 3.0),
        ];
        let all = category_totals(&records);
        let sum: f64 = all.iter().map(|c| c.pct).sum();
        assert!((sum - 100.0).abs() < 1e-9);
        assert!((all[0].pct - 200.0 / 3.0).abs() < 1e-9);
    }

    #[test]
    fn test_filter_by_account_and_month() {
        let records = scenario();
        let f = Filter::new(Some("Commun".into()), Some(ym("2024-01")));
        let out = f.apply(&records);
        assert_eq!(out, vec![records[0].clone()]);
        assert_eq!(Filter::default().apply(&records).len(), 3);
    }

    #[test]
    fn test_group_by_category_sums_filtered_subset() {
        let records = scenario();
        let structure = BudgetStructure::from_taxonomy(&Taxonomy::default());
        let f = Filter::new(None, Some(ym("2024-01")));
        let summary = group_by_category(&records, &structure, &f);
        assert_eq!(summary["Courses"]["autre"], 50.0);
        assert_eq!(summary["Transport"]["autre"], 20.0);
        assert_eq!(summary["Santé"]["autre"], 0.0);
        assert_eq!(summary_total(&summary), grand_total(&f.apply(&records)));
    }

    #[test]
    fn test_group_by_category_excludes_unknowns() {
        let mut structure = BudgetStructure::default();
        let mut maison = BTreeMap::new();
        maison.insert("loyer".to_string(), 900.0);
        structure.categories.insert("Maison".to_string(), maison);

        let mut rent = record(1, 1, "Commun", "Maison", 900.0);
        rent.subcategory = Some("loyer".into());
        let mut unknown_sub = record(2, 1, "Commun", "Maison", 5.0);
        unknown_sub.subcategory = Some("jardin".into());
        let no_sub = record(3, 1, "Commun", "Maison", 7.0);
        let unknown_cat = record(4, 1, "Commun", "Vacances", 300.0);

        let summary = group_by_category(
            &[rent, unknown_sub, no_sub, unknown_cat],
            &structure,
            &Filter::default(),
        );
        assert_eq!(summary.len(), 1);
        assert_eq!(summary["Maison"].len(), 1);
        assert_eq!(summary["Maison"]["loyer"], 900.0);
    }

    #[test]
    fn test_totals_are_consistent() {
        let records = scenario();
        let structure = BudgetStructure::from_taxonomy(&Taxonomy::default());
        let by_cat = summary_total(&group_by_category(&records, &structure, &Filter::default()));
        let by_account: f64 = account_totals(&records).values().sum();
        let grand = grand_total(&records);
        assert_eq!(by_cat, grand);
        assert_eq!(by_account, grand);
        assert_eq!(grand, 100.0);
    }

    #[test]
    fn test_account_pivot_zero_fills() {
        let pivot = account_pivot(&scenario());
        assert_eq!(pivot.accounts, vec!["Commun", "Luc"]);
        assert_eq!(
            pivot.rows,
            vec![
                PivotRow { category: "Courses".into(), amounts: vec![80.0, 0.0] },
                PivotRow { category: "Transport".into(), amounts: vec![0.0, 20.0] },
            ]
        );
    }

    #[test]
    fn test_monthly_summary_in_account_order() {
        let accounts: Vec<String> = vec!["Laura".into(), "Luc".into(), "Commun".into()];
        let summary = monthly_summary(&scenario(), &accounts);
        let names: Vec<&str> = summary.accounts.iter().map(|a| a.account.as_str()).collect();
        assert_eq!(names, vec!["Luc", "Commun"]);
        assert_eq!(summary.accounts[1].total, 80.0);
        assert_eq!(summary.accounts[1].categories[0].pct, 100.0);
        assert_eq!(summary.total, 100.0);
    }

    #[test]
    fn test_category_stats() {
        let stats = category_stats(&scenario());
        assert_eq!(
            stats[0],
            CategoryStats { name: "Courses".into(), total: 80.0, mean: 40.0, count: 2 }
        );
        assert_eq!(stats[1].name, "Transport");
    }

    #[test]
    fn test_spending_trends_cutoff() {
        let today = NaiveDate::from_ymd_opt(2024, 2, 10).unwrap();
        let report = spending_trends(&scenario(), 1, today);
        assert_eq!(report.cutoff, NaiveDate::from_ymd_opt(2024, 1, 11).unwrap());
        assert_eq!(report.record_count, 2);
        assert_eq!(report.monthly, vec![(ym("2024-01"), 20.0), (ym("2024-02"), 30.0)]);
        assert_eq!(report.daily_average, 25.0);
        assert_eq!(report.accounts[0].name, "Commun");
    }

    #[test]
    fn test_spending_trends_huge_window_starts_at_min_date() {
        let today = NaiveDate::from_ymd_opt(2024, 2, 10).unwrap();
        let report = spending_trends(&scenario(), 4_000_000, today);
        assert_eq!(report.cutoff, NaiveDate::MIN);
        assert_eq!(report.record_count, scenario().len());

        let report = spending_trends(&scenario(), u32::MAX, today);
        assert_eq!(report.cutoff, NaiveDate::MIN);
    }

    #[test]
    fn test_insights() {
        let records = vec![
            record(1, 1, "Commun", "Courses", 5.0),
            record(1, 1, "Luc", "Sport", 100.0),
            record(2, 1, "Commun", "Courses", 3.0),
        ];
        let i = insights(&records).unwrap();
        assert_eq!(i.most_expensive_day, (NaiveDate::from_ymd_opt(2024, 1, 1).unwrap(), 105.0));
        assert_eq!(i.most_expensive_category, ("Sport".to_string(), 100.0));
        assert_eq!(i.spending_frequency, 100.0);
        assert_eq!(
            i.recommendations,
            vec![
                Recommendation::SpendingFreeDays,
                Recommendation::TrackSmallExpenses(8.0),
            ]
        );
        assert!(insights(&[]).is_none());
    }

    #[test]
    fn test_recent_newest_first() {
        let records = scenario();
        let out = recent(&records, 2);
        assert_eq!(out, vec![records[2].clone(), records[1].clone()]);
    }

    #[test]
    fn test_budget_comparison() {
        let mut structure = BudgetStructure::default();
        let mut maison = BTreeMap::new();
        maison.insert("loyer".to_string(), 900.0);
        maison.insert("autre".to_string(), 100.0);
        structure.categories.insert("Maison".to_string(), maison);

        let records = vec![record(1, 1, "Commun", "Maison", 250.0)];
        let summary = group_by_category(&records, &structure, &Filter::default());
        let lines = budget_comparison(&structure, &summary);
        assert_eq!(
            lines,
            vec![BudgetLine {
                category: "Maison".into(),
                fixed: 1000.0,
                actual: 250.0,
                remaining: 750.0,
            }]
        );
    }
}
