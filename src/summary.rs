//! Summary files written to disk: JSON category summaries, per-account
//! monthly CSV summaries and chart-ready series.

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use serde::Serialize;

use crate::error::Result;
use crate::models::{ExpenseRecord, YearMonth};
use crate::reports::{self, CategorySummary};

// ---------------------------------------------------------------------------
// JSON category summary
// ---------------------------------------------------------------------------

pub fn json_summary_name(account: Option<&str>, month: YearMonth) -> String {
    format!("summary_{}_{month}.json", account.unwrap_or("all"))
}

/// Write `summary` as pretty JSON. Non-ASCII names are kept as-is.
pub fn write_json_summary(
    dir: &Path,
    account: Option<&str>,
    month: YearMonth,
    summary: &CategorySummary,
) -> Result<PathBuf> {
    std::fs::create_dir_all(dir)?;
    let path = dir.join(json_summary_name(account, month));
    let json = serde_json::to_string_pretty(summary)?;
    std::fs::write(&path, format!("{json}\n"))?;
    tracing::info!(path = %path.display(), "wrote JSON summary");
    Ok(path)
}

// ---------------------------------------------------------------------------
// Per-account monthly CSV summaries
// ---------------------------------------------------------------------------

#[derive(Serialize)]
struct MonthlyCategoryRow {
    #[serde(rename = "Month")]
    month: String,
    #[serde(rename = "Categorie")]
    category: String,
    #[serde(rename = "Montant")]
    amount: String,
}

pub fn csv_summary_name(account: &str, month: YearMonth) -> String {
    format!(
        "{}_summary_{}.csv",
        month.month_name_year(),
        account.to_lowercase()
    )
}

/// One CSV per account and month present in `records` (restricted to
/// `month` when given), each listing the category totals of that month.
pub fn write_monthly_summaries(
    dir: &Path,
    records: &[ExpenseRecord],
    accounts: &[String],
    month: Option<YearMonth>,
) -> Result<Vec<PathBuf>> {
    std::fs::create_dir_all(dir)?;
    let mut written = Vec::new();

    for account in accounts {
        let mut grid: BTreeMap<YearMonth, BTreeMap<String, f64>> = BTreeMap::new();
        for r in records.iter().filter(|r| r.account == *account) {
            if month.is_some_and(|m| m != r.month()) {
                continue;
            }
            *grid
                .entry(r.month())
                .or_default()
                .entry(r.category.clone())
                .or_insert(0.0) += r.amount;
        }

        for (ym, categories) in grid {
            let path = dir.join(csv_summary_name(account, ym));
            let mut wtr = csv::Writer::from_path(&path)?;
            for (category, total) in categories {
                wtr.serialize(MonthlyCategoryRow {
                    month: ym.to_string(),
                    category,
                    amount: format!("{total:.2}"),
                })?;
            }
            wtr.flush()?;
            tracing::info!(path = %path.display(), "wrote monthly summary");
            written.push(path);
        }
    }
    Ok(written)
}

// ---------------------------------------------------------------------------
// Chart series
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Series {
    pub labels: Vec<String>,
    pub values: Vec<f64>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Bin {
    pub start: f64,
    pub end: f64,
    pub count: usize,
}

/// Data behind the four dashboard charts, for an external plotting tool.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ChartSeries {
    pub monthly_trend: Series,
    pub by_category: Series,
    pub by_account: Series,
    pub daily_distribution: Vec<Bin>,
}

pub const HISTOGRAM_BINS: usize = 20;

pub fn histogram(values: &[f64], bins: usize) -> Vec<Bin> {
    if values.is_empty() || bins == 0 {
        return Vec::new();
    }
    let min = values.iter().copied().fold(f64::INFINITY, f64::min);
    let max = values.iter().copied().fold(f64::NEG_INFINITY, f64::max);
    if max == min {
        return vec![Bin { start: min, end: max, count: values.len() }];
    }
    let width = (max - min) / bins as f64;
    let mut out: Vec<Bin> = (0..bins)
        .map(|i| Bin {
            start: min + width * i as f64,
            end: min + width * (i + 1) as f64,
            count: 0,
        })
        .collect();
    for v in values {
        let idx = (((v - min) / width) as usize).min(bins - 1);
        out[idx].count += 1;
    }
    out
}

pub fn chart_series(records: &[ExpenseRecord]) -> ChartSeries {
    let monthly = reports::monthly_totals(records);
    let categories = reports::category_totals(records);
    let accounts = reports::account_totals(records);
    let daily: Vec<f64> = reports::daily_totals(records).into_values().collect();

    ChartSeries {
        monthly_trend: Series {
            labels: monthly.iter().map(|(m, _)| m.to_string()).collect(),
            values: monthly.iter().map(|(_, v)| *v).collect(),
        },
        by_category: Series {
            labels: categories.iter().map(|c| c.name.clone()).collect(),
            values: categories.iter().map(|c| c.total).collect(),
        },
        by_account: Series {
            labels: accounts.keys().cloned().collect(),
            values: accounts.values().copied().collect(),
        },
        daily_distribution: histogram(&daily, HISTOGRAM_BINS),
    }
}

pub fn write_chart_series(dir: &Path, series: &ChartSeries) -> Result<PathBuf> {
    std::fs::create_dir_all(dir)?;
    let path = dir.join("expense_series.json");
    let json = serde_json::to_string_pretty(series)?;
    std::fs::write(&path, format!("{json}\n"))?;
    Ok(path)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::budget::BudgetStructure;
    use crate::reports::{group_by_category, Filter};
    use crate::taxonomy::Taxonomy;
    use chrono::NaiveDate;

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
            record(3, 2, "Commun", "Santé", 12.5),
        ]
    }

    #[test]
    fn test_json_summary_name() {
        let m = YearMonth::new(2024, 1).unwrap();
        assert_eq!(json_summary_name(None, m), "summary_all_2024-01.json");
        assert_eq!(json_summary_name(Some("Luc"), m), "summary_Luc_2024-01.json");
    }

    #[test]
    fn test_write_json_summary_keeps_non_ascii() {
        let dir = tempfile::tempdir().unwrap();
        let month = YearMonth::new(2024, 2).unwrap();
        let structure = BudgetStructure::from_taxonomy(&Taxonomy::default());
        let summary = group_by_category(&scenario(), &structure, &Filter::new(None, Some(month)));
        let path = write_json_summary(dir.path(), None, month, &summary).unwrap();
        assert!(path.ends_with("summary_all_2024-02.json"));

        let text = std::fs::read_to_string(&path).unwrap();
        assert!(text.contains("\"Santé\""));
        assert!(text.contains("\n  \""));
        let parsed: CategorySummary = serde_json::from_str(&text).unwrap();
        assert_eq!(parsed["Courses"]["autre"], 30.0);
        assert_eq!(parsed["Santé"]["autre"], 12.5);
    }

    #[test]
    fn test_write_monthly_summaries_per_account_and_month() {
        let dir = tempfile::tempdir().unwrap();
        let accounts: Vec<String> = vec!["Commun".into(), "Luc".into(), "Laura".into()];
        let written = write_monthly_summaries(dir.path(), &scenario(), &accounts, None).unwrap();
        let names: Vec<String> = written
            .iter()
            .map(|p| p.file_name().unwrap().to_string_lossy().to_string())
            .collect();
        assert_eq!(
            names,
            vec![
                "January_2024_summary_commun.csv",
                "February_2024_summary_commun.csv",
                "January_2024_summary_luc.csv",
            ]
        );
        let feb = std::fs::read_to_string(dir.path().join("February_2024_summary_commun.csv")).unwrap();
        assert_eq!(feb, "Month,Categorie,Montant\n2024-02,Courses,30.00\n2024-02,Santé,12.50\n");
    }

    #[test]
    fn test_write_monthly_summaries_for_one_month() {
        let dir = tempfile::tempdir().unwrap();
        let accounts: Vec<String> = vec!["Commun".into()];
        let written =
            write_monthly_summaries(dir.path(), &scenario(), &accounts, YearMonth::new(2024, 1))
                .unwrap();
        assert_eq!(written.len(), 1);
        assert!(written[0].ends_with("January_2024_summary_commun.csv"));
    }

    #[test]
    fn test_histogram() {
        let bins = histogram(&[0.0, 5.0, 10.0], 2);
        assert_eq!(bins.len(), 2);
        assert_eq!(bins[0].count, 1);
        assert_eq!(bins[1].count, 2);
        assert_eq!(histogram(&[4.0, 4.0], 20), vec![Bin { start: 4.0, end: 4.0, count: 2 }]);
        assert!(histogram(&[], 20).is_empty());
    }

    #[test]
    fn test_chart_series() {
        let series = chart_series(&scenario());
        assert_eq!(series.monthly_trend.labels, vec!["2024-01", "2024-02"]);
        assert_eq!(series.monthly_trend.values, vec![70.0, 42.5]);
        assert_eq!(series.by_account.labels, vec!["Commun", "Luc"]);
        assert_eq!(series.by_category.labels, vec!["Courses", "Transport", "Santé"]);
        assert_eq!(series.by_category.values, vec![80.0, 20.0, 12.5]);
        let days: usize = series.daily_distribution.iter().map(|b| b.count).sum();
        assert_eq!(days, 4);
    }
}
