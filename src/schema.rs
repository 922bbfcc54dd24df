//! On-disk row layouts for expense files.
//!
//! Two layouts exist in the wild. `Standard` (`Date,Compte,Categorie,
//! Description,Montant`) is the canonical one; `Detailed` adds a
//! `Sous-categorie` column for budget tracking. `Legacy`
//! (`Date,Account,Category,Amount`) is only ever read, then mapped onto
//! canonical records by [`crate::store::import_legacy`].

use std::io::Write;

use csv::StringRecord;
use serde::{Deserialize, Serialize};

use crate::error::{CarnetError, ParseError, Result};
use crate::input::{validate_amount, validate_date};
use crate::models::ExpenseRecord;

const STANDARD_HEADER: &[&str] = &["Date", "Compte", "Categorie", "Description", "Montant"];
const DETAILED_HEADER: &[&str] = &[
    "Date",
    "Compte",
    "Categorie",
    "Sous-categorie",
    "Description",
    "Montant",
];
const LEGACY_HEADER: &[&str] = &["Date", "Account", "Category", "Amount"];

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Schema {
    #[default]
    Standard,
    Detailed,
    Legacy,
}

impl Schema {
    pub fn header(&self) -> &'static [&'static str] {
        match self {
            Self::Standard => STANDARD_HEADER,
            Self::Detailed => DETAILED_HEADER,
            Self::Legacy => LEGACY_HEADER,
        }
    }

    pub fn columns(&self) -> usize {
        self.header().len()
    }

    pub fn header_line(&self) -> String {
        self.header().join(",")
    }

    /// Identify a file's layout from its header row.
    pub fn detect(header: &StringRecord) -> Option<Schema> {
        let cells: Vec<&str> = header
            .iter()
            .map(|c| c.trim().trim_start_matches('\u{feff}'))
            .collect();
        [Self::Standard, Self::Detailed, Self::Legacy]
            .into_iter()
            .find(|s| s.header() == cells.as_slice())
    }

    pub fn parse_row(&self, row: &StringRecord) -> std::result::Result<ExpenseRecord, ParseError> {
        if row.len() != self.columns() {
            return Err(ParseError::FieldCount {
                expected: self.columns(),
                found: row.len(),
            });
        }
        let field = |i: usize| row.get(i).unwrap_or("").trim();
        let date = validate_date(field(0)).ok_or_else(|| ParseError::Date(field(0).to_string()))?;
        let amount_col = self.columns() - 1;
        let amount = validate_amount(field(amount_col))
            .ok_or_else(|| ParseError::Amount(field(amount_col).to_string()))?;

        let (subcategory, description) = match self {
            Self::Standard => (None, field(3).to_string()),
            Self::Detailed => {
                let sub = field(3);
                let sub = if sub.is_empty() { None } else { Some(sub.to_string()) };
                (sub, field(4).to_string())
            }
            Self::Legacy => (None, String::new()),
        };

        Ok(ExpenseRecord {
            date,
            account: field(1).to_string(),
            category: field(2).to_string(),
            subcategory,
            description,
            amount,
        })
    }

    /// Parse one comma-delimited line without header.
    pub fn parse_line(&self, line: &str) -> std::result::Result<ExpenseRecord, ParseError> {
        let mut rdr = csv::ReaderBuilder::new()
            .has_headers(false)
            .flexible(true)
            .from_reader(line.as_bytes());
        match rdr.records().next() {
            Some(Ok(row)) => self.parse_row(&row),
            Some(Err(e)) => Err(ParseError::Malformed(e.to_string())),
            None => Err(ParseError::Malformed("empty line".to_string())),
        }
    }

    pub fn to_fields(&self, record: &ExpenseRecord) -> Vec<String> {
        let date = record.date_str();
        let amount = format_amount(record.amount);
        match self {
            Self::Standard => vec![
                date,
                record.account.clone(),
                record.category.clone(),
                record.description.clone(),
                amount,
            ],
            Self::Detailed => vec![
                date,
                record.account.clone(),
                record.category.clone(),
                record.subcategory.clone().unwrap_or_default(),
                record.description.clone(),
                amount,
            ],
            Self::Legacy => vec![
                date,
                record.account.clone(),
                record.category.clone(),
                amount,
            ],
        }
    }

    pub fn write_row<W: Write>(&self, wtr: &mut csv::Writer<W>, record: &ExpenseRecord) -> Result<()> {
        wtr.write_record(self.to_fields(record))?;
        Ok(())
    }

    /// Serialize one record to a line, without the trailing newline.
    pub fn to_line(&self, record: &ExpenseRecord) -> Result<String> {
        let mut wtr = row_writer(Vec::new());
        self.write_row(&mut wtr, record)?;
        let bytes = wtr
            .into_inner()
            .map_err(|e| CarnetError::Other(e.to_string()))?;
        let line = String::from_utf8_lossy(&bytes);
        Ok(line.trim_end_matches('\n').to_string())
    }
}

/// A header-less writer with `\n` row terminators.
pub fn row_writer<W: Write>(inner: W) -> csv::Writer<W> {
    csv::WriterBuilder::new()
        .has_headers(false)
        .terminator(csv::Terminator::Any(b'\n'))
        .from_writer(inner)
}

/// Amounts with at most two decimals are written as `12.30`; anything finer
/// keeps its shortest exact form so that a reload yields the same value.
pub fn format_amount(amount: f64) -> String {
    let cents = (amount * 100.0).round() / 100.0;
    if cents == amount {
        format!("{amount:.2}")
    } else {
        amount.to_string()
    }
}
