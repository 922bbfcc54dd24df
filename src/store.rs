//! Flat-file storage for expense records.
//!
//! Files are single-writer and single-process: there is no locking, and two
//! processes appending to the same live file at once is unsupported.

use std::collections::BTreeMap;
use std::fs::{self, OpenOptions};
use std::io::{Read, Seek, SeekFrom, Write};
use std::path::{Path, PathBuf};

use chrono::NaiveDate;
use sha2::{Digest, Sha256};

use crate::error::{CarnetError, Result};
use crate::models::{ExpenseRecord, YearMonth};
use crate::schema::Schema;
use crate::taxonomy::Taxonomy;

/// Records read from one or more files, plus how many rows were unusable.
#[derive(Debug, Default, Clone)]
pub struct Loaded {
    /// Layout detected from the header; `None` for a missing or empty file,
    /// or when several files were combined.
    pub schema: Option<Schema>,
    pub records: Vec<ExpenseRecord>,
    pub skipped: usize,
}

impl Loaded {
    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }
}

// ---------------------------------------------------------------------------
// initialize / append
// ---------------------------------------------------------------------------

/// Give `path` a header row unless it already has content. Returns whether
/// the header was written.
pub fn initialize(path: &Path, schema: Schema) -> Result<bool> {
    if path.exists() && fs::metadata(path)?.len() > 0 {
        return Ok(false);
    }
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent)?;
    }
    fs::write(path, format!("{}\n", schema.header_line()))?;
    tracing::debug!(path = %path.display(), ?schema, "initialized expense file");
    Ok(true)
}

/// Append one record. The file's own header decides the layout; `schema` is
/// only used when the file has to be created.
pub fn append(path: &Path, schema: Schema, record: &ExpenseRecord) -> Result<Schema> {
    append_all(path, schema, std::slice::from_ref(record))
}

/// Append several records with a single write.
pub fn append_all(path: &Path, schema: Schema, records: &[ExpenseRecord]) -> Result<Schema> {
    initialize(path, schema)?;
    let schema = match file_schema(path)? {
        Some(Schema::Legacy) | None => {
            return Err(CarnetError::Other(format!(
                "{} is not a writable expense file",
                path.display()
            )))
        }
        Some(s) => s,
    };

    let mut buf = String::new();
    if !ends_with_newline(path)? {
        buf.push('\n');
    }
    for record in records {
        buf.push_str(&schema.to_line(record)?);
        buf.push('\n');
    }

    let mut file = OpenOptions::new().append(true).open(path)?;
    file.write_all(buf.as_bytes())?;
    tracing::debug!(path = %path.display(), count = records.len(), "appended records");
    Ok(schema)
}

fn file_schema(path: &Path) -> Result<Option<Schema>> {
    let mut rdr = csv::ReaderBuilder::new()
        .has_headers(false)
        .flexible(true)
        .from_path(path)?;
    match rdr.records().next() {
        Some(header) => Ok(Schema::detect(&header?)),
        None => Ok(None),
    }
}

fn ends_with_newline(path: &Path) -> Result<bool> {
    let mut file = fs::File::open(path)?;
    let len = file.metadata()?.len();
    if len == 0 {
        return Ok(true);
    }
    file.seek(SeekFrom::Start(len - 1))?;
    let mut last = [0u8; 1];
    file.read_exact(&mut last)?;
    Ok(last[0] == b'\n')
}

// ---------------------------------------------------------------------------
// load
// ---------------------------------------------------------------------------

/// Read every record of `path`. A missing, empty or header-only file yields
/// no records. Rows that do not parse are skipped and counted.
pub fn load(path: &Path) -> Result<Loaded> {
    if !path.exists() {
        return Ok(Loaded::default());
    }
    let mut rdr = csv::ReaderBuilder::new()
        .has_headers(false)
        .flexible(true)
        .from_path(path)?;
    let mut rows = rdr.records();

    let header = match rows.next() {
        Some(h) => h?,
        None => return Ok(Loaded::default()),
    };
    let schema = Schema::detect(&header).ok_or_else(|| CarnetError::UnknownHeader {
        path: path.to_path_buf(),
        header: header.iter().collect::<Vec<_>>().join(","),
    })?;

    let mut records = Vec::new();
    let mut skipped = 0usize;
    for row in rows {
        let parsed = row
            .map_err(|e| crate::error::ParseError::Malformed(e.to_string()))
            .and_then(|r| schema.parse_row(&r));
        match parsed {
            Ok(record) => records.push(record),
            Err(e) => {
                tracing::debug!(path = %path.display(), error = %e, "skipping row");
                skipped += 1;
            }
        }
    }
    if skipped > 0 {
        tracing::warn!(path = %path.display(), skipped, "skipped malformed rows");
    }

    Ok(Loaded {
        schema: Some(schema),
        records,
        skipped,
    })
}

/// Load several files back to back, e.g. the live file and every archive.
pub fn load_many(paths: &[PathBuf]) -> Result<Loaded> {
    let mut combined = Loaded::default();
    for path in paths {
        let loaded = load(path)?;
        combined.records.extend(loaded.records);
        combined.skipped += loaded.skipped;
    }
    Ok(combined)
}

/// Every `*.csv` in `dir`, sorted by name. A missing directory is empty.
pub fn history_files(dir: &Path) -> Result<Vec<PathBuf>> {
    if !dir.exists() {
        return Ok(Vec::new());
    }
    let mut files = Vec::new();
    for entry in fs::read_dir(dir)? {
        let path = entry?.path();
        if path.is_file() && path.extension().and_then(|e| e.to_str()) == Some("csv") {
            files.push(path);
        }
    }
    files.sort();
    Ok(files)
}

// ---------------------------------------------------------------------------
// archive
// ---------------------------------------------------------------------------

#[derive(Debug, PartialEq)]
pub enum ArchiveOutcome {
    Archived { path: PathBuf, records: usize },
    NothingToArchive,
}

fn checksum(data: &[u8]) -> String {
    let mut hasher = Sha256::new();
    hasher.update(data);
    hex::encode(hasher.finalize())
}

fn archive_name(month: YearMonth, version: usize) -> String {
    if version <= 1 {
        format!("{}_expenses.csv", month.month_name_year())
    } else {
        format!("{}_expenses_{version}.csv", month.month_name_year())
    }
}

/// Copy the live file into `history_dir` under the month of `today`, then
/// reset the live file to its header.
///
/// An existing archive for the same month is never overwritten; the copy goes
/// to the next versioned name (`March_2024_expenses_2.csv`, ...), even when its
/// content matches an earlier archive. The live file is only reset once the
/// copy's SHA-256 matches the live content.
pub fn archive(live: &Path, history_dir: &Path, today: NaiveDate) -> Result<ArchiveOutcome> {
    let loaded = load(live)?;
    if loaded.is_empty() && loaded.skipped == 0 {
        return Ok(ArchiveOutcome::NothingToArchive);
    }
    let schema = loaded.schema.unwrap_or_default();

    fs::create_dir_all(history_dir)?;
    let content = fs::read(live)?;
    let digest = checksum(&content);
    let month = YearMonth::of(today);

    let target = (1..)
        .map(|version| history_dir.join(archive_name(month, version)))
        .find(|candidate| !candidate.exists())
        .ok_or_else(|| CarnetError::Other("no free archive name".into()))?;

    fs::write(&target, &content)?;
    if checksum(&fs::read(&target)?) != digest {
        return Err(CarnetError::Other(format!(
            "archive {} does not match the live file; live file kept",
            target.display()
        )));
    }
    reset(live, schema)?;
    tracing::info!(
        path = %target.display(),
        records = loaded.records.len(),
        sha256 = %digest,
        "archived live file"
    );
    Ok(ArchiveOutcome::Archived {
        path: target,
        records: loaded.records.len(),
    })
}

fn reset(live: &Path, schema: Schema) -> Result<()> {
    fs::write(live, format!("{}\n", schema.header_line()))?;
    Ok(())
}

// ---------------------------------------------------------------------------
// legacy import
// ---------------------------------------------------------------------------

#[derive(Debug, Default, PartialEq)]
pub struct ImportResult {
    pub imported: usize,
    pub skipped: usize,
    /// Rows whose account or category fell outside the taxonomy.
    pub coerced: usize,
}

/// Map a `Date,Account,Category,Amount` file onto canonical records and
/// append them to the live file.
pub fn import_legacy(
    source: &Path,
    live: &Path,
    live_schema: Schema,
    taxonomy: &Taxonomy,
    account_map: &BTreeMap<String, String>,
) -> Result<ImportResult> {
    if !source.exists() {
        return Err(CarnetError::Io(std::io::Error::new(
            std::io::ErrorKind::NotFound,
            format!("{} not found", source.display()),
        )));
    }
    let loaded = load(source)?;
    if loaded.schema != Some(Schema::Legacy) {
        return Err(CarnetError::NotLegacy(source.to_path_buf()));
    }

    let mut coerced = 0usize;
    let records: Vec<ExpenseRecord> = loaded
        .records
        .into_iter()
        .map(|r| {
            let mapped = account_map.get(&r.account).unwrap_or(&r.account);
            let account = taxonomy.coerce_account(mapped);
            let category = taxonomy.coerce_category(&r.category);
            if account.defaulted || category.defaulted {
                coerced += 1;
            }
            ExpenseRecord {
                account: account.value,
                category: category.value,
                ..r
            }
        })
        .collect();

    if !records.is_empty() {
        append_all(live, live_schema, &records)?;
    }
    tracing::info!(
        source = %source.display(),
        imported = records.len(),
        skipped = loaded.skipped,
        coerced,
        "imported legacy file"
    );
    Ok(ImportResult {
        imported: records.len(),
        skipped: loaded.skipped,
        coerced,
    })
}
