//! Import service - bulk user creation from CSV

use std::collections::HashSet;
use std::path::Path;
use std::sync::Arc;

use csv::StringRecord;
use serde::Serialize;
use uuid::Uuid;

use super::UserService;
use crate::domain::result::{Error, Result};
use crate::domain::{NewUser, User};

/// Header holding the user name
pub const NAME_COLUMN: &str = "Name";
/// Header holding the user age
pub const AGE_COLUMN: &str = "Age";

/// Media type accepted for uploads
pub const CSV_CONTENT_TYPE: &str = "text/csv";

/// Reported in place of a name when the row has none
const MISSING_NAME: &str = "N/A";

const IMPORT_MESSAGE: &str = "Processed CSV file.";

/// Import options for CSV processing
#[derive(Debug, Default, Clone, Copy)]
pub struct ImportOptions {
    /// Report what would happen without storing anything
    pub preview: bool,
}

/// Why a row was not imported
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SkipReason {
    /// A user with the same name already exists
    Duplicate,
    /// The row could not be turned into a user
    Invalid(String),
}

/// What happened to a single data row
#[derive(Debug, Clone, PartialEq)]
pub enum RowOutcome {
    Added(User),
    Skipped {
        /// 1-based data row number (the header is not counted)
        row: usize,
        name: String,
        reason: SkipReason,
    },
}

#[derive(Debug, Serialize)]
pub struct ImportResult {
    pub message: String,
    /// Users created (or that would be created, in preview)
    #[serde(rename = "added_users")]
    pub added: usize,
    /// Rows skipped as duplicates or invalid
    #[serde(rename = "skipped_users")]
    pub skipped: usize,
    /// Names of skipped rows, in the order they were encountered
    pub skipped_names: Vec<String>,
    /// Whether this was a preview (no changes applied); only reported when set
    #[serde(skip_serializing_if = "std::ops::Not::not")]
    pub preview: bool,
    /// Per-row outcomes in input order
    #[serde(skip)]
    pub rows: Vec<RowOutcome>,
}

impl ImportResult {
    fn from_outcomes(rows: Vec<RowOutcome>, preview: bool) -> Self {
        let mut added = 0;
        let mut skipped_names = Vec::new();
        for outcome in &rows {
            match outcome {
                RowOutcome::Added(_) => added += 1,
                RowOutcome::Skipped { name, .. } => skipped_names.push(name.clone()),
            }
        }

        Self {
            message: IMPORT_MESSAGE.to_string(),
            added,
            skipped: skipped_names.len(),
            skipped_names,
            preview,
            rows,
        }
    }

    /// Users added by this import
    pub fn added_users(&self) -> impl Iterator<Item = &User> {
        self.rows.iter().filter_map(|outcome| match outcome {
            RowOutcome::Added(user) => Some(user),
            RowOutcome::Skipped { .. } => None,
        })
    }
}

/// A fully parsed CSV document
struct CsvDocument {
    headers: StringRecord,
    rows: Vec<StringRecord>,
}

/// Column positions of the required headers
struct Columns {
    name: usize,
    age: usize,
}

impl Columns {
    fn locate(headers: &StringRecord) -> Result<Self> {
        let name = headers.iter().position(|h| h == NAME_COLUMN);
        let age = headers.iter().position(|h| h == AGE_COLUMN);
        match (name, age) {
            (Some(name), Some(age)) => Ok(Self { name, age }),
            _ => Err(Error::SchemaMismatch(format!(
                "CSV must contain '{}' and '{}' columns.",
                NAME_COLUMN, AGE_COLUMN
            ))),
        }
    }
}

/// Import service for CSV uploads
pub struct ImportService {
    users: Arc<UserService>,
}

impl ImportService {
    pub fn new(users: Arc<UserService>) -> Self {
        Self { users }
    }

    /// Reject uploads whose declared content type is not CSV
    ///
    /// Parameters such as `charset` are ignored; the media type itself is
    /// compared case-insensitively.
    pub fn check_content_type(&self, content_type: Option<&str>) -> Result<()> {
        let media_type = content_type
            .and_then(|ct| ct.split(';').next())
            .map(str::trim);

        match media_type {
            Some(mt) if mt.eq_ignore_ascii_case(CSV_CONTENT_TYPE) => Ok(()),
            _ => Err(Error::InvalidFileType(
                "Please upload a CSV file.".to_string(),
            )),
        }
    }

    /// Import users from a CSV file on disk
    pub fn import_file(&self, path: &Path, options: ImportOptions) -> Result<ImportResult> {
        let bytes = std::fs::read(path)?;
        self.import_bytes(&bytes, options)
    }

    /// Import users from raw CSV bytes
    ///
    /// The document is parsed and the header checked before any row is
    /// touched, so malformed input or a missing column leaves the store
    /// unchanged. After that, rows are handled one at a time and a bad row
    /// only ever shows up as a skip in the result.
    pub fn import_bytes(&self, bytes: &[u8], options: ImportOptions) -> Result<ImportResult> {
        let document = parse_document(bytes)?;
        let columns = Columns::locate(&document.headers)?;

        let mut seen = HashSet::new();
        let mut outcomes = Vec::with_capacity(document.rows.len());

        for (index, record) in document.rows.iter().enumerate() {
            let row = index + 1;
            let outcome = self.import_row(row, record, &columns, options, &mut seen)?;
            outcomes.push(outcome);
        }

        let result = ImportResult::from_outcomes(outcomes, options.preview);
        tracing::info!(
            added = result.added,
            skipped = result.skipped,
            preview = result.preview,
            "CSV import processed"
        );
        Ok(result)
    }

    fn import_row(
        &self,
        row: usize,
        record: &StringRecord,
        columns: &Columns,
        options: ImportOptions,
        seen: &mut HashSet<String>,
    ) -> Result<RowOutcome> {
        let raw_name = record.get(columns.name).filter(|name| !name.is_empty());
        let reported_name = raw_name.unwrap_or(MISSING_NAME).to_string();

        let candidate = match parse_candidate(raw_name, record.get(columns.age)) {
            Ok(candidate) => candidate,
            Err(reason) => {
                tracing::warn!(row, name = %reported_name, %reason, "skipping invalid CSV row");
                return Ok(skipped(row, reported_name, SkipReason::Invalid(reason)));
            }
        };

        let taken = self.users.name_exists(&candidate.name)?
            || (options.preview && seen.contains(&candidate.name));
        if taken {
            tracing::debug!(row, name = %candidate.name, "skipping duplicate name");
            return Ok(skipped(row, candidate.name, SkipReason::Duplicate));
        }

        if options.preview {
            seen.insert(candidate.name.clone());
            return Ok(RowOutcome::Added(User::new(
                Uuid::new_v4(),
                candidate.name,
                candidate.age,
            )));
        }

        let name = candidate.name.clone();
        match self.users.create(candidate) {
            Ok(user) => Ok(RowOutcome::Added(user)),
            // Another writer took the name between the check and the insert
            Err(Error::DuplicateName(_)) => Ok(skipped(row, name, SkipReason::Duplicate)),
            Err(Error::Validation(reason)) => {
                tracing::warn!(row, name = %name, %reason, "skipping invalid CSV row");
                Ok(skipped(row, name, SkipReason::Invalid(reason)))
            }
            Err(e) => Err(e),
        }
    }
}

fn skipped(row: usize, name: String, reason: SkipReason) -> RowOutcome {
    RowOutcome::Skipped { row, name, reason }
}

/// Decode and parse the whole document up front
fn parse_document(bytes: &[u8]) -> Result<CsvDocument> {
    let text = std::str::from_utf8(bytes)
        .map_err(|e| Error::malformed(format!("file is not valid UTF-8: {}", e)))?;
    let text = text.strip_prefix('\u{feff}').unwrap_or(text);

    if text.trim().is_empty() {
        return Err(Error::malformed("No columns to parse from file"));
    }

    // The reader folds an unclosed quote into one field running to EOF
    // instead of failing, so catch it before anything is parsed.
    // Escaped quotes ("") come in pairs and keep the count even.
    if text.bytes().filter(|&b| b == b'"').count() % 2 != 0 {
        return Err(Error::malformed("EOF inside string"));
    }

    let mut reader = csv::ReaderBuilder::new()
        .flexible(true)
        .from_reader(text.as_bytes());

    let headers = reader
        .headers()
        .map_err(|e| Error::malformed(e.to_string()))?
        .clone();

    let mut rows = Vec::new();
    for record in reader.records() {
        let record = record.map_err(|e| Error::malformed(e.to_string()))?;
        if record.len() > headers.len() {
            let line = record.position().map(|p| p.line()).unwrap_or_default();
            return Err(Error::malformed(format!(
                "Expected {} fields in line {}, saw {}",
                headers.len(),
                line,
                record.len()
            )));
        }
        rows.push(record);
    }

    Ok(CsvDocument { headers, rows })
}

/// Build a create payload from the raw name and age cells
fn parse_candidate(name: Option<&str>, age: Option<&str>) -> std::result::Result<NewUser, String> {
    let name = name.ok_or_else(|| "missing name".to_string())?;
    let age = parse_age(age.unwrap_or(""))?;
    Ok(NewUser::new(name, age))
}

/// Parse an age cell as a whole number
///
/// Accepts integer text and decimals with no fractional part ("30.0").
fn parse_age(cell: &str) -> std::result::Result<i64, String> {
    let cell = cell.trim();
    if cell.is_empty() {
        return Err("missing age".to_string());
    }

    if let Ok(age) = cell.parse::<i64>() {
        return Ok(age);
    }

    match cell.parse::<f64>() {
        Ok(value)
            if value.is_finite()
                && value.fract() == 0.0
                && value >= i64::MIN as f64
                && value < i64::MAX as f64 =>
        {
            Ok(value as i64)
        }
        _ => Err(format!("invalid age '{}'", cell)),
    }
}
