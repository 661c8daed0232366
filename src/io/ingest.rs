//! CSV ingest and normalization.
//!
//! Turns the cleaned loan export into `LoanRecord`s:
//! - **Strict schema** for required columns (exit code 2 when one is missing)
//! - **Row-level validation** (bad rows are skipped and reported, not fatal)
//! - **One cosmetic rewrite**: `purpose` underscores become spaces

use std::collections::HashMap;
use std::fs::File;
use std::io::Read;
use std::path::{Path, PathBuf};

use chrono::{Datelike, NaiveDate, NaiveDateTime, Weekday};
use csv::StringRecord;
use tracing::{debug, info, warn};

use crate::domain::{LoanCondition, LoanRecord};
use crate::error::AppError;

const REQUIRED_COLUMNS: [&str; 8] = [
    "id",
    "loan_amount",
    "interest_rate",
    "issue_date",
    "purpose",
    "term",
    "loan_condition",
    "grade",
];

/// How many row errors to echo into the log before summarizing.
const LOGGED_ROW_ERRORS: usize = 5;

/// A row-level error encountered during ingest.
#[derive(Debug, Clone, PartialEq)]
pub struct RowError {
    pub line: usize,
    pub id: Option<String>,
    pub message: String,
}

/// The loaded dataset: normalized records plus what was skipped.
#[derive(Debug, Clone)]
pub struct LoanTable {
    pub records: Vec<LoanRecord>,
    pub source: PathBuf,
    pub row_errors: Vec<RowError>,
    pub rows_read: usize,
}

impl LoanTable {
    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }
}

/// Load the dataset at `path`.
pub fn load_loans(path: &Path) -> Result<LoanTable, AppError> {
    let file = File::open(path)
        .map_err(|e| AppError::input(format!("Failed to open dataset '{}': {e}", path.display())))?;

    let mut table = read_loans(file)?;
    table.source = path.to_path_buf();

    info!(
        path = %path.display(),
        rows_read = table.rows_read,
        rows_used = table.records.len(),
        rows_skipped = table.row_errors.len(),
        "loaded loan dataset"
    );
    for err in table.row_errors.iter().take(LOGGED_ROW_ERRORS) {
        warn!(line = err.line, id = err.id.as_deref().unwrap_or("-"), "skipped row: {}", err.message);
    }
    if table.row_errors.len() > LOGGED_ROW_ERRORS {
        warn!("{} more rows skipped", table.row_errors.len() - LOGGED_ROW_ERRORS);
    }

    Ok(table)
}

/// Parse a CSV stream into a `LoanTable` (the `source` is left empty).
pub fn read_loans<R: Read>(input: R) -> Result<LoanTable, AppError> {
    let mut reader = csv::ReaderBuilder::new()
        .flexible(true)
        .trim(csv::Trim::All)
        .from_reader(input);

    let headers = reader
        .headers()
        .map_err(|e| AppError::input(format!("Failed to read CSV headers: {e}")))?
        .clone();

    let header_map = build_header_map(&headers);
    ensure_required_columns_exist(&header_map)?;

    let mut records = Vec::new();
    let mut row_errors = Vec::new();
    let mut rows_read = 0usize;

    for (idx, result) in reader.records().enumerate() {
        // Data starts on line 2, after the header.
        let line = idx + 2;
        rows_read += 1;

        let record = match result {
            Ok(r) => r,
            Err(e) => {
                row_errors.push(RowError {
                    line,
                    id: None,
                    message: format!("CSV parse error: {e}"),
                });
                continue;
            }
        };

        match parse_row(&record, &header_map) {
            Ok(loan) => records.push(loan),
            Err(message) => row_errors.push(RowError {
                line,
                id: get_optional(&record, &header_map, "id").map(str::to_string),
                message,
            }),
        }
    }

    if records.is_empty() {
        return Err(AppError::no_data(format!(
            "No valid loan rows (read {rows_read}, rejected {}).",
            row_errors.len()
        )));
    }
    debug!(rows = records.len(), "parsed loan rows");

    Ok(LoanTable {
        records,
        source: PathBuf::new(),
        row_errors,
        rows_read,
    })
}

/// Replace every underscore in a purpose label with a space.
///
/// Idempotent: the output contains no `_`, so a second pass changes nothing.
pub fn normalize_purpose(raw: &str) -> String {
    raw.replace('_', " ")
}

fn build_header_map(headers: &StringRecord) -> HashMap<String, usize> {
    headers
        .iter()
        .enumerate()
        .map(|(idx, name)| (normalize_header_name(name), idx))
        .collect()
}

fn normalize_header_name(name: &str) -> String {
    // Spreadsheet exports often prefix the first header with a UTF-8 BOM.
    let name = name.trim().trim_start_matches('\u{feff}');
    name.to_ascii_lowercase()
}

fn ensure_required_columns_exist(header_map: &HashMap<String, usize>) -> Result<(), AppError> {
    let missing: Vec<&str> = REQUIRED_COLUMNS
        .iter()
        .copied()
        .filter(|c| !header_map.contains_key(*c))
        .collect();
    if missing.is_empty() {
        return Ok(());
    }
    Err(AppError::input(format!(
        "Missing required column(s): {}",
        missing
            .iter()
            .map(|c| format!("`{c}`"))
            .collect::<Vec<_>>()
            .join(", ")
    )))
}

fn parse_row(record: &StringRecord, header_map: &HashMap<String, usize>) -> Result<LoanRecord, String> {
    let id = get_required(record, header_map, "id")?.to_string();
    let loan_amount = parse_f64(get_required(record, header_map, "loan_amount")?, "loan_amount")?;
    let interest_rate = parse_f64(get_required(record, header_map, "interest_rate")?, "interest_rate")?;
    let issue_date = parse_date(get_required(record, header_map, "issue_date")?)?;

    let issue_weekday = match get_optional(record, header_map, "issue_weekday") {
        Some(s) => parse_weekday(s)?,
        None => issue_date.weekday(),
    };

    let purpose = normalize_purpose(get_required(record, header_map, "purpose")?);
    let term = get_required(record, header_map, "term")?.to_string();
    let grade = get_required(record, header_map, "grade")?.to_string();

    let condition_raw = get_required(record, header_map, "loan_condition")?;
    let loan_condition = LoanCondition::from_label(condition_raw).ok_or_else(|| {
        format!("Invalid loan_condition '{condition_raw}'. Expected `Good Loan` or `Bad Loan`.")
    })?;

    Ok(LoanRecord {
        id,
        loan_amount,
        interest_rate,
        issue_date,
        issue_weekday,
        purpose,
        term,
        loan_condition,
        grade,
    })
}

fn get_required<'a>(
    record: &'a StringRecord,
    header_map: &HashMap<String, usize>,
    name: &str,
) -> Result<&'a str, String> {
    let idx = header_map
        .get(name)
        .ok_or_else(|| format!("Missing required column: `{name}`"))?;
    record
        .get(*idx)
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .ok_or_else(|| format!("Missing required value: `{name}`"))
}

fn get_optional<'a>(record: &'a StringRecord, header_map: &HashMap<String, usize>, name: &str) -> Option<&'a str> {
    let idx = header_map.get(name)?;
    record.get(*idx).map(str::trim).filter(|s| !s.is_empty())
}

fn parse_f64(s: &str, column: &str) -> Result<f64, String> {
    match s.parse::<f64>() {
        Ok(v) if v.is_finite() => Ok(v),
        _ => Err(format!("Invalid `{column}` value '{s}'.")),
    }
}

fn parse_date(s: &str) -> Result<NaiveDate, String> {
    const FMTS: [&str; 4] = ["%Y-%m-%d", "%d/%m/%Y", "%d-%m-%Y", "%Y/%m/%d"];
    for fmt in FMTS {
        if let Ok(d) = NaiveDate::parse_from_str(s, fmt) {
            return Ok(d);
        }
    }
    // Dataframe exports frequently serialize dates as midnight timestamps.
    for fmt in ["%Y-%m-%d %H:%M:%S", "%Y-%m-%dT%H:%M:%S"] {
        if let Ok(dt) = NaiveDateTime::parse_from_str(s, fmt) {
            return Ok(dt.date());
        }
    }
    Err(format!(
        "Invalid date '{s}'. Expected one of: YYYY-MM-DD, DD/MM/YYYY, DD-MM-YYYY, YYYY/MM/DD."
    ))
}

fn parse_weekday(s: &str) -> Result<Weekday, String> {
    s.parse::<Weekday>()
        .map_err(|_| format!("Invalid issue_weekday '{s}'."))
}

#[cfg(test)]
mod tests {
    use super::*;

    const HEADER: &str = "id,loan_amount,interest_rate,issue_date,issue_weekday,purpose,term,loan_condition,grade\n";

    #[test]
    fn normalize_purpose_is_idempotent() {
        let once = normalize_purpose("debt_consolidation");
        assert_eq!(once, "debt consolidation");
        assert_eq!(normalize_purpose(&once), once);
        assert_eq!(normalize_purpose("__a__"), "  a  ");
        assert_eq!(normalize_purpose(&normalize_purpose("__a__")), "  a  ");
        assert!(!normalize_purpose("a_b_c").contains('_'));
    }

    #[test]
    fn reads_rows_and_rewrites_purpose() {
        let csv = format!(
            "{HEADER}1,100,10.5,2014-01-06,Monday,credit_card, 36 months,Good Loan,B\n\
             2,200,12.0,2014-01-07,Tuesday,home_improvement, 60 months,Bad Loan,C\n"
        );
        let table = read_loans(csv.as_bytes()).unwrap();
        assert_eq!(table.len(), 2);
        assert_eq!(table.rows_read, 2);
        assert_eq!(table.records[0].purpose, "credit card");
        assert_eq!(table.records[1].purpose, "home improvement");
        assert_eq!(table.records[1].loan_condition, LoanCondition::Bad);
        assert_eq!(table.records[0].term, "36 months");
    }

    #[test]
    fn weekday_is_derived_when_column_missing() {
        let csv = "id,loan_amount,interest_rate,issue_date,purpose,term,loan_condition,grade\n\
                   1,100,10,2014-01-05,car,36 months,Good Loan,A\n";
        let table = read_loans(csv.as_bytes()).unwrap();
        assert_eq!(table.records[0].issue_weekday, Weekday::Sun);
    }

    #[test]
    fn bad_rows_are_skipped_and_reported() {
        let csv = format!(
            "{HEADER}1,100,10,2014-01-06,Monday,car,36 months,Good Loan,A\n\
             2,abc,10,2014-01-06,Monday,car,36 months,Good Loan,A\n\
             3,100,10,2014-01-06,Monday,car,36 months,Default,A\n\
             4,100,10,2014-01-06,Monday,car,36 months,good,A\n"
        );
        let table = read_loans(csv.as_bytes()).unwrap();
        assert_eq!(table.len(), 1);
        assert_eq!(table.row_errors.len(), 3);
        assert_eq!(table.row_errors[2].id.as_deref(), Some("4"));
        assert_eq!(table.row_errors[0].line, 3);
        assert_eq!(table.row_errors[1].id.as_deref(), Some("3"));
    }

    #[test]
    fn missing_column_is_an_input_error() {
        let csv = "id,loan_amount\n1,100\n";
        let err = read_loans(csv.as_bytes()).unwrap_err();
        assert_eq!(err.exit_code(), 2);
        assert!(err.to_string().contains("`interest_rate`"));
    }

    #[test]
    fn no_valid_rows_is_a_no_data_error() {
        let err = read_loans(HEADER.as_bytes()).unwrap_err();
        assert_eq!(err.exit_code(), 3);
    }

    #[test]
    fn accepts_bom_and_timestamp_dates() {
        let csv = "\u{feff}ID,Loan_Amount,interest_rate,issue_date,purpose,term,loan_condition,grade\n\
                   1,100,10,2014-01-06 00:00:00,car,36 months,good loan,A\n\
                   2,100,10,07/01/2014,car,36 months,Good Loan,A\n\
                   3,100,10,08-01-2014,car,36 months,Good Loan,A\n\
                   4,100,10,2014/01/09,car,36 months,Good Loan,A\n";
        let table = read_loans(csv.as_bytes()).unwrap();
        assert!(table.row_errors.is_empty());
        let days: Vec<u32> = table.records.iter().map(|r| r.issue_date.day()).collect();
        assert_eq!(days, [6, 7, 8, 9]);
        assert!(table.records.iter().all(|r| r.issue_date.month() == 1 && r.issue_date.year() == 2014));
        assert_eq!(table.records[0].loan_condition, LoanCondition::Good);
    }
}
