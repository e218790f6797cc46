//! Tabular fixture data.
//!
//! The fixture workbook is either a spreadsheet file (`.xlsx`, `.xls`, `.ods`)
//! or a directory holding one CSV file per sheet (`GetRequests.csv`,
//! `PostRequests.csv`, ...). The first row of each sheet names the columns;
//! every later non-blank row is one [`Row`]. Rows are looked up by their
//! `testCase` column.
//!
//! Recognized columns:
//!
//! | Column | Meaning |
//! |--------|---------|
//! | `testCase` | Test title the row belongs to |
//! | `expectedStatus` | Expected HTTP status |
//! | `expectedResponseCode` | Expected `responseCode` in the body |
//! | `expectedMessage` | Expected `message` in the body (optional) |
//! | `payload` | Request payload as a JSON object (optional) |
//!
//! Any other column (`email`, `password`, `search_product`, ...) is available
//! through [`Row::get`].

use std::collections::{BTreeMap, HashMap};
use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use apicheck_harness::{ConfigurationError, Payload};
use calamine::{Data, Range, Reader};
use serde_json::Value;
use tracing::debug;

const TEST_CASE_COLUMN: &str = "testCase";

const WORKBOOK_EXTENSIONS: [&str; 5] = ["xlsx", "xlsm", "xlsb", "xls", "ods"];

/// One fixture row.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Row {
    sheet: String,
    fields: HashMap<String, String>,
}

impl Row {
    /// The sheet this row was read from.
    pub fn sheet(&self) -> &str {
        &self.sheet
    }

    /// The row's `testCase` value.
    pub fn test_case(&self) -> &str {
        self.get(TEST_CASE_COLUMN).unwrap_or_default()
    }

    /// A column's value; empty cells read as absent.
    pub fn get(&self, column: &str) -> Option<&str> {
        self.fields
            .get(column)
            .map(|v| v.trim())
            .filter(|v| !v.is_empty())
    }

    /// A column that must be present.
    pub fn require(&self, column: &str) -> Result<&str, ConfigurationError> {
        self.get(column)
            .ok_or_else(|| self.invalid(column, "value is missing".to_string()))
    }

    /// The expected HTTP status.
    pub fn expected_status(&self) -> Result<u16, ConfigurationError> {
        let raw = self.require("expectedStatus")?;
        parse_whole(raw)
            .and_then(|n| u16::try_from(n).ok())
            .ok_or_else(|| self.invalid("expectedStatus", format!("'{}' is not an HTTP status", raw)))
    }

    /// The expected business `responseCode`.
    pub fn expected_response_code(&self) -> Result<i64, ConfigurationError> {
        let raw = self.require("expectedResponseCode")?;
        parse_whole(raw).ok_or_else(|| {
            self.invalid(
                "expectedResponseCode",
                format!("'{}' is not an integer", raw),
            )
        })
    }

    /// The expected business `message`, when the row checks one.
    pub fn expected_message(&self) -> Option<&str> {
        self.get("expectedMessage")
    }

    /// The `payload` column parsed as a JSON object; empty when absent.
    pub fn payload(&self) -> Result<Payload, ConfigurationError> {
        let Some(raw) = self.get("payload") else {
            return Ok(Payload::new());
        };
        match serde_json::from_str::<Value>(raw) {
            Ok(Value::Object(map)) => Ok(map),
            Ok(other) => Err(self.invalid(
                "payload",
                format!("expected a JSON object, found {}", other),
            )),
            Err(e) => Err(self.invalid("payload", e.to_string())),
        }
    }

    fn invalid(&self, field: &str, reason: String) -> ConfigurationError {
        ConfigurationError::InvalidField {
            test_case: self.test_case().to_string(),
            field: field.to_string(),
            reason,
        }
    }
}

/// Cells exported from spreadsheets may carry a `.0` suffix.
fn parse_whole(raw: &str) -> Option<i64> {
    raw.parse::<i64>().ok().or_else(|| {
        raw.parse::<f64>()
            .ok()
            .filter(|n| n.fract() == 0.0)
            .map(|n| n as i64)
    })
}

/// The loaded fixture workbook. Read-only after [`open`](Self::open).
#[derive(Debug, Clone, Default)]
pub struct TestData {
    source: PathBuf,
    sheets: BTreeMap<String, Vec<Row>>,
}

impl TestData {
    /// Loads a spreadsheet workbook, or every `<Sheet>.csv` file when `path`
    /// is a directory.
    pub fn open(path: impl AsRef<Path>) -> Result<Self, ConfigurationError> {
        let path = path.as_ref();
        let unavailable = |reason: String| ConfigurationError::DataSourceUnavailable {
            path: path.display().to_string(),
            reason,
        };

        let sheets = if is_workbook(path) {
            read_workbook(path).map_err(|e| unavailable(e.to_string()))?
        } else {
            read_csv_dir(path).map_err(unavailable)?
        };

        if sheets.is_empty() {
            return Err(unavailable("no sheets found".to_string()));
        }
        for (sheet, rows) in &sheets {
            debug!(sheet = sheet.as_str(), rows = rows.len(), "Loaded fixture sheet");
        }
        Ok(Self {
            source: path.to_path_buf(),
            sheets,
        })
    }

    /// Builds a workbook from in-memory CSV sheets.
    pub fn from_sheets<'a>(
        sheets: impl IntoIterator<Item = (&'a str, &'a str)>,
    ) -> Result<Self, ConfigurationError> {
        let mut data = Self::default();
        for (name, content) in sheets {
            let rows = parse_sheet(name, content.as_bytes()).map_err(|e| {
                ConfigurationError::DataSourceUnavailable {
                    path: name.to_string(),
                    reason: e.to_string(),
                }
            })?;
            data.sheets.insert(name.to_string(), rows);
        }
        Ok(data)
    }

    /// Where the data was loaded from.
    pub fn source(&self) -> &Path {
        &self.source
    }

    /// Sheet names, sorted.
    pub fn sheet_names(&self) -> Vec<&str> {
        self.sheets.keys().map(String::as_str).collect()
    }

    /// All rows of a sheet.
    pub fn load_sheet(&self, sheet: &str) -> Result<&[Row], ConfigurationError> {
        self.sheets
            .get(sheet)
            .map(Vec::as_slice)
            .ok_or_else(|| ConfigurationError::SheetNotFound {
                sheet: sheet.to_string(),
            })
    }

    /// The row of `sheet` whose `testCase` equals `test_case`.
    pub fn find_case(&self, sheet: &str, test_case: &str) -> Result<&Row, ConfigurationError> {
        self.load_sheet(sheet)?
            .iter()
            .find(|row| row.test_case() == test_case)
            .ok_or_else(|| ConfigurationError::TestCaseNotFound {
                sheet: sheet.to_string(),
                test_case: test_case.to_string(),
            })
    }
}

fn is_workbook(path: &Path) -> bool {
    path.extension()
        .and_then(|ext| ext.to_str())
        .is_some_and(|ext| {
            WORKBOOK_EXTENSIONS
                .iter()
                .any(|known| ext.eq_ignore_ascii_case(known))
        })
}

fn read_workbook(path: &Path) -> Result<BTreeMap<String, Vec<Row>>, calamine::Error> {
    let mut workbook = calamine::open_workbook_auto(path)?;
    let mut sheets = BTreeMap::new();
    for name in workbook.sheet_names() {
        let range = workbook.worksheet_range(&name)?;
        let rows = rows_from_range(&name, &range);
        sheets.insert(name, rows);
    }
    Ok(sheets)
}

/// The first row names the columns. Blank rows are skipped.
fn rows_from_range(sheet: &str, range: &Range<Data>) -> Vec<Row> {
    let mut cells = range.rows();
    let Some(header) = cells.next() else {
        return Vec::new();
    };
    let headers: Vec<String> = header.iter().map(|c| c.to_string().trim().to_string()).collect();

    cells
        .filter(|row| row.iter().any(|c| !matches!(c, Data::Empty)))
        .map(|row| Row {
            sheet: sheet.to_string(),
            fields: headers
                .iter()
                .zip(row)
                .filter(|(column, _)| !column.is_empty())
                .map(|(column, cell)| (column.clone(), cell.to_string()))
                .collect(),
        })
        .collect()
}

fn read_csv_dir(dir: &Path) -> Result<BTreeMap<String, Vec<Row>>, String> {
    let entries = fs::read_dir(dir).map_err(|e| e.to_string())?;
    let mut sheets = BTreeMap::new();

    for entry in entries {
        let path = entry.map_err(|e| e.to_string())?.path();
        let is_csv = path
            .extension()
            .is_some_and(|ext| ext.eq_ignore_ascii_case("csv"));
        let Some(sheet) = path.file_stem().and_then(|s| s.to_str()) else {
            continue;
        };
        if !is_csv {
            continue;
        }

        let file = fs::File::open(&path).map_err(|e| e.to_string())?;
        let rows = parse_sheet(sheet, file).map_err(|e| format!("{}: {}", path.display(), e))?;
        sheets.insert(sheet.to_string(), rows);
    }
    Ok(sheets)
}

fn parse_sheet<R: io::Read>(sheet: &str, reader: R) -> Result<Vec<Row>, csv::Error> {
    let mut reader = csv::ReaderBuilder::new()
        .has_headers(true)
        .flexible(true)
        .trim(csv::Trim::Headers)
        .from_reader(reader);

    let headers = reader.headers()?.clone();
    let mut rows = Vec::new();
    for record in reader.records() {
        let record = record?;
        let fields = headers
            .iter()
            .zip(record.iter())
            .map(|(column, value)| (column.to_string(), value.to_string()))
            .collect();
        rows.push(Row {
            sheet: sheet.to_string(),
            fields,
        });
    }
    Ok(rows)
}
