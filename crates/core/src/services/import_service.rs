use csv::ReaderBuilder;
use std::collections::BTreeMap;

use crate::errors::CoreError;
use crate::models::holding::HoldingRow;

/// Columns every holdings export must provide (after header normalization).
pub const REQUIRED_COLUMNS: [&str; 4] = ["instrument", "qty", "avg cost", "ltp"];

/// Optional column holding a trusted type label.
pub const TYPE_COLUMN: &str = "type";

/// Names the pipeline writes itself; export columns with these names are dropped.
const DERIVED_COLUMNS: [&str; 4] = ["invested", "current_value", "pnl", "pnl_percent"];

/// Normalize an export header so differently styled exports line up:
/// trim, drop `"` and `.`, lower-case.
///
/// `"Qty."`, `" QTY "` and `qty` all become `qty`; `Avg. cost` becomes `avg cost`.
/// Applying it twice gives the same result as applying it once.
pub fn normalize_header(raw: &str) -> String {
    // A UTF-8 byte order mark counts as padding alongside whitespace.
    let is_padding = |c: char| c.is_whitespace() || c == '\u{feff}';
    raw.trim_matches(is_padding)
        .replace(['"', '.'], "")
        .trim_matches(is_padding)
        .to_lowercase()
}

/// Parse a numeric cell, tolerating surrounding whitespace and `,` thousands
/// separators. Blank cells are not numbers.
pub fn parse_number(raw: &str) -> Option<f64> {
    let cleaned: String = raw.trim().chars().filter(|c| *c != ',').collect();
    if cleaned.is_empty() {
        return None;
    }
    cleaned.parse::<f64>().ok()
}

/// A parsed export: normalized headers plus raw cell text, in file order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HoldingsTable {
    pub headers: Vec<String>,
    pub records: Vec<Vec<String>>,
}

/// Resolved positions of the columns the pipeline reads.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct ColumnIndex {
    instrument: usize,
    qty: usize,
    avg_cost: usize,
    ltp: usize,
    holding_type: Option<usize>,
}

impl HoldingsTable {
    /// Position of a normalized column; the first one wins if the name repeats.
    pub fn column(&self, name: &str) -> Option<usize> {
        self.headers.iter().position(|h| h == name)
    }

    pub fn has_column(&self, name: &str) -> bool {
        self.column(name).is_some()
    }

    /// Required columns absent from this table, in [`REQUIRED_COLUMNS`] order.
    pub fn missing_required(&self) -> Vec<String> {
        REQUIRED_COLUMNS
            .iter()
            .filter(|c| !self.has_column(c))
            .map(|c| c.to_string())
            .collect()
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    fn column_index(&self) -> Result<ColumnIndex, CoreError> {
        let missing = self.missing_required();
        let find = |name: &str| {
            self.column(name)
                .ok_or_else(|| CoreError::MissingColumns(missing.clone()))
        };
        Ok(ColumnIndex {
            instrument: find("instrument")?,
            qty: find("qty")?,
            avg_cost: find("avg cost")?,
            ltp: find("ltp")?,
            holding_type: self.column(TYPE_COLUMN),
        })
    }

    /// Columns passed through to the table view untouched: everything that is not
    /// read or written by the pipeline, not blank, and not a repeat.
    fn passthrough_columns(&self) -> Vec<(usize, &str)> {
        self.headers
            .iter()
            .enumerate()
            .filter(|(idx, name)| {
                !name.is_empty()
                    && !REQUIRED_COLUMNS.contains(&name.as_str())
                    && !DERIVED_COLUMNS.contains(&name.as_str())
                    && name.as_str() != TYPE_COLUMN
                    && self.column(name) == Some(*idx)
            })
            .map(|(idx, name)| (idx, name.as_str()))
            .collect()
    }
}

/// Reads brokerage holdings exports into typed rows.
///
/// Pure parsing: no I/O beyond the byte buffer it is handed.
pub struct ImportService;

impl ImportService {
    pub fn new() -> Self {
        Self
    }

    /// Parse raw CSV bytes into a table with normalized headers.
    ///
    /// Fails with `MissingColumns` naming every absent required column, or with
    /// `Encoding` / `Malformed` / `EmptyFile` when the file itself is unusable.
    pub fn parse_table(&self, bytes: &[u8]) -> Result<HoldingsTable, CoreError> {
        let text = std::str::from_utf8(bytes)?;

        let mut reader = ReaderBuilder::new()
            .has_headers(true)
            .flexible(false)
            .from_reader(text.as_bytes());

        let headers: Vec<String> = reader.headers()?.iter().map(normalize_header).collect();
        if headers.iter().all(|h| h.is_empty()) {
            return Err(CoreError::EmptyFile);
        }

        for (idx, name) in headers.iter().enumerate() {
            if !name.is_empty() && headers[..idx].contains(name) {
                log::warn!("Duplicate column '{name}' after normalization; using the first one");
            }
        }

        let mut records = Vec::new();
        for result in reader.records() {
            let record = result?;
            records.push(record.iter().map(str::to_string).collect());
        }

        let table = HoldingsTable { headers, records };
        log::debug!(
            "Parsed holdings table: {} rows, columns {:?}",
            table.len(),
            table.headers
        );

        let missing = table.missing_required();
        if !missing.is_empty() {
            return Err(CoreError::MissingColumns(missing));
        }

        Ok(table)
    }

    /// Convert table records into holding rows with derived metrics.
    ///
    /// Every row must carry a non-blank instrument and numeric `qty`,
    /// `avg cost` and `ltp`; the first offending cell fails the whole file.
    pub fn read_holdings(&self, table: &HoldingsTable) -> Result<Vec<HoldingRow>, CoreError> {
        let columns = table.column_index()?;
        let passthrough = table.passthrough_columns();

        let mut rows = Vec::with_capacity(table.len());
        for (idx, record) in table.records.iter().enumerate() {
            let row_number = idx + 1;
            let cell = |col: usize| record.get(col).map(String::as_str).unwrap_or("");

            let instrument = cell(columns.instrument).trim();
            if instrument.is_empty() {
                return Err(CoreError::EmptyInstrument { row: row_number });
            }

            let number = |col: usize, column: &str| {
                let raw = cell(col);
                parse_number(raw).ok_or_else(|| CoreError::DataType {
                    column: column.to_string(),
                    row: row_number,
                    value: raw.to_string(),
                })
            };
            let qty = number(columns.qty, "qty")?;
            let avg_cost = number(columns.avg_cost, "avg cost")?;
            let ltp = number(columns.ltp, "ltp")?;

            let holding_type = columns.holding_type.map(|col| cell(col).to_string());

            let extra: BTreeMap<String, String> = passthrough
                .iter()
                .map(|(col, name)| (name.to_string(), cell(*col).to_string()))
                .collect();

            rows.push(HoldingRow::new(instrument, qty, avg_cost, ltp, holding_type).with_extra(extra));
        }

        Ok(rows)
    }

    /// Parse bytes straight into holding rows.
    pub fn import(&self, bytes: &[u8]) -> Result<Vec<HoldingRow>, CoreError> {
        let table = self.parse_table(bytes)?;
        self.read_holdings(&table)
    }
}

impl Default for ImportService {
    fn default() -> Self {
        Self::new()
    }
}
