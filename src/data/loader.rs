use std::collections::HashSet;
use std::fs::File;
use std::io::{BufReader, Read, Seek};
use std::path::Path;

use super::archive::open_tabular;
use super::model::{Column, Dataset, LogicalType, Value};
use crate::error::{Error, Result};

/// Cell contents that load as a missing value.
const NA_TOKENS: &[&str] = &["", "NA", "N/A", "NaN", "nan", "null", "NULL", "None"];

// ---------------------------------------------------------------------------
// Options
// ---------------------------------------------------------------------------

/// How delimited text is split into fields.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LoadOptions {
    pub delimiter: u8,
}

impl Default for LoadOptions {
    fn default() -> Self {
        LoadOptions { delimiter: b',' }
    }
}

impl LoadOptions {
    /// Tab-separated for `.tsv` / `.tab`, comma otherwise (including `.zip`).
    pub fn for_path(path: &Path) -> Self {
        let ext = path
            .extension()
            .and_then(|e| e.to_str())
            .unwrap_or("")
            .to_ascii_lowercase();

        match ext.as_str() {
            "tsv" | "tab" => LoadOptions { delimiter: b'\t' },
            _ => LoadOptions::default(),
        }
    }
}

// ---------------------------------------------------------------------------
// Public entry-points
// ---------------------------------------------------------------------------

/// Load a dataset from a CSV file, or from a ZIP whose first entry is one.
///
/// The file handle lives only for the duration of this call.
pub fn load_file(path: &Path, options: &LoadOptions) -> Result<Dataset> {
    let file = File::open(path)?;
    load_reader(BufReader::new(file), options)
}

/// Load from any seekable source: unwrap a ZIP if there is one, then parse.
pub fn load_reader<R: Read + Seek>(source: R, options: &LoadOptions) -> Result<Dataset> {
    let tabular = open_tabular(source)?;
    if let Some(entry) = tabular.entry_name() {
        log::info!("reading '{entry}' from archive");
    }
    load_csv(tabular, options)
}

/// Parse delimited text with a header row into a [`Dataset`].
///
/// Every record must have as many fields as the header; a ragged row fails
/// the whole load with [`Error::Parse`].
pub fn load_csv<R: Read>(reader: R, options: &LoadOptions) -> Result<Dataset> {
    let mut reader = csv::ReaderBuilder::new()
        .delimiter(options.delimiter)
        .has_headers(true)
        .flexible(false)
        .from_reader(reader);

    let headers = reader
        .headers()
        .map_err(|e| csv_error("reading header", &e))?
        .clone();
    if headers.is_empty() {
        return Err(Error::Parse("no columns to parse from input".into()));
    }
    let names = unique_column_names(headers.iter());

    let mut cells: Vec<Vec<String>> = vec![Vec::new(); names.len()];
    for result in reader.records() {
        let record = result.map_err(|e| csv_error("reading record", &e))?;
        for (col_idx, field) in record.iter().enumerate() {
            cells[col_idx].push(field.to_string());
        }
    }
    let row_count = cells.first().map(Vec::len).unwrap_or(0);

    let columns: Vec<Column> = names
        .into_iter()
        .zip(cells)
        .map(|(name, raw)| {
            let dtype = infer_type(&raw);
            log::debug!("column '{name}' inferred as {dtype}");
            let values = raw.iter().map(|s| parse_cell(s, dtype)).collect();
            Column::new(name, dtype, values)
        })
        .collect();

    log::info!("loaded {row_count} rows x {} columns", columns.len());
    Ok(Dataset::from_columns(columns, row_count))
}

fn csv_error(stage: &str, err: &csv::Error) -> Error {
    match err.kind() {
        csv::ErrorKind::UnequalLengths {
            pos,
            expected_len,
            len,
        } => {
            let line = pos.as_ref().map(|p| p.line()).unwrap_or(0);
            Error::Parse(format!(
                "line {line}: expected {expected_len} fields but found {len}"
            ))
        }
        _ => Error::Parse(format!("{stage}: {err}")),
    }
}

// ---------------------------------------------------------------------------
// Header handling
// ---------------------------------------------------------------------------

/// Blank names become `Unnamed: {i}`; repeats get `.1`, `.2`, … appended.
fn unique_column_names<'a>(headers: impl Iterator<Item = &'a str>) -> Vec<String> {
    let raw: Vec<String> = headers
        .enumerate()
        .map(|(i, h)| {
            if h.trim().is_empty() {
                format!("Unnamed: {i}")
            } else {
                h.to_string()
            }
        })
        .collect();

    let mut taken: HashSet<String> = raw.iter().cloned().collect();
    let mut seen: HashSet<&str> = HashSet::new();
    let mut names = Vec::with_capacity(raw.len());
    for name in &raw {
        if seen.insert(name.as_str()) {
            names.push(name.clone());
            continue;
        }
        let mut suffix = 1;
        let mut candidate = format!("{name}.{suffix}");
        while taken.contains(&candidate) {
            suffix += 1;
            candidate = format!("{name}.{suffix}");
        }
        taken.insert(candidate.clone());
        names.push(candidate);
    }
    names
}

// ---------------------------------------------------------------------------
// Type inference
// ---------------------------------------------------------------------------

fn is_missing(s: &str) -> bool {
    NA_TOKENS.contains(&s.trim())
}

fn parse_bool(s: &str) -> Option<bool> {
    if s.eq_ignore_ascii_case("true") {
        Some(true)
    } else if s.eq_ignore_ascii_case("false") {
        Some(false)
    } else {
        None
    }
}

/// Pick the narrowest type every non-missing cell fits:
/// integer, then float, then boolean, else text.
fn infer_type(cells: &[String]) -> LogicalType {
    let present: Vec<&str> = cells
        .iter()
        .map(|s| s.trim())
        .filter(|s| !is_missing(s))
        .collect();

    if present.is_empty() {
        LogicalType::Object
    } else if present.iter().all(|s| s.parse::<i64>().is_ok()) {
        LogicalType::Integer
    } else if present.iter().all(|s| s.parse::<f64>().is_ok()) {
        LogicalType::Float
    } else if present.iter().all(|s| parse_bool(s).is_some()) {
        LogicalType::Boolean
    } else {
        LogicalType::Text
    }
}

/// Materialize one cell according to its column's inferred type.
fn parse_cell(s: &str, dtype: LogicalType) -> Value {
    if is_missing(s) {
        return Value::Null;
    }
    let trimmed = s.trim();
    match dtype {
        LogicalType::Integer => trimmed
            .parse::<i64>()
            .map(Value::Integer)
            .unwrap_or(Value::Null),
        LogicalType::Float => trimmed
            .parse::<f64>()
            .map(Value::Float)
            .unwrap_or(Value::Null),
        LogicalType::Boolean => parse_bool(trimmed).map(Value::Bool).unwrap_or(Value::Null),
        LogicalType::Text | LogicalType::Object | LogicalType::Timestamp => {
            Value::Text(s.to_string())
        }
    }
}
