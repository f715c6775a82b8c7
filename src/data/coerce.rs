use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, NaiveDate, NaiveDateTime};

use super::model::{format_timestamp, Dataset, LogicalType, Value};
use crate::error::{CellFailure, Error, Result};

/// How many offending cells a [`Error::TypeCoercion`] lists.
pub const MAX_REPORTED_FAILURES: usize = 5;

/// Text layouts accepted when converting to a timestamp, tried in order
/// after RFC 3339. Date-only layouts resolve to midnight.
const DATETIME_FORMATS: &[&str] = &[
    "%Y-%m-%d %H:%M:%S%.f",
    "%Y-%m-%dT%H:%M:%S%.f",
    "%Y-%m-%d %H:%M",
];
const DATE_FORMATS: &[&str] = &["%Y-%m-%d", "%Y/%m/%d", "%m/%d/%Y"];

// ---------------------------------------------------------------------------
// RequestedType – the user-facing coercion targets
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum RequestedType {
    Float,
    Int,
    String,
    Datetime,
    Object,
}

impl RequestedType {
    pub const ALL: [RequestedType; 5] = [
        RequestedType::Float,
        RequestedType::Int,
        RequestedType::String,
        RequestedType::Datetime,
        RequestedType::Object,
    ];

    pub fn name(self) -> &'static str {
        match self {
            RequestedType::Float => "float",
            RequestedType::Int => "int",
            RequestedType::String => "string",
            RequestedType::Datetime => "datetime",
            RequestedType::Object => "object",
        }
    }

    /// The column type a successful coercion leaves behind.
    pub fn target(self) -> LogicalType {
        match self {
            RequestedType::Float => LogicalType::Float,
            RequestedType::Int => LogicalType::Integer,
            RequestedType::String => LogicalType::Text,
            RequestedType::Datetime => LogicalType::Timestamp,
            RequestedType::Object => LogicalType::Object,
        }
    }
}

impl fmt::Display for RequestedType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for RequestedType {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        RequestedType::ALL
            .into_iter()
            .find(|t| t.name().eq_ignore_ascii_case(s.trim()))
            .ok_or_else(|| Error::UnknownName {
                kind: "data type",
                name: s.to_string(),
            })
    }
}

// ---------------------------------------------------------------------------
// Coercion
// ---------------------------------------------------------------------------

/// What a successful [`coerce`] changed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Coercion {
    pub column: String,
    pub from: LogicalType,
    pub to: LogicalType,
}

/// Convert every value of `column` to the type behind `requested`.
///
/// All-or-nothing: the converted values are built aside and swapped in
/// together with the new type only when every cell converted. On any failure
/// the dataset is exactly as it was before the call.
pub fn coerce(dataset: &mut Dataset, column: &str, requested: RequestedType) -> Result<Coercion> {
    let index = dataset
        .column_index(column)
        .ok_or_else(|| Error::ColumnNotFound(column.to_string()))?;
    let target = requested.target();
    let source = &dataset.columns()[index];
    let from = source.dtype;

    let mut converted = Vec::with_capacity(source.len());
    let mut failures = Vec::new();
    let mut total = 0;
    for (row, value) in source.values.iter().enumerate() {
        match convert(value, target) {
            Ok(v) => converted.push(v),
            Err(reason) => {
                total += 1;
                if failures.len() < MAX_REPORTED_FAILURES {
                    failures.push(CellFailure {
                        row,
                        value: value.to_string(),
                        reason,
                    });
                }
            }
        }
    }

    if total > 0 {
        log::warn!("coercion of '{column}' to {target} rejected: {total} bad value(s)");
        return Err(Error::TypeCoercion {
            column: column.to_string(),
            target,
            failures,
            total,
        });
    }

    dataset.replace_column(index, target, converted);
    log::info!("coerced '{column}' from {from} to {target}");
    Ok(Coercion {
        column: column.to_string(),
        from,
        to: target,
    })
}

/// Convert one cell. Missing values stay missing for every target.
pub fn convert(value: &Value, target: LogicalType) -> std::result::Result<Value, String> {
    if value.is_null() {
        return Ok(Value::Null);
    }
    match target {
        LogicalType::Float => to_float(value),
        LogicalType::Integer => to_integer(value),
        LogicalType::Text => Ok(to_text(value)),
        LogicalType::Timestamp => to_timestamp(value),
        LogicalType::Boolean => to_boolean(value),
        LogicalType::Object => Ok(value.clone()),
    }
}

fn to_float(value: &Value) -> std::result::Result<Value, String> {
    match value {
        Value::Null => Ok(Value::Null),
        Value::Float(f) => Ok(Value::Float(*f)),
        Value::Integer(i) => Ok(Value::Float(*i as f64)),
        Value::Bool(b) => Ok(Value::Float(if *b { 1.0 } else { 0.0 })),
        Value::Text(s) => s
            .trim()
            .parse::<f64>()
            .map(Value::Float)
            .map_err(|_| "not a number".to_string()),
        Value::Timestamp(_) => Err("timestamps have no float representation".into()),
    }
}

fn to_integer(value: &Value) -> std::result::Result<Value, String> {
    match value {
        Value::Null => Ok(Value::Null),
        Value::Integer(i) => Ok(Value::Integer(*i)),
        Value::Float(f) => truncate_float(*f).map(Value::Integer),
        Value::Bool(b) => Ok(Value::Integer(i64::from(*b))),
        Value::Text(s) => s
            .trim()
            .parse::<i64>()
            .map(Value::Integer)
            .map_err(|_| "not an integer".to_string()),
        Value::Timestamp(ns) => Ok(Value::Integer(*ns)),
    }
}

/// Truncate toward zero; non-finite or out-of-range values fail.
fn truncate_float(f: f64) -> std::result::Result<i64, String> {
    if !f.is_finite() {
        return Err("non-finite value cannot be an integer".into());
    }
    let t = f.trunc();
    // i64::MAX is not exactly representable; 2^63 is the first value past it.
    if t < i64::MIN as f64 || t >= 9_223_372_036_854_775_808.0 {
        return Err("outside the 64-bit integer range".into());
    }
    Ok(t as i64)
}

fn to_text(value: &Value) -> Value {
    match value {
        Value::Null => Value::Null,
        Value::Text(s) => Value::Text(s.clone()),
        Value::Timestamp(ns) => Value::Text(format_timestamp(*ns)),
        other => Value::Text(other.to_string()),
    }
}

fn to_timestamp(value: &Value) -> std::result::Result<Value, String> {
    match value {
        Value::Null => Ok(Value::Null),
        Value::Timestamp(ns) => Ok(Value::Timestamp(*ns)),
        Value::Integer(ns) => Ok(Value::Timestamp(*ns)),
        Value::Text(s) => parse_timestamp(s).map(Value::Timestamp),
        Value::Float(_) => Err("floats are not timestamps".into()),
        Value::Bool(_) => Err("booleans are not timestamps".into()),
    }
}

fn to_boolean(value: &Value) -> std::result::Result<Value, String> {
    match value {
        Value::Null => Ok(Value::Null),
        Value::Bool(b) => Ok(Value::Bool(*b)),
        Value::Integer(0) => Ok(Value::Bool(false)),
        Value::Integer(1) => Ok(Value::Bool(true)),
        Value::Text(s) if s.trim().eq_ignore_ascii_case("true") => Ok(Value::Bool(true)),
        Value::Text(s) if s.trim().eq_ignore_ascii_case("false") => Ok(Value::Bool(false)),
        _ => Err("not a boolean".into()),
    }
}

/// Parse text into nanoseconds since the epoch using the fixed format set.
pub fn parse_timestamp(s: &str) -> std::result::Result<i64, String> {
    let trimmed = s.trim();
    let naive = DateTime::parse_from_rfc3339(trimmed)
        .map(|dt| dt.naive_utc())
        .ok()
        .or_else(|| {
            DATETIME_FORMATS
                .iter()
                .find_map(|fmt| NaiveDateTime::parse_from_str(trimmed, fmt).ok())
        })
        .or_else(|| {
            DATE_FORMATS.iter().find_map(|fmt| {
                NaiveDate::parse_from_str(trimmed, fmt)
                    .ok()
                    .and_then(|d| d.and_hms_opt(0, 0, 0))
            })
        })
        .ok_or_else(|| "not a recognised date/time".to_string())?;

    naive
        .and_utc()
        .timestamp_nanos_opt()
        .ok_or_else(|| "outside the nanosecond timestamp range".to_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::loader::{load_csv, LoadOptions};

    fn load(text: &str) -> Dataset {
        load_csv(text.as_bytes(), &LoadOptions::default()).unwrap()
    }

    #[test]
    fn requested_types_parse_from_user_names() {
        assert_eq!("float".parse::<RequestedType>().unwrap(), RequestedType::Float);
        assert_eq!(" INT ".parse::<RequestedType>().unwrap(), RequestedType::Int);
        assert_eq!(
            "datetime".parse::<RequestedType>().unwrap().target(),
            LogicalType::Timestamp
        );
        assert!(matches!(
            "decimal".parse::<RequestedType>(),
            Err(Error::UnknownName { .. })
        ));
    }

    #[test]
    fn missing_column_leaves_dataset_alone() {
        let mut ds = load("a\n1\n");
        let before = ds.clone();
        let err = coerce(&mut ds, "b", RequestedType::Float).unwrap_err();
        assert!(matches!(err, Error::ColumnNotFound(ref c) if c == "b"));
        assert_eq!(ds, before);
    }

    #[test]
    fn integers_widen_to_float() {
        let mut ds = load("a\n1\n-2\n");
        let done = coerce(&mut ds, "a", RequestedType::Float).unwrap();
        assert_eq!(done.from, LogicalType::Integer);
        assert_eq!(done.to, LogicalType::Float);
        let col = ds.column("a").unwrap();
        assert_eq!(col.dtype, LogicalType::Float);
        assert_eq!(col.values, vec![Value::Float(1.0), Value::Float(-2.0)]);
    }

    #[test]
    fn floats_truncate_toward_zero() {
        let mut ds = load("a\n2.9\n-2.9\n0.5\n");
        coerce(&mut ds, "a", RequestedType::Int).unwrap();
        assert_eq!(
            ds.column("a").unwrap().values,
            vec![Value::Integer(2), Value::Integer(-2), Value::Integer(0)]
        );
    }

    #[test]
    fn infinite_floats_do_not_become_integers() {
        let mut ds = load("a\n1.5\ninf\n");
        let before = ds.clone();
        let err = coerce(&mut ds, "a", RequestedType::Int).unwrap_err();
        match err {
            Error::TypeCoercion { failures, total, .. } => {
                assert_eq!(total, 1);
                assert_eq!(failures[0].row, 1);
            }
            other => panic!("unexpected {other:?}"),
        }
        assert_eq!(ds, before);
    }

    #[test]
    fn bad_text_rolls_back_and_reports_rows() {
        let mut ds = load("age,city\n25,NYC\n30,LA\nabc,SF\n");
        let before = ds.clone();
        let err = coerce(&mut ds, "age", RequestedType::Int).unwrap_err();
        match &err {
            Error::TypeCoercion {
                column,
                target,
                failures,
                total,
            } => {
                assert_eq!(column, "age");
                assert_eq!(*target, LogicalType::Integer);
                assert_eq!(*total, 1);
                assert_eq!(failures[0].row, 2);
                assert_eq!(failures[0].value, "abc");
            }
            other => panic!("unexpected {other:?}"),
        }
        assert!(err.to_string().contains("row 2: 'abc'"), "{err}");
        assert_eq!(ds, before);
    }

    #[test]
    fn failure_report_is_capped_but_counts_everything() {
        let mut ds = load("a\nx1\nx2\nx3\nx4\nx5\nx6\nx7\n");
        let err = coerce(&mut ds, "a", RequestedType::Float).unwrap_err();
        match &err {
            Error::TypeCoercion { failures, total, .. } => {
                assert_eq!(failures.len(), MAX_REPORTED_FAILURES);
                assert_eq!(*total, 7);
            }
            other => panic!("unexpected {other:?}"),
        }
        assert!(err.to_string().ends_with("and 2 more"), "{err}");
    }

    #[test]
    fn text_floats_are_not_integers() {
        assert!(convert(&Value::Text("2.5".into()), LogicalType::Integer).is_err());
        assert_eq!(
            convert(&Value::Text(" 42 ".into()), LogicalType::Integer),
            Ok(Value::Integer(42))
        );
    }

    #[test]
    fn string_rendering_is_lossless() {
        let mut ds = load("i,f,b\n7,0.1,true\n-3,1e300,false\n");
        for name in ["i", "f", "b"] {
            coerce(&mut ds, name, RequestedType::String).unwrap();
        }
        let text = |n: &str| ds.column(n).unwrap().values.clone();
        assert_eq!(text("i"), vec![Value::Text("7".into()), Value::Text("-3".into())]);
        assert_eq!(text("b"), vec![Value::Text("true".into()), Value::Text("false".into())]);
        for v in text("f") {
            let Value::Text(s) = v else { panic!("not text") };
            assert!(s.parse::<f64>().is_ok());
        }
        assert_eq!(ds.column("f").unwrap().values[0], Value::Text("0.1".into()));
    }

    #[test]
    fn string_to_string_is_a_no_op() {
        let mut ds = load("city\nNYC\nLA\nSF\n");
        let before = ds.clone();
        coerce(&mut ds, "city", RequestedType::String).unwrap();
        assert_eq!(ds, before);
    }

    #[test]
    fn datetimes_parse_from_the_fixed_formats() {
        let mut ds = load(
            "when\n2024-01-02\n2024-01-02 03:04:05\n2024-01-02T03:04:05.5\n01/02/2024\n2024-01-02T04:04:05+01:00\n",
        );
        coerce(&mut ds, "when", RequestedType::Datetime).unwrap();
        let col = ds.column("when").unwrap();
        assert_eq!(col.dtype, LogicalType::Timestamp);
        let midnight = 1_704_153_600_000_000_000;
        let with_time = 1_704_164_645_000_000_000;
        assert_eq!(
            col.values,
            vec![
                Value::Timestamp(midnight),
                Value::Timestamp(with_time),
                Value::Timestamp(with_time + 500_000_000),
                Value::Timestamp(midnight),
                Value::Timestamp(with_time),
            ]
        );
    }

    #[test]
    fn unparseable_dates_fail_instead_of_becoming_missing() {
        let mut ds = load("when\n2024-01-02\nsoon\n");
        let before = ds.clone();
        let err = coerce(&mut ds, "when", RequestedType::Datetime).unwrap_err();
        assert!(matches!(err, Error::TypeCoercion { total: 1, .. }));
        assert_eq!(ds, before);
    }

    #[test]
    fn dates_outside_nanosecond_range_fail() {
        assert!(parse_timestamp("1500-01-01").is_err());
        assert!(parse_timestamp("2300-01-01").is_err());
    }

    #[test]
    fn timestamps_round_trip_through_text() {
        let mut ds = load("when\n2024-01-02 03:04:05.25\n");
        coerce(&mut ds, "when", RequestedType::Datetime).unwrap();
        let stamped = ds.clone();
        coerce(&mut ds, "when", RequestedType::String).unwrap();
        assert_eq!(
            ds.column("when").unwrap().values,
            vec![Value::Text("2024-01-02 03:04:05.250".into())]
        );
        coerce(&mut ds, "when", RequestedType::Datetime).unwrap();
        assert_eq!(ds, stamped);
    }

    #[test]
    fn nulls_survive_every_target() {
        for t in RequestedType::ALL {
            let mut ds = load("a\n1\nNA\n3\n");
            coerce(&mut ds, "a", t).unwrap();
            assert_eq!(ds.column("a").unwrap().values[1], Value::Null);
        }
    }

    #[test]
    fn object_keeps_values_and_changes_type() {
        let mut ds = load("a\n1\n2\n");
        coerce(&mut ds, "a", RequestedType::Object).unwrap();
        let col = ds.column("a").unwrap();
        assert_eq!(col.dtype, LogicalType::Object);
        assert_eq!(col.values, vec![Value::Integer(1), Value::Integer(2)]);
    }
}
