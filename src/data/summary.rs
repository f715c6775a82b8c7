use std::collections::BTreeMap;

use serde::Serialize;

use super::classify::{classify, Bucket};
use super::model::{Dataset, LogicalType, Value};

/// `describe()` row for a numerical column. Missing cells are ignored.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct NumericSummary {
    pub column: String,
    pub count: usize,
    pub mean: Option<f64>,
    /// Sample standard deviation; needs at least two values.
    pub std: Option<f64>,
    pub min: Option<f64>,
    pub q25: Option<f64>,
    pub median: Option<f64>,
    pub q75: Option<f64>,
    pub max: Option<f64>,
}

/// `describe()` row for a categorical column.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CategoricalSummary {
    pub column: String,
    pub count: usize,
    pub unique: usize,
    pub top: Option<String>,
    pub freq: usize,
}

/// `info()` row.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ColumnInfo {
    pub column: String,
    pub non_null: usize,
    pub dtype: LogicalType,
}

pub fn info(dataset: &Dataset) -> Vec<ColumnInfo> {
    dataset
        .columns()
        .iter()
        .map(|c| ColumnInfo {
            column: c.name.clone(),
            non_null: c.non_null_count(),
            dtype: c.dtype,
        })
        .collect()
}

pub fn describe(dataset: &Dataset) -> Vec<NumericSummary> {
    classify(dataset)
        .members(Bucket::Numerical)
        .iter()
        .filter_map(|name| dataset.column(name))
        .map(|col| {
            let mut xs: Vec<f64> = col.values.iter().filter_map(Value::as_f64).collect();
            xs.sort_by(f64::total_cmp);
            summarize(&col.name, &xs)
        })
        .collect()
}

pub fn describe_categorical(dataset: &Dataset) -> Vec<CategoricalSummary> {
    classify(dataset)
        .members(Bucket::Categorical)
        .iter()
        .filter_map(|name| dataset.column(name))
        .map(|col| {
            let mut counts: BTreeMap<&Value, usize> = BTreeMap::new();
            for v in col.values.iter().filter(|v| !v.is_null()) {
                *counts.entry(v).or_default() += 1;
            }
            // Highest count; ties go to the smallest value.
            let top = counts
                .iter()
                .max_by(|a, b| a.1.cmp(b.1).then_with(|| b.0.cmp(a.0)));
            CategoricalSummary {
                column: col.name.clone(),
                count: counts.values().sum(),
                unique: counts.len(),
                top: top.map(|(v, _)| v.to_string()),
                freq: top.map(|(_, n)| *n).unwrap_or(0),
            }
        })
        .collect()
}

fn summarize(column: &str, sorted: &[f64]) -> NumericSummary {
    let count = sorted.len();
    let mean = (count > 0).then(|| sorted.iter().sum::<f64>() / count as f64);
    let std = mean.filter(|_| count > 1).map(|m| {
        let ss: f64 = sorted.iter().map(|x| (x - m).powi(2)).sum();
        (ss / (count - 1) as f64).sqrt()
    });
    NumericSummary {
        column: column.to_string(),
        count,
        mean,
        std,
        min: sorted.first().copied(),
        q25: quantile(sorted, 0.25),
        median: quantile(sorted, 0.5),
        q75: quantile(sorted, 0.75),
        max: sorted.last().copied(),
    }
}

/// Linear interpolation between closest ranks.
pub fn quantile(sorted: &[f64], q: f64) -> Option<f64> {
    if sorted.is_empty() {
        return None;
    }
    let pos = q * (sorted.len() - 1) as f64;
    let lo = pos.floor() as usize;
    let hi = pos.ceil() as usize;
    let frac = pos - lo as f64;
    Some(sorted[lo] + (sorted[hi] - sorted[lo]) * frac)
}
