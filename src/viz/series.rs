use std::collections::BTreeMap;

use crate::data::model::{Dataset, Value};
use crate::error::{Error, Result};

// ---------------------------------------------------------------------------
// Frequency data (count plots)
// ---------------------------------------------------------------------------

/// Non-missing values of a column with their counts, most frequent first.
/// Ties keep value order.
pub fn value_counts(dataset: &Dataset, column: &str) -> Result<Vec<(Value, usize)>> {
    let col = dataset
        .column(column)
        .ok_or_else(|| Error::ColumnNotFound(column.to_string()))?;

    let mut counts: BTreeMap<&Value, usize> = BTreeMap::new();
    for v in col.values.iter().filter(|v| !v.is_null()) {
        *counts.entry(v).or_default() += 1;
    }
    let mut out: Vec<(Value, usize)> = counts.into_iter().map(|(v, n)| (v.clone(), n)).collect();
    // Stable sort keeps the BTreeMap's value order among equal counts.
    out.sort_by(|a, b| b.1.cmp(&a.1));
    Ok(out)
}

// ---------------------------------------------------------------------------
// Pairwise data (scatter matrix)
// ---------------------------------------------------------------------------

/// Numeric, non-missing values of a column.
pub fn numeric_values(dataset: &Dataset, column: &str) -> Result<Vec<f64>> {
    let col = dataset
        .column(column)
        .ok_or_else(|| Error::ColumnNotFound(column.to_string()))?;
    Ok(col.values.iter().filter_map(Value::as_f64).collect())
}

/// `[x, y]` points for the rows where both columns hold a number.
pub fn scatter_pairs(dataset: &Dataset, x: &str, y: &str) -> Result<Vec<[f64; 2]>> {
    let xs = dataset
        .column(x)
        .ok_or_else(|| Error::ColumnNotFound(x.to_string()))?;
    let ys = dataset
        .column(y)
        .ok_or_else(|| Error::ColumnNotFound(y.to_string()))?;

    Ok(xs
        .values
        .iter()
        .zip(ys.values.iter())
        .filter_map(|(a, b)| Some([a.as_f64()?, b.as_f64()?]))
        .collect())
}

/// One bar of a histogram: `[start, end)` and how many values fell in it.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Bin {
    pub start: f64,
    pub end: f64,
    pub count: usize,
}

impl Bin {
    pub fn center(&self) -> f64 {
        (self.start + self.end) / 2.0
    }

    pub fn width(&self) -> f64 {
        self.end - self.start
    }
}

/// Equal-width histogram over the finite values. The last bin is closed on
/// the right so the maximum is counted. All-equal input gives a single
/// unit-wide bin.
pub fn histogram(values: &[f64], bins: usize) -> Vec<Bin> {
    let finite: Vec<f64> = values.iter().copied().filter(|v| v.is_finite()).collect();
    if finite.is_empty() || bins == 0 {
        return Vec::new();
    }
    let min = finite.iter().copied().fold(f64::INFINITY, f64::min);
    let max = finite.iter().copied().fold(f64::NEG_INFINITY, f64::max);

    let range = max - min;
    if range.abs() < f64::EPSILON {
        return vec![Bin {
            start: min - 0.5,
            end: min + 0.5,
            count: finite.len(),
        }];
    }

    let width = range / bins as f64;
    let mut out: Vec<Bin> = (0..bins)
        .map(|i| Bin {
            start: min + width * i as f64,
            end: min + width * (i + 1) as f64,
            count: 0,
        })
        .collect();
    for v in finite {
        let idx = (((v - min) / width) as usize).min(bins - 1);
        out[idx].count += 1;
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::loader::{load_csv, LoadOptions};

    fn load(text: &str) -> Dataset {
        load_csv(text.as_bytes(), &LoadOptions::default()).unwrap()
    }

    #[test]
    fn value_counts_orders_by_count_then_value() {
        let ds = load("c\nb\na\nb\nc\nNA\na\nb\n");
        let counts = value_counts(&ds, "c").unwrap();
        assert_eq!(
            counts,
            vec![
                (Value::Text("b".into()), 3),
                (Value::Text("a".into()), 2),
                (Value::Text("c".into()), 1),
            ]
        );
    }

    #[test]
    fn value_counts_of_missing_column_fails() {
        let ds = load("c\nx\n");
        assert!(matches!(
            value_counts(&ds, "nope"),
            Err(Error::ColumnNotFound(_))
        ));
    }

    #[test]
    fn scatter_pairs_skip_rows_with_gaps() {
        let ds = load("x,y\n1,2\n,3\n4,\n5,6.5\n");
        assert_eq!(
            scatter_pairs(&ds, "x", "y").unwrap(),
            vec![[1.0, 2.0], [5.0, 6.5]]
        );
        assert_eq!(numeric_values(&ds, "x").unwrap(), vec![1.0, 4.0, 5.0]);
    }

    #[test]
    fn histogram_counts_every_value_once() {
        let bins = histogram(&[0.0, 1.0, 2.0, 3.0, 4.0, f64::NAN], 4);
        assert_eq!(bins.len(), 4);
        let counts: Vec<usize> = bins.iter().map(|b| b.count).collect();
        assert_eq!(counts, vec![1, 1, 1, 2]);
        assert_eq!(bins[0].start, 0.0);
        assert_eq!(bins[3].end, 4.0);
        assert_eq!(bins[0].width(), 1.0);
    }

    #[test]
    fn histogram_of_constant_values_is_one_bin() {
        let bins = histogram(&[2.0, 2.0], 10);
        assert_eq!(bins.len(), 1);
        assert_eq!(bins[0].count, 2);
        assert_eq!(bins[0].center(), 2.0);
    }

    #[test]
    fn histogram_of_nothing_is_empty() {
        assert!(histogram(&[], 10).is_empty());
        assert!(histogram(&[f64::NAN], 10).is_empty());
    }
}
