use std::fmt;
use std::str::FromStr;

use serde::Serialize;

use super::model::{Dataset, LogicalType};
use crate::error::Error;

// ---------------------------------------------------------------------------
// Bucket – the semantic groups a visualization is requested for
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Bucket {
    Numerical,
    Categorical,
}

impl Bucket {
    pub const ALL: [Bucket; 2] = [Bucket::Numerical, Bucket::Categorical];

    pub fn label(self) -> &'static str {
        match self {
            Bucket::Numerical => "numerical",
            Bucket::Categorical => "categorical",
        }
    }

    /// Which bucket a column of this type belongs to, if any.
    pub fn of(dtype: LogicalType) -> Option<Bucket> {
        match dtype {
            LogicalType::Integer | LogicalType::Float => Some(Bucket::Numerical),
            LogicalType::Text | LogicalType::Object => Some(Bucket::Categorical),
            LogicalType::Boolean | LogicalType::Timestamp => None,
        }
    }
}

impl fmt::Display for Bucket {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

impl FromStr for Bucket {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Bucket::ALL
            .into_iter()
            .find(|b| b.label().eq_ignore_ascii_case(s.trim()))
            .ok_or_else(|| Error::UnknownName {
                kind: "bucket",
                name: s.to_string(),
            })
    }
}

// ---------------------------------------------------------------------------
// Classification
// ---------------------------------------------------------------------------

/// Column names per bucket, in dataset column order.
///
/// Columns that are neither numeric nor text-like (booleans, timestamps)
/// land in `other` rather than disappearing.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct Classification {
    pub numerical: Vec<String>,
    pub categorical: Vec<String>,
    pub other: Vec<String>,
}

impl Classification {
    pub fn members(&self, bucket: Bucket) -> &[String] {
        match bucket {
            Bucket::Numerical => &self.numerical,
            Bucket::Categorical => &self.categorical,
        }
    }

    pub fn contains(&self, bucket: Bucket, column: &str) -> bool {
        self.members(bucket).iter().any(|c| c == column)
    }
}

/// Partition the dataset's columns by their current type.
///
/// Pure: call it again after every coercion rather than holding on to the
/// result.
pub fn classify(dataset: &Dataset) -> Classification {
    let mut out = Classification::default();
    for column in dataset.columns() {
        let bucket = match Bucket::of(column.dtype) {
            Some(Bucket::Numerical) => &mut out.numerical,
            Some(Bucket::Categorical) => &mut out.categorical,
            None => &mut out.other,
        };
        bucket.push(column.name.clone());
    }
    out
}
