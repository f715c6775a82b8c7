//! Visualization selection: which chart(s) a bucket + column selection
//! turns into.
//!
//! ```text
//!   (bucket, selected columns)
//!        │
//!        ▼
//!   ┌──────────┐
//!   │ classify  │  fresh, never cached
//!   └──────────┘
//!        │
//!        ▼
//!   ┌──────────┐
//!   │ dispatch  │  NoCandidates / EmptySelection / StaleSelection / Render
//!   └──────────┘
//!        │
//!        ▼
//!   ┌──────────┐
//!   │  series   │  value counts, scatter pairs, histograms for the renderer
//!   └──────────┘
//! ```

pub mod series;

use std::collections::HashSet;

use serde::Serialize;

use crate::data::classify::{classify, Bucket};
use crate::data::model::Dataset;
use crate::error::{Error, Result};

/// An opaque chart request handed to whatever draws it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", rename_all = "lowercase")]
pub enum RenderInstruction {
    /// One joint pairwise-relationship grid over all columns.
    Pairwise { columns: Vec<String> },
    /// A count plot of a single column.
    Frequency { column: String },
}

/// Result of a visualization request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Dispatch {
    Render(Vec<RenderInstruction>),
    /// The bucket has members but none were picked yet.
    EmptySelection,
    /// The bucket has no members at all.
    NoCandidates,
}

/// Turn a bucket and a column selection into render instructions.
///
/// Numerical selections produce a single pairwise instruction covering every
/// selected column; categorical selections produce one frequency instruction
/// per column. Selected names are validated against the dataset's current
/// classification. Repeated names count once, at their first position.
pub fn dispatch(dataset: &Dataset, bucket: Bucket, selected: &[String]) -> Result<Dispatch> {
    let classification = classify(dataset);
    let members = classification.members(bucket);

    if members.is_empty() {
        return Ok(Dispatch::NoCandidates);
    }
    if selected.is_empty() {
        return Ok(Dispatch::EmptySelection);
    }
    if let Some(stale) = selected.iter().find(|s| !members.contains(*s)) {
        log::warn!("selection for {bucket} refers to '{stale}', which is not in the bucket");
        return Err(Error::StaleSelection {
            bucket,
            column: stale.clone(),
        });
    }

    let mut seen = HashSet::new();
    let selected: Vec<&String> = selected.iter().filter(|s| seen.insert(*s)).collect();

    let instructions = match bucket {
        Bucket::Numerical => vec![RenderInstruction::Pairwise {
            columns: selected.into_iter().cloned().collect(),
        }],
        Bucket::Categorical => selected
            .into_iter()
            .map(|column| RenderInstruction::Frequency {
                column: column.clone(),
            })
            .collect(),
    };
    log::debug!(
        "render: {}",
        serde_json::to_string(&instructions).unwrap_or_default()
    );
    Ok(Dispatch::Render(instructions))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::coerce::{coerce, RequestedType};
    use crate::data::loader::{load_csv, LoadOptions};

    fn load(text: &str) -> Dataset {
        load_csv(text.as_bytes(), &LoadOptions::default()).unwrap()
    }

    fn names(cols: &[&str]) -> Vec<String> {
        cols.iter().map(|c| c.to_string()).collect()
    }

    fn mixed() -> Dataset {
        load("a,b,c,x,y,z\n1,2,3,p,q,r\n4,5,6.5,s,t,u\n")
    }

    #[test]
    fn numerical_selection_is_one_joint_instruction() {
        let out = dispatch(&mixed(), Bucket::Numerical, &names(&["c", "a", "b"])).unwrap();
        assert_eq!(
            out,
            Dispatch::Render(vec![RenderInstruction::Pairwise {
                columns: names(&["c", "a", "b"])
            }])
        );
    }

    #[test]
    fn categorical_selection_is_one_instruction_per_column() {
        let out = dispatch(&mixed(), Bucket::Categorical, &names(&["x", "y", "z"])).unwrap();
        let instructions = match out {
            Dispatch::Render(instructions) => instructions,
            other => panic!("expected render, got {other:?}"),
        };
        assert_eq!(instructions.len(), 3);
        assert_eq!(
            instructions[1],
            RenderInstruction::Frequency {
                column: "y".into()
            }
        );
    }

    #[test]
    fn empty_selection_is_not_no_candidates() {
        let out = dispatch(&mixed(), Bucket::Categorical, &[]).unwrap();
        assert_eq!(out, Dispatch::EmptySelection);
    }

    #[test]
    fn empty_bucket_reports_no_candidates() {
        let ds = load("city\nNYC\nLA\n");
        assert_eq!(
            dispatch(&ds, Bucket::Numerical, &[]).unwrap(),
            Dispatch::NoCandidates
        );
        assert_eq!(
            dispatch(&ds, Bucket::Numerical, &names(&["city"])).unwrap(),
            Dispatch::NoCandidates
        );
    }

    #[test]
    fn selection_made_before_a_coercion_goes_stale() {
        let mut ds = mixed();
        let selection = names(&["a", "b"]);
        assert!(matches!(
            dispatch(&ds, Bucket::Numerical, &selection),
            Ok(Dispatch::Render(_))
        ));

        coerce(&mut ds, "b", RequestedType::String).unwrap();
        let err = dispatch(&ds, Bucket::Numerical, &selection).unwrap_err();
        match err {
            Error::StaleSelection { bucket, column } => {
                assert_eq!(bucket, Bucket::Numerical);
                assert_eq!(column, "b");
            }
            other => panic!("unexpected {other:?}"),
        }
    }

    #[test]
    fn unknown_names_are_stale() {
        let err = dispatch(&mixed(), Bucket::Categorical, &names(&["x", "nope"])).unwrap_err();
        assert!(matches!(err, Error::StaleSelection { .. }));
    }

    #[test]
    fn repeated_names_are_selected_once_in_first_seen_order() {
        let out = dispatch(&mixed(), Bucket::Categorical, &names(&["y", "x", "y", "x"])).unwrap();
        assert_eq!(
            out,
            Dispatch::Render(vec![
                RenderInstruction::Frequency { column: "y".into() },
                RenderInstruction::Frequency { column: "x".into() },
            ])
        );

        let out = dispatch(&mixed(), Bucket::Numerical, &names(&["a", "a", "c"])).unwrap();
        assert_eq!(
            out,
            Dispatch::Render(vec![RenderInstruction::Pairwise {
                columns: names(&["a", "c"])
            }])
        );
    }

    #[test]
    fn instructions_serialize_with_kind_tag() {
        let pair = RenderInstruction::Pairwise {
            columns: names(&["a", "b"]),
        };
        let freq = RenderInstruction::Frequency {
            column: "x".into(),
        };
        assert_eq!(
            serde_json::to_value(&pair).unwrap(),
            serde_json::json!({"kind": "pairwise", "columns": ["a", "b"]})
        );
        assert_eq!(
            serde_json::to_value(&freq).unwrap(),
            serde_json::json!({"kind": "frequency", "column": "x"})
        );
    }
}
