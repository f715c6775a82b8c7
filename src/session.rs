use std::io::{Read, Seek};
use std::path::Path;

use crate::data::classify::{classify, Bucket, Classification};
use crate::data::coerce::{coerce, Coercion, RequestedType};
use crate::data::loader::{load_file, load_reader, LoadOptions};
use crate::data::model::Dataset;
use crate::error::Result;
use crate::viz::{dispatch, Dispatch};

// ---------------------------------------------------------------------------
// Session – one loaded dataset and everything done to it
// ---------------------------------------------------------------------------

/// Owns the dataset of one user session.
///
/// Every operation goes through `&self` / `&mut self`, so a session can only
/// be driven by one caller at a time. Failed operations leave the dataset as
/// it was.
#[derive(Debug, Clone)]
pub struct Session {
    source: String,
    dataset: Dataset,
}

impl Session {
    /// Load a CSV (or zipped CSV) from disk.
    pub fn open(path: &Path) -> Result<Self> {
        let dataset = load_file(path, &LoadOptions::for_path(path))?;
        let source = path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_else(|| path.display().to_string());
        Ok(Session { source, dataset })
    }

    /// Load from an in-memory or already opened source.
    pub fn from_reader<R: Read + Seek>(
        source: impl Into<String>,
        reader: R,
        options: &LoadOptions,
    ) -> Result<Self> {
        Ok(Session {
            source: source.into(),
            dataset: load_reader(reader, options)?,
        })
    }

    /// Where the data came from (file name or caller-supplied label).
    pub fn source(&self) -> &str {
        &self.source
    }

    pub fn dataset(&self) -> &Dataset {
        &self.dataset
    }

    pub fn coerce(&mut self, column: &str, requested: RequestedType) -> Result<Coercion> {
        coerce(&mut self.dataset, column, requested)
    }

    /// Classification of the dataset as it is right now.
    pub fn classify(&self) -> Classification {
        classify(&self.dataset)
    }

    pub fn visualize(&self, bucket: Bucket, selected: &[String]) -> Result<Dispatch> {
        dispatch(&self.dataset, bucket, selected)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::Error;
    use std::io::Cursor;

    fn session(text: &str) -> Session {
        let reader = Cursor::new(text.as_bytes().to_vec());
        Session::from_reader("test.csv", reader, &LoadOptions::default()).unwrap()
    }

    #[test]
    fn failed_coercion_keeps_session_usable() {
        let mut s = session("age,city\n25,NYC\n30,LA\nabc,SF\n");
        assert!(matches!(
            s.coerce("age", RequestedType::Int),
            Err(Error::TypeCoercion { .. })
        ));
        let c = s.classify();
        assert!(c.numerical.is_empty());
        assert_eq!(c.categorical, vec!["age", "city"]);
        assert_eq!(
            s.visualize(Bucket::Categorical, &[]).unwrap(),
            Dispatch::EmptySelection
        );
    }

    #[test]
    fn classification_follows_coercions() {
        let mut s = session("n,m\n1,2\n3,4\n");
        assert_eq!(s.classify().numerical, vec!["n", "m"]);
        s.coerce("n", RequestedType::String).unwrap();
        assert_eq!(s.classify().numerical, vec!["m"]);
        assert_eq!(s.source(), "test.csv");
    }
}
