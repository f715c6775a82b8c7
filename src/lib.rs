//! Exploratory data analysis over a single CSV (optionally zipped):
//! load it, cast columns, and pick charts by column kind.

pub mod data;
pub mod error;
pub mod session;
pub mod viz;

pub use data::classify::{classify, Bucket, Classification};
pub use data::coerce::{coerce, Coercion, RequestedType};
pub use data::loader::LoadOptions;
pub use data::model::{Column, Dataset, LogicalType, Value};
pub use error::{Error, Result};
pub use session::Session;
pub use viz::{dispatch, Dispatch, RenderInstruction};
