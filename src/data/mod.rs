//! Data layer: core types, loading, coercion and classification.
//!
//! Architecture:
//! ```text
//!  .csv / .zip(.csv)
//!        │
//!        ▼
//!   ┌──────────┐
//!   │ archive   │  unwrap the first ZIP entry, or pass through
//!   └──────────┘
//!        │
//!        ▼
//!   ┌──────────┐
//!   │  loader   │  parse CSV → Dataset (typed columns)
//!   └──────────┘
//!        │
//!        ▼
//!   ┌──────────┐
//!   │  coerce   │  all-or-nothing column casts
//!   └──────────┘
//!        │
//!        ▼
//!   ┌──────────┐
//!   │ classify  │  numerical / categorical / other
//!   └──────────┘
//! ```

pub mod archive;
pub mod classify;
pub mod coerce;
pub mod loader;
pub mod model;
pub mod summary;
