//! Localidades: loading, normalization and aggregation of Brazilian
//! administrative geography (IBGE states and municipalities).
//!
//! The pipeline is `source` → `normalize` → `aggregate`: one of three
//! sources produces the canonical tables (the IBGE localities API, a GitHub
//! CSV mirror used as fallback, or a Postgres warehouse), normalization
//! fills the denormalized geography, and the aggregation functions derive
//! the tables the dashboard renders. [`cache::SnapshotCache`] keeps the
//! latest snapshot for up to an hour so repeated reads do not refetch.

pub mod aggregate;
pub mod cache;
pub mod error;
pub mod model;
pub mod normalize;
pub mod source;

pub use aggregate::summarize;
pub use cache::SnapshotCache;
pub use error::SourceError;
pub use model::{Fonte, Municipality, RegionCount, Snapshot, State, StateCount, Summary};
pub use source::{load_geography, SourceConfig, SourceMode};
