//! Held-out evaluation data — loading, target split, statistics and inputs.

pub mod schema;
pub mod source;
pub mod table;

pub use schema::{ColumnType, FeatureStats, InputValidation};
pub use source::{DataOrigin, DataSourceInfo, load_csv, load_or_synthesize};
pub use table::{DataTable, FeatureTable, FeatureValue};
