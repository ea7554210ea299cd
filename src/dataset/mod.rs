//! Dataset access: loading, column cleansing and the train/validation split.

mod loader;
mod split;

pub use loader::{describe_columns, drop_columns, load_dataframe, ColumnSummary, DataLoader};
pub use split::{split_validation, DatasetSplit};
