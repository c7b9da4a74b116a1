//! In-memory table model: typed columns aligned by row position.

mod column;
mod table;
mod types;

pub use column::Column;
pub use table::Table;
pub use types::{ColumnType, Value, ValueKey, is_null_token};
