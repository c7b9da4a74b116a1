//! Rule-driven validation of a cleaned table.

mod engine;
mod rule;

pub use engine::{IssueMap, ValidationEngine, validate};
pub use rule::{Check, CompiledRule, ValidationRule};
