//! Cleaning stage: duplicate removal, sparse-row dropping, imputation,
//! text casing and date normalization, in that order.

mod dates;
mod imputation;
mod stage;
mod text;

pub use dates::{DateError, DateFormats, DateNormalizer, DateSummary, is_date_column};
pub use imputation::{Imputation, ImputationPolicy, MISSING_TEXT_SENTINEL};
pub use stage::{Cleaner, CleaningReport, CleaningResult, clean};
pub use text::{TextNormalizer, title_case};
