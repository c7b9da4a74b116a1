//! Fuzz target for date normalization.
//!
//! Arbitrary input formats and cell values must either normalize or skip
//! the column, never panic. Normalizing again keeps every row.

#![no_main]

use arbitrary::Arbitrary;
use datasage::Column;
use datasage::cleaning::{DateFormats, DateNormalizer};
use libfuzzer_sys::fuzz_target;

#[derive(Debug, Arbitrary)]
struct Input {
    input_format: String,
    output_format: String,
    values: Vec<Option<String>>,
}

fuzz_target!(|input: Input| {
    if input.values.len() > 1_000 {
        return;
    }

    let formats = DateFormats::new(input.output_format).with_override("date", input.input_format);
    let normalizer = DateNormalizer::new(formats);
    let mut column = Column::text("date", input.values.iter().map(|v| v.as_deref()));

    if normalizer.normalize(&mut column).is_ok() {
        let once = column.clone();
        let canonical = DateNormalizer::new(DateFormats::new(normalizer.formats().output_format()));
        if canonical.normalize(&mut column).is_ok() {
            assert_eq!(column.values.len(), once.values.len());
        }
    }
});
