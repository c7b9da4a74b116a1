//! Fuzz target for the table loader and the pipeline behind it.
//!
//! Checks that arbitrary bytes either fail to load with an error or run
//! through cleaning, validation and anomaly detection without panicking.

#![no_main]

use datasage::{DataSage, Parser, PipelineConfig, ValidationRule};
use libfuzzer_sys::fuzz_target;

fuzz_target!(|data: &[u8]| {
    // Only process reasonable-sized inputs to avoid OOM
    if data.len() > 100_000 {
        return;
    }

    let Ok(table) = Parser::new().parse_bytes(data) else {
        return;
    };

    let rules = table
        .column_names()
        .iter()
        .map(|name| ValidationRule::new(*name).with_min(0.0).unique())
        .collect();
    let config = PipelineConfig {
        validation: rules,
        ..Default::default()
    };

    if let Ok(pipeline) = DataSage::new(config) {
        let _ = pipeline.run(table);
    }
});
