//! Property-based tests for the DataSage pipeline.
//!
//! Property-based tests verify:
//! 1. **Idempotence**: cleaning a cleaned table changes nothing
//! 2. **Invariants**: row threshold and imputation guarantees always hold
//! 3. **No panics**: validation and anomaly detection accept any table
//! 4. **Determinism**: same input always produces same output
//!
//! # Running Property Tests
//!
//! ```bash
//! # Run with more cases (slower but more thorough)
//! PROPTEST_CASES=10000 cargo test -p datasage --test property_tests
//! ```

use std::collections::HashSet;

use proptest::prelude::*;

use datasage::cleaning::Cleaner;
use datasage::{
    AnomalyDetector, CleaningConfig, Column, ImputeStrategy, Table, TextCase, ValidationRule,
    detect_anomalies, validate,
};

// =============================================================================
// Test Strategies
// =============================================================================

/// Optional small numbers, including negatives and repeats.
fn numeric_cells(rows: usize) -> impl Strategy<Value = Vec<Option<f64>>> {
    prop::collection::vec(
        prop_oneof![
            1 => Just(None),
            4 => (-50i32..50).prop_map(|n| Some(n as f64 / 2.0)),
        ],
        rows,
    )
}

/// Optional words from a tiny alphabet so duplicates are common.
fn text_cells(rows: usize) -> impl Strategy<Value = Vec<Option<String>>> {
    prop::collection::vec(
        prop_oneof![
            1 => Just(None),
            4 => "[a-cA-C ]{1,6}".prop_map(Some),
        ],
        rows,
    )
}

/// Optional dates. Malformed ones are only generated when `malformed` is set.
fn date_cells(rows: usize, malformed: bool) -> impl Strategy<Value = Vec<Option<String>>> {
    let valid = (2000i32..2030, 1u32..13, 1u32..29)
        .prop_map(|(y, m, d)| Some(format!("{:04}-{:02}-{:02}", y, m, d)));
    let cell = if malformed {
        prop_oneof![
            1 => Just(None),
            3 => valid,
            1 => "[a-z]{1,5}".prop_map(Some),
        ]
        .boxed()
    } else {
        prop_oneof![1 => Just(None), 3 => valid].boxed()
    };
    prop::collection::vec(cell, rows)
}

/// A table with a numeric, a text and a date column.
fn table_without_id() -> impl Strategy<Value = Table> {
    table(true)
}

fn table(malformed_dates: bool) -> impl Strategy<Value = Table> {
    (1usize..30).prop_flat_map(move |rows| {
        (
            numeric_cells(rows),
            text_cells(rows),
            date_cells(rows, malformed_dates),
        )
            .prop_map(|(n, t, d)| {
                Table::new(vec![
                    Column::numeric("amount", n),
                    Column::text("label", t.iter().map(|s| s.as_deref())),
                    Column::text("visit_date", d.iter().map(|s| s.as_deref())),
                ])
                .unwrap()
            })
    })
}

/// Same shape plus a unique id, so cleaning cannot create new duplicates.
///
/// Malformed dates are left out: a row that only met the threshold through
/// an unparseable date loses that cell and could be dropped on a second pass.
fn table_with_id() -> impl Strategy<Value = Table> {
    table(false).prop_map(|table| {
        let ids = (0..table.row_count()).map(|i| Some(i as f64));
        let mut columns = vec![Column::numeric("id", ids)];
        columns.extend(table.columns().iter().cloned());
        Table::new(columns).unwrap()
    })
}

fn cleaning_config() -> impl Strategy<Value = CleaningConfig> {
    (
        any::<bool>(),
        prop_oneof![Just(ImputeStrategy::Mean), Just(ImputeStrategy::Median)],
        0.0f64..=1.0,
        prop_oneof![
            Just(TextCase::Lower),
            Just(TextCase::Upper),
            Just(TextCase::Title),
            Just(TextCase::None),
        ],
    )
        .prop_map(|(drop_duplicates, strategy, threshold, case)| {
            let mut config = CleaningConfig {
                drop_duplicates,
                text_standardization: case,
                ..Default::default()
            };
            config.fill_missing.strategy = strategy;
            config.fill_missing.threshold = threshold;
            config
        })
}

// =============================================================================
// Cleaning Properties
// =============================================================================

proptest! {
    /// Cleaning its own output with the same config yields the same table.
    #[test]
    fn cleaning_is_idempotent(table in table_with_id(), config in cleaning_config()) {
        let cleaner = Cleaner::new(&config).unwrap();
        let once = cleaner.clean(table).table;
        let twice = cleaner.clean(once.clone()).table;
        prop_assert_eq!(once, twice);
    }

    /// Every surviving row populates at least floor(threshold * columns) cells
    /// at the time of the sparse-row step.
    #[test]
    fn surviving_rows_meet_threshold(table in table_without_id(), threshold in 0.0f64..=1.0) {
        let mut config = CleaningConfig {
            drop_duplicates: false,
            text_standardization: TextCase::None,
            date_columns: Vec::new(),
            ..Default::default()
        };
        config.fill_missing.threshold = threshold;
        let rows_before = table.row_count();
        let required = (threshold * table.column_count() as f64).floor() as usize;
        let expected = (0..rows_before)
            .filter(|&row| table.non_missing_in_row(row) >= required)
            .count();

        let result = Cleaner::new(&config).unwrap().clean(table);

        prop_assert_eq!(result.report.row_threshold, required);
        prop_assert_eq!(result.report.rows_before, rows_before);
        prop_assert_eq!(result.report.sparse_rows_dropped, rows_before - expected);
    }

    /// With duplicates kept and a zero threshold no row is ever dropped.
    #[test]
    fn zero_threshold_keeps_every_row(table in table_without_id()) {
        let mut config = CleaningConfig { drop_duplicates: false, ..Default::default() };
        config.fill_missing.threshold = 0.0;
        let rows = table.row_count();

        let result = Cleaner::new(&config).unwrap().clean(table);
        prop_assert_eq!(result.table.row_count(), rows);
    }

    /// Only entirely-missing numeric columns and coerced dates stay missing.
    #[test]
    fn no_missing_after_imputation(table in table_without_id(), config in cleaning_config()) {
        let result = Cleaner::new(&config).unwrap().clean(table);

        for column in result.table.columns() {
            if column.name == "visit_date" {
                continue;
            }
            let all_missing = column.missing_count() == column.len();
            prop_assert!(!column.has_missing() || (column.dtype.is_numeric() && all_missing));
        }
    }

    /// Deduplication keeps exactly one row per distinct row.
    #[test]
    fn dedup_keeps_one_row_per_distinct_row(table in table_without_id()) {
        let distinct = {
            let rows: HashSet<_> = (0..table.row_count()).map(|r| table.row_key(r)).collect();
            rows.len()
        };
        let mut config = CleaningConfig::default();
        config.fill_missing.threshold = 0.0;

        let result = Cleaner::new(&config).unwrap().clean(table);
        prop_assert_eq!(result.report.rows_before - result.report.duplicates_removed, distinct);
    }
}

// =============================================================================
// Validation and Anomaly Properties
// =============================================================================

proptest! {
    /// Validation never panics and is deterministic.
    #[test]
    fn validation_deterministic(
        table in table_without_id(),
        min in -30.0f64..0.0,
        max in 0.0f64..30.0,
        pattern in "[a-cA-C]{0,3}",
    ) {
        let rules = vec![
            ValidationRule::new("amount").with_min(min).with_max(max),
            ValidationRule::new("label").with_regex(pattern).unique(),
            ValidationRule::new("absent").unique(),
        ];

        let first = validate(&table, &rules).unwrap();
        let second = validate(&table, &rules).unwrap();
        prop_assert_eq!(&first, &second);
        prop_assert!(!first.contains_key("absent"));
        for issues in first.values() {
            prop_assert!(!issues.is_empty());
        }
    }

    /// Anomalies are a subset of the column's values and keep row order.
    #[test]
    fn anomalies_are_column_values(table in table_without_id(), z in 0.5f64..4.0) {
        let anomalies = detect_anomalies(&table, z);
        if let Some(found) = anomalies.get("amount") {
            let values: Vec<f64> = table.column("amount").unwrap().numbers().collect();
            let mut remaining = values.iter();
            for value in found {
                prop_assert!(remaining.any(|v| v == value));
            }
        }
        prop_assert!(!anomalies.contains_key("label"));
        prop_assert_eq!(anomalies, AnomalyDetector::new(z).scan(&table).anomalies());
    }
}
