//! Runs compiled rules against a table.

use indexmap::IndexMap;
use tracing::{debug, info};

use super::rule::{CompiledRule, ValidationRule};
use crate::error::Result;
use crate::schema::Table;

/// Column name → issue descriptions, in first-seen rule order.
pub type IssueMap = IndexMap<String, Vec<String>>;

/// Evaluates a fixed rule set.
#[derive(Debug, Clone)]
pub struct ValidationEngine {
    rules: Vec<CompiledRule>,
}

impl ValidationEngine {
    /// Compile a rule set. Invalid patterns or bounds are configuration errors.
    pub fn new(rules: &[ValidationRule]) -> Result<Self> {
        let rules = rules
            .iter()
            .map(ValidationRule::compile)
            .collect::<Result<Vec<_>>>()?;
        Ok(Self { rules })
    }

    /// Run every rule in order and collect issues by column.
    ///
    /// Rules naming columns the table lacks are skipped. Columns without
    /// issues do not appear in the result.
    pub fn validate(&self, table: &Table) -> IssueMap {
        let mut issues = IssueMap::new();

        for rule in &self.rules {
            let Some(column) = table.column(&rule.column) else {
                debug!(column = %rule.column, "Column not found, skipping rule");
                continue;
            };

            let found: Vec<String> = rule
                .checks
                .iter()
                .filter_map(|check| check.evaluate(column))
                .collect();

            if !found.is_empty() {
                debug!(column = %rule.column, issues = ?found, "Validation issues");
                issues.entry(rule.column.clone()).or_default().extend(found);
            }
        }

        let total: usize = issues.values().map(Vec::len).sum();
        info!(
            rules = self.rules.len(),
            columns = issues.len(),
            issues = total,
            "Validation complete"
        );

        issues
    }
}

/// Compile `rules` and validate `table` in one call.
pub fn validate(table: &Table, rules: &[ValidationRule]) -> Result<IssueMap> {
    Ok(ValidationEngine::new(rules)?.validate(table))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::schema::Column;

    fn sample_table() -> Table {
        Table::new(vec![
            Column::numeric("Age", [Some(-5.0), Some(30.0), Some(200.0), Some(40.0)]),
            Column::text("Email", [Some("a"), Some("b"), Some("a"), Some("c")]),
            Column::text("Code", [Some("AB12"), Some("xy"), Some("CD34"), Some("EF56")]),
        ])
        .unwrap()
    }

    #[test]
    fn test_range_rule() {
        let rules = vec![ValidationRule::new("Age").with_min(0.0).with_max(120.0)];
        let issues = validate(&sample_table(), &rules).unwrap();

        assert_eq!(
            issues["Age"],
            vec!["1 values below 0".to_string(), "1 values above 120".to_string()]
        );
    }

    #[test]
    fn test_unique_rule() {
        let rules = vec![ValidationRule::new("Email").unique()];
        let issues = validate(&sample_table(), &rules).unwrap();

        assert_eq!(issues["Email"], vec!["2 duplicate values found".to_string()]);
    }

    #[test]
    fn test_regex_rule() {
        let rules = vec![ValidationRule::new("Code").with_regex(r"^[A-Z]{2}\d{2}$")];
        let issues = validate(&sample_table(), &rules).unwrap();

        assert_eq!(
            issues["Code"],
            vec![r"1 values do not match regex ^[A-Z]{2}\d{2}$".to_string()]
        );
    }

    #[test]
    fn test_missing_column_is_skipped() {
        let rules = vec![
            ValidationRule::new("Salary").with_min(0.0),
            ValidationRule::new("Age").with_min(0.0),
        ];
        let issues = validate(&sample_table(), &rules).unwrap();

        assert_eq!(issues.len(), 1);
        assert!(!issues.contains_key("Salary"));
    }

    #[test]
    fn test_clean_column_absent_from_map() {
        let rules = vec![ValidationRule::new("Age").with_min(-100.0)];
        let issues = validate(&sample_table(), &rules).unwrap();
        assert!(issues.is_empty());
    }

    #[test]
    fn test_rules_on_same_column_append_in_order() {
        let rules = vec![
            ValidationRule::new("Age").with_max(120.0),
            ValidationRule::new("Email").unique(),
            ValidationRule::new("Age").with_min(0.0),
        ];
        let issues = validate(&sample_table(), &rules).unwrap();

        assert_eq!(issues.keys().collect::<Vec<_>>(), vec!["Age", "Email"]);
        assert_eq!(
            issues["Age"],
            vec!["1 values above 120".to_string(), "1 values below 0".to_string()]
        );
    }

    #[test]
    fn test_range_ignores_text_values() {
        let table = Table::new(vec![Column::text("mixed", [Some("abc"), Some("-3")])]).unwrap();
        let rules = vec![ValidationRule::new("mixed").with_min(0.0)];
        assert!(validate(&table, &rules).unwrap().is_empty());
    }
}
