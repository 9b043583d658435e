use std::fmt::Display;

use serde::Serialize;

use crate::model::{PossibilityTable, Value};

/// The confirmed rows of a solved table, one value per category.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Solution {
    pub categories: Vec<String>,
    pub rows: Vec<Vec<Value>>,
}

impl Solution {
    pub fn from_table(table: &PossibilityTable) -> Self {
        let categories = table
            .category_columns()
            .into_iter()
            .map(String::from)
            .collect();
        let rows = table
            .rows_with_status(crate::model::Status::Confirmed)
            .map(|row| table.row_values(row))
            .collect();
        Self { categories, rows }
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// The row holding `value` in `category`, if any.
    pub fn find(&self, category: &str, value: &Value) -> Option<&[Value]> {
        let col = self.categories.iter().position(|c| c == category)?;
        self.rows
            .iter()
            .find(|row| &row[col] == value)
            .map(|row| row.as_slice())
    }

    pub fn contains(&self, row: &[Value]) -> bool {
        self.rows.iter().any(|r| r.as_slice() == row)
    }
}

impl Display for Solution {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let widths: Vec<usize> = self
            .categories
            .iter()
            .enumerate()
            .map(|(col, name)| {
                self.rows
                    .iter()
                    .map(|row| row[col].to_string().len())
                    .chain(std::iter::once(name.len()))
                    .max()
                    .unwrap_or(0)
            })
            .collect();

        let mut output = String::new();
        for (name, width) in self.categories.iter().zip(widths.iter()) {
            output.push_str(&format!("{:<width$}|", name, width = width));
        }
        output.push('\n');
        output.push_str(&"-".repeat(widths.iter().map(|w| w + 1).sum()));
        output.push('\n');

        for row in self.rows.iter() {
            for (value, width) in row.iter().zip(widths.iter()) {
                output.push_str(&format!("{:<width$}|", value.to_string(), width = width));
            }
            output.push('\n');
        }

        write!(f, "{}", output)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::PossibilityTable;
    use crate::tests::create_test_categories;

    #[test]
    fn test_from_table_keeps_confirmed_rows_in_order() {
        let table = PossibilityTable::build(create_test_categories()).with_statuses(
            "
            +|1972|B|z|
            +|1964|C|x|
            x|1968|A|x|
            ",
        );
        let solution = Solution::from_table(&table);
        assert_eq!(solution.len(), 2);
        assert_eq!(
            solution.rows[0],
            vec![Value::Integer(1964), "C".into(), "x".into()]
        );
        assert_eq!(
            solution.find("names", &"B".into()),
            Some(&[Value::Integer(1972), "B".into(), "z".into()][..])
        );
        assert_eq!(solution.find("names", &"A".into()), None);
    }

    #[test]
    fn test_display() {
        let table = PossibilityTable::build(create_test_categories()).with_statuses("+|1964|C|x|");
        let rendered = Solution::from_table(&table).to_string();
        assert_eq!(rendered, "years|names|topics|\n-------------------\n1964 |C    |x     |\n");
    }
}
