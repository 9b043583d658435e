use std::fmt;

use itertools::Itertools;

use crate::error::ConfigError;
use crate::model::{CategorySet, PossibilityTable, RowMask, Value};

/// Selects table rows by value. Filters hold values and category names only, so the
/// same filter can be evaluated against every successive table state.
#[derive(Debug, Clone, PartialEq)]
pub enum Filter {
    /// Any column equals `value`.
    Value { value: Value, only_possible: bool },
    /// Column `category` equals `value`.
    CategoryValue {
        category: String,
        value: Value,
        only_possible: bool,
    },
    All(Vec<Filter>),
    Either(Vec<Filter>),
    Not(Box<Filter>),
}

pub fn value_filter(value: impl Into<Value>) -> Filter {
    Filter::Value {
        value: value.into(),
        only_possible: true,
    }
}

pub fn category_value_filter(category: &str, value: impl Into<Value>) -> Filter {
    Filter::CategoryValue {
        category: category.to_string(),
        value: value.into(),
        only_possible: true,
    }
}

/// Filters pass through; raw literals become a [`value_filter`].
pub fn force_filter(filter: impl Into<Filter>) -> Filter {
    filter.into()
}

impl From<Value> for Filter {
    fn from(value: Value) -> Self {
        value_filter(value)
    }
}

impl From<i64> for Filter {
    fn from(value: i64) -> Self {
        value_filter(value)
    }
}

impl From<i32> for Filter {
    fn from(value: i32) -> Self {
        value_filter(value)
    }
}

impl From<&str> for Filter {
    fn from(value: &str) -> Self {
        value_filter(value)
    }
}

impl From<chrono::Month> for Filter {
    fn from(value: chrono::Month) -> Self {
        value_filter(value)
    }
}

impl Filter {
    /// Also match rows that are already rejected.
    pub fn including_rejected(self) -> Self {
        match self {
            Filter::Value { value, .. } => Filter::Value {
                value,
                only_possible: false,
            },
            Filter::CategoryValue {
                category, value, ..
            } => Filter::CategoryValue {
                category,
                value,
                only_possible: false,
            },
            Filter::All(filters) => {
                Filter::All(filters.into_iter().map(Filter::including_rejected).collect())
            }
            Filter::Either(filters) => {
                Filter::Either(filters.into_iter().map(Filter::including_rejected).collect())
            }
            Filter::Not(filter) => Filter::Not(Box::new(filter.including_rejected())),
        }
    }

    pub fn and(self, other: Filter) -> Filter {
        match self {
            Filter::All(mut filters) => {
                filters.push(other);
                Filter::All(filters)
            }
            filter => Filter::All(vec![filter, other]),
        }
    }

    pub fn or(self, other: Filter) -> Filter {
        match self {
            Filter::Either(mut filters) => {
                filters.push(other);
                Filter::Either(filters)
            }
            filter => Filter::Either(vec![filter, other]),
        }
    }

    pub fn evaluate(&self, table: &PossibilityTable) -> RowMask {
        match self {
            Filter::Value {
                value,
                only_possible,
            } => {
                let positions: Vec<Option<usize>> = table
                    .categories()
                    .iter()
                    .map(|category| category.position(value))
                    .collect();
                let matches = RowMask::from_fn(table.len(), |row| {
                    positions.iter().enumerate().any(|(col, position)| {
                        *position == Some(table.row(row).value_index(col))
                    })
                });
                restrict(table, matches, *only_possible)
            }
            Filter::CategoryValue {
                category,
                value,
                only_possible,
            } => {
                let categories = table.categories();
                let position = categories.index_of(category).and_then(|col| {
                    categories
                        .get(col)
                        .position(value)
                        .map(|value_idx| (col, value_idx))
                });
                let matches = match position {
                    Some((col, value_idx)) => RowMask::from_fn(table.len(), |row| {
                        table.row(row).value_index(col) == value_idx
                    }),
                    None => RowMask::filled(table.len(), false),
                };
                restrict(table, matches, *only_possible)
            }
            Filter::All(filters) => filters
                .iter()
                .fold(RowMask::filled(table.len(), true), |mask, filter| {
                    mask & filter.evaluate(table)
                }),
            Filter::Either(filters) => filters
                .iter()
                .fold(RowMask::filled(table.len(), false), |mask, filter| {
                    mask | filter.evaluate(table)
                }),
            Filter::Not(filter) => !filter.evaluate(table),
        }
    }

    /// Checks that every category and value the filter names exists.
    pub fn validate(&self, categories: &CategorySet) -> Result<(), ConfigError> {
        match self {
            Filter::Value { value, .. } => {
                if categories.iter().any(|c| c.position(value).is_some()) {
                    Ok(())
                } else {
                    Err(ConfigError::UnknownLiteral(value.to_string()))
                }
            }
            Filter::CategoryValue {
                category, value, ..
            } => {
                let col = categories.require(category)?;
                if categories.get(col).position(value).is_some() {
                    Ok(())
                } else {
                    Err(ConfigError::ValueNotInCategory {
                        category: category.clone(),
                        value: value.to_string(),
                    })
                }
            }
            Filter::All(filters) | Filter::Either(filters) => filters
                .iter()
                .try_for_each(|filter| filter.validate(categories)),
            Filter::Not(filter) => filter.validate(categories),
        }
    }
}

fn restrict(table: &PossibilityTable, matches: RowMask, only_possible: bool) -> RowMask {
    if only_possible {
        matches & table.is_possible()
    } else {
        matches
    }
}

impl std::ops::Not for Filter {
    type Output = Filter;

    fn not(self) -> Filter {
        Filter::Not(Box::new(self))
    }
}

impl std::ops::BitAnd for Filter {
    type Output = Filter;

    fn bitand(self, rhs: Filter) -> Filter {
        self.and(rhs)
    }
}

impl std::ops::BitOr for Filter {
    type Output = Filter;

    fn bitor(self, rhs: Filter) -> Filter {
        self.or(rhs)
    }
}

impl fmt::Display for Filter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Filter::Value { value, .. } => write!(f, "{}", value),
            Filter::CategoryValue {
                category, value, ..
            } => write!(f, "{}:{}", category, value),
            Filter::All(filters) => write!(f, "({})", filters.iter().join(" & ")),
            Filter::Either(filters) => write!(f, "({})", filters.iter().join(" | ")),
            Filter::Not(filter) => write!(f, "!{}", filter),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{PossibilityTable, Status};
    use crate::tests::create_test_categories;

    #[test]
    fn test_value_filter_matches_any_column() {
        let table = PossibilityTable::build(create_test_categories());
        assert_eq!(value_filter(1968).evaluate(&table).count(), 9);
        assert_eq!(value_filter("y").evaluate(&table).count(), 9);
        assert_eq!(value_filter("nope").evaluate(&table).count(), 0);
    }

    #[test]
    fn test_category_value_filter() {
        let table = PossibilityTable::build(create_test_categories());
        let mask = category_value_filter("names", "B").evaluate(&table);
        assert_eq!(mask.count(), 9);
        assert!(mask.indices().all(|row| table.value(row, 1) == &Value::token("B")));
        assert_eq!(category_value_filter("topics", "B").evaluate(&table).count(), 0);
    }

    #[test]
    fn test_only_possible_skips_rejected_rows() {
        let table = PossibilityTable::build(create_test_categories()).with_statuses(
            "
            x|1964|A|x|
            x|1964|A|y|
            ",
        );
        assert_eq!(value_filter("A").evaluate(&table).count(), 7);
        assert_eq!(value_filter("A").including_rejected().evaluate(&table).count(), 9);
        assert_eq!(table.rejected_count(), 2);
        assert_eq!(table.status(0), Status::Rejected);
    }

    #[test]
    fn test_composition() {
        let table = PossibilityTable::build(create_test_categories());
        let a_and_x = force_filter("A") & category_value_filter("topics", "x");
        assert_eq!(a_and_x.evaluate(&table).count(), 3);

        let a_or_x = force_filter("A") | force_filter("x");
        assert_eq!(a_or_x.evaluate(&table).count(), 15);

        let not_a = !force_filter("A");
        assert_eq!(not_a.evaluate(&table).count(), 18);
        assert_eq!(format!("{}", a_and_x), "(A & topics:x)");
    }

    #[test]
    fn test_force_filter_passes_filters_through() {
        let filter = category_value_filter("names", "A");
        assert_eq!(force_filter(filter.clone()), filter);
        assert_eq!(force_filter(1968), value_filter(1968));
    }

    #[test]
    fn test_validate() {
        let categories = create_test_categories();
        assert!(value_filter("A").validate(&categories).is_ok());
        assert_eq!(
            value_filter("Q").validate(&categories),
            Err(ConfigError::UnknownLiteral("Q".to_string()))
        );
        assert_eq!(
            category_value_filter("pets", "A").validate(&categories),
            Err(ConfigError::UnknownCategory("pets".to_string()))
        );
        assert_eq!(
            (value_filter("A") & category_value_filter("names", "x")).validate(&categories),
            Err(ConfigError::ValueNotInCategory {
                category: "names".to_string(),
                value: "x".to_string()
            })
        );
    }
}
