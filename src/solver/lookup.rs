use std::collections::HashMap;

use itertools::Itertools;
use log::trace;

use crate::error::ConfigError;
use crate::model::{month_aliases, CategorySet, Literal, Value};

use super::filter::{category_value_filter, Filter};

/// A category column and one of its values, both as indices.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Binding {
    pub category: usize,
    pub value: usize,
}

/// Maps the lower-cased string form of every value (and every month alias) to the
/// category values it could denote.
#[derive(Debug, Clone)]
pub struct LiteralLookup {
    categories: CategorySet,
    values: HashMap<String, Vec<Binding>>,
    names: HashMap<String, usize>,
}

impl LiteralLookup {
    pub fn new(categories: &CategorySet) -> Self {
        let mut values: HashMap<String, Vec<Binding>> = HashMap::new();
        let mut names = HashMap::new();

        for (category_idx, category) in categories.iter().enumerate() {
            names.insert(category.name.to_lowercase(), category_idx);
            if let Some(singular) = category.singular_name() {
                names
                    .entry(singular.to_lowercase())
                    .or_insert(category_idx);
            }

            for (value_idx, value) in category.values.iter().enumerate() {
                let binding = Binding {
                    category: category_idx,
                    value: value_idx,
                };
                let mut keys = vec![value.canonical()];
                if let Value::Month(month) = value {
                    keys.extend(month_aliases(*month).iter().map(|alias| alias.to_string()));
                }
                for key in keys.into_iter().unique() {
                    values.entry(key).or_default().push(binding);
                }
            }
        }
        trace!(target: "lookup", "Registered {} literal keys", values.len());

        Self {
            categories: categories.clone(),
            values,
            names,
        }
    }

    /// Category index by name or singular alias, ignoring case.
    pub fn category(&self, name: &str) -> Result<usize, ConfigError> {
        self.names
            .get(&name.trim().to_lowercase())
            .copied()
            .ok_or_else(|| ConfigError::UnknownCategory(name.to_string()))
    }

    /// Every category value `literal` could denote.
    pub fn candidates(&self, literal: &Literal) -> Result<Vec<Binding>, ConfigError> {
        self.values
            .get(&literal.canonical())
            .cloned()
            .ok_or_else(|| ConfigError::UnknownLiteral(literal.to_string()))
    }

    /// The one category value a bare literal denotes.
    pub fn resolve(&self, literal: &Literal) -> Result<Binding, ConfigError> {
        let bindings = self.candidates(literal)?;
        match bindings.as_slice() {
            [binding] => Ok(*binding),
            _ => Err(ConfigError::AmbiguousLiteral {
                literal: literal.to_string(),
                categories: bindings
                    .iter()
                    .map(|b| self.categories.get(b.category).name.clone())
                    .unique()
                    .collect(),
            }),
        }
    }

    /// Resolves `literal` within the named category only.
    pub fn resolve_in(&self, category: &str, literal: &Literal) -> Result<Binding, ConfigError> {
        let category_idx = self.category(category)?;
        let category = self.categories.get(category_idx);
        let value = literal.to_value(category.value_type)?;
        let value_idx = category
            .position(&value)
            .ok_or_else(|| ConfigError::ValueNotInCategory {
                category: category.name.clone(),
                value: literal.to_string(),
            })?;
        Ok(Binding {
            category: category_idx,
            value: value_idx,
        })
    }

    pub fn value(&self, binding: Binding) -> &Value {
        &self.categories.get(binding.category).values[binding.value]
    }

    pub fn filter(&self, binding: Binding) -> Filter {
        category_value_filter(
            &self.categories.get(binding.category).name,
            self.value(binding).clone(),
        )
    }

    /// A category-qualified filter for a bare literal.
    pub fn resolve_filter(&self, literal: &Literal) -> Result<Filter, ConfigError> {
        self.resolve(literal).map(|binding| self.filter(binding))
    }
}

#[cfg(test)]
mod tests {
    use chrono::Month;

    use super::*;
    use crate::model::{Category, ValueType};
    use crate::tests::create_test_categories;

    #[test]
    fn test_resolve() {
        let lookup = LiteralLookup::new(&create_test_categories());
        assert_eq!(
            lookup.resolve(&Literal::Integer(1968)),
            Ok(Binding {
                category: 0,
                value: 1
            })
        );
        assert_eq!(
            lookup.resolve(&Literal::Text("b".to_string())),
            Ok(Binding {
                category: 1,
                value: 1
            })
        );
        assert_eq!(
            lookup.resolve_filter(&Literal::Text("z".to_string())),
            Ok(category_value_filter("topics", "z"))
        );
        assert_eq!(
            lookup.resolve(&Literal::Text("q".to_string())),
            Err(ConfigError::UnknownLiteral("q".to_string()))
        );
    }

    #[test]
    fn test_ambiguous_literal() {
        let categories = CategorySet::new(vec![
            Category::tokens("names", &["A", "B"]).unwrap(),
            Category::tokens("grades", &["A", "C"]).unwrap(),
        ])
        .unwrap();
        let lookup = LiteralLookup::new(&categories);
        assert_eq!(
            lookup.resolve(&Literal::Text("A".to_string())),
            Err(ConfigError::AmbiguousLiteral {
                literal: "A".to_string(),
                categories: vec!["names".to_string(), "grades".to_string()],
            })
        );
        assert_eq!(
            lookup.resolve_in("grades", &Literal::Text("A".to_string())),
            Ok(Binding {
                category: 1,
                value: 0
            })
        );
        assert_eq!(
            lookup.resolve_in("grade", &Literal::Text("B".to_string())),
            Err(ConfigError::ValueNotInCategory {
                category: "grades".to_string(),
                value: "B".to_string()
            })
        );
    }

    #[test]
    fn test_month_aliases() {
        let categories = CategorySet::new(vec![
            Category::new(
                "months",
                ValueType::Month,
                vec![Value::Month(Month::January), Value::Month(Month::March)],
            )
            .unwrap(),
            Category::tokens("pets", &["cat", "dog"]).unwrap(),
        ])
        .unwrap();
        let lookup = LiteralLookup::new(&categories);

        let march = lookup.resolve(&Literal::Text("Mar".to_string())).unwrap();
        assert_eq!(lookup.value(march), &Value::Month(Month::March));
        let january = lookup.resolve(&Literal::Integer(1)).unwrap();
        assert_eq!(lookup.value(january), &Value::Month(Month::January));
        assert_eq!(
            lookup.resolve(&Literal::Text("feb".to_string())),
            Err(ConfigError::UnknownLiteral("feb".to_string()))
        );
        assert_eq!(lookup.category("month"), Ok(0));
    }
}
