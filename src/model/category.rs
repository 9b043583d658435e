use std::collections::HashSet;

use crate::error::ConfigError;
use crate::model::{Literal, Value, ValueType};

/// A named, ordered list of distinct values sharing one value type.
#[readonly::make]
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Category {
    pub name: String,
    pub value_type: ValueType,
    pub values: Vec<Value>,
}

impl Category {
    pub fn new(
        name: impl Into<String>,
        value_type: ValueType,
        values: Vec<Value>,
    ) -> Result<Self, ConfigError> {
        let name = name.into();
        if values.is_empty() {
            return Err(ConfigError::EmptyCategory(name));
        }

        let mut seen = HashSet::new();
        for value in values.iter() {
            if value.value_type() != value_type {
                return Err(ConfigError::MismatchedValueType {
                    category: name,
                    value: value.to_string(),
                    expected: value_type,
                });
            }
            if !seen.insert(value) {
                return Err(ConfigError::DuplicateValue {
                    category: name,
                    value: value.to_string(),
                });
            }
        }

        Ok(Self {
            name,
            value_type,
            values,
        })
    }

    pub fn from_literals(
        name: impl Into<String>,
        value_type: ValueType,
        literals: &[Literal],
    ) -> Result<Self, ConfigError> {
        let values = literals
            .iter()
            .map(|literal| literal.to_value(value_type))
            .collect::<Result<Vec<_>, _>>()?;
        Self::new(name, value_type, values)
    }

    pub fn integers(name: impl Into<String>, values: &[i64]) -> Result<Self, ConfigError> {
        Self::new(
            name,
            ValueType::Integer,
            values.iter().map(|v| Value::Integer(*v)).collect(),
        )
    }

    pub fn tokens(name: impl Into<String>, values: &[&str]) -> Result<Self, ConfigError> {
        Self::new(
            name,
            ValueType::Category,
            values.iter().map(|v| Value::token(v)).collect(),
        )
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn position(&self, value: &Value) -> Option<usize> {
        self.values.iter().position(|v| v == value)
    }

    /// `years` -> `year`; `None` when the name does not end in `s`.
    pub fn singular_name(&self) -> Option<&str> {
        self.name.strip_suffix('s').filter(|s| !s.is_empty())
    }
}

/// The categories of one puzzle, in column order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CategorySet {
    categories: Vec<Category>,
}

impl CategorySet {
    pub fn new(categories: Vec<Category>) -> Result<Self, ConfigError> {
        if categories.is_empty() {
            return Err(ConfigError::NoCategories);
        }
        let mut names = HashSet::new();
        for category in categories.iter() {
            if !names.insert(category.name.to_lowercase()) {
                return Err(ConfigError::DuplicateCategory(category.name.clone()));
            }
        }
        Ok(Self { categories })
    }

    pub fn len(&self) -> usize {
        self.categories.len()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Category> {
        self.categories.iter()
    }

    pub fn get(&self, index: usize) -> &Category {
        &self.categories[index]
    }

    pub fn names(&self) -> Vec<&str> {
        self.categories.iter().map(|c| c.name.as_str()).collect()
    }

    pub fn index_of(&self, name: &str) -> Option<usize> {
        self.categories
            .iter()
            .position(|c| c.name == name)
            .or_else(|| {
                self.categories
                    .iter()
                    .position(|c| c.name.eq_ignore_ascii_case(name))
            })
    }

    pub fn require(&self, name: &str) -> Result<usize, ConfigError> {
        self.index_of(name)
            .ok_or_else(|| ConfigError::UnknownCategory(name.to_string()))
    }

    /// Resolves the column a comparison rule orders by. The name may be the column
    /// name itself or its singular form (`year` for `years`), and the column must
    /// hold orderable values.
    pub fn comparison_category(&self, name: &str) -> Result<usize, ConfigError> {
        let index = self
            .index_of(name)
            .or_else(|| self.index_of(&format!("{}s", name)))
            .or_else(|| {
                self.categories.iter().position(|c| {
                    c.singular_name()
                        .map(|s| s.eq_ignore_ascii_case(name))
                        .unwrap_or(false)
                })
            })
            .ok_or_else(|| ConfigError::UnknownComparisonCategory(name.to_string()))?;

        let category = &self.categories[index];
        if !category.value_type.is_orderable() {
            return Err(ConfigError::UnorderedComparisonCategory(
                category.name.clone(),
            ));
        }
        Ok(index)
    }

    /// Number of rows in the full possibility table.
    pub fn combinations(&self) -> usize {
        self.categories.iter().map(|c| c.len()).product()
    }
}
