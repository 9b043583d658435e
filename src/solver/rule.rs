use std::fmt::{Debug, Display};

use itertools::Itertools;
use log::debug;

use crate::error::ConfigError;
use crate::model::{CategorySet, Number, PossibilityTable};

use super::filter::Filter;
use super::rules;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum RuleKind {
    IsSame,
    IsDiff,
    IsEitherOr,
    IsNeitherNor,
    PairIsPair,
    IsOrdered,
    IsIncremented,
    SimilarityGroupUpdates,
}

impl RuleKind {
    pub fn get_title(&self) -> &'static str {
        match self {
            RuleKind::IsSame => "A is B",
            RuleKind::IsDiff => "A is not B",
            RuleKind::IsEitherOr => "A is either B or C",
            RuleKind::IsNeitherNor => "A is neither B nor C",
            RuleKind::PairIsPair => "(A, B) is (C, D)",
            RuleKind::IsOrdered => "A > B (+ offset)",
            RuleKind::IsIncremented => "A = B (+ offset)",
            RuleKind::SimilarityGroupUpdates => "[A, B, ...] are all different",
        }
    }
}

/// The column an ordering or increment rule compares on.
#[derive(Debug, Clone, PartialEq)]
pub struct Comparison {
    pub column: usize,
    pub name: String,
    pub offset: Number,
}

impl Comparison {
    pub fn resolve(
        categories: &CategorySet,
        comp_cat: &str,
        offset: Number,
    ) -> Result<Self, ConfigError> {
        let column = categories.comparison_category(comp_cat)?;
        Ok(Self {
            column,
            name: categories.get(column).name.clone(),
            offset,
        })
    }
}

/// A clue with its parameters bound. Build rules with the constructor functions so
/// that filters and the comparison column are checked against the categories.
#[derive(Clone, PartialEq)]
pub enum Rule {
    IsSame(Filter, Filter),
    IsDiff(Filter, Filter),
    IsEitherOr {
        isfilt: Filter,
        eitherfilt: Filter,
        orfilt: Filter,
    },
    IsNeitherNor {
        isfilt: Filter,
        neitherfilt: Filter,
        norfilt: Filter,
    },
    PairIsPair {
        filt11: Filter,
        filt12: Filter,
        filt21: Filter,
        filt22: Filter,
    },
    IsOrdered {
        comparison: Comparison,
        bigfilt: Filter,
        smallfilt: Filter,
    },
    IsIncremented {
        comparison: Comparison,
        bigfilt: Filter,
        smallfilt: Filter,
    },
    SimilarityGroupUpdates(Vec<Filter>),
}

impl Rule {
    pub fn is_same(
        categories: &CategorySet,
        filt1: impl Into<Filter>,
        filt2: impl Into<Filter>,
    ) -> Result<Rule, ConfigError> {
        Rule::IsSame(filt1.into(), filt2.into()).validated(categories)
    }

    pub fn is_diff(
        categories: &CategorySet,
        filt1: impl Into<Filter>,
        filt2: impl Into<Filter>,
    ) -> Result<Rule, ConfigError> {
        Rule::IsDiff(filt1.into(), filt2.into()).validated(categories)
    }

    pub fn is_either_or(
        categories: &CategorySet,
        isfilt: impl Into<Filter>,
        eitherfilt: impl Into<Filter>,
        orfilt: impl Into<Filter>,
    ) -> Result<Rule, ConfigError> {
        Rule::IsEitherOr {
            isfilt: isfilt.into(),
            eitherfilt: eitherfilt.into(),
            orfilt: orfilt.into(),
        }
        .validated(categories)
    }

    pub fn is_neither_nor(
        categories: &CategorySet,
        isfilt: impl Into<Filter>,
        neitherfilt: impl Into<Filter>,
        norfilt: impl Into<Filter>,
    ) -> Result<Rule, ConfigError> {
        Rule::IsNeitherNor {
            isfilt: isfilt.into(),
            neitherfilt: neitherfilt.into(),
            norfilt: norfilt.into(),
        }
        .validated(categories)
    }

    pub fn pair_is_pair(
        categories: &CategorySet,
        filt11: impl Into<Filter>,
        filt12: impl Into<Filter>,
        filt21: impl Into<Filter>,
        filt22: impl Into<Filter>,
    ) -> Result<Rule, ConfigError> {
        Rule::PairIsPair {
            filt11: filt11.into(),
            filt12: filt12.into(),
            filt21: filt21.into(),
            filt22: filt22.into(),
        }
        .validated(categories)
    }

    /// `comp_cat` may name the column or its singular form.
    pub fn is_ordered(
        categories: &CategorySet,
        comp_cat: &str,
        bigfilt: impl Into<Filter>,
        smallfilt: impl Into<Filter>,
        offset: Number,
    ) -> Result<Rule, ConfigError> {
        Rule::IsOrdered {
            comparison: Comparison::resolve(categories, comp_cat, offset)?,
            bigfilt: bigfilt.into(),
            smallfilt: smallfilt.into(),
        }
        .validated(categories)
    }

    pub fn is_incremented(
        categories: &CategorySet,
        comp_cat: &str,
        bigfilt: impl Into<Filter>,
        smallfilt: impl Into<Filter>,
        offset: Number,
    ) -> Result<Rule, ConfigError> {
        Rule::IsIncremented {
            comparison: Comparison::resolve(categories, comp_cat, offset)?,
            bigfilt: bigfilt.into(),
            smallfilt: smallfilt.into(),
        }
        .validated(categories)
    }

    pub fn similarity_group_updates<F: Into<Filter>>(
        categories: &CategorySet,
        filtlist: impl IntoIterator<Item = F>,
    ) -> Result<Rule, ConfigError> {
        Rule::SimilarityGroupUpdates(filtlist.into_iter().map(Into::into).collect())
            .validated(categories)
    }

    fn validated(self, categories: &CategorySet) -> Result<Rule, ConfigError> {
        self.validate(categories)?;
        Ok(self)
    }

    pub fn kind(&self) -> RuleKind {
        match self {
            Rule::IsSame(..) => RuleKind::IsSame,
            Rule::IsDiff(..) => RuleKind::IsDiff,
            Rule::IsEitherOr { .. } => RuleKind::IsEitherOr,
            Rule::IsNeitherNor { .. } => RuleKind::IsNeitherNor,
            Rule::PairIsPair { .. } => RuleKind::PairIsPair,
            Rule::IsOrdered { .. } => RuleKind::IsOrdered,
            Rule::IsIncremented { .. } => RuleKind::IsIncremented,
            Rule::SimilarityGroupUpdates(_) => RuleKind::SimilarityGroupUpdates,
        }
    }

    pub fn filters(&self) -> Vec<&Filter> {
        match self {
            Rule::IsSame(a, b) | Rule::IsDiff(a, b) => vec![a, b],
            Rule::IsEitherOr {
                isfilt,
                eitherfilt,
                orfilt,
            } => vec![isfilt, eitherfilt, orfilt],
            Rule::IsNeitherNor {
                isfilt,
                neitherfilt,
                norfilt,
            } => vec![isfilt, neitherfilt, norfilt],
            Rule::PairIsPair {
                filt11,
                filt12,
                filt21,
                filt22,
            } => vec![filt11, filt12, filt21, filt22],
            Rule::IsOrdered {
                bigfilt, smallfilt, ..
            }
            | Rule::IsIncremented {
                bigfilt, smallfilt, ..
            } => vec![bigfilt, smallfilt],
            Rule::SimilarityGroupUpdates(filtlist) => filtlist.iter().collect(),
        }
    }

    /// Checks every filter and the comparison column against `categories`.
    pub fn validate(&self, categories: &CategorySet) -> Result<(), ConfigError> {
        self.filters()
            .into_iter()
            .try_for_each(|filter| filter.validate(categories))?;

        if let Rule::IsOrdered { comparison, .. } | Rule::IsIncremented { comparison, .. } = self
        {
            let column = categories.comparison_category(&comparison.name)?;
            if column != comparison.column {
                return Err(ConfigError::UnknownComparisonCategory(
                    comparison.name.clone(),
                ));
            }
        }
        Ok(())
    }

    pub fn apply(&self, table: &PossibilityTable) -> PossibilityTable {
        let next = match self {
            Rule::IsSame(filt1, filt2) => rules::is_same(table, filt1, filt2),
            Rule::IsDiff(filt1, filt2) => rules::is_diff(table, filt1, filt2),
            Rule::IsEitherOr {
                isfilt,
                eitherfilt,
                orfilt,
            } => rules::is_either_or(table, isfilt, eitherfilt, orfilt),
            Rule::IsNeitherNor {
                isfilt,
                neitherfilt,
                norfilt,
            } => rules::is_neither_nor(table, isfilt, neitherfilt, norfilt),
            Rule::PairIsPair {
                filt11,
                filt12,
                filt21,
                filt22,
            } => rules::pair_is_pair(table, filt11, filt12, filt21, filt22),
            Rule::IsOrdered {
                comparison,
                bigfilt,
                smallfilt,
            } => rules::is_ordered(
                table,
                comparison.column,
                bigfilt,
                smallfilt,
                comparison.offset,
            ),
            Rule::IsIncremented {
                comparison,
                bigfilt,
                smallfilt,
            } => rules::is_incremented(
                table,
                comparison.column,
                bigfilt,
                smallfilt,
                comparison.offset,
            ),
            Rule::SimilarityGroupUpdates(filtlist) => {
                rules::similarity_group_updates(table, filtlist)
            }
        };
        debug!(
            target: "rules",
            "{}: rejected {} rows",
            self.describe(),
            next.rejected_count().saturating_sub(table.rejected_count())
        );
        next
    }

    pub fn describe(&self) -> String {
        match self {
            Rule::IsSame(a, b) => format!("{} is {}", a, b),
            Rule::IsDiff(a, b) => format!("{} is not {}", a, b),
            Rule::IsEitherOr {
                isfilt,
                eitherfilt,
                orfilt,
            } => format!("{} is either {} or {}", isfilt, eitherfilt, orfilt),
            Rule::IsNeitherNor {
                isfilt,
                neitherfilt,
                norfilt,
            } => format!("{} is neither {} nor {}", isfilt, neitherfilt, norfilt),
            Rule::PairIsPair {
                filt11,
                filt12,
                filt21,
                filt22,
            } => format!("({}, {}) is ({}, {})", filt11, filt12, filt21, filt22),
            Rule::IsOrdered {
                comparison,
                bigfilt,
                smallfilt,
            } => format!(
                "{} > {}{} ({})",
                bigfilt,
                smallfilt,
                describe_offset(comparison.offset),
                comparison.name
            ),
            Rule::IsIncremented {
                comparison,
                bigfilt,
                smallfilt,
            } => format!(
                "{} = {}{} ({})",
                bigfilt,
                smallfilt,
                describe_offset(comparison.offset),
                comparison.name
            ),
            Rule::SimilarityGroupUpdates(filtlist) => {
                format!("[{}] are all different", filtlist.iter().join(", "))
            }
        }
    }
}

fn describe_offset(offset: Number) -> String {
    if offset == Number::ZERO {
        String::new()
    } else {
        format!(" + {}", offset)
    }
}

impl Display for Rule {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.describe())
    }
}

impl Debug for Rule {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "Rule({:?}: {})", self.kind(), self.describe())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::Status;
    use crate::solver::filter::category_value_filter;
    use crate::tests::create_test_categories;

    #[test]
    fn test_constructors_validate_filters() {
        let categories = create_test_categories();
        assert!(Rule::is_same(&categories, "A", 1968).is_ok());
        assert_eq!(
            Rule::is_same(&categories, "Q", 1968),
            Err(ConfigError::UnknownLiteral("Q".to_string()))
        );
        assert_eq!(
            Rule::is_diff(&categories, category_value_filter("years", "A"), "x"),
            Err(ConfigError::ValueNotInCategory {
                category: "years".to_string(),
                value: "A".to_string()
            })
        );
    }

    #[test]
    fn test_comparison_category_resolution() {
        let categories = create_test_categories();
        let rule = Rule::is_ordered(&categories, "year", "B", "A", Number::from(4)).unwrap();
        match &rule {
            Rule::IsOrdered { comparison, .. } => {
                assert_eq!(comparison.column, 0);
                assert_eq!(comparison.name, "years");
            }
            _ => panic!("expected an ordering rule"),
        }

        assert_eq!(
            Rule::is_incremented(&categories, "decade", "B", "A", Number::ZERO),
            Err(ConfigError::UnknownComparisonCategory("decade".to_string()))
        );
        assert_eq!(
            Rule::is_ordered(&categories, "names", "B", "A", Number::ZERO),
            Err(ConfigError::UnorderedComparisonCategory("names".to_string()))
        );
    }

    #[test]
    fn test_describe() {
        let categories = create_test_categories();
        let describe = |rule: Result<Rule, ConfigError>| rule.unwrap().describe();

        assert_eq!(describe(Rule::is_same(&categories, "A", 1968)), "A is 1968");
        assert_eq!(describe(Rule::is_diff(&categories, "x", 1968)), "x is not 1968");
        assert_eq!(
            describe(Rule::is_either_or(&categories, "A", 1964, "x")),
            "A is either 1964 or x"
        );
        assert_eq!(
            describe(Rule::is_neither_nor(&categories, "A", 1964, "x")),
            "A is neither 1964 nor x"
        );
        assert_eq!(
            describe(Rule::pair_is_pair(&categories, "A", "B", 1964, "x")),
            "(A, B) is (1964, x)"
        );
        assert_eq!(
            describe(Rule::is_ordered(&categories, "years", "B", "A", Number::from(4))),
            "B > A + 4 (years)"
        );
        assert_eq!(
            describe(Rule::is_incremented(&categories, "year", "B", "A", Number::ZERO)),
            "B = A (years)"
        );
        assert_eq!(
            describe(Rule::similarity_group_updates(
                &categories,
                vec![category_value_filter("years", 1964), "A".into(), "x".into()]
            )),
            "[years:1964, A, x] are all different"
        );
    }

    #[test]
    fn test_apply_matches_rule_function() {
        let categories = create_test_categories();
        let table = PossibilityTable::build(categories.clone());
        let rule = Rule::is_diff(&categories, "x", 1968).unwrap();
        let next = rule.apply(&table);
        assert_eq!(next.rejected_count(), 3);
        assert_eq!(rule.kind(), RuleKind::IsDiff);
        assert_eq!(rule.kind().get_title(), "A is not B");
        assert_eq!(next.describe_rows(Status::Rejected)[0], "1968|A|x");
    }
}
