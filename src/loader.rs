use std::fs;
use std::path::Path;
use std::rc::Rc;

use itertools::Itertools;
use log::{debug, trace};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};

use crate::error::{ConfigError, LoadError, PuzzleError};
use crate::model::{
    decimal_from_f64, Category, CategorySet, Literal, Number, SolverSettings, ValueType,
};
use crate::solver::{value_filter, Filter, LiteralLookup, LogicPuzzle, Rule};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CategoryDefinition {
    pub name: String,
    #[serde(default, rename = "type")]
    pub value_type: ValueType,
    pub values: Vec<Literal>,
}

impl CategoryDefinition {
    pub fn to_category(&self) -> Result<Category, ConfigError> {
        Category::from_literals(self.name.clone(), self.value_type, &self.values)
    }
}

/// A rule parameter. Bare literals are looked up across all categories.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum FilterDefinition {
    Qualified { category: String, value: Literal },
    AnyColumn { any: Literal },
    All { all: Vec<FilterDefinition> },
    Either { either: Vec<FilterDefinition> },
    Not { not: Box<FilterDefinition> },
    Literal(Literal),
}

impl FilterDefinition {
    pub fn to_filter(&self, lookup: &LiteralLookup) -> Result<Filter, ConfigError> {
        match self {
            FilterDefinition::Literal(literal) => lookup.resolve_filter(literal),
            FilterDefinition::Qualified { category, value } => {
                Ok(lookup.filter(lookup.resolve_in(category, value)?))
            }
            FilterDefinition::AnyColumn { any } => {
                let values: Vec<_> = lookup
                    .candidates(any)?
                    .into_iter()
                    .map(|binding| lookup.value(binding).clone())
                    .unique()
                    .collect();
                match values.len() {
                    1 => Ok(value_filter(values[0].clone())),
                    _ => Ok(Filter::Either(values.into_iter().map(value_filter).collect())),
                }
            }
            FilterDefinition::All { all } => Ok(Filter::All(
                all.iter()
                    .map(|f| f.to_filter(lookup))
                    .collect::<Result<_, _>>()?,
            )),
            FilterDefinition::Either { either } => Ok(Filter::Either(
                either
                    .iter()
                    .map(|f| f.to_filter(lookup))
                    .collect::<Result<_, _>>()?,
            )),
            FilterDefinition::Not { not } => Ok(!not.to_filter(lookup)?),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum RuleDefinition {
    IsSame {
        filt1: FilterDefinition,
        filt2: FilterDefinition,
    },
    IsDiff {
        filt1: FilterDefinition,
        filt2: FilterDefinition,
    },
    IsEitherOr {
        isfilt: FilterDefinition,
        eitherfilt: FilterDefinition,
        orfilt: FilterDefinition,
    },
    IsNeitherNor {
        isfilt: FilterDefinition,
        neitherfilt: FilterDefinition,
        norfilt: FilterDefinition,
    },
    PairIsPair {
        filt11: FilterDefinition,
        filt12: FilterDefinition,
        filt21: FilterDefinition,
        filt22: FilterDefinition,
    },
    IsOrdered {
        #[serde(alias = "compCat")]
        comp_cat: String,
        bigfilt: FilterDefinition,
        smallfilt: FilterDefinition,
        #[serde(default)]
        offset: f64,
    },
    IsIncremented {
        #[serde(alias = "compCat")]
        comp_cat: String,
        bigfilt: FilterDefinition,
        smallfilt: FilterDefinition,
        #[serde(default)]
        offset: f64,
    },
    SimilarityGroupUpdates {
        filtlist: Vec<FilterDefinition>,
    },
}

fn offset(value: f64) -> Result<Number, ConfigError> {
    decimal_from_f64(value).ok_or_else(|| ConfigError::InvalidOffset(value.to_string()))
}

impl RuleDefinition {
    pub fn to_rule(
        &self,
        categories: &CategorySet,
        lookup: &LiteralLookup,
    ) -> Result<Rule, ConfigError> {
        let filter = |def: &FilterDefinition| def.to_filter(lookup);
        match self {
            RuleDefinition::IsSame { filt1, filt2 } => {
                Rule::is_same(categories, filter(filt1)?, filter(filt2)?)
            }
            RuleDefinition::IsDiff { filt1, filt2 } => {
                Rule::is_diff(categories, filter(filt1)?, filter(filt2)?)
            }
            RuleDefinition::IsEitherOr {
                isfilt,
                eitherfilt,
                orfilt,
            } => Rule::is_either_or(
                categories,
                filter(isfilt)?,
                filter(eitherfilt)?,
                filter(orfilt)?,
            ),
            RuleDefinition::IsNeitherNor {
                isfilt,
                neitherfilt,
                norfilt,
            } => Rule::is_neither_nor(
                categories,
                filter(isfilt)?,
                filter(neitherfilt)?,
                filter(norfilt)?,
            ),
            RuleDefinition::PairIsPair {
                filt11,
                filt12,
                filt21,
                filt22,
            } => Rule::pair_is_pair(
                categories,
                filter(filt11)?,
                filter(filt12)?,
                filter(filt21)?,
                filter(filt22)?,
            ),
            RuleDefinition::IsOrdered {
                comp_cat,
                bigfilt,
                smallfilt,
                offset: value,
            } => Rule::is_ordered(
                categories,
                comp_cat,
                filter(bigfilt)?,
                filter(smallfilt)?,
                offset(*value)?,
            ),
            RuleDefinition::IsIncremented {
                comp_cat,
                bigfilt,
                smallfilt,
                offset: value,
            } => Rule::is_incremented(
                categories,
                comp_cat,
                filter(bigfilt)?,
                filter(smallfilt)?,
                offset(*value)?,
            ),
            RuleDefinition::SimilarityGroupUpdates { filtlist } => Rule::similarity_group_updates(
                categories,
                filtlist.iter().map(filter).collect::<Result<Vec<_>, _>>()?,
            ),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PuzzleDefinition {
    #[serde(default)]
    pub settings: SolverSettings,
    pub categories: Vec<CategoryDefinition>,
    #[serde(default)]
    pub rules: Vec<RuleDefinition>,
}

#[derive(Debug, Deserialize)]
struct CategoriesFile {
    categories: Vec<CategoryDefinition>,
}

#[derive(Debug, Deserialize)]
struct RulesFile {
    rules: Vec<RuleDefinition>,
}

fn read_definition<T: DeserializeOwned>(path: &Path) -> Result<T, LoadError> {
    let contents = fs::read_to_string(path).map_err(|source| LoadError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    trace!(target: "loader", "Read {} bytes from {}", contents.len(), path.display());
    let is_json = path
        .extension()
        .map(|ext| ext.eq_ignore_ascii_case("json"))
        .unwrap_or(false);
    if is_json {
        Ok(serde_json::from_str(&contents)?)
    } else {
        Ok(serde_yaml::from_str(&contents)?)
    }
}

fn build_category_set(definitions: &[CategoryDefinition]) -> Result<CategorySet, ConfigError> {
    CategorySet::new(
        definitions
            .iter()
            .map(CategoryDefinition::to_category)
            .collect::<Result<_, _>>()?,
    )
}

fn build_rules(
    definitions: &[RuleDefinition],
    categories: &CategorySet,
) -> Result<Vec<Rule>, ConfigError> {
    let lookup = LiteralLookup::new(categories);
    definitions
        .iter()
        .map(|definition| definition.to_rule(categories, &lookup))
        .collect()
}

impl PuzzleDefinition {
    /// JSON when the extension is `.json`, YAML otherwise.
    pub fn from_path(path: impl AsRef<Path>) -> Result<Self, LoadError> {
        read_definition(path.as_ref())
    }

    pub fn from_yaml_str(contents: &str) -> Result<Self, LoadError> {
        Ok(serde_yaml::from_str(contents)?)
    }

    pub fn from_json_str(contents: &str) -> Result<Self, LoadError> {
        Ok(serde_json::from_str(contents)?)
    }

    pub fn category_set(&self) -> Result<CategorySet, ConfigError> {
        build_category_set(&self.categories)
    }

    pub fn rules(&self, categories: &CategorySet) -> Result<Vec<Rule>, ConfigError> {
        build_rules(&self.rules, categories)
    }

    pub fn into_puzzle(self) -> Result<LogicPuzzle, PuzzleError> {
        let categories = Rc::new(self.category_set()?);
        let rules = self.rules(&categories)?;
        debug!(
            target: "loader",
            "Loaded {} categories and {} rules",
            categories.len(),
            rules.len()
        );
        LogicPuzzle::new(categories, rules, self.settings)
    }
}

/// Reads a file holding only a `categories:` list.
pub fn load_categories(path: impl AsRef<Path>) -> Result<CategorySet, LoadError> {
    let file: CategoriesFile = read_definition(path.as_ref())?;
    Ok(build_category_set(&file.categories)?)
}

/// Reads a file holding only a `rules:` list, resolving it against `categories`.
pub fn load_rules(
    path: impl AsRef<Path>,
    categories: &CategorySet,
) -> Result<Vec<Rule>, LoadError> {
    let file: RulesFile = read_definition(path.as_ref())?;
    Ok(build_rules(&file.rules, categories)?)
}
