use std::fmt;

use chrono::Month;
use rust_decimal::prelude::ToPrimitive;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize, Serializer};

use crate::error::ConfigError;

/// Numeric projection of an orderable value. Decimal keeps `0.1 + 0.1 == 0.2`
/// exact and gives float categories a total order and a hash.
pub type Number = Decimal;

/// Reads a float through its shortest decimal form, so `0.1` becomes exactly
/// `0.1` rather than its binary expansion.
pub fn decimal_from_f64(value: f64) -> Option<Number> {
    if !value.is_finite() {
        return None;
    }
    value.to_string().parse::<Number>().ok().map(|n| n.normalize())
}

fn decimal_from_str(token: &str) -> Option<Number> {
    let token = token.trim();
    token
        .parse::<Number>()
        .ok()
        .map(|n| n.normalize())
        .or_else(|| token.parse::<f64>().ok().and_then(decimal_from_f64))
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Deserialize, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ValueType {
    #[serde(alias = "int", alias = "i")]
    Integer,
    #[serde(alias = "f")]
    Float,
    #[serde(alias = "m")]
    Month,
    #[default]
    Category,
}

impl ValueType {
    pub fn is_orderable(&self) -> bool {
        !matches!(self, ValueType::Category)
    }
}

impl fmt::Display for ValueType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ValueType::Integer => write!(f, "integer"),
            ValueType::Float => write!(f, "float"),
            ValueType::Month => write!(f, "month"),
            ValueType::Category => write!(f, "categorical"),
        }
    }
}

const MONTH_ALIASES: [(Month, &[&str]); 12] = [
    (Month::January, &["1", "ja", "jan", "january"]),
    (Month::February, &["2", "f", "fe", "feb", "february"]),
    (Month::March, &["3", "mar", "march"]),
    (Month::April, &["4", "ap", "apr", "april"]),
    (Month::May, &["5", "may"]),
    (Month::June, &["6", "jun", "june"]),
    (Month::July, &["7", "jul", "july"]),
    (Month::August, &["8", "au", "aug", "august"]),
    (Month::September, &["9", "se", "sep", "sept", "september"]),
    (Month::October, &["10", "o", "oc", "oct", "october"]),
    (Month::November, &["11", "n", "no", "nov", "november"]),
    (Month::December, &["12", "d", "de", "dec", "december"]),
];

/// Reads a month from its number or one of its (case-insensitive) abbreviations.
pub fn parse_month(token: &str) -> Option<Month> {
    let token = token.trim().to_lowercase();
    MONTH_ALIASES
        .iter()
        .find(|(_, aliases)| aliases.contains(&token.as_str()))
        .map(|(month, _)| *month)
}

pub fn month_aliases(month: Month) -> &'static [&'static str] {
    MONTH_ALIASES
        .iter()
        .find(|(m, _)| *m == month)
        .map(|(_, aliases)| *aliases)
        .unwrap_or(&[])
}

/// One value of a category.
#[derive(Clone, PartialEq, Eq, Hash)]
pub enum Value {
    Integer(i64),
    Float(Number),
    Month(Month),
    Token(String),
}

impl Value {
    pub fn token(token: &str) -> Self {
        Value::Token(token.to_string())
    }

    pub fn float(value: f64) -> Option<Self> {
        decimal_from_f64(value).map(Value::Float)
    }

    pub fn month(token: &str) -> Option<Self> {
        parse_month(token).map(Value::Month)
    }

    pub fn value_type(&self) -> ValueType {
        match self {
            Value::Integer(_) => ValueType::Integer,
            Value::Float(_) => ValueType::Float,
            Value::Month(_) => ValueType::Month,
            Value::Token(_) => ValueType::Category,
        }
    }

    /// Position of the value on an ordered axis; `None` for categorical tokens.
    pub fn number(&self) -> Option<Number> {
        match self {
            Value::Integer(i) => Some(Number::from(*i)),
            Value::Float(n) => Some(*n),
            Value::Month(m) => Some(Number::from(m.number_from_month())),
            Value::Token(_) => None,
        }
    }

    /// Lower-cased string form used to match bare literals against values.
    pub fn canonical(&self) -> String {
        self.to_string().to_lowercase()
    }
}

impl From<i64> for Value {
    fn from(value: i64) -> Self {
        Value::Integer(value)
    }
}

impl From<i32> for Value {
    fn from(value: i32) -> Self {
        Value::Integer(value as i64)
    }
}

impl From<&str> for Value {
    fn from(value: &str) -> Self {
        Value::token(value)
    }
}

impl From<Month> for Value {
    fn from(value: Month) -> Self {
        Value::Month(value)
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Integer(i) => write!(f, "{}", i),
            Value::Float(n) => write!(f, "{}", n.normalize()),
            Value::Month(m) => write!(f, "{}", m.name()),
            Value::Token(s) => write!(f, "{}", s),
        }
    }
}

impl fmt::Debug for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self)
    }
}

impl Serialize for Value {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            Value::Integer(i) => serializer.serialize_i64(*i),
            Value::Float(n) => match n.to_f64() {
                Some(x) => serializer.serialize_f64(x),
                None => serializer.serialize_str(&n.to_string()),
            },
            Value::Month(m) => serializer.serialize_str(m.name()),
            Value::Token(s) => serializer.serialize_str(s),
        }
    }
}

/// An untyped scalar as it appears in a definition file or a rule parameter.
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
#[serde(untagged)]
pub enum Literal {
    Integer(i64),
    Float(f64),
    Text(String),
}

impl Literal {
    /// Lower-cased string form; agrees with [`Value::canonical`] for the value the
    /// literal denotes.
    pub fn canonical(&self) -> String {
        match self {
            Literal::Integer(i) => i.to_string(),
            Literal::Float(x) => match decimal_from_f64(*x) {
                Some(n) => n.to_string(),
                None => x.to_string(),
            },
            Literal::Text(s) => s.trim().to_lowercase(),
        }
    }

    pub fn to_value(&self, value_type: ValueType) -> Result<Value, ConfigError> {
        let invalid = || ConfigError::InvalidLiteral {
            literal: self.to_string(),
            expected: value_type,
        };
        match (value_type, self) {
            (ValueType::Integer, Literal::Integer(i)) => Ok(Value::Integer(*i)),
            (ValueType::Integer, Literal::Text(s)) => {
                s.trim().parse::<i64>().map(Value::Integer).map_err(|_| invalid())
            }
            (ValueType::Integer, Literal::Float(_)) => Err(invalid()),
            (ValueType::Float, Literal::Integer(i)) => Ok(Value::Float(Number::from(*i))),
            (ValueType::Float, Literal::Float(x)) => Value::float(*x).ok_or_else(invalid),
            (ValueType::Float, Literal::Text(s)) => {
                decimal_from_str(s).map(Value::Float).ok_or_else(invalid)
            }
            (ValueType::Month, Literal::Integer(i)) => {
                Value::month(&i.to_string()).ok_or_else(invalid)
            }
            (ValueType::Month, Literal::Text(s)) => Value::month(s).ok_or_else(invalid),
            (ValueType::Month, Literal::Float(_)) => Err(invalid()),
            (ValueType::Category, Literal::Text(s)) => Ok(Value::Token(s.clone())),
            (ValueType::Category, literal) => Ok(Value::Token(literal.to_string())),
        }
    }
}

impl fmt::Display for Literal {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Literal::Integer(i) => write!(f, "{}", i),
            Literal::Float(x) => write!(f, "{}", x),
            Literal::Text(s) => write!(f, "{}", s),
        }
    }
}

impl From<i64> for Literal {
    fn from(value: i64) -> Self {
        Literal::Integer(value)
    }
}

impl From<&str> for Literal {
    fn from(value: &str) -> Self {
        Literal::Text(value.to_string())
    }
}
