use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Best-effort interpretation of a literal.
///
/// `Raw` is the deliberate outcome when every parse attempt failed; callers
/// expecting a number or a date must decide what to do with it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum Value {
    Number(f64),
    Date(NaiveDate),
    Raw(String),
}

impl Value {
    pub fn as_number(&self) -> Option<f64> {
        match self {
            Value::Number(n) => Some(*n),
            _ => None,
        }
    }

    pub fn as_date(&self) -> Option<NaiveDate> {
        match self {
            Value::Date(d) => Some(*d),
            _ => None,
        }
    }

    pub fn is_raw(&self) -> bool {
        matches!(self, Value::Raw(_))
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Number(n) => write!(f, "{}", n),
            Value::Date(d) => write!(f, "{}", d),
            Value::Raw(s) => write!(f, "{}", s),
        }
    }
}
