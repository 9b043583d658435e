use std::fmt;

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Deserialize, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Status {
    #[default]
    Unsure,
    Confirmed,
    Rejected,
}

impl Status {
    pub fn is_possible(&self) -> bool {
        *self != Status::Rejected
    }

    /// Confirmed and rejected rows never change again.
    pub fn can_become(&self, next: Status) -> bool {
        *self == next || *self == Status::Unsure
    }

    pub fn marker(&self) -> char {
        match self {
            Status::Unsure => '?',
            Status::Confirmed => '+',
            Status::Rejected => 'x',
        }
    }

    pub fn from_marker(marker: char) -> Option<Self> {
        match marker {
            '?' => Some(Status::Unsure),
            '+' => Some(Status::Confirmed),
            'x' => Some(Status::Rejected),
            _ => None,
        }
    }
}

impl fmt::Display for Status {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Status::Unsure => write!(f, "unsure"),
            Status::Confirmed => write!(f, "confirmed"),
            Status::Rejected => write!(f, "rejected"),
        }
    }
}
