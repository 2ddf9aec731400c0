//! The closed set of departments that partition the corpus.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

/// A topical partition of the document corpus and the unit of access control.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Department {
    Engineering,
    Finance,
    General,
    Marketing,
    Hr,
}

impl Department {
    /// Every department, in ingest order.
    pub const ALL: [Department; 5] = [
        Department::Engineering,
        Department::Finance,
        Department::General,
        Department::Marketing,
        Department::Hr,
    ];

    /// The lowercase identifier used for directories, metadata and roles.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Engineering => "engineering",
            Self::Finance => "finance",
            Self::General => "general",
            Self::Marketing => "marketing",
            Self::Hr => "hr",
        }
    }
}

impl fmt::Display for Department {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Returned when a string does not name a department.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UnknownDepartment(pub String);

impl fmt::Display for UnknownDepartment {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "unknown department '{}'", self.0)
    }
}

impl std::error::Error for UnknownDepartment {}

impl FromStr for Department {
    type Err = UnknownDepartment;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Department::ALL
            .into_iter()
            .find(|d| d.as_str() == s)
            .ok_or_else(|| UnknownDepartment(s.to_string()))
    }
}
