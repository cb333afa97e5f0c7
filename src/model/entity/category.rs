use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Deserializer, Serialize, Serializer};

/// Difficulty bucket of a module.
///
/// Values outside the known set are kept verbatim in [`Category::Other`], the
/// catalog is allowed to grow new buckets without breaking older clients.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Category {
    Beginner,
    Intermediate,
    Expert,
    Other(String),
}

impl Category {
    pub const KNOWN: [Category; 3] = [Category::Beginner, Category::Intermediate, Category::Expert];

    pub fn as_str(&self) -> &str {
        match self {
            Self::Beginner => "Beginner",
            Self::Intermediate => "Intermediate",
            Self::Expert => "Expert",
            Self::Other(s) => s,
        }
    }

    pub fn is_known(&self) -> bool {
        !matches!(self, Self::Other(_))
    }
}

impl From<&str> for Category {
    fn from(value: &str) -> Self {
        match value {
            "Beginner" => Self::Beginner,
            "Intermediate" => Self::Intermediate,
            "Expert" => Self::Expert,
            other => Self::Other(other.to_string()),
        }
    }
}

impl From<String> for Category {
    fn from(value: String) -> Self {
        match Self::from(value.as_str()) {
            Self::Other(_) => Self::Other(value),
            known => known,
        }
    }
}

impl fmt::Display for Category {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl Serialize for Category {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.as_str())
    }
}

impl<'de> Deserialize<'de> for Category {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let s = String::deserialize(deserializer)?;
        Ok(Self::from(s))
    }
}

/// Category selection of a list screen. `"All"` disables filtering.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum CategoryFilter {
    #[default]
    All,
    Only(Category),
}

impl CategoryFilter {
    pub const ALL: &'static str = "All";

    pub fn matches(&self, category: &Category) -> bool {
        match self {
            Self::All => true,
            Self::Only(wanted) => wanted == category,
        }
    }
}

impl From<&str> for CategoryFilter {
    fn from(value: &str) -> Self {
        if value == Self::ALL {
            Self::All
        } else {
            Self::Only(Category::from(value))
        }
    }
}

impl From<Category> for CategoryFilter {
    fn from(value: Category) -> Self {
        Self::Only(value)
    }
}

impl From<Option<Category>> for CategoryFilter {
    fn from(value: Option<Category>) -> Self {
        value.map_or(Self::All, Self::Only)
    }
}

impl FromStr for CategoryFilter {
    type Err = std::convert::Infallible;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(Self::from(s))
    }
}

impl fmt::Display for CategoryFilter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::All => f.write_str(Self::ALL),
            Self::Only(category) => category.fmt(f),
        }
    }
}
