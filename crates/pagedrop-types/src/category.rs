//! The closed set of labels a deployment can be filed under.
//!
//! The table is a constant: listing filters and display code receive it by
//! value instead of consulting a mutable registry.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::TypeError;

/// Filter value that disables category filtering in listings.
pub const ALL_SENTINEL: &str = "all";

/// Category label attached to a deployment at publish time.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Category {
    #[default]
    Default,
    Portfolio,
    Landing,
    Demo,
    Test,
}

impl Category {
    /// Every category, in display order.
    pub const ALL: [Category; 5] = [
        Category::Default,
        Category::Portfolio,
        Category::Landing,
        Category::Demo,
        Category::Test,
    ];

    /// Wire and storage name.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Default => "default",
            Self::Portfolio => "portfolio",
            Self::Landing => "landing",
            Self::Demo => "demo",
            Self::Test => "test",
        }
    }

    /// Human-readable label.
    pub fn label(&self) -> &'static str {
        match self {
            Self::Default => "Default",
            Self::Portfolio => "Portfolio",
            Self::Landing => "Landing page",
            Self::Demo => "Demo",
            Self::Test => "Test",
        }
    }
}

impl fmt::Display for Category {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Category {
    type Err = TypeError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|c| c.as_str() == s)
            .ok_or_else(|| TypeError::UnknownCategory(s.to_string()))
    }
}

/// Category restriction applied by listings.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum CategoryFilter {
    /// No restriction.
    #[default]
    All,
    /// Only deployments filed under this category.
    Only(Category),
}

impl CategoryFilter {
    /// Parse an optional filter string. `None` and `"all"` both mean
    /// [`CategoryFilter::All`].
    pub fn parse(filter: Option<&str>) -> Result<Self, TypeError> {
        match filter {
            None | Some(ALL_SENTINEL) => Ok(Self::All),
            Some(s) => s.parse().map(Self::Only),
        }
    }

    /// The category to restrict to, if any.
    pub fn category(&self) -> Option<Category> {
        match self {
            Self::All => None,
            Self::Only(c) => Some(*c),
        }
    }

    pub fn matches(&self, category: Category) -> bool {
        match self {
            Self::All => true,
            Self::Only(c) => *c == category,
        }
    }
}

impl From<Category> for CategoryFilter {
    fn from(category: Category) -> Self {
        Self::Only(category)
    }
}

impl fmt::Display for CategoryFilter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::All => f.write_str(ALL_SENTINEL),
            Self::Only(c) => c.fmt(f),
        }
    }
}
