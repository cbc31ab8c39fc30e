//! Category and Team data structures.

use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Unique identifier for a category.
pub type CategoryId = Uuid;

/// Unique identifier for a team.
pub type TeamId = Uuid;

/// A competition tier (e.g. "U18 FILLES"), optionally split into pools ("poules").
#[derive(Clone, Debug, Eq, PartialEq, Serialize, Deserialize)]
pub struct Category {
    pub id: CategoryId,
    pub name: String,
    #[serde(default)]
    pub has_poules: bool,
    /// Pool labels ("A", "B", ...). Empty when `has_poules` is false.
    #[serde(default)]
    pub pools: Vec<String>,
}

impl Category {
    /// Category without pools: all its teams play a single round-robin.
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            id: Uuid::new_v4(),
            name: name.into(),
            has_poules: false,
            pools: Vec::new(),
        }
    }

    /// Category split into the given pool labels.
    pub fn with_pools<I, S>(name: impl Into<String>, pools: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            has_poules: true,
            pools: pools.into_iter().map(Into::into).collect(),
            ..Self::new(name)
        }
    }

    pub fn has_pool(&self, label: &str) -> bool {
        self.pools.iter().any(|p| p == label)
    }
}

/// A team registered in exactly one category (and one pool when the category has pools).
#[derive(Clone, Debug, Eq, PartialEq, Serialize, Deserialize)]
pub struct Team {
    pub id: TeamId,
    pub name: String,
    /// Category name (teams reference categories by name).
    pub category: String,
    #[serde(default)]
    pub pool: Option<String>,
}

impl Team {
    pub fn new(name: impl Into<String>, category: impl Into<String>) -> Self {
        Self {
            id: Uuid::new_v4(),
            name: name.into(),
            category: category.into(),
            pool: None,
        }
    }

    pub fn in_pool(name: impl Into<String>, category: impl Into<String>, pool: impl Into<String>) -> Self {
        Self {
            pool: Some(pool.into()),
            ..Self::new(name, category)
        }
    }
}
