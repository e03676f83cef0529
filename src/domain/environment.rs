use crate::error::{Result, TagError};
use std::fmt;

/// Environments accepted when no configuration overrides them.
pub const DEFAULT_ENVIRONMENTS: &[&str] = &["dev", "mimic2", "stg6", "demo", "production2"];

/// A deployment stage name that belongs to an [`EnvironmentSet`].
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Environment(String);

impl Environment {
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for Environment {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Closed vocabulary of environment names.
///
/// Immutable once built; the grammar receives it at construction time so
/// each caller (and each test) can use its own list.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EnvironmentSet {
    names: Vec<String>,
}

impl EnvironmentSet {
    /// Build a set from names, dropping blanks and duplicates while keeping order.
    pub fn new<I, S>(names: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let mut unique: Vec<String> = Vec::new();
        for name in names {
            let name = name.into().trim().to_string();
            if !name.is_empty() && !unique.contains(&name) {
                unique.push(name);
            }
        }
        EnvironmentSet { names: unique }
    }

    pub fn contains(&self, name: &str) -> bool {
        self.names.iter().any(|n| n == name)
    }

    /// Validate a name against the set.
    pub fn parse(&self, name: &str) -> Result<Environment> {
        if self.contains(name) {
            Ok(Environment(name.to_string()))
        } else {
            Err(TagError::UnknownEnvironment(format!(
                "'{}' (valid environments: {})",
                name,
                self.names.join(", ")
            )))
        }
    }

    pub fn names(&self) -> &[String] {
        &self.names
    }

    pub fn is_empty(&self) -> bool {
        self.names.is_empty()
    }
}

impl Default for EnvironmentSet {
    fn default() -> Self {
        EnvironmentSet::new(DEFAULT_ENVIRONMENTS.iter().copied())
    }
}
