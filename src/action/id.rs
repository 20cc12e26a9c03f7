// src/action/id.rs

//! Action identities and dependency references.

use std::fmt;
use std::str::FromStr;

/// Scope written in a [`TargetId`] to mean "every scope of this type".
pub const WILDCARD_SCOPE: &str = "*";

/// Identity of one action instance: what kind of work, and where.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct ActionId {
    action_type: String,
    scope: String,
}

impl ActionId {
    pub fn new(action_type: impl Into<String>, scope: impl Into<String>) -> Self {
        Self {
            action_type: action_type.into(),
            scope: scope.into(),
        }
    }

    pub fn action_type(&self) -> &str {
        &self.action_type
    }

    pub fn scope(&self) -> &str {
        &self.scope
    }
}

impl fmt::Display for ActionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.action_type, self.scope)
    }
}

/// Scope half of a [`TargetId`].
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum TargetScope {
    All,
    Exact(String),
}

/// Dependency reference: matches every action of `action_type` whose scope
/// matches `scope`.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct TargetId {
    action_type: String,
    scope: TargetScope,
}

impl TargetId {
    /// Target every scope of `action_type`.
    pub fn all(action_type: impl Into<String>) -> Self {
        Self {
            action_type: action_type.into(),
            scope: TargetScope::All,
        }
    }

    /// Target exactly one scope of `action_type`.
    pub fn exact(action_type: impl Into<String>, scope: impl Into<String>) -> Self {
        Self {
            action_type: action_type.into(),
            scope: TargetScope::Exact(scope.into()),
        }
    }

    pub fn action_type(&self) -> &str {
        &self.action_type
    }

    pub fn scope(&self) -> &TargetScope {
        &self.scope
    }

    pub fn matches(&self, id: &ActionId) -> bool {
        if self.action_type != id.action_type() {
            return false;
        }
        match &self.scope {
            TargetScope::All => true,
            TargetScope::Exact(scope) => scope == id.scope(),
        }
    }
}

impl fmt::Display for TargetId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.scope {
            TargetScope::All => write!(f, "{}:{}", self.action_type, WILDCARD_SCOPE),
            TargetScope::Exact(scope) => write!(f, "{}:{}", self.action_type, scope),
        }
    }
}

impl From<&ActionId> for TargetId {
    fn from(id: &ActionId) -> Self {
        TargetId::exact(id.action_type(), id.scope())
    }
}

/// Parses `type`, `type:*` or `type:scope`.
impl FromStr for TargetId {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim();
        let (action_type, scope) = match s.split_once(':') {
            Some((t, scope)) => (t, Some(scope)),
            None => (s, None),
        };

        if action_type.is_empty() {
            return Err(format!("invalid target '{s}': empty action type"));
        }

        match scope {
            None | Some(WILDCARD_SCOPE) => Ok(TargetId::all(action_type)),
            Some("") => Err(format!("invalid target '{s}': empty scope")),
            Some(scope) => Ok(TargetId::exact(action_type, scope)),
        }
    }
}
