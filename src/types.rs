use std::fmt;
use std::future::Future;
use std::pin::Pin;
use std::str::FromStr;

use serde::Deserialize;

/// Boxed, sendable future used at the trait seams (uplinks, actions,
/// executor backends) so they stay object safe.
pub type BoxFuture<'a, T> = Pin<Box<dyn Future<Output = T> + Send + 'a>>;

/// Capability tag a node can hold.
///
/// Roles decide which actions exist for a node and which daemons are
/// described in rendered configuration files.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum Role {
    /// Hosts the coordination service.
    ZooKeeper,
    /// Hosts a load-generation agent.
    TrogdorAgent,
    /// Hosts the load-generation coordinator.
    TrogdorCoordinator,
}

impl Role {
    pub const ALL: [Role; 3] = [Role::ZooKeeper, Role::TrogdorAgent, Role::TrogdorCoordinator];

    pub fn as_str(&self) -> &'static str {
        match self {
            Role::ZooKeeper => "zooKeeper",
            Role::TrogdorAgent => "trogdorAgent",
            Role::TrogdorCoordinator => "trogdorCoordinator",
        }
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Role {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Role::ALL
            .into_iter()
            .find(|role| role.as_str().eq_ignore_ascii_case(s.trim()))
            .ok_or_else(|| {
                format!(
                    "invalid role: {s} (expected \"zooKeeper\", \"trogdorAgent\" or \"trogdorCoordinator\")"
                )
            })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn role_parses_case_insensitively() {
        assert_eq!("trogdoragent".parse::<Role>(), Ok(Role::TrogdorAgent));
        assert_eq!(" zooKeeper ".parse::<Role>(), Ok(Role::ZooKeeper));
        assert!("broker".parse::<Role>().is_err());
    }
}
