use serde::{Deserialize, Serialize};
use std::fmt;

/// Placeholder shown when git has no global identity or cannot be run
pub const UNKNOWN: &str = "N/A";

/// A stored account, identified by its email
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Profile {
    pub name: String,
    pub email: String,
}

impl Profile {
    pub fn new(name: impl Into<String>, email: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            email: email.into(),
        }
    }

    /// Whether this profile is the given global identity
    pub fn matches(&self, identity: &Identity) -> bool {
        !identity.is_unknown() && self.name == identity.name && self.email == identity.email
    }
}

impl fmt::Display for Profile {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} <{}>", self.name, self.email)
    }
}

/// git's global `user.name` / `user.email` pair as last observed
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Identity {
    pub name: String,
    pub email: String,
}

impl Identity {
    pub fn new(name: impl Into<String>, email: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            email: email.into(),
        }
    }

    pub fn unknown() -> Self {
        Self::new(UNKNOWN, UNKNOWN)
    }

    pub fn is_unknown(&self) -> bool {
        self.name == UNKNOWN && self.email == UNKNOWN
    }
}

impl From<&Profile> for Identity {
    fn from(profile: &Profile) -> Self {
        Self::new(profile.name.clone(), profile.email.clone())
    }
}

impl fmt::Display for Identity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} <{}>", self.name, self.email)
    }
}
