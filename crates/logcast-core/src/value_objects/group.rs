//! Group name - the subscription channel listeners join

use crate::error::CoreError;
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;

/// Group used when neither the dispatcher nor the listener names one
pub const DEFAULT_GROUP: &str = "LogcastGroup";

/// Hub identifier used when none is configured
pub const DEFAULT_HUB: &str = "LogcastHub";

/// Name of a subscription group
///
/// Always non-empty and trimmed. Listeners receive only events fanned out to
/// the groups they explicitly joined.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct GroupName(String);

impl GroupName {
    /// Maximum length of a group name in characters
    pub const MAX_LEN: usize = 128;

    /// Create a validated group name
    pub fn new(name: impl AsRef<str>) -> Result<Self, CoreError> {
        let name = name.as_ref().trim();

        if name.is_empty() {
            return Err(CoreError::EmptyGroupName);
        }
        if name.chars().count() > Self::MAX_LEN {
            return Err(CoreError::GroupNameTooLong { max: Self::MAX_LEN });
        }

        Ok(Self(name.to_string()))
    }

    /// Resolve an optional, possibly blank name, falling back to the default group
    #[must_use]
    pub fn resolve(name: Option<&str>) -> Self {
        name.and_then(|n| Self::new(n).ok()).unwrap_or_default()
    }

    /// Borrow the name as a string slice
    #[inline]
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Check if this is the default group
    #[inline]
    pub fn is_default(&self) -> bool {
        self.0 == DEFAULT_GROUP
    }
}

impl Default for GroupName {
    fn default() -> Self {
        Self(DEFAULT_GROUP.to_string())
    }
}

impl fmt::Display for GroupName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl AsRef<str> for GroupName {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl std::str::FromStr for GroupName {
    type Err = CoreError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::new(s)
    }
}

impl Serialize for GroupName {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.serialize_str(&self.0)
    }
}

impl<'de> Deserialize<'de> for GroupName {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        let value = String::deserialize(deserializer)?;
        Self::new(value).map_err(serde::de::Error::custom)
    }
}
