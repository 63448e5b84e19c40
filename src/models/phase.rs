use std::fmt;

use serde::{Deserialize, Deserializer, Serialize, Serializer};

/// Lifecycle phase shown to users
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum LifecyclePhase {
    Upcoming,
    Live,
    Completed,
    Cancelled,
    /// Any other backend-set value, passed through verbatim
    Other(String),
}

impl LifecyclePhase {
    /// Parse a backend status value. Known values match case-insensitively.
    pub fn parse(raw: &str) -> Self {
        let trimmed = raw.trim();
        match trimmed.to_lowercase().as_str() {
            "upcoming" => LifecyclePhase::Upcoming,
            "live" => LifecyclePhase::Live,
            "completed" => LifecyclePhase::Completed,
            "cancelled" => LifecyclePhase::Cancelled,
            _ => LifecyclePhase::Other(trimmed.to_string()),
        }
    }

    pub fn as_str(&self) -> &str {
        match self {
            LifecyclePhase::Upcoming => "upcoming",
            LifecyclePhase::Live => "live",
            LifecyclePhase::Completed => "completed",
            LifecyclePhase::Cancelled => "cancelled",
            LifecyclePhase::Other(s) => s,
        }
    }
}

impl fmt::Display for LifecyclePhase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl Serialize for LifecyclePhase {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.as_str())
    }
}

impl<'de> Deserialize<'de> for LifecyclePhase {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let raw = String::deserialize(deserializer)?;
        Ok(LifecyclePhase::parse(&raw))
    }
}
