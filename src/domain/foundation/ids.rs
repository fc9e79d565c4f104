//! Strongly-typed identifier value objects.
//!
//! All identifiers in the realtime core are assigned by the server as
//! integers; the client never mints them.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Server-assigned identifier for a notification.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct NotificationId(i64);

impl NotificationId {
    /// Wraps a raw server id.
    pub fn new(raw: i64) -> Self {
        Self(raw)
    }

    /// Returns the raw integer.
    pub fn as_i64(&self) -> i64 {
        self.0
    }
}

impl From<i64> for NotificationId {
    fn from(raw: i64) -> Self {
        Self(raw)
    }
}

impl fmt::Display for NotificationId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl FromStr for NotificationId {
    type Err = std::num::ParseIntError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(Self(s.trim().parse()?))
    }
}

/// Server-assigned identifier for an internship listing.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct InternshipId(i64);

impl InternshipId {
    /// Wraps a raw server id.
    pub fn new(raw: i64) -> Self {
        Self(raw)
    }

    /// Returns the raw integer.
    pub fn as_i64(&self) -> i64 {
        self.0
    }
}

impl From<i64> for InternshipId {
    fn from(raw: i64) -> Self {
        Self(raw)
    }
}

impl fmt::Display for InternshipId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl FromStr for InternshipId {
    type Err = std::num::ParseIntError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(Self(s.trim().parse()?))
    }
}

/// Server-assigned identifier for a user account.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct UserId(i64);

impl UserId {
    /// Wraps a raw server id.
    pub fn new(raw: i64) -> Self {
        Self(raw)
    }

    /// Returns the raw integer.
    pub fn as_i64(&self) -> i64 {
        self.0
    }
}

impl fmt::Display for UserId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}
