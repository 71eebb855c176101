//! Load status
//!
//! One canonical status set for every view. Older records and clients use
//! several spellings (`pending`, `in transit`, `in-transit`, `completed`,
//! `active`); all of them are accepted on input and normalized here.

use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::str::FromStr;
use thiserror::Error;

/// Where a load is in its lifecycle
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum LoadStatus {
    /// Created by a shipper, not yet visible to carriers
    #[default]
    Draft,
    /// Open for carriers to claim
    Posted,
    /// Claimed by a carrier
    Assigned,
    /// On the road
    InTransit,
    /// Terminal: handed over at destination
    Delivered,
    /// Terminal: withdrawn
    Cancelled,
}

impl LoadStatus {
    /// All statuses in lifecycle order
    pub fn all() -> &'static [LoadStatus] {
        &[
            LoadStatus::Draft,
            LoadStatus::Posted,
            LoadStatus::Assigned,
            LoadStatus::InTransit,
            LoadStatus::Delivered,
            LoadStatus::Cancelled,
        ]
    }

    /// Canonical wire value
    pub fn as_str(&self) -> &'static str {
        match self {
            LoadStatus::Draft => "draft",
            LoadStatus::Posted => "posted",
            LoadStatus::Assigned => "assigned",
            LoadStatus::InTransit => "in_transit",
            LoadStatus::Delivered => "delivered",
            LoadStatus::Cancelled => "cancelled",
        }
    }

    /// Human-readable label
    pub fn label(&self) -> &'static str {
        match self {
            LoadStatus::Draft => "Draft",
            LoadStatus::Posted => "Posted",
            LoadStatus::Assigned => "Assigned",
            LoadStatus::InTransit => "In Transit",
            LoadStatus::Delivered => "Delivered",
            LoadStatus::Cancelled => "Cancelled",
        }
    }

    /// Every stored spelling that reads back as this status
    pub fn spellings(&self) -> &'static [&'static str] {
        match self {
            LoadStatus::Draft => &["draft"],
            LoadStatus::Posted => &["posted", "active", "available"],
            LoadStatus::Assigned => &["assigned", "pending"],
            LoadStatus::InTransit => &["in_transit", "in transit", "in-transit", "delayed"],
            LoadStatus::Delivered => &["delivered", "completed"],
            LoadStatus::Cancelled => &["cancelled", "canceled"],
        }
    }

    pub fn is_terminal(&self) -> bool {
        matches!(self, LoadStatus::Delivered | LoadStatus::Cancelled)
    }

    /// Whether a load in this status is expected to have a carrier
    pub fn expects_carrier(&self) -> bool {
        matches!(
            self,
            LoadStatus::Assigned | LoadStatus::InTransit | LoadStatus::Delivered
        )
    }

    /// Lifecycle transitions accepted in strict mode.
    ///
    /// Setting the current status again is always allowed.
    pub fn can_transition_to(&self, next: LoadStatus) -> bool {
        if *self == next {
            return true;
        }

        match self {
            LoadStatus::Draft => matches!(next, LoadStatus::Posted | LoadStatus::Cancelled),
            LoadStatus::Posted => matches!(
                next,
                LoadStatus::Draft | LoadStatus::Assigned | LoadStatus::Cancelled
            ),
            LoadStatus::Assigned => matches!(
                next,
                LoadStatus::Posted | LoadStatus::InTransit | LoadStatus::Cancelled
            ),
            LoadStatus::InTransit => {
                matches!(next, LoadStatus::Delivered | LoadStatus::Cancelled)
            }
            LoadStatus::Delivered | LoadStatus::Cancelled => false,
        }
    }
}

impl std::fmt::Display for LoadStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Unknown status spelling
#[derive(Debug, Clone, Error, PartialEq)]
#[error("unknown load status: {0}")]
pub struct ParseStatusError(pub String);

impl FromStr for LoadStatus {
    type Err = ParseStatusError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let normalized: String = s
            .trim()
            .to_lowercase()
            .chars()
            .map(|c| if c == ' ' || c == '-' { '_' } else { c })
            .collect();

        match normalized.as_str() {
            "draft" => Ok(LoadStatus::Draft),
            "posted" | "active" | "available" => Ok(LoadStatus::Posted),
            "assigned" | "pending" => Ok(LoadStatus::Assigned),
            "in_transit" | "delayed" => Ok(LoadStatus::InTransit),
            "delivered" | "completed" => Ok(LoadStatus::Delivered),
            "cancelled" | "canceled" => Ok(LoadStatus::Cancelled),
            _ => Err(ParseStatusError(s.to_string())),
        }
    }
}

impl Serialize for LoadStatus {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.as_str())
    }
}

impl<'de> Deserialize<'de> for LoadStatus {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let raw = String::deserialize(deserializer)?;
        if raw.trim().is_empty() {
            return Ok(LoadStatus::default());
        }
        raw.parse().map_err(serde::de::Error::custom)
    }
}
