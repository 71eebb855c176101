//! Marketplace users

use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::str::FromStr;

use super::serde_pb::empty_as_none;

/// Name of the backend auth collection holding users
pub const USERS_COLLECTION: &str = "users";

/// Actor role, stored as `user_type` on the user record
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum UserRole {
    /// Hauls loads
    Carrier,
    /// Owner of the goods; posts loads
    Shipper,
    /// Tracks customs documentation
    ClearingAgent,
    /// Fleet owner
    TruckOwner,
}

impl UserRole {
    pub fn all() -> &'static [UserRole] {
        &[
            UserRole::Carrier,
            UserRole::Shipper,
            UserRole::ClearingAgent,
            UserRole::TruckOwner,
        ]
    }

    /// Value stored in `user_type`
    /// Roles that may take a posted load
    pub fn can_haul(&self) -> bool {
        matches!(self, UserRole::Carrier | UserRole::TruckOwner)
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            UserRole::Carrier => "carrier",
            UserRole::Shipper => "goods",
            UserRole::ClearingAgent => "agent",
            UserRole::TruckOwner => "truck-owner",
        }
    }

    /// Landing dashboard for the role
    pub fn dashboard_path(&self) -> &'static str {
        match self {
            UserRole::Carrier => "/carrier-dashboard",
            UserRole::Shipper => "/dashboard",
            UserRole::ClearingAgent => "/clearing-agents",
            UserRole::TruckOwner => "/truck-owner",
        }
    }
}

impl std::fmt::Display for UserRole {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for UserRole {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "carrier" => Ok(UserRole::Carrier),
            "goods" | "shipper" => Ok(UserRole::Shipper),
            "agent" | "clearing-agent" | "clearing_agent" => Ok(UserRole::ClearingAgent),
            "truck-owner" | "truck_owner" => Ok(UserRole::TruckOwner),
            other => Err(format!("unknown user type: {}", other)),
        }
    }
}

impl Serialize for UserRole {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.as_str())
    }
}

impl<'de> Deserialize<'de> for UserRole {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let raw = String::deserialize(deserializer)?;
        raw.parse().map_err(serde::de::Error::custom)
    }
}

/// A user record
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct User {
    pub id: String,
    #[serde(default)]
    pub email: String,
    #[serde(default)]
    pub first_name: String,
    #[serde(default)]
    pub last_name: String,
    #[serde(default, deserialize_with = "empty_as_none")]
    pub user_type: Option<UserRole>,
    #[serde(default)]
    pub verified: bool,
}

impl User {
    pub fn has_role(&self, role: UserRole) -> bool {
        self.user_type == Some(role)
    }

    /// Name used to greet the user
    pub fn display_name(&self) -> String {
        let full = format!("{} {}", self.first_name, self.last_name);
        let full = full.trim();
        if full.is_empty() {
            self.email.clone()
        } else {
            full.to_string()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_role_wire_values() {
        assert_eq!("goods".parse::<UserRole>().unwrap(), UserRole::Shipper);
        assert_eq!("agent".parse::<UserRole>().unwrap(), UserRole::ClearingAgent);
        assert_eq!(UserRole::TruckOwner.as_str(), "truck-owner");
        assert!("admin".parse::<UserRole>().is_err());
    }

    #[test]
    fn test_dashboard_paths() {
        assert_eq!(UserRole::Carrier.dashboard_path(), "/carrier-dashboard");
        assert_eq!(UserRole::Shipper.dashboard_path(), "/dashboard");
    }

    #[test]
    fn test_user_record_with_empty_type() {
        let user: User = serde_json::from_value(serde_json::json!({
            "id": "u1",
            "email": "ops@haulers.ng",
            "user_type": "",
            "verified": true
        }))
        .unwrap();
        assert!(user.user_type.is_none());
        assert_eq!(user.display_name(), "ops@haulers.ng");
    }
}
