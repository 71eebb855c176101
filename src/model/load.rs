//! Load records
//!
//! Field names follow the `loads` collection on the record backend, including
//! its mixed camelCase/snake_case naming.

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Deserializer, Serialize, Serializer};

use super::clearance::{
    documents_or_empty, ClearanceDocument, ClearancePriority, ClearanceStatus, DocumentCounts,
};
use super::equipment::EquipmentType;
use super::serde_pb::{empty_as_none, opt_date, opt_timestamp};
use super::status::LoadStatus;

/// Name of the backend collection holding loads
pub const LOADS_COLLECTION: &str = "loads";

/// A freight load posted on the marketplace
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Default)]
pub struct Load {
    // Identity
    pub id: String,
    #[serde(default)]
    pub reference_number: String,

    #[serde(default)]
    pub status: LoadStatus,
    #[serde(default)]
    pub visibility: Visibility,

    // Route
    #[serde(default)]
    pub origin: String,
    #[serde(default)]
    pub destination: String,
    #[serde(default, deserialize_with = "empty_as_none")]
    pub origin_address: Option<String>,
    #[serde(default, deserialize_with = "empty_as_none")]
    pub destination_address: Option<String>,
    #[serde(default, with = "opt_date")]
    pub pickup_date: Option<NaiveDate>,
    #[serde(default, deserialize_with = "empty_as_none")]
    pub pickup_time: Option<String>,
    #[serde(default, with = "opt_date")]
    pub delivery_date: Option<NaiveDate>,
    #[serde(default, deserialize_with = "empty_as_none")]
    pub delivery_time: Option<String>,

    // Cargo
    #[serde(default, deserialize_with = "empty_as_none")]
    pub cargo_description: Option<String>,
    #[serde(default, deserialize_with = "empty_as_none")]
    pub cargo_name: Option<String>,
    #[serde(default)]
    pub weight: Option<f64>,
    #[serde(default)]
    pub length: Option<f64>,
    #[serde(default)]
    pub width: Option<f64>,
    #[serde(default)]
    pub height: Option<f64>,
    #[serde(default, rename = "pieceCount")]
    pub piece_count: Option<u32>,
    #[serde(default, rename = "packagingType", deserialize_with = "empty_as_none")]
    pub packaging_type: Option<String>,
    #[serde(default, rename = "isHazardous")]
    pub is_hazardous: bool,
    #[serde(default, rename = "isExpedited")]
    pub is_expedited: bool,
    #[serde(default, rename = "temperatureMin")]
    pub temperature_min: Option<f64>,
    #[serde(default, rename = "temperatureMax")]
    pub temperature_max: Option<f64>,
    #[serde(default, rename = "specialRequirements", deserialize_with = "empty_as_none")]
    pub special_requirements: Option<String>,
    #[serde(default, rename = "accessorialServices", deserialize_with = "empty_as_none")]
    pub accessorial_services: Option<String>,

    // Commercial
    #[serde(default, deserialize_with = "empty_as_none")]
    pub equipment_type: Option<EquipmentType>,
    #[serde(default)]
    pub distance: Option<f64>,
    #[serde(default, rename = "paymentAmount")]
    pub payment_amount: Option<f64>,
    #[serde(default, deserialize_with = "empty_as_none")]
    pub currency: Option<String>,
    #[serde(default, deserialize_with = "empty_as_none")]
    pub company_name: Option<String>,

    // Assignment
    #[serde(default, deserialize_with = "empty_as_none")]
    pub carrier: Option<String>,
    #[serde(default, deserialize_with = "empty_as_none")]
    pub shipper: Option<String>,
    #[serde(default, deserialize_with = "empty_as_none")]
    pub driver_name: Option<String>,
    #[serde(default, deserialize_with = "empty_as_none")]
    pub current_location: Option<String>,

    /// Attached document file names
    #[serde(default)]
    pub documents: Vec<String>,

    // Customs
    #[serde(default, rename = "clearanceStatus", deserialize_with = "empty_as_none")]
    pub clearance_status: Option<ClearanceStatus>,
    #[serde(default, deserialize_with = "empty_as_none")]
    pub priority: Option<ClearancePriority>,
    #[serde(default, rename = "clearanceDocuments", deserialize_with = "documents_or_empty")]
    pub clearance_documents: Vec<ClearanceDocument>,

    // Timestamps
    #[serde(default, rename = "assignedAt", with = "opt_timestamp")]
    pub assigned_at: Option<DateTime<Utc>>,
    #[serde(default, rename = "completedAt", with = "opt_timestamp")]
    pub completed_at: Option<DateTime<Utc>>,
    #[serde(default, with = "opt_timestamp")]
    pub created: Option<DateTime<Utc>>,
    #[serde(default, with = "opt_timestamp")]
    pub updated: Option<DateTime<Utc>>,
}

impl Load {
    /// Whether the carrier assignment agrees with the status.
    ///
    /// Nothing enforces this on plain status patches; claims keep it true.
    pub fn carrier_consistent(&self) -> bool {
        if self.status == LoadStatus::Cancelled {
            return true;
        }
        self.status.expects_carrier() == self.carrier.is_some()
    }

    /// Whether the load belongs to the given carrier
    pub fn is_carried_by(&self, carrier_id: &str) -> bool {
        self.carrier.as_deref() == Some(carrier_id)
    }

    /// Clearance status; loads customs has not picked up yet are pending
    pub fn clearance(&self) -> ClearanceStatus {
        self.clearance_status.unwrap_or_default()
    }

    pub fn document_counts(&self) -> DocumentCounts {
        DocumentCounts::of(&self.clearance_documents)
    }

    /// Short route description, e.g. `Lagos -> Accra`
    pub fn route(&self) -> String {
        format!("{} -> {}", self.origin, self.destination)
    }
}

/// Who can see a load
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum Visibility {
    #[default]
    Public,
    Private,
}

impl Visibility {
    pub fn as_str(&self) -> &'static str {
        match self {
            Visibility::Public => "public",
            Visibility::Private => "private",
        }
    }
}

impl std::str::FromStr for Visibility {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "public" => Ok(Visibility::Public),
            "private" => Ok(Visibility::Private),
            other => Err(format!("unknown visibility: {}", other)),
        }
    }
}

impl Serialize for Visibility {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.as_str())
    }
}

impl<'de> Deserialize<'de> for Visibility {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        // Unset fields come back as ""; only an explicit "private" hides a load.
        let raw = String::deserialize(deserializer)?;
        Ok(raw.parse().unwrap_or_default())
    }
}
