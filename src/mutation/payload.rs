//! Create and update payloads

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::model::serde_pb::opt_date;
use crate::model::{ClearanceStatus, EquipmentType, Load, LoadStatus, Visibility};

/// Fields of a new load, before the backend assigns identity
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct NewLoad {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub reference_number: Option<String>,
    pub visibility: Visibility,

    pub origin: String,
    pub destination: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub origin_address: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub destination_address: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none", serialize_with = "opt_date::serialize")]
    pub pickup_date: Option<NaiveDate>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub pickup_time: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none", serialize_with = "opt_date::serialize")]
    pub delivery_date: Option<NaiveDate>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub delivery_time: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub cargo_description: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub cargo_name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub weight: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub length: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub width: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub height: Option<f64>,
    #[serde(rename = "pieceCount", skip_serializing_if = "Option::is_none")]
    pub piece_count: Option<u32>,
    #[serde(rename = "packagingType", skip_serializing_if = "Option::is_none")]
    pub packaging_type: Option<String>,
    #[serde(rename = "isHazardous")]
    pub is_hazardous: bool,
    #[serde(rename = "isExpedited")]
    pub is_expedited: bool,
    #[serde(rename = "temperatureMin", skip_serializing_if = "Option::is_none")]
    pub temperature_min: Option<f64>,
    #[serde(rename = "temperatureMax", skip_serializing_if = "Option::is_none")]
    pub temperature_max: Option<f64>,
    #[serde(rename = "specialRequirements", skip_serializing_if = "Option::is_none")]
    pub special_requirements: Option<String>,
    #[serde(rename = "accessorialServices", skip_serializing_if = "Option::is_none")]
    pub accessorial_services: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub equipment_type: Option<EquipmentType>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub distance: Option<f64>,
    #[serde(rename = "paymentAmount", skip_serializing_if = "Option::is_none")]
    pub payment_amount: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub currency: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub company_name: Option<String>,
}

impl NewLoad {
    /// Backend record for the load: always a draft with no carrier and no
    /// lifecycle timestamps
    pub fn into_record(
        self,
        reference_number: String,
        shipper: Option<&str>,
    ) -> Result<Value, serde_json::Error> {
        let mut record = match serde_json::to_value(&self)? {
            Value::Object(map) => map,
            _ => Map::new(),
        };

        record.insert("reference_number".into(), Value::String(reference_number));
        record.insert("status".into(), Value::String(LoadStatus::Draft.as_str().into()));
        record.insert("carrier".into(), Value::String(String::new()));
        record.insert(
            "shipper".into(),
            Value::String(shipper.unwrap_or_default().to_string()),
        );
        record.insert("assignedAt".into(), Value::Null);
        record.insert("completedAt".into(), Value::Null);

        Ok(Value::Object(record))
    }
}

/// Partial update of a load's progress and customs fields.
///
/// An empty string clears `current_location` or `driver_name`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct LoadPatch {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub status: Option<LoadStatus>,
    #[serde(default, alias = "currentLocation", skip_serializing_if = "Option::is_none")]
    pub current_location: Option<String>,
    #[serde(default, alias = "driverName", skip_serializing_if = "Option::is_none")]
    pub driver_name: Option<String>,
    #[serde(default, alias = "clearanceStatus", skip_serializing_if = "Option::is_none")]
    pub clearance_status: Option<ClearanceStatus>,
}

fn cleared(value: &str) -> Option<String> {
    let value = value.trim();
    if value.is_empty() {
        None
    } else {
        Some(value.to_string())
    }
}

impl LoadPatch {
    pub fn status(status: LoadStatus) -> Self {
        Self {
            status: Some(status),
            ..Default::default()
        }
    }

    pub fn is_empty(&self) -> bool {
        self.status.is_none()
            && self.current_location.is_none()
            && self.driver_name.is_none()
            && self.clearance_status.is_none()
    }

    /// Apply the patch to a local copy
    pub fn apply_to(&self, load: &mut Load) {
        if let Some(status) = self.status {
            load.status = status;
        }
        if let Some(location) = &self.current_location {
            load.current_location = cleared(location);
        }
        if let Some(driver) = &self.driver_name {
            load.driver_name = cleared(driver);
        }
        if let Some(clearance) = self.clearance_status {
            load.clearance_status = Some(clearance);
        }
    }

    /// Backend fields for the patch; cleared fields are sent as `""`
    pub fn to_record(&self) -> Map<String, Value> {
        let mut record = Map::new();
        if let Some(status) = self.status {
            record.insert("status".into(), Value::String(status.as_str().into()));
        }
        if let Some(location) = &self.current_location {
            record.insert(
                "current_location".into(),
                Value::String(cleared(location).unwrap_or_default()),
            );
        }
        if let Some(driver) = &self.driver_name {
            record.insert(
                "driver_name".into(),
                Value::String(cleared(driver).unwrap_or_default()),
            );
        }
        if let Some(clearance) = self.clearance_status {
            record.insert(
                "clearanceStatus".into(),
                Value::String(clearance.as_str().into()),
            );
        }
        record
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_load_record_is_draft() {
        let load = NewLoad {
            origin: "Lagos".to_string(),
            destination: "Accra".to_string(),
            weight: Some(5000.0),
            piece_count: Some(4),
            pickup_date: NaiveDate::from_ymd_opt(2024, 7, 1),
            equipment_type: Some(EquipmentType::DryVan),
            ..Default::default()
        };

        let record = load.into_record("LD-123456".to_string(), Some("s1")).unwrap();
        assert_eq!(record["status"], "draft");
        assert_eq!(record["reference_number"], "LD-123456");
        assert_eq!(record["shipper"], "s1");
        assert_eq!(record["carrier"], "");
        assert!(record["assignedAt"].is_null());
        assert_eq!(record["pieceCount"], 4);
        assert_eq!(record["pickup_date"], "2024-07-01");
        assert_eq!(record["equipment_type"], "dry_van");
        assert!(record.get("origin_address").is_none());
    }

    #[test]
    fn test_patch_deserializes_aliases() {
        let patch: LoadPatch = serde_json::from_value(serde_json::json!({
            "status": "in transit",
            "currentLocation": "Ibadan"
        }))
        .unwrap();
        assert_eq!(patch.status, Some(LoadStatus::InTransit));
        assert_eq!(patch.current_location.as_deref(), Some("Ibadan"));
        assert!(patch.driver_name.is_none());
        assert!(patch.clearance_status.is_none());
    }

    #[test]
    fn test_clearance_patch() {
        let patch: LoadPatch = serde_json::from_value(serde_json::json!({
            "clearanceStatus": "in progress"
        }))
        .unwrap();
        assert!(!patch.is_empty());
        assert_eq!(patch.to_record()["clearanceStatus"], "in-progress");

        let mut load = Load::default();
        patch.apply_to(&mut load);
        assert_eq!(load.clearance(), ClearanceStatus::InProgress);
    }

    #[test]
    fn test_empty_string_clears() {
        let mut load = Load {
            id: "a".to_string(),
            driver_name: Some("Musa".to_string()),
            ..Default::default()
        };
        let patch = LoadPatch {
            driver_name: Some(String::new()),
            ..Default::default()
        };

        patch.apply_to(&mut load);
        assert!(load.driver_name.is_none());
        assert_eq!(patch.to_record()["driver_name"], "");
        assert!(patch.to_record().get("status").is_none());
    }
}
