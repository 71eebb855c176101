//! Raw load form values
//!
//! Form posts, multipart uploads and JSON bodies all arrive as loosely typed
//! values. `LoadForm` holds them as strings keyed by the wizard's field
//! names, accepting the backend's names as aliases, and converts them into a
//! `NewLoad`.

use chrono::NaiveDate;
use serde_json::Value;
use std::collections::BTreeMap;

use super::rules::{FieldError, ValidationError};
use crate::model::serde_pb::parse_date;
use crate::model::{EquipmentType, Visibility};
use crate::mutation::NewLoad;

/// Wizard field name and the backend field it is stored as
const ALIASES: &[(&str, &str)] = &[
    ("originAddress", "origin_address"),
    ("destinationAddress", "destination_address"),
    ("pickupDate", "pickup_date"),
    ("pickupTime", "pickup_time"),
    ("deliveryDate", "delivery_date"),
    ("deliveryTime", "delivery_time"),
    ("companyName", "company_name"),
    ("cargo_description", "cargoDescription"),
    ("cargo_name", "cargoName"),
    ("equipment_type", "equipmentType"),
    ("pieceCount", "piece_count"),
    ("packagingType", "packaging_type"),
    ("temperatureMin", "temperature_min"),
    ("temperatureMax", "temperature_max"),
    ("specialRequirements", "special_requirements"),
    ("accessorialServices", "accessorial_services"),
    ("isHazardous", "is_hazardous"),
    ("isExpedited", "is_expedited"),
    ("paymentAmount", "payment_amount"),
    ("reference_number", "referenceNumber"),
];

fn canonical(key: &str) -> &str {
    ALIASES
        .iter()
        .find(|(_, alias)| *alias == key)
        .map(|(name, _)| *name)
        .unwrap_or(key)
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct LoadForm {
    values: BTreeMap<String, String>,
}

impl LoadForm {
    pub fn new() -> Self {
        Self::default()
    }

    /// Set a value, storing backend names under the wizard name
    pub fn set(&mut self, key: &str, value: impl Into<String>) {
        self.values.insert(canonical(key).to_string(), value.into());
    }

    pub fn with(mut self, key: &str, value: impl Into<String>) -> Self {
        self.set(key, value);
        self
    }

    pub fn get(&self, key: &str) -> Option<&str> {
        self.values.get(canonical(key)).map(String::as_str)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.values.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }

    /// Flatten a JSON object; nulls are skipped and scalars stringified
    pub fn from_json(value: &Value) -> Self {
        let mut form = Self::new();
        if let Some(fields) = value.as_object() {
            for (key, value) in fields {
                match value {
                    Value::Null | Value::Array(_) | Value::Object(_) => {}
                    Value::String(s) => form.set(key, s.clone()),
                    other => form.set(key, other.to_string()),
                }
            }
        }
        form
    }

    fn text(&self, key: &str) -> Option<String> {
        self.get(key)
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .map(String::from)
    }

    fn flag(&self, key: &str) -> bool {
        matches!(
            self.get(key).map(|s| s.trim().to_lowercase()).as_deref(),
            Some("true" | "on" | "1" | "yes")
        )
    }

    /// Convert into a `NewLoad`.
    ///
    /// Only origin and destination are required here; the wizard rules are
    /// stricter and run separately. Every present numeric or date value must
    /// parse.
    pub fn to_new_load(&self) -> Result<NewLoad, ValidationError> {
        let mut errors = ValidationError::default();

        let mut required = |key: &str, message: &str| match self.text(key) {
            Some(v) => v,
            None => {
                errors.push(FieldError::new(key, message));
                String::new()
            }
        };
        let origin = required("origin", "Origin location is required");
        let destination = required("destination", "Destination location is required");

        let mut number = |key: &str, label: &str| -> Option<f64> {
            let raw = self.text(key)?;
            match raw.parse::<f64>() {
                Ok(v) if v.is_finite() => Some(v),
                _ => {
                    errors.push(FieldError::new(key, format!("{} must be a number", label)));
                    None
                }
            }
        };
        let weight = number("weight", "Weight");
        let length = number("length", "Length");
        let width = number("width", "Width");
        let height = number("height", "Height");
        let temperature_min = number("temperatureMin", "Minimum temperature");
        let temperature_max = number("temperatureMax", "Maximum temperature");
        let distance = number("distance", "Distance");
        let payment_amount = number("paymentAmount", "Payment amount");

        let piece_count = match self.text("pieceCount") {
            Some(raw) => match raw.parse::<u32>() {
                Ok(v) => Some(v),
                Err(_) => {
                    errors.push(FieldError::new("pieceCount", "Piece count must be a whole number"));
                    None
                }
            },
            None => None,
        };

        let mut date = |key: &str, label: &str| -> Option<NaiveDate> {
            let raw = self.text(key)?;
            let parsed = parse_date(&raw);
            if parsed.is_none() {
                errors.push(FieldError::new(key, format!("{} must be a date (YYYY-MM-DD)", label)));
            }
            parsed
        };
        let pickup_date = date("pickupDate", "Pickup date");
        let delivery_date = date("deliveryDate", "Delivery date");

        let visibility = match self.text("visibility") {
            Some(raw) => raw.parse::<Visibility>().unwrap_or_else(|e| {
                errors.push(FieldError::new("visibility", e));
                Visibility::Public
            }),
            None => Visibility::Public,
        };

        errors.into_result()?;

        Ok(NewLoad {
            reference_number: self.text("reference_number"),
            visibility,
            origin,
            destination,
            origin_address: self.text("originAddress"),
            destination_address: self.text("destinationAddress"),
            pickup_date,
            pickup_time: self.text("pickupTime"),
            delivery_date,
            delivery_time: self.text("deliveryTime"),
            cargo_description: self.text("cargo_description"),
            cargo_name: self.text("cargo_name"),
            weight,
            length,
            width,
            height,
            piece_count,
            packaging_type: self.text("packagingType"),
            is_hazardous: self.flag("isHazardous"),
            is_expedited: self.flag("isExpedited"),
            temperature_min,
            temperature_max,
            special_requirements: self.text("specialRequirements"),
            accessorial_services: self.text("accessorialServices"),
            equipment_type: self
                .text("equipment_type")
                .map(|raw| EquipmentType::from_code_or_label(&raw)),
            distance,
            payment_amount,
            currency: self.text("currency"),
            company_name: self.text("companyName"),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_aliases_resolve() {
        let form = LoadForm::new()
            .with("origin_address", "Apapa")
            .with("companyName", "Sahel Freight");
        assert_eq!(form.get("originAddress"), Some("Apapa"));
        assert_eq!(form.get("origin_address"), Some("Apapa"));
        assert_eq!(form.get("company_name"), Some("Sahel Freight"));
    }

    #[test]
    fn test_json_scenario_converts() {
        let form = LoadForm::from_json(&json!({
            "origin": "Lagos",
            "destination": "Accra",
            "weight": 5000,
            "equipment_type": "dry_van",
            "cargo_name": "Maize",
            "isHazardous": true,
            "carrier": null
        }));

        let load = form.to_new_load().unwrap();
        assert_eq!(load.origin, "Lagos");
        assert_eq!(load.weight, Some(5000.0));
        assert_eq!(load.equipment_type, Some(EquipmentType::DryVan));
        assert_eq!(load.cargo_name.as_deref(), Some("Maize"));
        assert!(load.is_hazardous);
        assert!(load.reference_number.is_none());
        assert!(load.origin_address.is_none());
    }

    #[test]
    fn test_conversion_errors_are_per_field() {
        let form = LoadForm::new()
            .with("destination", "Accra")
            .with("weight", "lots")
            .with("pieceCount", "3.5")
            .with("pickup_date", "tomorrow");

        let err = form.to_new_load().unwrap_err();
        assert_eq!(err.message_for("origin"), Some("Origin location is required"));
        assert_eq!(err.message_for("weight"), Some("Weight must be a number"));
        assert!(err.message_for("pieceCount").is_some());
        assert!(err.message_for("pickupDate").is_some());
        assert!(err.message_for("destination").is_none());
    }

    #[test]
    fn test_blank_values_are_absent() {
        let form = LoadForm::new()
            .with("origin", "Kano")
            .with("destination", "Abuja")
            .with("length", "  ")
            .with("visibility", "private");
        let load = form.to_new_load().unwrap();
        assert!(load.length.is_none());
        assert_eq!(load.visibility, Visibility::Private);
    }
}
