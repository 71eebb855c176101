//! Declarative field rules

use serde::{Deserialize, Serialize};

use super::LoadForm;
use crate::model::serde_pb::parse_date;
use crate::model::EquipmentType;

/// Pickup and delivery windows offered by the form
pub const TIME_SLOTS: &[&str] = &[
    "00:00-04:00",
    "04:00-08:00",
    "08:00-12:00",
    "12:00-16:00",
    "16:00-20:00",
    "20:00-00:00",
    "flexible",
];

/// A failed rule on one field
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FieldError {
    pub field: String,
    pub message: String,
}

impl FieldError {
    pub fn new(field: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            field: field.into(),
            message: message.into(),
        }
    }
}

/// One or more field errors
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ValidationError {
    pub errors: Vec<FieldError>,
}

impl ValidationError {
    pub fn single(field: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            errors: vec![FieldError::new(field, message)],
        }
    }

    pub fn is_empty(&self) -> bool {
        self.errors.is_empty()
    }

    pub fn push(&mut self, error: FieldError) {
        self.errors.push(error);
    }

    /// Message for `field`, if it failed
    pub fn message_for(&self, field: &str) -> Option<&str> {
        self.errors
            .iter()
            .find(|e| e.field == field)
            .map(|e| e.message.as_str())
    }

    /// `Ok` when nothing failed
    pub fn into_result(self) -> Result<(), ValidationError> {
        if self.errors.is_empty() {
            Ok(())
        } else {
            Err(self)
        }
    }
}

impl std::fmt::Display for ValidationError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let parts: Vec<String> = self
            .errors
            .iter()
            .map(|e| format!("{}: {}", e.field, e.message))
            .collect();
        write!(f, "Validation failed: {}", parts.join("; "))
    }
}

impl std::error::Error for ValidationError {}

/// A check applied to one form value
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Rule {
    /// At least this many characters after trimming
    MinLen(usize),
    /// A `YYYY-MM-DD` date
    Date,
    /// One of `TIME_SLOTS`
    TimeSlot,
    /// A known equipment code or label
    Equipment,
    /// A decimal number
    Number,
    /// A whole number
    Integer,
    /// Blank, or a decimal number
    OptionalNumber,
    /// Blank, or a whole number
    OptionalInteger,
}

impl Rule {
    pub fn check(&self, value: &str) -> bool {
        let value = value.trim();
        match self {
            Rule::MinLen(min) => value.chars().count() >= *min,
            Rule::Date => parse_date(value).is_some(),
            Rule::TimeSlot => TIME_SLOTS.contains(&value),
            Rule::Equipment => !value.is_empty() && EquipmentType::from_code_or_label(value).is_known(),
            Rule::Number => value.parse::<f64>().is_ok_and(f64::is_finite),
            Rule::Integer => value.parse::<u32>().is_ok(),
            Rule::OptionalNumber => value.is_empty() || Rule::Number.check(value),
            Rule::OptionalInteger => value.is_empty() || Rule::Integer.check(value),
        }
    }
}

/// A rule bound to a field and its message
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FieldRule {
    pub field: &'static str,
    pub rule: Rule,
    pub message: &'static str,
}

const fn rule(field: &'static str, rule: Rule, message: &'static str) -> FieldRule {
    FieldRule {
        field,
        rule,
        message,
    }
}

pub const ROUTE_RULES: &[FieldRule] = &[
    rule("origin", Rule::MinLen(3), "Origin location is required"),
    rule("originAddress", Rule::MinLen(3), "Origin address is required"),
    rule("destination", Rule::MinLen(3), "Destination location is required"),
    rule("destinationAddress", Rule::MinLen(3), "Destination address is required"),
    rule("pickupDate", Rule::Date, "Pickup date is required"),
    rule("pickupTime", Rule::TimeSlot, "Pickup time is required"),
    rule("deliveryDate", Rule::Date, "Delivery date is required"),
    rule("deliveryTime", Rule::TimeSlot, "Delivery time is required"),
];

pub const CARGO_RULES: &[FieldRule] = &[
    rule("cargo_description", Rule::MinLen(2), "Cargo description is required"),
    rule("weight", Rule::MinLen(1), "Weight is required"),
    rule("weight", Rule::Number, "Weight must be a number"),
    rule("equipment_type", Rule::Equipment, "Equipment type is required"),
    rule("length", Rule::OptionalNumber, "Length must be a number"),
    rule("width", Rule::OptionalNumber, "Width must be a number"),
    rule("height", Rule::OptionalNumber, "Height must be a number"),
    rule("pieceCount", Rule::OptionalInteger, "Piece count must be a whole number"),
    rule("temperatureMin", Rule::OptionalNumber, "Minimum temperature must be a number"),
    rule("temperatureMax", Rule::OptionalNumber, "Maximum temperature must be a number"),
];

pub const COMPANY_RULES: &[FieldRule] = &[
    rule("companyName", Rule::MinLen(2), "Company name is required"),
    rule("distance", Rule::OptionalNumber, "Distance must be a number"),
];

/// Run `rules` against `form`; only the first failure per field is kept
pub fn validate(form: &LoadForm, rules: &[FieldRule]) -> Result<(), ValidationError> {
    let mut result = ValidationError::default();

    for field_rule in rules {
        if result.message_for(field_rule.field).is_some() {
            continue;
        }
        let value = form.get(field_rule.field).unwrap_or_default();
        if !field_rule.rule.check(value) {
            result.push(FieldError::new(field_rule.field, field_rule.message));
        }
    }

    result.into_result()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_rule_checks() {
        assert!(Rule::MinLen(3).check("Ikeja"));
        assert!(!Rule::MinLen(3).check("  ab  "));
        assert!(Rule::Date.check("2024-06-10"));
        assert!(!Rule::Date.check("June 10"));
        assert!(Rule::TimeSlot.check("flexible"));
        assert!(!Rule::TimeSlot.check("09:00"));
        assert!(Rule::Equipment.check("Dry Van"));
        assert!(!Rule::Equipment.check("hovercraft"));
        assert!(!Rule::Equipment.check(""));
        assert!(Rule::Number.check("5000.5"));
        assert!(!Rule::Number.check("5 tons"));
        assert!(!Rule::Number.check("NaN"));
        assert!(Rule::OptionalNumber.check(""));
        assert!(!Rule::OptionalInteger.check("2.5"));
    }

    #[test]
    fn test_weight_messages() {
        let empty = LoadForm::new();
        let err = validate(&empty, CARGO_RULES).unwrap_err();
        assert_eq!(err.message_for("weight"), Some("Weight is required"));

        let form = LoadForm::new().with("weight", "heavy");
        let err = validate(&form, CARGO_RULES).unwrap_err();
        assert_eq!(err.message_for("weight"), Some("Weight must be a number"));
        assert_eq!(err.errors.iter().filter(|e| e.field == "weight").count(), 1);
    }

    #[test]
    fn test_valid_route() {
        let form = LoadForm::new()
            .with("origin", "Lagos")
            .with("originAddress", "12 Wharf Road, Apapa")
            .with("destination", "Accra")
            .with("destinationAddress", "Tema Port")
            .with("pickupDate", "2024-06-10")
            .with("pickupTime", "08:00-12:00")
            .with("deliveryDate", "2024-06-01")
            .with("deliveryTime", "flexible");
        // Delivery before pickup is accepted.
        assert!(validate(&form, ROUTE_RULES).is_ok());
    }

    #[test]
    fn test_display() {
        let err = ValidationError::single("origin", "Origin location is required");
        assert_eq!(
            err.to_string(),
            "Validation failed: origin: Origin location is required"
        );
    }
}
