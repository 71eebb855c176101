//! Equipment types
//!
//! Records store the code (`dry_van`); older filter inputs send the label
//! (`Dry Van`). Both parse to the same value.

use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::convert::Infallible;
use std::str::FromStr;

/// Trailer/vehicle class a load requires
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum EquipmentType {
    DryVan,
    Refrigerated,
    Flatbed,
    StepDeck,
    Lowboy,
    Tanker,
    SprinterVan,
    BoxTruck,
    /// Value outside the known set, kept verbatim
    Other(String),
}

static KNOWN: [EquipmentType; 8] = [
    EquipmentType::DryVan,
    EquipmentType::Refrigerated,
    EquipmentType::Flatbed,
    EquipmentType::StepDeck,
    EquipmentType::Lowboy,
    EquipmentType::Tanker,
    EquipmentType::SprinterVan,
    EquipmentType::BoxTruck,
];

impl EquipmentType {
    /// The known equipment types
    pub fn known() -> &'static [EquipmentType] {
        &KNOWN
    }

    pub fn code(&self) -> &str {
        match self {
            EquipmentType::DryVan => "dry_van",
            EquipmentType::Refrigerated => "refrigerated",
            EquipmentType::Flatbed => "flatbed",
            EquipmentType::StepDeck => "step_deck",
            EquipmentType::Lowboy => "lowboy",
            EquipmentType::Tanker => "tanker",
            EquipmentType::SprinterVan => "sprinter_van",
            EquipmentType::BoxTruck => "box_truck",
            EquipmentType::Other(raw) => raw,
        }
    }

    pub fn label(&self) -> &str {
        match self {
            EquipmentType::DryVan => "Dry Van",
            EquipmentType::Refrigerated => "Refrigerated",
            EquipmentType::Flatbed => "Flatbed",
            EquipmentType::StepDeck => "Step Deck",
            EquipmentType::Lowboy => "Lowboy",
            EquipmentType::Tanker => "Tanker",
            EquipmentType::SprinterVan => "Sprinter Van",
            EquipmentType::BoxTruck => "Box Truck",
            EquipmentType::Other(raw) => raw,
        }
    }

    pub fn is_known(&self) -> bool {
        !matches!(self, EquipmentType::Other(_))
    }

    /// Match a code or label, falling back to `Other`
    pub fn from_code_or_label(s: &str) -> Self {
        let normalized: String = s
            .trim()
            .to_lowercase()
            .chars()
            .map(|c| if c == ' ' || c == '-' { '_' } else { c })
            .collect();

        EquipmentType::known()
            .iter()
            .find(|known| known.code() == normalized)
            .cloned()
            .unwrap_or_else(|| EquipmentType::Other(s.trim().to_string()))
    }
}

impl std::fmt::Display for EquipmentType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.label())
    }
}

impl FromStr for EquipmentType {
    type Err = Infallible;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(EquipmentType::from_code_or_label(s))
    }
}

impl Serialize for EquipmentType {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.code())
    }
}

impl<'de> Deserialize<'de> for EquipmentType {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let raw = String::deserialize(deserializer)?;
        Ok(EquipmentType::from_code_or_label(&raw))
    }
}
