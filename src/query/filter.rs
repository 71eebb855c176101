//! Client-side search and equality filtering

use crate::model::{ClearanceStatus, EquipmentType, Load, LoadStatus};

/// Filters applied to a fetched page of loads
#[derive(Debug, Clone, Default, PartialEq)]
pub struct LoadFilter {
    /// Case-insensitive substring searched across the text fields
    pub search: Option<String>,
    pub status: Option<LoadStatus>,
    pub equipment: Option<EquipmentType>,
    /// Customs clearance status; loads without one count as pending
    pub clearance: Option<ClearanceStatus>,
}

impl LoadFilter {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn search(mut self, term: impl Into<String>) -> Self {
        let term = term.into();
        self.search = if term.trim().is_empty() { None } else { Some(term) };
        self
    }

    pub fn status(mut self, status: LoadStatus) -> Self {
        self.status = Some(status);
        self
    }

    pub fn equipment(mut self, equipment: EquipmentType) -> Self {
        self.equipment = Some(equipment);
        self
    }

    pub fn clearance(mut self, clearance: ClearanceStatus) -> Self {
        self.clearance = Some(clearance);
        self
    }

    pub fn is_empty(&self) -> bool {
        self.search.is_none()
            && self.status.is_none()
            && self.equipment.is_none()
            && self.clearance.is_none()
    }

    pub fn matches(&self, load: &Load) -> bool {
        if let Some(status) = self.status {
            if load.status != status {
                return false;
            }
        }

        if let Some(equipment) = &self.equipment {
            if load.equipment_type.as_ref() != Some(equipment) {
                return false;
            }
        }

        if let Some(clearance) = self.clearance {
            if load.clearance() != clearance {
                return false;
            }
        }

        match &self.search {
            Some(term) => matches_search(load, term),
            None => true,
        }
    }

    /// Keep the matching loads, preserving order
    pub fn apply(&self, loads: Vec<Load>) -> Vec<Load> {
        if self.is_empty() {
            return loads;
        }
        loads.into_iter().filter(|l| self.matches(l)).collect()
    }
}

fn matches_search(load: &Load, term: &str) -> bool {
    let needle = term.trim().to_lowercase();
    if needle.is_empty() {
        return true;
    }

    let optional = [
        &load.origin_address,
        &load.destination_address,
        &load.company_name,
        &load.cargo_name,
        &load.driver_name,
    ];

    [
        load.id.as_str(),
        load.reference_number.as_str(),
        load.origin.as_str(),
        load.destination.as_str(),
    ]
    .into_iter()
    .chain(optional.into_iter().filter_map(|f| f.as_deref()))
    .any(|text| text.to_lowercase().contains(&needle))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> Vec<Load> {
        vec![
            Load {
                id: "a1".to_string(),
                reference_number: "LD-100200".to_string(),
                status: LoadStatus::Posted,
                origin: "Lagos".to_string(),
                destination: "Accra".to_string(),
                equipment_type: Some(EquipmentType::DryVan),
                cargo_name: Some("Maize".to_string()),
                ..Default::default()
            },
            Load {
                id: "b2".to_string(),
                clearance_status: Some(ClearanceStatus::Delayed),
                reference_number: "LD-300400".to_string(),
                status: LoadStatus::InTransit,
                origin: "Kano".to_string(),
                destination: "Abuja".to_string(),
                equipment_type: Some(EquipmentType::Flatbed),
                driver_name: Some("Musa Bello".to_string()),
                company_name: Some("Sahel Freight".to_string()),
                ..Default::default()
            },
        ]
    }

    #[test]
    fn test_search_is_case_insensitive() {
        let found = LoadFilter::new().search("lAgOs").apply(sample());
        assert_eq!(found.len(), 1);
        assert_eq!(found[0].id, "a1");
    }

    #[test]
    fn test_search_optional_fields() {
        assert_eq!(LoadFilter::new().search("musa").apply(sample())[0].id, "b2");
        assert_eq!(LoadFilter::new().search("maize").apply(sample())[0].id, "a1");
        assert_eq!(LoadFilter::new().search("sahel").apply(sample())[0].id, "b2");
        assert_eq!(LoadFilter::new().search("300400").apply(sample())[0].id, "b2");
        assert!(LoadFilter::new().search("Tema").apply(sample()).is_empty());
    }

    #[test]
    fn test_blank_search_matches_all() {
        let filter = LoadFilter::new().search("   ");
        assert!(filter.is_empty());
        assert_eq!(filter.apply(sample()).len(), 2);
    }

    #[test]
    fn test_status_and_equipment() {
        let in_transit = LoadFilter::new().status(LoadStatus::InTransit).apply(sample());
        assert_eq!(in_transit.len(), 1);

        let flatbed = LoadFilter::new()
            .equipment("Flatbed".parse().unwrap())
            .apply(sample());
        assert_eq!(flatbed[0].id, "b2");

        let none = LoadFilter::new()
            .status(LoadStatus::Posted)
            .equipment(EquipmentType::Flatbed)
            .apply(sample());
        assert!(none.is_empty());
    }

    #[test]
    fn test_clearance_status() {
        let delayed = LoadFilter::new()
            .clearance(ClearanceStatus::Delayed)
            .apply(sample());
        assert_eq!(delayed.len(), 1);
        assert_eq!(delayed[0].id, "b2");

        // No clearance status recorded yet reads as pending
        let pending = LoadFilter::new()
            .clearance(ClearanceStatus::Pending)
            .apply(sample());
        assert_eq!(pending[0].id, "a1");
        assert!(!LoadFilter::new().clearance(ClearanceStatus::Pending).is_empty());
    }
}
