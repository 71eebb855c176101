//! Step navigation for the load posting form

use serde::{Deserialize, Serialize};

use super::rules::{self, FieldRule, ValidationError};
use super::LoadForm;

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum WizardStep {
    Route,
    Cargo,
    Company,
    Review,
}

impl WizardStep {
    pub fn all() -> &'static [WizardStep] {
        &[
            WizardStep::Route,
            WizardStep::Cargo,
            WizardStep::Company,
            WizardStep::Review,
        ]
    }

    /// 1-based position
    pub fn number(&self) -> u8 {
        match self {
            WizardStep::Route => 1,
            WizardStep::Cargo => 2,
            WizardStep::Company => 3,
            WizardStep::Review => 4,
        }
    }

    pub fn from_number(n: u8) -> Option<Self> {
        match n {
            1 => Some(WizardStep::Route),
            2 => Some(WizardStep::Cargo),
            3 => Some(WizardStep::Company),
            4 => Some(WizardStep::Review),
            _ => None,
        }
    }

    pub fn title(&self) -> &'static str {
        match self {
            WizardStep::Route => "Route",
            WizardStep::Cargo => "Cargo",
            WizardStep::Company => "Company",
            WizardStep::Review => "Review",
        }
    }

    /// Rules checked when leaving this step
    pub fn rules(&self) -> &'static [FieldRule] {
        match self {
            WizardStep::Route => rules::ROUTE_RULES,
            WizardStep::Cargo => rules::CARGO_RULES,
            WizardStep::Company => rules::COMPANY_RULES,
            WizardStep::Review => &[],
        }
    }

    /// Field names the step validates
    pub fn fields(&self) -> Vec<&'static str> {
        let mut fields: Vec<&'static str> = self.rules().iter().map(|r| r.field).collect();
        fields.dedup();
        fields
    }

    /// Following step; Review is last
    pub fn next(&self) -> Self {
        Self::from_number(self.number() + 1).unwrap_or(WizardStep::Review)
    }

    fn previous(&self) -> Self {
        Self::from_number(self.number().saturating_sub(1)).unwrap_or(WizardStep::Route)
    }
}

impl std::str::FromStr for WizardStep {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        if let Ok(n) = s.trim().parse::<u8>() {
            return Self::from_number(n).ok_or_else(|| format!("no step {}", n));
        }
        match s.trim().to_lowercase().as_str() {
            "route" => Ok(WizardStep::Route),
            "cargo" => Ok(WizardStep::Cargo),
            "company" => Ok(WizardStep::Company),
            "review" => Ok(WizardStep::Review),
            other => Err(format!("unknown step: {}", other)),
        }
    }
}

/// Validate one step's fields
pub fn validate_step(step: WizardStep, form: &LoadForm) -> Result<(), ValidationError> {
    rules::validate(form, step.rules())
}

/// Validate every step, collecting all failures
pub fn validate_all(form: &LoadForm) -> Result<(), ValidationError> {
    let mut all = ValidationError::default();
    for step in WizardStep::all() {
        if let Err(e) = validate_step(*step, form) {
            all.errors.extend(e.errors);
        }
    }
    all.into_result()
}

/// Position in the form
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Wizard {
    step: WizardStep,
}

impl Default for Wizard {
    fn default() -> Self {
        Self::new()
    }
}

impl Wizard {
    pub fn new() -> Self {
        Self {
            step: WizardStep::Route,
        }
    }

    pub fn step(&self) -> WizardStep {
        self.step
    }

    /// Move forward if the current step's fields pass.
    ///
    /// On failure the step is unchanged.
    pub fn advance(&mut self, form: &LoadForm) -> Result<WizardStep, ValidationError> {
        validate_step(self.step, form)?;
        self.step = self.step.next();
        Ok(self.step)
    }

    /// Move back one step, never below the first
    pub fn back(&mut self) -> WizardStep {
        self.step = self.step.previous();
        self.step
    }

    /// Jump to an earlier step; later steps are reached only by advancing
    pub fn go_to(&mut self, target: WizardStep) -> bool {
        if target < self.step {
            self.step = target;
            true
        } else {
            false
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn route_form() -> LoadForm {
        LoadForm::new()
            .with("origin", "Lagos")
            .with("originAddress", "Apapa Port")
            .with("destination", "Accra")
            .with("destinationAddress", "Tema Port")
            .with("pickupDate", "2024-06-10")
            .with("pickupTime", "08:00-12:00")
            .with("deliveryDate", "2024-06-12")
            .with("deliveryTime", "flexible")
    }

    #[test]
    fn test_empty_origin_blocks_advance() {
        let mut wizard = Wizard::new();
        let form = route_form().with("origin", "");

        let err = wizard.advance(&form).unwrap_err();
        assert_eq!(err.message_for("origin"), Some("Origin location is required"));
        assert_eq!(err.errors.len(), 1);
        assert_eq!(wizard.step(), WizardStep::Route);
    }

    #[test]
    fn test_advance_only_checks_current_step() {
        let mut wizard = Wizard::new();
        // Cargo and company fields are still empty.
        assert_eq!(wizard.advance(&route_form()).unwrap(), WizardStep::Cargo);

        let err = wizard.advance(&route_form()).unwrap_err();
        assert!(err.message_for("weight").is_some());
        assert!(err.message_for("origin").is_none());
        assert_eq!(wizard.step(), WizardStep::Cargo);
    }

    #[test]
    fn test_back_and_go_to() {
        let mut wizard = Wizard::new();
        assert_eq!(wizard.back(), WizardStep::Route);

        wizard.advance(&route_form()).unwrap();
        assert!(!wizard.go_to(WizardStep::Company));
        assert!(!wizard.go_to(WizardStep::Cargo));
        assert!(wizard.go_to(WizardStep::Route));
        assert_eq!(wizard.step(), WizardStep::Route);
    }

    #[test]
    fn test_review_is_last() {
        let form = route_form()
            .with("cargo_description", "Bagged maize")
            .with("weight", "5000")
            .with("equipment_type", "dry_van")
            .with("companyName", "Sahel Freight");

        let mut wizard = Wizard::new();
        for _ in 0..5 {
            wizard.advance(&form).unwrap();
        }
        assert_eq!(wizard.step(), WizardStep::Review);
        assert!(validate_all(&form).is_ok());
    }

    #[test]
    fn test_step_fields_and_parse() {
        assert_eq!(WizardStep::Cargo.fields()[..3], ["cargo_description", "weight", "equipment_type"]);
        assert_eq!("2".parse::<WizardStep>().unwrap(), WizardStep::Cargo);
        assert_eq!("review".parse::<WizardStep>().unwrap(), WizardStep::Review);
        assert!("9".parse::<WizardStep>().is_err());
    }
}
