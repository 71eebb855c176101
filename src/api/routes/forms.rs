//! Form Routes
//!
//! - POST /api/v1/forms/load/validate - Check wizard values, one step or all

use axum::Json;

use crate::api::dto::{ValidateFormRequest, ValidateFormResponse};
use crate::api::error::{ApiError, ApiResult};
use crate::forms::{validate_all, validate_step, LoadForm, WizardStep};

/// POST /api/v1/forms/load/validate
///
/// Field failures are part of a successful response; only a bad step
/// name is an error.
pub async fn validate_load_form(
    Json(req): Json<ValidateFormRequest>,
) -> ApiResult<Json<ValidateFormResponse>> {
    let form = LoadForm::from_json(&req.values);

    let step = req
        .step
        .as_deref()
        .filter(|s| !s.trim().is_empty())
        .map(str::parse::<WizardStep>)
        .transpose()
        .map_err(ApiError::BadRequest)?;

    let (result, next_step) = match step {
        Some(step) => {
            let result = validate_step(step, &form);
            let next = (result.is_ok() && step != WizardStep::Review).then(|| step.next());
            (result, next)
        }
        None => (validate_all(&form), None),
    };

    let errors = result.err().map(|e| e.errors).unwrap_or_default();
    Ok(Json(ValidateFormResponse {
        valid: errors.is_empty(),
        step,
        next_step,
        errors,
    }))
}
