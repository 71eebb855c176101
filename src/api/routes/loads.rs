//! Load Routes
//!
//! - GET /api/v1/loads - List a role-scoped view
//! - GET /api/v1/loads/stats - Dashboard counts
//! - GET /api/v1/loads/:id - Get one load
//! - POST /api/v1/loads - Create a load from form values
//! - POST /api/v1/loads/upload - Create a load with attached documents
//! - PATCH /api/v1/loads/:id - Update status, location or driver
//! - POST /api/v1/loads/:id/claim - Claim a posted load as a carrier or truck owner

use axum::{
    extract::{Multipart, Path, Query, State},
    http::StatusCode,
    Json,
};
use serde_json::Value;
use std::sync::Arc;

use crate::api::dto::{ClaimResponse, ClearanceSummary, ListLoadsQuery, LoadListResponse};
use crate::api::error::{ApiError, ApiResult};
use crate::api::state::AppState;
use crate::auth::{AuthContext, MaybeAuth};
use crate::backend::FileUpload;
use crate::forms::LoadForm;
use crate::model::{ClearanceStatus, EquipmentType, Load, LoadStatus};
use crate::mutation::{CreatedLoad, LoadPatch};
use crate::query::{LoadFilter, LoadStats, LoadView};

/// Treat blank and `all` as "no filter"
fn selected(value: Option<&str>) -> Option<&str> {
    value
        .map(str::trim)
        .filter(|v| !v.is_empty() && !v.eq_ignore_ascii_case("all"))
}

/// Client-side filter from the list query string
pub(crate) fn filter_from_query(query: &ListLoadsQuery) -> ApiResult<LoadFilter> {
    let mut filter = LoadFilter::new();

    if let Some(term) = query.search.as_deref().filter(|t| !t.trim().is_empty()) {
        filter = filter.search(term);
    }
    if let Some(status) = selected(query.status.as_deref()) {
        let status: LoadStatus = status
            .parse()
            .map_err(|e| ApiError::BadRequest(format!("{}", e)))?;
        filter = filter.status(status);
    }
    if let Some(equipment) = selected(query.equipment.as_deref()) {
        filter = filter.equipment(EquipmentType::from_code_or_label(equipment));
    }
    if let Some(clearance) = selected(query.clearance.as_deref()) {
        let clearance: ClearanceStatus = clearance.parse().map_err(ApiError::BadRequest)?;
        filter = filter.clearance(clearance);
    }

    Ok(filter)
}

/// GET /api/v1/loads
///
/// Without `view`, signed-in users get their role's view and anonymous
/// callers get the public board.
pub async fn list_loads(
    State(state): State<Arc<AppState>>,
    auth: MaybeAuth,
    Query(query): Query<ListLoadsQuery>,
) -> ApiResult<Json<LoadListResponse>> {
    let view = match selected(query.view.as_deref()) {
        Some(name) => name.parse::<LoadView>().map_err(ApiError::BadRequest)?,
        None => auth.role().map(LoadView::for_role).unwrap_or_default(),
    };
    let filter = filter_from_query(&query)?;

    let loads = state.query.fetch(view, auth.user_id(), &filter).await?;

    let clearance = if view == LoadView::Clearing {
        loads.iter().map(ClearanceSummary::from).collect()
    } else {
        Vec::new()
    };

    Ok(Json(LoadListResponse {
        view,
        total: loads.len(),
        loads,
        clearance,
    }))
}

/// GET /api/v1/loads/stats
pub async fn load_stats(State(state): State<Arc<AppState>>) -> ApiResult<Json<LoadStats>> {
    Ok(Json(state.query.stats().await?))
}

/// GET /api/v1/loads/:id
pub async fn get_load(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
) -> ApiResult<Json<Load>> {
    let load = state
        .query
        .repository()
        .get(&id)
        .await
        .map_err(|e| match ApiError::from(e) {
            ApiError::NotFound(_) => ApiError::NotFound(format!("Load {}", id)),
            other => other,
        })?;
    Ok(Json(load))
}

/// POST /api/v1/loads
///
/// Accepts form values under either their wizard or backend names.
pub async fn create_load(
    State(state): State<Arc<AppState>>,
    auth: AuthContext,
    Json(body): Json<Value>,
) -> ApiResult<(StatusCode, Json<CreatedLoad>)> {
    if !body.is_object() {
        return Err(ApiError::BadRequest("Expected a JSON object".to_string()));
    }
    let new_load = LoadForm::from_json(&body).to_new_load()?;

    let created = state
        .service
        .create(new_load, Vec::new(), Some(&auth.user_id))
        .await?;

    Ok((StatusCode::CREATED, Json(created)))
}

/// POST /api/v1/loads/upload
///
/// Multipart variant of create. File parts are attached to the record
/// under their part name; text parts are form values.
pub async fn upload_load(
    State(state): State<Arc<AppState>>,
    auth: AuthContext,
    mut multipart: Multipart,
) -> ApiResult<(StatusCode, Json<CreatedLoad>)> {
    let mut form = LoadForm::new();
    let mut files = Vec::new();

    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| ApiError::BadRequest(format!("Invalid multipart body: {}", e)))?
    {
        let name = field.name().unwrap_or_default().to_string();
        if name.is_empty() {
            continue;
        }

        match field.file_name().map(str::to_string) {
            Some(file_name) => {
                let content_type = field.content_type().map(str::to_string);
                let bytes = field
                    .bytes()
                    .await
                    .map_err(|e| ApiError::BadRequest(format!("Failed to read {}: {}", name, e)))?;
                files.push(FileUpload {
                    field: name,
                    file_name,
                    content_type,
                    bytes: bytes.to_vec(),
                });
            }
            None => {
                let text = field
                    .text()
                    .await
                    .map_err(|e| ApiError::BadRequest(format!("Failed to read {}: {}", name, e)))?;
                form.set(&name, text);
            }
        }
    }

    let new_load = form.to_new_load()?;
    tracing::debug!(attachments = files.len(), "Creating load with attachments");

    let created = state
        .service
        .create(new_load, files, Some(&auth.user_id))
        .await?;

    Ok((StatusCode::CREATED, Json(created)))
}

/// PATCH /api/v1/loads/:id
pub async fn update_load(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
    _auth: AuthContext,
    Json(patch): Json<LoadPatch>,
) -> ApiResult<Json<Load>> {
    Ok(Json(state.service.update(&id, &patch).await?))
}

/// POST /api/v1/loads/:id/claim
pub async fn claim_load(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
    auth: AuthContext,
) -> ApiResult<Json<ClaimResponse>> {
    let load = state
        .service
        .claim(&id, &auth.user_id, auth.role)
        .await?;
    Ok(Json(ClaimResponse {
        load,
        claimed_by: auth.user_id,
    }))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_filter_from_query() {
        let query = ListLoadsQuery {
            search: Some("lagos".into()),
            status: Some("In Transit".into()),
            equipment: Some("all".into()),
            ..Default::default()
        };
        let filter = filter_from_query(&query).unwrap();
        assert_eq!(filter, LoadFilter::new().search("lagos").status(LoadStatus::InTransit));
    }

    #[test]
    fn test_filter_clearance() {
        let query = ListLoadsQuery {
            clearance: Some("In Progress".into()),
            ..Default::default()
        };
        let filter = filter_from_query(&query).unwrap();
        assert_eq!(filter, LoadFilter::new().clearance(ClearanceStatus::InProgress));

        let bad = ListLoadsQuery {
            clearance: Some("lost".into()),
            ..Default::default()
        };
        assert!(matches!(filter_from_query(&bad), Err(ApiError::BadRequest(_))));
    }

    #[test]
    fn test_filter_rejects_unknown_status() {
        let query = ListLoadsQuery {
            status: Some("teleported".into()),
            ..Default::default()
        };
        assert!(matches!(filter_from_query(&query), Err(ApiError::BadRequest(_))));
    }

    #[test]
    fn test_blank_selections_are_ignored() {
        assert_eq!(selected(Some("  ")), None);
        assert_eq!(selected(Some("ALL")), None);
        assert_eq!(selected(Some(" dry_van ")), Some("dry_van"));
        assert!(filter_from_query(&ListLoadsQuery::default()).unwrap().is_empty());
    }
}
