//! Load create, update and claim

use chrono::Utc;
use serde::Serialize;
use serde_json::{Map, Value};
use std::sync::Arc;
use tracing::{info, warn};

use super::reference::generate_reference;
use super::{LoadPatch, MutationError, MutationResult, NewLoad};
use crate::backend::{BackendError, FileUpload};
use crate::forms::{FieldError, ValidationError};
use crate::model::serde_pb::format_timestamp;
use crate::model::{Load, LoadStatus, UserRole};
use crate::notify::{notify_carriers, FanoutReport, Notifier};
use crate::repository::{LoadRepository, UserDirectory};

/// Behaviour switches for the mutation service
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MutationOptions {
    /// Reject status changes outside the lifecycle
    pub strict_transitions: bool,
    /// Send new-load notifications to carriers
    pub notify_carriers: bool,
    /// Only notify carriers whose accounts are verified
    pub verified_carriers_only: bool,
}

impl Default for MutationOptions {
    fn default() -> Self {
        Self {
            strict_transitions: false,
            notify_carriers: true,
            verified_carriers_only: true,
        }
    }
}

/// A created load and the outcome of its notifications
#[derive(Debug, Clone, Serialize)]
pub struct CreatedLoad {
    pub load: Load,
    pub notifications: FanoutReport,
}

#[derive(Clone)]
pub struct LoadService {
    loads: LoadRepository,
    users: UserDirectory,
    notifier: Arc<dyn Notifier>,
    options: MutationOptions,
}

fn now_stamp() -> Value {
    Value::String(format_timestamp(&Utc::now()))
}

fn not_found_as(id: &str) -> impl Fn(BackendError) -> MutationError + '_ {
    move |err| {
        if err.is_not_found() {
            MutationError::NotFound(id.to_string())
        } else {
            MutationError::from(err)
        }
    }
}

impl LoadService {
    pub fn new(
        loads: LoadRepository,
        users: UserDirectory,
        notifier: Arc<dyn Notifier>,
        options: MutationOptions,
    ) -> Self {
        Self {
            loads,
            users,
            notifier,
            options,
        }
    }

    pub fn options(&self) -> MutationOptions {
        self.options
    }

    /// Create a draft load, then notify carriers.
    ///
    /// Each call creates a new record; resubmitting creates a duplicate.
    pub async fn create(
        &self,
        new_load: NewLoad,
        attachments: Vec<FileUpload>,
        shipper: Option<&str>,
    ) -> MutationResult<CreatedLoad> {
        let mut missing = ValidationError::default();
        if new_load.origin.trim().is_empty() {
            missing.push(FieldError::new("origin", "Origin location is required"));
        }
        if new_load.destination.trim().is_empty() {
            missing.push(FieldError::new("destination", "Destination location is required"));
        }
        missing.into_result()?;

        let reference = new_load
            .reference_number
            .clone()
            .filter(|r| !r.trim().is_empty())
            .unwrap_or_else(generate_reference);
        let record = new_load.into_record(reference, shipper)?;

        let load = self.loads.create(record, attachments).await?;
        info!(
            load_id = %load.id,
            reference = %load.reference_number,
            shipper = shipper.unwrap_or_default(),
            "Load created"
        );

        let notifications = self.announce(&load).await;
        Ok(CreatedLoad {
            load,
            notifications,
        })
    }

    /// Fan out a new-load notice; failures never reach the caller
    async fn announce(&self, load: &Load) -> FanoutReport {
        if !self.options.notify_carriers {
            return FanoutReport::default();
        }

        match self
            .users
            .list_by_role(UserRole::Carrier, self.options.verified_carriers_only)
            .await
        {
            Ok(carriers) => notify_carriers(self.notifier.as_ref(), load, &carriers).await,
            Err(e) => {
                warn!(load_id = %load.id, error = %e, "Failed to list carriers for notification");
                FanoutReport::default()
            }
        }
    }

    /// Patch status, location or driver. Last write wins.
    pub async fn update(&self, id: &str, patch: &LoadPatch) -> MutationResult<Load> {
        if patch.is_empty() {
            return Err(MutationError::EmptyPatch);
        }

        if let (Some(next), true) = (patch.status, self.options.strict_transitions) {
            let current = self.loads.get(id).await.map_err(not_found_as(id))?;
            if !current.status.can_transition_to(next) {
                return Err(MutationError::InvalidTransition {
                    from: current.status,
                    to: next,
                });
            }
        }

        let mut record: Map<String, Value> = patch.to_record();
        record.insert("updated".into(), now_stamp());
        if patch.status == Some(LoadStatus::Delivered) {
            record.insert("completedAt".into(), now_stamp());
        }

        let load = self
            .loads
            .update(id, Value::Object(record))
            .await
            .map_err(not_found_as(id))?;
        info!(load_id = %load.id, status = %load.status, "Load updated");
        Ok(load)
    }

    /// Assign a posted load to `carrier_id`
    pub async fn claim(
        &self,
        id: &str,
        carrier_id: &str,
        role: Option<UserRole>,
    ) -> MutationResult<Load> {
        if !role.is_some_and(|r| r.can_haul()) {
            return Err(MutationError::NotAHauler {
                user_id: carrier_id.to_string(),
                role,
            });
        }

        let current = self.loads.get(id).await.map_err(not_found_as(id))?;
        if current.status != LoadStatus::Posted {
            return Err(MutationError::NotClaimable {
                id: id.to_string(),
                status: current.status,
            });
        }

        let mut record = Map::new();
        record.insert("carrier".into(), Value::String(carrier_id.to_string()));
        record.insert(
            "status".into(),
            Value::String(LoadStatus::Assigned.as_str().into()),
        );
        record.insert("assignedAt".into(), now_stamp());
        record.insert("updated".into(), now_stamp());

        let load = self
            .loads
            .update(id, Value::Object(record))
            .await
            .map_err(not_found_as(id))?;
        info!(load_id = %load.id, carrier_id, "Load claimed");
        Ok(load)
    }
}
