//! Role-scoped load views

use serde::{Deserialize, Serialize};
use std::str::FromStr;

use crate::backend::RecordFilter;
use crate::model::{Load, LoadStatus, UserRole};

/// Which slice of the load board a caller is looking at
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum LoadView {
    /// Posted loads open to every carrier
    #[default]
    Available,
    /// Loads assigned to the current carrier
    Mine,
    /// Loads posted by the current shipper
    Shipper,
    /// The current carrier's loads that are assigned or on the road
    Tracking,
    /// Every load past draft, for clearing agents
    Clearing,
}

impl LoadView {
    pub fn as_str(&self) -> &'static str {
        match self {
            LoadView::Available => "available",
            LoadView::Mine => "mine",
            LoadView::Shipper => "shipper",
            LoadView::Tracking => "tracking",
            LoadView::Clearing => "clearing",
        }
    }

    /// Landing view for a role
    pub fn for_role(role: UserRole) -> Self {
        match role {
            UserRole::Carrier | UserRole::TruckOwner => LoadView::Available,
            UserRole::Shipper => LoadView::Shipper,
            UserRole::ClearingAgent => LoadView::Clearing,
        }
    }

    /// Whether the view is scoped to the current user
    pub fn requires_user(&self) -> bool {
        matches!(self, LoadView::Mine | LoadView::Shipper | LoadView::Tracking)
    }

    /// Server-side filter for the view.
    ///
    /// Returns `None` for the public board, and for user-scoped views when
    /// no user is given; callers check `requires_user` first.
    pub fn scope(&self, user_id: Option<&str>) -> Option<RecordFilter> {
        if *self == LoadView::Clearing {
            return Some(RecordFilter::ne("status", LoadStatus::Draft.as_str()));
        }

        let user_id = user_id?;
        match self {
            LoadView::Mine => Some(RecordFilter::eq("carrier", user_id)),
            LoadView::Shipper => Some(RecordFilter::eq("shipper", user_id)),
            LoadView::Tracking => {
                let statuses = [LoadStatus::Assigned, LoadStatus::InTransit]
                    .iter()
                    .flat_map(|s| s.spellings().iter().copied())
                    .collect::<Vec<_>>();
                Some(RecordFilter::eq("carrier", user_id).and(RecordFilter::any_of("status", statuses)))
            }
            LoadView::Available | LoadView::Clearing => None,
        }
    }

    /// Predicate applied to fetched records
    pub fn keeps(&self, load: &Load) -> bool {
        match self {
            LoadView::Available => load.status == LoadStatus::Posted,
            LoadView::Clearing => load.status != LoadStatus::Draft,
            _ => true,
        }
    }

    /// Whether a load belongs in this view for `user_id`, evaluated locally
    pub fn contains(&self, load: &Load, user_id: Option<&str>) -> bool {
        let in_scope = match self {
            LoadView::Mine => user_id.is_some_and(|u| load.is_carried_by(u)),
            LoadView::Shipper => user_id.is_some_and(|u| load.shipper.as_deref() == Some(u)),
            LoadView::Tracking => {
                user_id.is_some_and(|u| load.is_carried_by(u))
                    && matches!(load.status, LoadStatus::Assigned | LoadStatus::InTransit)
            }
            LoadView::Available | LoadView::Clearing => true,
        };
        in_scope && self.keeps(load)
    }
}

impl std::fmt::Display for LoadView {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for LoadView {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "available" | "board" => Ok(LoadView::Available),
            "mine" | "carrier" => Ok(LoadView::Mine),
            "shipper" | "posted" => Ok(LoadView::Shipper),
            "tracking" => Ok(LoadView::Tracking),
            "clearing" | "agent" => Ok(LoadView::Clearing),
            other => Err(format!("unknown view: {}", other)),
        }
    }
}
