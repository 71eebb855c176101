//! Customs clearance tracking
//!
//! Clearing agents follow each cross-border load through customs. A load
//! carries its clearance status, a priority and the list of documents
//! customs asks for, each with its own review status. Records use hyphenated
//! values (`in-progress`, `not-submitted`); underscores and spaces are
//! accepted on input.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::str::FromStr;

use super::serde_pb::{empty_as_none, opt_timestamp};

fn normalize(s: &str) -> String {
    s.trim()
        .to_lowercase()
        .chars()
        .map(|c| if c == '_' || c == ' ' { '-' } else { c })
        .collect()
}

/// Where a load stands with customs
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum ClearanceStatus {
    #[default]
    Pending,
    InProgress,
    Completed,
    Delayed,
}

impl ClearanceStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            ClearanceStatus::Pending => "pending",
            ClearanceStatus::InProgress => "in-progress",
            ClearanceStatus::Completed => "completed",
            ClearanceStatus::Delayed => "delayed",
        }
    }
}

impl std::fmt::Display for ClearanceStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ClearanceStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match normalize(s).as_str() {
            "pending" => Ok(ClearanceStatus::Pending),
            "in-progress" => Ok(ClearanceStatus::InProgress),
            "completed" => Ok(ClearanceStatus::Completed),
            "delayed" => Ok(ClearanceStatus::Delayed),
            other => Err(format!("unknown clearance status: {}", other)),
        }
    }
}

impl Serialize for ClearanceStatus {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.as_str())
    }
}

impl<'de> Deserialize<'de> for ClearanceStatus {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let raw = String::deserialize(deserializer)?;
        raw.parse().map_err(serde::de::Error::custom)
    }
}

/// How urgently a clearance should be worked
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum ClearancePriority {
    High,
    Medium,
    Low,
}

impl ClearancePriority {
    pub fn as_str(&self) -> &'static str {
        match self {
            ClearancePriority::High => "high",
            ClearancePriority::Medium => "medium",
            ClearancePriority::Low => "low",
        }
    }
}

impl FromStr for ClearancePriority {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match normalize(s).as_str() {
            "high" => Ok(ClearancePriority::High),
            "medium" => Ok(ClearancePriority::Medium),
            "low" => Ok(ClearancePriority::Low),
            other => Err(format!("unknown priority: {}", other)),
        }
    }
}

impl Serialize for ClearancePriority {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.as_str())
    }
}

impl<'de> Deserialize<'de> for ClearancePriority {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let raw = String::deserialize(deserializer)?;
        raw.parse().map_err(serde::de::Error::custom)
    }
}

/// Review state of one customs document
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum DocumentStatus {
    Approved,
    Pending,
    Rejected,
    #[default]
    NotSubmitted,
    NotRequired,
}

impl DocumentStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            DocumentStatus::Approved => "approved",
            DocumentStatus::Pending => "pending",
            DocumentStatus::Rejected => "rejected",
            DocumentStatus::NotSubmitted => "not-submitted",
            DocumentStatus::NotRequired => "not-required",
        }
    }

    /// Still needs action from the shipper or the agent
    pub fn is_outstanding(&self) -> bool {
        matches!(
            self,
            DocumentStatus::Pending | DocumentStatus::Rejected | DocumentStatus::NotSubmitted
        )
    }
}

impl FromStr for DocumentStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match normalize(s).as_str() {
            "approved" => Ok(DocumentStatus::Approved),
            "pending" => Ok(DocumentStatus::Pending),
            "rejected" => Ok(DocumentStatus::Rejected),
            "not-submitted" | "" => Ok(DocumentStatus::NotSubmitted),
            "not-required" => Ok(DocumentStatus::NotRequired),
            other => Err(format!("unknown document status: {}", other)),
        }
    }
}

impl Serialize for DocumentStatus {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.as_str())
    }
}

impl<'de> Deserialize<'de> for DocumentStatus {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let raw = String::deserialize(deserializer)?;
        raw.parse().map_err(serde::de::Error::custom)
    }
}

/// A document customs asks for on a load
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Default)]
pub struct ClearanceDocument {
    #[serde(default)]
    pub id: String,
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub required: bool,
    #[serde(default)]
    pub status: DocumentStatus,
    #[serde(default, rename = "submittedAt", with = "opt_timestamp")]
    pub submitted_at: Option<DateTime<Utc>>,
    #[serde(default, deserialize_with = "empty_as_none", skip_serializing_if = "Option::is_none")]
    pub notes: Option<String>,
}

/// Read the document list, treating an unset JSON field (`null`) as empty
pub fn documents_or_empty<'de, D>(deserializer: D) -> Result<Vec<ClearanceDocument>, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(Option::<Vec<ClearanceDocument>>::deserialize(deserializer)?.unwrap_or_default())
}

/// Document tallies shown next to each clearance
#[derive(Debug, Clone, Copy, Serialize, PartialEq, Eq, Default)]
pub struct DocumentCounts {
    /// Pending review, rejected or not yet submitted
    pub pending: usize,
    pub approved: usize,
    pub required: usize,
    pub total: usize,
}

impl DocumentCounts {
    pub fn of(documents: &[ClearanceDocument]) -> Self {
        documents.iter().fold(Self::default(), |mut counts, doc| {
            counts.total += 1;
            if doc.status.is_outstanding() {
                counts.pending += 1;
            }
            if doc.status == DocumentStatus::Approved {
                counts.approved += 1;
            }
            if doc.required {
                counts.required += 1;
            }
            counts
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_clearance_status_spellings() {
        for input in ["in-progress", "In Progress", "in_progress"] {
            assert_eq!(input.parse::<ClearanceStatus>().unwrap(), ClearanceStatus::InProgress);
        }
        assert!("stuck".parse::<ClearanceStatus>().is_err());
        assert_eq!(
            serde_json::to_value(ClearanceStatus::InProgress).unwrap(),
            json!("in-progress")
        );
    }

    #[test]
    fn test_document_from_record() {
        let doc: ClearanceDocument = serde_json::from_value(json!({
            "id": "d1",
            "name": "Certificate of Origin",
            "required": true,
            "status": "not-submitted",
            "submittedAt": "",
            "notes": "",
        }))
        .unwrap();
        assert_eq!(doc.status, DocumentStatus::NotSubmitted);
        assert!(doc.submitted_at.is_none());
        assert!(doc.notes.is_none());
    }

    #[test]
    fn test_document_counts() {
        let doc = |required, status| ClearanceDocument {
            required,
            status,
            ..Default::default()
        };
        let counts = DocumentCounts::of(&[
            doc(true, DocumentStatus::Approved),
            doc(true, DocumentStatus::Rejected),
            doc(true, DocumentStatus::NotSubmitted),
            doc(false, DocumentStatus::Pending),
            doc(false, DocumentStatus::NotRequired),
        ]);
        assert_eq!(
            counts,
            DocumentCounts {
                pending: 3,
                approved: 1,
                required: 3,
                total: 5,
            }
        );
        assert_eq!(DocumentCounts::of(&[]), DocumentCounts::default());
    }
}
