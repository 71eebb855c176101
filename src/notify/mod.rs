//! Notification Side-Effects
//!
//! Outbound email requests made after a load is created or a user signs up.
//! Delivery failures are logged and counted; they never fail the operation
//! that triggered them.

mod fanout;
mod http;

pub use fanout::{notify_carriers, FanoutReport};
pub use http::{HttpNotifier, HttpNotifierConfig};

use async_trait::async_trait;
use serde::Serialize;
use thiserror::Error;

use crate::model::{Load, UserRole};

/// Common trait for notification channels
#[async_trait]
pub trait Notifier: Send + Sync {
    /// Unique name for this channel
    fn name(&self) -> &str;

    /// Tell one recipient about a newly posted load
    async fn send_load_notification(&self, notice: &LoadNotice) -> Result<(), NotifyError>;

    /// Greet a newly registered user
    async fn send_welcome(&self, welcome: &WelcomeMessage) -> Result<(), NotifyError>;
}

/// Body of a new-load notification
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct LoadNotice {
    pub recipient_email: String,
    pub recipient_name: String,
    pub load_details: Load,
}

/// Body of a welcome email request
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct WelcomeMessage {
    pub email: String,
    pub first_name: String,
    pub user_type: UserRole,
}

/// Errors that can occur while sending notifications
#[derive(Error, Debug)]
pub enum NotifyError {
    #[error("Notification endpoint unavailable")]
    Unavailable,

    #[error("Request failed: {0}")]
    Request(#[from] reqwest::Error),

    #[error("Endpoint rejected notification ({status}): {body}")]
    Rejected { status: u16, body: String },

    #[error("Request timeout")]
    Timeout,

    #[error("Recipient has no email address")]
    MissingRecipient,
}

/// Channel that drops every message; used when notifications are disabled
#[derive(Debug, Default, Clone)]
pub struct NoopNotifier;

#[async_trait]
impl Notifier for NoopNotifier {
    fn name(&self) -> &str {
        "noop"
    }

    async fn send_load_notification(&self, notice: &LoadNotice) -> Result<(), NotifyError> {
        tracing::debug!(recipient = %notice.recipient_email, "Notifications disabled, skipping");
        Ok(())
    }

    async fn send_welcome(&self, welcome: &WelcomeMessage) -> Result<(), NotifyError> {
        tracing::debug!(recipient = %welcome.email, "Notifications disabled, skipping");
        Ok(())
    }
}

#[cfg(test)]
pub(crate) mod testing {
    use super::*;
    use std::collections::HashSet;
    use std::sync::Mutex;

    /// Records every message; fails for addresses in `failing`
    #[derive(Default)]
    pub struct RecordingNotifier {
        pub loads: Mutex<Vec<LoadNotice>>,
        pub welcomes: Mutex<Vec<WelcomeMessage>>,
        pub failing: HashSet<String>,
    }

    impl RecordingNotifier {
        pub fn failing_for(emails: &[&str]) -> Self {
            Self {
                failing: emails.iter().map(|e| e.to_string()).collect(),
                ..Default::default()
            }
        }

        pub fn load_recipients(&self) -> Vec<String> {
            self.loads
                .lock()
                .unwrap()
                .iter()
                .map(|n| n.recipient_email.clone())
                .collect()
        }
    }

    #[async_trait]
    impl Notifier for RecordingNotifier {
        fn name(&self) -> &str {
            "recording"
        }

        async fn send_load_notification(&self, notice: &LoadNotice) -> Result<(), NotifyError> {
            if self.failing.contains(&notice.recipient_email) {
                return Err(NotifyError::Rejected {
                    status: 400,
                    body: "mailbox unavailable".to_string(),
                });
            }
            self.loads.lock().unwrap().push(notice.clone());
            Ok(())
        }

        async fn send_welcome(&self, welcome: &WelcomeMessage) -> Result<(), NotifyError> {
            self.welcomes.lock().unwrap().push(welcome.clone());
            Ok(())
        }
    }
}
