//! New-load fan-out to carriers

use serde::{Deserialize, Serialize};
use tracing::{info, warn};

use super::{LoadNotice, Notifier};
use crate::model::{Load, User};

/// Outcome of one fan-out
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct FanoutReport {
    pub attempted: usize,
    pub sent: usize,
    pub failed: usize,
}

/// Notify each carrier about `load`, one at a time.
///
/// A failed send is logged and counted; the loop always runs to the end.
pub async fn notify_carriers(
    notifier: &dyn Notifier,
    load: &Load,
    carriers: &[User],
) -> FanoutReport {
    let mut report = FanoutReport::default();

    for carrier in carriers {
        report.attempted += 1;
        let notice = LoadNotice {
            recipient_email: carrier.email.clone(),
            recipient_name: carrier.display_name(),
            load_details: load.clone(),
        };

        match notifier.send_load_notification(&notice).await {
            Ok(()) => report.sent += 1,
            Err(e) => {
                report.failed += 1;
                warn!(
                    load_id = %load.id,
                    carrier_id = %carrier.id,
                    error = %e,
                    "Failed to notify carrier"
                );
            }
        }
    }

    info!(
        load_id = %load.id,
        attempted = report.attempted,
        sent = report.sent,
        failed = report.failed,
        "Carrier notifications dispatched"
    );
    report
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::UserRole;
    use crate::notify::testing::RecordingNotifier;

    fn carrier(id: &str, email: &str) -> User {
        User {
            id: id.to_string(),
            email: email.to_string(),
            first_name: "Carrier".to_string(),
            last_name: id.to_string(),
            user_type: Some(UserRole::Carrier),
            verified: true,
        }
    }

    #[tokio::test]
    async fn test_failure_does_not_stop_loop() {
        let notifier = RecordingNotifier::failing_for(&["bad@haul.ng"]);
        let carriers = vec![
            carrier("c1", "one@haul.ng"),
            carrier("c2", "bad@haul.ng"),
            carrier("c3", "three@haul.ng"),
        ];
        let load = Load {
            id: "l1".to_string(),
            ..Default::default()
        };

        let report = notify_carriers(&notifier, &load, &carriers).await;
        assert_eq!(
            report,
            FanoutReport {
                attempted: 3,
                sent: 2,
                failed: 1
            }
        );
        assert_eq!(
            notifier.load_recipients(),
            vec!["one@haul.ng".to_string(), "three@haul.ng".to_string()]
        );
    }

    #[tokio::test]
    async fn test_no_carriers() {
        let notifier = RecordingNotifier::default();
        let report = notify_carriers(&notifier, &Load::default(), &[]).await;
        assert_eq!(report, FanoutReport::default());
    }
}
