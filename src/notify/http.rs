//! Email endpoints reached over HTTP

use async_trait::async_trait;
use reqwest::Client;
use serde::Serialize;
use tracing::warn;

use super::{LoadNotice, Notifier, NotifyError, WelcomeMessage};

#[derive(Debug, Clone)]
pub struct HttpNotifierConfig {
    /// URL receiving new-load notifications
    pub load_endpoint: String,
    /// URL receiving welcome emails
    pub welcome_endpoint: String,
    pub request_timeout_ms: u64,
}

impl Default for HttpNotifierConfig {
    fn default() -> Self {
        Self {
            load_endpoint: "http://localhost:3000/api/send-notification".to_string(),
            welcome_endpoint: "http://localhost:3000/api/send-welcome".to_string(),
            request_timeout_ms: 5000,
        }
    }
}

pub struct HttpNotifier {
    client: Client,
    config: HttpNotifierConfig,
}

impl HttpNotifier {
    pub fn new(config: HttpNotifierConfig) -> Result<Self, NotifyError> {
        let client = Client::builder()
            .timeout(std::time::Duration::from_millis(config.request_timeout_ms))
            .build()?;

        Ok(Self { client, config })
    }

    pub fn config(&self) -> &HttpNotifierConfig {
        &self.config
    }

    /// POST a JSON body once; non-2xx bodies are logged and returned
    async fn post<T: Serialize>(&self, url: &str, body: &T) -> Result<(), NotifyError> {
        let response = self
            .client
            .post(url)
            .json(body)
            .send()
            .await
            .map_err(|e| {
                if e.is_timeout() {
                    NotifyError::Timeout
                } else if e.is_connect() {
                    NotifyError::Unavailable
                } else {
                    NotifyError::Request(e)
                }
            })?;

        let status = response.status();
        if status.is_success() {
            return Ok(());
        }

        let body = response.text().await.unwrap_or_default();
        warn!(url, status = status.as_u16(), body = %body, "Notification endpoint returned an error");
        Err(NotifyError::Rejected {
            status: status.as_u16(),
            body,
        })
    }
}

#[async_trait]
impl Notifier for HttpNotifier {
    fn name(&self) -> &str {
        "http"
    }

    async fn send_load_notification(&self, notice: &LoadNotice) -> Result<(), NotifyError> {
        if notice.recipient_email.trim().is_empty() {
            return Err(NotifyError::MissingRecipient);
        }
        self.post(&self.config.load_endpoint, notice).await
    }

    async fn send_welcome(&self, welcome: &WelcomeMessage) -> Result<(), NotifyError> {
        if welcome.email.trim().is_empty() {
            return Err(NotifyError::MissingRecipient);
        }
        self.post(&self.config.welcome_endpoint, welcome).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{Load, UserRole};

    #[test]
    fn test_default_config() {
        let config = HttpNotifierConfig::default();
        assert!(config.load_endpoint.ends_with("/api/send-notification"));
        assert!(config.welcome_endpoint.ends_with("/api/send-welcome"));
    }

    #[tokio::test]
    async fn test_missing_recipient_rejected_locally() {
        let notifier = HttpNotifier::new(HttpNotifierConfig::default()).unwrap();
        let notice = LoadNotice {
            recipient_email: " ".to_string(),
            recipient_name: String::new(),
            load_details: Load::default(),
        };
        assert!(matches!(
            notifier.send_load_notification(&notice).await,
            Err(NotifyError::MissingRecipient)
        ));
    }

    #[tokio::test]
    async fn test_unreachable_endpoint_errors() {
        let notifier = HttpNotifier::new(HttpNotifierConfig {
            welcome_endpoint: "http://127.0.0.1:1/api/send-welcome".to_string(),
            request_timeout_ms: 500,
            ..Default::default()
        })
        .unwrap();
        let welcome = WelcomeMessage {
            email: "a@b.co".to_string(),
            first_name: "Ada".to_string(),
            user_type: UserRole::Carrier,
        };
        assert!(notifier.send_welcome(&welcome).await.is_err());
    }
}
