use async_trait::async_trait;
use courier_core::{DeliveryStatus, OutboundMessage, RecipientStatus, SendDefaults, SendResult};
use tracing::info;
use uuid::Uuid;

use crate::error::ProviderError;
use crate::provider::EmailBackend;

/// A backend that logs the message and reports every recipient as sent
/// without performing any external I/O.
///
/// Useful for local development and dry runs.
#[derive(Debug)]
pub struct LogBackend {
    name: String,
}

impl LogBackend {
    /// Create a new `LogBackend` with the given name.
    pub fn new(name: impl Into<String>) -> Self {
        Self { name: name.into() }
    }
}

#[async_trait]
impl EmailBackend for LogBackend {
    fn name(&self) -> &str {
        &self.name
    }

    async fn send(
        &self,
        message: &OutboundMessage,
        defaults: &SendDefaults,
    ) -> Result<SendResult, ProviderError> {
        let message_id = format!("<{}@{}>", Uuid::new_v4(), self.name);
        info!(
            backend = %self.name,
            message_id = %message_id,
            from = ?message.from.as_ref().map(ToString::to_string),
            subject = ?message.subject,
            recipients = message.all_recipients().count(),
            attachments = message.attachments.len(),
            tags = ?defaults.tags(message),
            "log backend accepted message"
        );
        let status = RecipientStatus::new(message_id, DeliveryStatus::Sent);
        Ok(SendResult::uniform(
            message.all_recipients().map(|a| a.email.as_str()),
            &status,
        ))
    }
}
