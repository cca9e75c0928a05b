use std::sync::Arc;

use async_trait::async_trait;
use courier_core::{DeliveryStatus, OutboundMessage, RecipientStatus, SendDefaults, SendResult};
use courier_provider::{
    ApiError, EmailBackend, ErrorContext, HttpTransport, ProviderError, ReqwestTransport,
    TransportResponse,
};
use tracing::{debug, info, instrument, warn};

use crate::config::MailgunConfig;
use crate::error::MailgunError;
use crate::payload::MailgunPayload;
use crate::types::MailgunApiResponse;

/// Email backend that sends through the Mailgun `messages` API.
///
/// Holds only configuration and the transport, so one instance can serve
/// concurrent sends.
#[derive(Debug)]
pub struct MailgunBackend {
    api_url: String,
    api_key: String,
    transport: Arc<dyn HttpTransport>,
}

impl MailgunBackend {
    /// Create a backend with its own reqwest transport.
    ///
    /// Fails if the HTTP client cannot be built.
    pub fn new(config: &MailgunConfig) -> Result<Self, ProviderError> {
        let transport = ReqwestTransport::new(config.timeout())?;
        Ok(Self::with_transport(config, Arc::new(transport)))
    }

    /// Create a backend around an existing transport.
    ///
    /// Useful for testing or for sharing a connection pool across backends.
    pub fn with_transport(config: &MailgunConfig, transport: Arc<dyn HttpTransport>) -> Self {
        Self {
            api_url: config.normalized_api_url(),
            api_key: config.api_key.clone(),
            transport,
        }
    }

    /// The API base URL, ending with `/`.
    pub fn api_url(&self) -> &str {
        &self.api_url
    }

    /// Translate `message` into a Mailgun payload without any I/O.
    pub fn build_payload(
        &self,
        message: &OutboundMessage,
        defaults: &SendDefaults,
    ) -> MailgunPayload {
        MailgunPayload::build(message, defaults)
    }

    /// Turn a Mailgun response into per-recipient statuses.
    ///
    /// Mailgun accepts or rejects the message as a whole, so on success every
    /// recipient in `payload` is reported as queued under the same id.
    pub fn parse_response(
        &self,
        response: &TransportResponse,
        payload: &MailgunPayload,
        message: &OutboundMessage,
    ) -> Result<SendResult, MailgunError> {
        let context = || payload_context(payload, message).with_response(response.clone());

        response
            .error_for_status("Mailgun")
            .map_err(|e| e.with_context(context()))?;

        let parsed = serde_json::from_str::<serde_json::Value>(&response.body)
            .ok()
            .filter(serde_json::Value::is_object)
            .and_then(|value| serde_json::from_value::<MailgunApiResponse>(value).ok());
        let Some(parsed) = parsed else {
            return Err(MailgunError::InvalidResponseFormat(Box::new(ApiError::new(
                "Invalid Mailgun API response format",
                context(),
            ))));
        };

        if !parsed.is_queued() {
            return Err(MailgunError::UnrecognizedMessage(Box::new(ApiError::new(
                format!("Unrecognized Mailgun API message '{}'", parsed.message),
                context(),
            ))));
        }

        let status = RecipientStatus::new(parsed.id, DeliveryStatus::Queued);
        Ok(SendResult::uniform(
            payload.all_recipients().iter().map(|a| a.email.as_str()),
            &status,
        ))
    }

    async fn send_payload(
        &self,
        payload: &MailgunPayload,
        message: &OutboundMessage,
    ) -> Result<SendResult, MailgunError> {
        let request = payload.request(&self.api_url, &self.api_key)?;
        debug!(url = %request.url, "sending message via Mailgun");

        let response = self.transport.post_form(request).await?;
        if response.status == 429 {
            warn!("Mailgun API rate limit hit");
        }
        self.parse_response(&response, payload, message)
    }
}

/// The message and the request built from it, for errors on the send path.
fn payload_context(payload: &MailgunPayload, message: &OutboundMessage) -> ErrorContext {
    ErrorContext::default()
        .with_message(message)
        .with_fields(payload.fields())
        .with_files(payload.files())
}

#[async_trait]
impl EmailBackend for MailgunBackend {
    #[allow(clippy::unnecessary_literal_bound)]
    fn name(&self) -> &str {
        "mailgun"
    }

    #[instrument(
        skip(self, message, defaults),
        fields(provider = "mailgun", recipients = message.all_recipients().count())
    )]
    async fn send(
        &self,
        message: &OutboundMessage,
        defaults: &SendDefaults,
    ) -> Result<SendResult, ProviderError> {
        let payload = self.build_payload(message, defaults);
        let result = self
            .send_payload(&payload, message)
            .await
            .map_err(|e| {
                ProviderError::from(e).with_context(payload_context(&payload, message))
            })?;
        info!(
            message_id = ?result.message_id(),
            recipients = result.len(),
            "Mailgun queued message"
        );
        Ok(result)
    }
}
