use courier_provider::{ApiError, ProviderError};
use thiserror::Error;

/// Errors specific to the Mailgun backend.
///
/// These are internal errors that get converted into [`ProviderError`] at the
/// public [`EmailBackend`](courier_provider::EmailBackend) boundary.
#[derive(Debug, Error)]
pub enum MailgunError {
    /// Neither the `from` address nor `esp_extra` yielded a sender domain.
    #[error(
        "cannot call Mailgun with an unknown sender domain; either provide a valid `from` \
         address, or set `esp_extra = {{\"sender_domain\": \"example.com\"}}`"
    )]
    UnknownSenderDomain,

    /// The response was not JSON, or lacked a string `id` and `message`.
    #[error("{0}")]
    InvalidResponseFormat(Box<ApiError>),

    /// The response `message` did not report the message as queued.
    #[error("{0}")]
    UnrecognizedMessage(Box<ApiError>),

    /// The transport failed or classified the response itself.
    #[error(transparent)]
    Provider(#[from] ProviderError),
}

impl From<MailgunError> for ProviderError {
    fn from(err: MailgunError) -> Self {
        match err {
            err @ MailgunError::UnknownSenderDomain => {
                ProviderError::configuration(err.to_string())
            }
            MailgunError::InvalidResponseFormat(api) | MailgunError::UnrecognizedMessage(api) => {
                ProviderError::Api(api)
            }
            MailgunError::Provider(err) => err,
        }
    }
}

#[cfg(test)]
mod tests {
    use courier_provider::{ErrorContext, TransportResponse};

    use super::*;

    #[test]
    fn unknown_sender_domain_maps_to_configuration() {
        let provider_err: ProviderError = MailgunError::UnknownSenderDomain.into();
        assert!(!provider_err.is_retryable());
        let ProviderError::Configuration { description, .. } = provider_err else {
            panic!("expected Configuration");
        };
        assert!(description.contains("valid `from` address"));
        assert!(description.contains(r#"{"sender_domain": "example.com"}"#));
    }

    #[test]
    fn response_errors_map_to_api_with_context() {
        let api = ApiError::new(
            "Unrecognized Mailgun API message 'Rejected'",
            ErrorContext::default().with_response(TransportResponse::new(200, "{}")),
        );
        let provider_err: ProviderError = MailgunError::UnrecognizedMessage(Box::new(api)).into();
        let ProviderError::Api(api) = provider_err else {
            panic!("expected Api");
        };
        assert_eq!(api.status(), Some(200));
        assert_eq!(
            api.to_string(),
            "Unrecognized Mailgun API message 'Rejected' (HTTP 200: {})"
        );
    }

    #[test]
    fn provider_errors_pass_through() {
        let limited = TransportResponse::new(429, "slow down")
            .error_for_status("Mailgun")
            .unwrap_err();
        let provider_err: ProviderError = MailgunError::from(limited).into();
        assert!(provider_err.is_retryable());
        let ProviderError::RateLimited(api) = provider_err else {
            panic!("expected RateLimited");
        };
        assert_eq!(api.status(), Some(429));
    }
}
