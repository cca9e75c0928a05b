use std::fmt;
use std::time::Duration;

use courier_core::CoreError;
use thiserror::Error;

use crate::context::ErrorContext;

/// Errors that can occur while sending through an email backend.
#[derive(Debug, Error)]
pub enum ProviderError {
    /// The backend cannot build a request from its configuration and the
    /// message (e.g. no sender domain could be determined).
    #[error("invalid configuration: {description}")]
    Configuration {
        description: String,
        context: Box<ErrorContext>,
    },

    /// A message value could not be serialized for the provider.
    #[error("serialization error: {description}")]
    Serialization {
        description: String,
        context: Box<ErrorContext>,
    },

    /// The provider API rejected the request or answered in an
    /// unrecognized way.
    #[error("{0}")]
    Api(Box<ApiError>),

    /// A network or transport-level error occurred.
    #[error("connection error: {0}")]
    Connection(String),

    /// The provider did not respond within the allowed duration.
    #[error("timeout after {0:?}")]
    Timeout(Duration),

    /// The provider rejected the request due to rate limiting.
    #[error("rate limited: {0}")]
    RateLimited(Box<ApiError>),
}

impl ProviderError {
    /// Returns `true` if the error is transient and the operation may succeed
    /// on retry.
    pub fn is_retryable(&self) -> bool {
        matches!(
            self,
            Self::Timeout(_) | Self::Connection(_) | Self::RateLimited(_)
        )
    }

    /// Shorthand for an [`Api`](Self::Api) error.
    pub fn api(description: impl Into<String>, context: ErrorContext) -> Self {
        Self::Api(Box::new(ApiError::new(description, context)))
    }

    /// A [`Configuration`](Self::Configuration) error with empty context.
    pub fn configuration(description: impl Into<String>) -> Self {
        Self::Configuration {
            description: description.into(),
            context: Box::default(),
        }
    }

    /// A [`Serialization`](Self::Serialization) error with empty context.
    pub fn serialization(description: impl Into<String>) -> Self {
        Self::Serialization {
            description: description.into(),
            context: Box::default(),
        }
    }

    /// Diagnostic context, for the variants that carry one.
    pub fn context(&self) -> Option<&ErrorContext> {
        match self {
            Self::Configuration { context, .. } | Self::Serialization { context, .. } => {
                Some(&**context)
            }
            Self::Api(err) | Self::RateLimited(err) => Some(&err.context),
            Self::Connection(_) | Self::Timeout(_) => None,
        }
    }

    /// Fill in missing diagnostic context.
    ///
    /// Slots that are already set win. Transport failures carry no context
    /// and are returned unchanged.
    #[must_use]
    pub fn with_context(self, context: ErrorContext) -> Self {
        match self {
            Self::Configuration {
                description,
                context: current,
            } => Self::Configuration {
                description,
                context: Box::new((*current).or(context)),
            },
            Self::Serialization {
                description,
                context: current,
            } => Self::Serialization {
                description,
                context: Box::new((*current).or(context)),
            },
            Self::Api(mut err) => {
                err.context = std::mem::take(&mut err.context).or(context);
                Self::Api(err)
            }
            Self::RateLimited(mut err) => {
                err.context = std::mem::take(&mut err.context).or(context);
                Self::RateLimited(err)
            }
            other => other,
        }
    }
}

impl From<CoreError> for ProviderError {
    fn from(err: CoreError) -> Self {
        match err {
            err @ CoreError::InvalidAddress(_) => Self::configuration(err.to_string()),
            err @ CoreError::Metadata { .. } => Self::serialization(err.to_string()),
        }
    }
}

/// A classified provider API failure with everything needed to debug it.
#[derive(Debug, Clone)]
pub struct ApiError {
    /// What went wrong, in provider terms.
    pub description: String,
    /// Message, payload and raw response, where available.
    pub context: ErrorContext,
}

impl ApiError {
    pub fn new(description: impl Into<String>, context: ErrorContext) -> Self {
        Self {
            description: description.into(),
            context,
        }
    }

    /// HTTP status of the provider response, if one was received.
    pub fn status(&self) -> Option<u16> {
        self.context.response.as_ref().map(|r| r.status)
    }

    /// Raw body of the provider response, if one was received.
    pub fn body(&self) -> Option<&str> {
        self.context.response.as_ref().map(|r| r.body.as_str())
    }
}

impl fmt::Display for ApiError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.description)?;
        if let Some(response) = &self.context.response {
            write!(f, " (HTTP {}: {})", response.status, response.body)?;
        }
        Ok(())
    }
}

impl std::error::Error for ApiError {}
