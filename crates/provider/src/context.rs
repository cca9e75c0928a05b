use courier_core::OutboundMessage;

use crate::transport::{FilePart, FormFields, TransportResponse};

/// Diagnostic context carried by API errors raised on the send path.
///
/// Holds the original message, the form fields and file parts that were
/// (or would have been) sent, and the raw provider response, so callers can
/// log a failed send without re-deriving any of them.
#[derive(Debug, Clone, Default)]
pub struct ErrorContext {
    pub message: Option<OutboundMessage>,
    pub fields: Option<FormFields>,
    pub files: Option<Vec<FilePart>>,
    pub response: Option<TransportResponse>,
}

impl ErrorContext {
    #[must_use]
    pub fn with_message(mut self, message: &OutboundMessage) -> Self {
        self.message = Some(message.clone());
        self
    }

    #[must_use]
    pub fn with_fields(mut self, fields: &FormFields) -> Self {
        self.fields = Some(fields.clone());
        self
    }

    #[must_use]
    pub fn with_files(mut self, files: &[FilePart]) -> Self {
        self.files = Some(files.to_vec());
        self
    }

    #[must_use]
    pub fn with_response(mut self, response: TransportResponse) -> Self {
        self.response = Some(response);
        self
    }

    /// Fill every empty slot from `other`.
    #[must_use]
    pub fn or(self, other: Self) -> Self {
        Self {
            message: self.message.or(other.message),
            fields: self.fields.or(other.fields),
            files: self.files.or(other.files),
            response: self.response.or(other.response),
        }
    }
}
