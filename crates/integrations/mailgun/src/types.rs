use serde::Deserialize;

/// Successful response from the Mailgun `messages` endpoint.
///
/// The only 200 response Mailgun documents is:
///
/// ```json
/// {"id": "<20160306015544.116301.25145@example.org>", "message": "Queued. Thank you."}
/// ```
///
/// The single id applies to every recipient.
#[derive(Debug, Clone, Deserialize)]
pub struct MailgunApiResponse {
    /// Message id assigned by Mailgun.
    pub id: String,

    /// Human-readable status text; starts with `"Queued"` on acceptance.
    pub message: String,
}

impl MailgunApiResponse {
    /// Mailgun signals acceptance only through this text prefix.
    pub fn is_queued(&self) -> bool {
        self.message.starts_with("Queued")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn api_response_deserializes_success() {
        let json = r#"{"id":"<2016.25145@example.org>","message":"Queued. Thank you."}"#;
        let resp: MailgunApiResponse = serde_json::from_str(json).unwrap();
        assert_eq!(resp.id, "<2016.25145@example.org>");
        assert!(resp.is_queued());
    }

    #[test]
    fn api_response_ignores_unknown_keys() {
        let json = r#"{"id":"MSG1","message":"Queued","extra":true}"#;
        assert!(serde_json::from_str::<MailgunApiResponse>(json).is_ok());
    }

    #[test]
    fn api_response_requires_string_fields() {
        assert!(serde_json::from_str::<MailgunApiResponse>(r#"{"message":"Queued"}"#).is_err());
        assert!(serde_json::from_str::<MailgunApiResponse>(r#"{"id":1,"message":"Queued"}"#).is_err());
        assert!(serde_json::from_str::<MailgunApiResponse>(r#""Queued. Thank you.""#).is_err());
    }

    #[test]
    fn non_queued_message_is_detected() {
        let resp = MailgunApiResponse {
            id: "MSG1".into(),
            message: "Rejected".into(),
        };
        assert!(!resp.is_queued());
    }
}
