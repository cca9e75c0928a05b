use serde::{Deserialize, Serialize};

/// A file attached to an outbound message.
///
/// Inline attachments are meant to be referenced from the HTML body (by
/// content id); regular attachments are offered as downloads. Content is
/// carried as raw bytes and encoded as standard base64 when serialized.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Attachment {
    /// Filename presented to the recipient.
    #[serde(default)]
    pub name: Option<String>,

    /// Raw file content.
    #[serde(rename = "content_base64", with = "base64_content")]
    pub content: Vec<u8>,

    /// MIME content type (e.g. `"application/pdf"`).
    #[serde(default = "default_mimetype")]
    pub mimetype: String,

    /// Whether the attachment is displayed inline.
    #[serde(default)]
    pub inline: bool,
}

fn default_mimetype() -> String {
    "application/octet-stream".to_owned()
}

impl Attachment {
    /// Create a regular (non-inline) attachment.
    pub fn new(
        name: impl Into<String>,
        content: impl Into<Vec<u8>>,
        mimetype: impl Into<String>,
    ) -> Self {
        Self {
            name: Some(name.into()),
            content: content.into(),
            mimetype: mimetype.into(),
            inline: false,
        }
    }

    /// Create an inline attachment.
    pub fn inline(
        name: impl Into<String>,
        content: impl Into<Vec<u8>>,
        mimetype: impl Into<String>,
    ) -> Self {
        Self {
            inline: true,
            ..Self::new(name, content, mimetype)
        }
    }
}

mod base64_content {
    use base64::Engine;
    use base64::engine::general_purpose::STANDARD;
    use serde::{Deserialize, Deserializer, Serializer};

    pub fn serialize<S: Serializer>(bytes: &[u8], serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&STANDARD.encode(bytes))
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Vec<u8>, D::Error> {
        let encoded = String::deserialize(deserializer)?;
        STANDARD.decode(encoded).map_err(serde::de::Error::custom)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn attachment_serializes_content_as_base64() {
        let attachment = Attachment::new("hello.txt", b"Hello World".to_vec(), "text/plain");
        let json = serde_json::to_value(&attachment).unwrap();
        assert_eq!(json["content_base64"], "SGVsbG8gV29ybGQ=");
        assert_eq!(json["inline"], false);
    }

    #[test]
    fn attachment_deserializes_with_defaults() {
        let json = serde_json::json!({"content_base64": "SGVsbG8gV29ybGQ="});
        let attachment: Attachment = serde_json::from_value(json).unwrap();
        assert_eq!(attachment.content, b"Hello World");
        assert_eq!(attachment.mimetype, "application/octet-stream");
        assert!(attachment.name.is_none());
        assert!(!attachment.inline);
    }

    #[test]
    fn invalid_base64_is_rejected() {
        let json = serde_json::json!({"content_base64": "not base64!!"});
        assert!(serde_json::from_value::<Attachment>(json).is_err());
    }

    #[test]
    fn inline_constructor_sets_flag() {
        let attachment = Attachment::inline("logo.png", vec![0x89, 0x50], "image/png");
        assert!(attachment.inline);
        assert_eq!(attachment.name.as_deref(), Some("logo.png"));
    }
}
