use std::collections::BTreeMap;

use chrono::{DateTime, FixedOffset, Utc};
use serde::{Deserialize, Serialize};

use crate::address::{EmailAddress, RecipientKind};
use crate::attachment::Attachment;
use crate::error::CoreError;

/// A provider-agnostic outbound email.
///
/// Every field is optional from the point of view of a payload builder:
/// absent or empty fields are simply not pushed to the provider.
///
/// # Examples
///
/// ```
/// use courier_core::{EmailAddress, OutboundMessage};
///
/// let message = OutboundMessage::default()
///     .with_from(EmailAddress::new("sender@example.com"))
///     .with_to(EmailAddress::new("user@example.com"))
///     .with_subject("Hello")
///     .with_text_body("Plain text body");
/// assert_eq!(message.all_recipients().count(), 1);
/// ```
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct OutboundMessage {
    /// Sender address.
    pub from: Option<EmailAddress>,

    /// Primary recipients.
    pub to: Vec<EmailAddress>,

    /// Carbon-copy recipients.
    pub cc: Vec<EmailAddress>,

    /// Blind carbon-copy recipients.
    pub bcc: Vec<EmailAddress>,

    /// Subject line.
    pub subject: Option<String>,

    /// Plain-text body.
    pub text_body: Option<String>,

    /// HTML body.
    pub html_body: Option<String>,

    /// Additional alternative body parts (e.g. a second `text/html` rendering).
    pub alternatives: Vec<AlternativePart>,

    /// Reply-To addresses.
    pub reply_to: Vec<EmailAddress>,

    /// Custom headers, by header name.
    pub headers: BTreeMap<String, String>,

    /// File attachments, in order.
    pub attachments: Vec<Attachment>,

    /// Arbitrary tracking data attached to the message.
    pub metadata: BTreeMap<String, serde_json::Value>,

    /// Tags for provider-side categorisation.
    pub tags: Vec<String>,

    /// Scheduled delivery time.
    pub send_at: Option<SendAt>,

    /// Whether the provider should rewrite links for click tracking.
    pub track_clicks: Option<bool>,

    /// Whether the provider should insert an open-tracking pixel.
    pub track_opens: Option<bool>,

    /// Provider-specific overrides, merged into the payload last.
    pub esp_extra: BTreeMap<String, serde_json::Value>,
}

impl OutboundMessage {
    #[must_use]
    pub fn with_from(mut self, from: EmailAddress) -> Self {
        self.from = Some(from);
        self
    }

    #[must_use]
    pub fn with_to(mut self, addr: EmailAddress) -> Self {
        self.to.push(addr);
        self
    }

    #[must_use]
    pub fn with_cc(mut self, addr: EmailAddress) -> Self {
        self.cc.push(addr);
        self
    }

    #[must_use]
    pub fn with_bcc(mut self, addr: EmailAddress) -> Self {
        self.bcc.push(addr);
        self
    }

    #[must_use]
    pub fn with_subject(mut self, subject: impl Into<String>) -> Self {
        self.subject = Some(subject.into());
        self
    }

    #[must_use]
    pub fn with_text_body(mut self, body: impl Into<String>) -> Self {
        self.text_body = Some(body.into());
        self
    }

    #[must_use]
    pub fn with_html_body(mut self, body: impl Into<String>) -> Self {
        self.html_body = Some(body.into());
        self
    }

    /// Add an alternative body part with the given MIME type.
    #[must_use]
    pub fn with_alternative(mut self, content: impl Into<String>, mimetype: impl Into<String>) -> Self {
        self.alternatives.push(AlternativePart {
            content: content.into(),
            mimetype: mimetype.into(),
        });
        self
    }

    #[must_use]
    pub fn with_reply_to(mut self, addr: EmailAddress) -> Self {
        self.reply_to.push(addr);
        self
    }

    #[must_use]
    pub fn with_header(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.headers.insert(name.into(), value.into());
        self
    }

    #[must_use]
    pub fn with_attachment(mut self, attachment: Attachment) -> Self {
        self.attachments.push(attachment);
        self
    }

    #[must_use]
    pub fn with_tag(mut self, tag: impl Into<String>) -> Self {
        self.tags.push(tag.into());
        self
    }

    #[must_use]
    pub fn with_send_at(mut self, send_at: SendAt) -> Self {
        self.send_at = Some(send_at);
        self
    }

    #[must_use]
    pub fn with_track_clicks(mut self, enabled: bool) -> Self {
        self.track_clicks = Some(enabled);
        self
    }

    #[must_use]
    pub fn with_track_opens(mut self, enabled: bool) -> Self {
        self.track_opens = Some(enabled);
        self
    }

    /// Add a provider-specific override.
    #[must_use]
    pub fn with_esp_extra(mut self, key: impl Into<String>, value: serde_json::Value) -> Self {
        self.esp_extra.insert(key.into(), value);
        self
    }

    /// Attach a metadata value, converting it to JSON.
    ///
    /// Fails with [`CoreError::Metadata`] if the value has no JSON
    /// representation (e.g. a map with non-string keys).
    pub fn insert_metadata<T: Serialize>(
        &mut self,
        key: impl Into<String>,
        value: &T,
    ) -> Result<&mut Self, CoreError> {
        let key = key.into();
        let value =
            serde_json::to_value(value).map_err(|source| CoreError::Metadata {
                key: key.clone(),
                source,
            })?;
        self.metadata.insert(key, value);
        Ok(self)
    }

    /// Addresses in the given recipient list.
    pub fn recipients(&self, kind: RecipientKind) -> &[EmailAddress] {
        match kind {
            RecipientKind::To => &self.to,
            RecipientKind::Cc => &self.cc,
            RecipientKind::Bcc => &self.bcc,
        }
    }

    /// Every recipient across to, cc and bcc, in that order.
    pub fn all_recipients(&self) -> impl Iterator<Item = &EmailAddress> {
        self.to.iter().chain(&self.cc).chain(&self.bcc)
    }
}

/// An extra body part offered as an alternative rendering of the message.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AlternativePart {
    /// Body content.
    pub content: String,
    /// MIME type, e.g. `"text/html"`.
    pub mimetype: String,
}

/// When a message should be delivered.
///
/// A date-time is rendered by the payload builder in whatever format the
/// provider expects; pre-formatted text is passed through untouched.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum SendAt {
    /// A concrete instant.
    DateTime(DateTime<FixedOffset>),
    /// A caller-formatted value.
    Text(String),
}

impl SendAt {
    /// Render as an RFC 2822 date in GMT (`Mon, 02 Jan 2006 15:04:05 GMT`).
    ///
    /// Pre-formatted text is returned unchanged.
    pub fn to_rfc2822(&self) -> String {
        match self {
            Self::DateTime(dt) => dt
                .with_timezone(&Utc)
                .format("%a, %d %b %Y %H:%M:%S GMT")
                .to_string(),
            Self::Text(text) => text.clone(),
        }
    }
}

impl From<DateTime<Utc>> for SendAt {
    fn from(dt: DateTime<Utc>) -> Self {
        Self::DateTime(dt.fixed_offset())
    }
}

impl From<DateTime<FixedOffset>> for SendAt {
    fn from(dt: DateTime<FixedOffset>) -> Self {
        Self::DateTime(dt)
    }
}

/// Values applied to every message sent through a backend.
///
/// Maps are merged with the message's own keys winning; default tags come
/// before the message's tags; tracking flags on the message take priority.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SendDefaults {
    pub metadata: BTreeMap<String, serde_json::Value>,
    pub tags: Vec<String>,
    pub track_clicks: Option<bool>,
    pub track_opens: Option<bool>,
    pub esp_extra: BTreeMap<String, serde_json::Value>,
}

impl SendDefaults {
    pub fn metadata(&self, message: &OutboundMessage) -> BTreeMap<String, serde_json::Value> {
        merge(&self.metadata, &message.metadata)
    }

    pub fn tags(&self, message: &OutboundMessage) -> Vec<String> {
        self.tags.iter().chain(&message.tags).cloned().collect()
    }

    pub fn track_clicks(&self, message: &OutboundMessage) -> Option<bool> {
        message.track_clicks.or(self.track_clicks)
    }

    pub fn track_opens(&self, message: &OutboundMessage) -> Option<bool> {
        message.track_opens.or(self.track_opens)
    }

    pub fn esp_extra(&self, message: &OutboundMessage) -> BTreeMap<String, serde_json::Value> {
        merge(&self.esp_extra, &message.esp_extra)
    }
}

fn merge(
    defaults: &BTreeMap<String, serde_json::Value>,
    overrides: &BTreeMap<String, serde_json::Value>,
) -> BTreeMap<String, serde_json::Value> {
    let mut merged = defaults.clone();
    merged.extend(overrides.iter().map(|(k, v)| (k.clone(), v.clone())));
    merged
}

#[cfg(test)]
mod tests {
    use chrono::TimeZone;

    use super::*;

    #[test]
    fn all_recipients_spans_every_list() {
        let message = OutboundMessage::default()
            .with_to(EmailAddress::new("a@example.com"))
            .with_cc(EmailAddress::new("b@example.com"))
            .with_bcc(EmailAddress::new("c@example.com"))
            .with_to(EmailAddress::new("d@example.com"));
        let emails: Vec<&str> = message.all_recipients().map(|a| a.email.as_str()).collect();
        assert_eq!(
            emails,
            ["a@example.com", "d@example.com", "b@example.com", "c@example.com"]
        );
        assert_eq!(message.recipients(RecipientKind::Cc).len(), 1);
    }

    #[test]
    fn insert_metadata_accepts_serializable_values() {
        let mut message = OutboundMessage::default();
        message
            .insert_metadata("user_id", &42)
            .unwrap()
            .insert_metadata("plan", &"pro")
            .unwrap();
        assert_eq!(message.metadata["user_id"], serde_json::json!(42));
        assert_eq!(message.metadata["plan"], serde_json::json!("pro"));
    }

    #[test]
    fn insert_metadata_rejects_non_string_keys() {
        let mut bad = BTreeMap::new();
        bad.insert(vec![1_u8, 2], "value");
        let mut message = OutboundMessage::default();
        let err = message.insert_metadata("bad", &bad).unwrap_err();
        assert!(matches!(err, CoreError::Metadata { ref key, .. } if key == "bad"));
    }

    #[test]
    fn send_at_datetime_renders_gmt() {
        let dt = FixedOffset::east_opt(2 * 3600)
            .unwrap()
            .with_ymd_and_hms(2016, 3, 4, 7, 6, 5)
            .unwrap();
        let send_at = SendAt::from(dt);
        assert_eq!(send_at.to_rfc2822(), "Fri, 04 Mar 2016 05:06:05 GMT");
    }

    #[test]
    fn send_at_text_passes_through() {
        let send_at = SendAt::Text("tomorrow-ish".into());
        assert_eq!(send_at.to_rfc2822(), "tomorrow-ish");
    }

    #[test]
    fn send_at_deserializes_datetime_before_text() {
        let at: SendAt = serde_json::from_str(r#""2016-03-04T05:06:05Z""#).unwrap();
        assert!(matches!(at, SendAt::DateTime(_)));
        let at: SendAt = serde_json::from_str(r#""Fri, 04 Mar 2016 05:06:05 GMT""#).unwrap();
        assert!(matches!(at, SendAt::Text(_)));
    }

    #[test]
    fn defaults_merge_with_message_winning() {
        let defaults = SendDefaults {
            metadata: BTreeMap::from([
                ("env".to_owned(), serde_json::json!("prod")),
                ("team".to_owned(), serde_json::json!("growth")),
            ]),
            tags: vec!["default".into()],
            track_clicks: Some(true),
            track_opens: Some(false),
            esp_extra: BTreeMap::from([("o:testmode".to_owned(), serde_json::json!("yes"))]),
        };
        let mut message = OutboundMessage::default()
            .with_tag("welcome")
            .with_track_opens(true)
            .with_esp_extra("o:testmode", serde_json::json!("no"));
        message.insert_metadata("team", &"onboarding").unwrap();

        let metadata = defaults.metadata(&message);
        assert_eq!(metadata["env"], "prod");
        assert_eq!(metadata["team"], "onboarding");
        assert_eq!(defaults.tags(&message), ["default", "welcome"]);
        assert_eq!(defaults.track_clicks(&message), Some(true));
        assert_eq!(defaults.track_opens(&message), Some(true));
        assert_eq!(defaults.esp_extra(&message)["o:testmode"], "no");
    }

    #[test]
    fn message_deserializes_from_minimal_json() {
        let json = serde_json::json!({
            "from": "Sender <sender@example.com>",
            "to": ["a@example.com", "B <b@example.com>"],
            "subject": "Hi"
        });
        let message: OutboundMessage = serde_json::from_value(json).unwrap();
        assert_eq!(message.from.unwrap().domain(), Some("example.com"));
        assert_eq!(message.to.len(), 2);
        assert!(message.cc.is_empty());
        assert!(message.send_at.is_none());
    }
}
