use std::collections::BTreeMap;
use std::convert::Infallible;

use courier_core::{
    Attachment, EmailAddress, OutboundMessage, RecipientKind, SendAt, SendDefaults,
};
use courier_provider::{
    BasicAuth, FieldValue, FilePart, FormFields, FormRequest, PayloadVisitor, populate,
};
use tracing::{debug, warn};

use crate::error::MailgunError;

/// Extra key that selects the sending domain instead of being sent as a field.
const SENDER_DOMAIN_KEY: &str = "sender_domain";

/// A Mailgun `messages` request under construction.
///
/// Built by pushing message fields through [`PayloadVisitor`]; see
/// [`MailgunPayload::build`]. Every recipient seen along the way is kept in
/// [`all_recipients`](Self::all_recipients) so the single status Mailgun
/// returns can be fanned out per address.
#[derive(Debug, Clone, Default)]
pub struct MailgunPayload {
    fields: FormFields,
    files: Vec<FilePart>,
    sender_domain: Option<String>,
    all_recipients: Vec<EmailAddress>,
    notices: Vec<String>,
}

impl MailgunPayload {
    /// Build the payload for `message` with `defaults` applied.
    ///
    /// Building never fails: metadata is already JSON by the time it reaches
    /// the message, since [`OutboundMessage::insert_metadata`] rejects values
    /// that cannot be represented. A missing sender domain is reported later
    /// by [`api_endpoint`](Self::api_endpoint).
    pub fn build(message: &OutboundMessage, defaults: &SendDefaults) -> Self {
        let mut payload = Self::default();
        let Ok(()) = populate(&mut payload, message, defaults);
        debug!(
            fields = payload.fields.len(),
            files = payload.files.len(),
            recipients = payload.all_recipients.len(),
            sender_domain = ?payload.sender_domain,
            "built Mailgun payload"
        );
        payload
    }

    /// Form fields to send, by field name.
    pub fn fields(&self) -> &FormFields {
        &self.fields
    }

    /// Attachment parts to send.
    pub fn files(&self) -> &[FilePart] {
        &self.files
    }

    /// The domain the message is sent through, if known.
    pub fn sender_domain(&self) -> Option<&str> {
        self.sender_domain.as_deref()
    }

    /// Every to/cc/bcc address, in the order they were set.
    pub fn all_recipients(&self) -> &[EmailAddress] {
        &self.all_recipients
    }

    /// Features of the message that Mailgun could not represent.
    pub fn notices(&self) -> &[String] {
        &self.notices
    }

    /// Path of the `messages` endpoint, relative to the API base URL.
    pub fn api_endpoint(&self) -> Result<String, MailgunError> {
        match self.sender_domain.as_deref() {
            Some(domain) if !domain.is_empty() => Ok(format!("{domain}/messages")),
            _ => Err(MailgunError::UnknownSenderDomain),
        }
    }

    /// The complete request: `api_url` must end with `/`.
    pub fn request(&self, api_url: &str, api_key: &str) -> Result<FormRequest, MailgunError> {
        Ok(FormRequest {
            url: format!("{api_url}{}", self.api_endpoint()?),
            auth: BasicAuth {
                username: "api".to_owned(),
                password: api_key.to_owned(),
            },
            fields: self.fields.clone(),
            files: self.files.clone(),
        })
    }

    fn insert(&mut self, name: impl Into<String>, value: impl Into<FieldValue>) {
        self.fields.insert(name.into(), value.into());
    }
}

impl PayloadVisitor for MailgunPayload {
    type Error = Infallible;

    fn unsupported_feature(&mut self, feature: &str) {
        warn!(provider = "mailgun", feature, "unsupported feature ignored");
        self.notices.push(feature.to_owned());
    }

    fn set_from(&mut self, from: &EmailAddress) {
        self.insert("from", from.to_string());
        if self.sender_domain.is_none() {
            self.sender_domain = from.domain().map(str::to_owned);
        }
    }

    fn set_recipients(&mut self, kind: RecipientKind, addresses: &[EmailAddress]) {
        if addresses.is_empty() {
            return;
        }
        let values: Vec<String> = addresses.iter().map(ToString::to_string).collect();
        self.insert(kind.as_str(), values);
        self.all_recipients.extend_from_slice(addresses);
    }

    fn set_subject(&mut self, subject: &str) {
        self.insert("subject", subject);
    }

    fn set_reply_to(&mut self, addresses: &[EmailAddress]) {
        if addresses.is_empty() {
            return;
        }
        let reply_to = addresses
            .iter()
            .map(ToString::to_string)
            .collect::<Vec<_>>()
            .join(", ");
        self.insert("h:Reply-To", reply_to);
    }

    fn set_extra_headers(&mut self, headers: &BTreeMap<String, String>) {
        for (name, value) in headers {
            self.insert(format!("h:{name}"), value.as_str());
        }
    }

    fn set_text_body(&mut self, body: &str) {
        self.insert("text", body);
    }

    fn set_html_body(&mut self, body: &str) {
        if self.fields.contains_key("html") {
            // A second html part can arrive through alternatives.
            self.unsupported_feature("multiple html parts");
            return;
        }
        self.insert("html", body);
    }

    fn add_attachment(&mut self, attachment: &Attachment) {
        let field = if attachment.inline { "inline" } else { "attachment" };
        self.files.push(FilePart {
            field: field.to_owned(),
            filename: attachment.name.clone(),
            content: attachment.content.clone(),
            mimetype: attachment.mimetype.clone(),
        });
    }

    fn set_metadata(
        &mut self,
        metadata: &BTreeMap<String, serde_json::Value>,
    ) -> Result<(), Infallible> {
        // One `v:` field per key. Mailgun quotes string values itself when
        // they are read back as JSON, so plain strings go out bare.
        for (key, value) in metadata {
            self.insert(format!("v:{key}"), json_text(value));
        }
        Ok(())
    }

    fn set_send_at(&mut self, send_at: &SendAt) {
        self.insert("o:deliverytime", send_at.to_rfc2822());
    }

    fn set_tags(&mut self, tags: &[String]) {
        self.insert("o:tag", tags.to_vec());
    }

    fn set_track_clicks(&mut self, enabled: bool) {
        self.insert("o:tracking-clicks", yes_no(enabled));
    }

    fn set_track_opens(&mut self, enabled: bool) {
        self.insert("o:tracking-opens", yes_no(enabled));
    }

    fn set_esp_extra(
        &mut self,
        extra: &BTreeMap<String, serde_json::Value>,
    ) -> Result<(), Infallible> {
        for (key, value) in extra {
            if key == SENDER_DOMAIN_KEY {
                match value.as_str().filter(|d| !d.is_empty()) {
                    Some(domain) => self.sender_domain = Some(domain.to_owned()),
                    None => warn!(
                        provider = "mailgun",
                        %value,
                        "ignoring sender_domain that is not a non-empty string"
                    ),
                }
                continue;
            }
            match extra_field(value) {
                Some(field) => {
                    self.fields.insert(key.clone(), field);
                }
                None => {
                    self.fields.remove(key);
                }
            }
        }
        Ok(())
    }
}

fn yes_no(enabled: bool) -> &'static str {
    if enabled { "yes" } else { "no" }
}

fn json_text(value: &serde_json::Value) -> String {
    match value {
        serde_json::Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}

/// Convert an override value to a form field; `null` means "remove".
fn extra_field(value: &serde_json::Value) -> Option<FieldValue> {
    match value {
        serde_json::Value::Null => None,
        serde_json::Value::Array(items) => {
            Some(FieldValue::Many(items.iter().map(json_text).collect()))
        }
        other => Some(FieldValue::Single(json_text(other))),
    }
}
