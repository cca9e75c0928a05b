//! The field-setter contract between generic messages and provider payloads.
//!
//! A provider payload implements [`PayloadVisitor`]; [`populate`] walks an
//! [`OutboundMessage`] and pushes each present field into it, in a fixed
//! order that ends with the provider-specific `esp_extra` overrides so they
//! can replace anything computed earlier.

use std::collections::BTreeMap;

use courier_core::{Attachment, EmailAddress, OutboundMessage, RecipientKind, SendAt, SendDefaults};

/// Setter per message field. Setters a provider cannot represent default to
/// reporting an unsupported feature.
pub trait PayloadVisitor {
    /// The error raised by fallible setters.
    type Error;

    /// Record a message feature the provider cannot represent.
    ///
    /// This is a notice, not a failure: the send goes ahead without it.
    fn unsupported_feature(&mut self, feature: &str);

    fn set_from(&mut self, from: &EmailAddress);

    fn set_recipients(&mut self, kind: RecipientKind, addresses: &[EmailAddress]);

    fn set_subject(&mut self, subject: &str);

    fn set_reply_to(&mut self, _addresses: &[EmailAddress]) {
        self.unsupported_feature("reply_to");
    }

    fn set_extra_headers(&mut self, _headers: &BTreeMap<String, String>) {
        self.unsupported_feature("extra_headers");
    }

    fn set_text_body(&mut self, body: &str);

    fn set_html_body(&mut self, body: &str);

    fn add_attachment(&mut self, _attachment: &Attachment) {
        self.unsupported_feature("attachments");
    }

    fn set_metadata(
        &mut self,
        _metadata: &BTreeMap<String, serde_json::Value>,
    ) -> Result<(), Self::Error> {
        self.unsupported_feature("metadata");
        Ok(())
    }

    fn set_send_at(&mut self, _send_at: &SendAt) {
        self.unsupported_feature("send_at");
    }

    fn set_tags(&mut self, _tags: &[String]) {
        self.unsupported_feature("tags");
    }

    fn set_track_clicks(&mut self, _enabled: bool) {
        self.unsupported_feature("track_clicks");
    }

    fn set_track_opens(&mut self, _enabled: bool) {
        self.unsupported_feature("track_opens");
    }

    fn set_esp_extra(
        &mut self,
        _extra: &BTreeMap<String, serde_json::Value>,
    ) -> Result<(), Self::Error> {
        self.unsupported_feature("esp_extra");
        Ok(())
    }
}

/// Push every present field of `message` (with `defaults` applied) into
/// `visitor`.
///
/// Order: from, to/cc/bcc, subject, reply-to, headers, text body, html body,
/// alternatives, attachments, metadata, send-at, tags, click tracking, open
/// tracking, and finally `esp_extra`. Absent and empty fields are skipped.
pub fn populate<V: PayloadVisitor>(
    visitor: &mut V,
    message: &OutboundMessage,
    defaults: &SendDefaults,
) -> Result<(), V::Error> {
    if let Some(from) = &message.from {
        visitor.set_from(from);
    }

    for kind in RecipientKind::ALL {
        let addresses = message.recipients(kind);
        if !addresses.is_empty() {
            visitor.set_recipients(kind, addresses);
        }
    }

    if let Some(subject) = &message.subject {
        visitor.set_subject(subject);
    }
    if !message.reply_to.is_empty() {
        visitor.set_reply_to(&message.reply_to);
    }
    if !message.headers.is_empty() {
        visitor.set_extra_headers(&message.headers);
    }

    if let Some(text) = &message.text_body {
        visitor.set_text_body(text);
    }
    if let Some(html) = &message.html_body {
        visitor.set_html_body(html);
    }
    for alternative in &message.alternatives {
        if alternative.mimetype.eq_ignore_ascii_case("text/html") {
            visitor.set_html_body(&alternative.content);
        } else {
            visitor.unsupported_feature(&format!(
                "alternative part with type '{}'",
                alternative.mimetype
            ));
        }
    }

    for attachment in &message.attachments {
        visitor.add_attachment(attachment);
    }

    let metadata = defaults.metadata(message);
    if !metadata.is_empty() {
        visitor.set_metadata(&metadata)?;
    }
    if let Some(send_at) = &message.send_at {
        visitor.set_send_at(send_at);
    }
    let tags = defaults.tags(message);
    if !tags.is_empty() {
        visitor.set_tags(&tags);
    }
    if let Some(enabled) = defaults.track_clicks(message) {
        visitor.set_track_clicks(enabled);
    }
    if let Some(enabled) = defaults.track_opens(message) {
        visitor.set_track_opens(enabled);
    }

    let extra = defaults.esp_extra(message);
    if !extra.is_empty() {
        visitor.set_esp_extra(&extra)?;
    }
    Ok(())
}
