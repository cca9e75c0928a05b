use std::collections::{BTreeMap, BTreeSet};

use serde::{Deserialize, Serialize};

use crate::types::MessageId;

/// Normalized delivery state of a single recipient.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DeliveryStatus {
    /// Handed off to the recipient's mail server.
    Sent,
    /// Accepted by the provider for later delivery.
    Queued,
    /// Accepted for delivery at a scheduled time.
    Scheduled,
    /// Refused by the provider (e.g. suppression list).
    Rejected,
    /// The provider could not process the recipient.
    Failed,
    /// The recipient address was not deliverable.
    Invalid,
    /// The provider did not say.
    Unknown,
}

impl DeliveryStatus {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Sent => "sent",
            Self::Queued => "queued",
            Self::Scheduled => "scheduled",
            Self::Rejected => "rejected",
            Self::Failed => "failed",
            Self::Invalid => "invalid",
            Self::Unknown => "unknown",
        }
    }
}

impl std::fmt::Display for DeliveryStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Status reported by a provider for one recipient address.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RecipientStatus {
    /// Provider-assigned message identifier.
    pub message_id: MessageId,
    /// Delivery state.
    pub status: DeliveryStatus,
}

impl RecipientStatus {
    #[must_use]
    pub fn new(message_id: impl Into<MessageId>, status: DeliveryStatus) -> Self {
        Self {
            message_id: message_id.into(),
            status,
        }
    }
}

/// Per-recipient result of one send, keyed by bare email address.
///
/// A send either succeeds for every recipient or fails as a whole, so a
/// `SendResult` never mixes accepted and failed rows from one call.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct SendResult {
    recipients: BTreeMap<String, RecipientStatus>,
}

impl SendResult {
    /// Report every address with the same status.
    pub fn uniform<'a>(
        addresses: impl IntoIterator<Item = &'a str>,
        status: &RecipientStatus,
    ) -> Self {
        let recipients = addresses
            .into_iter()
            .map(|email| (email.to_owned(), status.clone()))
            .collect();
        Self { recipients }
    }

    /// Status for a single address.
    pub fn recipient(&self, email: &str) -> Option<&RecipientStatus> {
        self.recipients.get(email)
    }

    /// All rows, ordered by address.
    pub fn recipients(&self) -> &BTreeMap<String, RecipientStatus> {
        &self.recipients
    }

    /// The message id, when every recipient shares the same one.
    pub fn message_id(&self) -> Option<&MessageId> {
        let mut ids = self.recipients.values().map(|r| &r.message_id);
        let first = ids.next()?;
        ids.all(|id| id == first).then_some(first)
    }

    /// Distinct statuses across all recipients.
    pub fn statuses(&self) -> BTreeSet<DeliveryStatus> {
        self.recipients.values().map(|r| r.status).collect()
    }

    pub fn len(&self) -> usize {
        self.recipients.len()
    }

    pub fn is_empty(&self) -> bool {
        self.recipients.is_empty()
    }
}

impl IntoIterator for SendResult {
    type Item = (String, RecipientStatus);
    type IntoIter = std::collections::btree_map::IntoIter<String, RecipientStatus>;

    fn into_iter(self) -> Self::IntoIter {
        self.recipients.into_iter()
    }
}

impl From<BTreeMap<String, RecipientStatus>> for SendResult {
    fn from(recipients: BTreeMap<String, RecipientStatus>) -> Self {
        Self { recipients }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn uniform_result_shares_message_id() {
        let status = RecipientStatus::new("MSG123", DeliveryStatus::Queued);
        let result = SendResult::uniform(["a@x.com", "b@x.com"], &status);
        assert_eq!(result.len(), 2);
        assert_eq!(result.message_id().map(MessageId::as_str), Some("MSG123"));
        assert_eq!(
            result.statuses().into_iter().collect::<Vec<_>>(),
            [DeliveryStatus::Queued]
        );
        assert_eq!(result.recipient("b@x.com"), Some(&status));
    }

    #[test]
    fn duplicate_addresses_collapse() {
        let status = RecipientStatus::new("MSG1", DeliveryStatus::Sent);
        let result = SendResult::uniform(["a@x.com", "a@x.com"], &status);
        assert_eq!(result.len(), 1);
    }

    #[test]
    fn message_id_is_none_when_ids_differ() {
        let result = SendResult::from(BTreeMap::from([
            (
                "a@x.com".to_owned(),
                RecipientStatus::new("one", DeliveryStatus::Sent),
            ),
            (
                "b@x.com".to_owned(),
                RecipientStatus::new("two", DeliveryStatus::Sent),
            ),
        ]));
        assert!(result.message_id().is_none());
        assert!(SendResult::default().message_id().is_none());
    }

    #[test]
    fn status_serializes_snake_case() {
        let status = RecipientStatus::new("MSG123", DeliveryStatus::Queued);
        let json = serde_json::to_value(&status).unwrap();
        assert_eq!(json, serde_json::json!({"message_id": "MSG123", "status": "queued"}));
    }
}
