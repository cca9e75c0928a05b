//! Provider-agnostic outbound email model for Courier.
//!
//! Payload builders in the integration crates read an [`OutboundMessage`]
//! and report delivery as a [`SendResult`] of per-recipient
//! [`RecipientStatus`] rows.

pub mod address;
pub mod attachment;
pub mod error;
pub mod message;
pub mod outcome;
pub mod types;

pub use address::{EmailAddress, RecipientKind};
pub use attachment::Attachment;
pub use error::CoreError;
pub use message::{AlternativePart, OutboundMessage, SendAt, SendDefaults};
pub use outcome::{DeliveryStatus, RecipientStatus, SendResult};
pub use types::MessageId;
