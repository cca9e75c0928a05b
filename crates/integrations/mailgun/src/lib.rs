//! Mailgun email backend for Courier.
//!
//! This crate implements the [`EmailBackend`](courier_provider::EmailBackend)
//! trait, delivering messages through the
//! [Mailgun messages API](https://documentation.mailgun.com/en/latest/api-sending.html).
//! A message is translated into Mailgun form fields by [`MailgunPayload`],
//! posted to `{api_url}/{sender_domain}/messages`, and the response is
//! reported as one `queued` status per recipient.
//!
//! # Quick start
//!
//! ```rust,no_run
//! use courier_core::{OutboundMessage, SendDefaults};
//! use courier_mailgun::{MailgunBackend, MailgunConfig};
//! use courier_provider::EmailBackend;
//!
//! # async fn run() -> Result<(), Box<dyn std::error::Error>> {
//! let backend = MailgunBackend::new(&MailgunConfig::new("key-..."))?;
//! let message = OutboundMessage::default()
//!     .with_from("shop@example.com".parse()?)
//!     .with_to("customer@example.net".parse()?)
//!     .with_subject("Your receipt")
//!     .with_text_body("Thanks for your order.");
//! let result = backend.send(&message, &SendDefaults::default()).await?;
//! println!("queued as {:?}", result.message_id());
//! # Ok(())
//! # }
//! ```

pub mod config;
pub mod error;
pub mod payload;
pub mod provider;
pub mod types;

pub use config::{DEFAULT_API_URL, MailgunConfig};
pub use error::MailgunError;
pub use payload::MailgunPayload;
pub use provider::MailgunBackend;
pub use types::MailgunApiResponse;
