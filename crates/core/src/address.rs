use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::CoreError;

/// Characters that force a display name to be quoted (RFC 5322 specials).
const SPECIALS: &[char] = &['(', ')', '<', '>', '[', ']', ':', ';', '@', '\\', ',', '.', '"'];

/// A mailbox: an addr-spec with an optional display name.
///
/// Addresses are assumed to be validated upstream. Parsing only splits the
/// display name from the addr-spec, so a value without `@` is kept verbatim.
///
/// # Examples
///
/// ```
/// use courier_core::EmailAddress;
///
/// let addr: EmailAddress = "Jane Doe <jane@example.com>".parse().unwrap();
/// assert_eq!(addr.email, "jane@example.com");
/// assert_eq!(addr.domain(), Some("example.com"));
/// assert_eq!(addr.to_string(), "Jane Doe <jane@example.com>");
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct EmailAddress {
    /// Optional human-readable name.
    pub display_name: Option<String>,
    /// The bare `local@domain` part.
    pub email: String,
}

impl EmailAddress {
    /// Create an address without a display name.
    pub fn new(email: impl Into<String>) -> Self {
        Self {
            display_name: None,
            email: email.into(),
        }
    }

    /// Create an address with a display name.
    pub fn with_name(display_name: impl Into<String>, email: impl Into<String>) -> Self {
        Self {
            display_name: Some(display_name.into()),
            email: email.into(),
        }
    }

    /// The domain part, when the addr-spec is exactly `local@domain`.
    pub fn domain(&self) -> Option<&str> {
        let (local, domain) = self.email.split_once('@')?;
        if local.is_empty() || domain.is_empty() || domain.contains('@') {
            return None;
        }
        Some(domain)
    }
}

impl fmt::Display for EmailAddress {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.display_name.as_deref() {
            Some(name) if !name.is_empty() => {
                if name.contains(SPECIALS) {
                    let escaped = name.replace('\\', "\\\\").replace('"', "\\\"");
                    write!(f, "\"{escaped}\" <{}>", self.email)
                } else {
                    write!(f, "{name} <{}>", self.email)
                }
            }
            _ => f.write_str(&self.email),
        }
    }
}

impl FromStr for EmailAddress {
    type Err = CoreError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let trimmed = s.trim();
        if trimmed.is_empty() {
            return Err(CoreError::InvalidAddress(s.to_owned()));
        }

        let Some(open) = trimmed.rfind('<').filter(|_| trimmed.ends_with('>')) else {
            return Ok(Self::new(trimmed));
        };

        let email = trimmed[open + 1..trimmed.len() - 1].trim();
        if email.is_empty() {
            return Err(CoreError::InvalidAddress(s.to_owned()));
        }

        let name = unquote(trimmed[..open].trim());
        Ok(Self {
            display_name: (!name.is_empty()).then_some(name),
            email: email.to_owned(),
        })
    }
}

fn unquote(name: &str) -> String {
    match name
        .strip_prefix('"')
        .and_then(|rest| rest.strip_suffix('"'))
    {
        Some(inner) => {
            let mut out = String::with_capacity(inner.len());
            let mut chars = inner.chars();
            while let Some(c) = chars.next() {
                if c == '\\' {
                    if let Some(escaped) = chars.next() {
                        out.push(escaped);
                    }
                } else {
                    out.push(c);
                }
            }
            out
        }
        None => name.to_owned(),
    }
}

impl TryFrom<String> for EmailAddress {
    type Error = CoreError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl From<EmailAddress> for String {
    fn from(addr: EmailAddress) -> Self {
        addr.to_string()
    }
}

/// Which recipient list an address belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum RecipientKind {
    To,
    Cc,
    Bcc,
}

impl RecipientKind {
    /// All kinds, in the order recipients are pushed to a payload.
    pub const ALL: [Self; 3] = [Self::To, Self::Cc, Self::Bcc];

    /// The wire keyword for this kind.
    pub fn as_str(self) -> &'static str {
        match self {
            Self::To => "to",
            Self::Cc => "cc",
            Self::Bcc => "bcc",
        }
    }
}

impl fmt::Display for RecipientKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_bare_address() {
        let addr: EmailAddress = "a@example.com".parse().unwrap();
        assert!(addr.display_name.is_none());
        assert_eq!(addr.email, "a@example.com");
        assert_eq!(addr.to_string(), "a@example.com");
    }

    #[test]
    fn parse_named_address() {
        let addr: EmailAddress = "  Jane Doe <jane@example.com> ".parse().unwrap();
        assert_eq!(addr.display_name.as_deref(), Some("Jane Doe"));
        assert_eq!(addr.email, "jane@example.com");
    }

    #[test]
    fn parse_angle_only_address() {
        let addr: EmailAddress = "<jane@example.com>".parse().unwrap();
        assert!(addr.display_name.is_none());
        assert_eq!(addr.email, "jane@example.com");
    }

    #[test]
    fn parse_quoted_name_with_comma() {
        let addr: EmailAddress = r#""Doe, Jane" <jane@example.com>"#.parse().unwrap();
        assert_eq!(addr.display_name.as_deref(), Some("Doe, Jane"));
        assert_eq!(addr.to_string(), r#""Doe, Jane" <jane@example.com>"#);
    }

    #[test]
    fn display_escapes_quotes_in_name() {
        let addr = EmailAddress::with_name(r#"The "Boss""#, "boss@example.com");
        assert_eq!(addr.to_string(), r#""The \"Boss\"" <boss@example.com>"#);
        let back: EmailAddress = addr.to_string().parse().unwrap();
        assert_eq!(back, addr);
    }

    #[test]
    fn parse_without_at_sign_is_kept_verbatim() {
        let addr: EmailAddress = "not-an-address".parse().unwrap();
        assert_eq!(addr.email, "not-an-address");
        assert!(addr.domain().is_none());
    }

    #[test]
    fn parse_empty_fails() {
        assert!("   ".parse::<EmailAddress>().is_err());
        assert!("Name <>".parse::<EmailAddress>().is_err());
    }

    #[test]
    fn domain_requires_exactly_one_at() {
        assert_eq!(EmailAddress::new("a@example.com").domain(), Some("example.com"));
        assert!(EmailAddress::new("a@b@example.com").domain().is_none());
        assert!(EmailAddress::new("a@").domain().is_none());
        assert!(EmailAddress::new("@example.com").domain().is_none());
    }

    #[test]
    fn serde_uses_display_form() {
        let addr = EmailAddress::with_name("Jane", "jane@example.com");
        let json = serde_json::to_string(&addr).unwrap();
        assert_eq!(json, r#""Jane <jane@example.com>""#);
        let back: EmailAddress = serde_json::from_str(&json).unwrap();
        assert_eq!(back, addr);
    }

    #[test]
    fn recipient_kind_keywords() {
        let keywords: Vec<&str> = RecipientKind::ALL.iter().map(|k| k.as_str()).collect();
        assert_eq!(keywords, ["to", "cc", "bcc"]);
    }
}
