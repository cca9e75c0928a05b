use std::path::Path;

use anyhow::Context;
use courier_core::SendDefaults;
use courier_mailgun::{DEFAULT_API_URL, MailgunConfig};
use serde::Deserialize;
use tracing::info;

/// Contents of `courier.toml`.
///
/// ```toml
/// [mailgun]
/// api_key = "key-..."
///
/// [send_defaults]
/// tags = ["transactional"]
/// track_opens = true
/// ```
#[derive(Debug, Deserialize)]
pub struct CourierConfig {
    /// Mailgun connection settings. Only required for a real send.
    #[serde(default)]
    pub mailgun: Option<MailgunConfig>,

    /// Values applied to every message.
    #[serde(default)]
    pub send_defaults: SendDefaults,
}

impl CourierConfig {
    /// Load the config file, or an empty config if `path` does not exist.
    ///
    /// A non-empty `api_key` replaces `mailgun.api_key` from the file.
    pub fn load(path: &Path, api_key: Option<&str>) -> anyhow::Result<Self> {
        let contents = if path.exists() {
            std::fs::read_to_string(path)
                .with_context(|| format!("failed to read {}", path.display()))?
        } else {
            info!(path = %path.display(), "config file not found, using defaults");
            String::new()
        };
        Self::parse(&contents, api_key)
            .with_context(|| format!("invalid configuration in {}", path.display()))
    }

    fn parse(contents: &str, api_key: Option<&str>) -> anyhow::Result<Self> {
        let mut table: toml::Table = toml::from_str(contents)?;
        if let Some(key) = api_key.filter(|k| !k.is_empty()) {
            let mailgun = table
                .entry("mailgun")
                .or_insert_with(|| toml::Value::Table(toml::Table::new()));
            let Some(mailgun) = mailgun.as_table_mut() else {
                anyhow::bail!("`mailgun` must be a table");
            };
            mailgun.insert("api_key".to_owned(), toml::Value::String(key.to_owned()));
        }
        Ok(toml::Value::Table(table).try_into()?)
    }

    /// The Mailgun settings, or an error naming both ways to supply a key.
    pub fn mailgun(&self) -> anyhow::Result<&MailgunConfig> {
        self.mailgun.as_ref().context(
            "no Mailgun API key: set `api_key` in the [mailgun] table or MAILGUN_API_KEY",
        )
    }

    /// The API base URL requests would go to, ending with `/`.
    pub fn api_url(&self) -> String {
        self.mailgun
            .as_ref()
            .map_or_else(|| format!("{DEFAULT_API_URL}/"), MailgunConfig::normalized_api_url)
    }
}

#[cfg(test)]
mod tests {
    use std::io::Write;

    use super::*;

    #[test]
    fn parse_full_config() {
        let config = CourierConfig::parse(
            r#"
            [mailgun]
            api_key = "key-file"
            api_url = "https://api.eu.mailgun.net/v3"

            [send_defaults]
            tags = ["transactional"]
            track_clicks = false
            "#,
            None,
        )
        .unwrap();

        let mailgun = config.mailgun().unwrap();
        assert_eq!(mailgun.api_key, "key-file");
        assert_eq!(config.api_url(), "https://api.eu.mailgun.net/v3/");
        assert_eq!(config.send_defaults.tags, ["transactional"]);
        assert_eq!(config.send_defaults.track_clicks, Some(false));
    }

    #[test]
    fn env_key_overrides_file_key() {
        let config = CourierConfig::parse(
            r#"
            [mailgun]
            api_key = "key-file"
            "#,
            Some("key-env"),
        )
        .unwrap();
        assert_eq!(config.mailgun().unwrap().api_key, "key-env");
    }

    #[test]
    fn env_key_alone_is_enough() {
        let config = CourierConfig::parse("", Some("key-env")).unwrap();
        let mailgun = config.mailgun().unwrap();
        assert_eq!(mailgun.api_key, "key-env");
        assert_eq!(mailgun.api_url, DEFAULT_API_URL);
    }

    #[test]
    fn missing_key_only_fails_when_mailgun_is_needed() {
        let config = CourierConfig::parse("", None).unwrap();
        assert!(config.mailgun.is_none());
        assert_eq!(config.api_url(), "https://api.mailgun.net/v3/");
        let err = config.mailgun().unwrap_err();
        assert!(err.to_string().contains("MAILGUN_API_KEY"));
    }

    #[test]
    fn empty_env_key_is_ignored() {
        let config = CourierConfig::parse(
            r#"
            [mailgun]
            api_key = "key-file"
            "#,
            Some(""),
        )
        .unwrap();
        assert_eq!(config.mailgun().unwrap().api_key, "key-file");
    }

    #[test]
    fn non_table_mailgun_is_rejected() {
        assert!(CourierConfig::parse(r#"mailgun = "key""#, Some("key-env")).is_err());
    }

    #[test]
    fn load_reads_file_and_tolerates_missing_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "[mailgun]\napi_key = \"key-tmp\"").unwrap();
        let config = CourierConfig::load(file.path(), None).unwrap();
        assert_eq!(config.mailgun().unwrap().api_key, "key-tmp");

        let missing = file.path().with_extension("missing");
        let config = CourierConfig::load(&missing, None).unwrap();
        assert!(config.mailgun.is_none());
    }
}
