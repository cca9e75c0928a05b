use clap::Args;
use courier_core::SendResult;
use courier_mailgun::MailgunBackend;
use courier_provider::{EmailBackend, LogBackend};

use crate::OutputFormat;
use crate::commands::read_message;
use crate::config::CourierConfig;

#[derive(Args, Debug)]
pub struct SendArgs {
    /// Message JSON (string or @file path).
    #[arg(long)]
    pub message: String,
    /// Log the message instead of calling Mailgun.
    #[arg(long)]
    pub dry_run: bool,
}

pub async fn run(
    config: &CourierConfig,
    args: &SendArgs,
    format: &OutputFormat,
) -> anyhow::Result<()> {
    let message = read_message(&args.message)?;

    let backend: Box<dyn EmailBackend> = if args.dry_run {
        Box::new(LogBackend::new("dry-run"))
    } else {
        Box::new(MailgunBackend::new(config.mailgun()?)?)
    };

    let result = backend.send(&message, &config.send_defaults).await?;
    print!("{}", render(&result, format)?);
    Ok(())
}

fn render(result: &SendResult, format: &OutputFormat) -> anyhow::Result<String> {
    let out = match format {
        OutputFormat::Json => format!("{}\n", serde_json::to_string_pretty(result)?),
        OutputFormat::Text => {
            if result.is_empty() {
                return Ok("No recipients.\n".to_owned());
            }
            result
                .recipients()
                .iter()
                .map(|(email, status)| {
                    format!("{email}  {}  {}\n", status.status, status.message_id)
                })
                .collect()
        }
    };
    Ok(out)
}

#[cfg(test)]
mod tests {
    use courier_core::{DeliveryStatus, RecipientStatus};

    use super::*;

    fn result() -> SendResult {
        let status = RecipientStatus::new("<id@example.com>", DeliveryStatus::Queued);
        SendResult::uniform(["b@x.com", "a@x.com"], &status)
    }

    #[test]
    fn render_text_lists_recipients_in_order() {
        let text = render(&result(), &OutputFormat::Text).unwrap();
        assert_eq!(
            text,
            "a@x.com  queued  <id@example.com>\nb@x.com  queued  <id@example.com>\n"
        );
    }

    #[test]
    fn render_json_is_keyed_by_address() {
        let json = render(&result(), &OutputFormat::Json).unwrap();
        let value: serde_json::Value = serde_json::from_str(&json).unwrap();
        assert_eq!(value["a@x.com"]["status"], "queued");
        assert_eq!(value["b@x.com"]["message_id"], "<id@example.com>");
    }

    #[test]
    fn render_text_without_recipients() {
        let text = render(&SendResult::default(), &OutputFormat::Text).unwrap();
        assert_eq!(text, "No recipients.\n");
    }

    #[tokio::test]
    async fn dry_run_does_not_need_mailgun_config() {
        let config = CourierConfig {
            mailgun: None,
            send_defaults: courier_core::SendDefaults::default(),
        };
        let args = SendArgs {
            message: r#"{"from": "a@example.com", "to": ["b@example.net"]}"#.to_owned(),
            dry_run: true,
        };
        run(&config, &args, &OutputFormat::Json).await.unwrap();
    }

    #[tokio::test]
    async fn real_send_without_key_fails() {
        let config = CourierConfig {
            mailgun: None,
            send_defaults: courier_core::SendDefaults::default(),
        };
        let args = SendArgs {
            message: r#"{"to": ["b@example.net"]}"#.to_owned(),
            dry_run: false,
        };
        let err = run(&config, &args, &OutputFormat::Text).await.unwrap_err();
        assert!(err.to_string().contains("MAILGUN_API_KEY"));
    }
}
