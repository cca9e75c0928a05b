use clap::Args;
use courier_mailgun::MailgunPayload;
use serde_json::json;

use crate::OutputFormat;
use crate::commands::read_message;
use crate::config::CourierConfig;

#[derive(Args, Debug)]
pub struct PreviewArgs {
    /// Message JSON (string or @file path).
    #[arg(long)]
    pub message: String,
}

pub fn run(
    config: &CourierConfig,
    args: &PreviewArgs,
    format: &OutputFormat,
) -> anyhow::Result<()> {
    let message = read_message(&args.message)?;
    let payload = MailgunPayload::build(&message, &config.send_defaults);
    print!("{}", render(&payload, &config.api_url(), format)?);
    Ok(())
}

fn render(
    payload: &MailgunPayload,
    api_url: &str,
    format: &OutputFormat,
) -> anyhow::Result<String> {
    let endpoint = payload
        .api_endpoint()
        .map(|path| format!("{api_url}{path}"))
        .map_err(|e| e.to_string());

    match format {
        OutputFormat::Json => {
            let files: Vec<_> = payload
                .files()
                .iter()
                .map(|f| {
                    json!({
                        "field": f.field,
                        "filename": f.filename,
                        "mimetype": f.mimetype,
                        "size": f.content.len(),
                    })
                })
                .collect();
            let (url, error) = match endpoint {
                Ok(url) => (Some(url), None),
                Err(e) => (None, Some(e)),
            };
            let value = json!({
                "url": url,
                "error": error,
                "fields": payload.fields(),
                "files": files,
                "notices": payload.notices(),
            });
            Ok(format!("{}\n", serde_json::to_string_pretty(&value)?))
        }
        OutputFormat::Text => {
            let mut out = match endpoint {
                Ok(url) => format!("POST {url}\n"),
                Err(e) => format!("POST <unavailable>: {e}\n"),
            };
            for (name, value) in payload.fields() {
                for v in value.values() {
                    out.push_str(&format!("  {name} = {v}\n"));
                }
            }
            for file in payload.files() {
                out.push_str(&format!(
                    "  {} <- {} ({}, {} bytes)\n",
                    file.field,
                    file.filename.as_deref().unwrap_or("<unnamed>"),
                    file.mimetype,
                    file.content.len()
                ));
            }
            for notice in payload.notices() {
                out.push_str(&format!("unsupported: {notice}\n"));
            }
            Ok(out)
        }
    }
}
