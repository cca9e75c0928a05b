pub mod preview;
pub mod send;

use courier_core::OutboundMessage;

/// Parse a message given inline as JSON or as `@path` to a JSON file.
pub fn read_message(arg: &str) -> anyhow::Result<OutboundMessage> {
    let message = if let Some(path) = arg.strip_prefix('@') {
        let content = std::fs::read_to_string(path)?;
        serde_json::from_str(&content)?
    } else {
        serde_json::from_str(arg)?
    };
    Ok(message)
}
