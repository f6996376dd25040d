/// Utility functions for configuration parsing and formatting
use time::{format_description, OffsetDateTime};

/// Format a timestamp for human-readable logging
///
/// Converts an OffsetDateTime to DD.MM.YYYY - HH:MM:SS format
/// Falls back to default string representation if formatting fails.
pub fn format_datetime(dt: &OffsetDateTime) -> String {
    match format_description::parse("[day].[month].[year] - [hour]:[minute]:[second]") {
        Ok(format) => dt.format(&format).unwrap_or_else(|_| dt.to_string()),
        Err(_) => dt.to_string(),
    }
}

/// Parse a fixed number of bytes from a hex string
///
/// Accepts plain hex (`746865726d79`), an optional `0x` prefix and
/// `:`, `-` or whitespace separators (`74:68:65:72:6D:79`).
pub fn parse_hex_bytes<const N: usize>(input: &str) -> Result<[u8; N], String> {
    let trimmed = input.trim();
    let trimmed = trimmed
        .strip_prefix("0x")
        .or_else(|| trimmed.strip_prefix("0X"))
        .unwrap_or(trimmed);

    let digits: String = trimmed
        .chars()
        .filter(|c| !matches!(c, ':' | '-') && !c.is_whitespace())
        .collect();

    let bytes = hex::decode(&digits).map_err(|e| format!("invalid hex '{}': {}", input, e))?;
    let len = bytes.len();

    bytes
        .try_into()
        .map_err(|_| format!("expected {} bytes, got {}", N, len))
}

/// Interpret a verbosity toggle such as `DEBUG=1`
pub fn parse_flag(value: &str) -> Result<bool, String> {
    match value.trim().to_ascii_lowercase().as_str() {
        "" | "0" | "false" | "no" | "off" => Ok(false),
        "1" | "true" | "yes" | "on" => Ok(true),
        other => Err(format!("unrecognised boolean '{}'", other)),
    }
}

/// Rebuild the manufacturer-specific data field as it appears on air
///
/// BlueZ splits the field into its company identifier and payload; the
/// identifier is transmitted little-endian ahead of the payload.
pub fn manufacturer_frame(company_id: u16, payload: &[u8]) -> Vec<u8> {
    let mut frame = Vec::with_capacity(2 + payload.len());
    frame.extend_from_slice(&company_id.to_le_bytes());
    frame.extend_from_slice(payload);
    frame
}
