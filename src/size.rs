use crate::error::{HarlensError, Result};

/// Parse a human-entered size such as `"100KB"`, `"1.5MB"`, or `"2048"`
/// into bytes. Used for the CLI's `--min-size`/`--max-size` bounds.
pub fn parse_size_bytes(s: &str) -> Result<i64> {
    let raw = s.trim();
    if raw.is_empty() {
        return Err(HarlensError::Validation(
            "size value cannot be empty".to_string(),
        ));
    }

    let lower = raw.to_lowercase();
    let mut number_end = 0;
    for (idx, ch) in lower.char_indices() {
        if ch.is_ascii_digit() || ch == '.' {
            number_end = idx + ch.len_utf8();
        } else {
            break;
        }
    }

    let number_str = lower[..number_end].trim();
    if number_str.is_empty() {
        return Err(HarlensError::Validation(format!(
            "invalid size value '{raw}'; expected a number like '1.5MB' or '100k'"
        )));
    }

    let unit_str = lower[number_end..].trim();
    let number: f64 = number_str.parse().map_err(|_| {
        HarlensError::Validation(format!(
            "invalid size value '{raw}'; expected a number like '1.5MB'"
        ))
    })?;

    if !number.is_finite() || number < 0.0 {
        return Err(HarlensError::Validation(format!(
            "invalid size value '{raw}'; size must be a non-negative number"
        )));
    }

    let multiplier = match unit_str {
        "" | "b" => 1.0,
        "k" | "kb" | "kib" => 1024.0,
        "m" | "mb" | "mib" => 1024.0 * 1024.0,
        "g" | "gb" | "gib" => 1024.0 * 1024.0 * 1024.0,
        _ => {
            return Err(HarlensError::Validation(format!(
                "invalid size unit '{unit_str}'; use B, KB, MB, or GB"
            )))
        }
    };

    let bytes = number * multiplier;
    if bytes > i64::MAX as f64 {
        return Err(HarlensError::Validation(format!(
            "size value '{raw}' is too large"
        )));
    }

    Ok(bytes.round() as i64)
}

/// Render a byte count the way capture listings print it.
pub fn format_size(bytes: u64) -> String {
    const UNITS: [&str; 4] = ["B", "KB", "MB", "GB"];
    let mut value = bytes as f64;
    let mut unit = 0;
    while value >= 1024.0 && unit < UNITS.len() - 1 {
        value /= 1024.0;
        unit += 1;
    }
    if unit == 0 {
        format!("{bytes} B")
    } else {
        format!("{value:.1} {}", UNITS[unit])
    }
}
