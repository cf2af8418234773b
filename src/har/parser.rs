use std::fs;
use std::path::Path;

use crate::error::{HarlensError, Result};
use crate::har::model::Har;
use crate::har::repair::repair;

const UTF8_BOM: &str = "\u{feff}";

/// Outcome of parsing raw capture bytes.
#[derive(Debug)]
pub struct Parsed {
    pub har: Har,
    /// Set when repair changed the text and the re-parse succeeded; callers
    /// that own the source file write this back.
    pub repaired_text: Option<String>,
}

/// Parse raw HAR bytes, retrying once through structural repair.
///
/// A leading byte-order mark is stripped before parsing. On a first-parse
/// failure the repair heuristics run; if they changed the text and the
/// re-parse succeeds, the corrected document wins. If repair is a no-op or
/// the re-parse still fails, the original parse error is surfaced.
pub fn parse_har_bytes(bytes: &[u8]) -> Result<Parsed> {
    let text = String::from_utf8_lossy(bytes);
    let text = text.strip_prefix(UTF8_BOM).unwrap_or(&text);

    match serde_json::from_str::<Har>(text) {
        Ok(har) => Ok(Parsed {
            har,
            repaired_text: None,
        }),
        Err(first_err) => {
            let fixed = repair(text);
            if fixed == text {
                return Err(HarlensError::Parse(first_err.to_string()));
            }
            match serde_json::from_str::<Har>(&fixed) {
                Ok(har) => Ok(Parsed {
                    har,
                    repaired_text: Some(fixed),
                }),
                Err(_) => Err(HarlensError::Parse(first_err.to_string())),
            }
        }
    }
}

/// Load a HAR file from disk, repairing mid-write corruption when possible.
///
/// No lock is taken; the recorder may still be appending. Each call reads a
/// fresh snapshot. When repair fired, the corrected text is written back so
/// the next reader sees a clean file; that write-back is fire-and-forget and
/// a failure there never fails the read that already succeeded in memory.
pub fn load_har_file(path: &Path) -> Result<Har> {
    let bytes = fs::read(path)?;
    let parsed = parse_har_bytes(&bytes)?;
    if let Some(fixed) = parsed.repaired_text {
        if let Err(err) = fs::write(path, &fixed) {
            eprintln!(
                "harlens: could not write repaired capture {}: {}",
                path.display(),
                err
            );
        }
    }
    Ok(parsed.har)
}
