//! Best-effort structural repair for HAR documents read mid-write.
//!
//! A capture file may be truncated or double-appended while the recorder is
//! still flushing it. The corruption that produces is confined to comma and
//! bracket structure, so repair only addresses that level: comma runs between
//! sibling objects, a trailing comma before a closing `]`, and missing
//! closers at the end of the document. Every pass tracks `"`-delimited
//! string state and backslash escapes character by character and never
//! rewrites inside a string. Corruption inside a string (an unterminated
//! string literal, for example) is left untouched so the caller surfaces the
//! original parse error instead of a guessed fix.

/// String-literal scan state shared by all repair passes.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum ScanState {
    Normal,
    InString,
    Escaped,
}

impl ScanState {
    fn step(self, ch: char) -> ScanState {
        match self {
            ScanState::Normal => {
                if ch == '"' {
                    ScanState::InString
                } else {
                    ScanState::Normal
                }
            }
            ScanState::InString => match ch {
                '\\' => ScanState::Escaped,
                '"' => ScanState::Normal,
                _ => ScanState::InString,
            },
            ScanState::Escaped => ScanState::InString,
        }
    }
}

/// Apply all repair heuristics in order. Idempotent on well-formed input.
pub fn repair(text: &str) -> String {
    let collapsed = collapse_comma_runs(text);
    let stripped = strip_trailing_array_commas(&collapsed);
    close_open_brackets(&stripped)
}

/// Collapse `}, , , {` style comma runs outside strings into a single comma.
fn collapse_comma_runs(text: &str) -> String {
    let chars: Vec<char> = text.chars().collect();
    let mut out = String::with_capacity(text.len());
    let mut state = ScanState::Normal;
    let mut i = 0;

    while i < chars.len() {
        let ch = chars[i];
        if state == ScanState::Normal && ch == ',' {
            // Look ahead over whitespace and further commas.
            let mut j = i + 1;
            let mut extra_commas = 0;
            while j < chars.len() && (chars[j].is_whitespace() || chars[j] == ',') {
                if chars[j] == ',' {
                    extra_commas += 1;
                }
                j += 1;
            }
            if extra_commas > 0 {
                out.push(',');
                out.push('\n');
                i = j;
                continue;
            }
        }
        state = state.step(ch);
        out.push(ch);
        i += 1;
    }

    out
}

/// Remove a comma immediately (modulo whitespace) before a closing `]`.
fn strip_trailing_array_commas(text: &str) -> String {
    let chars: Vec<char> = text.chars().collect();
    let mut out = String::with_capacity(text.len());
    let mut state = ScanState::Normal;
    let mut i = 0;

    while i < chars.len() {
        let ch = chars[i];
        if state == ScanState::Normal && ch == ',' {
            let mut j = i + 1;
            while j < chars.len() && chars[j].is_whitespace() {
                j += 1;
            }
            if j < chars.len() && chars[j] == ']' {
                // Drop the comma, keep the whitespace run.
                i += 1;
                continue;
            }
        }
        state = state.step(ch);
        out.push(ch);
        i += 1;
    }

    out
}

/// Append the closers a truncated document is missing.
///
/// The open-delimiter stack is tracked outside strings, so the appended
/// closers reflect the document's own nesting order (the entries array closes
/// before the log object). A document that ends inside a string is returned
/// unchanged: that is in-string corruption, not bracket-level corruption.
fn close_open_brackets(text: &str) -> String {
    let mut state = ScanState::Normal;
    let mut stack: Vec<char> = Vec::new();

    for ch in text.chars() {
        if state == ScanState::Normal {
            match ch {
                '{' | '[' => stack.push(ch),
                '}' => {
                    if stack.last() == Some(&'{') {
                        stack.pop();
                    }
                }
                ']' => {
                    if stack.last() == Some(&'[') {
                        stack.pop();
                    }
                }
                _ => {}
            }
        }
        state = state.step(ch);
    }

    if stack.is_empty() || state != ScanState::Normal {
        return text.to_string();
    }

    let mut out = text.trim_end().to_string();
    if out.ends_with(',') {
        out.pop();
    }
    for open in stack.iter().rev() {
        out.push(match open {
            '[' => ']',
            _ => '}',
        });
    }
    out
}

#[cfg(test)]
mod tests {
    use super::repair;

    #[test]
    fn well_formed_document_is_untouched() {
        let text = r#"{"log":{"version":"1.2","entries":[{"time":1.5}]}}"#;
        assert_eq!(repair(text), text);
    }

    #[test]
    fn collapses_comma_runs_between_siblings() {
        let text = r#"[{"a":1}, , ,{"b":2}]"#;
        let fixed = repair(text);
        assert_eq!(fixed, "[{\"a\":1},\n{\"b\":2}]");
        assert!(serde_json::from_str::<serde_json::Value>(&fixed).is_ok());
    }

    #[test]
    fn strips_trailing_comma_before_array_close() {
        let text = r#"{"entries":[{"a":1},]}"#;
        let fixed = repair(text);
        assert!(serde_json::from_str::<serde_json::Value>(&fixed).is_ok());
        assert!(!fixed.contains(",]"));
    }

    #[test]
    fn closes_truncated_document() {
        let text = r#"{"log":{"entries":[{"time":1.5},"#;
        let fixed = repair(text);
        assert_eq!(fixed, r#"{"log":{"entries":[{"time":1.5}]}}"#);
    }

    #[test]
    fn closers_follow_nesting_order() {
        let text = r#"{"log":{"entries":[{"a":[1,2"#;
        let fixed = repair(text);
        assert!(fixed.ends_with("]}]}}"));
        assert!(serde_json::from_str::<serde_json::Value>(&fixed).is_ok());
    }

    #[test]
    fn never_rewrites_inside_strings() {
        let text = r#"{"note":"}, , ,{ and ,] stay verbatim"}"#;
        assert_eq!(repair(text), text);
    }

    #[test]
    fn escaped_quote_does_not_end_string_state() {
        let text = r#"{"note":"a \" ,, b"}"#;
        assert_eq!(repair(text), text);
    }

    #[test]
    fn unterminated_string_is_not_a_repair_target() {
        // Truncation landed mid-string; bracket counting would guess wrong,
        // so the text comes back unchanged and parsing fails upstream.
        let text = r#"{"log":{"entries":[{"body":"dG9rZW"#;
        assert_eq!(repair(text), text);
    }

    #[test]
    fn repair_is_idempotent() {
        let corrupt = r#"{"log":{"entries":[{"a":1}, , ,{"b":2},"#;
        let once = repair(corrupt);
        assert_eq!(repair(&once), once);
    }
}
