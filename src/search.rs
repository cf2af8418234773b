//! Multi-criteria entry search.
//!
//! Callers hand over a `SearchCriteria` (usually deserialized from a JSON
//! argument object); all provided predicates must hold for an entry to
//! match. Criteria are validated and compiled once up front so an invalid
//! regex or inverted range is a `Validation` error, never a silent
//! non-match.

use regex::{Regex, RegexBuilder};
use serde::Deserialize;
use std::collections::BTreeMap;

use crate::error::{HarlensError, Result};
use crate::har::model::Entry;

/// Optional predicates combined with logical AND. An empty criteria object
/// matches every entry. Unknown fields are rejected at the boundary.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct SearchCriteria {
    /// Case-insensitive substring of the request URL.
    pub url: Option<String>,
    /// Regex tested against the request URL.
    pub url_regex: Option<String>,
    /// Case-insensitive exact method match.
    pub method: Option<String>,
    /// Exact status code.
    pub status_code: Option<i64>,
    /// Inclusive [min, max] status range.
    pub status_range: Option<[i64; 2]>,
    /// Inclusive duration bounds in milliseconds.
    pub min_duration: Option<f64>,
    pub max_duration: Option<f64>,
    /// Inclusive response content size bounds; unknown (-1) sizes never
    /// satisfy a size bound.
    pub min_size: Option<i64>,
    pub max_size: Option<i64>,
    /// Request header key -> exact value (keys matched case-insensitively).
    pub headers: Option<BTreeMap<String, String>>,
    /// Case-insensitive prefix of the response MIME type.
    pub content_type: Option<String>,
    /// Substring of the trace-id component of a traceparent-style header.
    pub traceparent: Option<String>,
}

impl SearchCriteria {
    /// Validate and compile into a matcher. All shape errors surface here.
    pub fn compile(&self) -> Result<CompiledCriteria> {
        let url_regex = match self.url_regex.as_deref() {
            Some(pattern) => Some(Regex::new(pattern).map_err(|err| {
                HarlensError::Validation(format!("invalid urlRegex '{pattern}': {err}"))
            })?),
            None => None,
        };
        if let Some([min, max]) = self.status_range {
            if min > max {
                return Err(HarlensError::Validation(format!(
                    "statusRange min {min} exceeds max {max}"
                )));
            }
        }
        if let (Some(min), Some(max)) = (self.min_duration, self.max_duration) {
            if min > max {
                return Err(HarlensError::Validation(
                    "minDuration exceeds maxDuration".to_string(),
                ));
            }
        }
        if let (Some(min), Some(max)) = (self.min_size, self.max_size) {
            if min > max {
                return Err(HarlensError::Validation(
                    "minSize exceeds maxSize".to_string(),
                ));
            }
        }
        let content_type = match self.content_type.as_deref() {
            // Anchored case-insensitive prefix, so "application/json" also
            // matches "application/json; charset=utf-8".
            Some(prefix) => Some(
                RegexBuilder::new(&format!("^{}", regex::escape(prefix)))
                    .case_insensitive(true)
                    .build()
                    .map_err(|err| HarlensError::Validation(err.to_string()))?,
            ),
            None => None,
        };
        Ok(CompiledCriteria {
            criteria: self.clone(),
            url_regex,
            content_type,
        })
    }
}

#[derive(Debug)]
pub struct CompiledCriteria {
    criteria: SearchCriteria,
    url_regex: Option<Regex>,
    content_type: Option<Regex>,
}

/// One matched entry with the reasons each supplied predicate held.
#[derive(Debug)]
pub struct SearchMatch<'a> {
    pub index: usize,
    pub entry: &'a Entry,
    pub match_reasons: Vec<String>,
}

/// Filter entries by the compiled predicate set, AND semantics.
pub fn search<'a>(entries: &'a [Entry], compiled: &CompiledCriteria) -> Vec<SearchMatch<'a>> {
    entries
        .iter()
        .enumerate()
        .filter_map(|(index, entry)| {
            match_entry(entry, compiled).map(|match_reasons| SearchMatch {
                index,
                entry,
                match_reasons,
            })
        })
        .collect()
}

/// Convenience search for all 4xx/5xx responses.
pub fn find_failures(entries: &[Entry]) -> Vec<SearchMatch<'_>> {
    entries
        .iter()
        .enumerate()
        .filter(|(_, e)| e.response.is_failure())
        .map(|(index, entry)| SearchMatch {
            index,
            entry,
            match_reasons: vec![format!("status {} is a failure", entry.response.status)],
        })
        .collect()
}

fn match_entry(entry: &Entry, compiled: &CompiledCriteria) -> Option<Vec<String>> {
    let c = &compiled.criteria;
    let mut reasons = Vec::new();

    if let Some(needle) = c.url.as_deref() {
        if !entry
            .request
            .url
            .to_lowercase()
            .contains(&needle.to_lowercase())
        {
            return None;
        }
        reasons.push(format!("url contains '{needle}'"));
    }
    if let Some(re) = &compiled.url_regex {
        if !re.is_match(&entry.request.url) {
            return None;
        }
        reasons.push(format!("url matches /{}/", re.as_str()));
    }
    if let Some(method) = c.method.as_deref() {
        if !entry.request.method.eq_ignore_ascii_case(method) {
            return None;
        }
        reasons.push(format!("method is {}", entry.request.method));
    }
    if let Some(code) = c.status_code {
        if entry.response.status != code {
            return None;
        }
        reasons.push(format!("status is {code}"));
    }
    if let Some([min, max]) = c.status_range {
        if entry.response.status < min || entry.response.status > max {
            return None;
        }
        reasons.push(format!("status in [{min}, {max}]"));
    }
    if let Some(min) = c.min_duration {
        if entry.time < min {
            return None;
        }
        reasons.push(format!("duration >= {min}ms"));
    }
    if let Some(max) = c.max_duration {
        if entry.time > max {
            return None;
        }
        reasons.push(format!("duration <= {max}ms"));
    }
    if c.min_size.is_some() || c.max_size.is_some() {
        // A size bound can only be satisfied by a known size.
        let size = entry.content_size()?;
        if let Some(min) = c.min_size {
            if size < min {
                return None;
            }
            reasons.push(format!("size >= {min}"));
        }
        if let Some(max) = c.max_size {
            if size > max {
                return None;
            }
            reasons.push(format!("size <= {max}"));
        }
    }
    if let Some(headers) = &c.headers {
        for (name, expected) in headers {
            if entry.request_header(name) != Some(expected.as_str()) {
                return None;
            }
            reasons.push(format!("header {name} = {expected}"));
        }
    }
    if let Some(re) = &compiled.content_type {
        let mime = entry.response.content.mime_type.as_deref()?;
        if !re.is_match(mime) {
            return None;
        }
        reasons.push(format!("content type starts with '{}'", c.content_type.as_deref().unwrap_or_default()));
    }
    if let Some(needle) = c.traceparent.as_deref() {
        let trace_id = entry.request_header("traceparent").and_then(trace_id_of)?;
        if !trace_id.contains(needle) {
            return None;
        }
        reasons.push(format!("trace id contains '{needle}'"));
    }

    if reasons.is_empty() {
        reasons.push("matched all criteria".to_string());
    }
    Some(reasons)
}

/// Trace-id component of a `traceparent` value
/// (`version-traceid-spanid-flags`).
fn trace_id_of(value: &str) -> Option<&str> {
    value.split('-').nth(1)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::har::model::{Content, Entry, Header, Request, Response};

    fn entry(method: &str, url: &str, status: i64, time: f64) -> Entry {
        Entry {
            started_date_time: String::new(),
            time,
            request: Request {
                method: method.to_string(),
                url: url.to_string(),
                http_version: "HTTP/1.1".to_string(),
                headers: Vec::new(),
                cookies: Vec::new(),
                query_string: Vec::new(),
                post_data: None,
                headers_size: -1,
                body_size: -1,
            },
            response: Response {
                status,
                status_text: String::new(),
                headers: Vec::new(),
                content: Content::default(),
                redirect_url: String::new(),
                headers_size: -1,
                body_size: -1,
            },
            cache: None,
            timings: None,
            server_ip_address: None,
            connection: None,
        }
    }

    fn compiled(criteria: SearchCriteria) -> CompiledCriteria {
        criteria.compile().expect("criteria should compile")
    }

    #[test]
    fn empty_criteria_matches_everything() {
        let entries = vec![entry("GET", "https://a/", 200, 1.0), entry("POST", "https://b/", 500, 2.0)];
        let hits = search(&entries, &compiled(SearchCriteria::default()));
        assert_eq!(hits.len(), 2);
    }

    #[test]
    fn url_substring_is_case_insensitive() {
        let entries = vec![entry("GET", "https://API.Example.com/Users", 200, 1.0)];
        let criteria = SearchCriteria {
            url: Some("api.example".to_string()),
            ..SearchCriteria::default()
        };
        assert_eq!(search(&entries, &compiled(criteria)).len(), 1);
    }

    #[test]
    fn invalid_regex_is_a_validation_error() {
        let criteria = SearchCriteria {
            url_regex: Some("[unclosed".to_string()),
            ..SearchCriteria::default()
        };
        let err = criteria.compile().unwrap_err();
        assert_eq!(err.kind(), "validation_error");
    }

    #[test]
    fn status_code_and_range_are_exact_and_inclusive() {
        let entries = vec![
            entry("GET", "https://a/", 399, 1.0),
            entry("GET", "https://a/", 400, 1.0),
            entry("GET", "https://a/", 404, 1.0),
            entry("GET", "https://a/", 599, 1.0),
            entry("GET", "https://a/", 600, 1.0),
        ];
        let exact = SearchCriteria {
            status_code: Some(404),
            ..SearchCriteria::default()
        };
        let hits = search(&entries, &compiled(exact));
        assert_eq!(hits.len(), 1);
        assert_eq!(hits[0].entry.response.status, 404);

        let range = SearchCriteria {
            status_range: Some([400, 599]),
            ..SearchCriteria::default()
        };
        let hits = search(&entries, &compiled(range));
        assert!(hits
            .iter()
            .all(|m| (400..=599).contains(&m.entry.response.status)));
        assert_eq!(hits.len(), 3);
    }

    #[test]
    fn unknown_size_never_satisfies_a_size_bound() {
        let mut small = entry("GET", "https://a/", 200, 1.0);
        small.response.content.size = 10;
        let unknown = entry("GET", "https://a/", 200, 1.0);
        assert_eq!(unknown.response.content.size, -1);

        let criteria = SearchCriteria {
            max_size: Some(1_000_000),
            ..SearchCriteria::default()
        };
        let entries = vec![small, unknown];
        let hits = search(&entries, &compiled(criteria));
        assert_eq!(hits.len(), 1);
        assert_eq!(hits[0].index, 0);
    }

    #[test]
    fn content_type_is_a_prefix_match() {
        let mut e = entry("GET", "https://a/", 200, 1.0);
        e.response.content.mime_type = Some("application/json; charset=utf-8".to_string());
        let criteria = SearchCriteria {
            content_type: Some("application/json".to_string()),
            ..SearchCriteria::default()
        };
        assert_eq!(search(&[e], &compiled(criteria)).len(), 1);
    }

    #[test]
    fn header_keys_match_case_insensitively_with_exact_values() {
        let mut e = entry("GET", "https://a/", 200, 1.0);
        e.request.headers.push(Header {
            name: "X-Request-Id".to_string(),
            value: "abc123".to_string(),
        });
        let mut headers = BTreeMap::new();
        headers.insert("x-request-id".to_string(), "abc123".to_string());
        let criteria = SearchCriteria {
            headers: Some(headers),
            ..SearchCriteria::default()
        };
        assert_eq!(search(&[e], &compiled(criteria)).len(), 1);
    }

    #[test]
    fn traceparent_matches_the_trace_id_component() {
        let mut e = entry("GET", "https://a/", 200, 1.0);
        e.request.headers.push(Header {
            name: "traceparent".to_string(),
            value: "00-4bf92f3577b34da6a3ce929d0e0e4736-00f067aa0ba902b7-01".to_string(),
        });
        let criteria = SearchCriteria {
            traceparent: Some("4bf92f35".to_string()),
            ..SearchCriteria::default()
        };
        let hits = search(std::slice::from_ref(&e), &compiled(criteria));
        assert_eq!(hits.len(), 1);

        // The span-id component is not the trace id.
        let criteria = SearchCriteria {
            traceparent: Some("00f067aa".to_string()),
            ..SearchCriteria::default()
        };
        assert!(search(std::slice::from_ref(&e), &compiled(criteria)).is_empty());
    }

    #[test]
    fn predicates_combine_with_and() {
        let entries = vec![
            entry("GET", "https://a/users", 200, 50.0),
            entry("GET", "https://a/users", 404, 50.0),
            entry("POST", "https://a/users", 404, 50.0),
        ];
        let criteria = SearchCriteria {
            method: Some("get".to_string()),
            status_code: Some(404),
            ..SearchCriteria::default()
        };
        let hits = search(&entries, &compiled(criteria));
        assert_eq!(hits.len(), 1);
        assert_eq!(hits[0].index, 1);
        assert_eq!(hits[0].match_reasons.len(), 2);
    }

    #[test]
    fn find_failures_covers_4xx_and_5xx() {
        let entries = vec![
            entry("GET", "https://a/", 200, 50.0),
            entry("GET", "https://a/", 404, 900.0),
            entry("GET", "https://a/", 500, 20.0),
        ];
        let hits = find_failures(&entries);
        let statuses: Vec<i64> = hits.iter().map(|m| m.entry.response.status).collect();
        assert_eq!(statuses, vec![404, 500]);
    }

    #[test]
    fn unknown_criteria_fields_are_rejected() {
        let err = serde_json::from_str::<SearchCriteria>(r#"{"surprise": 1}"#);
        assert!(err.is_err());
    }
}
