use std::collections::BTreeMap;

use crate::commands::print_json;
use crate::error::{HarlensError, Result};
use crate::ops::{Engine, MatchView};
use crate::search::{self, SearchCriteria};
use crate::size::parse_size_bytes;

/// Flag-level search options as entered on the command line; sizes are in
/// the human format (`"10KB"`), headers as repeated `key=value` pairs.
#[derive(Debug, Default)]
pub struct SearchOptions {
    pub url: Option<String>,
    pub url_regex: Option<String>,
    pub method: Option<String>,
    pub status: Option<i64>,
    pub status_min: Option<i64>,
    pub status_max: Option<i64>,
    pub min_duration: Option<f64>,
    pub max_duration: Option<f64>,
    pub min_size: Option<String>,
    pub max_size: Option<String>,
    pub header: Vec<String>,
    pub content_type: Option<String>,
    pub traceparent: Option<String>,
}

impl SearchOptions {
    /// Lower the flag set into engine criteria, validating as we go.
    pub fn to_criteria(&self) -> Result<SearchCriteria> {
        let status_range = match (self.status_min, self.status_max) {
            (None, None) => None,
            (min, max) => Some([min.unwrap_or(0), max.unwrap_or(999)]),
        };
        let headers = if self.header.is_empty() {
            None
        } else {
            let mut map = BTreeMap::new();
            for pair in &self.header {
                let (name, value) = pair.split_once('=').ok_or_else(|| {
                    HarlensError::Validation(format!(
                        "invalid --header '{pair}'; expected key=value"
                    ))
                })?;
                map.insert(name.trim().to_string(), value.trim().to_string());
            }
            Some(map)
        };

        Ok(SearchCriteria {
            url: self.url.clone(),
            url_regex: self.url_regex.clone(),
            method: self.method.clone(),
            status_code: self.status,
            status_range,
            min_duration: self.min_duration,
            max_duration: self.max_duration,
            min_size: self.min_size.as_deref().map(parse_size_bytes).transpose()?,
            max_size: self.max_size.as_deref().map(parse_size_bytes).transpose()?,
            headers,
            content_type: self.content_type.clone(),
            traceparent: self.traceparent.clone(),
        })
    }
}

/// Multi-criteria search over one capture.
pub fn run_search(engine: &Engine, name: &str, options: &SearchOptions, json: bool) -> Result<()> {
    let compiled = options.to_criteria()?.compile()?;
    let resolved = engine.resolver().resolve(name, engine.tracker())?;
    let matches: Vec<MatchView> = search::search(&resolved.entries, &compiled)
        .into_iter()
        .map(MatchView::from)
        .collect();

    if json {
        return print_json(&matches);
    }

    if matches.is_empty() {
        println!("no matching entries");
        return Ok(());
    }
    for m in &matches {
        println!(
            "[{:>4}] {:>3} {:<6} {:>9.1}ms  {}",
            m.entry.index, m.entry.status, m.entry.method, m.entry.time_ms, m.entry.url
        );
        for reason in &m.match_reasons {
            println!("       - {reason}");
        }
    }
    Ok(())
}
