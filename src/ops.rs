//! Named-operation surface for external tool layers.
//!
//! Each operation takes a JSON argument object and returns either a JSON
//! result or a flagged [`ErrorPayload`] — never a fault, so one corrupt
//! capture cannot take down a long-running analysis host. Argument shapes
//! are serde structs with `deny_unknown_fields`; anything malformed is a
//! `Validation` error at the boundary, not a silent ignore.

use serde::Deserialize;
use serde_json::{json, Value};

use crate::error::{ErrorPayload, HarlensError, Result};
use crate::har::model::Entry;
use crate::live::LiveTracker;
use crate::resolver::Resolver;
use crate::search::{self, SearchCriteria, SearchMatch};
use crate::stats;

/// The analysis engine: the resolver plus the single long-lived live
/// tracker. Constructed once at startup and handed to the host.
pub struct Engine {
    resolver: Resolver,
    tracker: LiveTracker,
}

#[derive(Deserialize)]
#[serde(deny_unknown_fields)]
struct ListArgs {
    #[serde(default)]
    pattern: Option<String>,
}

#[derive(Deserialize)]
#[serde(deny_unknown_fields)]
struct NameArgs {
    name: String,
}

#[derive(Deserialize)]
#[serde(deny_unknown_fields)]
struct SearchArgs {
    name: String,
    #[serde(default)]
    criteria: SearchCriteria,
}

#[derive(Deserialize)]
#[serde(deny_unknown_fields)]
struct NavigateArgs {
    name: String,
    index: usize,
}

impl Engine {
    pub fn new(resolver: Resolver, tracker: LiveTracker) -> Self {
        Engine { resolver, tracker }
    }

    pub fn resolver(&self) -> &Resolver {
        &self.resolver
    }

    pub fn tracker(&self) -> &LiveTracker {
        &self.tracker
    }

    // Recorder-facing surface. These are callbacks from the capture
    // process and must never fail.

    pub fn start_live_capture(&mut self, session_id: &str) {
        self.tracker.start_session(session_id);
    }

    pub fn add_live_entry(&mut self, entry: Entry) {
        self.tracker.add(entry);
    }

    pub fn stop_live_capture(&mut self) {
        self.tracker.stop_session();
    }

    /// Dispatch one named operation. The returned value is either the
    /// operation result or the structured error payload.
    pub fn dispatch(&self, op: &str, args: Value) -> Value {
        match self.run(op, args) {
            Ok(value) => value,
            Err(err) => match serde_json::to_value(ErrorPayload::from(&err)) {
                Ok(payload) => payload,
                Err(_) => json!({
                    "error": true,
                    "kind": err.kind(),
                    "message": err.to_string(),
                }),
            },
        }
    }

    fn run(&self, op: &str, args: Value) -> Result<Value> {
        match op {
            "list_captures" => {
                let args: ListArgs = parse_args(args)?;
                let rows = self.resolver.list_captures(args.pattern.as_deref())?;
                to_value(&rows)
            }
            "get_summary" => {
                let entries = self.named_entries(args)?;
                to_value(&stats::summarize(&entries))
            }
            "group_by_status" => {
                let entries = self.named_entries(args)?;
                to_value(&stats::group_by_status(&entries))
            }
            "group_by_size" => {
                let entries = self.named_entries(args)?;
                to_value(&stats::group_by_size(&entries))
            }
            "group_by_duration" => {
                let entries = self.named_entries(args)?;
                to_value(&stats::group_by_duration(&entries))
            }
            "group_by_method" => {
                let entries = self.named_entries(args)?;
                to_value(&stats::group_by_method(&entries))
            }
            "find_auth_failures" => {
                let entries = self.named_entries(args)?;
                let views: Vec<EntryView> = stats::find_auth_failures(&entries)
                    .into_iter()
                    .map(|(index, entry)| EntryView::new(index, entry))
                    .collect();
                to_value(&views)
            }
            "investigate_failures" => {
                let entries = self.named_entries(args)?;
                self.investigate_failures(&entries)
            }
            "search" => {
                let args: SearchArgs = parse_args(args)?;
                let compiled = args.criteria.compile()?;
                let entries = self.entries_for(&args.name)?;
                let views: Vec<MatchView> = search::search(&entries, &compiled)
                    .into_iter()
                    .map(MatchView::from)
                    .collect();
                to_value(&views)
            }
            "resolve_entry" => {
                let args: NavigateArgs = parse_args(args)?;
                let (path, index) =
                    self.resolver
                        .entry_location(&args.name, args.index, &self.tracker)?;
                Ok(json!({ "path": path, "index": index }))
            }
            other => Err(HarlensError::Validation(format!(
                "unknown operation '{other}'"
            ))),
        }
    }

    fn named_entries(&self, args: Value) -> Result<Vec<Entry>> {
        let args: NameArgs = parse_args(args)?;
        self.entries_for(&args.name)
    }

    fn entries_for(&self, name: &str) -> Result<Vec<Entry>> {
        Ok(self.resolver.resolve(name, &self.tracker)?.entries)
    }

    /// Failure triage in one call: every 4xx/5xx entry, counts per status,
    /// and the slowest failures first so the worst offenders lead.
    fn investigate_failures(&self, entries: &[Entry]) -> Result<Value> {
        let failures = search::find_failures(entries);
        let failed: Vec<Entry> = failures.iter().map(|m| m.entry.clone()).collect();
        let by_status = stats::group_by_status(&failed);
        let mut slowest: Vec<MatchView> = failures.into_iter().map(MatchView::from).collect();
        slowest.sort_by(|a, b| b.entry.time_ms.total_cmp(&a.entry.time_ms));
        let total = slowest.len();
        slowest.truncate(10);
        Ok(json!({
            "total_failures": total,
            "by_status": serde_json::to_value(&by_status)
                .map_err(|e| HarlensError::Parse(e.to_string()))?,
            "slowest_failures": serde_json::to_value(&slowest)
                .map_err(|e| HarlensError::Parse(e.to_string()))?,
        }))
    }
}

/// Compact entry projection used in operation results instead of the full
/// HAR entry.
#[derive(Debug, serde::Serialize)]
pub struct EntryView {
    pub index: usize,
    pub method: String,
    pub url: String,
    pub status: i64,
    pub time_ms: f64,
    pub size: Option<i64>,
    pub mime_type: Option<String>,
    pub started_date_time: String,
}

impl EntryView {
    pub fn new(index: usize, entry: &Entry) -> Self {
        EntryView {
            index,
            method: entry.request.method.clone(),
            url: entry.request.url.clone(),
            status: entry.response.status,
            time_ms: entry.time,
            size: entry.content_size(),
            mime_type: entry.response.content.mime_type.clone(),
            started_date_time: entry.started_date_time.clone(),
        }
    }
}

#[derive(Debug, serde::Serialize)]
pub struct MatchView {
    #[serde(flatten)]
    pub entry: EntryView,
    pub match_reasons: Vec<String>,
}

impl From<SearchMatch<'_>> for MatchView {
    fn from(m: SearchMatch<'_>) -> Self {
        MatchView {
            entry: EntryView::new(m.index, m.entry),
            match_reasons: m.match_reasons,
        }
    }
}

fn parse_args<T: serde::de::DeserializeOwned>(args: Value) -> Result<T> {
    serde_json::from_value(args)
        .map_err(|err| HarlensError::Validation(format!("invalid arguments: {err}")))
}

fn to_value<T: serde::Serialize>(value: &T) -> Result<Value> {
    serde_json::to_value(value).map_err(|err| HarlensError::Parse(err.to_string()))
}
