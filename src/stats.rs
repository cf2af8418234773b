//! Statistics over captured entries.
//!
//! Pure functions: an entry slice in, a serializable report out. Unknown
//! sizes (`-1`) are excluded from every size-based figure, never counted as
//! zero; unknown timing fields likewise stay out of aggregates.

use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use serde::Serialize;

use crate::har::model::Entry;

/// Size histogram buckets, inclusive-lower/exclusive-upper except the last.
pub const SIZE_BUCKETS: [(&str, i64, i64); 5] = [
    ("0-1KB", 0, 1_024),
    ("1KB-10KB", 1_024, 10_240),
    ("10KB-100KB", 10_240, 102_400),
    ("100KB-1MB", 102_400, 1_048_576),
    ("1MB+", 1_048_576, i64::MAX),
];

/// Duration histogram buckets in milliseconds.
pub const DURATION_BUCKETS: [(&str, f64, f64); 4] = [
    ("0-100ms", 0.0, 100.0),
    ("100ms-1s", 100.0, 1_000.0),
    ("1s-10s", 1_000.0, 10_000.0),
    ("10s+", 10_000.0, f64::INFINITY),
];

#[derive(Debug, Clone, Serialize)]
pub struct StatusBucket {
    pub count: usize,
    pub avg_duration_ms: f64,
}

/// Exact status code -> count and average duration. The counts across
/// buckets always sum to the entry count.
pub fn group_by_status(entries: &[Entry]) -> BTreeMap<i64, StatusBucket> {
    let mut sums: BTreeMap<i64, (usize, f64)> = BTreeMap::new();
    for entry in entries {
        let slot = sums.entry(entry.response.status).or_insert((0, 0.0));
        slot.0 += 1;
        slot.1 += entry.time;
    }
    sums.into_iter()
        .map(|(status, (count, total))| {
            (
                status,
                StatusBucket {
                    count,
                    avg_duration_ms: total / count as f64,
                },
            )
        })
        .collect()
}

/// Fixed-bucket histogram over `response.content.size`. Entries whose size
/// is unknown are left out entirely.
pub fn group_by_size(entries: &[Entry]) -> BTreeMap<String, usize> {
    let mut buckets: BTreeMap<String, usize> = SIZE_BUCKETS
        .iter()
        .map(|(label, _, _)| (label.to_string(), 0))
        .collect();
    for entry in entries {
        let Some(size) = entry.content_size() else {
            continue;
        };
        for (label, lo, hi) in SIZE_BUCKETS {
            if size >= lo && (size < hi || hi == i64::MAX) {
                *buckets.entry(label.to_string()).or_insert(0) += 1;
                break;
            }
        }
    }
    buckets
}

/// Fixed-bucket histogram over total entry duration.
pub fn group_by_duration(entries: &[Entry]) -> BTreeMap<String, usize> {
    let mut buckets: BTreeMap<String, usize> = DURATION_BUCKETS
        .iter()
        .map(|(label, _, _)| (label.to_string(), 0))
        .collect();
    for entry in entries {
        for (label, lo, hi) in DURATION_BUCKETS {
            if entry.time >= lo && entry.time < hi {
                *buckets.entry(label.to_string()).or_insert(0) += 1;
                break;
            }
        }
    }
    buckets
}

/// HTTP method -> count, methods case-preserved as captured.
pub fn group_by_method(entries: &[Entry]) -> BTreeMap<String, usize> {
    let mut counts = BTreeMap::new();
    for entry in entries {
        *counts.entry(entry.request.method.clone()).or_insert(0) += 1;
    }
    counts
}

#[derive(Debug, Clone, Copy, Default, Serialize)]
pub struct DurationPercentiles {
    pub p50: f64,
    pub p75: f64,
    pub p90: f64,
    pub p95: f64,
    pub p99: f64,
}

/// Nearest-rank percentile: element at rank `ceil(p/100 * n) - 1` of the
/// ascending-sorted durations, clamped to the valid range. Deterministic,
/// no interpolation; p=0 is the minimum and p=100 the maximum.
pub fn percentile(sorted: &[f64], p: f64) -> f64 {
    if sorted.is_empty() {
        return 0.0;
    }
    let n = sorted.len();
    let rank = ((p / 100.0) * n as f64).ceil() as i64 - 1;
    let idx = rank.clamp(0, n as i64 - 1) as usize;
    sorted[idx]
}

pub fn duration_percentiles(entries: &[Entry]) -> DurationPercentiles {
    let mut durations: Vec<f64> = entries.iter().map(|e| e.time).collect();
    durations.sort_by(|a, b| a.total_cmp(b));
    DurationPercentiles {
        p50: percentile(&durations, 50.0),
        p75: percentile(&durations, 75.0),
        p90: percentile(&durations, 90.0),
        p95: percentile(&durations, 95.0),
        p99: percentile(&durations, 99.0),
    }
}

/// Total bytes on the wire: request and response header and body sizes
/// summed over all entries. Negative (unknown) fields contribute 0.
pub fn total_bandwidth(entries: &[Entry]) -> i64 {
    fn known(v: i64) -> i64 {
        if v >= 0 {
            v
        } else {
            0
        }
    }
    entries
        .iter()
        .map(|e| {
            known(e.request.body_size)
                + known(e.request.headers_size)
                + known(e.response.body_size)
                + known(e.response.headers_size)
        })
        .sum()
}

/// Top-n entries by duration, descending, ties broken by original index.
pub fn find_slowest(entries: &[Entry], n: usize) -> Vec<(usize, &Entry)> {
    let mut ranked: Vec<(usize, &Entry)> = entries.iter().enumerate().collect();
    ranked.sort_by(|a, b| b.1.time.total_cmp(&a.1.time).then(a.0.cmp(&b.0)));
    ranked.truncate(n);
    ranked
}

/// Top-n entries by response content size, descending; unknown sizes rank
/// below every known size.
pub fn find_largest(entries: &[Entry], n: usize) -> Vec<(usize, &Entry)> {
    let mut ranked: Vec<(usize, &Entry)> = entries.iter().enumerate().collect();
    ranked.sort_by(|a, b| {
        b.1.content_size()
            .unwrap_or(i64::MIN)
            .cmp(&a.1.content_size().unwrap_or(i64::MIN))
            .then(a.0.cmp(&b.0))
    });
    ranked.truncate(n);
    ranked
}

/// Entries that failed authentication or authorization (401/403).
pub fn find_auth_failures(entries: &[Entry]) -> Vec<(usize, &Entry)> {
    entries
        .iter()
        .enumerate()
        .filter(|(_, e)| e.response.status == 401 || e.response.status == 403)
        .collect()
}

#[derive(Debug, Clone, Default, Serialize)]
pub struct TimeRange {
    pub earliest: Option<String>,
    pub latest: Option<String>,
}

/// Earliest and latest `startedDateTime` across the capture. Timestamps
/// that parse as RFC 3339 are ordered as instants; any that do not parse
/// order lexically below every parseable stamp. The sort key is a
/// `(parsed, raw)` tuple so the comparator stays a total order even when a
/// sloppy recorder mixes good and garbage stamps.
pub fn time_range(entries: &[Entry]) -> TimeRange {
    let mut stamped: Vec<&str> = entries
        .iter()
        .map(|e| e.started_date_time.as_str())
        .filter(|s| !s.is_empty())
        .collect();
    if stamped.is_empty() {
        return TimeRange::default();
    }
    stamped.sort_by(|a, b| (parse_instant(a), *a).cmp(&(parse_instant(b), *b)));
    TimeRange {
        earliest: stamped.first().map(|s| s.to_string()),
        latest: stamped.last().map(|s| s.to_string()),
    }
}

fn parse_instant(s: &str) -> Option<DateTime<Utc>> {
    DateTime::parse_from_rfc3339(s)
        .ok()
        .map(|dt| dt.with_timezone(&Utc))
}

/// One-call overview powering `get_summary` and the live tracker summary.
#[derive(Debug, Serialize)]
pub struct Summary {
    pub entries: usize,
    pub methods: BTreeMap<String, usize>,
    pub statuses: BTreeMap<i64, StatusBucket>,
    pub unique_hosts: usize,
    pub total_bandwidth_bytes: i64,
    pub percentiles: DurationPercentiles,
    pub time_range: TimeRange,
    pub failures: usize,
}

pub fn summarize(entries: &[Entry]) -> Summary {
    let mut hosts: Vec<String> = entries
        .iter()
        .filter_map(|e| url::Url::parse(&e.request.url).ok())
        .filter_map(|u| u.host_str().map(|h| h.to_string()))
        .collect();
    hosts.sort();
    hosts.dedup();

    Summary {
        entries: entries.len(),
        methods: group_by_method(entries),
        statuses: group_by_status(entries),
        unique_hosts: hosts.len(),
        total_bandwidth_bytes: total_bandwidth(entries),
        percentiles: duration_percentiles(entries),
        time_range: time_range(entries),
        failures: entries.iter().filter(|e| e.response.is_failure()).count(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::har::model::{Content, Entry, Request, Response};

    fn entry(status: i64, time: f64, size: i64) -> Entry {
        Entry {
            started_date_time: String::new(),
            time,
            request: Request {
                method: "GET".to_string(),
                url: "https://api.example.com/items".to_string(),
                http_version: "HTTP/1.1".to_string(),
                headers: Vec::new(),
                cookies: Vec::new(),
                query_string: Vec::new(),
                post_data: None,
                headers_size: 100,
                body_size: 0,
            },
            response: Response {
                status,
                status_text: String::new(),
                headers: Vec::new(),
                content: Content {
                    size,
                    ..Content::default()
                },
                redirect_url: String::new(),
                headers_size: 200,
                body_size: size.max(0),
            },
            cache: None,
            timings: None,
            server_ip_address: None,
            connection: None,
        }
    }

    #[test]
    fn status_bucket_counts_sum_to_entry_count() {
        let entries = vec![
            entry(200, 50.0, 10),
            entry(404, 900.0, 10),
            entry(500, 20.0, 10),
            entry(200, 10.0, 10),
        ];
        let groups = group_by_status(&entries);
        let total: usize = groups.values().map(|b| b.count).sum();
        assert_eq!(total, entries.len());
        assert_eq!(groups[&200].count, 2);
        assert_eq!(groups[&404].count, 1);
    }

    #[test]
    fn size_buckets_exclude_unknown_sizes() {
        let entries = vec![
            entry(200, 1.0, 0),
            entry(200, 1.0, 1_023),
            entry(200, 1.0, 1_024),
            entry(200, 1.0, -1),
            entry(200, 1.0, 2_000_000),
        ];
        let groups = group_by_size(&entries);
        assert_eq!(groups["0-1KB"], 2);
        assert_eq!(groups["1KB-10KB"], 1);
        assert_eq!(groups["1MB+"], 1);
        let total: usize = groups.values().sum();
        assert_eq!(total, 4);
    }

    #[test]
    fn duration_bucket_boundaries_are_half_open() {
        let entries = vec![
            entry(200, 0.0, 0),
            entry(200, 99.9, 0),
            entry(200, 100.0, 0),
            entry(200, 10_000.0, 0),
        ];
        let groups = group_by_duration(&entries);
        assert_eq!(groups["0-100ms"], 2);
        assert_eq!(groups["100ms-1s"], 1);
        assert_eq!(groups["10s+"], 1);
    }

    #[test]
    fn nearest_rank_percentile_boundaries() {
        let sorted = [20.0, 50.0, 900.0];
        assert_eq!(percentile(&sorted, 0.0), 20.0);
        assert_eq!(percentile(&sorted, 100.0), 900.0);
        // ceil(0.5 * 3) - 1 = 1 -> the median sample.
        assert_eq!(percentile(&sorted, 50.0), 50.0);
    }

    #[test]
    fn empty_input_percentiles_are_zero() {
        let p = duration_percentiles(&[]);
        assert_eq!(p.p50, 0.0);
        assert_eq!(p.p99, 0.0);
    }

    #[test]
    fn bandwidth_ignores_unknown_fields() {
        let mut a = entry(200, 1.0, 100);
        a.request.headers_size = -1;
        a.response.headers_size = -1;
        a.request.body_size = 40;
        a.response.body_size = 60;
        assert_eq!(total_bandwidth(&[a]), 100);
    }

    #[test]
    fn slowest_is_stable_on_ties() {
        let entries = vec![entry(200, 5.0, 0), entry(200, 9.0, 0), entry(200, 9.0, 0)];
        let top = find_slowest(&entries, 2);
        assert_eq!(top[0].0, 1);
        assert_eq!(top[1].0, 2);
    }

    #[test]
    fn auth_failures_are_401_and_403_only() {
        let entries = vec![entry(200, 1.0, 0), entry(401, 1.0, 0), entry(403, 1.0, 0), entry(500, 1.0, 0)];
        let hits = find_auth_failures(&entries);
        let statuses: Vec<i64> = hits.iter().map(|(_, e)| e.response.status).collect();
        assert_eq!(statuses, vec![401, 403]);
    }

    #[test]
    fn time_range_empty_input_is_none() {
        let range = time_range(&[]);
        assert!(range.earliest.is_none());
        assert!(range.latest.is_none());
    }

    #[test]
    fn time_range_orders_rfc3339_instants() {
        let mut a = entry(200, 1.0, 0);
        a.started_date_time = "2024-01-15T10:30:00.000Z".to_string();
        let mut b = entry(200, 1.0, 0);
        b.started_date_time = "2024-01-15T09:00:00.000Z".to_string();
        let range = time_range(&[a, b]);
        assert_eq!(range.earliest.as_deref(), Some("2024-01-15T09:00:00.000Z"));
        assert_eq!(range.latest.as_deref(), Some("2024-01-15T10:30:00.000Z"));
    }

    #[test]
    fn time_range_is_stable_with_mixed_and_offset_stamps() {
        let stamps = [
            "2024-01-15T12:00:00+02:00", // 10:00Z
            "garbage",
            "2024-01-15T11:00:00Z",
            "also-not-a-date",
            "2024-01-15T09:30:00Z",
        ];
        let forward: Vec<Entry> = stamps
            .iter()
            .map(|s| {
                let mut e = entry(200, 1.0, 0);
                e.started_date_time = s.to_string();
                e
            })
            .collect();
        let mut reversed = forward.clone();
        reversed.reverse();

        let a = time_range(&forward);
        let b = time_range(&reversed);
        assert_eq!(a.earliest, b.earliest);
        assert_eq!(a.latest, b.latest);
        // Unparseable stamps order below every parseable instant, and the
        // +02:00 offset stamp is older than 11:00Z despite its local time.
        assert_eq!(a.earliest.as_deref(), Some("also-not-a-date"));
        assert_eq!(a.latest.as_deref(), Some("2024-01-15T11:00:00Z"));
    }

    #[test]
    fn summary_counts_hosts_and_failures() {
        let mut a = entry(200, 1.0, 10);
        a.request.url = "https://one.example.com/x".to_string();
        let mut b = entry(503, 1.0, 10);
        b.request.url = "https://two.example.com/y".to_string();
        let summary = summarize(&[a, b]);
        assert_eq!(summary.entries, 2);
        assert_eq!(summary.unique_hosts, 2);
        assert_eq!(summary.failures, 1);
    }
}
