//! Stable, supported API surface for embedding harlens.
//!
//! This module re-exports the types and functions intended for external use.
//! Treat the contents of this module as SemVer-stable.

pub use crate::config::{load_config, Config};
pub use crate::error::{ErrorPayload, HarlensError, Result};
pub use crate::har::{
    load_har_file, parse_har_bytes, repair, Content, Cookie, Creator, Entry, Har, Header, Log,
    Parsed, PostData, QueryParam, Request, Response, Timings,
};
pub use crate::live::{LiveTracker, DEFAULT_CAPACITY};
pub use crate::ops::{Engine, EntryView, MatchView};
pub use crate::resolver::{CaptureInfo, Resolved, Resolver, LATEST_ALIAS, LIVE_ALIAS};
pub use crate::search::{find_failures, search, CompiledCriteria, SearchCriteria, SearchMatch};
pub use crate::size::{format_size, parse_size_bytes};
pub use crate::stats::{
    duration_percentiles, find_auth_failures, find_largest, find_slowest, group_by_duration,
    group_by_method, group_by_size, group_by_status, percentile, summarize, time_range,
    total_bandwidth, DurationPercentiles, StatusBucket, Summary, TimeRange,
};
