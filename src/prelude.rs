//! Convenience prelude for common harlens embedding tasks.

pub use crate::api::{
    load_har_file, parse_har_bytes, summarize, Engine, Entry, Har, HarlensError, LiveTracker,
    Resolver, Result, SearchCriteria, Summary,
};
