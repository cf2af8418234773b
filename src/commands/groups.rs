use clap::ValueEnum;

use crate::commands::print_json;
use crate::error::Result;
use crate::ops::Engine;
use crate::stats;

#[derive(Clone, Copy, Debug, ValueEnum)]
pub enum GroupBy {
    Status,
    Size,
    Duration,
    Method,
}

/// Histogram-style grouping over one capture.
pub fn run_groups(engine: &Engine, name: &str, by: GroupBy, json: bool) -> Result<()> {
    let resolved = engine.resolver().resolve(name, engine.tracker())?;
    let entries = &resolved.entries;

    match by {
        GroupBy::Status => {
            let groups = stats::group_by_status(entries);
            if json {
                return print_json(&groups);
            }
            for (status, bucket) in groups {
                println!(
                    "{status}: count={} avg={:.1}ms",
                    bucket.count, bucket.avg_duration_ms
                );
            }
        }
        GroupBy::Size => {
            let groups = stats::group_by_size(entries);
            if json {
                return print_json(&groups);
            }
            for (label, count) in ordered(groups, &stats::SIZE_BUCKETS.map(|(l, _, _)| l)) {
                println!("{label}: {count}");
            }
        }
        GroupBy::Duration => {
            let groups = stats::group_by_duration(entries);
            if json {
                return print_json(&groups);
            }
            for (label, count) in ordered(groups, &stats::DURATION_BUCKETS.map(|(l, _, _)| l)) {
                println!("{label}: {count}");
            }
        }
        GroupBy::Method => {
            let groups = stats::group_by_method(entries);
            if json {
                return print_json(&groups);
            }
            for (method, count) in groups {
                println!("{method}: {count}");
            }
        }
    }
    Ok(())
}

/// Bucket maps sort alphabetically; print them in numeric bucket order.
fn ordered(
    mut groups: std::collections::BTreeMap<String, usize>,
    labels: &[&str],
) -> Vec<(String, usize)> {
    labels
        .iter()
        .filter_map(|label| groups.remove(*label).map(|count| (label.to_string(), count)))
        .collect()
}
