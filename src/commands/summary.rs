use crate::commands::print_json;
use crate::error::Result;
use crate::ops::Engine;
use crate::size::format_size;
use crate::stats;

/// Summarize one capture: counts, hosts, bandwidth, percentiles, failures.
pub fn run_summary(engine: &Engine, name: &str, json: bool) -> Result<()> {
    let resolved = engine.resolver().resolve(name, engine.tracker())?;
    let summary = stats::summarize(&resolved.entries);

    if json {
        return print_json(&summary);
    }

    println!("entries={}", summary.entries);
    println!("unique_hosts={}", summary.unique_hosts);
    println!("failures={}", summary.failures);
    println!(
        "bandwidth={}",
        format_size(summary.total_bandwidth_bytes.max(0) as u64)
    );
    println!(
        "p50={:.1}ms p90={:.1}ms p99={:.1}ms",
        summary.percentiles.p50, summary.percentiles.p90, summary.percentiles.p99
    );
    if let (Some(earliest), Some(latest)) =
        (&summary.time_range.earliest, &summary.time_range.latest)
    {
        println!("range={} .. {}", earliest, latest);
    }
    for (method, count) in &summary.methods {
        println!("method.{method}={count}");
    }
    for (status, bucket) in &summary.statuses {
        println!(
            "status.{status}={} avg={:.1}ms",
            bucket.count, bucket.avg_duration_ms
        );
    }
    Ok(())
}
