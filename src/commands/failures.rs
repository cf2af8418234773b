use crate::commands::{entry_views, print_entry_rows, print_json};
use crate::error::Result;
use crate::har::model::Entry;
use crate::ops::{Engine, MatchView};
use crate::search;
use crate::stats;

/// List 401/403 responses in one capture.
pub fn run_auth_failures(engine: &Engine, name: &str, json: bool) -> Result<()> {
    let resolved = engine.resolver().resolve(name, engine.tracker())?;
    let views = entry_views(stats::find_auth_failures(&resolved.entries));

    if json {
        return print_json(&views);
    }
    print_entry_rows(&views);
    Ok(())
}

/// Failure triage: counts per status plus the slowest failures first.
pub fn run_investigate(engine: &Engine, name: &str, top: usize, json: bool) -> Result<()> {
    let resolved = engine.resolver().resolve(name, engine.tracker())?;
    let failures = search::find_failures(&resolved.entries);

    let failed: Vec<Entry> = failures.iter().map(|m| m.entry.clone()).collect();
    let by_status = stats::group_by_status(&failed);
    let total = failures.len();

    let mut slowest: Vec<MatchView> = failures.into_iter().map(MatchView::from).collect();
    slowest.sort_by(|a, b| b.entry.time_ms.total_cmp(&a.entry.time_ms));
    slowest.truncate(top);

    if json {
        return print_json(&serde_json::json!({
            "total_failures": total,
            "by_status": by_status,
            "slowest_failures": slowest,
        }));
    }

    println!("total_failures={total}");
    for (status, bucket) in &by_status {
        println!("status.{status}={}", bucket.count);
    }
    for row in &slowest {
        println!(
            "[{:>4}] {:>3} {:>9.1}ms  {}",
            row.entry.index, row.entry.status, row.entry.time_ms, row.entry.url
        );
    }
    Ok(())
}
