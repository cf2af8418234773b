mod failures;
mod groups;
mod list;
mod navigate;
mod search;
mod summary;

pub use failures::{run_auth_failures, run_investigate};
pub use groups::{run_groups, GroupBy};
pub use list::run_list;
pub use navigate::run_navigate;
pub use search::{run_search, SearchOptions};
pub use summary::run_summary;

use crate::error::Result;
use crate::har::model::Entry;
use crate::ops::EntryView;

/// Render matched or ranked entries as the compact table the CLI prints.
fn print_entry_rows(rows: &[EntryView]) {
    if rows.is_empty() {
        println!("no matching entries");
        return;
    }
    for row in rows {
        println!(
            "[{:>4}] {:>3} {:<6} {:>9.1}ms  {}",
            row.index,
            row.status,
            row.method,
            row.time_ms,
            row.url
        );
    }
}

fn entry_views(indexed: Vec<(usize, &Entry)>) -> Vec<EntryView> {
    indexed
        .into_iter()
        .map(|(index, entry)| EntryView::new(index, entry))
        .collect()
}

fn print_json<T: serde::Serialize>(value: &T) -> Result<()> {
    println!(
        "{}",
        serde_json::to_string_pretty(value)
            .map_err(|err| crate::error::HarlensError::Parse(err.to_string()))?
    );
    Ok(())
}
