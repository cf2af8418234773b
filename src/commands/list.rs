use crate::commands::print_json;
use crate::error::Result;
use crate::ops::Engine;
use crate::size::format_size;

/// List capture files in the configured root, newest first.
pub fn run_list(engine: &Engine, pattern: Option<&str>, json: bool) -> Result<()> {
    let rows = engine.resolver().list_captures(pattern)?;

    if json {
        return print_json(&rows);
    }

    if rows.is_empty() {
        println!(
            "no .har captures in {}",
            engine.resolver().root().display()
        );
        return Ok(());
    }
    for row in rows {
        println!(
            "{:<40} {:>10}  {}",
            row.name,
            format_size(row.size_bytes),
            row.modified.as_deref().unwrap_or("-")
        );
    }
    Ok(())
}
