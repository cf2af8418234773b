use crate::commands::print_json;
use crate::error::Result;
use crate::ops::Engine;

/// Resolve a capture name and entry index to a concrete `path:index` pair
/// so an editor or viewer can jump straight to the entry.
pub fn run_navigate(engine: &Engine, name: &str, index: usize, json: bool) -> Result<()> {
    let (path, index) = engine
        .resolver()
        .entry_location(name, index, engine.tracker())?;

    if json {
        return print_json(&serde_json::json!({ "path": path, "index": index }));
    }
    println!("{}:{}", path.display(), index);
    Ok(())
}
