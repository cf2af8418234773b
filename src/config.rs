use std::env;
use std::fs;
use std::path::PathBuf;

use serde::Deserialize;

use crate::error::{HarlensError, Result};
use crate::live;

/// TOML configuration, merged under CLI flags. Lookup order: the file named
/// by `HARLENS_CONFIG`, then `./harlens.toml`; later files override earlier
/// ones field by field.
#[derive(Clone, Debug, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Config {
    /// Directory holding flat `*.har` capture files (the sandbox root).
    pub root: Option<PathBuf>,
    /// Ring-buffer capacity for the live session.
    pub live_capacity: Option<usize>,
}

impl Config {
    pub fn root_or_default(&self) -> PathBuf {
        self.root.clone().unwrap_or_else(|| PathBuf::from("."))
    }

    pub fn live_capacity_or_default(&self) -> usize {
        self.live_capacity.unwrap_or(live::DEFAULT_CAPACITY)
    }
}

pub fn load_config() -> Result<Config> {
    let mut config = Config::default();
    for path in config_search_paths() {
        if !path.exists() {
            continue;
        }
        let contents = fs::read_to_string(&path)?;
        let parsed: Config = toml::from_str(&contents).map_err(|err| {
            HarlensError::Config(format!("failed to parse {}: {}", path.display(), err))
        })?;
        merge_config(&mut config, parsed);
    }
    Ok(config)
}

fn config_search_paths() -> Vec<PathBuf> {
    let mut paths = Vec::new();
    if let Ok(explicit) = env::var("HARLENS_CONFIG") {
        if !explicit.is_empty() {
            paths.push(PathBuf::from(explicit));
        }
    }
    paths.push(PathBuf::from("harlens.toml"));
    paths
}

fn merge_config(base: &mut Config, other: Config) {
    if other.root.is_some() {
        base.root = other.root;
    }
    if other.live_capacity.is_some() {
        base.live_capacity = other.live_capacity;
    }
}
