//! Resolution of logical capture names to concrete entry sets.
//!
//! The resolver is the only component that knows about the `"latest"` and
//! `"live"` aliases and the only one that touches the filesystem. Every
//! literal name is sandbox-checked against the configured root before any
//! file I/O happens; nothing outside the root is ever read.

use std::ffi::OsStr;
use std::fs;
use std::path::{Component, Path, PathBuf};
use std::time::SystemTime;

use chrono::{DateTime, Utc};
use serde::Serialize;

use crate::error::{HarlensError, Result};
use crate::har::model::Entry;
use crate::har::parser::load_har_file;
use crate::live::LiveTracker;

pub const LIVE_ALIAS: &str = "live";
pub const LATEST_ALIAS: &str = "latest";

/// A resolved entry set. `source_path` is set for file-backed captures and
/// absent for the live session.
#[derive(Debug)]
pub struct Resolved {
    pub entries: Vec<Entry>,
    pub source_path: Option<PathBuf>,
}

/// One row in a capture listing, newest first.
#[derive(Debug, Serialize)]
pub struct CaptureInfo {
    pub name: String,
    pub size_bytes: u64,
    pub modified: Option<String>,
}

pub struct Resolver {
    root: PathBuf,
}

impl Resolver {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Resolver { root: root.into() }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Map a logical name to entries. `"live"` needs an active session,
    /// `"latest"` the newest `*.har` in the root; anything else is a
    /// sandboxed filename. Documents are re-read on every call so results
    /// always reflect the latest write.
    pub fn resolve(&self, name: &str, tracker: &LiveTracker) -> Result<Resolved> {
        if name == LIVE_ALIAS {
            if !tracker.is_active() {
                return Err(HarlensError::NotFound(
                    "no live capture session is active".to_string(),
                ));
            }
            return Ok(Resolved {
                entries: tracker.get_all(),
                source_path: None,
            });
        }

        let path = if name == LATEST_ALIAS {
            self.latest_capture()?
        } else {
            self.sandboxed_path(name)?
        };

        if !path.is_file() {
            return Err(HarlensError::NotFound(format!(
                "no capture named '{}' under {}",
                name,
                self.root.display()
            )));
        }

        let har = load_har_file(&path)?;
        Ok(Resolved {
            entries: har.log.entries,
            source_path: Some(path),
        })
    }

    /// List `*.har` files in the root, newest modification first, optionally
    /// filtered by a case-insensitive substring of the file name.
    pub fn list_captures(&self, pattern: Option<&str>) -> Result<Vec<CaptureInfo>> {
        let mut rows: Vec<(SystemTime, CaptureInfo)> = Vec::new();
        for dirent in fs::read_dir(&self.root)? {
            let dirent = dirent?;
            let path = dirent.path();
            if !path.is_file() || path.extension() != Some(OsStr::new("har")) {
                continue;
            }
            let name = match path.file_name().and_then(|n| n.to_str()) {
                Some(n) => n.to_string(),
                None => continue,
            };
            if let Some(needle) = pattern {
                if !name.to_lowercase().contains(&needle.to_lowercase()) {
                    continue;
                }
            }
            let meta = dirent.metadata()?;
            let modified = meta.modified().unwrap_or(SystemTime::UNIX_EPOCH);
            rows.push((
                modified,
                CaptureInfo {
                    name,
                    size_bytes: meta.len(),
                    modified: Some(
                        DateTime::<Utc>::from(modified).to_rfc3339_opts(
                            chrono::SecondsFormat::Secs,
                            true,
                        ),
                    ),
                },
            ));
        }
        rows.sort_by(|a, b| b.0.cmp(&a.0));
        Ok(rows.into_iter().map(|(_, info)| info).collect())
    }

    /// Locate an entry for the navigate pass-through: the resolved file path
    /// plus the in-file index a consumer can open. The live session has no
    /// path, so it is not navigable.
    pub fn entry_location(
        &self,
        name: &str,
        index: usize,
        tracker: &LiveTracker,
    ) -> Result<(PathBuf, usize)> {
        let resolved = self.resolve(name, tracker)?;
        let path = resolved.source_path.ok_or_else(|| {
            HarlensError::NotFound("the live session has no file to navigate to".to_string())
        })?;
        if index >= resolved.entries.len() {
            return Err(HarlensError::NotFound(format!(
                "entry index {} out of range (capture has {} entries)",
                index,
                resolved.entries.len()
            )));
        }
        Ok((path, index))
    }

    fn latest_capture(&self) -> Result<PathBuf> {
        let newest = self.list_captures(None)?.into_iter().next().ok_or_else(|| {
            HarlensError::NotFound(format!("no .har captures in {}", self.root.display()))
        })?;
        Ok(self.root.join(newest.name))
    }

    /// Join a caller-supplied name to the root and require the result to
    /// stay inside it. Purely lexical, so the check runs before any I/O;
    /// absolute paths and any `..` component are rejected outright.
    fn sandboxed_path(&self, name: &str) -> Result<PathBuf> {
        let candidate = Path::new(name);
        if candidate.is_absolute() {
            return Err(HarlensError::Security(format!(
                "absolute path '{name}' is not allowed"
            )));
        }
        for component in candidate.components() {
            match component {
                Component::Normal(_) | Component::CurDir => {}
                _ => {
                    return Err(HarlensError::Security(format!(
                        "'{name}' escapes the capture root"
                    )));
                }
            }
        }
        // Bare names get the .har suffix; a different extension is a typo,
        // not an alias for some other capture.
        let mut path = self.root.join(candidate);
        match path.extension() {
            None => {
                path.set_extension("har");
            }
            Some(ext) if ext == OsStr::new("har") => {}
            Some(_) => {
                return Err(HarlensError::NotFound(format!(
                    "'{name}' is not a .har capture"
                )));
            }
        }
        Ok(path)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn resolver() -> Resolver {
        Resolver::new("/captures")
    }

    #[test]
    fn traversal_is_rejected_before_io() {
        let err = resolver()
            .resolve("../../etc/passwd", &LiveTracker::default())
            .unwrap_err();
        assert_eq!(err.kind(), "security_error");
    }

    #[test]
    fn absolute_paths_are_rejected() {
        let err = resolver()
            .resolve("/etc/passwd", &LiveTracker::default())
            .unwrap_err();
        assert_eq!(err.kind(), "security_error");
    }

    #[test]
    fn nested_traversal_is_rejected() {
        let err = resolver()
            .resolve("captures/../../secret.har", &LiveTracker::default())
            .unwrap_err();
        assert_eq!(err.kind(), "security_error");
    }

    #[test]
    fn live_without_session_is_not_found() {
        let err = resolver()
            .resolve("live", &LiveTracker::default())
            .unwrap_err();
        assert_eq!(err.kind(), "not_found");
    }

    #[test]
    fn har_extension_is_appended_when_missing() {
        let path = resolver().sandboxed_path("session-3").unwrap();
        assert_eq!(path, PathBuf::from("/captures/session-3.har"));
        let path = resolver().sandboxed_path("session-3.har").unwrap();
        assert_eq!(path, PathBuf::from("/captures/session-3.har"));
    }

    #[test]
    fn foreign_extensions_do_not_alias_a_capture() {
        let tmp = tempfile::tempdir().unwrap();
        std::fs::write(tmp.path().join("notes.har"), r#"{"log":{"entries":[]}}"#).unwrap();
        std::fs::write(tmp.path().join("notes.txt"), "not a capture").unwrap();

        // "notes.txt" must not silently resolve to notes.har.
        let resolver = Resolver::new(tmp.path());
        let err = resolver
            .resolve("notes.txt", &LiveTracker::default())
            .unwrap_err();
        assert_eq!(err.kind(), "not_found");

        assert!(resolver
            .resolve("notes", &LiveTracker::default())
            .is_ok());
    }

    #[test]
    fn latest_in_empty_root_is_not_found() {
        let tmp = tempfile::tempdir().unwrap();
        let resolver = Resolver::new(tmp.path());
        let err = resolver
            .resolve("latest", &LiveTracker::default())
            .unwrap_err();
        assert_eq!(err.kind(), "not_found");
    }

    #[test]
    fn latest_picks_the_newest_file() {
        let tmp = tempfile::tempdir().unwrap();
        let old = tmp.path().join("old.har");
        let new = tmp.path().join("new.har");
        std::fs::write(&old, r#"{"log":{"entries":[]}}"#).unwrap();
        std::fs::write(&new, r#"{"log":{"entries":[]}}"#).unwrap();
        let earlier = std::time::SystemTime::now() - std::time::Duration::from_secs(3600);
        let file = std::fs::File::options().append(true).open(&old).unwrap();
        file.set_modified(earlier).unwrap();

        let resolver = Resolver::new(tmp.path());
        let resolved = resolver.resolve("latest", &LiveTracker::default()).unwrap();
        assert_eq!(resolved.source_path, Some(new));
    }

    #[test]
    fn listing_filters_by_substring() {
        let tmp = tempfile::tempdir().unwrap();
        std::fs::write(tmp.path().join("checkout.har"), "{}").unwrap();
        std::fs::write(tmp.path().join("login.har"), "{}").unwrap();
        std::fs::write(tmp.path().join("notes.txt"), "ignored").unwrap();

        let resolver = Resolver::new(tmp.path());
        let all = resolver.list_captures(None).unwrap();
        assert_eq!(all.len(), 2);
        let filtered = resolver.list_captures(Some("LOGIN")).unwrap();
        assert_eq!(filtered.len(), 1);
        assert_eq!(filtered[0].name, "login.har");
    }
}
