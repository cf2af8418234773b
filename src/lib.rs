//! Harlens library crate.
//!
//! The stable, supported API surface is exposed via [`crate::api`] and
//! [`crate::prelude`]. These modules are intended for embedding the HAR
//! analysis engine in Rust applications and follow SemVer.
//!
//! Other modules back the CLI implementation and may change more
//! frequently. If you need something not in [`crate::api`], consider
//! opening an issue so it can be promoted to the supported surface.

pub mod api;
pub mod prelude;

pub mod commands;
pub mod config;
pub mod error;
pub mod har;
pub mod live;
pub mod ops;
pub mod resolver;
pub mod search;
pub mod size;
pub mod stats;
