// LogStudio - core/mod.rs
//
// Core business logic layer.
// Dependencies: standard library plus pure data crates (regex, serde, chrono, csv).
// Must NOT depend on: platform, app, or perform any file/OS I/O directly.

pub mod export;
pub mod filter;
pub mod format;
pub mod loader;
pub mod merge;
pub mod model;
pub mod namespace;
pub mod parser;
pub mod schema;
