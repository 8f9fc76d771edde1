// LogStudio - platform/mod.rs
//
// Platform abstraction layer: filesystem access and configuration.
// Dependencies: standard library, directories, memmap2, glob, toml.
// Must NOT depend on: app.

pub mod config;
pub mod fs;
