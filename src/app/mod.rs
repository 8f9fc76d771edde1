// LogStudio - app/mod.rs
//
// Application layer: orchestration of loading, watching, merging, settings
// and viewer state.
// Dependencies: core and platform layers.

pub mod io;
pub mod multi;
pub mod settings;
pub mod state;
pub mod watch;
