// LineDash - platform/mod.rs
//
// Platform abstraction layer: directories and config.toml.
// Dependencies: standard library, directories, toml, core (schema and
// layout types that config values are validated into).
// Must NOT depend on: app, ui.

pub mod config;
