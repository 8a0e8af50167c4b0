// LineDash - app/mod.rs
//
// Application layer: data sources, background fetch, dashboard state,
// view-session persistence.
// Dependencies: core layer.
// Must NOT depend on: ui, platform specifics.

pub mod fetch;
pub mod session;
pub mod source;
pub mod state;
