// LineDash - core/mod.rs
//
// Core business logic layer: tables, records, trend aggregation, report
// figures, login gate, export.
// Must NOT depend on: ui, platform, app, or network I/O.

pub mod auth;
pub mod export;
pub mod model;
pub mod report;
pub mod table;
pub mod trend;
