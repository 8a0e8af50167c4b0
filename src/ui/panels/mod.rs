// LineDash - ui/panels/mod.rs

pub mod about;
pub mod distribution;
pub mod login;
pub mod overview;
pub mod production;
pub mod progress;
pub mod scorecards;
pub mod trend;
pub mod warnings;
