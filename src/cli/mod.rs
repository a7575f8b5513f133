//! Terminal front end for the screening and scorecard engines

pub mod scorecard;
pub mod screen;
pub mod setup;
pub mod ui;
