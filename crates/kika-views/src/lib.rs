//! View layer for the KIKA incident dashboard.
//!
//! Turns a loaded [`kika_data::dataset::Dataset`] plus the control inputs
//! into the row sets and chart labels of the seven dashboard figures.

pub mod labels;
pub mod views;

pub use kika_core as core;
pub use kika_data as data;
