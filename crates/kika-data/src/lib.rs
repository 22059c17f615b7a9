//! Data layer for the aid-worker KIKA incident pipeline.
//!
//! Responsible for reading and normalizing the incident CSV, holding the
//! load-once [`dataset::Dataset`], filtering records by the category
//! checklist and aggregating them by one or more keys.

pub mod aggregator;
pub mod dataset;
pub mod filter;
pub mod reader;

pub use kika_core as core;
