//! Core types for the aid-worker KIKA incident pipeline.
//!
//! Holds the canonical incident model, the priority-ordered classifier that
//! derives incident type and total workers affected, date helpers, the shared
//! error type and the command-line settings.

pub mod classifier;
pub mod error;
pub mod models;
pub mod settings;
pub mod time_utils;

pub use error::{KikaError, Result};
