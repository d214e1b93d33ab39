//! # PMIX Common Library
//!
//! Shared code for the playlist mix sequencer:
//! - Upstream data model (tracks, audio features, source lists)
//! - Energy/valence curve profiles
//! - Configuration loading (TOML + built-in defaults)
//! - Publish contract (playlist draft, upload batching)
//! - Common error type

pub mod config;
pub mod curves;
pub mod error;
pub mod models;
pub mod publish;

pub use config::{MixMode, MixOptions, ScoringWeights, SelectionWindows};
pub use curves::{CurveProfile, CurveTarget};
pub use error::{Error, Result};
