//! # League Stats
//!
//! Statistics engine for a small round-robin league whose results live in a
//! spreadsheet.
//!
//! ## Architecture
//!
//! - **models**: Core data structures (players, raw rows, matches, matrices)
//! - **ingest**: Normalization of spreadsheet rows into typed records
//! - **calculate**: Standings, progress, streaks and head-to-head derivation
//! - **commands**: Chat command registry and dispatch
//! - **render**: Chat replies and heatmap colouring
//! - **fetch**: Data sources (SheetDB, local files, in-memory)
//! - **api**: REST API endpoints and the sheet update webhook
//! - **config**: Configuration loading and validation

pub mod api;
pub mod calculate;
pub mod commands;
pub mod config;
pub mod fetch;
pub mod ingest;
pub mod models;
pub mod render;

pub use models::*;
