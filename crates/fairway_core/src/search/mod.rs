//! Course text search entry points.
//!
//! # Responsibility
//! - Expose query APIs backed by the SQLite FTS5 index over name/location.
//! - Keep search result shaping inside core.

pub mod fts;
