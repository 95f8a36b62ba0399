//! Full-text quote search.
//!
//! # Responsibility
//! - Expose keyword search over quote text and author backed by SQLite FTS5.
//! - Keep query escaping and result shaping inside core.

pub mod fts;
