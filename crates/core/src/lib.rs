//! Core library for boardkit
//!
//! This crate implements the **Functional Core** of the boardkit application,
//! following the Functional Core - Imperative Shell architectural pattern.
//!
//! # Architecture Overview
//!
//! - **`boardkit_core`** (this crate): Pure transformation functions with zero I/O
//! - **`boardkit`**: HTTP transport, rate limiting, retries, concurrency and the
//!   MCP/CLI surface (the Imperative Shell)
//!
//! Every function here takes already-fetched `serde_json::Value`s (or plain numbers)
//! and returns new values. Nothing sleeps, nothing touches the network, nothing can
//! fail half-way.
//!
//! # Module Organization
//!
//! - [`shaping`]: compaction and field selection applied to API responses
//! - [`pagination`]: offset window arithmetic and page exhaustion checks
//! - [`tree`]: normalization, indexing and assembly of the space/folder/document tree
//!
//! # Example Usage
//!
//! ```rust
//! use boardkit_core::shaping::shape;
//! use serde_json::json;
//!
//! let cards = json!([
//!     {"id": 1, "title": "Fix login", "description": "long text", "owner": {"id": 5, "full_name": "A", "email": "a@x"}}
//! ]);
//!
//! let shaped = shape(cards, true, Some("id,owner"));
//! assert_eq!(shaped, json!([{"id": 1, "owner": {"id": 5, "full_name": "A"}}]));
//! ```

pub mod pagination;
pub mod shaping;
pub mod tree;
