//! treeline-core library.
//!
//! Arrow-line edges between canvas blocks, and the execution order derived
//! from them. A host canvas implements [`model::BlockHost`] and
//! [`model::OrderStore`]; an [`editor::Editor`] holds the edge registry,
//! connector decorations and gesture state, and keeps order labels in sync
//! as edges come and go.
//!
//! ## Conventions
//!
//! - **Errors**: typed `thiserror` enums in library paths, each with an
//!   [`error::ErrorCode`]; `anyhow::Result` for file loading.
//! - **Logging**: `tracing` macros (`info!`, `warn!`, `debug!`, `trace!`).

pub mod config;
pub mod connector;
pub mod edge;
pub mod editor;
pub mod error;
pub mod gesture;
pub mod model;
pub mod order;
