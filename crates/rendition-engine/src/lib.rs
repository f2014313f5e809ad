//! # rendition-engine
//!
//! The seam between the report catalog service and a rendering engine.
//!
//! Handles:
//! - **Engine**: the [`ReportEngine`](engine::ReportEngine) capability trait.
//! - **Definitions**: engine-level parameter definitions and their control and
//!   data-type enumerations.
//! - **Context**: per-call execution contexts.
//! - **Options**: format-specific render options for HTML and PDF.
//! - **Descriptor**: a reference engine over JSON template descriptors.

#![cfg_attr(test, allow(clippy::expect_used, clippy::unwrap_used))]

pub mod context;
pub mod definition;
pub mod descriptor;
pub mod engine;
pub mod options;
