//! # rendition-service
//!
//! The report catalog service and the subsystems it coordinates.
//!
//! Handles:
//! - **Service**: the lifecycle-gated [`ReportCatalogService`](service::ReportCatalogService).
//! - **Lifecycle**: the state machine and its change notifications.
//! - **Cache**: compile-once storage of compiled templates.
//! - **Discovery**: locating template files.
//! - **Extraction**: turning engine definitions into parameter schemas.
//! - **Coercion**: typing caller-supplied parameter strings.
//! - **Pipeline**: render and view requests, options, and context scoping.

#![cfg_attr(test, allow(clippy::expect_used, clippy::unwrap_used))]

pub mod cache;
pub mod coerce;
pub mod discovery;
pub mod extract;
pub mod lifecycle;
pub mod pipeline;
pub mod service;

mod lock;
