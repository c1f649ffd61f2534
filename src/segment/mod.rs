//! Segment API interaction module
//!
//! This module provides the core functionality for talking to the Segment
//! public API: the authenticated HTTP client, the error taxonomy, catalog
//! resolution and the typed calls for every managed resource.
//!
//! # Module Structure
//!
//! - [`http`] - HTTP utilities for REST API calls
//! - [`client`] - Main Segment client and path helpers
//! - [`error`] - Error types shared by every call
//! - [`catalog`] - Cursor-paginated slug resolution
//! - [`sources`], [`destinations`], [`warehouses`], [`users`] - Resource calls
//!
//! # Example
//!
//! ```ignore
//! use segment_provider::segment::{CatalogKind, SegmentClient};
//!
//! async fn example() -> Result<(), segment_provider::segment::ApiError> {
//!     let client = SegmentClient::new("https://api.segmentapis.com", "token")?;
//!     let snowflake = client.resolve_by_slug(CatalogKind::Warehouses, "snowflake").await?;
//!     println!("{}", snowflake.id);
//!     Ok(())
//! }
//! ```

pub mod catalog;
pub mod client;
pub mod destinations;
pub mod error;
pub mod http;
pub mod models;
pub mod sources;
pub mod users;
pub mod warehouses;

pub use catalog::{CatalogKind, PAGE_SIZE};
pub use client::{SegmentClient, DEFAULT_API_URL};
pub use error::{ApiError, ApiResult};
pub use http::format_api_error;
