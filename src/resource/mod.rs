//! Resource abstraction layer
//!
//! This module exposes Segment objects to the host as typed resources with
//! a Create/Read/Update/Delete/Import lifecycle. Schemas are loaded from
//! JSON files at compile time and every configuration is validated against
//! them before it reaches the API.
//!
//! # Architecture
//!
//! - [`registry`] - Loads resource schemas and enum lists from embedded JSON
//! - [`mappers`] - Converts settings between host blocks and API objects
//! - [`dispatch`] - Maps resource type names onto lifecycle handlers
//! - [`sources`], [`destinations`], [`warehouses`], [`users`] - Handlers
//! - [`roles`] - The role data source
//!
//! # Resource Definitions
//!
//! Schemas are defined in JSON files under `src/resources/`:
//! - `catalog.json` - Enumerated slugs and violation policies
//! - `schemas.json` - Resource and data source attributes
//!
//! # Example
//!
//! ```ignore
//! use segment_provider::resource::dispatch;
//! use segment_provider::segment::SegmentClient;
//! use serde_json::json;
//!
//! async fn refresh(client: &SegmentClient) -> segment_provider::resource::ProviderResult<()> {
//!     let state = dispatch::read(client, "segment_source", &json!({"id": "src-1"})).await?;
//!     println!("{}", state);
//!     Ok(())
//! }
//! ```

pub mod destinations;
pub mod dispatch;
mod error;
pub mod mappers;
mod registry;
pub mod roles;
pub mod sources;
mod state;
pub mod users;
pub mod warehouses;

pub use dispatch::{Plan, ResourceType};
pub use error::{Diagnostic, ProviderError, ProviderResult, Severity};
pub use registry::*;
