//! Segment provider
//!
//! Manages Segment sources, destinations, warehouses and workspace users
//! through the Segment public API on behalf of an infrastructure-as-code
//! host.

pub mod config;
pub mod resource;
pub mod segment;

/// Version injected at compile time via SEGMENT_PROVIDER_VERSION env var
/// (set by CI/CD), or "dev" for local builds.
pub const VERSION: &str = match option_env!("SEGMENT_PROVIDER_VERSION") {
    Some(v) => v,
    None => "dev",
};
