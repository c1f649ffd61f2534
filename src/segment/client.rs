//! Segment Client
//!
//! Main client for interacting with the Segment public API. Resource
//! specific calls live next to their wire types (`sources`, `warehouses`,
//! ...) as further `impl SegmentClient` blocks.

use super::error::ApiResult;
use super::http::SegmentHttpClient;
use super::models::{Envelope, Workspace};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};

/// Public API endpoint used when nothing else is configured
pub const DEFAULT_API_URL: &str = "https://api.segmentapis.com";

/// Main Segment client
///
/// Cheap to clone; holds no mutable state beyond the connection pool.
#[derive(Clone, Debug)]
pub struct SegmentClient {
    pub http: SegmentHttpClient,
}

#[derive(Debug, Deserialize)]
struct WorkspaceData {
    workspace: Workspace,
}

impl SegmentClient {
    /// Create a new Segment client for `base_url` authenticating with `token`
    pub fn new(base_url: &str, token: &str) -> ApiResult<Self> {
        Ok(Self {
            http: SegmentHttpClient::new(base_url, token)?,
        })
    }

    /// Fetch the workspace the token belongs to; doubles as a credentials check
    pub async fn workspace(&self) -> ApiResult<Workspace> {
        let data: WorkspaceData = self.get_data("/", &[]).await?;
        Ok(data.workspace)
    }

    /// GET and unwrap the `data` envelope
    pub(crate) async fn get_data<T: DeserializeOwned>(
        &self,
        path: &str,
        query: &[(&str, &str)],
    ) -> ApiResult<T> {
        let envelope: Envelope<T> = self.http.get(path, query).await?;
        Ok(envelope.data)
    }

    /// POST and unwrap the `data` envelope
    pub(crate) async fn post_data<B, T>(&self, path: &str, body: &B) -> ApiResult<T>
    where
        B: Serialize + ?Sized,
        T: DeserializeOwned,
    {
        let envelope: Envelope<T> = self.http.post(path, body).await?;
        Ok(envelope.data)
    }

    /// PATCH and unwrap the `data` envelope
    pub(crate) async fn patch_data<B, T>(&self, path: &str, body: &B) -> ApiResult<T>
    where
        B: Serialize + ?Sized,
        T: DeserializeOwned,
    {
        let envelope: Envelope<T> = self.http.patch(path, body).await?;
        Ok(envelope.data)
    }
}

// =========================================================================
// Path helpers
// =========================================================================

/// Build `/{collection}/{id}` with the id percent-encoded
pub fn item_path(collection: &str, id: &str) -> String {
    format!("/{}/{}", collection, urlencoding::encode(id))
}
