//! Catalog resolution
//!
//! Walks the cursor-paginated catalog endpoints to turn a type slug
//! (`snowflake`, `facebook-ads`) into the catalog metadata whose ID the
//! create endpoints expect. Nothing is cached: every call starts over at
//! the first page.

use super::client::SegmentClient;
use super::error::{ApiError, ApiResult};
use super::models::{Metadata, Pagination};
use serde::de::DeserializeOwned;
use serde::Deserialize;
use std::fmt;

/// Entries requested per page
pub const PAGE_SIZE: u32 = 100;

/// Which catalog to search
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CatalogKind {
    Sources,
    Destinations,
    Warehouses,
}

impl CatalogKind {
    /// API path of the catalog listing
    pub fn path(&self) -> &'static str {
        match self {
            CatalogKind::Sources => "/catalog/sources",
            CatalogKind::Destinations => "/catalog/destinations",
            CatalogKind::Warehouses => "/catalog/warehouses",
        }
    }

    /// Singular noun used in messages
    pub fn noun(&self) -> &'static str {
        match self {
            CatalogKind::Sources => "source",
            CatalogKind::Destinations => "destination",
            CatalogKind::Warehouses => "warehouse",
        }
    }
}

impl fmt::Display for CatalogKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.noun())
    }
}

/// One page of a cursor-paginated listing
pub(crate) trait Page {
    type Item;

    fn into_parts(self) -> (Vec<Self::Item>, Option<Pagination>);
}

/// A catalog page; the list key differs per catalog
#[derive(Debug, Deserialize)]
struct CatalogPage {
    #[serde(
        alias = "sourcesCatalog",
        alias = "destinationsCatalog",
        alias = "warehousesCatalog",
        default
    )]
    entries: Vec<Metadata>,
    #[serde(default)]
    pagination: Option<Pagination>,
}

impl Page for CatalogPage {
    type Item = Metadata;

    fn into_parts(self) -> (Vec<Metadata>, Option<Pagination>) {
        (self.entries, self.pagination)
    }
}

impl SegmentClient {
    /// Resolve a type slug to its catalog metadata
    pub async fn resolve_by_slug(&self, kind: CatalogKind, slug: &str) -> ApiResult<Metadata> {
        tracing::debug!("Resolving {} slug '{}' from {}", kind, slug, kind.path());

        self.find_paginated::<CatalogPage, _>(kind.path(), |entry: &Metadata| entry.slug == slug)
            .await?
            .ok_or_else(|| ApiError::SlugNotFound {
                kind,
                slug: slug.to_string(),
            })
    }

    /// Walk a paginated listing until `matches` accepts an item
    ///
    /// Stops when the next cursor is absent or empty, or when the server
    /// hands back the cursor that was just requested.
    pub(crate) async fn find_paginated<P, F>(
        &self,
        path: &str,
        mut matches: F,
    ) -> ApiResult<Option<P::Item>>
    where
        P: Page + DeserializeOwned,
        F: FnMut(&P::Item) -> bool,
    {
        let page_size = PAGE_SIZE.to_string();
        let mut cursor: Option<String> = None;
        let mut pages = 0usize;

        loop {
            let mut query = vec![("pagination.count", page_size.as_str())];
            if let Some(current) = cursor.as_deref() {
                query.push(("pagination.cursor", current));
            }

            let page: P = self.get_data(path, &query).await?;
            pages += 1;

            let (items, pagination) = page.into_parts();
            if let Some(found) = items.into_iter().find(|item| matches(item)) {
                tracing::debug!("Match on page {} of {}", pages, path);
                return Ok(Some(found));
            }

            match pagination.as_ref().and_then(Pagination::next_cursor) {
                None => break,
                Some(next) if cursor.as_deref() == Some(next) => {
                    tracing::warn!("{} returned the same cursor twice, stopping", path);
                    break;
                }
                Some(next) => cursor = Some(next.to_string()),
            }
        }

        tracing::debug!("No match in {} page(s) of {}", pages, path);
        Ok(None)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::{json, Value};
    use wiremock::matchers::{method, path, query_param, query_param_is_missing};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn entry(id: &str, slug: &str) -> Value {
        json!({"id": id, "name": slug, "slug": slug, "logos": {}, "options": []})
    }

    #[test]
    fn test_catalog_paths() {
        assert_eq!(CatalogKind::Sources.path(), "/catalog/sources");
        assert_eq!(CatalogKind::Destinations.path(), "/catalog/destinations");
        assert_eq!(CatalogKind::Warehouses.path(), "/catalog/warehouses");
    }

    #[tokio::test]
    async fn test_resolve_on_first_page() {
        let server = MockServer::start().await;

        Mock::given(method("GET"))
            .and(path("/catalog/warehouses"))
            .and(query_param("pagination.count", "100"))
            .and(query_param_is_missing("pagination.cursor"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "data": {
                    "warehousesCatalog": [entry("w-pg", "postgres"), entry("w-sf", "snowflake")],
                    "pagination": {"current": "MA==", "next": "MTAw", "totalEntries": 150}
                }
            })))
            .expect(1)
            .mount(&server)
            .await;

        let client = SegmentClient::new(&server.uri(), "t").unwrap();
        let metadata = client
            .resolve_by_slug(CatalogKind::Warehouses, "snowflake")
            .await
            .unwrap();
        assert_eq!(metadata.id, "w-sf");
    }

    #[tokio::test]
    async fn test_resolve_on_third_page() {
        let server = MockServer::start().await;

        Mock::given(method("GET"))
            .and(path("/catalog/destinations"))
            .and(query_param_is_missing("pagination.cursor"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "data": {
                    "destinationsCatalog": [entry("d1", "amplitude")],
                    "pagination": {"current": "MA==", "next": "page-2"}
                }
            })))
            .expect(1)
            .mount(&server)
            .await;

        Mock::given(method("GET"))
            .and(path("/catalog/destinations"))
            .and(query_param("pagination.cursor", "page-2"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "data": {
                    "destinationsCatalog": [entry("d2", "mixpanel")],
                    "pagination": {"current": "page-2", "next": "page-3"}
                }
            })))
            .expect(1)
            .mount(&server)
            .await;

        Mock::given(method("GET"))
            .and(path("/catalog/destinations"))
            .and(query_param("pagination.cursor", "page-3"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "data": {
                    "destinationsCatalog": [entry("d3", "webhooks")],
                    "pagination": {"current": "page-3", "next": ""}
                }
            })))
            .expect(1)
            .mount(&server)
            .await;

        let client = SegmentClient::new(&server.uri(), "t").unwrap();
        let metadata = client
            .resolve_by_slug(CatalogKind::Destinations, "webhooks")
            .await
            .unwrap();
        assert_eq!(metadata.id, "d3");
    }

    #[tokio::test]
    async fn test_empty_cursor_reports_slug_not_found() {
        let server = MockServer::start().await;

        Mock::given(method("GET"))
            .and(path("/catalog/sources"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "data": {
                    "sourcesCatalog": [entry("s1", "javascript")],
                    "pagination": {"current": "MA==", "next": ""}
                }
            })))
            .expect(1)
            .mount(&server)
            .await;

        let client = SegmentClient::new(&server.uri(), "t").unwrap();
        let err = client
            .resolve_by_slug(CatalogKind::Sources, "facebook-ads")
            .await
            .unwrap_err();
        assert!(matches!(
            err,
            ApiError::SlugNotFound { kind: CatalogKind::Sources, ref slug } if slug == "facebook-ads"
        ));
    }

    #[tokio::test]
    async fn test_missing_cursor_terminates() {
        let server = MockServer::start().await;

        Mock::given(method("GET"))
            .and(path("/catalog/sources"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "data": {"sourcesCatalog": [entry("s1", "javascript")]}
            })))
            .expect(1)
            .mount(&server)
            .await;

        let client = SegmentClient::new(&server.uri(), "t").unwrap();
        let err = client
            .resolve_by_slug(CatalogKind::Sources, "ios")
            .await
            .unwrap_err();
        assert!(matches!(err, ApiError::SlugNotFound { .. }));
    }

    #[tokio::test]
    async fn test_null_cursor_on_later_page_terminates() {
        let server = MockServer::start().await;

        Mock::given(method("GET"))
            .and(path("/catalog/warehouses"))
            .and(query_param_is_missing("pagination.cursor"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "data": {
                    "warehousesCatalog": [entry("w1", "postgres")],
                    "pagination": {"next": "p2"}
                }
            })))
            .mount(&server)
            .await;

        Mock::given(method("GET"))
            .and(path("/catalog/warehouses"))
            .and(query_param("pagination.cursor", "p2"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "data": {
                    "warehousesCatalog": [entry("w2", "redshift")],
                    "pagination": {"current": "p2", "next": null}
                }
            })))
            .expect(1)
            .mount(&server)
            .await;

        let client = SegmentClient::new(&server.uri(), "t").unwrap();
        let err = client
            .resolve_by_slug(CatalogKind::Warehouses, "db2")
            .await
            .unwrap_err();
        assert!(matches!(err, ApiError::SlugNotFound { .. }));
    }

    #[tokio::test]
    async fn test_repeated_cursor_does_not_loop() {
        let server = MockServer::start().await;

        Mock::given(method("GET"))
            .and(path("/catalog/sources"))
            .and(query_param_is_missing("pagination.cursor"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "data": {"sourcesCatalog": [], "pagination": {"next": "stuck"}}
            })))
            .mount(&server)
            .await;

        Mock::given(method("GET"))
            .and(path("/catalog/sources"))
            .and(query_param("pagination.cursor", "stuck"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "data": {"sourcesCatalog": [], "pagination": {"next": "stuck"}}
            })))
            .expect(1)
            .mount(&server)
            .await;

        let client = SegmentClient::new(&server.uri(), "t").unwrap();
        let err = client
            .resolve_by_slug(CatalogKind::Sources, "go")
            .await
            .unwrap_err();
        assert!(matches!(err, ApiError::SlugNotFound { .. }));
    }

    #[tokio::test]
    async fn test_catalog_http_failure_is_propagated() {
        let server = MockServer::start().await;

        Mock::given(method("GET"))
            .and(path("/catalog/sources"))
            .respond_with(ResponseTemplate::new(503).set_body_string("maintenance"))
            .mount(&server)
            .await;

        let client = SegmentClient::new(&server.uri(), "t").unwrap();
        let err = client
            .resolve_by_slug(CatalogKind::Sources, "go")
            .await
            .unwrap_err();
        assert_eq!(err.status(), Some(503));
    }
}
