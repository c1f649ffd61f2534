//! HTTP utilities for Segment public API calls

use super::error::{ApiError, ApiResult};
use reqwest::header::{ACCEPT, CONTENT_TYPE};
use reqwest::{Client, Method};
use serde::de::DeserializeOwned;
use serde::Serialize;
use std::time::Duration;
use url::Url;

/// Maximum length of response body to log (to avoid logging sensitive data)
const MAX_LOG_BODY_LENGTH: usize = 200;

/// Every request gets this deadline; there is no retry
pub const REQUEST_TIMEOUT: Duration = Duration::from_secs(10);

/// Sanitize response body for logging
/// Truncates long responses and strips control characters
fn sanitize_for_log(body: &str) -> String {
    let truncated = match body.char_indices().nth(MAX_LOG_BODY_LENGTH) {
        Some((cut, _)) => format!(
            "{}... [truncated, {} bytes total]",
            &body[..cut],
            body.len()
        ),
        None => body.to_string(),
    };

    truncated.replace(|c: char| !c.is_ascii_graphic() && c != ' ', "")
}

/// HTTP client wrapper for Segment API calls
///
/// Holds the base URL and bearer token; both are fixed for the lifetime
/// of the client.
#[derive(Clone)]
pub struct SegmentHttpClient {
    client: Client,
    base_url: Url,
    token: String,
}

impl std::fmt::Debug for SegmentHttpClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SegmentHttpClient")
            .field("base_url", &self.base_url.as_str())
            .field("token", &"[redacted]")
            .finish()
    }
}

impl SegmentHttpClient {
    /// Create a new HTTP client
    pub fn new(base_url: &str, token: &str) -> ApiResult<Self> {
        let parsed = Url::parse(base_url).map_err(|source| ApiError::InvalidBaseUrl {
            url: base_url.to_string(),
            source,
        })?;

        let client = Client::builder()
            .user_agent(concat!("segment-provider/", env!("CARGO_PKG_VERSION")))
            .timeout(REQUEST_TIMEOUT)
            .build()
            .map_err(ApiError::ClientBuild)?;

        Ok(Self {
            client,
            base_url: parsed,
            token: token.to_string(),
        })
    }

    /// Base URL this client talks to
    pub fn base_url(&self) -> &Url {
        &self.base_url
    }

    /// Build the absolute URL for an API path such as `/sources/abc`
    pub fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url.as_str().trim_end_matches('/'), path)
    }

    /// Issue one request and return the raw body of a 200/201 response
    pub async fn do_request<B>(
        &self,
        method: Method,
        path: &str,
        query: &[(&str, &str)],
        body: Option<&B>,
    ) -> ApiResult<Vec<u8>>
    where
        B: Serialize + ?Sized,
    {
        let raw_url = self.url(path);
        let url = if query.is_empty() {
            Url::parse(&raw_url)
        } else {
            Url::parse_with_params(&raw_url, query)
        }
        .map_err(|source| ApiError::InvalidBaseUrl {
            url: raw_url.clone(),
            source,
        })?;

        tracing::debug!("{} {}", method, url);

        let mut request = self
            .client
            .request(method.clone(), url.clone())
            .header(ACCEPT, "application/json")
            .header(CONTENT_TYPE, "application/json")
            .bearer_auth(&self.token);

        if let Some(body) = body {
            request = request.json(body);
        }

        let response = request.send().await.map_err(|source| ApiError::Transport {
            method: method.to_string(),
            url: url.to_string(),
            source,
        })?;

        let status = response.status();
        let bytes = response
            .bytes()
            .await
            .map_err(|source| ApiError::Transport {
                method: method.to_string(),
                url: url.to_string(),
                source,
            })?;

        match status.as_u16() {
            200 | 201 => Ok(bytes.to_vec()),
            code => {
                let body = String::from_utf8_lossy(&bytes).into_owned();
                // Security: Only log sanitized/truncated error body to avoid leaking sensitive data
                tracing::error!("API error: {} {} - {}", method, status, sanitize_for_log(&body));
                if code == 404 {
                    Err(ApiError::NotFound {
                        method: method.to_string(),
                        url: url.to_string(),
                        body,
                    })
                } else {
                    Err(ApiError::Status {
                        method: method.to_string(),
                        url: url.to_string(),
                        status: code,
                        body,
                    })
                }
            }
        }
    }

    /// Make a GET request and decode the JSON response
    pub async fn get<T: DeserializeOwned>(&self, path: &str, query: &[(&str, &str)]) -> ApiResult<T> {
        let body = self
            .do_request::<()>(Method::GET, path, query, None)
            .await?;
        self.decode(path, &body)
    }

    /// Make a POST request with a JSON body and decode the JSON response
    pub async fn post<B, T>(&self, path: &str, body: &B) -> ApiResult<T>
    where
        B: Serialize + ?Sized,
        T: DeserializeOwned,
    {
        let response = self.do_request(Method::POST, path, &[], Some(body)).await?;
        self.decode(path, &response)
    }

    /// Make a PATCH request with a JSON body and decode the JSON response
    pub async fn patch<B, T>(&self, path: &str, body: &B) -> ApiResult<T>
    where
        B: Serialize + ?Sized,
        T: DeserializeOwned,
    {
        let response = self.do_request(Method::PATCH, path, &[], Some(body)).await?;
        self.decode(path, &response)
    }

    /// Make a DELETE request, discarding the response body
    pub async fn delete(&self, path: &str) -> ApiResult<()> {
        self.do_request::<()>(Method::DELETE, path, &[], None)
            .await
            .map(|_| ())
    }

    /// Make a DELETE request that carries a JSON body (bulk endpoints)
    pub async fn delete_with_body<B>(&self, path: &str, body: &B) -> ApiResult<()>
    where
        B: Serialize + ?Sized,
    {
        self.do_request(Method::DELETE, path, &[], Some(body))
            .await
            .map(|_| ())
    }

    fn decode<T: DeserializeOwned>(&self, path: &str, body: &[u8]) -> ApiResult<T> {
        serde_json::from_slice(body).map_err(|source| ApiError::Decode {
            url: self.url(path),
            source,
        })
    }
}

/// Format a Segment API error as a one-line summary for diagnostics
/// Security: The summary never repeats response bodies; the full error goes in the detail
pub fn format_api_error(error: &ApiError) -> String {
    match error {
        ApiError::NotFound { .. } => "Resource not found.".to_string(),
        ApiError::SlugNotFound { kind, slug } => {
            format!("Segment does not offer a {} of type '{}'.", kind, slug)
        }
        ApiError::RoleNotFound { name } => format!("No role named '{}' in this workspace.", name),
        ApiError::InvalidBaseUrl { .. } => "Invalid Segment API URL.".to_string(),
        ApiError::ClientBuild(_) => "Unable to create the HTTP client.".to_string(),
        ApiError::Transport { source, .. } if source.is_timeout() => {
            "Request to Segment timed out.".to_string()
        }
        ApiError::Transport { .. } => {
            "Request failed. Check your network connection and try again.".to_string()
        }
        ApiError::Decode { .. } | ApiError::UnexpectedResponse { .. } => {
            "Unexpected response from the Segment API.".to_string()
        }
        ApiError::Status { status, .. } => match status {
            401 => "Authentication failed. Check SEGMENT_API_TOKEN.".to_string(),
            403 => "Permission denied. The token lacks access to this resource.".to_string(),
            409 => "Resource conflict. The resource may already exist.".to_string(),
            429 => "Rate limit exceeded. Please try again later.".to_string(),
            400 | 422 => "Invalid request. Check your parameters.".to_string(),
            500..=599 => "Segment API temporarily unavailable. Please try again.".to_string(),
            other => format!("Segment API request failed with status {}.", other),
        },
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::{json, Value};
    use wiremock::matchers::{bearer_token, body_json, header, method, path, query_param};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    #[test]
    fn test_sanitize_truncates_long_bodies() {
        let body = "x".repeat(500);
        let sanitized = sanitize_for_log(&body);
        assert!(sanitized.starts_with(&"x".repeat(MAX_LOG_BODY_LENGTH)));
        assert!(sanitized.contains("[truncated, 500 bytes total]"));
    }

    #[test]
    fn test_sanitize_handles_multibyte_boundary() {
        let body = "é".repeat(300);
        let sanitized = sanitize_for_log(&body);
        assert!(sanitized.contains("truncated"));
    }

    #[test]
    fn test_sanitize_strips_control_characters() {
        assert_eq!(sanitize_for_log("a\nb\tc d"), "abc d");
    }

    #[test]
    fn test_invalid_base_url_is_rejected() {
        let err = SegmentHttpClient::new("not a url", "token").unwrap_err();
        assert!(matches!(err, ApiError::InvalidBaseUrl { .. }));
    }

    #[test]
    fn test_url_joins_without_double_slash() {
        let client = SegmentHttpClient::new("https://eu1.api.segmentapis.com/", "t").unwrap();
        assert_eq!(
            client.url("/sources/abc"),
            "https://eu1.api.segmentapis.com/sources/abc"
        );
    }

    #[test]
    fn test_debug_redacts_token() {
        let client = SegmentHttpClient::new("https://api.segmentapis.com", "secret-token").unwrap();
        let debug = format!("{:?}", client);
        assert!(!debug.contains("secret-token"));
        assert!(debug.contains("redacted"));
    }

    #[tokio::test]
    async fn test_get_sends_auth_and_json_headers() {
        let server = MockServer::start().await;

        Mock::given(method("GET"))
            .and(path("/sources/src-1"))
            .and(bearer_token("test-token"))
            .and(header("accept", "application/json"))
            .and(header("content-type", "application/json"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({"data": {"ok": true}})))
            .expect(1)
            .mount(&server)
            .await;

        let client = SegmentHttpClient::new(&server.uri(), "test-token").unwrap();
        let value: Value = client.get("/sources/src-1", &[]).await.unwrap();
        assert_eq!(value["data"]["ok"], true);
    }

    #[tokio::test]
    async fn test_query_parameters_are_forwarded() {
        let server = MockServer::start().await;

        Mock::given(method("GET"))
            .and(path("/catalog/sources"))
            .and(query_param("pagination.count", "100"))
            .and(query_param("pagination.cursor", "MTAw"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({})))
            .expect(1)
            .mount(&server)
            .await;

        let client = SegmentHttpClient::new(&server.uri(), "t").unwrap();
        let _: Value = client
            .get(
                "/catalog/sources",
                &[("pagination.count", "100"), ("pagination.cursor", "MTAw")],
            )
            .await
            .unwrap();
    }

    #[tokio::test]
    async fn test_created_status_is_success() {
        let server = MockServer::start().await;

        Mock::given(method("POST"))
            .and(path("/sources"))
            .and(body_json(json!({"name": "web"})))
            .respond_with(ResponseTemplate::new(201).set_body_json(json!({"id": "new"})))
            .mount(&server)
            .await;

        let client = SegmentHttpClient::new(&server.uri(), "t").unwrap();
        let value: Value = client.post("/sources", &json!({"name": "web"})).await.unwrap();
        assert_eq!(value["id"], "new");
    }

    #[tokio::test]
    async fn test_no_content_is_treated_as_failure() {
        let server = MockServer::start().await;

        Mock::given(method("DELETE"))
            .and(path("/sources/src-1"))
            .respond_with(ResponseTemplate::new(204))
            .mount(&server)
            .await;

        let client = SegmentHttpClient::new(&server.uri(), "t").unwrap();
        let err = client.delete("/sources/src-1").await.unwrap_err();
        assert_eq!(err.status(), Some(204));
    }

    #[tokio::test]
    async fn test_404_maps_to_not_found() {
        let server = MockServer::start().await;

        Mock::given(method("GET"))
            .and(path("/warehouses/gone"))
            .respond_with(ResponseTemplate::new(404).set_body_string("warehouse gone"))
            .mount(&server)
            .await;

        let client = SegmentHttpClient::new(&server.uri(), "t").unwrap();
        let err = client
            .get::<Value>("/warehouses/gone", &[])
            .await
            .unwrap_err();
        assert!(err.is_not_found());
        let msg = err.to_string();
        assert!(msg.contains("GET"));
        assert!(msg.contains("/warehouses/gone"));
        assert!(msg.contains("warehouse gone"));
    }

    #[tokio::test]
    async fn test_server_error_keeps_status_and_body() {
        let server = MockServer::start().await;

        Mock::given(method("PATCH"))
            .and(path("/destinations/d1"))
            .respond_with(ResponseTemplate::new(500).set_body_string("boom"))
            .mount(&server)
            .await;

        let client = SegmentHttpClient::new(&server.uri(), "t").unwrap();
        let err = client
            .patch::<_, Value>("/destinations/d1", &json!({}))
            .await
            .unwrap_err();
        match &err {
            ApiError::Status { status, body, .. } => {
                assert_eq!(*status, 500);
                assert_eq!(body, "boom");
            }
            other => panic!("expected status error, got {other:?}"),
        }
        assert_eq!(
            format_api_error(&err),
            "Segment API temporarily unavailable. Please try again."
        );
    }

    #[tokio::test]
    async fn test_malformed_json_is_a_decode_error() {
        let server = MockServer::start().await;

        Mock::given(method("GET"))
            .and(path("/sources/s"))
            .respond_with(ResponseTemplate::new(200).set_body_string("{not json"))
            .mount(&server)
            .await;

        let client = SegmentHttpClient::new(&server.uri(), "t").unwrap();
        let err = client.get::<Value>("/sources/s", &[]).await.unwrap_err();
        assert!(matches!(err, ApiError::Decode { .. }));
    }

    #[tokio::test]
    async fn test_unreachable_host_is_a_transport_error() {
        // Port 9 (discard) on localhost is not expected to accept connections
        let client = SegmentHttpClient::new("http://127.0.0.1:9", "t").unwrap();
        let err = client.get::<Value>("/sources", &[]).await.unwrap_err();
        assert!(matches!(err, ApiError::Transport { .. }));
        assert!(!err.is_not_found());
    }
}
