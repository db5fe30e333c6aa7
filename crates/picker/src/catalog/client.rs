//! HTTP client for the catalog search endpoint.

use reqwest::header::{HeaderMap, HeaderValue};
use secrecy::ExposeSecret;
use tracing::{debug, instrument};
use url::Url;

use super::conversions::convert_product_page;
use super::types::{ApiProductPage, PageRequest, ProductPage};
use super::{CatalogError, CatalogSource};
use crate::config::CatalogConfig;

/// Header carrying the static API key.
const API_KEY_HEADER: &str = "x-api-key";

/// Characters of a failed response body kept in errors and logs.
const ERROR_BODY_PREVIEW: usize = 200;

/// Catalog search client.
///
/// Cheap to clone; clones share the underlying connection pool.
#[derive(Clone)]
pub struct CatalogClient {
    client: reqwest::Client,
    endpoint: Url,
}

impl CatalogClient {
    /// Create a new catalog client.
    ///
    /// # Errors
    ///
    /// Returns error if the API key is not a valid header value or the HTTP
    /// client fails to build.
    pub fn new(config: &CatalogConfig) -> Result<Self, CatalogError> {
        let mut headers = HeaderMap::new();

        let mut api_key = HeaderValue::from_str(config.api_key.expose_secret())
            .map_err(|e| CatalogError::InvalidApiKey(e.to_string()))?;
        api_key.set_sensitive(true);
        headers.insert(API_KEY_HEADER, api_key);
        headers.insert("Accept", HeaderValue::from_static("application/json"));

        let client = reqwest::Client::builder()
            .default_headers(headers)
            .build()?;

        Ok(Self {
            client,
            endpoint: config.endpoint.clone(),
        })
    }

    /// Endpoint URL for `request`, with any query string on the configured
    /// endpoint preserved.
    fn request_url(&self, request: &PageRequest) -> Url {
        let mut url = self.endpoint.clone();
        url.query_pairs_mut()
            .append_pair("search", &request.query)
            .append_pair("page", &request.page.to_string())
            .append_pair("limit", &request.limit.to_string());
        url
    }
}

impl CatalogSource for CatalogClient {
    #[instrument(skip(self), fields(query = %request.query, page = request.page, limit = request.limit))]
    async fn fetch(&self, request: &PageRequest) -> Result<ProductPage, CatalogError> {
        let url = self.request_url(request);
        let response = self.client.get(url).send().await?;
        let status = response.status();

        // Get response body as text first for better error diagnostics
        let body = response.text().await?;

        if !status.is_success() {
            let preview = body.chars().take(ERROR_BODY_PREVIEW).collect::<String>();
            tracing::error!(
                status = %status,
                body = %preview,
                "Catalog endpoint returned non-success status"
            );
            return Err(CatalogError::Api {
                status: status.as_u16(),
                message: preview,
            });
        }

        let page: ApiProductPage = serde_json::from_str(&body).map_err(|e| {
            tracing::error!(
                error = %e,
                body = %body.chars().take(ERROR_BODY_PREVIEW).collect::<String>(),
                "Failed to parse catalog response"
            );
            CatalogError::Parse(e)
        })?;

        let page = convert_product_page(page)?;
        debug!(products = page.products.len(), "Catalog page fetched");
        Ok(page)
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use secrecy::SecretString;

    use super::*;

    fn client(endpoint: &str) -> CatalogClient {
        CatalogClient::new(&CatalogConfig {
            endpoint: endpoint.parse().unwrap(),
            api_key: SecretString::from("k3y-9f8e7d"),
        })
        .unwrap()
    }

    #[test]
    fn test_request_url_encodes_query() {
        let client = client("http://localhost:8080/task/products/search");
        let url = client.request_url(&PageRequest::new("Hat & Scarf", 2, 1));
        assert_eq!(
            url.as_str(),
            "http://localhost:8080/task/products/search?search=Hat+%26+Scarf&page=2&limit=1"
        );
    }

    #[test]
    fn test_request_url_keeps_existing_query() {
        let client = client("http://localhost:8080/search?shop=demo");
        let url = client.request_url(&PageRequest::new("", 1, 10));
        assert_eq!(
            url.as_str(),
            "http://localhost:8080/search?shop=demo&search=&page=1&limit=10"
        );
    }

    #[test]
    fn test_new_rejects_invalid_header_value() {
        let result = CatalogClient::new(&CatalogConfig {
            endpoint: "http://localhost/search".parse().unwrap(),
            api_key: SecretString::from("line\nbreak"),
        });
        assert!(matches!(result, Err(CatalogError::InvalidApiKey(_))));
    }
}
