//! HTTP image fetcher for image-based query expansion.

use std::time::Duration;

use async_trait::async_trait;

use crate::error::SearchError;

use super::{FetchedImage, ImageFetcher};

/// MIME type assumed when the server does not send one.
pub const DEFAULT_IMAGE_MIME: &str = "image/jpeg";
/// Largest image forwarded to a generator.
pub const MAX_IMAGE_BYTES: usize = 20 * 1024 * 1024;

/// Downloads images with the pipeline's shared client.
pub struct HttpImageFetcher {
    client: reqwest::Client,
    timeout: Option<Duration>,
    max_bytes: usize,
}

impl HttpImageFetcher {
    pub fn new(client: reqwest::Client) -> Self {
        Self {
            client,
            timeout: None,
            max_bytes: MAX_IMAGE_BYTES,
        }
    }

    /// Per-request timeout, replacing the client's own.
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }

    pub fn with_max_bytes(mut self, max_bytes: usize) -> Self {
        self.max_bytes = max_bytes;
        self
    }

    fn too_large(&self, size: u64) -> SearchError {
        SearchError::Http(format!(
            "image is {size} bytes, limit is {}",
            self.max_bytes
        ))
    }
}

#[async_trait]
impl ImageFetcher for HttpImageFetcher {
    async fn fetch(&self, image_ref: &str) -> Result<FetchedImage, SearchError> {
        let mut request = self.client.get(image_ref);
        if let Some(timeout) = self.timeout {
            request = request.timeout(timeout);
        }

        let mut response = request
            .send()
            .await
            .map_err(|e| SearchError::Http(format!("image fetch failed: {e}")))?
            .error_for_status()
            .map_err(|e| SearchError::Http(format!("image fetch failed: {e}")))?;

        if let Some(declared) = response.content_length() {
            if declared > self.max_bytes as u64 {
                return Err(self.too_large(declared));
            }
        }

        let mime_type = mime_type(response.headers());

        // Content-Length may be absent; the cap holds while reading too.
        let mut bytes = Vec::new();
        while let Some(chunk) = response
            .chunk()
            .await
            .map_err(|e| SearchError::Http(format!("image body unreadable: {e}")))?
        {
            let size = bytes.len() + chunk.len();
            if size > self.max_bytes {
                return Err(self.too_large(size as u64));
            }
            bytes.extend_from_slice(&chunk);
        }
        if bytes.is_empty() {
            return Err(SearchError::Http("image body is empty".into()));
        }

        Ok(FetchedImage { bytes, mime_type })
    }
}

/// Media type from `Content-Type` without parameters, or [`DEFAULT_IMAGE_MIME`].
fn mime_type(headers: &reqwest::header::HeaderMap) -> String {
    headers
        .get(reqwest::header::CONTENT_TYPE)
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.split(';').next())
        .map(str::trim)
        .filter(|v| !v.is_empty())
        .unwrap_or(DEFAULT_IMAGE_MIME)
        .to_owned()
}

#[cfg(test)]
mod tests {
    use super::*;
    use wiremock::matchers::{method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    #[tokio::test]
    async fn returns_bytes_and_content_type() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/photo.png"))
            .respond_with(
                ResponseTemplate::new(200)
                    .set_body_raw(vec![137, 80, 78, 71], "image/png"),
            )
            .mount(&server)
            .await;

        let image = HttpImageFetcher::new(reqwest::Client::new())
            .fetch(&format!("{}/photo.png", server.uri()))
            .await
            .expect("image");
        assert_eq!(image.bytes, vec![137, 80, 78, 71]);
        assert_eq!(image.mime_type, "image/png");
    }

    #[test]
    fn missing_or_blank_content_type_defaults_to_jpeg() {
        let mut headers = reqwest::header::HeaderMap::new();
        assert_eq!(mime_type(&headers), DEFAULT_IMAGE_MIME);
        headers.insert(
            reqwest::header::CONTENT_TYPE,
            reqwest::header::HeaderValue::from_static(""),
        );
        assert_eq!(mime_type(&headers), DEFAULT_IMAGE_MIME);
    }

    #[tokio::test]
    async fn oversized_image_is_rejected() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/huge.jpg"))
            .respond_with(ResponseTemplate::new(200).set_body_raw(vec![0u8; 64], "image/jpeg"))
            .mount(&server)
            .await;

        let err = HttpImageFetcher::new(reqwest::Client::new())
            .with_max_bytes(16)
            .fetch(&format!("{}/huge.jpg", server.uri()))
            .await
            .unwrap_err();
        assert!(matches!(err, SearchError::Http(_)));
        assert!(err.to_string().contains("limit is 16"));
    }

    #[tokio::test]
    async fn image_at_the_limit_is_accepted() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(200).set_body_raw(vec![7u8; 16], "image/jpeg"))
            .mount(&server)
            .await;

        let image = HttpImageFetcher::new(reqwest::Client::new())
            .with_max_bytes(16)
            .fetch(&format!("{}/exact.jpg", server.uri()))
            .await
            .expect("image");
        assert_eq!(image.bytes.len(), 16);
    }

    #[tokio::test]
    async fn slow_image_within_expansion_budget_is_fetched() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(
                ResponseTemplate::new(200)
                    .set_body_raw(vec![1, 2, 3], "image/png")
                    .set_delay(Duration::from_millis(1500)),
            )
            .mount(&server)
            .await;

        let client = reqwest::Client::builder()
            .timeout(Duration::from_millis(500))
            .build()
            .expect("client");
        let image = HttpImageFetcher::new(client)
            .with_timeout(Duration::from_secs(10))
            .fetch(&format!("{}/slow.png", server.uri()))
            .await
            .expect("image");
        assert_eq!(image.bytes, vec![1, 2, 3]);
    }

    #[tokio::test]
    async fn not_found_is_http_error() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(404))
            .mount(&server)
            .await;

        let err = HttpImageFetcher::new(reqwest::Client::new())
            .fetch(&format!("{}/gone.jpg", server.uri()))
            .await
            .unwrap_err();
        assert!(matches!(err, SearchError::Http(_)));
    }
}
