use std::time::Duration;

use url::Url;

/// Hosts whose URLs are served as-is without a test load.
pub const DEFAULT_TRUSTED_DOMAINS: &[&str] = &[
    "images.unsplash.com",
    "images.pexels.com",
    "cdn.pixabay.com",
    "pixabay.com",
    "foodiesfeed.com",
];

pub const DEFAULT_VALIDATION_TIMEOUT: Duration = Duration::from_secs(5);

#[async_trait::async_trait]
pub trait ImageValidator: Send + Sync {
    /// `true` if the URL can be shown as an image.
    async fn validate(&self, url: &str) -> bool;
}

pub struct HttpImageValidator {
    client: reqwest::Client,
    trusted_domains: Vec<String>,
    timeout: Duration,
}

impl HttpImageValidator {
    pub fn new(client: reqwest::Client, trusted_domains: Vec<String>, timeout: Duration) -> Self {
        let trusted_domains = trusted_domains
            .into_iter()
            .map(|d| d.trim().trim_start_matches('.').to_lowercase())
            .filter(|d| !d.is_empty())
            .collect();

        Self {
            client,
            trusted_domains,
            timeout,
        }
    }

    /// Exact host or any subdomain of an allow-listed domain.
    pub fn is_trusted(&self, url: &Url) -> bool {
        let Some(host) = url.host_str() else {
            return false;
        };
        let host = host.to_lowercase();

        self.trusted_domains.iter().any(|domain| {
            host == *domain
                || host
                    .strip_suffix(domain.as_str())
                    .is_some_and(|prefix| prefix.ends_with('.'))
        })
    }

    async fn load(&self, url: Url) -> bool {
        let request = self.client.get(url.clone()).send();

        let response = match tokio::time::timeout(self.timeout, request).await {
            Ok(Ok(response)) => response,
            Ok(Err(e)) => {
                log::debug!("🖼️ Image load failed for {}: {}", url, e);
                return false;
            }
            Err(_) => {
                log::debug!("⏱️ Image load timed out after {:?}: {}", self.timeout, url);
                return false;
            }
        };

        if !response.status().is_success() {
            log::debug!("🖼️ Image load returned {} for {}", response.status(), url);
            return false;
        }

        let is_image = response
            .headers()
            .get(reqwest::header::CONTENT_TYPE)
            .and_then(|v| v.to_str().ok())
            .is_some_and(|ct| ct.trim().to_lowercase().starts_with("image/"));

        if !is_image {
            log::debug!("🖼️ Not an image response: {}", url);
        }
        is_image
    }
}

#[async_trait::async_trait]
impl ImageValidator for HttpImageValidator {
    async fn validate(&self, url: &str) -> bool {
        let parsed = match Url::parse(url) {
            Ok(parsed) => parsed,
            Err(e) => {
                log::debug!("🖼️ Rejecting unparseable image URL '{}': {}", url, e);
                return false;
            }
        };

        if !matches!(parsed.scheme(), "http" | "https") {
            return false;
        }

        if self.is_trusted(&parsed) {
            log::debug!("✅ Trusted image host, skipping load: {}", url);
            return true;
        }

        self.load(parsed).await
    }
}
