use anyhow::Result;
use serde::Deserialize;

const UNSPLASH_SOURCE_URL: &str = "https://source.unsplash.com";
const PEXELS_API_URL: &str = "https://api.pexels.com";
const PIXABAY_API_URL: &str = "https://pixabay.com";

/// Search terms derived from a dish name: letters and single spaces only.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SearchQuery {
    dish: String,
}

impl SearchQuery {
    /// `None` when nothing searchable is left after cleaning.
    pub fn from_dish_name(name: &str) -> Option<Self> {
        let cleaned: String = name
            .to_lowercase()
            .chars()
            .filter(|c| c.is_ascii_lowercase() || c.is_whitespace())
            .collect();
        let dish = cleaned.split_whitespace().collect::<Vec<_>>().join(" ");

        if dish.is_empty() {
            None
        } else {
            Some(Self { dish })
        }
    }

    pub fn dish(&self) -> &str {
        &self.dish
    }

    /// The dish with a generic "food" qualifier, for full-text search APIs.
    pub fn qualified(&self) -> String {
        format!("{} food", self.dish)
    }
}

/// A third-party image catalog queried by keyword.
#[async_trait::async_trait]
pub trait ImageSearchProvider: Send + Sync {
    fn name(&self) -> &str;

    /// Candidate image URLs, best first. May be empty.
    async fn candidates(&self, query: &SearchQuery) -> Result<Vec<String>>;
}

/// Unsplash Source answers a keyword URL with a redirect to a matching photo,
/// so candidates are built locally and proven by loading them.
pub struct UnsplashSourceProvider {
    base_url: String,
}

impl UnsplashSourceProvider {
    pub fn new() -> Self {
        Self::with_base_url(UNSPLASH_SOURCE_URL)
    }

    pub fn with_base_url(base_url: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into().trim_end_matches('/').to_string(),
        }
    }

    fn term_variants(query: &SearchQuery) -> Vec<String> {
        let dish = query.dish();
        vec![
            format!("{}-food", dish),
            dish.to_string(),
            format!("indian-{}", dish),
            format!("{}-dish", dish),
        ]
    }
}

impl Default for UnsplashSourceProvider {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait::async_trait]
impl ImageSearchProvider for UnsplashSourceProvider {
    fn name(&self) -> &str {
        "unsplash"
    }

    async fn candidates(&self, query: &SearchQuery) -> Result<Vec<String>> {
        Ok(Self::term_variants(query)
            .iter()
            .map(|term| {
                let encoded: String = url::form_urlencoded::byte_serialize(term.as_bytes()).collect();
                format!("{}/800x600/?{}", self.base_url, encoded)
            })
            .collect())
    }
}

#[derive(Debug, Deserialize)]
struct PexelsSearchResponse {
    #[serde(default)]
    photos: Vec<PexelsPhoto>,
}

#[derive(Debug, Deserialize)]
struct PexelsPhoto {
    src: PexelsPhotoSources,
}

#[derive(Debug, Deserialize)]
struct PexelsPhotoSources {
    large: Option<String>,
    medium: Option<String>,
}

pub struct PexelsProvider {
    api_key: String,
    base_url: String,
    client: reqwest::Client,
}

impl PexelsProvider {
    pub fn new(api_key: String, client: reqwest::Client) -> Self {
        Self::with_base_url(api_key, client, PEXELS_API_URL)
    }

    pub fn with_base_url(api_key: String, client: reqwest::Client, base_url: impl Into<String>) -> Self {
        Self {
            api_key,
            base_url: base_url.into().trim_end_matches('/').to_string(),
            client,
        }
    }
}

#[async_trait::async_trait]
impl ImageSearchProvider for PexelsProvider {
    fn name(&self) -> &str {
        "pexels"
    }

    async fn candidates(&self, query: &SearchQuery) -> Result<Vec<String>> {
        let url = format!("{}/v1/search", self.base_url);
        let response = self
            .client
            .get(&url)
            .header("Authorization", &self.api_key)
            .query(&[("query", query.qualified().as_str()), ("per_page", "1")])
            .send()
            .await?;

        if !response.status().is_success() {
            let status = response.status();
            let error_text = response.text().await?;
            anyhow::bail!("Pexels API error ({}): {}", status, error_text);
        }

        let body: PexelsSearchResponse = response.json().await?;
        log::debug!("🔎 Pexels returned {} photos for '{}'", body.photos.len(), query.dish());

        Ok(body
            .photos
            .into_iter()
            .filter_map(|p| p.src.large.or(p.src.medium))
            .collect())
    }
}

#[derive(Debug, Deserialize)]
struct PixabaySearchResponse {
    #[serde(default)]
    hits: Vec<PixabayHit>,
}

#[derive(Debug, Deserialize)]
struct PixabayHit {
    #[serde(rename = "webformatURL")]
    webformat_url: Option<String>,
    #[serde(rename = "largeImageURL")]
    large_image_url: Option<String>,
}

pub struct PixabayProvider {
    api_key: String,
    base_url: String,
    client: reqwest::Client,
}

impl PixabayProvider {
    pub fn new(api_key: String, client: reqwest::Client) -> Self {
        Self::with_base_url(api_key, client, PIXABAY_API_URL)
    }

    pub fn with_base_url(api_key: String, client: reqwest::Client, base_url: impl Into<String>) -> Self {
        Self {
            api_key,
            base_url: base_url.into().trim_end_matches('/').to_string(),
            client,
        }
    }
}

#[async_trait::async_trait]
impl ImageSearchProvider for PixabayProvider {
    fn name(&self) -> &str {
        "pixabay"
    }

    async fn candidates(&self, query: &SearchQuery) -> Result<Vec<String>> {
        let url = format!("{}/api/", self.base_url);
        let response = self
            .client
            .get(&url)
            .query(&[
                ("key", self.api_key.as_str()),
                ("q", query.dish()),
                ("image_type", "photo"),
                ("category", "food"),
                ("safesearch", "true"),
                // Pixabay rejects per_page below 3
                ("per_page", "3"),
            ])
            .send()
            .await?;

        if !response.status().is_success() {
            let status = response.status();
            let error_text = response.text().await?;
            anyhow::bail!("Pixabay API error ({}): {}", status, error_text);
        }

        let body: PixabaySearchResponse = response.json().await?;
        log::debug!("🔎 Pixabay returned {} hits for '{}'", body.hits.len(), query.dish());

        Ok(body
            .hits
            .into_iter()
            .filter_map(|h| h.webformat_url.or(h.large_image_url))
            .collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use wiremock::matchers::{header, method, path, query_param};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    #[test]
    fn test_query_cleaning() {
        let query = SearchQuery::from_dish_name("  Chicken 65 (Spicy!)  Fry ").unwrap();
        assert_eq!(query.dish(), "chicken spicy fry");
        assert_eq!(query.qualified(), "chicken spicy fry food");

        assert!(SearchQuery::from_dish_name("").is_none());
        assert!(SearchQuery::from_dish_name("123 !!!").is_none());
    }

    #[tokio::test]
    async fn test_unsplash_candidates_cover_term_variants() {
        let provider = UnsplashSourceProvider::with_base_url("https://source.test/");
        let query = SearchQuery::from_dish_name("Misal Pav").unwrap();
        let urls = provider.candidates(&query).await.unwrap();

        assert_eq!(
            urls,
            vec![
                "https://source.test/800x600/?misal+pav-food",
                "https://source.test/800x600/?misal+pav",
                "https://source.test/800x600/?indian-misal+pav",
                "https://source.test/800x600/?misal+pav-dish",
            ]
        );
    }

    #[tokio::test]
    async fn test_pexels_parses_first_photo() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/v1/search"))
            .and(header("Authorization", "pexels-key"))
            .and(query_param("query", "misal pav food"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "photos": [{"src": {"large": "https://images.pexels.com/photos/1/large.jpeg"}}]
            })))
            .expect(1)
            .mount(&server)
            .await;

        let provider = PexelsProvider::with_base_url("pexels-key".to_string(), reqwest::Client::new(), server.uri());
        let query = SearchQuery::from_dish_name("Misal Pav").unwrap();
        let urls = provider.candidates(&query).await.unwrap();

        assert_eq!(urls, vec!["https://images.pexels.com/photos/1/large.jpeg"]);
    }

    #[tokio::test]
    async fn test_pexels_error_status_is_an_error() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(401).set_body_string("bad key"))
            .mount(&server)
            .await;

        let provider = PexelsProvider::with_base_url("nope".to_string(), reqwest::Client::new(), server.uri());
        let query = SearchQuery::from_dish_name("thali").unwrap();
        let err = provider.candidates(&query).await.unwrap_err();

        assert!(err.to_string().contains("401"));
    }

    #[tokio::test]
    async fn test_pixabay_parses_hits() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/api/"))
            .and(query_param("key", "pixabay-key"))
            .and(query_param("q", "kanda poha"))
            .and(query_param("category", "food"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "total": 2,
                "hits": [
                    {"webformatURL": "https://cdn.pixabay.com/photo/a_640.jpg"},
                    {"largeImageURL": "https://cdn.pixabay.com/photo/b_1280.jpg"}
                ]
            })))
            .mount(&server)
            .await;

        let provider = PixabayProvider::with_base_url("pixabay-key".to_string(), reqwest::Client::new(), server.uri());
        let query = SearchQuery::from_dish_name("Kanda Poha").unwrap();
        let urls = provider.candidates(&query).await.unwrap();

        assert_eq!(
            urls,
            vec![
                "https://cdn.pixabay.com/photo/a_640.jpg",
                "https://cdn.pixabay.com/photo/b_1280.jpg",
            ]
        );
    }
}
