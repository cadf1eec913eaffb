//! Best-effort food photos for menu items.
//!
//! Strategies run in a fixed order and the first success wins: the curated
//! lookup table, then each configured search provider, then a generated SVG
//! placeholder that cannot fail. Nothing in here returns an error to the
//! caller.

pub mod lookup;
pub mod placeholder;
pub mod search;
pub mod validate;

use std::sync::Arc;

use anyhow::Result;
use serde::Serialize;

use crate::config::ImageConfig;

pub use lookup::LookupTable;
pub use search::{ImageSearchProvider, PexelsProvider, PixabayProvider, SearchQuery, UnsplashSourceProvider};
pub use validate::{HttpImageValidator, ImageValidator};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Strategy {
    CuratedLookup,
    Search { provider: String },
    Placeholder,
}

impl std::fmt::Display for Strategy {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Strategy::CuratedLookup => write!(f, "curated"),
            Strategy::Search { provider } => write!(f, "search:{}", provider),
            Strategy::Placeholder => write!(f, "placeholder"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Outcome {
    Accepted,
    /// Strategy had nothing to offer for this name.
    NoMatch,
    /// Candidate produced but failed validation.
    Rejected,
    Failed(String),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolutionAttempt {
    pub strategy: Strategy,
    pub url: Option<String>,
    pub outcome: Outcome,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", content = "src", rename_all = "lowercase")]
pub enum ResolvedImage {
    Url(String),
    Inline(String),
}

impl ResolvedImage {
    /// Value for an `<img src>`.
    pub fn as_src(&self) -> &str {
        match self {
            ResolvedImage::Url(src) | ResolvedImage::Inline(src) => src,
        }
    }

    pub fn into_src(self) -> String {
        match self {
            ResolvedImage::Url(src) | ResolvedImage::Inline(src) => src,
        }
    }

    pub fn is_inline(&self) -> bool {
        matches!(self, ResolvedImage::Inline(_))
    }
}

impl std::fmt::Display for ResolvedImage {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_src())
    }
}

#[derive(Debug, Clone)]
pub struct Resolution {
    pub image: ResolvedImage,
    pub attempts: Vec<ResolutionAttempt>,
}

impl Resolution {
    pub fn strategy(&self) -> Option<&Strategy> {
        self.attempts
            .iter()
            .find(|a| a.outcome == Outcome::Accepted)
            .map(|a| &a.strategy)
    }
}

pub struct ImageResolver {
    table: Arc<LookupTable>,
    providers: Vec<Arc<dyn ImageSearchProvider>>,
    validator: Arc<dyn ImageValidator>,
}

impl ImageResolver {
    pub fn new(
        table: Arc<LookupTable>,
        providers: Vec<Arc<dyn ImageSearchProvider>>,
        validator: Arc<dyn ImageValidator>,
    ) -> Self {
        Self {
            table,
            providers,
            validator,
        }
    }

    /// Curated table plus whichever providers the config enables.
    pub fn from_config(config: &ImageConfig) -> Result<Self> {
        let client = reqwest::Client::builder()
            .timeout(config.search_timeout)
            .redirect(reqwest::redirect::Policy::limited(10))
            .build()?;

        let mut providers: Vec<Arc<dyn ImageSearchProvider>> = Vec::new();
        if config.unsplash_enabled {
            providers.push(Arc::new(UnsplashSourceProvider::new()));
        }
        if let Some(ref key) = config.pexels_api_key {
            providers.push(Arc::new(PexelsProvider::new(key.clone(), client.clone())));
        }
        if let Some(ref key) = config.pixabay_api_key {
            providers.push(Arc::new(PixabayProvider::new(key.clone(), client.clone())));
        }

        let validator = HttpImageValidator::new(
            client,
            config.trusted_domains.clone(),
            config.validation_timeout,
        );

        let names: Vec<&str> = providers.iter().map(|p| p.name()).collect();
        log::info!("🖼️ Image resolver ready (providers: {:?})", names);

        Ok(Self::new(Arc::new(LookupTable::curated()), providers, Arc::new(validator)))
    }

    pub async fn resolve(&self, dish_name: &str, description: Option<&str>) -> ResolvedImage {
        self.resolve_traced(dish_name, description).await.image
    }

    /// Like [`resolve`](Self::resolve) but keeps every attempt made on the way.
    pub async fn resolve_traced(&self, dish_name: &str, description: Option<&str>) -> Resolution {
        let mut attempts = Vec::new();
        let name = dish_name.trim();

        if let Some(description) = description {
            log::debug!("📝 Description for '{}' not used by lookup strategies ({} chars)", name, description.len());
        }

        if name.is_empty() {
            log::debug!("🖼️ Blank dish name, using placeholder");
            return Self::placeholder(name, attempts);
        }

        if let Some(url) = self.curated(name, &mut attempts) {
            log::info!("🖼️ Curated image for '{}'", name);
            return Resolution {
                image: ResolvedImage::Url(url),
                attempts,
            };
        }

        if let Some(url) = self.search(name, &mut attempts).await {
            log::info!("🖼️ Found image for '{}': {}", name, url);
            return Resolution {
                image: ResolvedImage::Url(url),
                attempts,
            };
        }

        log::info!("🖼️ No image found for '{}', using placeholder", name);
        Self::placeholder(name, attempts)
    }

    fn curated(&self, name: &str, attempts: &mut Vec<ResolutionAttempt>) -> Option<String> {
        match self.table.find(name) {
            Some(hit) => {
                log::debug!("📚 Lookup hit '{}' (exact={}) for '{}'", hit.key, hit.exact, name);
                attempts.push(ResolutionAttempt {
                    strategy: Strategy::CuratedLookup,
                    url: Some(hit.url.to_string()),
                    outcome: Outcome::Accepted,
                });
                Some(hit.url.to_string())
            }
            None => {
                attempts.push(ResolutionAttempt {
                    strategy: Strategy::CuratedLookup,
                    url: None,
                    outcome: Outcome::NoMatch,
                });
                None
            }
        }
    }

    async fn search(&self, name: &str, attempts: &mut Vec<ResolutionAttempt>) -> Option<String> {
        let query = SearchQuery::from_dish_name(name)?;

        for provider in &self.providers {
            let strategy = Strategy::Search {
                provider: provider.name().to_string(),
            };

            let candidates = match provider.candidates(&query).await {
                Ok(candidates) => candidates,
                Err(e) => {
                    log::warn!("⚠️ Image provider {} failed for '{}': {}", provider.name(), name, e);
                    attempts.push(ResolutionAttempt {
                        strategy,
                        url: None,
                        outcome: Outcome::Failed(e.to_string()),
                    });
                    continue;
                }
            };

            if candidates.is_empty() {
                attempts.push(ResolutionAttempt {
                    strategy,
                    url: None,
                    outcome: Outcome::NoMatch,
                });
                continue;
            }

            for url in candidates {
                if self.validator.validate(&url).await {
                    attempts.push(ResolutionAttempt {
                        strategy,
                        url: Some(url.clone()),
                        outcome: Outcome::Accepted,
                    });
                    return Some(url);
                }
                attempts.push(ResolutionAttempt {
                    strategy: strategy.clone(),
                    url: Some(url),
                    outcome: Outcome::Rejected,
                });
            }
        }

        None
    }

    fn placeholder(name: &str, mut attempts: Vec<ResolutionAttempt>) -> Resolution {
        attempts.push(ResolutionAttempt {
            strategy: Strategy::Placeholder,
            url: None,
            outcome: Outcome::Accepted,
        });
        Resolution {
            image: ResolvedImage::Inline(placeholder::placeholder_data_uri(name)),
            attempts,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Mutex;

    use placeholder::{decode_data_uri, SVG_DATA_URI_PREFIX};

    struct FakeProvider {
        name: &'static str,
        result: std::result::Result<Vec<String>, String>,
        calls: AtomicUsize,
    }

    impl FakeProvider {
        fn returning(name: &'static str, urls: &[&str]) -> Arc<Self> {
            Arc::new(Self {
                name,
                result: Ok(urls.iter().map(|u| u.to_string()).collect()),
                calls: AtomicUsize::new(0),
            })
        }

        fn failing(name: &'static str) -> Arc<Self> {
            Arc::new(Self {
                name,
                result: Err("service unavailable".to_string()),
                calls: AtomicUsize::new(0),
            })
        }

        fn calls(&self) -> usize {
            self.calls.load(Ordering::SeqCst)
        }
    }

    #[async_trait::async_trait]
    impl ImageSearchProvider for FakeProvider {
        fn name(&self) -> &str {
            self.name
        }

        async fn candidates(&self, _query: &SearchQuery) -> Result<Vec<String>> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            self.result.clone().map_err(|e| anyhow::anyhow!(e))
        }
    }

    /// Accepts only URLs in its list and records everything it was asked about.
    struct FakeValidator {
        valid: Vec<String>,
        seen: Mutex<Vec<String>>,
    }

    impl FakeValidator {
        fn accepting(valid: &[&str]) -> Arc<Self> {
            Arc::new(Self {
                valid: valid.iter().map(|u| u.to_string()).collect(),
                seen: Mutex::new(Vec::new()),
            })
        }

        fn seen(&self) -> Vec<String> {
            self.seen.lock().unwrap().clone()
        }
    }

    #[async_trait::async_trait]
    impl ImageValidator for FakeValidator {
        async fn validate(&self, url: &str) -> bool {
            self.seen.lock().unwrap().push(url.to_string());
            self.valid.iter().any(|v| v == url)
        }
    }

    fn resolver(
        providers: Vec<Arc<dyn ImageSearchProvider>>,
        validator: Arc<dyn ImageValidator>,
    ) -> ImageResolver {
        ImageResolver::new(Arc::new(LookupTable::curated()), providers, validator)
    }

    #[tokio::test]
    async fn test_curated_exact_match_skips_search() {
        let provider = FakeProvider::returning("fake", &["https://img.test/x.jpg"]);
        let validator = FakeValidator::accepting(&["https://img.test/x.jpg"]);
        let resolver = resolver(vec![provider.clone()], validator.clone());

        let resolution = resolver.resolve_traced("Butter Chicken", None).await;

        assert_eq!(
            resolution.image,
            ResolvedImage::Url(
                "https://cdn.pixabay.com/photo/2020/06/30/15/03/chicken-5356775_1280.jpg".to_string()
            )
        );
        assert_eq!(resolution.strategy(), Some(&Strategy::CuratedLookup));
        assert_eq!(provider.calls(), 0);
        assert!(validator.seen().is_empty());
    }

    #[tokio::test]
    async fn test_curated_partial_match_returns_mapped_url() {
        let provider = FakeProvider::returning("fake", &[]);
        let resolver = resolver(vec![provider.clone()], FakeValidator::accepting(&[]));

        let image = resolver.resolve("Hyderabadi Dum Biryani", None).await;

        assert_eq!(
            image.as_src(),
            "https://cdn.pixabay.com/photo/2019/01/29/18/05/biryani-3962073_1280.jpg"
        );
        assert_eq!(provider.calls(), 0);
    }

    #[tokio::test]
    async fn test_search_runs_when_table_has_no_match() {
        let first = FakeProvider::failing("down");
        let second = FakeProvider::returning(
            "up",
            &["https://img.test/broken.jpg", "https://img.test/good.jpg"],
        );
        let validator = FakeValidator::accepting(&["https://img.test/good.jpg"]);
        let resolver = resolver(vec![first.clone(), second.clone()], validator.clone());

        let resolution = resolver.resolve_traced("Thukpa", Some("Tibetan noodle soup")).await;

        assert_eq!(resolution.image, ResolvedImage::Url("https://img.test/good.jpg".to_string()));
        assert_eq!(first.calls(), 1);
        assert_eq!(second.calls(), 1);
        assert_eq!(
            validator.seen(),
            vec!["https://img.test/broken.jpg", "https://img.test/good.jpg"]
        );

        let outcomes: Vec<_> = resolution.attempts.iter().map(|a| a.outcome.clone()).collect();
        assert_eq!(outcomes[0], Outcome::NoMatch);
        assert!(matches!(outcomes[1], Outcome::Failed(_)));
        assert_eq!(outcomes[2], Outcome::Rejected);
        assert_eq!(outcomes[3], Outcome::Accepted);
        assert_eq!(
            resolution.strategy(),
            Some(&Strategy::Search { provider: "up".to_string() })
        );
    }

    #[tokio::test]
    async fn test_first_valid_provider_wins() {
        let first = FakeProvider::returning("first", &["https://img.test/one.jpg"]);
        let second = FakeProvider::returning("second", &["https://img.test/two.jpg"]);
        let validator = FakeValidator::accepting(&["https://img.test/one.jpg", "https://img.test/two.jpg"]);
        let resolver = resolver(vec![first, second.clone()], validator);

        let image = resolver.resolve("Thukpa", None).await;

        assert_eq!(image.as_src(), "https://img.test/one.jpg");
        assert_eq!(second.calls(), 0);
    }

    #[tokio::test]
    async fn test_everything_failing_yields_placeholder_with_name() {
        let resolver = resolver(
            vec![
                FakeProvider::failing("a"),
                FakeProvider::returning("b", &["https://img.test/nope.jpg"]),
            ],
            FakeValidator::accepting(&[]),
        );

        let resolution = resolver.resolve_traced("Quinoa Foam Deconstruction", None).await;

        assert!(resolution.image.is_inline());
        assert!(resolution.image.as_src().starts_with(SVG_DATA_URI_PREFIX));
        let svg = decode_data_uri(resolution.image.as_src()).unwrap();
        assert!(svg.contains("Quinoa Foam Deconstruction"));
        assert_eq!(resolution.strategy(), Some(&Strategy::Placeholder));
    }

    #[tokio::test]
    async fn test_no_providers_yields_placeholder() {
        let resolver = resolver(Vec::new(), FakeValidator::accepting(&[]));
        let image = resolver.resolve("Quinoa Foam Deconstruction", None).await;
        assert!(image.is_inline());
    }

    #[tokio::test]
    async fn test_blank_name_goes_straight_to_placeholder() {
        let provider = FakeProvider::returning("fake", &["https://img.test/x.jpg"]);
        let resolver = resolver(vec![provider.clone()], FakeValidator::accepting(&["https://img.test/x.jpg"]));

        for name in ["", "   ", "\t\n"] {
            let resolution = resolver.resolve_traced(name, None).await;
            assert!(resolution.image.is_inline());
            assert_eq!(resolution.attempts.len(), 1);
        }
        assert_eq!(provider.calls(), 0);
    }

    #[tokio::test]
    async fn test_odd_inputs_never_fail() {
        let resolver = resolver(vec![FakeProvider::failing("a")], FakeValidator::accepting(&[]));
        let long_name = "x".repeat(10_000);

        for name in ["!!!@@@###", "<script>alert(1)</script>", "ñandú asado 🍲", long_name.as_str()] {
            let image = resolver.resolve(name, None).await;
            assert!(!image.as_src().is_empty());
        }
    }

    #[test]
    fn test_resolved_image_serialization() {
        let json = serde_json::to_value(ResolvedImage::Url("https://img.test/a.jpg".to_string())).unwrap();
        assert_eq!(json, serde_json::json!({"kind": "url", "src": "https://img.test/a.jpg"}));
    }
}
