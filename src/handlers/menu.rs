use anyhow::Result;
use std::sync::Arc;

use crate::models::{MenuItem, MenuItemUpdate, NewMenuItem};
use crate::services::images::ImageResolver;
use crate::services::VendorApi;

/// Menu workflows that need both the backend and the image resolver.
pub struct MenuHandler {
    api: Arc<VendorApi>,
    resolver: Arc<ImageResolver>,
}

impl MenuHandler {
    pub fn new(api: Arc<VendorApi>, resolver: Arc<ImageResolver>) -> Self {
        Self { api, resolver }
    }

    /// Creates the item, resolving a picture first when the vendor didn't supply one.
    pub async fn create_item(&self, mut item: NewMenuItem) -> Result<MenuItem> {
        item.validate()?;

        let has_image = item
            .image_url
            .as_deref()
            .map(|url| !url.trim().is_empty())
            .unwrap_or(false);

        if !has_image {
            let description = Some(item.description.as_str()).filter(|d| !d.trim().is_empty());
            let image = self.resolver.resolve(&item.name, description).await;
            log::info!(
                "🖼️ Image for '{}': {}",
                item.name,
                if image.is_inline() { "placeholder" } else { image.as_src() }
            );
            item.image_url = Some(image.into_src());
        }

        self.api.create_menu(&item).await
    }

    /// Re-resolves the picture for an existing item and stores it.
    pub async fn refresh_image(&self, item: &MenuItem) -> Result<MenuItem> {
        let description = Some(item.description.as_str()).filter(|d| !d.trim().is_empty());
        let image = self.resolver.resolve(&item.name, description).await;

        let update = MenuItemUpdate {
            image_url: Some(image.into_src()),
            ..Default::default()
        };
        self.api.update_menu(&item.id, &update).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::services::images::{ImageValidator, LookupTable};
    use wiremock::matchers::{body_partial_json, method, path};
    use wiremock::{Mock, MockServer, Request, ResponseTemplate};

    struct RejectAll;

    #[async_trait::async_trait]
    impl ImageValidator for RejectAll {
        async fn validate(&self, _url: &str) -> bool {
            false
        }
    }

    fn handler(server: &MockServer) -> MenuHandler {
        let resolver = ImageResolver::new(Arc::new(LookupTable::curated()), Vec::new(), Arc::new(RejectAll));
        MenuHandler::new(
            Arc::new(VendorApi::new(server.uri(), "vendor-token")),
            Arc::new(resolver),
        )
    }

    fn echo_menu(request: &Request) -> ResponseTemplate {
        let mut body: serde_json::Value = serde_json::from_slice(&request.body).unwrap_or_default();
        body["_id"] = serde_json::json!("m1");
        ResponseTemplate::new(201).set_body_json(body)
    }

    #[tokio::test]
    async fn test_create_item_attaches_curated_image() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/menus"))
            .and(body_partial_json(serde_json::json!({
                "name": "Paneer Tikka",
                "imageUrl": "https://cdn.pixabay.com/photo/2017/06/16/11/38/paneer-2408952_1280.jpg"
            })))
            .respond_with(echo_menu)
            .expect(1)
            .mount(&server)
            .await;

        let item = NewMenuItem {
            name: "Paneer Tikka".to_string(),
            price: 180.0,
            ..Default::default()
        };
        let created = handler(&server).create_item(item).await.unwrap();
        assert_eq!(created.id, "m1");
        assert!(created.image_url.unwrap().contains("paneer"));
    }

    #[tokio::test]
    async fn test_create_item_falls_back_to_placeholder() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/menus"))
            .respond_with(echo_menu)
            .mount(&server)
            .await;

        let item = NewMenuItem {
            name: "Quinoa Foam Deconstruction".to_string(),
            price: 450.0,
            ..Default::default()
        };
        let created = handler(&server).create_item(item).await.unwrap();
        assert!(created.image_url.unwrap().starts_with("data:image/svg+xml;base64,"));
    }

    #[tokio::test]
    async fn test_create_item_keeps_vendor_image() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/menus"))
            .and(body_partial_json(serde_json::json!({"imageUrl": "https://files.test/thali.jpg"})))
            .respond_with(echo_menu)
            .expect(1)
            .mount(&server)
            .await;

        let item = NewMenuItem {
            name: "Veg Thali".to_string(),
            price: 150.0,
            image_url: Some("https://files.test/thali.jpg".to_string()),
            ..Default::default()
        };
        handler(&server).create_item(item).await.unwrap();
    }

    #[tokio::test]
    async fn test_invalid_item_is_rejected_before_anything_else() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(201))
            .expect(0)
            .mount(&server)
            .await;

        let item = NewMenuItem {
            name: "Masala Dosa".to_string(),
            price: -5.0,
            ..Default::default()
        };
        assert!(handler(&server).create_item(item).await.is_err());
    }

    #[tokio::test]
    async fn test_refresh_image() {
        let server = MockServer::start().await;
        Mock::given(method("PUT"))
            .and(path("/menus/m7"))
            .and(body_partial_json(serde_json::json!({
                "imageUrl": "https://cdn.pixabay.com/photo/2019/01/29/18/05/biryani-3962073_1280.jpg"
            })))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "_id": "m7",
                "name": "Veg Biryani",
                "imageUrl": "https://cdn.pixabay.com/photo/2019/01/29/18/05/biryani-3962073_1280.jpg"
            })))
            .expect(1)
            .mount(&server)
            .await;

        let item: MenuItem = serde_json::from_value(serde_json::json!({
            "_id": "m7", "name": "Veg Biryani", "price": 120
        }))
        .unwrap();
        let updated = handler(&server).refresh_image(&item).await.unwrap();
        assert!(updated.image_url.unwrap().contains("biryani"));
    }
}
