use anyhow::Result;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};

use crate::models::{
    ApiMessage, DashboardOverview, DashboardStats, DeliveryStaff, DeliveryStaffUpdate, MenuItem,
    MenuItemUpdate, NewDeliveryStaff, NewMenuItem, NewSubscriptionPlan, Order, OrderFilter,
    OrderStatus, PaymentSettings, PopularDish, RevenuePoint, StaffLocation, SubscriptionPlan,
    SubscriptionPlanUpdate, Vendor, VendorUpdate,
};
use crate::services::upload::{validate_image_file, ImageFile};

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct QrUploadResponse {
    qr_code_url: String,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct ProfilePictureResponse {
    profile_picture_url: String,
}

#[derive(Serialize)]
struct StatusChange {
    status: OrderStatus,
}

/// Client for the vendor backend. Every request carries the vendor's bearer token.
pub struct VendorApi {
    base_url: String,
    token: String,
    client: reqwest::Client,
}

impl VendorApi {
    pub fn new(base_url: impl Into<String>, token: impl Into<String>) -> Self {
        Self::with_client(base_url, token, reqwest::Client::new())
    }

    pub fn with_client(base_url: impl Into<String>, token: impl Into<String>, client: reqwest::Client) -> Self {
        Self {
            base_url: base_url.into().trim_end_matches('/').to_string(),
            token: token.into(),
            client,
        }
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    async fn send<T: DeserializeOwned>(&self, request: reqwest::RequestBuilder, what: &str) -> Result<T> {
        let response = request
            .header("Authorization", format!("Bearer {}", self.token))
            .send()
            .await?;

        let status = response.status();
        log::debug!("📥 {} -> {}", what, status);

        if !status.is_success() {
            let error_text = response.text().await?;
            log::error!("❌ Vendor API error on {} ({}): {}", what, status, error_text);
            anyhow::bail!("Vendor API error on {} ({}): {}", what, status, error_text);
        }

        Ok(response.json().await?)
    }

    async fn get<T: DeserializeOwned>(&self, path: &str) -> Result<T> {
        self.send(self.client.get(self.url(path)), &format!("GET {}", path))
            .await
    }

    async fn post<B: Serialize + ?Sized, T: DeserializeOwned>(&self, path: &str, body: &B) -> Result<T> {
        self.send(self.client.post(self.url(path)).json(body), &format!("POST {}", path))
            .await
    }

    async fn put<B: Serialize + ?Sized, T: DeserializeOwned>(&self, path: &str, body: &B) -> Result<T> {
        self.send(self.client.put(self.url(path)).json(body), &format!("PUT {}", path))
            .await
    }

    async fn delete(&self, path: &str) -> Result<ApiMessage> {
        self.send(self.client.delete(self.url(path)), &format!("DELETE {}", path))
            .await
    }

    // Vendor profile

    pub async fn current_vendor(&self) -> Result<Vendor> {
        self.get("/vendors/me").await
    }

    pub async fn create_vendor(&self) -> Result<Vendor> {
        self.post("/vendors", &serde_json::json!({})).await
    }

    /// First sign-in has no vendor record yet; create one when the lookup fails.
    pub async fn ensure_vendor(&self) -> Result<Vendor> {
        match self.current_vendor().await {
            Ok(vendor) => Ok(vendor),
            Err(e) => {
                log::warn!("⚠️ Could not fetch vendor ({}), creating one", e);
                let vendor = self.create_vendor().await?;
                log::info!("🆕 Vendor created: {}", vendor.id);
                Ok(vendor)
            }
        }
    }

    pub async fn update_profile(&self, update: &VendorUpdate) -> Result<Vendor> {
        update.validate()?;
        self.put("/vendors/me", update).await
    }

    pub async fn update_payment_settings(&self, settings: &PaymentSettings) -> Result<Vendor> {
        settings.validate()?;
        self.put("/vendors/payment-settings", settings).await
    }

    async fn upload<T: DeserializeOwned>(&self, path: &str, field: &str, file: &ImageFile) -> Result<T> {
        validate_image_file(Some(file))?;

        let part = reqwest::multipart::Part::bytes(file.bytes.clone())
            .file_name(file.file_name.clone())
            .mime_str(&file.content_type)?;
        let form = reqwest::multipart::Form::new().part(field.to_string(), part);

        log::info!("📤 Uploading {} ({} bytes) to {}", file.file_name, file.bytes.len(), path);
        self.send(self.client.post(self.url(path)).multipart(form), &format!("POST {}", path))
            .await
    }

    /// Returns the URL the backend stored the QR code under.
    pub async fn upload_qr_code(&self, file: &ImageFile) -> Result<String> {
        let response: QrUploadResponse = self.upload("/vendors/upload-qr", "qrCode", file).await?;
        Ok(response.qr_code_url)
    }

    pub async fn upload_profile_picture(&self, file: &ImageFile) -> Result<String> {
        let response: ProfilePictureResponse = self
            .upload("/vendors/upload-profile-picture", "profilePicture", file)
            .await?;
        Ok(response.profile_picture_url)
    }

    // Menus

    pub async fn list_menus(&self) -> Result<Vec<MenuItem>> {
        self.get("/menus").await
    }

    pub async fn create_menu(&self, item: &NewMenuItem) -> Result<MenuItem> {
        item.validate()?;
        self.post("/menus", item).await
    }

    pub async fn update_menu(&self, id: &str, update: &MenuItemUpdate) -> Result<MenuItem> {
        update.validate()?;
        if update.is_empty() {
            anyhow::bail!("menu update for {} has no fields", id);
        }
        self.put(&format!("/menus/{}", id), update).await
    }

    pub async fn delete_menu(&self, id: &str) -> Result<()> {
        let message = self.delete(&format!("/menus/{}", id)).await?;
        log::info!("🗑️ {}", message.message);
        Ok(())
    }

    pub async fn set_menu_published(&self, id: &str, published: bool) -> Result<MenuItem> {
        let update = MenuItemUpdate {
            is_published: Some(published),
            ..Default::default()
        };
        self.update_menu(id, &update).await
    }

    // Orders

    pub async fn list_orders(&self, filter: &OrderFilter) -> Result<Vec<Order>> {
        let request = self.client.get(self.url("/orders")).query(&filter.query_pairs());
        self.send(request, "GET /orders").await
    }

    pub async fn get_order(&self, id: &str) -> Result<Order> {
        self.get(&format!("/orders/{}", id)).await
    }

    /// Closed orders (delivered, cancelled) are refused without a request.
    pub async fn update_order_status(&self, order: &Order, status: OrderStatus) -> Result<Order> {
        if order.status.is_terminal() {
            anyhow::bail!("order {} is already {} and cannot change", order.short_id(), order.status);
        }
        self.put(&format!("/orders/{}", order.id), &StatusChange { status })
            .await
    }

    // Subscription plans

    pub async fn list_subscriptions(&self) -> Result<Vec<SubscriptionPlan>> {
        self.get("/subscriptions").await
    }

    pub async fn create_subscription(&self, plan: &NewSubscriptionPlan) -> Result<SubscriptionPlan> {
        plan.validate()?;
        self.post("/subscriptions", plan).await
    }

    pub async fn update_subscription(&self, id: &str, update: &SubscriptionPlanUpdate) -> Result<SubscriptionPlan> {
        update.validate()?;
        self.put(&format!("/subscriptions/{}", id), update).await
    }

    pub async fn delete_subscription(&self, id: &str) -> Result<()> {
        self.delete(&format!("/subscriptions/{}", id)).await?;
        Ok(())
    }

    pub async fn set_subscription_active(&self, id: &str, active: bool) -> Result<SubscriptionPlan> {
        let update = SubscriptionPlanUpdate {
            is_active: Some(active),
            ..Default::default()
        };
        self.update_subscription(id, &update).await
    }

    // Delivery staff

    pub async fn list_staff(&self) -> Result<Vec<DeliveryStaff>> {
        self.get("/delivery-staff").await
    }

    /// The returned record carries the generated temporary password.
    pub async fn create_staff(&self, staff: &NewDeliveryStaff) -> Result<DeliveryStaff> {
        staff.validate()?;
        let created: DeliveryStaff = self.post("/delivery-staff", staff).await?;
        log::info!("🛵 Delivery staff created: {} ({})", created.name, created.phone);
        Ok(created)
    }

    pub async fn update_staff(&self, id: &str, update: &DeliveryStaffUpdate) -> Result<DeliveryStaff> {
        update.validate()?;
        self.put(&format!("/delivery-staff/{}", id), update).await
    }

    pub async fn delete_staff(&self, id: &str) -> Result<()> {
        self.delete(&format!("/delivery-staff/{}", id)).await?;
        Ok(())
    }

    pub async fn set_staff_active(&self, id: &str, active: bool) -> Result<DeliveryStaff> {
        let update = DeliveryStaffUpdate {
            is_active: Some(active),
            ..Default::default()
        };
        self.update_staff(id, &update).await
    }

    /// Once the vendor has handed the password over, stop storing it.
    pub async fn clear_temporary_password(&self, id: &str) -> Result<DeliveryStaff> {
        let update = DeliveryStaffUpdate {
            temporary_password: Some(None),
            ..Default::default()
        };
        self.update_staff(id, &update).await
    }

    pub async fn staff_location(&self, staff_id: &str) -> Result<StaffLocation> {
        self.get(&format!("/delivery/location/{}", staff_id)).await
    }

    // Dashboard

    pub async fn dashboard_stats(&self) -> Result<DashboardStats> {
        self.get("/dashboard/stats").await
    }

    pub async fn dashboard_revenue(&self) -> Result<Vec<RevenuePoint>> {
        self.get("/dashboard/revenue").await
    }

    pub async fn dashboard_recent_orders(&self) -> Result<Vec<Order>> {
        self.get("/dashboard/orders").await
    }

    pub async fn dashboard_popular_dishes(&self) -> Result<Vec<PopularDish>> {
        self.get("/dashboard/popular-dishes").await
    }

    /// All four dashboard queries at once; any failure fails the whole overview.
    pub async fn dashboard_overview(&self) -> Result<DashboardOverview> {
        let (stats, revenue, recent_orders, popular_dishes) = tokio::try_join!(
            self.dashboard_stats(),
            self.dashboard_revenue(),
            self.dashboard_recent_orders(),
            self.dashboard_popular_dishes(),
        )?;

        Ok(DashboardOverview {
            stats,
            revenue,
            recent_orders,
            popular_dishes,
        })
    }
}
