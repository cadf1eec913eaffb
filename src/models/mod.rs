use anyhow::Result;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

pub mod menu;
pub mod order;
pub mod staff;
pub mod subscription;

pub use menu::{Availability, MealType, MenuCategory, MenuItem, MenuItemUpdate, NewMenuItem};
pub use order::{Order, OrderDateRange, OrderFilter, OrderItem, OrderStatus};
pub use staff::{
    Assignment, DeliveryStaff, DeliveryStaffUpdate, NewDeliveryStaff, StaffLocation, VehicleType,
};
pub use subscription::{NewSubscriptionPlan, PlanDuration, SubscriptionPlan, SubscriptionPlanUpdate};

/// The backend stores timestamps loosely; accept RFC 3339 and HTTP-date forms.
pub fn parse_timestamp(raw: &str) -> Option<DateTime<Utc>> {
    DateTime::parse_from_rfc3339(raw)
        .or_else(|_| DateTime::parse_from_rfc2822(raw))
        .map(|dt| dt.with_timezone(&Utc))
        .ok()
}

pub(crate) fn ensure_not_blank(field: &str, value: &str) -> Result<()> {
    if value.trim().is_empty() {
        anyhow::bail!("{} must not be empty", field);
    }
    Ok(())
}

pub(crate) fn ensure_price(field: &str, value: f64) -> Result<()> {
    if !value.is_finite() || value < 0.0 {
        anyhow::bail!("{} must be a non-negative amount, got {}", field, value);
    }
    Ok(())
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Vendor {
    #[serde(rename = "_id")]
    pub id: String,
    #[serde(default)]
    pub business_name: String,
    #[serde(default)]
    pub owner_name: Option<String>,
    #[serde(default)]
    pub email: String,
    #[serde(default)]
    pub phone: String,
    #[serde(default)]
    pub address: String,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub profile_picture: Option<String>,
    #[serde(default)]
    pub upi_id: Option<String>,
    #[serde(default)]
    pub qr_code_url: Option<String>,
    #[serde(default)]
    pub payment_enabled: bool,
    #[serde(default)]
    pub created_at: Option<String>,
    #[serde(default)]
    pub updated_at: Option<String>,
}

/// Profile form. Only the fields that are set are sent.
#[derive(Debug, Clone, Default, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct VendorUpdate {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub business_name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub owner_name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub phone: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub address: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
}

impl VendorUpdate {
    pub fn validate(&self) -> Result<()> {
        if let Some(ref name) = self.business_name {
            ensure_not_blank("businessName", name)?;
        }
        if let Some(ref email) = self.email {
            if !email.is_empty() && !email.contains('@') {
                anyhow::bail!("email '{}' is not a valid address", email);
            }
        }
        Ok(())
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PaymentSettings {
    pub upi_id: String,
    pub qr_code_url: String,
    pub payment_enabled: bool,
}

impl PaymentSettings {
    /// Payments can only be switched on with at least one way to pay.
    pub fn validate(&self) -> Result<()> {
        if self.payment_enabled && self.upi_id.trim().is_empty() && self.qr_code_url.trim().is_empty() {
            anyhow::bail!("payments enabled without a UPI id or QR code");
        }
        if !self.upi_id.is_empty() && !self.upi_id.contains('@') {
            anyhow::bail!("UPI id '{}' must look like name@bank", self.upi_id);
        }
        Ok(())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct GeoPoint {
    pub lat: f64,
    pub lng: f64,
}

impl GeoPoint {
    pub fn new(lat: f64, lng: f64) -> Result<Self> {
        if !(-90.0..=90.0).contains(&lat) {
            anyhow::bail!("latitude {} out of range", lat);
        }
        if !(-180.0..=180.0).contains(&lng) {
            anyhow::bail!("longitude {} out of range", lng);
        }
        Ok(Self { lat, lng })
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DashboardStats {
    #[serde(default)]
    pub total_orders: i64,
    #[serde(default)]
    pub total_revenue: f64,
    #[serde(default)]
    pub total_menu_items: i64,
    #[serde(default)]
    pub total_customers: i64,
    #[serde(default)]
    pub active_subscriptions: i64,
    #[serde(default)]
    pub delivery_staff: i64,
    #[serde(default)]
    pub today_revenue: f64,
    #[serde(default)]
    pub today_orders: i64,
    #[serde(default)]
    pub pending_orders: i64,
    #[serde(default)]
    pub completed_orders: i64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RevenuePoint {
    pub date: String,
    pub revenue: f64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PopularDish {
    #[serde(rename = "_id")]
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub orders: i64,
    #[serde(default)]
    pub revenue: f64,
    #[serde(default)]
    pub price: f64,
}

/// Everything the dashboard landing page shows.
#[derive(Debug, Clone, Serialize)]
pub struct DashboardOverview {
    pub stats: DashboardStats,
    pub revenue: Vec<RevenuePoint>,
    pub recent_orders: Vec<Order>,
    pub popular_dishes: Vec<PopularDish>,
}

/// `{"message": "..."}` bodies returned by deletes.
#[derive(Debug, Clone, Deserialize)]
pub struct ApiMessage {
    #[serde(default)]
    pub message: String,
}
