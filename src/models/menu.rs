use anyhow::Result;
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use super::{ensure_not_blank, ensure_price};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MenuCategory {
    #[default]
    Main,
    Side,
    Dessert,
    Beverage,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MealType {
    #[default]
    Breakfast,
    Lunch,
    Dinner,
}

impl std::fmt::Display for MealType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            MealType::Breakfast => "Breakfast",
            MealType::Lunch => "Lunch",
            MealType::Dinner => "Dinner",
        };
        write!(f, "{}", s)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Availability {
    #[default]
    Daily,
    Weekly,
    /// Served only between `startDate` and `endDate`.
    Custom,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MenuItem {
    #[serde(rename = "_id")]
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub price: f64,
    #[serde(default)]
    pub category: MenuCategory,
    #[serde(default)]
    pub meal_type: MealType,
    #[serde(default)]
    pub availability: Availability,
    #[serde(default)]
    pub start_date: String,
    #[serde(default)]
    pub end_date: String,
    #[serde(default)]
    pub is_published: bool,
    #[serde(default)]
    pub image_url: Option<String>,
}

#[derive(Debug, Clone, Default, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct NewMenuItem {
    pub name: String,
    pub description: String,
    pub price: f64,
    pub category: MenuCategory,
    pub meal_type: MealType,
    pub availability: Availability,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub start_date: Option<NaiveDate>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub end_date: Option<NaiveDate>,
    pub is_published: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub image_url: Option<String>,
}

impl NewMenuItem {
    pub fn validate(&self) -> Result<()> {
        ensure_not_blank("name", &self.name)?;
        ensure_price("price", self.price)?;
        validate_schedule(Some(self.availability), self.start_date, self.end_date)
    }
}

#[derive(Debug, Clone, Default, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct MenuItemUpdate {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub price: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub category: Option<MenuCategory>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub meal_type: Option<MealType>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub availability: Option<Availability>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub start_date: Option<NaiveDate>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub end_date: Option<NaiveDate>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub is_published: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub image_url: Option<String>,
}

impl MenuItemUpdate {
    pub fn validate(&self) -> Result<()> {
        if let Some(ref name) = self.name {
            ensure_not_blank("name", name)?;
        }
        if let Some(price) = self.price {
            ensure_price("price", price)?;
        }
        validate_schedule(self.availability, self.start_date, self.end_date)
    }

    pub fn is_empty(&self) -> bool {
        serde_json::to_value(self)
            .map(|v| v.as_object().map_or(true, |o| o.is_empty()))
            .unwrap_or(true)
    }
}

fn validate_schedule(
    availability: Option<Availability>,
    start: Option<NaiveDate>,
    end: Option<NaiveDate>,
) -> Result<()> {
    if availability == Some(Availability::Custom) && (start.is_none() || end.is_none()) {
        anyhow::bail!("custom availability needs both a start and an end date");
    }
    if let (Some(start), Some(end)) = (start, end) {
        if start > end {
            anyhow::bail!("start date {} is after end date {}", start, end);
        }
    }
    Ok(())
}
