use anyhow::Result;
use serde::{Deserialize, Serialize};

use super::{ensure_not_blank, ensure_price};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PlanDuration {
    Weekly,
    #[default]
    Monthly,
    Quarterly,
    Yearly,
}

impl PlanDuration {
    pub fn days(self) -> u32 {
        match self {
            PlanDuration::Weekly => 7,
            PlanDuration::Monthly => 30,
            PlanDuration::Quarterly => 90,
            PlanDuration::Yearly => 365,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SubscriptionPlan {
    #[serde(rename = "_id")]
    pub id: String,
    pub plan_name: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub price: f64,
    #[serde(default)]
    pub duration: PlanDuration,
    #[serde(default)]
    pub features: Vec<String>,
    #[serde(default = "default_active")]
    pub is_active: bool,
    #[serde(default)]
    pub subscriber_count: i64,
}

fn default_active() -> bool {
    true
}

impl SubscriptionPlan {
    pub fn price_per_day(&self) -> f64 {
        self.price / f64::from(self.duration.days())
    }
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct NewSubscriptionPlan {
    pub plan_name: String,
    pub description: String,
    pub price: f64,
    pub duration: PlanDuration,
    pub features: Vec<String>,
    pub is_active: bool,
}

impl Default for NewSubscriptionPlan {
    fn default() -> Self {
        Self {
            plan_name: String::new(),
            description: String::new(),
            price: 0.0,
            duration: PlanDuration::default(),
            features: Vec::new(),
            is_active: true,
        }
    }
}

impl NewSubscriptionPlan {
    pub fn validate(&self) -> Result<()> {
        ensure_not_blank("planName", &self.plan_name)?;
        ensure_price("price", self.price)?;
        validate_features(&self.features)
    }
}

#[derive(Debug, Clone, Default, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SubscriptionPlanUpdate {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub plan_name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub price: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub duration: Option<PlanDuration>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub features: Option<Vec<String>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub is_active: Option<bool>,
}

impl SubscriptionPlanUpdate {
    pub fn validate(&self) -> Result<()> {
        if let Some(ref name) = self.plan_name {
            ensure_not_blank("planName", name)?;
        }
        if let Some(price) = self.price {
            ensure_price("price", price)?;
        }
        if let Some(ref features) = self.features {
            validate_features(features)?;
        }
        Ok(())
    }
}

fn validate_features(features: &[String]) -> Result<()> {
    if features.iter().any(|f| f.trim().is_empty()) {
        anyhow::bail!("plan features must not contain empty entries");
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_plan_deserialization_defaults() {
        let json = r#"{"_id": "s1", "planName": "Lunch Monthly", "price": 2400}"#;
        let plan: SubscriptionPlan = serde_json::from_str(json).unwrap();

        assert_eq!(plan.duration, PlanDuration::Monthly);
        assert!(plan.is_active);
        assert!(plan.features.is_empty());
        assert_eq!(plan.price_per_day(), 80.0);
    }

    #[test]
    fn test_new_plan_validation() {
        let plan = NewSubscriptionPlan {
            plan_name: "Weekly Veg".to_string(),
            price: 700.0,
            duration: PlanDuration::Weekly,
            features: vec!["Free delivery".to_string()],
            ..Default::default()
        };
        assert!(plan.validate().is_ok());

        let blank_feature = NewSubscriptionPlan {
            features: vec!["".to_string()],
            ..plan.clone()
        };
        assert!(blank_feature.validate().is_err());

        let unnamed = NewSubscriptionPlan {
            plan_name: String::new(),
            ..plan
        };
        assert!(unnamed.validate().is_err());
    }

    #[test]
    fn test_update_serializes_only_set_fields() {
        let update = SubscriptionPlanUpdate {
            is_active: Some(false),
            ..Default::default()
        };
        let json = serde_json::to_value(&update).unwrap();
        assert_eq!(json, serde_json::json!({"isActive": false}));
    }
}
