use anyhow::Result;
use serde::{Deserialize, Serialize};

use super::{ensure_not_blank, GeoPoint};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum VehicleType {
    #[default]
    Bike,
    Scooter,
    Cycle,
    Car,
}

/// Last reported position; coordinates stay null until the first ping.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ReportedLocation {
    #[serde(default)]
    pub lat: Option<f64>,
    #[serde(default)]
    pub lng: Option<f64>,
    #[serde(default)]
    pub updated_at: Option<String>,
}

impl ReportedLocation {
    pub fn point(&self) -> Option<GeoPoint> {
        match (self.lat, self.lng) {
            (Some(lat), Some(lng)) => GeoPoint::new(lat, lng).ok(),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DeliveryStaff {
    #[serde(rename = "_id")]
    pub id: String,
    pub name: String,
    pub phone: String,
    #[serde(default)]
    pub email: String,
    #[serde(default)]
    pub address: String,
    #[serde(default)]
    pub vehicle_type: VehicleType,
    #[serde(default)]
    pub license_number: String,
    #[serde(default)]
    pub assigned_zone: Option<String>,
    #[serde(default)]
    pub is_active: bool,
    #[serde(default)]
    pub assigned_orders: i64,
    #[serde(default)]
    pub location: Option<ReportedLocation>,
    /// Only present right after creation, until the vendor clears it.
    #[serde(default)]
    pub temporary_password: Option<String>,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct NewDeliveryStaff {
    pub name: String,
    pub phone: String,
    pub email: String,
    pub address: String,
    pub vehicle_type: VehicleType,
    pub license_number: String,
    pub assigned_zone: String,
    pub is_active: bool,
}

impl Default for NewDeliveryStaff {
    fn default() -> Self {
        Self {
            name: String::new(),
            phone: String::new(),
            email: String::new(),
            address: String::new(),
            vehicle_type: VehicleType::default(),
            license_number: String::new(),
            assigned_zone: String::new(),
            is_active: true,
        }
    }
}

impl NewDeliveryStaff {
    pub fn validate(&self) -> Result<()> {
        ensure_not_blank("name", &self.name)?;
        validate_phone(&self.phone)
    }
}

#[derive(Debug, Clone, Default, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DeliveryStaffUpdate {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub phone: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub address: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub vehicle_type: Option<VehicleType>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub license_number: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub assigned_zone: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub is_active: Option<bool>,
    /// `Some(None)` is sent as an explicit null, which removes the stored password.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub temporary_password: Option<Option<String>>,
}

impl DeliveryStaffUpdate {
    pub fn validate(&self) -> Result<()> {
        if let Some(ref name) = self.name {
            ensure_not_blank("name", name)?;
        }
        if let Some(ref phone) = self.phone {
            validate_phone(phone)?;
        }
        Ok(())
    }
}

fn validate_phone(phone: &str) -> Result<()> {
    let digits = phone.chars().filter(|c| c.is_ascii_digit()).count();
    let allowed = phone
        .chars()
        .all(|c| c.is_ascii_digit() || matches!(c, '+' | ' ' | '-'));
    if !allowed || !(7..=15).contains(&digits) {
        anyhow::bail!("phone '{}' is not a valid number", phone);
    }
    Ok(())
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StaffLocation {
    pub staff_id: String,
    #[serde(default)]
    pub location: ReportedLocation,
}

/// An order as the delivery person sees it.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Assignment {
    #[serde(rename = "_id")]
    pub id: String,
    #[serde(default)]
    pub customer_name: Option<String>,
    #[serde(default)]
    pub delivery_address: Option<String>,
    #[serde(default)]
    pub status: Option<String>,
    #[serde(default)]
    pub created_at: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_staff_deserialization_with_fresh_password() {
        let json = r#"{
            "_id": "st1",
            "name": "Ravi",
            "phone": "9800011111",
            "vehicleType": "scooter",
            "isActive": true,
            "location": {"lat": null, "lng": null, "updatedAt": null},
            "temporaryPassword": "aB3dE5gH7j"
        }"#;
        let staff: DeliveryStaff = serde_json::from_str(json).unwrap();

        assert_eq!(staff.vehicle_type, VehicleType::Scooter);
        assert_eq!(staff.temporary_password.as_deref(), Some("aB3dE5gH7j"));
        assert!(staff.location.unwrap().point().is_none());
    }

    #[test]
    fn test_clear_temporary_password_sends_null() {
        let update = DeliveryStaffUpdate {
            temporary_password: Some(None),
            ..Default::default()
        };
        let json = serde_json::to_value(&update).unwrap();
        assert_eq!(json, serde_json::json!({"temporaryPassword": null}));
    }

    #[test]
    fn test_new_staff_validation() {
        let staff = NewDeliveryStaff {
            name: "Ravi".to_string(),
            phone: "+91 98000-11111".to_string(),
            ..Default::default()
        };
        assert!(staff.validate().is_ok());

        let bad_phone = NewDeliveryStaff {
            phone: "call me".to_string(),
            ..staff.clone()
        };
        assert!(bad_phone.validate().is_err());

        let short_phone = NewDeliveryStaff {
            phone: "123".to_string(),
            ..staff
        };
        assert!(short_phone.validate().is_err());
    }

    #[test]
    fn test_staff_location_point() {
        let json = r#"{"staffId": "st1", "location": {"lat": 18.5, "lng": 73.8}}"#;
        let loc: StaffLocation = serde_json::from_str(json).unwrap();
        assert_eq!(loc.location.point(), Some(GeoPoint { lat: 18.5, lng: 73.8 }));
    }
}
