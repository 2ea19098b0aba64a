use mongodb::bson::{oid::ObjectId, DateTime};
use serde::{Deserialize, Serialize};

/// Extra record a profile needs before the driver dashboard lets it in.
/// Signing in without one is answered with a forced sign-out instruction.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DriverProfile {
    #[serde(rename = "_id", skip_serializing_if = "Option::is_none")]
    pub id: Option<ObjectId>,
    pub user_id: ObjectId,
    pub license_number: Option<String>,
    pub phone_number: Option<String>,
    #[serde(default = "super::default_true")]
    pub is_active: bool,
    pub created_at: Option<DateTime>,
    pub updated_at: Option<DateTime>,
}

#[derive(Debug, Deserialize)]
pub struct DriverProfileInput {
    pub user_id: String,
    pub license_number: Option<String>,
    pub phone_number: Option<String>,
}
