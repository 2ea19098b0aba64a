use mongodb::bson::{oid::ObjectId, DateTime};
use serde::{Deserialize, Serialize};

/// Admin-managed vehicle type. Pricing rules reference vehicles by `name`
/// (free text), not by id, so renames effectively detach existing rules.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Vehicle {
    #[serde(rename = "_id", skip_serializing_if = "Option::is_none")]
    pub id: Option<ObjectId>,
    pub name: String,
    /// Seats, always > 0 in well-formed documents.
    pub capacity: u32,
    /// Flat fallback fare when no route rule matches.
    pub base_price: f64,
    #[serde(default = "super::default_true")]
    pub is_active: bool,
    pub created_at: Option<DateTime>,
    pub updated_at: Option<DateTime>,
}

#[derive(Debug, Deserialize)]
pub struct VehicleInput {
    pub name: String,
    pub capacity: u32,
    pub base_price: f64,
    pub is_active: Option<bool>,
}
