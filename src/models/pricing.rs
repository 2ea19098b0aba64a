use mongodb::bson::{oid::ObjectId, DateTime};
use serde::{Deserialize, Serialize};

use crate::models::location::LocationKind;

/// Whether a rule's `base_price` is a per-seat or a whole-vehicle figure.
/// Legacy rows carry no unit; the resolver applies the historical
/// arithmetic to those (join divides the base by capacity, full multiplies
/// it by capacity).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PriceUnit {
    PerSeat,
    PerVehicle,
}

/// How the requester intends to book: per-seat on a shared ride, or the
/// whole vehicle.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BookingMode {
    Join,
    Full,
}

/// Fare for a route regardless of vehicle.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RoutePricing {
    #[serde(rename = "_id", skip_serializing_if = "Option::is_none")]
    pub id: Option<ObjectId>,
    pub from_type: LocationKind,
    pub from_location: String,
    pub to_type: LocationKind,
    pub to_location: String,
    pub base_price: f64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub price_unit: Option<PriceUnit>,
    #[serde(default = "super::default_true")]
    pub is_active: bool,
    pub created_at: Option<DateTime>,
    pub updated_at: Option<DateTime>,
}

/// Fare for a route + vehicle combination. `vehicle_type` is matched
/// against `Vehicle.name`. Takes precedence over `RoutePricing`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RouteVehiclePricing {
    #[serde(rename = "_id", skip_serializing_if = "Option::is_none")]
    pub id: Option<ObjectId>,
    pub from_type: LocationKind,
    pub from_location: String,
    pub to_type: LocationKind,
    pub to_location: String,
    pub vehicle_type: String,
    pub base_price: f64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub price_unit: Option<PriceUnit>,
    #[serde(default = "super::default_true")]
    pub is_active: bool,
    pub created_at: Option<DateTime>,
    pub updated_at: Option<DateTime>,
}

/// A requested route as the booking screens submit it. Pricing treats the
/// two endpoints as symmetric.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RouteQuery {
    pub from_type: LocationKind,
    pub from_location: String,
    pub to_type: LocationKind,
    pub to_location: String,
}

impl RouteQuery {
    /// Routes must pair one state with one university.
    pub fn kinds_differ(&self) -> bool {
        self.from_type != self.to_type
    }
}

#[derive(Debug, Deserialize)]
pub struct RoutePricingInput {
    pub from_type: LocationKind,
    pub from_location: String,
    pub to_type: LocationKind,
    pub to_location: String,
    pub base_price: f64,
    pub price_unit: Option<PriceUnit>,
    pub is_active: Option<bool>,
}

#[derive(Debug, Deserialize)]
pub struct RouteVehiclePricingInput {
    pub from_type: LocationKind,
    pub from_location: String,
    pub to_type: LocationKind,
    pub to_location: String,
    pub vehicle_type: String,
    pub base_price: f64,
    pub price_unit: Option<PriceUnit>,
    pub is_active: Option<bool>,
}
