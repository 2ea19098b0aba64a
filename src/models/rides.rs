use mongodb::bson::{oid::ObjectId, DateTime};
use serde::{Deserialize, Serialize};

use crate::models::location::LocationKind;
use crate::models::pricing::BookingMode;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RideStatus {
    Pending,
    Available,
    Confirmed,
    Completed,
    Cancelled,
}

impl RideStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            RideStatus::Pending => "pending",
            RideStatus::Available => "available",
            RideStatus::Confirmed => "confirmed",
            RideStatus::Completed => "completed",
            RideStatus::Cancelled => "cancelled",
        }
    }

    /// Riders can still buy seats on these. Confirmed rides are locked in,
    /// completed/cancelled are terminal.
    pub fn is_joinable(&self) -> bool {
        matches!(self, RideStatus::Pending | RideStatus::Available)
    }

    pub fn is_terminal(&self) -> bool {
        matches!(self, RideStatus::Completed | RideStatus::Cancelled)
    }

    /// Lifecycle gate for admin status changes. Terminal states accept
    /// nothing; cancellation is reachable from any live state.
    pub fn can_transition(&self, to: RideStatus) -> bool {
        use RideStatus::*;
        matches!(
            (self, to),
            (Pending, Available)
                | (Pending, Confirmed)
                | (Pending, Cancelled)
                | (Available, Confirmed)
                | (Available, Cancelled)
                | (Confirmed, Completed)
                | (Confirmed, Cancelled)
        )
    }
}

/// A scheduled ride. Seat consumption lives in the child `bookings`
/// collection; nothing on this document counts seats down.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Ride {
    #[serde(rename = "_id", skip_serializing_if = "Option::is_none")]
    pub id: Option<ObjectId>,
    pub from_type: LocationKind,
    pub from_location: String,
    pub to_type: LocationKind,
    pub to_location: String,
    /// "YYYY-MM-DD", as the booking forms submit it.
    pub departure_date: String,
    /// "HH:MM", 24h.
    pub departure_time: String,
    pub vehicle_type: String,
    pub vehicle_capacity: Option<u32>,
    /// Seats the creator originally asked for. Advisory only; availability
    /// is always capacity minus booked seats.
    pub seats_requested: Option<u32>,
    /// Whole-vehicle price, set on full bookings.
    pub price: Option<f64>,
    pub price_per_seat: Option<f64>,
    /// Creator: an admin for published rides, the rider for custom bookings.
    pub user_id: Option<ObjectId>,
    pub driver_id: Option<ObjectId>,
    pub pickup_address: Option<String>,
    pub status: RideStatus,
    pub created_at: Option<DateTime>,
    pub updated_at: Option<DateTime>,
}

/// Legacy custom-booking path: an authenticated rider books a whole vehicle
/// (or a block of seats) on a route of their own, which materialises as a
/// confirmed ride they own.
#[derive(Debug, Deserialize)]
pub struct RideInput {
    pub from_type: LocationKind,
    pub from_location: String,
    pub to_type: LocationKind,
    pub to_location: String,
    pub departure_date: String,
    pub departure_time: String,
    pub vehicle_id: String,
    pub mode: BookingMode,
    pub seats: Option<u32>,
    pub pickup_address: Option<String>,
    pub payment_reference: String,
}

#[derive(Debug, Deserialize)]
pub struct AdminRideInput {
    pub from_type: LocationKind,
    pub from_location: String,
    pub to_type: LocationKind,
    pub to_location: String,
    pub departure_date: String,
    pub departure_time: String,
    pub vehicle_id: String,
    pub price_per_seat: Option<f64>,
    pub status: Option<RideStatus>,
}

#[derive(Debug, Deserialize)]
pub struct RideStatusInput {
    pub status: RideStatus,
}

#[derive(Debug, Deserialize)]
pub struct AssignDriverInput {
    pub driver_user_id: String,
}

/// Listing view: the ride plus everything the cards display.
#[derive(Debug, Serialize)]
pub struct AvailableRide {
    pub ride: Ride,
    /// Per-seat figure shown on the card; falls back to the default fare
    /// when no pricing is configured.
    pub display_price_per_seat: f64,
    /// Raw availability; negative means oversold.
    pub available_seats: i64,
    /// Availability clamped at zero, what the join button gates on.
    pub bookable_seats: u32,
}
