use mongodb::bson::{oid::ObjectId, DateTime};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BookingStatus {
    Pending,
    Confirmed,
    Completed,
    Cancelled,
}

impl BookingStatus {
    /// Pending and confirmed bookings hold seats; cancelled ones release
    /// them back to the pool.
    pub fn holds_seats(&self) -> bool {
        matches!(self, BookingStatus::Pending | BookingStatus::Confirmed)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PaymentStatus {
    Pending,
    Paid,
    Failed,
    RefundPending,
}

/// A rider's claim on seats of one ride. Only ever created after the
/// gateway confirmed the payment; the gateway reference is recorded
/// verbatim.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Booking {
    #[serde(rename = "_id", skip_serializing_if = "Option::is_none")]
    pub id: Option<ObjectId>,
    pub ride_id: ObjectId,
    pub user_id: ObjectId,
    pub seats_booked: u32,
    pub total_amount: f64,
    pub booking_status: BookingStatus,
    pub payment_status: PaymentStatus,
    pub payment_reference: Option<String>,
    pub created_at: Option<DateTime>,
    pub updated_at: Option<DateTime>,
}

#[derive(Debug, Deserialize)]
pub struct BookingInput {
    pub seats: u32,
    pub payment_reference: String,
}
