use mongodb::bson::{oid::ObjectId, DateTime};
use serde::{Deserialize, Serialize};

use crate::models::location::LocationKind;
use crate::models::pricing::{BookingMode, RouteQuery};

/// Wizard state, one variant per step. Each variant carries exactly the
/// data confirmed so far, so a draft can never hold half-valid leftovers
/// from another step.
///
/// The custom path runs Location -> Date -> Vehicle -> Payment. Joining an
/// admin-created ride skips straight to SeatSelection -> Payment because
/// route, schedule and vehicle are fixed by the ride.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "step", rename_all = "snake_case")]
pub enum BookingFlow {
    Location {
        mode: BookingMode,
    },
    Date {
        mode: BookingMode,
        route: RouteQuery,
        pickup_address: Option<String>,
    },
    Vehicle {
        mode: BookingMode,
        route: RouteQuery,
        pickup_address: Option<String>,
        departure_date: String,
        departure_time: String,
    },
    Payment {
        mode: BookingMode,
        route: RouteQuery,
        pickup_address: Option<String>,
        departure_date: String,
        departure_time: String,
        vehicle_id: ObjectId,
        vehicle_type: String,
        seats: u32,
        quoted_total: f64,
    },
    SeatSelection {
        ride_id: ObjectId,
    },
    PrefilledPayment {
        ride_id: ObjectId,
        seats: u32,
        quoted_total: f64,
    },
}

impl BookingFlow {
    pub fn step_name(&self) -> &'static str {
        match self {
            BookingFlow::Location { .. } => "location",
            BookingFlow::Date { .. } => "date",
            BookingFlow::Vehicle { .. } => "vehicle",
            BookingFlow::Payment { .. } => "payment",
            BookingFlow::SeatSelection { .. } => "seat_selection",
            BookingFlow::PrefilledPayment { .. } => "payment",
        }
    }
}

/// A forward submission from the wizard screens.
#[derive(Debug, Clone, Deserialize)]
#[serde(tag = "event", rename_all = "snake_case")]
pub enum FlowEvent {
    SubmitLocation {
        from_type: LocationKind,
        from_location: String,
        to_type: LocationKind,
        to_location: String,
        pickup_address: Option<String>,
    },
    SubmitDate {
        departure_date: String,
        departure_time: String,
    },
    SubmitVehicle {
        vehicle_id: String,
        seats: Option<u32>,
    },
    SubmitSeats {
        seats: u32,
    },
}

/// In-progress wizard state persisted server-side, the counterpart of the
/// session cache the booking screens used to carry across the sign-in
/// redirect. Single-use: deleted when the flow completes.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BookingDraft {
    #[serde(rename = "_id", skip_serializing_if = "Option::is_none")]
    pub id: Option<ObjectId>,
    pub user_id: ObjectId,
    pub flow: BookingFlow,
    pub created_at: Option<DateTime>,
    pub updated_at: Option<DateTime>,
}
