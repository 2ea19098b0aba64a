use chrono::{NaiveDate, NaiveTime};
use mongodb::bson::oid::ObjectId;
use serde::Serialize;

use crate::models::booking_flow::{BookingFlow, FlowEvent};
use crate::models::pricing::{BookingMode, RouteQuery};

/// Why a forward transition was refused. Serialized straight into the 400
/// body so the screens can highlight the right field.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum TransitionError {
    EndpointMissing,
    SameKindEndpoints,
    PickupAddressRequired,
    MissingDate,
    MissingTime,
    InvalidDate,
    InvalidTime,
    DepartureInPast,
    VehicleRequired,
    UnpricedVehicle,
    InvalidSeatCount,
    NotEnoughSeats,
    EventMismatch,
    AlreadyAtFirstStep,
    NotReadyForPayment,
}

impl TransitionError {
    pub fn message(&self) -> &'static str {
        match self {
            TransitionError::EndpointMissing => "Both a state and a university must be selected",
            TransitionError::SameKindEndpoints => {
                "A route must pair one state with one university"
            }
            TransitionError::PickupAddressRequired => {
                "Full bookings need a pickup address or map point"
            }
            TransitionError::MissingDate => "Departure date is required",
            TransitionError::MissingTime => "Departure time is required",
            TransitionError::InvalidDate => "Departure date must be YYYY-MM-DD",
            TransitionError::InvalidTime => "Departure time must be HH:MM",
            TransitionError::DepartureInPast => "Departure date cannot be in the past",
            TransitionError::VehicleRequired => "A vehicle must be selected",
            TransitionError::UnpricedVehicle => "No price is configured for this selection",
            TransitionError::InvalidSeatCount => "At least one seat must be booked",
            TransitionError::NotEnoughSeats => "Not enough seats left on this ride",
            TransitionError::EventMismatch => "Submission does not match the current step",
            TransitionError::AlreadyAtFirstStep => "Already at the first step",
            TransitionError::NotReadyForPayment => "The wizard has not reached the payment step",
        }
    }
}

/// The vehicle the wizard resolved from a SubmitVehicle event.
#[derive(Debug, Clone)]
pub struct SelectedVehicle {
    pub id: ObjectId,
    pub name: String,
}

/// Everything the transition function needs from the outside world, fetched
/// by the HTTP layer beforehand so the machine stays pure and unit-testable.
#[derive(Debug, Clone)]
pub struct AdvanceContext {
    pub today: NaiveDate,
    /// Joinable rides on the submitted route; consulted by the location
    /// guard in join mode.
    pub candidate_rides: Option<u64>,
    pub vehicle: Option<SelectedVehicle>,
    /// Resolved fare for the submitted selection.
    pub quote_total: Option<f64>,
    /// Seats still bookable on a prefilled ride.
    pub bookable_seats: Option<u32>,
}

impl AdvanceContext {
    pub fn new(today: NaiveDate) -> Self {
        AdvanceContext {
            today,
            candidate_rides: None,
            vehicle: None,
            quote_total: None,
            bookable_seats: None,
        }
    }
}

/// Outcome of a successful forward call.
#[derive(Debug, Clone, PartialEq)]
pub enum Advance {
    Next(BookingFlow),
    /// Join mode with zero candidate rides on the route: the mode flips to
    /// full and the transition stays blocked until the user resubmits.
    SwitchedToFull(BookingFlow),
}

/// What the completed wizard asks the caller to materialise.
#[derive(Debug, Clone, PartialEq)]
pub enum Completion {
    CustomRide {
        mode: BookingMode,
        route: RouteQuery,
        pickup_address: Option<String>,
        departure_date: String,
        departure_time: String,
        vehicle_id: ObjectId,
        vehicle_type: String,
        seats: u32,
        total: f64,
    },
    JoinRide {
        ride_id: ObjectId,
        seats: u32,
        total: f64,
    },
}

pub struct BookingFlowService;

impl BookingFlowService {
    pub fn advance(
        flow: &BookingFlow,
        event: FlowEvent,
        ctx: &AdvanceContext,
    ) -> Result<Advance, TransitionError> {
        match (flow, event) {
            (
                BookingFlow::Location { mode },
                FlowEvent::SubmitLocation {
                    from_type,
                    from_location,
                    to_type,
                    to_location,
                    pickup_address,
                },
            ) => {
                if from_location.trim().is_empty() || to_location.trim().is_empty() {
                    return Err(TransitionError::EndpointMissing);
                }
                if from_type == to_type {
                    return Err(TransitionError::SameKindEndpoints);
                }
                let pickup_address =
                    pickup_address.filter(|address| !address.trim().is_empty());
                if *mode == BookingMode::Full && pickup_address.is_none() {
                    return Err(TransitionError::PickupAddressRequired);
                }
                if *mode == BookingMode::Join && ctx.candidate_rides.unwrap_or(0) == 0 {
                    return Ok(Advance::SwitchedToFull(BookingFlow::Location {
                        mode: BookingMode::Full,
                    }));
                }
                Ok(Advance::Next(BookingFlow::Date {
                    mode: *mode,
                    route: RouteQuery {
                        from_type,
                        from_location: from_location.trim().to_string(),
                        to_type,
                        to_location: to_location.trim().to_string(),
                    },
                    pickup_address,
                }))
            }
            (
                BookingFlow::Date {
                    mode,
                    route,
                    pickup_address,
                },
                FlowEvent::SubmitDate {
                    departure_date,
                    departure_time,
                },
            ) => {
                if departure_date.trim().is_empty() {
                    return Err(TransitionError::MissingDate);
                }
                if departure_time.trim().is_empty() {
                    return Err(TransitionError::MissingTime);
                }
                let date = NaiveDate::parse_from_str(departure_date.trim(), "%Y-%m-%d")
                    .map_err(|_| TransitionError::InvalidDate)?;
                NaiveTime::parse_from_str(departure_time.trim(), "%H:%M")
                    .map_err(|_| TransitionError::InvalidTime)?;
                if date < ctx.today {
                    return Err(TransitionError::DepartureInPast);
                }
                Ok(Advance::Next(BookingFlow::Vehicle {
                    mode: *mode,
                    route: route.clone(),
                    pickup_address: pickup_address.clone(),
                    departure_date: departure_date.trim().to_string(),
                    departure_time: departure_time.trim().to_string(),
                }))
            }
            (
                BookingFlow::Vehicle {
                    mode,
                    route,
                    pickup_address,
                    departure_date,
                    departure_time,
                },
                FlowEvent::SubmitVehicle { seats, .. },
            ) => {
                let seats = seats.unwrap_or(1);
                if seats == 0 {
                    return Err(TransitionError::InvalidSeatCount);
                }
                let vehicle = ctx
                    .vehicle
                    .as_ref()
                    .ok_or(TransitionError::VehicleRequired)?;
                let total = ctx.quote_total.unwrap_or(0.0);
                if total <= 0.0 {
                    return Err(TransitionError::UnpricedVehicle);
                }
                Ok(Advance::Next(BookingFlow::Payment {
                    mode: *mode,
                    route: route.clone(),
                    pickup_address: pickup_address.clone(),
                    departure_date: departure_date.clone(),
                    departure_time: departure_time.clone(),
                    vehicle_id: vehicle.id,
                    vehicle_type: vehicle.name.clone(),
                    seats,
                    quoted_total: total,
                }))
            }
            (BookingFlow::SeatSelection { ride_id }, FlowEvent::SubmitSeats { seats }) => {
                if seats == 0 {
                    return Err(TransitionError::InvalidSeatCount);
                }
                if let Some(bookable) = ctx.bookable_seats {
                    if seats > bookable {
                        return Err(TransitionError::NotEnoughSeats);
                    }
                }
                let total = ctx.quote_total.unwrap_or(0.0);
                if total <= 0.0 {
                    return Err(TransitionError::UnpricedVehicle);
                }
                Ok(Advance::Next(BookingFlow::PrefilledPayment {
                    ride_id: *ride_id,
                    seats,
                    quoted_total: total,
                }))
            }
            _ => Err(TransitionError::EventMismatch),
        }
    }

    /// Mirror of the forward transitions. Data entered on the abandoned step
    /// is dropped; everything confirmed earlier is kept.
    pub fn back(flow: &BookingFlow) -> Result<BookingFlow, TransitionError> {
        match flow {
            BookingFlow::Location { .. } | BookingFlow::SeatSelection { .. } => {
                Err(TransitionError::AlreadyAtFirstStep)
            }
            BookingFlow::Date { mode, .. } => Ok(BookingFlow::Location { mode: *mode }),
            BookingFlow::Vehicle {
                mode,
                route,
                pickup_address,
                ..
            } => Ok(BookingFlow::Date {
                mode: *mode,
                route: route.clone(),
                pickup_address: pickup_address.clone(),
            }),
            BookingFlow::Payment {
                mode,
                route,
                pickup_address,
                departure_date,
                departure_time,
                ..
            } => Ok(BookingFlow::Vehicle {
                mode: *mode,
                route: route.clone(),
                pickup_address: pickup_address.clone(),
                departure_date: departure_date.clone(),
                departure_time: departure_time.clone(),
            }),
            BookingFlow::PrefilledPayment { ride_id, .. } => {
                Ok(BookingFlow::SeatSelection { ride_id: *ride_id })
            }
        }
    }

    /// What to insert once payment is confirmed. Only valid from a payment
    /// step; the flow itself is left untouched so a failed insert keeps the
    /// user on payment to retry.
    pub fn complete(flow: &BookingFlow) -> Result<Completion, TransitionError> {
        match flow {
            BookingFlow::Payment {
                mode,
                route,
                pickup_address,
                departure_date,
                departure_time,
                vehicle_id,
                vehicle_type,
                seats,
                quoted_total,
            } => Ok(Completion::CustomRide {
                mode: *mode,
                route: route.clone(),
                pickup_address: pickup_address.clone(),
                departure_date: departure_date.clone(),
                departure_time: departure_time.clone(),
                vehicle_id: *vehicle_id,
                vehicle_type: vehicle_type.clone(),
                seats: *seats,
                total: *quoted_total,
            }),
            BookingFlow::PrefilledPayment {
                ride_id,
                seats,
                quoted_total,
            } => Ok(Completion::JoinRide {
                ride_id: *ride_id,
                seats: *seats,
                total: *quoted_total,
            }),
            _ => Err(TransitionError::NotReadyForPayment),
        }
    }
}
