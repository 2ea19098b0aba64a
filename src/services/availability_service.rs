use serde::Serialize;

use crate::models::bookings::Booking;
use crate::models::rides::Ride;

/// Capacity assumed for legacy ride documents written before the capacity
/// field existed.
pub const DEFAULT_CAPACITY: u32 = 6;

#[derive(Debug, Clone, Copy, Serialize)]
pub struct SeatAvailability {
    pub capacity: u32,
    pub seats_taken: u32,
    /// Capacity minus booked seats, unclamped. Negative means the ride is
    /// oversold.
    pub available_seats: i64,
    /// What the join button gates on.
    pub bookable_seats: u32,
}

pub struct AvailabilityService;

impl AvailabilityService {
    /// Seats remaining on a ride: capacity minus every booking that still
    /// holds seats. Cancelled and completed bookings release their seats.
    /// `seats_requested` on the ride is the creator's original ask and never
    /// feeds this calculation.
    pub fn availability(ride: &Ride, bookings: &[Booking]) -> SeatAvailability {
        let capacity = match ride.vehicle_capacity {
            Some(capacity) if capacity > 0 => capacity,
            _ => {
                log::warn!(
                    "Ride {:?} has no usable vehicle_capacity; assuming {}",
                    ride.id,
                    DEFAULT_CAPACITY
                );
                DEFAULT_CAPACITY
            }
        };

        let seats_taken: u32 = bookings
            .iter()
            .filter(|b| b.booking_status.holds_seats())
            .map(|b| b.seats_booked)
            .sum();

        let available_seats = capacity as i64 - seats_taken as i64;
        if available_seats < 0 {
            log::warn!(
                "Ride {:?} is oversold: capacity {}, seats taken {}",
                ride.id,
                capacity,
                seats_taken
            );
        }

        SeatAvailability {
            capacity,
            seats_taken,
            available_seats,
            bookable_seats: available_seats.max(0) as u32,
        }
    }
}
