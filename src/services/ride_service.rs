use std::collections::HashMap;

use futures::TryStreamExt;
use mongodb::bson::{doc, oid::ObjectId, DateTime};
use mongodb::Client;

use crate::db::mongo;
use crate::models::bookings::Booking;
use crate::models::pricing::{BookingMode, RoutePricing, RouteQuery, RouteVehiclePricing};
use crate::models::rides::{AvailableRide, Ride, RideStatus};
use crate::models::vehicle::Vehicle;
use crate::services::availability_service::AvailabilityService;
use crate::services::pricing_service::PricingService;

/// Listing fallback when a ride carries no configured price: a nominal
/// whole-vehicle fare over a nominal six-seat vehicle.
pub const DEFAULT_FARE: f64 = 5000.0;
const DEFAULT_FARE_SEATS: f64 = 6.0;

#[derive(Debug, PartialEq, Eq)]
pub enum ReserveOutcome {
    Reserved(ObjectId),
    /// Another rider took the last seat between our availability read and
    /// our insert. The booking has already been cancelled and flagged for
    /// refund.
    Oversold,
}

pub struct RideService;

impl RideService {
    /// Active pricing rules, both tables, for the resolver. Rows written
    /// before the flag existed count as active.
    pub async fn load_pricing_tables(
        client: &Client,
    ) -> Result<(Vec<RoutePricing>, Vec<RouteVehiclePricing>), mongodb::error::Error> {
        let active = doc! { "is_active": { "$ne": false } };

        let route_rules = mongo::collection::<RoutePricing>(client, mongo::ROUTE_PRICING)
            .find(active.clone())
            .await?
            .try_collect::<Vec<RoutePricing>>()
            .await?;

        let vehicle_rules =
            mongo::collection::<RouteVehiclePricing>(client, mongo::ROUTE_VEHICLE_PRICING)
                .find(active)
                .await?
                .try_collect::<Vec<RouteVehiclePricing>>()
                .await?;

        Ok((route_rules, vehicle_rules))
    }

    pub async fn bookings_for_ride(
        client: &Client,
        ride_id: ObjectId,
    ) -> Result<Vec<Booking>, mongodb::error::Error> {
        mongo::collection::<Booking>(client, mongo::BOOKINGS)
            .find(doc! { "ride_id": ride_id })
            .await?
            .try_collect::<Vec<Booking>>()
            .await
    }

    pub async fn bookings_by_ride(
        client: &Client,
        ride_ids: &[ObjectId],
    ) -> Result<HashMap<ObjectId, Vec<Booking>>, mongodb::error::Error> {
        let mut grouped: HashMap<ObjectId, Vec<Booking>> = HashMap::new();
        if ride_ids.is_empty() {
            return Ok(grouped);
        }

        let bookings = mongo::collection::<Booking>(client, mongo::BOOKINGS)
            .find(doc! { "ride_id": { "$in": ride_ids.to_vec() } })
            .await?
            .try_collect::<Vec<Booking>>()
            .await?;

        for booking in bookings {
            grouped.entry(booking.ride_id).or_default().push(booking);
        }
        Ok(grouped)
    }

    /// Per-seat figure the ride cards display. Unpriced rides fall back to
    /// the nominal default fare rather than showing zero.
    pub fn display_price_per_seat(ride: &Ride, capacity: u32) -> f64 {
        if let Some(per_seat) = ride.price_per_seat {
            if per_seat > 0.0 {
                return per_seat;
            }
        }
        if let Some(price) = ride.price {
            if price > 0.0 && capacity > 0 {
                return (price / capacity as f64).round();
            }
        }
        log::warn!(
            "Ride {:?} has no configured price; displaying default fare",
            ride.id
        );
        (DEFAULT_FARE / DEFAULT_FARE_SEATS).round()
    }

    /// Upcoming joinable rides with seat availability and display pricing.
    /// Rides with nothing left to book are dropped from the listing.
    pub async fn available_rides(
        client: &Client,
    ) -> Result<Vec<AvailableRide>, mongodb::error::Error> {
        let today = chrono::Utc::now().format("%Y-%m-%d").to_string();
        let filter = doc! {
            "status": { "$in": ["pending", "available"] },
            "departure_date": { "$gte": today },
        };

        let rides = mongo::collection::<Ride>(client, mongo::RIDES)
            .find(filter)
            .sort(doc! { "departure_date": 1, "departure_time": 1 })
            .await?
            .try_collect::<Vec<Ride>>()
            .await?;

        let ride_ids: Vec<ObjectId> = rides.iter().filter_map(|r| r.id).collect();
        let mut bookings = Self::bookings_by_ride(client, &ride_ids).await?;

        let listings = rides
            .into_iter()
            .filter_map(|ride| {
                let ride_bookings = ride
                    .id
                    .and_then(|id| bookings.remove(&id))
                    .unwrap_or_default();
                let availability = AvailabilityService::availability(&ride, &ride_bookings);
                if availability.bookable_seats == 0 {
                    return None;
                }
                let display_price_per_seat =
                    Self::display_price_per_seat(&ride, availability.capacity);
                Some(AvailableRide {
                    ride,
                    display_price_per_seat,
                    available_seats: availability.available_seats,
                    bookable_seats: availability.bookable_seats,
                })
            })
            .collect();

        Ok(listings)
    }

    /// Joinable rides on a route, matched in either direction the same way
    /// pricing matches. Feeds the wizard's join-mode guard.
    pub async fn count_candidate_rides(
        client: &Client,
        route: &RouteQuery,
    ) -> Result<u64, mongodb::error::Error> {
        let listings = Self::available_rides(client).await?;
        let count = listings
            .iter()
            .filter(|listing| {
                let r = &listing.ride;
                let forward = r.from_type == route.from_type
                    && PricingService::names_match(&r.from_location, &route.from_location)
                    && r.to_type == route.to_type
                    && PricingService::names_match(&r.to_location, &route.to_location);
                let reverse = r.from_type == route.to_type
                    && PricingService::names_match(&r.from_location, &route.to_location)
                    && r.to_type == route.from_type
                    && PricingService::names_match(&r.to_location, &route.from_location);
                forward || reverse
            })
            .count();
        Ok(count as u64)
    }

    /// Materialise the confirmed ride a paid custom booking describes.
    /// Capacity always comes from the vehicle record, never from the seat
    /// count, so availability math on the resulting ride stays honest.
    #[allow(clippy::too_many_arguments)]
    pub fn custom_ride(
        mode: BookingMode,
        route: RouteQuery,
        pickup_address: Option<String>,
        departure_date: String,
        departure_time: String,
        vehicle: &Vehicle,
        seats: u32,
        total: f64,
        user_id: ObjectId,
    ) -> Ride {
        let per_seat = match mode {
            BookingMode::Full => (total / vehicle.capacity.max(1) as f64).round(),
            BookingMode::Join => (total / seats.max(1) as f64).round(),
        };
        let now = DateTime::now();
        Ride {
            id: None,
            from_type: route.from_type,
            from_location: route.from_location,
            to_type: route.to_type,
            to_location: route.to_location,
            departure_date,
            departure_time,
            vehicle_type: vehicle.name.clone(),
            vehicle_capacity: Some(vehicle.capacity),
            seats_requested: Some(seats),
            price: match mode {
                BookingMode::Full => Some(total),
                BookingMode::Join => None,
            },
            price_per_seat: Some(per_seat),
            user_id: Some(user_id),
            driver_id: None,
            pickup_address,
            status: RideStatus::Confirmed,
            created_at: Some(now),
            updated_at: Some(now),
        }
    }

    /// Claim seats on a ride. There is no counter on the ride row to
    /// decrement, so the claim is the booking insert itself, verified after
    /// the fact: if the recount shows the ride oversold, the just-inserted
    /// booking is cancelled and flagged for refund.
    pub async fn reserve_seats(
        client: &Client,
        ride: &Ride,
        user_id: ObjectId,
        seats: u32,
        total_amount: f64,
        payment_reference: &str,
    ) -> Result<ReserveOutcome, mongodb::error::Error> {
        use crate::models::bookings::{BookingStatus, PaymentStatus};

        let ride_id = match ride.id {
            Some(id) => id,
            None => {
                // Should never happen for a ride read out of Mongo.
                return Ok(ReserveOutcome::Oversold);
            }
        };

        let now = DateTime::now();
        let booking = Booking {
            id: None,
            ride_id,
            user_id,
            seats_booked: seats,
            total_amount,
            booking_status: BookingStatus::Confirmed,
            payment_status: PaymentStatus::Paid,
            payment_reference: Some(payment_reference.to_string()),
            created_at: Some(now),
            updated_at: Some(now),
        };

        let collection = mongo::collection::<Booking>(client, mongo::BOOKINGS);
        let inserted = collection.insert_one(&booking).await?;
        let booking_id = inserted
            .inserted_id
            .as_object_id()
            .expect("inserted booking has an ObjectId");

        let all_bookings = Self::bookings_for_ride(client, ride_id).await?;
        let availability = AvailabilityService::availability(ride, &all_bookings);

        if availability.available_seats < 0 {
            log::warn!(
                "Oversell detected on ride {}: cancelling booking {} for refund",
                ride_id,
                booking_id
            );
            collection
                .update_one(
                    doc! { "_id": booking_id },
                    doc! { "$set": {
                        "booking_status": "cancelled",
                        "payment_status": "refund_pending",
                        "updated_at": DateTime::now(),
                    }},
                )
                .await?;
            return Ok(ReserveOutcome::Oversold);
        }

        Ok(ReserveOutcome::Reserved(booking_id))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::location::LocationKind;

    fn ride(price_per_seat: Option<f64>, price: Option<f64>) -> Ride {
        Ride {
            id: Some(ObjectId::new()),
            from_type: LocationKind::State,
            from_location: "Lagos".to_string(),
            to_type: LocationKind::University,
            to_location: "UNILAG".to_string(),
            departure_date: "2026-09-01".to_string(),
            departure_time: "08:00".to_string(),
            vehicle_type: "Bus".to_string(),
            vehicle_capacity: Some(6),
            seats_requested: None,
            price,
            price_per_seat,
            user_id: None,
            driver_id: None,
            pickup_address: None,
            status: RideStatus::Available,
            created_at: None,
            updated_at: None,
        }
    }

    #[test]
    fn display_price_prefers_per_seat_figure() {
        assert_eq!(
            RideService::display_price_per_seat(&ride(Some(1200.0), Some(9000.0)), 6),
            1200.0
        );
    }

    #[test]
    fn display_price_derives_from_whole_vehicle_price() {
        assert_eq!(
            RideService::display_price_per_seat(&ride(None, Some(9000.0)), 6),
            1500.0
        );
    }

    fn sedan() -> Vehicle {
        Vehicle {
            id: Some(ObjectId::new()),
            name: "Sedan".to_string(),
            capacity: 4,
            base_price: 3000.0,
            is_active: true,
            created_at: None,
            updated_at: None,
        }
    }

    fn route() -> RouteQuery {
        RouteQuery {
            from_type: LocationKind::State,
            from_location: "Lagos".to_string(),
            to_type: LocationKind::University,
            to_location: "UNILAG".to_string(),
        }
    }

    #[test]
    fn custom_ride_capacity_comes_from_the_vehicle() {
        // A one-seat join booking on a 4-seat Sedan: the ride must record the
        // vehicle's capacity so availability never assumes the default.
        let built = RideService::custom_ride(
            BookingMode::Join,
            route(),
            None,
            "2026-09-01".to_string(),
            "08:00".to_string(),
            &sedan(),
            1,
            1000.0,
            ObjectId::new(),
        );
        assert_eq!(built.vehicle_capacity, Some(4));
        assert_eq!(built.seats_requested, Some(1));
        assert_eq!(built.price, None);
        assert_eq!(built.price_per_seat, Some(1000.0));

        let built = Ride {
            id: Some(ObjectId::new()),
            ..built
        };
        let availability = AvailabilityService::availability(&built, &[]);
        assert_eq!(availability.capacity, 4);
        assert_eq!(availability.available_seats, 4);
    }

    #[test]
    fn custom_full_ride_prices_per_real_seat() {
        let built = RideService::custom_ride(
            BookingMode::Full,
            route(),
            Some("12 Marina Road".to_string()),
            "2026-09-01".to_string(),
            "08:00".to_string(),
            &sedan(),
            4,
            10800.0,
            ObjectId::new(),
        );
        assert_eq!(built.vehicle_capacity, Some(4));
        assert_eq!(built.price, Some(10800.0));
        assert_eq!(built.price_per_seat, Some(2700.0));
        assert_eq!(built.status, RideStatus::Confirmed);
    }

    #[test]
    fn unpriced_ride_displays_default_fare() {
        assert_eq!(
            RideService::display_price_per_seat(&ride(None, None), 6),
            (DEFAULT_FARE / 6.0).round()
        );
        // Zero is "no price configured", not a free ride.
        assert_eq!(
            RideService::display_price_per_seat(&ride(Some(0.0), None), 6),
            833.0
        );
    }
}
