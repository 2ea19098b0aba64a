use serde::Serialize;

use crate::models::pricing::{BookingMode, PriceUnit, RoutePricing, RouteQuery, RouteVehiclePricing};
use crate::models::vehicle::Vehicle;

/// Which pricing table produced the fare.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum FareTier {
    RouteVehicle,
    Route,
    VehicleBase,
}

/// The raw fare picked out of the pricing tables, before mode math.
#[derive(Debug, Clone, Copy)]
pub struct ResolvedFare {
    pub base_price: f64,
    pub price_unit: Option<PriceUnit>,
    pub tier: FareTier,
}

/// A priced booking request, ready to charge or display.
#[derive(Debug, Clone, Serialize)]
pub struct FareQuote {
    pub total: f64,
    pub per_seat: f64,
    pub base_price: f64,
    pub tier: FareTier,
    pub price_unit: Option<PriceUnit>,
    pub mode: BookingMode,
    pub seats: u32,
}

pub struct PricingService;

impl PricingService {
    /// Location and vehicle names come from admin-entered free text, so
    /// comparisons trim whitespace and ignore ASCII case.
    pub fn names_match(a: &str, b: &str) -> bool {
        a.trim().eq_ignore_ascii_case(b.trim())
    }

    /// A rule matches a route in either direction; the two endpoints are
    /// symmetric for pricing purposes.
    fn route_matches(
        from_type: crate::models::location::LocationKind,
        from_location: &str,
        to_type: crate::models::location::LocationKind,
        to_location: &str,
        route: &RouteQuery,
    ) -> bool {
        let forward = from_type == route.from_type
            && Self::names_match(from_location, &route.from_location)
            && to_type == route.to_type
            && Self::names_match(to_location, &route.to_location);
        let reverse = from_type == route.to_type
            && Self::names_match(from_location, &route.to_location)
            && to_type == route.from_type
            && Self::names_match(to_location, &route.from_location);
        forward || reverse
    }

    /// First active route-level rule covering the route, either direction.
    pub fn find_route_rule<'a>(
        rules: &'a [RoutePricing],
        route: &RouteQuery,
    ) -> Option<&'a RoutePricing> {
        rules.iter().find(|r| {
            r.is_active
                && Self::route_matches(
                    r.from_type,
                    &r.from_location,
                    r.to_type,
                    &r.to_location,
                    route,
                )
        })
    }

    /// First active rule covering the route for the named vehicle type.
    pub fn find_vehicle_rule<'a>(
        rules: &'a [RouteVehiclePricing],
        route: &RouteQuery,
        vehicle_type: &str,
    ) -> Option<&'a RouteVehiclePricing> {
        rules.iter().find(|r| {
            r.is_active
                && Self::names_match(&r.vehicle_type, vehicle_type)
                && Self::route_matches(
                    r.from_type,
                    &r.from_location,
                    r.to_type,
                    &r.to_location,
                    route,
                )
        })
    }

    /// Tiered fare lookup: per-vehicle route rule, then generic route rule,
    /// then the vehicle's own flat base price. First match wins; inactive
    /// rules never match.
    pub fn resolve_base_fare(
        route_rules: &[RoutePricing],
        vehicle_rules: &[RouteVehiclePricing],
        route: &RouteQuery,
        vehicle: &Vehicle,
    ) -> ResolvedFare {
        if let Some(rule) = Self::find_vehicle_rule(vehicle_rules, route, &vehicle.name) {
            return ResolvedFare {
                base_price: rule.base_price,
                price_unit: rule.price_unit,
                tier: FareTier::RouteVehicle,
            };
        }

        if let Some(rule) = Self::find_route_rule(route_rules, route) {
            return ResolvedFare {
                base_price: rule.base_price,
                price_unit: rule.price_unit,
                tier: FareTier::Route,
            };
        }

        ResolvedFare {
            base_price: vehicle.base_price,
            price_unit: None,
            tier: FareTier::VehicleBase,
        }
    }

    /// Resolve the fare and apply the booking-mode arithmetic.
    ///
    /// Rules without a declared `price_unit` get the legacy math the booking
    /// screens always did: join treats the base as a whole-vehicle figure and
    /// divides by capacity, full multiplies by capacity and takes 10% off.
    /// Rules that declare a unit get unit-correct math instead.
    pub fn quote(
        route_rules: &[RoutePricing],
        vehicle_rules: &[RouteVehiclePricing],
        route: &RouteQuery,
        vehicle: &Vehicle,
        mode: BookingMode,
        seats: u32,
    ) -> FareQuote {
        let resolved = Self::resolve_base_fare(route_rules, vehicle_rules, route, vehicle);

        let capacity = if vehicle.capacity == 0 {
            log::warn!(
                "Vehicle '{}' has zero capacity; pricing as a single seat",
                vehicle.name
            );
            1
        } else {
            vehicle.capacity
        };

        if resolved.base_price <= 0.0 {
            log::warn!(
                "No price configured for {} -> {} with vehicle '{}' (tier {:?})",
                route.from_location,
                route.to_location,
                vehicle.name,
                resolved.tier
            );
        }

        let base = resolved.base_price.max(0.0);
        let cap = capacity as f64;

        let (total, per_seat) = match (mode, resolved.price_unit) {
            // Legacy rows and the flat vehicle fallback: base is treated as a
            // whole-vehicle figure.
            (BookingMode::Join, None) | (BookingMode::Join, Some(PriceUnit::PerVehicle)) => {
                let rate = (base / cap).round();
                (rate * seats as f64, rate)
            }
            (BookingMode::Join, Some(PriceUnit::PerSeat)) => (base * seats as f64, base),
            (BookingMode::Full, None) | (BookingMode::Full, Some(PriceUnit::PerSeat)) => {
                let total = (base * cap * 0.9).round();
                (total, (total / cap).round())
            }
            (BookingMode::Full, Some(PriceUnit::PerVehicle)) => {
                let total = (base * 0.9).round();
                (total, (total / cap).round())
            }
        };

        FareQuote {
            total,
            per_seat,
            base_price: resolved.base_price,
            tier: resolved.tier,
            price_unit: resolved.price_unit,
            mode,
            seats,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::location::LocationKind;

    fn vehicle(name: &str, capacity: u32, base_price: f64) -> Vehicle {
        Vehicle {
            id: None,
            name: name.to_string(),
            capacity,
            base_price,
            is_active: true,
            created_at: None,
            updated_at: None,
        }
    }

    fn route(
        from_type: LocationKind,
        from: &str,
        to_type: LocationKind,
        to: &str,
    ) -> RouteQuery {
        RouteQuery {
            from_type,
            from_location: from.to_string(),
            to_type,
            to_location: to.to_string(),
        }
    }

    fn route_rule(from: &str, to: &str, base_price: f64) -> RoutePricing {
        RoutePricing {
            id: None,
            from_type: LocationKind::State,
            from_location: from.to_string(),
            to_type: LocationKind::University,
            to_location: to.to_string(),
            base_price,
            price_unit: None,
            is_active: true,
            created_at: None,
            updated_at: None,
        }
    }

    fn vehicle_rule(from: &str, to: &str, vehicle_type: &str, base_price: f64) -> RouteVehiclePricing {
        RouteVehiclePricing {
            id: None,
            from_type: LocationKind::State,
            from_location: from.to_string(),
            to_type: LocationKind::University,
            to_location: to.to_string(),
            vehicle_type: vehicle_type.to_string(),
            base_price,
            price_unit: None,
            is_active: true,
            created_at: None,
            updated_at: None,
        }
    }

    #[test]
    fn vehicle_rule_wins_over_route_rule() {
        let routes = vec![route_rule("Lagos", "UNILAG", 9000.0)];
        let vehicles = vec![vehicle_rule("Lagos", "UNILAG", "Sedan", 4000.0)];
        let sedan = vehicle("Sedan", 4, 2000.0);
        let q = route(LocationKind::State, "Lagos", LocationKind::University, "UNILAG");

        let fare = PricingService::resolve_base_fare(&routes, &vehicles, &q, &sedan);
        assert_eq!(fare.tier, FareTier::RouteVehicle);
        assert_eq!(fare.base_price, 4000.0);
    }

    #[test]
    fn reversed_route_matches_vehicle_rule() {
        // Joining from the university end must hit the same rule.
        let vehicles = vec![vehicle_rule("Lagos", "UNILAG", "Sedan", 4000.0)];
        let sedan = vehicle("Sedan", 4, 2000.0);
        let q = route(LocationKind::University, "UNILAG", LocationKind::State, "Lagos");

        let quote = PricingService::quote(&[], &vehicles, &q, &sedan, BookingMode::Join, 1);
        assert_eq!(quote.tier, FareTier::RouteVehicle);
        assert_eq!(quote.total, 1000.0);
    }

    #[test]
    fn generic_route_rule_applies_when_no_vehicle_rule() {
        let routes = vec![route_rule("Lagos", "UNILAG", 6000.0)];
        let vehicles = vec![vehicle_rule("Lagos", "UNILAG", "Bus", 4000.0)];
        let sedan = vehicle("Sedan", 4, 2000.0);
        let q = route(LocationKind::State, "Lagos", LocationKind::University, "UNILAG");

        let fare = PricingService::resolve_base_fare(&routes, &vehicles, &q, &sedan);
        assert_eq!(fare.tier, FareTier::Route);
        assert_eq!(fare.base_price, 6000.0);
    }

    #[test]
    fn falls_back_to_vehicle_base_price() {
        let sedan = vehicle("Sedan", 4, 2000.0);
        let q = route(LocationKind::State, "Abuja", LocationKind::University, "UNIABUJA");

        let fare = PricingService::resolve_base_fare(&[], &[], &q, &sedan);
        assert_eq!(fare.tier, FareTier::VehicleBase);
        assert_eq!(fare.base_price, 2000.0);

        let join = PricingService::quote(&[], &[], &q, &sedan, BookingMode::Join, 1);
        assert_eq!(join.total, 500.0);
        let full = PricingService::quote(&[], &[], &q, &sedan, BookingMode::Full, 1);
        assert_eq!(full.total, 7200.0);
    }

    #[test]
    fn inactive_rules_never_match() {
        let mut rule = vehicle_rule("Lagos", "UNILAG", "Sedan", 4000.0);
        rule.is_active = false;
        let sedan = vehicle("Sedan", 4, 2000.0);
        let q = route(LocationKind::State, "Lagos", LocationKind::University, "UNILAG");

        let fare = PricingService::resolve_base_fare(&[], &[rule], &q, &sedan);
        assert_eq!(fare.tier, FareTier::VehicleBase);
    }

    #[test]
    fn name_matching_is_trimmed_and_case_insensitive() {
        let vehicles = vec![vehicle_rule("Lagos", "UNILAG", " sedan ", 4000.0)];
        let sedan = vehicle("Sedan", 4, 2000.0);
        let q = route(LocationKind::State, "lagos", LocationKind::University, "unilag ");

        let fare = PricingService::resolve_base_fare(&[], &vehicles, &q, &sedan);
        assert_eq!(fare.tier, FareTier::RouteVehicle);
    }

    #[test]
    fn full_mode_discounts_ten_percent() {
        let vehicles = vec![vehicle_rule("Lagos", "UNILAG", "Bus", 5000.0)];
        let bus = vehicle("Bus", 6, 3000.0);
        let q = route(LocationKind::State, "Lagos", LocationKind::University, "UNILAG");

        let quote = PricingService::quote(&[], &vehicles, &q, &bus, BookingMode::Full, 1);
        assert_eq!(quote.total, 27000.0);
    }

    #[test]
    fn join_mode_scales_linearly_with_seats() {
        let vehicles = vec![vehicle_rule("Lagos", "UNILAG", "Bus", 5000.0)];
        let bus = vehicle("Bus", 6, 3000.0);
        let q = route(LocationKind::State, "Lagos", LocationKind::University, "UNILAG");

        let one = PricingService::quote(&[], &vehicles, &q, &bus, BookingMode::Join, 1);
        let three = PricingService::quote(&[], &vehicles, &q, &bus, BookingMode::Join, 3);
        assert_eq!(one.total, (5000.0f64 / 6.0).round());
        assert_eq!(three.total, one.total * 3.0);
    }

    #[test]
    fn per_seat_unit_skips_capacity_division() {
        let mut rule = vehicle_rule("Lagos", "UNILAG", "Sedan", 1200.0);
        rule.price_unit = Some(PriceUnit::PerSeat);
        let sedan = vehicle("Sedan", 4, 2000.0);
        let q = route(LocationKind::State, "Lagos", LocationKind::University, "UNILAG");

        let join = PricingService::quote(&[], &[rule.clone()], &q, &sedan, BookingMode::Join, 3);
        assert_eq!(join.total, 3600.0);

        let full = PricingService::quote(&[], &[rule], &q, &sedan, BookingMode::Full, 1);
        assert_eq!(full.total, (1200.0f64 * 4.0 * 0.9).round());
    }

    #[test]
    fn per_vehicle_unit_skips_capacity_multiplication() {
        let mut rule = vehicle_rule("Lagos", "UNILAG", "Sedan", 8000.0);
        rule.price_unit = Some(PriceUnit::PerVehicle);
        let sedan = vehicle("Sedan", 4, 2000.0);
        let q = route(LocationKind::State, "Lagos", LocationKind::University, "UNILAG");

        let full = PricingService::quote(&[], &[rule.clone()], &q, &sedan, BookingMode::Full, 1);
        assert_eq!(full.total, 7200.0);

        let join = PricingService::quote(&[], &[rule], &q, &sedan, BookingMode::Join, 2);
        assert_eq!(join.total, 4000.0);
    }

    #[test]
    fn zero_base_price_quotes_zero() {
        let vehicles = vec![vehicle_rule("Lagos", "UNILAG", "Sedan", 0.0)];
        let sedan = vehicle("Sedan", 4, 0.0);
        let q = route(LocationKind::State, "Lagos", LocationKind::University, "UNILAG");

        let join = PricingService::quote(&[], &vehicles, &q, &sedan, BookingMode::Join, 2);
        assert_eq!(join.total, 0.0);
        let full = PricingService::quote(&[], &vehicles, &q, &sedan, BookingMode::Full, 1);
        assert_eq!(full.total, 0.0);
    }

    #[test]
    fn zero_capacity_is_guarded() {
        let broken = vehicle("Sedan", 0, 2000.0);
        let q = route(LocationKind::State, "Lagos", LocationKind::University, "UNILAG");

        let quote = PricingService::quote(&[], &[], &q, &broken, BookingMode::Join, 1);
        assert!(quote.total.is_finite());
        assert_eq!(quote.total, 2000.0);
    }
}
