// Walks the wizard state machine end to end with real pricing, no HTTP or
// database involved.

use chrono::NaiveDate;
use mongodb::bson::oid::ObjectId;

use unirides_api::models::booking_flow::{BookingFlow, FlowEvent};
use unirides_api::models::location::LocationKind;
use unirides_api::models::pricing::{BookingMode, RouteQuery, RouteVehiclePricing};
use unirides_api::models::vehicle::Vehicle;
use unirides_api::services::booking_flow::{
    Advance, AdvanceContext, BookingFlowService, Completion, SelectedVehicle, TransitionError,
};
use unirides_api::services::pricing_service::PricingService;

fn today() -> NaiveDate {
    NaiveDate::from_ymd_opt(2026, 8, 25).unwrap()
}

fn sienna() -> Vehicle {
    Vehicle {
        id: Some(ObjectId::new()),
        name: "Sienna".to_string(),
        capacity: 6,
        base_price: 3000.0,
        is_active: true,
        created_at: None,
        updated_at: None,
    }
}

fn sienna_rule() -> RouteVehiclePricing {
    RouteVehiclePricing {
        id: None,
        from_type: LocationKind::State,
        from_location: "Lagos".to_string(),
        to_type: LocationKind::University,
        to_location: "UNILAG".to_string(),
        vehicle_type: "Sienna".to_string(),
        base_price: 6000.0,
        price_unit: None,
        is_active: true,
        created_at: None,
        updated_at: None,
    }
}

#[test]
fn full_booking_walks_all_four_steps() {
    let vehicle = sienna();
    let rules = vec![sienna_rule()];

    // Step 1: location. Full bookings need a pickup address.
    let flow = BookingFlow::Location {
        mode: BookingMode::Full,
    };
    let ctx = AdvanceContext::new(today());
    let flow = match BookingFlowService::advance(
        &flow,
        FlowEvent::SubmitLocation {
            from_type: LocationKind::State,
            from_location: "Lagos".to_string(),
            to_type: LocationKind::University,
            to_location: "UNILAG".to_string(),
            pickup_address: Some("12 Marina Road".to_string()),
        },
        &ctx,
    )
    .unwrap()
    {
        Advance::Next(flow) => flow,
        other => panic!("unexpected advance: {:?}", other),
    };
    assert_eq!(flow.step_name(), "date");

    // Step 2: schedule.
    let flow = match BookingFlowService::advance(
        &flow,
        FlowEvent::SubmitDate {
            departure_date: "2026-09-01".to_string(),
            departure_time: "08:00".to_string(),
        },
        &ctx,
    )
    .unwrap()
    {
        Advance::Next(flow) => flow,
        other => panic!("unexpected advance: {:?}", other),
    };
    assert_eq!(flow.step_name(), "vehicle");

    // Step 3: vehicle, priced with the real resolver.
    let route = RouteQuery {
        from_type: LocationKind::State,
        from_location: "Lagos".to_string(),
        to_type: LocationKind::University,
        to_location: "UNILAG".to_string(),
    };
    let quote = PricingService::quote(&[], &rules, &route, &vehicle, BookingMode::Full, 1);
    assert_eq!(quote.total, 32400.0); // 6000 * 6 seats, 10% off

    let mut ctx = AdvanceContext::new(today());
    ctx.vehicle = Some(SelectedVehicle {
        id: vehicle.id.unwrap(),
        name: vehicle.name.clone(),
    });
    ctx.quote_total = Some(quote.total);
    let flow = match BookingFlowService::advance(
        &flow,
        FlowEvent::SubmitVehicle {
            vehicle_id: vehicle.id.unwrap().to_hex(),
            seats: Some(6),
        },
        &ctx,
    )
    .unwrap()
    {
        Advance::Next(flow) => flow,
        other => panic!("unexpected advance: {:?}", other),
    };
    assert_eq!(flow.step_name(), "payment");

    // Step 4: the completed wizard describes the ride to create.
    match BookingFlowService::complete(&flow).unwrap() {
        Completion::CustomRide {
            mode,
            route,
            pickup_address,
            seats,
            total,
            ..
        } => {
            assert_eq!(mode, BookingMode::Full);
            assert_eq!(route.from_location, "Lagos");
            assert_eq!(pickup_address.as_deref(), Some("12 Marina Road"));
            assert_eq!(seats, 6);
            assert_eq!(total, 32400.0);
        }
        other => panic!("unexpected completion: {:?}", other),
    }
}

#[test]
fn join_flow_switches_to_full_when_no_rides_exist() {
    let flow = BookingFlow::Location {
        mode: BookingMode::Join,
    };
    let mut ctx = AdvanceContext::new(today());
    ctx.candidate_rides = Some(0);

    let advance = BookingFlowService::advance(
        &flow,
        FlowEvent::SubmitLocation {
            from_type: LocationKind::State,
            from_location: "Lagos".to_string(),
            to_type: LocationKind::University,
            to_location: "UNILAG".to_string(),
            pickup_address: None,
        },
        &ctx,
    )
    .unwrap();

    // The mode flips but the wizard stays on the location step.
    match advance {
        Advance::SwitchedToFull(BookingFlow::Location { mode }) => {
            assert_eq!(mode, BookingMode::Full)
        }
        other => panic!("unexpected advance: {:?}", other),
    }
}

#[test]
fn prefilled_flow_goes_straight_to_payment() {
    let ride_id = ObjectId::new();
    let flow = BookingFlow::SeatSelection { ride_id };

    let mut ctx = AdvanceContext::new(today());
    ctx.bookable_seats = Some(4);
    ctx.quote_total = Some(2000.0);

    let flow = match BookingFlowService::advance(&flow, FlowEvent::SubmitSeats { seats: 2 }, &ctx)
        .unwrap()
    {
        Advance::Next(flow) => flow,
        other => panic!("unexpected advance: {:?}", other),
    };
    assert_eq!(flow.step_name(), "payment");

    match BookingFlowService::complete(&flow).unwrap() {
        Completion::JoinRide {
            ride_id: id,
            seats,
            total,
        } => {
            assert_eq!(id, ride_id);
            assert_eq!(seats, 2);
            assert_eq!(total, 2000.0);
        }
        other => panic!("unexpected completion: {:?}", other),
    }
}

#[test]
fn back_from_payment_keeps_earlier_answers() {
    let route = RouteQuery {
        from_type: LocationKind::State,
        from_location: "Lagos".to_string(),
        to_type: LocationKind::University,
        to_location: "UNILAG".to_string(),
    };
    let flow = BookingFlow::Payment {
        mode: BookingMode::Full,
        route: route.clone(),
        pickup_address: Some("12 Marina Road".to_string()),
        departure_date: "2026-09-01".to_string(),
        departure_time: "08:00".to_string(),
        vehicle_id: ObjectId::new(),
        vehicle_type: "Sienna".to_string(),
        seats: 6,
        quoted_total: 32400.0,
    };

    match BookingFlowService::back(&flow).unwrap() {
        BookingFlow::Vehicle {
            route: kept_route,
            pickup_address,
            departure_date,
            ..
        } => {
            assert_eq!(kept_route, route);
            assert_eq!(pickup_address.as_deref(), Some("12 Marina Road"));
            assert_eq!(departure_date, "2026-09-01");
        }
        other => panic!("unexpected flow: {:?}", other),
    }
}

#[test]
fn completing_before_payment_is_refused() {
    let flow = BookingFlow::Location {
        mode: BookingMode::Join,
    };
    assert_eq!(
        BookingFlowService::complete(&flow),
        Err(TransitionError::NotReadyForPayment)
    );
}
