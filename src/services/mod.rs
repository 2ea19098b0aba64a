pub mod availability_service;
pub mod booking_flow;
pub mod draft_service;
pub mod events;
pub mod google_auth_service;
pub mod payment;
pub mod pricing_service;
pub mod ride_service;
