pub mod account;
pub mod admin;
pub mod booking_flow;
pub mod driver;
pub mod events;
pub mod health;
pub mod location;
pub mod payment;
pub mod pricing;
pub mod rides;
pub mod vehicle;
