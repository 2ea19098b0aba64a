pub mod account_info;
pub mod auth;
pub mod bookings;
pub mod google_auth;
pub mod role_management;
