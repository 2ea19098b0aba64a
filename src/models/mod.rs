pub mod account;
pub mod booking_flow;
pub mod bookings;
pub mod driver;
pub mod google_auth;
pub mod location;
pub mod pricing;
pub mod rides;
pub mod vehicle;

/// serde default for `is_active`-style flags on documents written before
/// the flag existed.
pub(crate) fn default_true() -> bool {
    true
}
