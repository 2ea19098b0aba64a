pub mod interface;
pub mod paystack;
