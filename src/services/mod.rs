pub mod businesses;
pub mod geocoding;
pub mod sample;
