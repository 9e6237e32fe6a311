pub mod corners;
pub mod engine;
pub mod goals;
