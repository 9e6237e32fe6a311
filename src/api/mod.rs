pub mod client;
pub mod errors;
