pub mod client;
pub mod identifier;
pub mod relay;
