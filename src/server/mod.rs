pub mod api_error;
pub mod catalog;
pub mod server;
pub mod shape;
