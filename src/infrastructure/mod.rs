pub mod api;
pub mod backends;
