//! HTTP API handlers for melody-web

pub mod health;
pub mod melody;

pub use health::health_routes;
pub use melody::melody_routes;
