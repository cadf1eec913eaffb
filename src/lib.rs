//! Vendor-side toolkit for a tiffin delivery business: dish image resolution,
//! a typed client for the vendor backend, and delivery staff location tracking.

pub mod config;
pub mod handlers;
pub mod models;
pub mod services;
#[cfg(feature = "http-server")]
pub mod server; // Image resolution endpoints for the dashboard
