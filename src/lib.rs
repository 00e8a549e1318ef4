pub mod api;
pub mod config;
pub mod demand;
pub mod detector;
pub mod error;
pub mod forecast;
pub mod geometry;
pub mod layout;
pub mod occupancy;
pub mod state;
