//! Test fixtures for route-facts.
//!
//! Provides realistic upstream responses:
//! - Real European trips (Paris, Lyon, Turin, Calais, Dover)
//! - Builders for sections, tolls, actions and notices

pub mod here_routes;

pub use here_routes::*;
