//! Utility functions for string formatting and geometry.

pub mod format;
pub mod geo;

pub use format::{format_coordinates, format_date, truncate_string};
pub use geo::haversine_meters;
