//! REST clients for the mobility backend and the geocoding service.
//!
//! The backend uses bearer token authentication obtained from
//! `POST /api/auth/login`; error bodies of the form `{"error": "..."}` are
//! surfaced to the user unchanged.

pub mod client;
pub mod error;
pub mod geocoding;

pub use client::{ApiClient, DEFAULT_API_BASE_URL};
pub use error::{describe_error, ApiError};
pub use geocoding::{GeocodingClient, DEFAULT_GEOCODER_URL};
