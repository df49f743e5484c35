//! Core library for Eirflow, a client for a city mobility dashboard backend.
//!
//! - `api`: HTTP client for the dashboard backend and the geocoding service
//! - `cache`: TTL response cache persisted as JSON files
//! - `auth`: persisted user session, role gating and keychain credentials
//! - `dashboard`: per-domain loaders that turn API payloads into view records
//! - `notifications`: role-scoped inbox with unread tracking and a background poller
//! - `models`: wire and view types
//! - `config`: user configuration with environment overrides

pub mod api;
pub mod auth;
pub mod cache;
pub mod config;
pub mod dashboard;
pub mod models;
pub mod notifications;
pub mod utils;
