//! Google Sheets destination.
//!
//! Authenticates with a service-account key and talks to the Sheets v4 REST
//! API through the blocking `reqwest` client.

pub mod auth;
pub mod client;
pub mod types;

pub use auth::{AccessToken, SPREADSHEETS_SCOPE, ServiceAccountKey};
pub use client::SheetsClient;
