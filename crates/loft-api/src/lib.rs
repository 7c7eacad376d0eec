//! # loft-api
//!
//! Typed SDK for the Loft controller's versioned REST API.
//!
//! All resources live under the `/v2/` prefix and exchange JSON bodies.
//! The [`Client`] owns the session (controller URL, bearer token, SSL
//! verification) and records the API version the server announces on
//! every response.
//!
//! ```text
//! ┌──────────┐      REST (/v2, JSON)      ┌────────────────┐
//! │ loft-cli │◄──────────────────────────►│ Loft controller│
//! └──────────┘                            └────────────────┘
//! ```

#![forbid(unsafe_code)]
#![warn(missing_docs)]

pub mod appsettings;
pub mod apps;
pub mod auth;
pub mod builds;
pub mod certs;
pub mod client;
pub mod config;
pub mod domains;
pub mod error;
pub mod gateways;
pub mod keys;
pub mod limits;
pub mod perms;
pub mod ps;
pub mod releases;
pub mod resources;
pub mod routes;
pub mod services;
pub mod tokens;
pub mod types;
pub mod users;
pub mod volumes;

pub use client::{Client, API_VERSION};
pub use error::ApiError;
pub use types::Paged;
