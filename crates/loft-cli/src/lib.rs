//! # loft-cli
//!
//! Command-line client for the Loft controller.
//!
//! The pipeline every invocation flows through:
//!
//! ```text
//! argv ──► parser (shortcuts, group:verb, --config) ──► command runner
//!                                                        │
//!            profile store ──► loft_api::Client ─────────┤ REST /v2
//!                                                        ▼
//!                              table formatter ──► stdout, errors ──► stderr
//! ```
//!
//! Unknown groups fall through to external `loft-<command>` binaries on
//! `$PATH`.

#![forbid(unsafe_code)]
#![warn(missing_docs)]

pub mod commands;
pub mod dispatch;
pub mod error;
pub mod git;
pub mod parser;
pub mod parsers;
pub mod profile;
pub mod progress;
pub mod shortcuts;
pub mod table;
pub mod update;

pub use error::CliError;
pub use parser::Invocation;
pub use profile::Profile;
