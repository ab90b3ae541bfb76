//! Domain types shared by the back-office client crates.
//!
//! This crate has zero internal deps so the HTTP client, the controllers
//! and the console binary can all depend on it without cycles.

pub mod api;
pub mod entities;
pub mod error;
pub mod page;
pub mod period;
pub mod query;
pub mod report;
pub mod types;
