//! Leasing lifecycle rules and renewal filtering for the property management console.

pub mod config;
pub mod error;
pub mod telemetry;
pub mod workflows;
