//! Diagnostic record module.
//!
//! One record per application request or console command:
//! - typed append operations for each telemetry category
//! - unique record id generation
//! - custom user data tabs for caller-defined payloads

pub mod entries;
pub mod id;
pub mod request;
pub mod user_data;

pub use entries::*;
pub use id::*;
pub use request::*;
pub use user_data::*;
