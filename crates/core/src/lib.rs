//! Core types for stockdesk
//!
//! This crate contains domain types shared across all other crates: request
//! payloads and envelopes, the table interaction state, the persisted session
//! record and the inventory entities.

mod constants;
mod env_config;
mod error;
mod payload;
mod pickup_cart;
mod session;
mod stock;
pub mod table;
#[cfg(test)]
mod table_tests;
mod user;

pub use constants::*;
pub use env_config::*;
pub use error::*;
pub use payload::*;
pub use pickup_cart::*;
pub use session::*;
pub use stock::*;
pub use table::{HeaderCheck, Order, TableState, compare_by, empty_rows};
pub use user::*;
