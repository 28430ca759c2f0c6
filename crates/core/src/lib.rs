//! Shopfront Core - Shared types library.
//!
//! This crate provides the types shared by every Shopfront component:
//! - `cart` - Cart synchronization client library
//! - `cli` - Command-line front end over the cart client
//! - `integration-tests` - In-process fake backend and end-to-end tests
//!
//! # Architecture
//!
//! The core crate contains only types and pure functions - no I/O, no HTTP
//! clients, no async runtime. Derived cart values (item count, subtotal) are
//! computed here so every consumer folds the cart the same way.
//!
//! # Modules
//!
//! - [`types`] - Newtype IDs, prices, emails, and the cart data model

#![cfg_attr(not(test), forbid(unsafe_code))]

pub mod types;

pub use types::*;
