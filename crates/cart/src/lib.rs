//! Shopfront cart synchronization client.
//!
//! Keeps a client-side mirror of the shopper's server-side cart and
//! exposes the cart operations of the Shopfront REST API.
//!
//! # Modules
//!
//! - [`cart`] - The cart mirror and its operations
//! - [`auth`] - Login with remote and local session resolvers
//! - [`catalog`] - Cached product snapshots
//! - [`session`] - Shared session store
//! - [`transport`] - The `Transport` seam and its `reqwest` implementation
//! - [`notify`] - User-facing operation notices
//! - [`config`] - Environment configuration
//! - [`error`] - The uniform `ClientError`

#![cfg_attr(not(test), forbid(unsafe_code))]

pub mod auth;
pub mod cart;
pub mod catalog;
pub mod config;
pub mod error;
pub mod notify;
pub mod session;
pub mod transport;

#[cfg(test)]
mod testing;

pub use auth::{AuthService, FallbackResolver, LocalResolver, RemoteResolver, SessionResolver};
pub use cart::{CartClient, CartPhase, CartRoutes, CartValidation};
pub use catalog::CatalogClient;
pub use config::{ClientConfig, ConfigError};
pub use error::{CheckoutBlocker, ClientError, Result};
pub use notify::{Notice, NoticeLevel, Notifier, RecordingNotifier, TracingNotifier};
pub use session::{AuthState, Session, SessionStore, SessionUser};
pub use transport::{ApiRequest, HttpTransport, Transport};
