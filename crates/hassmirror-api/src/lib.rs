//! Async client for a remote Home Assistant hub's REST state API.
//!
//! Two operations, one per endpoint: [`RestClient::get_state`] and
//! [`RestClient::get_all_states`]. Every failure is classified into the
//! [`ErrorKind`] taxonomy (authentication, communication, generic API).
//! The hub's WebSocket API is not covered.

pub mod client;
pub mod error;
pub mod models;
pub mod transport;

pub use client::RestClient;
pub use error::{Error, ErrorKind};
pub use models::EntityState;
pub use transport::{DEFAULT_TIMEOUT, TlsMode, TransportConfig};
