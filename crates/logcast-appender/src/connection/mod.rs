//! Remote connection management
//!
//! Owns the single lazily created connection to a remote hub host.

mod manager;
mod state;

pub use manager::ConnectionManager;
pub use state::ConnectionState;
