//! Live update client for the game admin console
//!
//! Maintains a single real-time connection to the game server, folds the
//! heterogeneous event stream into bounded queryable state, and recovers
//! from transient disconnects with exponential backoff. Rendering is a
//! collaborator: it reads [`ConsoleState`] and listens for
//! [`StateChange`] notifications, and this crate compiles and tests
//! without any rendering surface present.

pub mod backoff;
pub mod client;
pub mod config;
pub mod state;

mod dispatch;

pub use backoff::Backoff;
pub use client::{ClientCommand, LiveClient};
pub use config::StreamConfig;
pub use state::{ConsoleState, StateChange};
