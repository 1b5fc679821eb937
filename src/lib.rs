//! SNMP acquisition for DEVA4004 FM monitoring receivers.
//!
//! [`session::Session`] speaks SNMP v1/v2c over a [`transport::Transport`];
//! the device modules build on it:
//!
//! * [`channels`]: channel topology, read once at startup
//! * [`monitoring`]: live per-frequency metrics, accumulated in place
//! * [`alarms`]: the fixed 50-slot alarm table
//!
//! [`poller::PollManager`] ties them together for the daemon.

pub mod alarms;
pub mod ber;
pub mod channels;
pub mod config;
pub mod error;
pub mod logging;
pub mod monitoring;
pub mod oid;
pub mod oids;
pub mod poller;
pub mod session;
pub mod transport;

#[cfg(test)]
mod mock;

pub use error::{Result, SnmpError};
pub use oid::Oid;
