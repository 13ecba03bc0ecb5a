//! # workforce-ledger
//!
//! In-memory data and rules engine for tracking workers and their shifts.
//!
//! Provides the worker registry and clock-in/clock-out session tracker
//! (`ledger`), read-only search and reporting views (`query`), JSON
//! snapshots (`storage`), TOML roster import (`roster`), and tracing plus
//! OpenTelemetry setup (`telemetry`).

pub mod clock;
pub mod config;
pub mod error;
pub mod event;
pub mod ledger;
pub mod model;
pub mod query;
pub mod roster;
pub mod storage;
pub mod telemetry;

pub use clock::{Clock, ManualClock, SystemClock};
pub use error::{Error, Result};
pub use ledger::{Ledger, SharedLedger};
