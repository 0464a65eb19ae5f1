//! hookrelay - Minimal HTTP relay utilities.
//!
//! This library provides shared modules for the two hookrelay binaries:
//! - `hookrelay-forwarder`: Token-gated pass-through to a downstream webhook
//! - `hookrelay-catcher`: Logs and echoes every request it receives
//!
//! ## Architecture
//!
//! ```text
//! Caller → Forwarder (token check) → downstream webhook → status + body back
//! Caller → Catcher → stdout + requests.log → {"ok": true, "received": ...}
//! ```

pub mod catcher;
pub mod config;
pub mod forward;
pub mod telemetry;
pub mod web;

// Re-export commonly used types
pub use catcher::{CatchResponse, Catcher, RequestLog, RequestRecord};
pub use config::Config;
pub use forward::{ForwardError, Forwarder, Relayed};
pub use web::{CatcherState, ForwarderState};
