//! Structured logging for peerverify.
//!
//! Subscriber setup, the decision audit log handed to the gateway, and
//! escaping of caller-supplied values before they reach a log line.

pub mod audit;
pub mod logger;
pub mod sanitize;

pub use audit::{DECISION_TARGET, DecisionEvent, DecisionLog, TracingDecisionLog};
pub use logger::{LoggerConfig, init_logger};
pub use sanitize::sanitize_field;
