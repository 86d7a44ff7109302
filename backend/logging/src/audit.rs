//! Decision Audit Log
//!
//! Every allow/deny outcome and every failure to reach the mesh daemon is
//! reported through a [`DecisionLog`] handed to the gateway at construction.

use serde::Serialize;
use tracing::{error, info, warn};

use peerverify_core::{StatusError, VerifyRequest};

use crate::sanitize::sanitize_field;

/// Target used for all decision records, so they can be filtered or routed
/// separately (`RUST_LOG=peerverify::decision=warn`).
pub const DECISION_TARGET: &str = "peerverify::decision";

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum DecisionEvent {
    Allowed { node_public: String, source: String },
    Denied { node_public: String, source: String },
    StatusUnavailable { error: String },
}

impl DecisionEvent {
    pub fn allowed(request: &VerifyRequest) -> Self {
        Self::Allowed {
            node_public: request.node_public.clone(),
            source: request.source.clone(),
        }
    }

    pub fn denied(request: &VerifyRequest) -> Self {
        Self::Denied {
            node_public: request.node_public.clone(),
            source: request.source.clone(),
        }
    }

    pub fn status_unavailable(err: &StatusError) -> Self {
        Self::StatusUnavailable { error: err.to_string() }
    }
}

pub trait DecisionLog: Send + Sync {
    fn record(&self, event: DecisionEvent);
}

/// Writes decisions to the installed `tracing` subscriber: allow at info,
/// deny at warn, daemon failures at error.
#[derive(Debug, Clone, Copy, Default)]
pub struct TracingDecisionLog;

impl DecisionLog for TracingDecisionLog {
    fn record(&self, event: DecisionEvent) {
        match &event {
            DecisionEvent::Allowed { node_public, source } => info!(
                target: DECISION_TARGET,
                node_public = %sanitize_field(node_public),
                source = %sanitize_field(source),
                "Allowing access"
            ),
            DecisionEvent::Denied { node_public, source } => warn!(
                target: DECISION_TARGET,
                node_public = %sanitize_field(node_public),
                source = %sanitize_field(source),
                "Denying access"
            ),
            DecisionEvent::StatusUnavailable { error } => error!(
                target: DECISION_TARGET,
                error = %sanitize_field(error),
                "Mesh daemon status unavailable"
            ),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tracing::Level;

    fn request() -> VerifyRequest {
        VerifyRequest {
            node_public: "nodekey:aa".into(),
            source: "100.64.0.7".into(),
        }
    }

    #[test]
    fn events_capture_request_fields() {
        assert_eq!(
            DecisionEvent::denied(&request()),
            DecisionEvent::Denied {
                node_public: "nodekey:aa".into(),
                source: "100.64.0.7".into(),
            }
        );
    }

    #[test]
    fn status_event_carries_error_text() {
        let err = StatusError::ExternalProcess { code: Some(1), stderr: "logged out".into() };
        let DecisionEvent::StatusUnavailable { error } = DecisionEvent::status_unavailable(&err)
        else {
            panic!("wrong variant");
        };
        assert!(error.contains("logged out"));
    }

    #[test]
    fn events_serialize_with_type_tag() {
        let json = serde_json::to_value(DecisionEvent::allowed(&request())).unwrap();
        assert_eq!(json["type"], "allowed");
        assert_eq!(json["source"], "100.64.0.7");
    }

    mod capture {
        use std::collections::HashMap;
        use std::sync::{Arc, Mutex};

        use tracing::field::{Field, Visit};
        use tracing::{Event, Level, Subscriber};
        use tracing_subscriber::layer::{Context, Layer, SubscriberExt};

        #[derive(Debug, Clone)]
        pub struct Captured {
            pub level: Level,
            pub target: String,
            pub fields: HashMap<String, String>,
        }

        #[derive(Clone, Default)]
        pub struct CaptureLayer(pub Arc<Mutex<Vec<Captured>>>);

        struct FieldVisitor<'a>(&'a mut HashMap<String, String>);

        impl Visit for FieldVisitor<'_> {
            fn record_debug(&mut self, field: &Field, value: &dyn std::fmt::Debug) {
                self.0.insert(field.name().to_string(), format!("{value:?}"));
            }
        }

        impl<S: Subscriber> Layer<S> for CaptureLayer {
            fn on_event(&self, event: &Event<'_>, _ctx: Context<'_, S>) {
                let mut fields = HashMap::new();
                event.record(&mut FieldVisitor(&mut fields));
                self.0.lock().unwrap().push(Captured {
                    level: *event.metadata().level(),
                    target: event.metadata().target().to_string(),
                    fields,
                });
            }
        }

        /// Run `f` under a subscriber that records every event.
        pub fn events_of(f: impl FnOnce()) -> Vec<Captured> {
            let layer = CaptureLayer::default();
            let subscriber = tracing_subscriber::registry().with(layer.clone());
            tracing::subscriber::with_default(subscriber, f);
            let events = layer.0.lock().unwrap().clone();
            events
        }
    }

    #[test]
    fn tracing_log_uses_level_per_outcome() {
        let events = capture::events_of(|| {
            let log = TracingDecisionLog;
            log.record(DecisionEvent::allowed(&request()));
            log.record(DecisionEvent::denied(&request()));
            log.record(DecisionEvent::StatusUnavailable { error: "timed out".into() });
        });

        let levels: Vec<Level> = events.iter().map(|e| e.level).collect();
        assert_eq!(levels, [Level::INFO, Level::WARN, Level::ERROR]);
        assert!(events.iter().all(|e| e.target == DECISION_TARGET));

        assert_eq!(events[0].fields["node_public"], "nodekey:aa");
        assert_eq!(events[1].fields["source"], "100.64.0.7");
        assert_eq!(events[2].fields["error"], "timed out");
    }

    #[test]
    fn tracing_log_escapes_caller_fields() {
        let hostile = VerifyRequest {
            node_public: "nodekey:aa\n[INFO] forged".into(),
            source: "10.0.0.1\x1b[31m".into(),
        };
        let events = capture::events_of(|| {
            TracingDecisionLog.record(DecisionEvent::denied(&hostile));
        });

        assert_eq!(events.len(), 1);
        let fields = &events[0].fields;
        assert_eq!(fields["node_public"], "nodekey:aa\\n[INFO] forged");
        assert_eq!(fields["source"], "10.0.0.1\\u{1b}[31m");
        assert!(!fields["node_public"].contains('\n'));
        assert!(!fields["source"].contains('\x1b'));
    }
}
