//! Diagnostic sinks.
//!
//! A sink sees every request right before it is sent to the store.

use std::sync::{Mutex, PoisonError};

use dynodm_core::store::StoreRequest;

/// Receives `(operation, payload)` before each store call.
pub trait DiagnosticSink: Send + Sync {
    fn record(&self, request: &StoreRequest<'_>);
}

/// Logs request payloads as JSON at debug level.
#[derive(Debug, Clone, Copy, Default)]
pub struct TracingSink;

impl DiagnosticSink for TracingSink {
    fn record(&self, request: &StoreRequest<'_>) {
        match serde_json::to_string(request) {
            Ok(payload) => tracing::debug!(
                operation = request.operation(),
                table = request.table_name(),
                %payload,
                "Store request"
            ),
            Err(e) => tracing::warn!(
                operation = request.operation(),
                error = %e,
                "Failed to render store request"
            ),
        }
    }
}

/// Keeps every recorded request in memory.
#[derive(Debug, Default)]
pub struct RecordingSink {
    records: Mutex<Vec<(String, serde_json::Value)>>,
}

impl RecordingSink {
    pub fn new() -> Self {
        Self::default()
    }

    /// Recorded `(operation, payload)` pairs, oldest first.
    pub fn records(&self) -> Vec<(String, serde_json::Value)> {
        self.records
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    pub fn operations(&self) -> Vec<String> {
        self.records().into_iter().map(|(op, _)| op).collect()
    }
}

impl DiagnosticSink for RecordingSink {
    fn record(&self, request: &StoreRequest<'_>) {
        let payload = serde_json::to_value(request).unwrap_or(serde_json::Value::Null);
        self.records
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push((request.operation().to_string(), payload));
    }
}
