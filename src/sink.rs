//! Diagnostic sink — warnings and notices from the mapping and resolution
//! passes go through an injected trait object instead of a global logger,
//! so tests can assert on what was emitted.

use std::sync::Mutex;

pub trait DiagnosticSink: Send + Sync {
    fn warn(&self, message: &str);
    fn info(&self, message: &str);
}

/// Default sink: forwards to `tracing`.
#[derive(Debug, Default)]
pub struct TracingSink;

impl DiagnosticSink for TracingSink {
    fn warn(&self, message: &str) {
        tracing::warn!("{}", message);
    }

    fn info(&self, message: &str) {
        tracing::info!("{}", message);
    }
}

/// Collects messages in memory. Used by tests.
#[derive(Debug, Default)]
pub struct MemorySink {
    messages: Mutex<Vec<String>>,
}

impl MemorySink {
    pub fn new() -> MemorySink {
        MemorySink::default()
    }

    pub fn messages(&self) -> Vec<String> {
        self.messages.lock().unwrap().clone()
    }

    pub fn contains(&self, needle: &str) -> bool {
        self.messages.lock().unwrap().iter().any(|m| m.contains(needle))
    }
}

impl DiagnosticSink for MemorySink {
    fn warn(&self, message: &str) {
        self.messages.lock().unwrap().push(format!("warn: {}", message));
    }

    fn info(&self, message: &str) {
        self.messages.lock().unwrap().push(format!("info: {}", message));
    }
}
