//! Diagnostics are passed into the components that generate answer files
//! rather than pulled from global logging state, so callers decide where
//! problems with user input end up.

use std::sync::Mutex;
use tracing::Level;

/// A sink for problems found in user input.
pub trait Diagnostics {
    fn error(&self, message: &str);

    fn warn(&self, message: &str);

    fn info(&self, message: &str);
}

/// Forwards diagnostics to the `tracing` subscriber.
#[derive(Clone, Copy, Debug, Default)]
pub struct TracingDiagnostics;

impl Diagnostics for TracingDiagnostics {
    fn error(&self, message: &str) {
        tracing::error!("{}", message);
    }

    fn warn(&self, message: &str) {
        tracing::warn!("{}", message);
    }

    fn info(&self, message: &str) {
        tracing::info!("{}", message);
    }
}

/// Keeps diagnostics in memory so they can be inspected later.
#[derive(Debug, Default)]
pub struct MemoryDiagnostics {
    records: Mutex<Vec<(Level, String)>>,
}

impl MemoryDiagnostics {
    pub fn new() -> Self {
        Self::default()
    }

    fn push(&self, level: Level, message: &str) {
        if let Ok(mut records) = self.records.lock() {
            records.push((level, message.to_string()));
        }
    }

    /// All recorded diagnostics in the order they were reported.
    pub fn records(&self) -> Vec<(Level, String)> {
        self.records
            .lock()
            .map(|records| records.clone())
            .unwrap_or_default()
    }

    /// Recorded messages at the given level.
    pub fn messages(&self, level: Level) -> Vec<String> {
        self.records()
            .into_iter()
            .filter(|(recorded, _)| *recorded == level)
            .map(|(_, message)| message)
            .collect()
    }

    pub fn errors(&self) -> Vec<String> {
        self.messages(Level::ERROR)
    }

    pub fn is_empty(&self) -> bool {
        self.records().is_empty()
    }
}

impl Diagnostics for MemoryDiagnostics {
    fn error(&self, message: &str) {
        self.push(Level::ERROR, message);
    }

    fn warn(&self, message: &str) {
        self.push(Level::WARN, message);
    }

    fn info(&self, message: &str) {
        self.push(Level::INFO, message);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_memory_diagnostics() {
        let diagnostics = MemoryDiagnostics::new();
        assert!(diagnostics.is_empty());

        diagnostics.error("bad key");
        diagnostics.info("try this");

        assert_eq!(diagnostics.errors(), vec!["bad key"]);
        assert_eq!(diagnostics.messages(Level::INFO), vec!["try this"]);
        assert_eq!(diagnostics.records().len(), 2);
    }
}
