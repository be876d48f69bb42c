//! Gate reports.

use serde::{Deserialize, Serialize};

/// A single check inside a gate
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GateCheck {
    /// What was checked (usually a page path)
    pub name: String,
    /// Check message
    pub message: String,
}

impl GateCheck {
    /// Create a passed check
    #[must_use]
    pub fn new(name: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            message: message.into(),
        }
    }
}

/// Result of a gate that passed
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GateReport {
    /// Gate label
    pub gate: String,
    /// Checks performed
    pub checks: Vec<GateCheck>,
}

impl GateReport {
    /// Empty report for a gate
    #[must_use]
    pub fn new(gate: &str) -> Self {
        Self {
            gate: gate.to_string(),
            checks: Vec::new(),
        }
    }

    /// Add a check
    #[must_use]
    pub fn with_check(mut self, check: GateCheck) -> Self {
        self.checks.push(check);
        self
    }

    /// Add a check in place
    pub fn push(&mut self, name: impl Into<String>, message: impl Into<String>) {
        self.checks.push(GateCheck::new(name, message));
    }

    /// Get summary
    #[must_use]
    pub fn summary(&self) -> String {
        format!("{} passed: {} checks", self.gate, self.checks.len())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_summary() {
        let report = GateReport::new("PRESENCE")
            .with_check(GateCheck::new("sitemap.xml", "present"))
            .with_check(GateCheck::new("legal/disclaimer", "present"));
        assert_eq!(report.summary(), "PRESENCE passed: 2 checks");
    }
}
