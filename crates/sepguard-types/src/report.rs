use serde::{Deserialize, Serialize};
use std::fmt;

/// A single violation. `message` may span several lines but never ends with a
/// newline; rendering adds exactly one.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Violation {
    pub check_id: String,
    pub message: String,
}

/// Ordered list of violations produced by one or more checks.
///
/// An empty report means full conformance.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Report {
    violations: Vec<Violation>,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Verdict {
    Pass,
    Fail,
}

impl Report {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, check_id: &str, message: impl Into<String>) {
        let mut message = message.into();
        while message.ends_with('\n') {
            message.pop();
        }
        self.violations.push(Violation {
            check_id: check_id.to_string(),
            message,
        });
    }

    pub fn extend(&mut self, other: Report) {
        self.violations.extend(other.violations);
    }

    pub fn violations(&self) -> &[Violation] {
        &self.violations
    }

    pub fn is_empty(&self) -> bool {
        self.violations.is_empty()
    }

    pub fn len(&self) -> usize {
        self.violations.len()
    }

    pub fn verdict(&self) -> Verdict {
        if self.is_empty() {
            Verdict::Pass
        } else {
            Verdict::Fail
        }
    }

    /// Newline-terminated messages concatenated in order. Empty string on pass.
    pub fn render(&self) -> String {
        let mut out = String::new();
        for v in &self.violations {
            out.push_str(&v.message);
            out.push('\n');
        }
        out
    }
}

impl fmt::Display for Report {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.render())
    }
}

impl FromIterator<Violation> for Report {
    fn from_iter<I: IntoIterator<Item = Violation>>(iter: I) -> Self {
        Self {
            violations: iter.into_iter().collect(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_report_renders_empty_string_and_passes() {
        let report = Report::new();
        assert_eq!(report.render(), "");
        assert_eq!(report.verdict(), Verdict::Pass);
    }

    #[test]
    fn render_terminates_each_message_once() {
        let mut report = Report::new();
        report.push("a", "first\n");
        report.push("b", "second\nline");
        assert_eq!(report.render(), "first\nsecond\nline\n");
        assert_eq!(report.verdict(), Verdict::Fail);
    }

    #[test]
    fn serializes_as_plain_list() {
        let mut report = Report::new();
        report.push("x", "bad");
        let json = serde_json::to_value(&report).expect("serialize");
        assert_eq!(json[0]["check_id"], "x");
        assert_eq!(json[0]["message"], "bad");
    }
}
