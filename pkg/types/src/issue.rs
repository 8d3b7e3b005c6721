use serde::{Deserialize, Serialize};
use std::fmt;

/// `Error` blocks generation for the affected target; `Warning` is informational.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    Error,
    Warning,
}

impl Severity {
    pub fn as_str(&self) -> &'static str {
        match self {
            Severity::Error => "error",
            Severity::Warning => "warning",
        }
    }
}

impl fmt::Display for Severity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A single validation finding, routed to a node/edge and one of its fields.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Issue {
    pub message: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub element_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub field_key: Option<String>,
    pub severity: Severity,
}

impl Issue {
    pub fn error(message: impl Into<String>, element_id: &str, field_key: impl Into<String>) -> Self {
        Self::new(Severity::Error, message, element_id, field_key)
    }

    pub fn warning(
        message: impl Into<String>,
        element_id: &str,
        field_key: impl Into<String>,
    ) -> Self {
        Self::new(Severity::Warning, message, element_id, field_key)
    }

    fn new(
        severity: Severity,
        message: impl Into<String>,
        element_id: &str,
        field_key: impl Into<String>,
    ) -> Self {
        Self {
            message: message.into(),
            element_id: Some(element_id.to_string()),
            field_key: Some(field_key.into()),
            severity,
        }
    }

    pub fn is_error(&self) -> bool {
        self.severity == Severity::Error
    }

    pub fn is_warning(&self) -> bool {
        self.severity == Severity::Warning
    }

    /// True when the issue is attached to the given node or edge id.
    pub fn concerns(&self, element_id: &str) -> bool {
        self.element_id.as_deref() == Some(element_id)
    }
}

impl fmt::Display for Issue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}: {} (element: {}",
            self.severity,
            self.message,
            self.element_id.as_deref().unwrap_or("N/A")
        )?;
        if let Some(field) = &self.field_key {
            write!(f, ", field: {}", field)?;
        }
        f.write_str(")")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn display_includes_routing() {
        let issue = Issue::warning("labels are empty", "pg-1", "labels");
        assert_eq!(
            issue.to_string(),
            "warning: labels are empty (element: pg-1, field: labels)"
        );
    }

    #[test]
    fn display_without_element() {
        let issue = Issue {
            message: "oops".to_string(),
            element_id: None,
            field_key: None,
            severity: Severity::Error,
        };
        assert_eq!(issue.to_string(), "error: oops (element: N/A)");
    }

    #[test]
    fn serializes_camel_case() {
        let issue = Issue::error("bad", "e-1", "source");
        let json = serde_json::to_string(&issue).unwrap();
        assert_eq!(
            json,
            r#"{"message":"bad","elementId":"e-1","fieldKey":"source","severity":"error"}"#
        );
    }
}
