//! Structured errors for action invocations
//!
//! Every action reports failure through a single `BlasError`. The error names
//! the failing action and carries enough context for the host to explain what
//! went wrong without inspecting the operands again.

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::Value;

/// Standard error codes (machine-readable)
pub mod codes {
    pub const OPERATOR_ERROR: &str = "OPERATOR_ERROR";
    pub const PARSE_ERROR: &str = "PARSE_ERROR";
    pub const UNKNOWN_DENSITY: &str = "UNKNOWN_DENSITY";
    pub const UNDEFINED_ACTION: &str = "UNDEFINED_ACTION";
    pub const ARG_COUNT: &str = "ARG_COUNT";
    pub const ARG_TYPE: &str = "ARG_TYPE";
    pub const DOMAIN_ERROR: &str = "DOMAIN_ERROR";
    pub const INTERNAL: &str = "INTERNAL";
}

/// Severity level of an error
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    /// Call completed with degraded result
    Warning,
    /// Call failed
    Error,
    /// Call failed and the caller must not retry with the same arguments
    Fatal,
}

/// Context about where an error occurred
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ErrorContext {
    /// Action that raised the error
    #[serde(skip_serializing_if = "Option::is_none")]
    pub action: Option<String>,

    /// Plan (or rule) that invoked the action
    #[serde(skip_serializing_if = "Option::is_none")]
    pub plan: Option<String>,

    /// Zero-based index of the failing operand window
    #[serde(skip_serializing_if = "Option::is_none")]
    pub window: Option<usize>,

    /// Propagation notes
    #[serde(skip_serializing_if = "Vec::is_empty", default)]
    pub notes: Vec<String>,
}

/// Structured error raised by an action
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BlasError {
    /// Machine-readable error code
    pub code: String,

    /// Human-readable error message
    pub message: String,

    /// Suggestion for fixing the error
    #[serde(skip_serializing_if = "Option::is_none")]
    pub suggestion: Option<String>,

    /// Where the error occurred
    #[serde(skip_serializing_if = "Option::is_none")]
    pub context: Option<ErrorContext>,

    /// Severity level
    pub severity: Severity,
}

impl BlasError {
    /// Create a new error
    pub fn new(code: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            code: code.into(),
            message: message.into(),
            suggestion: None,
            context: None,
            severity: Severity::Error,
        }
    }

    /// Builder: add suggestion
    pub fn with_suggestion(mut self, suggestion: impl Into<String>) -> Self {
        self.suggestion = Some(suggestion.into());
        self
    }

    /// Builder: set action context
    pub fn in_action(mut self, action: impl Into<String>) -> Self {
        let ctx = self.context.get_or_insert_with(ErrorContext::default);
        ctx.action = Some(action.into());
        self
    }

    /// Builder: set plan context
    pub fn in_plan(mut self, plan: impl Into<String>) -> Self {
        let ctx = self.context.get_or_insert_with(ErrorContext::default);
        ctx.plan = Some(plan.into());
        self
    }

    /// Builder: set failing window
    pub fn at_window(mut self, window: usize) -> Self {
        let ctx = self.context.get_or_insert_with(ErrorContext::default);
        ctx.window = Some(window);
        self
    }

    /// Builder: add propagation note
    pub fn with_note(mut self, note: impl Into<String>) -> Self {
        let ctx = self.context.get_or_insert_with(ErrorContext::default);
        ctx.notes.push(note.into());
        self
    }

    /// Builder: set severity
    pub fn with_severity(mut self, severity: Severity) -> Self {
        self.severity = severity;
        self
    }

    /// Action name recorded in the context, if any
    pub fn action(&self) -> Option<&str> {
        self.context.as_ref().and_then(|c| c.action.as_deref())
    }

    // ========== Common Error Constructors ==========

    /// A window matched no operator symbol or no operand pairing.
    ///
    /// Shape mismatches are reported through this constructor as well; the
    /// dispatch core does not distinguish them from kind mismatches. A text
    /// operator is quoted; any other value is shown as `<Type value>`.
    pub fn operator_error(action: &str, operator: Option<&Value>, window: usize) -> Self {
        let message = match operator {
            Some(op) => format!(
                "{}: operator {} cannot be applied to the operands of window {}",
                action, render_operator(op), window
            ),
            None => format!(
                "{}: no operand combination matches window {}",
                action, window
            ),
        };
        Self::new(codes::OPERATOR_ERROR, message)
            .with_suggestion("Check operand kinds and shapes, and the operator symbol (+, |+|, -, *, /)")
            .in_action(action)
            .at_window(window)
    }

    pub fn parse_error(details: impl Into<String>) -> Self {
        Self::new(codes::PARSE_ERROR, format!("Parse error: {}", details.into()))
            .with_suggestion("Separate rows with ';' and fields with ',' or whitespace")
    }

    pub fn unknown_density(tag: &str) -> Self {
        Self::new(codes::UNKNOWN_DENSITY, format!("Unknown density selector: '{}'", tag))
            .with_suggestion("Use \"dense\" or \"sparse\"")
            .with_severity(Severity::Fatal)
    }

    pub fn undefined_action(name: &str) -> Self {
        Self::new(codes::UNDEFINED_ACTION, format!("Unknown action: {}", name))
            .with_suggestion("Use list_actions() to see registered actions")
    }

    pub fn arg_count(action: &str, expected: usize, got: usize) -> Self {
        Self::new(codes::ARG_COUNT,
            format!("{}() expects at least {} arguments, got {}", action, expected, got))
            .with_suggestion(format!("Use help('{}') for usage", action))
            .in_action(action)
    }

    pub fn arg_type(action: &str, arg: &str, expected: &str, got: &str) -> Self {
        Self::new(codes::ARG_TYPE,
            format!("{}() argument '{}': expected {}, got {}", action, arg, expected, got))
            .in_action(action)
    }

    pub fn domain_error(details: impl Into<String>) -> Self {
        Self::new(codes::DOMAIN_ERROR, format!("Domain error: {}", details.into()))
    }

    pub fn internal(details: impl Into<String>) -> Self {
        Self::new(codes::INTERNAL, format!("Internal error: {}", details.into()))
            .with_suggestion("This is a bug, please report it")
            .with_severity(Severity::Fatal)
    }
}

fn render_operator(op: &Value) -> String {
    match op {
        Value::Text(s) => format!("'{}'", s),
        other => format!("<{} {}>", other.type_name(), other),
    }
}

impl std::fmt::Display for BlasError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "[{}] {}", self.code, self.message)?;
        if let Some(ref suggestion) = self.suggestion {
            write!(f, " (suggestion: {})", suggestion)?;
        }
        Ok(())
    }
}

impl std::error::Error for BlasError {}

/// Errors raised by container arithmetic
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ContainerError {
    #[error("shape mismatch: {left} vs {right}")]
    ShapeMismatch { left: String, right: String },

    #[error("index {index} out of bounds for {shape}")]
    IndexOutOfBounds { index: String, shape: String },

    #[error("square matrix required, got {rows}×{cols}")]
    NotSquare { rows: usize, cols: usize },

    #[error("invalid sparse storage: {0}")]
    InvalidStorage(&'static str),
}

impl ContainerError {
    pub fn shape(left: impl std::fmt::Display, right: impl std::fmt::Display) -> Self {
        ContainerError::ShapeMismatch { left: left.to_string(), right: right.to_string() }
    }
}

impl From<ContainerError> for BlasError {
    fn from(err: ContainerError) -> Self {
        BlasError::domain_error(err.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_operator_error_names_action_and_symbol() {
        let err = BlasError::operator_error("math/blas/elementwise", Some(&Value::from("%")), 2);
        assert_eq!(err.code, codes::OPERATOR_ERROR);
        assert!(err.message.contains("math/blas/elementwise"));
        assert!(err.message.contains("'%'"));
        assert_eq!(err.action(), Some("math/blas/elementwise"));
        assert_eq!(err.context.as_ref().and_then(|c| c.window), Some(2));
    }

    #[test]
    fn test_operator_error_renders_non_text_operator() {
        let err = BlasError::operator_error("math/blas/elementwise", Some(&Value::from(3.0)), 0);
        assert!(err.message.contains("operator <Number 3> cannot"));
        assert!(!err.message.contains("'Number'"));

        let err = BlasError::operator_error("math/blas/multiply", None, 4);
        assert!(err.message.contains("no operand combination matches window 4"));
    }

    #[test]
    fn test_unknown_density_is_fatal() {
        let err = BlasError::unknown_density("compressed");
        assert_eq!(err.severity, Severity::Fatal);
        assert_eq!(err.code, codes::UNKNOWN_DENSITY);
    }

    #[test]
    fn test_display_includes_suggestion() {
        let err = BlasError::parse_error("'x' is not a number");
        let text = err.to_string();
        assert!(text.starts_with("[PARSE_ERROR]"));
        assert!(text.contains("suggestion"));
    }

    #[test]
    fn test_container_error_converts_to_domain_error() {
        let err: BlasError = ContainerError::NotSquare { rows: 2, cols: 3 }.into();
        assert_eq!(err.code, codes::DOMAIN_ERROR);
        assert!(err.message.contains("2×3"));
    }

    #[test]
    fn test_serialization_skips_empty_context() {
        let json = serde_json::to_value(BlasError::domain_error("x")).unwrap();
        assert!(json.get("context").is_none());
        assert_eq!(json["severity"], "error");
    }
}
