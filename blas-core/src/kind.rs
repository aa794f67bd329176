//! Runtime capability queries on boxed values
//!
//! Engines never cast a value before asking whether it can be viewed as the
//! kind they need. A negative answer is not an error: it moves dispatch on to
//! the next candidate.

use crate::Value;

/// What a boxed value can be viewed as, without copying
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Kind {
    Vector,
    Matrix,
    Scalar,
    Text,
}

impl Kind {
    pub fn name(&self) -> &'static str {
        match self {
            Kind::Vector => "Vector",
            Kind::Matrix => "Matrix",
            Kind::Scalar => "Number",
            Kind::Text => "Text",
        }
    }
}

impl Value {
    /// Whether this value is assignable to `kind`
    pub fn is_kind(&self, kind: Kind) -> bool {
        self.kind() == Some(kind)
    }

    /// The single kind this value is assignable to, if any
    pub fn kind(&self) -> Option<Kind> {
        match self {
            Value::Vector(_) => Some(Kind::Vector),
            Value::Matrix(_) => Some(Kind::Matrix),
            Value::Number(_) => Some(Kind::Scalar),
            Value::Text(_) => Some(Kind::Text),
            Value::Bool(_) | Value::List(_) | Value::Null => None,
        }
    }
}

/// Free-function form of [`Value::is_kind`]
pub fn is_kind(value: &Value, kind: Kind) -> bool {
    value.is_kind(kind)
}
