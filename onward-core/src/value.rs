use crate::builtin::Builtin;
use crate::errors::*;
use crate::quotation::Quotation;

/// Everything the stack can hold
///
/// Cloning a value is a deep copy: every `Text` and `Quotation` occurrence
/// owns its payload.
#[derive(Debug, Clone, PartialEq)]
pub enum Value {
    Number(f64),
    Text(String),
    Builtin(Builtin),
    Quotation(Quotation),
}

impl Value {
    /// Builtins and quotations run when collapsed; numbers and text are data.
    pub fn is_executable(&self) -> bool {
        match self {
            Value::Builtin(_) | Value::Quotation(_) => true,
            Value::Number(_) | Value::Text(_) => false,
        }
    }

    pub fn try_into_number(self) -> Result<f64> {
        match self {
            Value::Number(n) => Ok(n),
            other => Err(ErrorKind::TypeMismatch("number", other.to_string()).into()),
        }
    }

    pub fn try_into_text(self) -> Result<String> {
        match self {
            Value::Text(s) => Ok(s),
            other => Err(ErrorKind::TypeMismatch("text", other.to_string()).into()),
        }
    }

    pub fn try_into_quotation(self) -> Result<Quotation> {
        match self {
            Value::Quotation(q) => Ok(q),
            other => Err(ErrorKind::TypeMismatch("quotation", other.to_string()).into()),
        }
    }
}

impl std::fmt::Display for Value {
    fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
        match self {
            Value::Number(n) => write!(f, "{}", n),
            Value::Text(s) => write!(f, "\"{}\"", s),
            Value::Builtin(op) => write!(f, "<builtin {}>", op.name()),
            Value::Quotation(q) => write!(f, "{}", q),
        }
    }
}

impl std::cmp::PartialEq<f64> for Value {
    fn eq(&self, other: &f64) -> bool {
        match self {
            Value::Number(n) => n == other,
            _ => false,
        }
    }
}

impl std::cmp::PartialEq<&str> for Value {
    fn eq(&self, other: &&str) -> bool {
        match self {
            Value::Text(s) => s == other,
            _ => false,
        }
    }
}

impl From<f64> for Value {
    fn from(n: f64) -> Value {
        Value::Number(n)
    }
}

impl From<String> for Value {
    fn from(s: String) -> Value {
        Value::Text(s)
    }
}

impl From<&str> for Value {
    fn from(s: &str) -> Value {
        Value::Text(s.to_owned())
    }
}

impl From<Builtin> for Value {
    fn from(op: Builtin) -> Value {
        Value::Builtin(op)
    }
}

impl From<Quotation> for Value {
    fn from(q: Quotation) -> Value {
        Value::Quotation(q)
    }
}
