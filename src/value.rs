use std::cmp::Ordering;
use std::fmt;

/// Runtime values. There is no boolean kind: comparisons produce `1` or `0`.
#[derive(Debug, Clone, PartialEq)]
pub enum Value {
    Nil,
    Number(f64),
    String(String),
}

impl Value {
    pub fn from_bool(b: bool) -> Value {
        Value::Number(if b { 1.0 } else { 0.0 })
    }

    pub fn is_truthy(&self) -> bool {
        match self {
            Value::Nil => false,
            Value::Number(n) => *n != 0.0 && !n.is_nan(),
            Value::String(s) => !s.is_empty(),
        }
    }

    pub fn type_name(&self) -> &'static str {
        match self {
            Value::Nil => "nil",
            Value::Number(_) => "number",
            Value::String(_) => "string",
        }
    }

    /// Numeric coercion for arithmetic. Blank strings are `0`, anything
    /// unparseable is NaN.
    pub fn to_number(&self) -> f64 {
        match self {
            Value::Nil => f64::NAN,
            Value::Number(n) => *n,
            Value::String(s) => {
                let trimmed = s.trim();
                if trimmed.is_empty() {
                    0.0
                } else {
                    trimmed.parse::<f64>().unwrap_or(f64::NAN)
                }
            }
        }
    }

    /// Values of different kinds are never equal; NaN is not equal to itself.
    pub fn equals(&self, other: &Value) -> bool {
        match (self, other) {
            (Value::Nil, Value::Nil) => true,
            (Value::Number(a), Value::Number(b)) => a == b,
            (Value::String(a), Value::String(b)) => a == b,
            _ => false,
        }
    }

    /// Two strings compare lexicographically, everything else numerically.
    /// `None` when either side is NaN.
    pub fn compare(&self, other: &Value) -> Option<Ordering> {
        match (self, other) {
            (Value::String(a), Value::String(b)) => Some(a.cmp(b)),
            _ => self.to_number().partial_cmp(&other.to_number()),
        }
    }
}

impl From<&str> for Value {
    fn from(s: &str) -> Self {
        Value::String(s.to_string())
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            Value::Nil => write!(f, "nil"),
            Value::Number(n) => {
                if n.is_nan() {
                    write!(f, "NaN")
                } else if n.is_infinite() {
                    write!(f, "{}", if *n > 0.0 { "Infinity" } else { "-Infinity" })
                } else if *n == 0.0 {
                    // -0 prints as 0
                    write!(f, "0")
                } else if (1e-6..1e21).contains(&n.abs()) {
                    write!(f, "{}", n)
                } else {
                    // Exponent form outside [1e-6, 1e21): 1e+21, 1.5e-7
                    let formatted = format!("{:e}", n);
                    match formatted.split_once('e') {
                        Some((mantissa, exponent)) if !exponent.starts_with('-') => {
                            write!(f, "{}e+{}", mantissa, exponent)
                        }
                        _ => write!(f, "{}", formatted),
                    }
                }
            }
            Value::String(s) => write!(f, "{}", s),
        }
    }
}
