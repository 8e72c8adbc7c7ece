//! Raw value representation shared by the codec and conversion layers.
//!
//! `Value` is what a codec parses text into and serializes text from. Keyed
//! records are vectors of pairs rather than hash maps so that key order
//! survives a parse→dump round trip.

use std::cmp::Ordering;

// ---------------------------------------------------------------------------
// Value
// ---------------------------------------------------------------------------

/// A parsed raw value, or a value ready for serialization.
#[derive(Debug, Clone, PartialEq)]
pub enum Value {
    Null,
    Bool(bool),
    Int(i64),
    Float(f64),
    Str(String),
    Seq(Vec<Value>),
    /// Keyed record, order-preserving.
    Map(Vec<(String, Value)>),
}

impl Value {
    /// Short type label for diagnostics.
    pub fn type_name(&self) -> &'static str {
        match self {
            Value::Null => "null",
            Value::Bool(_) => "bool",
            Value::Int(_) => "int",
            Value::Float(_) => "float",
            Value::Str(_) => "string",
            Value::Seq(_) => "sequence",
            Value::Map(_) => "mapping",
        }
    }

    /// Truthiness: null, false, zero, the empty string, and empty containers
    /// are falsy; everything else is truthy.
    pub fn is_truthy(&self) -> bool {
        match self {
            Value::Null => false,
            Value::Bool(b) => *b,
            Value::Int(i) => *i != 0,
            Value::Float(f) => *f != 0.0,
            Value::Str(s) => !s.is_empty(),
            Value::Seq(items) => !items.is_empty(),
            Value::Map(entries) => !entries.is_empty(),
        }
    }

    /// Textual rendering used by the string and boolean coercions.
    ///
    /// Booleans render as the literal tokens `true`/`false`; null renders as
    /// the empty string; containers render bracketed.
    pub fn to_text(&self) -> String {
        match self {
            Value::Null => String::new(),
            Value::Bool(b) => {
                if *b {
                    "true".to_string()
                } else {
                    "false".to_string()
                }
            }
            Value::Int(i) => i.to_string(),
            Value::Float(f) => f.to_string(),
            Value::Str(s) => s.clone(),
            Value::Seq(items) => {
                let parts: Vec<String> = items.iter().map(|v| v.to_text()).collect();
                format!("[{}]", parts.join(", "))
            }
            Value::Map(entries) => {
                let parts: Vec<String> = entries
                    .iter()
                    .map(|(k, v)| format!("{}: {}", k, v.to_text()))
                    .collect();
                format!("{{{}}}", parts.join(", "))
            }
        }
    }

    /// Total ordering used by the sorted sequence variant: null first, then
    /// booleans, numbers (int and float compared numerically), strings,
    /// sequences, mappings.
    pub fn natural_cmp(&self, other: &Value) -> Ordering {
        fn rank(v: &Value) -> u8 {
            match v {
                Value::Null => 0,
                Value::Bool(_) => 1,
                Value::Int(_) | Value::Float(_) => 2,
                Value::Str(_) => 3,
                Value::Seq(_) => 4,
                Value::Map(_) => 5,
            }
        }
        match (self, other) {
            (Value::Bool(a), Value::Bool(b)) => a.cmp(b),
            (Value::Int(a), Value::Int(b)) => a.cmp(b),
            (Value::Float(a), Value::Float(b)) => a.partial_cmp(b).unwrap_or(Ordering::Equal),
            (Value::Int(a), Value::Float(b)) => {
                (*a as f64).partial_cmp(b).unwrap_or(Ordering::Equal)
            }
            (Value::Float(a), Value::Int(b)) => {
                a.partial_cmp(&(*b as f64)).unwrap_or(Ordering::Equal)
            }
            (Value::Str(a), Value::Str(b)) => a.cmp(b),
            (Value::Seq(a), Value::Seq(b)) => {
                for (x, y) in a.iter().zip(b.iter()) {
                    match x.natural_cmp(y) {
                        Ordering::Equal => continue,
                        ord => return ord,
                    }
                }
                a.len().cmp(&b.len())
            }
            (a, b) => rank(a).cmp(&rank(b)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn truthiness_of_scalars() {
        assert!(!Value::Null.is_truthy());
        assert!(!Value::Bool(false).is_truthy());
        assert!(Value::Bool(true).is_truthy());
        assert!(!Value::Int(0).is_truthy());
        assert!(Value::Int(-1).is_truthy());
        assert!(!Value::Float(0.0).is_truthy());
        assert!(Value::Float(0.5).is_truthy());
        assert!(!Value::Str(String::new()).is_truthy());
        assert!(Value::Str("x".into()).is_truthy());
    }

    #[test]
    fn truthiness_of_containers() {
        assert!(!Value::Seq(vec![]).is_truthy());
        assert!(Value::Seq(vec![Value::Null]).is_truthy());
        assert!(!Value::Map(vec![]).is_truthy());
        assert!(Value::Map(vec![("k".into(), Value::Null)]).is_truthy());
    }

    #[test]
    fn text_rendering() {
        assert_eq!(Value::Null.to_text(), "");
        assert_eq!(Value::Bool(true).to_text(), "true");
        assert_eq!(Value::Bool(false).to_text(), "false");
        assert_eq!(Value::Int(42).to_text(), "42");
        assert_eq!(Value::Float(1.5).to_text(), "1.5");
        assert_eq!(Value::Str("abc".into()).to_text(), "abc");
        assert_eq!(
            Value::Seq(vec![Value::Int(1), Value::Int(2)]).to_text(),
            "[1, 2]"
        );
    }

    #[test]
    fn natural_cmp_numbers() {
        assert_eq!(Value::Int(1).natural_cmp(&Value::Int(2)), Ordering::Less);
        assert_eq!(
            Value::Float(2.5).natural_cmp(&Value::Int(2)),
            Ordering::Greater
        );
        assert_eq!(Value::Int(3).natural_cmp(&Value::Float(3.0)), Ordering::Equal);
    }

    #[test]
    fn natural_cmp_mixed_types_by_rank() {
        assert_eq!(
            Value::Null.natural_cmp(&Value::Bool(false)),
            Ordering::Less
        );
        assert_eq!(
            Value::Str("a".into()).natural_cmp(&Value::Int(99)),
            Ordering::Greater
        );
    }

    #[test]
    fn natural_cmp_sequences_elementwise() {
        let a = Value::Seq(vec![Value::Int(1), Value::Int(2)]);
        let b = Value::Seq(vec![Value::Int(1), Value::Int(3)]);
        assert_eq!(a.natural_cmp(&b), Ordering::Less);
        let shorter = Value::Seq(vec![Value::Int(1)]);
        assert_eq!(shorter.natural_cmp(&a), Ordering::Less);
    }
}
