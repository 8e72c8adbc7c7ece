//! Scalar coercion rules. Every function here is total over any `Value` a
//! codec can produce — structurally valid parsed data never fails to coerce.

use crate::value::Value;

/// Tokens whose textual form reads as "off", matched case-insensitively by
/// the boolean coercion.
pub const FALSY_TOKENS: [&str; 7] = ["false", "f", "no", "n", "disabled", "off", "0"];

/// String coercion: strings pass through, booleans become their literal
/// tokens, falsy values become the empty string, everything else its textual
/// rendering.
pub fn string_value(raw: &Value) -> String {
    match raw {
        Value::Str(s) => s.clone(),
        Value::Bool(b) => {
            if *b {
                "true".to_string()
            } else {
                "false".to_string()
            }
        }
        v if !v.is_truthy() => String::new(),
        v => v.to_text(),
    }
}

/// Integer coercion: true integers pass through; booleans are not integers
/// but coerce to 0/1; floats truncate; strings parse as integer with a
/// float-then-truncate fallback; missing, falsy, or unparseable raws yield 0.
pub fn int_value(raw: &Value) -> i64 {
    match raw {
        Value::Int(i) => *i,
        Value::Bool(b) => *b as i64,
        Value::Float(f) => *f as i64,
        Value::Str(s) => {
            let t = s.trim();
            if t.is_empty() {
                0
            } else if let Ok(i) = t.parse::<i64>() {
                i
            } else if let Ok(f) = t.parse::<f64>() {
                f as i64
            } else {
                0
            }
        }
        _ => 0,
    }
}

/// Float coercion, analogous to the integer rules.
pub fn float_value(raw: &Value) -> f64 {
    match raw {
        Value::Float(f) => *f,
        Value::Int(i) => *i as f64,
        Value::Bool(b) => {
            if *b {
                1.0
            } else {
                0.0
            }
        }
        Value::Str(s) => {
            let t = s.trim();
            if t.is_empty() {
                0.0
            } else {
                t.parse::<f64>().unwrap_or(0.0)
            }
        }
        _ => 0.0,
    }
}

/// Boolean coercion: null is false; a textual rendering matching a falsy
/// token is false; anything else follows truthiness.
pub fn bool_value(raw: &Value) -> bool {
    match raw {
        Value::Null => false,
        v => {
            let text = v.to_text().to_ascii_lowercase();
            if FALSY_TOKENS.contains(&text.as_str()) {
                false
            } else {
                v.is_truthy()
            }
        }
    }
}

/// Re-infer a tighter scalar type for a string on serialization: boolean and
/// numeric-looking strings are emitted as their native type. Used only when
/// the string converter's retype mode is on.
pub fn retype_string(s: &str) -> Value {
    match s {
        "true" | "True" => return Value::Bool(true),
        "false" | "False" => return Value::Bool(false),
        _ => {}
    }
    if let Ok(i) = s.parse::<i64>() {
        return Value::Int(i);
    }
    if let Ok(f) = s.parse::<f64>() {
        if f.is_finite() {
            return Value::Float(f);
        }
    }
    Value::Str(s.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    // --- String ---

    #[test]
    fn string_passes_through() {
        assert_eq!(string_value(&Value::Str("abc".into())), "abc");
    }

    #[test]
    fn string_from_bool_tokens() {
        assert_eq!(string_value(&Value::Bool(true)), "true");
        assert_eq!(string_value(&Value::Bool(false)), "false");
    }

    #[test]
    fn string_from_falsy_is_empty() {
        assert_eq!(string_value(&Value::Null), "");
        assert_eq!(string_value(&Value::Int(0)), "");
        assert_eq!(string_value(&Value::Float(0.0)), "");
    }

    #[test]
    fn string_from_number_renders() {
        assert_eq!(string_value(&Value::Int(42)), "42");
        assert_eq!(string_value(&Value::Float(1.5)), "1.5");
    }

    // --- Integer ---

    #[test]
    fn int_passes_through() {
        assert_eq!(int_value(&Value::Int(-7)), -7);
    }

    #[test]
    fn int_from_bool() {
        assert_eq!(int_value(&Value::Bool(true)), 1);
        assert_eq!(int_value(&Value::Bool(false)), 0);
    }

    #[test]
    fn int_from_float_truncates() {
        assert_eq!(int_value(&Value::Float(3.9)), 3);
        assert_eq!(int_value(&Value::Float(-2.7)), -2);
    }

    #[test]
    fn int_from_string() {
        assert_eq!(int_value(&Value::Str("42".into())), 42);
        assert_eq!(int_value(&Value::Str("3.9".into())), 3);
        assert_eq!(int_value(&Value::Str("".into())), 0);
        assert_eq!(int_value(&Value::Str("nope".into())), 0);
    }

    #[test]
    fn int_from_missing_is_zero() {
        assert_eq!(int_value(&Value::Null), 0);
        assert_eq!(int_value(&Value::Seq(vec![])), 0);
    }

    // --- Float ---

    #[test]
    fn float_passes_through() {
        assert_eq!(float_value(&Value::Float(0.25)), 0.25);
    }

    #[test]
    fn float_from_int_and_string() {
        assert_eq!(float_value(&Value::Int(2)), 2.0);
        assert_eq!(float_value(&Value::Str("1.5".into())), 1.5);
        assert_eq!(float_value(&Value::Str("".into())), 0.0);
    }

    #[test]
    fn float_from_missing_is_zero() {
        assert_eq!(float_value(&Value::Null), 0.0);
    }

    // --- Boolean ---

    #[test]
    fn bool_falsy_tokens() {
        for token in ["false", "F", "no", "N", "Disabled", "OFF", "0"] {
            assert!(!bool_value(&Value::Str(token.into())), "token: {}", token);
        }
    }

    #[test]
    fn bool_from_truthy_values() {
        assert!(bool_value(&Value::Str("yes".into())));
        assert!(bool_value(&Value::Int(7)));
        assert!(bool_value(&Value::Bool(true)));
    }

    #[test]
    fn bool_zero_matches_token() {
        assert!(!bool_value(&Value::Int(0)));
    }

    #[test]
    fn bool_missing_is_false() {
        assert!(!bool_value(&Value::Null));
        assert!(!bool_value(&Value::Str("".into())));
    }

    // --- Retype ---

    #[test]
    fn retype_recognizes_native_types() {
        assert_eq!(retype_string("true"), Value::Bool(true));
        assert_eq!(retype_string("42"), Value::Int(42));
        assert_eq!(retype_string("1.5"), Value::Float(1.5));
    }

    #[test]
    fn retype_keeps_plain_strings() {
        assert_eq!(retype_string("hello"), Value::Str("hello".into()));
        assert_eq!(retype_string(""), Value::Str(String::new()));
        assert_eq!(retype_string("inf"), Value::Str("inf".into()));
    }

    // --- Round-trip stability (to_value(to_data(v)) == v) ---

    #[test]
    fn round_trip_stability() {
        assert_eq!(int_value(&Value::Int(int_value(&Value::Int(42)))), 42);
        assert_eq!(float_value(&Value::Float(0.5)), 0.5);
        assert!(bool_value(&Value::Bool(true)));
        assert_eq!(string_value(&Value::Str("x".into())), "x");
    }
}
