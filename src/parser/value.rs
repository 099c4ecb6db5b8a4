use crate::ast::{Value, ValueKind};
use crate::resolver::DELIMITER;

/// Decode the right-hand side of an attribute line (`i'42`, `s'hello`).
///
/// Returns `None` for an unknown tag, a missing delimiter, or a numeral that
/// does not parse. String payloads are taken verbatim and may be empty.
pub fn decode(text: &str) -> Option<Value> {
    let mut chars = text.chars();
    let kind = ValueKind::from_tag(chars.next()?)?;
    let payload = chars.as_str().strip_prefix(DELIMITER)?;

    match kind {
        ValueKind::String => Some(Value::String(payload.to_string())),
        ValueKind::Int => payload.parse().ok().map(Value::Int),
        ValueKind::UInt => payload.parse().ok().map(Value::UInt),
        ValueKind::Float => payload.parse().ok().map(Value::Float),
        ValueKind::Double => payload.parse().ok().map(Value::Double),
    }
}

/// Encode a value as `tag'payload`, the exact inverse of [`decode`].
pub fn encode(value: &Value) -> String {
    format!("{}{}{}", value.kind().tag(), DELIMITER, value)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_decode_every_tag() {
        assert_eq!(decode("s'hello world"), Some(Value::String("hello world".into())));
        assert_eq!(decode("i'-42"), Some(Value::Int(-42)));
        assert_eq!(decode("u'18446744073709551615"), Some(Value::UInt(u64::MAX)));
        assert_eq!(decode("f'1.5"), Some(Value::Float(1.5)));
        assert_eq!(decode("d'0.1"), Some(Value::Double(0.1)));
    }

    #[test]
    fn test_decode_rejects_bad_input() {
        assert_eq!(decode("x'1"), None);
        assert_eq!(decode("i42"), None);
        assert_eq!(decode("i'"), None);
        assert_eq!(decode("u'-1"), None);
        assert_eq!(decode("i'4.2"), None);
        assert_eq!(decode(""), None);
    }

    #[test]
    fn test_string_payload_is_raw() {
        assert_eq!(decode("s'it's'fine"), Some(Value::String("it's'fine".into())));
        assert_eq!(decode("s'"), Some(Value::String(String::new())));
    }

    #[test]
    fn test_encode_matches_text_form() {
        assert_eq!(encode(&Value::Int(42)), "i'42");
        assert_eq!(encode(&Value::String("hi".into())), "s'hi");
        assert_eq!(encode(&Value::Float(0.1)), "f'0.1");
    }

    #[test]
    fn test_float_bits_survive() {
        let v = Value::Double(std::f64::consts::PI);
        assert_eq!(decode(&encode(&v)), Some(v));
        let v = Value::Float(f32::MIN_POSITIVE);
        assert_eq!(decode(&encode(&v)), Some(v));
    }
}
