//! # PHP Serialization Codec
//!
//! Both WordPress plugins persist structured values (settings, translation
//! group payloads, string catalogs) with PHP's `serialize()`. This module
//! reads and writes that format for the subset of types those blobs use:
//! null, booleans, integers, floats, strings and arrays. Objects are rejected.
//!
//! String lengths are byte lengths, as in PHP.
//!
//! ```rust
//! use wpml_to_polylang::codec::php::{PhpKey, PhpValue};
//!
//! let value = PhpValue::Array(vec![(PhpKey::Str("fr".into()), PhpValue::Int(205))]);
//! assert_eq!(value.encode(), r#"a:1:{s:2:"fr";i:205;}"#);
//! assert_eq!(PhpValue::decode(&value.encode()).unwrap(), value);
//! ```

use serde_json::{Map, Number, Value as JsonValue};
use std::fmt::Write as _;
use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Error)]
pub enum PhpCodecError {
    #[error("unexpected end of input at byte {0}")]
    UnexpectedEnd(usize),
    #[error("unexpected byte {found:?} at {position}, expected {expected}")]
    Unexpected {
        position: usize,
        found: char,
        expected: &'static str,
    },
    #[error("invalid number at byte {0}")]
    InvalidNumber(usize),
    #[error("invalid UTF-8 in string at byte {0}")]
    InvalidUtf8(usize),
    #[error("unsupported type tag {tag:?} at byte {position}")]
    UnsupportedType { tag: char, position: usize },
    #[error("invalid array key at byte {0}")]
    InvalidKey(usize),
    #[error("trailing data at byte {0}")]
    TrailingData(usize),
}

pub type PhpCodecResult<T> = Result<T, PhpCodecError>;

/// Array key. PHP only allows integers and strings.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum PhpKey {
    Int(i64),
    Str(String),
}

impl PhpKey {
    /// Key as PHP would normalize it: canonical decimal strings become integers.
    pub fn normalized(key: &str) -> Self {
        match key.parse::<i64>() {
            Ok(n) if n.to_string() == key => Self::Int(n),
            _ => Self::Str(key.to_string()),
        }
    }

    pub fn as_string(&self) -> String {
        match self {
            Self::Int(n) => n.to_string(),
            Self::Str(s) => s.clone(),
        }
    }
}

/// A decoded PHP value. Arrays keep their insertion order.
#[derive(Debug, Clone, PartialEq)]
pub enum PhpValue {
    Null,
    Bool(bool),
    Int(i64),
    Float(f64),
    Str(String),
    Array(Vec<(PhpKey, PhpValue)>),
}

impl PhpValue {
    /// Build a list (`0..n` integer keys) from values.
    pub fn list(values: impl IntoIterator<Item = PhpValue>) -> Self {
        Self::Array(
            values
                .into_iter()
                .enumerate()
                .map(|(i, v)| (PhpKey::Int(i as i64), v))
                .collect(),
        )
    }

    pub fn as_array(&self) -> Option<&[(PhpKey, PhpValue)]> {
        match self {
            Self::Array(entries) => Some(entries),
            _ => None,
        }
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            Self::Str(s) => Some(s),
            _ => None,
        }
    }

    /// Integer value, accepting numeric strings the way PHP code usually stores ids.
    pub fn as_i64(&self) -> Option<i64> {
        match self {
            Self::Int(n) => Some(*n),
            Self::Str(s) => s.trim().parse().ok(),
            Self::Bool(b) => Some(i64::from(*b)),
            _ => None,
        }
    }

    /// Look up a string key in an array value.
    pub fn get(&self, key: &str) -> Option<&PhpValue> {
        let wanted = PhpKey::normalized(key);
        self.as_array()?
            .iter()
            .find(|(k, _)| *k == wanted)
            .map(|(_, v)| v)
    }

    /// Serialize to PHP's `serialize()` format.
    pub fn encode(&self) -> String {
        let mut out = String::new();
        self.encode_into(&mut out);
        out
    }

    fn encode_into(&self, out: &mut String) {
        match self {
            Self::Null => out.push_str("N;"),
            Self::Bool(b) => {
                let _ = write!(out, "b:{};", u8::from(*b));
            }
            Self::Int(n) => {
                let _ = write!(out, "i:{n};");
            }
            Self::Float(f) => {
                if f.is_nan() {
                    out.push_str("d:NAN;");
                } else if f.is_infinite() {
                    out.push_str(if *f > 0.0 { "d:INF;" } else { "d:-INF;" });
                } else {
                    let _ = write!(out, "d:{f};");
                }
            }
            Self::Str(s) => {
                let _ = write!(out, "s:{}:\"{}\";", s.len(), s);
            }
            Self::Array(entries) => {
                let _ = write!(out, "a:{}:{{", entries.len());
                for (key, value) in entries {
                    match key {
                        PhpKey::Int(n) => {
                            let _ = write!(out, "i:{n};");
                        }
                        PhpKey::Str(s) => {
                            let _ = write!(out, "s:{}:\"{}\";", s.len(), s);
                        }
                    }
                    value.encode_into(out);
                }
                out.push('}');
            }
        }
    }

    /// Parse a complete serialized value.
    pub fn decode(input: &str) -> PhpCodecResult<Self> {
        let mut parser = Parser {
            input: input.as_bytes(),
            pos: 0,
        };
        let value = parser.value()?;
        if parser.pos != parser.input.len() {
            return Err(PhpCodecError::TrailingData(parser.pos));
        }
        Ok(value)
    }

    /// Convert into JSON. Arrays with keys `0..n` in order become JSON arrays,
    /// every other array becomes an object.
    pub fn to_json(&self) -> JsonValue {
        match self {
            Self::Null => JsonValue::Null,
            Self::Bool(b) => JsonValue::Bool(*b),
            Self::Int(n) => JsonValue::Number((*n).into()),
            Self::Float(f) => Number::from_f64(*f)
                .map(JsonValue::Number)
                .unwrap_or(JsonValue::Null),
            Self::Str(s) => JsonValue::String(s.clone()),
            Self::Array(entries) => {
                let is_list = entries
                    .iter()
                    .enumerate()
                    .all(|(i, (k, _))| *k == PhpKey::Int(i as i64));
                if is_list {
                    JsonValue::Array(entries.iter().map(|(_, v)| v.to_json()).collect())
                } else {
                    let map: Map<String, JsonValue> = entries
                        .iter()
                        .map(|(k, v)| (k.as_string(), v.to_json()))
                        .collect();
                    JsonValue::Object(map)
                }
            }
        }
    }

    /// Convert from JSON, normalizing numeric object keys to integer keys.
    pub fn from_json(value: &JsonValue) -> Self {
        match value {
            JsonValue::Null => Self::Null,
            JsonValue::Bool(b) => Self::Bool(*b),
            JsonValue::Number(n) => match n.as_i64() {
                Some(i) => Self::Int(i),
                None => Self::Float(n.as_f64().unwrap_or_default()),
            },
            JsonValue::String(s) => Self::Str(s.clone()),
            JsonValue::Array(items) => Self::list(items.iter().map(Self::from_json)),
            JsonValue::Object(map) => Self::Array(
                map.iter()
                    .map(|(k, v)| (PhpKey::normalized(k), Self::from_json(v)))
                    .collect(),
            ),
        }
    }
}

struct Parser<'a> {
    input: &'a [u8],
    pos: usize,
}

impl<'a> Parser<'a> {
    fn peek(&self) -> PhpCodecResult<u8> {
        self.input
            .get(self.pos)
            .copied()
            .ok_or(PhpCodecError::UnexpectedEnd(self.pos))
    }

    fn next(&mut self) -> PhpCodecResult<u8> {
        let byte = self.peek()?;
        self.pos += 1;
        Ok(byte)
    }

    fn expect(&mut self, wanted: u8, expected: &'static str) -> PhpCodecResult<()> {
        let position = self.pos;
        let found = self.next()?;
        if found != wanted {
            return Err(PhpCodecError::Unexpected {
                position,
                found: found as char,
                expected,
            });
        }
        Ok(())
    }

    /// Read up to (and consume) `terminator`, returning the text before it.
    fn until(&mut self, terminator: u8) -> PhpCodecResult<&'a str> {
        let start = self.pos;
        let input: &'a [u8] = self.input;
        let rest = &input[start..];
        let offset = rest
            .iter()
            .position(|b| *b == terminator)
            .ok_or(PhpCodecError::UnexpectedEnd(self.input.len()))?;
        self.pos = start + offset + 1;
        std::str::from_utf8(&rest[..offset]).map_err(|_| PhpCodecError::InvalidUtf8(start))
    }

    fn number<T: std::str::FromStr>(&mut self, terminator: u8) -> PhpCodecResult<T> {
        let start = self.pos;
        self.until(terminator)?
            .parse()
            .map_err(|_| PhpCodecError::InvalidNumber(start))
    }

    fn value(&mut self) -> PhpCodecResult<PhpValue> {
        let position = self.pos;
        let tag = self.next()?;
        match tag {
            b'N' => {
                self.expect(b';', "';'")?;
                Ok(PhpValue::Null)
            }
            b'b' => {
                self.expect(b':', "':'")?;
                let n: u8 = self.number(b';')?;
                Ok(PhpValue::Bool(n != 0))
            }
            b'i' => {
                self.expect(b':', "':'")?;
                Ok(PhpValue::Int(self.number(b';')?))
            }
            b'd' => {
                self.expect(b':', "':'")?;
                let start = self.pos;
                let raw = self.until(b';')?;
                let parsed = match raw {
                    "INF" => f64::INFINITY,
                    "-INF" => f64::NEG_INFINITY,
                    "NAN" => f64::NAN,
                    other => other
                        .parse()
                        .map_err(|_| PhpCodecError::InvalidNumber(start))?,
                };
                Ok(PhpValue::Float(parsed))
            }
            b's' => {
                self.expect(b':', "':'")?;
                Ok(PhpValue::Str(self.string_body()?))
            }
            b'a' => {
                self.expect(b':', "':'")?;
                let len: usize = self.number(b':')?;
                self.expect(b'{', "'{'")?;
                let mut entries = Vec::with_capacity(len.min(1024));
                for _ in 0..len {
                    let key_position = self.pos;
                    let key = match self.value()? {
                        PhpValue::Int(n) => PhpKey::Int(n),
                        PhpValue::Str(s) => PhpKey::Str(s),
                        _ => return Err(PhpCodecError::InvalidKey(key_position)),
                    };
                    let value = self.value()?;
                    entries.push((key, value));
                }
                self.expect(b'}', "'}'")?;
                Ok(PhpValue::Array(entries))
            }
            other => Err(PhpCodecError::UnsupportedType {
                tag: other as char,
                position,
            }),
        }
    }

    /// `<len>:"<bytes>";` after the `s:` prefix.
    fn string_body(&mut self) -> PhpCodecResult<String> {
        let len: usize = self.number(b':')?;
        self.expect(b'"', "'\"'")?;
        let start = self.pos;
        let end = start
            .checked_add(len)
            .filter(|end| *end <= self.input.len())
            .ok_or(PhpCodecError::UnexpectedEnd(self.input.len()))?;
        let text = std::str::from_utf8(&self.input[start..end])
            .map_err(|_| PhpCodecError::InvalidUtf8(start))?
            .to_string();
        self.pos = end;
        self.expect(b'"', "'\"'")?;
        self.expect(b';', "';'")?;
        Ok(text)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_encode_scalars() {
        assert_eq!(PhpValue::Null.encode(), "N;");
        assert_eq!(PhpValue::Bool(true).encode(), "b:1;");
        assert_eq!(PhpValue::Int(-42).encode(), "i:-42;");
        assert_eq!(PhpValue::Float(0.5).encode(), "d:0.5;");
        assert_eq!(PhpValue::Str("héllo".into()).encode(), "s:6:\"héllo\";");
    }

    #[test]
    fn test_decode_nested_array() {
        let raw = concat!(
            r#"a:2:{s:16:"default_language";s:2:"en";"#,
            r#"s:15:"languages_order";a:2:{i:0;s:2:"fr";i:1;s:2:"de";}}"#,
        );
        let value = PhpValue::decode(raw).unwrap();
        assert_eq!(value.get("default_language").and_then(|v| v.as_str()), Some("en"));
        let order = value.get("languages_order").unwrap();
        assert_eq!(order.to_json(), json!(["fr", "de"]));
    }

    #[test]
    fn test_string_length_is_in_bytes() {
        // A quote inside the payload must not terminate the string early.
        let raw = "s:5:\"a\";bc\";";
        assert_eq!(PhpValue::decode(raw).unwrap(), PhpValue::Str("a\";bc".into()));
    }

    #[test]
    fn test_decode_rejects_objects_and_trailing_data() {
        assert!(matches!(
            PhpValue::decode("O:8:\"stdClass\":0:{}"),
            Err(PhpCodecError::UnsupportedType { tag: 'O', .. })
        ));
        assert_eq!(
            PhpValue::decode("i:1;i:2;"),
            Err(PhpCodecError::TrailingData(4))
        );
        assert!(matches!(
            PhpValue::decode("s:10:\"short\";"),
            Err(PhpCodecError::UnexpectedEnd(_))
        ));
    }

    #[test]
    fn test_numeric_strings_act_as_integers() {
        let value = PhpValue::decode(r#"a:1:{i:7;s:3:"123";}"#).unwrap();
        assert_eq!(value.get("7").and_then(PhpValue::as_i64), Some(123));
    }

    #[test]
    fn test_json_bridge_objects() {
        let json = json!({"nav_menus": {"twentytwenty": {"primary": {"fr": 12}}}, "rewrite": 1});
        let php = PhpValue::from_json(&json);
        let decoded = PhpValue::decode(&php.encode()).unwrap();
        assert_eq!(decoded.to_json(), json);
    }

    #[test]
    fn test_json_numeric_keys_become_int_keys() {
        let php = PhpValue::from_json(&json!({"3": "x", "03": "y"}));
        let keys: Vec<PhpKey> = php.as_array().unwrap().iter().map(|(k, _)| k.clone()).collect();
        assert!(keys.contains(&PhpKey::Int(3)));
        assert!(keys.contains(&PhpKey::Str("03".into())));
    }
}
