use bigdecimal::{BigDecimal, ToPrimitive};
use chrono::{DateTime, NaiveDate, NaiveDateTime, SubsecRound, Utc};
use serde::{Deserialize, Serialize};
use std::{collections::BTreeMap, fmt, hash::Hash, str::FromStr};
use uuid::Uuid;

/// A single column value, either supplied by the caller or decoded from a
/// returned row.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub enum Value {
    Null,
    Boolean(bool),
    Int(i64),
    Float(f64),
    Decimal(BigDecimal),
    String(String),
    Json(serde_json::Value),
    Uuid(Uuid),
    Bytes(Vec<u8>),
    Date(NaiveDate),
    Timestamp(DateTime<Utc>),
    TimestampNaive(NaiveDateTime),
    StringArray(Vec<String>),
    /// Flat string map with nullable values (PostgreSQL `hstore`).
    Hstore(BTreeMap<String, Option<String>>),
}

impl PartialEq for Value {
    fn eq(&self, other: &Self) -> bool {
        use Value::*;
        match (self, other) {
            (Null, Null) => true,
            (Boolean(a), Boolean(b)) => a == b,
            (Int(a), Int(b)) => a == b,
            // Bitwise, matching `Hash`: NaN equals itself and -0.0 != 0.0
            (Float(a), Float(b)) => a.to_bits() == b.to_bits(),
            (Decimal(a), Decimal(b)) => a == b,
            (String(a), String(b)) => a == b,
            (Json(a), Json(b)) => a == b,
            (Uuid(a), Uuid(b)) => a == b,
            (Bytes(a), Bytes(b)) => a == b,
            (Date(a), Date(b)) => a == b,
            (Timestamp(a), Timestamp(b)) => a == b,
            (TimestampNaive(a), TimestampNaive(b)) => a == b,
            (StringArray(a), StringArray(b)) => a == b,
            (Hstore(a), Hstore(b)) => a == b,
            _ => false,
        }
    }
}

impl Eq for Value {}

impl Hash for Value {
    fn hash<H: std::hash::Hasher>(&self, state: &mut H) {
        use Value::*;
        std::mem::discriminant(self).hash(state);
        match self {
            Null => {}
            Boolean(v) => v.hash(state),
            Int(v) => v.hash(state),
            // Hash the bits so NaN and -0.0 stay consistent with themselves
            Float(v) => v.to_bits().hash(state),
            Decimal(v) => v.normalized().to_string().hash(state),
            String(v) => v.hash(state),
            Json(v) => serde_json::to_string(v).unwrap_or_default().hash(state),
            Uuid(v) => v.hash(state),
            Bytes(v) => v.hash(state),
            Date(v) => v.hash(state),
            Timestamp(v) => v.hash(state),
            TimestampNaive(v) => v.hash(state),
            StringArray(v) => v.hash(state),
            Hstore(v) => v.hash(state),
        }
    }
}

impl Value {
    pub fn is_null(&self) -> bool {
        matches!(self, Value::Null)
    }

    pub fn as_i64(&self) -> Option<i64> {
        match self {
            Value::Int(v) => Some(*v),
            Value::String(v) => v.parse::<i64>().ok(),
            Value::Json(v) => v.as_i64(),
            _ => None,
        }
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            Value::String(v) => Some(v),
            Value::Json(v) => v.as_str(),
            _ => None,
        }
    }

    /// The form used when two values are compared as parts of a key.
    ///
    /// The server stores timestamps with microsecond resolution and may
    /// rescale numerics, so a caller-supplied value and its returned
    /// counterpart are only comparable after both are brought to this form.
    /// Integers and decimals share one numeric form; uuids and dates compare
    /// by their text so that values supplied as strings still match.
    pub fn canonical(&self) -> Value {
        match self {
            Value::Float(v) if *v == 0.0 => Value::Float(0.0),
            Value::Int(v) => Value::Decimal(BigDecimal::from(*v)),
            Value::Decimal(v) => Value::Decimal(v.normalized()),
            Value::Uuid(v) => Value::String(v.to_string()),
            Value::Date(v) => Value::String(v.format("%Y-%m-%d").to_string()),
            Value::Timestamp(v) => Value::Timestamp(v.trunc_subsecs(6)),
            Value::TimestampNaive(v) => Value::TimestampNaive(v.trunc_subsecs(6)),
            other => other.clone(),
        }
    }

    /// Reads this value as the type of `like`, the way the server reads a
    /// parameter as the type of the column it lands in. Text is parsed and
    /// numbers are widened; a value that does not convert is returned as is.
    ///
    /// Applied before [`Value::canonical`] so that caller input such as
    /// `"42"` or `10.5` compares equal to the typed value a column returns.
    pub fn coerce_like(&self, like: &Value) -> Value {
        let coerced = match (self, like) {
            (Value::Null, _) => None,
            (Value::String(v), Value::Int(_) | Value::Decimal(_)) => {
                BigDecimal::from_str(v.trim()).ok().map(Value::Decimal)
            }
            // Shortest round-trip text, as a NUMERIC parameter is encoded
            (Value::Float(v), Value::Int(_) | Value::Decimal(_)) => {
                BigDecimal::from_str(&v.to_string()).ok().map(Value::Decimal)
            }
            (Value::String(v), Value::Float(_)) => v.trim().parse().ok().map(Value::Float),
            (Value::Int(v), Value::Float(_)) => Some(Value::Float(*v as f64)),
            (Value::Decimal(v), Value::Float(_)) => v.to_f64().map(Value::Float),
            (Value::String(v), Value::Boolean(_)) => v.trim().parse().ok().map(Value::Boolean),
            (Value::String(v), Value::Uuid(_)) => {
                Uuid::parse_str(v.trim()).ok().map(Value::Uuid)
            }
            (Value::String(v), Value::Date(_)) => {
                NaiveDate::from_str(v.trim()).ok().map(Value::Date)
            }
            (Value::String(v), Value::Timestamp(_)) => DateTime::parse_from_rfc3339(v.trim())
                .ok()
                .map(|ts| Value::Timestamp(ts.with_timezone(&Utc))),
            (Value::TimestampNaive(v), Value::Timestamp(_)) => Some(Value::Timestamp(v.and_utc())),
            (Value::String(v), Value::TimestampNaive(_)) => {
                NaiveDateTime::from_str(v.trim()).ok().map(Value::TimestampNaive)
            }
            (Value::Timestamp(v), Value::TimestampNaive(_)) => {
                Some(Value::TimestampNaive(v.naive_utc()))
            }
            // hstore supplied as a JSON object, read back through `->` as text
            (Value::Json(serde_json::Value::String(v)), Value::String(_)) => {
                Some(Value::String(v.clone()))
            }
            (Value::Json(_), Value::Json(_)) => None,
            (other, Value::Json(_)) => Some(Value::Json(other.to_json())),
            _ => None,
        };
        coerced.unwrap_or_else(|| self.clone())
    }

    /// Extracts `key` from a semi-structured value the way the `->` operator
    /// does on the server: hstore entries come back as text, JSON object
    /// members as JSON. Anything else, or a missing key, yields `Null`.
    pub fn extract_key(&self, key: &str) -> Value {
        match self {
            Value::Hstore(map) => match map.get(key) {
                Some(Some(text)) => Value::String(text.clone()),
                _ => Value::Null,
            },
            Value::Json(serde_json::Value::Object(map)) => map
                .get(key)
                .map(|member| Value::Json(member.clone()))
                .unwrap_or(Value::Null),
            _ => Value::Null,
        }
    }

    /// Converts a JSON document value into the closest `Value`.
    pub fn from_json(json: serde_json::Value) -> Value {
        match json {
            serde_json::Value::Null => Value::Null,
            serde_json::Value::Bool(v) => Value::Boolean(v),
            serde_json::Value::Number(n) => match n.as_i64() {
                Some(v) => Value::Int(v),
                None => n.as_f64().map(Value::Float).unwrap_or(Value::Null),
            },
            serde_json::Value::String(v) => Value::String(v),
            serde_json::Value::Array(items) if items.iter().all(|i| i.is_string()) => {
                Value::StringArray(
                    items
                        .into_iter()
                        .filter_map(|i| i.as_str().map(str::to_string))
                        .collect(),
                )
            }
            other => Value::Json(other),
        }
    }

    pub fn to_json(&self) -> serde_json::Value {
        use serde_json::Value as Json;
        match self {
            Value::Null => Json::Null,
            Value::Boolean(v) => Json::Bool(*v),
            Value::Int(v) => Json::from(*v),
            Value::Float(v) => serde_json::Number::from_f64(*v)
                .map(Json::Number)
                .unwrap_or(Json::Null),
            Value::Decimal(v) => Json::String(v.to_string()),
            Value::String(v) => Json::String(v.clone()),
            Value::Json(v) => v.clone(),
            Value::Uuid(v) => Json::String(v.to_string()),
            Value::Bytes(v) => Json::String(hex_literal(v)),
            Value::Date(v) => Json::String(v.to_string()),
            Value::Timestamp(v) => Json::String(v.to_rfc3339()),
            Value::TimestampNaive(v) => Json::String(v.to_string()),
            Value::StringArray(v) => Json::from(v.clone()),
            Value::Hstore(map) => Json::Object(
                map.iter()
                    .map(|(k, v)| (k.clone(), v.clone().map(Json::String).unwrap_or(Json::Null)))
                    .collect(),
            ),
        }
    }
}

fn hex_literal(bytes: &[u8]) -> String {
    bytes
        .iter()
        .fold(String::from("\\x"), |acc, byte| acc + &format!("{byte:02x}"))
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Null => write!(f, "NULL"),
            Value::Boolean(v) => write!(f, "{v}"),
            Value::Int(v) => write!(f, "{v}"),
            Value::Float(v) => write!(f, "{v}"),
            Value::Decimal(v) => write!(f, "{v}"),
            Value::String(v) => write!(f, "'{}'", v.replace('\'', "''")),
            Value::Json(v) => write!(f, "'{}'", v.to_string().replace('\'', "''")),
            Value::Uuid(v) => write!(f, "{v}"),
            Value::Bytes(v) => write!(f, "'{}'", hex_literal(v)),
            Value::Date(v) => write!(f, "'{v}'"),
            Value::Timestamp(v) => write!(f, "'{v}'"),
            Value::TimestampNaive(v) => write!(f, "'{v}'"),
            Value::StringArray(v) => {
                let items = v
                    .iter()
                    .map(|s| format!("\"{}\"", s.replace('"', "\\\"")))
                    .collect::<Vec<_>>()
                    .join(", ");
                write!(f, "'{{{items}}}'")
            }
            Value::Hstore(map) => {
                let pairs = map
                    .iter()
                    .map(|(k, v)| match v {
                        Some(v) => format!("\"{k}\"=>\"{v}\""),
                        None => format!("\"{k}\"=>NULL"),
                    })
                    .collect::<Vec<_>>()
                    .join(", ");
                write!(f, "'{pairs}'")
            }
        }
    }
}

impl From<bool> for Value {
    fn from(v: bool) -> Self {
        Value::Boolean(v)
    }
}

impl From<i32> for Value {
    fn from(v: i32) -> Self {
        Value::Int(v as i64)
    }
}

impl From<i64> for Value {
    fn from(v: i64) -> Self {
        Value::Int(v)
    }
}

impl From<f64> for Value {
    fn from(v: f64) -> Self {
        Value::Float(v)
    }
}

impl From<&str> for Value {
    fn from(v: &str) -> Self {
        Value::String(v.to_string())
    }
}

impl From<String> for Value {
    fn from(v: String) -> Self {
        Value::String(v)
    }
}

impl From<Uuid> for Value {
    fn from(v: Uuid) -> Self {
        Value::Uuid(v)
    }
}

impl From<serde_json::Value> for Value {
    fn from(v: serde_json::Value) -> Self {
        Value::Json(v)
    }
}

impl<T: Into<Value>> From<Option<T>> for Value {
    fn from(v: Option<T>) -> Self {
        v.map(Into::into).unwrap_or(Value::Null)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn test_canonical_truncates_timestamps_to_micros() {
        let precise = Utc
            .timestamp_opt(1_700_000_000, 123_456_789)
            .single()
            .unwrap();
        let stored = Utc
            .timestamp_opt(1_700_000_000, 123_456_000)
            .single()
            .unwrap();

        assert_ne!(Value::Timestamp(precise), Value::Timestamp(stored));
        assert_eq!(
            Value::Timestamp(precise).canonical(),
            Value::Timestamp(stored).canonical()
        );
    }

    #[test]
    fn test_canonical_normalizes_decimal_scale() {
        let a = Value::Decimal(BigDecimal::from_str("10.500").unwrap()).canonical();
        let b = Value::Decimal(BigDecimal::from_str("10.5").unwrap()).canonical();

        let mut set = std::collections::HashSet::new();
        set.insert(a);
        assert!(set.contains(&b));
    }

    #[test]
    fn test_canonical_unifies_loosely_typed_input() {
        let stored = Value::Decimal(BigDecimal::from_str("42.00").unwrap());
        assert_eq!(Value::Int(42).canonical(), stored.canonical());

        let id = Uuid::new_v4();
        assert_eq!(
            Value::Uuid(id).canonical(),
            Value::String(id.to_string()).canonical()
        );

        let date = NaiveDate::from_ymd_opt(2024, 2, 29).unwrap();
        assert_eq!(
            Value::Date(date).canonical(),
            Value::String("2024-02-29".into()).canonical()
        );
    }

    #[test]
    fn test_float_equality_agrees_with_hash() {
        use std::collections::HashSet;

        assert_ne!(Value::Float(0.0), Value::Float(-0.0));
        assert_eq!(Value::Float(-0.0).canonical(), Value::Float(0.0).canonical());
        assert_eq!(Value::Float(f64::NAN), Value::Float(f64::NAN));

        let set: HashSet<Value> = [Value::Float(f64::NAN), Value::Float(f64::NAN)].into();
        assert_eq!(set.len(), 1);
    }

    #[test]
    fn test_coerce_like_reads_text_as_the_returned_type() {
        let int_column = Value::Int(42);
        assert_eq!(
            Value::String("42".into()).coerce_like(&int_column).canonical(),
            int_column.canonical()
        );

        let numeric_column = Value::Decimal(BigDecimal::from_str("10.50").unwrap());
        assert_eq!(
            Value::Float(10.5).coerce_like(&numeric_column).canonical(),
            numeric_column.canonical()
        );
        assert_eq!(
            Value::Float(0.1).coerce_like(&numeric_column),
            Value::Decimal(BigDecimal::from_str("0.1").unwrap())
        );

        let stored = Utc
            .timestamp_opt(1_700_000_000, 250_000_000)
            .single()
            .unwrap();
        assert_eq!(
            Value::String("2023-11-14T22:13:20.25Z".into())
                .coerce_like(&Value::Timestamp(stored))
                .canonical(),
            Value::Timestamp(stored).canonical()
        );

        assert_eq!(
            Value::String("true".into()).coerce_like(&Value::Boolean(true)),
            Value::Boolean(true)
        );
        assert_eq!(
            Value::Int(7).coerce_like(&Value::Json(serde_json::json!(7))),
            Value::Json(serde_json::json!(7))
        );
        assert_eq!(
            Value::Json(serde_json::json!("en")).coerce_like(&Value::String("fr".into())),
            Value::String("en".into())
        );
    }

    #[test]
    fn test_coerce_like_leaves_unconvertible_values_alone() {
        let text = Value::String("not a number".into());
        assert_eq!(text.coerce_like(&Value::Int(1)), text);
        assert_eq!(Value::Null.coerce_like(&Value::Int(1)), Value::Null);
        assert_eq!(
            Value::String("abc".into()).coerce_like(&Value::String("x".into())),
            Value::String("abc".into())
        );
    }

    #[test]
    fn test_extract_key_from_hstore_and_json() {
        let mut map = BTreeMap::new();
        map.insert("lang".to_string(), Some("en".to_string()));
        map.insert("empty".to_string(), None);
        let hstore = Value::Hstore(map);

        assert_eq!(hstore.extract_key("lang"), Value::String("en".into()));
        assert_eq!(hstore.extract_key("empty"), Value::Null);
        assert_eq!(hstore.extract_key("missing"), Value::Null);

        let json = Value::Json(serde_json::json!({ "sku": "A-1", "qty": 3 }));
        assert_eq!(json.extract_key("sku"), Value::Json(serde_json::json!("A-1")));
        assert_eq!(json.extract_key("nope"), Value::Null);
        assert_eq!(Value::Int(4).extract_key("sku"), Value::Null);
    }

    #[test]
    fn test_from_json_prefers_integers_and_string_arrays() {
        assert_eq!(Value::from_json(serde_json::json!(7)), Value::Int(7));
        assert_eq!(Value::from_json(serde_json::json!(7.5)), Value::Float(7.5));
        assert_eq!(
            Value::from_json(serde_json::json!(["a", "b"])),
            Value::StringArray(vec!["a".into(), "b".into()])
        );
        assert_eq!(
            Value::from_json(serde_json::json!([1, "b"])),
            Value::Json(serde_json::json!([1, "b"]))
        );
    }
}
