use crate::sql::postgres::hstore;
use bigdecimal::ToPrimitive;
use bytes::BytesMut;
use chrono::{DateTime, NaiveDate, NaiveDateTime, Utc};
use model::core::value::Value;
use rust_decimal::Decimal as RustDecimal;
use std::{collections::BTreeMap, error::Error, str::FromStr};
use tokio_postgres::types::{IsNull, Json as PgJson, Kind, ToSql, Type, to_sql_checked};
use uuid::Uuid;

type BoxError = Box<dyn Error + Sync + Send>;

/// A `Value` bound as a statement parameter.
///
/// The server infers each placeholder's type from the column it lands in,
/// so the encoding is picked from that type rather than from the variant.
#[derive(Debug)]
pub struct PgParam(Value);

impl PgParam {
    pub fn from_value(value: Value) -> Self {
        PgParam(value)
    }
}

impl ToSql for PgParam {
    fn to_sql(&self, ty: &Type, out: &mut BytesMut) -> Result<IsNull, BoxError> {
        match &self.0 {
            Value::Null => Ok(IsNull::Yes),
            // JSON scalars and arrays from caller input land in json columns
            Value::Boolean(_) | Value::Int(_) | Value::Float(_) | Value::StringArray(_)
                if is_json(ty) =>
            {
                encode(&PgJson(self.0.to_json()), ty, out)
            }
            Value::Boolean(v) => encode(v, ty, out),
            Value::Int(v) => encode_int(*v, ty, out),
            Value::Float(v) => encode_float(*v, ty, out),
            Value::Decimal(v) => match *ty {
                Type::FLOAT4 | Type::FLOAT8 => {
                    let f = v.to_f64().ok_or("decimal out of float range")?;
                    encode_float(f, ty, out)
                }
                Type::INT2 | Type::INT4 | Type::INT8 => {
                    let i = v.to_i64().ok_or("decimal is not an integer")?;
                    encode_int(i, ty, out)
                }
                _ if is_text(ty) => encode(&v.to_string().as_str(), ty, out),
                _ => encode(&RustDecimal::from_str(&v.to_string())?, ty, out),
            },
            Value::String(v) => encode_str(v, ty, out),
            Value::Json(v) => match *ty {
                Type::JSON | Type::JSONB => encode(&PgJson(v), ty, out),
                _ if is_text(ty) => encode(&v.to_string().as_str(), ty, out),
                _ if ty.name() == "hstore" => {
                    hstore::encode(&hstore_entries(v).ok_or_else(|| mismatch("json", ty))?, out)?;
                    Ok(IsNull::No)
                }
                _ => Err(mismatch("json", ty)),
            },
            Value::Uuid(v) => match *ty {
                Type::UUID => encode(v, ty, out),
                _ => encode(&v.to_string().as_str(), ty, out),
            },
            Value::Bytes(v) => encode(v, ty, out),
            Value::Date(v) => encode(v, ty, out),
            Value::Timestamp(v) => match *ty {
                Type::TIMESTAMP => encode(&v.naive_utc(), ty, out),
                _ => encode(v, ty, out),
            },
            Value::TimestampNaive(v) => match *ty {
                Type::TIMESTAMPTZ => encode(&v.and_utc(), ty, out),
                _ => encode(v, ty, out),
            },
            Value::StringArray(v) => encode(v, ty, out),
            Value::Hstore(map) if ty.name() == "hstore" => {
                hstore::encode(map, out)?;
                Ok(IsNull::No)
            }
            Value::Hstore(_) => Err(mismatch("hstore", ty)),
        }
    }

    fn accepts(_: &Type) -> bool {
        true
    }

    to_sql_checked!();
}

fn encode<T: ToSql>(value: &T, ty: &Type, out: &mut BytesMut) -> Result<IsNull, BoxError> {
    if !T::accepts(ty) {
        return Err(mismatch(std::any::type_name::<T>(), ty));
    }
    value.to_sql(ty, out)
}

fn encode_int(v: i64, ty: &Type, out: &mut BytesMut) -> Result<IsNull, BoxError> {
    match *ty {
        Type::INT2 => encode(&i16::try_from(v)?, ty, out),
        Type::INT4 => encode(&i32::try_from(v)?, ty, out),
        Type::FLOAT4 => encode(&(v as f32), ty, out),
        Type::FLOAT8 => encode(&(v as f64), ty, out),
        Type::NUMERIC => encode(&RustDecimal::from(v), ty, out),
        _ if is_text(ty) => encode(&v.to_string().as_str(), ty, out),
        _ => encode(&v, ty, out),
    }
}

fn encode_float(v: f64, ty: &Type, out: &mut BytesMut) -> Result<IsNull, BoxError> {
    match *ty {
        Type::FLOAT4 => encode(&(v as f32), ty, out),
        Type::NUMERIC => {
            if !v.is_finite() {
                return Err("float is not a finite decimal".into());
            }
            // Shortest round-trip text, so 0.1 is stored as 0.1
            encode(&RustDecimal::from_str(&v.to_string())?, ty, out)
        }
        _ if is_text(ty) => encode(&v.to_string().as_str(), ty, out),
        _ => encode(&v, ty, out),
    }
}

/// Text is also how values arrive from JSON input, so it is parsed into the
/// declared type when that type is not text-like.
fn encode_str(v: &str, ty: &Type, out: &mut BytesMut) -> Result<IsNull, BoxError> {
    match *ty {
        Type::INT2 | Type::INT4 | Type::INT8 => encode_int(v.trim().parse()?, ty, out),
        Type::FLOAT4 | Type::FLOAT8 => encode_float(v.trim().parse()?, ty, out),
        Type::NUMERIC => encode(&RustDecimal::from_str(v.trim())?, ty, out),
        Type::BOOL => encode(&v.trim().parse::<bool>()?, ty, out),
        Type::UUID => encode(&Uuid::parse_str(v.trim())?, ty, out),
        Type::DATE => encode(&NaiveDate::from_str(v.trim())?, ty, out),
        Type::TIMESTAMP => encode(&NaiveDateTime::from_str(v.trim())?, ty, out),
        Type::TIMESTAMPTZ => {
            let ts = DateTime::parse_from_rfc3339(v.trim())?.with_timezone(&Utc);
            encode(&ts, ty, out)
        }
        Type::JSON | Type::JSONB => {
            encode(&PgJson(serde_json::Value::String(v.to_string())), ty, out)
        }
        _ if matches!(ty.kind(), Kind::Enum(_)) => {
            out.extend_from_slice(v.as_bytes());
            Ok(IsNull::No)
        }
        _ => encode(&v, ty, out),
    }
}

/// A flat JSON object whose members are all strings or null.
fn hstore_entries(json: &serde_json::Value) -> Option<BTreeMap<String, Option<String>>> {
    json.as_object()?
        .iter()
        .map(|(key, member)| match member {
            serde_json::Value::String(text) => Some((key.clone(), Some(text.clone()))),
            serde_json::Value::Null => Some((key.clone(), None)),
            _ => None,
        })
        .collect()
}

fn is_json(ty: &Type) -> bool {
    matches!(*ty, Type::JSON | Type::JSONB)
}

fn is_text(ty: &Type) -> bool {
    matches!(*ty, Type::TEXT | Type::VARCHAR | Type::BPCHAR | Type::NAME)
}

fn mismatch(source: &str, ty: &Type) -> BoxError {
    format!("cannot bind a {source} value to a column of type {ty}").into()
}

pub struct PgParamStore {
    pub params: Vec<PgParam>,
}

impl PgParamStore {
    pub fn from_values(values: Vec<Value>) -> Self {
        Self {
            params: values.into_iter().map(PgParam::from_value).collect(),
        }
    }

    pub fn as_refs(&self) -> Vec<&(dyn ToSql + Sync)> {
        self.params
            .iter()
            .map(|param| param as &(dyn ToSql + Sync))
            .collect::<Vec<_>>()
    }
}
