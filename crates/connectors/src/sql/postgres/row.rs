use crate::sql::{base::error::DbError, postgres::hstore};
use bigdecimal::BigDecimal;
use chrono::{DateTime, NaiveDate, NaiveDateTime, Utc};
use model::{
    core::value::Value,
    records::row::{FieldValue, UpsertRow},
};
use rust_decimal::Decimal as RustDecimal;
use std::{error::Error, str::FromStr};
use tokio_postgres::{
    Row,
    types::{FromSql, Kind, Type},
};
use uuid::Uuid;

/// A returned column decoded into a `Value`, chosen by the column's type.
#[derive(Debug)]
pub struct PgValue(pub Value);

impl<'a> FromSql<'a> for PgValue {
    fn from_sql(ty: &Type, raw: &'a [u8]) -> Result<Self, Box<dyn Error + Sync + Send>> {
        let value = match *ty {
            Type::BOOL => Value::Boolean(bool::from_sql(ty, raw)?),
            Type::INT2 => Value::Int(i16::from_sql(ty, raw)?.into()),
            Type::INT4 => Value::Int(i32::from_sql(ty, raw)?.into()),
            Type::INT8 => Value::Int(i64::from_sql(ty, raw)?),
            Type::OID => Value::Int(u32::from_sql(ty, raw)?.into()),
            Type::FLOAT4 => Value::Float(f32::from_sql(ty, raw)?.into()),
            Type::FLOAT8 => Value::Float(f64::from_sql(ty, raw)?),
            Type::NUMERIC => {
                let decimal = RustDecimal::from_sql(ty, raw)?;
                Value::Decimal(BigDecimal::from_str(&decimal.to_string())?)
            }
            Type::TEXT | Type::VARCHAR | Type::BPCHAR | Type::NAME | Type::UNKNOWN => {
                Value::String(String::from_sql(ty, raw)?)
            }
            Type::JSON | Type::JSONB => Value::Json(serde_json::Value::from_sql(ty, raw)?),
            Type::UUID => Value::Uuid(Uuid::from_sql(ty, raw)?),
            Type::BYTEA => Value::Bytes(Vec::<u8>::from_sql(ty, raw)?),
            Type::DATE => Value::Date(NaiveDate::from_sql(ty, raw)?),
            Type::TIMESTAMP => Value::TimestampNaive(NaiveDateTime::from_sql(ty, raw)?),
            Type::TIMESTAMPTZ => Value::Timestamp(DateTime::<Utc>::from_sql(ty, raw)?),
            Type::TEXT_ARRAY | Type::VARCHAR_ARRAY | Type::BPCHAR_ARRAY => {
                Value::StringArray(Vec::<String>::from_sql(ty, raw)?)
            }
            _ if ty.name() == "hstore" => Value::Hstore(hstore::decode(raw)?),
            _ if matches!(ty.kind(), Kind::Enum(_)) || ty.name() == "citext" => {
                Value::String(std::str::from_utf8(raw)?.to_string())
            }
            _ => return Err(format!("unsupported column type {ty}").into()),
        };
        Ok(PgValue(value))
    }

    fn from_sql_null(_: &Type) -> Result<Self, Box<dyn Error + Sync + Send>> {
        Ok(PgValue(Value::Null))
    }

    fn accepts(_: &Type) -> bool {
        true
    }
}

/// Decodes every column of a returned row, keeping the server's column
/// order.
pub fn decode_row(row: &Row) -> Result<UpsertRow, DbError> {
    let fields = row
        .columns()
        .iter()
        .enumerate()
        .map(|(i, column)| {
            let value = row
                .try_get::<_, PgValue>(i)
                .map_err(|_| DbError::Decode {
                    column: column.name().to_string(),
                    type_name: column.type_().name().to_string(),
                })?;
            Ok(FieldValue {
                name: column.name().to_string(),
                value: value.0,
            })
        })
        .collect::<Result<Vec<_>, DbError>>()?;
    Ok(UpsertRow::from_fields(fields))
}
