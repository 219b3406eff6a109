//! Binary wire format of the `hstore` extension type.
//!
//! `count:i32` followed by `count` entries of `key_len:i32 key value_len:i32
//! value`, where a `value_len` of `-1` marks a NULL value.

use bytes::{BufMut, BytesMut};
use std::collections::BTreeMap;

pub type Hstore = BTreeMap<String, Option<String>>;

pub fn encode(map: &Hstore, out: &mut BytesMut) -> Result<(), String> {
    out.put_i32(len_i32(map.len())?);
    for (key, value) in map {
        out.put_i32(len_i32(key.len())?);
        out.put_slice(key.as_bytes());
        match value {
            Some(value) => {
                out.put_i32(len_i32(value.len())?);
                out.put_slice(value.as_bytes());
            }
            None => out.put_i32(-1),
        }
    }
    Ok(())
}

pub fn decode(mut raw: &[u8]) -> Result<Hstore, String> {
    let count = read_i32(&mut raw)?;
    if count < 0 {
        return Err(format!("negative hstore entry count {count}"));
    }

    let mut map = BTreeMap::new();
    for _ in 0..count {
        let key = read_text(&mut raw)?.ok_or("hstore key cannot be NULL")?;
        let value = read_text(&mut raw)?;
        map.insert(key, value);
    }

    if !raw.is_empty() {
        return Err(format!("{} trailing bytes after hstore", raw.len()));
    }
    Ok(map)
}

fn len_i32(len: usize) -> Result<i32, String> {
    i32::try_from(len).map_err(|_| format!("hstore entry too large ({len} bytes)"))
}

fn read_i32(raw: &mut &[u8]) -> Result<i32, String> {
    let Some((head, rest)) = raw.split_first_chunk::<4>() else {
        return Err("truncated hstore length".to_string());
    };
    *raw = rest;
    Ok(i32::from_be_bytes(*head))
}

fn read_text(raw: &mut &[u8]) -> Result<Option<String>, String> {
    let len = read_i32(raw)?;
    if len < 0 {
        return Ok(None);
    }
    let len = len as usize;
    if raw.len() < len {
        return Err("truncated hstore text".to_string());
    }
    let (text, rest) = raw.split_at(len);
    *raw = rest;
    String::from_utf8(text.to_vec())
        .map(Some)
        .map_err(|e| e.to_string())
}
