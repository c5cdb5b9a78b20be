//! Generic object-archive codecs.
//!
//! Archives hold bincode-serialized values: a single value for `.rds`
//! archives, or an explicit name-to-value map for `.RData`/`.rda`
//! archives. The caller decides where a loaded map gets bound; nothing
//! here mutates shared state.

use std::collections::BTreeMap;
use std::fs::File;
use std::io::{BufReader, BufWriter, Write};
use std::path::Path;

use serde::de::DeserializeOwned;
use serde::Serialize;

use crate::error::Result;

/// Decode a single serialized value.
pub fn decode<T: DeserializeOwned>(path: &Path) -> Result<T> {
    let reader = BufReader::new(File::open(path)?);
    Ok(bincode::deserialize_from(reader)?)
}

/// Encode a single value.
pub fn encode<T: Serialize>(value: &T, path: &Path) -> Result<()> {
    let mut writer = BufWriter::new(File::create(path)?);
    bincode::serialize_into(&mut writer, value)?;
    writer.flush()?;
    Ok(())
}

/// Decode a named collection of values.
pub fn decode_many<T: DeserializeOwned>(path: &Path) -> Result<BTreeMap<String, T>> {
    decode(path)
}

/// Encode a named collection of values.
pub fn encode_many<T: Serialize>(objects: &BTreeMap<String, T>, path: &Path) -> Result<()> {
    encode(objects, path)
}
