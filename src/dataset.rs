use crate::error::{Result, StarsError};
use serde::Serialize;
use serde_json::Value;
use std::fs::File;
use std::io::{BufReader, BufWriter, Write};
use std::path::Path;

/// Load a data file whose top-level value must be a JSON array.
pub fn load_array(path: &Path) -> Result<Vec<Value>> {
    let reader = BufReader::new(File::open(path)?);
    match serde_json::from_reader(reader)? {
        Value::Array(entries) => Ok(entries),
        _ => Err(StarsError::NotAnArray(path.display().to_string())),
    }
}

/// Write `data` as JSON indented by two spaces, replacing any existing file.
pub fn save_pretty<T: Serialize + ?Sized>(path: &Path, data: &T) -> Result<()> {
    let mut writer = BufWriter::new(File::create(path)?);
    serde_json::to_writer_pretty(&mut writer, data)?;
    writer.write_all(b"\n")?;
    writer.flush()?;
    Ok(())
}
