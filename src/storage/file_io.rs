//! JSON file I/O with atomic writes
//!
//! A write lands in a temp file next to the target and is renamed over it, so
//! a collection file is either the old version or the new one. The temp file
//! is removed whenever the write does not complete.

use std::fmt::Display;
use std::fs::{self, File};
use std::io::{BufReader, BufWriter, Write};
use std::path::Path;

use serde::{de::DeserializeOwned, Serialize};

use crate::error::WalletError;

fn storage_error<'a, E: Display>(
    action: &'a str,
    path: &'a Path,
) -> impl FnOnce(E) -> WalletError + 'a {
    move |e| WalletError::Storage(format!("Failed to {} {}: {}", action, path.display(), e))
}

/// Read JSON from a file, returning a default value if file doesn't exist
pub fn read_json<T, P>(path: P) -> Result<T, WalletError>
where
    T: DeserializeOwned + Default,
    P: AsRef<Path>,
{
    let path = path.as_ref();

    if !path.exists() {
        return Ok(T::default());
    }

    let file = File::open(path).map_err(storage_error("open", path))?;
    serde_json::from_reader(BufReader::new(file)).map_err(storage_error("parse", path))
}

/// Write JSON to a file atomically (write to temp, then rename)
pub fn write_json_atomic<T, P>(path: P, data: &T) -> Result<(), WalletError>
where
    T: Serialize,
    P: AsRef<Path>,
{
    let path = path.as_ref();

    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent).map_err(storage_error("create directory", parent))?;
    }

    // Same directory as the target so the rename stays on one filesystem
    let temp_path = path.with_extension("json.tmp");

    let result = write_temp(&temp_path, data)
        .and_then(|()| fs::rename(&temp_path, path).map_err(storage_error("replace", path)));
    if result.is_err() {
        let _ = fs::remove_file(&temp_path);
    }
    result
}

fn write_temp<T: Serialize>(temp_path: &Path, data: &T) -> Result<(), WalletError> {
    let file = File::create(temp_path).map_err(storage_error("create", temp_path))?;

    let mut writer = BufWriter::new(file);
    serde_json::to_writer_pretty(&mut writer, data).map_err(storage_error("serialize into", temp_path))?;
    writer.flush().map_err(storage_error("flush", temp_path))?;
    writer.get_ref().sync_all().map_err(storage_error("sync", temp_path))
}
